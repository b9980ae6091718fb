//! Error types for the status client

use thiserror::Error;

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur when querying the status API
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// API returned an error status code
    #[error("API error (status {status}): {message}")]
    ApiError {
        /// HTTP status code
        status: u16,
        /// Response body, if any
        message: String,
    },

    /// Failed to parse response
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// The response was empty
    #[error("No data returned for {0}")]
    NoData(String),

    /// The request URL could not be built
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl ClientError {
    /// Create an API error from status code and message
    pub fn api_error(status: u16, message: impl Into<String>) -> Self {
        Self::ApiError {
            status,
            message: message.into(),
        }
    }

    /// Check if this error is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ApiError { status: 404, .. })
    }

    /// Check if the master could not be reached or answered with an error status
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::RequestFailed(_) | Self::ApiError { .. })
    }

    /// Check if the master answered with a body we could not use
    pub fn is_format(&self) -> bool {
        matches!(self, Self::ParseError(_) | Self::NoData(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        let not_found = ClientError::api_error(404, "no such builder");
        assert!(not_found.is_not_found());
        assert!(not_found.is_transport());
        assert!(!not_found.is_format());

        let server = ClientError::api_error(503, "");
        assert!(!server.is_not_found());
        assert!(server.is_transport());

        let parse = ClientError::ParseError("expected object".to_string());
        assert!(parse.is_format());
        assert!(!parse.is_transport());

        assert!(ClientError::NoData("builders".to_string()).is_format());
    }
}
