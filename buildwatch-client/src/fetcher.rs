//! JSON fetching
//!
//! The status client never talks to the network directly. It goes through a
//! [`JsonFetcher`], so tests can substitute an in-memory transport.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value as JsonValue;
use std::time::Duration;
use tracing::debug;

use crate::error::{ClientError, Result};

/// Default timeout applied to every status API request
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Fetches a JSON document from a URL
#[async_trait]
pub trait JsonFetcher: Send + Sync {
    /// Fetches and decodes the document at `url`
    ///
    /// Fails with a transport error (unreachable host, non-2xx status) or a
    /// format error (body is not JSON).
    async fn fetch_json(&self, url: &str) -> Result<JsonValue>;
}

/// HTTP implementation of [`JsonFetcher`]
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Creates a fetcher with the given request timeout
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    /// Creates a fetcher around a preconfigured reqwest client
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl JsonFetcher for HttpFetcher {
    async fn fetch_json(&self, url: &str) -> Result<JsonValue> {
        debug!("GET {}", url);

        let response = self.client.get(url).send().await?;
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::api_error(status.as_u16(), error_text));
        }

        response
            .json()
            .await
            .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_fetch_json() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/json/builders");
            then.status(200)
                .header("content-type", "application/json")
                .body(r#"{"b1": {}, "b2": {}}"#);
        });

        let fetcher = HttpFetcher::new(DEFAULT_TIMEOUT).unwrap();
        let value = fetcher
            .fetch_json(&server.url("/json/builders"))
            .await
            .unwrap();

        mock.assert();
        assert_eq!(value, json!({ "b1": {}, "b2": {} }));
    }

    #[tokio::test]
    async fn test_error_status() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/json/builders");
            then.status(500).body("master is restarting");
        });

        let fetcher = HttpFetcher::new(DEFAULT_TIMEOUT).unwrap();
        let err = fetcher
            .fetch_json(&server.url("/json/builders"))
            .await
            .unwrap_err();

        assert!(matches!(err, ClientError::ApiError { status: 500, .. }));
        assert!(err.is_transport());
    }

    #[tokio::test]
    async fn test_invalid_body() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/json/builders");
            then.status(200).body("<html>not json</html>");
        });

        let fetcher = HttpFetcher::new(DEFAULT_TIMEOUT).unwrap();
        let err = fetcher
            .fetch_json(&server.url("/json/builders"))
            .await
            .unwrap_err();

        assert!(err.is_format());
    }

    #[tokio::test]
    async fn test_unreachable_host() {
        let fetcher = HttpFetcher::new(Duration::from_secs(2)).unwrap();
        // Port 9 (discard) on localhost is not expected to run an HTTP server.
        let err = fetcher
            .fetch_json("http://127.0.0.1:9/json/builders")
            .await
            .unwrap_err();

        assert!(matches!(err, ClientError::RequestFailed(_)));
    }
}
