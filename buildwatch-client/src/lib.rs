//! Buildwatch HTTP Client
//!
//! A small, type-safe client for the buildbot JSON status interface.
//!
//! Requests go through a [`JsonFetcher`], which makes the transport
//! replaceable: [`HttpFetcher`] talks to a real master, tests plug in an
//! in-memory fake.
//!
//! # Example
//!
//! ```no_run
//! use buildwatch_client::MasterClient;
//!
//! #[tokio::main]
//! async fn main() -> buildwatch_client::Result<()> {
//!     let client = MasterClient::new("http://lab.llvm.org:8011")?;
//!
//!     for name in client.builder_names().await? {
//!         let latest = client.latest_build(&name).await?;
//!         println!("{}: build {}", name, latest.number);
//!     }
//!     Ok(())
//! }
//! ```

pub mod error;
mod builders;
mod fetcher;

// Re-export commonly used types
pub use buildwatch_core::dto::status::{BuildDetail, BuildTiming, LatestBuild};
pub use error::{ClientError, Result};
pub use fetcher::{DEFAULT_TIMEOUT, HttpFetcher, JsonFetcher};

use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Client for the status interface of one buildbot master
#[derive(Clone)]
pub struct MasterClient {
    /// Base URL of the master (e.g., "http://lab.llvm.org:8011")
    base_url: String,
    /// Transport used for every request
    fetcher: Arc<dyn JsonFetcher>,
}

impl MasterClient {
    /// Create a client talking HTTP with the default request timeout
    ///
    /// # Arguments
    /// * `base_url` - The base URL of the master, without the `/json` suffix
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    /// Create a client talking HTTP with a custom request timeout
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let fetcher = HttpFetcher::new(timeout)?;
        Ok(Self::with_fetcher(base_url, Arc::new(fetcher)))
    }

    /// Create a client on top of an arbitrary transport
    ///
    /// # Example
    /// ```
    /// use buildwatch_client::{HttpFetcher, MasterClient};
    /// use std::sync::Arc;
    ///
    /// let fetcher = HttpFetcher::with_client(reqwest::Client::new());
    /// let client = MasterClient::with_fetcher("http://localhost:8010/", Arc::new(fetcher));
    /// assert_eq!(client.base_url(), "http://localhost:8010");
    /// ```
    pub fn with_fetcher(base_url: impl Into<String>, fetcher: Arc<dyn JsonFetcher>) -> Self {
        Self {
            base_url: normalize_base_url(&base_url.into()),
            fetcher,
        }
    }

    /// Get the base URL of the master
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // =============================================================================
    // Request Helpers
    // =============================================================================

    /// Build the URL of a status resource
    ///
    /// Each segment is percent-escaped, so builder names containing spaces or
    /// slashes stay a single path segment.
    fn status_url(&self, segments: &[&str]) -> Result<String> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| ClientError::InvalidUrl(format!("{}: {}", self.base_url, e)))?;

        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| ClientError::InvalidUrl(self.base_url.clone()))?;
            path.pop_if_empty().push("json").extend(segments);
        }

        Ok(url.to_string())
    }

    /// Fetch a status resource and decode it
    ///
    /// A `null` or empty body is reported as [`ClientError::NoData`].
    async fn fetch<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T> {
        let url = self.status_url(segments)?;
        let value = self.fetcher.fetch_json(&url).await?;

        if is_empty(&value) {
            return Err(ClientError::NoData(url));
        }

        serde_json::from_value(value)
            .map_err(|e| ClientError::ParseError(format!("Unexpected response from {}: {}", url, e)))
    }
}

impl std::fmt::Debug for MasterClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MasterClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

/// Strip trailing slashes so paths can be appended uniformly
pub fn normalize_base_url(base_url: &str) -> String {
    base_url.trim_end_matches('/').to_string()
}

fn is_empty(value: &JsonValue) -> bool {
    match value {
        JsonValue::Null => true,
        JsonValue::Object(map) => map.is_empty(),
        JsonValue::Array(items) => items.is_empty(),
        _ => false,
    }
}
