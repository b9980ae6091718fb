//! Watcher configuration
//!
//! Defines all configurable parameters for the watcher: where the state is
//! kept, which master is watched, and how often it is contacted.

use std::path::PathBuf;
use std::time::Duration;

use crate::service::{OutputFormat, PollRates};

/// Watcher configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// File the tracker state is loaded from and saved to
    pub state_path: PathBuf,

    /// Master base URL (e.g., "http://lab.llvm.org:8011")
    pub master_url: String,

    /// Seconds between two fetches of the builder list
    pub builders_poll_rate: f64,

    /// Seconds between two polls of the same builder
    pub builder_poll_rate: f64,

    /// How often the tracker is asked whether anything is due
    pub tick_interval: Duration,

    /// Timeout of a single status API request
    pub request_timeout: Duration,

    /// Rendering of printed events
    pub output: OutputFormat,
}

impl Config {
    /// Creates a new configuration with defaults
    pub fn new(state_path: PathBuf, master_url: String) -> Self {
        let rates = PollRates::default();
        Self {
            state_path,
            master_url,
            builders_poll_rate: rates.builders,
            builder_poll_rate: rates.builder,
            tick_interval: Duration::from_millis(100),
            request_timeout: Duration::from_secs(10),
            output: OutputFormat::Text,
        }
    }

    /// Poll rates for a fresh tracker
    pub fn poll_rates(&self) -> PollRates {
        PollRates {
            builders: self.builders_poll_rate,
            builder: self.builder_poll_rate,
        }
    }

    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.state_path.as_os_str().is_empty() {
            anyhow::bail!("state_path cannot be empty");
        }

        if self.master_url.is_empty() {
            anyhow::bail!("master_url cannot be empty");
        }

        if !self.master_url.starts_with("http://") && !self.master_url.starts_with("https://") {
            anyhow::bail!("master_url must start with http:// or https://");
        }

        if !(self.builders_poll_rate.is_finite() && self.builders_poll_rate > 0.0) {
            anyhow::bail!("builders_poll_rate must be greater than 0");
        }

        if !(self.builder_poll_rate.is_finite() && self.builder_poll_rate > 0.0) {
            anyhow::bail!("builder_poll_rate must be greater than 0");
        }

        if self.tick_interval.is_zero() {
            anyhow::bail!("tick_interval must be greater than 0");
        }

        if self.request_timeout.is_zero() {
            anyhow::bail!("request_timeout must be greater than 0");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        Config::new(
            PathBuf::from("state.json"),
            "http://lab.llvm.org:8011".to_string(),
        )
    }

    #[test]
    fn test_default_config() {
        let config = config();
        assert_eq!(config.builders_poll_rate, 60.0);
        assert_eq!(config.builder_poll_rate, 5.0);
        assert_eq!(config.tick_interval, Duration::from_millis(100));
        assert_eq!(config.request_timeout, Duration::from_secs(10));
        assert_eq!(config.poll_rates(), PollRates::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = config();

        // Invalid URL should fail
        config.master_url = "lab.llvm.org:8011".to_string();
        assert!(config.validate().is_err());

        config.master_url = String::new();
        assert!(config.validate().is_err());

        config.master_url = "https://lab.llvm.org:8011/".to_string();
        assert!(config.validate().is_ok());

        config.state_path = PathBuf::new();
        assert!(config.validate().is_err());
        config.state_path = PathBuf::from("state.json");

        config.builder_poll_rate = 0.0;
        assert!(config.validate().is_err());
        config.builder_poll_rate = 5.0;

        config.builders_poll_rate = f64::NAN;
        assert!(config.validate().is_err());
        config.builders_poll_rate = 60.0;

        config.tick_interval = Duration::ZERO;
        assert!(config.validate().is_err());
        config.tick_interval = Duration::from_millis(100);

        config.request_timeout = Duration::ZERO;
        assert!(config.validate().is_err());
    }
}
