//! Buildwatch
//!
//! Watches a buildbot master and prints what happens on it.
//!
//! Architecture:
//! - Configuration: Command line arguments with environment fallbacks
//! - Services: The tracker polling the master, and the sinks events go to
//! - Scheduler: The tick loop driving the tracker
//! - State: Snapshot persistence so a restart does not replay old builds
//!
//! The tracker state is loaded from the state file on startup (unless it was
//! written for another master) and saved back when the watcher is interrupted.

mod clock;
mod config;
mod scheduler;
mod service;
mod state;

#[cfg(test)]
mod testing;

use anyhow::{Context, Result};
use buildwatch_client::MasterClient;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::scheduler::EventPoller;
use crate::service::{ConsoleSink, OutputFormat, PollingClient};

/// Log filter used when `RUST_LOG` is not set
const DEFAULT_LOG_FILTER: &str = "buildwatch=info,buildwatch_client=info";

#[derive(Parser)]
#[command(name = "buildwatch")]
#[command(about = "Watch a buildbot master and report build events", long_about = None)]
struct Cli {
    /// State file, loaded on startup and written on exit
    state_path: PathBuf,

    /// Base URL of the buildbot master
    master_url: String,

    /// Seconds between two fetches of the builder list
    #[arg(long, env = "BUILDWATCH_BUILDERS_POLL_RATE", default_value_t = 60.0)]
    builders_poll_rate: f64,

    /// Seconds between two polls of the same builder
    #[arg(long, env = "BUILDWATCH_BUILDER_POLL_RATE", default_value_t = 5.0)]
    builder_poll_rate: f64,

    /// Milliseconds between two checks for due polls
    #[arg(long, env = "BUILDWATCH_TICK_MS", default_value_t = 100)]
    tick_ms: u64,

    /// Timeout of a single request to the master, in seconds
    #[arg(long, env = "BUILDWATCH_REQUEST_TIMEOUT", default_value_t = 10)]
    request_timeout: u64,

    /// Print events as JSON lines
    #[arg(long, env = "BUILDWATCH_JSON")]
    json: bool,
}

impl From<Cli> for Config {
    fn from(cli: Cli) -> Self {
        Self {
            builders_poll_rate: cli.builders_poll_rate,
            builder_poll_rate: cli.builder_poll_rate,
            tick_interval: Duration::from_millis(cli.tick_ms),
            request_timeout: Duration::from_secs(cli.request_timeout),
            output: if cli.json {
                OutputFormat::Json
            } else {
                OutputFormat::Text
            },
            ..Config::new(cli.state_path, cli.master_url)
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Events go to stdout, diagnostics to stderr
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = Config::from(Cli::parse());
    config.validate()?;
    info!(
        "Loaded configuration: master_url={}, state_path={}",
        config.master_url,
        config.state_path.display()
    );

    let client = MasterClient::with_timeout(config.master_url.clone(), config.request_timeout)
        .context("Failed to create status client")?;
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let snapshot = state::load_snapshot(&config.state_path).await?;
    let tracker = PollingClient::restore_or_new(snapshot, client, clock, config.poll_rates())
        .context("Failed to restore tracker state")?;

    let rates = tracker.rates();
    info!(
        "Tracking {} builder(s); builder list every {}s, each builder every {}s",
        tracker.builders().count(),
        rates.builders,
        rates.builder
    );

    let sink = ConsoleSink::stdout(config.output);
    let mut poller = EventPoller::new(tracker, Box::new(sink), config.tick_interval);

    let result = poller.run(shutdown_signal()).await;
    if let Err(e) = &result {
        error!("Poller error: {:#}", e);
    }

    // Save even after a failure so known builds are not reported again.
    state::save_snapshot(&config.state_path, &poller.tracker().snapshot()).await?;

    result
}

/// Completes on Ctrl-C
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::try_parse_from(["buildwatch", "state.json", "http://lab.llvm.org:8011"])
            .unwrap();
        let config = Config::from(cli);

        assert_eq!(config.state_path, PathBuf::from("state.json"));
        assert_eq!(config.master_url, "http://lab.llvm.org:8011");
        assert_eq!(config.tick_interval, Duration::from_millis(100));
        assert_eq!(config.output, OutputFormat::Text);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_cli_options() {
        let cli = Cli::try_parse_from([
            "buildwatch",
            "state.json",
            "http://localhost:8010",
            "--builders-poll-rate",
            "120",
            "--builder-poll-rate",
            "2.5",
            "--tick-ms",
            "250",
            "--request-timeout",
            "3",
            "--json",
        ])
        .unwrap();
        let config = Config::from(cli);

        assert_eq!(config.builders_poll_rate, 120.0);
        assert_eq!(config.builder_poll_rate, 2.5);
        assert_eq!(config.tick_interval, Duration::from_millis(250));
        assert_eq!(config.request_timeout, Duration::from_secs(3));
        assert_eq!(config.output, OutputFormat::Json);
    }

    #[test]
    fn test_default_log_filter_covers_binary() {
        let targets: Vec<&str> = DEFAULT_LOG_FILTER
            .split(',')
            .filter_map(|directive| directive.strip_suffix("=info"))
            .collect();
        assert!(targets.contains(&env!("CARGO_CRATE_NAME")));
        assert!(targets.contains(&"buildwatch_client"));
        assert!(tracing_subscriber::EnvFilter::try_new(DEFAULT_LOG_FILTER).is_ok());
    }

    #[test]
    fn test_cli_requires_master_url() {
        assert!(Cli::try_parse_from(["buildwatch", "state.json"]).is_err());
    }
}
