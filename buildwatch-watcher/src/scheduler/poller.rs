//! Event poller
//!
//! Runs the tracker on a fixed tick and dispatches its events. Each tick runs
//! one poll to completion; shutdown is only observed between ticks.

use anyhow::Result;
use chrono::Utc;
use std::future::Future;
use tokio::time::{self, Duration, MissedTickBehavior};
use tracing::{debug, info};

use crate::service::{EventSink, PollingClient};

/// Drives a [`PollingClient`] until told to stop
pub struct EventPoller {
    tracker: PollingClient,
    sink: Box<dyn EventSink>,
    tick_interval: Duration,
}

impl EventPoller {
    /// Creates a new event poller
    pub fn new(tracker: PollingClient, sink: Box<dyn EventSink>, tick_interval: Duration) -> Self {
        Self {
            tracker,
            sink,
            tick_interval,
        }
    }

    /// The driven tracker
    pub fn tracker(&self) -> &PollingClient {
        &self.tracker
    }

    /// Starts the polling loop
    ///
    /// Returns once `shutdown` completes, or with an error if the sink fails.
    pub async fn run<F>(&mut self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        info!(
            "Watching {} (tick: {:?})",
            self.tracker.master_url(),
            self.tick_interval
        );

        let mut interval = time::interval(self.tick_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                biased;

                _ = &mut shutdown => {
                    info!("Interrupted, stopping");
                    return Ok(());
                }
                _ = interval.tick() => {
                    let dispatched = self.poll_once().await?;
                    if dispatched > 0 {
                        debug!("Dispatched {} event(s)", dispatched);
                    }
                }
            }
        }
    }

    /// Performs a single poll and dispatches its events
    pub async fn poll_once(&mut self) -> Result<usize> {
        let events = self.tracker.poll().await;

        for event in &events {
            self.sink.dispatch(Utc::now(), event)?;
        }

        Ok(events.len())
    }
}
