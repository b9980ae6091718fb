//! Build tracker
//!
//! Follows the state of a buildbot master by polling its JSON status
//! interface and turns the differences it sees into [`StatusEvent`]s.
//!
//! Two kinds of polls run at independent rates:
//! - the builder list, to notice builders being added or removed
//! - each builder's latest build and in-flight builds
//!
//! Remote failures never escape a poll: the affected request is skipped and
//! its state left untouched, so the next scheduled poll retries it.

use buildwatch_client::{BuildTiming, MasterClient, normalize_base_url};
use buildwatch_core::domain::builder::{BuilderRecord, NEVER_POLLED};
use buildwatch_core::domain::event::StatusEvent;
use buildwatch_core::dto::snapshot::{
    BuilderSnapshot, ClientSnapshot, SNAPSHOT_VERSION, SnapshotError,
};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::clock::Clock;

/// Minimum number of seconds between two polls of each kind
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PollRates {
    /// Between two fetches of the builder list
    pub builders: f64,

    /// Between two polls of the same builder
    pub builder: f64,
}

impl Default for PollRates {
    fn default() -> Self {
        Self {
            builders: 60.0,
            builder: 5.0,
        }
    }
}

/// Polling client for one buildbot master
pub struct PollingClient {
    client: MasterClient,
    clock: Arc<dyn Clock>,
    rates: PollRates,
    builders: BTreeMap<String, BuilderRecord>,
    last_builders_poll: f64,
}

impl PollingClient {
    /// Creates a client that knows nothing about the master yet
    pub fn new(client: MasterClient, clock: Arc<dyn Clock>, rates: PollRates) -> Self {
        Self {
            client,
            clock,
            rates,
            builders: BTreeMap::new(),
            last_builders_poll: NEVER_POLLED,
        }
    }

    /// Rebuilds a client from a snapshot
    ///
    /// A snapshot taken for another master is discarded and a fresh client is
    /// returned instead. The poll rates stored in the snapshot take precedence
    /// over `rates`, which only apply to a fresh client.
    ///
    /// # Errors
    /// Fails if the snapshot or one of its builders has an unknown version.
    pub fn restore(
        snapshot: ClientSnapshot,
        client: MasterClient,
        clock: Arc<dyn Clock>,
        rates: PollRates,
    ) -> Result<Self, SnapshotError> {
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(SnapshotError::UnsupportedVersion {
                found: u64::from(snapshot.version),
            });
        }

        if normalize_base_url(&snapshot.master_url) != client.base_url() {
            warn!(
                "Discarding snapshot for {} (watching {})",
                snapshot.master_url,
                client.base_url()
            );
            return Ok(Self::new(client, clock, rates));
        }

        let mut builders = BTreeMap::new();
        for builder in snapshot.builders {
            let record = BuilderRecord::try_from(builder)?;
            let name = record.name.clone();
            if builders.insert(name.clone(), record).is_some() {
                return Err(SnapshotError::DuplicateBuilder(name));
            }
        }

        info!(
            "Restored state for {} ({} builders)",
            client.base_url(),
            builders.len()
        );

        Ok(Self {
            client,
            clock,
            rates: PollRates {
                builders: snapshot.builders_poll_rate,
                builder: snapshot.builder_poll_rate,
            },
            builders,
            last_builders_poll: snapshot.last_builders_poll,
        })
    }

    /// Restores from `snapshot` if there is one, otherwise starts fresh
    pub fn restore_or_new(
        snapshot: Option<ClientSnapshot>,
        client: MasterClient,
        clock: Arc<dyn Clock>,
        rates: PollRates,
    ) -> Result<Self, SnapshotError> {
        match snapshot {
            Some(snapshot) => Self::restore(snapshot, client, clock, rates),
            None => Ok(Self::new(client, clock, rates)),
        }
    }

    /// Exports the full client state
    pub fn snapshot(&self) -> ClientSnapshot {
        ClientSnapshot {
            version: SNAPSHOT_VERSION,
            master_url: self.client.base_url().to_string(),
            builders_poll_rate: self.rates.builders,
            builder_poll_rate: self.rates.builder,
            builders: self.builders.values().map(BuilderSnapshot::from).collect(),
            last_builders_poll: self.last_builders_poll,
        }
    }

    /// Base URL of the watched master
    pub fn master_url(&self) -> &str {
        self.client.base_url()
    }

    /// Poll rates in effect
    pub fn rates(&self) -> PollRates {
        self.rates
    }

    /// Looks up a tracked builder
    #[allow(dead_code)]
    pub fn builder(&self, name: &str) -> Option<&BuilderRecord> {
        self.builders.get(name)
    }

    /// Tracked builders, ordered by name
    pub fn builders(&self) -> impl Iterator<Item = &BuilderRecord> {
        self.builders.values()
    }

    /// Time of the last successful builder list fetch
    #[allow(dead_code)]
    pub fn last_builders_poll(&self) -> f64 {
        self.last_builders_poll
    }

    /// Polls whatever is due and returns the resulting events
    ///
    /// Builder list events come first, followed by the events of each polled
    /// builder in name order. Calling this again before any rate has elapsed
    /// does no requests and returns nothing.
    pub async fn poll(&mut self) -> Vec<StatusEvent> {
        let now = self.clock.now();
        let mut events = Vec::new();

        if now - self.last_builders_poll >= self.rates.builders {
            self.poll_builders(&mut events).await;
        }

        for record in self.builders.values_mut() {
            if record.is_due(now, self.rates.builder) {
                poll_builder(&self.client, self.clock.as_ref(), record, &mut events).await;
            }
        }

        events
    }

    /// Synchronizes the tracked builders with the master's builder list
    async fn poll_builders(&mut self, events: &mut Vec<StatusEvent>) {
        let names = match self.client.builder_names().await {
            Ok(names) => names,
            Err(e) => {
                warn!("Failed to fetch builder list: {}", e);
                return;
            }
        };

        let remote: BTreeSet<String> = names.into_iter().collect();

        let added: Vec<String> = remote
            .iter()
            .filter(|name| !self.builders.contains_key(name.as_str()))
            .cloned()
            .collect();
        let removed: Vec<String> = self
            .builders
            .keys()
            .filter(|name| !remote.contains(name.as_str()))
            .cloned()
            .collect();

        for name in added {
            info!("Builder added: {}", name);
            events.push(StatusEvent::AddedBuilder {
                builder: name.clone(),
            });
            self.builders.insert(name.clone(), BuilderRecord::new(name));
        }

        for name in removed {
            info!("Builder removed: {}", name);
            self.builders.remove(&name);
            events.push(StatusEvent::RemovedBuilder { builder: name });
        }

        self.last_builders_poll = self.clock.now();
    }
}

/// Picks up new builds of one builder and checks its active builds
async fn poll_builder(
    client: &MasterClient,
    clock: &dyn Clock,
    record: &mut BuilderRecord,
    events: &mut Vec<StatusEvent>,
) {
    let latest = match client.latest_build(&record.name).await {
        Ok(latest) => latest.number,
        Err(e) => {
            warn!("Failed to fetch latest build of {}: {}", record.name, e);
            return;
        }
    };

    // Buildbot numbers builds from 0. Anything below would also underflow
    // the reset point, so it is handled like a missing number.
    if latest < 0 {
        warn!(
            "Ignoring latest build of {}: invalid build number {}",
            record.name, latest
        );
        return;
    }

    let last = match record.resume_point(latest) {
        Some(last) => last,
        None => {
            debug!(
                "Resetting {} (last known {:?}, latest {})",
                record.name, record.last_build_number, latest
            );
            events.push(StatusEvent::ResetBuilder {
                builder: record.name.clone(),
            });
            latest - 1
        }
    };

    // `last < latest` keeps `last + 1` in range even for `i64::MAX`.
    if last < latest {
        for number in (last + 1)..=latest {
            events.push(StatusEvent::AddBuild {
                builder: record.name.clone(),
                number,
            });
            record.active_builds.insert(number);
        }
    }
    record.last_build_number = Some(latest);

    // Builds added above are checked in the same pass.
    let active: Vec<i64> = record.active_builds.iter().copied().collect();
    for number in active {
        let detail = match client.build_detail(&record.name, number).await {
            Ok(detail) => detail,
            Err(e) => {
                debug!(
                    "Skipping build {} of {}, still active and retried next poll: {}",
                    number, record.name, e
                );
                continue;
            }
        };

        match detail.timing() {
            BuildTiming::Malformed => {
                warn!("Dropping build {} of {}: no usable timing", number, record.name);
                record.active_builds.remove(&number);
                events.push(StatusEvent::InvalidBuild {
                    builder: record.name.clone(),
                    number,
                });
            }
            BuildTiming::Finished => {
                record.active_builds.remove(&number);
                events.push(StatusEvent::CompletedBuild {
                    builder: record.name.clone(),
                    number,
                });
            }
            BuildTiming::Running => {}
        }
    }

    record.last_poll = clock.now();
}
