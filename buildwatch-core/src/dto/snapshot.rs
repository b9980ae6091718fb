//! Snapshot DTOs
//!
//! Persisted form of the watcher state. The layout is versioned; only
//! version [`SNAPSHOT_VERSION`] is understood and written.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::builder::BuilderRecord;

/// Snapshot schema version written by this crate
pub const SNAPSHOT_VERSION: u32 = 0;

/// Errors raised while reading a snapshot
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// The snapshot was written with a schema we do not know
    #[error("Unknown snapshot version {found} (expected {SNAPSHOT_VERSION})")]
    UnsupportedVersion { found: u64 },

    /// The snapshot does not match the expected layout
    #[error("Malformed snapshot: {0}")]
    Malformed(#[from] serde_json::Error),

    /// A required field is missing
    #[error("Malformed snapshot: missing field `{0}`")]
    MissingField(&'static str),

    /// The same builder appears more than once
    #[error("Malformed snapshot: builder `{0}` listed twice")]
    DuplicateBuilder(String),
}

/// Persisted state of a single builder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuilderSnapshot {
    pub version: u32,
    pub name: String,
    pub last_build_number: Option<i64>,
    pub active_builds: Vec<i64>,
    pub last_poll: f64,
}

/// Persisted state of the whole watcher
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientSnapshot {
    pub version: u32,
    pub master_url: String,
    pub builders_poll_rate: f64,
    pub builder_poll_rate: f64,
    pub builders: Vec<BuilderSnapshot>,
    pub last_builders_poll: f64,
}

impl ClientSnapshot {
    /// Parses a snapshot from JSON text
    ///
    /// The version fields are checked before the rest of the layout, so a
    /// snapshot from another schema reports [`SnapshotError::UnsupportedVersion`]
    /// rather than a field mismatch.
    pub fn from_json(text: &str) -> Result<Self, SnapshotError> {
        let value: serde_json::Value = serde_json::from_str(text)?;

        check_version(&value)?;
        if let Some(builders) = value.get("builders").and_then(|b| b.as_array()) {
            for builder in builders {
                check_version(builder)?;
            }
        }

        Ok(serde_json::from_value(value)?)
    }

    /// Serializes the snapshot as pretty-printed JSON
    pub fn to_json(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

fn check_version(value: &serde_json::Value) -> Result<(), SnapshotError> {
    let version = value
        .get("version")
        .and_then(|v| v.as_u64())
        .ok_or(SnapshotError::MissingField("version"))?;

    if version != u64::from(SNAPSHOT_VERSION) {
        return Err(SnapshotError::UnsupportedVersion { found: version });
    }

    Ok(())
}

impl From<&BuilderRecord> for BuilderSnapshot {
    fn from(record: &BuilderRecord) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            name: record.name.clone(),
            last_build_number: record.last_build_number,
            active_builds: record.active_builds.iter().copied().collect(),
            last_poll: record.last_poll,
        }
    }
}

impl TryFrom<BuilderSnapshot> for BuilderRecord {
    type Error = SnapshotError;

    fn try_from(snapshot: BuilderSnapshot) -> Result<Self, Self::Error> {
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(SnapshotError::UnsupportedVersion {
                found: u64::from(snapshot.version),
            });
        }

        Ok(Self {
            name: snapshot.name,
            last_build_number: snapshot.last_build_number,
            active_builds: snapshot.active_builds.into_iter().collect(),
            last_poll: snapshot.last_poll,
        })
    }
}
