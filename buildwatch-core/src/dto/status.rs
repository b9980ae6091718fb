//! Status API DTOs
//!
//! Payloads served by the buildbot JSON status interface. Only the fields the
//! watcher reads are modeled; everything else is ignored.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Response of `/json/builders/{name}/builds/-1`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LatestBuild {
    /// Number of the most recent build of the builder
    pub number: i64,
}

/// Response of `/json/builders/{name}/builds/{number}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BuildDetail {
    /// `[start, end]`; `end` stays null while the build runs
    #[serde(default)]
    pub times: Option<JsonValue>,
}

/// Lifecycle stage derived from a [`BuildDetail`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildTiming {
    /// The timing information is missing or not a `[start, end]` pair
    Malformed,

    /// The build has started but has no end time yet
    Running,

    /// The build has an end time
    Finished,
}

impl BuildDetail {
    /// Classifies the build from its `times` field
    pub fn timing(&self) -> BuildTiming {
        match &self.times {
            Some(JsonValue::Array(times)) if times.len() == 2 => {
                if times[1].is_null() {
                    BuildTiming::Running
                } else {
                    BuildTiming::Finished
                }
            }
            _ => BuildTiming::Malformed,
        }
    }
}
