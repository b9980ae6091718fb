//! Status events
//!
//! The event stream is the only output of the watcher. Consumers match on
//! [`StatusEvent`] exhaustively.

use serde::{Deserialize, Serialize};

/// A change observed on the master
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StatusEvent {
    /// A builder appeared in the builder list
    AddedBuilder { builder: String },

    /// A builder disappeared from the builder list
    RemovedBuilder { builder: String },

    /// Tracking for the builder restarted from its latest build
    ResetBuilder { builder: String },

    /// A new build was started
    AddBuild { builder: String, number: i64 },

    /// The master returned unusable data for a tracked build
    InvalidBuild { builder: String, number: i64 },

    /// A tracked build finished
    CompletedBuild { builder: String, number: i64 },
}

impl StatusEvent {
    /// Short name of the event kind, as used on the wire
    pub fn kind(&self) -> &'static str {
        match self {
            StatusEvent::AddedBuilder { .. } => "added_builder",
            StatusEvent::RemovedBuilder { .. } => "removed_builder",
            StatusEvent::ResetBuilder { .. } => "reset_builder",
            StatusEvent::AddBuild { .. } => "add_build",
            StatusEvent::InvalidBuild { .. } => "invalid_build",
            StatusEvent::CompletedBuild { .. } => "completed_build",
        }
    }

    /// Name of the builder the event refers to
    pub fn builder(&self) -> &str {
        match self {
            StatusEvent::AddedBuilder { builder }
            | StatusEvent::RemovedBuilder { builder }
            | StatusEvent::ResetBuilder { builder }
            | StatusEvent::AddBuild { builder, .. }
            | StatusEvent::InvalidBuild { builder, .. }
            | StatusEvent::CompletedBuild { builder, .. } => builder,
        }
    }

    /// Build number, for build-level events
    pub fn build_number(&self) -> Option<i64> {
        match self {
            StatusEvent::AddBuild { number, .. }
            | StatusEvent::InvalidBuild { number, .. }
            | StatusEvent::CompletedBuild { number, .. } => Some(*number),
            _ => None,
        }
    }
}

impl std::fmt::Display for StatusEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.build_number() {
            Some(number) => write!(f, "({}, {}, {})", self.kind(), self.builder(), number),
            None => write!(f, "({}, {})", self.kind(), self.builder()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let event = StatusEvent::AddBuild {
            builder: "llvm-gcc".to_string(),
            number: 42,
        };
        assert_eq!(event.to_string(), "(add_build, llvm-gcc, 42)");

        let event = StatusEvent::RemovedBuilder {
            builder: "llvm-gcc".to_string(),
        };
        assert_eq!(event.to_string(), "(removed_builder, llvm-gcc)");
    }

    #[test]
    fn test_serialized_form_is_tagged() {
        let event = StatusEvent::CompletedBuild {
            builder: "b1".to_string(),
            number: 3,
        };
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(
            value,
            serde_json::json!({ "kind": "completed_build", "builder": "b1", "number": 3 })
        );
        assert_eq!(value["kind"], event.kind());
    }
}
