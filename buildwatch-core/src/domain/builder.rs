//! Builder domain model
//!
//! Tracks the polling cursor of a single builder on the master.

use std::collections::BTreeSet;

/// Timestamp used for records that have never been polled.
///
/// Any interval check against it succeeds, so fresh records are polled on the
/// first opportunity.
pub const NEVER_POLLED: f64 = -1.0;

/// Per-builder polling state
#[derive(Debug, Clone, PartialEq)]
pub struct BuilderRecord {
    /// Builder name, unique on the master
    pub name: String,

    /// Most recent build number seen, `None` until the first successful poll
    pub last_build_number: Option<i64>,

    /// Builds that were started but not yet seen finishing
    ///
    /// A build whose detail the master cannot serve stays here and is asked
    /// for again on every poll of the builder, without limit.
    pub active_builds: BTreeSet<i64>,

    /// Seconds since the epoch of the last completed poll of this builder
    pub last_poll: f64,
}

impl BuilderRecord {
    /// Creates a record for a newly discovered builder
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            last_build_number: None,
            active_builds: BTreeSet::new(),
            last_poll: NEVER_POLLED,
        }
    }

    /// Returns true once `interval` seconds have passed since the last poll
    pub fn is_due(&self, now: f64, interval: f64) -> bool {
        now - self.last_poll >= interval
    }

    /// Build number after which new builds should be reported
    ///
    /// Returns `None` when the remote history no longer lines up with ours:
    /// the builder has never been polled, or its latest build number went
    /// backwards (history wiped or the builder was recreated).
    pub fn resume_point(&self, latest: i64) -> Option<i64> {
        self.last_build_number.filter(|last| latest >= *last)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_record_is_empty() {
        let record = BuilderRecord::new("clang-x86_64");
        assert_eq!(record.name, "clang-x86_64");
        assert_eq!(record.last_build_number, None);
        assert!(record.active_builds.is_empty());
        assert_eq!(record.last_poll, NEVER_POLLED);
    }

    #[test]
    fn test_records_do_not_share_active_builds() {
        let mut first = BuilderRecord::new("a");
        let second = BuilderRecord::new("b");

        first.active_builds.insert(7);

        assert!(second.active_builds.is_empty());
    }

    #[test]
    fn test_is_due() {
        let mut record = BuilderRecord::new("a");
        assert!(record.is_due(0.0, 5.0));

        record.last_poll = 100.0;
        assert!(!record.is_due(104.9, 5.0));
        assert!(record.is_due(105.0, 5.0));
    }

    #[test]
    fn test_resume_point() {
        let mut record = BuilderRecord::new("a");
        assert_eq!(record.resume_point(0), None);

        record.last_build_number = Some(10);
        assert_eq!(record.resume_point(10), Some(10));
        assert_eq!(record.resume_point(12), Some(10));
        assert_eq!(record.resume_point(3), None);
    }
}
