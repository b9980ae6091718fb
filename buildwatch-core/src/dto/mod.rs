//! Data Transfer Objects
//!
//! This module contains the wire formats buildwatch reads and writes:
//! the JSON payloads served by the buildbot status API and the versioned
//! snapshot used to resume watching after a restart.

pub mod snapshot;
pub mod status;
