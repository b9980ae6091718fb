//! Core domain types
//!
//! This module contains the structures the watcher keeps in memory while it
//! follows a buildbot master. They are shared between the HTTP client (which
//! only needs the names) and the watcher (which mutates them while polling).

pub mod builder;
pub mod event;
