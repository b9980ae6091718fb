//! Scheduler layer for the watcher
//!
//! This layer drives the tracker: it asks it on a short fixed tick whether
//! anything is due, forwards the resulting events to the sink, and stops
//! cleanly when the process is interrupted.

pub mod poller;

pub use poller::EventPoller;
