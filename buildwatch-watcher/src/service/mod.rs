//! Service layer
//!
//! Services contain the watcher's logic: the tracker that polls the master
//! and turns what it sees into events, and the sinks those events go to.
//!
//! Sinks are trait-based so the driver loop can be tested without a terminal.

mod sink;
mod tracker;

// Re-export traits
pub use sink::EventSink;

// Re-export implementations
pub use sink::{ConsoleSink, OutputFormat};
pub use tracker::{PollRates, PollingClient};

#[cfg(test)]
pub use sink::tests::RecordingSink;
