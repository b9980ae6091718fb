//! Event sinks
//!
//! A sink receives every event produced by the tracker, in order.

use anyhow::{Context, Result};
use buildwatch_core::domain::event::StatusEvent;
use chrono::{DateTime, SecondsFormat, Utc};
use colored::*;
use serde::Serialize;
use std::io::Write;

/// Destination for status events
pub trait EventSink: Send {
    /// Handles one event observed at `timestamp`
    fn dispatch(&mut self, timestamp: DateTime<Utc>, event: &StatusEvent) -> Result<()>;
}

/// How the console sink renders events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// One colored line per event
    #[default]
    Text,
    /// One JSON object per line
    Json,
}

/// Writes events to a stream, stdout by default
pub struct ConsoleSink<W: Write + Send = std::io::Stdout> {
    format: OutputFormat,
    out: W,
}

impl ConsoleSink {
    /// Creates a sink printing to stdout
    pub fn stdout(format: OutputFormat) -> Self {
        Self::new(format, std::io::stdout())
    }
}

impl<W: Write + Send> ConsoleSink<W> {
    pub fn new(format: OutputFormat, out: W) -> Self {
        Self { format, out }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }
}

#[derive(Serialize)]
struct JsonLine<'a> {
    timestamp: DateTime<Utc>,
    #[serde(flatten)]
    event: &'a StatusEvent,
}

impl<W: Write + Send> EventSink for ConsoleSink<W> {
    fn dispatch(&mut self, timestamp: DateTime<Utc>, event: &StatusEvent) -> Result<()> {
        let written = match self.format {
            OutputFormat::Text => {
                let when = timestamp.to_rfc3339_opts(SecondsFormat::Millis, true);
                writeln!(self.out, "{} {}", when.dimmed(), colorize(event))
            }
            OutputFormat::Json => {
                let line = serde_json::to_string(&JsonLine { timestamp, event })?;
                writeln!(self.out, "{}", line)
            }
        };
        written.context("Failed to write event")?;

        self.out.flush().context("Failed to flush event output")
    }
}

fn colorize(event: &StatusEvent) -> ColoredString {
    let text = event.to_string();
    match event {
        StatusEvent::AddedBuilder { .. } => text.cyan(),
        StatusEvent::RemovedBuilder { .. } => text.magenta(),
        StatusEvent::ResetBuilder { .. } => text.yellow(),
        StatusEvent::AddBuild { .. } => text.normal(),
        StatusEvent::InvalidBuild { .. } => text.red(),
        StatusEvent::CompletedBuild { .. } => text.green(),
    }
}
