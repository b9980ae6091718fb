//! Wall clock abstraction
//!
//! Poll scheduling compares timestamps in seconds since the epoch. The clock is
//! injected so tests can move time explicitly.

use chrono::Utc;

/// Source of the current time
pub trait Clock: Send + Sync {
    /// Seconds since the Unix epoch
    fn now(&self) -> f64;
}

/// Clock backed by the system time
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> f64 {
        Utc::now().timestamp_millis() as f64 / 1000.0
    }
}

/// Clock that only moves when told to
#[cfg(test)]
#[derive(Debug, Default)]
pub struct ManualClock {
    now: std::sync::Mutex<f64>,
}

#[cfg(test)]
impl ManualClock {
    pub fn new(now: f64) -> Self {
        Self {
            now: std::sync::Mutex::new(now),
        }
    }

    pub fn set(&self, now: f64) {
        *self.now.lock().unwrap() = now;
    }

    pub fn advance(&self, seconds: f64) {
        *self.now.lock().unwrap() += seconds;
    }
}

#[cfg(test)]
impl Clock for ManualClock {
    fn now(&self) -> f64 {
        *self.now.lock().unwrap()
    }
}
