use chrono::{DateTime, Utc};
use std::time::{Duration, Instant};

/// Interpret a command header as whole seconds since the Unix epoch
pub fn timestamp_from_header(header: &str) -> Option<DateTime<Utc>> {
    let seconds = header.trim().parse::<i64>().ok()?;
    DateTime::from_timestamp(seconds, 0)
}

/// Timer for measuring operation latency
pub struct LatencyTimer {
    start: Instant,
}

impl LatencyTimer {
    /// Start a new timer
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Stop the timer and return elapsed duration
    pub fn stop(self) -> Duration {
        self.start.elapsed()
    }

    /// Get elapsed time without stopping the timer
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}
