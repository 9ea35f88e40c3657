//! Wall-clock time of day for snapshot and render timestamps.

use chrono::{Local, NaiveTime};

/// Source of the current local time of day.
pub trait Clock {
    fn now(&self) -> NaiveTime;
}

/// Reads the system's local time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveTime {
        Local::now().time()
    }
}

/// Always reports the same time.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveTime {
        self.0
    }
}

/// `HH:MM:SS`, used for snapshots.
pub fn format_time(time: NaiveTime) -> String {
    time.format("%H:%M:%S").to_string()
}

/// `HH:MM:SS.mmm` (24h), used for render timestamps.
pub fn format_time_millis(time: NaiveTime) -> String {
    time.format("%H:%M:%S%.3f").to_string()
}
