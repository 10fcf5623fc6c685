//! Host time adapter.
//!
//! - Monotonic milliseconds from `std::time::Instant`.
//! - Wall clock from the `time` crate, formatted `YYYY-MM-DDTHH:MM:SS`
//!   (UTC). A clock built with [`HostClock::without_wall_clock`] behaves
//!   like a board that has not synced NTP yet.

use std::time::Instant;

use time::OffsetDateTime;
use time::macros::format_description;

use crate::app::ports::ClockPort;

#[derive(Debug, Clone, Copy)]
pub struct HostClock {
    start: Instant,
    wall_clock: bool,
}

impl Default for HostClock {
    fn default() -> Self {
        Self::new()
    }
}

impl HostClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            wall_clock: true,
        }
    }

    /// Monotonic time only; timestamps read `"unknown"`.
    pub fn without_wall_clock() -> Self {
        Self {
            wall_clock: false,
            ..Self::new()
        }
    }
}

/// Format an instant the way records and alerts expect it.
pub fn format_timestamp(at: OffsetDateTime) -> Option<String> {
    let fmt = format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");
    at.format(&fmt).ok()
}

impl ClockPort for HostClock {
    fn now_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }

    fn wall_clock(&self) -> Option<String> {
        if !self.wall_clock {
            return None;
        }
        format_timestamp(OffsetDateTime::now_utc())
    }
}
