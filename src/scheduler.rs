//! Fixed-interval task scheduler for the cooperative loop.
//!
//! Every monitored service gets its own timer so a slow or failing
//! service never delays the others. Sensor sampling runs on a separate,
//! faster cadence.
//!
//! ```text
//!   now_ms ──▶ ┌─────────────────────────────┐
//!              │ PollScheduler                │
//!              │  WifiPoll     every 60 s     │──▶ due: [WifiPoll,
//!              │  SensorPoll   every 60 s     │          SensorSample]
//!              │  BrokerPoll   every 60 s     │
//!              │  SensorSample every  1 s     │
//!              └─────────────────────────────┘
//! ```
//!
//! A timer that has never fired is due immediately. Time comes from a
//! monotonic millisecond counter; a counter that goes backwards is treated
//! as "no time elapsed".

use heapless::Vec;
use log::debug;

use crate::config::StationConfig;

// ═══════════════════════════════════════════════════════════════
//  Task identity
// ═══════════════════════════════════════════════════════════════

/// Periodic work items driven by the loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Task {
    WifiPoll = 0,
    SensorPoll = 1,
    BrokerPoll = 2,
    SensorSample = 3,
}

impl Task {
    pub const COUNT: usize = 4;

    /// Fixed evaluation order. Matches the supervisor's startup sweep.
    pub const ALL: [Task; Task::COUNT] = [
        Task::WifiPoll,
        Task::SensorPoll,
        Task::BrokerPoll,
        Task::SensorSample,
    ];
}

// ═══════════════════════════════════════════════════════════════
//  Interval timer
// ═══════════════════════════════════════════════════════════════

/// One periodic timer.
#[derive(Debug, Clone, Copy)]
pub struct Interval {
    period_ms: u64,
    last_fired_ms: Option<u64>,
}

impl Interval {
    pub fn new(period_ms: u64) -> Self {
        Self {
            period_ms,
            last_fired_ms: None,
        }
    }

    /// True when the timer has never fired or a full period has elapsed.
    pub fn is_due(&self, now_ms: u64) -> bool {
        match self.last_fired_ms {
            None => true,
            Some(last) => now_ms.saturating_sub(last) >= self.period_ms,
        }
    }

    /// Record that the timer fired at `now_ms`.
    pub fn mark(&mut self, now_ms: u64) {
        self.last_fired_ms = Some(now_ms);
    }

    pub fn period_ms(&self) -> u64 {
        self.period_ms
    }
}

// ═══════════════════════════════════════════════════════════════
//  Scheduler
// ═══════════════════════════════════════════════════════════════

/// Owns one [`Interval`] per [`Task`].
pub struct PollScheduler {
    timers: [Interval; Task::COUNT],
}

impl PollScheduler {
    pub fn new(config: &StationConfig) -> Self {
        Self {
            timers: [
                Interval::new(u64::from(config.wifi_poll_interval_ms)),
                Interval::new(u64::from(config.sensor_poll_interval_ms)),
                Interval::new(u64::from(config.broker_poll_interval_ms)),
                Interval::new(u64::from(config.sensor_sample_interval_ms)),
            ],
        }
    }

    /// Collect every due task (in [`Task::ALL`] order) and mark it fired.
    pub fn take_due(&mut self, now_ms: u64) -> Vec<Task, { Task::COUNT }> {
        let mut due = Vec::new();
        for task in Task::ALL {
            let timer = &mut self.timers[task as usize];
            if timer.is_due(now_ms) {
                timer.mark(now_ms);
                debug!("Scheduler: {:?} due at {}ms", task, now_ms);
                // Capacity equals Task::COUNT, so this cannot overflow.
                let _ = due.push(task);
            }
        }
        due
    }

    /// Mark a task as having just run outside the normal cadence
    /// (e.g. the startup sweep).
    pub fn mark(&mut self, task: Task, now_ms: u64) {
        self.timers[task as usize].mark(now_ms);
    }

    /// Inspect a task's timer.
    pub fn interval(&self, task: Task) -> &Interval {
        &self.timers[task as usize]
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════
