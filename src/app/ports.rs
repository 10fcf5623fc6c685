//! Port traits — the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ AppService (domain)
//! ```
//!
//! Driven adapters (WiFi, sensor, broker, display, indicator, persistence,
//! clock) implement these traits. The [`AppService`](super::service::AppService)
//! consumes them via generics, so the domain core never touches hardware
//! or sockets directly.
//!
//! ## Timeouts
//!
//! Every blocking call behind a port (association, connect, sensor read,
//! receive) must enforce its own bounded timeout. The core only reacts to
//! the resulting error.

use crate::error::{BrokerError, DeviceError, TransportError};
use crate::ingest::{InboundMessage, SensorRecord};
use crate::nav::view::ViewModel;

// ───────────────────────────────────────────────────────────────
// WiFi link (driven adapter: domain → radio)
// ───────────────────────────────────────────────────────────────

pub trait LinkPort {
    /// Whether the station is currently associated with an access point.
    fn is_associated(&self) -> bool;

    /// Associate with the given network. Bounded by the adapter's timeout.
    fn associate(&mut self, ssid: &str, password: &str) -> Result<(), TransportError>;
}

// ───────────────────────────────────────────────────────────────
// Environmental sensor (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// One raw measurement, already compensated into physical units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawReading {
    pub temperature_c: f32,
    pub humidity_pct: f32,
    pub pressure_hpa: f32,
}

pub trait EnvSensorPort {
    /// Open (or re-open) the sensor handle.
    fn acquire(&mut self) -> Result<(), DeviceError>;

    /// Read one measurement from the acquired handle.
    fn read(&mut self) -> Result<RawReading, DeviceError>;

    /// Drop the handle so the next poll re-acquires it.
    fn release(&mut self);

    fn is_acquired(&self) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Broker (driven adapter: domain ↔ MQTT)
// ───────────────────────────────────────────────────────────────

pub trait BrokerPort {
    /// Open a client session. Bounded by the adapter's connect timeout.
    fn connect(&mut self) -> Result<(), BrokerError>;

    fn subscribe(&mut self, topic: &str) -> Result<(), BrokerError>;

    fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), BrokerError>;

    /// Non-blocking check for one pending message.
    fn try_recv(&mut self) -> Result<Option<InboundMessage>, BrokerError>;

    /// Drop the client so the next poll reconnects from scratch.
    fn release(&mut self);

    fn is_open(&self) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Presentation (driven adapters: domain → display / LED)
// ───────────────────────────────────────────────────────────────

/// Draws a complete screen. The core never touches pixels.
pub trait RenderPort {
    fn render(&mut self, view: &ViewModel);
}

/// RGB alert indicator.
pub trait IndicatorPort {
    fn set_rgb(&mut self, r: u8, g: u8, b: u8);
}

// ───────────────────────────────────────────────────────────────
// Persistence (driven adapter: domain → log file / console)
// ───────────────────────────────────────────────────────────────

/// Receives log lines and measurement records. Failures are non-fatal:
/// the caller logs them and carries on.
pub trait RecordSink {
    fn persist_line(&mut self, line: &str) -> Result<(), SinkError>;

    fn persist_record(&mut self, record: &SensorRecord) -> Result<(), SinkError>;
}

// ───────────────────────────────────────────────────────────────
// Time source
// ───────────────────────────────────────────────────────────────

pub trait ClockPort {
    /// Monotonic milliseconds since an arbitrary origin.
    fn now_ms(&self) -> u64;

    /// `YYYY-MM-DDTHH:MM:SS`, or `None` when the wall clock is not set.
    fn wall_clock(&self) -> Option<String>;

    /// Wall-clock timestamp with the `"unknown"` placeholder.
    fn timestamp(&self) -> String {
        self.wall_clock().unwrap_or_else(|| "unknown".to_owned())
    }
}

// ───────────────────────────────────────────────────────────────
// Event sink (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port. Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`RecordSink`] operations.
#[derive(Debug)]
pub enum SinkError {
    /// The record could not be serialised.
    Encode,
    /// Underlying storage rejected the write.
    Io(std::io::Error),
}

impl core::fmt::Display for SinkError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Encode => write!(f, "encode failed"),
            Self::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for SinkError {}

impl From<std::io::Error> for SinkError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}
