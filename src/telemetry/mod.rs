//! Telemetry store: local sensor readings, remote weather, rolls and alert.
//!
//! The store is the single owner of everything the screens display. It is
//! mutated from three directions:
//!
//! ```text
//!   sensor sample ──▶ ingest_sensor_reading ──▶ current / baseline
//!   weather/data  ──▶ ingest_weather_payload ─▶ snapshot, forecast, history
//!   weather/alert ──▶ ingest_alert ──────────▶ alert (until dismissed)
//! ```
//!
//! Payload ingestion is fail-safe: a payload is fully validated before any
//! field is written, so a rejected message leaves the store untouched.

pub mod weather;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::config::StationConfig;
use crate::error::ParseError;
use crate::ingest;

pub use weather::{AlertEvent, AlertLevel, DaySlot, IconKey, Roll, WeatherSnapshot, ROLL_LEN};

// ---------------------------------------------------------------------------
// Units
// ---------------------------------------------------------------------------

/// Presentation unit for temperatures. Storage is always Celsius.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TemperatureUnit {
    #[default]
    Celsius,
    Fahrenheit,
}

impl TemperatureUnit {
    pub fn toggled(self) -> Self {
        match self {
            Self::Celsius => Self::Fahrenheit,
            Self::Fahrenheit => Self::Celsius,
        }
    }

    /// Convert a Celsius value into this unit.
    pub fn convert(self, celsius: f32) -> f32 {
        match self {
            Self::Celsius => celsius,
            Self::Fahrenheit => celsius * 1.8 + 32.0,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Self::Celsius => "°C",
            Self::Fahrenheit => "°F",
        }
    }

    /// `21.3°C`, or `--°C` when the value is unknown.
    pub fn format(self, celsius: Option<f32>) -> String {
        match celsius {
            Some(c) => format!("{:.1}{}", self.convert(c), self.symbol()),
            None => format!("--{}", self.symbol()),
        }
    }
}

// ---------------------------------------------------------------------------
// Local readings
// ---------------------------------------------------------------------------

/// One sample from the local environmental sensor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TelemetryReading {
    pub temperature_c: f32,
    pub humidity_pct: f32,
    pub pressure_hpa: f32,
    /// Monotonic milliseconds at which the sample was taken.
    pub timestamp_ms: u64,
}

/// Minimum deltas for a reading to count as a significant change.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignificanceThresholds {
    pub temperature_c: f32,
    pub humidity_pct: f32,
    pub pressure_hpa: f32,
}

impl Default for SignificanceThresholds {
    fn default() -> Self {
        Self {
            temperature_c: 0.5,
            humidity_pct: 1.0,
            pressure_hpa: 1.0,
        }
    }
}

impl SignificanceThresholds {
    pub fn from_config(config: &StationConfig) -> Self {
        Self {
            temperature_c: config.temperature_delta_c,
            humidity_pct: config.humidity_delta_pct,
            pressure_hpa: config.pressure_delta_hpa,
        }
    }

    /// Strictly greater-than on any of the three quantities.
    pub fn exceeded(&self, baseline: &TelemetryReading, next: &TelemetryReading) -> bool {
        (next.temperature_c - baseline.temperature_c).abs() > self.temperature_c
            || (next.humidity_pct - baseline.humidity_pct).abs() > self.humidity_pct
            || (next.pressure_hpa - baseline.pressure_hpa).abs() > self.pressure_hpa
    }
}

/// Result of [`TelemetryStore::ingest_sensor_reading`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorUpdate {
    pub reading: TelemetryReading,
    /// True on the first reading and whenever a threshold was exceeded
    /// relative to the last significant reading.
    pub significant: bool,
}

// ---------------------------------------------------------------------------
// Remote updates
// ---------------------------------------------------------------------------

/// Result of a successful weather payload ingestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeatherChange {
    /// Forecast slots overwritten (0 when the payload had no forecast).
    pub forecast_slots: usize,
    /// History slots overwritten (0 when the payload had no history).
    pub history_slots: usize,
}

/// Result of a successful alert ingestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlertChange {
    pub level: AlertLevel,
    /// True when an alert was already active and got replaced.
    pub replaced: bool,
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

pub struct TelemetryStore {
    thresholds: SignificanceThresholds,
    current: Option<TelemetryReading>,
    baseline: Option<TelemetryReading>,
    weather: Option<WeatherSnapshot>,
    forecast: Roll,
    history: Roll,
    alert: Option<AlertEvent>,
}

impl TelemetryStore {
    pub fn new(thresholds: SignificanceThresholds) -> Self {
        Self {
            thresholds,
            current: None,
            baseline: None,
            weather: None,
            forecast: Roll::new(),
            history: Roll::new(),
            alert: None,
        }
    }

    // ── Local sensor ──────────────────────────────────────────

    /// Record a new sample. The baseline only moves on significance, so a
    /// slow drift eventually crosses a threshold.
    pub fn ingest_sensor_reading(&mut self, reading: TelemetryReading) -> SensorUpdate {
        let significant = match &self.baseline {
            None => true,
            Some(base) => self.thresholds.exceeded(base, &reading),
        };
        self.current = Some(reading);
        if significant {
            self.baseline = Some(reading);
            debug!(
                "Telemetry: significant reading T={:.1} H={:.1} P={:.1}",
                reading.temperature_c, reading.humidity_pct, reading.pressure_hpa
            );
        }
        SensorUpdate {
            reading,
            significant,
        }
    }

    /// Forget the current values after a read failure. The baseline stays,
    /// so the next good sample is compared against the last significant one.
    pub fn clear_sensor_reading(&mut self) {
        self.current = None;
    }

    // ── Remote weather ────────────────────────────────────────

    /// Validate and apply a `weather/data` payload.
    pub fn ingest_weather_payload(&mut self, raw: &[u8]) -> Result<WeatherChange, ParseError> {
        let update = ingest::parse_weather(raw)?;

        let forecast_slots = update.forecast.as_ref().map_or(0, |f| f.len().min(ROLL_LEN));
        let history_slots = update.history.as_ref().map_or(0, |h| h.len().min(ROLL_LEN));

        info!(
            "Telemetry: weather for {} ({:.1}°C, {})",
            update.snapshot.location, update.snapshot.current_temp, update.snapshot.condition
        );
        self.weather = Some(update.snapshot);
        if let Some(forecast) = update.forecast {
            self.forecast.overwrite(&forecast);
        }
        if let Some(history) = update.history {
            self.history.overwrite(&history);
        }

        Ok(WeatherChange {
            forecast_slots,
            history_slots,
        })
    }

    // ── Alerts ────────────────────────────────────────────────

    /// Validate and apply a `weather/alert_trigger` payload.
    pub fn ingest_alert(&mut self, raw: &[u8]) -> Result<AlertChange, ParseError> {
        let alert = ingest::parse_alert(raw)?;
        let level = alert.level;
        let replaced = self.alert.replace(alert).is_some();
        info!("Telemetry: {} alert stored (replaced={})", level.as_str(), replaced);
        Ok(AlertChange { level, replaced })
    }

    /// Clear the active alert. Returns whether one was active.
    pub fn dismiss_alert(&mut self) -> bool {
        self.alert.take().is_some()
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn current(&self) -> Option<&TelemetryReading> {
        self.current.as_ref()
    }

    /// Last reading that was flagged significant.
    pub fn baseline(&self) -> Option<&TelemetryReading> {
        self.baseline.as_ref()
    }

    pub fn weather(&self) -> Option<&WeatherSnapshot> {
        self.weather.as_ref()
    }

    pub fn forecast(&self) -> &Roll {
        &self.forecast
    }

    pub fn history(&self) -> &Roll {
        &self.history
    }

    pub fn alert(&self) -> Option<&AlertEvent> {
        self.alert.as_ref()
    }

    pub fn thresholds(&self) -> &SignificanceThresholds {
        &self.thresholds
    }
}

impl Default for TelemetryStore {
    fn default() -> Self {
        Self::new(SignificanceThresholds::default())
    }
}
