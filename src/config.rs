//! Station configuration parameters
//!
//! All tunable parameters for the weather panel. The host binary loads them
//! from a JSON file; anything absent falls back to [`StationConfig::default`].

use serde::{Deserialize, Serialize};

use crate::telemetry::TemperatureUnit;

/// Core station configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StationConfig {
    // --- WiFi ---
    /// Access point SSID
    pub wifi_ssid: String,
    /// Access point password (empty for open networks)
    pub wifi_password: String,

    // --- Broker ---
    /// MQTT broker host name or address
    pub broker_host: String,
    /// MQTT broker TCP port
    pub broker_port: u16,
    /// MQTT client identifier
    pub client_id: String,
    /// Upper bound on a single connect attempt (milliseconds)
    pub broker_connect_timeout_ms: u32,

    // --- Service polling ---
    /// WiFi health-check interval (milliseconds)
    pub wifi_poll_interval_ms: u32,
    /// Sensor health-check interval (milliseconds)
    pub sensor_poll_interval_ms: u32,
    /// Broker health-check interval (milliseconds)
    pub broker_poll_interval_ms: u32,
    /// Sensor sampling cadence while the sensor is connected (milliseconds)
    pub sensor_sample_interval_ms: u32,

    // --- Significance thresholds ---
    /// Temperature delta (°C) that counts as a significant change
    pub temperature_delta_c: f32,
    /// Humidity delta (%) that counts as a significant change
    pub humidity_delta_pct: f32,
    /// Pressure delta (hPa) that counts as a significant change
    pub pressure_delta_hpa: f32,

    // --- Visualisation ---
    /// Shortest history bar (pixels)
    pub bar_min_px: u16,
    /// Tallest history bar (pixels)
    pub bar_max_px: u16,
    /// Padding added below/above the history range before scaling
    pub scale_buffer: f32,

    // --- Presentation ---
    /// Unit shown at startup; toggled at runtime by double-pressing C
    pub temperature_unit: TemperatureUnit,

    // --- Persistence ---
    /// JSON-lines file receiving significant sensor records (None = disabled)
    pub record_log_path: Option<String>,
}

impl Default for StationConfig {
    fn default() -> Self {
        Self {
            // WiFi
            wifi_ssid: String::new(),
            wifi_password: String::new(),

            // Broker
            broker_host: "127.0.0.1".into(),
            broker_port: 1883,
            client_id: "wxpanel".into(),
            broker_connect_timeout_ms: 3000,

            // Service polling
            wifi_poll_interval_ms: 60_000,
            sensor_poll_interval_ms: 60_000,
            broker_poll_interval_ms: 60_000,
            sensor_sample_interval_ms: 1000,

            // Significance thresholds
            temperature_delta_c: 0.5,
            humidity_delta_pct: 1.0,
            pressure_delta_hpa: 1.0,

            // Visualisation
            bar_min_px: 5,
            bar_max_px: 66,
            scale_buffer: 3.0,

            // Presentation
            temperature_unit: TemperatureUnit::Celsius,

            // Persistence
            record_log_path: None,
        }
    }
}

/// Errors from configuration loading and validation.
#[derive(Debug)]
pub enum ConfigError {
    /// The document could not be deserialised.
    Malformed(serde_json::Error),
    /// A field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Malformed(e) => write!(f, "malformed config: {}", e),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

impl StationConfig {
    /// Parse and validate a JSON configuration document.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text).map_err(ConfigError::Malformed)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would stall the loop or break the scale engine.
    /// Invalid ranges are rejected, not silently clamped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.wifi_poll_interval_ms == 0
            || self.sensor_poll_interval_ms == 0
            || self.broker_poll_interval_ms == 0
        {
            return Err(ConfigError::ValidationFailed("poll intervals must be > 0"));
        }
        if self.sensor_sample_interval_ms == 0 {
            return Err(ConfigError::ValidationFailed("sensor_sample_interval_ms must be > 0"));
        }
        if self.temperature_delta_c < 0.0
            || self.humidity_delta_pct < 0.0
            || self.pressure_delta_hpa < 0.0
        {
            return Err(ConfigError::ValidationFailed("significance thresholds must be >= 0"));
        }
        if self.bar_min_px > self.bar_max_px {
            return Err(ConfigError::ValidationFailed("bar_min_px must be <= bar_max_px"));
        }
        if self.scale_buffer.is_nan() || self.scale_buffer < 0.0 {
            return Err(ConfigError::ValidationFailed("scale_buffer must be >= 0"));
        }
        if self.broker_host.is_empty() {
            return Err(ConfigError::ValidationFailed("broker_host must not be empty"));
        }
        Ok(())
    }
}
