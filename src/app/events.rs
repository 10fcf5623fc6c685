//! Outbound application events.
//!
//! The [`AppService`](super::service::AppService) emits these through the
//! [`EventSink`](super::ports::EventSink) port. Adapters on the other
//! side decide what to do with them: log to the console, append to a
//! file, forward to a dashboard.

use crate::error::ParseError;
use crate::health::{Service, ServiceState};
use crate::nav::ScreenId;
use crate::telemetry::{AlertLevel, TelemetryReading, TemperatureUnit, WeatherChange};

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// The application service has started (carries the initial screen).
    Started(ScreenId),

    /// A supervised service changed state.
    ServiceChanged {
        service: Service,
        from: ServiceState,
        to: ServiceState,
    },

    /// The navigator moved between screens.
    ScreenChanged { from: ScreenId, to: ScreenId },

    /// A sensor sample was taken.
    SensorSample {
        reading: TelemetryReading,
        significant: bool,
    },

    /// The sensor read failed and the current reading was cleared.
    SensorLost,

    /// A weather payload replaced the snapshot.
    WeatherUpdated(WeatherChange),

    /// A new alert became active.
    AlertRaised(AlertLevel),

    /// The active alert was dismissed.
    AlertDismissed,

    /// An inbound payload failed validation and was discarded.
    MessageRejected { topic: String, error: ParseError },

    /// The display unit was toggled.
    UnitChanged(TemperatureUnit),

    /// A significant reading went out on the broker.
    RecordPublished,
}

impl AppEvent {
    /// Text persisted to the record log, or `None` for high-rate events
    /// (samples, publishes) that only go to the event sink.
    pub fn journal_line(&self) -> Option<String> {
        let line = match self {
            Self::Started(screen) => format!("START screen={:?}", screen),
            Self::ServiceChanged { service, from, to } => {
                format!("HEALTH {} {} -> {}", service.label(), from.label(), to.label())
            }
            Self::ScreenChanged { from, to } => format!("SCREEN {:?} -> {:?}", from, to),
            Self::SensorLost => "SENSOR reading lost".to_owned(),
            Self::WeatherUpdated(change) => format!(
                "WEATHER forecast_slots={} history_slots={}",
                change.forecast_slots, change.history_slots
            ),
            Self::AlertRaised(level) => format!("ALERT level={}", level.as_str()),
            Self::AlertDismissed => "ALERT dismissed".to_owned(),
            Self::MessageRejected { topic, error } => {
                format!("INGEST topic={} error={}", topic, error)
            }
            Self::UnitChanged(unit) => format!("UNIT {}", unit.symbol()),
            Self::SensorSample { .. } | Self::RecordPublished => return None,
        };
        Some(line)
    }
}
