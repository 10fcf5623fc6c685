//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the `log` facade (stderr through `env_logger` on the host). Each event
//! becomes one `TAG | key=value` line.

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the console.
#[derive(Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started(screen) => {
                info!("START | screen={:?}", screen);
            }
            AppEvent::ServiceChanged { service, from, to } => {
                info!("HEALTH | {} {} -> {}", service.label(), from.label(), to.label());
            }
            AppEvent::ScreenChanged { from, to } => {
                info!("SCREEN | {:?} -> {:?}", from, to);
            }
            AppEvent::SensorSample {
                reading,
                significant,
            } => {
                info!(
                    "SENSOR | T={:.1}\u{00b0}C | H={:.1}% | P={:.1}hPa | significant={}",
                    reading.temperature_c, reading.humidity_pct, reading.pressure_hpa, significant,
                );
            }
            AppEvent::SensorLost => {
                warn!("SENSOR | reading lost");
            }
            AppEvent::WeatherUpdated(change) => {
                info!(
                    "WEATHER | forecast_slots={} history_slots={}",
                    change.forecast_slots, change.history_slots
                );
            }
            AppEvent::AlertRaised(level) => {
                info!("ALERT | level={}", level.as_str());
            }
            AppEvent::AlertDismissed => {
                info!("ALERT | dismissed");
            }
            AppEvent::MessageRejected { topic, error } => {
                warn!("INGEST | topic={} error={}", topic, error);
            }
            AppEvent::UnitChanged(unit) => {
                info!("UNIT | {}", unit.symbol());
            }
            AppEvent::RecordPublished => {
                info!("PUBLISH | weather/sensor_data");
            }
        }
    }
}
