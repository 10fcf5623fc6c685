//! Broker message ingestion.
//!
//! Routes inbound `(topic, payload)` pairs to the telemetry store and
//! encodes the outbound sensor record.
//!
//! ```text
//!   weather/data          ──▶ parse_weather ──▶ TelemetryStore::ingest_weather_payload
//!   weather/alert_trigger ──▶ parse_alert   ──▶ TelemetryStore::ingest_alert
//!   anything else         ──▶ ignored
//!
//!   significant reading   ──▶ SensorRecord  ──▶ weather/sensor_data
//! ```
//!
//! Payloads come from an untrusted peer. Every parser validates the whole
//! document before returning, so callers can apply the result atomically.

use log::debug;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::ParseError;
use crate::telemetry::{
    AlertChange, AlertEvent, AlertLevel, DaySlot, IconKey, ROLL_LEN, TelemetryReading,
    TelemetryStore, WeatherChange, WeatherSnapshot,
};

// ---------------------------------------------------------------------------
// Topics
// ---------------------------------------------------------------------------

pub const TOPIC_WEATHER: &str = "weather/data";
pub const TOPIC_ALERT: &str = "weather/alert_trigger";
pub const TOPIC_SENSOR: &str = "weather/sensor_data";

/// Topics the broker client (re)subscribes to on every connect.
pub const SUBSCRIPTIONS: [&str; 2] = [TOPIC_WEATHER, TOPIC_ALERT];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topic {
    Weather,
    Alert,
}

impl Topic {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            TOPIC_WEATHER => Some(Self::Weather),
            TOPIC_ALERT => Some(Self::Alert),
            _ => None,
        }
    }
}

/// One message drained from the broker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub topic: String,
    pub payload: Vec<u8>,
}

impl InboundMessage {
    pub fn new(topic: impl Into<String>, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            topic: topic.into(),
            payload: payload.into(),
        }
    }
}

/// What a dispatched message changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ingested {
    Weather(WeatherChange),
    Alert(AlertChange),
    /// Topic not subscribed by this panel.
    Ignored,
}

/// Route a message to the store. Parse failures leave the store untouched.
pub fn dispatch(store: &mut TelemetryStore, msg: &InboundMessage) -> Result<Ingested, ParseError> {
    match Topic::parse(&msg.topic) {
        Some(Topic::Weather) => store.ingest_weather_payload(&msg.payload).map(Ingested::Weather),
        Some(Topic::Alert) => store.ingest_alert(&msg.payload).map(Ingested::Alert),
        None => {
            debug!("Ingest: ignoring message on '{}'", msg.topic);
            Ok(Ingested::Ignored)
        }
    }
}

// ---------------------------------------------------------------------------
// weather/data
// ---------------------------------------------------------------------------

/// Fully validated `weather/data` payload.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherUpdate {
    pub snapshot: WeatherSnapshot,
    /// At most [`ROLL_LEN`] entries. `None` when the payload had no forecast.
    pub forecast: Option<Vec<DaySlot>>,
    /// At most [`ROLL_LEN`] entries. `None` when the payload had no history.
    pub history: Option<Vec<DaySlot>>,
}

pub fn parse_weather(raw: &[u8]) -> Result<WeatherUpdate, ParseError> {
    let doc = parse_object(raw)?;

    let current_temp = required_number(&doc, "current_temp")?;
    let condition = required_string(&doc, "condition")?;
    let icon_code = optional_string(&doc, "current_icon")?;
    let wind_speed = required_text(&doc, "wind_speed")?;
    let wind_direction = required_text(&doc, "wind_direction")?;
    let location = required_string(&doc, "location")?;

    let forecast = optional_slots(&doc, "forecast", true)?;
    let history = optional_slots(&doc, "history", false)?;

    Ok(WeatherUpdate {
        snapshot: WeatherSnapshot {
            current_temp: current_temp as f32,
            condition: condition.to_owned(),
            icon: IconKey::from_code(icon_code),
            wind_speed,
            wind_direction,
            location: location.to_owned(),
        },
        forecast,
        history,
    })
}

// ---------------------------------------------------------------------------
// weather/alert_trigger
// ---------------------------------------------------------------------------

pub fn parse_alert(raw: &[u8]) -> Result<AlertEvent, ParseError> {
    let doc = parse_object(raw)?;

    let level = match required_string(&doc, "level")? {
        "info" => AlertLevel::Info,
        "warning" => AlertLevel::Warning,
        "emergency" => AlertLevel::Emergency,
        _ => return Err(ParseError::InvalidField("level")),
    };
    let message = required_string(&doc, "message")?.to_owned();
    let timestamp = match doc.get("timestamp") {
        None | Some(Value::Null) => String::new(),
        Some(v) => text_of(v).ok_or(ParseError::InvalidField("timestamp"))?,
    };

    Ok(AlertEvent {
        level,
        message,
        timestamp,
    })
}

// ---------------------------------------------------------------------------
// weather/sensor_data
// ---------------------------------------------------------------------------

/// Outbound measurement record. Also the JSON-lines persistence format.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensorRecord {
    pub timestamp: String,
    pub temperature: f32,
    pub humidity: f32,
    pub pressure: f32,
}

impl SensorRecord {
    pub fn from_reading(reading: &TelemetryReading, timestamp: impl Into<String>) -> Self {
        Self {
            timestamp: timestamp.into(),
            temperature: reading.temperature_c,
            humidity: reading.humidity_pct,
            pressure: reading.pressure_hpa,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

// ---------------------------------------------------------------------------
// Field helpers
// ---------------------------------------------------------------------------

fn parse_object(raw: &[u8]) -> Result<Map<String, Value>, ParseError> {
    let text = core::str::from_utf8(raw).map_err(|_| ParseError::InvalidUtf8)?;
    match serde_json::from_str::<Value>(text).map_err(|_| ParseError::InvalidJson)? {
        Value::Object(map) => Ok(map),
        _ => Err(ParseError::NotAnObject),
    }
}

fn required_number(doc: &Map<String, Value>, key: &'static str) -> Result<f64, ParseError> {
    doc.get(key)
        .ok_or(ParseError::MissingField(key))?
        .as_f64()
        .ok_or(ParseError::InvalidField(key))
}

fn required_string<'a>(doc: &'a Map<String, Value>, key: &'static str) -> Result<&'a str, ParseError> {
    doc.get(key)
        .ok_or(ParseError::MissingField(key))?
        .as_str()
        .ok_or(ParseError::InvalidField(key))
}

/// Missing or `null` reads as `""`; any other non-string is rejected.
fn optional_string<'a>(doc: &'a Map<String, Value>, key: &'static str) -> Result<&'a str, ParseError> {
    match doc.get(key) {
        None | Some(Value::Null) => Ok(""),
        Some(v) => v.as_str().ok_or(ParseError::InvalidField(key)),
    }
}

/// String or number, stored as display text.
fn required_text(doc: &Map<String, Value>, key: &'static str) -> Result<String, ParseError> {
    text_of(doc.get(key).ok_or(ParseError::MissingField(key))?).ok_or(ParseError::InvalidField(key))
}

fn text_of(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn optional_slots(
    doc: &Map<String, Value>,
    key: &'static str,
    with_icon: bool,
) -> Result<Option<Vec<DaySlot>>, ParseError> {
    let entries = match doc.get(key) {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::Array(entries)) => entries,
        Some(_) => return Err(ParseError::InvalidField(key)),
    };

    entries
        .iter()
        .take(ROLL_LEN)
        .map(|entry| {
            let obj = entry.as_object().ok_or(ParseError::InvalidField(key))?;
            day_slot(obj, key, with_icon)
        })
        .collect::<Result<Vec<_>, _>>()
        .map(Some)
}

/// Missing sub-fields take defaults; present ones must have the right type.
fn day_slot(obj: &Map<String, Value>, key: &'static str, with_icon: bool) -> Result<DaySlot, ParseError> {
    let day = slot_str(obj, "day", key)?;
    let date = slot_str(obj, "date", key)?;
    let temperature = slot_number(obj, "temp", key)?.unwrap_or(0.0);
    let humidity = slot_number(obj, "humidity", key)?;
    let icon = if with_icon {
        Some(IconKey::from_code(slot_str(obj, "icon", key)?))
    } else {
        None
    };

    Ok(DaySlot::new(day, date, temperature, humidity, icon))
}

fn slot_str<'a>(obj: &'a Map<String, Value>, name: &str, key: &'static str) -> Result<&'a str, ParseError> {
    match obj.get(name) {
        None | Some(Value::Null) => Ok(""),
        Some(v) => v.as_str().ok_or(ParseError::InvalidField(key)),
    }
}

fn slot_number(obj: &Map<String, Value>, name: &str, key: &'static str) -> Result<Option<f32>, ParseError> {
    match obj.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(v) => v.as_f64().map(|n| Some(n as f32)).ok_or(ParseError::InvalidField(key)),
    }
}
