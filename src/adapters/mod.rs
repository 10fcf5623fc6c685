//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter       | Implements                       | Connects to               |
//! |---------------|----------------------------------|---------------------------|
//! | `hardware`    | LinkPort, EnvSensorPort,         | one adapter per service   |
//! |               | BrokerPort                       |                           |
//! | `console`     | RenderPort, IndicatorPort        | log output (LCD stand-in) |
//! | `log_sink`    | EventSink                        | log output                |
//! | `mqtt`        | BrokerPort                       | rumqttc sync client       |
//! | `record_sink` | RecordSink                       | JSON-lines file           |
//! | `sim`         | LinkPort, EnvSensorPort          | host simulation           |
//! | `time`        | ClockPort                        | `Instant` + `time` crate  |
//!
//! The BME280 driver in [`crate::drivers::bme280`] implements
//! `EnvSensorPort` directly over an `embedded-hal` I²C bus.

pub mod console;
pub mod hardware;
pub mod log_sink;
#[cfg(feature = "mqtt")]
pub mod mqtt;
pub mod record_sink;
pub mod sim;
pub mod time;
