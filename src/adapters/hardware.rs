//! Station adapter — bundles the three service adapters behind one value.
//!
//! [`AppService`](crate::app::service::AppService) takes a single `hw`
//! argument that implements [`LinkPort`], [`EnvSensorPort`] and
//! [`BrokerPort`]. This adapter owns one concrete implementation of each
//! and forwards every call, so the binary can mix a simulated radio with
//! a real broker, or a real BME280 with a simulated broker.

use crate::app::ports::{BrokerPort, EnvSensorPort, LinkPort, RawReading};
use crate::error::{BrokerError, DeviceError, TransportError};
use crate::ingest::InboundMessage;

/// Concrete adapter that combines the service links behind port traits.
pub struct StationHardware<L, S, B> {
    pub link: L,
    pub sensor: S,
    pub broker: B,
}

impl<L, S, B> StationHardware<L, S, B> {
    pub fn new(link: L, sensor: S, broker: B) -> Self {
        Self {
            link,
            sensor,
            broker,
        }
    }
}

// ── LinkPort implementation ───────────────────────────────────

impl<L: LinkPort, S, B> LinkPort for StationHardware<L, S, B> {
    fn is_associated(&self) -> bool {
        self.link.is_associated()
    }

    fn associate(&mut self, ssid: &str, password: &str) -> Result<(), TransportError> {
        self.link.associate(ssid, password)
    }
}

// ── EnvSensorPort implementation ──────────────────────────────

impl<L, S: EnvSensorPort, B> EnvSensorPort for StationHardware<L, S, B> {
    fn acquire(&mut self) -> Result<(), DeviceError> {
        self.sensor.acquire()
    }

    fn read(&mut self) -> Result<RawReading, DeviceError> {
        self.sensor.read()
    }

    fn release(&mut self) {
        self.sensor.release();
    }

    fn is_acquired(&self) -> bool {
        self.sensor.is_acquired()
    }
}

// ── BrokerPort implementation ─────────────────────────────────

impl<L, S, B: BrokerPort> BrokerPort for StationHardware<L, S, B> {
    fn connect(&mut self) -> Result<(), BrokerError> {
        self.broker.connect()
    }

    fn subscribe(&mut self, topic: &str) -> Result<(), BrokerError> {
        self.broker.subscribe(topic)
    }

    fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), BrokerError> {
        self.broker.publish(topic, payload)
    }

    fn try_recv(&mut self) -> Result<Option<InboundMessage>, BrokerError> {
        self.broker.try_recv()
    }

    fn release(&mut self) {
        self.broker.release();
    }

    fn is_open(&self) -> bool {
        self.broker.is_open()
    }
}
