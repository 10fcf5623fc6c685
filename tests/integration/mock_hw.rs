//! Mock adapters for integration tests.
//!
//! Every port call is recorded so tests can assert on the full history
//! (publishes, subscriptions, rendered frames, LED colours) without a
//! radio, a sensor or a broker.

use std::cell::Cell;
use std::collections::VecDeque;

use wxpanel::app::events::AppEvent;
use wxpanel::app::ports::{
    BrokerPort, ClockPort, EnvSensorPort, EventSink, IndicatorPort, LinkPort, RawReading,
    RecordSink, RenderPort, SinkError,
};
use wxpanel::error::{BrokerError, DeviceError, TransportError};
use wxpanel::ingest::{InboundMessage, SensorRecord};
use wxpanel::nav::view::ViewModel;

// ── MockHardware ──────────────────────────────────────────────

pub struct MockHardware {
    // WiFi
    pub associated: bool,
    pub association_ok: bool,
    pub associate_calls: u32,

    // Sensor
    pub sensor_present: bool,
    pub acquired: bool,
    pub reading: RawReading,
    pub read_fault: Option<DeviceError>,

    // Broker
    pub broker_up: bool,
    pub open: bool,
    pub connects: u32,
    pub subscriptions: Vec<String>,
    pub published: Vec<(String, Vec<u8>)>,
    pub inbound: VecDeque<InboundMessage>,
    pub recv_fault: Option<BrokerError>,
}

#[allow(dead_code)]
impl MockHardware {
    /// Everything reachable and healthy.
    pub fn new() -> Self {
        Self {
            associated: false,
            association_ok: true,
            associate_calls: 0,
            sensor_present: true,
            acquired: false,
            reading: RawReading {
                temperature_c: 21.0,
                humidity_pct: 45.0,
                pressure_hpa: 1012.0,
            },
            read_fault: None,
            broker_up: true,
            open: false,
            connects: 0,
            subscriptions: Vec::new(),
            published: Vec::new(),
            inbound: VecDeque::new(),
            recv_fault: None,
        }
    }

    pub fn queue(&mut self, topic: &str, payload: &str) {
        self.inbound.push_back(InboundMessage::new(topic, payload));
    }

    pub fn published_on(&self, topic: &str) -> Vec<&[u8]> {
        self.published
            .iter()
            .filter(|(t, _)| t == topic)
            .map(|(_, p)| p.as_slice())
            .collect()
    }
}

impl Default for MockHardware {
    fn default() -> Self {
        Self::new()
    }
}

impl LinkPort for MockHardware {
    fn is_associated(&self) -> bool {
        self.associated
    }

    fn associate(&mut self, _ssid: &str, _password: &str) -> Result<(), TransportError> {
        self.associate_calls += 1;
        if self.association_ok {
            self.associated = true;
            Ok(())
        } else {
            Err(TransportError::AssociationFailed)
        }
    }
}

impl EnvSensorPort for MockHardware {
    fn acquire(&mut self) -> Result<(), DeviceError> {
        if !self.sensor_present {
            return Err(DeviceError::NotFound);
        }
        self.acquired = true;
        Ok(())
    }

    fn read(&mut self) -> Result<RawReading, DeviceError> {
        if !self.acquired {
            return Err(DeviceError::NotAcquired);
        }
        match self.read_fault {
            Some(e) => Err(e),
            None => Ok(self.reading),
        }
    }

    fn release(&mut self) {
        self.acquired = false;
    }

    fn is_acquired(&self) -> bool {
        self.acquired
    }
}

impl BrokerPort for MockHardware {
    fn connect(&mut self) -> Result<(), BrokerError> {
        self.connects += 1;
        if !self.broker_up {
            return Err(BrokerError::ConnectFailed);
        }
        self.open = true;
        Ok(())
    }

    fn subscribe(&mut self, topic: &str) -> Result<(), BrokerError> {
        if !self.open {
            return Err(BrokerError::NotConnected);
        }
        self.subscriptions.push(topic.to_owned());
        Ok(())
    }

    fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), BrokerError> {
        if !self.open {
            return Err(BrokerError::NotConnected);
        }
        self.published.push((topic.to_owned(), payload.to_vec()));
        Ok(())
    }

    fn try_recv(&mut self) -> Result<Option<InboundMessage>, BrokerError> {
        if !self.open {
            return Err(BrokerError::NotConnected);
        }
        if let Some(e) = self.recv_fault.take() {
            return Err(e);
        }
        Ok(self.inbound.pop_front())
    }

    fn release(&mut self) {
        self.open = false;
    }

    fn is_open(&self) -> bool {
        self.open
    }
}

// ── MockPanel (display + LED) ─────────────────────────────────

#[derive(Default)]
pub struct MockPanel {
    pub frames: Vec<ViewModel>,
    pub leds: Vec<(u8, u8, u8)>,
}

#[allow(dead_code)]
impl MockPanel {
    pub fn last_frame(&self) -> Option<&ViewModel> {
        self.frames.last()
    }

    pub fn last_led(&self) -> Option<(u8, u8, u8)> {
        self.leds.last().copied()
    }
}

impl RenderPort for MockPanel {
    fn render(&mut self, view: &ViewModel) {
        self.frames.push(view.clone());
    }
}

impl IndicatorPort for MockPanel {
    fn set_rgb(&mut self, r: u8, g: u8, b: u8) {
        self.leds.push((r, g, b));
    }
}

// ── MockRecords ───────────────────────────────────────────────

#[derive(Default)]
pub struct MockRecords {
    pub records: Vec<SensorRecord>,
    pub lines: Vec<String>,
}

impl RecordSink for MockRecords {
    fn persist_line(&mut self, line: &str) -> Result<(), SinkError> {
        self.lines.push(line.to_owned());
        Ok(())
    }

    fn persist_record(&mut self, record: &SensorRecord) -> Result<(), SinkError> {
        self.records.push(record.clone());
        Ok(())
    }
}

// ── RecordingSink ─────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn contains(&self, event: &AppEvent) -> bool {
        self.events.contains(event)
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

// ── MockClock ─────────────────────────────────────────────────

pub struct MockClock {
    now: Cell<u64>,
    pub wall: Option<String>,
}

#[allow(dead_code)]
impl MockClock {
    pub fn new() -> Self {
        Self {
            now: Cell::new(0),
            wall: Some("2024-06-01T12:00:00".into()),
        }
    }

    pub fn set(&self, ms: u64) {
        self.now.set(ms);
    }

    pub fn advance(&self, ms: u64) {
        self.now.set(self.now.get() + ms);
    }
}

impl Default for MockClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ClockPort for MockClock {
    fn now_ms(&self) -> u64 {
        self.now.get()
    }

    fn wall_clock(&self) -> Option<String> {
        self.wall.clone()
    }
}
