//! Integration tests for the AppService → health / store / navigator
//! pipeline, driven tick by tick against mock adapters.

use crate::mock_hw::{MockClock, MockHardware, MockPanel, MockRecords, RecordingSink};

use wxpanel::app::events::AppEvent;
use wxpanel::app::service::AppService;
use wxpanel::config::StationConfig;
use wxpanel::error::{BrokerError, DeviceError, ParseError};
use wxpanel::events::{ButtonEdge, InputQueue};
use wxpanel::health::{Service, ServiceState};
use wxpanel::ingest::{TOPIC_ALERT, TOPIC_SENSOR, TOPIC_WEATHER};
use wxpanel::nav::{Button, ScreenId};
use wxpanel::telemetry::{AlertLevel, TemperatureUnit};

const WEATHER: &str = r#"{"current_temp": 12, "condition": "Rain", "current_icon": "10n",
    "wind_speed": 4, "wind_direction": "SW", "location": "Bergen"}"#;

struct Station {
    app: AppService,
    hw: MockHardware,
    panel: MockPanel,
    records: MockRecords,
    sink: RecordingSink,
    clock: MockClock,
    inputs: InputQueue,
}

impl Station {
    fn with(config: StationConfig, hw: MockHardware) -> Self {
        let mut station = Self {
            app: AppService::new(config),
            hw,
            panel: MockPanel::default(),
            records: MockRecords::default(),
            sink: RecordingSink::default(),
            clock: MockClock::new(),
            inputs: InputQueue::new(),
        };
        station.app.start(
            &station.clock,
            &mut station.hw,
            &mut station.records,
            &mut station.sink,
        );
        station
    }

    fn healthy() -> Self {
        Self::with(configured(), MockHardware::new())
    }

    fn tick_at(&mut self, ms: u64) {
        self.clock.set(ms);
        self.app.tick(
            &self.clock,
            &self.inputs,
            &mut self.hw,
            &mut self.panel,
            &mut self.records,
            &mut self.sink,
        );
    }

    fn press(&self, button: Button, at_ms: u64) {
        assert!(self.inputs.push(ButtonEdge::new(button, at_ms)));
    }

    fn line(&self, index: usize) -> String {
        let frame = self.panel.last_frame().expect("a frame was rendered");
        frame.body.lines[index].text.clone()
    }
}

fn configured() -> StationConfig {
    StationConfig {
        wifi_ssid: "home-ap".into(),
        wifi_password: "secret-pass".into(),
        ..StationConfig::default()
    }
}

// ── Startup ───────────────────────────────────────────────────

#[test]
fn startup_sweeps_every_service_once() {
    let st = Station::healthy();

    assert_eq!(st.sink.events[0], AppEvent::Started(ScreenId::Status));
    for service in Service::ALL {
        assert!(st.sink.contains(&AppEvent::ServiceChanged {
            service,
            from: ServiceState::Disconnected,
            to: ServiceState::Connected,
        }));
    }
    assert!(st.app.health().all_ready());
    assert_eq!(st.hw.associate_calls, 1);
    assert_eq!(st.hw.connects, 1);
    assert_eq!(st.hw.subscriptions, [TOPIC_WEATHER, TOPIC_ALERT]);
    // Auto-advance happens on the loop, not during the sweep.
    assert_eq!(st.app.current_screen(), ScreenId::Status);
}

#[test]
fn first_tick_advances_home_and_renders_reading() {
    let mut st = Station::healthy();
    st.tick_at(0);

    assert_eq!(st.app.current_screen(), ScreenId::Home);
    assert!(st.sink.contains(&AppEvent::ScreenChanged {
        from: ScreenId::Status,
        to: ScreenId::Home,
    }));
    let frame = st.panel.last_frame().unwrap();
    assert_eq!(frame.screen, ScreenId::Home);
    assert_eq!(frame.footer, ["Forecast", "History", "Settings"]);
    assert_eq!(st.line(0), "Temp: 21.0°C");
    assert_eq!(st.line(1), "Humidity: 45.0%");
    assert_eq!(st.line(2), "Pressure: 1012.0hPa");
}

#[test]
fn missing_credentials_keep_station_on_status() {
    let mut st = Station::with(StationConfig::default(), MockHardware::new());

    assert_eq!(st.app.health().state(Service::Wifi), ServiceState::Failed);
    assert_eq!(st.app.health().state(Service::Broker), ServiceState::NoTransport);
    assert_eq!(st.hw.associate_calls, 0);
    assert_eq!(st.hw.connects, 0);

    st.tick_at(0);
    st.press(Button::A, 10);
    st.tick_at(10);
    assert_eq!(st.app.current_screen(), ScreenId::Status);
    assert_eq!(st.panel.last_frame().unwrap().footer, ["", "", ""]);
}

#[test]
fn startup_and_transitions_are_journaled() {
    let mut st = Station::healthy();
    assert_eq!(
        st.records.lines,
        [
            "2024-06-01T12:00:00 START screen=Status",
            "2024-06-01T12:00:00 HEALTH WiFi Disc -> OK",
            "2024-06-01T12:00:00 HEALTH ENV Disc -> OK",
            "2024-06-01T12:00:00 HEALTH MQTT Disc -> OK",
        ]
    );

    // Samples and publishes stay out of the journal.
    st.tick_at(0);
    assert_eq!(st.records.records.len(), 1);
    assert_eq!(
        st.records.lines.last().map(String::as_str),
        Some("2024-06-01T12:00:00 SCREEN Status -> Home")
    );
    let settled = st.records.lines.len();
    st.tick_at(1000);
    assert_eq!(st.records.lines.len(), settled);

    st.hw.queue(TOPIC_ALERT, r#"{"level":"info","message":"Fog"}"#);
    st.tick_at(1100);
    st.hw.queue(TOPIC_WEATHER, "not json");
    st.tick_at(1200);
    assert_eq!(
        &st.records.lines[settled..],
        [
            "2024-06-01T12:00:00 ALERT level=info",
            "2024-06-01T12:00:00 SCREEN Home -> Alert",
            "2024-06-01T12:00:00 INGEST topic=weather/data error=payload is not valid JSON",
        ]
    );
}

// ── Sensor sampling ───────────────────────────────────────────

#[test]
fn significant_reading_is_recorded_and_published() {
    let mut st = Station::healthy();
    st.tick_at(0);

    assert_eq!(st.records.records.len(), 1);
    assert_eq!(st.records.records[0].timestamp, "2024-06-01T12:00:00");
    assert_eq!(st.records.records[0].temperature, 21.0);

    let published = st.hw.published_on(TOPIC_SENSOR);
    assert_eq!(published.len(), 1);
    let doc: serde_json::Value = serde_json::from_slice(published[0]).unwrap();
    assert_eq!(doc["humidity"], 45.0);
    assert_eq!(doc["pressure"], 1012.0);
    assert!(st.sink.contains(&AppEvent::RecordPublished));
}

#[test]
fn small_drift_is_not_published_until_it_accumulates() {
    let mut st = Station::healthy();
    st.tick_at(0);

    st.hw.reading.temperature_c = 21.3;
    st.tick_at(1000);
    assert_eq!(st.records.records.len(), 1);
    assert_eq!(st.app.store().current().unwrap().temperature_c, 21.3);

    // Compared against the last significant reading, not the last sample.
    st.hw.reading.temperature_c = 21.6;
    st.tick_at(2000);
    assert_eq!(st.records.records.len(), 2);
    assert_eq!(st.hw.published_on(TOPIC_SENSOR).len(), 2);
}

#[test]
fn records_are_kept_but_not_published_without_broker() {
    let mut hw = MockHardware::new();
    hw.broker_up = false;
    let mut st = Station::with(configured(), hw);
    assert_eq!(st.app.health().state(Service::Broker), ServiceState::Failed);

    st.tick_at(0);
    assert_eq!(st.records.records.len(), 1);
    assert!(st.hw.published.is_empty());
    assert_eq!(st.app.current_screen(), ScreenId::Status);
}

#[test]
fn sensor_fault_clears_reading_and_forces_status() {
    let mut st = Station::healthy();
    st.tick_at(0);
    assert_eq!(st.app.current_screen(), ScreenId::Home);

    st.hw.read_fault = Some(DeviceError::BusError);
    st.tick_at(1000);

    assert_eq!(st.app.current_screen(), ScreenId::Status);
    assert!(st.app.store().current().is_none());
    assert!(st.app.store().baseline().is_some());
    assert!(!st.hw.acquired);
    assert!(st.sink.contains(&AppEvent::SensorLost));
    assert!(st.sink.contains(&AppEvent::ServiceChanged {
        service: Service::Sensor,
        from: ServiceState::Connected,
        to: ServiceState::Failed,
    }));
    assert_eq!(st.line(1), "ENV: Fail");

    // Next sensor poll re-acquires and the loop returns home.
    st.hw.read_fault = None;
    st.tick_at(61_000);
    assert_eq!(st.app.health().state(Service::Sensor), ServiceState::Connected);
    assert_eq!(st.app.current_screen(), ScreenId::Home);
    assert!(st.app.store().current().is_some());
}

// ── Broker traffic ────────────────────────────────────────────

#[test]
fn weather_message_updates_home() {
    let mut st = Station::healthy();
    st.tick_at(0);
    let frames = st.panel.frames.len();

    st.hw.queue(TOPIC_WEATHER, WEATHER);
    st.tick_at(100);

    assert_eq!(st.panel.frames.len(), frames + 1);
    assert_eq!(st.line(3), "O: 12.0°C, Rain");
    assert_eq!(st.line(4), "Wind: 4 m/s, SW");
    assert_eq!(st.app.store().weather().unwrap().location, "Bergen");
}

#[test]
fn one_message_per_tick() {
    let mut st = Station::healthy();
    st.tick_at(0);
    st.hw.queue(TOPIC_WEATHER, WEATHER);
    st.hw.queue(TOPIC_ALERT, r#"{"level":"info","message":"Fog"}"#);

    st.tick_at(100);
    assert_eq!(st.app.current_screen(), ScreenId::Home);
    assert_eq!(st.hw.inbound.len(), 1);

    st.tick_at(200);
    assert_eq!(st.app.current_screen(), ScreenId::Alert);
}

#[test]
fn malformed_payload_is_rejected_without_side_effects() {
    let mut st = Station::healthy();
    st.tick_at(0);
    st.hw.queue(TOPIC_WEATHER, "{\"current_temp\": ");
    st.tick_at(100);

    assert!(st.sink.contains(&AppEvent::MessageRejected {
        topic: TOPIC_WEATHER.into(),
        error: ParseError::InvalidJson,
    }));
    assert!(st.app.store().weather().is_none());
    assert_eq!(st.app.current_screen(), ScreenId::Home);
}

#[test]
fn receive_fault_fails_broker_and_reconnects_on_next_poll() {
    let mut st = Station::healthy();
    st.tick_at(0);

    st.hw.recv_fault = Some(BrokerError::ConnectionLost);
    st.tick_at(100);
    assert_eq!(st.app.health().state(Service::Broker), ServiceState::Failed);
    assert!(!st.hw.open);
    assert_eq!(st.app.current_screen(), ScreenId::Status);

    st.tick_at(60_000);
    assert_eq!(st.app.health().state(Service::Broker), ServiceState::Connected);
    assert_eq!(st.hw.connects, 2);
    assert_eq!(st.app.current_screen(), ScreenId::Home);
}

// ── Alerts and the indicator ──────────────────────────────────

#[test]
fn alert_forces_alert_screen_and_b_dismisses() {
    let mut st = Station::healthy();
    st.tick_at(0);
    assert_eq!(st.panel.last_led(), Some((0, 0, 0)));

    st.hw.queue(TOPIC_ALERT, r#"{"level":"info","message":"Fog patches"}"#);
    st.tick_at(100);
    assert_eq!(st.app.current_screen(), ScreenId::Alert);
    assert!(st.sink.contains(&AppEvent::AlertRaised(AlertLevel::Info)));
    assert_eq!(st.panel.last_led(), Some((0, 0, 255)));
    let frame = st.panel.last_frame().unwrap();
    assert_eq!(frame.body.title, "Alert - INFO");
    assert_eq!(frame.footer, ["", "Home", ""]);

    // A and C do nothing on the alert screen.
    st.press(Button::A, 150);
    st.tick_at(150);
    assert_eq!(st.app.current_screen(), ScreenId::Alert);

    st.press(Button::B, 250);
    st.tick_at(250);
    assert_eq!(st.app.current_screen(), ScreenId::Home);
    assert!(st.app.store().alert().is_none());
    assert!(st.sink.contains(&AppEvent::AlertDismissed));
    assert_eq!(st.panel.last_led(), Some((0, 0, 0)));
    assert_eq!(st.panel.last_frame().unwrap().screen, ScreenId::Home);
}

#[test]
fn emergency_alert_breathes_red() {
    let mut st = Station::healthy();
    st.tick_at(0);
    let before = st.panel.leds.len();

    st.hw.queue(TOPIC_ALERT, r#"{"level":"emergency","message":"Storm"}"#);
    st.tick_at(100);
    st.tick_at(600);
    st.tick_at(900);

    let leds = &st.panel.leds[before..];
    assert!(leds.len() >= 2);
    assert!(leds.iter().all(|&(_, g, b)| g == 0 && b == 0));
    assert!(leds.windows(2).all(|w| w[0] != w[1]));
}

// ── Buttons through the input queue ───────────────────────────

#[test]
fn c_double_press_toggles_unit_in_place() {
    let mut st = Station::healthy();
    st.tick_at(0);

    st.press(Button::C, 100);
    st.press(Button::C, 250);
    st.tick_at(300);

    assert_eq!(st.app.unit(), TemperatureUnit::Fahrenheit);
    assert_eq!(st.app.current_screen(), ScreenId::Home);
    assert!(st.sink.contains(&AppEvent::UnitChanged(TemperatureUnit::Fahrenheit)));
    assert_eq!(st.line(0), "Temp: 69.8°F");

    // Window is closed: nothing is left pending.
    st.tick_at(900);
    assert_eq!(st.app.current_screen(), ScreenId::Home);
}

#[test]
fn c_single_press_waits_for_the_window() {
    let mut st = Station::healthy();
    st.tick_at(0);

    st.press(Button::C, 100);
    st.tick_at(100);
    assert_eq!(st.app.current_screen(), ScreenId::Home);

    st.tick_at(401);
    assert_eq!(st.app.current_screen(), ScreenId::Settings);
    assert_eq!(st.app.unit(), TemperatureUnit::Celsius);
}

#[test]
fn a_and_b_navigate_immediately() {
    let mut st = Station::healthy();
    st.tick_at(0);

    st.press(Button::A, 100);
    st.tick_at(100);
    assert_eq!(st.app.current_screen(), ScreenId::Forecast);

    st.press(Button::B, 200);
    st.tick_at(200);
    assert_eq!(st.app.current_screen(), ScreenId::History);
}

#[test]
fn expired_c_window_resolves_before_later_edges() {
    let mut st = Station::healthy();
    st.tick_at(0);
    st.sink.clear();

    // C's window closes at 400, so it acts before the A pressed at 500.
    st.press(Button::C, 100);
    st.press(Button::A, 500);
    st.tick_at(500);

    let moves: Vec<_> = st
        .sink
        .events
        .iter()
        .filter_map(|e| match e {
            AppEvent::ScreenChanged { from, to } => Some((*from, *to)),
            _ => None,
        })
        .collect();
    assert_eq!(
        moves,
        [
            (ScreenId::Home, ScreenId::Settings),
            (ScreenId::Settings, ScreenId::Home),
        ]
    );
    assert_eq!(st.app.current_screen(), ScreenId::Home);
    assert_eq!(st.app.unit(), TemperatureUnit::Celsius);
}
