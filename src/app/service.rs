//! Application service — the hexagonal core.
//!
//! [`AppService`] owns the health supervisor, scheduler, telemetry store,
//! screen navigator and indicator engine. It exposes a clean,
//! hardware-agnostic API. All I/O flows through port traits injected at
//! call sites, making the entire service testable with mock adapters.
//!
//! ```text
//!    LinkPort ──▶ ┌──────────────────────────────┐ ──▶ RenderPort
//! EnvSensorPort ─▶│          AppService          │ ──▶ IndicatorPort
//!  BrokerPort ◀──▶│ Health · Store · Nav · LED   │ ──▶ RecordSink
//!  InputQueue ──▶ └──────────────────────────────┘ ──▶ EventSink
//! ```
//!
//! ## Tick order
//!
//! 1. Poll each due service (WiFi, Sensor, Broker).
//! 2. Sample the sensor when its cadence elapsed.
//! 3. Drain at most one broker message.
//! 4. Classify queued button edges and apply the gestures.
//! 5. Leave Status once every service is ready.
//! 6. Update the alert indicator.
//! 7. Render if the active screen is dirty.

use log::{debug, info, warn};

use crate::config::StationConfig;
use crate::drivers::button::{ButtonEvent, GestureClassifier};
use crate::drivers::led_patterns::{LedPatternEngine, alert_pattern};
use crate::events::InputQueue;
use crate::health::{HealthSupervisor, PollOutcome, Service, ServiceState};
use crate::ingest::{self, InboundMessage, Ingested, SensorRecord, TOPIC_SENSOR};
use crate::nav::screens::UNIT_TOGGLE_BUTTON;
use crate::nav::view::{ViewContext, ViewModel};
use crate::nav::{Button, DataDeps, PressOutcome, ScreenId, ScreenNavigator};
use crate::scale::{AdaptiveScale, Rgb};
use crate::scheduler::{PollScheduler, Task};
use crate::telemetry::{SignificanceThresholds, TelemetryReading, TelemetryStore, TemperatureUnit};

use super::commands::AppCommand;
use super::events::AppEvent;
use super::ports::{
    BrokerPort, ClockPort, EnvSensorPort, EventSink, IndicatorPort, LinkPort, RecordSink,
    RenderPort,
};

// ───────────────────────────────────────────────────────────────
// AppService
// ───────────────────────────────────────────────────────────────

/// The application service orchestrates all domain logic.
pub struct AppService {
    config: StationConfig,
    health: HealthSupervisor,
    scheduler: PollScheduler,
    store: TelemetryStore,
    nav: ScreenNavigator,
    scale: AdaptiveScale,
    unit: TemperatureUnit,
    /// Indexed by `Button as usize`.
    buttons: [GestureClassifier; 3],
    led: LedPatternEngine,
    last_rgb: Option<Rgb>,
    last_tick_ms: Option<u64>,
    tick_count: u64,
}

impl AppService {
    /// Construct the service from configuration.
    ///
    /// Does **not** touch any port — call [`start`](Self::start) next.
    pub fn new(config: StationConfig) -> Self {
        let buttons = Button::ALL.map(|b| GestureClassifier::new(b, b == UNIT_TOGGLE_BUTTON));
        Self {
            health: HealthSupervisor::new(&config),
            scheduler: PollScheduler::new(&config),
            store: TelemetryStore::new(SignificanceThresholds::from_config(&config)),
            nav: ScreenNavigator::new(),
            scale: AdaptiveScale::new(config.scale_buffer),
            unit: config.temperature_unit,
            buttons,
            led: LedPatternEngine::new(),
            last_rgb: None,
            last_tick_ms: None,
            tick_count: 0,
            config,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Announce the initial screen and sweep every service once, in
    /// WiFi, Sensor, Broker order.
    pub fn start(
        &mut self,
        clock: &impl ClockPort,
        hw: &mut (impl LinkPort + EnvSensorPort + BrokerPort),
        records: &mut impl RecordSink,
        sink: &mut impl EventSink,
    ) {
        let now_ms = clock.now_ms();
        let mut journal = Journal::new(sink);
        journal.emit(&AppEvent::Started(self.nav.current()));
        info!("AppService started on {:?}", self.nav.current());

        for (service, task) in [
            (Service::Wifi, Task::WifiPoll),
            (Service::Sensor, Task::SensorPoll),
            (Service::Broker, Task::BrokerPoll),
        ] {
            let outcome = self.health.poll(service, hw);
            self.scheduler.mark(task, now_ms);
            self.apply_health(outcome, &mut journal);
        }
        journal.flush(clock, records);
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one pass of the cooperative loop.
    ///
    /// The `hw` parameter satisfies all three service ports, and `ui`
    /// both presentation ports. This avoids double mutable borrows while
    /// keeping the port boundary explicit.
    pub fn tick(
        &mut self,
        clock: &impl ClockPort,
        inputs: &InputQueue,
        hw: &mut (impl LinkPort + EnvSensorPort + BrokerPort),
        ui: &mut (impl RenderPort + IndicatorPort),
        records: &mut impl RecordSink,
        sink: &mut impl EventSink,
    ) {
        let now_ms = clock.now_ms();
        let mut journal = Journal::new(sink);
        let sink = &mut journal;
        self.tick_count += 1;
        let delta_ms = self.last_tick_ms.map_or(0, |t| now_ms.saturating_sub(t));
        self.last_tick_ms = Some(now_ms);

        // 1 + 2. Due polls, then the sample
        for task in self.scheduler.take_due(now_ms) {
            match task {
                Task::WifiPoll => self.poll(Service::Wifi, hw, sink),
                Task::SensorPoll => self.poll(Service::Sensor, hw, sink),
                Task::BrokerPoll => self.poll(Service::Broker, hw, sink),
                Task::SensorSample => self.sample(now_ms, clock, hw, records, sink),
            }
        }

        // 3. One broker message
        self.drain_broker(hw, sink);

        // 4. Buttons, in edge order: a window that closed before this edge
        // resolves first.
        while let Some(edge) = inputs.pop() {
            self.flush_gestures(edge.at_ms, sink);
            if let Some(gesture) = self.buttons[edge.button as usize].on_edge(edge.at_ms) {
                self.apply_gesture(edge.button, gesture, sink);
            }
        }
        self.flush_gestures(now_ms, sink);

        // 5. Auto-advance
        let from = self.nav.current();
        let moved = self.nav.auto_advance(self.health.all_ready());
        self.screen_moved(from, moved, sink);

        // 6. Indicator
        self.led.set(alert_pattern(self.store.alert().map(|a| a.level)));
        let rgb = self.led.tick(delta_ms);
        if self.last_rgb != Some(rgb) {
            ui.set_rgb(rgb.0, rgb.1, rgb.2);
            self.last_rgb = Some(rgb);
        }

        // 7. Render
        if self.nav.take_dirty() {
            ui.render(&self.view());
        }

        sink.flush(clock, records);
    }

    // ── Command handling ──────────────────────────────────────

    /// Process an external command (classified gesture, console, tests).
    pub fn handle_command(&mut self, cmd: AppCommand, sink: &mut impl EventSink) {
        match cmd {
            AppCommand::Press(button) => self.press(button, sink),
            AppCommand::DoublePress(button) if button == UNIT_TOGGLE_BUTTON => {
                self.toggle_unit(sink);
            }
            AppCommand::DoublePress(button) => self.press(button, sink),
            AppCommand::NavigateTo(name) => {
                let from = self.nav.current();
                let moved = self.nav.navigate_to(&name);
                self.screen_moved(from, moved, sink);
            }
            AppCommand::DismissAlert => {
                if self.store.dismiss_alert() {
                    sink.emit(&AppEvent::AlertDismissed);
                }
                if self.nav.current() == ScreenId::Alert {
                    let moved = self.nav.force(ScreenId::Home);
                    self.screen_moved(ScreenId::Alert, moved, sink);
                }
            }
            AppCommand::ToggleUnit => self.toggle_unit(sink),
        }
    }

    /// Route one broker message into the store and react to what changed.
    pub fn handle_message(&mut self, msg: &InboundMessage, sink: &mut impl EventSink) {
        match ingest::dispatch(&mut self.store, msg) {
            Ok(Ingested::Weather(change)) => {
                self.nav
                    .invalidate(DataDeps::WEATHER | DataDeps::FORECAST | DataDeps::HISTORY);
                sink.emit(&AppEvent::WeatherUpdated(change));
            }
            Ok(Ingested::Alert(change)) => {
                sink.emit(&AppEvent::AlertRaised(change.level));
                let from = self.nav.current();
                let moved = self.nav.on_alert();
                self.screen_moved(from, moved, sink);
            }
            Ok(Ingested::Ignored) => {}
            Err(error) => {
                warn!("Ingest: rejected payload on '{}': {}", msg.topic, error);
                sink.emit(&AppEvent::MessageRejected {
                    topic: msg.topic.clone(),
                    error,
                });
            }
        }
    }

    // ── Queries ───────────────────────────────────────────────

    /// Build the view-model for the current screen.
    pub fn view(&self) -> ViewModel {
        let ctx = ViewContext {
            store: &self.store,
            health: &self.health,
            unit: self.unit,
            scale: self.scale,
            bar_min_px: self.config.bar_min_px,
            bar_max_px: self.config.bar_max_px,
        };
        self.nav.view(&ctx, self.health.all_ready())
    }

    pub fn current_screen(&self) -> ScreenId {
        self.nav.current()
    }

    pub fn health(&self) -> &HealthSupervisor {
        &self.health
    }

    pub fn store(&self) -> &TelemetryStore {
        &self.store
    }

    pub fn unit(&self) -> TemperatureUnit {
        self.unit
    }

    pub fn config(&self) -> &StationConfig {
        &self.config
    }

    /// Total loop ticks executed since startup.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    // ── Internal ──────────────────────────────────────────────

    fn poll(
        &mut self,
        service: Service,
        hw: &mut (impl LinkPort + EnvSensorPort + BrokerPort),
        sink: &mut impl EventSink,
    ) {
        let outcome = self.health.poll(service, hw);
        self.apply_health(outcome, sink);
    }

    fn apply_health(&mut self, outcome: PollOutcome, sink: &mut impl EventSink) {
        if outcome.changed {
            sink.emit(&AppEvent::ServiceChanged {
                service: outcome.service,
                from: outcome.previous,
                to: outcome.state,
            });
        }
        let from = self.nav.current();
        let moved = self.nav.on_health(&outcome);
        self.screen_moved(from, moved, sink);
    }

    fn sample(
        &mut self,
        now_ms: u64,
        clock: &impl ClockPort,
        hw: &mut (impl EnvSensorPort + BrokerPort),
        records: &mut impl RecordSink,
        sink: &mut impl EventSink,
    ) {
        if self.health.state(Service::Sensor) != ServiceState::Connected {
            // No handle: show unknown rather than a stale value.
            if self.store.current().is_some() {
                self.store.clear_sensor_reading();
                self.nav.invalidate(DataDeps::SENSOR);
                sink.emit(&AppEvent::SensorLost);
            }
            return;
        }

        match hw.read() {
            Ok(raw) => {
                let reading = TelemetryReading {
                    temperature_c: raw.temperature_c,
                    humidity_pct: raw.humidity_pct,
                    pressure_hpa: raw.pressure_hpa,
                    timestamp_ms: now_ms,
                };
                let update = self.store.ingest_sensor_reading(reading);
                self.nav.invalidate(DataDeps::SENSOR);
                sink.emit(&AppEvent::SensorSample {
                    reading,
                    significant: update.significant,
                });
                if update.significant {
                    self.record(&reading, clock, hw, records, sink);
                }
            }
            Err(e) => {
                self.store.clear_sensor_reading();
                self.nav.invalidate(DataDeps::SENSOR);
                sink.emit(&AppEvent::SensorLost);
                let outcome = self.health.report_sensor_fault(hw, e);
                self.apply_health(outcome, sink);
            }
        }
    }

    /// Persist a significant reading and publish it when the broker is up.
    fn record(
        &mut self,
        reading: &TelemetryReading,
        clock: &impl ClockPort,
        hw: &mut impl BrokerPort,
        records: &mut impl RecordSink,
        sink: &mut impl EventSink,
    ) {
        let record = SensorRecord::from_reading(reading, clock.timestamp());
        if let Err(e) = records.persist_record(&record) {
            warn!("Record: persist failed: {}", e);
        }

        if self.health.state(Service::Broker) != ServiceState::Connected {
            debug!("Record: broker not connected, skipping publish");
            return;
        }
        let json = match record.to_json() {
            Ok(json) => json,
            Err(e) => {
                warn!("Record: encode failed: {}", e);
                return;
            }
        };
        match hw.publish(TOPIC_SENSOR, json.as_bytes()) {
            Ok(()) => sink.emit(&AppEvent::RecordPublished),
            Err(e) => warn!("Record: publish failed: {}", e),
        }
    }

    fn drain_broker(&mut self, hw: &mut impl BrokerPort, sink: &mut impl EventSink) {
        if self.health.state(Service::Broker) != ServiceState::Connected {
            return;
        }
        match hw.try_recv() {
            Ok(Some(msg)) => self.handle_message(&msg, sink),
            Ok(None) => {}
            Err(e) => {
                let outcome = self.health.report_broker_fault(hw, e);
                self.apply_health(outcome, sink);
            }
        }
    }

    fn flush_gestures(&mut self, now_ms: u64, sink: &mut impl EventSink) {
        for button in Button::ALL {
            if let Some(gesture) = self.buttons[button as usize].tick(now_ms) {
                self.apply_gesture(button, gesture, sink);
            }
        }
    }

    fn apply_gesture(&mut self, button: Button, gesture: ButtonEvent, sink: &mut impl EventSink) {
        let cmd = match gesture {
            ButtonEvent::ShortPress => AppCommand::Press(button),
            ButtonEvent::DoublePress => AppCommand::DoublePress(button),
        };
        self.handle_command(cmd, sink);
    }

    fn press(&mut self, button: Button, sink: &mut impl EventSink) {
        match self.nav.press(button, self.health.all_ready()) {
            PressOutcome::Navigated { from, to } => {
                sink.emit(&AppEvent::ScreenChanged { from, to });
            }
            PressOutcome::Dismissed { to } => {
                self.store.dismiss_alert();
                sink.emit(&AppEvent::AlertDismissed);
                sink.emit(&AppEvent::ScreenChanged {
                    from: ScreenId::Alert,
                    to,
                });
            }
            PressOutcome::Locked | PressOutcome::Ignored => {
                debug!("Button {:?} had no effect", button);
            }
        }
    }

    fn toggle_unit(&mut self, sink: &mut impl EventSink) {
        self.unit = self.unit.toggled();
        self.nav.invalidate(DataDeps::SETTINGS);
        info!("Temperature unit now {}", self.unit.symbol());
        sink.emit(&AppEvent::UnitChanged(self.unit));
    }

    fn screen_moved(&self, from: ScreenId, moved: Option<ScreenId>, sink: &mut impl EventSink) {
        if moved.is_some() {
            sink.emit(&AppEvent::ScreenChanged {
                from,
                to: self.nav.current(),
            });
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Journal
// ───────────────────────────────────────────────────────────────

/// Forwards every event and keeps the journal lines for the record sink.
struct Journal<'a, S> {
    sink: &'a mut S,
    lines: Vec<String>,
}

impl<'a, S: EventSink> Journal<'a, S> {
    fn new(sink: &'a mut S) -> Self {
        Self {
            sink,
            lines: Vec::new(),
        }
    }

    /// Persist pending lines, stamped with the wall clock.
    fn flush(&mut self, clock: &impl ClockPort, records: &mut impl RecordSink) {
        if self.lines.is_empty() {
            return;
        }
        let stamp = clock.timestamp();
        for line in self.lines.drain(..) {
            if let Err(e) = records.persist_line(&format!("{} {}", stamp, line)) {
                warn!("Record: journal write failed: {}", e);
            }
        }
    }
}

impl<S: EventSink> EventSink for Journal<'_, S> {
    fn emit(&mut self, event: &AppEvent) {
        if let Some(line) = event.journal_line() {
            self.lines.push(line);
        }
        self.sink.emit(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Events(Vec<AppEvent>);

    impl EventSink for Events {
        fn emit(&mut self, event: &AppEvent) {
            self.0.push(event.clone());
        }
    }

    #[test]
    fn unit_toggle_never_navigates() {
        let mut app = AppService::new(StationConfig::default());
        let mut events = Events::default();
        app.handle_command(AppCommand::DoublePress(Button::C), &mut events);
        assert_eq!(app.unit(), TemperatureUnit::Fahrenheit);
        assert_eq!(app.current_screen(), ScreenId::Status);
        assert_eq!(events.0, [AppEvent::UnitChanged(TemperatureUnit::Fahrenheit)]);

        app.handle_command(AppCommand::ToggleUnit, &mut events);
        assert_eq!(app.unit(), TemperatureUnit::Celsius);
    }

    #[test]
    fn presses_on_locked_status_are_silent() {
        let mut app = AppService::new(StationConfig::default());
        let mut events = Events::default();
        for b in Button::ALL {
            app.handle_command(AppCommand::Press(b), &mut events);
        }
        assert!(events.0.is_empty());
        assert_eq!(app.view().footer, ["", "", ""]);
    }

    #[test]
    fn alert_message_forces_alert_and_b_dismisses() {
        let mut app = AppService::new(StationConfig::default());
        let mut events = Events::default();
        let msg = InboundMessage::new("weather/alert_trigger", r#"{"level":"info","message":"Fog"}"#);
        app.handle_message(&msg, &mut events);
        assert_eq!(app.current_screen(), ScreenId::Alert);

        app.handle_command(AppCommand::Press(Button::B), &mut events);
        assert_eq!(app.current_screen(), ScreenId::Home);
        assert!(app.store().alert().is_none());
        assert!(events.0.contains(&AppEvent::AlertDismissed));
    }

    #[test]
    fn rejected_payload_is_reported() {
        let mut app = AppService::new(StationConfig::default());
        let mut events = Events::default();
        app.handle_message(&InboundMessage::new("weather/data", "not json"), &mut events);
        assert_eq!(
            events.0,
            [AppEvent::MessageRejected {
                topic: "weather/data".into(),
                error: crate::error::ParseError::InvalidJson,
            }]
        );
        assert!(app.store().weather().is_none());
    }

    #[test]
    fn unknown_screen_name_is_ignored() {
        let mut app = AppService::new(StationConfig::default());
        let mut events = Events::default();
        app.handle_command(AppCommand::NavigateTo("radar".into()), &mut events);
        assert_eq!(app.current_screen(), ScreenId::Status);
        app.handle_command(AppCommand::NavigateTo("settings".into()), &mut events);
        assert_eq!(app.current_screen(), ScreenId::Settings);
    }
}
