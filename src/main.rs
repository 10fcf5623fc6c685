//! wxpanel — host entry point
//!
//! Wires the simulated radio and sensor, the MQTT broker adapter and the
//! console renderer into the [`AppService`] and runs the cooperative loop.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  StationHardware    ConsoleRenderer   LogEventSink  HostClock  │
//! │  (Link+Env+Broker)  (Render+LED)      (EventSink)   (Clock)    │
//! │  JsonLinesSink      stdin buttons ──▶ InputQueue               │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              AppService (pure logic)                   │    │
//! │  │  Health · Telemetry · Scales · Navigation · Ingest     │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Usage: `wxpanel [config.json]`. Type `a`, `b` or `c` and Enter to
//! press a button; `cc` is a double press, `q` quits.
#![deny(unused_must_use)]

// ── Imports ───────────────────────────────────────────────────
use std::io::{self, BufRead, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use log::{info, warn};

use wxpanel::adapters::console::ConsoleRenderer;
use wxpanel::adapters::hardware::StationHardware;
use wxpanel::adapters::log_sink::LogEventSink;
use wxpanel::adapters::mqtt::MqttBroker;
use wxpanel::adapters::record_sink::JsonLinesSink;
use wxpanel::adapters::sim::{SimEnvSensor, SimLink};
use wxpanel::adapters::time::HostClock;
use wxpanel::app::ports::ClockPort;
use wxpanel::app::service::AppService;
use wxpanel::config::StationConfig;
use wxpanel::events::{ButtonEdge, InputQueue};
use wxpanel::nav::Button;

/// Loop period. Short enough for the 300 ms double-press window.
const TICK: Duration = Duration::from_millis(50);
/// Spacing of the synthetic second edge for a typed double press.
const DOUBLE_PRESS_GAP_MS: u64 = 120;

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    // ── 1. Logging ────────────────────────────────────────────
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("╔══════════════════════════════════════╗");
    info!("║  wxpanel v{}                        ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Load config (or defaults) ──────────────────────────
    let config = match std::env::args().nth(1) {
        Some(path) => {
            let text = std::fs::read_to_string(&path)
                .with_context(|| format!("reading config {}", path))?;
            StationConfig::from_json(&text).with_context(|| format!("loading config {}", path))?
        }
        None => {
            info!("No config file given, running with defaults");
            StationConfig::default()
        }
    };

    // ── 3. Record sink ────────────────────────────────────────
    let writer: Box<dyn Write> = match &config.record_log_path {
        Some(path) => match JsonLinesSink::open(path) {
            Ok(sink) => {
                info!("Recording significant readings to {}", path);
                Box::new(sink.into_inner())
            }
            Err(e) => {
                warn!("Record log {} unavailable ({}), records discarded", path, e);
                Box::new(io::sink())
            }
        },
        None => Box::new(io::sink()),
    };
    let mut records = JsonLinesSink::new(writer);

    // ── 4. Adapters ───────────────────────────────────────────
    let mut hw = StationHardware::new(
        SimLink::new(),
        SimEnvSensor::default(),
        MqttBroker::new(&config),
    );
    let mut panel = ConsoleRenderer::new();
    let mut sink = LogEventSink::new();
    let clock = HostClock::new();
    let inputs = Arc::new(InputQueue::new());
    let running = Arc::new(AtomicBool::new(true));

    // ── 5. Button source ──────────────────────────────────────
    spawn_stdin_buttons(clock, Arc::clone(&inputs), Arc::clone(&running))?;

    // ── 6. Application service ────────────────────────────────
    let mut app = AppService::new(config);
    app.start(&clock, &mut hw, &mut records, &mut sink);

    // ── 7. Event loop ─────────────────────────────────────────
    while running.load(Ordering::Acquire) {
        app.tick(&clock, &inputs, &mut hw, &mut panel, &mut records, &mut sink);
        thread::sleep(TICK);
    }

    info!("Shutting down after {} ticks ({} frames)", app.tick_count(), panel.frames());
    Ok(())
}

// ── Stdin buttons ─────────────────────────────────────────────
//
// Stands in for the GPIO edge interrupts: the reader thread is the
// single producer of the input queue and the loop its single consumer.

fn spawn_stdin_buttons(
    clock: HostClock,
    inputs: Arc<InputQueue>,
    running: Arc<AtomicBool>,
) -> Result<()> {
    thread::Builder::new()
        .name("stdin-buttons".into())
        .spawn(move || {
            for line in io::stdin().lock().lines() {
                let Ok(line) = line else { break };
                let cmd = line.trim().to_ascii_lowercase();
                if cmd == "q" {
                    break;
                }
                let now = clock.now_ms();
                for (i, ch) in cmd.chars().enumerate() {
                    let Some(button) = button_for(ch) else {
                        warn!("Unknown button '{}'", ch);
                        continue;
                    };
                    let edge = ButtonEdge::new(button, now + i as u64 * DOUBLE_PRESS_GAP_MS);
                    if !inputs.push(edge) {
                        warn!("Input queue full, dropped {:?}", button);
                    }
                }
            }
            running.store(false, Ordering::Release);
        })
        .context("spawning stdin reader")?;
    Ok(())
}

fn button_for(ch: char) -> Option<Button> {
    match ch {
        'a' => Some(Button::A),
        'b' => Some(Button::B),
        'c' => Some(Button::C),
        _ => None,
    }
}
