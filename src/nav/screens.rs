//! Screen table and per-screen view builders.
//!
//! Each screen is one row of plain data plus a `fn` pointer that builds
//! its body. Transitions live in the table, not in per-screen logic.
//!
//! ```text
//!            A          B          C
//!  Status    Home       Home       Home       (locked until all services OK)
//!  Home      Forecast   History    Settings
//!  Forecast  Home       History    Settings
//!  History   Home       Forecast   Settings
//!  Settings  Home       Forecast   History
//!  Alert     ─          dismiss    ─
//! ```

use crate::health::{Service, ServiceState};
use crate::scale::{HUMIDITY_PALETTE, Quantity, Rgb, TEMPERATURE_PALETTE, rgb};
use crate::telemetry::AlertLevel;

use super::view::{
    BLACK, BarPair, DayColumn, GREEN, GREY, RED, ViewBody, ViewContext, WHITE, YELLOW,
};
use super::{Button, DataDeps, ScreenDescriptor, ScreenId, Transition};

use Transition::{Dismiss, Go, Inert};

// ═══════════════════════════════════════════════════════════════════════════
//  Table builder
// ═══════════════════════════════════════════════════════════════════════════

/// Build the static screen table. Called once at startup.
pub fn build_screen_table() -> [ScreenDescriptor; ScreenId::COUNT] {
    [
        // Index 0 — Status
        ScreenDescriptor {
            id: ScreenId::Status,
            name: "Status",
            buttons: [Go(ScreenId::Home), Go(ScreenId::Home), Go(ScreenId::Home)],
            gated: true,
            deps: DataDeps::HEALTH,
            build: status_view,
        },
        // Index 1 — Home
        ScreenDescriptor {
            id: ScreenId::Home,
            name: "Home",
            buttons: [Go(ScreenId::Forecast), Go(ScreenId::History), Go(ScreenId::Settings)],
            gated: false,
            deps: DataDeps::SENSOR.union(DataDeps::WEATHER).union(DataDeps::SETTINGS),
            build: home_view,
        },
        // Index 2 — Forecast
        ScreenDescriptor {
            id: ScreenId::Forecast,
            name: "Forecast",
            buttons: [Go(ScreenId::Home), Go(ScreenId::History), Go(ScreenId::Settings)],
            gated: false,
            deps: DataDeps::FORECAST.union(DataDeps::SETTINGS),
            build: forecast_view,
        },
        // Index 3 — History
        ScreenDescriptor {
            id: ScreenId::History,
            name: "History",
            buttons: [Go(ScreenId::Home), Go(ScreenId::Forecast), Go(ScreenId::Settings)],
            gated: false,
            deps: DataDeps::HISTORY.union(DataDeps::SETTINGS),
            build: history_view,
        },
        // Index 4 — Settings
        ScreenDescriptor {
            id: ScreenId::Settings,
            name: "Settings",
            buttons: [Go(ScreenId::Home), Go(ScreenId::Forecast), Go(ScreenId::History)],
            gated: false,
            deps: DataDeps::SETTINGS.union(DataDeps::HEALTH),
            build: settings_view,
        },
        // Index 5 — Alert
        ScreenDescriptor {
            id: ScreenId::Alert,
            name: "Alert",
            buttons: [Inert, Dismiss, Inert],
            gated: false,
            deps: DataDeps::ALERT,
            build: alert_view,
        },
    ]
}

/// Button that toggles the temperature unit on double press.
pub const UNIT_TOGGLE_BUTTON: Button = Button::C;

// ═══════════════════════════════════════════════════════════════════════════
//  Status
// ═══════════════════════════════════════════════════════════════════════════

fn status_colour(state: ServiceState) -> Rgb {
    match state {
        ServiceState::Connected => GREEN,
        ServiceState::Connecting => YELLOW,
        _ => RED,
    }
}

fn service_line(ctx: &ViewContext<'_>, service: Service) -> String {
    format!("{}: {}", service.label(), ctx.health.state(service).label())
}

fn status_view(ctx: &ViewContext<'_>) -> ViewBody {
    Service::ALL.iter().fold(ViewBody::titled("System Status"), |body, &s| {
        body.line(service_line(ctx, s), status_colour(ctx.health.state(s)))
    })
}

// ═══════════════════════════════════════════════════════════════════════════
//  Home
// ═══════════════════════════════════════════════════════════════════════════

fn home_view(ctx: &ViewContext<'_>) -> ViewBody {
    let current = ctx.store.current();
    let temp = ctx.unit.format(current.map(|r| r.temperature_c));
    let humidity = current.map_or_else(|| "--".to_owned(), |r| format!("{:.1}", r.humidity_pct));
    let pressure = current.map_or_else(|| "--".to_owned(), |r| format!("{:.1}", r.pressure_hpa));

    let mut body = ViewBody::titled("Home Screen")
        .line(format!("Temp: {temp}"), WHITE)
        .line(format!("Humidity: {humidity}%"), WHITE)
        .line(format!("Pressure: {pressure}hPa"), WHITE);

    match ctx.store.weather() {
        Some(w) => {
            body = body
                .line(format!("O: {}, {}", ctx.unit.format(Some(w.current_temp)), w.condition), WHITE)
                .line(format!("Wind: {} m/s, {}", w.wind_speed, w.wind_direction), WHITE);
            body.icon = Some(w.icon);
        }
        None => {
            body = body
                .line(format!("O: {}, --", ctx.unit.format(None)), WHITE)
                .line("Wind: -- m/s, --", WHITE);
            body.icon = None;
        }
    }
    body
}

// ═══════════════════════════════════════════════════════════════════════════
//  Forecast
// ═══════════════════════════════════════════════════════════════════════════

fn forecast_view(ctx: &ViewContext<'_>) -> ViewBody {
    let mut body = ViewBody::titled("5-Day Forecast");
    body.header_aside = ctx.unit.symbol().to_owned();
    body.columns = ctx
        .store
        .forecast()
        .slots()
        .iter()
        .enumerate()
        .filter_map(|(slot, day)| day.as_ref().map(|d| (slot, d)))
        .map(|(slot, d)| DayColumn {
            slot,
            day: d.day.to_string(),
            date: d.short_date().to_owned(),
            icon: d.icon,
            temperature: format!("{:.1}", ctx.unit.convert(d.temperature_c)),
            humidity: humidity_text(d.humidity_pct),
            bars: None,
        })
        .collect();
    body
}

// ═══════════════════════════════════════════════════════════════════════════
//  History
// ═══════════════════════════════════════════════════════════════════════════

fn history_view(ctx: &ViewContext<'_>) -> ViewBody {
    let history = ctx.store.history();
    let temps = history.temperatures();
    let hums = history.humidities();

    let mut body = ViewBody::titled("Past 5 Days");
    body.header_aside = format!("{} %", ctx.unit.symbol());
    body.columns = history
        .slots()
        .iter()
        .enumerate()
        .filter_map(|(slot, day)| day.as_ref().map(|d| (slot, d)))
        .map(|(slot, d)| {
            // Scales are always computed in Celsius.
            let humidity = d.humidity_pct.unwrap_or(0.0);
            let bars = BarPair {
                temperature_px: ctx.scale.bar_height_for(
                    d.temperature_c,
                    &temps,
                    Quantity::Temperature,
                    ctx.bar_min_px,
                    ctx.bar_max_px,
                ),
                temperature_colour: ctx.scale.color_for(
                    d.temperature_c,
                    &temps,
                    Quantity::Temperature,
                    TEMPERATURE_PALETTE,
                ),
                humidity_px: ctx.scale.bar_height_for(
                    humidity,
                    &hums,
                    Quantity::Humidity,
                    ctx.bar_min_px,
                    ctx.bar_max_px,
                ),
                humidity_colour: ctx.scale.color_for(humidity, &hums, Quantity::Humidity, HUMIDITY_PALETTE),
            };
            DayColumn {
                slot,
                day: d.day.to_string(),
                date: d.short_date().to_owned(),
                icon: None,
                temperature: format!("{:.1}°", ctx.unit.convert(d.temperature_c)),
                humidity: humidity_text(d.humidity_pct),
                bars: Some(bars),
            }
        })
        .collect();
    body
}

fn humidity_text(humidity: Option<f32>) -> String {
    humidity.map_or_else(|| "--%".to_owned(), |h| format!("{h:.0}%"))
}

// ═══════════════════════════════════════════════════════════════════════════
//  Settings
// ═══════════════════════════════════════════════════════════════════════════

fn settings_view(ctx: &ViewContext<'_>) -> ViewBody {
    let body = ViewBody::titled("Settings")
        .line(format!("Temperature Unit: {}", ctx.unit.symbol()), WHITE)
        .line("Double-tap C to change unit", GREY);
    Service::ALL
        .iter()
        .fold(body, |body, &s| body.line(service_line(ctx, s), GREY))
}

// ═══════════════════════════════════════════════════════════════════════════
//  Alert
// ═══════════════════════════════════════════════════════════════════════════

const WRAP_AT: usize = 40;
const SECOND_LINE_MAX: usize = 35;
const SECOND_LINE_KEEP: usize = 32;

/// Background and text colour per alert level.
pub fn alert_colours(level: AlertLevel) -> (Rgb, Rgb) {
    match level {
        AlertLevel::Emergency => (rgb(0x8B0000), WHITE),
        AlertLevel::Warning => (rgb(0xB8860B), BLACK),
        AlertLevel::Info => (rgb(0x000080), WHITE),
    }
}

/// Split a message into at most two display lines.
pub fn wrap_alert_message(message: &str) -> Vec<String> {
    let chars: Vec<char> = message.chars().collect();
    if chars.len() <= WRAP_AT {
        return vec![message.to_owned()];
    }
    let first: String = chars[..WRAP_AT].iter().collect();
    let rest = &chars[WRAP_AT..];
    let second: String = if rest.len() > SECOND_LINE_MAX {
        let mut s: String = rest[..SECOND_LINE_KEEP].iter().collect();
        s.push_str("...");
        s
    } else {
        rest.iter().collect()
    };
    vec![first, second]
}

fn alert_view(ctx: &ViewContext<'_>) -> ViewBody {
    let Some(alert) = ctx.store.alert() else {
        return ViewBody::titled("Weather Alert").line("No active alerts", WHITE);
    };

    let (background, text) = alert_colours(alert.level);
    let mut body = ViewBody::titled(format!("Alert - {}", alert.level.as_str().to_uppercase()));
    body.background = background;
    for line in wrap_alert_message(&alert.message) {
        body = body.line(line, text);
    }
    if !alert.timestamp.is_empty() {
        body = body.line(format!("Time: {}", alert.timestamp), text);
    }
    body.line("Press B to dismiss", text)
}
