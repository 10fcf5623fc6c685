//! Table-driven screen navigator.
//!
//! Classic embedded FSM shape: a fixed array of [`ScreenDescriptor`]s
//! indexed by [`ScreenId`], each carrying its button transitions, data
//! dependencies and a `fn` pointer that builds its view.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │  ScreenTable                                                     │
//! │  ┌──────────┬──────────────────────┬───────┬──────────┬───────┐  │
//! │  │ ScreenId │ buttons [A, B, C]    │ gated │ deps     │ build │  │
//! │  ├──────────┼──────────────────────┼───────┼──────────┼───────┤  │
//! │  │ Status   │ Home  Home  Home     │ yes   │ health   │ fn    │  │
//! │  │ Home     │ Fcst  Hist  Settings │ no    │ sensor.. │ fn    │  │
//! │  │ ...      │                      │       │          │       │  │
//! │  │ Alert    │ ─     dismiss ─      │ no    │ alert    │ fn    │  │
//! │  └──────────┴──────────────────────┴───────┴──────────┴───────┘  │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Besides button presses there are four override transitions that bypass
//! the table: forced-to-Status on a service entering Failed, forced-to-Alert
//! on a new alert, Home on dismissal, and Status → Home once every service
//! is ready.

pub mod screens;
pub mod view;

use core::ops::BitOr;

use log::{debug, info};

use crate::error::NavigationError;
use crate::health::PollOutcome;

use view::{ViewBody, ViewContext, ViewModel};

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// Enumeration of all screens.
/// Must stay in sync with the table built in [`screens::build_screen_table`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ScreenId {
    Status = 0,
    Home = 1,
    Forecast = 2,
    History = 3,
    Settings = 4,
    Alert = 5,
}

impl ScreenId {
    /// Total number of screens, used to size the table array.
    pub const COUNT: usize = 6;

    /// Convert an index back to `ScreenId`.
    pub fn from_index(idx: usize) -> Option<Self> {
        match idx {
            0 => Some(Self::Status),
            1 => Some(Self::Home),
            2 => Some(Self::Forecast),
            3 => Some(Self::History),
            4 => Some(Self::Settings),
            5 => Some(Self::Alert),
            _ => None,
        }
    }

    /// Look a screen up by its lowercase name (`"home"`, `"alert"`, ...).
    pub fn from_name(name: &str) -> Result<Self, NavigationError> {
        match name {
            "status" => Ok(Self::Status),
            "home" => Ok(Self::Home),
            "forecast" => Ok(Self::Forecast),
            "history" => Ok(Self::History),
            "settings" => Ok(Self::Settings),
            "alert" => Ok(Self::Alert),
            _ => Err(NavigationError::UnknownScreen),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Button {
    A = 0,
    B = 1,
    C = 2,
}

impl Button {
    pub const ALL: [Button; 3] = [Button::A, Button::B, Button::C];

    pub fn from_index(idx: u8) -> Option<Self> {
        match idx {
            0 => Some(Self::A),
            1 => Some(Self::B),
            2 => Some(Self::C),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Table rows
// ---------------------------------------------------------------------------

/// What one button does on one screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Go(ScreenId),
    /// Clear the active alert and return Home.
    Dismiss,
    /// Button does nothing here.
    Inert,
}

/// Bitmask of the data a screen displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DataDeps(u8);

impl DataDeps {
    pub const NONE: Self = Self(0);
    pub const SENSOR: Self = Self(1 << 0);
    pub const WEATHER: Self = Self(1 << 1);
    pub const FORECAST: Self = Self(1 << 2);
    pub const HISTORY: Self = Self(1 << 3);
    pub const HEALTH: Self = Self(1 << 4);
    pub const SETTINGS: Self = Self(1 << 5);
    pub const ALERT: Self = Self(1 << 6);

    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for DataDeps {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

/// Signature of a screen's view builder.
pub type ViewBuilderFn = fn(&ViewContext<'_>) -> ViewBody;

/// Static descriptor for a single screen.
pub struct ScreenDescriptor {
    pub id: ScreenId,
    pub name: &'static str,
    /// Indexed by `Button as usize`.
    pub buttons: [Transition; 3],
    /// Buttons are locked while the all-ready gate is closed.
    pub gated: bool,
    pub deps: DataDeps,
    pub build: ViewBuilderFn,
}

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// Result of a button press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PressOutcome {
    Navigated { from: ScreenId, to: ScreenId },
    /// The alert screen was dismissed; the caller must clear the alert.
    Dismissed { to: ScreenId },
    /// Gated screen with the gate closed.
    Locked,
    /// Button has no role on this screen.
    Ignored,
}

// ---------------------------------------------------------------------------
// Navigator
// ---------------------------------------------------------------------------

pub struct ScreenNavigator {
    /// Fixed-size table indexed by `ScreenId as usize`.
    table: [ScreenDescriptor; ScreenId::COUNT],
    current: ScreenId,
    /// Set on every transition and on relevant data changes.
    dirty: bool,
}

impl Default for ScreenNavigator {
    fn default() -> Self {
        Self::new()
    }
}

impl ScreenNavigator {
    /// Start on the Status screen with a pending first draw.
    pub fn new() -> Self {
        Self {
            table: screens::build_screen_table(),
            current: ScreenId::Status,
            dirty: true,
        }
    }

    pub fn current(&self) -> ScreenId {
        self.current
    }

    pub fn descriptor(&self, id: ScreenId) -> &ScreenDescriptor {
        &self.table[id as usize]
    }

    // ── Buttons ───────────────────────────────────────────────

    /// Apply one short press. `gate_open` is the supervisor's all-ready gate.
    pub fn press(&mut self, button: Button, gate_open: bool) -> PressOutcome {
        let row = self.descriptor(self.current);
        if row.gated && !gate_open {
            debug!("Nav: {:?} locked on {}", button, row.name);
            return PressOutcome::Locked;
        }
        match row.buttons[button as usize] {
            Transition::Go(next) => {
                let from = self.current;
                self.transition(next);
                PressOutcome::Navigated { from, to: next }
            }
            Transition::Dismiss => {
                self.transition(ScreenId::Home);
                PressOutcome::Dismissed { to: ScreenId::Home }
            }
            Transition::Inert => PressOutcome::Ignored,
        }
    }

    /// Footer labels for the current screen. Blank on a locked screen.
    pub fn footer(&self, gate_open: bool) -> [&'static str; 3] {
        let row = self.descriptor(self.current);
        if row.gated && !gate_open {
            return ["", "", ""];
        }
        row.buttons.map(|t| match t {
            Transition::Go(next) => self.descriptor(next).name,
            Transition::Dismiss => self.descriptor(ScreenId::Home).name,
            Transition::Inert => "",
        })
    }

    // ── Overrides ─────────────────────────────────────────────

    /// Jump to `next` regardless of the table. Returns the previous screen
    /// when a transition happened; re-entering the current screen redraws it.
    pub fn force(&mut self, next: ScreenId) -> Option<ScreenId> {
        if next == self.current {
            self.dirty = true;
            return None;
        }
        let from = self.current;
        self.transition(next);
        Some(from)
    }

    /// Navigate by screen name. Unknown names are ignored.
    pub fn navigate_to(&mut self, name: &str) -> Option<ScreenId> {
        match ScreenId::from_name(name) {
            Ok(id) => self.force(id),
            Err(e) => {
                debug!("Nav: ignoring '{}': {}", name, e);
                None
            }
        }
    }

    /// Surface a service that just entered Failed.
    pub fn on_health(&mut self, outcome: &PollOutcome) -> Option<ScreenId> {
        if !outcome.changed {
            return None;
        }
        if outcome.entered_failed() && self.current != ScreenId::Status {
            info!("Nav: {} failed, forcing Status", outcome.service.label());
            return self.force(ScreenId::Status);
        }
        self.invalidate(DataDeps::HEALTH);
        None
    }

    /// A new alert arrived. Already on Alert: redraw only.
    pub fn on_alert(&mut self) -> Option<ScreenId> {
        if self.current == ScreenId::Alert {
            self.dirty = true;
            return None;
        }
        self.force(ScreenId::Alert)
    }

    /// Leave Status once every service is ready.
    pub fn auto_advance(&mut self, gate_open: bool) -> Option<ScreenId> {
        if self.current == ScreenId::Status && gate_open {
            info!("Nav: all services ready");
            return self.force(ScreenId::Home);
        }
        None
    }

    // ── Rendering ─────────────────────────────────────────────

    /// Mark the current screen dirty if it shows any of `changed`.
    pub fn invalidate(&mut self, changed: DataDeps) {
        if self.descriptor(self.current).deps.intersects(changed) {
            self.dirty = true;
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Consume the dirty flag.
    pub fn take_dirty(&mut self) -> bool {
        core::mem::take(&mut self.dirty)
    }

    /// Build the full view-model for the current screen.
    pub fn view(&self, ctx: &ViewContext<'_>, gate_open: bool) -> ViewModel {
        let row = self.descriptor(self.current);
        ViewModel {
            screen: self.current,
            body: (row.build)(ctx),
            footer: self.footer(gate_open),
        }
    }

    // ── Internal ──────────────────────────────────────────────

    fn transition(&mut self, next: ScreenId) {
        info!(
            "Nav: {} -> {}",
            self.descriptor(self.current).name,
            self.descriptor(next).name
        );
        self.current = next;
        self.dirty = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health::{Service, ServiceState};

    fn on(screen: ScreenId) -> ScreenNavigator {
        let mut nav = ScreenNavigator::new();
        nav.force(screen);
        nav.take_dirty();
        nav
    }

    fn failed(service: Service) -> PollOutcome {
        PollOutcome {
            service,
            previous: ServiceState::Connected,
            state: ServiceState::Failed,
            changed: true,
        }
    }

    #[test]
    fn starts_on_status_and_dirty() {
        let nav = ScreenNavigator::new();
        assert_eq!(nav.current(), ScreenId::Status);
        assert!(nav.is_dirty());
    }

    #[test]
    fn every_target_exists_in_table() {
        let nav = ScreenNavigator::new();
        for i in 0..ScreenId::COUNT {
            let id = ScreenId::from_index(i).unwrap();
            for t in nav.descriptor(id).buttons {
                if let Transition::Go(next) = t {
                    assert_eq!(nav.descriptor(next).id, next);
                }
            }
        }
        assert_eq!(ScreenId::from_index(ScreenId::COUNT), None);
    }

    #[test]
    fn status_is_locked_until_ready() {
        let mut nav = ScreenNavigator::new();
        for b in Button::ALL {
            assert_eq!(nav.press(b, false), PressOutcome::Locked);
        }
        assert_eq!(nav.current(), ScreenId::Status);
        assert_eq!(nav.footer(false), ["", "", ""]);
        assert_eq!(nav.footer(true), ["Home", "Home", "Home"]);

        assert_eq!(
            nav.press(Button::B, true),
            PressOutcome::Navigated {
                from: ScreenId::Status,
                to: ScreenId::Home
            }
        );
    }

    #[test]
    fn table_transitions() {
        let cases = [
            (ScreenId::Home, Button::A, ScreenId::Forecast),
            (ScreenId::Home, Button::B, ScreenId::History),
            (ScreenId::Home, Button::C, ScreenId::Settings),
            (ScreenId::Forecast, Button::A, ScreenId::Home),
            (ScreenId::Forecast, Button::B, ScreenId::History),
            (ScreenId::History, Button::B, ScreenId::Forecast),
            (ScreenId::Settings, Button::C, ScreenId::History),
        ];
        for (from, button, to) in cases {
            let mut nav = on(from);
            nav.press(button, false);
            assert_eq!(nav.current(), to, "{:?} + {:?}", from, button);
            assert!(nav.is_dirty());
        }
    }

    #[test]
    fn alert_only_dismisses_with_b() {
        let mut nav = on(ScreenId::Alert);
        assert_eq!(nav.press(Button::A, true), PressOutcome::Ignored);
        assert_eq!(nav.press(Button::C, true), PressOutcome::Ignored);
        assert_eq!(nav.current(), ScreenId::Alert);
        assert_eq!(nav.footer(true), ["", "Home", ""]);

        assert_eq!(
            nav.press(Button::B, true),
            PressOutcome::Dismissed { to: ScreenId::Home }
        );
        assert_eq!(nav.current(), ScreenId::Home);
    }

    #[test]
    fn failure_forces_status_from_anywhere_else() {
        for screen in [ScreenId::Home, ScreenId::Forecast, ScreenId::Alert] {
            let mut nav = on(screen);
            assert_eq!(nav.on_health(&failed(Service::Broker)), Some(screen));
            assert_eq!(nav.current(), ScreenId::Status);
        }
        let mut nav = on(ScreenId::Status);
        assert_eq!(nav.on_health(&failed(Service::Wifi)), None);
        assert!(nav.is_dirty());
    }

    #[test]
    fn alert_arrival_does_not_renavigate_on_alert() {
        let mut nav = on(ScreenId::Forecast);
        assert_eq!(nav.on_alert(), Some(ScreenId::Forecast));
        nav.take_dirty();
        assert_eq!(nav.on_alert(), None);
        assert_eq!(nav.current(), ScreenId::Alert);
        assert!(nav.is_dirty());
    }

    #[test]
    fn auto_advance_only_from_status() {
        let mut nav = ScreenNavigator::new();
        assert_eq!(nav.auto_advance(false), None);
        assert_eq!(nav.auto_advance(true), Some(ScreenId::Status));
        assert_eq!(nav.current(), ScreenId::Home);
        assert_eq!(nav.auto_advance(true), None);
    }

    #[test]
    fn invalidate_respects_dependencies() {
        let mut nav = on(ScreenId::Forecast);
        nav.invalidate(DataDeps::SENSOR | DataDeps::HISTORY);
        assert!(!nav.is_dirty());
        nav.invalidate(DataDeps::FORECAST);
        assert!(nav.take_dirty());
        assert!(!nav.is_dirty());
    }

    #[test]
    fn unknown_screen_names_are_ignored() {
        let mut nav = on(ScreenId::Home);
        assert_eq!(nav.navigate_to("radar"), None);
        assert_eq!(nav.current(), ScreenId::Home);
        assert_eq!(nav.navigate_to("history"), Some(ScreenId::Home));
        assert_eq!(ScreenId::from_name("nope"), Err(NavigationError::UnknownScreen));
    }

    #[test]
    fn reentering_current_screen_redraws() {
        let mut nav = on(ScreenId::Home);
        assert!(!nav.is_dirty());
        assert_eq!(nav.navigate_to("home"), None);
        assert_eq!(nav.current(), ScreenId::Home);
        assert!(nav.take_dirty());

        assert_eq!(nav.navigate_to("radar"), None);
        assert!(!nav.is_dirty());
    }
}
