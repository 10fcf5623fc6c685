//! Inbound commands to the application service.
//!
//! These represent actions requested by the outside world (a host console,
//! a test harness, a remote control topic) that the
//! [`AppService`](super::service::AppService) interprets and acts upon.
//! Physical buttons arrive through the input queue instead and are turned
//! into `Press` / `DoublePress` by the gesture classifiers.

use crate::nav::Button;

/// Commands that external adapters can send into the application core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppCommand {
    /// A classified short press.
    Press(Button),

    /// A classified double press.
    DoublePress(Button),

    /// Jump to a screen by name. Unknown names are ignored.
    NavigateTo(String),

    /// Clear the active alert (same as B on the Alert screen).
    DismissAlert,

    /// Toggle the display unit C ↔ F.
    ToggleUnit,
}
