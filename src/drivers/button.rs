//! Button gesture classifier with short and double press detection.
//!
//! ## Hardware
//!
//! Active-low momentary switches with external pull-ups. Each GPIO fires
//! on falling edge and the ISR pushes a [`ButtonEdge`](crate::events::ButtonEdge)
//! into the input queue. The main loop feeds every edge into the
//! classifier for its button and calls [`GestureClassifier::tick`] once
//! per loop iteration to flush expired double-press windows.
//!
//! ## Gesture detection
//!
//! | Button | Gesture      | Condition                          | Event          |
//! |--------|--------------|------------------------------------|----------------|
//! | A, B   | Short press  | Any accepted edge                  | `ShortPress`   |
//! | C      | Short press  | No second edge within 300ms        | `ShortPress`   |
//! | C      | Double press | Two edges within 300ms             | `DoublePress`  |
//!
//! Edges closer than the debounce interval to the previous accepted edge
//! are contact bounce and are dropped.

use crate::nav::Button;

const DEBOUNCE_MS: u64 = 50;
const DOUBLE_PRESS_WINDOW_MS: u64 = 300;

/// Button events emitted after gesture classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonEvent {
    ShortPress,
    DoublePress,
}

/// Internal state machine for gesture detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GestureState {
    Idle,
    WaitSecondPress { first_ms: u64 },
}

pub struct GestureClassifier {
    button: Button,
    /// Only buttons with a double-press role hold back their first edge.
    double_press: bool,
    state: GestureState,
    last_edge_ms: Option<u64>,
}

impl GestureClassifier {
    pub fn new(button: Button, double_press: bool) -> Self {
        Self {
            button,
            double_press,
            state: GestureState::Idle,
            last_edge_ms: None,
        }
    }

    pub fn button(&self) -> Button {
        self.button
    }

    /// Feed one edge. May return the gesture that this edge completes, or
    /// the short press of an earlier edge whose window has already closed.
    pub fn on_edge(&mut self, at_ms: u64) -> Option<ButtonEvent> {
        if self
            .last_edge_ms
            .is_some_and(|last| at_ms.saturating_sub(last) < DEBOUNCE_MS)
        {
            return None;
        }
        self.last_edge_ms = Some(at_ms);

        if !self.double_press {
            return Some(ButtonEvent::ShortPress);
        }

        match self.state {
            GestureState::Idle => {
                self.state = GestureState::WaitSecondPress { first_ms: at_ms };
                None
            }
            GestureState::WaitSecondPress { first_ms } => {
                if at_ms.saturating_sub(first_ms) <= DOUBLE_PRESS_WINDOW_MS {
                    self.state = GestureState::Idle;
                    Some(ButtonEvent::DoublePress)
                } else {
                    // Stale first press: report it and open a new window.
                    self.state = GestureState::WaitSecondPress { first_ms: at_ms };
                    Some(ButtonEvent::ShortPress)
                }
            }
        }
    }

    /// Call from the main loop at each tick.
    /// `now_ms` is the current monotonic time in milliseconds.
    pub fn tick(&mut self, now_ms: u64) -> Option<ButtonEvent> {
        match self.state {
            GestureState::WaitSecondPress { first_ms }
                if now_ms.saturating_sub(first_ms) > DOUBLE_PRESS_WINDOW_MS =>
            {
                self.state = GestureState::Idle;
                Some(ButtonEvent::ShortPress)
            }
            _ => None,
        }
    }

    /// True while a first press is waiting for a possible second one.
    pub fn is_pending(&self) -> bool {
        matches!(self.state, GestureState::WaitSecondPress { .. })
    }
}
