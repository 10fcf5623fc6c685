//! Alert indicator pattern engine.
//!
//! Generates time-varying RGB values for the alert LED bar. The main loop
//! calls `tick()` each iteration with the elapsed milliseconds, and the
//! engine outputs the RGB tuple to feed into
//! [`IndicatorPort::set_rgb`](crate::app::ports::IndicatorPort::set_rgb).
//!
//! ## Alert mapping
//!
//! | Alert level | Colour | Pattern   |
//! |-------------|--------|-----------|
//! | Info        | Blue   | Solid     |
//! | Warning     | Yellow | Solid     |
//! | Emergency   | Red    | Breathing |
//! | None        | —      | Off       |

use crate::scale::Rgb;
use crate::telemetry::AlertLevel;

/// Breathing period for emergencies.
const BREATHING_PERIOD_MS: u64 = 2000;

/// Pattern identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternId {
    Solid,
    Breathing,
    Off,
}

/// A pattern request with colour and type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatternRequest {
    pub colour: Rgb,
    pub pattern: PatternId,
}

pub const COLOUR_INFO: Rgb = (0, 0, 255);
pub const COLOUR_WARNING: Rgb = (255, 255, 0);
pub const COLOUR_EMERGENCY: Rgb = (255, 0, 0);
pub const COLOUR_OFF: Rgb = (0, 0, 0);

/// Pattern for the active alert, if any.
pub fn alert_pattern(level: Option<AlertLevel>) -> PatternRequest {
    let (colour, pattern) = match level {
        Some(AlertLevel::Info) => (COLOUR_INFO, PatternId::Solid),
        Some(AlertLevel::Warning) => (COLOUR_WARNING, PatternId::Solid),
        Some(AlertLevel::Emergency) => (COLOUR_EMERGENCY, PatternId::Breathing),
        None => (COLOUR_OFF, PatternId::Off),
    };
    PatternRequest { colour, pattern }
}

/// LED pattern engine. Stack-allocated, no heap.
pub struct LedPatternEngine {
    phase_ms: u64,
    active: Option<PatternRequest>,
}

impl Default for LedPatternEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl LedPatternEngine {
    pub fn new() -> Self {
        Self {
            phase_ms: 0,
            active: None,
        }
    }

    /// Select the pattern. The phase restarts when the pattern changes.
    pub fn set(&mut self, request: PatternRequest) {
        if self.active != Some(request) {
            self.active = Some(request);
            self.phase_ms = 0;
        }
    }

    pub fn active(&self) -> Option<PatternRequest> {
        self.active
    }

    /// Advance the pattern phase and return the current RGB output.
    pub fn tick(&mut self, delta_ms: u64) -> Rgb {
        self.phase_ms = self.phase_ms.wrapping_add(delta_ms);
        match self.active {
            Some(req) => self.generate(req.colour, req.pattern),
            None => COLOUR_OFF,
        }
    }

    fn generate(&self, colour: Rgb, pattern: PatternId) -> Rgb {
        let (r, g, b) = colour;
        match pattern {
            PatternId::Solid => colour,
            PatternId::Off => COLOUR_OFF,
            PatternId::Breathing => {
                let brightness = Self::sine_brightness(self.phase_ms, BREATHING_PERIOD_MS);
                Self::scale(r, g, b, brightness)
            }
        }
    }

    /// Triangular approximation of a sine curve without libm:
    /// ramps 0→255→0 over `period_ms`.
    fn sine_brightness(phase_ms: u64, period_ms: u64) -> u8 {
        let pos = phase_ms % period_ms;
        let half = period_ms / 2;
        if pos < half {
            ((pos * 255) / half) as u8
        } else {
            (((period_ms - pos) * 255) / half) as u8
        }
    }

    fn scale(r: u8, g: u8, b: u8, brightness: u8) -> Rgb {
        let br = brightness as u16;
        (
            ((r as u16 * br) / 255) as u8,
            ((g as u16 * br) / 255) as u8,
            ((b as u16 * br) / 255) as u8,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solid_levels_return_exact_colour() {
        let mut engine = LedPatternEngine::new();
        engine.set(alert_pattern(Some(AlertLevel::Info)));
        assert_eq!(engine.tick(1000), COLOUR_INFO);
        engine.set(alert_pattern(Some(AlertLevel::Warning)));
        assert_eq!(engine.tick(1000), COLOUR_WARNING);
    }

    #[test]
    fn no_alert_is_off() {
        let mut engine = LedPatternEngine::new();
        assert_eq!(engine.tick(1000), COLOUR_OFF);
        engine.set(alert_pattern(None));
        assert_eq!(engine.tick(1000), COLOUR_OFF);
    }

    #[test]
    fn emergency_breathes() {
        let mut engine = LedPatternEngine::new();
        engine.set(alert_pattern(Some(AlertLevel::Emergency)));
        assert_eq!(engine.tick(0), COLOUR_OFF);
        assert_eq!(engine.tick(1000), COLOUR_EMERGENCY);
        assert_eq!(engine.tick(500), (127, 0, 0));
    }

    #[test]
    fn same_request_keeps_phase() {
        let mut engine = LedPatternEngine::new();
        let req = alert_pattern(Some(AlertLevel::Emergency));
        engine.set(req);
        engine.tick(1000);
        engine.set(req);
        assert_eq!(engine.tick(0), COLOUR_EMERGENCY);
    }

    #[test]
    fn brightness_ramp() {
        assert_eq!(LedPatternEngine::sine_brightness(0, 1000), 0);
        assert_eq!(LedPatternEngine::sine_brightness(500, 1000), 255);
        assert_eq!(LedPatternEngine::sine_brightness(1000, 1000), 0);
    }
}
