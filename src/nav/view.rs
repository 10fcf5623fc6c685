//! View-models handed to the render collaborator.
//!
//! A [`ViewModel`] is a complete description of one screen: text, colours,
//! icon keys and bar geometry. The renderer draws it verbatim; nothing in
//! here knows about pixels beyond bar heights.

use crate::health::HealthSupervisor;
use crate::scale::{AdaptiveScale, Rgb, rgb};
use crate::telemetry::{IconKey, TelemetryStore, TemperatureUnit};

use super::ScreenId;

pub const WHITE: Rgb = rgb(0xFFFFFF);
pub const BLACK: Rgb = rgb(0x000000);
pub const GREY: Rgb = rgb(0x888888);
pub const GREEN: Rgb = rgb(0x00FF00);
pub const YELLOW: Rgb = rgb(0xFFFF00);
pub const RED: Rgb = rgb(0xFF0000);

/// Default screen background.
pub const BACKGROUND: Rgb = rgb(0x000000);

/// One line of text.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLine {
    pub text: String,
    pub colour: Rgb,
}

impl TextLine {
    pub fn new(text: impl Into<String>, colour: Rgb) -> Self {
        Self {
            text: text.into(),
            colour,
        }
    }
}

/// One populated day on the Forecast or History screen.
#[derive(Debug, Clone, PartialEq)]
pub struct DayColumn {
    /// Slot index, 0 = today.
    pub slot: usize,
    pub day: String,
    pub date: String,
    /// Forecast only.
    pub icon: Option<IconKey>,
    pub temperature: String,
    pub humidity: String,
    /// History only.
    pub bars: Option<BarPair>,
}

/// Temperature and humidity bars for one history day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BarPair {
    pub temperature_px: u16,
    pub temperature_colour: Rgb,
    pub humidity_px: u16,
    pub humidity_colour: Rgb,
}

/// Screen-specific content produced by a builder in [`super::screens`].
#[derive(Debug, Clone, PartialEq)]
pub struct ViewBody {
    pub title: String,
    /// Extra header text (unit symbols), right-aligned.
    pub header_aside: String,
    pub background: Rgb,
    pub lines: Vec<TextLine>,
    pub icon: Option<IconKey>,
    pub columns: Vec<DayColumn>,
}

impl ViewBody {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            header_aside: String::new(),
            background: BACKGROUND,
            lines: Vec::new(),
            icon: None,
            columns: Vec::new(),
        }
    }

    pub fn line(mut self, text: impl Into<String>, colour: Rgb) -> Self {
        self.lines.push(TextLine::new(text, colour));
        self
    }
}

/// Everything the renderer needs for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewModel {
    pub screen: ScreenId,
    pub body: ViewBody,
    /// Labels above buttons A, B and C. Blank when the button does nothing.
    pub footer: [&'static str; 3],
}

/// Read-only inputs to the screen builders.
pub struct ViewContext<'a> {
    pub store: &'a TelemetryStore,
    pub health: &'a HealthSupervisor,
    pub unit: TemperatureUnit,
    pub scale: AdaptiveScale,
    pub bar_min_px: u16,
    pub bar_max_px: u16,
}
