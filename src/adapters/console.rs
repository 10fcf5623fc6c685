//! Console renderer: draws view-models as log lines.
//!
//! Stands in for the LCD on the host. Each frame is logged as a header,
//! the body lines, any day columns and the footer labels; the indicator
//! colour is logged when it changes.

use log::info;

use crate::app::ports::{IndicatorPort, RenderPort};
use crate::nav::view::{DayColumn, ViewModel};
use crate::scale::hex;

#[derive(Debug, Default)]
pub struct ConsoleRenderer {
    frames: u64,
}

impl ConsoleRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Frames drawn so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

/// One text row for a forecast or history column.
pub fn column_text(col: &DayColumn) -> String {
    let mut text = format!("{} {} {} {}", col.day, col.date, col.temperature, col.humidity);
    if let Some(icon) = col.icon {
        text.push(' ');
        text.push_str(icon.key());
    }
    if let Some(bars) = col.bars {
        text.push_str(&format!(
            " [T {}px #{:06X}] [H {}px #{:06X}]",
            bars.temperature_px,
            hex(bars.temperature_colour),
            bars.humidity_px,
            hex(bars.humidity_colour),
        ));
    }
    text
}

impl RenderPort for ConsoleRenderer {
    fn render(&mut self, view: &ViewModel) {
        self.frames += 1;
        let body = &view.body;
        info!("┌─ {} {}", body.title, body.header_aside);
        if let Some(icon) = body.icon {
            info!("│ [{}]", icon.asset_name());
        }
        for line in &body.lines {
            info!("│ {}", line.text);
        }
        for col in &body.columns {
            info!("│ {}", column_text(col));
        }
        let [a, b, c] = view.footer;
        info!("└─ A:{} B:{} C:{}", a, b, c);
    }
}

impl IndicatorPort for ConsoleRenderer {
    fn set_rgb(&mut self, r: u8, g: u8, b: u8) {
        info!("LED | #{:02X}{:02X}{:02X}", r, g, b);
    }
}
