//! Adaptive colour and bar scaling for the history charts.
//!
//! The scale is derived from the populated history slots, padded by a
//! buffer on each side, so the last five days always use the full colour
//! ramp and bar height regardless of absolute magnitude.
//!
//! ```text
//!   series [20, 22, 24]  ──▶  range [17, 27]
//!
//!   value ≤ 17 ──▶ palette.low / min_px
//!   value ≥ 27 ──▶ palette.high / max_px
//!   otherwise  ──▶ linear in (value − 17) / 10
//! ```
//!
//! A flat series (every value equal) or a zero-width range pins the ratio
//! at 0.5 for every query.
//!
//! Everything here is pure; no state survives between calls.

/// Colour as (R, G, B) tuple, each 0–255.
pub type Rgb = (u8, u8, u8);

/// Unpack `0xRRGGBB`.
pub const fn rgb(hex: u32) -> Rgb {
    (((hex >> 16) & 0xff) as u8, ((hex >> 8) & 0xff) as u8, (hex & 0xff) as u8)
}

/// Pack into `0xRRGGBB`.
pub const fn hex(colour: Rgb) -> u32 {
    ((colour.0 as u32) << 16) | ((colour.1 as u32) << 8) | colour.2 as u32
}

/// Padding added to each side of the series range.
pub const DEFAULT_BUFFER: f32 = 3.0;

/// Measured quantity; selects the fallback range and clamping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quantity {
    /// °C. Unbounded; fallback 10–40.
    Temperature,
    /// %. Clamped to 0–100; fallback 0–100.
    Humidity,
}

impl Quantity {
    fn default_range(self) -> ScaleRange {
        match self {
            Self::Temperature => ScaleRange { low: 10.0, high: 40.0 },
            Self::Humidity => ScaleRange { low: 0.0, high: 100.0 },
        }
    }
}

/// Two-stop colour ramp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub low: Rgb,
    pub high: Rgb,
}

/// Yellow-green to dark orange.
pub const TEMPERATURE_PALETTE: Palette = Palette {
    low: rgb(0x9ACD32),
    high: rgb(0xFF8C00),
};

/// Sky blue to navy.
pub const HUMIDITY_PALETTE: Palette = Palette {
    low: rgb(0x87CEEB),
    high: rgb(0x000080),
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleRange {
    pub low: f32,
    pub high: f32,
}

/// Scale parameters. Cheap to copy; carries no history of its own.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdaptiveScale {
    buffer: f32,
}

impl Default for AdaptiveScale {
    fn default() -> Self {
        Self::new(DEFAULT_BUFFER)
    }
}

impl AdaptiveScale {
    pub fn new(buffer: f32) -> Self {
        Self { buffer }
    }

    /// Padded range of `series`, or the quantity's fallback when empty.
    pub fn range_for(&self, series: &[f32], quantity: Quantity) -> ScaleRange {
        let Some((min, max)) = min_max(series) else {
            return quantity.default_range();
        };
        let mut range = ScaleRange {
            low: min - self.buffer,
            high: max + self.buffer,
        };
        if quantity == Quantity::Humidity {
            range.low = range.low.max(0.0);
            range.high = range.high.min(100.0);
        }
        range
    }

    /// Position of `value` within the scale, in `[0, 1]`.
    pub fn ratio_for(&self, value: f32, series: &[f32], quantity: Quantity) -> f32 {
        let range = self.range_for(series, quantity);
        let flat = min_max(series).is_some_and(|(min, max)| min == max);
        if flat || range.high <= range.low {
            return 0.5;
        }
        if value <= range.low {
            0.0
        } else if value >= range.high {
            1.0
        } else {
            (value - range.low) / (range.high - range.low)
        }
    }

    /// Interpolate each channel independently; channels truncate toward zero.
    pub fn color_for(&self, value: f32, series: &[f32], quantity: Quantity, palette: Palette) -> Rgb {
        let ratio = self.ratio_for(value, series, quantity);
        if ratio <= 0.0 {
            return palette.low;
        }
        if ratio >= 1.0 {
            return palette.high;
        }
        (
            lerp_channel(palette.low.0, palette.high.0, ratio),
            lerp_channel(palette.low.1, palette.high.1, ratio),
            lerp_channel(palette.low.2, palette.high.2, ratio),
        )
    }

    /// Bar height in whole pixels within `[min_px, max_px]`.
    pub fn bar_height_for(
        &self,
        value: f32,
        series: &[f32],
        quantity: Quantity,
        min_px: u16,
        max_px: u16,
    ) -> u16 {
        let ratio = self.ratio_for(value, series, quantity);
        if ratio <= 0.0 {
            return min_px;
        }
        if ratio >= 1.0 {
            return max_px;
        }
        let span = f32::from(max_px.saturating_sub(min_px));
        min_px + (span * ratio) as u16
    }
}

fn min_max(series: &[f32]) -> Option<(f32, f32)> {
    let mut iter = series.iter().copied().filter(|v| v.is_finite());
    let first = iter.next()?;
    Some(iter.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v))))
}

fn lerp_channel(low: u8, high: u8, ratio: f32) -> u8 {
    let low = f32::from(low);
    (low + (f32::from(high) - low) * ratio) as u8
}
