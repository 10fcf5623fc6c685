//! Remote weather data model: current snapshot, 5-slot rolls, icons, alerts.

use serde::{Deserialize, Serialize};

/// Number of slots in the forecast and history rolls. Index 0 = today.
pub const ROLL_LEN: usize = 5;

// ---------------------------------------------------------------------------
// Icons
// ---------------------------------------------------------------------------

/// Display icon keys. Closed set; anything unrecognised maps to
/// [`IconKey::Unknown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IconKey {
    Clear,
    NightClear,
    MostlySunny,
    Cloudy,
    NightCloudy,
    Rain,
    NightRain,
    Tstorms,
    NightTstorms,
    Snow,
    NightSnow,
    Fog,
    NightFog,
    #[default]
    Unknown,
}

impl IconKey {
    /// Map a provider condition code (`"01d"`, `"10n"`, ...) to a key.
    pub fn from_code(code: &str) -> Self {
        match code {
            "01d" => Self::Clear,
            "01n" => Self::NightClear,
            "02d" => Self::MostlySunny,
            "02n" | "03d" | "04d" => Self::Cloudy,
            "03n" | "04n" => Self::NightCloudy,
            "09d" | "10d" => Self::Rain,
            "09n" | "10n" => Self::NightRain,
            "11d" => Self::Tstorms,
            "11n" => Self::NightTstorms,
            "13d" => Self::Snow,
            "13n" => Self::NightSnow,
            "50d" => Self::Fog,
            "50n" => Self::NightFog,
            _ => Self::Unknown,
        }
    }

    /// Asset stem understood by the renderer.
    pub fn key(self) -> &'static str {
        match self {
            Self::Clear => "clear",
            Self::NightClear => "nt_clear",
            Self::MostlySunny => "mostlysunny",
            Self::Cloudy => "cloudy",
            Self::NightCloudy => "nt_cloudy",
            Self::Rain => "rain",
            Self::NightRain => "nt_rain",
            Self::Tstorms => "tstorms",
            Self::NightTstorms => "nt_tstorms",
            Self::Snow => "snow",
            Self::NightSnow => "nt_snow",
            Self::Fog => "fog",
            Self::NightFog => "nt_fog",
            Self::Unknown => "unknown",
        }
    }

    /// Image file name under the renderer's resource directory.
    pub fn asset_name(self) -> String {
        format!("{}.png", self.key())
    }

    /// Single-character stand-in when the renderer has no bitmap.
    pub fn fallback_glyph(self) -> char {
        match self {
            Self::Rain | Self::NightRain => 'R',
            Self::Clear | Self::NightClear | Self::MostlySunny => 'S',
            Self::Cloudy | Self::NightCloudy => 'C',
            _ => '?',
        }
    }
}

// ---------------------------------------------------------------------------
// Current conditions
// ---------------------------------------------------------------------------

/// Latest remote weather. Replaced wholesale on every valid payload.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherSnapshot {
    /// Outdoor temperature, °C.
    pub current_temp: f32,
    pub condition: String,
    pub icon: IconKey,
    pub wind_speed: String,
    pub wind_direction: String,
    pub location: String,
}

// ---------------------------------------------------------------------------
// Forecast / history rolls
// ---------------------------------------------------------------------------

/// One populated day in a roll.
#[derive(Debug, Clone, PartialEq)]
pub struct DaySlot {
    /// Day abbreviation, at most three characters (`"TOD"`, `"Mon"`).
    pub day: heapless::String<3>,
    /// Provider date label, shown up to the first `/`.
    pub date: String,
    /// Temperature, °C.
    pub temperature_c: f32,
    /// Relative humidity, %. `None` when the provider omitted it.
    pub humidity_pct: Option<f32>,
    /// Forecast icon. Always `None` for history slots.
    pub icon: Option<IconKey>,
}

impl DaySlot {
    /// Build a slot, truncating `day` to three characters.
    pub fn new(
        day: &str,
        date: &str,
        temperature_c: f32,
        humidity_pct: Option<f32>,
        icon: Option<IconKey>,
    ) -> Self {
        let mut label = heapless::String::new();
        for c in day.chars().take(3) {
            if label.push(c).is_err() {
                break;
            }
        }
        Self {
            day: label,
            date: date.to_owned(),
            temperature_c,
            humidity_pct,
            icon,
        }
    }

    /// Date label up to the first `/` (`"12/06"` → `"12"`).
    pub fn short_date(&self) -> &str {
        self.date.split('/').next().unwrap_or("")
    }
}

/// Fixed-capacity sequence of [`ROLL_LEN`] slots, each empty until first
/// populated.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Roll {
    slots: [Option<DaySlot>; ROLL_LEN],
}

impl Roll {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite slots `0..min(ROLL_LEN, entries.len())` in order.
    /// Slots past the supplied entries keep their previous contents.
    pub fn overwrite(&mut self, entries: &[DaySlot]) {
        for (slot, entry) in self.slots.iter_mut().zip(entries) {
            *slot = Some(entry.clone());
        }
    }

    pub fn get(&self, index: usize) -> Option<&DaySlot> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    /// All slots in index order, including empty ones.
    pub fn slots(&self) -> &[Option<DaySlot>; ROLL_LEN] {
        &self.slots
    }

    /// Temperatures of populated slots.
    pub fn temperatures(&self) -> heapless::Vec<f32, ROLL_LEN> {
        self.slots
            .iter()
            .flatten()
            .map(|s| s.temperature_c)
            .collect()
    }

    /// Humidities of populated slots that carry one.
    pub fn humidities(&self) -> heapless::Vec<f32, ROLL_LEN> {
        self.slots
            .iter()
            .flatten()
            .filter_map(|s| s.humidity_pct)
            .collect()
    }

    pub fn populated(&self) -> usize {
        self.slots.iter().flatten().count()
    }
}

// ---------------------------------------------------------------------------
// Alerts
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertLevel {
    Info,
    Warning,
    Emergency,
}

impl AlertLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Emergency => "emergency",
        }
    }
}

/// Active weather alert. Lives until the user dismisses it.
#[derive(Debug, Clone, PartialEq)]
pub struct AlertEvent {
    pub level: AlertLevel,
    pub message: String,
    pub timestamp: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot(day: &str, t: f32) -> DaySlot {
        DaySlot::new(day, "01/06", t, Some(50.0), None)
    }

    #[test]
    fn icon_codes_map_to_keys() {
        assert_eq!(IconKey::from_code("01d"), IconKey::Clear);
        assert_eq!(IconKey::from_code("02n").key(), "cloudy");
        assert_eq!(IconKey::from_code("04n").key(), "nt_cloudy");
        assert_eq!(IconKey::from_code("50n").asset_name(), "nt_fog.png");
    }

    #[test]
    fn unmapped_icon_codes_are_unknown() {
        assert_eq!(IconKey::from_code(""), IconKey::Unknown);
        assert_eq!(IconKey::from_code("99x"), IconKey::Unknown);
        assert_eq!(IconKey::Unknown.asset_name(), "unknown.png");
    }

    #[test]
    fn day_label_truncates_to_three_chars() {
        let s = DaySlot::new("Wednesday", "03/07", 20.0, None, None);
        assert_eq!(s.day.as_str(), "Wed");
        assert_eq!(s.short_date(), "03");
    }

    #[test]
    fn overwrite_leaves_tail_untouched() {
        let mut roll = Roll::new();
        roll.overwrite(&[slot("a", 1.0), slot("b", 2.0), slot("c", 3.0), slot("d", 4.0)]);
        roll.overwrite(&[slot("x", 10.0), slot("y", 20.0)]);

        assert_eq!(roll.get(0).map(|s| s.temperature_c), Some(10.0));
        assert_eq!(roll.get(1).map(|s| s.temperature_c), Some(20.0));
        assert_eq!(roll.get(2).map(|s| s.temperature_c), Some(3.0));
        assert_eq!(roll.get(3).map(|s| s.temperature_c), Some(4.0));
        assert!(roll.get(4).is_none());
    }

    #[test]
    fn overwrite_ignores_entries_past_capacity() {
        let mut roll = Roll::new();
        let many: Vec<DaySlot> = (0..8).map(|i| slot("d", i as f32)).collect();
        roll.overwrite(&many);
        assert_eq!(roll.populated(), ROLL_LEN);
        assert_eq!(roll.get(4).map(|s| s.temperature_c), Some(4.0));
    }

    #[test]
    fn humidity_series_skips_missing_values() {
        let mut roll = Roll::new();
        roll.overwrite(&[
            DaySlot::new("a", "", 1.0, Some(40.0), None),
            DaySlot::new("b", "", 2.0, None, None),
            DaySlot::new("c", "", 3.0, Some(60.0), None),
        ]);
        assert_eq!(roll.temperatures().as_slice(), &[1.0, 2.0, 3.0]);
        assert_eq!(roll.humidities().as_slice(), &[40.0, 60.0]);
    }
}
