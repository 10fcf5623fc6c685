//! Hardware-facing drivers: sensor, buttons and the alert indicator.

pub mod bme280;
pub mod button;
pub mod led_patterns;
