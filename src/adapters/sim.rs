//! Host simulation adapters for the WiFi link and the sensor.
//!
//! Lets the panel run on a development machine with no radio and no I²C
//! bus. The simulated sensor produces a slow deterministic drift so
//! significance filtering and the history bars have something to show.

use log::info;

use crate::app::ports::{EnvSensorPort, LinkPort, RawReading};
use crate::error::{DeviceError, TransportError};

/// Simulated station-mode WiFi.
#[derive(Debug, Default)]
pub struct SimLink {
    associated: bool,
    /// Remaining association attempts that fail before one succeeds.
    failures: u32,
}

impl SimLink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the next `n` association attempts.
    pub fn failing(n: u32) -> Self {
        Self {
            associated: false,
            failures: n,
        }
    }

    /// Simulate the access point going away.
    pub fn drop_association(&mut self) {
        self.associated = false;
    }
}

impl LinkPort for SimLink {
    fn is_associated(&self) -> bool {
        self.associated
    }

    fn associate(&mut self, ssid: &str, _password: &str) -> Result<(), TransportError> {
        if self.failures > 0 {
            self.failures -= 1;
            return Err(TransportError::AssociationFailed);
        }
        info!("SimLink: associated with '{}'", ssid);
        self.associated = true;
        Ok(())
    }
}

/// Simulated environmental sensor with a triangular drift.
#[derive(Debug)]
pub struct SimEnvSensor {
    acquired: bool,
    base: RawReading,
    step: u32,
}

impl Default for SimEnvSensor {
    fn default() -> Self {
        Self::new(RawReading {
            temperature_c: 21.0,
            humidity_pct: 45.0,
            pressure_hpa: 1012.0,
        })
    }
}

impl SimEnvSensor {
    pub fn new(base: RawReading) -> Self {
        Self {
            acquired: false,
            base,
            step: 0,
        }
    }
}

/// Drift period in samples.
const DRIFT_PERIOD: u32 = 120;

impl EnvSensorPort for SimEnvSensor {
    fn acquire(&mut self) -> Result<(), DeviceError> {
        self.acquired = true;
        Ok(())
    }

    fn read(&mut self) -> Result<RawReading, DeviceError> {
        if !self.acquired {
            return Err(DeviceError::NotAcquired);
        }
        let pos = self.step % DRIFT_PERIOD;
        self.step = self.step.wrapping_add(1);
        let half = DRIFT_PERIOD / 2;
        // 0.0 → 1.0 → 0.0 over one period.
        let ramp = if pos < half { pos } else { DRIFT_PERIOD - pos };
        let phase = ramp as f32 / half as f32;
        Ok(RawReading {
            temperature_c: self.base.temperature_c + 2.0 * phase,
            humidity_pct: self.base.humidity_pct - 5.0 * phase,
            pressure_hpa: self.base.pressure_hpa + 1.5 * phase,
        })
    }

    fn release(&mut self) {
        self.acquired = false;
    }

    fn is_acquired(&self) -> bool {
        self.acquired
    }
}
