//! Bosch BME280 temperature / humidity / pressure sensor over I²C.
//!
//! Generic over any `embedded-hal` 1.0 blocking [`I2c`] bus. The sensor is
//! run in forced mode: each [`read`](EnvSensorPort::read) triggers one
//! conversion, waits a bounded number of status polls, then reads the
//! burst data registers and applies the datasheet floating-point
//! compensation formulas.
//!
//! ## Register map (subset)
//!
//! | Reg       | Purpose                          |
//! |-----------|----------------------------------|
//! | 0xD0      | chip id (0x60)                   |
//! | 0x88–0xA1 | calibration T1..T3, P1..P9, H1   |
//! | 0xE1–0xE7 | calibration H2..H6               |
//! | 0xF2      | ctrl_hum                         |
//! | 0xF3      | status (bit 3 = measuring)       |
//! | 0xF4      | ctrl_meas                        |
//! | 0xF7–0xFE | press[3] temp[3] hum[2]          |

use embedded_hal::i2c::I2c;
use log::{debug, info};

use crate::app::ports::{EnvSensorPort, RawReading};
use crate::error::DeviceError;

/// SDO tied low.
pub const DEFAULT_ADDRESS: u8 = 0x76;
/// SDO tied high.
pub const ALT_ADDRESS: u8 = 0x77;

const CHIP_ID: u8 = 0x60;

const REG_CHIP_ID: u8 = 0xD0;
const REG_CALIB_TP: u8 = 0x88;
const REG_CALIB_H: u8 = 0xE1;
const REG_CTRL_HUM: u8 = 0xF2;
const REG_STATUS: u8 = 0xF3;
const REG_CTRL_MEAS: u8 = 0xF4;
const REG_DATA: u8 = 0xF7;

/// Humidity oversampling x1.
const CTRL_HUM_X1: u8 = 0x01;
/// Temperature x1, pressure x1, forced mode.
const CTRL_MEAS_FORCED: u8 = 0x25;
const STATUS_MEASURING: u8 = 0x08;
const MAX_STATUS_POLLS: u32 = 100;

/// Raw value the chip reports for a skipped temperature/pressure channel.
const ADC_SKIPPED: i32 = 0x8_0000;

/// Factory trimming parameters.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Calibration {
    pub t1: u16,
    pub t2: i16,
    pub t3: i16,
    pub p1: u16,
    pub p2: i16,
    pub p3: i16,
    pub p4: i16,
    pub p5: i16,
    pub p6: i16,
    pub p7: i16,
    pub p8: i16,
    pub p9: i16,
    pub h1: u8,
    pub h2: i16,
    pub h3: u8,
    pub h4: i16,
    pub h5: i16,
    pub h6: i8,
}

impl Calibration {
    /// Decode the two calibration blocks (26 bytes from 0x88, 7 from 0xE1).
    pub fn from_registers(tp: &[u8; 26], h: &[u8; 7]) -> Self {
        let u16_at = |i: usize| u16::from_le_bytes([tp[i], tp[i + 1]]);
        let i16_at = |i: usize| i16::from_le_bytes([tp[i], tp[i + 1]]);
        Self {
            t1: u16_at(0),
            t2: i16_at(2),
            t3: i16_at(4),
            p1: u16_at(6),
            p2: i16_at(8),
            p3: i16_at(10),
            p4: i16_at(12),
            p5: i16_at(14),
            p6: i16_at(16),
            p7: i16_at(18),
            p8: i16_at(20),
            p9: i16_at(22),
            h1: tp[25],
            h2: i16::from_le_bytes([h[0], h[1]]),
            h3: h[2],
            // 12-bit signed values packed across three registers.
            h4: ((h[3] as i8 as i16) << 4) | (h[4] & 0x0F) as i16,
            h5: ((h[5] as i8 as i16) << 4) | (h[4] >> 4) as i16,
            h6: h[6] as i8,
        }
    }

    /// Returns `(temperature °C, t_fine)`.
    pub fn compensate_temperature(&self, adc_t: i32) -> (f64, f64) {
        let adc = adc_t as f64;
        let t1 = self.t1 as f64;
        let var1 = (adc / 16384.0 - t1 / 1024.0) * self.t2 as f64;
        let d = adc / 131_072.0 - t1 / 8192.0;
        let var2 = d * d * self.t3 as f64;
        let t_fine = var1 + var2;
        (t_fine / 5120.0, t_fine)
    }

    /// Pressure in Pa, or `None` when the calibration would divide by zero.
    pub fn compensate_pressure(&self, adc_p: i32, t_fine: f64) -> Option<f64> {
        let mut var1 = t_fine / 2.0 - 64000.0;
        let mut var2 = var1 * var1 * self.p6 as f64 / 32768.0;
        var2 += var1 * self.p5 as f64 * 2.0;
        var2 = var2 / 4.0 + self.p4 as f64 * 65536.0;
        var1 = (self.p3 as f64 * var1 * var1 / 524_288.0 + self.p2 as f64 * var1) / 524_288.0;
        var1 = (1.0 + var1 / 32768.0) * self.p1 as f64;
        if var1.abs() < f64::EPSILON {
            return None;
        }
        let mut p = 1_048_576.0 - adc_p as f64;
        p = (p - var2 / 4096.0) * 6250.0 / var1;
        let var1 = self.p9 as f64 * p * p / 2_147_483_648.0;
        let var2 = p * self.p8 as f64 / 32768.0;
        Some(p + (var1 + var2 + self.p7 as f64) / 16.0)
    }

    /// Relative humidity in %, clamped to 0..=100.
    pub fn compensate_humidity(&self, adc_h: i32, t_fine: f64) -> f64 {
        let mut h = t_fine - 76800.0;
        h = (adc_h as f64 - (self.h4 as f64 * 64.0 + self.h5 as f64 / 16384.0 * h))
            * (self.h2 as f64 / 65536.0
                * (1.0 + self.h6 as f64 / 67_108_864.0 * h * (1.0 + self.h3 as f64 / 67_108_864.0 * h)));
        h *= 1.0 - self.h1 as f64 * h / 524_288.0;
        h.clamp(0.0, 100.0)
    }
}

/// BME280 handle. `acquire` checks the chip id and loads calibration.
pub struct Bme280<I> {
    i2c: I,
    address: u8,
    calibration: Option<Calibration>,
}

impl<I: I2c> Bme280<I> {
    pub fn new(i2c: I, address: u8) -> Self {
        Self {
            i2c,
            address,
            calibration: None,
        }
    }

    /// Give the bus back.
    pub fn into_inner(self) -> I {
        self.i2c
    }

    pub fn calibration(&self) -> Option<&Calibration> {
        self.calibration.as_ref()
    }

    fn read_regs(&mut self, reg: u8, buf: &mut [u8]) -> Result<(), DeviceError> {
        self.i2c
            .write_read(self.address, &[reg], buf)
            .map_err(|_| DeviceError::BusError)
    }

    fn write_reg(&mut self, reg: u8, value: u8) -> Result<(), DeviceError> {
        self.i2c
            .write(self.address, &[reg, value])
            .map_err(|_| DeviceError::BusError)
    }

    fn wait_conversion(&mut self) -> Result<(), DeviceError> {
        let mut status = [0u8; 1];
        for _ in 0..MAX_STATUS_POLLS {
            self.read_regs(REG_STATUS, &mut status)?;
            if status[0] & STATUS_MEASURING == 0 {
                return Ok(());
            }
        }
        Err(DeviceError::BusError)
    }
}

impl<I: I2c> EnvSensorPort for Bme280<I> {
    fn acquire(&mut self) -> Result<(), DeviceError> {
        let mut id = [0u8; 1];
        self.i2c
            .write_read(self.address, &[REG_CHIP_ID], &mut id)
            .map_err(|_| DeviceError::NotFound)?;
        if id[0] != CHIP_ID {
            return Err(DeviceError::WrongChip(id[0]));
        }

        let mut tp = [0u8; 26];
        let mut h = [0u8; 7];
        self.read_regs(REG_CALIB_TP, &mut tp)?;
        self.read_regs(REG_CALIB_H, &mut h)?;
        // ctrl_hum only latches on the next ctrl_meas write.
        self.write_reg(REG_CTRL_HUM, CTRL_HUM_X1)?;

        self.calibration = Some(Calibration::from_registers(&tp, &h));
        info!("BME280 acquired at 0x{:02X}", self.address);
        Ok(())
    }

    fn read(&mut self) -> Result<RawReading, DeviceError> {
        let cal = self.calibration.ok_or(DeviceError::NotAcquired)?;

        self.write_reg(REG_CTRL_MEAS, CTRL_MEAS_FORCED)?;
        self.wait_conversion()?;

        let mut d = [0u8; 8];
        self.read_regs(REG_DATA, &mut d)?;
        let adc_p = ((d[0] as i32) << 12) | ((d[1] as i32) << 4) | ((d[2] as i32) >> 4);
        let adc_t = ((d[3] as i32) << 12) | ((d[4] as i32) << 4) | ((d[5] as i32) >> 4);
        let adc_h = ((d[6] as i32) << 8) | d[7] as i32;
        if adc_t == ADC_SKIPPED || adc_p == ADC_SKIPPED {
            debug!("BME280 conversion skipped");
            return Err(DeviceError::OutOfRange);
        }

        let (temperature, t_fine) = cal.compensate_temperature(adc_t);
        let pressure_pa = cal
            .compensate_pressure(adc_p, t_fine)
            .ok_or(DeviceError::OutOfRange)?;
        let humidity = cal.compensate_humidity(adc_h, t_fine);

        Ok(RawReading {
            temperature_c: temperature as f32,
            humidity_pct: humidity as f32,
            pressure_hpa: (pressure_pa / 100.0) as f32,
        })
    }

    fn release(&mut self) {
        if self.calibration.take().is_some() {
            debug!("BME280 released");
        }
    }

    fn is_acquired(&self) -> bool {
        self.calibration.is_some()
    }
}
