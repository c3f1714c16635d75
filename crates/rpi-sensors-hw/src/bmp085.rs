//! BMP085/BMP180 barometric pressure sensor on I2C.
//!
//! Compensation follows the integer algorithm from the Bosch datasheet
//! (BST-BMP085-DS000-06, section 3.5).

use crate::i2c::{self, RegisterBus};
use crate::{Deadline, Error, Result};
use std::time::Duration;
use tracing::debug;

const REG_CALIBRATION: u8 = 0xAA;
const REG_CHIP_ID: u8 = 0xD0;
const REG_CONTROL: u8 = 0xF4;
const REG_DATA: u8 = 0xF6;

const CMD_READ_TEMPERATURE: u8 = 0x2E;
const CMD_READ_PRESSURE: u8 = 0x34;

const CHIP_ID: u8 = 0x55;

/// Pressure oversampling setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum Mode {
    UltraLowPower = 0,
    #[default]
    Standard = 1,
    HighResolution = 2,
    UltraHighResolution = 3,
}

impl Mode {
    /// Converts an oversampling setting (0-3) to a mode.
    pub fn from_oss(oss: u8) -> Option<Self> {
        match oss {
            0 => Some(Mode::UltraLowPower),
            1 => Some(Mode::Standard),
            2 => Some(Mode::HighResolution),
            3 => Some(Mode::UltraHighResolution),
            _ => None,
        }
    }

    fn oss(&self) -> u32 {
        *self as u32
    }

    fn conversion_time(&self) -> Duration {
        Duration::from_millis(match self {
            Mode::UltraLowPower => 5,
            Mode::Standard => 8,
            Mode::HighResolution => 14,
            Mode::UltraHighResolution => 26,
        })
    }
}

/// Factory calibration coefficients stored in the sensor EEPROM.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Calibration {
    pub ac1: i16,
    pub ac2: i16,
    pub ac3: i16,
    pub ac4: u16,
    pub ac5: u16,
    pub ac6: u16,
    pub b1: i16,
    pub b2: i16,
    pub mb: i16,
    pub mc: i16,
    pub md: i16,
}

impl Calibration {
    /// Decodes the 22 calibration bytes starting at 0xAA.
    ///
    /// A word of 0x0000 or 0xFFFF means the EEPROM did not answer.
    pub fn from_bytes(raw: &[u8; 22]) -> Result<Self> {
        if let Some(i) = raw
            .chunks_exact(2)
            .position(|w| w == [0x00, 0x00] || w == [0xFF, 0xFF])
        {
            return Err(Error::Calibration(format!(
                "word {} at 0x{:02X} is 0x{:02X}{:02X}",
                i,
                REG_CALIBRATION as usize + 2 * i,
                raw[2 * i],
                raw[2 * i + 1]
            )));
        }

        let word = |i: usize| [raw[2 * i], raw[2 * i + 1]];
        Ok(Self {
            ac1: i16::from_be_bytes(word(0)),
            ac2: i16::from_be_bytes(word(1)),
            ac3: i16::from_be_bytes(word(2)),
            ac4: u16::from_be_bytes(word(3)),
            ac5: u16::from_be_bytes(word(4)),
            ac6: u16::from_be_bytes(word(5)),
            b1: i16::from_be_bytes(word(6)),
            b2: i16::from_be_bytes(word(7)),
            mb: i16::from_be_bytes(word(8)),
            mc: i16::from_be_bytes(word(9)),
            md: i16::from_be_bytes(word(10)),
        })
    }

    /// Returns the intermediate B5 term for an uncompensated temperature.
    fn b5(&self, ut: i64) -> Result<i64> {
        let x1 = ((ut - self.ac6 as i64) * self.ac5 as i64) >> 15;
        let x2 = ((self.mc as i64) << 11)
            .checked_div(x1 + self.md as i64)
            .ok_or_else(|| invalid("temperature divisor is zero"))?;
        Ok(x1 + x2)
    }

    /// Compensated temperature in degrees Celsius.
    pub fn temperature(&self, ut: i64) -> Result<f64> {
        Ok(((self.b5(ut)? + 8) >> 4) as f64 / 10.0)
    }

    /// Compensated pressure in pascal.
    pub fn pressure(&self, ut: i64, up: i64, mode: Mode) -> Result<i64> {
        let oss = mode.oss();
        let b6 = self.b5(ut)? - 4000;

        let x1 = (self.b2 as i64 * ((b6 * b6) >> 12)) >> 11;
        let x2 = (self.ac2 as i64 * b6) >> 11;
        let x3 = x1 + x2;
        let b3 = ((((self.ac1 as i64) * 4 + x3) << oss) + 2) / 4;

        let x1 = (self.ac3 as i64 * b6) >> 13;
        let x2 = (self.b1 as i64 * ((b6 * b6) >> 12)) >> 16;
        let x3 = (x1 + x2 + 2) >> 2;
        let b4 = u64::try_from(x3 + 32768)
            .map(|x3| (self.ac4 as u64 * x3) >> 15)
            .unwrap_or(0);
        let b7 = u64::try_from(up - b3)
            .map_err(|_| invalid("raw pressure below offset"))?
            * (50000u64 >> oss);

        let p = if b7 < 0x8000_0000 {
            (b7 * 2).checked_div(b4)
        } else {
            b7.checked_div(b4).map(|p| p * 2)
        };
        let p = p
            .and_then(|p| i64::try_from(p).ok())
            .ok_or_else(|| invalid("pressure divisor is zero"))?;

        let x1 = (p >> 8)
            .checked_mul(p >> 8)
            .and_then(|x1| x1.checked_mul(3038))
            .ok_or_else(|| invalid("pressure overflow"))?
            >> 16;
        let x2 = p
            .checked_mul(-7357)
            .ok_or_else(|| invalid("pressure overflow"))?
            >> 16;
        Ok(p + ((x1 + x2 + 3791) >> 4))
    }
}

fn invalid(what: &str) -> Error {
    Error::Calibration(what.to_string())
}

/// Altitude in meters for a pressure, relative to the given sea level pressure.
pub fn altitude(pressure_pa: f64, sea_level_pa: f64) -> f64 {
    44330.0 * (1.0 - (pressure_pa / sea_level_pa).powf(1.0 / 5.255))
}

/// One compensated reading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bmp085Reading {
    /// Degrees Celsius.
    pub temperature: f64,
    /// Pascal.
    pub pressure: f64,
    /// Meters above sea level.
    pub altitude: f64,
}

/// A BMP085 on an I2C bus.
pub struct Bmp085 {
    bus: Box<dyn RegisterBus>,
    calibration: Calibration,
    mode: Mode,
    sea_level_pa: f64,
}

impl Bmp085 {
    /// Opens the sensor on `/dev/i2c-<bus>` at `address`.
    pub fn open(bus: u8, address: u16, mode: Mode, sea_level_pa: f64) -> Result<Self> {
        Self::new(i2c::open(bus, address)?, mode, sea_level_pa)
    }

    /// Verifies the chip id and loads calibration data.
    pub fn new(mut bus: Box<dyn RegisterBus>, mode: Mode, sea_level_pa: f64) -> Result<Self> {
        let mut id = [0u8; 1];
        bus.read_registers(REG_CHIP_ID, &mut id)?;
        if id[0] != CHIP_ID {
            return Err(Error::UnexpectedChip(id[0]));
        }

        let mut raw = [0u8; 22];
        bus.read_registers(REG_CALIBRATION, &mut raw)?;
        let calibration = Calibration::from_bytes(&raw)?;
        debug!("BMP085 calibration: {:?}", calibration);

        Ok(Self {
            bus,
            calibration,
            mode,
            sea_level_pa,
        })
    }

    fn read_raw_temperature(&mut self, deadline: &Deadline) -> Result<i64> {
        self.bus.write_register(REG_CONTROL, CMD_READ_TEMPERATURE)?;
        deadline.sleep(Duration::from_millis(5));
        deadline.check()?;
        let mut data = [0u8; 2];
        self.bus.read_registers(REG_DATA, &mut data)?;
        Ok(u16::from_be_bytes(data) as i64)
    }

    fn read_raw_pressure(&mut self, deadline: &Deadline) -> Result<i64> {
        let oss = self.mode.oss();
        self.bus
            .write_register(REG_CONTROL, CMD_READ_PRESSURE + ((oss as u8) << 6))?;
        deadline.sleep(self.mode.conversion_time());
        deadline.check()?;
        let mut data = [0u8; 3];
        self.bus.read_registers(REG_DATA, &mut data)?;
        let raw = ((data[0] as i64) << 16) | ((data[1] as i64) << 8) | data[2] as i64;
        Ok(raw >> (8 - oss))
    }

    /// Performs a temperature and a pressure conversion.
    pub fn read(&mut self, deadline: &Deadline) -> Result<Bmp085Reading> {
        let ut = self.read_raw_temperature(deadline)?;
        let up = self.read_raw_pressure(deadline)?;
        let pressure = self.calibration.pressure(ut, up, self.mode)? as f64;
        Ok(Bmp085Reading {
            temperature: self.calibration.temperature(ut)?,
            pressure,
            altitude: altitude(pressure, self.sea_level_pa),
        })
    }
}
