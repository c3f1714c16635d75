//! BMP085/BMP180 barometric pressure sensor.

use super::ReadSensor;
use crate::config::Config;
use crate::error::{CheckError, Result};
use crate::measurement::{unit, Measurement};
use rpi_sensors_hw::bmp085::{Bmp085, Bmp085Reading, Mode};
use rpi_sensors_hw::Deadline;

/// BMP085 on the I2C bus.
pub struct Bmp085Device {
    name: String,
    sensor: Bmp085,
}

impl Bmp085Device {
    pub fn new(name: impl Into<String>, sensor: Bmp085) -> Self {
        Self {
            name: name.into(),
            sensor,
        }
    }

    /// Opens the sensor at the configured bus and address.
    pub fn open(name: impl Into<String>, config: &Config) -> Result<Self> {
        let settings = &config.bmp085;
        let mode = Mode::from_oss(settings.mode).ok_or_else(|| {
            CheckError::Validation(format!(
                "Wrong BMP085 mode {}! Possible: 0, 1, 2, 3",
                settings.mode
            ))
        })?;
        let sensor = Bmp085::open(settings.bus, settings.address, mode, settings.sea_level_pa)?;
        Ok(Self::new(name, sensor))
    }
}

impl ReadSensor for Bmp085Device {
    fn name(&self) -> &str {
        &self.name
    }

    fn read_sensor(&mut self, deadline: &Deadline) -> Result<Vec<Measurement>> {
        Ok(measurements(&self.sensor.read(deadline)?))
    }
}

/// Temperature, pressure in hectopascal and altitude, in that order.
fn measurements(reading: &Bmp085Reading) -> Vec<Measurement> {
    vec![
        Measurement::new(reading.temperature, unit::CELSIUS),
        Measurement::new(reading.pressure / 100.0, unit::HECTOPASCAL),
        Measurement::new(reading.altitude, unit::METERS_ABOVE_SEA),
    ]
}
