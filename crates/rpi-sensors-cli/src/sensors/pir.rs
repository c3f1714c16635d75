//! PIR motion sensor.

use super::ReadSensor;
use crate::error::Result;
use crate::measurement::{unit, Measurement};
use rpi_sensors_hw::pir::MotionSensor;
use rpi_sensors_hw::Deadline;

/// Motion sensor on a single GPIO input.
pub struct PirDevice {
    name: String,
    sensor: MotionSensor,
}

impl PirDevice {
    pub fn new(name: impl Into<String>, sensor: MotionSensor) -> Self {
        Self {
            name: name.into(),
            sensor,
        }
    }

    /// Acquires `pin` as the sensor input.
    pub fn open(name: impl Into<String>, pin: u8) -> Result<Self> {
        Ok(Self::new(name, MotionSensor::open(pin)?))
    }
}

impl ReadSensor for PirDevice {
    fn name(&self) -> &str {
        &self.name
    }

    fn read_sensor(&mut self, _deadline: &Deadline) -> Result<Vec<Measurement>> {
        Ok(vec![Measurement::new(
            self.sensor.motion_detected(),
            unit::MOTION,
        )])
    }
}
