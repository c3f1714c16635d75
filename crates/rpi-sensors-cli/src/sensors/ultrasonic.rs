//! HC-SR04 ultrasonic rangefinder.

use super::ReadSensor;
use crate::error::Result;
use crate::measurement::{unit, Measurement};
use rpi_sensors_hw::ultrasonic::Rangefinder;
use rpi_sensors_hw::Deadline;

/// Rangefinder on a trigger/echo pin pair.
pub struct UltrasonicDevice {
    name: String,
    finder: Rangefinder,
}

impl UltrasonicDevice {
    pub fn new(name: impl Into<String>, finder: Rangefinder) -> Self {
        Self {
            name: name.into(),
            finder,
        }
    }

    /// Acquires the trigger and echo pins.
    pub fn open(name: impl Into<String>, trigger: u8, echo: u8) -> Result<Self> {
        Ok(Self::new(name, Rangefinder::open(trigger, echo)?))
    }
}

impl ReadSensor for UltrasonicDevice {
    fn name(&self) -> &str {
        &self.name
    }

    fn read_sensor(&mut self, deadline: &Deadline) -> Result<Vec<Measurement>> {
        let cm = self.finder.measure_cm(deadline)?;
        Ok(vec![Measurement::new(cm, unit::CENTIMETER)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CheckError;
    use rpi_sensors_hw::{Error, InputLine, OutputLine};
    use std::cell::Cell;
    use std::time::Duration;

    struct NullTrigger;

    impl OutputLine for NullTrigger {
        fn set_high(&mut self) {}
        fn set_low(&mut self) {}
    }

    /// Echo that is high from poll `rise` until poll `fall`.
    struct Echo {
        polls: Cell<u32>,
        rise: u32,
        fall: u32,
    }

    impl InputLine for Echo {
        fn is_high(&self) -> bool {
            let n = self.polls.get();
            self.polls.set(n + 1);
            n >= self.rise && n < self.fall
        }
    }

    fn device(rise: u32, fall: u32) -> UltrasonicDevice {
        let echo = Echo {
            polls: Cell::new(0),
            rise,
            fall,
        };
        let rangefinder = Rangefinder::new(Box::new(NullTrigger), Box::new(echo));
        UltrasonicDevice::new("ULTRASONIC", rangefinder)
    }

    #[test]
    fn test_distance_in_centimeters() {
        let measurements = device(2, 22).read_sensor(&Deadline::none()).unwrap();
        assert_eq!(measurements.len(), 1);
        assert_eq!(measurements[0].unit_code(), unit::CENTIMETER);
        assert!(measurements[0].value().as_number().unwrap() >= 0.0);
    }

    #[test]
    fn test_stuck_echo_times_out() {
        let deadline = Deadline::after(Duration::from_millis(20));
        let result = device(u32::MAX, u32::MAX).read_sensor(&deadline);
        assert!(matches!(
            result,
            Err(CheckError::Hardware(Error::Timeout(_)))
        ));
    }
}
