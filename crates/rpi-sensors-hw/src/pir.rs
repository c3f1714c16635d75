//! Passive infrared motion sensor.

use crate::gpio::{self, InputLine};
use crate::Result;

/// PIR sensor wired to a single input line.
pub struct MotionSensor {
    line: Box<dyn InputLine>,
}

impl MotionSensor {
    /// Wraps an already acquired line.
    pub fn new(line: Box<dyn InputLine>) -> Self {
        Self { line }
    }

    /// Acquires `pin` as input.
    pub fn open(pin: u8) -> Result<Self> {
        Ok(Self::new(gpio::open_input(pin)?))
    }

    /// Returns true while the sensor reports motion.
    pub fn motion_detected(&self) -> bool {
        self.line.is_high()
    }
}
