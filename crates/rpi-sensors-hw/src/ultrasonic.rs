//! HC-SR04 ultrasonic rangefinder.
//!
//! A 10µs pulse on the trigger line starts a measurement; the echo line
//! then stays high for as long as the sound took to travel there and back.

use crate::gpio::{self, InputLine, OutputLine};
use crate::{Deadline, Result};
use std::time::{Duration, Instant};
use tracing::debug;

/// Speed of sound in cm/s at roughly 20 °C.
pub const SPEED_OF_SOUND_CM_S: f64 = 34300.0;

/// Trigger pulse width.
const TRIGGER_PULSE: Duration = Duration::from_micros(10);

/// Converts an echo pulse width to a distance in centimeters.
pub fn echo_to_cm(echo: Duration) -> f64 {
    echo.as_secs_f64() * SPEED_OF_SOUND_CM_S / 2.0
}

/// Rangefinder owning its trigger and echo lines.
pub struct Rangefinder {
    trigger: Box<dyn OutputLine>,
    echo: Box<dyn InputLine>,
}

impl Rangefinder {
    /// Wraps already acquired lines and drives the trigger low.
    pub fn new(mut trigger: Box<dyn OutputLine>, echo: Box<dyn InputLine>) -> Self {
        trigger.set_low();
        Self { trigger, echo }
    }

    /// Acquires the trigger and echo pins.
    pub fn open(trigger_pin: u8, echo_pin: u8) -> Result<Self> {
        let trigger = gpio::open_output(trigger_pin)?;
        let echo = gpio::open_input(echo_pin)?;
        Ok(Self::new(trigger, echo))
    }

    /// Fires one ping and returns the distance in centimeters.
    pub fn measure_cm(&mut self, deadline: &Deadline) -> Result<f64> {
        self.trigger.set_high();
        spin_for(TRIGGER_PULSE);
        self.trigger.set_low();

        let mut start = Instant::now();
        while !self.echo.is_high() {
            deadline.check()?;
            start = Instant::now();
        }

        let mut stop = Instant::now();
        while self.echo.is_high() {
            deadline.check()?;
            stop = Instant::now();
        }

        let echo = stop.saturating_duration_since(start);
        debug!("Echo pulse lasted {:?}", echo);
        Ok(echo_to_cm(echo))
    }
}

/// Busy-waits; `thread::sleep` is far too coarse for a 10µs pulse.
fn spin_for(pulse: Duration) {
    let start = Instant::now();
    while start.elapsed() < pulse {
        std::hint::spin_loop();
    }
}
