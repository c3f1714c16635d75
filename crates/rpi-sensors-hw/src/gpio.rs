//! GPIO line access.
//!
//! Lines are acquired through rppal and reset to their previous mode when
//! dropped, so a sensor that owns its lines never leaves them configured.

use crate::Result;

/// A GPIO line configured as input.
pub trait InputLine {
    /// Returns true if the line reads high.
    fn is_high(&self) -> bool;
}

/// A GPIO line configured as output.
pub trait OutputLine {
    /// Drives the line high.
    fn set_high(&mut self);

    /// Drives the line low.
    fn set_low(&mut self);
}

#[cfg(feature = "rppal")]
impl InputLine for rppal::gpio::InputPin {
    fn is_high(&self) -> bool {
        rppal::gpio::InputPin::is_high(self)
    }
}

#[cfg(feature = "rppal")]
impl OutputLine for rppal::gpio::OutputPin {
    fn set_high(&mut self) {
        rppal::gpio::OutputPin::set_high(self)
    }

    fn set_low(&mut self) {
        rppal::gpio::OutputPin::set_low(self)
    }
}

/// Acquires a BCM-numbered pin as input.
#[cfg(feature = "rppal")]
pub fn open_input(pin: u8) -> Result<Box<dyn InputLine>> {
    let line = rppal::gpio::Gpio::new()?.get(pin)?.into_input();
    tracing::debug!("GPIO {} configured as input", pin);
    Ok(Box::new(line))
}

/// Acquires a BCM-numbered pin as output, driven low.
#[cfg(feature = "rppal")]
pub fn open_output(pin: u8) -> Result<Box<dyn OutputLine>> {
    let mut line = rppal::gpio::Gpio::new()?.get(pin)?.into_output();
    line.set_low();
    tracing::debug!("GPIO {} configured as output", pin);
    Ok(Box::new(line))
}

/// Acquires a BCM-numbered pin as input.
#[cfg(not(feature = "rppal"))]
pub fn open_input(_pin: u8) -> Result<Box<dyn InputLine>> {
    Err(crate::Error::Unsupported("GPIO"))
}

/// Acquires a BCM-numbered pin as output, driven low.
#[cfg(not(feature = "rppal"))]
pub fn open_output(_pin: u8) -> Result<Box<dyn OutputLine>> {
    Err(crate::Error::Unsupported("GPIO"))
}
