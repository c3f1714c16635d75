//! Error types for the sensor hardware library.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when reading sensor hardware.
#[derive(Error, Debug)]
pub enum Error {
    /// A driver or sysfs file could not be read.
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Generic I/O error (process spawning, pipes).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// GPIO line could not be configured.
    #[error("GPIO error: {0}")]
    Gpio(String),

    /// I2C bus communication error.
    #[error("I2C error: {0}")]
    I2c(String),

    /// The read deadline passed before the sensor answered.
    #[error("Timed out after {0:?} waiting for sensor")]
    Timeout(Duration),

    /// The retry cap was reached without a well-formed reading.
    #[error("Sensor did not return a valid reading after {0} attempts")]
    RetriesExhausted(u32),

    /// Sensor or driver output could not be understood.
    #[error("Unexpected sensor output: {0}")]
    Parse(String),

    /// A driver binary exited unsuccessfully.
    #[error("{command} failed with {status}")]
    DriverFailed { command: String, status: String },

    /// The chip on the bus is not the one we expected.
    #[error("Unexpected chip id 0x{0:02X}")]
    UnexpectedChip(u8),

    /// Factory calibration data is missing or cannot be used.
    #[error("Invalid calibration data: {0}")]
    Calibration(String),

    /// Hardware backend not compiled in.
    #[error("{0} support is not available in this build")]
    Unsupported(&'static str),
}

#[cfg(feature = "rppal")]
impl From<rppal::gpio::Error> for Error {
    fn from(e: rppal::gpio::Error) -> Self {
        Error::Gpio(e.to_string())
    }
}

#[cfg(feature = "rppal")]
impl From<rppal::i2c::Error> for Error {
    fn from(e: rppal::i2c::Error) -> Self {
        Error::I2c(e.to_string())
    }
}
