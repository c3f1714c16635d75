//! Raspberry Pi Sensor Hardware Library
//!
//! Raw access to the sensors a Pi can host: GPIO lines, the I2C bus, the
//! kernel 1-wire driver, vendor driver binaries and the board's own
//! telemetry files. Everything here yields raw scalars; unit tagging and
//! threshold evaluation live in the front-end crate.

pub mod bmp085;
pub mod board;
pub mod command;
pub mod deadline;
pub mod dht;
pub mod error;
pub mod gpio;
pub mod i2c;
pub mod onewire;
pub mod pir;
pub mod telemetry;
pub mod ultrasonic;

pub use board::{Board, BoardRevision};
pub use deadline::{Deadline, RetryPolicy};
pub use error::{Error, Result};
pub use gpio::{InputLine, OutputLine};
pub use i2c::RegisterBus;

/// Default I2C address of the BMP085/BMP180.
pub const BMP085_ADDRESS: u16 = 0x77;

/// Standard sea level pressure in pascal.
pub const SEA_LEVEL_PA: f64 = 101_325.0;
