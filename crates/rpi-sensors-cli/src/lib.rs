//! Raspberry Pi Sensor Checks
//!
//! Reads one sensor, tags each value with its unit and renders either
//! timestamped lines or a Nagios plugin line whose exit status is the worst
//! threshold result.

pub mod check;
pub mod cli;
pub mod config;
pub mod error;
pub mod measurement;
pub mod output;
pub mod sampler;
pub mod sensors;
pub mod threshold;

pub use check::{run, CheckRequest, Report};
pub use cli::Args;
pub use config::Config;
pub use error::{CheckError, Result};
pub use measurement::{Measurement, Value};
pub use threshold::Status;
