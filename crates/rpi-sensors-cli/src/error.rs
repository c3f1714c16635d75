//! Error types for sensor checks.
//!
//! Every variant ends the run with status UNKNOWN.

use crate::sampler::SampleError;
use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, CheckError>;

/// Errors that abort a check.
#[derive(Error, Debug)]
pub enum CheckError {
    /// Bad argument combination or GPIO pin, detected before touching hardware.
    #[error("{0}")]
    Validation(String),

    /// The sensor arguments did not resolve to a device.
    #[error("{0}")]
    DeviceNotFound(String),

    /// The device returned nothing.
    #[error("No measurements found")]
    NoMeasurements,

    /// Fewer warning/critical thresholds than measurements.
    #[error(
        "You need to set {required} warning and critical thresholds for sensor {device} \
         (got {warnings} warning and {criticals} critical)"
    )]
    InsufficientThresholds {
        device: String,
        required: usize,
        warnings: usize,
        criticals: usize,
    },

    /// Configuration file could not be loaded.
    #[error("{0:#}")]
    Config(anyhow::Error),

    /// Trimmed-mean sampling was misconfigured.
    #[error("{0}")]
    Sample(#[from] SampleError),

    /// Hardware or driver failure.
    #[error(transparent)]
    Hardware(#[from] rpi_sensors_hw::Error),
}
