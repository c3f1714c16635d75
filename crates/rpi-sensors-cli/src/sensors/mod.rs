//! Sensor devices.
//!
//! Each device turns raw hardware readings into an ordered list of
//! measurements. The kind named on the command line is mapped to a device
//! exactly once, in [`Device::build`].

mod bmp085;
mod board;
mod dht;
mod onewire;
mod pir;
mod ultrasonic;

pub use bmp085::Bmp085Device;
pub use board::BoardDevice;
pub use dht::DhtDevice;
pub use onewire::OneWireDevice;
pub use pir::PirDevice;
pub use ultrasonic::UltrasonicDevice;

use crate::config::Config;
use crate::error::{CheckError, Result};
use crate::measurement::{Measurement, Value};
use crate::sampler;
use rpi_sensors_hw::Deadline;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use tracing::debug;

/// Trait for all sensor devices.
pub trait ReadSensor {
    /// Returns the display name.
    fn name(&self) -> &str;

    /// Reads the sensor once, in the device's fixed measurement order.
    fn read_sensor(&mut self, deadline: &Deadline) -> Result<Vec<Measurement>>;
}

/// Sensor kinds selectable with `--sensor`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorKind {
    Dht,
    Ds18b20,
    Bmp085,
    Pir,
    Ultrasonic,
    Rpi,
}

impl FromStr for SensorKind {
    type Err = CheckError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_uppercase().as_str() {
            "DHT" => Ok(SensorKind::Dht),
            "DS18B20" => Ok(SensorKind::Ds18b20),
            "BMP085" => Ok(SensorKind::Bmp085),
            "PIR" => Ok(SensorKind::Pir),
            "ULTRASONIC" => Ok(SensorKind::Ultrasonic),
            "RPI" => Ok(SensorKind::Rpi),
            _ => Err(CheckError::DeviceNotFound(format!(
                "Unknown sensor {}! Possible: DHT, DS18B20, BMP085, PIR, ULTRASONIC, RPI",
                s
            ))),
        }
    }
}

impl fmt::Display for SensorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SensorKind::Dht => write!(f, "DHT"),
            SensorKind::Ds18b20 => write!(f, "DS18B20"),
            SensorKind::Bmp085 => write!(f, "BMP085"),
            SensorKind::Pir => write!(f, "PIR"),
            SensorKind::Ultrasonic => write!(f, "ULTRASONIC"),
            SensorKind::Rpi => write!(f, "RPI"),
        }
    }
}

/// Which device to build and how it is wired.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub kind: SensorKind,
    pub name: String,
    /// `--type`: DHT model, or a DS18B20 id substring.
    pub model: Option<String>,
    pub port: Option<u8>,
    /// 1-based DS18B20 index.
    pub number: Option<usize>,
    pub trigger: Option<u8>,
    pub echo: Option<u8>,
    /// Use the OWFS mount for DS18B20.
    pub wire1: bool,
}

impl Selection {
    /// Creates a selection with no addressing.
    pub fn new(kind: SensorKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            model: None,
            port: None,
            number: None,
            trigger: None,
            echo: None,
            wire1: false,
        }
    }

    fn not_found(&self, detail: &str) -> CheckError {
        CheckError::DeviceNotFound(format!(
            "No {} device found with your parameters: {}",
            self.kind, detail
        ))
    }
}

/// A constructed sensor device.
pub enum Device {
    Dht(DhtDevice),
    Ds18b20(OneWireDevice),
    Bmp085(Bmp085Device),
    Pir(PirDevice),
    Ultrasonic(UltrasonicDevice),
    Board(BoardDevice),
}

impl Device {
    /// Builds the device a selection describes, acquiring its hardware.
    pub fn build(selection: &Selection, config: &Config) -> Result<Self> {
        let name = selection.name.clone();
        let device = match selection.kind {
            SensorKind::Dht => {
                let (Some(model), Some(port)) = (&selection.model, selection.port) else {
                    return Err(selection.not_found("--type and --port are required"));
                };
                let model = model
                    .parse()
                    .map_err(|_| selection.not_found("--type must be 11, 22 or 2302"))?;
                Device::Dht(DhtDevice::new(name, model, port, config))
            }
            SensorKind::Ds18b20 => {
                let probes = onewire::enumerate(selection.wire1, config)?;
                let probes = onewire::select(
                    probes,
                    selection.number,
                    selection.model.as_deref(),
                )
                .map_err(|detail| selection.not_found(&detail))?;
                Device::Ds18b20(OneWireDevice::new(name, probes, config))
            }
            SensorKind::Bmp085 => Device::Bmp085(Bmp085Device::open(name, config)?),
            SensorKind::Pir => {
                let Some(echo) = selection.echo else {
                    return Err(selection.not_found("--echo is required"));
                };
                Device::Pir(PirDevice::open(name, echo)?)
            }
            SensorKind::Ultrasonic => {
                let (Some(trigger), Some(echo)) = (selection.trigger, selection.echo) else {
                    return Err(selection.not_found("--trigger and --echo are required"));
                };
                Device::Ultrasonic(UltrasonicDevice::open(name, trigger, echo)?)
            }
            SensorKind::Rpi => Device::Board(BoardDevice::new(name, config)),
        };
        debug!("Built {} device '{}'", selection.kind, selection.name);
        Ok(device)
    }

    fn inner(&mut self) -> &mut dyn ReadSensor {
        match self {
            Device::Dht(d) => d,
            Device::Ds18b20(d) => d,
            Device::Bmp085(d) => d,
            Device::Pir(d) => d,
            Device::Ultrasonic(d) => d,
            Device::Board(d) => d,
        }
    }
}

impl ReadSensor for Device {
    fn name(&self) -> &str {
        match self {
            Device::Dht(d) => d.name(),
            Device::Ds18b20(d) => d.name(),
            Device::Bmp085(d) => d.name(),
            Device::Pir(d) => d.name(),
            Device::Ultrasonic(d) => d.name(),
            Device::Board(d) => d.name(),
        }
    }

    fn read_sensor(&mut self, deadline: &Deadline) -> Result<Vec<Measurement>> {
        self.inner().read_sensor(deadline)
    }
}

/// Reads a device `count` times and averages each numeric channel with a
/// trimmed mean.
///
/// Every read gets its own `timeout`. Channels that are not plain numbers
/// (motion flags, text) keep the last reading.
pub fn read_averaged(
    device: &mut dyn ReadSensor,
    count: usize,
    delay: Duration,
    timeout: Duration,
) -> Result<Vec<Measurement>> {
    let mut last: Vec<Measurement> = Vec::new();
    let means = sampler::sample_channels(
        || {
            last = device.read_sensor(&Deadline::after(timeout))?;
            Ok::<_, CheckError>(last.iter().map(|m| m.value().clone()).collect())
        },
        count,
        delay,
    )?;
    debug!("Averaged {} reads into {:?}", count, means);

    Ok(last
        .into_iter()
        .zip(means)
        .map(|(measurement, mean)| match mean {
            Some(mean) if matches!(measurement.value(), Value::Number(_)) => {
                Measurement::new(mean, measurement.unit_code())
            }
            _ => measurement,
        })
        .collect())
}
