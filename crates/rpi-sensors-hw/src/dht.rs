//! DHT11/DHT22/AM2302 humidity and temperature probes.
//!
//! The timing-critical bit-banging is left to the Adafruit_DHT driver
//! binary. A successful run prints three lines:
//!
//! ```text
//! Using pin #4
//! Data (40): 0x2 0x5c 0x0 0xea 0x48
//! Temp =  23.4 *C, Hum = 60.4 %
//! ```

use crate::command::Driver;
use crate::{Deadline, Error, Result, RetryPolicy};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Supported probe models.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DhtModel {
    Dht11,
    Dht22,
    Am2302,
}

impl DhtModel {
    /// Returns the model argument understood by the driver.
    pub fn driver_arg(&self) -> &'static str {
        match self {
            DhtModel::Dht11 => "11",
            DhtModel::Dht22 => "22",
            DhtModel::Am2302 => "2302",
        }
    }
}

impl FromStr for DhtModel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let lower = s.trim().to_lowercase();
        match lower.trim_start_matches("dht") {
            "11" => Ok(DhtModel::Dht11),
            "22" => Ok(DhtModel::Dht22),
            "2302" | "am2302" => Ok(DhtModel::Am2302),
            _ => Err(Error::Parse(format!("unknown DHT model {}", s))),
        }
    }
}

impl fmt::Display for DhtModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DhtModel::Dht11 => write!(f, "DHT11"),
            DhtModel::Dht22 => write!(f, "DHT22"),
            DhtModel::Am2302 => write!(f, "AM2302"),
        }
    }
}

/// One temperature/humidity reading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DhtReading {
    /// Degrees Celsius.
    pub temperature: f64,
    /// Percent relative humidity.
    pub humidity: f64,
}

/// A DHT probe on a GPIO pin, read through the vendor driver.
#[derive(Debug, Clone)]
pub struct DhtProbe {
    driver: Driver,
    model: DhtModel,
    pin: u8,
}

impl DhtProbe {
    /// Creates a probe reader.
    pub fn new(driver: Driver, model: DhtModel, pin: u8) -> Self {
        Self { driver, model, pin }
    }

    /// Runs the driver until it prints a well-formed reading.
    pub fn read(&self, policy: &RetryPolicy, deadline: &Deadline) -> Result<DhtReading> {
        let pin = self.pin.to_string();
        let args = [self.model.driver_arg(), pin.as_str()];
        let what = format!("{} on GPIO {}", self.model, self.pin);

        policy.run(deadline, &what, || {
            let output = self.driver.run(&args, deadline)?;
            if !output.status.success() {
                debug!("{} exited with {}", self.driver.program(), output.status);
            }
            Ok(parse_driver_output(&output.stdout))
        })
    }
}

/// Parses driver output, returning `None` for runs that should be retried.
pub fn parse_driver_output(output: &str) -> Option<DhtReading> {
    let lines: Vec<&str> = output.lines().collect();
    if lines.len() != 3 || is_empty_data_block(lines[1]) {
        return None;
    }

    let temperature = value_after(lines[2], "Temp")?;
    let humidity = value_after(lines[2], "Hum")?;
    Some(DhtReading {
        temperature,
        humidity,
    })
}

/// True for a `Data (n): 0x0 0x0 0x0 0x0 0x0` line, i.e. no probe answered.
fn is_empty_data_block(line: &str) -> bool {
    let Some((_, bytes)) = line.split_once(':') else {
        return false;
    };
    let mut bytes = bytes.split_whitespace().peekable();
    bytes.peek().is_some()
        && bytes.all(|b| {
            u8::from_str_radix(b.trim_start_matches("0x"), 16)
                .map(|v| v == 0)
                .unwrap_or(false)
        })
}

fn value_after(line: &str, label: &str) -> Option<f64> {
    let start = line.find(label)? + label.len();
    line[start..]
        .trim_start()
        .strip_prefix('=')?
        .split_whitespace()
        .next()?
        .trim_end_matches(',')
        .parse()
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_good_output() {
        let output = concat!(
            "Using pin #4\n",
            "Data (40): 0x2 0x5c 0x0 0xea 0x48\n",
            "Temp =  23.4 *C, Hum = 60.4 %\n"
        );
        assert_eq!(
            parse_driver_output(output),
            Some(DhtReading {
                temperature: 23.4,
                humidity: 60.4
            })
        );
    }

    #[test]
    fn test_parse_negative_temperature() {
        let output = concat!(
            "Using pin #4\n",
            "Data (40): 0x2 0x5c 0x80 0x65 0x48\n",
            "Temp = -10.1 *C, Hum = 80.0 %\n"
        );
        let reading = parse_driver_output(output).unwrap();
        assert_eq!(reading.temperature, -10.1);
        assert_eq!(reading.humidity, 80.0);
    }

    #[test]
    fn test_parse_rejects_empty_data_block() {
        let output = "Using pin #4\nData (0): 0x0 0x0 0x0 0x0 0x0\nTemp =  0.0 *C, Hum = 0.0 %\n";
        assert_eq!(parse_driver_output(output), None);
    }

    #[test]
    fn test_parse_rejects_short_output() {
        assert_eq!(parse_driver_output("Using pin #4\nData (39): 0x2 0x5c\n"), None);
        assert_eq!(parse_driver_output(""), None);
    }

    #[test]
    fn test_model_from_str() {
        assert_eq!("22".parse::<DhtModel>().unwrap(), DhtModel::Dht22);
        assert_eq!("DHT11".parse::<DhtModel>().unwrap(), DhtModel::Dht11);
        assert_eq!("2302".parse::<DhtModel>().unwrap(), DhtModel::Am2302);
        assert!("33".parse::<DhtModel>().is_err());
    }
}
