//! Command line arguments.

use crate::check::CheckRequest;
use crate::error::{CheckError, Result};
use crate::output::OutputFormat;
use crate::sensors::{Selection, SensorKind};
use clap::Parser;
use std::path::PathBuf;

/// Most decimal places a value is rendered with.
pub const MAX_DECIMALS: i32 = 15;

#[derive(Parser, Debug)]
#[command(name = "rpi-sensors")]
#[command(about = "Read Raspberry Pi sensors as plain text or Nagios checks")]
#[command(version)]
pub struct Args {
    /// Sensor: DHT, DS18B20, BMP085, PIR, ULTRASONIC or RPI
    #[arg(short, long)]
    pub sensor: String,

    /// DHT model (11, 22, 2302) or DS18B20 id substring
    #[arg(short = 't', long = "type")]
    pub sensor_type: Option<String>,

    /// GPIO port of a DHT sensor
    #[arg(short, long)]
    pub port: Option<u8>,

    /// DS18B20 probe number, starting at 1
    #[arg(short, long)]
    pub number: Option<usize>,

    /// GPIO trigger port of an ultrasonic sensor
    #[arg(long)]
    pub trigger: Option<u8>,

    /// GPIO echo port of an ultrasonic or PIR sensor
    #[arg(long)]
    pub echo: Option<u8>,

    /// Read DS18B20 probes from the OWFS (Wiregate) mount
    #[arg(long)]
    pub wire1: bool,

    /// Name shown in the output (defaults to the sensor)
    #[arg(long)]
    pub name: Option<String>,

    /// Output format: standard or nagios
    #[arg(short, long, default_value = "standard")]
    pub output: String,

    /// Number of decimal places
    #[arg(long, default_value_t = 1, allow_negative_numbers = true)]
    pub decimals: i32,

    /// Average this many reads with a trimmed mean
    #[arg(short, long)]
    pub accuracy: Option<usize>,

    /// Warning threshold, one per measurement
    #[arg(short, long, allow_negative_numbers = true)]
    pub warning: Vec<String>,

    /// Critical threshold, one per measurement
    #[arg(short, long, allow_negative_numbers = true)]
    pub critical: Vec<String>,

    /// Configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Read timeout in seconds (overrides the configuration file)
    #[arg(long, allow_negative_numbers = true)]
    pub timeout: Option<f64>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Checks the arguments against the board's GPIO ports.
    ///
    /// Runs before any hardware is touched.
    pub fn validate(&self, ports: &[u8]) -> Result<CheckRequest> {
        let format: OutputFormat = self.output.parse()?;

        let pins = [
            ("--port", self.port),
            ("--trigger", self.trigger),
            ("--echo", self.echo),
        ];
        for (flag, pin) in pins {
            if let Some(pin) = pin.filter(|pin| !ports.contains(pin)) {
                return Err(CheckError::Validation(format!(
                    "Wrong GPIO port {} for {}! Possible: {}",
                    pin,
                    flag,
                    list_ports(ports)
                )));
            }
        }

        if format == OutputFormat::Nagios && (self.warning.is_empty() || self.critical.is_empty())
        {
            return Err(CheckError::Validation(
                "Nagios output needs at least one --warning and one --critical threshold"
                    .to_string(),
            ));
        }

        if let Some(timeout) = self.timeout.filter(|t| t.is_nan() || *t < 0.0) {
            return Err(CheckError::Validation(format!(
                "Wrong timeout {}! Must be zero or more seconds",
                timeout
            )));
        }

        let decimals = self.decimals.saturating_abs();
        if decimals > MAX_DECIMALS {
            return Err(CheckError::Validation(format!(
                "Wrong decimals {}! Must be {} or less",
                self.decimals, MAX_DECIMALS
            )));
        }

        if self.accuracy == Some(0) {
            return Err(CheckError::Validation(
                "Wrong accuracy 0! Must be at least 1 read".to_string(),
            ));
        }

        let kind: SensorKind = self.sensor.parse()?;
        let selection = Selection {
            kind,
            name: self.name.clone().unwrap_or_else(|| self.sensor.clone()),
            model: self.sensor_type.clone(),
            port: self.port,
            number: self.number,
            trigger: self.trigger,
            echo: self.echo,
            wire1: self.wire1,
        };

        Ok(CheckRequest {
            selection,
            format,
            decimals,
            accuracy: self.accuracy,
            warnings: self.warning.clone(),
            criticals: self.critical.clone(),
            timeout: self.timeout,
        })
    }
}

/// Collapses a clap error message into one line.
///
/// Usage and help hints are dropped and the remaining lines are joined, so a
/// missing argument is still named on the first line Nagios reads.
pub fn one_line_error(message: &str) -> String {
    let line = message
        .lines()
        .map(str::trim)
        .filter(|line| {
            !line.is_empty() && !line.starts_with("Usage:") && !line.starts_with("For more")
        })
        .collect::<Vec<_>>()
        .join(" ");
    if line.is_empty() {
        "Invalid arguments".to_string()
    } else {
        line
    }
}

fn list_ports(ports: &[u8]) -> String {
    if ports.is_empty() {
        return "none (unknown board)".to_string();
    }
    ports
        .iter()
        .map(u8::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rpi_sensors_hw::board::PCB_R2_GPIO_PORTS;

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("rpi-sensors").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_defaults() {
        let args = parse(&["-s", "dht", "-t", "22", "-p", "4"]);
        let request = args.validate(PCB_R2_GPIO_PORTS).unwrap();
        assert_eq!(request.format, OutputFormat::Standard);
        assert_eq!(request.decimals, 1);
        assert_eq!(request.selection.kind, SensorKind::Dht);
        assert_eq!(request.selection.name, "dht");
        assert_eq!(request.selection.model.as_deref(), Some("22"));
        assert_eq!(request.selection.port, Some(4));
    }

    #[test]
    fn test_repeatable_thresholds_keep_order() {
        let args = parse(&[
            "-s", "DHT", "-o", "nagios", "-w", "25", "-c", "30", "-w", "-5", "-c", "70",
        ]);
        assert_eq!(args.warning, vec!["25", "-5"]);
        assert_eq!(args.critical, vec!["30", "70"]);
    }

    #[test]
    fn test_negative_decimals_flipped() {
        let args = parse(&["-s", "RPI", "--decimals", "-3"]);
        assert_eq!(args.validate(&[]).unwrap().decimals, 3);
    }

    #[test]
    fn test_wrong_output_rejected() {
        let args = parse(&["-s", "RPI", "-o", "json"]);
        let err = args.validate(&[]).unwrap_err();
        assert_eq!(err.to_string(), "Wrong output! Possible: standard, nagios");
    }

    #[test]
    fn test_pin_outside_board_set_rejected() {
        // GPIO 5 is not on the PCB 2.0 header.
        let args = parse(&["-s", "ULTRASONIC", "--trigger", "23", "--echo", "5"]);
        let err = args.validate(PCB_R2_GPIO_PORTS).unwrap_err();
        assert!(matches!(err, CheckError::Validation(_)));
        assert!(err.to_string().starts_with("Wrong GPIO port 5 for --echo!"));
    }

    #[test]
    fn test_unknown_board_rejects_every_pin() {
        let args = parse(&["-s", "PIR", "--echo", "4"]);
        assert!(matches!(args.validate(&[]), Err(CheckError::Validation(_))));
    }

    #[test]
    fn test_nagios_requires_thresholds() {
        let args = parse(&["-s", "RPI", "-o", "nagios", "-w", "60"]);
        assert!(matches!(args.validate(&[]), Err(CheckError::Validation(_))));
    }

    #[test]
    fn test_unknown_sensor_after_validation() {
        let args = parse(&["-s", "sht31"]);
        assert!(matches!(
            args.validate(&[]),
            Err(CheckError::DeviceNotFound(_))
        ));
    }

    #[test]
    fn test_negative_timeout_rejected() {
        let args = parse(&["-s", "RPI", "--timeout", "-1"]);
        assert!(matches!(args.validate(&[]), Err(CheckError::Validation(_))));
    }

    #[test]
    fn test_missing_sensor_is_parse_error() {
        assert!(Args::try_parse_from(["rpi-sensors", "-o", "nagios"]).is_err());
    }

    #[test]
    fn test_parse_error_on_one_line() {
        let err = Args::try_parse_from(["rpi-sensors", "-o", "nagios"]).unwrap_err();
        let line = one_line_error(&err.to_string());
        assert_eq!(line.lines().count(), 1);
        assert!(line.contains("--sensor"), "line was {:?}", line);
        assert!(!line.contains("Usage"));
    }

    #[test]
    fn test_one_line_error_fallback() {
        assert_eq!(one_line_error("\n\n"), "Invalid arguments");
        assert_eq!(
            one_line_error("error: bad value\n\nUsage: rpi-sensors\n"),
            "error: bad value"
        );
    }

    #[test]
    fn test_zero_accuracy_rejected() {
        let args = parse(&["-s", "RPI", "-a", "0"]);
        let err = args.validate(&[]).unwrap_err();
        assert!(matches!(err, CheckError::Validation(_)));
        assert_eq!(parse(&["-s", "RPI", "-a", "3"]).validate(&[]).unwrap().accuracy, Some(3));
    }

    #[test]
    fn test_decimals_capped() {
        assert_eq!(parse(&["-s", "RPI", "--decimals", "15"]).validate(&[]).unwrap().decimals, 15);
        for decimals in ["16", "-16", "2147483647", "-2147483648"] {
            let args = parse(&["-s", "RPI", "--decimals", decimals]);
            assert!(matches!(args.validate(&[]), Err(CheckError::Validation(_))));
        }
    }
}
