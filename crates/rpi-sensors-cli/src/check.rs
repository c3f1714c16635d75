//! One sensor check, from arguments to report.

use crate::cli::Args;
use crate::config::Config;
use crate::error::{CheckError, Result};
use crate::measurement::Measurement;
use crate::output::{render_nagios, render_standard, OutputFormat};
use crate::sensors::{read_averaged, Device, ReadSensor, Selection};
use crate::threshold::{self, Status};
use rpi_sensors_hw::{Board, Deadline};
use tracing::{debug, info};

/// Validated arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckRequest {
    pub selection: Selection,
    pub format: OutputFormat,
    /// Non-negative decimal places.
    pub decimals: i32,
    /// Number of reads to average, if any.
    pub accuracy: Option<usize>,
    pub warnings: Vec<String>,
    pub criticals: Vec<String>,
    /// Read timeout override in seconds.
    pub timeout: Option<f64>,
}

/// Rendered output and the status to exit with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub text: String,
    pub status: Status,
}

/// Runs a check: load config, validate, read the device, render.
pub fn run(args: &Args) -> Result<Report> {
    let mut config = match &args.config {
        Some(path) => Config::load(path).map_err(CheckError::Config)?,
        None => Config::default(),
    };

    let board = Board::detect(&config.board.cpuinfo);
    debug!("{} has GPIO ports {:?}", board, board.gpio_ports());
    if board.has_been_overvolted() == Some(true) {
        info!("Board has been overvolted");
    }

    let request = args.validate(board.gpio_ports())?;
    if let Some(timeout) = request.timeout {
        config.timeout_secs = timeout;
    }

    // The device, and the GPIO lines it owns, is released at the end of this block.
    let (name, measurements) = {
        let mut device = Device::build(&request.selection, &config)?;
        let measurements = read(&mut device, &request, &config)?;
        (device.name().to_string(), measurements)
    };

    report(&name, &request, &measurements)
}

fn read(device: &mut Device, request: &CheckRequest, config: &Config) -> Result<Vec<Measurement>> {
    match request.accuracy {
        Some(count) => read_averaged(device, count, config.sample_delay(), config.timeout()),
        None => device.read_sensor(&Deadline::after(config.timeout())),
    }
}

/// Renders measurements of the device called `name` in the requested format.
///
/// In nagios mode every measurement is evaluated against its positional
/// thresholds and the worst status wins.
pub fn report(name: &str, request: &CheckRequest, measurements: &[Measurement]) -> Result<Report> {
    if measurements.is_empty() {
        return Err(CheckError::NoMeasurements);
    }

    match request.format {
        OutputFormat::Standard => Ok(Report {
            text: render_standard(name, measurements, request.decimals),
            status: Status::Ok,
        }),
        OutputFormat::Nagios => {
            let pairs =
                threshold::align(name, measurements, &request.warnings, &request.criticals)?;
            let status = Status::worst(
                measurements
                    .iter()
                    .zip(&pairs)
                    .map(|(m, pair)| pair.evaluate(m.value())),
            );
            debug!("{} evaluated to {}", name, status);
            Ok(Report {
                text: render_nagios(name, measurements, &pairs, request.decimals),
                status,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measurement::unit;
    use crate::sensors::SensorKind;
    use clap::Parser;
    use std::fs;
    use std::path::Path;

    fn nagios_request(warnings: &[&str], criticals: &[&str]) -> CheckRequest {
        CheckRequest {
            selection: Selection::new(SensorKind::Dht, "DHT"),
            format: OutputFormat::Nagios,
            decimals: 1,
            accuracy: None,
            warnings: warnings.iter().map(|s| s.to_string()).collect(),
            criticals: criticals.iter().map(|s| s.to_string()).collect(),
            timeout: None,
        }
    }

    fn dht_reading(temperature: f64, humidity: f64) -> Vec<Measurement> {
        vec![
            Measurement::new(temperature, unit::CELSIUS),
            Measurement::new(humidity, unit::HUMIDITY),
        ]
    }

    #[test]
    fn test_nagios_report_ok() {
        let request = nagios_request(&["25", "60"], &["30", "70"]);
        let report = report("DHT", &request, &dht_reading(23.4, 55.0)).unwrap();
        assert_eq!(
            report.text,
            "DHT has 23.4 o C, 55.0 %H | 'degree Celsius'=23.4;25;30 'percent humidity'=55.0;60;70 "
        );
        assert_eq!(report.status, Status::Ok);
    }

    #[test]
    fn test_nagios_report_worst_status() {
        let request = nagios_request(&["25", "60"], &["30", "70"]);
        assert_eq!(
            report("DHT", &request, &dht_reading(26.0, 55.0)).unwrap().status,
            Status::Warning
        );
        assert_eq!(
            report("DHT", &request, &dht_reading(26.0, 75.0)).unwrap().status,
            Status::Critical
        );
    }

    #[test]
    fn test_nagios_report_needs_pair_per_measurement() {
        let request = nagios_request(&["25"], &["30"]);
        assert!(matches!(
            report("DHT", &request, &dht_reading(23.4, 55.0)),
            Err(CheckError::InsufficientThresholds { required: 2, .. })
        ));
    }

    #[test]
    fn test_report_uses_device_name() {
        let request = nagios_request(&["25", "60"], &["30", "70"]);
        let nagios = report("Cellar", &request, &dht_reading(23.4, 55.0)).unwrap();
        assert!(nagios.text.starts_with("Cellar has 23.4 o C"));

        let request = CheckRequest {
            format: OutputFormat::Standard,
            ..request
        };
        let standard = report("Cellar", &request, &dht_reading(23.4, 55.0)).unwrap();
        assert!(standard.text.lines().all(|line| line.contains("] Cellar ")));
    }

    #[test]
    fn test_empty_reading() {
        let request = nagios_request(&["25"], &["30"]);
        assert!(matches!(
            report("DHT", &request, &[]),
            Err(CheckError::NoMeasurements)
        ));
    }

    /// Fake Pi with a PCB 2.0 revision and two DS18B20 probes.
    fn fake_board(root: &Path) -> std::path::PathBuf {
        let cpuinfo = root.join("cpuinfo");
        fs::write(&cpuinfo, "Hardware\t: BCM2708\nRevision\t: 000e\n").unwrap();

        let w1 = root.join("w1");
        for (id, milli) in [("28-0000054c2ec2", 21500), ("28-000005e2fdc3", 36312)] {
            let probe = w1.join(id);
            fs::create_dir_all(&probe).unwrap();
            fs::write(
                probe.join("w1_slave"),
                format!("4b 46 7f ff 0e 10 57 : crc=57 YES\n4b 46 7f ff 0e 10 57 t={}\n", milli),
            )
            .unwrap();
        }

        let config = root.join("config.toml");
        fs::write(
            &config,
            format!(
                "[onewire]\nbase_dir = {:?}\n\n[board]\ncpuinfo = {:?}\n",
                w1.display().to_string(),
                cpuinfo.display().to_string()
            ),
        )
        .unwrap();
        config
    }

    fn run_with(config: &Path, args: &[&str]) -> Result<Report> {
        let config = config.display().to_string();
        let argv = ["rpi-sensors", "--config", config.as_str()]
            .into_iter()
            .chain(args.iter().copied());
        run(&Args::try_parse_from(argv).unwrap())
    }

    #[test]
    fn test_run_ds18b20_nagios() {
        let dir = tempfile::tempdir().unwrap();
        let config = fake_board(dir.path());

        let report = run_with(
            &config,
            &[
                "-s", "ds18b20", "--name", "Freezer", "-o", "nagios", "-w", "30", "-w", "35",
                "-c", "40", "-c", "45",
            ],
        )
        .unwrap();
        assert_eq!(
            report.text,
            concat!(
                "Freezer has 21.5 o C, 36.3 o C | ",
                "'degree Celsius'=21.5;30;40 'degree Celsius'=36.3;35;45 "
            )
        );
        assert_eq!(report.status, Status::Warning);
    }

    #[test]
    fn test_run_ds18b20_by_number_averaged() {
        let dir = tempfile::tempdir().unwrap();
        let config = fake_board(dir.path());

        let args = ["-s", "DS18B20", "-n", "1", "-a", "3", "--decimals", "2"];
        let report = run_with(&config, &args).unwrap();
        assert!(report.text.ends_with("] DS18B20 21.50 o C"));
        assert_eq!(report.text.lines().count(), 1);
        assert_eq!(report.status, Status::Ok);
    }

    #[test]
    fn test_run_validates_pins_against_board() {
        let dir = tempfile::tempdir().unwrap();
        let config = fake_board(dir.path());

        assert!(matches!(
            run_with(&config, &["-s", "PIR", "--echo", "5"]),
            Err(CheckError::Validation(_))
        ));
    }

    #[test]
    fn test_run_missing_config() {
        let dir = tempfile::tempdir().unwrap();
        let err = run_with(&dir.path().join("absent.toml"), &["-s", "RPI"]).unwrap_err();
        assert!(matches!(err, CheckError::Config(_)));
    }
}
