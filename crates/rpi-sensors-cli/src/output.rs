//! Plain-text and Nagios plugin rendering.

use crate::error::CheckError;
use crate::measurement::{format_value, Measurement};
use crate::threshold::ThresholdPair;
use std::fmt;
use std::str::FromStr;

/// Output format selected with `--output`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// One timestamped line per measurement.
    #[default]
    Standard,
    /// Single Nagios plugin line with performance data.
    Nagios,
}

impl FromStr for OutputFormat {
    type Err = CheckError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "standard" => Ok(OutputFormat::Standard),
            "nagios" => Ok(OutputFormat::Nagios),
            _ => Err(CheckError::Validation(
                "Wrong output! Possible: standard, nagios".to_string(),
            )),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Standard => write!(f, "standard"),
            OutputFormat::Nagios => write!(f, "nagios"),
        }
    }
}

/// Renders `[timestamp] name value unit`, one line per measurement.
pub fn render_standard(device: &str, measurements: &[Measurement], decimals: i32) -> String {
    measurements
        .iter()
        .map(|m| {
            format!(
                "[{}] {} {} {}",
                m.captured_at().format("%Y-%m-%d %H:%M:%S%.6f"),
                device,
                format_value(m.value(), decimals),
                m.short_name()
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Renders the Nagios plugin line.
///
/// `<name> has v1 u1, v2 u2 | 'long1'=v1;w1;c1 'long2'=v2;w2;c2 `, with one
/// performance entry per measurement, each followed by a space.
pub fn render_nagios(
    device: &str,
    measurements: &[Measurement],
    thresholds: &[ThresholdPair<'_>],
    decimals: i32,
) -> String {
    let summary = measurements
        .iter()
        .map(|m| format!("{} {}", format_value(m.value(), decimals), m.short_name()))
        .collect::<Vec<_>>()
        .join(", ");

    let perfdata: String = measurements
        .iter()
        .zip(thresholds)
        .map(|(m, pair)| {
            format!(
                "'{}'={};{};{} ",
                m.long_name(),
                format_value(m.value(), decimals),
                pair.warning,
                pair.critical
            )
        })
        .collect();

    format!("{} has {} | {}", device, summary, perfdata)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measurement::unit;

    fn dht_reading() -> Vec<Measurement> {
        vec![
            Measurement::new(23.4, unit::CELSIUS),
            Measurement::new(55.0, unit::HUMIDITY),
        ]
    }

    #[test]
    fn test_output_format_parse() {
        assert_eq!("standard".parse::<OutputFormat>().unwrap(), OutputFormat::Standard);
        assert_eq!("nagios".parse::<OutputFormat>().unwrap(), OutputFormat::Nagios);
        let err = "json".parse::<OutputFormat>().unwrap_err();
        assert_eq!(err.to_string(), "Wrong output! Possible: standard, nagios");
    }

    #[test]
    fn test_nagios_line() {
        let thresholds = [
            ThresholdPair {
                warning: "25",
                critical: "30",
            },
            ThresholdPair {
                warning: "60",
                critical: "70",
            },
        ];
        assert_eq!(
            render_nagios("DHT", &dht_reading(), &thresholds, 1),
            "DHT has 23.4 o C, 55.0 %H | 'degree Celsius'=23.4;25;30 'percent humidity'=55.0;60;70 "
        );
    }

    #[test]
    fn test_standard_lines() {
        let text = render_standard("DHT", &dht_reading(), 2);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with('['));
        assert!(lines[0].ends_with("] DHT 23.40 o C"));
        assert!(lines[1].ends_with("] DHT 55.00 %H"));
    }

    #[test]
    fn test_standard_timestamp_shape() {
        let text = render_standard("PIR", &[Measurement::new(true, unit::MOTION)], 1);
        // [YYYY-MM-DD HH:MM:SS.ffffff]
        let stamp = &text[1..text.find(']').unwrap()];
        assert_eq!(stamp.len(), 26);
        assert!(text.ends_with("] PIR 1.0 motion"));
    }
}
