//! Nagios threshold evaluation.

use crate::error::{CheckError, Result};
use crate::measurement::{parse_number, Measurement, Value};
use std::fmt;

/// Nagios plugin status, ordered by severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
#[repr(u8)]
pub enum Status {
    #[default]
    Ok = 0,
    Warning = 1,
    Critical = 2,
    Unknown = 3,
}

impl Status {
    /// Process exit code for this status.
    pub fn code(&self) -> u8 {
        *self as u8
    }

    /// Folds statuses into the worst one; an empty list is OK.
    pub fn worst(statuses: impl IntoIterator<Item = Status>) -> Status {
        statuses.into_iter().max().unwrap_or_default()
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Ok => write!(f, "OK"),
            Status::Warning => write!(f, "WARNING"),
            Status::Critical => write!(f, "CRITICAL"),
            Status::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

/// Warning and critical bound for one measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThresholdPair<'a> {
    pub warning: &'a str,
    pub critical: &'a str,
}

impl ThresholdPair<'_> {
    /// Evaluates a value against this pair.
    pub fn evaluate(&self, value: &Value) -> Status {
        evaluate(value, self.warning, self.critical)
    }
}

/// Compares a value against its warning and critical bounds.
///
/// Numbers are compared with a strict greater-than; text only matches
/// exactly. Anything mixed is UNKNOWN.
pub fn evaluate(value: &Value, warning: &str, critical: &str) -> Status {
    let bounds = (parse_number(warning), parse_number(critical));
    match (value, value.as_number(), bounds) {
        (_, Some(v), (Some(warning), Some(critical))) => {
            if v > critical {
                Status::Critical
            } else if v > warning {
                Status::Warning
            } else {
                Status::Ok
            }
        }
        (Value::Text(text), None, (None, None)) => {
            if text == critical {
                Status::Critical
            } else if text == warning {
                Status::Warning
            } else {
                Status::Ok
            }
        }
        _ => Status::Unknown,
    }
}

/// Pairs each measurement with its positional warning and critical bound.
///
/// Surplus bounds are ignored; too few is an error naming how many are needed.
pub fn align<'a>(
    device: &str,
    measurements: &[Measurement],
    warnings: &'a [String],
    criticals: &'a [String],
) -> Result<Vec<ThresholdPair<'a>>> {
    let required = measurements.len();
    if warnings.len() < required || criticals.len() < required {
        return Err(CheckError::InsufficientThresholds {
            device: device.to_string(),
            required,
            warnings: warnings.len(),
            criticals: criticals.len(),
        });
    }

    Ok(warnings
        .iter()
        .zip(criticals)
        .take(required)
        .map(|(warning, critical)| ThresholdPair { warning, critical })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measurement::unit;

    #[test]
    fn test_numeric_thresholds() {
        let five = Value::Number(5.0);
        assert_eq!(evaluate(&five, "3", "10"), Status::Warning);
        assert_eq!(evaluate(&Value::Number(15.0), "3", "10"), Status::Critical);
        assert_eq!(evaluate(&Value::Number(2.0), "3", "10"), Status::Ok);
    }

    #[test]
    fn test_boundaries_not_escalated() {
        assert_eq!(evaluate(&Value::Number(10.0), "3", "10"), Status::Warning);
        assert_eq!(evaluate(&Value::Number(3.0), "3", "10"), Status::Ok);
        assert_eq!(evaluate(&Value::Number(10.0), "10", "10"), Status::Ok);
    }

    #[test]
    fn test_exact_match_thresholds() {
        let x = Value::from("x");
        assert_eq!(evaluate(&x, "y", "y"), Status::Ok);
        assert_eq!(evaluate(&Value::from("y"), "y", "y"), Status::Critical);
        assert_eq!(evaluate(&Value::from("powersave"), "powersave", "off"), Status::Warning);
    }

    #[test]
    fn test_type_mismatch_is_unknown() {
        assert_eq!(evaluate(&Value::Number(5.0), "y", "y"), Status::Unknown);
        assert_eq!(evaluate(&Value::Number(5.0), "3", "y"), Status::Unknown);
        assert_eq!(evaluate(&Value::from("x"), "3", "10"), Status::Unknown);
    }

    #[test]
    fn test_numeric_text_and_flags() {
        assert_eq!(evaluate(&Value::from("12.5"), "3", "10"), Status::Critical);
        assert_eq!(evaluate(&Value::Flag(true), "0", "1"), Status::Warning);
        assert_eq!(evaluate(&Value::Flag(false), "0", "1"), Status::Ok);
    }

    #[test]
    fn test_worst_status() {
        use Status::*;
        let statuses = [Ok, Warning, Ok, Critical, Warning];
        assert_eq!(Status::worst(statuses), Critical);
        let mut reversed = statuses;
        reversed.reverse();
        assert_eq!(Status::worst(reversed), Critical);
        assert_eq!(Status::worst([Critical, Unknown, Ok]), Unknown);
        assert_eq!(Status::worst([]), Ok);
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(Status::Ok.code(), 0);
        assert_eq!(Status::Warning.code(), 1);
        assert_eq!(Status::Critical.code(), 2);
        assert_eq!(Status::Unknown.code(), 3);
    }

    #[test]
    fn test_align_insufficient() {
        let measurements = vec![
            Measurement::new(23.4, unit::CELSIUS),
            Measurement::new(55.0, unit::HUMIDITY),
        ];
        let warnings = vec!["25".to_string()];
        let criticals = vec!["30".to_string()];
        let err = align("DHT", &measurements, &warnings, &criticals).unwrap_err();
        assert!(matches!(
            err,
            CheckError::InsufficientThresholds { required: 2, .. }
        ));
        assert!(err.to_string().contains("2 warning and critical"));
    }

    #[test]
    fn test_align_ignores_surplus() {
        let measurements = vec![Measurement::new(23.4, unit::CELSIUS)];
        let warnings = vec!["25".to_string(), "60".to_string()];
        let criticals = vec!["30".to_string(), "70".to_string()];
        let pairs = align("DS18B20", &measurements, &warnings, &criticals).unwrap();
        assert_eq!(
            pairs,
            vec![ThresholdPair {
                warning: "25",
                critical: "30"
            }]
        );
    }
}
