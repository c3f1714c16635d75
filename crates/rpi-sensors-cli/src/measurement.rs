//! Typed, unit-labelled measurements.

use chrono::{DateTime, Local};
use std::fmt;

/// Unit codes understood by [`Measurement`].
pub mod unit {
    pub const CELSIUS: &str = "dc";
    pub const FAHRENHEIT: &str = "df";
    pub const KELVIN: &str = "k";
    pub const HUMIDITY: &str = "h";
    pub const HECTOPASCAL: &str = "hpa";
    pub const METERS_ABOVE_SEA: &str = "msea";
    pub const CENTIMETER: &str = "cm";
    pub const MOTION: &str = "md";
    pub const MEGAHERTZ: &str = "mhz";
    pub const VOLT: &str = "v";
}

/// Offset between Celsius and Kelvin used throughout.
const KELVIN_OFFSET: f64 = 273.0;

/// What a measurement measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeasurementClass {
    Temperature,
    Humidity,
    Pressure,
    DistanceLength,
    Motion,
    Frequency,
    Voltage,
    Undefined,
}

impl fmt::Display for MeasurementClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MeasurementClass::Temperature => write!(f, "temperature"),
            MeasurementClass::Humidity => write!(f, "humidity"),
            MeasurementClass::Pressure => write!(f, "pressure"),
            MeasurementClass::DistanceLength => write!(f, "distance-length"),
            MeasurementClass::Motion => write!(f, "motion"),
            MeasurementClass::Frequency => write!(f, "frequency"),
            MeasurementClass::Voltage => write!(f, "voltage"),
            MeasurementClass::Undefined => write!(f, "undefined"),
        }
    }
}

/// Display names and class derived from a unit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnitDisplay {
    pub long_name: &'static str,
    pub short_name: &'static str,
    pub class: MeasurementClass,
}

impl UnitDisplay {
    /// Derives the display triple for a unit code.
    ///
    /// Unknown codes get the "undefined" triple instead of an error.
    pub fn from_code(code: &str) -> Self {
        use MeasurementClass::*;
        let (long_name, short_name, class) = match code {
            unit::CELSIUS => ("degree Celsius", "o C", Temperature),
            unit::FAHRENHEIT => ("degree Fahrenheit", "o F", Temperature),
            unit::KELVIN => ("Kelvin", "K", Temperature),
            unit::HUMIDITY => ("percent humidity", "%H", Humidity),
            unit::HECTOPASCAL => ("hectopascal", "hPa", Pressure),
            unit::METERS_ABOVE_SEA => ("meters above sea level", "m", DistanceLength),
            unit::CENTIMETER => ("centimeter", "cm", DistanceLength),
            unit::MOTION => ("motion detected", "motion", Motion),
            unit::MEGAHERTZ => ("megahertz", "MHz", Frequency),
            unit::VOLT => ("volt", "V", Voltage),
            _ => ("undefined", "undefined", Undefined),
        };
        Self {
            long_name,
            short_name,
            class,
        }
    }
}

/// A raw measurement value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Number(f64),
    Flag(bool),
    Text(String),
}

impl Value {
    /// Returns the numeric value, parsing text and mapping flags to 1/0.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            Value::Flag(b) => Some(if *b { 1.0 } else { 0.0 }),
            Value::Text(s) => parse_number(s),
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Flag(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{}", n),
            Value::Flag(b) => write!(f, "{}", b),
            Value::Text(s) => write!(f, "{}", s),
        }
    }
}

/// Parses a trimmed string as a float, rejecting NaN.
pub fn parse_number(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|n| !n.is_nan())
}

/// A single reading with its unit.
#[derive(Debug, Clone, PartialEq)]
pub struct Measurement {
    value: Value,
    unit_code: String,
    display: UnitDisplay,
    captured_at: DateTime<Local>,
}

impl Measurement {
    /// Creates a measurement captured now.
    pub fn new(value: impl Into<Value>, unit_code: &str) -> Self {
        Self {
            value: value.into(),
            unit_code: unit_code.to_string(),
            display: UnitDisplay::from_code(unit_code),
            captured_at: Local::now(),
        }
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn unit_code(&self) -> &str {
        &self.unit_code
    }

    pub fn long_name(&self) -> &'static str {
        self.display.long_name
    }

    pub fn short_name(&self) -> &'static str {
        self.display.short_name
    }

    pub fn class(&self) -> MeasurementClass {
        self.display.class
    }

    pub fn captured_at(&self) -> DateTime<Local> {
        self.captured_at
    }

    /// Returns a copy with a different value and unit, keeping the capture time.
    fn relabel(&self, value: f64, unit_code: &str) -> Self {
        Self {
            value: Value::Number(value),
            unit_code: unit_code.to_string(),
            display: UnitDisplay::from_code(unit_code),
            captured_at: self.captured_at,
        }
    }

    /// Current temperature in Celsius, if this is a numeric temperature.
    fn celsius(&self) -> Option<f64> {
        let v = match &self.value {
            Value::Number(n) => *n,
            _ => return None,
        };
        match self.unit_code.as_str() {
            unit::CELSIUS => Some(v),
            unit::FAHRENHEIT => Some((v - 32.0) * 5.0 / 9.0),
            unit::KELVIN => Some(v - KELVIN_OFFSET),
            _ => None,
        }
    }

    /// Converts a temperature to Fahrenheit; anything else is returned unchanged.
    pub fn to_fahrenheit(&self) -> Self {
        match self.celsius() {
            Some(c) => self.relabel(9.0 / 5.0 * c + 32.0, unit::FAHRENHEIT),
            None => self.clone(),
        }
    }

    /// Converts a temperature to Celsius; anything else is returned unchanged.
    pub fn to_celsius(&self) -> Self {
        match self.celsius() {
            Some(c) => self.relabel(c, unit::CELSIUS),
            None => self.clone(),
        }
    }

    /// Converts a temperature to Kelvin; anything else is returned unchanged.
    pub fn to_kelvin(&self) -> Self {
        match self.celsius() {
            Some(c) => self.relabel(c + KELVIN_OFFSET, unit::KELVIN),
            None => self.clone(),
        }
    }
}

/// Renders a value with exactly `decimals` fractional digits.
///
/// Values that are not numbers pass through unchanged. A negative digit
/// count is treated as its absolute value.
pub fn format_value(value: &Value, decimals: i32) -> String {
    let decimals = decimals.unsigned_abs() as usize;
    match value.as_number() {
        Some(n) => format!("{:.*}", decimals, n),
        None => value.to_string(),
    }
}
