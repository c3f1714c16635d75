//! Board self-telemetry: CPU frequency, temperature and core voltage.

use crate::command::Driver;
use crate::{Deadline, Error, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Board telemetry sources.
#[derive(Debug, Clone)]
pub struct BoardTelemetry {
    cpufreq_dir: PathBuf,
    thermal_zone: PathBuf,
    vcgencmd: Driver,
}

impl BoardTelemetry {
    /// Creates a telemetry reader.
    ///
    /// `cpufreq_dir` is normally `/sys/devices/system/cpu/cpu0/cpufreq` and
    /// `thermal_zone` `/sys/class/thermal/thermal_zone0`.
    pub fn new(
        cpufreq_dir: impl Into<PathBuf>,
        thermal_zone: impl Into<PathBuf>,
        vcgencmd: Driver,
    ) -> Self {
        Self {
            cpufreq_dir: cpufreq_dir.into(),
            thermal_zone: thermal_zone.into(),
            vcgencmd,
        }
    }

    /// Current CPU frequency in MHz.
    pub fn cpu_frequency_mhz(&self) -> Result<f64> {
        let khz = read_number(&self.cpufreq_dir.join("scaling_cur_freq"))?;
        Ok(khz / 1000.0)
    }

    /// Active cpufreq governor, e.g. `ondemand`.
    pub fn governor(&self) -> Result<String> {
        let path = self.cpufreq_dir.join("scaling_governor");
        Ok(read_file(&path)?.trim().to_string())
    }

    /// SoC temperature in degrees Celsius.
    pub fn cpu_temperature(&self) -> Result<f64> {
        let milli = read_number(&self.thermal_zone.join("temp"))?;
        Ok(milli / 1000.0)
    }

    /// Core voltage in volts, as reported by the firmware.
    pub fn core_voltage(&self, deadline: &Deadline) -> Result<f64> {
        let output = self.vcgencmd.run_checked(&["measure_volts", "core"], deadline)?;
        debug!("vcgencmd reported {}", output.trim());
        parse_volts(&output).ok_or_else(|| Error::Parse(output.trim().to_string()))
    }
}

/// Parses `volt=1.2000V`.
pub fn parse_volts(output: &str) -> Option<f64> {
    output
        .trim()
        .strip_prefix("volt=")?
        .trim_end_matches('V')
        .parse()
        .ok()
}

fn read_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|source| Error::Read {
        path: path.to_path_buf(),
        source,
    })
}

fn read_number(path: &Path) -> Result<f64> {
    let content = read_file(path)?;
    content
        .trim()
        .parse()
        .map_err(|_| Error::Parse(format!("{}: {}", path.display(), content.trim())))
}
