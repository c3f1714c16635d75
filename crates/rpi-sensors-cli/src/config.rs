//! Configuration management.
//!
//! Everything has a default, so the config file is optional and may set
//! only the keys that differ on a given board.

use anyhow::{Context, Result};
use rpi_sensors_hw::RetryPolicy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Wall-clock bound for one sensor read, in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: f64,

    /// Cap on retries of unstable readings (absent = retry until timeout)
    #[serde(default)]
    pub max_attempts: Option<u32>,

    /// Pause between reads when averaging with --accuracy, in milliseconds
    #[serde(default = "default_sample_delay")]
    pub sample_delay_ms: u64,

    /// DHT driver configuration
    #[serde(default)]
    pub dht: DhtConfig,

    /// 1-wire configuration
    #[serde(default)]
    pub onewire: OneWireConfig,

    /// BMP085 configuration
    #[serde(default)]
    pub bmp085: Bmp085Config,

    /// Board telemetry configuration
    #[serde(default)]
    pub board: BoardConfig,
}

/// DHT driver configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DhtConfig {
    /// Path to the Adafruit_DHT driver binary
    #[serde(default = "default_dht_driver")]
    pub driver: String,

    /// Run the driver through sudo
    #[serde(default = "default_true")]
    pub sudo: bool,

    /// Pause before re-running the driver, in milliseconds
    #[serde(default = "default_dht_retry_delay")]
    pub retry_delay_ms: u64,
}

impl Default for DhtConfig {
    fn default() -> Self {
        Self {
            driver: default_dht_driver(),
            sudo: default_true(),
            retry_delay_ms: default_dht_retry_delay(),
        }
    }
}

/// 1-wire configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OneWireConfig {
    /// Kernel w1 device directory
    #[serde(default = "default_w1_base_dir")]
    pub base_dir: PathBuf,

    /// OWFS (Wiregate) mount point, used with --wire1
    #[serde(default = "default_wiregate_dir")]
    pub wiregate_dir: PathBuf,

    /// Pause before re-reading an unstable probe, in milliseconds
    #[serde(default = "default_w1_retry_delay")]
    pub retry_delay_ms: u64,
}

impl Default for OneWireConfig {
    fn default() -> Self {
        Self {
            base_dir: default_w1_base_dir(),
            wiregate_dir: default_wiregate_dir(),
            retry_delay_ms: default_w1_retry_delay(),
        }
    }
}

/// BMP085 configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bmp085Config {
    /// I2C bus number (/dev/i2c-N)
    #[serde(default = "default_i2c_bus")]
    pub bus: u8,

    /// I2C address
    #[serde(default = "default_bmp085_address")]
    pub address: u16,

    /// Oversampling setting (0-3)
    #[serde(default = "default_bmp085_mode")]
    pub mode: u8,

    /// Sea level pressure used for altitude, in pascal
    #[serde(default = "default_sea_level")]
    pub sea_level_pa: f64,
}

impl Default for Bmp085Config {
    fn default() -> Self {
        Self {
            bus: default_i2c_bus(),
            address: default_bmp085_address(),
            mode: default_bmp085_mode(),
            sea_level_pa: default_sea_level(),
        }
    }
}

/// Board detection and telemetry configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardConfig {
    /// cpuinfo file holding the board revision
    #[serde(default = "default_cpuinfo")]
    pub cpuinfo: PathBuf,

    /// cpufreq directory of the first core
    #[serde(default = "default_cpufreq")]
    pub cpufreq: PathBuf,

    /// Thermal zone of the SoC
    #[serde(default = "default_thermal_zone")]
    pub thermal_zone: PathBuf,

    /// Path to vcgencmd
    #[serde(default = "default_vcgencmd")]
    pub vcgencmd: String,

    /// Run vcgencmd through sudo
    #[serde(default)]
    pub vcgencmd_sudo: bool,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            cpuinfo: default_cpuinfo(),
            cpufreq: default_cpufreq(),
            thermal_zone: default_thermal_zone(),
            vcgencmd: default_vcgencmd(),
            vcgencmd_sudo: false,
        }
    }
}

// Default value functions
fn default_timeout_secs() -> f64 {
    10.0
}

fn default_sample_delay() -> u64 {
    60
}

fn default_true() -> bool {
    true
}

fn default_dht_driver() -> String {
    "/etc/nagios/nrpe.d/Adafruit_DHT".to_string()
}

fn default_dht_retry_delay() -> u64 {
    500
}

fn default_w1_base_dir() -> PathBuf {
    PathBuf::from("/sys/bus/w1/devices")
}

fn default_wiregate_dir() -> PathBuf {
    PathBuf::from("/media/1-wire")
}

fn default_w1_retry_delay() -> u64 {
    200
}

fn default_i2c_bus() -> u8 {
    1
}

fn default_bmp085_address() -> u16 {
    rpi_sensors_hw::BMP085_ADDRESS
}

fn default_bmp085_mode() -> u8 {
    1 // Standard
}

fn default_sea_level() -> f64 {
    rpi_sensors_hw::SEA_LEVEL_PA
}

fn default_cpuinfo() -> PathBuf {
    PathBuf::from("/proc/cpuinfo")
}

fn default_cpufreq() -> PathBuf {
    PathBuf::from("/sys/devices/system/cpu/cpu0/cpufreq")
}

fn default_thermal_zone() -> PathBuf {
    PathBuf::from("/sys/class/thermal/thermal_zone0")
}

fn default_vcgencmd() -> String {
    "/usr/bin/vcgencmd".to_string()
}

impl Config {
    /// Loads configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).with_context(|| {
            format!(
                "Failed to read configuration file {}",
                path.as_ref().display()
            )
        })?;
        let config: Config = toml::from_str(&content).context("Failed to parse configuration")?;
        Ok(config)
    }

    /// Read timeout as a duration. Values too large to represent never expire.
    pub fn timeout(&self) -> Duration {
        Duration::try_from_secs_f64(self.timeout_secs.max(0.0)).unwrap_or(Duration::MAX)
    }

    /// Pause between averaged reads.
    pub fn sample_delay(&self) -> Duration {
        Duration::from_millis(self.sample_delay_ms)
    }

    /// Retry policy for DHT driver runs.
    pub fn dht_retry(&self) -> RetryPolicy {
        RetryPolicy::new(Duration::from_millis(self.dht.retry_delay_ms))
            .with_max_attempts(self.max_attempts)
    }

    /// Retry policy for 1-wire probe reads.
    pub fn onewire_retry(&self) -> RetryPolicy {
        RetryPolicy::new(Duration::from_millis(self.onewire.retry_delay_ms))
            .with_max_attempts(self.max_attempts)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            max_attempts: None,
            sample_delay_ms: default_sample_delay(),
            dht: DhtConfig::default(),
            onewire: OneWireConfig::default(),
            bmp085: Bmp085Config::default(),
            board: BoardConfig::default(),
        }
    }
}
