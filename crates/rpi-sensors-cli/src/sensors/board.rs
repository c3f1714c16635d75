//! The Raspberry Pi's own telemetry as a sensor.

use super::ReadSensor;
use crate::config::Config;
use crate::error::Result;
use crate::measurement::{unit, Measurement};
use rpi_sensors_hw::command::Driver;
use rpi_sensors_hw::telemetry::BoardTelemetry;
use rpi_sensors_hw::Deadline;
use tracing::debug;

/// SoC temperature, CPU clock and core voltage.
pub struct BoardDevice {
    name: String,
    telemetry: BoardTelemetry,
}

impl BoardDevice {
    pub fn new(name: impl Into<String>, config: &Config) -> Self {
        let board = &config.board;
        let vcgencmd = Driver::new(board.vcgencmd.clone(), board.vcgencmd_sudo);
        Self {
            name: name.into(),
            telemetry: BoardTelemetry::new(&board.cpufreq, &board.thermal_zone, vcgencmd),
        }
    }
}

impl ReadSensor for BoardDevice {
    fn name(&self) -> &str {
        &self.name
    }

    fn read_sensor(&mut self, deadline: &Deadline) -> Result<Vec<Measurement>> {
        let temperature = self.telemetry.cpu_temperature()?;
        let frequency = self.telemetry.cpu_frequency_mhz()?;
        if let Ok(governor) = self.telemetry.governor() {
            debug!("cpufreq governor is {}", governor);
        }
        let voltage = self.telemetry.core_voltage(deadline)?;

        Ok(vec![
            Measurement::new(temperature, unit::CELSIUS),
            Measurement::new(frequency, unit::MEGAHERTZ),
            Measurement::new(voltage, unit::VOLT),
        ])
    }
}
