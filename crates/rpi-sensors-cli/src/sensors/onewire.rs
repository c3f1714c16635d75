//! DS18B20 1-wire temperature probes.

use super::ReadSensor;
use crate::config::Config;
use crate::error::Result;
use crate::measurement::{unit, Measurement};
use rpi_sensors_hw::onewire::{self, Mount, Probe};
use rpi_sensors_hw::{Deadline, RetryPolicy};
use tracing::debug;

/// One or more DS18B20 probes read as a single device.
pub struct OneWireDevice {
    name: String,
    probes: Vec<Probe>,
    policy: RetryPolicy,
}

impl OneWireDevice {
    pub fn new(name: impl Into<String>, probes: Vec<Probe>, config: &Config) -> Self {
        Self {
            name: name.into(),
            probes,
            policy: config.onewire_retry(),
        }
    }
}

impl ReadSensor for OneWireDevice {
    fn name(&self) -> &str {
        &self.name
    }

    fn read_sensor(&mut self, deadline: &Deadline) -> Result<Vec<Measurement>> {
        self.probes
            .iter()
            .map(|probe| {
                let celsius = probe.read_celsius(&self.policy, deadline)?;
                Ok(Measurement::new(celsius, unit::CELSIUS))
            })
            .collect()
    }
}

/// Lists the probes on the kernel mount, or on the OWFS mount with `wire1`.
pub(super) fn enumerate(wire1: bool, config: &Config) -> Result<Vec<Probe>> {
    let (base_dir, mount) = if wire1 {
        (&config.onewire.wiregate_dir, Mount::Owfs)
    } else {
        (&config.onewire.base_dir, Mount::Kernel)
    };
    let probes = onewire::enumerate(base_dir, mount)?;
    debug!("Found {} DS18B20 probes in {}", probes.len(), base_dir.display());
    Ok(probes)
}

/// Narrows the probe list.
///
/// `number` is a 1-based index into the sorted list. Otherwise `pattern`
/// picks the last probe whose path contains it. With neither, every probe
/// is kept. Errors carry a description of what did not match.
pub(super) fn select(
    probes: Vec<Probe>,
    number: Option<usize>,
    pattern: Option<&str>,
) -> std::result::Result<Vec<Probe>, String> {
    if probes.is_empty() {
        return Err("no DS18B20 probes connected".to_string());
    }

    if let Some(number) = number {
        let count = probes.len();
        return match number.checked_sub(1).and_then(|i| probes.into_iter().nth(i)) {
            Some(probe) => Ok(vec![probe]),
            None => Err(format!(
                "probe number {} out of range, {} connected",
                number, count
            )),
        };
    }

    if let Some(pattern) = pattern {
        return probes
            .into_iter()
            .rev()
            .find(|probe| probe.path.to_string_lossy().contains(pattern))
            .map(|probe| vec![probe])
            .ok_or_else(|| format!("no probe matching '{}'", pattern));
    }

    Ok(probes)
}
