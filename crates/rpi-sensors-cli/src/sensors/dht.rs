//! DHT11/DHT22/AM2302 temperature and humidity sensor.

use super::ReadSensor;
use crate::config::Config;
use crate::error::Result;
use crate::measurement::{unit, Measurement};
use rpi_sensors_hw::command::Driver;
use rpi_sensors_hw::dht::{DhtModel, DhtProbe};
use rpi_sensors_hw::{Deadline, RetryPolicy};

/// DHT sensor read through the Adafruit driver.
pub struct DhtDevice {
    name: String,
    probe: DhtProbe,
    policy: RetryPolicy,
}

impl DhtDevice {
    /// Creates a DHT device on `pin` using the configured driver.
    pub fn new(name: impl Into<String>, model: DhtModel, pin: u8, config: &Config) -> Self {
        let driver = Driver::new(config.dht.driver.clone(), config.dht.sudo);
        Self {
            name: name.into(),
            probe: DhtProbe::new(driver, model, pin),
            policy: config.dht_retry(),
        }
    }
}

impl ReadSensor for DhtDevice {
    fn name(&self) -> &str {
        &self.name
    }

    fn read_sensor(&mut self, deadline: &Deadline) -> Result<Vec<Measurement>> {
        let reading = self.probe.read(&self.policy, deadline)?;
        Ok(vec![
            Measurement::new(reading.temperature, unit::CELSIUS),
            Measurement::new(reading.humidity, unit::HUMIDITY),
        ])
    }
}
