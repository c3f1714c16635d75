//! I2C register access.

use crate::Result;

/// Byte-register access to a single I2C peripheral.
pub trait RegisterBus {
    /// Writes `value` to register `register`.
    fn write_register(&mut self, register: u8, value: u8) -> Result<()>;

    /// Reads `buffer.len()` bytes starting at `register`.
    fn read_registers(&mut self, register: u8, buffer: &mut [u8]) -> Result<()>;
}

/// rppal-backed I2C peripheral.
#[cfg(feature = "rppal")]
pub struct I2cBus {
    bus: rppal::i2c::I2c,
}

#[cfg(feature = "rppal")]
impl I2cBus {
    /// Opens `/dev/i2c-<bus>` and addresses the peripheral at `address`.
    pub fn open(bus: u8, address: u16) -> Result<Self> {
        let mut i2c = rppal::i2c::I2c::with_bus(bus)?;
        i2c.set_slave_address(address)?;
        tracing::debug!("Opened I2C bus {} at address 0x{:02X}", bus, address);
        Ok(Self { bus: i2c })
    }
}

#[cfg(feature = "rppal")]
impl RegisterBus for I2cBus {
    fn write_register(&mut self, register: u8, value: u8) -> Result<()> {
        self.bus.write(&[register, value])?;
        Ok(())
    }

    fn read_registers(&mut self, register: u8, buffer: &mut [u8]) -> Result<()> {
        self.bus.write_read(&[register], buffer)?;
        Ok(())
    }
}

/// Opens an I2C peripheral.
#[cfg(feature = "rppal")]
pub fn open(bus: u8, address: u16) -> Result<Box<dyn RegisterBus>> {
    Ok(Box::new(I2cBus::open(bus, address)?))
}

/// Opens an I2C peripheral.
#[cfg(not(feature = "rppal"))]
pub fn open(_bus: u8, _address: u16) -> Result<Box<dyn RegisterBus>> {
    Err(crate::Error::Unsupported("I2C"))
}
