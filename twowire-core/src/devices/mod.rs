//! Downstream i2c devices, and the traits they implement.

use std::sync::{Arc, Mutex, PoisonError};

use crate::error::I2CResult;

pub mod cfg;
pub mod eeprom;
pub mod lm75;
pub mod prelude;

pub use cfg::DeviceCfg;
pub use eeprom::{Eeprom, EepromKind};
pub use lm75::Lm75;

/// Common device metadata, used to provide context in logs.
pub trait Device {
    /// The name of the emulated device.
    fn kind(&self) -> &'static str;

    /// A particular instance of the device (if there are multiple).
    fn label(&self) -> Option<&'static str> {
        None
    }

    /// Describe what the device is currently pointing at.
    fn probe(&self) -> Probe {
        Probe::Unmapped
    }
}

/// Description of a device's current register selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Probe {
    /// A named register.
    Register(&'static str),
    /// A location within a memory array.
    Offset(u16),
    /// Nothing in particular.
    Unmapped,
}

impl Probe {
    /// Render a device + its current probe as a single line of context.
    pub fn from_device(device: &(impl Device + ?Sized)) -> String {
        let mut s = device.kind().to_string();
        if let Some(label) = device.label() {
            s += ":";
            s += label;
        }
        match device.probe() {
            Probe::Unmapped => {}
            probe => {
                s += " ";
                s += &probe.to_string();
            }
        }
        s
    }
}

impl std::fmt::Display for Probe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Probe::Register(name) => write!(f, "{}", name),
            Probe::Offset(offset) => write!(f, "{:#06x?}", offset),
            Probe::Unmapped => write!(f, "<unmapped>"),
        }
    }
}

/// A device sitting on an i2c bus, addressed by the bus as a whole.
///
/// `start` and `stop` bracket every transaction addressed to the device.
pub trait I2CDevice: Device {
    fn start(&mut self) -> I2CResult<()> {
        Ok(())
    }
    fn read(&mut self) -> I2CResult<u8>;
    fn write(&mut self, data: u8) -> I2CResult<()>;
    fn stop(&mut self) -> I2CResult<()> {
        Ok(())
    }
}

impl Device for Box<dyn I2CDevice> {
    fn kind(&self) -> &'static str {
        (**self).kind()
    }

    fn label(&self) -> Option<&'static str> {
        (**self).label()
    }

    fn probe(&self) -> Probe {
        (**self).probe()
    }
}

/// Devices behind an `Arc<Mutex<_>>` can be registered on a bus while the
/// caller keeps a handle to them (e.g: to inspect an EEPROM's contents).
impl<D: Device + ?Sized> Device for Arc<Mutex<D>> {
    fn kind(&self) -> &'static str {
        self.lock().unwrap_or_else(PoisonError::into_inner).kind()
    }

    fn label(&self) -> Option<&'static str> {
        self.lock().unwrap_or_else(PoisonError::into_inner).label()
    }

    fn probe(&self) -> Probe {
        self.lock().unwrap_or_else(PoisonError::into_inner).probe()
    }
}

impl<D: I2CDevice + ?Sized> I2CDevice for Arc<Mutex<D>> {
    fn start(&mut self) -> I2CResult<()> {
        self.lock().unwrap_or_else(PoisonError::into_inner).start()
    }

    fn read(&mut self) -> I2CResult<u8> {
        self.lock().unwrap_or_else(PoisonError::into_inner).read()
    }

    fn write(&mut self, data: u8) -> I2CResult<()> {
        self.lock().unwrap_or_else(PoisonError::into_inner).write(data)
    }

    fn stop(&mut self) -> I2CResult<()> {
        self.lock().unwrap_or_else(PoisonError::into_inner).stop()
    }
}
