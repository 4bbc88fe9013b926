//! The bus side of the engine: whatever owns the devices a bit-banged
//! participant talks to.

use std::sync::{Arc, Mutex, PoisonError};

mod hub;

pub use hub::{HubError, I2CHub};

/// Directory of addressable devices on an i2c bus.
///
/// Addresses are 7-bit. None of these operations can fail. A misbehaving
/// device is the directory's problem to log / paper over, the bus keeps going.
pub trait I2CBus {
    /// Check if there's a device listening at `addr`.
    fn has_device(&self, addr: u8) -> bool;
    /// Open a transaction with the device at `addr`.
    fn start(&mut self, addr: u8);
    /// Close the transaction with the device at `addr`.
    fn stop(&mut self, addr: u8);
    /// Read the next byte from the device at `addr`.
    fn read(&mut self, addr: u8) -> u8;
    /// Write a byte to the device at `addr`.
    fn write(&mut self, addr: u8, data: u8);
}

impl<B: I2CBus + ?Sized> I2CBus for &mut B {
    fn has_device(&self, addr: u8) -> bool {
        (**self).has_device(addr)
    }

    fn start(&mut self, addr: u8) {
        (**self).start(addr)
    }

    fn stop(&mut self, addr: u8) {
        (**self).stop(addr)
    }

    fn read(&mut self, addr: u8) -> u8 {
        (**self).read(addr)
    }

    fn write(&mut self, addr: u8, data: u8) {
        (**self).write(addr, data)
    }
}

impl<B: I2CBus + ?Sized> I2CBus for Box<B> {
    fn has_device(&self, addr: u8) -> bool {
        (**self).has_device(addr)
    }

    fn start(&mut self, addr: u8) {
        (**self).start(addr)
    }

    fn stop(&mut self, addr: u8) {
        (**self).stop(addr)
    }

    fn read(&mut self, addr: u8) -> u8 {
        (**self).read(addr)
    }

    fn write(&mut self, addr: u8, data: u8) {
        (**self).write(addr, data)
    }
}

/// A bus shared between several participants. Each call holds the lock for
/// the duration of a single operation.
impl<B: I2CBus + ?Sized> I2CBus for Arc<Mutex<B>> {
    fn has_device(&self, addr: u8) -> bool {
        self.lock()
            .unwrap_or_else(PoisonError::into_inner)
            .has_device(addr)
    }

    fn start(&mut self, addr: u8) {
        self.lock().unwrap_or_else(PoisonError::into_inner).start(addr)
    }

    fn stop(&mut self, addr: u8) {
        self.lock().unwrap_or_else(PoisonError::into_inner).stop(addr)
    }

    fn read(&mut self, addr: u8) -> u8 {
        self.lock().unwrap_or_else(PoisonError::into_inner).read(addr)
    }

    fn write(&mut self, addr: u8, data: u8) {
        self.lock()
            .unwrap_or_else(PoisonError::into_inner)
            .write(addr, data)
    }
}
