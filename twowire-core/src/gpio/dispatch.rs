//! Byte-level dispatch of decoded bytes to the bus.

use bit_field::BitField;

use crate::bus::I2CBus;

use super::I2CGpio;

/// Byte-level state of the current transaction.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ByteState {
    /// Waiting for an address byte.
    SlaveIdle,
    /// The addressed device was written to, the next byte is its first data
    /// byte (typically a register / memory offset).
    ReceiveAddress,
    /// Subsequent bytes are written to the addressed device.
    ReceiveData,
    /// The addressed device is being read from.
    SendData,
    /// Nobody answered the address. Bytes are dropped until the next start.
    Invalid,
}

/// Transfer direction, as encoded in bit 0 of the address byte.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Direction {
    Read,
    Write,
}

impl Direction {
    pub fn from_bit(bit: bool) -> Direction {
        if bit {
            Direction::Read
        } else {
            Direction::Write
        }
    }
}

/// Which side is currently driving SDA with data.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Driver {
    Master,
    Slave,
}

impl<B: I2CBus> I2CGpio<B> {
    /// Direction of the most recently addressed transaction.
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Handle a complete byte clocked in from the master.
    pub(super) fn on_byte(&mut self, byte: u8) {
        match self.byte_state {
            ByteState::SlaveIdle => self.on_address(byte),
            ByteState::ReceiveAddress | ByteState::ReceiveData => {
                debug!(target: "I2CGPIO", "[{}] received byte {:#04x?}", self.label, byte);
                if let Some(addr) = self.target {
                    self.bus.write(addr, byte);
                }
                if self.byte_state == ByteState::ReceiveAddress {
                    self.byte_state = match self.direction {
                        Direction::Read => ByteState::SendData,
                        Direction::Write => ByteState::ReceiveData,
                    };
                }
            }
            ByteState::SendData | ByteState::Invalid => {
                trace!(
                    target: "I2CGPIO",
                    "[{}] ignoring byte {:#04x?} in {:?}",
                    self.label,
                    byte,
                    self.byte_state
                );
            }
        }
    }

    fn on_address(&mut self, byte: u8) {
        let addr = byte.get_bits(1..8);
        self.direction = Direction::from_bit(byte.get_bit(0));
        debug!(
            target: "I2CGPIO",
            "[{}] address {:#04x?} {:?}",
            self.label,
            addr,
            self.direction
        );

        if !self.bus.has_device(addr) {
            debug!(target: "I2CGPIO", "[{}] no device at {:#04x?}", self.label, addr);
            self.byte_state = ByteState::Invalid;
            return;
        }

        // a repeated start only retargets the open transaction
        if self.target.is_none() {
            self.bus.start(addr);
        }
        self.target = Some(addr);

        match self.direction {
            Direction::Read => {
                self.byte_state = ByteState::SendData;
                self.driver = Driver::Slave;
                self.shift = self.bus.read(addr);
            }
            Direction::Write => {
                self.byte_state = ByteState::ReceiveAddress;
                self.driver = Driver::Master;
            }
        }
    }

    /// Fetch the next byte to send from the addressed device.
    pub(super) fn next_byte(&mut self) {
        if let Some(addr) = self.target {
            self.shift = self.bus.read(addr);
        }
    }

    /// End the current transaction, if there is one.
    pub(super) fn close_transaction(&mut self) {
        if let Some(addr) = self.target.take() {
            self.bus.stop(addr);
            debug!(target: "I2CGPIO", "[{}] closed transaction with {:#04x?}", self.label, addr);
        }
        self.byte_state = ByteState::SlaveIdle;
        self.driver = Driver::Master;
    }
}
