//! Bit-banged i2c.
//!
//! Some platforms don't have an i2c controller wired up to the devices they
//! care about, and instead toggle a pair of GPIO lines by hand. [`I2CGpio`]
//! sits on the other side of those lines: it's fed every level change of
//! SCL/SDA, reconstructs the bus protocol from the sequence of edges, and
//! forwards the resulting transactions to an [`I2CBus`].
//!
//! The lines are open-drain, so the engine can only ever pull SDA low.
//! Whoever is driving the lines should AND [`I2CGpio::sda`] into the level
//! they read back.

use crate::bus::{I2CBus, I2CHub};

mod dispatch;
mod wire;

pub use dispatch::{ByteState, Direction, Driver};
pub use wire::WireState;

/// A participant on a GPIO-driven i2c bus.
#[derive(Debug)]
pub struct I2CGpio<B> {
    label: &'static str,
    bus: B,

    scl: bool,
    sda: bool,
    last_sda: bool,

    wire: WireState,
    byte_state: ByteState,
    target: Option<u8>,
    direction: Direction,
    driver: Driver,
    pos: u8,
    shift: u8,
}

impl I2CGpio<I2CHub> {
    /// Create a new (empty) bus named `label`, and attach to it.
    ///
    /// Devices can be registered via [`I2CGpio::bus_mut`].
    pub fn new(label: &'static str) -> I2CGpio<I2CHub> {
        I2CGpio::with_bus(label, I2CHub::new(label))
    }
}

impl<B: I2CBus> I2CGpio<B> {
    /// Attach to an existing bus.
    pub fn with_bus(label: &'static str, bus: B) -> I2CGpio<B> {
        debug!(target: "I2CGPIO", "[{}] init()", label);

        I2CGpio {
            label,
            bus,

            // both lines idle high
            scl: true,
            sda: true,
            last_sda: true,

            wire: WireState::Idle,
            byte_state: ByteState::SlaveIdle,
            target: None,
            direction: Direction::Write,
            driver: Driver::Master,
            pos: 0,
            shift: 0,
        }
    }

    /// Detach from the bus, handing it back.
    ///
    /// Any in-flight transaction is left as-is, since the wire never signaled
    /// a stop.
    pub fn close(self) -> B {
        debug!(target: "I2CGPIO", "[{}] close()", self.label);
        self.bus
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }

    /// The level the engine presents on SCL.
    ///
    /// The engine never stretches the clock, so this is whatever SCL was last
    /// sampled at.
    pub fn scl(&self) -> bool {
        self.scl
    }

    /// The level the engine presents on SDA.
    pub fn sda(&self) -> bool {
        match self.wire {
            WireState::Transmit | WireState::Acknowledge => self.sda,
            // keep holding the ACK until the next clock
            WireState::ReceiveWait => false,
            _ => true,
        }
    }

    pub fn wire_state(&self) -> WireState {
        self.wire
    }

    pub fn byte_state(&self) -> ByteState {
        self.byte_state
    }

    /// Address of the device currently being talked to (if any).
    pub fn target(&self) -> Option<u8> {
        self.target
    }
}
