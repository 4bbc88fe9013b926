//! Bit-level decoding of the SCL/SDA edge stream.

use bit_field::BitField;

use crate::bus::I2CBus;

use super::{ByteState, Driver, I2CGpio};

/// Bit-level state of the bus.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum WireState {
    /// Waiting for a start condition.
    Idle,
    /// Clocking in the bits of a byte.
    Receive,
    /// A received byte was ACK'd. The ACK is held until the next clock.
    ReceiveWait,
    /// A full byte was received, the ACK goes out on the next clock.
    Acknowledge,
    /// The next byte has been fetched, and goes out starting next clock.
    TransmitStart,
    /// Clocking out the bits of a byte.
    Transmit,
    /// A full byte was sent, waiting on the master to ACK / NACK it.
    TransmitAckWait,
    /// Between reads, waiting on the master to issue a repeated start or stop.
    ///
    /// None of the other states lead here.
    TransmitNextWait,
}

/// The levels seen across a single call to `feed_edge`.
#[derive(Debug, Copy, Clone)]
struct Edge {
    last_scl: bool,
    scl: bool,
    last_sda: bool,
    sda: bool,
}

impl Edge {
    fn scl_rising(&self) -> bool {
        !self.last_scl && self.scl
    }

    fn scl_falling(&self) -> bool {
        self.last_scl && !self.scl
    }

    fn scl_held_high(&self) -> bool {
        self.last_scl && self.scl
    }

    fn sda_rising(&self) -> bool {
        !self.last_sda && self.sda
    }

    fn sda_falling(&self) -> bool {
        self.last_sda && !self.sda
    }
}

/// What to do with the output SDA level once a state has handled an edge.
enum Latch {
    /// On a rising edge, latch the SDA level the caller sampled.
    Sampled,
    /// On a rising edge, latch a level of our own.
    Forced(bool),
    /// The output level has already been set. Only track SCL.
    Driven,
}

impl<B: I2CBus> I2CGpio<B> {
    /// Feed the current SCL/SDA levels to the engine.
    ///
    /// Must be called whenever either line may have changed, with the levels
    /// of both lines. Calls which don't change anything are fine.
    pub fn feed_edge(&mut self, scl: bool, sda: bool) {
        let edge = Edge {
            last_scl: self.scl,
            scl,
            last_sda: self.last_sda,
            sda,
        };

        use WireState::*;
        let latch = match self.wire {
            Idle => self.on_idle(edge),
            ReceiveWait => {
                if edge.scl_rising() {
                    self.wire = Receive;
                }
                self.on_receive(edge)
            }
            Receive => self.on_receive(edge),
            Acknowledge => self.on_acknowledge(edge),
            TransmitAckWait => self.on_transmit_ack_wait(edge),
            TransmitNextWait => self.on_transmit_next_wait(edge),
            TransmitStart => {
                self.on_transmit_start(edge);
                self.on_transmit(edge)
            }
            Transmit => self.on_transmit(edge),
        };

        let level = match latch {
            Latch::Sampled => Some(sda),
            Latch::Forced(level) => Some(level),
            Latch::Driven => None,
        };
        if let Some(level) = level {
            if edge.scl_rising() {
                self.sda = level;
            }
            self.last_sda = sda;
        }
        self.scl = scl;
    }

    fn on_idle(&mut self, edge: Edge) -> Latch {
        // SCL only has to be high now. Some masters raise SCL and drop SDA
        // in the same write.
        if edge.scl && edge.sda_falling() {
            trace!(target: "I2CGPIO", "[{}] Start bit received (from Idle)", self.label);
            self.wire = WireState::Receive;
            self.pos = 0;
        }
        Latch::Sampled
    }

    fn on_receive(&mut self, edge: Edge) -> Latch {
        if edge.scl_rising() {
            self.shift = (self.shift << 1) | edge.sda as u8;
            self.pos += 1;
            if self.pos == 8 {
                self.on_byte(self.shift);
                self.wire = WireState::Acknowledge;
            }
        } else if edge.scl_held_high() {
            if edge.sda_rising() {
                trace!(target: "I2CGPIO", "[{}] Stop bit received (from Receive)", self.label);
                self.wire = WireState::Idle;
                self.close_transaction();
            } else if edge.sda_falling() {
                trace!(target: "I2CGPIO", "[{}] Start bit received (from Receive)", self.label);
                self.pos = 0;
                self.byte_state = ByteState::SlaveIdle;
            }
        }
        Latch::Sampled
    }

    fn on_acknowledge(&mut self, edge: Edge) -> Latch {
        if !edge.scl_rising() {
            return Latch::Sampled;
        }

        trace!(target: "I2CGPIO", "[{}] Acknowledging transfer", self.label);
        self.pos = 0;
        self.wire = match self.driver {
            Driver::Master => WireState::ReceiveWait,
            Driver::Slave => WireState::Transmit,
        };
        Latch::Forced(false)
    }

    fn on_transmit_ack_wait(&mut self, edge: Edge) -> Latch {
        if edge.scl_rising() {
            if edge.sda {
                // not acknowledged, must be the end of the transfer
                debug!(target: "I2CGPIO", "[{}] End of transfer", self.label);
                self.wire = WireState::Idle;
                self.close_transaction();
            } else {
                self.wire = WireState::TransmitStart;
                self.next_byte();
                self.pos = 0;
            }
        }
        Latch::Sampled
    }

    fn on_transmit_next_wait(&mut self, edge: Edge) -> Latch {
        if edge.scl_held_high() {
            if edge.sda_falling() {
                trace!(target: "I2CGPIO", "[{}] Start bit received (from TransmitNextWait)", self.label);
                self.next_byte();
                self.pos = 0;
            }
            if edge.sda_rising() {
                trace!(target: "I2CGPIO", "[{}] Stop bit received (from TransmitNextWait)", self.label);
                self.wire = WireState::Idle;
                self.close_transaction();
            }
        }
        Latch::Sampled
    }

    fn on_transmit_start(&mut self, edge: Edge) {
        if edge.scl_rising() {
            self.wire = WireState::Transmit;
        }
        if edge.scl_held_high() && edge.sda_rising() {
            trace!(target: "I2CGPIO", "[{}] Stop bit received (from TransmitStart)", self.label);
            self.wire = WireState::Idle;
            self.close_transaction();
        }
    }

    fn on_transmit(&mut self, edge: Edge) -> Latch {
        if edge.scl_rising() && self.pos < 8 {
            if self.pos == 0 {
                trace!(target: "I2CGPIO", "[{}] Transmit byte {:#04x?}", self.label, self.shift);
            }
            self.sda = self.shift.get_bit(7);
            self.shift <<= 1;
            self.pos += 1;
            return Latch::Driven;
        }

        if edge.scl_falling() && self.pos == 8 {
            trace!(target: "I2CGPIO", "[{}] Waiting on ACK", self.label);
            self.wire = WireState::TransmitAckWait;
        }
        Latch::Sampled
    }
}
