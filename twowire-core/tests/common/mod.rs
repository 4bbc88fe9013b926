#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use twowire_core::devices::{Device, I2CDevice};
use twowire_core::error::I2CResult;
use twowire_core::{I2CBus, I2CGpio};

pub fn init_logging() {
    let _ = pretty_env_logger::formatted_builder()
        .filter(None, log::LevelFilter::Error)
        .filter(Some("I2CGPIO"), log::LevelFilter::Trace)
        .filter(Some("I2C"), log::LevelFilter::Debug)
        .parse_filters(&std::env::var("RUST_LOG").unwrap_or_default())
        .try_init();
}

/// A bus master bit-banging an `I2CGpio`, the way platform code would.
///
/// Line levels read back are the AND of what the master and the engine drive.
pub struct Master<B: I2CBus> {
    pub gpio: I2CGpio<B>,
    scl: bool,
    sda: bool,
}

impl<B: I2CBus> Master<B> {
    pub fn new(gpio: I2CGpio<B>) -> Master<B> {
        init_logging();
        Master {
            gpio,
            scl: true,
            sda: true,
        }
    }

    fn set(&mut self, scl: bool, sda: bool) {
        self.scl = scl;
        self.sda = sda;
        self.gpio.feed_edge(scl, sda);
    }

    fn sda_line(&self) -> bool {
        self.sda && self.gpio.sda()
    }

    pub fn start(&mut self) {
        self.set(self.scl, true);
        self.set(true, true);
        self.set(true, false);
        self.set(false, false);
    }

    pub fn stop(&mut self) {
        self.set(false, false);
        self.set(true, false);
        self.set(true, true);
    }

    fn clock_out(&mut self, bit: bool) {
        self.set(false, bit);
        self.set(true, bit);
        self.set(false, bit);
    }

    fn clock_in(&mut self) -> bool {
        self.set(false, true);
        self.set(true, true);
        let bit = self.sda_line();
        self.set(false, true);
        bit
    }

    /// Returns true if the byte was ACK'd.
    pub fn write_byte(&mut self, byte: u8) -> bool {
        for i in (0..8).rev() {
            self.clock_out(byte & (1 << i) != 0);
        }
        !self.clock_in()
    }

    pub fn read_byte(&mut self, ack: bool) -> u8 {
        let mut byte = 0;
        for _ in 0..8 {
            byte = (byte << 1) | self.clock_in() as u8;
        }
        self.clock_out(!ack);
        byte
    }

    fn read_bytes(&mut self, len: usize) -> Vec<u8> {
        (0..len).map(|i| self.read_byte(i + 1 != len)).collect()
    }

    /// Write `data` to `addr` in a single transaction. Returns true if every
    /// byte was ACK'd.
    pub fn write(&mut self, addr: u8, data: &[u8]) -> bool {
        self.start();
        let mut acked = self.write_byte(addr << 1);
        for &b in data {
            acked &= self.write_byte(b);
        }
        self.stop();
        acked
    }

    /// Read `len` bytes from `addr` in a single transaction.
    pub fn read(&mut self, addr: u8, len: usize) -> Vec<u8> {
        self.start();
        self.write_byte(addr << 1 | 1);
        let data = self.read_bytes(len);
        self.stop();
        data
    }

    /// Write `data` to `addr`, then read `len` bytes back after a repeated
    /// start.
    pub fn write_read(&mut self, addr: u8, data: &[u8], len: usize) -> Vec<u8> {
        self.start();
        self.write_byte(addr << 1);
        for &b in data {
            self.write_byte(b);
        }
        self.start();
        self.write_byte(addr << 1 | 1);
        let data = self.read_bytes(len);
        self.stop();
        data
    }
}

/// Forwards to `inner`, recording every access as `"<name> <op>"`.
pub struct Spy<D> {
    name: &'static str,
    inner: D,
    log: Arc<Mutex<Vec<String>>>,
}

impl<D: I2CDevice> Spy<D> {
    pub fn new(name: &'static str, inner: D, log: &Arc<Mutex<Vec<String>>>) -> Spy<D> {
        Spy {
            name,
            inner,
            log: Arc::clone(log),
        }
    }

    fn record(&self, op: String) {
        let name = self.name;
        self.log.lock().unwrap().push(format!("{} {}", name, op));
    }
}

impl<D: I2CDevice> Device for Spy<D> {
    fn kind(&self) -> &'static str {
        self.inner.kind()
    }
}

impl<D: I2CDevice> I2CDevice for Spy<D> {
    fn start(&mut self) -> I2CResult<()> {
        self.record("start".into());
        self.inner.start()
    }

    fn read(&mut self) -> I2CResult<u8> {
        self.record("read".into());
        self.inner.read()
    }

    fn write(&mut self, data: u8) -> I2CResult<()> {
        self.record(format!("write {:#04x?}", data));
        self.inner.write(data)
    }

    fn stop(&mut self) -> I2CResult<()> {
        self.record("stop".into());
        self.inner.stop()
    }
}
