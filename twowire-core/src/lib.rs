//! Emulation of a participant on a bit-banged (GPIO driven) I2C bus.
//!
//! [`I2CGpio`](gpio::I2CGpio) turns the raw SCL/SDA levels written by an
//! emulated CPU into bus transactions against an [`I2CBus`](bus::I2CBus), and
//! reports back the levels it drives onto the lines.

#[macro_use]
extern crate log;

pub mod bus;
pub mod devices;
pub mod error;
pub mod gpio;

pub use bus::{I2CBus, I2CHub};
pub use gpio::I2CGpio;
