//! Common imports for i2c device models.
//!
//! `use crate::devices::prelude::*;` at the top of a device module.

pub use bit_field::BitField;
pub use log::Level::*;

pub use crate::devices::{Device, I2CDevice, Probe};
pub use crate::error::{
    I2CException::{self, *},
    I2CResult,
};
