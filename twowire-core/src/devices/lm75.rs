use crate::devices::prelude::*;

use std::convert::TryFrom;

use num_enum::TryFromPrimitive;

#[derive(Debug, Copy, Clone, PartialEq, Eq, TryFromPrimitive)]
#[repr(u8)]
enum Reg {
    Temp = 0x00,
    Conf = 0x01,
    Thyst = 0x02,
    Tos = 0x03,
}

impl Reg {
    fn name(self) -> &'static str {
        match self {
            Reg::Temp => "TEMP",
            Reg::Conf => "CONF",
            Reg::Thyst => "THYST",
            Reg::Tos => "TOS",
        }
    }
}

/// Temperatures are 9-bit two's complement values in units of 0.5 C,
/// left-justified within a 16-bit register.
fn to_reg(half_degrees: i16) -> u16 {
    (half_degrees as u16) << 7
}

fn from_reg(val: u16) -> i16 {
    (val as i16) >> 7
}

/// LM75 - Digital Temperature Sensor and Thermal Watchdog
#[derive(Debug)]
pub struct Lm75 {
    pointer: Reg,
    expect_pointer: bool,
    byte: usize,
    latch: u16,

    temp: i16,
    conf: u8,
    thyst: i16,
    tos: i16,
}

impl Default for Lm75 {
    fn default() -> Lm75 {
        Lm75::new()
    }
}

impl Lm75 {
    pub fn new() -> Lm75 {
        Lm75 {
            pointer: Reg::Temp,
            expect_pointer: true,
            byte: 0,
            latch: 0,

            temp: 25 * 2,
            conf: 0,
            thyst: 75 * 2,
            tos: 80 * 2,
        }
    }

    /// Set the sensed temperature, in units of 0.5 C.
    ///
    /// Clamped to the sensor's -55 C ..= 125 C range.
    pub fn set_temperature(&mut self, half_degrees: i16) {
        self.temp = half_degrees.max(-55 * 2).min(125 * 2);
    }

    pub fn temperature(&self) -> i16 {
        self.temp
    }

    /// (T_hyst, T_os), in units of 0.5 C.
    pub fn thresholds(&self) -> (i16, i16) {
        (self.thyst, self.tos)
    }

    pub fn config(&self) -> u8 {
        self.conf
    }
}

impl Device for Lm75 {
    fn kind(&self) -> &'static str {
        "Lm75"
    }

    fn probe(&self) -> Probe {
        Probe::Register(self.pointer.name())
    }
}

impl I2CDevice for Lm75 {
    fn start(&mut self) -> I2CResult<()> {
        self.expect_pointer = true;
        self.byte = 0;
        Ok(())
    }

    fn read(&mut self) -> I2CResult<u8> {
        self.expect_pointer = false;

        let val = match self.pointer {
            Reg::Conf => return Ok(self.conf),
            Reg::Temp => to_reg(self.temp),
            Reg::Thyst => to_reg(self.thyst),
            Reg::Tos => to_reg(self.tos),
        };

        // 16-bit registers are read MSB first, and keep repeating
        let shift = if self.byte % 2 == 0 { 8 } else { 0 };
        self.byte += 1;
        Ok(val.get_bits(shift..shift + 8) as u8)
    }

    fn write(&mut self, data: u8) -> I2CResult<()> {
        if self.expect_pointer {
            self.expect_pointer = false;
            self.byte = 0;
            self.pointer = Reg::try_from(data).map_err(|_| ContractViolation {
                msg: format!("invalid register pointer {:#04x?}", data),
                severity: Warn,
                stub_val: None,
            })?;
            return Ok(());
        }

        let byte = self.byte;
        self.byte += 1;

        match self.pointer {
            Reg::Temp => Err(InvalidAccess),
            Reg::Conf if byte == 0 => {
                self.conf = data;
                // the OS output pin isn't wired to anything
                if data.get_bits(1..5) != 0 {
                    return Err(StubWrite(Info));
                }
                Ok(())
            }
            Reg::Conf => Err(ContractViolation {
                msg: "multi-byte write to 8-bit CONF register".into(),
                severity: Info,
                stub_val: None,
            }),
            Reg::Thyst | Reg::Tos => {
                match byte {
                    0 => {
                        self.latch.set_bits(8..16, data as u16);
                    }
                    1 => {
                        self.latch.set_bits(0..8, data as u16);
                        let val = from_reg(self.latch);
                        match self.pointer {
                            Reg::Thyst => self.thyst = val,
                            _ => self.tos = val,
                        }
                    }
                    _ => {
                        return Err(ContractViolation {
                            msg: format!("too many bytes written to {}", self.pointer.name()),
                            severity: Info,
                            stub_val: None,
                        })
                    }
                }
                Ok(())
            }
        }
    }
}
