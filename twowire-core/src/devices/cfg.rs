use std::str::FromStr;

use thiserror::Error;

use crate::devices::{Eeprom, EepromKind, I2CDevice, Lm75};

/// Helper struct to parse i2c device configurations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceCfg {
    /// `eeprom:addr=<addr>,kind=<24cXX>[,wp]` or
    /// `eeprom:addr=<addr>,size=<capacity>[,wp]`
    Eeprom {
        addr: u8,
        kind: EepromKind,
        write_protect: bool,
    },
    /// `lm75:addr=<addr>[,temp=<celsius>]`
    Lm75 { addr: u8, temp: Option<i16> },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeviceCfgError {
    #[error("unknown device `{0}`")]
    UnknownDevice(String),
    #[error("missing required options")]
    MissingOptions,
    #[error("unknown `{device}` option `{option}`")]
    UnknownOption {
        device: &'static str,
        option: String,
    },
    #[error("missing argument for `{0}`")]
    MissingArgument(&'static str),
    #[error("missing `{0}` parameter")]
    MissingParameter(&'static str),
    #[error("could not parse `{0}`")]
    Invalid(&'static str),
    #[error("no EEPROM matches `{0}`")]
    UnsupportedEeprom(String),
}

/// Map a capacity (`256`, `4KiB`, ...) to the EEPROM part of that size.
fn parse_eeprom_size(desc: &str) -> Result<EepromKind, DeviceCfgError> {
    use human_size::{Byte, ParsingError, Size, SpecificSize};

    let bytes = match desc.parse::<Size>() {
        Ok(size) => {
            let bytes: SpecificSize<Byte> = size.into();
            bytes.value() as u64
        }
        // plain byte counts have no unit
        Err(ParsingError::MissingMultiple) => desc
            .parse::<u64>()
            .map_err(|_| DeviceCfgError::Invalid("size"))?,
        Err(_) => return Err(DeviceCfgError::Invalid("size")),
    };
    EepromKind::from_size(bytes)
        .ok_or_else(|| DeviceCfgError::UnsupportedEeprom(desc.into()))
}

fn parse_addr(desc: &str) -> Result<u8, DeviceCfgError> {
    let addr = match desc.strip_prefix("0x") {
        Some(hex) => u8::from_str_radix(hex, 16),
        None => desc.parse::<u8>(),
    }
    .map_err(|_| DeviceCfgError::Invalid("addr"))?;

    if addr > 0x7f {
        return Err(DeviceCfgError::Invalid("addr"));
    }
    Ok(addr)
}

/// Split `key=val,key,...` into (key, Option<val>) pairs.
fn options(
    s: Option<&str>,
) -> Result<impl Iterator<Item = (&str, Option<&str>)>, DeviceCfgError> {
    let s = s.ok_or(DeviceCfgError::MissingOptions)?;
    Ok(s.split(',').map(|arg| {
        let mut s = arg.splitn(2, '=');
        (s.next().unwrap_or_default(), s.next())
    }))
}

impl FromStr for DeviceCfg {
    type Err = DeviceCfgError;

    fn from_str(s: &str) -> Result<DeviceCfg, DeviceCfgError> {
        let mut s = s.splitn(2, ':');
        let kind = s.next().unwrap_or_default();
        Ok(match kind {
            "eeprom" => {
                let mut addr = None;
                let mut kind = None;
                let mut write_protect = false;

                for (opt, arg) in options(s.next())? {
                    match opt {
                        "addr" => {
                            addr = Some(parse_addr(
                                arg.ok_or(DeviceCfgError::MissingArgument("addr"))?,
                            )?)
                        }
                        "kind" => {
                            let arg = arg.ok_or(DeviceCfgError::MissingArgument("kind"))?;
                            kind = Some(
                                EepromKind::from_name(arg)
                                    .ok_or_else(|| DeviceCfgError::UnsupportedEeprom(arg.into()))?,
                            );
                        }
                        "size" => {
                            let arg = arg.ok_or(DeviceCfgError::MissingArgument("size"))?;
                            kind = Some(parse_eeprom_size(arg)?);
                        }
                        "wp" => write_protect = true,
                        _ => {
                            return Err(DeviceCfgError::UnknownOption {
                                device: "eeprom",
                                option: opt.into(),
                            })
                        }
                    }
                }

                DeviceCfg::Eeprom {
                    addr: addr.ok_or(DeviceCfgError::MissingParameter("addr"))?,
                    kind: kind.ok_or(DeviceCfgError::MissingParameter("kind"))?,
                    write_protect,
                }
            }
            "lm75" => {
                let mut addr = None;
                let mut temp = None;

                for (opt, arg) in options(s.next())? {
                    match opt {
                        "addr" => {
                            addr = Some(parse_addr(
                                arg.ok_or(DeviceCfgError::MissingArgument("addr"))?,
                            )?)
                        }
                        "temp" => {
                            let celsius = arg
                                .ok_or(DeviceCfgError::MissingArgument("temp"))?
                                .parse::<f32>()
                                .map_err(|_| DeviceCfgError::Invalid("temp"))?;
                            temp = Some((celsius * 2.0).round() as i16);
                        }
                        _ => {
                            return Err(DeviceCfgError::UnknownOption {
                                device: "lm75",
                                option: opt.into(),
                            })
                        }
                    }
                }

                DeviceCfg::Lm75 {
                    addr: addr.ok_or(DeviceCfgError::MissingParameter("addr"))?,
                    temp,
                }
            }
            _ => return Err(DeviceCfgError::UnknownDevice(kind.into())),
        })
    }
}

impl DeviceCfg {
    pub fn addr(&self) -> u8 {
        match *self {
            DeviceCfg::Eeprom { addr, .. } | DeviceCfg::Lm75 { addr, .. } => addr,
        }
    }

    /// Instantiate the configured device.
    pub fn build(&self) -> Box<dyn I2CDevice> {
        match *self {
            DeviceCfg::Eeprom {
                kind,
                write_protect,
                ..
            } => {
                let mut eeprom = Eeprom::new(kind);
                eeprom.set_write_protect(write_protect);
                Box::new(eeprom)
            }
            DeviceCfg::Lm75 { temp, .. } => {
                let mut lm75 = Lm75::new();
                if let Some(temp) = temp {
                    lm75.set_temperature(temp);
                }
                Box::new(lm75)
            }
        }
    }
}
