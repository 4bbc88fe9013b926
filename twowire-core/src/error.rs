use thiserror::Error;

pub type I2CResult<T> = Result<T, I2CException>;

/// Exception resulting from an access to a downstream i2c device.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum I2CException {
    // -- Non-Fatal Errors -- //
    /// Device is using a stubbed write implementation.
    #[error("stubbed write")]
    StubWrite(log::Level),

    // -- Guest Access Violations -- //
    /// Attempted to read a write-only register / write to a read-only register.
    #[error("invalid access")]
    InvalidAccess,
    /// Performed an unexpected action on the device.
    ///
    /// e.g: selecting a register that doesn't exist, writing to a
    /// write-protected EEPROM, etc...
    #[error("{msg}")]
    ContractViolation {
        msg: String,
        severity: log::Level,
        stub_val: Option<u8>,
    },
}

/// Where an [`I2CException`] happened.
#[derive(Debug, Clone)]
pub struct I2CExceptionCtx<'a> {
    pub bus: &'a str,
    pub addr: u8,
    pub in_device: String,
}

impl std::fmt::Display for I2CExceptionCtx<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}][addr {:#04x?}][{}]", self.bus, self.addr, self.in_device)
    }
}

impl I2CException {
    /// Log the exception, returning the value a read should put on the bus.
    ///
    /// Nothing a device does can stall the bus, so every exception is resolved
    /// in place. Reads that don't come with a stub value float high (0xff).
    pub fn resolve(self, target: &'static str, ctx: I2CExceptionCtx<'_>) -> u8 {
        macro_rules! ilog {
            (($level:expr, $ctx:ident) => ($($args:tt)*)) => {
                if log_enabled!(target: target, $level) {
                    let $ctx = $ctx;
                    log!(target: target, $level, $($args)*)
                }
            };
        }

        use I2CException::*;
        match self {
            StubWrite(level) => {
                ilog! { (level, ctx) => ("{} stubbed write", ctx) }
                0xff
            }
            ContractViolation {
                msg,
                severity,
                stub_val,
            } => {
                ilog! { (severity, ctx) => ("{} {}", ctx, msg) }
                stub_val.unwrap_or(0xff)
            }
            InvalidAccess => {
                ilog! { (log::Level::Warn, ctx) => ("{} invalid access", ctx) }
                0xff
            }
        }
    }
}
