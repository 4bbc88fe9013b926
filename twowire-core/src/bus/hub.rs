use thiserror::Error;

use crate::bus::I2CBus;
use crate::devices::{Device, DeviceCfg, I2CDevice, Probe};
use crate::error::{I2CExceptionCtx, I2CResult};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HubError {
    #[error("i2c addresses cannot be greater than 0x7f (got {0:#04x?})")]
    InvalidAddress(u8),
    #[error("address {addr:#04x?} is already used by {device}")]
    AddressInUse { addr: u8, device: String },
}

/// A plain i2c bus, with up to 128 devices hanging off of it.
pub struct I2CHub {
    label: &'static str,
    devices: Vec<Option<Box<dyn I2CDevice>>>,
}

impl std::fmt::Debug for I2CHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let devices = self
            .devices
            .iter()
            .enumerate()
            .filter_map(|(addr, device)| Some((addr, device.as_ref()?.kind())))
            .collect::<Vec<_>>();

        f.debug_struct("I2CHub")
            .field("label", &self.label)
            .field("devices", &devices)
            .finish()
    }
}

impl I2CHub {
    pub fn new(label: &'static str) -> I2CHub {
        I2CHub {
            label,
            devices: (0..128).map(|_| None).collect(),
        }
    }

    /// Create a new hub populated with the configured devices.
    pub fn from_cfgs(label: &'static str, cfgs: &[DeviceCfg]) -> Result<I2CHub, HubError> {
        let mut hub = I2CHub::new(label);
        for cfg in cfgs {
            hub.register_device(cfg.addr(), cfg.build())?;
        }
        Ok(hub)
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    fn check_addr(addr: u8) -> Result<usize, HubError> {
        if addr > 0x7f {
            return Err(HubError::InvalidAddress(addr));
        }
        Ok(addr as usize)
    }

    /// Register a new i2c device with the hub, placing it at the given
    /// address.
    pub fn register_device(
        &mut self,
        addr: u8,
        device: Box<dyn I2CDevice>,
    ) -> Result<(), HubError> {
        let idx = I2CHub::check_addr(addr)?;
        if let Some(ref existing) = self.devices[idx] {
            return Err(HubError::AddressInUse {
                addr,
                device: Probe::from_device(existing),
            });
        }
        debug!(
            target: "I2C",
            "[{}] registered {} at {:#04x?}",
            self.label,
            Probe::from_device(&device),
            addr
        );
        self.devices[idx] = Some(device);
        Ok(())
    }

    /// Place a device at the given address, returning any previously
    /// registered device at that address.
    pub fn replace_device(
        &mut self,
        addr: u8,
        device: Box<dyn I2CDevice>,
    ) -> Result<Option<Box<dyn I2CDevice>>, HubError> {
        let idx = I2CHub::check_addr(addr)?;
        Ok(std::mem::replace(&mut self.devices[idx], Some(device)))
    }

    pub fn remove_device(&mut self, addr: u8) -> Option<Box<dyn I2CDevice>> {
        self.devices.get_mut(addr as usize)?.take()
    }

    pub fn device(&self, addr: u8) -> Option<&dyn I2CDevice> {
        self.devices.get(addr as usize)?.as_deref()
    }

    pub fn device_mut(&mut self, addr: u8) -> Option<&mut (dyn I2CDevice + 'static)> {
        self.devices.get_mut(addr as usize)?.as_deref_mut()
    }

    /// Iterate over the addresses which have devices registered.
    pub fn addresses(&self) -> impl Iterator<Item = u8> + '_ {
        self.devices
            .iter()
            .enumerate()
            .filter(|(_, device)| device.is_some())
            .map(|(addr, _)| addr as u8)
    }

    fn access(
        &mut self,
        addr: u8,
        op: &'static str,
        f: impl FnOnce(&mut dyn I2CDevice) -> I2CResult<u8>,
    ) -> u8 {
        let label = self.label;
        let device = match self.devices.get_mut(addr as usize) {
            Some(Some(device)) => device,
            _ => {
                debug!(target: "I2C", "[{}] {} on empty address {:#04x?}", label, op, addr);
                return 0xff;
            }
        };

        match f(&mut **device) {
            Ok(val) => val,
            Err(e) => e.resolve(
                "I2C",
                I2CExceptionCtx {
                    bus: label,
                    addr,
                    in_device: Probe::from_device(&**device),
                },
            ),
        }
    }
}

impl I2CBus for I2CHub {
    fn has_device(&self, addr: u8) -> bool {
        self.device(addr).is_some()
    }

    fn start(&mut self, addr: u8) {
        trace!(target: "I2C", "[{}] {:#04x?} start", self.label, addr);
        self.access(addr, "start", |device| device.start().map(|()| 0));
    }

    fn stop(&mut self, addr: u8) {
        trace!(target: "I2C", "[{}] {:#04x?} stop", self.label, addr);
        self.access(addr, "stop", |device| device.stop().map(|()| 0));
    }

    fn read(&mut self, addr: u8) -> u8 {
        let val = self.access(addr, "read", |device| device.read());
        trace!(target: "I2C", "[{}] {:#04x?} read -> {:#04x?}", self.label, addr, val);
        val
    }

    fn write(&mut self, addr: u8, data: u8) {
        trace!(target: "I2C", "[{}] {:#04x?} write {:#04x?}", self.label, addr, data);
        self.access(addr, "write", |device| device.write(data).map(|()| 0));
    }
}
