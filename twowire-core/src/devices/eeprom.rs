use crate::devices::prelude::*;

/// Supported 24Cxx parts.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum EepromKind {
    /// 128 bytes, 8 byte pages
    C01,
    /// 256 bytes, 8 byte pages
    C02,
    /// 4 KiB, 32 byte pages, 16-bit word address
    C32,
    /// 8 KiB, 32 byte pages, 16-bit word address
    C64,
}

impl EepromKind {
    pub fn size(self) -> usize {
        match self {
            EepromKind::C01 => 128,
            EepromKind::C02 => 256,
            EepromKind::C32 => 4096,
            EepromKind::C64 => 8192,
        }
    }

    pub fn page_size(self) -> usize {
        match self {
            EepromKind::C01 | EepromKind::C02 => 8,
            EepromKind::C32 | EepromKind::C64 => 32,
        }
    }

    /// Number of word address bytes sent after the device address.
    pub fn addr_bytes(self) -> u8 {
        match self {
            EepromKind::C01 | EepromKind::C02 => 1,
            EepromKind::C32 | EepromKind::C64 => 2,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            EepromKind::C01 => "24c01",
            EepromKind::C02 => "24c02",
            EepromKind::C32 => "24c32",
            EepromKind::C64 => "24c64",
        }
    }

    pub fn from_name(name: &str) -> Option<EepromKind> {
        let kind = match name.to_ascii_lowercase().as_str() {
            "24c01" => EepromKind::C01,
            "24c02" => EepromKind::C02,
            "24c32" => EepromKind::C32,
            "24c64" => EepromKind::C64,
            _ => return None,
        };
        Some(kind)
    }

    pub fn from_size(size: u64) -> Option<EepromKind> {
        [
            EepromKind::C01,
            EepromKind::C02,
            EepromKind::C32,
            EepromKind::C64,
        ]
        .iter()
        .copied()
        .find(|kind| kind.size() as u64 == size)
    }
}

/// 24Cxx serial EEPROM.
///
/// After a start condition, the first byte(s) written select the word
/// address. Subsequent writes are stored at the word address, which wraps
/// within the current page. Reads auto-increment across the whole array.
#[derive(Debug)]
pub struct Eeprom {
    kind: EepromKind,
    mem: Vec<u8>,
    ptr: u16,
    ptr_bytes_left: u8,
    write_protect: bool,
}

impl Eeprom {
    /// Create a new blank (0xff filled) EEPROM.
    pub fn new(kind: EepromKind) -> Eeprom {
        Eeprom {
            kind,
            mem: vec![0xff; kind.size()],
            ptr: 0,
            ptr_bytes_left: kind.addr_bytes(),
            write_protect: false,
        }
    }

    pub fn part(&self) -> EepromKind {
        self.kind
    }

    pub fn set_write_protect(&mut self, write_protect: bool) {
        self.write_protect = write_protect;
    }

    /// Copy `data` into the array at `offset`.
    ///
    /// Panics if the data doesn't fit.
    pub fn load(&mut self, offset: usize, data: &[u8]) {
        assert!(
            offset + data.len() <= self.mem.len(),
            "data does not fit in a {}",
            self.kind.name()
        );
        self.mem[offset..offset + data.len()].copy_from_slice(data);
    }

    pub fn contents(&self) -> &[u8] {
        &self.mem
    }

    fn mask(&self) -> u16 {
        (self.kind.size() - 1) as u16
    }
}

impl Device for Eeprom {
    fn kind(&self) -> &'static str {
        "Eeprom"
    }

    fn label(&self) -> Option<&'static str> {
        Some(self.kind.name())
    }

    fn probe(&self) -> Probe {
        Probe::Offset(self.ptr)
    }
}

impl I2CDevice for Eeprom {
    fn start(&mut self) -> I2CResult<()> {
        self.ptr_bytes_left = self.kind.addr_bytes();
        Ok(())
    }

    fn read(&mut self) -> I2CResult<u8> {
        // a read is a "current address read", no more word address bytes
        self.ptr_bytes_left = 0;

        let val = self.mem[self.ptr as usize];
        self.ptr = self.ptr.wrapping_add(1) & self.mask();
        Ok(val)
    }

    fn write(&mut self, data: u8) -> I2CResult<()> {
        if self.ptr_bytes_left != 0 {
            self.ptr_bytes_left -= 1;
            let shift = 8 * self.ptr_bytes_left as usize;
            let ptr = *self
                .ptr
                .set_bits(shift..shift + 8, data as u16);
            self.ptr = ptr & self.mask();
            return Ok(());
        }

        if self.write_protect {
            return Err(ContractViolation {
                msg: format!("write to write-protected {}", self.kind.name()),
                severity: Warn,
                stub_val: None,
            });
        }

        self.mem[self.ptr as usize] = data;

        let page_mask = (self.kind.page_size() - 1) as u16;
        self.ptr = (self.ptr & !page_mask) | (self.ptr.wrapping_add(1) & page_mask);
        Ok(())
    }

    fn stop(&mut self) -> I2CResult<()> {
        self.ptr_bytes_left = 0;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pointer_then_sequential_read() {
        let mut eeprom = Eeprom::new(EepromKind::C02);
        eeprom.load(0xfe, &[0xaa, 0xbb]);
        eeprom.load(0x00, &[0xcc]);

        eeprom.start().unwrap();
        eeprom.write(0xfe).unwrap();
        assert_eq!(eeprom.read(), Ok(0xaa));
        assert_eq!(eeprom.read(), Ok(0xbb));
        // wraps around at the end of the array
        assert_eq!(eeprom.read(), Ok(0xcc));
    }

    #[test]
    fn page_write_wraps_within_page() {
        let mut eeprom = Eeprom::new(EepromKind::C02);

        eeprom.start().unwrap();
        eeprom.write(0x06).unwrap();
        for b in &[1, 2, 3, 4] {
            eeprom.write(*b).unwrap();
        }
        eeprom.stop().unwrap();

        assert_eq!(&eeprom.contents()[0x00..0x08], &[3, 4, 0xff, 0xff, 0xff, 0xff, 1, 2]);
        assert_eq!(eeprom.contents()[0x08], 0xff);
    }

    #[test]
    fn two_byte_word_address() {
        let mut eeprom = Eeprom::new(EepromKind::C32);

        eeprom.start().unwrap();
        eeprom.write(0x0a).unwrap();
        eeprom.write(0xbc).unwrap();
        eeprom.write(0x42).unwrap();
        eeprom.stop().unwrap();

        assert_eq!(eeprom.contents()[0x0abc], 0x42);
        assert_eq!(eeprom.probe(), Probe::Offset(0x0abd));
    }

    #[test]
    fn word_address_is_masked_to_array() {
        let mut eeprom = Eeprom::new(EepromKind::C01);

        eeprom.start().unwrap();
        eeprom.write(0x85).unwrap();
        assert_eq!(eeprom.probe(), Probe::Offset(0x05));
    }

    #[test]
    fn write_protect() {
        let mut eeprom = Eeprom::new(EepromKind::C02);
        eeprom.set_write_protect(true);

        eeprom.start().unwrap();
        eeprom.write(0x10).unwrap();
        match eeprom.write(0x42) {
            Err(ContractViolation { severity, .. }) => assert_eq!(severity, Warn),
            other => panic!("unexpected result: {:?}", other),
        }
        assert_eq!(eeprom.contents()[0x10], 0xff);
    }

    #[test]
    fn kinds() {
        assert_eq!(EepromKind::from_name("24C64"), Some(EepromKind::C64));
        assert_eq!(EepromKind::from_name("24c08"), None);
        assert_eq!(EepromKind::from_size(256), Some(EepromKind::C02));
        assert_eq!(EepromKind::from_size(512), None);
    }
}
