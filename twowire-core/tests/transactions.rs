mod common;

use std::sync::{Arc, Mutex};

use twowire_core::devices::{DeviceCfg, Eeprom, EepromKind, Lm75};
use twowire_core::gpio::{ByteState, WireState};
use twowire_core::{I2CGpio, I2CHub};

use common::{Master, Spy};

fn eeprom_on_bus(kind: EepromKind) -> (Arc<Mutex<Eeprom>>, Master<I2CHub>) {
    let eeprom = Arc::new(Mutex::new(Eeprom::new(kind)));
    let mut gpio = I2CGpio::new("ddc");
    gpio.bus_mut()
        .register_device(0x50, Box::new(Arc::clone(&eeprom)))
        .unwrap();
    (eeprom, Master::new(gpio))
}

#[test]
fn eeprom_random_read() {
    let (eeprom, mut m) = eeprom_on_bus(EepromKind::C02);
    eeprom.lock().unwrap().load(0x10, b"EDID");

    assert_eq!(m.write_read(0x50, &[0x10], 4), b"EDID");
    assert_eq!(m.gpio.wire_state(), WireState::Idle);
    assert_eq!(m.gpio.target(), None);

    // current address read picks up where the last one left off
    eeprom.lock().unwrap().load(0x14, &[0x01, 0x03]);
    assert_eq!(m.read(0x50, 2), &[0x01, 0x03]);
}

#[test]
fn eeprom_page_write() {
    let (eeprom, mut m) = eeprom_on_bus(EepromKind::C02);

    assert!(m.write(0x50, &[0x06, 1, 2, 3, 4]));
    assert_eq!(
        &eeprom.lock().unwrap().contents()[0x00..0x08],
        &[3, 4, 0xff, 0xff, 0xff, 0xff, 1, 2]
    );

    assert_eq!(m.write_read(0x50, &[0x06], 2), &[1, 2]);
}

#[test]
fn eeprom_two_byte_word_address() {
    let (eeprom, mut m) = eeprom_on_bus(EepromKind::C64);

    assert!(m.write(0x50, &[0x1f, 0xfe, 0xaa, 0xbb]));
    assert_eq!(&eeprom.lock().unwrap().contents()[0x1ffe..], &[0xaa, 0xbb]);
    assert_eq!(m.write_read(0x50, &[0x1f, 0xfe], 2), &[0xaa, 0xbb]);
}

#[test]
fn lm75_from_cfg() {
    let cfgs = [
        "lm75:addr=0x48,temp=-10.5".parse::<DeviceCfg>().unwrap(),
        "eeprom:addr=0x50,size=256,wp".parse::<DeviceCfg>().unwrap(),
    ];
    let mut m = Master::new(I2CGpio::with_bus(
        "smbus",
        I2CHub::from_cfgs("smbus", &cfgs).unwrap(),
    ));

    // pointer defaults to TEMP
    assert_eq!(m.read(0x48, 2), &[0xf5, 0x80]);

    // T_os = 90.5 C
    assert!(m.write(0x48, &[0x03, 0x5a, 0x80]));
    assert_eq!(m.write_read(0x48, &[0x03], 2), &[0x5a, 0x80]);

    // write-protected EEPROM ignores the data, the bus carries on
    assert!(m.write(0x50, &[0x00, 0x42]));
    assert_eq!(m.write_read(0x50, &[0x00], 1), &[0xff]);
}

#[test]
fn absent_device_is_ignored() {
    let (eeprom, mut m) = eeprom_on_bus(EepromKind::C02);

    m.start();
    m.write_byte(0x20 << 1);
    assert_eq!(m.gpio.byte_state(), ByteState::Invalid);
    m.write_byte(0x00);
    m.write_byte(0x42);
    m.stop();

    assert_eq!(m.gpio.byte_state(), ByteState::SlaveIdle);
    assert!(eeprom.lock().unwrap().contents().iter().all(|&b| b == 0xff));

    assert!(m.write(0x50, &[0x00, 0x42]));
    assert_eq!(eeprom.lock().unwrap().contents()[0], 0x42);
}

#[test]
fn switch_devices_on_repeated_start() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let eeprom = Arc::new(Mutex::new(Eeprom::new(EepromKind::C02)));
    let lm75 = Arc::new(Mutex::new(Lm75::new()));
    lm75.lock().unwrap().set_temperature(30 * 2);

    let mut hub = I2CHub::new("ddc");
    hub.register_device(0x50, Box::new(Spy::new("eeprom", Arc::clone(&eeprom), &log)))
        .unwrap();
    hub.register_device(0x48, Box::new(Spy::new("lm75", Arc::clone(&lm75), &log)))
        .unwrap();
    let mut m = Master::new(I2CGpio::with_bus("ddc", hub));

    // point the eeprom somewhere, then read the sensor instead
    m.start();
    m.write_byte(0xa0);
    m.write_byte(0x80);
    m.start();
    m.write_byte(0x48 << 1 | 1);
    assert_eq!(m.gpio.target(), Some(0x48));
    assert_eq!(m.read_byte(true), 0x1e);
    assert_eq!(m.read_byte(false), 0x00);
    m.stop();

    // one start and one stop for the whole transaction, whoever is addressed
    assert_eq!(
        *log.lock().unwrap(),
        vec!["eeprom start", "eeprom write 0x80", "lm75 read", "lm75 read", "lm75 stop"]
    );

    log.lock().unwrap().clear();
    eeprom.lock().unwrap().load(0x80, &[0x77]);
    assert_eq!(m.read(0x50, 1), &[0x77]);
    assert_eq!(
        *log.lock().unwrap(),
        vec!["eeprom start", "eeprom read", "eeprom stop"]
    );
}

#[test]
fn shared_bus() {
    let eeprom = Arc::new(Mutex::new(Eeprom::new(EepromKind::C01)));
    let mut hub = I2CHub::new("shared");
    hub.register_device(0x50, Box::new(Arc::clone(&eeprom)))
        .unwrap();
    let hub = Arc::new(Mutex::new(hub));

    let mut a = Master::new(I2CGpio::with_bus("a", Arc::clone(&hub)));
    let mut b = Master::new(I2CGpio::with_bus("b", Arc::clone(&hub)));

    assert!(a.write(0x50, &[0x7f, 0x5a]));
    assert_eq!(b.write_read(0x50, &[0x7f], 1), &[0x5a]);
    assert_eq!(eeprom.lock().unwrap().contents()[0x7f], 0x5a);
}

#[test]
fn borrowed_bus() {
    let eeprom = Arc::new(Mutex::new(Eeprom::new(EepromKind::C02)));
    let mut hub = I2CHub::new("borrowed");
    hub.register_device(0x50, Box::new(Arc::clone(&eeprom)))
        .unwrap();

    let mut m = Master::new(I2CGpio::with_bus("borrowed", &mut hub));
    assert!(m.write(0x50, &[0x00, 0x01]));
    let hub = m.gpio.close();

    assert!(hub.remove_device(0x50).is_some());
    assert_eq!(eeprom.lock().unwrap().contents()[0], 0x01);
}
