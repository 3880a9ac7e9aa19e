/*
    Coupe

    Copyright 2022-2025 Daniel Balsom

    Permission is hereby granted, free of charge, to any person obtaining a
    copy of this software and associated documentation files (the “Software”),
    to deal in the Software without restriction, including without limitation
    the rights to use, copy, modify, merge, publish, distribute, sublicense,
    and/or sell copies of the Software, and to permit persons to whom the
    Software is furnished to do so, subject to the following conditions:

    The above copyright notice and this permission notice shall be included in
    all copies or substantial portions of the Software.

    THE SOFTWARE IS PROVIDED “AS IS”, WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
    IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
    FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
    AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
    LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING
    FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER
    DEALINGS IN THE SOFTWARE.

    --------------------------------------------------------------------------

    coupe_core::registry.rs
*/
//! The device registry: every peripheral slot on the I/O bus and the port ranges that
//! select it.
//!
//! Slots are never empty. A slot with nothing fitted holds a [NullDevice] or [EmptyDrive],
//! so routing a port only has to pick the slot.

use std::{
    fmt,
    path::{Path, PathBuf},
    str::FromStr,
};

use fxhash::FxHashMap;

use crate::{
    bus::IoDevice,
    channel::BidirectionalChannel,
    device_traits::disk_device::DiskDevice,
    device_types::{drive_state::DriveState, geometry::floppy_format_from_size},
    devices::{
        clock::{SambusClock, CLOCK_PORT},
        empty::{EmptyDrive, NullDevice},
        floppy_drive::FloppyDrive,
        hdc::{
            atom::AtomDevice,
            atom_lite::AtomLiteDevice,
            sdide::{SdIdeDevice, SDIDE_DATA_PORT, SDIDE_REG_PORT},
        },
        lpt_port::{PrinterMessage, PrinterPort},
    },
    io_config::IoConfig,
    machine_types::{DriveType, ParallelType},
    tracelogger::TraceLogger,
};

pub const DRIVE1_PORT_BASE: u16 = 224;
pub const DRIVE2_PORT_BASE: u16 = 240;
pub const DRIVE_PORT_MASK: u16 = 0xF8;
pub const PRINT1_PORT_BASE: u16 = 232;
pub const PRINT2_PORT_BASE: u16 = 234;
pub const PRINT_PORT_MASK: u16 = 0xFC;
pub const SERIAL1_PORT: u16 = 236;
pub const SERIAL2_PORT: u16 = 237;
pub const SERIAL_PORT_MASK: u16 = 0xFE;
pub const SAMPLER_PORT: u16 = 127;
pub const QUAZAR_PORT: u16 = 208;
pub const SID_PORT: u16 = 212;

pub const DRIVE1_STATE_FILE: &str = "drive1.toml";
pub const DRIVE2_STATE_FILE: &str = "drive2.toml";
pub const CLOCK_STATE_FILE: &str = "clock.toml";

/// Names a drive bay. `Boot` resolves to whichever bay the ROM boots from.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum DriveSlot {
    Drive1,
    Drive2,
    Boot,
}

impl fmt::Display for DriveSlot {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DriveSlot::Drive1 => write!(f, "d1"),
            DriveSlot::Drive2 => write!(f, "d2"),
            DriveSlot::Boot => write!(f, "boot"),
        }
    }
}

impl FromStr for DriveSlot {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, String>
    where
        Self: Sized,
    {
        match s.to_lowercase().as_str() {
            "1" | "d1" | "drive1" => Ok(DriveSlot::Drive1),
            "2" | "d2" | "drive2" => Ok(DriveSlot::Drive2),
            "boot" => Ok(DriveSlot::Boot),
            _ => Err(format!("Bad value for drive slot: {}", s)),
        }
    }
}

/// Build the device for a drive bay of the given type.
pub fn make_drive(drive_type: DriveType, port_base: u16) -> Box<dyn DiskDevice> {
    match drive_type {
        DriveType::None => Box::new(EmptyDrive::new()),
        DriveType::Floppy => Box::new(FloppyDrive::new(port_base)),
        DriveType::Atom => Box::new(AtomDevice::new(port_base)),
        DriveType::AtomLite => Box::new(AtomLiteDevice::new(port_base)),
        DriveType::SdIde => Box::new(SdIdeDevice::new()),
    }
}

fn is_floppy_image(path: &Path) -> bool {
    std::fs::metadata(path)
        .map(|m| floppy_format_from_size(m.len() as usize).is_some())
        .unwrap_or(false)
}

/// A parallel port: a printer, or nothing.
enum ParallelSlot {
    Printer(PrinterPort),
    Empty(NullDevice),
}

impl ParallelSlot {
    fn device(&self) -> &dyn IoDevice {
        match self {
            ParallelSlot::Printer(printer) => printer,
            ParallelSlot::Empty(null) => null,
        }
    }

    fn device_mut(&mut self) -> &mut dyn IoDevice {
        match self {
            ParallelSlot::Printer(printer) => printer,
            ParallelSlot::Empty(null) => null,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum PortSlot {
    Drive1,
    Drive2,
    Parallel1,
    Parallel2,
    Serial1,
    Serial2,
    Clock,
    Sampler,
    Quazar,
    Sid,
}

pub struct DeviceRegistry {
    drive1: Box<dyn DiskDevice>,
    drive2: Box<dyn DiskDevice>,
    boot_drive: DriveSlot,
    parallel1: ParallelSlot,
    parallel2: ParallelSlot,
    serial1: Box<dyn IoDevice>,
    serial2: Box<dyn IoDevice>,
    clock: Box<dyn IoDevice>,
    sampler: Box<dyn IoDevice>,
    quazar: Box<dyn IoDevice>,
    sid: Box<dyn IoDevice>,
    state_dir: Option<PathBuf>,
    autoload_request: bool,
}

impl DeviceRegistry {
    pub fn new(config: &IoConfig) -> Self {
        let boot_drive = match config.boot_drive {
            2 => DriveSlot::Drive2,
            1 => DriveSlot::Drive1,
            n => {
                log::warn!("Invalid boot drive {}, using drive 1", n);
                DriveSlot::Drive1
            }
        };

        let make_parallel = |kind: ParallelType, port_base: u16| match kind {
            ParallelType::Printer => ParallelSlot::Printer(PrinterPort::new(
                port_base,
                config.printer_spool_dir.clone(),
                TraceLogger::None,
            )),
            ParallelType::None => ParallelSlot::Empty(NullDevice::new("Parallel", &[port_base, port_base + 1])),
        };
        let parallel1 = make_parallel(config.parallel1, PRINT1_PORT_BASE);
        let parallel2 = make_parallel(config.parallel2, PRINT2_PORT_BASE);

        let clock: Box<dyn IoDevice> = if config.sambus_clock {
            Box::new(SambusClock::new())
        }
        else {
            Box::new(NullDevice::new("SAMBUS Clock", &[CLOCK_PORT]))
        };

        log::debug!(
            "Device registry: drive 1 {}, drive 2 {}, boot {}",
            config.drive1,
            config.drive2,
            boot_drive
        );

        Self {
            drive1: make_drive(config.drive1, DRIVE1_PORT_BASE),
            drive2: make_drive(config.drive2, DRIVE2_PORT_BASE),
            boot_drive,
            parallel1,
            parallel2,
            serial1: Box::new(NullDevice::new("Serial 1", &[SERIAL1_PORT])),
            serial2: Box::new(NullDevice::new("Serial 2", &[SERIAL2_PORT])),
            clock,
            sampler: Box::new(NullDevice::new("Sampler", &[SAMPLER_PORT])),
            quazar: Box::new(NullDevice::new("Quazar Surround", &[QUAZAR_PORT])),
            sid: Box::new(NullDevice::new("SID Interface", &[SID_PORT])),
            state_dir: config.state_dir.clone(),
            autoload_request: false,
        }
    }

    /// Resolve `Boot` to the bay it aliases.
    pub fn resolve(&self, slot: DriveSlot) -> DriveSlot {
        match slot {
            DriveSlot::Boot => self.boot_drive,
            other => other,
        }
    }

    pub fn boot_drive(&self) -> DriveSlot {
        self.boot_drive
    }

    pub fn drive(&self, slot: DriveSlot) -> &dyn DiskDevice {
        match self.resolve(slot) {
            DriveSlot::Drive2 => self.drive2.as_ref(),
            _ => self.drive1.as_ref(),
        }
    }

    pub fn drive_mut(&mut self, slot: DriveSlot) -> &mut dyn DiskDevice {
        match self.resolve(slot) {
            DriveSlot::Drive2 => self.drive2.as_mut(),
            _ => self.drive1.as_mut(),
        }
    }

    fn drive_box_mut(&mut self, slot: DriveSlot) -> &mut Box<dyn DiskDevice> {
        match self.resolve(slot) {
            DriveSlot::Drive2 => &mut self.drive2,
            _ => &mut self.drive1,
        }
    }

    fn port_base(&self, slot: DriveSlot) -> u16 {
        match self.resolve(slot) {
            DriveSlot::Drive2 => DRIVE2_PORT_BASE,
            _ => DRIVE1_PORT_BASE,
        }
    }

    /// Replace the drive in a bay. Modified media in the old drive is written back first.
    pub fn set_drive_type(&mut self, slot: DriveSlot, drive_type: DriveType) {
        let port_base = self.port_base(slot);
        let drive = self.drive_box_mut(slot);
        if drive.drive_type() == drive_type {
            return;
        }
        if drive.disk_modified() {
            drive.save();
        }
        log::debug!("Drive {} changed from {} to {}", slot, drive.drive_type(), drive_type);
        *drive = make_drive(drive_type, port_base);
    }

    /// Mount media in a bay. An empty bay gets a floppy drive when the image looks like a
    /// floppy. On success with `auto_load` into the boot drive a disk autoload is requested.
    pub fn insert(&mut self, slot: DriveSlot, path: &Path, auto_load: bool) -> bool {
        if self.drive(slot).drive_type() == DriveType::None && is_floppy_image(path) {
            let floppy = make_drive(DriveType::Floppy, self.port_base(slot));
            if !self.fit_drive(slot, floppy, path, auto_load) {
                return false;
            }
        }
        else if !self.drive_mut(slot).insert(path, auto_load) {
            return false;
        }

        if auto_load && self.resolve(slot) == self.boot_drive {
            self.autoload_request = true;
        }
        true
    }

    /// Install `drive` in the bay only once it has accepted the image. On failure the bay
    /// keeps its previous drive.
    fn fit_drive(&mut self, slot: DriveSlot, mut drive: Box<dyn DiskDevice>, path: &Path, auto_load: bool) -> bool {
        if !drive.insert(path, auto_load) {
            return false;
        }
        log::debug!("Fitted {} drive to bay {} for {}", drive.drive_type(), slot, path.display());
        *self.drive_box_mut(slot) = drive;
        true
    }

    pub fn eject(&mut self, slot: DriveSlot) {
        self.drive_mut(slot).eject();
    }

    /// Take a pending autoload request raised by [insert](Self::insert).
    pub fn take_autoload_request(&mut self) -> bool {
        std::mem::take(&mut self.autoload_request)
    }

    /// Connect the host to the printer on parallel port `n` (0 or 1), if one is fitted, and
    /// return the host endpoint.
    pub fn connect_printer(&mut self, n: usize) -> Option<BidirectionalChannel<PrinterMessage>> {
        let slot = match n {
            0 => &mut self.parallel1,
            1 => &mut self.parallel2,
            _ => return None,
        };
        match slot {
            ParallelSlot::Printer(printer) => Some(printer.connect()),
            ParallelSlot::Empty(_) => None,
        }
    }

    /// Find the slot decoding `port`, or `None` if no slot decodes it.
    fn route(&self, port: u16) -> Option<PortSlot> {
        let low = port & 0xFF;
        if low & DRIVE_PORT_MASK == DRIVE1_PORT_BASE {
            return Some(PortSlot::Drive1);
        }
        if low & DRIVE_PORT_MASK == DRIVE2_PORT_BASE {
            return Some(PortSlot::Drive2);
        }
        if low & PRINT_PORT_MASK == PRINT1_PORT_BASE {
            return if low & 0x02 == 0 {
                Some(PortSlot::Parallel1)
            }
            else {
                Some(PortSlot::Parallel2)
            };
        }
        if low & SERIAL_PORT_MASK == SERIAL1_PORT {
            return if low == SERIAL1_PORT {
                Some(PortSlot::Serial1)
            }
            else {
                Some(PortSlot::Serial2)
            };
        }
        match low {
            SDIDE_DATA_PORT | SDIDE_REG_PORT => {
                if self.drive2.drive_type() == DriveType::SdIde {
                    Some(PortSlot::Drive2)
                }
                else if self.drive1.drive_type() == DriveType::SdIde {
                    Some(PortSlot::Drive1)
                }
                else {
                    None
                }
            }
            CLOCK_PORT => Some(PortSlot::Clock),
            SAMPLER_PORT => Some(PortSlot::Sampler),
            QUAZAR_PORT => Some(PortSlot::Quazar),
            SID_PORT => Some(PortSlot::Sid),
            _ => None,
        }
    }

    fn peripheral_mut(&mut self, slot: PortSlot) -> &mut dyn IoDevice {
        match slot {
            PortSlot::Parallel1 => self.parallel1.device_mut(),
            PortSlot::Parallel2 => self.parallel2.device_mut(),
            PortSlot::Serial1 => self.serial1.as_mut(),
            PortSlot::Serial2 => self.serial2.as_mut(),
            PortSlot::Clock => self.clock.as_mut(),
            PortSlot::Sampler => self.sampler.as_mut(),
            PortSlot::Quazar => self.quazar.as_mut(),
            // Drives are dispatched by the caller.
            PortSlot::Sid | PortSlot::Drive1 | PortSlot::Drive2 => self.sid.as_mut(),
        }
    }

    /// Read from the slot decoding `port`. `None` means nothing decodes it.
    pub fn read_u8(&mut self, port: u16) -> Option<u8> {
        let byte = match self.route(port)? {
            PortSlot::Drive1 => self.drive1.read_u8(port),
            PortSlot::Drive2 => self.drive2.read_u8(port),
            slot => self.peripheral_mut(slot).read_u8(port),
        };
        Some(byte)
    }

    /// Write to the slot decoding `port`. Returns whether any slot decoded it.
    pub fn write_u8(&mut self, port: u16, data: u8) -> bool {
        match self.route(port) {
            Some(PortSlot::Drive1) => self.drive1.write_u8(port, data),
            Some(PortSlot::Drive2) => self.drive2.write_u8(port, data),
            Some(slot) => self.peripheral_mut(slot).write_u8(port, data),
            None => return false,
        }
        true
    }

    pub fn reset(&mut self) {
        self.drive1.reset();
        self.drive2.reset();
        for device in self.peripherals_mut() {
            device.reset();
        }
        self.autoload_request = false;
    }

    pub fn frame_end(&mut self) {
        self.drive1.frame_end();
        self.drive2.frame_end();
        for device in self.peripherals_mut() {
            device.frame_end();
        }
    }

    fn peripherals_mut(&mut self) -> [&mut dyn IoDevice; 8] {
        [
            self.parallel1.device_mut(),
            self.parallel2.device_mut(),
            self.serial1.as_mut(),
            self.serial2.as_mut(),
            self.clock.as_mut(),
            self.sampler.as_mut(),
            self.quazar.as_mut(),
            self.sid.as_mut(),
        ]
    }

    /// Descriptions of every port a fitted device answers, for the port statistics display.
    pub fn port_list(&self) -> Vec<(String, u16)> {
        let mut ports = self.drive1.port_list();
        ports.extend(self.drive2.port_list());
        for device in [
            self.parallel1.device(),
            self.parallel2.device(),
            self.serial1.as_ref(),
            self.serial2.as_ref(),
            self.clock.as_ref(),
            self.sampler.as_ref(),
            self.quazar.as_ref(),
            self.sid.as_ref(),
        ] {
            ports.extend(device.port_list());
        }
        ports
    }

    pub fn io_desc_map(&self) -> FxHashMap<u16, String> {
        self.port_list().into_iter().map(|(desc, port)| (port, desc)).collect()
    }

    /// Restore persisted device state from the state directory, if one is configured.
    pub fn load_state(&mut self) {
        if let Some(dir) = self.state_dir.clone() {
            self.load_drive_state(DriveSlot::Drive1, &dir.join(DRIVE1_STATE_FILE));
            self.load_drive_state(DriveSlot::Drive2, &dir.join(DRIVE2_STATE_FILE));
            self.clock.load_state(&dir.join(CLOCK_STATE_FILE));
        }
    }

    /// An empty bay is refitted with the drive kind recorded in its state file, so media
    /// hot-plugged into it comes back after a restart.
    fn load_drive_state(&mut self, slot: DriveSlot, path: &Path) {
        if self.drive(slot).drive_type() == DriveType::None {
            if let Some(state) = DriveState::load(path) {
                if state.drive_type != DriveType::None {
                    log::debug!("Refitting {} drive to bay {} from saved state", state.drive_type, slot);
                    *self.drive_box_mut(slot) = make_drive(state.drive_type, self.port_base(slot));
                }
            }
        }
        self.drive_mut(slot).load_state(path);
    }

    pub fn save_state(&mut self) {
        if let Some(dir) = self.state_dir.clone() {
            if let Err(e) = std::fs::create_dir_all(&dir) {
                log::error!("Failed to create state directory {}: {}", dir.display(), e);
                return;
            }
            self.drive1.save_state(&dir.join(DRIVE1_STATE_FILE));
            self.drive2.save_state(&dir.join(DRIVE2_STATE_FILE));
            self.clock.save_state(&dir.join(CLOCK_STATE_FILE));
        }
    }

    /// Write back modified media in both bays. Returns false if either save failed.
    pub fn save_media(&mut self) -> bool {
        let saved1 = self.drive1.save();
        let saved2 = self.drive2.save();
        saved1 && saved2
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::NO_IO_BYTE;

    fn floppy_image(name: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("coupe_registry_{}_{}.mgt", std::process::id(), name));
        std::fs::write(&path, vec![0u8; 819_200]).unwrap();
        path
    }

    #[test]
    fn drive_slot_parses() {
        assert_eq!("D2".parse::<DriveSlot>(), Ok(DriveSlot::Drive2));
        assert_eq!("boot".parse::<DriveSlot>(), Ok(DriveSlot::Boot));
        assert!("3".parse::<DriveSlot>().is_err());
    }

    #[test]
    fn ports_route_to_slots() {
        let config = IoConfig {
            parallel1: ParallelType::Printer,
            sambus_clock: false,
            ..IoConfig::default()
        };
        let mut registry = DeviceRegistry::new(&config);

        // Floppy track register in drive 1, nothing fitted in drive 2.
        assert_eq!(registry.read_u8(225), Some(0));
        assert_eq!(registry.read_u8(241), Some(NO_IO_BYTE));
        // Printer 1 status floats high except BUSY, printer 2 is absent.
        assert_eq!(registry.read_u8(233), Some(0xFE));
        assert_eq!(registry.read_u8(235), Some(NO_IO_BYTE));
        assert_eq!(registry.read_u8(0x1000 | CLOCK_PORT), Some(NO_IO_BYTE));
        // No SD-IDE interface fitted.
        assert_eq!(registry.read_u8(SDIDE_DATA_PORT), None);
        assert_eq!(registry.read_u8(100), None);
        assert!(!registry.write_u8(100, 0));
        assert!(registry.write_u8(SID_PORT, 0));

        assert!(registry.connect_printer(0).is_some());
        assert!(registry.connect_printer(1).is_none());
    }

    #[test]
    fn empty_bay_takes_a_floppy() {
        let path = floppy_image("hotplug");
        let mut registry = DeviceRegistry::new(&IoConfig {
            drive1: DriveType::None,
            ..IoConfig::default()
        });
        assert!(!registry.insert(DriveSlot::Drive1, Path::new("missing.mgt"), false));
        assert_eq!(registry.drive(DriveSlot::Drive1).drive_type(), DriveType::None);

        assert!(registry.insert(DriveSlot::Boot, &path, true));
        assert_eq!(registry.drive(DriveSlot::Drive1).drive_type(), DriveType::Floppy);
        assert_eq!(registry.drive(DriveSlot::Drive1).disk_path(), Some(path.as_path()));
        assert!(registry.take_autoload_request());
        assert!(!registry.take_autoload_request());

        registry.eject(DriveSlot::Drive1);
        assert!(!registry.drive(DriveSlot::Drive1).has_disk());
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn rejected_drive_is_not_fitted() {
        let mut registry = DeviceRegistry::new(&IoConfig {
            drive2: DriveType::None,
            ..IoConfig::default()
        });
        let floppy = make_drive(DriveType::Floppy, DRIVE2_PORT_BASE);
        assert!(!registry.fit_drive(DriveSlot::Drive2, floppy, Path::new("missing.mgt"), false));
        assert_eq!(registry.drive(DriveSlot::Drive2).drive_type(), DriveType::None);
        assert_eq!(registry.read_u8(241), Some(NO_IO_BYTE));

        let path = floppy_image("fit");
        let floppy = make_drive(DriveType::Floppy, DRIVE2_PORT_BASE);
        assert!(registry.fit_drive(DriveSlot::Drive2, floppy, &path, false));
        assert_eq!(registry.drive(DriveSlot::Drive2).drive_type(), DriveType::Floppy);
        assert!(registry.drive(DriveSlot::Drive2).has_disk());
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn hot_plugged_drive_restored_from_state() {
        let state_dir = std::env::temp_dir().join(format!("coupe_registry_{}_state", std::process::id()));
        let path = floppy_image("restore");
        let config = IoConfig {
            drive2: DriveType::None,
            sambus_clock: false,
            state_dir: Some(state_dir.clone()),
            ..IoConfig::default()
        };

        let mut registry = DeviceRegistry::new(&config);
        assert!(registry.insert(DriveSlot::Drive2, &path, false));
        registry.drive_mut(DriveSlot::Drive2).set_disk_modified(true);
        registry.save_state();

        let mut fresh = DeviceRegistry::new(&config);
        assert_eq!(fresh.drive(DriveSlot::Drive2).drive_type(), DriveType::None);
        fresh.load_state();
        let drive = fresh.drive(DriveSlot::Drive2);
        assert_eq!(drive.drive_type(), DriveType::Floppy);
        assert!(drive.has_disk());
        assert!(drive.disk_modified());

        let _ = std::fs::remove_dir_all(state_dir);
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn autoload_only_from_boot_drive() {
        let path = floppy_image("boot");
        let mut registry = DeviceRegistry::new(&IoConfig {
            drive2: DriveType::Floppy,
            boot_drive: 2,
            ..IoConfig::default()
        });
        assert_eq!(registry.resolve(DriveSlot::Boot), DriveSlot::Drive2);
        assert!(registry.insert(DriveSlot::Drive1, &path, true));
        assert!(!registry.take_autoload_request());
        assert!(registry.insert(DriveSlot::Drive2, &path, true));
        assert!(registry.take_autoload_request());
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn sdide_prefers_drive2() {
        let mut registry = DeviceRegistry::new(&IoConfig::default());
        registry.set_drive_type(DriveSlot::Drive2, DriveType::SdIde);
        assert_eq!(registry.drive(DriveSlot::Drive2).drive_type(), DriveType::SdIde);
        // Answers the port but has no disk mounted.
        assert_eq!(registry.read_u8(SDIDE_DATA_PORT), Some(NO_IO_BYTE));
        // Changing type back removes it from the IDE ports.
        registry.set_drive_type(DriveSlot::Drive2, DriveType::None);
        assert_eq!(registry.read_u8(SDIDE_DATA_PORT), None);
    }
}
