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

    coupe_core::devices::hdc::atom_lite.rs
*/
//! The Atom Lite hard disk interface.
//!
//! Same port layout as the Atom, but data moves one byte per bus cycle in buffer order, so
//! the host normally enables 8-bit transfers with SET FEATURES first.

use std::path::Path;

use crate::{
    bus::{IoDevice, NO_IO_BYTE},
    devices::hdc::{
        atom::{ATOM_REG_ADDRESS, ATOM_REG_DATA, ATOM_REG_MASK},
        impl_hard_disk_device,
        HardDisk,
    },
    machine_types::DriveType,
};

pub struct AtomLiteDevice {
    port_base: u16,
    address: u8,
    pub(crate) disk: HardDisk,
}

impl AtomLiteDevice {
    pub fn new(port_base: u16) -> Self {
        Self {
            port_base,
            address: 0,
            disk: HardDisk::new(DriveType::AtomLite),
        }
    }
}

impl IoDevice for AtomLiteDevice {
    fn reset(&mut self) {
        self.address = 0;
        self.disk.ata_mut().reset();
    }

    fn read_u8(&mut self, port: u16) -> u8 {
        if !self.disk.has_disk() || port & ATOM_REG_MASK != ATOM_REG_DATA {
            return NO_IO_BYTE;
        }
        self.disk.touch();
        self.disk.register_read(self.address)
    }

    fn write_u8(&mut self, port: u16, data: u8) {
        match port & ATOM_REG_MASK {
            ATOM_REG_ADDRESS => self.address = data,
            ATOM_REG_DATA if self.disk.has_disk() => {
                self.disk.touch();
                self.disk.register_write(self.address, data);
            }
            _ => {}
        }
    }

    fn frame_end(&mut self) {
        self.disk.frame_end();
    }

    fn load_state(&mut self, path: &Path) {
        self.disk.load_state(path);
    }

    fn save_state(&mut self, path: &Path) {
        self.disk.save_state(path);
    }

    fn port_list(&self) -> Vec<(String, u16)> {
        vec![
            ("Atom Lite Address".to_string(), self.port_base + ATOM_REG_ADDRESS),
            ("Atom Lite Data".to_string(), self.port_base + ATOM_REG_DATA),
        ]
    }
}

impl_hard_disk_device!(AtomLiteDevice);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        device_traits::disk_device::DiskDevice,
        devices::{
            ata::ata_device::{ATA_REG_COMMAND, ATA_REG_DATA, ATA_REG_DRIVE_HEAD, ATA_REG_FEATURES, ATA_REG_SECTOR_NUMBER},
            hdc::test_util::hdd_image,
        },
    };

    const BASE: u16 = 224;

    fn write_reg(dev: &mut AtomLiteDevice, reg: u8, data: u8) {
        dev.write_u8(BASE + ATOM_REG_ADDRESS, reg);
        dev.write_u8(BASE + ATOM_REG_DATA, data);
    }

    #[test]
    fn byte_wide_sector_read() {
        let path = hdd_image("atom_lite", 64);
        let mut dev = AtomLiteDevice::new(BASE);
        assert!(dev.insert(&path, false));

        write_reg(&mut dev, ATA_REG_FEATURES, 0x01);
        write_reg(&mut dev, ATA_REG_COMMAND, 0xEF);
        assert!(dev.disk.ata().eight_bit());

        write_reg(&mut dev, ATA_REG_SECTOR_NUMBER, 8);
        write_reg(&mut dev, ATA_REG_DRIVE_HEAD, 0);
        write_reg(&mut dev, ATA_REG_COMMAND, 0x21);
        dev.write_u8(BASE + ATOM_REG_ADDRESS, ATA_REG_DATA);
        let sector: Vec<u8> = (0..512).map(|_| dev.read_u8(BASE + ATOM_REG_DATA)).collect();
        assert!(sector.iter().all(|b| *b == 7));
        assert!(!dev.disk.ata().is_busy());

        dev.eject();
        assert!(!dev.has_disk());
        assert_eq!(dev.read_u8(BASE + ATOM_REG_DATA), NO_IO_BYTE);
        let _ = std::fs::remove_file(path);
    }
}
