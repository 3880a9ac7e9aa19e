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

    coupe_core::devices::hdc::atom.rs
*/
//! The Atom hard disk interface, fitted in a drive bay.
//!
//! base+6 latches the ATA register address and base+7 accesses the selected register.
//! Data words travel high byte first: reading the data register fetches a word and returns
//! its high byte, the next read returns the latched low byte. Writes latch the high byte
//! and the second write completes the word.

use crate::{
    bus::{IoDevice, NO_IO_BYTE},
    devices::{
        ata::ata_device::ATA_REG_DATA,
        hdc::{impl_hard_disk_device, DataLatch, HardDisk, ADDR_CONTROL_BLOCK, ADDR_REGISTER_MASK},
    },
    machine_types::DriveType,
};

pub const ATOM_REG_ADDRESS: u16 = 0x06;
pub const ATOM_REG_DATA: u16 = 0x07;
pub const ATOM_REG_MASK: u16 = 0x07;

pub struct AtomDevice {
    port_base: u16,
    address: u8,
    latch: DataLatch,
    pub(crate) disk: HardDisk,
}

impl AtomDevice {
    pub fn new(port_base: u16) -> Self {
        Self {
            port_base,
            address: 0,
            latch: DataLatch::default(),
            disk: HardDisk::new(DriveType::Atom),
        }
    }

    fn data_register_selected(&self) -> bool {
        self.address & ADDR_CONTROL_BLOCK == 0 && self.address & ADDR_REGISTER_MASK == ATA_REG_DATA
    }

    fn data_read(&mut self) -> u8 {
        if !self.data_register_selected() {
            return self.disk.register_read(self.address);
        }
        match self.latch.take() {
            Some(lo) => lo,
            None => {
                let [lo, hi] = self.disk.ata_mut().data_read_u16().to_le_bytes();
                self.latch.set(lo);
                hi
            }
        }
    }

    fn data_write(&mut self, data: u8) {
        if !self.data_register_selected() {
            self.disk.register_write(self.address, data);
            return;
        }
        match self.latch.take() {
            Some(hi) => self.disk.ata_mut().data_write_u16(u16::from_le_bytes([data, hi])),
            None => self.latch.set(data),
        }
    }
}

impl IoDevice for AtomDevice {
    fn reset(&mut self) {
        self.address = 0;
        self.latch.clear();
        self.disk.ata_mut().reset();
    }

    fn read_u8(&mut self, port: u16) -> u8 {
        if !self.disk.has_disk() {
            return NO_IO_BYTE;
        }
        match port & ATOM_REG_MASK {
            ATOM_REG_DATA => {
                self.disk.touch();
                self.data_read()
            }
            _ => NO_IO_BYTE,
        }
    }

    fn write_u8(&mut self, port: u16, data: u8) {
        match port & ATOM_REG_MASK {
            ATOM_REG_ADDRESS => {
                self.address = data;
                self.latch.clear();
            }
            ATOM_REG_DATA if self.disk.has_disk() => {
                self.disk.touch();
                self.data_write(data);
            }
            _ => {}
        }
    }

    fn frame_end(&mut self) {
        self.disk.frame_end();
    }

    fn load_state(&mut self, path: &std::path::Path) {
        self.disk.load_state(path);
    }

    fn save_state(&mut self, path: &std::path::Path) {
        self.disk.save_state(path);
    }

    fn port_list(&self) -> Vec<(String, u16)> {
        vec![
            ("Atom Address".to_string(), self.port_base + ATOM_REG_ADDRESS),
            ("Atom Data".to_string(), self.port_base + ATOM_REG_DATA),
        ]
    }
}

impl_hard_disk_device!(AtomDevice);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        device_traits::disk_device::DiskDevice,
        devices::{
            ata::ata_device::{ATA_REG_COMMAND, ATA_REG_DRIVE_HEAD, ATA_REG_SECTOR_COUNT, ATA_REG_SECTOR_NUMBER},
            hdc::test_util::hdd_image,
        },
    };

    const BASE: u16 = 240;

    fn select(atom: &mut AtomDevice, reg: u8) {
        atom.write_u8(BASE + ATOM_REG_ADDRESS, reg);
    }

    fn write_reg(atom: &mut AtomDevice, reg: u8, data: u8) {
        select(atom, reg);
        atom.write_u8(BASE + ATOM_REG_DATA, data);
    }

    #[test]
    fn words_arrive_high_byte_first() {
        let path = hdd_image("atom_read", 64);
        let mut atom = AtomDevice::new(BASE);
        assert_eq!(atom.read_u8(BASE + ATOM_REG_DATA), NO_IO_BYTE);
        assert!(atom.insert(&path, false));
        assert_eq!(atom.drive_type(), DriveType::Atom);

        // Overwrite LBA 2 with a known word, then read it back.
        write_reg(&mut atom, ATA_REG_SECTOR_COUNT, 1);
        write_reg(&mut atom, ATA_REG_SECTOR_NUMBER, 3);
        write_reg(&mut atom, ATA_REG_DRIVE_HEAD, 0);
        write_reg(&mut atom, ATA_REG_COMMAND, 0x30);
        select(&mut atom, ATA_REG_DATA);
        for _ in 0..256 {
            atom.write_u8(BASE + ATOM_REG_DATA, 0x12);
            atom.write_u8(BASE + ATOM_REG_DATA, 0x34);
        }
        assert!(atom.disk_modified());
        assert!(atom.is_light_on());

        write_reg(&mut atom, ATA_REG_COMMAND, 0x20);
        select(&mut atom, ATA_REG_DATA);
        assert_eq!(atom.read_u8(BASE + ATOM_REG_DATA), 0x12);
        assert_eq!(atom.read_u8(BASE + ATOM_REG_DATA), 0x34);

        let raw = std::fs::read(&path).unwrap();
        assert_eq!(&raw[1024..1026], &[0x34, 0x12]);

        assert!(atom.save());
        assert!(!atom.disk_modified());
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn status_reads_through_address_register() {
        let path = hdd_image("atom_status", 64);
        let mut atom = AtomDevice::new(BASE);
        assert!(atom.insert(&path, false));
        select(&mut atom, ATA_REG_COMMAND);
        assert_eq!(atom.read_u8(BASE + ATOM_REG_DATA), 0x50);
        // Ports other than address and data float.
        assert_eq!(atom.read_u8(BASE + 1), NO_IO_BYTE);

        atom.frame_end();
        atom.frame_end();
        assert!(!atom.is_active());
        let _ = std::fs::remove_file(path);
    }
}
