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

    coupe_core::devices::hdc::sdide.rs
*/
//! The SD-IDE interface on its own port pair: 191 selects the ATA register and 189 accesses it.
//! The 16-bit data register is carried low byte first through a latch.

use std::path::Path;

use crate::{
    bus::{IoDevice, NO_IO_BYTE},
    devices::{
        ata::ata_device::ATA_REG_DATA,
        hdc::{impl_hard_disk_device, DataLatch, HardDisk, ADDR_CONTROL_BLOCK, ADDR_REGISTER_MASK},
    },
    machine_types::DriveType,
};

pub const SDIDE_DATA_PORT: u16 = 189;
pub const SDIDE_REG_PORT: u16 = 191;

pub struct SdIdeDevice {
    address: u8,
    latch: DataLatch,
    pub(crate) disk: HardDisk,
}

impl Default for SdIdeDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl SdIdeDevice {
    pub fn new() -> Self {
        Self {
            address: 0,
            latch: DataLatch::default(),
            disk: HardDisk::new(DriveType::SdIde),
        }
    }

    fn data_register_selected(&self) -> bool {
        self.address & ADDR_CONTROL_BLOCK == 0 && self.address & ADDR_REGISTER_MASK == ATA_REG_DATA
    }
}

impl IoDevice for SdIdeDevice {
    fn reset(&mut self) {
        self.address = 0;
        self.latch.clear();
        self.disk.ata_mut().reset();
    }

    fn read_u8(&mut self, port: u16) -> u8 {
        if !self.disk.has_disk() || port & 0xff != SDIDE_DATA_PORT {
            return NO_IO_BYTE;
        }
        self.disk.touch();
        if !self.data_register_selected() {
            return self.disk.register_read(self.address);
        }
        match self.latch.take() {
            Some(hi) => hi,
            None => {
                let [lo, hi] = self.disk.ata_mut().data_read_u16().to_le_bytes();
                self.latch.set(hi);
                lo
            }
        }
    }

    fn write_u8(&mut self, port: u16, data: u8) {
        match port & 0xff {
            SDIDE_REG_PORT => {
                self.address = data;
                self.latch.clear();
            }
            SDIDE_DATA_PORT if self.disk.has_disk() => {
                self.disk.touch();
                if !self.data_register_selected() {
                    self.disk.register_write(self.address, data);
                    return;
                }
                match self.latch.take() {
                    Some(lo) => self.disk.ata_mut().data_write_u16(u16::from_le_bytes([lo, data])),
                    None => self.latch.set(data),
                }
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
            ("SD-IDE Data".to_string(), SDIDE_DATA_PORT),
            ("SD-IDE Register".to_string(), SDIDE_REG_PORT),
        ]
    }
}

impl_hard_disk_device!(SdIdeDevice);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        device_traits::disk_device::DiskDevice,
        devices::{
            ata::ata_device::{ATA_REG_COMMAND, ATA_REG_CYLINDER_LOW, ATA_REG_DRIVE_HEAD, ATA_REG_SECTOR_NUMBER},
            hdc::{test_util::hdd_image, CONTROL_REG_ALT_STATUS},
        },
    };

    fn write_reg(dev: &mut SdIdeDevice, reg: u8, data: u8) {
        dev.write_u8(SDIDE_REG_PORT, reg);
        dev.write_u8(SDIDE_DATA_PORT, data);
    }

    #[test]
    fn identify_over_latched_port_pair() {
        let path = hdd_image("sdide", 1024);
        let mut dev = SdIdeDevice::new();
        assert!(dev.insert(&path, false));

        write_reg(&mut dev, ATA_REG_COMMAND, 0xEC);
        dev.write_u8(SDIDE_REG_PORT, ATA_REG_DATA);
        let block: Vec<u8> = (0..512).map(|_| dev.read_u8(SDIDE_DATA_PORT)).collect();
        // Word 1: cylinders, little endian.
        assert_eq!(&block[2..4], &[2, 0]);
        // Model number starts at word 27, byte swapped.
        assert_eq!(&block[54..56], b"oC");

        dev.write_u8(SDIDE_REG_PORT, ADDR_CONTROL_BLOCK | CONTROL_REG_ALT_STATUS);
        assert_eq!(dev.read_u8(SDIDE_DATA_PORT), 0x50);
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn software_reset_restores_signature() {
        let path = hdd_image("sdide_reset", 1024);
        let mut dev = SdIdeDevice::new();
        assert!(dev.insert(&path, false));

        write_reg(&mut dev, ATA_REG_SECTOR_NUMBER, 9);
        write_reg(&mut dev, ATA_REG_CYLINDER_LOW, 1);
        write_reg(&mut dev, ATA_REG_DRIVE_HEAD, 0x05);
        write_reg(&mut dev, ADDR_CONTROL_BLOCK | CONTROL_REG_ALT_STATUS, 0x04);
        write_reg(&mut dev, ADDR_CONTROL_BLOCK | CONTROL_REG_ALT_STATUS, 0x00);

        dev.write_u8(SDIDE_REG_PORT, ATA_REG_SECTOR_NUMBER);
        assert_eq!(dev.read_u8(SDIDE_DATA_PORT), 1);
        dev.write_u8(SDIDE_REG_PORT, ATA_REG_CYLINDER_LOW);
        assert_eq!(dev.read_u8(SDIDE_DATA_PORT), 0);
        assert_eq!(dev.drive_type(), DriveType::SdIde);
        let _ = std::fs::remove_file(path);
    }
}
