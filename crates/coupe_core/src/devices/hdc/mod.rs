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

    coupe_core::devices::hdc::mod.rs
*/
//! Hard disk interfaces for the drive bays and the SD-IDE port pair.
//!
//! Each interface owns a [HardDisk]: the shared ATA device, its activity counter and the
//! persisted mount state. The interfaces differ only in how ports select ATA registers and
//! how the 16-bit data register is carried over the 8-bit bus.

pub mod atom;
pub mod atom_lite;
pub mod sdide;

use std::path::Path;

use crate::{
    device_types::{activity::ActivityCounter, drive_state::DriveState, image::HardDiskImage},
    devices::ata::ata_device::AtaDevice,
    machine_types::DriveType,
};

/// Register address bit selecting the control block (alternate status / device control)
/// instead of the task file.
pub const ADDR_CONTROL_BLOCK: u8 = 0x08;
pub const ADDR_REGISTER_MASK: u8 = 0x07;
/// Control block register holding alternate status / device control.
pub const CONTROL_REG_ALT_STATUS: u8 = 0x06;

/// Holds one half of a 16-bit data word between two 8-bit bus cycles.
#[derive(Copy, Clone, Debug, Default)]
pub struct DataLatch {
    byte: Option<u8>,
}

impl DataLatch {
    #[inline]
    pub fn take(&mut self) -> Option<u8> {
        self.byte.take()
    }
    #[inline]
    pub fn set(&mut self, byte: u8) {
        self.byte = Some(byte);
    }
    #[inline]
    pub fn clear(&mut self) {
        self.byte = None;
    }
}

pub struct HardDisk {
    drive_type: DriveType,
    ata: AtaDevice,
    activity: ActivityCounter,
}

impl HardDisk {
    pub fn new(drive_type: DriveType) -> Self {
        Self {
            drive_type,
            ata: AtaDevice::new(),
            activity: ActivityCounter::new(),
        }
    }

    pub fn drive_type(&self) -> DriveType {
        self.drive_type
    }

    pub fn ata(&self) -> &AtaDevice {
        &self.ata
    }

    pub fn ata_mut(&mut self) -> &mut AtaDevice {
        &mut self.ata
    }

    pub fn touch(&mut self) {
        self.activity.touch();
    }

    pub fn activity(&self) -> &ActivityCounter {
        &self.activity
    }

    pub fn has_disk(&self) -> bool {
        self.ata.has_image()
    }

    /// Read a register through the task file or control block.
    pub fn register_read(&mut self, addr: u8) -> u8 {
        if addr & ADDR_CONTROL_BLOCK != 0 {
            match addr & ADDR_REGISTER_MASK {
                CONTROL_REG_ALT_STATUS => self.ata.alternate_status_read(),
                _ => crate::bus::NO_IO_BYTE,
            }
        }
        else {
            self.ata.register_read(addr & ADDR_REGISTER_MASK)
        }
    }

    pub fn register_write(&mut self, addr: u8, data: u8) {
        if addr & ADDR_CONTROL_BLOCK != 0 {
            if addr & ADDR_REGISTER_MASK == CONTROL_REG_ALT_STATUS {
                self.ata.device_control_write(data);
            }
        }
        else {
            self.ata.register_write(addr & ADDR_REGISTER_MASK, data);
        }
    }

    pub fn insert(&mut self, path: &Path) -> bool {
        match HardDiskImage::open(path) {
            Ok(image) => {
                if self.ata.modified() {
                    log::warn!("Replacing modified disk {:?} without flushing", self.disk_path());
                }
                log::debug!("Attached {} to {} interface", path.display(), self.drive_type);
                self.ata.attach(image);
                true
            }
            Err(e) => {
                log::warn!("Failed to attach {}: {}", path.display(), e);
                false
            }
        }
    }

    pub fn eject(&mut self) {
        if self.ata.modified() {
            self.save();
        }
        self.ata.detach();
    }

    pub fn save(&mut self) -> bool {
        if !self.ata.modified() {
            return true;
        }
        match self.ata.flush() {
            Ok(()) => {
                self.ata.set_modified(false);
                true
            }
            Err(e) => {
                log::error!("Failed to flush disk {:?}: {}", self.disk_path(), e);
                false
            }
        }
    }

    pub fn disk_path(&self) -> Option<&Path> {
        self.ata.image().map(|image| image.path())
    }

    pub fn frame_end(&mut self) {
        self.activity.tick();
    }

    pub fn load_state(&mut self, path: &Path) {
        if let Some(state) = DriveState::load(path) {
            if state.drive_type != self.drive_type {
                log::warn!("Drive state {} is for a {} drive", path.display(), state.drive_type);
                return;
            }
            if let Some(disk_path) = state.disk_path {
                if self.insert(&disk_path) {
                    self.ata.set_modified(state.modified);
                }
            }
        }
    }

    pub fn save_state(&mut self, path: &Path) {
        let state = DriveState {
            drive_type: self.drive_type,
            disk_path: self.disk_path().map(Path::to_path_buf),
            modified: self.ata.modified(),
        };
        state.save(path);
    }
}

/// Implement [DiskDevice](crate::device_traits::disk_device::DiskDevice) for an interface
/// holding its [HardDisk] in a field named `disk`.
macro_rules! impl_hard_disk_device {
    ($t:ty) => {
        impl $crate::device_traits::disk_device::DiskDevice for $t {
            fn drive_type(&self) -> $crate::machine_types::DriveType {
                self.disk.drive_type()
            }

            fn insert(&mut self, path: &std::path::Path, _auto_load: bool) -> bool {
                self.disk.insert(path)
            }

            fn eject(&mut self) {
                self.disk.eject();
            }

            fn save(&mut self) -> bool {
                self.disk.save()
            }

            fn disk_path(&self) -> Option<&std::path::Path> {
                self.disk.disk_path()
            }

            fn disk_modified(&self) -> bool {
                self.disk.ata().modified()
            }

            fn set_disk_modified(&mut self, modified: bool) {
                self.disk.ata_mut().set_modified(modified);
            }

            fn is_light_on(&self) -> bool {
                self.disk.ata().is_busy() || self.disk.activity().is_active()
            }

            fn activity(&self) -> &$crate::device_types::activity::ActivityCounter {
                self.disk.activity()
            }
        }
    };
}

pub(crate) use impl_hard_disk_device;

#[cfg(test)]
pub(crate) mod test_util {
    use std::path::PathBuf;

    use crate::device_types::geometry::SECTOR_SIZE;

    /// A raw hard disk image whose every sector is filled with its own index.
    pub fn hdd_image(name: &str, sectors: usize) -> PathBuf {
        let path = std::env::temp_dir().join(format!("coupe_hdc_{}_{}.hdf", std::process::id(), name));
        let data: Vec<u8> = (0..sectors * SECTOR_SIZE).map(|i| (i / SECTOR_SIZE) as u8).collect();
        std::fs::write(&path, data).unwrap();
        path
    }
}
