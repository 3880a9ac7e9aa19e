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

    coupe_core::devices::empty.rs
*/
//! Placeholders occupying empty slots, so the registry never has to special-case a missing device.

use std::path::Path;

use crate::{
    bus::IoDevice,
    device_traits::disk_device::DiskDevice,
    device_types::activity::ActivityCounter,
    machine_types::DriveType,
};

/// A peripheral slot with nothing fitted. Reads float to 0xFF and writes are ignored.
pub struct NullDevice {
    name:  &'static str,
    ports: Vec<u16>,
}

impl NullDevice {
    pub fn new(name: &'static str, ports: &[u16]) -> Self {
        Self {
            name,
            ports: ports.to_vec(),
        }
    }
}

impl IoDevice for NullDevice {
    fn port_list(&self) -> Vec<(String, u16)> {
        self.ports.iter().map(|p| (format!("{} (empty)", self.name), *p)).collect()
    }
}

/// A drive bay with no drive fitted. Nothing can be inserted.
#[derive(Default)]
pub struct EmptyDrive {
    activity: ActivityCounter,
}

impl EmptyDrive {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IoDevice for EmptyDrive {
    fn port_list(&self) -> Vec<(String, u16)> {
        Vec::new()
    }
}

impl DiskDevice for EmptyDrive {
    fn drive_type(&self) -> DriveType {
        DriveType::None
    }

    fn insert(&mut self, path: &Path, _auto_load: bool) -> bool {
        log::warn!("No drive fitted, can't insert {}", path.display());
        false
    }

    fn eject(&mut self) {}

    fn disk_path(&self) -> Option<&Path> {
        None
    }

    fn disk_modified(&self) -> bool {
        false
    }

    fn set_disk_modified(&mut self, _modified: bool) {}

    fn activity(&self) -> &ActivityCounter {
        &self.activity
    }
}
