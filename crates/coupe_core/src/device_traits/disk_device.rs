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

    coupe_core::device_traits::disk_device.rs
*/
//! The capability set of a device that accepts removable or fixed media.

use std::path::Path;

use crate::{bus::IoDevice, device_types::activity::ActivityCounter, machine_types::DriveType};

/// A drive bay device. Media operations never panic: failures return `false` and leave the
/// device exactly as it was.
pub trait DiskDevice: IoDevice {
    fn drive_type(&self) -> DriveType;

    /// Mount the image at `path`. `auto_load` is recorded by the registry, which arms a disk
    /// autoload when this device sits in the boot drive.
    fn insert(&mut self, path: &Path, auto_load: bool) -> bool;

    fn eject(&mut self);

    /// Write back any modified media. The default has nothing to write.
    fn save(&mut self) -> bool {
        true
    }

    fn disk_path(&self) -> Option<&Path>;

    /// File name of the mounted image, for display.
    fn disk_file(&self) -> Option<String> {
        self.disk_path()
            .and_then(|p| p.file_name())
            .map(|name| name.to_string_lossy().into_owned())
    }

    fn has_disk(&self) -> bool {
        self.disk_path().is_some()
    }

    fn disk_modified(&self) -> bool;

    fn set_disk_modified(&mut self, modified: bool);

    /// Visual cue for the drive light. Devices with a motor or busy line override this.
    fn is_light_on(&self) -> bool {
        self.is_active()
    }

    fn activity(&self) -> &ActivityCounter;

    fn is_active(&self) -> bool {
        self.activity().is_active()
    }
}
