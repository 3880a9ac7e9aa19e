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

    coupe_core::io_config.rs
*/
//! Configuration of the I/O subsystem: what is plugged into each slot and where device state
//! lives. Deserialized from the `[io]` table of the configuration file.

use std::path::PathBuf;

use serde_derive::Deserialize;

use crate::machine_types::{AutoloadType, DriveType, ParallelType};

const fn _default_true() -> bool {
    true
}
const fn _default_boot_drive() -> u8 {
    1
}
const fn _default_floppy() -> DriveType {
    DriveType::Floppy
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct IoConfig {
    #[serde(default = "_default_floppy")]
    pub drive1: DriveType,
    #[serde(default)]
    pub drive2: DriveType,
    /// Which drive (1 or 2) the ROM boots from.
    #[serde(default = "_default_boot_drive")]
    pub boot_drive: u8,
    #[serde(default)]
    pub parallel1: ParallelType,
    #[serde(default)]
    pub parallel2: ParallelType,
    /// Where printer jobs are written. Without one, printed output only goes to the host channel.
    pub printer_spool_dir: Option<PathBuf>,
    #[serde(default = "_default_true")]
    pub sambus_clock: bool,
    /// Directory for per-device state (drive mounts, clock offset).
    pub state_dir: Option<PathBuf>,
    /// Emulate the ASIC ignoring its own ports for a moment after power-on.
    #[serde(default)]
    pub asic_startup: bool,
    pub port_trace_file: Option<PathBuf>,
    #[serde(default)]
    pub autoload: AutoloadType,
    pub disk1: Option<PathBuf>,
    pub disk2: Option<PathBuf>,
}

impl Default for IoConfig {
    fn default() -> Self {
        Self {
            drive1: DriveType::Floppy,
            drive2: DriveType::None,
            boot_drive: 1,
            parallel1: ParallelType::None,
            parallel2: ParallelType::None,
            printer_spool_dir: None,
            sambus_clock: true,
            state_dir: None,
            asic_startup: false,
            port_trace_file: None,
            autoload: AutoloadType::None,
            disk1: None,
            disk2: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_keys_take_defaults() {
        let config: IoConfig = toml::from_str("drive2 = \"atom_lite\"\nautoload = \"disk\"\n").unwrap();
        assert_eq!(config.drive1, DriveType::Floppy);
        assert_eq!(config.drive2, DriveType::AtomLite);
        assert_eq!(config.autoload, AutoloadType::Disk);
        assert_eq!(config.boot_drive, 1);
        assert!(config.sambus_clock);

        let empty: IoConfig = toml::from_str("").unwrap();
        assert_eq!(empty, IoConfig::default());
    }
}
