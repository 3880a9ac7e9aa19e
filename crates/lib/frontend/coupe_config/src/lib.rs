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

    coupe_config::lib.rs
*/
//! The `coupe_config` crate parses Coupe's configuration file and overlays command line
//! arguments on top of the configuration file settings. Command line arguments always take
//! priority over the configuration file.
//!
//! Features:
//! - `use_bpaf`: Enable BPAF support for command line argument parsing.

#[cfg(feature = "use_bpaf")]
mod bpaf_config;
pub mod mount;

use std::path::Path;

#[cfg(feature = "use_bpaf")]
pub use bpaf_config::{cli_args, CmdLineArgs};

use cfg_if::cfg_if;
use coupe_core::{AutoloadType, DriveSlot, IoConfig};
use serde_derive::Deserialize;

const fn _default_frames() -> u64 {
    500
}

#[derive(Debug, Deserialize)]
pub struct Emulator {
    /// Frames the headless driver runs before shutting down.
    #[serde(default = "_default_frames")]
    pub frames: u64,
    #[serde(default)]
    pub dump_io_stats: bool,
}

impl Default for Emulator {
    fn default() -> Self {
        Self {
            frames: _default_frames(),
            dump_io_stats: false,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ConfigFileParams {
    #[serde(default)]
    pub emulator: Emulator,
    #[serde(default)]
    pub io: IoConfig,
}

impl ConfigFileParams {
    #[cfg(feature = "use_bpaf")]
    pub fn overlay(&mut self, shell_args: CmdLineArgs) {
        if let Some(drive1) = shell_args.drive1 {
            self.io.drive1 = drive1;
        }
        if let Some(drive2) = shell_args.drive2 {
            self.io.drive2 = drive2;
        }
        if let Some(autoload) = shell_args.autoload {
            self.io.autoload = autoload;
        }
        if let Some(frames) = shell_args.frames {
            self.emulator.frames = frames;
        }
        if let Some(state_dir) = shell_args.state_dir {
            self.io.state_dir = Some(state_dir);
        }
        if let Some(port_trace_file) = shell_args.port_trace_file {
            self.io.port_trace_file = Some(port_trace_file);
        }

        self.io.asic_startup |= shell_args.asic_startup;
        self.io.sambus_clock &= !shell_args.no_clock;
        self.emulator.dump_io_stats |= shell_args.dump_io_stats;

        for mount in shell_args.mounts {
            let slot = match mount.slot {
                DriveSlot::Boot if self.io.boot_drive == 2 => DriveSlot::Drive2,
                DriveSlot::Boot => DriveSlot::Drive1,
                other => other,
            };
            if mount.auto_load() && slot == self.boot_slot() {
                self.io.autoload = AutoloadType::Disk;
            }
            match slot {
                DriveSlot::Drive2 => self.io.disk2 = Some(mount.path),
                _ => self.io.disk1 = Some(mount.path),
            }
        }
    }

    fn boot_slot(&self) -> DriveSlot {
        if self.io.boot_drive == 2 {
            DriveSlot::Drive2
        }
        else {
            DriveSlot::Drive1
        }
    }
}

/// Parse a TOML configuration string without any command line overlay.
pub fn parse_config(toml_string: impl AsRef<str>) -> Result<ConfigFileParams, anyhow::Error> {
    let toml_args: ConfigFileParams = toml::from_str(toml_string.as_ref())?;
    Ok(toml_args)
}

#[cfg(feature = "use_bpaf")]
pub fn read_config(toml_string: impl AsRef<str>, shell_args: CmdLineArgs) -> Result<ConfigFileParams, anyhow::Error> {
    let mut toml_args = parse_config(toml_string)?;

    // Command line arguments override config file arguments
    toml_args.overlay(shell_args);
    Ok(toml_args)
}

/// Read the TOML configuration from a file path, parse and overlay command line arguments.
/// A missing default file means built-in defaults; a file named on the command line must exist.
pub fn read_config_file<P>(default_path: P) -> Result<ConfigFileParams, anyhow::Error>
where
    P: AsRef<Path>,
{
    cfg_if! {
        if #[cfg(feature = "use_bpaf")] {
            log::debug!("Reading command line arguments...");
            let shell_args = cli_args().run();

            // Allow configuration file path to be overridden by command line argument 'config_file'
            let toml_string = if let Some(configfile_path) = shell_args.config_file.as_ref() {
                std::fs::read_to_string(configfile_path)?
            }
            else {
                read_default_file(default_path.as_ref())
            };

            read_config(toml_string, shell_args)
        } else {
            log::debug!("Argument reading disabled...");
            parse_config(read_default_file(default_path.as_ref()))
        }
    }
}

fn read_default_file(path: &Path) -> String {
    match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) => {
            log::warn!("Couldn't read {}: {}, using defaults", path.display(), e);
            String::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coupe_core::{DriveType, ParallelType};
    use std::path::PathBuf;

    const CONFIG: &str = r#"
[emulator]
frames = 50

[io]
drive2 = "atom"
boot_drive = 2
parallel1 = "printer"
sambus_clock = true
"#;

    #[test]
    fn file_values_and_defaults() {
        let config = parse_config(CONFIG).unwrap();
        assert_eq!(config.emulator.frames, 50);
        assert!(!config.emulator.dump_io_stats);
        assert_eq!(config.io.drive1, DriveType::Floppy);
        assert_eq!(config.io.drive2, DriveType::Atom);
        assert_eq!(config.io.parallel1, ParallelType::Printer);

        let empty = parse_config("").unwrap();
        assert_eq!(empty.emulator.frames, 500);
        assert_eq!(empty.io, IoConfig::default());

        assert!(parse_config("[io]\ndrive1 = \"tape\"").is_err());
    }

    #[cfg(feature = "use_bpaf")]
    #[test]
    fn command_line_wins() {
        let args = CmdLineArgs {
            drive2: Some(DriveType::SdIde),
            frames: Some(3),
            no_clock: true,
            mounts: vec!["boot:hd.hdf?autoload".parse().unwrap(), "d1:disk.mgt".parse().unwrap()],
            ..CmdLineArgs::default()
        };
        let config = read_config(CONFIG, args).unwrap();
        assert_eq!(config.io.drive2, DriveType::SdIde);
        assert_eq!(config.emulator.frames, 3);
        assert!(!config.io.sambus_clock);
        // Boot resolves to drive 2 from the file.
        assert_eq!(config.io.disk2, Some(PathBuf::from("hd.hdf")));
        assert_eq!(config.io.disk1, Some(PathBuf::from("disk.mgt")));
        assert_eq!(config.io.autoload, AutoloadType::Disk);
    }
}
