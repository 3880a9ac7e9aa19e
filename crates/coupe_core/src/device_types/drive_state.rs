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

    coupe_core::device_types::drive_state.rs
*/
//! Persisted state for a drive bay: which image was mounted and whether it had unsaved changes.
//! Stored as a small TOML file. A missing or unreadable file means power-on defaults.

use std::path::{Path, PathBuf};

use serde_derive::{Deserialize, Serialize};

use crate::machine_types::DriveType;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriveState {
    pub drive_type: DriveType,
    pub disk_path: Option<PathBuf>,
    pub modified: bool,
}

impl DriveState {
    pub fn load(path: &Path) -> Option<DriveState> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) => {
                log::debug!("No drive state at {}: {}", path.display(), e);
                return None;
            }
        };
        match toml::from_str::<DriveState>(&text) {
            Ok(state) => Some(state),
            Err(e) => {
                log::warn!("Ignoring corrupt drive state {}: {}", path.display(), e);
                None
            }
        }
    }

    pub fn save(&self, path: &Path) -> bool {
        let text = match toml::to_string(self) {
            Ok(text) => text,
            Err(e) => {
                log::error!("Failed to serialize drive state: {}", e);
                return false;
            }
        };
        if let Err(e) = std::fs::write(path, text) {
            log::error!("Failed to write drive state {}: {}", path.display(), e);
            return false;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corrupt_state_is_ignored() {
        let path = std::env::temp_dir().join(format!("coupe_drive_state_{}.toml", std::process::id()));
        std::fs::write(&path, "drive_type = 42\n[[[").unwrap();
        assert_eq!(DriveState::load(&path), None);

        let state = DriveState {
            drive_type: DriveType::AtomLite,
            disk_path: Some(PathBuf::from("disk.hdf")),
            modified: true,
        };
        assert!(state.save(&path));
        assert_eq!(DriveState::load(&path), Some(state));
        let _ = std::fs::remove_file(path);
    }
}
