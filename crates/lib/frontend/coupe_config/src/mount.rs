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

    coupe_config::mount.rs
*/
use std::{path::PathBuf, str::FromStr};

use coupe_core::DriveSlot;
use fxhash::FxHashMap;

/// Media to mount at startup, given on the command line as `d1:disk.mgt` or
/// `boot:disk.mgt?autoload`.
#[derive(Debug, PartialEq)]
pub struct MountSpec {
    pub slot:    DriveSlot,
    pub path:    PathBuf,
    pub options: FxHashMap<String, String>,
}

impl MountSpec {
    pub fn auto_load(&self) -> bool {
        self.options.get("autoload").is_some_and(|v| v != "false")
    }
}

impl FromStr for MountSpec {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Split once for optional options
        let (main, opt_str) = match s.split_once('?') {
            Some((left, right)) => (left, Some(right)),
            None => (s, None),
        };

        let (slot_str, path_str) = main.split_once(':').ok_or("Missing drive slot")?;
        if path_str.is_empty() {
            return Err("Missing file path".to_string());
        }
        let slot = slot_str.parse::<DriveSlot>()?;

        let mut options = FxHashMap::default();
        if let Some(opts) = opt_str {
            for entry in opts.split('&') {
                let (k, v) = entry.split_once('=').unwrap_or((entry, "true"));
                options.insert(k.to_string(), v.to_string());
            }
        }

        Ok(MountSpec {
            slot,
            path: PathBuf::from(path_str),
            options,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_slot_path_and_options() {
        let spec: MountSpec = "d2:games/disk.mgt?autoload".parse().unwrap();
        assert_eq!(spec.slot, DriveSlot::Drive2);
        assert_eq!(spec.path, PathBuf::from("games/disk.mgt"));
        assert!(spec.auto_load());

        let spec: MountSpec = "boot:disk.mgt?autoload=false".parse().unwrap();
        assert_eq!(spec.slot, DriveSlot::Boot);
        assert!(!spec.auto_load());

        assert!("disk.mgt".parse::<MountSpec>().is_err());
        assert!("d3:disk.mgt".parse::<MountSpec>().is_err());
        assert!("d1:".parse::<MountSpec>().is_err());
    }
}
