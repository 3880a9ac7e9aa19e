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

    coupe_core::machine_types.rs
*/
//! Enumerations naming the hardware that can occupy each expansion slot.

use core::fmt;
use serde::{self, Deserializer, Serializer};
use serde_derive::Deserialize;
use std::{fmt::Display, str::FromStr};

/// Kind of device fitted in a drive bay.
#[derive(Copy, Clone, Debug, Default, Hash, Eq, PartialEq)]
pub enum DriveType {
    #[default]
    None,
    Floppy,
    Atom,
    AtomLite,
    SdIde,
}

impl DriveType {
    pub fn is_hard_disk(&self) -> bool {
        matches!(self, DriveType::Atom | DriveType::AtomLite | DriveType::SdIde)
    }
}

impl Display for DriveType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DriveType::None => write!(f, "none"),
            DriveType::Floppy => write!(f, "floppy"),
            DriveType::Atom => write!(f, "atom"),
            DriveType::AtomLite => write!(f, "atom_lite"),
            DriveType::SdIde => write!(f, "sdide"),
        }
    }
}

impl FromStr for DriveType {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, String>
    where
        Self: Sized,
    {
        match s.to_lowercase().as_str() {
            "none" => Ok(DriveType::None),
            "floppy" => Ok(DriveType::Floppy),
            "atom" => Ok(DriveType::Atom),
            "atom_lite" | "atomlite" => Ok(DriveType::AtomLite),
            "sdide" | "sd_ide" => Ok(DriveType::SdIde),
            _ => Err(format!("Bad value for drive type: {}", s)),
        }
    }
}

impl<'de> serde::Deserialize<'de> for DriveType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct DriveTypeVisitor;

        impl serde::de::Visitor<'_> for DriveTypeVisitor {
            type Value = DriveType;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("`none`, `floppy`, `atom`, `atom_lite` or `sdide`")
            }

            fn visit_str<E>(self, value: &str) -> Result<DriveType, E>
            where
                E: serde::de::Error,
            {
                DriveType::from_str(value).map_err(E::custom)
            }
        }

        deserializer.deserialize_str(DriveTypeVisitor)
    }
}

impl serde::Serialize for DriveType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

#[derive(Copy, Clone, Debug, Default, Deserialize, Hash, Eq, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum ParallelType {
    #[default]
    None,
    Printer,
}

impl FromStr for ParallelType {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, String>
    where
        Self: Sized,
    {
        match s.to_lowercase().as_str() {
            "none" => Ok(ParallelType::None),
            "printer" => Ok(ParallelType::Printer),
            _ => Err("Bad value for ParallelType".to_string()),
        }
    }
}

/// What to load automatically once the ROM reaches its ready screen.
#[derive(Copy, Clone, Debug, Default, Deserialize, Hash, Eq, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum AutoloadType {
    #[default]
    None,
    Disk,
    Tape,
}

impl FromStr for AutoloadType {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, String>
    where
        Self: Sized,
    {
        match s.to_lowercase().as_str() {
            "none" => Ok(AutoloadType::None),
            "disk" => Ok(AutoloadType::Disk),
            "tape" => Ok(AutoloadType::Tape),
            _ => Err("Bad value for AutoloadType".to_string()),
        }
    }
}
