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

    coupe_core::device_types::geometry.rs
*/
//! Define a [DriveGeometry] describing how the sectors of a raw image are laid out,
//! and the table of raw floppy image sizes the drive accepts.

use fxhash::FxHashMap;
use lazy_static::lazy_static;
use std::fmt::Display;

pub const SECTOR_SIZE: usize = 512;

/// Default translation used for hard disk images, which carry no geometry of their own.
pub const HDD_HEADS: u8 = 16;
pub const HDD_SECTORS: u8 = 32;

/// Cylinder (c), head (h) and sectors-per-track (s) counts, plus the id of the first
/// sector on a track (s_off) and the sector size in bytes.
#[derive(Copy, Clone, Debug, Default, Hash, Eq, PartialEq)]
pub struct DriveGeometry {
    pub(crate) c: u16,
    pub(crate) h: u8,
    pub(crate) s: u8,
    pub(crate) s_off: u8,
    pub(crate) size: usize,
}

impl Display for DriveGeometry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[c:{:2} h:{} s:{:2} s_off:{}]", self.c, self.h, self.s, self.s_off)
    }
}

impl DriveGeometry {
    pub fn new(c: u16, h: u8, s: u8, s_off: u8, size: usize) -> Self {
        Self { c, h, s, s_off, size }
    }
    #[inline]
    pub fn c(&self) -> u16 {
        self.c
    }
    #[inline]
    pub fn h(&self) -> u8 {
        self.h
    }
    #[inline]
    pub fn s(&self) -> u8 {
        self.s
    }
    #[inline]
    pub fn s_off(&self) -> u8 {
        self.s_off
    }
    /// Return the size of a sector in bytes.
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }
    pub fn total_sectors(&self) -> usize {
        (self.c as usize) * (self.h as usize) * (self.s as usize)
    }
    pub fn total_bytes(&self) -> usize {
        self.total_sectors() * self.size
    }

    /// Convert a cylinder, head and sector id into a linear sector index, if it lies on the disk.
    pub fn chs_to_lba(&self, c: u16, h: u8, s: u8) -> Option<usize> {
        if c >= self.c || h >= self.h || s < self.s_off || (s - self.s_off) >= self.s {
            return None;
        }
        Some(((c as usize * self.h as usize) + h as usize) * self.s as usize + (s - self.s_off) as usize)
    }

    pub fn lba_to_chs(&self, lba: usize) -> Option<(u16, u8, u8)> {
        if lba >= self.total_sectors() {
            return None;
        }
        let spt = self.s as usize;
        let heads = self.h as usize;
        let c = lba / (heads * spt);
        let h = (lba / spt) % heads;
        let s = (lba % spt) + self.s_off as usize;
        Some((c as u16, h as u8, s as u8))
    }

    /// Derive a translated geometry for a hard disk image of `size` bytes.
    /// The image must be a non-empty whole number of sectors.
    pub fn from_hard_disk_size(size: usize) -> Option<Self> {
        if size == 0 || size % SECTOR_SIZE != 0 {
            return None;
        }
        let total_sectors = size / SECTOR_SIZE;
        let per_cylinder = HDD_HEADS as usize * HDD_SECTORS as usize;
        if total_sectors < per_cylinder {
            // Tiny images get a single head and a single track per cylinder.
            return Some(Self::new(1, 1, total_sectors.min(255) as u8, 1, SECTOR_SIZE));
        }
        let c = (total_sectors / per_cylinder).min(u16::MAX as usize) as u16;
        Some(Self::new(c, HDD_HEADS, HDD_SECTORS, 1, SECTOR_SIZE))
    }
}

/// A raw floppy image layout recognized by its file size.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FloppyFormat {
    pub geometry: DriveGeometry,
    pub desc: &'static str,
}

lazy_static! {
    /// Raw sector dumps accepted by the floppy drive, keyed by image size in bytes.
    pub static ref FLOPPY_FORMATS: FxHashMap<usize, FloppyFormat> = {
        let mut m = FxHashMap::default();
        for (c, h, desc) in [
            (80u16, 2u8, "MGT 80 track double sided"),
            (80, 1, "MGT 80 track single sided"),
            (40, 1, "MGT 40 track single sided"),
        ] {
            let geometry = DriveGeometry::new(c, h, 10, 1, SECTOR_SIZE);
            m.insert(geometry.total_bytes(), FloppyFormat { geometry, desc });
        }
        m
    };
}

pub fn floppy_format_from_size(size: usize) -> Option<&'static FloppyFormat> {
    FLOPPY_FORMATS.get(&size)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mgt_image_size_is_recognized() {
        let fmt = floppy_format_from_size(819_200).unwrap();
        assert_eq!(fmt.geometry.c(), 80);
        assert_eq!(fmt.geometry.h(), 2);
        assert_eq!(fmt.geometry.s(), 10);
        assert!(floppy_format_from_size(204_800).is_some());
        assert!(floppy_format_from_size(737_280).is_none());
    }

    #[test]
    fn chs_lba_conversion() {
        let geom = DriveGeometry::new(80, 2, 10, 1, SECTOR_SIZE);
        assert_eq!(geom.chs_to_lba(0, 0, 1), Some(0));
        assert_eq!(geom.chs_to_lba(0, 1, 1), Some(10));
        assert_eq!(geom.chs_to_lba(1, 0, 10), Some(29));
        assert_eq!(geom.chs_to_lba(0, 0, 0), None);
        assert_eq!(geom.chs_to_lba(0, 0, 11), None);
        assert_eq!(geom.chs_to_lba(80, 0, 1), None);
        assert_eq!(geom.lba_to_chs(29), Some((1, 0, 10)));
        assert_eq!(geom.lba_to_chs(1600), None);
    }

    #[test]
    fn hard_disk_geometry() {
        assert!(DriveGeometry::from_hard_disk_size(0).is_none());
        assert!(DriveGeometry::from_hard_disk_size(1000).is_none());
        let small = DriveGeometry::from_hard_disk_size(8 * SECTOR_SIZE).unwrap();
        assert_eq!(small.total_sectors(), 8);
        let big = DriveGeometry::from_hard_disk_size(4 * 512 * SECTOR_SIZE).unwrap();
        assert_eq!(big.c(), 4);
        assert_eq!(big.h(), HDD_HEADS);
    }
}
