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

    coupe_core::device_types::image.rs
*/
//! Raw sector images backing the drive devices.
//!
//! Floppy images are small and are held in memory, written back on save. Hard disk images
//! can be large, so sector reads and writes go straight to the open file.

use std::{
    fs::{File, OpenOptions},
    io::{ErrorKind, Read, Seek, SeekFrom, Write},
    path::{Path, PathBuf},
};

use thiserror::Error;

use crate::device_types::geometry::{floppy_format_from_size, DriveGeometry, FloppyFormat, SECTOR_SIZE};

#[derive(Debug, Error)]
pub enum DiskError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("unsupported image size: {0} bytes")]
    UnsupportedSize(u64),
    #[error("image is write protected")]
    WriteProtected,
    #[error("sector out of range: {0}")]
    OutOfRange(usize),
    #[error("no media")]
    NoMedia,
}

/// Open a file for read/write, falling back to read-only. Returns the file and whether
/// it is write protected.
fn open_rw(path: &Path) -> Result<(File, bool), DiskError> {
    match OpenOptions::new().read(true).write(true).open(path) {
        Ok(file) => Ok((file, false)),
        Err(e) if e.kind() == ErrorKind::PermissionDenied => {
            log::warn!("Image {} is read-only, mounting write protected", path.display());
            Ok((File::open(path)?, true))
        }
        Err(e) => Err(e.into()),
    }
}

/// A raw floppy sector dump, loaded whole.
#[derive(Debug)]
pub struct SectorImage {
    path: PathBuf,
    data: Vec<u8>,
    format: &'static FloppyFormat,
    write_protected: bool,
}

impl SectorImage {
    pub fn open(path: &Path) -> Result<Self, DiskError> {
        let (mut file, write_protected) = open_rw(path)?;
        let mut data = Vec::new();
        file.read_to_end(&mut data)?;

        let format = floppy_format_from_size(data.len()).ok_or(DiskError::UnsupportedSize(data.len() as u64))?;
        log::debug!(
            "Opened floppy image {}: {} {}",
            path.display(),
            format.desc,
            format.geometry
        );

        Ok(Self {
            path: path.to_path_buf(),
            data,
            format,
            write_protected,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn geometry(&self) -> &DriveGeometry {
        &self.format.geometry
    }

    pub fn write_protected(&self) -> bool {
        self.write_protected
    }

    fn sector_offset(&self, c: u16, h: u8, s: u8) -> Result<usize, DiskError> {
        let geom = self.geometry();
        geom.chs_to_lba(c, h, s)
            .map(|lba| lba * geom.size())
            .ok_or(DiskError::OutOfRange(s as usize))
    }

    /// Whether a sector with this id exists under the head. Used for address matching.
    pub fn has_sector(&self, c: u16, h: u8, s: u8) -> bool {
        self.geometry().chs_to_lba(c, h, s).is_some()
    }

    pub fn read_sector(&self, c: u16, h: u8, s: u8) -> Result<&[u8], DiskError> {
        let offset = self.sector_offset(c, h, s)?;
        Ok(&self.data[offset..offset + self.geometry().size()])
    }

    pub fn write_sector(&mut self, c: u16, h: u8, s: u8, sector: &[u8]) -> Result<(), DiskError> {
        if self.write_protected {
            return Err(DiskError::WriteProtected);
        }
        let offset = self.sector_offset(c, h, s)?;
        let size = self.geometry().size();
        let len = sector.len().min(size);
        self.data[offset..offset + len].copy_from_slice(&sector[..len]);
        Ok(())
    }

    /// Write the whole image back to its file.
    pub fn save(&self) -> Result<(), DiskError> {
        if self.write_protected {
            return Err(DiskError::WriteProtected);
        }
        std::fs::write(&self.path, &self.data)?;
        log::debug!("Saved floppy image {}", self.path.display());
        Ok(())
    }
}

/// A raw hard disk image: a whole number of 512 byte sectors, accessed in place.
#[derive(Debug)]
pub struct HardDiskImage {
    path: PathBuf,
    file: File,
    geometry: DriveGeometry,
    total_sectors: usize,
    write_protected: bool,
}

impl HardDiskImage {
    pub fn open(path: &Path) -> Result<Self, DiskError> {
        let (file, write_protected) = open_rw(path)?;
        let size = file.metadata()?.len();

        let geometry =
            DriveGeometry::from_hard_disk_size(size as usize).ok_or(DiskError::UnsupportedSize(size))?;
        let total_sectors = size as usize / SECTOR_SIZE;

        log::debug!(
            "Opened hard disk image {}: {} sectors, translated geometry {}",
            path.display(),
            total_sectors,
            geometry
        );

        Ok(Self {
            path: path.to_path_buf(),
            file,
            geometry,
            total_sectors,
            write_protected,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn geometry(&self) -> &DriveGeometry {
        &self.geometry
    }

    pub fn total_sectors(&self) -> usize {
        self.total_sectors
    }

    pub fn write_protected(&self) -> bool {
        self.write_protected
    }

    pub fn read_sector(&mut self, lba: usize, buf: &mut [u8]) -> Result<(), DiskError> {
        if lba >= self.total_sectors {
            return Err(DiskError::OutOfRange(lba));
        }
        self.file.seek(SeekFrom::Start((lba * SECTOR_SIZE) as u64))?;
        self.file.read_exact(&mut buf[..SECTOR_SIZE])?;
        Ok(())
    }

    pub fn write_sector(&mut self, lba: usize, buf: &[u8]) -> Result<(), DiskError> {
        if self.write_protected {
            return Err(DiskError::WriteProtected);
        }
        if lba >= self.total_sectors {
            return Err(DiskError::OutOfRange(lba));
        }
        self.file.seek(SeekFrom::Start((lba * SECTOR_SIZE) as u64))?;
        self.file.write_all(&buf[..SECTOR_SIZE])?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<(), DiskError> {
        self.file.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_file(name: &str, len: usize) -> PathBuf {
        let path = std::env::temp_dir().join(format!("coupe_image_{}_{}", std::process::id(), name));
        let data: Vec<u8> = (0..len).map(|i| (i / SECTOR_SIZE) as u8).collect();
        std::fs::write(&path, data).unwrap();
        path
    }

    #[test]
    fn floppy_rejects_bad_size() {
        let path = temp_file("bad.mgt", 1234);
        assert!(matches!(SectorImage::open(&path), Err(DiskError::UnsupportedSize(1234))));
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn floppy_write_and_save() {
        let path = temp_file("rw.mgt", 819_200);
        let mut image = SectorImage::open(&path).unwrap();
        // Track 0 side 1 sector 1 is the 11th sector in the file.
        assert_eq!(image.read_sector(0, 1, 1).unwrap()[0], 10);

        image.write_sector(0, 0, 2, &[0xAA; SECTOR_SIZE]).unwrap();
        image.save().unwrap();

        let reopened = SectorImage::open(&path).unwrap();
        assert_eq!(reopened.read_sector(0, 0, 2).unwrap()[511], 0xAA);
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn hard_disk_sector_access() {
        let path = temp_file("hdd.img", 64 * SECTOR_SIZE);
        let mut image = HardDiskImage::open(&path).unwrap();
        assert_eq!(image.total_sectors(), 64);

        let mut buf = [0u8; SECTOR_SIZE];
        image.read_sector(5, &mut buf).unwrap();
        assert_eq!(buf[0], 5);

        image.write_sector(7, &[0x55; SECTOR_SIZE]).unwrap();
        image.read_sector(7, &mut buf).unwrap();
        assert_eq!(buf[100], 0x55);

        assert!(matches!(image.read_sector(64, &mut buf), Err(DiskError::OutOfRange(64))));
        let _ = std::fs::remove_file(path);
    }
}
