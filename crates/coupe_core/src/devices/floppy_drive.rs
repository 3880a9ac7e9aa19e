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

    coupe_core::devices::floppy_drive.rs
*/
//! A floppy drive with its VL1772 controller, mapped over the eight ports of a drive bay.
//!
//! Port layout is `111d0srr`: `d` selects the bay (handled by the registry), `s` the disk
//! side and `rr` the controller register. Commands complete as soon as their data has been
//! transferred. There is no rotational or step timing.

use std::path::Path;

use crate::{
    bus::{IoDevice, NO_IO_BYTE},
    device_traits::disk_device::DiskDevice,
    device_types::{activity::ActivityCounter, drive_state::DriveState, image::SectorImage},
    machine_types::DriveType,
};

pub const FDC_REG_STATUS: u16 = 0x00;
pub const FDC_REG_TRACK: u16 = 0x01;
pub const FDC_REG_SECTOR: u16 = 0x02;
pub const FDC_REG_DATA: u16 = 0x03;
pub const FDC_REG_MASK: u16 = 0x03;
pub const FDC_SIDE_MASK: u16 = 0x04;

pub const STATUS_BUSY: u8 = 0b0000_0001;
pub const STATUS_INDEX: u8 = 0b0000_0010;
pub const STATUS_DRQ: u8 = 0b0000_0010;
pub const STATUS_TRACK00: u8 = 0b0000_0100;
pub const STATUS_LOST_DATA: u8 = 0b0000_0100;
pub const STATUS_CRC_ERROR: u8 = 0b0000_1000;
pub const STATUS_RECORD_NOT_FOUND: u8 = 0b0001_0000;
pub const STATUS_SEEK_ERROR: u8 = 0b0001_0000;
pub const STATUS_SPIN_UP: u8 = 0b0010_0000;
pub const STATUS_WRITE_PROTECT: u8 = 0b0100_0000;
pub const STATUS_MOTOR_ON: u8 = 0b1000_0000;

pub const CMD_RESTORE: u8 = 0x00;
pub const CMD_SEEK: u8 = 0x10;
pub const CMD_STEP: u8 = 0x20;
pub const CMD_STEP_IN: u8 = 0x40;
pub const CMD_STEP_OUT: u8 = 0x60;
pub const CMD_READ_SECTOR: u8 = 0x80;
pub const CMD_WRITE_SECTOR: u8 = 0xa0;
pub const CMD_READ_ADDRESS: u8 = 0xc0;
pub const CMD_FORCE_INTERRUPT: u8 = 0xd0;
pub const CMD_READ_TRACK: u8 = 0xe0;
pub const CMD_WRITE_TRACK: u8 = 0xf0;

const CMD_UPDATE_TRACK_FLAG: u8 = 0x10;
const CMD_MULTIPLE_FLAG: u8 = 0x10;
const CMD_VERIFY_FLAG: u8 = 0x04;

/// Physical stop of the head carriage.
pub const MAX_CYLINDER: u8 = 82;
/// Frames the motor keeps spinning after the last command, 10 revolutions at 300 rpm.
pub const MOTOR_OFF_FRAMES: u32 = 100;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum FdcState {
    #[default]
    Idle,
    ReadData,
    WriteData,
    ReadAddress,
}

/// CRC-16/CCITT as computed by the controller over ID and data fields.
fn crc16(bytes: &[u8]) -> u16 {
    let mut crc: u16 = 0xffff;
    for &b in bytes {
        crc ^= (b as u16) << 8;
        for _ in 0..8 {
            crc = if crc & 0x8000 != 0 { (crc << 1) ^ 0x1021 } else { crc << 1 };
        }
    }
    crc
}

pub struct FloppyDrive {
    port_base: u16,
    image: Option<SectorImage>,
    modified: bool,
    activity: ActivityCounter,

    status: u8,
    track: u8,
    sector: u8,
    data: u8,
    command: u8,

    cylinder: u8,
    side: u8,
    step_in: bool,
    motor_frames: u32,

    state: FdcState,
    multiple: bool,
    buffer: Vec<u8>,
    buffer_pos: usize,
}

impl FloppyDrive {
    pub fn new(port_base: u16) -> Self {
        Self {
            port_base,
            image: None,
            modified: false,
            activity: ActivityCounter::new(),
            status: 0,
            track: 0,
            sector: 1,
            data: 0,
            command: 0,
            cylinder: 0,
            side: 0,
            step_in: true,
            motor_frames: 0,
            state: FdcState::Idle,
            multiple: false,
            buffer: Vec::new(),
            buffer_pos: 0,
        }
    }

    pub fn state(&self) -> FdcState {
        self.state
    }

    pub fn cylinder(&self) -> u8 {
        self.cylinder
    }

    fn write_protected(&self) -> bool {
        self.image.as_ref().is_some_and(|i| i.write_protected())
    }

    /// Status flags reported after a type I command.
    fn type1_status(&self, extra: u8) -> u8 {
        let mut status = STATUS_MOTOR_ON | STATUS_SPIN_UP | extra;
        if self.cylinder == 0 {
            status |= STATUS_TRACK00;
        }
        if self.write_protected() {
            status |= STATUS_WRITE_PROTECT;
        }
        status
    }

    fn motor_on(&mut self) {
        self.motor_frames = MOTOR_OFF_FRAMES;
    }

    fn step(&mut self, inward: bool, update_track: bool) {
        self.step_in = inward;
        if inward {
            self.cylinder = (self.cylinder + 1).min(MAX_CYLINDER);
            if update_track {
                self.track = self.track.wrapping_add(1);
            }
        }
        else {
            self.cylinder = self.cylinder.saturating_sub(1);
            if update_track {
                self.track = self.track.wrapping_sub(1);
            }
        }
    }

    /// Type I verify: the head must sit over a readable track matching the track register.
    fn verify_status(&self, command: u8) -> u8 {
        if command & CMD_VERIFY_FLAG == 0 {
            return 0;
        }
        match &self.image {
            Some(image) if self.track == self.cylinder && (self.cylinder as u16) < image.geometry().c() => 0,
            _ => STATUS_SEEK_ERROR,
        }
    }

    fn command_write(&mut self, command: u8) {
        if command & 0xf0 == CMD_FORCE_INTERRUPT {
            log::trace!("FDC: Force interrupt {:02X} in state {:?}", command, self.state);
            if self.status & STATUS_BUSY != 0 {
                self.status &= !(STATUS_BUSY | STATUS_DRQ);
            }
            else {
                self.status = self.type1_status(0);
            }
            self.state = FdcState::Idle;
            return;
        }

        if self.status & STATUS_BUSY != 0 {
            log::debug!("FDC: Ignoring command {:02X} while busy", command);
            return;
        }

        self.command = command;
        self.activity.touch();
        self.motor_on();

        let kind = command & 0xf0;
        match kind {
            CMD_RESTORE => {
                log::debug!("FDC: Restore");
                self.cylinder = 0;
                self.track = 0;
                self.step_in = false;
                self.status = self.type1_status(self.verify_status(command));
            }
            CMD_SEEK => {
                log::debug!("FDC: Seek to {}", self.data);
                let target = self.data.min(MAX_CYLINDER);
                self.step_in = target > self.cylinder;
                self.cylinder = target;
                self.track = self.data;
                self.status = self.type1_status(self.verify_status(command));
            }
            _ if kind & 0xe0 == CMD_STEP => {
                self.step(self.step_in, command & CMD_UPDATE_TRACK_FLAG != 0);
                self.status = self.type1_status(self.verify_status(command));
            }
            _ if kind & 0xe0 == CMD_STEP_IN => {
                self.step(true, command & CMD_UPDATE_TRACK_FLAG != 0);
                self.status = self.type1_status(self.verify_status(command));
            }
            _ if kind & 0xe0 == CMD_STEP_OUT => {
                self.step(false, command & CMD_UPDATE_TRACK_FLAG != 0);
                self.status = self.type1_status(self.verify_status(command));
            }
            _ if kind & 0xe0 == CMD_READ_SECTOR => {
                self.multiple = command & CMD_MULTIPLE_FLAG != 0;
                log::debug!(
                    "FDC: Read sector c:{} h:{} s:{} multiple:{}",
                    self.track,
                    self.side,
                    self.sector,
                    self.multiple
                );
                self.begin_read_sector();
            }
            _ if kind & 0xe0 == CMD_WRITE_SECTOR => {
                self.multiple = command & CMD_MULTIPLE_FLAG != 0;
                log::debug!(
                    "FDC: Write sector c:{} h:{} s:{} multiple:{}",
                    self.track,
                    self.side,
                    self.sector,
                    self.multiple
                );
                self.begin_write_sector();
            }
            CMD_READ_ADDRESS => {
                self.begin_read_address();
            }
            _ => {
                // Read track and write track need the raw track layout, which sector dumps lack.
                log::warn!("FDC: Unsupported track command {:02X}", command);
                self.status = STATUS_MOTOR_ON | STATUS_RECORD_NOT_FOUND;
            }
        }
    }

    /// Whether the sector register names a sector under the head.
    fn sector_found(&self) -> bool {
        match &self.image {
            Some(image) => {
                self.track == self.cylinder && image.has_sector(self.cylinder as u16, self.side, self.sector)
            }
            None => false,
        }
    }

    fn begin_read_sector(&mut self) {
        if !self.sector_found() {
            self.status = STATUS_MOTOR_ON | STATUS_RECORD_NOT_FOUND;
            self.state = FdcState::Idle;
            return;
        }
        let sector = self
            .image
            .as_ref()
            .and_then(|image| image.read_sector(self.cylinder as u16, self.side, self.sector).ok())
            .map(|data| data.to_vec());

        match sector {
            Some(data) => {
                self.buffer = data;
                self.buffer_pos = 0;
                self.state = FdcState::ReadData;
                self.status = STATUS_BUSY | STATUS_DRQ | STATUS_MOTOR_ON;
            }
            None => {
                self.status = STATUS_MOTOR_ON | STATUS_RECORD_NOT_FOUND;
                self.state = FdcState::Idle;
            }
        }
    }

    fn begin_write_sector(&mut self) {
        if self.write_protected() {
            self.status = STATUS_MOTOR_ON | STATUS_WRITE_PROTECT;
            self.state = FdcState::Idle;
            return;
        }
        if !self.sector_found() {
            self.status = STATUS_MOTOR_ON | STATUS_RECORD_NOT_FOUND;
            self.state = FdcState::Idle;
            return;
        }
        self.buffer.clear();
        self.buffer_pos = 0;
        self.state = FdcState::WriteData;
        self.status = STATUS_BUSY | STATUS_DRQ | STATUS_MOTOR_ON;
    }

    fn begin_read_address(&mut self) {
        let has_track = self
            .image
            .as_ref()
            .is_some_and(|image| image.has_sector(self.cylinder as u16, self.side, 1));
        if !has_track {
            self.status = STATUS_MOTOR_ON | STATUS_RECORD_NOT_FOUND;
            self.state = FdcState::Idle;
            return;
        }
        // ID field: track, side, sector, size code 2 (512 bytes), CRC.
        let mut id = vec![0xa1, 0xa1, 0xa1, 0xfe, self.cylinder, self.side, 1, 2];
        let crc = crc16(&id);
        id.drain(..4);
        id.push((crc >> 8) as u8);
        id.push(crc as u8);
        self.buffer = id;
        self.buffer_pos = 0;
        self.state = FdcState::ReadAddress;
        self.status = STATUS_BUSY | STATUS_DRQ | STATUS_MOTOR_ON;
    }

    fn data_read(&mut self) -> u8 {
        match self.state {
            FdcState::ReadData | FdcState::ReadAddress => {
                self.activity.touch();
                let byte = self.buffer.get(self.buffer_pos).copied().unwrap_or(NO_IO_BYTE);
                self.buffer_pos += 1;
                self.data = byte;
                if self.buffer_pos >= self.buffer.len() {
                    self.transfer_complete();
                }
                byte
            }
            _ => self.data,
        }
    }

    fn data_write(&mut self, byte: u8) {
        self.data = byte;
        if self.state != FdcState::WriteData {
            return;
        }
        self.activity.touch();
        self.buffer.push(byte);

        let sector_size = self.image.as_ref().map_or(0, |i| i.geometry().size());
        if self.buffer.len() < sector_size {
            return;
        }

        let (c, h, s) = (self.cylinder as u16, self.side, self.sector);
        let result = match self.image.as_mut() {
            Some(image) => image.write_sector(c, h, s, &self.buffer),
            None => Ok(()),
        };
        match result {
            Ok(_) => {
                self.modified = true;
                self.buffer.clear();
                self.transfer_complete();
            }
            Err(e) => {
                log::error!("FDC: Sector write failed: {}", e);
                self.status = STATUS_MOTOR_ON | STATUS_RECORD_NOT_FOUND;
                self.state = FdcState::Idle;
            }
        }
    }

    fn transfer_complete(&mut self) {
        match self.state {
            FdcState::ReadAddress => {
                // The 1772 copies the track address into the sector register.
                self.sector = self.cylinder;
                self.status = STATUS_MOTOR_ON;
                self.state = FdcState::Idle;
            }
            FdcState::ReadData | FdcState::WriteData if self.multiple => {
                self.sector = self.sector.wrapping_add(1);
                if self.state == FdcState::ReadData {
                    self.begin_read_sector();
                }
                else {
                    self.begin_write_sector();
                }
            }
            _ => {
                self.status = STATUS_MOTOR_ON;
                self.state = FdcState::Idle;
            }
        }
    }
}

impl IoDevice for FloppyDrive {
    fn reset(&mut self) {
        self.status = 0;
        self.track = 0;
        self.sector = 1;
        self.data = 0;
        self.command = 0;
        self.state = FdcState::Idle;
        self.multiple = false;
        self.buffer.clear();
        self.buffer_pos = 0;
        self.motor_frames = 0;
    }

    fn read_u8(&mut self, port: u16) -> u8 {
        self.side = ((port & FDC_SIDE_MASK) >> 2) as u8;
        match port & FDC_REG_MASK {
            FDC_REG_STATUS => self.status,
            FDC_REG_TRACK => self.track,
            FDC_REG_SECTOR => self.sector,
            _ => self.data_read(),
        }
    }

    fn write_u8(&mut self, port: u16, data: u8) {
        self.side = ((port & FDC_SIDE_MASK) >> 2) as u8;
        match port & FDC_REG_MASK {
            FDC_REG_STATUS => self.command_write(data),
            FDC_REG_TRACK => self.track = data,
            FDC_REG_SECTOR => self.sector = data,
            _ => self.data_write(data),
        }
    }

    fn frame_end(&mut self) {
        self.activity.tick();
        if self.motor_frames > 0 {
            self.motor_frames -= 1;
            if self.motor_frames == 0 && self.state == FdcState::Idle {
                self.status &= !STATUS_MOTOR_ON;
            }
        }
    }

    fn load_state(&mut self, path: &Path) {
        if let Some(state) = DriveState::load(path) {
            if state.drive_type != DriveType::Floppy {
                log::warn!("Drive state {} is for a {} drive", path.display(), state.drive_type);
                return;
            }
            if let Some(disk_path) = state.disk_path {
                if self.insert(&disk_path, false) {
                    self.modified = state.modified;
                }
            }
        }
    }

    fn save_state(&mut self, path: &Path) {
        let state = DriveState {
            drive_type: DriveType::Floppy,
            disk_path: self.disk_path().map(Path::to_path_buf),
            modified: self.modified,
        };
        state.save(path);
    }

    fn port_list(&self) -> Vec<(String, u16)> {
        let mut ports = Vec::new();
        for side in 0..2u16 {
            let base = self.port_base | (side << 2);
            ports.push((format!("FDC Status/Command (side {})", side), base | FDC_REG_STATUS));
            ports.push((format!("FDC Track (side {})", side), base | FDC_REG_TRACK));
            ports.push((format!("FDC Sector (side {})", side), base | FDC_REG_SECTOR));
            ports.push((format!("FDC Data (side {})", side), base | FDC_REG_DATA));
        }
        ports
    }
}

impl DiskDevice for FloppyDrive {
    fn drive_type(&self) -> DriveType {
        DriveType::Floppy
    }

    fn insert(&mut self, path: &Path, _auto_load: bool) -> bool {
        match SectorImage::open(path) {
            Ok(image) => {
                if self.modified {
                    log::warn!("Replacing modified disk {:?} without saving", self.disk_path());
                }
                log::debug!("Inserted {} into floppy drive at {:02X}", path.display(), self.port_base);
                self.image = Some(image);
                self.modified = false;
                self.state = FdcState::Idle;
                true
            }
            Err(e) => {
                log::warn!("Failed to insert {}: {}", path.display(), e);
                false
            }
        }
    }

    fn eject(&mut self) {
        if self.modified {
            log::warn!("Ejecting modified disk {:?} without saving", self.disk_path());
        }
        self.image = None;
        self.modified = false;
        self.state = FdcState::Idle;
        self.status &= !(STATUS_BUSY | STATUS_DRQ);
    }

    fn save(&mut self) -> bool {
        if !self.modified {
            return true;
        }
        match self.image.as_ref().map(|image| image.save()) {
            Some(Ok(())) => {
                self.modified = false;
                true
            }
            Some(Err(e)) => {
                log::error!("Failed to save disk {:?}: {}", self.disk_path(), e);
                false
            }
            None => true,
        }
    }

    fn disk_path(&self) -> Option<&Path> {
        self.image.as_ref().map(|image| image.path())
    }

    fn disk_modified(&self) -> bool {
        self.modified
    }

    fn set_disk_modified(&mut self, modified: bool) {
        self.modified = modified && self.image.is_some();
    }

    fn is_light_on(&self) -> bool {
        self.state != FdcState::Idle || self.activity.is_active()
    }

    fn activity(&self) -> &ActivityCounter {
        &self.activity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device_types::geometry::SECTOR_SIZE;
    use std::path::PathBuf;

    fn mgt_image(name: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("coupe_fdc_{}_{}.mgt", std::process::id(), name));
        let data: Vec<u8> = (0..819_200usize).map(|i| (i / SECTOR_SIZE) as u8).collect();
        std::fs::write(&path, data).unwrap();
        path
    }

    #[test]
    fn read_sector_transfers_512_bytes() {
        let path = mgt_image("read");
        let mut fdc = FloppyDrive::new(0xe0);
        assert!(fdc.insert(&path, false));

        // Side 1 via port bit 2, track 0, sector 3: sector index 12 in the image.
        fdc.write_u8(0xe2, 3);
        fdc.write_u8(0xe4, CMD_READ_SECTOR);
        assert_eq!(fdc.read_u8(0xe4) & (STATUS_BUSY | STATUS_DRQ), STATUS_BUSY | STATUS_DRQ);
        assert!(fdc.is_light_on());

        let mut bytes = Vec::new();
        for _ in 0..SECTOR_SIZE {
            bytes.push(fdc.read_u8(0xe7));
        }
        assert!(bytes.iter().all(|&b| b == 12));
        assert_eq!(fdc.read_u8(0xe4) & STATUS_BUSY, 0);
        assert_eq!(fdc.state(), FdcState::Idle);
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn seek_then_missing_sector_reports_rnf() {
        let path = mgt_image("seek");
        let mut fdc = FloppyDrive::new(0xe0);
        assert!(fdc.insert(&path, false));

        fdc.write_u8(0xe3, 5);
        fdc.write_u8(0xe0, CMD_SEEK | CMD_VERIFY_FLAG);
        assert_eq!(fdc.cylinder(), 5);
        assert_eq!(fdc.read_u8(0xe1), 5);
        assert_eq!(fdc.read_u8(0xe0) & STATUS_SEEK_ERROR, 0);

        fdc.write_u8(0xe2, 11);
        fdc.write_u8(0xe0, CMD_READ_SECTOR);
        assert_ne!(fdc.read_u8(0xe0) & STATUS_RECORD_NOT_FOUND, 0);

        fdc.write_u8(0xe0, CMD_RESTORE);
        assert_ne!(fdc.read_u8(0xe0) & STATUS_TRACK00, 0);
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn write_sector_marks_modified_and_saves() {
        let path = mgt_image("write");
        let mut fdc = FloppyDrive::new(0xf0);
        assert!(fdc.insert(&path, false));

        fdc.write_u8(0xf2, 1);
        fdc.write_u8(0xf0, CMD_WRITE_SECTOR);
        for _ in 0..SECTOR_SIZE {
            fdc.write_u8(0xf3, 0x5A);
        }
        assert!(fdc.disk_modified());
        assert!(fdc.save());
        assert!(!fdc.disk_modified());

        let data = std::fs::read(&path).unwrap();
        assert_eq!(data[0], 0x5A);
        assert_eq!(data[SECTOR_SIZE], 1);
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn read_address_returns_id_field() {
        let path = mgt_image("addr");
        let mut fdc = FloppyDrive::new(0xe0);
        assert!(fdc.insert(&path, false));
        fdc.write_u8(0xe0, CMD_READ_ADDRESS);
        let id: Vec<u8> = (0..6).map(|_| fdc.read_u8(0xe3)).collect();
        assert_eq!(&id[..4], &[0, 0, 1, 2]);
        assert_eq!(fdc.read_u8(0xe0) & STATUS_BUSY, 0);
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn failed_insert_keeps_previous_disk() {
        let path = mgt_image("keep");
        let mut fdc = FloppyDrive::new(0xe0);
        assert!(fdc.insert(&path, false));
        assert!(!fdc.insert(Path::new("/nonexistent/coupe.mgt"), false));
        assert_eq!(fdc.disk_path(), Some(path.as_path()));
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn crc_matches_ccitt_check_value() {
        assert_eq!(crc16(b"123456789"), 0x29B1);
    }
}
