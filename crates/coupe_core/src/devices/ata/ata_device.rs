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

    coupe_core::devices::ata::ata_device.rs
*/
//! An [AtaDevice] implements the register file and command set of an ATA hard disk over a raw
//! image. The Atom, Atom Lite and SD-IDE interfaces are thin front ends that map Coupé ports
//! onto these registers and decide how the 16-bit data register is carried over an 8-bit bus.
//!
//! Commands complete instantly. A data command leaves DRQ set until its sector buffer has been
//! drained or filled through the data register.

use std::io::{Cursor, Read, Seek, SeekFrom, Write};

use binrw::BinWrite;
use modular_bitfield::{bitfield, prelude::*};

use crate::{
    device_types::{
        geometry::{DriveGeometry, SECTOR_SIZE},
        image::{DiskError, HardDiskImage},
    },
    devices::ata::ata_identification::AtaDriveIdentification,
};

pub const ATA_REG_DATA: u8 = 0x00;
pub const ATA_REG_ERROR: u8 = 0x01;
pub const ATA_REG_FEATURES: u8 = 0x01;
pub const ATA_REG_SECTOR_COUNT: u8 = 0x02;
pub const ATA_REG_SECTOR_NUMBER: u8 = 0x03;
pub const ATA_REG_CYLINDER_LOW: u8 = 0x04;
pub const ATA_REG_CYLINDER_HIGH: u8 = 0x05;
pub const ATA_REG_DRIVE_HEAD: u8 = 0x06;
pub const ATA_REG_STATUS: u8 = 0x07;
pub const ATA_REG_COMMAND: u8 = 0x07;

const DRIVE_HEAD_BITS_ON: u8 = 0xA0; // 1010 0000
const DRIVE_HEAD_LBA_BIT: u8 = 0x40; // 0100 0000
const DRIVE_HEAD_DEV_BIT: u8 = 0x10; // 0001 0000
const DRIVE_HEAD_HEAD_MASK: u8 = 0x0F;

pub const DEVICE_CONTROL_NIEN: u8 = 0x02;
pub const DEVICE_CONTROL_SRST: u8 = 0x04;

const FEATURE_ENABLE_8BIT: u8 = 0x01;
const FEATURE_ENABLE_WRITE_CACHE: u8 = 0x02;
const FEATURE_DISABLE_8BIT: u8 = 0x81;
const FEATURE_DISABLE_WRITE_CACHE: u8 = 0x82;

/// Error register contents after reset or diagnostics: no error on device 0.
const DIAGNOSTIC_PASSED: u8 = 0x01;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum AtaState {
    #[default]
    Idle,
    ReadData,
    WriteData,
}

#[repr(u8)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum AtaCommand {
    #[default]
    None,
    Recalibrate = 0x10,
    ReadSectorRetry = 0x20,
    ReadSector = 0x21,
    WriteSectorRetry = 0x30,
    WriteSector = 0x31,
    ReadVerifySector = 0x40,
    Seek = 0x70,
    ExecuteDiagnostic = 0x90,
    InitializeParameters = 0x91,
    IdentifyDrive = 0xEC,
    SetFeatures = 0xEF,
}

type CommandDispatchFn = fn(&mut AtaDevice) -> Continuation;

pub enum Continuation {
    CommandComplete,
    ContinueAsOperation,
}

#[bitfield]
#[derive(Copy, Clone, Debug)]
pub struct AtaStatusRegister {
    pub err:   bool, // Error
    pub idx:   bool, // Index
    pub corr:  bool, // Corrected Data
    pub drq:   bool, // Data Request
    pub dsc:   bool, // Disk Seek Complete
    pub dwf:   bool, // Drive Write Failure
    pub ready: bool, // Drive Ready
    pub busy:  bool, // Drive Busy
}

#[bitfield]
#[derive(Copy, Clone, Debug)]
pub struct AtaErrorRegister {
    pub amnf: bool, // Address Mark Not Found
    pub tk0:  bool, // Track 0 Not Found
    pub abrt: bool, // Command Aborted
    pub mcr:  bool, // Media Change Request
    pub idnf: bool, // ID Not Found
    pub mc:   bool, // Media changed
    pub unc:  bool, // Unrecoverable
    pub bbk:  bool, // Bad Block
}

pub struct AtaDevice {
    image: Option<HardDiskImage>,
    geometry: DriveGeometry,
    state: AtaState,
    command: AtaCommand,
    last_command: AtaCommand,

    status_register: AtaStatusRegister,
    error_register: AtaErrorRegister,
    features_register: u8,
    sector_count_register: u8,
    sector_number_register: u8,
    cylinder_low_register: u8,
    cylinder_high_register: u8,
    drive_head_register: u8,
    device_control_register: u8,

    sector_buffer: Cursor<Vec<u8>>,
    command_lba: usize,
    sectors_left: u16,
    eight_bit: bool,
    modified: bool,
}

impl Default for AtaDevice {
    fn default() -> Self {
        Self {
            image: None,
            geometry: DriveGeometry::default(),
            state: AtaState::Idle,
            command: AtaCommand::None,
            last_command: AtaCommand::None,
            status_register: AtaStatusRegister::from_bytes([0]),
            error_register: AtaErrorRegister::from_bytes([DIAGNOSTIC_PASSED]),
            features_register: 0,
            sector_count_register: 1,
            sector_number_register: 1,
            cylinder_low_register: 0,
            cylinder_high_register: 0,
            drive_head_register: DRIVE_HEAD_BITS_ON,
            device_control_register: 0,
            sector_buffer: Cursor::new(vec![0; SECTOR_SIZE]),
            command_lba: 0,
            sectors_left: 0,
            eight_bit: false,
            modified: false,
        }
    }
}

impl AtaDevice {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the task file to its power-on signature. The attached image is kept.
    pub fn reset(&mut self) {
        log::trace!("Resetting AtaDevice...");
        self.state = AtaState::Idle;
        self.command = AtaCommand::None;
        self.features_register = 0;
        self.sector_count_register = 1;
        self.sector_number_register = 1;
        self.cylinder_low_register = 0;
        self.cylinder_high_register = 0;
        self.drive_head_register = DRIVE_HEAD_BITS_ON;
        self.error_register = AtaErrorRegister::from_bytes([DIAGNOSTIC_PASSED]);
        self.sectors_left = 0;
        self.eight_bit = false;
        self.sector_buffer.set_position(SECTOR_SIZE as u64);
        if let Some(image) = &self.image {
            self.geometry = *image.geometry();
        }
        self.set_ready_status();
    }

    pub fn attach(&mut self, image: HardDiskImage) {
        self.image = Some(image);
        self.modified = false;
        self.reset();
    }

    pub fn detach(&mut self) -> Option<HardDiskImage> {
        self.state = AtaState::Idle;
        self.modified = false;
        self.status_register = AtaStatusRegister::from_bytes([0]);
        self.image.take()
    }

    pub fn image(&self) -> Option<&HardDiskImage> {
        self.image.as_ref()
    }

    pub fn has_image(&self) -> bool {
        self.image.is_some()
    }

    pub fn modified(&self) -> bool {
        self.modified
    }

    pub fn set_modified(&mut self, modified: bool) {
        self.modified = modified && self.image.is_some();
    }

    /// Flush pending writes to the image file.
    pub fn flush(&mut self) -> Result<(), DiskError> {
        match self.image.as_mut() {
            Some(image) => image.flush(),
            None => Err(DiskError::NoMedia),
        }
    }

    pub fn state(&self) -> AtaState {
        self.state
    }

    pub fn last_command(&self) -> AtaCommand {
        self.last_command
    }

    /// Whether the host has requested 8-bit data transfers via SET FEATURES.
    pub fn eight_bit(&self) -> bool {
        self.eight_bit
    }

    /// Whether a data transfer is in progress.
    pub fn is_busy(&self) -> bool {
        self.state != AtaState::Idle
    }

    /// The current CHS translation.
    pub fn geometry(&self) -> &DriveGeometry {
        &self.geometry
    }

    fn selected(&self) -> bool {
        self.drive_head_register & DRIVE_HEAD_DEV_BIT == 0
    }

    fn set_ready_status(&mut self) {
        let present = self.image.is_some();
        self.status_register = AtaStatusRegister::from_bytes([0]);
        self.status_register.set_ready(present);
        self.status_register.set_dsc(present);
    }

    pub fn register_read(&mut self, reg: u8) -> u8 {
        match reg & 0x07 {
            ATA_REG_DATA => self.data_read_u8(),
            ATA_REG_ERROR => self.error_register.into_bytes()[0],
            ATA_REG_SECTOR_COUNT => self.sector_count_register,
            ATA_REG_SECTOR_NUMBER => self.sector_number_register,
            ATA_REG_CYLINDER_LOW => self.cylinder_low_register,
            ATA_REG_CYLINDER_HIGH => self.cylinder_high_register,
            ATA_REG_DRIVE_HEAD => self.drive_head_register,
            _ => self.status_register_read(),
        }
    }

    pub fn register_write(&mut self, reg: u8, byte: u8) {
        match reg & 0x07 {
            ATA_REG_DATA => self.data_write_u8(byte),
            ATA_REG_FEATURES => self.features_register = byte,
            ATA_REG_SECTOR_COUNT => self.sector_count_register = byte,
            ATA_REG_SECTOR_NUMBER => self.sector_number_register = byte,
            ATA_REG_CYLINDER_LOW => self.cylinder_low_register = byte,
            ATA_REG_CYLINDER_HIGH => self.cylinder_high_register = byte,
            ATA_REG_DRIVE_HEAD => self.drive_head_register = byte | DRIVE_HEAD_BITS_ON,
            _ => self.handle_command_register_write(byte),
        }
    }

    pub fn status_register_read(&self) -> u8 {
        if !self.selected() {
            // No slave device.
            return 0;
        }
        self.status_register.into_bytes()[0]
    }

    /// The alternate status register in the control block. Same value as status.
    pub fn alternate_status_read(&self) -> u8 {
        self.status_register_read()
    }

    pub fn device_control_write(&mut self, byte: u8) {
        let srst = byte & DEVICE_CONTROL_SRST != 0;
        if srst && self.device_control_register & DEVICE_CONTROL_SRST == 0 {
            log::debug!("ATA software reset");
            self.reset();
        }
        self.device_control_register = byte;
    }

    /// Read one byte of the sector buffer.
    pub fn data_read_u8(&mut self) -> u8 {
        if self.state != AtaState::ReadData || !self.status_register.drq() {
            log::warn!("Data Register read with DRQ not set");
            return 0;
        }

        let mut byte = [0u8; 1];
        if let Err(e) = self.sector_buffer.read_exact(&mut byte) {
            log::error!("Error reading from sector buffer: {e}");
        }
        if self.sector_buffer_end() {
            self.read_buffer_drained();
        }
        byte[0]
    }

    /// Read one 16-bit word of the sector buffer, first byte in the low half.
    pub fn data_read_u16(&mut self) -> u16 {
        let lo = self.data_read_u8();
        let hi = self.data_read_u8();
        u16::from_le_bytes([lo, hi])
    }

    /// Write one byte into the sector buffer.
    pub fn data_write_u8(&mut self, byte: u8) {
        if self.state != AtaState::WriteData || !self.status_register.drq() {
            log::warn!("Data Register written with DRQ not set");
            return;
        }

        if let Err(e) = self.sector_buffer.write_all(&[byte]) {
            log::error!("Error writing to sector buffer: {e}");
        }
        if self.sector_buffer_end() {
            self.write_buffer_filled();
        }
    }

    pub fn data_write_u16(&mut self, word: u16) {
        let [lo, hi] = word.to_le_bytes();
        self.data_write_u8(lo);
        self.data_write_u8(hi);
    }

    fn sector_buffer_end(&self) -> bool {
        self.sector_buffer.position() >= SECTOR_SIZE as u64
    }

    fn clear_buffer(&mut self) {
        self.sector_buffer.get_mut().fill(0);
        self.sector_buffer.set_position(0);
    }

    fn cylinder_reg(&self) -> u16 {
        (self.cylinder_high_register as u16) << 8 | self.cylinder_low_register as u16
    }

    fn total_sectors(&self) -> usize {
        self.image.as_ref().map(|image| image.total_sectors()).unwrap_or(0)
    }

    /// Decode the task file into a sector index, in LBA or CHS form as the drive/head
    /// register selects.
    fn command_address(&self) -> Option<usize> {
        let lba = if self.drive_head_register & DRIVE_HEAD_LBA_BIT != 0 {
            (self.sector_number_register as usize)
                | (self.cylinder_low_register as usize) << 8
                | (self.cylinder_high_register as usize) << 16
                | ((self.drive_head_register & DRIVE_HEAD_HEAD_MASK) as usize) << 24
        }
        else {
            self.geometry.chs_to_lba(
                self.cylinder_reg(),
                self.drive_head_register & DRIVE_HEAD_HEAD_MASK,
                self.sector_number_register,
            )?
        };
        (lba < self.total_sectors()).then_some(lba)
    }

    /// Write an address back into the task file in the current addressing mode.
    fn distribute_address(&mut self, lba: usize) {
        if self.drive_head_register & DRIVE_HEAD_LBA_BIT != 0 {
            self.sector_number_register = (lba & 0xFF) as u8;
            self.cylinder_low_register = ((lba >> 8) & 0xFF) as u8;
            self.cylinder_high_register = ((lba >> 16) & 0xFF) as u8;
            self.drive_head_register = (self.drive_head_register & 0xF0) | ((lba >> 24) & 0x0F) as u8;
        }
        else if let Some((c, h, s)) = self.geometry.lba_to_chs(lba) {
            self.sector_number_register = s;
            self.cylinder_low_register = (c & 0xFF) as u8;
            self.cylinder_high_register = (c >> 8) as u8;
            self.drive_head_register = (self.drive_head_register & 0xF0) | (h & DRIVE_HEAD_HEAD_MASK);
        }
    }

    /// A sector count of zero means 256 sectors.
    fn requested_sectors(&self) -> u16 {
        match self.sector_count_register {
            0 => 256,
            n => n as u16,
        }
    }

    fn abort(&mut self, idnf: bool) {
        self.error_register = AtaErrorRegister::from_bytes([0]);
        self.error_register.set_abrt(!idnf);
        self.error_register.set_idnf(idnf);
        self.status_register.set_err(true);
        self.status_register.set_drq(false);
        self.state = AtaState::Idle;
    }

    /// Handle a write to the command register
    pub fn handle_command_register_write(&mut self, byte: u8) {
        if !self.selected() {
            log::trace!("Command {:02X} for absent slave ignored", byte);
            return;
        }
        if self.image.is_none() {
            log::warn!("Command {:02X} with no disk image", byte);
            return;
        }
        if self.state != AtaState::Idle {
            log::warn!("Command {:02X} interrupts {:?} transfer", byte, self.command);
            self.state = AtaState::Idle;
        }

        let dispatch: Option<(AtaCommand, CommandDispatchFn)> = match byte {
            0x10..=0x1F => Some((AtaCommand::Recalibrate, AtaDevice::command_recalibrate)),
            0x20 => Some((AtaCommand::ReadSectorRetry, AtaDevice::command_read_sectors)),
            0x21 => Some((AtaCommand::ReadSector, AtaDevice::command_read_sectors)),
            0x30 => Some((AtaCommand::WriteSectorRetry, AtaDevice::command_write_sectors)),
            0x31 => Some((AtaCommand::WriteSector, AtaDevice::command_write_sectors)),
            0x40 | 0x41 => Some((AtaCommand::ReadVerifySector, AtaDevice::command_read_verify_sectors)),
            0x70..=0x7F => Some((AtaCommand::Seek, AtaDevice::command_seek)),
            0x90 => Some((AtaCommand::ExecuteDiagnostic, AtaDevice::command_execute_diagnostic)),
            0x91 => Some((AtaCommand::InitializeParameters, AtaDevice::command_initialize_parameters)),
            0xEC => Some((AtaCommand::IdentifyDrive, AtaDevice::command_identify_drive)),
            0xEF => Some((AtaCommand::SetFeatures, AtaDevice::command_set_features)),
            _ => None,
        };

        self.set_ready_status();
        self.error_register = AtaErrorRegister::from_bytes([0]);

        let (command, command_fn) = match dispatch {
            Some(dispatch) => dispatch,
            None => {
                log::warn!("Unsupported ATA command: {:02X}", byte);
                self.abort(false);
                return;
            }
        };

        log::debug!("ATA command {:02X} {:?}", byte, command);
        self.command = command;
        match command_fn(self) {
            Continuation::CommandComplete => {
                self.last_command = self.command;
                self.command = AtaCommand::None;
                self.state = AtaState::Idle;
            }
            Continuation::ContinueAsOperation => {
                log::trace!("Command will continue as operation");
            }
        }
    }

    /// ATA command 0xEC: Identify Drive
    fn command_identify_drive(&mut self) -> Continuation {
        let id_blob = match self.image.as_ref() {
            Some(image) => AtaDriveIdentification::new(image.geometry(), &self.geometry, image.total_sectors()),
            None => {
                self.abort(false);
                return Continuation::CommandComplete;
            }
        };

        self.clear_buffer();
        match id_blob.write(&mut self.sector_buffer) {
            Ok(_) => {
                log::debug!("Drive Identification block written to sector buffer");
                self.sector_buffer.set_position(0);
                self.sectors_left = 1;
                self.command_lba = 0;
                self.begin_read_transfer();
                Continuation::ContinueAsOperation
            }
            Err(e) => {
                log::error!("Error writing Drive Identification block to sector buffer: {}", e);
                self.abort(false);
                Continuation::CommandComplete
            }
        }
    }

    /// ATA commands 0x20/0x21: Read Sector(s)
    fn command_read_sectors(&mut self) -> Continuation {
        let lba = match self.command_address() {
            Some(lba) => lba,
            None => {
                log::debug!("command_read_sectors(): address out of range");
                self.abort(true);
                return Continuation::CommandComplete;
            }
        };
        self.command_lba = lba;
        self.sectors_left = self.requested_sectors();
        log::debug!(
            "command_read_sectors(): sector_count: {} lba: {}",
            self.sectors_left,
            self.command_lba
        );

        if self.read_sector_into_buffer() {
            Continuation::ContinueAsOperation
        }
        else {
            Continuation::CommandComplete
        }
    }

    /// ATA commands 0x30/0x31: Write Sector(s)
    fn command_write_sectors(&mut self) -> Continuation {
        let lba = match self.command_address() {
            Some(lba) => lba,
            None => {
                log::debug!("command_write_sectors(): address out of range");
                self.abort(true);
                return Continuation::CommandComplete;
            }
        };
        if self.image.as_ref().is_some_and(|image| image.write_protected()) {
            log::warn!("command_write_sectors(): image is write protected");
            self.abort(false);
            return Continuation::CommandComplete;
        }
        self.command_lba = lba;
        self.sectors_left = self.requested_sectors();
        log::debug!(
            "command_write_sectors(): sector_count: {} lba: {}",
            self.sectors_left,
            self.command_lba
        );

        self.clear_buffer();
        self.state = AtaState::WriteData;
        self.status_register.set_drq(true);
        Continuation::ContinueAsOperation
    }

    /// ATA command 0x40: Read Verify Sector(s). Only checks the range exists.
    fn command_read_verify_sectors(&mut self) -> Continuation {
        match self.command_address() {
            Some(lba) if lba + self.requested_sectors() as usize <= self.total_sectors() => {
                self.distribute_address(lba + self.requested_sectors() as usize - 1);
            }
            _ => self.abort(true),
        }
        Continuation::CommandComplete
    }

    /// ATA command 0x1x: Recalibrate
    fn command_recalibrate(&mut self) -> Continuation {
        self.cylinder_low_register = 0;
        self.cylinder_high_register = 0;
        self.status_register.set_dsc(true);
        Continuation::CommandComplete
    }

    /// ATA command 0x7x: Seek
    fn command_seek(&mut self) -> Continuation {
        if self.command_address().is_none() {
            self.abort(true);
        }
        Continuation::CommandComplete
    }

    /// ATA command 0x90: Execute Device Diagnostic
    fn command_execute_diagnostic(&mut self) -> Continuation {
        self.error_register = AtaErrorRegister::from_bytes([DIAGNOSTIC_PASSED]);
        Continuation::CommandComplete
    }

    /// ATA command 0x91: Initialize Device Parameters. Sets the CHS translation from the
    /// sector count (sectors per track) and drive/head (heads - 1) registers.
    fn command_initialize_parameters(&mut self) -> Continuation {
        let heads = (self.drive_head_register & DRIVE_HEAD_HEAD_MASK) + 1;
        let sectors = self.sector_count_register;
        if sectors == 0 {
            self.abort(false);
            return Continuation::CommandComplete;
        }
        let cylinders = (self.total_sectors() / (heads as usize * sectors as usize)).min(u16::MAX as usize) as u16;
        self.geometry = DriveGeometry::new(cylinders, heads, sectors, 1, SECTOR_SIZE);
        log::debug!("command_initialize_parameters(): translation now {}", self.geometry);
        Continuation::CommandComplete
    }

    /// ATA command 0xEF: Set Features
    fn command_set_features(&mut self) -> Continuation {
        match self.features_register {
            FEATURE_ENABLE_8BIT => self.eight_bit = true,
            FEATURE_DISABLE_8BIT => self.eight_bit = false,
            FEATURE_ENABLE_WRITE_CACHE | FEATURE_DISABLE_WRITE_CACHE => {}
            feature => {
                log::debug!("command_set_features(): unsupported feature {:02X}", feature);
                self.abort(false);
            }
        }
        Continuation::CommandComplete
    }

    fn begin_read_transfer(&mut self) {
        self.state = AtaState::ReadData;
        self.status_register.set_drq(true);
    }

    fn end_operation(&mut self) {
        self.status_register.set_drq(false);
        self.last_command = self.command;
        self.command = AtaCommand::None;
        self.state = AtaState::Idle;
    }

    /// Load the current sector and raise DRQ. Aborts the command on failure.
    fn read_sector_into_buffer(&mut self) -> bool {
        let lba = self.command_lba;
        let result = match self.image.as_mut() {
            Some(image) => image.read_sector(lba, self.sector_buffer.get_mut()),
            None => Err(DiskError::NoMedia),
        };
        match result {
            Ok(_) => {
                self.sector_buffer.set_position(0);
                self.distribute_address(lba);
                self.begin_read_transfer();
                true
            }
            Err(e) => {
                log::error!("Sector read failed: {}", e);
                self.abort(matches!(e, DiskError::OutOfRange(_)));
                false
            }
        }
    }

    fn read_buffer_drained(&mut self) {
        self.sectors_left = self.sectors_left.saturating_sub(1);
        if self.sectors_left == 0 {
            self.end_operation();
            return;
        }
        self.command_lba += 1;
        self.read_sector_into_buffer();
    }

    fn write_buffer_filled(&mut self) {
        let lba = self.command_lba;
        let result = match self.image.as_mut() {
            Some(image) => image.write_sector(lba, self.sector_buffer.get_ref()),
            None => Err(DiskError::NoMedia),
        };
        if let Err(e) = result {
            log::error!("Sector write failed: {}", e);
            self.abort(matches!(e, DiskError::OutOfRange(_)));
            return;
        }
        self.modified = true;
        self.distribute_address(lba);

        self.sectors_left = self.sectors_left.saturating_sub(1);
        if self.sectors_left == 0 {
            self.end_operation();
            return;
        }
        self.command_lba += 1;
        if let Err(e) = self.sector_buffer.seek(SeekFrom::Start(0)) {
            log::error!("Error rewinding sector buffer: {e}");
        }
        self.sector_buffer.get_mut().fill(0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::devices::ata::ata_identification::GENERAL_FIXED_DISK;
    use std::path::{Path, PathBuf};

    fn hdd_image(name: &str, sectors: usize) -> PathBuf {
        let path = std::env::temp_dir().join(format!("coupe_ata_{}_{}.hdf", std::process::id(), name));
        let data: Vec<u8> = (0..sectors * SECTOR_SIZE).map(|i| (i / SECTOR_SIZE) as u8).collect();
        std::fs::write(&path, data).unwrap();
        path
    }

    fn device(path: &Path) -> AtaDevice {
        let mut ata = AtaDevice::new();
        ata.attach(HardDiskImage::open(path).unwrap());
        ata
    }

    fn set_lba(ata: &mut AtaDevice, lba: u32, count: u8) {
        ata.register_write(ATA_REG_SECTOR_COUNT, count);
        ata.register_write(ATA_REG_SECTOR_NUMBER, lba as u8);
        ata.register_write(ATA_REG_CYLINDER_LOW, (lba >> 8) as u8);
        ata.register_write(ATA_REG_CYLINDER_HIGH, (lba >> 16) as u8);
        ata.register_write(ATA_REG_DRIVE_HEAD, DRIVE_HEAD_LBA_BIT | ((lba >> 24) as u8 & 0x0F));
    }

    #[test]
    fn identify_reports_geometry_and_model() {
        let path = hdd_image("identify", 1024);
        let mut ata = device(&path);
        ata.register_write(ATA_REG_COMMAND, 0xEC);
        assert_eq!(ata.status_register_read() & 0x08, 0x08);

        let words: Vec<u16> = (0..256).map(|_| ata.data_read_u16()).collect();
        assert_eq!(words[0], GENERAL_FIXED_DISK);
        assert_eq!(words[1], 2);
        assert_eq!(words[3], 16);
        assert_eq!(words[6], 32);
        assert_eq!(words[60], 1024);

        let model: Vec<u8> = words[27..47].iter().flat_map(|w| [(w >> 8) as u8, *w as u8]).collect();
        assert_eq!(String::from_utf8_lossy(&model).trim_end(), "Coupe Hard Disk");

        assert_eq!(ata.status_register_read() & 0x08, 0);
        assert_eq!(ata.state(), AtaState::Idle);
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn multi_sector_lba_read() {
        let path = hdd_image("read", 64);
        let mut ata = device(&path);
        set_lba(&mut ata, 5, 2);
        ata.register_write(ATA_REG_COMMAND, 0x20);

        assert_eq!(ata.data_read_u8(), 5);
        for _ in 1..SECTOR_SIZE {
            ata.data_read_u8();
        }
        assert_eq!(ata.state(), AtaState::ReadData);
        assert_eq!(ata.data_read_u16(), 0x0606);
        for _ in 1..SECTOR_SIZE / 2 {
            ata.data_read_u16();
        }
        assert_eq!(ata.state(), AtaState::Idle);
        assert_eq!(ata.status_register_read(), 0x50);
        assert_eq!(ata.register_read(ATA_REG_SECTOR_NUMBER), 6);
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn chs_write_reaches_the_image() {
        let path = hdd_image("write", 64);
        let mut ata = device(&path);
        // Single head, 64 sectors per track: sector 10 is LBA 9.
        ata.register_write(ATA_REG_SECTOR_COUNT, 1);
        ata.register_write(ATA_REG_SECTOR_NUMBER, 10);
        ata.register_write(ATA_REG_CYLINDER_LOW, 0);
        ata.register_write(ATA_REG_CYLINDER_HIGH, 0);
        ata.register_write(ATA_REG_DRIVE_HEAD, 0);
        ata.register_write(ATA_REG_COMMAND, 0x30);
        for _ in 0..SECTOR_SIZE / 2 {
            ata.data_write_u16(0xBEEF);
        }
        assert!(ata.modified());
        assert_eq!(ata.state(), AtaState::Idle);
        ata.flush().unwrap();

        let data = std::fs::read(&path).unwrap();
        assert_eq!(&data[9 * SECTOR_SIZE..9 * SECTOR_SIZE + 2], &[0xEF, 0xBE]);
        assert_eq!(data[10 * SECTOR_SIZE], 10);
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn initialize_parameters_changes_translation() {
        let path = hdd_image("init", 64);
        let mut ata = device(&path);
        // 4 heads, 8 sectors per track.
        ata.register_write(ATA_REG_SECTOR_COUNT, 8);
        ata.register_write(ATA_REG_DRIVE_HEAD, 3);
        ata.register_write(ATA_REG_COMMAND, 0x91);
        assert_eq!(ata.geometry().h(), 4);
        assert_eq!(ata.geometry().c(), 2);

        // Cylinder 1, head 0, sector 1 = LBA 32.
        ata.register_write(ATA_REG_SECTOR_COUNT, 1);
        ata.register_write(ATA_REG_SECTOR_NUMBER, 1);
        ata.register_write(ATA_REG_CYLINDER_LOW, 1);
        ata.register_write(ATA_REG_DRIVE_HEAD, 0);
        ata.register_write(ATA_REG_COMMAND, 0x21);
        assert_eq!(ata.data_read_u8(), 32);
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn bad_commands_and_addresses_set_error() {
        let path = hdd_image("errors", 64);
        let mut ata = device(&path);

        ata.register_write(ATA_REG_COMMAND, 0xFF);
        assert_eq!(ata.status_register_read() & 0x01, 0x01);
        assert_eq!(ata.register_read(ATA_REG_ERROR), 0x04);

        set_lba(&mut ata, 64, 1);
        ata.register_write(ATA_REG_COMMAND, 0x20);
        assert_eq!(ata.register_read(ATA_REG_ERROR), 0x10);
        assert_eq!(ata.state(), AtaState::Idle);

        ata.register_write(ATA_REG_FEATURES, 0x01);
        ata.register_write(ATA_REG_COMMAND, 0xEF);
        assert!(ata.eight_bit());
        assert_eq!(ata.status_register_read() & 0x01, 0);
        let _ = std::fs::remove_file(path);
    }
}
