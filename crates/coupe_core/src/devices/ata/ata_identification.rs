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

    coupe_core::devices::ata::ata_identification.rs
*/
//! The 512-byte block returned by IDENTIFY DEVICE.

use std::str::FromStr;

use binrw::binrw;

use crate::{device_types::geometry::DriveGeometry, devices::ata::ata_string::AtaString};

pub const GENERAL_FIXED_DISK: u16 = 0b0000_0000_0100_0000;
pub const CAPABILITIES_LBA: u16 = 0b0000_0010_0000_0000;
pub const MODEL_NUMBER: &str = "Coupe Hard Disk";
pub const FIRMWARE_REVISION: &str = "1.0";

#[binrw]
#[derive(Default)]
#[brw(little)]
pub struct AtaDriveIdentification {
    pub general: u16,
    pub cylinders: u16,
    pub specific_configuration: u16,
    pub num_heads: u16,
    pub unformatted_bytes_per_track: u16,
    pub unformatted_bytes_per_sector: u16,
    pub sectors_per_track: u16,
    pub vendor_unique: [u16; 3],
    pub serial_no: AtaString<20>,
    pub buffer_type: u16,
    pub buffer_size: u16,
    pub long_cmd_bytes: u16,
    pub firmware_revision: AtaString<8>,
    pub model_number: AtaString<40>,
    pub maximum_block_transfer: u8,
    pub vendor_unique2: u8,
    pub double_word_io: u16,
    pub capabilities: u16,
    pub reserved: u16,
    pub pio_timing: u16,
    pub dma_timing: u16,
    pub field_validity: u16,
    pub current_cylinders: u16,
    pub current_heads: u16,
    pub current_sectors_per_track: u16,
    pub current_capacity_low: u16,
    pub current_capacity_high: u16,
    pub multiple_sector: u16,
    pub user_addressable_sectors: u32,
}

fn ata_string<const N: usize>(s: &str) -> AtaString<N> {
    match AtaString::from_str(s) {
        Ok(s) => s,
        Err(never) => match never {},
    }
}

impl AtaDriveIdentification {
    /// `geometry` is the default translation of the image. `current` is the translation
    /// last set by INITIALIZE DEVICE PARAMETERS.
    pub fn new(geometry: &DriveGeometry, current: &DriveGeometry, total_sectors: usize) -> Self {
        let current_capacity = current.total_sectors() as u32;

        AtaDriveIdentification {
            general: GENERAL_FIXED_DISK,
            cylinders: geometry.c(),
            num_heads: geometry.h() as u16,
            unformatted_bytes_per_track: geometry.size() as u16 * geometry.s() as u16,
            unformatted_bytes_per_sector: geometry.size() as u16,
            sectors_per_track: geometry.s() as u16,
            serial_no: ata_string(&format!("{:020}", total_sectors)),
            firmware_revision: ata_string(FIRMWARE_REVISION),
            model_number: ata_string(MODEL_NUMBER),
            maximum_block_transfer: 1,
            capabilities: CAPABILITIES_LBA,
            field_validity: 1,
            current_cylinders: current.c(),
            current_heads: current.h() as u16,
            current_sectors_per_track: current.s() as u16,
            current_capacity_low: current_capacity as u16,
            current_capacity_high: (current_capacity >> 16) as u16,
            user_addressable_sectors: total_sectors as u32,
            ..Default::default()
        }
    }
}
