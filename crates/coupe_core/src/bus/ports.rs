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

    coupe_core::bus::ports.rs
*/
//! Fixed ASIC port addresses. Most compare against the low byte of the port; the pen and
//! sound ports also use bit 8.

pub const KEMPSTON_PORT: u16 = 31;

pub const LEPR_PORT: u16 = 128;
pub const HEPR_PORT: u16 = 129;

pub const CLUT_BASE_PORT: u16 = 248;
pub const LPEN_PORT: u16 = 248;
pub const HPEN_PORT: u16 = 504;
pub const PEN_MASK: u16 = 0x1F8;

pub const STATUS_PORT: u16 = 249;
pub const LINE_PORT: u16 = 249;
pub const LMPR_PORT: u16 = 250;
pub const HMPR_PORT: u16 = 251;
pub const VMPR_PORT: u16 = 252;
pub const MIDI_PORT: u16 = 253;
pub const KEYBOARD_PORT: u16 = 254;
pub const BORDER_PORT: u16 = 254;

pub const ATTR_PORT: u16 = 255;
pub const SOUND_DATA_PORT: u16 = 255;
pub const SOUND_ADDR_PORT: u16 = 511;
pub const SOUND_MASK: u16 = 0x1FF;

/// Ports from here up belong to the ASIC itself.
pub const ASIC_PORT_FIRST: u16 = 0xF8;
