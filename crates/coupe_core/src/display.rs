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

    coupe_core::display.rs
*/
//! The seam between the I/O subsystem and the renderer.
//!
//! The renderer owns the raster position and screen memory. It answers the few questions the
//! ports need through [DisplayProbe]. In the other direction the bus commits a [FrameSnapshot]
//! once per frame for the renderer to draw from.

use crate::devices::{
    clut::{Colour, CLUT_SIZE, MODE3_CLUT_SIZE},
    paging::Paging,
};

/// Light pen / raster position latched by the ASIC.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct PenPosition {
    /// Horizontal position, returned by the LPEN port.
    pub lpen: u8,
    /// Line number, returned by the HPEN port.
    pub hpen: u8,
}

pub trait DisplayProbe {
    /// The screen attribute byte under the raster, returned by the ATTR port.
    fn attribute_byte(&self) -> u8 {
        0xff
    }

    fn pen_position(&self) -> PenPosition {
        PenPosition::default()
    }

    /// Whether the visible screen holds the ROM's ready screen (the copyright message at
    /// the bottom of the power-on display).
    fn matches_startup_screen(&self) -> bool {
        false
    }
}

/// Stand-in used when no renderer is attached.
#[derive(Copy, Clone, Debug, Default)]
pub struct NullDisplay;

impl DisplayProbe for NullDisplay {}

/// State committed at the end of a frame for the renderer.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FrameSnapshot {
    pub frame: u64,
    pub paging: Paging,
    pub clut: [u8; CLUT_SIZE],
    pub mode3_clut: [u8; MODE3_CLUT_SIZE],
    pub colours: [Colour; CLUT_SIZE],
    pub border: u8,
    pub screen_off: bool,
}
