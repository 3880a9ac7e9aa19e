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

    coupe_core::devices::clut.rs
*/
//! The palette: 16 CLUT registers holding 7-bit SAM colours, and the four mode 3 entries.
//!
//! Mode 3 has only four colours. They are taken from the CLUT group selected by the HMPR
//! MD3COL field, so the shadow table is recomputed whenever either side changes.

pub const CLUT_SIZE: usize = 16;
pub const MODE3_CLUT_SIZE: usize = 4;
pub const SAM_COLOUR_MASK: u8 = 0x7f;
pub const SAM_PALETTE_SIZE: usize = 128;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Colour {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// Resolve a 7-bit SAM colour to RGB.
///
/// Bits are `x G R B I g r b`: the upper and lower bit of each component, with bit 3 (I) the
/// bright half step shared by all three components.
pub fn sam_colour(index: u8) -> Colour {
    let index = index & SAM_COLOUR_MASK;
    let bright = (index >> 3) & 1;
    let level = |hi: u8, lo: u8| -> u8 {
        let v = (((index >> hi) & 1) << 2) | (((index >> lo) & 1) << 1) | bright;
        // 0..=7 scaled to 0..=255
        (v as u16 * 255 / 7) as u8
    };
    Colour {
        r: level(5, 1),
        g: level(6, 2),
        b: level(4, 0),
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ClutStore {
    clut: [u8; CLUT_SIZE],
    mode3: [u8; MODE3_CLUT_SIZE],
    md3col: u8,
}

impl Default for ClutStore {
    fn default() -> Self {
        Self {
            clut: [0; CLUT_SIZE],
            mode3: [0; MODE3_CLUT_SIZE],
            md3col: 0,
        }
    }
}

impl ClutStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Store a colour. The entry is selected by address bits A8-A11, so the index always
    /// lies within the table.
    pub fn write_clut(&mut self, port: u16, value: u8) {
        let index = ((port >> 8) as usize) & (CLUT_SIZE - 1);
        self.clut[index] = value & SAM_COLOUR_MASK;
        log::trace!("CLUT[{}] = {:02X}", index, self.clut[index]);
        self.update_mode3();
    }

    /// Follow an HMPR write: select which CLUT group mode 3 draws from.
    pub fn set_md3col(&mut self, md3col: u8) {
        self.md3col = md3col & 0x03;
        self.update_mode3();
    }

    fn update_mode3(&mut self) {
        let base = (self.md3col as usize) << 2;
        for (n, entry) in self.mode3.iter_mut().enumerate() {
            *entry = self.clut[base | n];
        }
    }

    #[inline]
    pub fn clut(&self) -> &[u8; CLUT_SIZE] {
        &self.clut
    }

    #[inline]
    pub fn mode3_clut(&self) -> &[u8; MODE3_CLUT_SIZE] {
        &self.mode3
    }

    #[inline]
    pub fn entry(&self, index: usize) -> u8 {
        self.clut[index & (CLUT_SIZE - 1)]
    }

    /// Current CLUT entries resolved to RGB.
    pub fn palette(&self) -> [Colour; CLUT_SIZE] {
        let mut out = [Colour::default(); CLUT_SIZE];
        for (colour, &entry) in out.iter_mut().zip(self.clut.iter()) {
            *colour = sam_colour(entry);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_comes_from_high_address_bits() {
        let mut clut = ClutStore::new();
        clut.write_clut(0x05F8, 0x7F);
        clut.write_clut(0xF3F8, 0xFF);
        assert_eq!(clut.entry(5), 0x7F);
        // Only A8-A11 select the entry, the value loses bit 7.
        assert_eq!(clut.entry(3), 0x7F);
        clut.write_clut(0x05F8, 0x12);
        assert_eq!(clut.entry(5), 0x12);
    }

    #[test]
    fn mode3_entries_follow_md3col() {
        let mut clut = ClutStore::new();
        for i in 0..16u16 {
            clut.write_clut((i << 8) | 0xF8, i as u8 + 0x20);
        }
        assert_eq!(clut.mode3_clut(), &[0x20, 0x21, 0x22, 0x23]);
        clut.set_md3col(2);
        assert_eq!(clut.mode3_clut(), &[0x28, 0x29, 0x2A, 0x2B]);
        clut.write_clut(0x09F8, 0x01);
        assert_eq!(clut.mode3_clut()[1], 0x01);
    }

    #[test]
    fn sam_palette_extremes() {
        assert_eq!(sam_colour(0), Colour { r: 0, g: 0, b: 0 });
        assert_eq!(sam_colour(127), Colour { r: 255, g: 255, b: 255 });
        // Bright alone lifts every component by one step.
        assert_eq!(sam_colour(0x08), Colour { r: 36, g: 36, b: 36 });
        // Blue high bit only.
        assert_eq!(sam_colour(0x10).b, 145);
        assert_eq!(sam_colour(0x10).r, 0);
    }
}
