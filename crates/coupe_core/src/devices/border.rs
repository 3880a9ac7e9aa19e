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

    coupe_core::devices::border.rs
*/
//! Port 254: border colour and speaker/tape control on write, keyboard scan on read.

pub const BORD_COLOUR_MASK: u8 = 0x27;
pub const BORD_KEY_MASK: u8 = 0x1f;
pub const BORD_MIC_MASK: u8 = 0x08;
pub const BORD_BEEP_MASK: u8 = 0x10;
pub const BORD_SPEN_MASK: u8 = 0x20;
pub const BORD_EAR_MASK: u8 = 0x40;
pub const BORD_SOFF_MASK: u8 = 0x80;

/// Keyboard read bits that float high.
pub const KEYBOARD_FIXED_BITS: u8 = 0xa0;

/// Border colour bits as stored: 3-bit colour plus the bright bit in bit 5.
#[inline]
pub const fn bord_col(x: u8) -> u8 {
    x & BORD_COLOUR_MASK
}

/// Border colour as a CLUT index 0-15.
#[inline]
pub const fn bord_val(x: u8) -> u8 {
    ((x & 0x20) >> 2) | (x & 0x07)
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct BorderRegister {
    border: u8,
}

impl BorderRegister {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.border = 0;
    }

    pub fn write(&mut self, data: u8) {
        self.border = data;
        log::trace!(
            "Border: {:02X} colour: {} mic: {} beep: {} soff: {}",
            data,
            bord_val(data),
            self.mic(),
            self.beep(),
            self.screen_off()
        );
    }

    #[inline]
    pub fn value(&self) -> u8 {
        self.border
    }
    #[inline]
    pub fn border_col(&self) -> u8 {
        bord_col(self.border)
    }
    #[inline]
    pub fn clut_index(&self) -> u8 {
        bord_val(self.border)
    }
    #[inline]
    pub fn mic(&self) -> bool {
        self.border & BORD_MIC_MASK != 0
    }
    #[inline]
    pub fn beep(&self) -> bool {
        self.border & BORD_BEEP_MASK != 0
    }
    #[inline]
    pub fn speaker_enabled(&self) -> bool {
        self.border & BORD_SPEN_MASK != 0
    }
    #[inline]
    pub fn screen_off(&self) -> bool {
        self.border & BORD_SOFF_MASK != 0
    }

    /// Compose the keyboard port read: key columns in bits 0-4, EAR in bit 6, bits 5 and 7 high.
    /// With no tape signal the EAR input picks up the MIC output.
    pub fn keyboard_byte(&self, keys: u8, tape_ear: Option<bool>) -> u8 {
        let ear = match tape_ear {
            Some(level) => {
                if level {
                    BORD_EAR_MASK
                }
                else {
                    0
                }
            }
            None => (self.border & BORD_MIC_MASK) << 3,
        };
        (keys & BORD_KEY_MASK) | KEYBOARD_FIXED_BITS | ear
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn border_colour_macros() {
        assert_eq!(bord_val(0x27), 0x0F);
        assert_eq!(bord_val(0x05), 0x05);
        assert_eq!(bord_val(0xD8), 0x00);
        assert_eq!(bord_col(0xFF), 0x27);
    }

    #[test]
    fn ear_falls_back_to_mic() {
        let mut border = BorderRegister::new();
        assert_eq!(border.keyboard_byte(0x1F, None), 0xBF);
        border.write(BORD_MIC_MASK);
        assert_eq!(border.keyboard_byte(0x1F, None), 0xFF);
        assert_eq!(border.keyboard_byte(0x1E, Some(false)), 0xBE);
    }
}
