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

    coupe_core::devices::paging.rs
*/
//! The ASIC memory paging registers.
//!
//! LMPR, HMPR and VMPR each pack a 5-bit page number with control bits. Every field is
//! decoded straight from the stored byte with a fixed mask, so any byte value is legal
//! and no write can fail. LEPR and HEPR select pages of external memory and are stored
//! verbatim.

use serde_derive::{Deserialize, Serialize};

pub const RAM_PAGE_COUNT: u8 = 32;

pub const LMPR_PAGE_MASK: u8 = 0x1f;
pub const LMPR_ROM0_OFF: u8 = 0x20;
pub const LMPR_ROM1: u8 = 0x40;
pub const LMPR_WPROT: u8 = 0x80;

pub const HMPR_PAGE_MASK: u8 = 0x1f;
pub const HMPR_MD3COL_MASK: u8 = 0x60;
pub const HMPR_MD3COL_SHIFT: u8 = 5;
pub const HMPR_MCNTRL_MASK: u8 = 0x80;

pub const MODE_1: u8 = 0x00;
pub const MODE_2: u8 = 0x20;
pub const MODE_3: u8 = 0x40;
pub const MODE_4: u8 = 0x60;

pub const VMPR_PAGE_MASK: u8 = 0x1f;
pub const VMPR_MODE_MASK: u8 = 0x60;
pub const VMPR_MODE_SHIFT: u8 = 5;
pub const VMPR_MDE0_MASK: u8 = 0x20;
pub const VMPR_MDE1_MASK: u8 = 0x40;

/// Screen modes selected by VMPR bits 5-6.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScreenMode {
    #[default]
    Mode1,
    Mode2,
    Mode3,
    Mode4,
}

impl From<u8> for ScreenMode {
    /// Convert a 2-bit mode number (0-3) into a [ScreenMode].
    fn from(mode: u8) -> Self {
        match mode & 0x03 {
            0 => ScreenMode::Mode1,
            1 => ScreenMode::Mode2,
            2 => ScreenMode::Mode3,
            _ => ScreenMode::Mode4,
        }
    }
}

/// What occupies one 16K section of the Z80 address space.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MemoryBank {
    Rom0,
    Rom1,
    Ram { page: u8, read_only: bool },
    External { page: u8 },
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paging {
    lmpr: u8,
    hmpr: u8,
    vmpr: u8,
    lepr: u8,
    hepr: u8,

    vmpr_mode: u8,
    vmpr_page1: u8,
    vmpr_page2: Option<u8>,
}

impl Paging {
    pub fn new() -> Self {
        let mut paging = Self::default();
        paging.reset();
        paging
    }

    /// Power-on state: every register cleared, ROM0 paged in, mode 1 on page 0.
    pub fn reset(&mut self) {
        self.out_lmpr(0);
        self.out_hmpr(0);
        self.out_vmpr(0);
        self.out_lepr(0);
        self.out_hepr(0);
    }

    pub fn out_lmpr(&mut self, data: u8) {
        self.lmpr = data;
        log::trace!(
            "LMPR: {:02X} page: {} rom0_off: {} rom1: {} wprot: {}",
            data,
            self.lmpr_page(),
            self.rom0_off(),
            self.rom1(),
            self.write_protect()
        );
    }

    pub fn out_hmpr(&mut self, data: u8) {
        self.hmpr = data;
        log::trace!(
            "HMPR: {:02X} page: {} md3col: {} mcntrl: {}",
            data,
            self.hmpr_page(),
            self.md3col(),
            self.mcntrl()
        );
    }

    pub fn out_vmpr(&mut self, data: u8) {
        self.vmpr = data;
        self.vmpr_mode = (data & VMPR_MODE_MASK) >> VMPR_MODE_SHIFT;

        // Modes 3 and 4 use a 24K display that spans an even/odd page pair.
        if data & VMPR_MDE1_MASK != 0 {
            self.vmpr_page1 = data & VMPR_PAGE_MASK & !0x01;
            self.vmpr_page2 = Some((self.vmpr_page1 + 1) & VMPR_PAGE_MASK);
        }
        else {
            self.vmpr_page1 = data & VMPR_PAGE_MASK;
            self.vmpr_page2 = None;
        }

        log::trace!(
            "VMPR: {:02X} mode: {} page1: {} page2: {:?}",
            data,
            self.vmpr_mode + 1,
            self.vmpr_page1,
            self.vmpr_page2
        );
    }

    pub fn out_lepr(&mut self, data: u8) {
        self.lepr = data;
    }

    pub fn out_hepr(&mut self, data: u8) {
        self.hepr = data;
    }

    #[inline]
    pub fn lmpr(&self) -> u8 {
        self.lmpr
    }
    #[inline]
    pub fn hmpr(&self) -> u8 {
        self.hmpr
    }
    #[inline]
    pub fn vmpr(&self) -> u8 {
        self.vmpr
    }
    #[inline]
    pub fn lepr(&self) -> u8 {
        self.lepr
    }
    #[inline]
    pub fn hepr(&self) -> u8 {
        self.hepr
    }

    #[inline]
    pub fn lmpr_page(&self) -> u8 {
        self.lmpr & LMPR_PAGE_MASK
    }
    #[inline]
    pub fn rom0_off(&self) -> bool {
        self.lmpr & LMPR_ROM0_OFF != 0
    }
    #[inline]
    pub fn rom1(&self) -> bool {
        self.lmpr & LMPR_ROM1 != 0
    }
    #[inline]
    pub fn write_protect(&self) -> bool {
        self.lmpr & LMPR_WPROT != 0
    }

    #[inline]
    pub fn hmpr_page(&self) -> u8 {
        self.hmpr & HMPR_PAGE_MASK
    }
    /// The 2-bit mode 3 colour field, selecting which group of four CLUT entries mode 3 uses.
    #[inline]
    pub fn md3col(&self) -> u8 {
        (self.hmpr & HMPR_MD3COL_MASK) >> HMPR_MD3COL_SHIFT
    }
    #[inline]
    pub fn mcntrl(&self) -> bool {
        self.hmpr & HMPR_MCNTRL_MASK != 0
    }

    #[inline]
    pub fn vmpr_page(&self) -> u8 {
        self.vmpr & VMPR_PAGE_MASK
    }
    /// The 2-bit screen mode number, 0 for mode 1 through 3 for mode 4.
    #[inline]
    pub fn vmpr_mode(&self) -> u8 {
        self.vmpr_mode
    }
    #[inline]
    pub fn screen_mode(&self) -> ScreenMode {
        ScreenMode::from(self.vmpr_mode)
    }
    #[inline]
    pub fn mode_3_or_4(&self) -> bool {
        self.vmpr & VMPR_MDE1_MASK != 0
    }
    #[inline]
    pub fn vmpr_page1(&self) -> u8 {
        self.vmpr_page1
    }
    /// Second display page, only used by the dual-bank modes 3 and 4.
    #[inline]
    pub fn vmpr_page2(&self) -> Option<u8> {
        self.vmpr_page2
    }

    /// Decode the registers into the four 16K sections of the Z80 address space.
    pub fn memory_map(&self) -> [MemoryBank; 4] {
        let lmpr_page = self.lmpr_page();
        let hmpr_page = self.hmpr_page();

        let section_a = if self.rom0_off() {
            MemoryBank::Ram {
                page: lmpr_page,
                read_only: self.write_protect(),
            }
        }
        else {
            MemoryBank::Rom0
        };

        let section_b = MemoryBank::Ram {
            page: (lmpr_page + 1) % RAM_PAGE_COUNT,
            read_only: false,
        };

        let section_c = if self.mcntrl() {
            MemoryBank::External { page: self.lepr }
        }
        else {
            MemoryBank::Ram {
                page: hmpr_page,
                read_only: false,
            }
        };

        let section_d = if self.rom1() {
            MemoryBank::Rom1
        }
        else if self.mcntrl() {
            MemoryBank::External { page: self.hepr }
        }
        else {
            MemoryBank::Ram {
                page: (hmpr_page + 1) % RAM_PAGE_COUNT,
                read_only: false,
            }
        };

        [section_a, section_b, section_c, section_d]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lmpr_fields_decode_independently() {
        let mut paging = Paging::new();
        for v in 0..=255u8 {
            paging.out_lmpr(v);
            assert_eq!(paging.lmpr_page(), v & 0x1f);
            assert_eq!(paging.rom0_off(), v & 0x20 != 0);
            assert_eq!(paging.rom1(), v & 0x40 != 0);
            assert_eq!(paging.write_protect(), v & 0x80 != 0);
            assert_eq!(paging.lmpr(), v);
        }
    }

    #[test]
    fn hmpr_fields_decode() {
        let mut paging = Paging::new();
        for v in 0..=255u8 {
            paging.out_hmpr(v);
            assert_eq!(paging.hmpr_page(), v & 0x1f);
            assert_eq!(paging.md3col(), (v & 0x60) >> 5);
            assert_eq!(paging.mcntrl(), v & 0x80 != 0);
        }
    }

    #[test]
    fn vmpr_page_and_mode_decode() {
        let mut paging = Paging::new();
        for v in 0..=255u8 {
            paging.out_vmpr(v);
            assert_eq!(paging.vmpr_page(), v & 0x1f);
            assert_eq!(paging.vmpr_mode(), (v & 0x60) >> 5);
        }
    }

    #[test]
    fn vmpr_dual_bank_pages() {
        let mut paging = Paging::new();

        // Mode 4, odd page: the display starts on the even page below.
        paging.out_vmpr(MODE_4 | 0x07);
        assert_eq!(paging.vmpr_page1(), 0x06);
        assert_eq!(paging.vmpr_page2(), Some(0x07));
        assert_eq!(paging.screen_mode(), ScreenMode::Mode4);

        // Top page pair wraps within the 5-bit page space.
        paging.out_vmpr(MODE_3 | 0x1f);
        assert_eq!(paging.vmpr_page1(), 0x1e);
        assert_eq!(paging.vmpr_page2(), Some(0x1f));

        paging.out_vmpr(MODE_2 | 0x05);
        assert_eq!(paging.vmpr_page1(), 0x05);
        assert_eq!(paging.vmpr_page2(), None);
    }

    #[test]
    fn memory_map_power_on() {
        let paging = Paging::new();
        let map = paging.memory_map();
        assert_eq!(map[0], MemoryBank::Rom0);
        assert_eq!(map[1], MemoryBank::Ram { page: 1, read_only: false });
        assert_eq!(map[2], MemoryBank::Ram { page: 0, read_only: false });
        assert_eq!(map[3], MemoryBank::Ram { page: 1, read_only: false });
    }

    #[test]
    fn memory_map_rom_off_write_protect_and_external() {
        let mut paging = Paging::new();
        paging.out_lmpr(LMPR_WPROT | LMPR_ROM0_OFF | 0x1f);
        paging.out_hmpr(HMPR_MCNTRL_MASK | 0x04);
        paging.out_lepr(0x81);
        paging.out_hepr(0x82);

        let map = paging.memory_map();
        assert_eq!(map[0], MemoryBank::Ram { page: 0x1f, read_only: true });
        assert_eq!(map[1], MemoryBank::Ram { page: 0, read_only: false });
        assert_eq!(map[2], MemoryBank::External { page: 0x81 });
        assert_eq!(map[3], MemoryBank::External { page: 0x82 });

        paging.out_lmpr(LMPR_ROM1);
        assert_eq!(paging.memory_map()[3], MemoryBank::Rom1);
    }
}
