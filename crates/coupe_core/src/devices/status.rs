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

    coupe_core::devices::status.rs
*/
//! The ASIC interrupt status latch.
//!
//! Active low: a pending source holds its bit at 0. The line, frame and mouse sources are
//! edge triggered and stay pending until acknowledged. The MIDI bits follow the level of the
//! MIDI port's transfer state.

pub const STATUS_INT_LINE: u8 = 0x01;
pub const STATUS_INT_MOUSE: u8 = 0x02;
pub const STATUS_INT_MIDIIN: u8 = 0x04;
pub const STATUS_INT_FRAME: u8 = 0x08;
pub const STATUS_INT_MIDIOUT: u8 = 0x10;
pub const STATUS_INT_NONE: u8 = 0x1f;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum InterruptSource {
    Line,
    Mouse,
    MidiIn,
    Frame,
    MidiOut,
}

impl InterruptSource {
    pub fn mask(&self) -> u8 {
        match self {
            InterruptSource::Line => STATUS_INT_LINE,
            InterruptSource::Mouse => STATUS_INT_MOUSE,
            InterruptSource::MidiIn => STATUS_INT_MIDIIN,
            InterruptSource::Frame => STATUS_INT_FRAME,
            InterruptSource::MidiOut => STATUS_INT_MIDIOUT,
        }
    }

    pub fn is_edge_triggered(&self) -> bool {
        matches!(
            self,
            InterruptSource::Line | InterruptSource::Frame | InterruptSource::Mouse
        )
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct StatusLatch {
    value: u8,
}

impl Default for StatusLatch {
    fn default() -> Self {
        Self {
            value: STATUS_INT_NONE,
        }
    }
}

impl StatusLatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.value = STATUS_INT_NONE;
    }

    /// Raise an interrupt. Clears only the source's own bit.
    #[inline]
    pub fn signal(&mut self, source: InterruptSource) {
        self.value &= !source.mask();
    }

    /// CPU acknowledge. Edge sources return to idle, level sources are left to their device.
    pub fn acknowledge(&mut self, source: InterruptSource) {
        if source.is_edge_triggered() {
            self.value |= source.mask();
        }
    }

    /// Drive a level source. `active` holds the bit low.
    pub fn set_level(&mut self, source: InterruptSource, active: bool) {
        if active {
            self.value &= !source.mask();
        }
        else {
            self.value |= source.mask();
        }
    }

    #[inline]
    pub fn value(&self) -> u8 {
        self.value
    }

    #[inline]
    pub fn is_pending(&self, source: InterruptSource) -> bool {
        self.value & source.mask() == 0
    }

    #[inline]
    pub fn any_pending(&self) -> bool {
        self.value & STATUS_INT_NONE != STATUS_INT_NONE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_signal_and_acknowledge() {
        let mut latch = StatusLatch::new();
        assert_eq!(latch.value(), 0x1f);

        latch.signal(InterruptSource::Frame);
        assert_eq!(latch.value(), 0x17);
        assert!(latch.is_pending(InterruptSource::Frame));
        assert!(!latch.is_pending(InterruptSource::Line));

        latch.acknowledge(InterruptSource::Frame);
        assert_eq!(latch.value(), 0x1f);
        assert!(!latch.any_pending());
    }

    #[test]
    fn acknowledge_leaves_other_sources_pending() {
        let mut latch = StatusLatch::new();
        latch.signal(InterruptSource::Line);
        latch.signal(InterruptSource::Frame);
        latch.acknowledge(InterruptSource::Frame);
        assert!(latch.is_pending(InterruptSource::Line));
        assert_eq!(latch.value(), 0x1e);
    }

    #[test]
    fn midi_bits_are_level_driven() {
        let mut latch = StatusLatch::new();
        latch.set_level(InterruptSource::MidiOut, true);
        latch.acknowledge(InterruptSource::MidiOut);
        assert!(latch.is_pending(InterruptSource::MidiOut));
        latch.set_level(InterruptSource::MidiOut, false);
        assert_eq!(latch.value(), 0x1f);
    }
}
