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

    coupe_core::device_types::activity.rs
*/
//! Per-device activity counter driving the transient "busy" indication of a drive.

/// Number of frames a drive stays active after an access.
pub const ACTIVITY_FRAMES: u8 = 2;

/// Counts down once per frame from the last access. Active while non-zero.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ActivityCounter(u8);

impl ActivityCounter {
    pub fn new() -> Self {
        Self(0)
    }

    /// Mark an access: the device stays active for the next [ACTIVITY_FRAMES] frames.
    #[inline]
    pub fn touch(&mut self) {
        self.0 = ACTIVITY_FRAMES;
    }

    #[inline]
    pub fn set(&mut self, frames: u8) {
        self.0 = frames;
    }

    /// Frame boundary. Decrements by one, never below zero.
    #[inline]
    pub fn tick(&mut self) {
        self.0 = self.0.saturating_sub(1);
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.0 != 0
    }

    #[inline]
    pub fn count(&self) -> u8 {
        self.0
    }

    pub fn clear(&mut self) {
        self.0 = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counter_floors_at_zero() {
        let mut counter = ActivityCounter::new();
        counter.touch();
        assert!(counter.is_active());
        counter.tick();
        assert!(counter.is_active());
        counter.tick();
        assert!(!counter.is_active());
        counter.tick();
        assert!(!counter.is_active());
        assert_eq!(counter.count(), 0);
    }
}
