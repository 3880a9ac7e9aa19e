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

    coupe_core::devices::keyboard.rs
*/
//! The keyboard matrix and the auto-typer used by autoload.
//!
//! Eight rows are selected by address lines A8-A15 (active low) when reading port 254. The
//! ninth row holds the cursor and control keys and is selected when the whole high byte is
//! 0xFF. Each row reports five keys in bits 0-4, active low.

use std::collections::VecDeque;

pub const KEY_ROWS: usize = 9;
pub const EXTENDED_ROW: usize = 8;
pub const KEY_COLUMN_MASK: u8 = 0x1f;

/// Frames a typed key chord is held down, then released, by the auto-typer.
pub const AUTOTYPE_PRESS_FRAMES: u32 = 3;
pub const AUTOTYPE_RELEASE_FRAMES: u32 = 2;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum SamKey {
    Shift, Z, X, C, V,
    A, S, D, F, G,
    Q, W, E, R, T,
    N1, N2, N3, N4, N5,
    N0, N9, N8, N7, N6,
    P, O, I, U, Y,
    Enter, L, K, J, H,
    Space, Symbol, M, N, B,
    Cntrl, Up, Down, Left, Right,
}

impl SamKey {
    /// Matrix row and bit of this key.
    pub fn position(&self) -> (usize, u8) {
        use SamKey::*;
        let (row, col) = match self {
            Shift => (0, 0), Z => (0, 1), X => (0, 2), C => (0, 3), V => (0, 4),
            A => (1, 0), S => (1, 1), D => (1, 2), F => (1, 3), G => (1, 4),
            Q => (2, 0), W => (2, 1), E => (2, 2), R => (2, 3), T => (2, 4),
            N1 => (3, 0), N2 => (3, 1), N3 => (3, 2), N4 => (3, 3), N5 => (3, 4),
            N0 => (4, 0), N9 => (4, 1), N8 => (4, 2), N7 => (4, 3), N6 => (4, 4),
            P => (5, 0), O => (5, 1), I => (5, 2), U => (5, 3), Y => (5, 4),
            Enter => (6, 0), L => (6, 1), K => (6, 2), J => (6, 3), H => (6, 4),
            Space => (7, 0), Symbol => (7, 1), M => (7, 2), N => (7, 3), B => (7, 4),
            Cntrl => (8, 0), Up => (8, 1), Down => (8, 2), Left => (8, 3), Right => (8, 4),
        };
        (row, 1 << col)
    }

    /// Key chord that types `c`, if it can be typed.
    pub fn chord_for_char(c: char) -> Option<Vec<SamKey>> {
        use SamKey::*;
        let key = match c.to_ascii_lowercase() {
            'a' => A, 'b' => B, 'c' => C, 'd' => D, 'e' => E, 'f' => F, 'g' => G,
            'h' => H, 'i' => I, 'j' => J, 'k' => K, 'l' => L, 'm' => M, 'n' => N,
            'o' => O, 'p' => P, 'q' => Q, 'r' => R, 's' => S, 't' => T, 'u' => U,
            'v' => V, 'w' => W, 'x' => X, 'y' => Y, 'z' => Z,
            '0' => N0, '1' => N1, '2' => N2, '3' => N3, '4' => N4,
            '5' => N5, '6' => N6, '7' => N7, '8' => N8, '9' => N9,
            ' ' => Space,
            '\n' | '\r' => Enter,
            '"' => return Some(vec![Symbol, P]),
            _ => return None,
        };
        Some(vec![key])
    }
}

/// Key state, one byte per row, a clear bit meaning pressed.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct KeyMatrix {
    rows: [u8; KEY_ROWS],
}

impl Default for KeyMatrix {
    fn default() -> Self {
        Self { rows: [0xff; KEY_ROWS] }
    }
}

impl KeyMatrix {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: SamKey, pressed: bool) {
        let (row, bit) = key.position();
        if pressed {
            self.rows[row] &= !bit;
        }
        else {
            self.rows[row] |= bit;
        }
    }

    pub fn press(&mut self, key: SamKey) {
        self.set(key, true);
    }

    pub fn release(&mut self, key: SamKey) {
        self.set(key, false);
    }

    pub fn release_all(&mut self) {
        self.rows = [0xff; KEY_ROWS];
    }

    pub fn is_pressed(&self, key: SamKey) -> bool {
        let (row, bit) = key.position();
        self.rows[row] & bit == 0
    }

    #[inline]
    pub fn row(&self, row: usize) -> u8 {
        self.rows[row % KEY_ROWS]
    }

    /// Combine with another matrix: a key is down if it is down in either.
    pub fn merge(&self, other: &KeyMatrix) -> KeyMatrix {
        let mut rows = self.rows;
        for (row, other_row) in rows.iter_mut().zip(other.rows.iter()) {
            *row &= *other_row;
        }
        KeyMatrix { rows }
    }

    /// Scan the rows selected by the port high byte, returning bits 0-4.
    pub fn scan(&self, high: u8) -> u8 {
        if high == 0xff {
            return self.rows[EXTENDED_ROW] & KEY_COLUMN_MASK;
        }
        let mut value = 0xff;
        for row in 0..8 {
            if high & (1 << row) == 0 {
                value &= self.rows[row];
            }
        }
        value & KEY_COLUMN_MASK
    }
}

/// Feeds a string into the matrix as timed key presses.
#[derive(Clone, Debug, Default)]
pub struct AutoTyper {
    queue: VecDeque<Vec<SamKey>>,
    current: Option<Vec<SamKey>>,
    frames_left: u32,
    releasing: bool,
}

impl AutoTyper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `text` for typing. Characters with no key are skipped.
    pub fn type_text(&mut self, text: &str) {
        for c in text.chars() {
            match SamKey::chord_for_char(c) {
                Some(chord) => self.queue.push_back(chord),
                None => log::warn!("AutoTyper: no key for {:?}", c),
            }
        }
    }

    pub fn is_busy(&self) -> bool {
        self.current.is_some() || !self.queue.is_empty()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Advance one frame, returning the keys held down during it.
    pub fn tick(&mut self) -> KeyMatrix {
        let mut matrix = KeyMatrix::new();

        if self.frames_left == 0 {
            if self.current.is_some() && !self.releasing {
                self.releasing = true;
                self.frames_left = AUTOTYPE_RELEASE_FRAMES;
            }
            else {
                self.releasing = false;
                self.current = self.queue.pop_front();
                if self.current.is_some() {
                    self.frames_left = AUTOTYPE_PRESS_FRAMES;
                }
            }
        }

        if let Some(chord) = &self.current {
            if !self.releasing {
                for key in chord {
                    matrix.press(*key);
                }
            }
        }

        if self.frames_left > 0 {
            self.frames_left -= 1;
            if self.frames_left == 0 && self.releasing {
                self.current = None;
                self.releasing = false;
            }
        }
        matrix
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scan_selects_rows_by_address_line() {
        let mut m = KeyMatrix::new();
        m.press(SamKey::A);
        m.press(SamKey::Enter);

        assert_eq!(m.scan(0xFD), 0x1E); // A9 low: row 1, A pressed
        assert_eq!(m.scan(0xFE), 0x1F); // row 0 nothing pressed
        assert_eq!(m.scan(0xBD), 0x1E); // rows 1 and 6: A and Enter share bit 0
        assert_eq!(m.scan(0x00), 0x1E);
        assert_eq!(m.scan(0xFF), 0x1F);

        m.press(SamKey::Left);
        assert_eq!(m.scan(0xFF), 0x17);
    }

    #[test]
    fn autotyper_presses_then_releases() {
        let mut typer = AutoTyper::new();
        typer.type_text("b\"");
        assert!(typer.is_busy());

        let mut frames = Vec::new();
        while typer.is_busy() {
            frames.push(typer.tick());
            assert!(frames.len() < 50);
        }
        let b_frames = frames.iter().filter(|m| m.is_pressed(SamKey::B)).count();
        let quote_frames = frames
            .iter()
            .filter(|m| m.is_pressed(SamKey::Symbol) && m.is_pressed(SamKey::P))
            .count();
        assert_eq!(b_frames, AUTOTYPE_PRESS_FRAMES as usize);
        assert_eq!(quote_frames, AUTOTYPE_PRESS_FRAMES as usize);
        assert_eq!(
            frames.len(),
            2 * (AUTOTYPE_PRESS_FRAMES + AUTOTYPE_RELEASE_FRAMES) as usize
        );
    }
}
