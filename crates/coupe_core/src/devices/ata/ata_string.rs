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

    coupe_core::devices::ata::ata_string.rs
*/
//! [AtaString] formats the fixed-width text fields of the ATA identification block.

use binrw::binrw;
use std::str::FromStr;

/// `N` bytes of space-padded ASCII, with the two bytes of every 16-bit word swapped.
#[binrw]
#[derive(Clone, Debug, Default)]
pub struct AtaString<const N: usize> {
    #[br(count = N)]
    #[bw(assert(raw.len() == N, "raw length must be N"))]
    raw: Vec<u8>,
}

impl<const N: usize> FromStr for AtaString<N> {
    type Err = std::convert::Infallible;

    /// Longer strings are truncated to `N` bytes.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut buf = vec![b' '; N];
        let bytes = s.as_bytes();
        let len = bytes.len().min(N);
        buf[..len].copy_from_slice(&bytes[..len]);

        for chunk in buf.chunks_mut(2) {
            chunk.swap(0, 1);
        }

        Ok(Self { raw: buf })
    }
}

impl<const N: usize> AtaString<N> {
    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    /// Undo the word swap and strip the padding.
    pub fn as_str(&self) -> String {
        let mut unwrapped = self.raw.clone();
        for chunk in unwrapped.chunks_mut(2) {
            chunk.swap(0, 1);
        }
        String::from_utf8_lossy(&unwrapped).trim_end().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn words_are_byte_swapped() {
        let s = AtaString::<8>::from_str("SAM").unwrap();
        assert_eq!(s.raw(), b"AS M    ");
        assert_eq!(s.as_str(), "SAM");

        let long = AtaString::<4>::from_str("Coupe").unwrap();
        assert_eq!(long.as_str(), "Coup");
    }
}
