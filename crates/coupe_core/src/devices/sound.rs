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

    coupe_core::devices::sound.rs
*/
//! The SAA1099 register file. Port 511 selects a register, port 255 writes to it.
//! Synthesis happens elsewhere; registered listeners receive each write.

pub const SAA_REGISTER_COUNT: usize = 32;
pub const SAA_ADDRESS_MASK: u8 = 0x1f;

#[derive(Clone, Debug)]
pub struct SoundRegisters {
    address: u8,
    regs: [u8; SAA_REGISTER_COUNT],
    sender: Option<crossbeam_channel::Sender<(u8, u8)>>,
}

impl Default for SoundRegisters {
    fn default() -> Self {
        Self {
            address: 0,
            regs: [0; SAA_REGISTER_COUNT],
            sender: None,
        }
    }
}

impl SoundRegisters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.address = 0;
        self.regs = [0; SAA_REGISTER_COUNT];
    }

    /// Forward every (register, value) write to a synthesizer.
    pub fn set_sender(&mut self, sender: crossbeam_channel::Sender<(u8, u8)>) {
        self.sender = Some(sender);
    }

    pub fn write_address(&mut self, data: u8) {
        self.address = data & SAA_ADDRESS_MASK;
    }

    pub fn write_data(&mut self, data: u8) {
        self.regs[self.address as usize] = data;
        if let Some(sender) = &self.sender {
            if sender.send((self.address, data)).is_err() {
                log::debug!("SAA1099: synthesizer disconnected");
                self.sender = None;
            }
        }
    }

    #[inline]
    pub fn address(&self) -> u8 {
        self.address
    }

    #[inline]
    pub fn register(&self, reg: u8) -> u8 {
        self.regs[(reg & SAA_ADDRESS_MASK) as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn select_then_write() {
        let (tx, rx) = crossbeam_channel::unbounded();
        let mut saa = SoundRegisters::new();
        saa.set_sender(tx);
        saa.write_address(0x3C);
        saa.write_data(0x55);
        assert_eq!(saa.address(), 0x1C);
        assert_eq!(saa.register(0x1C), 0x55);
        assert_eq!(rx.try_recv(), Ok((0x1C, 0x55)));
    }
}
