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

    coupe_core::devices::midi.rs
*/
//! Port 253: the MIDI interface.
//!
//! Sending a byte occupies the transmitter for 320us, reported through the LPEN TXFMST bit.
//! When the byte has gone, the MIDI OUT interrupt is held active for 16us. Bytes arriving from
//! the host hold the MIDI IN interrupt active until the CPU reads them.

use std::collections::VecDeque;

use crate::channel::BidirectionalChannel;

/// 320us at 6MHz.
pub const MIDI_TRANSMIT_TIME: u32 = 1920;
/// 16us at 6MHz.
pub const MIDI_INT_ACTIVE_TIME: u32 = 96;
pub const LPEN_TXFMST: u8 = 0x02;

pub struct MidiPort {
    out_byte: u8,
    tx_remaining: u32,
    int_remaining: u32,
    in_queue: VecDeque<u8>,
    in_byte: u8,
    port_channel: Option<BidirectionalChannel<u8>>,
}

impl Default for MidiPort {
    fn default() -> Self {
        Self {
            out_byte: 0,
            tx_remaining: 0,
            int_remaining: 0,
            in_queue: VecDeque::new(),
            in_byte: 0xff,
            port_channel: None,
        }
    }
}

impl MidiPort {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.tx_remaining = 0;
        self.int_remaining = 0;
        self.in_queue.clear();
        self.in_byte = 0xff;
    }

    /// Connect a host MIDI device and return its endpoint: it receives transmitted bytes and
    /// sends incoming ones. Replaces any previous connection. Once the host drops its endpoint
    /// the port is disconnected again and transmitted bytes are discarded.
    pub fn connect(&mut self) -> BidirectionalChannel<u8> {
        let (device_channel, port_channel) = BidirectionalChannel::new_pair();
        self.port_channel = Some(port_channel);
        device_channel
    }

    pub fn is_connected(&self) -> bool {
        self.port_channel.is_some()
    }

    pub fn read(&mut self) -> u8 {
        if let Some(byte) = self.in_queue.pop_front() {
            self.in_byte = byte;
        }
        self.in_byte
    }

    pub fn write(&mut self, data: u8) {
        if self.tx_remaining > 0 {
            log::debug!("MIDI: Byte {:02X} dropped, transmitter busy", data);
            return;
        }
        self.out_byte = data;
        self.tx_remaining = MIDI_TRANSMIT_TIME;
        log::trace!("MIDI: Transmit {:02X}", data);
        match &self.port_channel {
            Some(channel) => {
                if !channel.send(data) {
                    log::debug!("MIDI: Device disconnected");
                    self.port_channel = None;
                }
            }
            None => log::trace!("MIDI: No device listening"),
        }
    }

    /// Queue a byte as if it arrived on MIDI IN.
    pub fn receive(&mut self, data: u8) {
        self.in_queue.push_back(data);
    }

    /// Advance by a number of CPU T-states.
    pub fn run(&mut self, tstates: u32) {
        let mut t = tstates;
        if self.tx_remaining > 0 {
            if t >= self.tx_remaining {
                t -= self.tx_remaining;
                self.tx_remaining = 0;
                self.int_remaining = MIDI_INT_ACTIVE_TIME;
            }
            else {
                self.tx_remaining -= t;
                t = 0;
            }
        }
        self.int_remaining = self.int_remaining.saturating_sub(t);

        if let Some(channel) = &self.port_channel {
            while let Ok(byte) = channel.try_recv() {
                self.in_queue.push_back(byte);
            }
        }
    }

    #[inline]
    pub fn is_transmitting(&self) -> bool {
        self.tx_remaining > 0
    }

    /// LPEN bit 1 while a byte is being sent.
    #[inline]
    pub fn txfmst(&self) -> u8 {
        if self.is_transmitting() {
            LPEN_TXFMST
        }
        else {
            0
        }
    }

    #[inline]
    pub fn out_int_active(&self) -> bool {
        self.int_remaining > 0
    }

    #[inline]
    pub fn in_int_active(&self) -> bool {
        !self.in_queue.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transmit_timing() {
        let mut midi = MidiPort::new();
        let host = midi.connect();

        midi.write(0x90);
        assert_eq!(midi.txfmst(), LPEN_TXFMST);
        assert_eq!(host.try_recv(), Ok(0x90));

        // A second byte while busy is lost.
        midi.write(0x40);
        assert!(host.try_recv().is_err());

        midi.run(MIDI_TRANSMIT_TIME - 1);
        assert!(midi.is_transmitting());
        assert!(!midi.out_int_active());

        midi.run(1);
        assert!(!midi.is_transmitting());
        assert!(midi.out_int_active());

        midi.run(MIDI_INT_ACTIVE_TIME);
        assert!(!midi.out_int_active());
    }

    #[test]
    fn incoming_bytes_hold_interrupt_until_read() {
        let mut midi = MidiPort::new();
        let host = midi.connect();
        assert!(host.send(0xF8));
        midi.run(10);
        assert!(midi.in_int_active());
        assert_eq!(midi.read(), 0xF8);
        assert!(!midi.in_int_active());
    }

    #[test]
    fn unconnected_port_discards_output() {
        let mut midi = MidiPort::new();
        assert!(!midi.is_connected());
        for byte in 0..=255u8 {
            midi.write(byte);
            midi.run(MIDI_TRANSMIT_TIME + MIDI_INT_ACTIVE_TIME);
        }
        assert!(!midi.is_connected());

        // A host that goes away stops receiving, and the port lets go of the channel.
        let host = midi.connect();
        midi.write(0x90);
        assert_eq!(host.drain(), vec![0x90]);
        drop(host);
        midi.run(MIDI_TRANSMIT_TIME);
        midi.write(0x80);
        assert!(!midi.is_connected());
    }
}
