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

    coupe_core::bus::io.rs
*/
//! Port read and write dispatch for [IoBus].

use crate::{
    bus::{ports::*, IoBus, IoDeviceStats, NO_IO_BYTE},
    devices::{midi::LPEN_TXFMST, status::InterruptSource},
};

impl IoBus {
    /// Read an 8-bit value from an IO port.
    ///
    /// The ASIC's own ports are decoded on the low byte, with bit 8 telling the pen and
    /// sound ports apart. Everything else goes to the device registry, and ports nothing
    /// decodes read as open bus.
    pub fn read(&mut self, port: u16) -> u8 {
        let byte = match port & 0xFF {
            KEMPSTON_PORT => Some(self.input.kempston),
            LPEN_PORT => {
                let pen = self.display.pen_position();
                if port & PEN_MASK == HPEN_PORT {
                    Some(pen.hpen)
                }
                else {
                    Some((pen.lpen & !LPEN_TXFMST) | self.midi.txfmst())
                }
            }
            STATUS_PORT => Some(self.status.value()),
            LMPR_PORT => Some(self.paging.lmpr()),
            HMPR_PORT => Some(self.paging.hmpr()),
            VMPR_PORT => Some(self.paging.vmpr()),
            MIDI_PORT => Some(self.midi.read()),
            KEYBOARD_PORT => {
                let keys = self.input.keys.scan((port >> 8) as u8);
                Some(self.border.keyboard_byte(keys, self.input.tape_ear))
            }
            ATTR_PORT => Some(self.display.attribute_byte()),
            _ => self.registry.read_u8(port),
        };

        let byte_val = byte.unwrap_or(NO_IO_BYTE);

        self.last_port_read.set(port);
        self.last_value_read.set(byte_val);
        if self.trace_logger.is_some() {
            self.trace_logger
                .println(format!("IN  {:04X} -> {:02X}{}", port, byte_val, if byte.is_some() { "" } else { " *" }));
        }

        self.io_stats
            .entry(port)
            .and_modify(|e| {
                e.1.last_read = byte_val;
                e.1.reads += 1;
                e.1.reads_dirty = true;
            })
            .or_insert((byte.is_some(), IoDeviceStats::one_read(byte_val)));

        byte_val
    }

    /// Write an 8-bit value to an IO port.
    pub fn write(&mut self, port: u16, data: u8) {
        self.last_port_written.set(port);
        self.last_value_written.set(data);
        if self.trace_logger.is_some() {
            self.trace_logger.println(format!("OUT {:04X} <- {:02X}", port, data));
        }

        let low = port & 0xFF;
        let resolved = if self.asic_asleep > 0 && low >= ASIC_PORT_FIRST {
            log::trace!("ASIC asleep, ignoring write {:02X} to {:04X}", data, port);
            true
        }
        else {
            match low {
                LEPR_PORT => {
                    self.paging.out_lepr(data);
                    true
                }
                HEPR_PORT => {
                    self.paging.out_hepr(data);
                    true
                }
                CLUT_BASE_PORT => {
                    self.clut.write_clut(port, data);
                    true
                }
                LINE_PORT => {
                    self.line_int = data;
                    self.status.acknowledge(InterruptSource::Line);
                    true
                }
                LMPR_PORT => {
                    self.paging.out_lmpr(data);
                    true
                }
                HMPR_PORT => {
                    self.paging.out_hmpr(data);
                    self.clut.set_md3col(self.paging.md3col());
                    true
                }
                VMPR_PORT => {
                    self.paging.out_vmpr(data);
                    true
                }
                MIDI_PORT => {
                    self.midi.write(data);
                    true
                }
                BORDER_PORT => {
                    self.border.write(data);
                    true
                }
                SOUND_DATA_PORT => {
                    if port & SOUND_MASK == SOUND_ADDR_PORT {
                        self.sound.write_address(data);
                    }
                    else {
                        self.sound.write_data(data);
                    }
                    true
                }
                _ => self.registry.write_u8(port, data),
            }
        };

        self.io_stats
            .entry(port)
            .and_modify(|e| {
                e.1.last_write = data;
                e.1.writes += 1;
                e.1.writes_dirty = true;
            })
            .or_insert((resolved, IoDeviceStats::one_write(data)));
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        bus::{ports::*, IoBus, NO_IO_BYTE},
        devices::{keyboard::SamKey, midi::MIDI_TRANSMIT_TIME},
        display::{DisplayProbe, PenPosition},
        io_config::IoConfig,
    };

    struct FixedRaster;

    impl DisplayProbe for FixedRaster {
        fn attribute_byte(&self) -> u8 {
            0x47
        }
        fn pen_position(&self) -> PenPosition {
            PenPosition { lpen: 0x83, hpen: 0x2A }
        }
    }

    fn bus() -> IoBus {
        IoBus::new(&IoConfig {
            sambus_clock: false,
            ..IoConfig::default()
        })
    }

    #[test]
    fn pen_ports_use_bit_8() {
        let mut bus = bus();
        bus.set_display(Box::new(FixedRaster));
        assert_eq!(bus.read(LPEN_PORT), 0x81);
        assert_eq!(bus.read(HPEN_PORT), 0x2A);
        assert_eq!(bus.read(ATTR_PORT), 0x47);

        bus.write(MIDI_PORT, 0x90);
        assert_eq!(bus.read(LPEN_PORT), 0x83);
        bus.run(MIDI_TRANSMIT_TIME);
        assert_eq!(bus.read(LPEN_PORT), 0x81);
    }

    #[test]
    fn keyboard_rows_follow_high_byte() {
        let mut bus = bus();
        bus.pending_input_mut().keys.press(SamKey::A);
        bus.pending_input_mut().keys.press(SamKey::Left);
        // Not visible until the frame commits input.
        assert_eq!(bus.read(0xFD00 | KEYBOARD_PORT) & 0x1F, 0x1F);
        bus.update_input();

        // Row 1 selected by A9 low.
        assert_eq!(bus.read(0xFD00 | KEYBOARD_PORT), 0b1011_1110);
        assert_eq!(bus.read(0xFE00 | KEYBOARD_PORT) & 0x1F, 0x1F);
        // All rows at once.
        assert_eq!(bus.read(KEYBOARD_PORT) & 0x1F, 0x1E);
        // High byte 0xFF reads the extended row.
        assert_eq!(bus.read(0xFF00 | KEYBOARD_PORT) & 0x1F, 0x17);
    }

    #[test]
    fn sound_register_select_and_data() {
        let mut bus = bus();
        bus.write(SOUND_ADDR_PORT, 0x1C);
        bus.write(SOUND_DATA_PORT, 0x01);
        assert_eq!(bus.sound().address(), 0x1C);
        assert_eq!(bus.sound().register(0x1C), 0x01);
    }

    #[test]
    fn clut_and_mode3_follow_hmpr() {
        let mut bus = bus();
        bus.write(0x0500 | CLUT_BASE_PORT, 0x22);
        bus.write(HMPR_PORT, 0x20);
        assert_eq!(bus.clut().clut()[5], 0x22);
        assert_eq!(bus.clut().mode3_clut()[1], 0x22);
        assert_eq!(bus.read(HMPR_PORT), 0x20);
    }

    #[test]
    fn asic_ignores_own_ports_until_awake() {
        let mut bus = IoBus::new(&IoConfig {
            asic_startup: true,
            ..IoConfig::default()
        });
        bus.write(VMPR_PORT, 0x61);
        bus.write(LEPR_PORT, 0x05);
        assert_eq!(bus.paging().vmpr(), 0);
        assert_eq!(bus.paging().lepr(), 0x05);

        bus.wake_asic();
        bus.write(VMPR_PORT, 0x61);
        assert_eq!(bus.paging().vmpr_mode(), 3);
    }

    #[test]
    fn stats_track_unresolved_ports() {
        let mut bus = bus();
        assert_eq!(bus.read(100), NO_IO_BYTE);
        bus.write(100, 0x12);
        bus.read(STATUS_PORT);
        assert_eq!(bus.last_port_written(), 100);
        assert_eq!(bus.last_value_written(), 0x12);
        assert_eq!(bus.last_port_read(), STATUS_PORT);

        let stats = bus.dump_io_stats();
        assert_eq!(stats.len(), 2);
        assert!(stats[0].starts_with("0064*"));
        assert!(stats[1].starts_with("00F9 "));
    }

    #[test]
    fn midi_out_without_host_is_discarded() {
        let mut bus = bus();
        for n in 0..1000u32 {
            bus.write(MIDI_PORT, n as u8);
            bus.run(MIDI_TRANSMIT_TIME + 200);
        }
        assert!(!bus.midi().is_connected());

        // A host connected later only sees bytes sent after it attached.
        let host = bus.midi_mut().connect();
        bus.write(MIDI_PORT, 0xF0);
        assert_eq!(host.drain(), vec![0xF0]);
    }
}
