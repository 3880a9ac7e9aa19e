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

    coupe_core::devices::lpt_port.rs
*/
//! A Centronics printer port.
//!
//! The even port holds the data latch and the odd port the status/strobe register. A falling
//! edge on strobe (status port bit 0) prints the latched byte into a spool. Once the printer
//! has been idle for [PRINTER_FLUSH_FRAMES] frames the spool is written to a numbered file in
//! the spool directory. When a host is connected, every printed byte is also sent to it over a
//! channel.

use std::path::{Path, PathBuf};

use modular_bitfield::{bitfield, prelude::*};

use crate::{bus::IoDevice, channel::BidirectionalChannel, tracelogger::TraceLogger};

/// One second of idle frames before the spool is flushed.
pub const PRINTER_FLUSH_FRAMES: u32 = 50;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PrinterMessage {
    Data(u8),
    Flushed(Option<PathBuf>),
}

#[bitfield]
#[derive(Copy, Clone, Default)]
pub struct PrinterStatus {
    pub busy: bool,
    #[skip]
    unused: B7,
}

#[bitfield]
#[derive(Copy, Clone, Default)]
pub struct PrinterControl {
    pub strobe: bool,
    #[skip]
    unused: B7,
}

pub struct PrinterPort {
    port_base: u16,
    data: u8,
    status: PrinterStatus,
    control: PrinterControl,
    spool: Vec<u8>,
    idle_frames: u32,
    spool_dir: Option<PathBuf>,
    next_file: u32,
    port_channel: Option<BidirectionalChannel<PrinterMessage>>,
    trace_logger: TraceLogger,
}

impl PrinterPort {
    pub fn new(port_base: u16, spool_dir: Option<PathBuf>, trace_logger: TraceLogger) -> Self {
        Self {
            port_base,
            data: 0,
            status: PrinterStatus::from_bytes([0]),
            control: PrinterControl::from_bytes([0]),
            spool: Vec::new(),
            idle_frames: 0,
            spool_dir,
            next_file: 1,
            port_channel: None,
            trace_logger,
        }
    }

    /// Connect the host and return its endpoint, which receives printed bytes and flush
    /// notices. The port disconnects once the host drops it.
    pub fn connect(&mut self) -> BidirectionalChannel<PrinterMessage> {
        let (device_channel, port_channel) = BidirectionalChannel::new_pair();
        self.port_channel = Some(port_channel);
        device_channel
    }

    pub fn is_connected(&self) -> bool {
        self.port_channel.is_some()
    }

    fn notify(&mut self, msg: PrinterMessage) {
        if let Some(channel) = &self.port_channel {
            if !channel.send(msg) {
                log::debug!("LPT: Host disconnected");
                self.port_channel = None;
            }
        }
    }

    pub fn spool(&self) -> &[u8] {
        &self.spool
    }

    fn data_register_write(&mut self, data: u8) {
        self.data = data;
        self.trace_logger
            .println(format!("LPT: Data register write: {:02X}", data));
    }

    fn status_register_read(&mut self) -> u8 {
        // Only BUSY is wired, the remaining lines float high.
        let byte = self.status.into_bytes()[0] | 0xfe;
        self.trace_logger
            .println(format!("LPT: Status register read: {:02X}", byte));
        byte
    }

    fn control_register_write(&mut self, data: u8) {
        let control = PrinterControl::from_bytes([data & 0x01]);
        if self.control.strobe() && !control.strobe() {
            self.print(self.data);
        }
        self.control = control;
    }

    fn print(&mut self, byte: u8) {
        log::trace!("LPT: Printed {:02X}", byte);
        self.trace_logger.println(format!("LPT: Strobe {:02X}", byte));
        self.spool.push(byte);
        self.idle_frames = 0;
        self.notify(PrinterMessage::Data(byte));
    }

    /// Write the spool out and start a new job.
    pub fn flush(&mut self) {
        if self.spool.is_empty() {
            return;
        }
        let written = self.spool_dir.clone().and_then(|dir| self.write_job(&dir));
        self.spool.clear();
        self.idle_frames = 0;
        self.notify(PrinterMessage::Flushed(written));
    }

    fn write_job(&mut self, dir: &Path) -> Option<PathBuf> {
        let path = dir.join(format!("prnt{:04}.txt", self.next_file));
        self.next_file += 1;
        match std::fs::write(&path, &self.spool) {
            Ok(_) => {
                log::debug!("LPT: Wrote {} bytes to {}", self.spool.len(), path.display());
                Some(path)
            }
            Err(e) => {
                log::error!("LPT: Failed to write spool file {}: {}", path.display(), e);
                None
            }
        }
    }
}

impl IoDevice for PrinterPort {
    fn reset(&mut self) {
        self.data = 0;
        self.control = PrinterControl::from_bytes([0]);
    }

    fn read_u8(&mut self, port: u16) -> u8 {
        if port & 0x01 == 0 {
            self.trace_logger
                .println(format!("LPT: Data register read: {:02X}", self.data));
            self.data
        }
        else {
            self.status_register_read()
        }
    }

    fn write_u8(&mut self, port: u16, data: u8) {
        if port & 0x01 == 0 {
            self.data_register_write(data);
        }
        else {
            self.control_register_write(data);
        }
    }

    fn frame_end(&mut self) {
        if !self.spool.is_empty() {
            self.idle_frames += 1;
            if self.idle_frames >= PRINTER_FLUSH_FRAMES {
                self.flush();
            }
        }
        self.trace_logger.flush();
    }

    fn port_list(&self) -> Vec<(String, u16)> {
        vec![
            ("LPT Data".to_string(), self.port_base),
            ("LPT Status/Strobe".to_string(), self.port_base + 1),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strobe(lpt: &mut PrinterPort, byte: u8) {
        lpt.write_u8(232, byte);
        lpt.write_u8(233, 1);
        lpt.write_u8(233, 0);
    }

    #[test]
    fn strobe_falling_edge_prints() {
        let mut lpt = PrinterPort::new(232, None, TraceLogger::None);
        let host = lpt.connect();

        lpt.write_u8(232, b'A');
        lpt.write_u8(233, 0);
        assert!(lpt.spool().is_empty());

        strobe(&mut lpt, b'H');
        strobe(&mut lpt, b'i');
        assert_eq!(lpt.spool(), b"Hi");
        assert_eq!(host.drain(), vec![PrinterMessage::Data(b'H'), PrinterMessage::Data(b'i')]);
        assert_eq!(lpt.read_u8(233), 0xfe);
    }

    #[test]
    fn idle_spool_is_written_to_file() {
        let dir = std::env::temp_dir().join(format!("coupe_lpt_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let mut lpt = PrinterPort::new(234, Some(dir.clone()), TraceLogger::None);
        let host = lpt.connect();

        strobe(&mut lpt, b'X');
        for _ in 0..PRINTER_FLUSH_FRAMES {
            lpt.frame_end();
        }
        assert!(lpt.spool().is_empty());

        let path = dir.join("prnt0001.txt");
        assert_eq!(std::fs::read(&path).unwrap(), b"X");
        assert_eq!(host.drain().last(), Some(&PrinterMessage::Flushed(Some(path))));
        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn dropped_host_is_disconnected() {
        let mut lpt = PrinterPort::new(232, None, TraceLogger::None);
        strobe(&mut lpt, b'A');
        assert!(!lpt.is_connected());

        let host = lpt.connect();
        strobe(&mut lpt, b'B');
        assert_eq!(host.drain(), vec![PrinterMessage::Data(b'B')]);
        drop(host);
        strobe(&mut lpt, b'C');
        assert!(!lpt.is_connected());
        assert_eq!(lpt.spool(), b"ABC");
    }
}
