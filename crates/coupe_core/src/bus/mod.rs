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

    coupe_core::bus::mod.rs
*/
//! The SAM Coupé I/O bus.
//!
//! The CPU sees 256 I/O addresses, with bit 8 of the port disambiguating a couple of them.
//! [IoBus] owns the ASIC's own registers (paging, status latch, CLUT, border and keyboard,
//! MIDI, sound) and a [DeviceRegistry] for everything plugged into the expansion ports.
//! All port traffic goes through [IoBus::read] and [IoBus::write]; between frames the frame
//! driver calls [IoBus::update_input] and [IoBus::frame_update].

mod frame;
mod io;
pub mod ports;

use std::path::Path;

use fxhash::FxHashMap;

pub use frame::InputState;

use crate::{
    devices::{
        border::BorderRegister,
        clut::ClutStore,
        keyboard::AutoTyper,
        midi::MidiPort,
        paging::Paging,
        sound::SoundRegisters,
        status::{InterruptSource, StatusLatch},
    },
    display::{DisplayProbe, FrameSnapshot, NullDisplay},
    io_config::IoConfig,
    machine_types::{AutoloadType, DriveType},
    registry::{DeviceRegistry, DriveSlot},
    startup::AutoloadState,
    tracelogger::TraceLogger,
    updatable::Updatable,
};

/// The byte read from an IO address nothing answers.
pub const NO_IO_BYTE: u8 = 0xFF;

/// How long the ASIC ignores writes to its own ports after power-on, in T-states (about 50ms
/// at 6MHz).
pub const ASIC_STARTUP_DELAY: u32 = 300_000;

pub const DEVICE_DESC_LEN: usize = 28;

#[derive(Clone, Debug, Default)]
pub struct IoDeviceStats {
    last_read: u8,
    last_write: u8,
    reads: usize,
    reads_dirty: bool,
    writes: usize,
    writes_dirty: bool,
}

impl IoDeviceStats {
    pub fn one_read(byte: u8) -> Self {
        Self {
            last_read: byte,
            last_write: 0,
            reads: 1,
            reads_dirty: true,
            writes: 0,
            writes_dirty: false,
        }
    }

    pub fn one_write(byte: u8) -> Self {
        Self {
            last_read: 0,
            last_write: byte,
            reads: 0,
            reads_dirty: false,
            writes: 1,
            writes_dirty: true,
        }
    }
}

/// A peripheral attached to the I/O bus.
///
/// Every method except [port_list](IoDevice::port_list) has a default, so a device only
/// implements what it responds to. Absent hardware reads as [NO_IO_BYTE].
pub trait IoDevice {
    /// Return the device to its power-on state. Mounted media is kept.
    fn reset(&mut self) {}

    /// Read a byte from the specified port. The full 16-bit port is passed, as some devices
    /// decode the high byte. The default implementation returns NO_IO_BYTE (0xFF).
    fn read_u8(&mut self, _port: u16) -> u8 {
        NO_IO_BYTE
    }

    /// Write a byte to the specified port. The default implementation does nothing.
    fn write_u8(&mut self, _port: u16, _data: u8) {}

    /// Called once at the end of every emulated frame.
    fn frame_end(&mut self) {}

    /// Restore persisted state from `path`. A missing or unreadable file leaves defaults.
    fn load_state(&mut self, _path: &Path) {}

    fn save_state(&mut self, _path: &Path) {}

    /// Return a list of ports the device should service, comprised of a vector of tuples of
    /// (port description, port number).
    fn port_list(&self) -> Vec<(String, u16)>;
}

pub struct IoBus {
    paging: Paging,
    status: StatusLatch,
    clut: ClutStore,
    border: BorderRegister,
    line_int: u8,

    input: InputState,
    pending_input: InputState,
    autotyper: AutoTyper,

    midi: MidiPort,
    sound: SoundRegisters,
    registry: DeviceRegistry,
    autoload: AutoloadState,
    display: Box<dyn DisplayProbe>,

    asic_startup: bool,
    asic_asleep: u32,

    frame: u64,
    snapshot: FrameSnapshot,
    snapshot_sender: Option<crossbeam_channel::Sender<FrameSnapshot>>,

    last_port_read: Updatable<u16>,
    last_value_read: Updatable<u8>,
    last_port_written: Updatable<u16>,
    last_value_written: Updatable<u8>,
    io_desc_map: FxHashMap<u16, String>,
    io_stats: FxHashMap<u16, (bool, IoDeviceStats)>,
    trace_logger: TraceLogger,
}

impl IoBus {
    /// Build the I/O subsystem described by `config`: fit the configured devices, restore
    /// saved device state, then mount any configured media.
    pub fn new(config: &IoConfig) -> Self {
        let trace_logger = match &config.port_trace_file {
            Some(path) => TraceLogger::from_filename(path),
            None => TraceLogger::None,
        };

        let mut registry = DeviceRegistry::new(config);
        registry.load_state();
        for (slot, disk) in [(DriveSlot::Drive1, &config.disk1), (DriveSlot::Drive2, &config.disk2)] {
            if let Some(path) = disk {
                if !registry.insert(slot, path, false) {
                    log::warn!("Couldn't mount {} in drive {}", path.display(), slot);
                }
            }
        }

        let mut autoload = AutoloadState::new();
        if config.autoload != AutoloadType::None {
            autoload.auto_load(config.autoload, true);
        }

        let mut bus = Self {
            paging: Paging::new(),
            status: StatusLatch::new(),
            clut: ClutStore::new(),
            border: BorderRegister::new(),
            line_int: 0,
            input: InputState::default(),
            pending_input: InputState::default(),
            autotyper: AutoTyper::new(),
            midi: MidiPort::new(),
            sound: SoundRegisters::new(),
            io_desc_map: FxHashMap::default(),
            registry,
            autoload,
            display: Box::new(NullDisplay),
            asic_startup: config.asic_startup,
            asic_asleep: 0,
            frame: 0,
            snapshot: FrameSnapshot::default(),
            snapshot_sender: None,
            last_port_read: Updatable::new(0),
            last_value_read: Updatable::new(0),
            last_port_written: Updatable::new(0),
            last_value_written: Updatable::new(0),
            io_stats: FxHashMap::default(),
            trace_logger,
        };
        bus.rebuild_desc_map();
        bus.reset();
        bus
    }

    /// Hard reset: every register and device back to its power-on state. Mounted media and
    /// pending autoloads survive.
    pub fn reset(&mut self) {
        log::debug!("I/O bus reset");
        self.paging.reset();
        self.status.reset();
        self.clut.reset();
        self.border.reset();
        self.line_int = 0;
        self.input = InputState::default();
        self.autotyper.clear();
        self.midi.reset();
        self.sound.reset();
        self.registry.reset();
        self.asic_asleep = if self.asic_startup { ASIC_STARTUP_DELAY } else { 0 };
        self.io_stats.clear();
    }

    /// Advance T-state driven hardware: the MIDI transmitter and the ASIC start-up delay.
    pub fn run(&mut self, tstates: u32) {
        self.midi.run(tstates);
        self.status.set_level(InterruptSource::MidiOut, self.midi.out_int_active());
        self.status.set_level(InterruptSource::MidiIn, self.midi.in_int_active());

        if self.asic_asleep > 0 {
            self.asic_asleep = self.asic_asleep.saturating_sub(tstates);
            if self.asic_asleep == 0 {
                log::debug!("ASIC awake");
            }
        }
    }

    /// End the ASIC start-up delay now.
    pub fn wake_asic(&mut self) {
        if self.asic_asleep > 0 {
            log::debug!("ASIC woken with {} T-states of start-up delay left", self.asic_asleep);
        }
        self.asic_asleep = 0;
    }

    pub fn asic_asleep(&self) -> bool {
        self.asic_asleep > 0
    }

    pub fn signal_interrupt(&mut self, source: InterruptSource) {
        self.status.signal(source);
    }

    pub fn acknowledge_interrupt(&mut self, source: InterruptSource) {
        self.status.acknowledge(source);
    }

    pub fn interrupt_pending(&self) -> bool {
        self.status.any_pending()
    }

    /// Persist device state and write back modified media. Returns false if any media failed
    /// to save.
    pub fn shutdown(&mut self) -> bool {
        log::debug!("I/O bus shutdown");
        let saved = self.registry.save_media();
        self.registry.save_state();
        self.trace_logger.flush();
        saved
    }

    pub fn insert(&mut self, slot: DriveSlot, path: &Path, auto_load: bool) -> bool {
        let inserted = self.registry.insert(slot, path, auto_load);
        self.rebuild_desc_map();
        inserted
    }

    pub fn eject(&mut self, slot: DriveSlot) {
        self.registry.eject(slot);
    }

    pub fn set_drive_type(&mut self, slot: DriveSlot, drive_type: DriveType) {
        self.registry.set_drive_type(slot, drive_type);
        self.rebuild_desc_map();
    }

    /// Request an autoload. See [AutoloadState::auto_load].
    pub fn auto_load(&mut self, kind: AutoloadType, only_at_startup: bool) {
        self.autoload.auto_load(kind, only_at_startup);
    }

    pub fn rearm_autoload(&mut self) {
        self.autoload.rearm();
    }

    pub fn autoload(&self) -> &AutoloadState {
        &self.autoload
    }

    /// Attach the renderer's view of the raster.
    pub fn set_display(&mut self, display: Box<dyn DisplayProbe>) {
        self.display = display;
    }

    pub fn set_snapshot_sender(&mut self, sender: crossbeam_channel::Sender<FrameSnapshot>) {
        self.snapshot_sender = Some(sender);
    }

    pub fn set_sound_sender(&mut self, sender: crossbeam_channel::Sender<(u8, u8)>) {
        self.sound.set_sender(sender);
    }

    pub fn paging(&self) -> &Paging {
        &self.paging
    }

    pub fn status(&self) -> &StatusLatch {
        &self.status
    }

    pub fn clut(&self) -> &ClutStore {
        &self.clut
    }

    pub fn border(&self) -> &BorderRegister {
        &self.border
    }

    pub fn line_int(&self) -> u8 {
        self.line_int
    }

    pub fn midi(&self) -> &MidiPort {
        &self.midi
    }

    pub fn midi_mut(&mut self) -> &mut MidiPort {
        &mut self.midi
    }

    pub fn sound(&self) -> &SoundRegisters {
        &self.sound
    }

    pub fn registry(&self) -> &DeviceRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut DeviceRegistry {
        &mut self.registry
    }

    pub fn display(&self) -> &dyn DisplayProbe {
        self.display.as_ref()
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn last_port_read(&self) -> u16 {
        *self.last_port_read.get()
    }

    pub fn last_value_read(&self) -> u8 {
        *self.last_value_read.get()
    }

    pub fn last_port_written(&self) -> u16 {
        *self.last_port_written.get()
    }

    pub fn last_value_written(&self) -> u8 {
        *self.last_value_written.get()
    }

    fn rebuild_desc_map(&mut self) {
        self.io_desc_map = self.registry.io_desc_map();
    }

    /// One line per port accessed since the last reset, sorted by port. Ports no device
    /// answered are marked with `*`.
    pub fn dump_io_stats(&mut self) -> Vec<String> {
        let mut lines: Vec<_> = self
            .io_stats
            .iter()
            .map(|(port, stats)| {
                let mut port_desc = self.io_desc_map.get(port).cloned().unwrap_or_default();
                if port_desc.len() > DEVICE_DESC_LEN {
                    port_desc.truncate(DEVICE_DESC_LEN);
                }
                (
                    *port,
                    format!(
                        "{:04X}{}: {:width$} [{:02X}] {}, [{:02X}] {}",
                        port,
                        if stats.0 { " " } else { "*" },
                        port_desc,
                        stats.1.last_read,
                        stats.1.reads,
                        stats.1.last_write,
                        stats.1.writes,
                        width = DEVICE_DESC_LEN
                    ),
                )
            })
            .collect();

        lines.sort_by(|a, b| a.0.cmp(&b.0));
        lines.into_iter().map(|(_, line)| line).collect()
    }

    pub fn reset_io_stats(&mut self) {
        for (_, stats) in self.io_stats.iter_mut() {
            stats.1 = IoDeviceStats::default();
        }
    }
}
