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

    coupe_headless::lib.rs
*/
//! Coupe headless front-end main library component.

#![forbid(unsafe_code)]

use coupe_config::ConfigFileParams;
use coupe_core::{
    devices::{lpt_port::PrinterMessage, status::InterruptSource},
    DiskDevice,
    DriveSlot,
    IoBus,
};

/// T-states in one 50Hz frame: 312 lines of 384 T-states.
pub const TSTATES_PER_FRAME: u32 = 312 * 384;

/// What a headless run produced, for the caller to report.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub frames: u64,
    pub snapshots: u64,
    pub sound_writes: u64,
    pub printed_bytes: u64,
    pub spooled: Vec<std::path::PathBuf>,
    pub media_saved: bool,
    pub io_stats: Vec<String>,
}

pub fn run() {
    env_logger::init();

    let config = match coupe_config::read_config_file("./coupe.toml") {
        Ok(config) => config,
        Err(e) => match e.downcast_ref::<std::io::Error>() {
            Some(e) => {
                eprintln!("IO error reading configuration file:\n{}", e);
                std::process::exit(1);
            }
            None => {
                eprintln!(
                    "Failed to parse configuration file. There may be a typo or otherwise invalid toml:\n{}",
                    e
                );
                std::process::exit(1);
            }
        },
    };

    let summary = run_frames(&config);

    println!(
        "Ran {} frames ({} snapshots, {} sound register writes, {} bytes printed)",
        summary.frames, summary.snapshots, summary.sound_writes, summary.printed_bytes
    );
    for path in &summary.spooled {
        println!("Printer output spooled to {}", path.display());
    }
    for line in &summary.io_stats {
        println!("{}", line);
    }
    if !summary.media_saved {
        eprintln!("Some modified media could not be written back.");
        std::process::exit(1);
    }
}

/// Build an I/O bus from `config` and clock it for the configured number of frames.
pub fn run_frames(config: &ConfigFileParams) -> RunSummary {
    let mut bus = IoBus::new(&config.io);

    let (snapshot_tx, snapshot_rx) = crossbeam_channel::unbounded();
    let (sound_tx, sound_rx) = crossbeam_channel::unbounded();
    bus.set_snapshot_sender(snapshot_tx);
    bus.set_sound_sender(sound_tx);

    let printers: Vec<_> = (0..2).filter_map(|n| bus.registry_mut().connect_printer(n)).collect();

    let mut summary = RunSummary::default();

    for _ in 0..config.emulator.frames {
        bus.update_input();
        bus.run(TSTATES_PER_FRAME);

        // No CPU to service the interrupt, so acknowledge it straight away.
        bus.signal_interrupt(InterruptSource::Frame);
        bus.acknowledge_interrupt(InterruptSource::Frame);

        bus.frame_update();

        summary.snapshots += snapshot_rx.try_iter().count() as u64;
        summary.sound_writes += sound_rx.try_iter().count() as u64;
        for printer in &printers {
            for msg in printer.drain() {
                match msg {
                    PrinterMessage::Data(_) => summary.printed_bytes += 1,
                    PrinterMessage::Flushed(Some(path)) => summary.spooled.push(path),
                    PrinterMessage::Flushed(None) => {}
                }
            }
        }
        summary.frames += 1;
    }

    for slot in [DriveSlot::Drive1, DriveSlot::Drive2] {
        let drive = bus.registry().drive(slot);
        log::info!(
            "{}: {} disk: {} light: {}",
            slot,
            drive.drive_type(),
            drive.disk_file().unwrap_or_else(|| "<none>".to_string()),
            if drive.is_light_on() { "on" } else { "off" }
        );
    }

    if config.emulator.dump_io_stats {
        summary.io_stats = bus.dump_io_stats();
    }
    summary.media_saved = bus.shutdown();
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use coupe_core::IoConfig;

    #[test]
    fn frames_produce_snapshots() {
        let mut config = ConfigFileParams::default();
        config.emulator.frames = 5;
        config.emulator.dump_io_stats = true;
        config.io = IoConfig {
            sambus_clock: false,
            ..IoConfig::default()
        };

        let summary = run_frames(&config);
        assert_eq!(summary.frames, 5);
        assert_eq!(summary.snapshots, 5);
        assert_eq!(summary.sound_writes, 0);
        assert!(summary.media_saved);
        assert!(summary.spooled.is_empty());
    }
}
