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

    coupe_core::bus::frame.rs
*/
//! Work done between frames: committing host input and publishing the frame snapshot.

use crate::{
    bus::IoBus,
    devices::keyboard::KeyMatrix,
    display::FrameSnapshot,
    machine_types::AutoloadType,
    startup::is_at_startup_screen,
};

/// Host-side input as seen by the ports during one frame.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct InputState {
    pub keys: KeyMatrix,
    /// Kempston joystick byte, a set bit meaning pressed.
    pub kempston: u8,
    /// Tape EAR level, or `None` with no tape playing.
    pub tape_ear: Option<bool>,
}

impl IoBus {
    /// Input the host is building for the next frame. Ports keep reading the previous state
    /// until [update_input](Self::update_input).
    pub fn pending_input_mut(&mut self) -> &mut InputState {
        &mut self.pending_input
    }

    pub fn input(&self) -> &InputState {
        &self.input
    }

    /// Commit pending host input and advance the auto-typer by one frame.
    pub fn update_input(&mut self) {
        let typed = self.autotyper.tick();
        self.input = self.pending_input;
        self.input.keys = self.input.keys.merge(&typed);
    }

    /// End-of-frame housekeeping: device frame hooks, the autoload check, and the snapshot
    /// for the renderer.
    pub fn frame_update(&mut self) {
        self.registry.frame_end();

        if self.registry.take_autoload_request() {
            self.autoload.auto_load(AutoloadType::Disk, true);
        }
        let at_startup = is_at_startup_screen(&self.paging, self.display.as_ref(), false);
        if let Some(text) = self.autoload.check(at_startup) {
            log::debug!("Autoload typing {:?}", text);
            self.autotyper.type_text(text);
        }

        self.frame += 1;
        self.snapshot = FrameSnapshot {
            frame: self.frame,
            paging: self.paging,
            clut: *self.clut.clut(),
            mode3_clut: *self.clut.mode3_clut(),
            colours: self.clut.palette(),
            border: self.border.clut_index(),
            screen_off: self.border.screen_off(),
        };

        if let Some(sender) = &self.snapshot_sender {
            if sender.send(self.snapshot.clone()).is_err() {
                log::warn!("Renderer disconnected, dropping frame snapshots");
                self.snapshot_sender = None;
            }
        }

        self.trace_logger.flush();
    }

    /// The snapshot committed by the last [frame_update](Self::frame_update).
    pub fn snapshot(&self) -> &FrameSnapshot {
        &self.snapshot
    }

    pub fn is_at_startup_screen(&self, exit: bool) -> bool {
        is_at_startup_screen(&self.paging, self.display.as_ref(), exit)
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        bus::{ports::*, IoBus},
        devices::{keyboard::SamKey, status::InterruptSource},
        display::DisplayProbe,
        io_config::IoConfig,
        machine_types::AutoloadType,
    };

    struct ReadyScreen;

    impl DisplayProbe for ReadyScreen {
        fn matches_startup_screen(&self) -> bool {
            true
        }
    }

    fn bus(autoload: AutoloadType) -> IoBus {
        IoBus::new(&IoConfig {
            sambus_clock: false,
            autoload,
            ..IoConfig::default()
        })
    }

    #[test]
    fn snapshot_reaches_renderer() {
        let mut bus = bus(AutoloadType::None);
        let (tx, rx) = crossbeam_channel::unbounded();
        bus.set_snapshot_sender(tx);

        bus.write(0x0300 | CLUT_BASE_PORT, 0x0F);
        bus.write(BORDER_PORT, 0x83);
        bus.write(VMPR_PORT, 0x41);
        bus.frame_update();

        let snapshot = rx.try_recv().unwrap();
        assert_eq!(snapshot, *bus.snapshot());
        assert_eq!(snapshot.frame, 1);
        assert_eq!(snapshot.clut[3], 0x0F);
        assert_eq!(snapshot.border, 3);
        assert!(snapshot.screen_off);
        assert_eq!(snapshot.paging.vmpr_page2(), Some(1));

        drop(rx);
        bus.frame_update();
        assert_eq!(bus.frame(), 2);
    }

    #[test]
    fn autoload_waits_for_startup_screen() {
        let mut bus = bus(AutoloadType::Tape);
        bus.frame_update();
        assert!(!bus.autoload().has_fired());

        bus.set_display(Box::new(ReadyScreen));
        assert!(bus.is_at_startup_screen(false));
        assert!(!bus.is_at_startup_screen(true));
        bus.frame_update();
        assert!(bus.autoload().has_fired());

        // "L" is the first key typed.
        bus.update_input();
        assert!(bus.input().keys.is_pressed(SamKey::L));
        assert!(!bus.input().keys.is_pressed(SamKey::O));
    }

    #[test]
    fn line_port_cancels_line_interrupt() {
        let mut bus = bus(AutoloadType::None);
        bus.signal_interrupt(InterruptSource::Line);
        bus.signal_interrupt(InterruptSource::Frame);
        assert_eq!(bus.read(STATUS_PORT), 0x16);
        assert!(bus.interrupt_pending());

        bus.write(LINE_PORT, 100);
        assert_eq!(bus.line_int(), 100);
        assert_eq!(bus.read(STATUS_PORT), 0x17);

        bus.acknowledge_interrupt(InterruptSource::Frame);
        assert_eq!(bus.read(STATUS_PORT), 0x1F);
        assert!(!bus.interrupt_pending());
    }

    #[test]
    fn midi_in_holds_status_bit() {
        let mut bus = bus(AutoloadType::None);
        bus.midi_mut().receive(0x3C);
        bus.run(1);
        assert_eq!(bus.read(STATUS_PORT), 0x1B);
        assert_eq!(bus.read(MIDI_PORT), 0x3C);
        bus.run(1);
        assert_eq!(bus.read(STATUS_PORT), 0x1F);
    }
}
