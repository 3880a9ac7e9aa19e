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

    coupe_core::startup.rs
*/
//! Detects the ROM's ready screen and types the autoload command once it appears.

use crate::{devices::paging::Paging, display::DisplayProbe, machine_types::AutoloadType};

pub const AUTOLOAD_DISK_TEXT: &str = "BOOT\n";
pub const AUTOLOAD_TAPE_TEXT: &str = "LOAD \"\"\n";

/// True when the machine is sitting at the power-on screen: ROM0 paged in, screen mode 1
/// and the renderer reporting the ready-screen signature. `exit` forces false, for callers
/// that are leaving and only want to know it's safe to do so.
pub fn is_at_startup_screen(paging: &Paging, display: &dyn DisplayProbe, exit: bool) -> bool {
    if exit {
        return false;
    }
    !paging.rom0_off() && paging.vmpr_mode() == 0 && display.matches_startup_screen()
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct AutoloadState {
    pending: AutoloadType,
    only_at_startup: bool,
    fired: bool,
}

impl AutoloadState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request an autoload of `kind`. Ignored once an autoload has fired, until [rearm](Self::rearm).
    pub fn auto_load(&mut self, kind: AutoloadType, only_at_startup: bool) {
        if self.fired {
            log::debug!("Autoload {:?} ignored, already fired", kind);
            return;
        }
        self.pending = kind;
        self.only_at_startup = only_at_startup;
    }

    pub fn pending(&self) -> AutoloadType {
        self.pending
    }

    pub fn has_fired(&self) -> bool {
        self.fired
    }

    /// Allow another autoload this session.
    pub fn rearm(&mut self) {
        self.fired = false;
    }

    pub fn cancel(&mut self) {
        self.pending = AutoloadType::None;
    }

    /// Called once per frame. Returns the text to type if the autoload fires now.
    pub fn check(&mut self, at_startup_screen: bool) -> Option<&'static str> {
        if self.pending == AutoloadType::None || (self.only_at_startup && !at_startup_screen) {
            return None;
        }

        let text = match self.pending {
            AutoloadType::Disk => AUTOLOAD_DISK_TEXT,
            _ => AUTOLOAD_TAPE_TEXT,
        };
        log::debug!("Autoload {:?} fired", self.pending);
        self.pending = AutoloadType::None;
        self.fired = true;
        Some(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{devices::paging::LMPR_ROM0_OFF, display::NullDisplay};

    struct ReadyScreen;

    impl DisplayProbe for ReadyScreen {
        fn matches_startup_screen(&self) -> bool {
            true
        }
    }

    #[test]
    fn startup_screen_needs_rom0_mode1_and_signature() {
        let mut paging = Paging::new();
        assert!(is_at_startup_screen(&paging, &ReadyScreen, false));
        assert!(!is_at_startup_screen(&paging, &ReadyScreen, true));
        assert!(!is_at_startup_screen(&paging, &NullDisplay, false));

        paging.out_vmpr(0x60);
        assert!(!is_at_startup_screen(&paging, &ReadyScreen, false));
        paging.out_vmpr(0);
        paging.out_lmpr(LMPR_ROM0_OFF);
        assert!(!is_at_startup_screen(&paging, &ReadyScreen, false));
    }

    #[test]
    fn autoload_fires_once_until_rearmed() {
        let mut state = AutoloadState::new();
        state.auto_load(AutoloadType::Tape, true);
        assert_eq!(state.check(false), None);
        assert_eq!(state.check(true), Some(AUTOLOAD_TAPE_TEXT));
        assert_eq!(state.check(true), None);

        state.auto_load(AutoloadType::Disk, false);
        assert_eq!(state.pending(), AutoloadType::None);

        state.rearm();
        state.auto_load(AutoloadType::Disk, false);
        assert_eq!(state.check(false), Some(AUTOLOAD_DISK_TEXT));
    }
}
