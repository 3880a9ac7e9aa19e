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

    coupe_core::devices::clock.rs
*/
//! The SAMBUS real-time clock, an MSM6242 on port 239.
//!
//! Address lines A12-A15 select one of sixteen 4-bit registers. Time advances with emulated
//! frames from a base taken when the device is created, so a paused machine sees a paused
//! clock. Setting the clock stores an offset from that base, which persists between sessions.

use std::path::Path;

use serde_derive::{Deserialize, Serialize};

use crate::bus::IoDevice;

pub const CLOCK_PORT: u16 = 239;
pub const FRAMES_PER_SECOND: u32 = 50;

pub const REG_SECOND1: u8 = 0x0;
pub const REG_SECOND10: u8 = 0x1;
pub const REG_MINUTE1: u8 = 0x2;
pub const REG_MINUTE10: u8 = 0x3;
pub const REG_HOUR1: u8 = 0x4;
pub const REG_HOUR10: u8 = 0x5;
pub const REG_DAY1: u8 = 0x6;
pub const REG_DAY10: u8 = 0x7;
pub const REG_MONTH1: u8 = 0x8;
pub const REG_MONTH10: u8 = 0x9;
pub const REG_YEAR1: u8 = 0xa;
pub const REG_YEAR10: u8 = 0xb;
pub const REG_WEEKDAY: u8 = 0xc;
pub const REG_CONTROL_D: u8 = 0xd;
pub const REG_CONTROL_E: u8 = 0xe;
pub const REG_CONTROL_F: u8 = 0xf;

/// Unused upper bits of the 4-bit registers read back high.
const NIBBLE_FILL: u8 = 0xf0;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct DateTime {
    pub year: i64,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
    /// 0 = Sunday
    pub weekday: u8,
}

// Civil calendar conversions, days relative to 1970-01-01.
fn days_from_civil(y: i64, m: u8, d: u8) -> i64 {
    let y = if m <= 2 { y - 1 } else { y };
    let era = (if y >= 0 { y } else { y - 399 }) / 400;
    let yoe = y - era * 400;
    let m = m as i64;
    let doy = (153 * (if m > 2 { m - 3 } else { m + 9 }) + 2) / 5 + d as i64 - 1;
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy;
    era * 146_097 + doe - 719_468
}

fn civil_from_days(z: i64) -> (i64, u8, u8) {
    let z = z + 719_468;
    let era = (if z >= 0 { z } else { z - 146_096 }) / 146_097;
    let doe = z - era * 146_097;
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let y = yoe + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let d = (doy - (153 * mp + 2) / 5 + 1) as u8;
    let m = (if mp < 10 { mp + 3 } else { mp - 9 }) as u8;
    (if m <= 2 { y + 1 } else { y }, m, d)
}

impl DateTime {
    pub fn from_unix(secs: i64) -> Self {
        let days = secs.div_euclid(86_400);
        let rem = secs.rem_euclid(86_400);
        let (year, month, day) = civil_from_days(days);
        DateTime {
            year,
            month,
            day,
            hour: (rem / 3600) as u8,
            minute: ((rem / 60) % 60) as u8,
            second: (rem % 60) as u8,
            weekday: (days + 4).rem_euclid(7) as u8,
        }
    }

    pub fn to_unix(&self) -> i64 {
        days_from_civil(self.year, self.month, self.day) * 86_400
            + self.hour as i64 * 3600
            + self.minute as i64 * 60
            + self.second as i64
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
struct ClockState {
    offset_secs: i64,
}

pub struct SambusClock {
    base_secs: i64,
    offset_secs: i64,
    frames: u64,
    control: [u8; 3],
}

impl SambusClock {
    /// Create a clock starting from the host's current time.
    pub fn new() -> Self {
        let base_secs = match web_time::SystemTime::now().duration_since(web_time::UNIX_EPOCH) {
            Ok(d) => d.as_secs() as i64,
            Err(e) => {
                log::warn!("Host clock before epoch: {}", e);
                0
            }
        };
        Self::with_base(base_secs)
    }

    /// Create a clock starting from a fixed Unix time.
    pub fn with_base(base_secs: i64) -> Self {
        Self {
            base_secs,
            offset_secs: 0,
            frames: 0,
            control: [0; 3],
        }
    }

    pub fn now_secs(&self) -> i64 {
        self.base_secs + self.offset_secs + (self.frames / FRAMES_PER_SECOND as u64) as i64
    }

    pub fn now(&self) -> DateTime {
        DateTime::from_unix(self.now_secs())
    }

    pub fn offset_secs(&self) -> i64 {
        self.offset_secs
    }

    fn register_read(&self, reg: u8) -> u8 {
        let t = self.now();
        let year = t.year.rem_euclid(100) as u8;
        let digit = match reg {
            REG_SECOND1 => t.second % 10,
            REG_SECOND10 => t.second / 10,
            REG_MINUTE1 => t.minute % 10,
            REG_MINUTE10 => t.minute / 10,
            REG_HOUR1 => t.hour % 10,
            REG_HOUR10 => t.hour / 10,
            REG_DAY1 => t.day % 10,
            REG_DAY10 => t.day / 10,
            REG_MONTH1 => t.month % 10,
            REG_MONTH10 => t.month / 10,
            REG_YEAR1 => year % 10,
            REG_YEAR10 => year / 10,
            REG_WEEKDAY => t.weekday,
            _ => self.control[(reg - REG_CONTROL_D) as usize],
        };
        NIBBLE_FILL | (digit & 0x0f)
    }

    fn register_write(&mut self, reg: u8, data: u8) {
        let digit = data & 0x0f;
        if reg >= REG_CONTROL_D {
            self.control[(reg - REG_CONTROL_D) as usize] = digit;
            return;
        }

        if digit > 9 {
            log::debug!("Clock: ignoring non-BCD write {:X} to register {:X}", digit, reg);
            return;
        }

        let mut t = self.now();
        let mut year = t.year.rem_euclid(100) as u8;
        let set_units = |v: u8| v - v % 10 + digit;
        let set_tens = |v: u8| v % 10 + digit * 10;
        match reg {
            REG_SECOND1 => t.second = set_units(t.second),
            REG_SECOND10 => t.second = set_tens(t.second),
            REG_MINUTE1 => t.minute = set_units(t.minute),
            REG_MINUTE10 => t.minute = set_tens(t.minute),
            REG_HOUR1 => t.hour = set_units(t.hour),
            REG_HOUR10 => t.hour = set_tens(t.hour),
            REG_DAY1 => t.day = set_units(t.day),
            REG_DAY10 => t.day = set_tens(t.day),
            REG_MONTH1 => t.month = set_units(t.month),
            REG_MONTH10 => t.month = set_tens(t.month),
            REG_YEAR1 => year = set_units(year),
            REG_YEAR10 => year = set_tens(year),
            // Weekday follows from the date.
            _ => return,
        }

        if t.second > 59
            || t.minute > 59
            || t.hour > 23
            || t.day == 0
            || t.day > 31
            || t.month == 0
            || t.month > 12
            || year > 99
        {
            log::debug!("Clock: ignoring out of range write {:X} to register {:X}", digit, reg);
            return;
        }

        t.year = t.year - t.year.rem_euclid(100) + year as i64;
        let target = t.to_unix();
        self.offset_secs += target - self.now_secs();
        log::debug!("Clock: offset now {} seconds", self.offset_secs);
    }
}

impl Default for SambusClock {
    fn default() -> Self {
        Self::new()
    }
}

impl IoDevice for SambusClock {
    fn reset(&mut self) {
        self.control = [0; 3];
    }

    fn read_u8(&mut self, port: u16) -> u8 {
        self.register_read((port >> 12) as u8)
    }

    fn write_u8(&mut self, port: u16, data: u8) {
        self.register_write((port >> 12) as u8, data);
    }

    fn frame_end(&mut self) {
        self.frames += 1;
    }

    fn load_state(&mut self, path: &Path) {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(_) => return,
        };
        match toml::from_str::<ClockState>(&text) {
            Ok(state) => self.offset_secs = state.offset_secs,
            Err(e) => log::warn!("Ignoring corrupt clock state {}: {}", path.display(), e),
        }
    }

    fn save_state(&mut self, path: &Path) {
        let state = ClockState {
            offset_secs: self.offset_secs,
        };
        match toml::to_string(&state) {
            Ok(text) => {
                if let Err(e) = std::fs::write(path, text) {
                    log::error!("Failed to write clock state {}: {}", path.display(), e);
                }
            }
            Err(e) => log::error!("Failed to serialize clock state: {}", e),
        }
    }

    fn port_list(&self) -> Vec<(String, u16)> {
        (0..16u16)
            .map(|reg| (format!("SAMBUS Clock register {:X}", reg), (reg << 12) | CLOCK_PORT))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 2001-02-03 04:05:06 UTC, a Saturday.
    const BASE: i64 = 981_173_106;

    fn read(clock: &mut SambusClock, reg: u16) -> u8 {
        clock.read_u8((reg << 12) | CLOCK_PORT) & 0x0f
    }

    #[test]
    fn bcd_registers() {
        let mut clock = SambusClock::with_base(BASE);
        assert_eq!(read(&mut clock, 0x0), 6);
        assert_eq!(read(&mut clock, 0x1), 0);
        assert_eq!(read(&mut clock, 0x2), 5);
        assert_eq!(read(&mut clock, 0x4), 4);
        assert_eq!(read(&mut clock, 0x6), 3);
        assert_eq!(read(&mut clock, 0x8), 2);
        assert_eq!(read(&mut clock, 0xA), 1);
        assert_eq!(read(&mut clock, 0xB), 0);
        assert_eq!(read(&mut clock, 0xC), 6);
        assert_eq!(clock.read_u8(CLOCK_PORT) & 0xf0, 0xf0);
    }

    #[test]
    fn time_advances_with_frames() {
        let mut clock = SambusClock::with_base(BASE);
        for _ in 0..FRAMES_PER_SECOND * 4 {
            clock.frame_end();
        }
        assert_eq!(read(&mut clock, 0x0), 0);
        assert_eq!(read(&mut clock, 0x1), 1);
    }

    #[test]
    fn setting_clock_persists_offset() {
        let mut clock = SambusClock::with_base(BASE);
        // Set the hour tens digit: 04:05 becomes 14:05.
        clock.write_u8((0x5 << 12) | CLOCK_PORT, 1);
        assert_eq!(clock.now().hour, 14);
        assert_eq!(clock.offset_secs(), 36_000);

        let path = std::env::temp_dir().join(format!("coupe_clock_{}.toml", std::process::id()));
        clock.save_state(&path);

        let mut fresh = SambusClock::with_base(BASE);
        fresh.load_state(&path);
        assert_eq!(fresh.now().hour, 14);
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn out_of_range_digits_ignored() {
        let mut clock = SambusClock::with_base(BASE);
        clock.write_u8((0xB << 12) | CLOCK_PORT, 0xF);
        clock.write_u8((0xA << 12) | CLOCK_PORT, 0xC);
        clock.write_u8((0x1 << 12) | CLOCK_PORT, 7);
        assert_eq!(clock.offset_secs(), 0);
        assert_eq!(clock.now().year, 2001);

        // 2001 becomes 2091.
        clock.write_u8((0xB << 12) | CLOCK_PORT, 9);
        assert_eq!(clock.now().year, 2091);
        assert_eq!(read(&mut clock, 0xB), 9);
    }

    #[test]
    fn calendar_round_trip() {
        let t = DateTime::from_unix(BASE);
        assert_eq!((t.year, t.month, t.day), (2001, 2, 3));
        assert_eq!(t.to_unix(), BASE);
        assert_eq!(DateTime::from_unix(0).weekday, 4);
    }
}
