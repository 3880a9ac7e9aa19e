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

    coupe_core::tests::io_bus.rs
*/
use std::path::PathBuf;

use coupe_core::{
    bus::ports::{LMPR_PORT, STATUS_PORT, VMPR_PORT},
    devices::{keyboard::SamKey, status::InterruptSource},
    display::DisplayProbe,
    DriveSlot,
    DriveType,
    IoBus,
    IoConfig,
    NO_IO_BYTE,
};

struct ReadyScreen;

impl DisplayProbe for ReadyScreen {
    fn matches_startup_screen(&self) -> bool {
        true
    }
}

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("coupe_it_{}_{}", std::process::id(), name))
}

fn mgt_image(name: &str) -> PathBuf {
    let path = temp_path(name);
    std::fs::write(&path, vec![0xE5u8; 819_200]).unwrap();
    path
}

fn quiet_config() -> IoConfig {
    IoConfig {
        sambus_clock: false,
        ..IoConfig::default()
    }
}

#[test]
fn unmapped_ports_float() {
    let mut bus = IoBus::new(&quiet_config());
    for port in [0u16, 1, 100, 0x1234, 200, 0xFF7F] {
        bus.write(port, 0x55);
        assert_eq!(bus.read(port), NO_IO_BYTE);
        assert_eq!(bus.read(port), NO_IO_BYTE);
    }
}

#[test]
fn paging_registers_through_ports() {
    let mut bus = IoBus::new(&quiet_config());
    for v in [0x00u8, 0x1F, 0x25, 0x5A, 0xE3, 0xFF] {
        bus.write(LMPR_PORT, v);
        let paging = bus.paging();
        assert_eq!(paging.lmpr_page(), v & 0x1F);
        assert_eq!(paging.rom0_off(), v & 0x20 != 0);
        assert_eq!(paging.rom1(), v & 0x40 != 0);
        assert_eq!(paging.write_protect(), v & 0x80 != 0);

        bus.write(VMPR_PORT, v);
        assert_eq!(bus.paging().vmpr_page(), v & 0x1F);
        assert_eq!(bus.paging().vmpr_mode(), (v & 0x60) >> 5);
        assert_eq!(bus.read(VMPR_PORT), v);
    }
}

#[test]
fn status_latch_after_reset() {
    let mut bus = IoBus::new(&quiet_config());
    bus.signal_interrupt(InterruptSource::Line);
    bus.reset();
    assert_eq!(bus.read(STATUS_PORT), 0x1F);

    bus.signal_interrupt(InterruptSource::Frame);
    assert_eq!(bus.read(STATUS_PORT), 0x17);
    bus.acknowledge_interrupt(InterruptSource::Frame);
    assert_eq!(bus.read(STATUS_PORT), 0x1F);
}

#[test]
fn drive_activity_floors_at_zero() {
    let path = mgt_image("activity.mgt");
    let mut bus = IoBus::new(&quiet_config());
    assert!(bus.insert(DriveSlot::Drive1, &path, false));
    assert!(!bus.registry().drive(DriveSlot::Drive1).is_active());

    // Read sector 1 and take its first byte.
    bus.write(226, 1);
    bus.write(224, 0x80);
    assert_eq!(bus.read(227), 0xE5);
    assert!(bus.registry().drive(DriveSlot::Drive1).is_active());

    bus.frame_update();
    assert!(bus.registry().drive(DriveSlot::Drive1).is_active());
    bus.frame_update();
    assert!(!bus.registry().drive(DriveSlot::Drive1).is_active());
    bus.frame_update();
    assert!(!bus.registry().drive(DriveSlot::Drive1).is_active());
    let _ = std::fs::remove_file(path);
}

#[test]
fn empty_drive2_answers_once_a_disk_is_inserted() {
    let path = mgt_image("drive2.mgt");
    let mut bus = IoBus::new(&quiet_config());
    assert_eq!(bus.read(241), NO_IO_BYTE);

    assert!(bus.insert(DriveSlot::Drive2, &path, false));
    assert_eq!(bus.registry().drive(DriveSlot::Drive2).drive_type(), DriveType::Floppy);
    // Track register of the newly fitted controller.
    assert_eq!(bus.read(241), 0);
    let _ = std::fs::remove_file(path);
}

#[test]
fn drive_state_survives_restart() {
    let state_dir = temp_path("state");
    let path = mgt_image("persist.mgt");
    let config = IoConfig {
        state_dir: Some(state_dir.clone()),
        ..quiet_config()
    };

    let mut bus = IoBus::new(&config);
    assert!(bus.insert(DriveSlot::Drive1, &path, false));
    bus.registry_mut().drive_mut(DriveSlot::Drive1).set_disk_modified(true);
    bus.registry_mut().save_state();

    let fresh = IoBus::new(&config);
    let drive = fresh.registry().drive(DriveSlot::Drive1);
    assert!(drive.has_disk());
    assert!(drive.disk_modified());
    assert_eq!(drive.disk_path(), Some(path.as_path()));
    assert!(!fresh.registry().drive(DriveSlot::Drive2).has_disk());

    // A floppy hot-plugged into the empty drive 2 bay comes back too.
    let path2 = mgt_image("persist2.mgt");
    assert!(bus.insert(DriveSlot::Drive2, &path2, false));
    bus.registry_mut().drive_mut(DriveSlot::Drive2).set_disk_modified(true);
    bus.registry_mut().save_state();

    let mut fresh = IoBus::new(&config);
    let drive = fresh.registry().drive(DriveSlot::Drive1);
    assert!(drive.has_disk());
    assert!(drive.disk_modified());
    assert_eq!(drive.disk_path(), Some(path.as_path()));
    let drive2 = fresh.registry().drive(DriveSlot::Drive2);
    assert_eq!(drive2.drive_type(), DriveType::Floppy);
    assert!(drive2.has_disk());
    assert!(drive2.disk_modified());
    assert_eq!(drive2.disk_path(), Some(path2.as_path()));
    assert_eq!(fresh.read(241), 0);

    let _ = std::fs::remove_dir_all(state_dir);
    let _ = std::fs::remove_file(path);
    let _ = std::fs::remove_file(path2);
}

#[test]
fn boot_disk_autoload_types_boot() {
    let path = mgt_image("boot.mgt");
    let mut bus = IoBus::new(&quiet_config());
    bus.set_display(Box::new(ReadyScreen));

    assert!(bus.insert(DriveSlot::Boot, &path, true));
    bus.frame_update();
    assert!(bus.autoload().has_fired());

    bus.update_input();
    assert!(bus.input().keys.is_pressed(SamKey::B));

    // A second request is ignored until rearmed.
    assert!(bus.insert(DriveSlot::Boot, &path, true));
    bus.frame_update();
    assert_eq!(bus.autoload().pending(), coupe_core::AutoloadType::None);
    let _ = std::fs::remove_file(path);
}
