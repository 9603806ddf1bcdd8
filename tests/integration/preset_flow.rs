//! Integration tests for preset CRUD/apply flows against the mock boundary.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use zrgb::backend::mock::Operation;
use zrgb::backend::Mode;
use zrgb::color::Rgb;
use zrgb::layout::DeviceKind;

use crate::common::{harness, solid_timeline};

#[test]
fn test_save_then_apply_round_trip() {
    let mut h = harness(DeviceKind::LegionGo);
    let config = solid_timeline(DeviceKind::LegionGo, &[Rgb(1, 2, 3), Rgb(4, 5, 6)], 7);

    assert!(h.presets.save("wave", config.clone()));
    h.mock.clear_operations();
    assert!(h.presets.apply("wave", &mut h.settings));

    // The device-apply boundary received exactly what was saved.
    assert_eq!(h.mock.zoned_applies(), vec![config]);
    assert_eq!(h.settings.mode(), Mode::Zoned);
    assert_eq!(h.settings.active_preset(), Some("wave"));
}

#[test]
fn test_presets_survive_reinit() {
    let mut h = harness(DeviceKind::MsiClaw);
    let config = solid_timeline(DeviceKind::MsiClaw, &[Rgb(9, 9, 9)], 3);
    assert!(h.presets.save("static", config.clone()));

    // A second init (fresh boot) reloads from the store.
    h.presets.init();
    assert_eq!(h.presets.get("static"), Some(&config));
}

#[test]
fn test_edit_preview_save_apply_pipeline() {
    let mut h = harness(DeviceKind::LegionGo);

    h.presets.start_editing(None);
    h.presets
        .editor()
        .update_zone_color(0, 2, Rgb(0, 255, 0))
        .unwrap();
    h.presets.editor().update_speed(15).unwrap();

    // Live preview goes straight to the device, nothing is persisted.
    assert!(h.presets.preview_current());
    assert!(h.mock.stored_preset_names().is_empty());

    assert!(h.presets.save_current("mint", &mut h.settings));
    assert_eq!(h.mock.stored_preset_names(), vec!["mint".to_string()]);

    h.mock.clear_operations();
    assert!(h.presets.apply("mint", &mut h.settings));
    let sent = h.mock.zoned_applies().pop().unwrap();
    assert_eq!(sent.speed, 15);
    assert_eq!(sent.keyframes[0].zones()[2], Rgb(0, 255, 0));
}

#[test]
fn test_rename_active_preset_updates_pointer_and_device() {
    let mut h = harness(DeviceKind::LegionGo);
    let config = solid_timeline(DeviceKind::LegionGo, &[Rgb(10, 0, 0)], 10);
    h.presets.save("old", config);
    h.presets.apply("old", &mut h.settings);

    h.presets.start_editing(Some("old"));
    h.presets
        .editor()
        .update_zone_color(0, 0, Rgb(0, 10, 0))
        .unwrap();
    h.mock.clear_operations();
    assert!(h.presets.save_current("new", &mut h.settings));

    assert!(h.presets.get("old").is_none());
    assert!(h.presets.get("new").is_some());
    assert_eq!(h.settings.active_preset(), Some("new"));
    // Live output was refreshed with the saved data.
    let sent = h.mock.zoned_applies().pop().unwrap();
    assert_eq!(sent.keyframes[0].zones()[0], Rgb(0, 10, 0));
}

#[test]
fn test_delete_active_reverts_to_solid_mode() {
    let mut h = harness(DeviceKind::RogAlly);
    let config = solid_timeline(DeviceKind::RogAlly, &[Rgb(10, 0, 0)], 10);
    h.presets.save("only", config);
    h.presets.apply("only", &mut h.settings);
    h.mock.clear_operations();

    assert!(h.presets.delete("only", &mut h.settings));
    assert_eq!(h.settings.mode(), Mode::Solid);
    assert_eq!(h.settings.active_preset(), None);
    assert!(h
        .mock
        .operations()
        .iter()
        .any(|op| matches!(op, Operation::ApplyConfiguration(_))));
}

#[test]
fn test_deleting_inactive_preset_keeps_mode() {
    let mut h = harness(DeviceKind::LegionGo);
    h.presets
        .save("a", solid_timeline(DeviceKind::LegionGo, &[Rgb(1, 0, 0)], 1));
    h.presets
        .save("b", solid_timeline(DeviceKind::LegionGo, &[Rgb(2, 0, 0)], 2));
    h.presets.apply("a", &mut h.settings);

    assert!(h.presets.delete("b", &mut h.settings));
    assert_eq!(h.settings.mode(), Mode::Zoned);
    assert_eq!(h.settings.active_preset(), Some("a"));
}

#[test]
fn test_failed_apply_leaves_settings_unchanged() {
    let mut h = harness(DeviceKind::LegionGo);
    h.presets
        .save("wave", solid_timeline(DeviceKind::LegionGo, &[Rgb(1, 0, 0)], 1));

    h.mock.inject_failure("driver ipc down");
    assert!(!h.presets.apply("wave", &mut h.settings));
    assert_eq!(h.settings.mode(), Mode::Solid);
    assert_eq!(h.settings.active_preset(), None);
}

#[test]
fn test_mutations_notify_subscribers() {
    let mut h = harness(DeviceKind::LegionGo);
    let notified = Arc::new(AtomicUsize::new(0));
    let n = Arc::clone(&notified);
    h.presets.subscribe(move || {
        n.fetch_add(1, Ordering::SeqCst);
    });

    h.presets
        .save("wave", solid_timeline(DeviceKind::LegionGo, &[Rgb(1, 0, 0)], 1));
    h.presets.apply("wave", &mut h.settings);
    h.presets.delete("wave", &mut h.settings);

    assert_eq!(notified.load(Ordering::SeqCst), 3);
}

#[test]
fn test_keyframe_cap_enforced_through_store_editor() {
    let mut h = harness(DeviceKind::LegionGo);
    h.presets.start_editing(None);
    for _ in 0..7 {
        assert!(h.presets.editor().add_keyframe(None));
    }
    // Cap of 8 reached: both plain adds and rotate-copies are refused.
    assert!(!h.presets.editor().add_keyframe(None));
    assert!(!h.presets.rotate_copy(0, true).unwrap());
    assert_eq!(h.presets.editing().unwrap().keyframe_count(), 8);
}
