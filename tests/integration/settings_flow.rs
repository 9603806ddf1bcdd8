//! Integration tests for layered settings resolution and persistence.

use std::sync::Arc;

use zrgb::backend::{JsonStore, LightingBackend, LogBackend, SettingsStore};
use zrgb::layout::DeviceKind;
use zrgb::settings::{PowerState, SettingsService, DEFAULT_APP_ID};

use crate::common::harness;

fn file_backed_service(dir: &std::path::Path) -> SettingsService {
    let store = Arc::new(JsonStore::open(dir).unwrap());
    let backend = Arc::new(LogBackend::new(DeviceKind::LegionGo));
    SettingsService::new(
        store as Arc<dyn SettingsStore>,
        backend as Arc<dyn LightingBackend>,
    )
}

#[test]
fn test_settings_survive_restart() {
    let dir = tempfile::tempdir().unwrap();

    {
        let mut service = file_backed_service(dir.path());
        service.set_hue(210.0).unwrap();
        service.set_saturation(60.0).unwrap();
        service.set_power_led_enabled(false);
    }

    // A new service (fresh process) sees the persisted tree.
    let service = file_backed_service(dir.path());
    assert_eq!(service.hue(), 210.0);
    assert_eq!(service.saturation(), 60.0);
    assert!(!service.data().power_led_enabled);
}

#[test]
fn test_per_app_and_power_layers_persist() {
    let dir = tempfile::tempdir().unwrap();

    {
        let mut service = file_backed_service(dir.path());
        service.set_hue(10.0).unwrap();

        service.set_current_app("game-7");
        service.set_app_overwrite("game-7", true);
        service.set_hue(120.0).unwrap();

        service.set_ac_state_overwrite(true);
        service.set_power_state(PowerState::Battery);
        service.set_hue(240.0).unwrap();
    }

    let mut service = file_backed_service(dir.path());
    // Default context sees the global default.
    assert_eq!(service.hue(), 10.0);

    // App context with override: AC slot kept the clone-time value.
    service.set_current_app("game-7");
    assert_eq!(service.hue(), 120.0);

    // Battery slot diverged.
    service.set_power_state(PowerState::Battery);
    assert_eq!(service.hue(), 240.0);
}

#[test]
fn test_context_switches_notify_subscribers() {
    let mut h = harness(DeviceKind::LegionGo);
    let notified = Arc::new(std::sync::atomic::AtomicUsize::new(0));
    let n = Arc::clone(&notified);
    h.settings.subscribe(move || {
        n.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
    });

    h.settings.set_current_app("game-1");
    h.settings.set_power_state(PowerState::Battery);
    // Re-setting the same context is not a change.
    h.settings.set_current_app("game-1");
    h.settings.set_power_state(PowerState::Battery);

    assert_eq!(notified.load(std::sync::atomic::Ordering::SeqCst), 2);
}

#[test]
fn test_new_app_override_uses_global_default_template() {
    let mut h = harness(DeviceKind::LegionGo);
    h.settings.set_hue(77.0).unwrap();

    h.settings.set_current_app("game-9");
    h.settings.set_app_overwrite("game-9", true);
    // The new entry starts as a copy of the global default.
    assert_eq!(h.settings.hue(), 77.0);

    // And diverges without touching the global default.
    h.settings.set_hue(200.0).unwrap();
    h.settings.set_current_app(DEFAULT_APP_ID);
    assert_eq!(h.settings.hue(), 77.0);
}

#[test]
fn test_power_state_is_irrelevant_without_split() {
    let mut h = harness(DeviceKind::LegionGo);
    h.settings.set_current_app("game-2");
    h.settings.set_app_overwrite("game-2", true);
    h.settings.set_hue(99.0).unwrap();

    for power in [PowerState::Ac, PowerState::Battery] {
        h.settings.set_power_state(power);
        assert_eq!(h.settings.hue(), 99.0, "{power:?}");
    }
}
