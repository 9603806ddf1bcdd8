//! Common test utilities for the lighting control core.
#![allow(dead_code)]

use std::sync::Arc;

use zrgb::backend::mock::MockBackend;
use zrgb::backend::{LightingBackend, SettingsStore};
use zrgb::color::Rgb;
use zrgb::layout::DeviceKind;
use zrgb::preset::{PresetStore, PresetStoreConfig};
use zrgb::settings::SettingsService;
use zrgb::timeline::{CustomRgbConfig, Keyframe};

/// A mock backend plus preset store and settings service wired to it.
pub struct Harness {
    pub mock: Arc<MockBackend>,
    pub presets: PresetStore,
    pub settings: SettingsService,
}

/// Build a fully wired harness for one device category.
pub fn harness(device: DeviceKind) -> Harness {
    let mock = Arc::new(MockBackend::new(device));
    let mut presets = PresetStore::new(
        PresetStoreConfig::for_device(device),
        Arc::clone(&mock) as Arc<dyn SettingsStore>,
        Arc::clone(&mock) as Arc<dyn LightingBackend>,
    );
    presets.init();
    let settings = SettingsService::new(
        Arc::clone(&mock) as Arc<dyn SettingsStore>,
        Arc::clone(&mock) as Arc<dyn LightingBackend>,
    );
    Harness {
        mock,
        presets,
        settings,
    }
}

/// A timeline of solid-color keyframes for `device`.
pub fn solid_timeline(device: DeviceKind, colors: &[Rgb], speed: u8) -> CustomRgbConfig {
    CustomRgbConfig {
        speed,
        brightness: 100,
        keyframes: colors
            .iter()
            .map(|&c| Keyframe(vec![c; device.zone_count()]))
            .collect(),
    }
}
