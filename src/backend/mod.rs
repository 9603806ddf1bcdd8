//! External-boundary abstraction for the LED driver and the settings store.
//!
//! The core never talks to hardware or disk directly; everything flows
//! through these two traits. `mock` provides a recording implementation of
//! both for tests, `json` a file-backed store for the CLI, and
//! [`LogBackend`] a driver stand-in that logs applies when no real driver
//! IPC is attached.

mod info;
pub mod json;
pub mod mock;

pub use info::{AppliedConfig, DeviceCapabilities, Mode, ModeCapabilities};
pub use json::JsonStore;

use std::collections::BTreeMap;

use crate::error::Result;
use crate::layout::DeviceKind;
use crate::settings::SettingsData;
use crate::timeline::CustomRgbConfig;

/// Device-apply boundary.
///
/// Calls may fail (IPC error, driver rejection); implementations report
/// failure through `Result` and never panic across the boundary.
pub trait LightingBackend: Send + Sync {
    /// What the connected hardware supports.
    fn capabilities(&self) -> DeviceCapabilities;

    /// Push a resolved one-color/two-color configuration to the driver.
    fn apply_configuration(&self, config: &AppliedConfig) -> Result<()>;

    /// Push a zoned keyframe timeline to the driver.
    ///
    /// The same call serves live preview and committed presets; only the
    /// origin of the timeline differs.
    fn set_zoned_rgb(&self, device: DeviceKind, timeline: &CustomRgbConfig) -> Result<()>;
}

/// Persistence boundary for the layered settings tree and named presets.
pub trait SettingsStore: Send + Sync {
    fn load_settings(&self) -> Result<SettingsData>;
    fn save_settings(&self, data: &SettingsData) -> Result<()>;

    fn load_presets(&self, device: DeviceKind) -> Result<BTreeMap<String, CustomRgbConfig>>;
    fn save_preset(&self, device: DeviceKind, name: &str, config: &CustomRgbConfig) -> Result<()>;
    fn delete_preset(&self, device: DeviceKind, name: &str) -> Result<()>;
}

/// Driver stand-in that logs every apply call.
///
/// Used by the CLI when no driver IPC is attached, so the whole pipeline
/// stays exercisable end to end.
#[derive(Debug, Clone, Copy)]
pub struct LogBackend {
    device: DeviceKind,
}

impl LogBackend {
    pub const fn new(device: DeviceKind) -> Self {
        Self { device }
    }
}

impl LightingBackend for LogBackend {
    fn capabilities(&self) -> DeviceCapabilities {
        DeviceCapabilities::for_device(self.device)
    }

    fn apply_configuration(&self, config: &AppliedConfig) -> Result<()> {
        tracing::info!(
            mode = config.mode.display_name(),
            primary = %config.primary,
            speed = config.speed,
            brightness_level = config.brightness_level,
            "Applying lighting configuration"
        );
        Ok(())
    }

    fn set_zoned_rgb(&self, device: DeviceKind, timeline: &CustomRgbConfig) -> Result<()> {
        tracing::info!(
            device = device.id(),
            keyframes = timeline.keyframe_count(),
            speed = timeline.speed,
            brightness = timeline.brightness,
            "Applying zoned timeline"
        );
        Ok(())
    }
}
