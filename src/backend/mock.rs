//! Mock backend implementation for unit testing.
//!
//! Records every boundary call and supports failure injection, so the
//! settings/preset flows can be exercised without a driver or disk.
//!
//! # Example
//!
//! ```rust,ignore
//! use zrgb::backend::mock::{MockBackend, Operation};
//! use zrgb::backend::LightingBackend;
//! use zrgb::layout::DeviceKind;
//!
//! let mock = MockBackend::legion_go();
//! mock.set_zoned_rgb(DeviceKind::LegionGo, &timeline).unwrap();
//! assert_eq!(mock.zoned_applies().len(), 1);
//! ```

use std::collections::BTreeMap;
use std::sync::Mutex;

use tracing::trace;

use super::{AppliedConfig, DeviceCapabilities, LightingBackend, SettingsStore};
use crate::error::{LightError, Result};
use crate::layout::DeviceKind;
use crate::settings::SettingsData;
use crate::timeline::CustomRgbConfig;

/// Recorded boundary call for assertions.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    ApplyConfiguration(AppliedConfig),
    SetZonedRgb {
        device: DeviceKind,
        timeline: CustomRgbConfig,
    },
    LoadSettings,
    SaveSettings,
    LoadPresets {
        device: DeviceKind,
    },
    SavePreset {
        device: DeviceKind,
        name: String,
    },
    DeletePreset {
        device: DeviceKind,
        name: String,
    },
}

/// Mock implementation of both boundary traits.
///
/// Settings and presets live in memory; the operation log captures calls in
/// order. `fail_next` makes the next boundary call fail once, for testing
/// the no-partial-mutation rules.
pub struct MockBackend {
    device: DeviceKind,
    operations: Mutex<Vec<Operation>>,
    fail_next: Mutex<Option<String>>,
    settings: Mutex<Option<SettingsData>>,
    presets: Mutex<BTreeMap<String, CustomRgbConfig>>,
}

impl MockBackend {
    pub fn new(device: DeviceKind) -> Self {
        Self {
            device,
            operations: Mutex::new(Vec::new()),
            fail_next: Mutex::new(None),
            settings: Mutex::new(None),
            presets: Mutex::new(BTreeMap::new()),
        }
    }

    pub fn legion_go() -> Self {
        Self::new(DeviceKind::LegionGo)
    }

    pub fn rog_ally() -> Self {
        Self::new(DeviceKind::RogAlly)
    }

    pub fn msi_claw() -> Self {
        Self::new(DeviceKind::MsiClaw)
    }

    /// Make the next boundary call fail with `reason`.
    pub fn inject_failure(&self, reason: &str) {
        *self.fail_next.lock().unwrap() = Some(reason.to_string());
    }

    /// Seed the in-memory preset dict directly (bypassing the log).
    pub fn seed_preset(&self, name: &str, config: CustomRgbConfig) {
        self.presets
            .lock()
            .unwrap()
            .insert(name.to_string(), config);
    }

    /// Seed stored settings directly.
    pub fn seed_settings(&self, data: SettingsData) {
        *self.settings.lock().unwrap() = Some(data);
    }

    /// Everything recorded so far, in call order.
    pub fn operations(&self) -> Vec<Operation> {
        self.operations.lock().unwrap().clone()
    }

    pub fn clear_operations(&self) {
        self.operations.lock().unwrap().clear();
    }

    /// Timelines received by `set_zoned_rgb`, in call order.
    pub fn zoned_applies(&self) -> Vec<CustomRgbConfig> {
        self.operations
            .lock()
            .unwrap()
            .iter()
            .filter_map(|op| match op {
                Operation::SetZonedRgb { timeline, .. } => Some(timeline.clone()),
                _ => None,
            })
            .collect()
    }

    /// Names currently in the stored preset dict.
    pub fn stored_preset_names(&self) -> Vec<String> {
        self.presets.lock().unwrap().keys().cloned().collect()
    }

    /// The settings tree most recently saved, if any.
    pub fn stored_settings(&self) -> Option<SettingsData> {
        self.settings.lock().unwrap().clone()
    }

    fn record(&self, op: Operation) {
        trace!(?op, "Mock backend call");
        self.operations.lock().unwrap().push(op);
    }

    fn check_failure(&self) -> Result<()> {
        if let Some(reason) = self.fail_next.lock().unwrap().take() {
            return Err(LightError::Backend(reason));
        }
        Ok(())
    }
}

impl LightingBackend for MockBackend {
    fn capabilities(&self) -> DeviceCapabilities {
        DeviceCapabilities::for_device(self.device)
    }

    fn apply_configuration(&self, config: &AppliedConfig) -> Result<()> {
        self.record(Operation::ApplyConfiguration(*config));
        self.check_failure()
    }

    fn set_zoned_rgb(&self, device: DeviceKind, timeline: &CustomRgbConfig) -> Result<()> {
        self.record(Operation::SetZonedRgb {
            device,
            timeline: timeline.clone(),
        });
        self.check_failure()
    }
}

impl SettingsStore for MockBackend {
    fn load_settings(&self) -> Result<SettingsData> {
        self.record(Operation::LoadSettings);
        self.check_failure()?;
        Ok(self
            .settings
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_default())
    }

    fn save_settings(&self, data: &SettingsData) -> Result<()> {
        self.record(Operation::SaveSettings);
        self.check_failure()?;
        *self.settings.lock().unwrap() = Some(data.clone());
        Ok(())
    }

    fn load_presets(&self, device: DeviceKind) -> Result<BTreeMap<String, CustomRgbConfig>> {
        self.record(Operation::LoadPresets { device });
        self.check_failure()?;
        Ok(self.presets.lock().unwrap().clone())
    }

    fn save_preset(&self, device: DeviceKind, name: &str, config: &CustomRgbConfig) -> Result<()> {
        self.record(Operation::SavePreset {
            device,
            name: name.to_string(),
        });
        self.check_failure()?;
        self.presets
            .lock()
            .unwrap()
            .insert(name.to_string(), config.clone());
        Ok(())
    }

    fn delete_preset(&self, device: DeviceKind, name: &str) -> Result<()> {
        self.record(Operation::DeletePreset {
            device,
            name: name.to_string(),
        });
        self.check_failure()?;
        self.presets.lock().unwrap().remove(name);
        Ok(())
    }
}
