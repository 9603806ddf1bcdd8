//! JSON-file settings store under the user configuration directory.
//!
//! One file holds the layered settings tree, one file per device category
//! holds that category's preset dict. Writes go through a temp file and a
//! rename so a crash mid-write never leaves a half-written tree behind.
//! Missing files read as defaults, not errors.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use super::SettingsStore;
use crate::error::{LightError, Result};
use crate::layout::DeviceKind;
use crate::settings::SettingsData;
use crate::timeline::CustomRgbConfig;

/// File-backed settings store.
pub struct JsonStore {
    root: PathBuf,
}

impl JsonStore {
    /// Open the store at the default per-user location
    /// (`<config_dir>/zrgb/`), creating it if needed.
    pub fn open_default() -> Result<Self> {
        let root = dirs::config_dir()
            .ok_or_else(|| LightError::Store("could not determine config directory".to_string()))?
            .join("zrgb");
        Self::open(root)
    }

    /// Open the store at an explicit root directory.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        debug!(root = %root.display(), "Opened settings store");
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn settings_path(&self) -> PathBuf {
        self.root.join("settings.json")
    }

    pub fn presets_path(&self, device: DeviceKind) -> PathBuf {
        self.root.join(format!("presets-{}.json", device.id()))
    }

    fn read_or_default<T: DeserializeOwned + Default>(path: &Path) -> Result<T> {
        if !path.exists() {
            debug!(path = %path.display(), "No file yet, using defaults");
            return Ok(T::default());
        }
        let contents = fs::read_to_string(path)?;
        serde_json::from_str(&contents).map_err(|e| {
            LightError::SettingsParse(format!("{}: {e}", path.display()))
        })
    }

    fn write_atomic<T: Serialize>(path: &Path, value: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(value)
            .map_err(|e| LightError::Store(format!("serialize {}: {e}", path.display())))?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, path)?;
        Ok(())
    }
}

impl SettingsStore for JsonStore {
    fn load_settings(&self) -> Result<SettingsData> {
        let mut data: SettingsData = Self::read_or_default(&self.settings_path())?;
        data.ensure_defaults();
        Ok(data)
    }

    fn save_settings(&self, data: &SettingsData) -> Result<()> {
        Self::write_atomic(&self.settings_path(), data)
    }

    fn load_presets(&self, device: DeviceKind) -> Result<BTreeMap<String, CustomRgbConfig>> {
        Self::read_or_default(&self.presets_path(device))
    }

    fn save_preset(&self, device: DeviceKind, name: &str, config: &CustomRgbConfig) -> Result<()> {
        let mut presets = self.load_presets(device)?;
        presets.insert(name.to_string(), config.clone());
        Self::write_atomic(&self.presets_path(device), &presets)
    }

    fn delete_preset(&self, device: DeviceKind, name: &str) -> Result<()> {
        let mut presets = self.load_presets(device)?;
        if presets.remove(name).is_none() {
            warn!(preset = %name, "Delete of preset not present on disk");
        }
        Self::write_atomic(&self.presets_path(device), &presets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgb;
    use crate::timeline::Keyframe;

    fn store() -> (tempfile::TempDir, JsonStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::open(dir.path().join("zrgb")).unwrap();
        (dir, store)
    }

    fn timeline(speed: u8) -> CustomRgbConfig {
        CustomRgbConfig {
            speed,
            brightness: 80,
            keyframes: vec![Keyframe(vec![Rgb(10, 20, 30); 8])],
        }
    }

    #[test]
    fn test_missing_files_read_as_defaults() {
        let (_dir, store) = store();
        let settings = store.load_settings().unwrap();
        assert!(settings.per_app.contains_key(crate::settings::DEFAULT_APP_ID));
        assert!(store.load_presets(DeviceKind::LegionGo).unwrap().is_empty());
    }

    #[test]
    fn test_settings_round_trip() {
        let (_dir, store) = store();
        let mut data = store.load_settings().unwrap();
        data.power_led_enabled = false;
        data.active_preset = Some("wave".to_string());
        store.save_settings(&data).unwrap();

        let reloaded = store.load_settings().unwrap();
        assert!(!reloaded.power_led_enabled);
        assert_eq!(reloaded.active_preset.as_deref(), Some("wave"));
    }

    #[test]
    fn test_preset_round_trip_and_delete() {
        let (_dir, store) = store();
        store
            .save_preset(DeviceKind::LegionGo, "wave", &timeline(5))
            .unwrap();
        store
            .save_preset(DeviceKind::LegionGo, "pulse", &timeline(15))
            .unwrap();

        let presets = store.load_presets(DeviceKind::LegionGo).unwrap();
        assert_eq!(presets.len(), 2);
        assert_eq!(presets["wave"], timeline(5));

        store.delete_preset(DeviceKind::LegionGo, "wave").unwrap();
        let presets = store.load_presets(DeviceKind::LegionGo).unwrap();
        assert!(!presets.contains_key("wave"));
        assert!(presets.contains_key("pulse"));
    }

    #[test]
    fn test_presets_are_partitioned_by_device() {
        let (_dir, store) = store();
        store
            .save_preset(DeviceKind::LegionGo, "wave", &timeline(5))
            .unwrap();
        assert!(store.load_presets(DeviceKind::MsiClaw).unwrap().is_empty());
    }

    #[test]
    fn test_corrupt_file_is_a_parse_error() {
        let (_dir, store) = store();
        fs::write(store.settings_path(), "{not json").unwrap();
        assert!(matches!(
            store.load_settings(),
            Err(LightError::SettingsParse(_))
        ));
    }
}
