//! Named preset management, one store per device category.
//!
//! A preset is a persisted timeline. The store owns the in-memory dict and
//! the editing slot for its category, writes through the persistence
//! boundary before mutating the dict (no partial state on failure), and
//! broadcasts after every mutation. CRUD and apply failures are reported as
//! `false` — the boundary never throws across component lines.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::backend::{LightingBackend, Mode, SettingsStore};
use crate::error::Result;
use crate::layout::{self, DeviceKind};
use crate::notify::{Listeners, SubscriptionId};
use crate::settings::SettingsService;
use crate::timeline::{CustomRgbConfig, TimelineEditor};

/// Per-category parameters for a preset store.
///
/// One generic store type is instantiated per device category; state is
/// never shared between categories.
#[derive(Debug, Clone, Copy)]
pub struct PresetStoreConfig {
    pub device: DeviceKind,
    pub max_keyframes: usize,
}

impl PresetStoreConfig {
    pub const fn for_device(device: DeviceKind) -> Self {
        Self {
            device,
            max_keyframes: device.max_keyframes(),
        }
    }
}

/// CRUD + apply over the named presets of one device category.
pub struct PresetStore {
    config: PresetStoreConfig,
    presets: BTreeMap<String, CustomRgbConfig>,
    editor: TimelineEditor,
    store: Arc<dyn SettingsStore>,
    backend: Arc<dyn LightingBackend>,
    listeners: Listeners,
}

impl PresetStore {
    pub fn new(
        config: PresetStoreConfig,
        store: Arc<dyn SettingsStore>,
        backend: Arc<dyn LightingBackend>,
    ) -> Self {
        Self {
            config,
            presets: BTreeMap::new(),
            editor: TimelineEditor::new(config.device.zone_count(), config.max_keyframes),
            store,
            backend,
            listeners: Listeners::new(),
        }
    }

    /// Load all presets for this category from the persistence boundary.
    ///
    /// A failing load means "no presets saved yet", not an error state;
    /// listeners are notified either way.
    pub fn init(&mut self) {
        self.presets = match self.store.load_presets(self.config.device) {
            Ok(presets) => presets,
            Err(e) => {
                warn!(error = %e, device = self.config.device.id(), "Failed to load presets");
                BTreeMap::new()
            }
        };
        debug!(
            device = self.config.device.id(),
            count = self.presets.len(),
            "Presets loaded"
        );
        self.listeners.notify();
    }

    pub fn subscribe(&self, callback: impl Fn() + Send + Sync + 'static) -> SubscriptionId {
        self.listeners.subscribe(callback)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.listeners.unsubscribe(id);
    }

    pub fn device(&self) -> DeviceKind {
        self.config.device
    }

    pub fn names(&self) -> Vec<&str> {
        self.presets.keys().map(String::as_str).collect()
    }

    pub fn get(&self, name: &str) -> Option<&CustomRgbConfig> {
        self.presets.get(name)
    }

    /// Save a timeline under `name`, overwriting any existing preset.
    ///
    /// Write-through: the in-memory dict is only updated after the
    /// persistence call succeeds.
    pub fn save(&mut self, name: &str, config: CustomRgbConfig) -> bool {
        if let Err(e) = self.store.save_preset(self.config.device, name, &config) {
            warn!(preset = %name, error = %e, "Failed to save preset");
            return false;
        }
        self.presets.insert(name.to_string(), config);
        info!(preset = %name, "Preset saved");
        self.listeners.notify();
        true
    }

    /// Delete a preset by name.
    ///
    /// Deleting the active preset drops the device out of zoned mode:
    /// settings fall back to solid and are reapplied.
    pub fn delete(&mut self, name: &str, settings: &mut SettingsService) -> bool {
        if !self.presets.contains_key(name) {
            warn!(preset = %name, "Delete of unknown preset");
            return false;
        }
        if let Err(e) = self.store.delete_preset(self.config.device, name) {
            warn!(preset = %name, error = %e, "Failed to delete preset");
            return false;
        }
        self.presets.remove(name);
        info!(preset = %name, "Preset deleted");

        if settings.active_preset() == Some(name) {
            settings.set_active_preset(None);
            settings.set_mode(Mode::Solid);
            if let Err(e) = settings.apply_now() {
                warn!(error = %e, "Failed to reapply after deleting active preset");
            }
        }
        self.listeners.notify();
        true
    }

    /// Apply a preset to the device and mark it active.
    ///
    /// Fails fast on unknown names. On success the global mode switches to
    /// zoned and the active-preset pointer is persisted.
    pub fn apply(&mut self, name: &str, settings: &mut SettingsService) -> bool {
        let Some(config) = self.presets.get(name) else {
            warn!(preset = %name, "Apply of unknown preset");
            return false;
        };
        if let Err(e) = self.backend.set_zoned_rgb(self.config.device, config) {
            warn!(preset = %name, error = %e, "Failed to apply preset");
            return false;
        }
        settings.set_mode(Mode::Zoned);
        settings.set_active_preset(Some(name.to_string()));
        info!(preset = %name, "Preset applied");
        self.listeners.notify();
        true
    }

    // === Editing ===

    /// Begin editing: a deep copy of `name` when it exists, else a fresh
    /// default timeline. Only one timeline is edited at a time per
    /// category.
    pub fn start_editing(&mut self, name: Option<&str>) {
        match name.and_then(|n| self.presets.get(n).map(|p| (n, p.clone()))) {
            Some((n, preset)) => self.editor.start_from(n, &preset),
            None => self.editor.start_fresh(),
        }
    }

    /// The editing state machine, for zone/speed/brightness mutations.
    pub fn editor(&mut self) -> &mut TimelineEditor {
        &mut self.editor
    }

    pub fn editing(&self) -> Option<&CustomRgbConfig> {
        self.editor.current()
    }

    /// Rotate-copy a frame of the editing timeline using this category's
    /// layout.
    pub fn rotate_copy(&mut self, frame: usize, clockwise: bool) -> Result<bool> {
        let layout = layout::layout_for(self.config.device);
        self.editor.rotate_copy(frame, clockwise, layout)
    }

    /// Discard the editing slot.
    pub fn cancel_editing(&mut self) {
        self.editor.cancel();
    }

    /// Send the editing timeline to the device for live feedback, without
    /// touching the persisted dict.
    pub fn preview_current(&self) -> bool {
        let Some(config) = self.editor.current() else {
            warn!("Preview requested with no editing session");
            return false;
        };
        match self.backend.set_zoned_rgb(self.config.device, config) {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "Preview apply failed");
                false
            }
        }
    }

    /// Preview one frame of the editing timeline in isolation.
    pub fn preview_frame(&self, frame: usize) -> bool {
        let Some(config) = self.editor.current() else {
            warn!("Preview requested with no editing session");
            return false;
        };
        let slice = match config.frame_slice(frame) {
            Ok(slice) => slice,
            Err(e) => {
                warn!(error = %e, "Preview frame out of range");
                return false;
            }
        };
        match self.backend.set_zoned_rgb(self.config.device, &slice) {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "Preview apply failed");
                false
            }
        }
    }

    /// Promote the editing timeline to a named preset.
    ///
    /// Saving under a different name than the session started from is a
    /// rename: the old entry is deleted only after the new one is saved
    /// (no partial rename). If the saved or renamed preset is the active
    /// one, it is immediately reapplied so live output matches the saved
    /// data, and the active-preset pointer follows the new name. On any
    /// failure the editing session stays open and state is unchanged.
    pub fn save_current(&mut self, name: &str, settings: &mut SettingsService) -> bool {
        let Some(config) = self.editor.current().cloned() else {
            warn!("Save requested with no editing session");
            return false;
        };
        let origin = self.editor.origin().map(ToOwned::to_owned);

        if let Err(e) = self.store.save_preset(self.config.device, name, &config) {
            warn!(preset = %name, error = %e, "Failed to save preset");
            return false;
        }
        self.presets.insert(name.to_string(), config.clone());

        let renamed_from = origin.as_deref().filter(|&o| o != name);
        if let Some(old) = renamed_from {
            if let Err(e) = self.store.delete_preset(self.config.device, old) {
                // The new name is saved; losing the rename cleanup leaves a
                // stale entry rather than lost data. Keep both and report
                // failure.
                warn!(preset = %old, error = %e, "Failed to delete renamed preset");
                self.listeners.notify();
                return false;
            }
            self.presets.remove(old);
            debug!(from = %old, to = %name, "Preset renamed");
        }

        let was_active = match settings.active_preset() {
            Some(active) => active == name || renamed_from == Some(active),
            None => false,
        };
        if was_active {
            if let Err(e) = self.backend.set_zoned_rgb(self.config.device, &config) {
                warn!(preset = %name, error = %e, "Failed to reapply active preset");
            }
            settings.set_active_preset(Some(name.to_string()));
        }

        self.editor.cancel();
        info!(preset = %name, "Editing session saved");
        self.listeners.notify();
        true
    }
}
