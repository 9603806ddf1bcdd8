//! Layered lighting settings: global default, per-application, and
//! per-power-source overrides.
//!
//! [`SettingsService`] owns the whole settings tree, resolves which
//! [`RgbSetting`] the current context points at, and funnels every read and
//! write through that resolution. It is constructed once by the application
//! root and handed to consumers by reference; observers subscribe for
//! change broadcasts instead of polling.
//!
//! Resolution order for the effective setting:
//!
//! 1. The active application id, falling back to the reserved default id
//!    when the app has no override enabled.
//! 2. The app's `default_setting`, unless `ac_state_overwrite` is enabled.
//! 3. The AC or battery slot for the current power source; a slot that was
//!    never initialized falls back to `default_setting` rather than erroring.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::backend::{AppliedConfig, LightingBackend, Mode, SettingsStore};
use crate::color::{Hsv, Rgb};
use crate::error::{LightError, Result};
use crate::notify::{Listeners, SubscriptionId};

/// Reserved application id for the global fallback entry.
pub const DEFAULT_APP_ID: &str = "0";

/// Highest discrete hardware brightness step.
pub const BRIGHTNESS_LEVEL_MAX: u8 = 4;

/// Whether the device is drawing external power or running on battery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PowerState {
    Ac,
    Battery,
}

/// Lighting behavior while the device is suspended.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuspendMode {
    /// Keep the current lighting running.
    #[default]
    Keep,
    /// Turn all zones off on suspend.
    TurnOff,
}

/// One resolved lighting configuration.
///
/// RGB tuples are derived from the HSV fields on read, never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RgbSetting {
    pub mode: Mode,
    /// Primary color.
    pub primary: Hsv,
    /// Second color for two-color effects (modes whose capabilities report
    /// `color2`).
    #[serde(default)]
    pub primary2: Option<Hsv>,
    /// Independent color for the secondary zone group, when set.
    #[serde(default)]
    pub secondary: Option<Hsv>,
    /// Effect speed, 0 (slowest) to 20 (fastest).
    pub speed: u8,
    /// Discrete hardware brightness step, 0 to [`BRIGHTNESS_LEVEL_MAX`].
    pub brightness_level: u8,
}

impl Default for RgbSetting {
    fn default() -> Self {
        Self {
            mode: Mode::Solid,
            primary: Hsv::new(0.0, 100.0, 100.0),
            primary2: None,
            secondary: None,
            speed: 10,
            brightness_level: 3,
        }
    }
}

impl RgbSetting {
    pub fn primary_rgb(&self) -> Rgb {
        self.primary.to_rgb()
    }

    pub fn secondary_rgb(&self) -> Option<Rgb> {
        self.secondary.map(Hsv::to_rgb)
    }

    /// The wire payload for the non-zoned apply call.
    pub fn to_applied(&self) -> AppliedConfig {
        AppliedConfig {
            mode: self.mode,
            primary: self.primary_rgb(),
            primary2: self.primary2.map(Hsv::to_rgb),
            secondary: self.secondary_rgb(),
            speed: self.speed,
            brightness_level: self.brightness_level,
        }
    }
}

/// Per-application settings bundle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppRgbData {
    /// Whether this app's settings override the global default.
    #[serde(default)]
    pub overwrite: bool,
    /// Whether AC/battery slots override `default_setting`.
    #[serde(default)]
    pub ac_state_overwrite: bool,
    pub default_setting: RgbSetting,
    /// Null until `ac_state_overwrite` is first enabled; then cloned from
    /// `default_setting` and diverging independently.
    #[serde(default)]
    pub ac_setting: Option<RgbSetting>,
    #[serde(default)]
    pub bat_setting: Option<RgbSetting>,
}

impl AppRgbData {
    fn from_default(default_setting: RgbSetting) -> Self {
        Self {
            default_setting,
            ..Self::default()
        }
    }

    fn slot(&self, power: PowerState) -> Option<&RgbSetting> {
        match power {
            PowerState::Ac => self.ac_setting.as_ref(),
            PowerState::Battery => self.bat_setting.as_ref(),
        }
    }

    fn slot_mut(&mut self, power: PowerState) -> Option<&mut RgbSetting> {
        match power {
            PowerState::Ac => self.ac_setting.as_mut(),
            PowerState::Battery => self.bat_setting.as_mut(),
        }
    }
}

/// Global settings root, loaded once at startup and written back after
/// every mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingsData {
    pub per_app: BTreeMap<String, AppRgbData>,
    #[serde(default)]
    pub suspend_mode: SuspendMode,
    #[serde(default = "default_true")]
    pub power_led_enabled: bool,
    #[serde(default)]
    pub power_led_suspend_off: bool,
    /// Name of the preset currently applied in zoned mode, if any.
    #[serde(default)]
    pub active_preset: Option<String>,
}

const fn default_true() -> bool {
    true
}

impl Default for SettingsData {
    fn default() -> Self {
        let mut data = Self {
            per_app: BTreeMap::new(),
            suspend_mode: SuspendMode::default(),
            power_led_enabled: true,
            power_led_suspend_off: false,
            active_preset: None,
        };
        data.ensure_defaults();
        data
    }
}

impl SettingsData {
    /// Guarantee the reserved default-app entry exists.
    pub fn ensure_defaults(&mut self) {
        self.per_app
            .entry(DEFAULT_APP_ID.to_string())
            .or_insert_with(|| AppRgbData {
                overwrite: true,
                ..AppRgbData::default()
            });
    }
}

/// The settings resolver and single source of truth for the tree.
pub struct SettingsService {
    data: SettingsData,
    store: Arc<dyn SettingsStore>,
    backend: Arc<dyn LightingBackend>,
    current_app: String,
    power: PowerState,
    /// Last hue written while the color was not gray/black; restored by the
    /// UI when saturation or value comes back from zero.
    remembered_hue: f32,
    listeners: Listeners,
}

impl SettingsService {
    /// Load settings from the store and build the service.
    ///
    /// A failing load is treated as "nothing saved yet": defaults are used
    /// and the failure is logged, matching the store's behavior for presets.
    pub fn new(store: Arc<dyn SettingsStore>, backend: Arc<dyn LightingBackend>) -> Self {
        let mut data = store.load_settings().unwrap_or_else(|e| {
            warn!(error = %e, "Failed to load settings, starting from defaults");
            SettingsData::default()
        });
        data.ensure_defaults();

        let mut service = Self {
            data,
            store,
            backend,
            current_app: DEFAULT_APP_ID.to_string(),
            power: PowerState::Ac,
            remembered_hue: 0.0,
            listeners: Listeners::new(),
        };
        service.remember_meaningful_hue();
        service
    }

    pub fn subscribe(&self, callback: impl Fn() + Send + Sync + 'static) -> SubscriptionId {
        self.listeners.subscribe(callback)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.listeners.unsubscribe(id);
    }

    pub fn data(&self) -> &SettingsData {
        &self.data
    }

    // === Context signals (externally owned, only read here) ===

    pub fn current_app(&self) -> &str {
        &self.current_app
    }

    /// Switch the active application context and re-resolve.
    pub fn set_current_app(&mut self, app_id: &str) {
        if self.current_app != app_id {
            debug!(app = %app_id, "Active application changed");
            self.current_app = app_id.to_string();
            self.listeners.notify();
        }
    }

    pub fn power_state(&self) -> PowerState {
        self.power
    }

    /// Switch the power-source context and re-resolve.
    pub fn set_power_state(&mut self, power: PowerState) {
        if self.power != power {
            debug!(?power, "Power state changed");
            self.power = power;
            self.listeners.notify();
        }
    }

    // === Resolution ===

    fn resolved_app_id(&self) -> String {
        match self.data.per_app.get(&self.current_app) {
            Some(app) if app.overwrite => self.current_app.clone(),
            _ => DEFAULT_APP_ID.to_string(),
        }
    }

    fn resolved_app(&self) -> &AppRgbData {
        self.data
            .per_app
            .get(&self.resolved_app_id())
            .expect("default app entry always present")
    }

    /// The effective setting for the current app and power state.
    pub fn current(&self) -> &RgbSetting {
        let app = self.resolved_app();
        if !app.ac_state_overwrite {
            return &app.default_setting;
        }
        app.slot(self.power).unwrap_or(&app.default_setting)
    }

    fn current_mut(&mut self) -> &mut RgbSetting {
        let id = self.resolved_app_id();
        let power = self.power;
        let app = self
            .data
            .per_app
            .get_mut(&id)
            .expect("default app entry always present");
        if !app.ac_state_overwrite || app.slot(power).is_none() {
            return &mut app.default_setting;
        }
        app.slot_mut(power).expect("slot presence checked above")
    }

    // === Override management ===

    /// Enable or disable per-app override for `app_id`, creating the entry
    /// (cloned from the global default) on first touch.
    pub fn set_app_overwrite(&mut self, app_id: &str, enabled: bool) {
        let template = self
            .data
            .per_app
            .get(DEFAULT_APP_ID)
            .expect("default app entry always present")
            .default_setting
            .clone();
        let entry = self
            .data
            .per_app
            .entry(app_id.to_string())
            .or_insert_with(|| AppRgbData::from_default(template));
        entry.overwrite = enabled;
        debug!(app = %app_id, enabled, "Per-app override toggled");
        self.after_write();
    }

    /// Enable or disable the AC/battery split for the resolved app.
    ///
    /// On first enable both slots are cloned from `default_setting` —
    /// exactly once; afterwards they diverge independently and survive the
    /// toggle being switched off and on.
    pub fn set_ac_state_overwrite(&mut self, enabled: bool) {
        let id = self.resolved_app_id();
        let app = self
            .data
            .per_app
            .get_mut(&id)
            .expect("default app entry always present");
        app.ac_state_overwrite = enabled;
        if enabled && app.ac_setting.is_none() && app.bat_setting.is_none() {
            app.ac_setting = Some(app.default_setting.clone());
            app.bat_setting = Some(app.default_setting.clone());
            debug!(app = %id, "Initialized AC/battery slots from default setting");
        }
        self.after_write();
    }

    // === Typed accessors, all funneling through the resolved setting ===

    pub fn mode(&self) -> Mode {
        self.current().mode
    }

    pub fn set_mode(&mut self, mode: Mode) {
        self.current_mut().mode = mode;
        self.after_write();
    }

    pub fn hue(&self) -> f32 {
        self.current().primary.hue
    }

    pub fn set_hue(&mut self, hue: f32) -> Result<()> {
        if !(0.0..=360.0).contains(&hue) {
            return Err(LightError::InvalidHue { value: hue });
        }
        self.current_mut().primary.hue = hue.rem_euclid(360.0);
        self.after_write();
        Ok(())
    }

    pub fn saturation(&self) -> f32 {
        self.current().primary.saturation
    }

    pub fn set_saturation(&mut self, saturation: f32) -> Result<()> {
        validate_percent("saturation", saturation)?;
        self.current_mut().primary.saturation = saturation;
        self.after_write();
        Ok(())
    }

    pub fn brightness(&self) -> f32 {
        self.current().primary.value
    }

    pub fn set_brightness(&mut self, brightness: f32) -> Result<()> {
        validate_percent("brightness", brightness)?;
        self.current_mut().primary.value = brightness;
        self.after_write();
        Ok(())
    }

    pub fn speed(&self) -> u8 {
        self.current().speed
    }

    pub fn set_speed(&mut self, speed: u8) -> Result<()> {
        if speed > crate::timeline::SPEED_MAX {
            return Err(LightError::InvalidSpeed { value: speed });
        }
        self.current_mut().speed = speed;
        self.after_write();
        Ok(())
    }

    pub fn brightness_level(&self) -> u8 {
        self.current().brightness_level
    }

    pub fn set_brightness_level(&mut self, level: u8) -> Result<()> {
        if level > BRIGHTNESS_LEVEL_MAX {
            return Err(LightError::InvalidPercent {
                field: "brightness level",
                value: f32::from(level),
            });
        }
        self.current_mut().brightness_level = level;
        self.after_write();
        Ok(())
    }

    pub fn set_primary2(&mut self, color: Option<Hsv>) -> Result<()> {
        if let Some(hsv) = &color {
            validate_hsv(hsv)?;
        }
        self.current_mut().primary2 = color;
        self.after_write();
        Ok(())
    }

    pub fn set_secondary(&mut self, color: Option<Hsv>) -> Result<()> {
        if let Some(hsv) = &color {
            validate_hsv(hsv)?;
        }
        self.current_mut().secondary = color;
        self.after_write();
        Ok(())
    }

    /// The last hue written while saturation and value were both nonzero.
    pub fn remembered_hue(&self) -> f32 {
        self.remembered_hue
    }

    // === Global fields ===

    pub fn active_preset(&self) -> Option<&str> {
        self.data.active_preset.as_deref()
    }

    pub fn set_active_preset(&mut self, name: Option<String>) {
        self.data.active_preset = name;
        self.after_write();
    }

    pub fn set_suspend_mode(&mut self, mode: SuspendMode) {
        self.data.suspend_mode = mode;
        self.after_write();
    }

    pub fn set_power_led_enabled(&mut self, enabled: bool) {
        self.data.power_led_enabled = enabled;
        self.after_write();
    }

    pub fn set_power_led_suspend_off(&mut self, off: bool) {
        self.data.power_led_suspend_off = off;
        self.after_write();
    }

    // === Apply ===

    /// Push the effective configuration to the driver.
    ///
    /// Zoned-mode timelines are applied by the preset store, so this is a
    /// no-op in that mode.
    pub fn apply_now(&self) -> Result<()> {
        if self.mode() == Mode::Zoned {
            return Ok(());
        }
        self.backend.apply_configuration(&self.current().to_applied())
    }

    fn remember_meaningful_hue(&mut self) {
        let primary = self.current().primary;
        if primary.saturation > 0.0 && primary.value > 0.0 {
            self.remembered_hue = primary.hue;
        }
    }

    /// Write-back plus broadcast after every mutation. Persistence is
    /// fire-and-forget: a failing write is logged and the in-memory tree
    /// stays authoritative.
    fn after_write(&mut self) {
        self.remember_meaningful_hue();
        if let Err(e) = self.store.save_settings(&self.data) {
            warn!(error = %e, "Failed to persist settings");
        }
        self.listeners.notify();
    }
}

fn validate_percent(field: &'static str, value: f32) -> Result<()> {
    if (0.0..=100.0).contains(&value) {
        Ok(())
    } else {
        Err(LightError::InvalidPercent { field, value })
    }
}

fn validate_hsv(hsv: &Hsv) -> Result<()> {
    if !(0.0..=360.0).contains(&hsv.hue) {
        return Err(LightError::InvalidHue { value: hsv.hue });
    }
    validate_percent("saturation", hsv.saturation)?;
    validate_percent("brightness", hsv.value)
}
