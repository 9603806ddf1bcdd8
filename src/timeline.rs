//! Keyframe timelines and the single-slot editing state machine.
//!
//! A timeline is an ordered list of complete per-zone color snapshots plus
//! playback speed and a brightness ceiling. [`TimelineEditor`] holds the one
//! timeline a user may edit at a time per device category; it never touches
//! persistence itself — promotion to a named preset goes through
//! `preset::PresetStore`.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::color::Rgb;
use crate::error::{LightError, Result};
use crate::layout::{self, Layout};

/// Slowest-to-fastest playback speed scale.
pub const SPEED_MAX: u8 = 20;
/// Speed for freshly created timelines.
pub const DEFAULT_SPEED: u8 = 10;
/// Brightness for freshly created timelines.
pub const DEFAULT_BRIGHTNESS: u8 = 100;

/// A complete snapshot of colors for every zone at one point in an
/// animation. Never sparse: the length always equals the owning device's
/// zone count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Keyframe(pub Vec<Rgb>);

impl Keyframe {
    /// An all-black frame for a device with `zone_count` zones.
    pub fn black(zone_count: usize) -> Self {
        Self(vec![Rgb::BLACK; zone_count])
    }

    pub fn zone_count(&self) -> usize {
        self.0.len()
    }

    pub fn zones(&self) -> &[Rgb] {
        &self.0
    }
}

/// A looping multi-zone animation: keyframes plus speed and brightness.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomRgbConfig {
    /// Playback speed, 0 (slowest) to 20 (fastest).
    pub speed: u8,
    /// Output brightness ceiling in percent, applied after interpolation.
    pub brightness: u8,
    /// At least one keyframe, at most the device category's cap.
    pub keyframes: Vec<Keyframe>,
}

impl CustomRgbConfig {
    /// The default editing starting point: one all-black keyframe.
    pub fn fresh(zone_count: usize) -> Self {
        Self {
            speed: DEFAULT_SPEED,
            brightness: DEFAULT_BRIGHTNESS,
            keyframes: vec![Keyframe::black(zone_count)],
        }
    }

    pub fn keyframe_count(&self) -> usize {
        self.keyframes.len()
    }

    /// A single-frame timeline reusing this one's speed and brightness,
    /// used to preview one frame in isolation.
    pub fn frame_slice(&self, index: usize) -> Result<Self> {
        let frame = self
            .keyframes
            .get(index)
            .ok_or(LightError::InvalidFrame {
                index,
                count: self.keyframes.len(),
            })?
            .clone();
        Ok(Self {
            speed: self.speed,
            brightness: self.brightness,
            keyframes: vec![frame],
        })
    }
}

/// The single in-memory "currently editing" timeline for one device
/// category.
///
/// Capacity-bounded operations (`add_keyframe`, `delete_keyframe`,
/// `rotate_copy`) report refusal as `false` rather than an error: the cap
/// and the single-frame floor are expected conditions the UI disables
/// controls for. Index violations are errors — they indicate a bug in the
/// caller.
#[derive(Debug)]
pub struct TimelineEditor {
    zone_count: usize,
    max_keyframes: usize,
    session: Option<EditSession>,
}

#[derive(Debug)]
struct EditSession {
    config: CustomRgbConfig,
    /// Preset name this session was cloned from, if any. Saving under a
    /// different name is a rename.
    origin: Option<String>,
}

impl TimelineEditor {
    pub fn new(zone_count: usize, max_keyframes: usize) -> Self {
        Self {
            zone_count,
            max_keyframes,
            session: None,
        }
    }

    /// Begin editing a fresh default timeline.
    pub fn start_fresh(&mut self) {
        debug!(zones = self.zone_count, "Starting fresh timeline edit");
        self.session = Some(EditSession {
            config: CustomRgbConfig::fresh(self.zone_count),
            origin: None,
        });
    }

    /// Begin editing a deep copy of an existing preset.
    ///
    /// The editing slot owns an independent clone; mutations never alias
    /// the stored preset.
    pub fn start_from(&mut self, name: &str, preset: &CustomRgbConfig) {
        debug!(preset = %name, "Starting timeline edit from preset");
        self.session = Some(EditSession {
            config: preset.clone(),
            origin: Some(name.to_string()),
        });
    }

    pub fn is_editing(&self) -> bool {
        self.session.is_some()
    }

    /// The timeline currently being edited.
    pub fn current(&self) -> Option<&CustomRgbConfig> {
        self.session.as_ref().map(|s| &s.config)
    }

    /// Name of the preset this session started from.
    pub fn origin(&self) -> Option<&str> {
        self.session.as_ref().and_then(|s| s.origin.as_deref())
    }

    /// Replace one zone's color in one keyframe.
    pub fn update_zone_color(&mut self, frame: usize, zone: usize, color: Rgb) -> Result<()> {
        let session = self.session.as_mut().ok_or(LightError::NotEditing)?;
        let count = session.config.keyframes.len();
        let keyframe = session
            .config
            .keyframes
            .get_mut(frame)
            .ok_or(LightError::InvalidFrame { index: frame, count })?;
        let slot = keyframe.0.get_mut(zone).ok_or(LightError::InvalidZone {
            index: zone,
            count: self.zone_count,
        })?;
        trace!(frame, zone, %color, "Updating zone color");
        *slot = color;
        Ok(())
    }

    /// Append a keyframe: a copy of `copy_from` when given and valid,
    /// otherwise all-black. Returns `false` once the cap is reached.
    pub fn add_keyframe(&mut self, copy_from: Option<usize>) -> bool {
        let Some(session) = self.session.as_mut() else {
            return false;
        };
        if session.config.keyframes.len() >= self.max_keyframes {
            debug!(cap = self.max_keyframes, "Keyframe cap reached, add refused");
            return false;
        }
        let frame = copy_from
            .and_then(|i| session.config.keyframes.get(i).cloned())
            .unwrap_or_else(|| Keyframe::black(self.zone_count));
        session.config.keyframes.push(frame);
        true
    }

    /// Remove one keyframe. Returns `false` when only one keyframe remains
    /// (the timeline must never become empty) or the index is out of range.
    pub fn delete_keyframe(&mut self, frame: usize) -> bool {
        let Some(session) = self.session.as_mut() else {
            return false;
        };
        if session.config.keyframes.len() <= 1 {
            debug!("Single-keyframe floor reached, delete refused");
            return false;
        }
        if frame >= session.config.keyframes.len() {
            return false;
        }
        session.config.keyframes.remove(frame);
        true
    }

    /// Rotate a frame one step around its rings and append the result as a
    /// new keyframe. Copy-and-transform: the source frame is untouched.
    ///
    /// `Ok(false)` means the keyframe cap refused the append.
    pub fn rotate_copy(&mut self, frame: usize, clockwise: bool, layout: &Layout) -> Result<bool> {
        let session = self.session.as_ref().ok_or(LightError::NotEditing)?;
        let count = session.config.keyframes.len();
        let source = session
            .config
            .keyframes
            .get(frame)
            .ok_or(LightError::InvalidFrame { index: frame, count })?;
        let rotated = Keyframe(layout::rotate(source.zones(), clockwise, layout)?);

        let session = self.session.as_mut().expect("session checked above");
        if session.config.keyframes.len() >= self.max_keyframes {
            debug!(cap = self.max_keyframes, "Keyframe cap reached, rotate-copy refused");
            return Ok(false);
        }
        session.config.keyframes.push(rotated);
        Ok(true)
    }

    pub fn update_speed(&mut self, speed: u8) -> Result<()> {
        if speed > SPEED_MAX {
            return Err(LightError::InvalidSpeed { value: speed });
        }
        let session = self.session.as_mut().ok_or(LightError::NotEditing)?;
        session.config.speed = speed;
        Ok(())
    }

    pub fn update_brightness(&mut self, brightness: u8) -> Result<()> {
        if brightness > 100 {
            return Err(LightError::InvalidPercent {
                field: "brightness",
                value: f32::from(brightness),
            });
        }
        let session = self.session.as_mut().ok_or(LightError::NotEditing)?;
        session.config.brightness = brightness;
        Ok(())
    }

    /// Discard the editing slot without persisting.
    pub fn cancel(&mut self) {
        if self.session.take().is_some() {
            debug!("Timeline edit cancelled");
        }
    }

    /// End the session, yielding the edited timeline and its origin name.
    pub fn take(&mut self) -> Option<(CustomRgbConfig, Option<String>)> {
        self.session.take().map(|s| (s.config, s.origin))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{layout_for, DeviceKind};

    fn editor() -> TimelineEditor {
        TimelineEditor::new(8, 8)
    }

    #[test]
    fn test_fresh_timeline_defaults() {
        let mut ed = editor();
        ed.start_fresh();
        let config = ed.current().unwrap();
        assert_eq!(config.speed, DEFAULT_SPEED);
        assert_eq!(config.brightness, DEFAULT_BRIGHTNESS);
        assert_eq!(config.keyframe_count(), 1);
        assert_eq!(config.keyframes[0], Keyframe::black(8));
    }

    #[test]
    fn test_start_from_is_a_deep_copy() {
        let mut ed = editor();
        let preset = CustomRgbConfig::fresh(8);
        ed.start_from("wave", &preset);
        ed.update_zone_color(0, 0, Rgb(255, 0, 0)).unwrap();
        // The source preset is unchanged.
        assert_eq!(preset.keyframes[0].zones()[0], Rgb::BLACK);
        assert_eq!(ed.origin(), Some("wave"));
    }

    #[test]
    fn test_update_zone_color_bounds() {
        let mut ed = editor();
        ed.start_fresh();
        assert!(matches!(
            ed.update_zone_color(3, 0, Rgb::WHITE),
            Err(LightError::InvalidFrame { index: 3, count: 1 })
        ));
        assert!(matches!(
            ed.update_zone_color(0, 9, Rgb::WHITE),
            Err(LightError::InvalidZone { index: 9, count: 8 })
        ));
    }

    #[test]
    fn test_not_editing_is_an_error() {
        let mut ed = editor();
        assert!(matches!(
            ed.update_zone_color(0, 0, Rgb::WHITE),
            Err(LightError::NotEditing)
        ));
        assert!(!ed.add_keyframe(None));
    }

    #[test]
    fn test_add_keyframe_copies_and_caps() {
        let mut ed = TimelineEditor::new(4, 3);
        ed.start_fresh();
        ed.update_zone_color(0, 1, Rgb(0, 255, 0)).unwrap();

        assert!(ed.add_keyframe(Some(0)));
        assert_eq!(ed.current().unwrap().keyframes[1].zones()[1], Rgb(0, 255, 0));

        // Invalid copy source degrades to a black frame.
        assert!(ed.add_keyframe(Some(42)));
        assert_eq!(ed.current().unwrap().keyframes[2], Keyframe::black(4));

        // Cap reached: refused, length unchanged.
        assert!(!ed.add_keyframe(None));
        assert_eq!(ed.current().unwrap().keyframe_count(), 3);
    }

    #[test]
    fn test_delete_keyframe_floor() {
        let mut ed = editor();
        ed.start_fresh();
        assert!(!ed.delete_keyframe(0));
        ed.add_keyframe(None);
        assert!(ed.delete_keyframe(1));
        assert_eq!(ed.current().unwrap().keyframe_count(), 1);
        assert!(!ed.delete_keyframe(0));
    }

    #[test]
    fn test_delete_out_of_range_is_refused() {
        let mut ed = editor();
        ed.start_fresh();
        ed.add_keyframe(None);
        assert!(!ed.delete_keyframe(5));
        assert_eq!(ed.current().unwrap().keyframe_count(), 2);
    }

    #[test]
    fn test_rotate_copy_appends_transformed_frame() {
        let layout = layout_for(DeviceKind::LegionGo);
        let mut ed = editor();
        ed.start_fresh();
        ed.update_zone_color(0, 0, Rgb(255, 0, 0)).unwrap();

        assert!(ed.rotate_copy(0, true, layout).unwrap());
        let config = ed.current().unwrap();
        assert_eq!(config.keyframe_count(), 2);
        // Source frame untouched, copy rotated one step clockwise.
        assert_eq!(config.keyframes[0].zones()[0], Rgb(255, 0, 0));
        assert_eq!(config.keyframes[1].zones()[0], Rgb::BLACK);
        assert_eq!(config.keyframes[1].zones()[1], Rgb(255, 0, 0));
    }

    #[test]
    fn test_rotate_copy_respects_cap() {
        let layout = layout_for(DeviceKind::LegionGo);
        let mut ed = TimelineEditor::new(8, 1);
        ed.start_fresh();
        assert!(!ed.rotate_copy(0, true, layout).unwrap());
        assert_eq!(ed.current().unwrap().keyframe_count(), 1);
    }

    #[test]
    fn test_speed_and_brightness_validation() {
        let mut ed = editor();
        ed.start_fresh();
        ed.update_speed(20).unwrap();
        assert!(matches!(
            ed.update_speed(21),
            Err(LightError::InvalidSpeed { value: 21 })
        ));
        ed.update_brightness(0).unwrap();
        assert!(ed.update_brightness(101).is_err());
    }

    #[test]
    fn test_cancel_discards() {
        let mut ed = editor();
        ed.start_fresh();
        ed.cancel();
        assert!(!ed.is_editing());
        assert!(ed.take().is_none());
    }

    #[test]
    fn test_frame_slice_reuses_speed_and_brightness() {
        let mut config = CustomRgbConfig::fresh(4);
        config.speed = 5;
        config.brightness = 40;
        config.keyframes.push(Keyframe(vec![Rgb(1, 2, 3); 4]));

        let slice = config.frame_slice(1).unwrap();
        assert_eq!(slice.speed, 5);
        assert_eq!(slice.brightness, 40);
        assert_eq!(slice.keyframe_count(), 1);
        assert_eq!(slice.keyframes[0].zones()[0], Rgb(1, 2, 3));

        assert!(config.frame_slice(2).is_err());
    }
}
