//! Capability and wire types for the lighting backend boundary.

use serde::{Deserialize, Serialize};

use crate::color::Rgb;
use crate::layout::DeviceKind;

/// Lighting mode identifier.
///
/// `Zoned` is the custom-RGB mode driven by keyframe presets; the other
/// modes are computed by the driver from a one- or two-color configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Disabled,
    #[default]
    Solid,
    Breathing,
    Rainbow,
    Zoned,
}

impl Mode {
    pub const ALL: [Self; 5] = [
        Self::Disabled,
        Self::Solid,
        Self::Breathing,
        Self::Rainbow,
        Self::Zoned,
    ];

    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Disabled => "disabled",
            Self::Solid => "solid",
            Self::Breathing => "breathing",
            Self::Rainbow => "rainbow",
            Self::Zoned => "zoned",
        }
    }

    /// Which controls are meaningful for this mode.
    pub const fn capabilities(self) -> ModeCapabilities {
        match self {
            Self::Disabled => ModeCapabilities {
                color: false,
                color2: false,
                speed: false,
                brightness_level: false,
                zones: &[],
            },
            Self::Solid => ModeCapabilities {
                color: true,
                color2: false,
                speed: false,
                brightness_level: true,
                zones: &["left_stick", "right_stick"],
            },
            Self::Breathing => ModeCapabilities {
                color: true,
                color2: true,
                speed: true,
                brightness_level: true,
                zones: &["left_stick", "right_stick"],
            },
            Self::Rainbow => ModeCapabilities {
                color: false,
                color2: false,
                speed: true,
                brightness_level: true,
                zones: &[],
            },
            Self::Zoned => ModeCapabilities {
                color: false,
                color2: false,
                speed: true,
                brightness_level: false,
                zones: &["left_stick", "right_stick", "center"],
            },
        }
    }
}

/// Controls and zone selectors the UI should expose for a mode.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ModeCapabilities {
    pub color: bool,
    pub color2: bool,
    pub speed: bool,
    pub brightness_level: bool,
    pub zones: &'static [&'static str],
}

/// What the connected hardware can do, as reported by the driver.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DeviceCapabilities {
    pub device: DeviceKind,
    pub zones: usize,
    pub custom_rgb: bool,
}

impl DeviceCapabilities {
    pub const fn for_device(device: DeviceKind) -> Self {
        Self {
            device,
            zones: device.zone_count(),
            custom_rgb: true,
        }
    }
}

/// One resolved configuration on its way to the driver.
///
/// This is the payload of the non-zoned apply call: mode, the primary color
/// (and the optional second primary for two-color effects), the optional
/// secondary-zone color, speed, and the discrete brightness level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AppliedConfig {
    pub mode: Mode,
    pub primary: Rgb,
    pub primary2: Option<Rgb>,
    pub secondary: Option<Rgb>,
    pub speed: u8,
    pub brightness_level: u8,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_capabilities_gate_controls() {
        assert!(Mode::Solid.capabilities().color);
        assert!(!Mode::Solid.capabilities().speed);
        assert!(Mode::Breathing.capabilities().color2);
        assert!(!Mode::Rainbow.capabilities().color);
        assert!(Mode::Zoned.capabilities().zones.contains(&"center"));
        assert!(Mode::Disabled.capabilities().zones.is_empty());
    }

    #[test]
    fn test_device_capabilities_match_layout() {
        let caps = DeviceCapabilities::for_device(DeviceKind::MsiClaw);
        assert_eq!(caps.zones, 9);
        assert!(caps.custom_rgb);
    }

    #[test]
    fn test_mode_serde_snake_case() {
        assert_eq!(serde_json::to_string(&Mode::Zoned).unwrap(), "\"zoned\"");
        let parsed: Mode = serde_json::from_str("\"breathing\"").unwrap();
        assert_eq!(parsed, Mode::Breathing);
    }
}
