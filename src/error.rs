//! Error types for lighting control operations.

use thiserror::Error;

/// Primary error type for lighting operations.
///
/// Validation variants indicate caller contract violations (out-of-range
/// values, bad indices). Boundary variants (`Store`, `Backend`) wrap failures
/// from the persistence and device-apply collaborators. Capacity conditions
/// (keyframe cap reached, single-keyframe floor) are reported as `bool`
/// no-ops by the operations themselves and never appear here.
#[derive(Error, Debug)]
pub enum LightError {
    // Validation errors
    #[error("Invalid hue {value}: must be 0-360")]
    InvalidHue { value: f32 },

    #[error("Invalid {field} {value}: must be 0-100")]
    InvalidPercent { field: &'static str, value: f32 },

    #[error("Invalid speed {value}: must be 0-20")]
    InvalidSpeed { value: u8 },

    #[error("Invalid color '{value}': expected 6-digit hex like ff00aa")]
    InvalidColor { value: String },

    #[error("Invalid zone index {index}: layout has {count} zones")]
    InvalidZone { index: usize, count: usize },

    #[error("Invalid keyframe index {index}: timeline has {count} keyframes")]
    InvalidFrame { index: usize, count: usize },

    #[error("Zone count mismatch: layout has {expected} zones, keyframe has {actual}")]
    ZoneCountMismatch { expected: usize, actual: usize },

    // Not-found errors
    #[error("Preset not found: {name}")]
    PresetNotFound { name: String },

    #[error("No timeline is being edited")]
    NotEditing,

    #[error("Unknown application id: {id}")]
    UnknownApp { id: String },

    // External-boundary failures
    #[error("Settings store error: {0}")]
    Store(String),

    #[error("Settings parse error: {0}")]
    SettingsParse(String),

    #[error("Lighting backend error: {0}")]
    Backend(String),

    // General errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl LightError {
    /// Returns true if the error is recoverable by the user.
    pub const fn is_user_recoverable(&self) -> bool {
        matches!(
            self,
            Self::InvalidHue { .. }
                | Self::InvalidPercent { .. }
                | Self::InvalidSpeed { .. }
                | Self::InvalidColor { .. }
                | Self::PresetNotFound { .. }
                | Self::UnknownApp { .. }
        )
    }

    /// Returns a suggestion for how to fix the error.
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::InvalidHue { .. } => Some("Use a hue between 0 and 360 degrees"),
            Self::InvalidPercent { .. } => Some("Use a value between 0 and 100"),
            Self::InvalidSpeed { .. } => Some("Use a speed between 0 and 20"),
            Self::InvalidColor { .. } => Some("Use a hex color like ff0000 or #00ff00"),
            Self::PresetNotFound { .. } => Some("Run: zrgb preset list"),
            _ => None,
        }
    }
}

/// Convenience type alias for Results using LightError.
pub type Result<T> = std::result::Result<T, LightError>;

/// Extension trait for adding context to errors.
pub trait ResultExt<T> {
    fn with_context<F, S>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> S,
        S: Into<String>;
}

impl<T, E: std::error::Error> ResultExt<T> for std::result::Result<T, E> {
    fn with_context<F, S>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> S,
        S: Into<String>,
    {
        self.map_err(|e| LightError::Other(format!("{}: {e}", f().into())))
    }
}
