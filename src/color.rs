//! HSV/RGB conversion and perceptual contrast math.
//!
//! All functions here are pure and total over their documented domains.
//! Out-of-range inputs are caller contract violations; values are clamped
//! and flagged with a `debug_assert!` rather than corrupting downstream
//! device writes.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{LightError, Result};

/// A device-ready color: one byte per channel, no alpha.
///
/// Serializes as a 3-element array (`[r, g, b]`), the shape the zoned-apply
/// boundary expects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const BLACK: Self = Self(0, 0, 0);
    pub const WHITE: Self = Self(255, 255, 255);

    /// Parse a hex color string like `ff0000` or `#00ff00`.
    pub fn from_hex(s: &str) -> Result<Self> {
        let hex = s.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(LightError::InvalidColor {
                value: s.to_string(),
            });
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16);
        match (channel(0), channel(2), channel(4)) {
            (Ok(r), Ok(g), Ok(b)) => Ok(Self(r, g, b)),
            _ => Err(LightError::InvalidColor {
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

/// An HSV triple: hue in degrees `[0, 360)`, saturation and value in
/// percent `[0, 100]`.
///
/// Hue is undefined for gray (saturation 0) and black (value 0); conversions
/// report hue 0 there. Callers that need to survive a trip through gray keep
/// the last meaningful hue separately (see `settings`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hsv {
    pub hue: f32,
    pub saturation: f32,
    pub value: f32,
}

impl Hsv {
    pub const fn new(hue: f32, saturation: f32, value: f32) -> Self {
        Self {
            hue,
            saturation,
            value,
        }
    }

    pub fn to_rgb(self) -> Rgb {
        hsv_to_rgb(self.hue, self.saturation, self.value)
    }
}

/// Convert HSV to RGB.
///
/// Hue 360 normalizes to 0. Output channels are rounded to the nearest
/// integer in `[0, 255]`.
pub fn hsv_to_rgb(h: f32, s: f32, v: f32) -> Rgb {
    debug_assert!((0.0..=360.0).contains(&h), "hue out of range: {h}");
    debug_assert!((0.0..=100.0).contains(&s), "saturation out of range: {s}");
    debug_assert!((0.0..=100.0).contains(&v), "value out of range: {v}");

    let h = h.rem_euclid(360.0);
    let s = (s / 100.0).clamp(0.0, 1.0);
    let v = (v / 100.0).clamp(0.0, 1.0);

    let c = v * s;
    let x = c * (1.0 - ((h / 60.0) % 2.0 - 1.0).abs());
    let m = v - c;

    let (r, g, b) = match h {
        h if h < 60.0 => (c, x, 0.0),
        h if h < 120.0 => (x, c, 0.0),
        h if h < 180.0 => (0.0, c, x),
        h if h < 240.0 => (0.0, x, c),
        h if h < 300.0 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };

    let to_byte = |ch: f32| ((ch + m) * 255.0).round().clamp(0.0, 255.0) as u8;
    Rgb(to_byte(r), to_byte(g), to_byte(b))
}

/// Convert RGB to HSV.
///
/// When `r == g == b` the hue is undefined; by convention 0 is returned.
pub fn rgb_to_hsv(color: Rgb) -> Hsv {
    let r = f32::from(color.0) / 255.0;
    let g = f32::from(color.1) / 255.0;
    let b = f32::from(color.2) / 255.0;

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    let hue = if delta == 0.0 {
        0.0
    } else if max == r {
        (60.0 * ((g - b) / delta)).rem_euclid(360.0)
    } else if max == g {
        60.0 * ((b - r) / delta) + 120.0
    } else {
        60.0 * ((r - g) / delta) + 240.0
    };

    let saturation = if max == 0.0 { 0.0 } else { delta / max * 100.0 };
    Hsv::new(hue, saturation, max * 100.0)
}

/// sRGB relative luminance with standard coefficients.
///
/// Each channel is gamma-expanded (linear below 0.03928 normalized, power
/// curve with exponent 2.4 above) before weighting.
pub fn relative_luminance(color: Rgb) -> f64 {
    fn expand(byte: u8) -> f64 {
        let c = f64::from(byte) / 255.0;
        if c <= 0.03928 {
            c / 12.92
        } else {
            ((c + 0.055) / 1.055).powf(2.4)
        }
    }

    0.2126 * expand(color.0) + 0.7152 * expand(color.1) + 0.0722 * expand(color.2)
}

/// Legible overlay color for content drawn on a colored swatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Contrast {
    Black,
    White,
}

impl Contrast {
    pub const fn rgb(self) -> Rgb {
        match self {
            Self::Black => Rgb::BLACK,
            Self::White => Rgb::WHITE,
        }
    }
}

/// Pick black or white for text/number overlays on `background`.
pub fn contrast_color(background: Rgb) -> Contrast {
    if relative_luminance(background) > 0.5 {
        Contrast::Black
    } else {
        Contrast::White
    }
}

/// Component-wise linear interpolation between two colors.
///
/// `t` is clamped to `[0, 1]`; channels round to the nearest integer.
pub fn lerp(a: Rgb, b: Rgb, t: f32) -> Rgb {
    let t = t.clamp(0.0, 1.0);
    let mix = |x: u8, y: u8| (f32::from(x) + (f32::from(y) - f32::from(x)) * t).round() as u8;
    Rgb(mix(a.0, b.0), mix(a.1, b.1), mix(a.2, b.2))
}
