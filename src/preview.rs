//! Color sampling and geometry for the live LED preview.
//!
//! This layer computes ring-gradient colors and LED draw positions; the
//! drawing surface itself lives outside the core. Brightness scaling here is
//! a second, independent stage applied to already-resolved RGB values after
//! frame interpolation — it is not the HSV value channel.

use crate::color::{self, Rgb};
use crate::error::Result;
use crate::layout::{self, Layout};

/// Sample a continuous gradient ring built from discrete zone LEDs.
///
/// Zones are sorted by angle; the two zones angularly bracketing
/// `target_angle` (with wrap-around at 0/360) are blended by the angular
/// fraction between them. With a single zone the ring is that zone's color.
pub fn interpolate_along_ring(target_angle: f32, zones: &[(f32, Rgb)]) -> Rgb {
    debug_assert!(!zones.is_empty(), "ring needs at least one zone");
    if zones.is_empty() {
        return Rgb::BLACK;
    }
    if zones.len() == 1 {
        return zones[0].1;
    }

    let mut sorted: Vec<(f32, Rgb)> = zones
        .iter()
        .map(|&(a, c)| (a.rem_euclid(360.0), c))
        .collect();
    sorted.sort_by(|a, b| a.0.total_cmp(&b.0));

    let target = target_angle.rem_euclid(360.0);

    // First zone at or past the target; its predecessor closes the arc,
    // wrapping from the last zone when the target sits before the first.
    let upper_pos = sorted
        .iter()
        .position(|&(a, _)| a >= target)
        .unwrap_or(0);
    let (upper_angle, upper_color) = sorted[upper_pos];
    let (lower_angle, lower_color) = sorted[(upper_pos + sorted.len() - 1) % sorted.len()];

    let span = (upper_angle - lower_angle).rem_euclid(360.0);
    if span == 0.0 {
        return lower_color;
    }
    let fraction = (target - lower_angle).rem_euclid(360.0) / span;
    color::lerp(lower_color, upper_color, fraction)
}

/// Scale every channel of every color by `brightness_pct / 100`, rounding.
pub fn apply_brightness(colors: &[Rgb], brightness_pct: u8) -> Vec<Rgb> {
    let factor = f32::from(brightness_pct.min(100)) / 100.0;
    let scale = |ch: u8| (f32::from(ch) * factor).round() as u8;
    colors
        .iter()
        .map(|c| Rgb(scale(c.0), scale(c.1), scale(c.2)))
        .collect()
}

/// Draw positions for every zone LED, in zone-array order.
pub fn led_positions(layout: &Layout, canvas: (f32, f32)) -> Result<Vec<(f32, f32)>> {
    (0..layout.zones.len())
        .map(|index| layout::position_of(index, layout, canvas))
        .collect()
}

/// Angle/color pairs for one group's zones, ready for ring sampling.
pub fn ring_zones(layout: &Layout, group: &str, frame: &[Rgb]) -> Vec<(f32, Rgb)> {
    layout
        .zones
        .iter()
        .filter(|z| z.group == group)
        .filter_map(|z| frame.get(z.index).map(|&c| (z.angle, c)))
        .collect()
}
