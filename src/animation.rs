//! Time-to-frame mapping for looping keyframe animations.
//!
//! The clock maps elapsed wall time and a speed parameter to a cyclic
//! progress value in `[0, 1)`, then blends adjacent keyframes. All sampling
//! is pull-based: the preview surface asks for the current frame on each
//! redraw tick, so stopping playback cannot leave an orphaned callback.

use std::time::Instant;

use crate::color;
use crate::timeline::{CustomRgbConfig, Keyframe};

/// Per-frame duration at speed 20 (fastest).
pub const MIN_FRAME_MS: u64 = 150;
/// Per-frame duration at speed 0 (slowest).
pub const MAX_FRAME_MS: u64 = 3500;

/// Milliseconds each keyframe is held, linear in `speed` (0..=20).
pub fn frame_duration_ms(speed: u8) -> u64 {
    debug_assert!(speed <= 20, "speed out of range: {speed}");
    let speed = u64::from(speed.min(20));
    let span = (MAX_FRAME_MS - MIN_FRAME_MS) as f64;
    (MAX_FRAME_MS as f64 - span * speed as f64 / 20.0).round() as u64
}

/// Duration of one full loop through `keyframe_count` frames.
pub fn cycle_duration_ms(speed: u8, keyframe_count: usize) -> u64 {
    frame_duration_ms(speed) * keyframe_count.max(1) as u64
}

/// Cyclic interpolation progress in `[0, 1)` for an elapsed time.
pub fn progress(elapsed_ms: u64, speed: u8, keyframe_count: usize) -> f64 {
    let cycle = cycle_duration_ms(speed, keyframe_count);
    (elapsed_ms % cycle) as f64 / cycle as f64
}

/// Blend the timeline's keyframes at `progress`.
///
/// `total = progress * K` selects the source frame (`floor`) and the blend
/// fraction toward the next frame (wrapping). A single-keyframe timeline is
/// returned as-is, no interpolation.
pub fn sample(config: &CustomRgbConfig, progress: f64) -> Keyframe {
    let count = config.keyframes.len();
    debug_assert!(count > 0, "timeline must never be empty");
    if count <= 1 {
        return config.keyframes[0].clone();
    }

    let total = progress.clamp(0.0, 1.0) * count as f64;
    let index = (total.floor() as usize) % count;
    let blend = (total - total.floor()) as f32;
    let from = &config.keyframes[index];
    let to = &config.keyframes[(index + 1) % count];

    Keyframe(
        from.zones()
            .iter()
            .zip(to.zones())
            .map(|(&a, &b)| color::lerp(a, b, blend))
            .collect(),
    )
}

/// Playback state for the live preview loop.
///
/// While playing, each `sample_at` call computes the interpolated frame for
/// the given instant. Pausing freezes on the most recently computed frame;
/// selecting an explicit frame snaps the paused output to that keyframe.
#[derive(Debug)]
pub struct Player {
    epoch: Instant,
    playing: bool,
    last_sampled: Option<Keyframe>,
    selected_frame: Option<usize>,
}

impl Player {
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
            playing: false,
            last_sampled: None,
            selected_frame: None,
        }
    }

    pub const fn is_playing(&self) -> bool {
        self.playing
    }

    /// Start playback from the beginning of the cycle.
    pub fn play(&mut self) {
        self.epoch = Instant::now();
        self.playing = true;
        self.selected_frame = None;
    }

    /// Freeze on the most recently sampled frame.
    pub fn pause(&mut self) {
        self.playing = false;
    }

    /// Pause and snap the output to one explicit keyframe.
    pub fn select_frame(&mut self, index: usize) {
        self.playing = false;
        self.selected_frame = Some(index);
    }

    /// Stop playback and drop frozen state.
    pub fn stop(&mut self) {
        self.playing = false;
        self.last_sampled = None;
        self.selected_frame = None;
    }

    /// The frame to display at `now`.
    pub fn sample_at(&mut self, config: &CustomRgbConfig, now: Instant) -> Keyframe {
        if self.playing {
            let elapsed = now.saturating_duration_since(self.epoch).as_millis() as u64;
            let p = progress(elapsed, config.speed, config.keyframes.len());
            let frame = sample(config, p);
            self.last_sampled = Some(frame.clone());
            return frame;
        }
        if let Some(index) = self.selected_frame {
            let index = index.min(config.keyframes.len() - 1);
            return config.keyframes[index].clone();
        }
        self.last_sampled
            .clone()
            .unwrap_or_else(|| config.keyframes[0].clone())
    }
}

impl Default for Player {
    fn default() -> Self {
        Self::new()
    }
}
