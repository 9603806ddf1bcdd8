//! zrgb library - Multi-zone RGB lighting control core for gaming handhelds.
//!
//! This library exposes the settings/animation engine behind the `zrgb`
//! CLI: color math, per-device zone geometry, keyframe timelines with
//! animated interpolation, named presets, and layered settings resolution
//! (global default, per-application, per-power-source). The actual LED
//! driver and persistent storage are reached only through the traits in
//! `backend`.
//!
//! # Modules
//!
//! - `color`: HSV/RGB conversion and contrast math
//! - `layout`: per-device zone geometry and rotation semantics
//! - `timeline`: keyframe timelines and the editing state machine
//! - `animation`: time-to-frame mapping for looping animations
//! - `preset`: named preset CRUD and apply, per device category
//! - `settings`: layered settings resolution
//! - `preview`: ring-gradient sampling and LED draw geometry
//! - `backend`: boundary traits with mock and JSON-file implementations
//! - `debounce`: quiet-window coalescing for apply storms
//! - `error`: error types with user-recoverable hints
#![forbid(unsafe_code)]

pub mod animation;
pub mod backend;
pub mod cli;
pub mod color;
pub mod debounce;
pub mod error;
pub mod layout;
pub mod logging;
pub mod notify;
pub mod preset;
pub mod preview;
pub mod settings;
pub mod timeline;
