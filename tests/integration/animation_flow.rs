//! Integration tests for the editor-to-sampled-frame pipeline.

use zrgb::animation::{self, Player};
use zrgb::color::Rgb;
use zrgb::layout::{layout_for, DeviceKind};
use zrgb::preview;
use zrgb::timeline::TimelineEditor;

use crate::common::solid_timeline;

#[test]
fn test_edited_timeline_samples_as_authored() {
    let mut editor = TimelineEditor::new(8, 8);
    editor.start_fresh();
    editor.update_zone_color(0, 0, Rgb(255, 0, 0)).unwrap();
    editor.add_keyframe(Some(0));
    editor.update_zone_color(1, 0, Rgb(0, 0, 255)).unwrap();
    editor.update_speed(10).unwrap();

    let config = editor.current().unwrap();

    // Start of the cycle is exactly the first frame.
    assert_eq!(animation::sample(config, 0.0), config.keyframes[0]);
    // Halfway through, the second frame is exact (2 frames, progress 0.5).
    assert_eq!(animation::sample(config, 0.5), config.keyframes[1]);
    // A quarter in, zone 0 sits halfway between red and blue.
    let mid = animation::sample(config, 0.25);
    assert_eq!(mid.zones()[0], Rgb(128, 0, 128));
}

#[test]
fn test_brightness_scales_after_interpolation() {
    let config = solid_timeline(
        DeviceKind::LegionGo,
        &[Rgb(100, 100, 100), Rgb(200, 200, 200)],
        10,
    );

    // Interpolate first, then scale: the order matters for rounding.
    let frame = animation::sample(&config, 0.25);
    assert_eq!(frame.zones()[0], Rgb(150, 150, 150));
    let dimmed = preview::apply_brightness(frame.zones(), 50);
    assert_eq!(dimmed[0], Rgb(75, 75, 75));
}

#[test]
fn test_rotate_copy_then_play_walks_the_ring() {
    let layout = layout_for(DeviceKind::LegionGo);
    let mut editor = TimelineEditor::new(8, 8);
    editor.start_fresh();
    editor.update_zone_color(0, 0, Rgb(255, 0, 0)).unwrap();
    for frame in 0..3 {
        assert!(editor.rotate_copy(frame, true, layout).unwrap());
    }

    let config = editor.current().unwrap();
    assert_eq!(config.keyframe_count(), 4);
    // At each exact frame boundary the lit zone has advanced one step.
    for (index, lit_zone) in [(0usize, 0usize), (1, 1), (2, 2), (3, 3)] {
        let frame = animation::sample(config, index as f64 / 4.0);
        assert_eq!(frame.zones()[lit_zone], Rgb(255, 0, 0), "frame {index}");
    }
}

#[test]
fn test_player_pause_then_resume() {
    let config = solid_timeline(DeviceKind::RogAlly, &[Rgb(255, 0, 0), Rgb(0, 0, 255)], 20);
    let mut player = Player::new();

    player.play();
    assert!(player.is_playing());
    let now = std::time::Instant::now();
    let frame = player.sample_at(&config, now);

    player.pause();
    assert!(!player.is_playing());
    // Frozen on the last computed frame even as time advances.
    let later = now + std::time::Duration::from_millis(500);
    assert_eq!(player.sample_at(&config, later), frame);

    // Resuming restarts the cycle from the first frame.
    player.play();
    let frame = player.sample_at(&config, std::time::Instant::now());
    assert_eq!(frame.zone_count(), 4);
}

#[test]
fn test_ring_gradient_from_interpolated_frame() {
    let layout = layout_for(DeviceKind::LegionGo);
    let config = solid_timeline(DeviceKind::LegionGo, &[Rgb(200, 0, 0)], 10);
    let frame = animation::sample(&config, 0.0);

    let ring = preview::ring_zones(layout, "left_stick", frame.zones());
    assert_eq!(ring.len(), 4);
    // A uniform frame renders a uniform ring at any angle.
    for angle in [0.0, 45.0, 137.0, 312.0] {
        assert_eq!(
            preview::interpolate_along_ring(angle, &ring),
            Rgb(200, 0, 0),
            "angle {angle}"
        );
    }
}
