use bevy_gpgpu_particles::cursor::{normalize_pointer, CursorVelocity, CursorVelocityConfig};
use glam::Vec2;

#[test]
fn resting_pointer_has_no_speed() {
    let mut cursor = CursorVelocity::default();
    cursor.sample(Vec2::new(0.9, 0.1));
    for _ in 0..10 {
        cursor.update();
    }
    assert_eq!(cursor.speed(), 0.0);
    assert_eq!(cursor.clamped_speed(), 0.0);
    assert_eq!(cursor.follow_position(), Vec2::new(0.9, 0.1));
}

#[test]
fn one_move_eases_in() {
    let mut cursor = CursorVelocity::default();
    cursor.sample(Vec2::new(0.2, 0.5));
    cursor.update();
    cursor.sample(Vec2::new(0.5, 0.9));
    cursor.update();

    assert!((cursor.speed() - 0.5).abs() < 1e-6);
    // 0 - 0.05 * (0 - 0.5), then decay
    assert!((cursor.smoothed_speed() - 0.025 * 0.999).abs() < 1e-6);
}

#[test]
fn smoothed_speed_decays_after_the_pointer_stops() {
    let mut cursor = CursorVelocity::default();
    cursor.sample(Vec2::ZERO);
    cursor.update();
    for i in 1..=20 {
        cursor.sample(Vec2::splat(i as f32 * 0.02));
        cursor.update();
    }

    let mut last = cursor.smoothed_speed();
    assert!(last > 0.0);
    for _ in 0..100 {
        cursor.update();
        assert!(cursor.smoothed_speed() < last);
        last = cursor.smoothed_speed();
    }
}

#[test]
fn faster_motion_reads_faster() {
    let run = |stride: f32| {
        let mut cursor = CursorVelocity::default();
        cursor.sample(Vec2::ZERO);
        cursor.update();
        for i in 1..=10 {
            cursor.sample(Vec2::new(i as f32 * stride, 0.0));
            cursor.update();
        }
        cursor.clamped_speed()
    };
    assert!(run(0.01) < run(0.02));
    assert!(run(0.02) < run(0.05));
}

#[test]
fn shader_speed_is_capped() {
    let mut cursor = CursorVelocity::default();
    for i in 0..400 {
        let x = if i % 2 == 0 { 0.0 } else { 1.0 };
        cursor.sample(Vec2::new(x, 0.5));
        cursor.update();
    }
    assert!(cursor.smoothed_speed() > cursor.config().cap);
    assert_eq!(cursor.clamped_speed(), 0.1);
}

#[test]
fn custom_ease_moves_follow_faster() {
    let mut slow = CursorVelocity::default();
    let mut fast = CursorVelocity::new(CursorVelocityConfig {
        ease: 0.5,
        ..CursorVelocityConfig::default()
    });
    for cursor in [&mut slow, &mut fast] {
        cursor.sample(Vec2::ZERO);
        cursor.update();
        cursor.sample(Vec2::ONE);
        cursor.update();
    }
    assert!(fast.follow_position().x > slow.follow_position().x);
    assert!((fast.follow_position().x - 0.5).abs() < 1e-6);
}

#[test]
fn pointer_is_normalized_with_y_up() {
    let window = Vec2::new(800.0, 600.0);
    assert_eq!(normalize_pointer(Vec2::ZERO, window), Vec2::new(0.0, 1.0));
    assert_eq!(normalize_pointer(window, window), Vec2::new(1.0, 0.0));
    assert_eq!(
        normalize_pointer(Vec2::new(400.0, 150.0), window),
        Vec2::new(0.5, 0.75)
    );
    assert_eq!(
        normalize_pointer(Vec2::new(-20.0, 900.0), window),
        Vec2::new(0.0, 0.0)
    );
    assert_eq!(normalize_pointer(Vec2::new(5.0, 5.0), Vec2::ZERO), Vec2::ZERO);
}

#[test]
fn moving_every_tick_reads_at_least_as_fast_as_every_other_tick() {
    let mut every = CursorVelocity::default();
    let mut every_other = CursorVelocity::default();
    every.sample(Vec2::ZERO);
    every_other.sample(Vec2::ZERO);

    let step = 0.01;
    let mut x_every = 0.0;
    let mut x_every_other = 0.0;
    for tick in 1..=40 {
        x_every += step;
        every.sample(Vec2::new(x_every, 0.0));
        if tick % 2 == 0 {
            x_every_other += step;
            every_other.sample(Vec2::new(x_every_other, 0.0));
        }
        every.update();
        every_other.update();
        assert!(
            every.smoothed_speed() >= every_other.smoothed_speed(),
            "tick {tick}"
        );
    }
    assert!(every.clamped_speed() > every_other.clamped_speed());
}
