//! Smoothed pointer speed feeding the color-shift pass.

use bevy::prelude::Resource;
use glam::Vec2;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CursorVelocityConfig {
    /// Fraction of the gap closed per tick by the smoothed values.
    pub ease: f32,
    /// Per-tick multiplier pulling the smoothed speed back to zero.
    pub decay: f32,
    /// Upper bound on the speed handed to shaders.
    pub cap: f32,
}

impl Default for CursorVelocityConfig {
    fn default() -> Self {
        Self {
            ease: 0.05,
            decay: 0.999,
            cap: 0.1,
        }
    }
}

/// Only `sample` and `update` mutate this; everything downstream reads
/// `clamped_speed` and `follow_position`.
#[derive(Resource, Clone, Debug, Default)]
pub struct CursorVelocity {
    config: CursorVelocityConfig,
    position: Vec2,
    follow_position: Vec2,
    previous_position: Vec2,
    speed: f32,
    smoothed_speed: f32,
    primed: bool,
}

impl CursorVelocity {
    pub fn new(config: CursorVelocityConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    /// Latest raw pointer sample, already normalized to `[0, 1]`.
    pub fn sample(&mut self, position: Vec2) {
        self.position = position;
        // first sample teleports everything, otherwise the jump from the
        // origin reads as a huge flick
        if !self.primed {
            self.previous_position = position;
            self.follow_position = position;
            self.primed = true;
        }
    }

    /// Once per tick, before anything consumes the velocity.
    pub fn update(&mut self) {
        let ease = self.config.ease;

        self.speed = self.previous_position.distance(self.position);
        self.smoothed_speed -= ease * (self.smoothed_speed - self.speed);
        self.follow_position -= ease * (self.follow_position - self.position);
        self.previous_position = self.position;

        self.smoothed_speed *= self.config.decay;
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn smoothed_speed(&self) -> f32 {
        self.smoothed_speed
    }

    pub fn clamped_speed(&self) -> f32 {
        self.smoothed_speed.min(self.config.cap)
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn follow_position(&self) -> Vec2 {
        self.follow_position
    }

    pub fn config(&self) -> &CursorVelocityConfig {
        &self.config
    }
}

/// Window pixels (origin top-left) to `[0, 1]` with y pointing up.
pub fn normalize_pointer(screen: Vec2, window_size: Vec2) -> Vec2 {
    if window_size.x <= 0.0 || window_size.y <= 0.0 {
        return Vec2::ZERO;
    }
    Vec2::new(screen.x / window_size.x, 1.0 - screen.y / window_size.y).clamp(Vec2::ZERO, Vec2::ONE)
}
