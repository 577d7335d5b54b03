use bevy::prelude::*;

pub mod composite;
pub mod config;
pub mod context;
pub mod cursor;
pub mod debug_view;
pub mod error;
pub mod input;
pub mod mesh_source;
pub mod params;
pub mod plugin;
pub mod viewport;

pub mod cpu {
    pub mod encoder;
    pub mod flow;
    pub mod ping_pong;
    pub mod texel_map;
}

pub mod gpu {
    pub mod buffers;
    pub mod draw_buffers;
    pub mod draw_pass;
    pub mod draw_pipeline;
    pub mod ffi;
    pub mod pipeline;
    pub mod post_process;
}

pub use plugin::{FrameSet, GpgpuParticlesPlugin, SimulationState};

/// Which tunable the keyboard currently edits.
#[derive(Resource)]
pub struct TuningControl {
    pub target: TuningTarget,
    pub step: f32, // fraction of the parameter's range per key press
}

impl Default for TuningControl {
    fn default() -> Self {
        Self {
            target: TuningTarget::Influence,
            step: 0.01,
        }
    }
}

#[derive(PartialEq, Debug, Copy, Clone)]
pub enum TuningTarget {
    Influence,
    Strength,
    Frequency,
    PointSize,
}

/// Rigid spin of a whole entity, independent of the simulation.
#[derive(Component, Copy, Clone)]
pub struct Rotates {
    pub axis: Vec3,
    pub speed: f32, // radians per seconds
}

#[derive(Resource, Copy, Clone, Debug)]
pub struct CameraParallax {
    pub enabled: bool,
    pub amount: f32,
}

/// Rest position the parallax offset is applied around.
#[derive(Component, Copy, Clone)]
pub struct ParallaxAnchor(pub Vec3);
