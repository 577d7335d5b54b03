use bytemuck::{Pod, Zeroable};

// plain arrays instead of glam so the layout matches WGSL byte for byte

/// Per-instance vertex data of the particle draw.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct ParticleInstance {
    pub uv: [f32; 2],
    pub size: f32,
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct FlowUniform {
    pub elapsed: f32,
    pub delta: f32,
    pub influence: f32,
    pub strength: f32,
    pub frequency: f32,
    pub recall: f32,
    pub side: u32,
    pub count: u32,
}

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct DrawUniform {
    pub clip_from_world: [[f32; 4]; 4],
    pub world_from_local: [[f32; 4]; 4],
    pub resolution: [f32; 2],
    pub point_size: f32,
    pub side: f32,
}

impl Default for DrawUniform {
    fn default() -> Self {
        Self {
            clip_from_world: glam::Mat4::IDENTITY.to_cols_array_2d(),
            world_from_local: glam::Mat4::IDENTITY.to_cols_array_2d(),
            resolution: [1.0, 1.0],
            point_size: 0.063,
            side: 1.0,
        }
    }
}

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct ColorShiftUniform {
    pub follow: [f32; 2],
    pub resolution: [f32; 2],
    /// Clamped cursor speed; 0 makes the pass an identity.
    pub speed: f32,
    pub strength: f32,
    pub _pad: [f32; 2],
}

impl Default for ColorShiftUniform {
    fn default() -> Self {
        Self {
            follow: [0.5, 0.5],
            resolution: [1.0, 1.0],
            speed: 0.0,
            strength: 0.5,
            _pad: [0.0; 2],
        }
    }
}

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct GammaUniform {
    pub gamma: f32,
    pub _pad: [f32; 3],
}

impl Default for GammaUniform {
    fn default() -> Self {
        Self {
            gamma: 2.2,
            _pad: [0.0; 3],
        }
    }
}

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct AntiAliasUniform {
    pub inverse_resolution: [f32; 2],
    pub edge_threshold: f32,
    pub edge_threshold_min: f32,
}

impl Default for AntiAliasUniform {
    fn default() -> Self {
        Self {
            inverse_resolution: [1.0, 1.0],
            edge_threshold: 0.166,
            edge_threshold_min: 0.0833,
        }
    }
}
