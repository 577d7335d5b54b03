use bevy::prelude::*;

/// Flow-field knobs read by the compute step every tick. Written only by
/// the tuning collaborator.
#[derive(Resource, Clone, Copy, Debug, PartialEq)]
pub struct FlowParams {
    pub influence: f32, // [0, 1]
    pub strength: f32,  // [0, 10]
    pub frequency: f32, // [0, 1]
}

impl Default for FlowParams {
    fn default() -> Self {
        Self {
            influence: 0.5,
            strength: 2.0,
            frequency: 0.5,
        }
    }
}

impl FlowParams {
    pub const INFLUENCE_RANGE: (f32, f32) = (0.0, 1.0);
    pub const STRENGTH_RANGE: (f32, f32) = (0.0, 10.0);
    pub const FREQUENCY_RANGE: (f32, f32) = (0.0, 1.0);

    /// Same ranges the tuning panel enforces.
    pub fn clamped(self) -> Self {
        Self {
            influence: self.influence.clamp(Self::INFLUENCE_RANGE.0, Self::INFLUENCE_RANGE.1),
            strength: self.strength.clamp(Self::STRENGTH_RANGE.0, Self::STRENGTH_RANGE.1),
            frequency: self.frequency.clamp(Self::FREQUENCY_RANGE.0, Self::FREQUENCY_RANGE.1),
        }
    }
}

#[derive(Resource, Clone, Copy, Debug, PartialEq)]
pub struct RenderParams {
    pub point_size: f32, // [0, 1]
    pub clear_color: Color,
}

impl Default for RenderParams {
    fn default() -> Self {
        Self {
            point_size: 0.063,
            clear_color: Color::srgb_u8(0x29, 0x19, 0x1f),
        }
    }
}

impl RenderParams {
    pub const POINT_SIZE_RANGE: (f32, f32) = (0.0, 1.0);

    pub fn clamped(self) -> Self {
        Self {
            point_size: self
                .point_size
                .clamp(Self::POINT_SIZE_RANGE.0, Self::POINT_SIZE_RANGE.1),
            ..self
        }
    }
}
