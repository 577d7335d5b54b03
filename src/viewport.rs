use bevy::prelude::Resource;
use bevy::render::extract_resource::ExtractResource;

use crate::gpu::ffi::{AntiAliasUniform, ColorShiftUniform, DrawUniform, GammaUniform};

/// Pixel ratio above this buys nothing visible; used for quality
/// decisions only.
pub const MAX_PIXEL_RATIO: f32 = 2.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    /// Logical size.
    pub width: f32,
    pub height: f32,
    /// Scale factor the window reports. Bevy sizes the render targets
    /// with it uncapped.
    pub device_pixel_ratio: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32, device_pixel_ratio: f32) -> Self {
        Self {
            width,
            height,
            device_pixel_ratio: device_pixel_ratio.max(f32::MIN_POSITIVE),
        }
    }

    /// Capped ratio the anti-aliasing choice is made from.
    pub fn pixel_ratio(&self) -> f32 {
        self.device_pixel_ratio.min(MAX_PIXEL_RATIO)
    }

    /// Size of the textures the passes actually render into.
    pub fn physical_size(&self) -> [f32; 2] {
        [
            self.width * self.device_pixel_ratio,
            self.height * self.device_pixel_ratio,
        ]
    }

    pub fn aspect(&self) -> f32 {
        if self.height > 0.0 {
            self.width / self.height
        } else {
            1.0
        }
    }
}

/// Every uniform the frame uploads, gathered so a resize can't miss one.
#[derive(Resource, ExtractResource, Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameUniforms {
    pub draw: DrawUniform,
    pub color_shift: ColorShiftUniform,
    pub gamma: GammaUniform,
    pub anti_alias: AntiAliasUniform,
}

impl FrameUniforms {
    pub fn resize(&mut self, viewport: &Viewport) {
        let [w, h] = viewport.physical_size();
        self.draw.resolution = [w, h];
        self.color_shift.resolution = [w, h];
        self.anti_alias.inverse_resolution = [1.0 / w.max(1.0), 1.0 / h.max(1.0)];
    }

    /// Resolution each resolution-aware input currently holds, in physical pixels.
    pub fn resolutions(&self) -> [[f32; 2]; 3] {
        let inv = self.anti_alias.inverse_resolution;
        [
            self.draw.resolution,
            self.color_shift.resolution,
            [1.0 / inv[0], 1.0 / inv[1]],
        ]
    }
}
