//! Which full-screen passes run after the scene, decided once at startup.

use bevy::prelude::Resource;
use bevy::render::extract_resource::ExtractResource;

/// Sample count used when the target supports native multisampling.
pub const NATIVE_SAMPLES: u32 = 4;

/// What the GPU and display offer, read once before the first frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderCapabilities {
    /// Device pixels per logical pixel, already capped.
    pub pixel_ratio: f32,
    /// The HDR view format can be rendered with `NATIVE_SAMPLES` samples.
    pub native_multisample: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AntiAliasing {
    /// High-density display, edges are already below a pixel.
    Disabled,
    /// The scene target is multisampled, no extra pass.
    NativeMultisample { samples: u32 },
    /// No hardware MSAA on a 1:1 display: a post pass smooths edges.
    FallbackPass,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompositePass {
    Scene,
    ColorShift,
    GammaCorrection,
    FallbackAntiAlias,
}

#[derive(Resource, ExtractResource, Clone, Copy, Debug, PartialEq, Eq)]
pub struct CompositePlan {
    pub anti_aliasing: AntiAliasing,
}

impl CompositePlan {
    pub fn resolve(caps: &RenderCapabilities) -> Self {
        let anti_aliasing = if caps.pixel_ratio > 1.0 {
            AntiAliasing::Disabled
        } else if caps.native_multisample {
            AntiAliasing::NativeMultisample {
                samples: NATIVE_SAMPLES,
            }
        } else {
            AntiAliasing::FallbackPass
        };
        Self { anti_aliasing }
    }

    /// Execution order, identical every frame.
    pub fn passes(&self) -> Vec<CompositePass> {
        let mut passes = vec![
            CompositePass::Scene,
            CompositePass::ColorShift,
            CompositePass::GammaCorrection,
        ];
        if self.anti_aliasing == AntiAliasing::FallbackPass {
            passes.push(CompositePass::FallbackAntiAlias);
        }
        passes
    }

    pub fn terminal_pass(&self) -> CompositePass {
        match self.anti_aliasing {
            AntiAliasing::FallbackPass => CompositePass::FallbackAntiAlias,
            _ => CompositePass::GammaCorrection,
        }
    }

    pub fn sample_count(&self) -> u32 {
        match self.anti_aliasing {
            AntiAliasing::NativeMultisample { samples } => samples,
            _ => 1,
        }
    }

    pub fn uses_fallback_pass(&self) -> bool {
        self.anti_aliasing == AntiAliasing::FallbackPass
    }
}

// The post chain ends in an sRGB surface whose hardware encode runs on
// every write. The gamma pass pre-decodes its result so that only its own
// curve survives on screen. Mirrored by assets/shaders/gamma_correction.wgsl.

/// sRGB transfer as the surface applies it on write.
pub fn srgb_encode(linear: f32) -> f32 {
    if linear <= 0.003_130_8 {
        linear * 12.92
    } else {
        1.055 * linear.powf(1.0 / 2.4) - 0.055
    }
}

pub fn srgb_decode(encoded: f32) -> f32 {
    if encoded <= 0.040_45 {
        encoded / 12.92
    } else {
        ((encoded + 0.055) / 1.055).powf(2.4)
    }
}

/// What the gamma pass writes for one linear channel value.
pub fn gamma_pass_output(linear: f32, gamma: f32) -> f32 {
    srgb_decode(linear.max(0.0).powf(1.0 / gamma))
}

/// What ends up on screen once the surface has encoded the pass output.
pub fn displayed_value(linear: f32, gamma: f32) -> f32 {
    srgb_encode(gamma_pass_output(linear, gamma))
}
