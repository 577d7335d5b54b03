use bevy::prelude::Resource;
use clap::Parser;

/// Startup options. Fixed once the app runs; live knobs are in `params`.
#[derive(Parser, Resource, Clone, Debug, PartialEq)]
#[command(name = "gpgpu_lotus", about = "GPU-advected point cloud sampled from a mesh")]
pub struct ParticlesConfig {
    /// glTF file under `assets/`, the first primitive of mesh `mesh_index` is sampled.
    #[arg(long, default_value = "lotus.glb")]
    pub mesh: String,

    #[arg(long, default_value_t = 0)]
    pub mesh_index: usize,

    /// Seeds the per-particle phase and size streams.
    #[arg(long, default_value_t = 0x5eed)]
    pub seed: u64,

    /// Pretend the GPU has no multisampling (exercises the fallback anti-aliasing pass).
    #[arg(long)]
    pub no_msaa: bool,

    /// Offset the camera by the smoothed pointer position.
    #[arg(long)]
    pub parallax: bool,

    #[arg(long, default_value_t = 0.4)]
    pub parallax_amount: f32,

    /// Show the current state texture on a quad beside the cloud.
    #[arg(long)]
    pub debug_view: bool,

    /// Spin of the whole cloud about +Y, radians per second.
    #[arg(long, default_value_t = 0.1)]
    pub angular_rate: f32,
}

impl Default for ParticlesConfig {
    fn default() -> Self {
        Self::parse_from(["gpgpu_lotus"])
    }
}
