// index -> texel-center UV lookup consumed by the draw pass as a per-instance attribute
use glam::Vec2;
use rand::Rng;

use crate::cpu::encoder::{EncodedState, StateGrid};
use crate::error::ComputeError;
use crate::gpu::ffi::ParticleInstance;

/// UV of the centre of the texel holding `index`. Centres keep filtered
/// sampling from blending a particle with its neighbour or with padding.
pub fn texel_center_uv(grid: &StateGrid, index: usize) -> Result<Vec2, ComputeError> {
    let (x, y) = grid.texel_of(index)?;
    let side = grid.side as f32;
    Ok(Vec2::new((x as f32 + 0.5) / side, (y as f32 + 0.5) / side))
}

/// One UV per particle, index order. Only `count` entries: padding texels get none.
pub fn particle_uvs(grid: &StateGrid) -> Vec<[f32; 2]> {
    let side = grid.side as f32;
    let count = grid.count as usize;
    let mut uvs = Vec::with_capacity(count);

    'rows: for y in 0..grid.side {
        for x in 0..grid.side {
            if grid.index_of(x, y) >= count {
                break 'rows;
            }
            uvs.push([(x as f32 + 0.5) / side, (y as f32 + 0.5) / side]);
        }
    }
    uvs
}

/// Per-instance vertex data: the UV above plus a size factor in `[0, 1)`
/// drawn from its own rng stream so it is uncorrelated with the phase.
pub fn particle_instances<R: Rng + ?Sized>(grid: &StateGrid, rng: &mut R) -> Vec<ParticleInstance> {
    particle_uvs(grid)
        .into_iter()
        .map(|uv| ParticleInstance {
            uv,
            size: rng.random(),
        })
        .collect()
}

/// What a nearest-filtered texture fetch at `uv` returns. Used to check the
/// UV mapping against the encoded data without a GPU.
pub fn sample_nearest(state: &EncodedState, uv: Vec2) -> [f32; 4] {
    let side = state.grid.side;
    let max = side.saturating_sub(1) as f32;
    let x = (uv.x * side as f32).floor().clamp(0.0, max) as u32;
    let y = (uv.y * side as f32).floor().clamp(0.0, max) as u32;
    state.texels[state.grid.index_of(x, y)]
}
