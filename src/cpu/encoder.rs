// packs mesh vertices into the square RGBA state texture (xyz = position, w = phase)
use glam::Vec3;
use rand::Rng;

use crate::error::{ComputeError, SetupError};

/// Square layout of the state texture: `side * side >= count`, texel
/// `(x, y)` belongs to particle `y * side + x`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StateGrid {
    pub side: u32,
    pub count: u32,
}

impl StateGrid {
    pub fn for_count(count: usize) -> Result<Self, SetupError> {
        if count == 0 {
            return Err(SetupError::EmptyMesh);
        }
        // integer ceil(sqrt(n)), float sqrt drifts for large counts
        let root = count.isqrt();
        let side = if root * root == count { root } else { root + 1 };

        Ok(Self {
            side: side as u32,
            count: count as u32,
        })
    }

    #[inline]
    pub fn texel_count(&self) -> usize {
        (self.side * self.side) as usize
    }

    #[inline]
    pub fn is_padding(&self, x: u32, y: u32) -> bool {
        self.index_of(x, y) >= self.count as usize
    }

    #[inline]
    pub fn index_of(&self, x: u32, y: u32) -> usize {
        (y * self.side + x) as usize
    }

    pub fn texel_of(&self, index: usize) -> Result<(u32, u32), ComputeError> {
        if index >= self.count as usize {
            return Err(ComputeError::TexelOutOfRange {
                index,
                count: self.count as usize,
            });
        }
        let side = self.side as usize;
        Ok(((index % side) as u32, (index / side) as u32))
    }
}

/// CPU copy of the initial state texture, row-major, one `[f32; 4]` per texel.
#[derive(Clone, Debug)]
pub struct EncodedState {
    pub grid: StateGrid,
    pub texels: Vec<[f32; 4]>,
}

impl EncodedState {
    pub fn particle(&self, index: usize) -> Result<[f32; 4], ComputeError> {
        let (x, y) = self.grid.texel_of(index)?;
        Ok(self.texels[self.grid.index_of(x, y)])
    }

    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.texels)
    }
}

pub fn encode_particles<R: Rng + ?Sized>(
    positions: &[Vec3],
    rng: &mut R,
) -> Result<EncodedState, SetupError> {
    let grid = StateGrid::for_count(positions.len())?;

    // padding texels stay zero so a stray sample can't inject NaN
    let mut texels = vec![[0.0f32; 4]; grid.texel_count()];
    for (texel, pos) in texels.iter_mut().zip(positions) {
        let phase: f32 = rng.random();
        *texel = [pos.x, pos.y, pos.z, phase];
    }

    Ok(EncodedState { grid, texels })
}
