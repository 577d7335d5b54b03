// CPU reference of the flow step (keep in sync with assets/shaders/gpgpu_particles.wgsl)
use glam::Vec3;

use crate::context::SimulationContext;
use crate::cpu::encoder::{EncodedState, StateGrid};
use crate::cpu::ping_pong::FlowBackend;
use crate::params::FlowParams;

/// How fast particles are pulled back to their mesh position, per second.
pub const BASE_RECALL_RATE: f32 = 0.5;

#[inline]
fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

// divergence-ish swirl, each component in [-1, 1]
#[inline]
pub fn flow_field(q: Vec3, t: f32) -> Vec3 {
    Vec3::new(
        (q.y + t).sin() + (q.z * 1.3 - t * 0.7).sin(),
        (q.z + t * 0.9).sin() + (q.x * 1.7 + t * 0.4).sin(),
        (q.x - t * 0.6).sin() + (q.y * 1.1 + t * 0.8).sin(),
    ) * 0.5
}

/// 0 where the field is switched off, up to 1 where it acts fully.
/// Higher influence lowers the threshold so more of the cloud moves.
#[inline]
pub fn flow_gate(q: Vec3, t: f32, influence: f32) -> f32 {
    let threshold = ((influence - 0.5) * -2.0).min(0.999);
    let n = (q.dot(Vec3::new(0.7, 1.3, 0.9)) + t * 0.25).sin();
    smoothstep(threshold, 1.0, n)
}

pub fn advect(pos: Vec3, base: Vec3, ctx: &SimulationContext, params: &FlowParams) -> Vec3 {
    let q = pos * params.frequency;
    let gate = flow_gate(q, ctx.elapsed, params.influence);
    let displacement = flow_field(q, ctx.elapsed) * gate * params.strength * ctx.delta;
    let recall = (base - pos) * (ctx.delta * BASE_RECALL_RATE).min(1.0);
    pos + displacement + recall
}

/// Runs the step on plain vectors. Padding texels are copied through.
#[derive(Default)]
pub struct CpuFlowBackend;

impl FlowBackend for CpuFlowBackend {
    type Slot = Vec<[f32; 4]>;

    fn allocate(&mut self, state: &EncodedState) -> Self::Slot {
        state.texels.clone()
    }

    fn advance(
        &mut self,
        grid: &StateGrid,
        read: &Self::Slot,
        write: &mut Self::Slot,
        base: &Self::Slot,
        ctx: &SimulationContext,
        params: &FlowParams,
    ) {
        let count = grid.count as usize;
        for (i, out) in write.iter_mut().enumerate() {
            let texel = read[i];
            if i >= count {
                *out = texel;
                continue;
            }
            let pos = Vec3::new(texel[0], texel[1], texel[2]);
            let home = Vec3::new(base[i][0], base[i][1], base[i][2]);
            let next = advect(pos, home, ctx, params);
            *out = [next.x, next.y, next.z, texel[3]];
        }
    }
}
