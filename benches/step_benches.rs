use bevy_gpgpu_particles::context::SimulationContext;
use bevy_gpgpu_particles::cpu::encoder::encode_particles;
use bevy_gpgpu_particles::cpu::flow::CpuFlowBackend;
use bevy_gpgpu_particles::cpu::ping_pong::ComputeStage;
use bevy_gpgpu_particles::params::FlowParams;
use criterion::{criterion_group, criterion_main, Criterion};
use glam::Vec3;
use rand::rngs::StdRng;
use rand::SeedableRng;

// roughly the vertex count of the lotus mesh
const PARTICLES: usize = 16_000;

fn positions() -> Vec<Vec3> {
    (0..PARTICLES)
        .map(|i| {
            let t = i as f32 * 0.013;
            Vec3::new(t.cos() * 3.0, (t * 0.2).sin(), t.sin() * 3.0)
        })
        .collect()
}

fn bench_encode(c: &mut Criterion) {
    let positions = positions();
    c.bench_function("encode_16k", |b| {
        b.iter(|| encode_particles(&positions, &mut StdRng::seed_from_u64(0)))
    });
}

fn bench_step(c: &mut Criterion) {
    let state = encode_particles(&positions(), &mut StdRng::seed_from_u64(0)).unwrap();
    let mut stage = ComputeStage::<Vec<[f32; 4]>>::default();
    stage.initialize(&mut CpuFlowBackend, &state);

    let params = FlowParams::default();
    let mut ctx = SimulationContext::default();

    c.bench_function("cpu_step_16k", |b| {
        b.iter(|| {
            ctx.advance(ctx.elapsed + 1.0 / 60.0);
            stage.step(&mut CpuFlowBackend, &ctx, &params)
        })
    });
}

criterion_group!(benches, bench_encode, bench_step);
criterion_main!(benches);
