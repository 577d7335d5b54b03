use bevy_gpgpu_particles::config::ParticlesConfig;
use bevy_gpgpu_particles::context::SimulationContext;
use bevy_gpgpu_particles::cpu::encoder::encode_particles;
use bevy_gpgpu_particles::cpu::flow::CpuFlowBackend;
use bevy_gpgpu_particles::cpu::ping_pong::ComputeStage;
use bevy_gpgpu_particles::params::{FlowParams, RenderParams};
use bevy_gpgpu_particles::viewport::{FrameUniforms, Viewport, MAX_PIXEL_RATIO};
use clap::Parser;
use glam::Vec3;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn close(a: [f32; 2], b: [f32; 2]) -> bool {
    a.iter()
        .zip(b)
        .all(|(x, y)| (x - y).abs() <= 1e-3 * y.abs().max(1.0))
}

#[test]
fn resize_updates_every_resolution_input() {
    let mut uniforms = FrameUniforms::default();
    uniforms.resize(&Viewport::new(800.0, 600.0, 1.0));
    for res in uniforms.resolutions() {
        assert!(close(res, [800.0, 600.0]), "{res:?}");
    }

    uniforms.resize(&Viewport::new(1600.0, 900.0, 1.0));
    for res in uniforms.resolutions() {
        assert!(close(res, [1600.0, 900.0]), "{res:?}");
    }

    uniforms.resize(&Viewport::new(1600.0, 900.0, 2.0));
    for res in uniforms.resolutions() {
        assert!(close(res, [3200.0, 1800.0]), "{res:?}");
    }
}

#[test]
fn resize_leaves_particles_alone() {
    let positions: Vec<Vec3> = (0..100).map(|i| Vec3::splat(i as f32 * 0.01)).collect();
    let state = encode_particles(&positions, &mut StdRng::seed_from_u64(3)).unwrap();
    let mut stage = ComputeStage::<Vec<[f32; 4]>>::default();
    stage.initialize(&mut CpuFlowBackend, &state);

    let mut uniforms = FrameUniforms::default();
    let point_size = uniforms.draw.point_size;
    uniforms.resize(&Viewport::new(800.0, 600.0, 1.0));
    uniforms.resize(&Viewport::new(1600.0, 900.0, 1.0));

    assert_eq!(stage.grid().unwrap().count, 100);
    assert_eq!(stage.current_state().unwrap(), &state.texels);
    assert_eq!(uniforms.draw.point_size, point_size);
}

#[test]
fn cap_only_affects_the_quality_ratio() {
    let viewport = Viewport::new(1000.0, 500.0, 3.0);
    assert_eq!(viewport.pixel_ratio(), MAX_PIXEL_RATIO);
    // render targets are sized with the real scale factor
    assert_eq!(viewport.physical_size(), [3000.0, 1500.0]);
    assert_eq!(viewport.aspect(), 2.0);

    let mut uniforms = FrameUniforms::default();
    uniforms.resize(&viewport);
    for res in uniforms.resolutions() {
        assert!(close(res, [3000.0, 1500.0]), "{res:?}");
    }
}

#[test]
fn degenerate_window_does_not_divide_by_zero() {
    let mut uniforms = FrameUniforms::default();
    uniforms.resize(&Viewport::new(0.0, 0.0, 1.0));
    assert!(uniforms.anti_alias.inverse_resolution.iter().all(|v| v.is_finite()));
}

#[test]
fn context_delta_never_negative() {
    let mut ctx = SimulationContext::default();
    ctx.advance(0.5);
    assert_eq!((ctx.elapsed, ctx.delta, ctx.frame), (0.5, 0.5, 1));
    ctx.advance(0.75);
    assert_eq!(ctx.delta, 0.25);
    ctx.advance(0.6);
    assert_eq!((ctx.elapsed, ctx.delta, ctx.frame), (0.75, 0.0, 3));
}

#[test]
fn params_clamp_to_panel_ranges() {
    let flow = FlowParams {
        influence: 1.5,
        strength: -2.0,
        frequency: 0.25,
    }
    .clamped();
    assert_eq!(
        flow,
        FlowParams {
            influence: 1.0,
            strength: 0.0,
            frequency: 0.25,
        }
    );

    let render = RenderParams {
        point_size: 4.0,
        ..RenderParams::default()
    }
    .clamped();
    assert_eq!(render.point_size, 1.0);
    assert_eq!(render.clear_color, RenderParams::default().clear_color);
}

#[test]
fn config_defaults_and_flags() {
    let config = ParticlesConfig::default();
    assert_eq!(config.mesh, "lotus.glb");
    assert!(!config.no_msaa && !config.parallax && !config.debug_view);

    let config = ParticlesConfig::parse_from([
        "gpgpu_lotus",
        "--mesh",
        "bunny.glb",
        "--seed",
        "42",
        "--no-msaa",
        "--parallax",
    ]);
    assert_eq!(config.mesh, "bunny.glb");
    assert_eq!(config.seed, 42);
    assert!(config.no_msaa && config.parallax);
}
