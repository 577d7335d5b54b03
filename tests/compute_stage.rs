use bevy_gpgpu_particles::context::SimulationContext;
use bevy_gpgpu_particles::cpu::encoder::{encode_particles, EncodedState};
use bevy_gpgpu_particles::cpu::flow::{advect, flow_field, flow_gate, CpuFlowBackend};
use bevy_gpgpu_particles::cpu::ping_pong::{ComputeStage, PingPong};
use bevy_gpgpu_particles::error::ComputeError;
use bevy_gpgpu_particles::params::FlowParams;
use glam::Vec3;
use rand::rngs::StdRng;
use rand::SeedableRng;

type CpuStage = ComputeStage<Vec<[f32; 4]>>;

fn cloud(n: usize) -> EncodedState {
    let positions: Vec<Vec3> = (0..n)
        .map(|i| {
            let t = i as f32 * 0.37;
            Vec3::new(t.cos() * 2.0, (t * 0.5).sin(), t.sin() * 2.0)
        })
        .collect();
    encode_particles(&positions, &mut StdRng::seed_from_u64(1)).unwrap()
}

fn ready_stage(state: &EncodedState) -> CpuStage {
    let mut stage = CpuStage::default();
    stage.initialize(&mut CpuFlowBackend, state);
    stage
}

#[test]
fn ping_pong_roles_flip() {
    let mut pair = PingPong::new('a', 'b');
    assert_eq!((*pair.read(), *pair.write()), ('a', 'b'));
    pair.swap();
    assert_eq!((*pair.read(), *pair.write()), ('b', 'a'));
    assert_eq!(pair.current_index(), 1);
    assert_eq!(pair.write_index(), 0);

    let (read, write) = pair.split();
    assert_eq!(*read, 'b');
    *write = 'c';
    pair.swap();
    assert_eq!(*pair.read(), 'c');
}

#[test]
fn stage_refuses_work_before_initialize() {
    let mut stage = CpuStage::default();
    let ctx = SimulationContext::new(1.0, 0.016);

    assert!(!stage.is_initialized());
    assert_eq!(
        stage.step(&mut CpuFlowBackend, &ctx, &FlowParams::default()),
        Err(ComputeError::Uninitialized)
    );
    assert_eq!(stage.current_state().err(), Some(ComputeError::Uninitialized));
    assert_eq!(stage.current_index().err(), Some(ComputeError::Uninitialized));
    assert_eq!(stage.base_state().err(), Some(ComputeError::Uninitialized));
}

#[test]
fn current_slot_alternates_every_step() {
    let state = cloud(20);
    let mut stage = ready_stage(&state);
    let params = FlowParams::default();

    assert_eq!(stage.current_index(), Ok(0));
    for k in 1..=9 {
        let ctx = SimulationContext::new(k as f32 * 0.016, 0.016);
        stage.step(&mut CpuFlowBackend, &ctx, &params).unwrap();
        assert_eq!(stage.current_index(), Ok(k % 2));
    }
}

#[test]
fn zero_delta_leaves_positions_unchanged() {
    let state = cloud(30);
    let mut stage = ready_stage(&state);
    let params = FlowParams::default();

    for elapsed in [0.0, 0.0, 3.5, 100.0] {
        let ctx = SimulationContext::new(elapsed, 0.0);
        stage.step(&mut CpuFlowBackend, &ctx, &params).unwrap();
        assert_eq!(stage.current_state().unwrap(), &state.texels);
    }
}

#[test]
fn step_writes_advected_positions_into_current() {
    let state = cloud(12);
    let mut stage = ready_stage(&state);
    let params = FlowParams {
        influence: 1.0,
        strength: 5.0,
        frequency: 0.8,
    };
    let ctx = SimulationContext::new(2.0, 0.05);

    stage.step(&mut CpuFlowBackend, &ctx, &params).unwrap();
    let next = stage.current_state().unwrap();

    for i in 0..12 {
        let before = state.particle(i).unwrap();
        let pos = Vec3::new(before[0], before[1], before[2]);
        let expected = advect(pos, pos, &ctx, &params);
        assert_eq!(&next[i][..3], &expected.to_array()[..]);
    }
    assert_ne!(next, &state.texels);
}

#[test]
fn phase_and_padding_survive_steps() {
    let state = cloud(7); // side 3, two padding texels
    let mut stage = ready_stage(&state);
    let params = FlowParams::default();

    for k in 1..=5 {
        let ctx = SimulationContext::new(k as f32 * 0.1, 0.1);
        stage.step(&mut CpuFlowBackend, &ctx, &params).unwrap();
    }
    let now = stage.current_state().unwrap();
    for (after, before) in now.iter().zip(&state.texels) {
        assert_eq!(after[3], before[3]);
    }
    assert_eq!(now[7..], state.texels[7..]);
    assert_eq!(stage.base_state().unwrap(), &state.texels);
}

#[test]
fn recall_pulls_towards_base_and_never_overshoots() {
    let quiet = FlowParams {
        strength: 0.0,
        ..FlowParams::default()
    };
    let pos = Vec3::new(1.0, 0.0, 0.0);

    let small = advect(pos, Vec3::ZERO, &SimulationContext::new(1.0, 0.1), &quiet);
    assert!((small.x - 0.95).abs() < 1e-6);

    // a long stall snaps home instead of flying past it
    let stalled = advect(pos, Vec3::ZERO, &SimulationContext::new(1.0, 10.0), &quiet);
    assert_eq!(stalled, Vec3::ZERO);
}

#[test]
fn more_influence_never_weakens_the_gate() {
    for i in 0..50 {
        let q = Vec3::new(i as f32 * 0.13, i as f32 * -0.07, i as f32 * 0.29);
        let t = i as f32 * 0.2;
        let mut last = 0.0;
        for step in 0..=10 {
            let gate = flow_gate(q, t, step as f32 / 10.0);
            assert!((0.0..=1.0).contains(&gate));
            assert!(gate >= last - 1e-6);
            last = gate;
        }
    }
}

#[test]
fn field_components_are_bounded() {
    for i in 0..200 {
        let q = Vec3::new(i as f32 * 0.7, i as f32 * -1.1, i as f32 * 0.3);
        let f = flow_field(q, i as f32 * 0.05);
        assert!(f.abs().max_element() <= 1.0 + 1e-6);
    }
}
