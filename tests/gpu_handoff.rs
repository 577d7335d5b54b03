use bevy::asset::AssetPlugin;
use bevy::prelude::*;
use bevy_gpgpu_particles::context::SimulationContext;
use bevy_gpgpu_particles::cpu::encoder::encode_particles;
use bevy_gpgpu_particles::gpu::buffers::{
    step_simulation, GpuComputeStage, GpuFlowBackend, PendingStep,
};
use bevy_gpgpu_particles::gpu::draw_buffers::{refresh_draw_source, DrawSource};
use bevy_gpgpu_particles::params::FlowParams;
use rand::rngs::StdRng;
use rand::SeedableRng;

// headless app running only the step and the draw-source refresh
fn stepping_app() -> App {
    let mut app = App::new();
    app.add_plugins((MinimalPlugins, AssetPlugin::default()))
        .init_asset::<Image>()
        .init_resource::<SimulationContext>()
        .init_resource::<FlowParams>()
        .init_resource::<GpuComputeStage>()
        .init_resource::<PendingStep>()
        .init_resource::<DrawSource>()
        .add_systems(Update, (step_simulation, refresh_draw_source).chain());

    let positions: Vec<glam::Vec3> = (0..10).map(|i| glam::Vec3::splat(i as f32)).collect();
    let state = encode_particles(&positions, &mut StdRng::seed_from_u64(5)).unwrap();

    let world = app.world_mut();
    world.resource_scope(|world, mut stage: Mut<GpuComputeStage>| {
        world.resource_scope(|world, mut pending: Mut<PendingStep>| {
            let mut images = world.resource_mut::<Assets<Image>>();
            let mut backend = GpuFlowBackend {
                images: &mut *images,
                pending: &mut *pending,
            };
            stage.initialize(&mut backend, &state);
        });
    });
    app
}

fn current(app: &App) -> Handle<Image> {
    app.world()
        .resource::<GpuComputeStage>()
        .current_state()
        .unwrap()
        .clone()
}

#[test]
fn initialize_allocates_three_distinct_images() {
    let app = stepping_app();
    let stage = app.world().resource::<GpuComputeStage>();
    let base = stage.base_state().unwrap().clone();

    assert_eq!(app.world().resource::<Assets<Image>>().len(), 3);
    assert_ne!(current(&app), base);
    // nothing recorded until the first tick
    assert!(app.world().resource::<PendingStep>().0.is_none());
}

#[test]
fn dispatch_reads_previous_and_writes_the_other_slot() {
    let mut app = stepping_app();
    let before = current(&app);

    app.update();

    let after = current(&app);
    let dispatch = app.world().resource::<PendingStep>().0.clone().unwrap();
    assert_eq!(dispatch.read, before);
    assert_eq!(dispatch.write, after);
    assert_ne!(dispatch.read, dispatch.write);
    assert_eq!(
        &dispatch.base,
        app.world().resource::<GpuComputeStage>().base_state().unwrap()
    );
    assert_eq!(dispatch.uniform.count, 10);
    assert_eq!(dispatch.uniform.side, 4);
}

#[test]
fn draw_binds_the_texture_just_written() {
    let mut app = stepping_app();

    for _ in 0..3 {
        app.update();
        let written = app.world().resource::<PendingStep>().0.clone().unwrap().write;
        assert_eq!(app.world().resource::<DrawSource>().0, Some(written));
    }
}

#[test]
fn roles_return_after_two_steps() {
    let mut app = stepping_app();
    let start = current(&app);

    app.update();
    let first = current(&app);
    assert_ne!(first, start);
    assert_eq!(app.world().resource::<GpuComputeStage>().current_index(), Ok(1));

    app.update();
    assert_eq!(current(&app), start);
    assert_eq!(app.world().resource::<GpuComputeStage>().current_index(), Ok(0));

    app.update();
    assert_eq!(current(&app), first);
}
