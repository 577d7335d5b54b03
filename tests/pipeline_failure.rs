use bevy::prelude::*;
use bevy_gpgpu_particles::error::SetupError;
use bevy_gpgpu_particles::gpu::pipeline::{exit_on_pipeline_failure, PipelineHealth};

fn watching_app(health: PipelineHealth) -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins)
        .insert_resource(health)
        .add_systems(Update, exit_on_pipeline_failure);
    app
}

#[test]
fn healthy_pipelines_keep_running() {
    let mut app = watching_app(PipelineHealth::default());
    app.update();
    app.update();
    assert_eq!(app.should_exit(), None);
}

#[test]
fn failed_shader_exits_with_an_error() {
    let health = PipelineHealth::default();
    // the render world holds a clone of the same handle
    let render_side = health.clone();
    let mut app = watching_app(health);
    app.update();

    render_side.report("flow_pipeline", "entry point `main` not found".into());
    app.update();

    assert_eq!(app.should_exit(), Some(AppExit::error()));
}

#[test]
fn first_failure_is_the_one_reported() {
    let health = PipelineHealth::default();
    assert!(health.failure().is_none());

    health.report("flow_pipeline", "bad binding".into());
    health.report("color_shift", "fallout".into());

    match health.failure() {
        Some(SetupError::PipelineFailed { pipeline, reason }) => {
            assert_eq!(pipeline, "flow_pipeline");
            assert_eq!(reason, "bad binding");
        }
        other => panic!("unexpected {other:?}"),
    }
}
