/* compute side of the particle simulation, same shape as bevy's
compute_shader_game_of_life example: a cached pipeline plus one graph node
that runs before the camera driver */

use std::borrow::Cow;
use std::sync::{Arc, OnceLock};

use bevy::prelude::*;
use bevy::render::graph::CameraDriverLabel;
use bevy::render::render_graph::{
    Node, NodeRunError, RenderGraph, RenderGraphContext, RenderLabel,
};
use bevy::render::render_resource::{
    CachedComputePipelineId, CachedPipelineState, ComputePassDescriptor, ComputePipeline,
    ComputePipelineDescriptor, PipelineCache, PushConstantRange, ShaderDefVal,
};
use bevy::render::renderer::RenderContext;

use crate::error::SetupError;
use crate::gpu::buffers::{FlowBindGroup, FlowBindGroupLayout};

const WORKGROUP_SIZE: u32 = 8;

#[derive(Resource)]
pub struct FlowPipeline(pub ComputePipeline);

#[derive(Debug, Hash, PartialEq, Eq, Clone, RenderLabel)]
pub struct FlowPassLabel;

/// One handle living in both worlds. The render world reports a pipeline
/// that failed to compile, the app world turns that into an exit.
#[derive(Resource, Clone, Default)]
pub struct PipelineHealth(Arc<OnceLock<(&'static str, String)>>);

impl PipelineHealth {
    pub fn report(&self, pipeline: &'static str, reason: String) {
        // first failure wins, later ones are usually fallout
        let _ = self.0.set((pipeline, reason));
    }

    pub fn failure(&self) -> Option<SetupError> {
        self.0.get().map(|(pipeline, reason)| SetupError::PipelineFailed {
            pipeline,
            reason: reason.clone(),
        })
    }
}

/// A broken pipeline is fatal: without it the cloud would freeze while the
/// state keeps swapping.
pub fn exit_on_pipeline_failure(
    health: Res<PipelineHealth>,
    mut exit: EventWriter<AppExit>,
    mut reported: Local<bool>,
) {
    if *reported {
        return;
    }
    if let Some(err) = health.failure() {
        error!("setup failed: {err}");
        exit.write(AppExit::error());
        *reported = true;
    }
}

#[derive(Default)]
struct FlowNode;

impl Node for FlowNode {
    fn run(
        &self,
        _graph: &mut RenderGraphContext,
        render_context: &mut RenderContext,
        world: &World,
    ) -> Result<(), NodeRunError> {
        // nothing to do until the pipeline compiled and a step was recorded
        let Some(pipeline) = world.get_resource::<FlowPipeline>() else { return Ok(()); };
        let Some(flow) = world.get_resource::<FlowBindGroup>() else { return Ok(()); };

        // one invocation per texel, padding included (the shader copies it through)
        let groups = flow.side.div_ceil(WORKGROUP_SIZE).max(1);

        let mut pass = render_context
            .command_encoder()
            .begin_compute_pass(&ComputePassDescriptor {
                label: Some("flow_pass"),
                ..default()
            });

        pass.set_pipeline(&pipeline.0);
        pass.set_bind_group(0, &flow.bind_group, &[]);
        pass.dispatch_workgroups(groups, groups, 1);

        Ok(())
    }
}

pub fn prepare_flow_pipeline(
    mut commands: Commands,
    pipeline_cache: Res<PipelineCache>,
    layout: Res<FlowBindGroupLayout>,
    mut pipeline_id: Local<Option<CachedComputePipelineId>>,
    mut ready: Local<bool>,
    assets: Res<AssetServer>,
    health: Res<PipelineHealth>,
) {
    if *ready {
        return;
    }

    let Some(id) = *pipeline_id else {
        let shader: Handle<Shader> = assets.load("shaders/gpgpu_particles.wgsl");
        let desc = ComputePipelineDescriptor {
            label: Some("flow_pipeline".into()),
            layout: vec![layout.0.clone()],
            push_constant_ranges: Vec::<PushConstantRange>::new(),
            shader,
            shader_defs: Vec::<ShaderDefVal>::new(),
            entry_point: Cow::from("main"),
            zero_initialize_workgroup_memory: false,
        };
        *pipeline_id = Some(pipeline_cache.queue_compute_pipeline(desc));
        return; // waits for compilation
    };

    match pipeline_cache.get_compute_pipeline_state(id) {
        CachedPipelineState::Ok(_) => {
            if let Some(pipeline) = pipeline_cache.get_compute_pipeline(id) {
                info!("flow pipeline ready");
                commands.insert_resource(FlowPipeline(pipeline.clone()));
                *ready = true;
            }
        }
        CachedPipelineState::Err(err) => {
            error!("flow pipeline ERROR: {err:?}");
            health.report("flow_pipeline", format!("{err:?}"));
            *ready = true;
        }
        _ => {}
    }
}

pub fn add_flow_node_to_graph(render_app: &mut bevy::app::SubApp) {
    let mut graph = render_app.world_mut().resource_mut::<RenderGraph>();
    graph.add_node(FlowPassLabel, FlowNode::default());
    graph.add_node_edge(FlowPassLabel, CameraDriverLabel);
}
