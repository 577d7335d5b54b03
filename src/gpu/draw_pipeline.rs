use bevy::asset::AssetServer;
use bevy::prelude::*;
use bevy::render::render_resource::{
    BlendState, CachedPipelineState, CachedRenderPipelineId, ColorTargetState, ColorWrites,
    FragmentState, MultisampleState, PipelineCache, PrimitiveState, RenderPipelineDescriptor,
    Shader, VertexAttribute, VertexBufferLayout, VertexFormat, VertexState, VertexStepMode,
};
use bevy::render::view::ViewTarget;

use super::draw_buffers::DrawResources;
use super::ffi::ParticleInstance;
use super::pipeline::PipelineHealth;
use crate::composite::CompositePlan;

#[derive(Resource)]
pub struct DrawPipeline(pub CachedRenderPipelineId);

pub fn prepare_draw_pipeline(
    mut commands: Commands,
    cache: Res<PipelineCache>,
    resources: Res<DrawResources>,
    plan: Option<Res<CompositePlan>>,
    assets: Res<AssetServer>,
    mut cached: Local<Option<CachedRenderPipelineId>>,
    mut reported: Local<bool>,
    health: Res<PipelineHealth>,
) {
    // the sample count has to match the view, which is known once the plan is
    let Some(plan) = plan else {
        return;
    };

    if cached.is_none() {
        let shader: Handle<Shader> = assets.load("shaders/particles_draw.wgsl");

        let quad_layout = VertexBufferLayout {
            array_stride: std::mem::size_of::<[f32; 2]>() as u64,
            step_mode: VertexStepMode::Vertex,
            attributes: vec![VertexAttribute {
                format: VertexFormat::Float32x2,
                offset: 0,
                shader_location: 0,
            }],
        };
        let instance_layout = VertexBufferLayout {
            array_stride: std::mem::size_of::<ParticleInstance>() as u64,
            step_mode: VertexStepMode::Instance,
            attributes: vec![
                // uv into the state texture
                VertexAttribute {
                    format: VertexFormat::Float32x2,
                    offset: 0,
                    shader_location: 1,
                },
                // size factor
                VertexAttribute {
                    format: VertexFormat::Float32,
                    offset: std::mem::size_of::<[f32; 2]>() as u64,
                    shader_location: 2,
                },
            ],
        };

        let desc = RenderPipelineDescriptor {
            label: Some("particles_draw_pipeline".into()),
            layout: vec![resources.layout.clone()],
            vertex: VertexState {
                shader: shader.clone(),
                entry_point: "vs_main".into(),
                shader_defs: vec![],
                buffers: vec![quad_layout, instance_layout],
            },
            fragment: Some(FragmentState {
                shader,
                entry_point: "fs_main".into(),
                shader_defs: vec![],
                targets: vec![Some(ColorTargetState {
                    format: ViewTarget::TEXTURE_FORMAT_HDR,
                    blend: Some(BlendState::ALPHA_BLENDING),
                    write_mask: ColorWrites::ALL,
                })],
            }),
            primitive: PrimitiveState::default(),
            depth_stencil: None,
            multisample: MultisampleState {
                count: plan.sample_count(),
                ..Default::default()
            },
            push_constant_ranges: vec![],
            zero_initialize_workgroup_memory: false,
        };

        let id = cache.queue_render_pipeline(desc);
        *cached = Some(id);
        info!("draw_pipeline QUEUED ({} samples)", plan.sample_count());
        return;
    }

    if *reported {
        return;
    }

    if let Some(id) = *cached {
        match cache.get_render_pipeline_state(id) {
            CachedPipelineState::Ok(_) => {
                info!("draw_pipeline READY");
                commands.insert_resource(DrawPipeline(id));
                *reported = true;
            }
            CachedPipelineState::Err(err) => {
                error!("draw_pipeline ERROR: {err:?}");
                health.report("particles_draw_pipeline", format!("{err:?}"));
                *reported = true;
            }
            CachedPipelineState::Queued | CachedPipelineState::Creating(_) => {}
        }
    }
}
