//! Full-screen passes that run after the scene, in this order:
//! color shift -> gamma correction -> (fallback anti-aliasing).
//!
//! All three share one node type; what differs is the shader, the slice
//! of `FrameUniforms` they upload and the view marker that decides
//! whether the node runs at all.

use std::marker::PhantomData;

use bevy::core_pipeline::fullscreen_vertex_shader::fullscreen_shader_vertex_state;
use bevy::ecs::query::QueryItem;
use bevy::prelude::*;
use bevy::render::extract_component::ExtractComponent;
use bevy::render::render_graph::{NodeRunError, RenderGraphContext, RenderLabel, ViewNode};
use bevy::render::render_resource::*;
use bevy::render::renderer::{RenderContext, RenderDevice, RenderQueue};
use bevy::render::view::ViewTarget;

use crate::gpu::ffi::{AntiAliasUniform, ColorShiftUniform, GammaUniform};
use crate::gpu::pipeline::PipelineHealth;
use crate::viewport::FrameUniforms;

#[derive(Debug, Hash, PartialEq, Eq, Clone, Copy, RenderLabel)]
pub enum CompositeLabel {
    ColorShift,
    GammaCorrection,
    FallbackAntiAlias,
}

/// On every camera that goes through the compositing chain.
#[derive(Component, ExtractComponent, Clone, Copy, Default)]
pub struct CompositeView;

/// Only present when the plan picked the post-pass anti-aliasing path.
#[derive(Component, ExtractComponent, Clone, Copy, Default)]
pub struct FallbackAntiAliasing;

pub trait FullscreenEffect: Send + Sync + 'static {
    type ViewMarker: Component;

    const LABEL: CompositeLabel;
    const NAME: &'static str;
    const SHADER: &'static str;

    fn uniform_bytes(uniforms: &FrameUniforms) -> &[u8];
}

pub struct ColorShift;
pub struct GammaCorrection;
pub struct FallbackAntiAlias;

impl FullscreenEffect for ColorShift {
    type ViewMarker = CompositeView;
    const LABEL: CompositeLabel = CompositeLabel::ColorShift;
    const NAME: &'static str = "color_shift";
    const SHADER: &'static str = "shaders/color_shift.wgsl";

    fn uniform_bytes(uniforms: &FrameUniforms) -> &[u8] {
        bytemuck::bytes_of::<ColorShiftUniform>(&uniforms.color_shift)
    }
}

impl FullscreenEffect for GammaCorrection {
    type ViewMarker = CompositeView;
    const LABEL: CompositeLabel = CompositeLabel::GammaCorrection;
    const NAME: &'static str = "gamma_correction";
    const SHADER: &'static str = "shaders/gamma_correction.wgsl";

    fn uniform_bytes(uniforms: &FrameUniforms) -> &[u8] {
        bytemuck::bytes_of::<GammaUniform>(&uniforms.gamma)
    }
}

impl FullscreenEffect for FallbackAntiAlias {
    type ViewMarker = FallbackAntiAliasing;
    const LABEL: CompositeLabel = CompositeLabel::FallbackAntiAlias;
    const NAME: &'static str = "fallback_anti_alias";
    const SHADER: &'static str = "shaders/fxaa.wgsl";

    fn uniform_bytes(uniforms: &FrameUniforms) -> &[u8] {
        bytemuck::bytes_of::<AntiAliasUniform>(&uniforms.anti_alias)
    }
}

// ---------------- Render world resources ----------------

#[derive(Resource)]
pub struct EffectPipeline<E: FullscreenEffect> {
    pub layout: BindGroupLayout,
    pub sampler: Sampler,
    pub uniform: Buffer,
    pub pipeline_id: CachedRenderPipelineId,
    _effect: PhantomData<E>,
}

impl<E: FullscreenEffect> FromWorld for EffectPipeline<E> {
    fn from_world(world: &mut World) -> Self {
        let render_device = world.resource::<RenderDevice>();

        // 0 = previous pass output, 1 = linear sampler, 2 = effect uniform
        let layout = render_device.create_bind_group_layout(
            Some(E::NAME),
            &[
                BindGroupLayoutEntry {
                    binding: 0,
                    visibility: ShaderStages::FRAGMENT,
                    ty: BindingType::Texture {
                        sample_type: TextureSampleType::Float { filterable: true },
                        view_dimension: TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                BindGroupLayoutEntry {
                    binding: 1,
                    visibility: ShaderStages::FRAGMENT,
                    ty: BindingType::Sampler(SamplerBindingType::Filtering),
                    count: None,
                },
                BindGroupLayoutEntry {
                    binding: 2,
                    visibility: ShaderStages::FRAGMENT,
                    ty: BindingType::Buffer {
                        ty: BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
        );

        let sampler = render_device.create_sampler(&SamplerDescriptor {
            label: Some(E::NAME),
            mag_filter: FilterMode::Linear,
            min_filter: FilterMode::Linear,
            ..default()
        });

        let uniform = render_device.create_buffer_with_data(&BufferInitDescriptor {
            label: Some(E::NAME),
            contents: E::uniform_bytes(&FrameUniforms::default()),
            usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
        });

        let shader: Handle<Shader> = world.resource::<AssetServer>().load(E::SHADER);

        let pipeline_id = world
            .resource_mut::<PipelineCache>()
            .queue_render_pipeline(RenderPipelineDescriptor {
                label: Some(E::NAME.into()),
                layout: vec![layout.clone()],
                vertex: fullscreen_shader_vertex_state(),
                fragment: Some(FragmentState {
                    shader,
                    shader_defs: vec![],
                    entry_point: "fragment".into(),
                    targets: vec![Some(ColorTargetState {
                        format: ViewTarget::TEXTURE_FORMAT_HDR,
                        blend: None,
                        write_mask: ColorWrites::ALL,
                    })],
                }),
                primitive: PrimitiveState::default(),
                depth_stencil: None,
                multisample: MultisampleState::default(),
                push_constant_ranges: vec![],
                zero_initialize_workgroup_memory: false,
            });

        info!("{} pipeline QUEUED", E::NAME);
        Self {
            layout,
            sampler,
            uniform,
            pipeline_id,
            _effect: PhantomData,
        }
    }
}

pub fn prepare_effect_uniform<E: FullscreenEffect>(
    rq: Res<RenderQueue>,
    pipeline: Res<EffectPipeline<E>>,
    uniforms: Option<Res<FrameUniforms>>,
) {
    let Some(uniforms) = uniforms else {
        return;
    };
    rq.write_buffer(&pipeline.uniform, 0, E::uniform_bytes(&uniforms));
}

pub fn watch_effect_pipeline<E: FullscreenEffect>(
    cache: Res<PipelineCache>,
    pipeline: Res<EffectPipeline<E>>,
    health: Res<PipelineHealth>,
    mut settled: Local<bool>,
) {
    if *settled {
        return;
    }
    match cache.get_render_pipeline_state(pipeline.pipeline_id) {
        CachedPipelineState::Ok(_) => {
            info!("{} pipeline READY", E::NAME);
            *settled = true;
        }
        CachedPipelineState::Err(err) => {
            error!("{} pipeline ERROR: {err:?}", E::NAME);
            health.report(E::NAME, format!("{err:?}"));
            *settled = true;
        }
        CachedPipelineState::Queued | CachedPipelineState::Creating(_) => {}
    }
}

// ---------------- Node ----------------

pub struct EffectNode<E>(PhantomData<E>);

impl<E> Default for EffectNode<E> {
    fn default() -> Self {
        Self(PhantomData)
    }
}

impl<E: FullscreenEffect> ViewNode for EffectNode<E> {
    type ViewQuery = (&'static ViewTarget, &'static E::ViewMarker);

    fn run(
        &self,
        _graph: &mut RenderGraphContext,
        render_context: &mut RenderContext,
        (view_target, _marker): QueryItem<Self::ViewQuery>,
        world: &World,
    ) -> Result<(), NodeRunError> {
        let effect = world.resource::<EffectPipeline<E>>();
        let cache = world.resource::<PipelineCache>();
        let Some(pipeline) = cache.get_render_pipeline(effect.pipeline_id) else {
            return Ok(());
        };

        // source = previous pass output, destination = next pass input
        let post_process = view_target.post_process_write();

        let bind_group = render_context.render_device().create_bind_group(
            Some(E::NAME),
            &effect.layout,
            &[
                BindGroupEntry {
                    binding: 0,
                    resource: BindingResource::TextureView(post_process.source),
                },
                BindGroupEntry {
                    binding: 1,
                    resource: BindingResource::Sampler(&effect.sampler),
                },
                BindGroupEntry {
                    binding: 2,
                    resource: effect.uniform.as_entire_binding(),
                },
            ],
        );

        let mut pass = render_context.begin_tracked_render_pass(RenderPassDescriptor {
            label: Some(E::NAME),
            color_attachments: &[Some(RenderPassColorAttachment {
                view: post_process.destination,
                resolve_target: None,
                ops: Operations::default(),
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        pass.set_render_pipeline(pipeline);
        pass.set_bind_group(0, &bind_group, &[]);
        pass.draw(0..3, 0..1);
        Ok(())
    }
}
