use bevy::asset::RenderAssetUsages;
use bevy::image::ImageSampler;
use bevy::prelude::*;
use bevy::render::render_asset::RenderAssets;
use bevy::render::render_resource::{
    BindGroup, BindGroupEntry, BindGroupLayout, BindGroupLayoutEntry, BindingResource,
    BindingType, Buffer, BufferBindingType, BufferInitDescriptor, BufferUsages, Extent3d,
    ShaderStages, StorageTextureAccess, TextureDimension, TextureFormat, TextureSampleType,
    TextureUsages, TextureViewDimension,
};
use bevy::render::renderer::{RenderDevice, RenderQueue};
use bevy::render::texture::GpuImage;
use bevy::render::Extract;

use crate::context::SimulationContext;
use crate::cpu::encoder::{EncodedState, StateGrid};
use crate::cpu::flow::BASE_RECALL_RATE;
use crate::cpu::ping_pong::{ComputeStage, FlowBackend};
use crate::gpu::ffi::FlowUniform;
use crate::params::FlowParams;

pub const STATE_FORMAT: TextureFormat = TextureFormat::Rgba32Float;
pub const STATE_FORMAT_NAME: &str = "Rgba32Float";

/// The compute stage as the app sees it: slots are image handles.
pub type GpuComputeStage = ComputeStage<Handle<Image>>;

// ==================== resources ======================================

/// One recorded flow step: read `read` (+ `base`), write `write`.
#[derive(Clone, Debug)]
pub struct StepDispatch {
    pub read: Handle<Image>,
    pub write: Handle<Image>,
    pub base: Handle<Image>,
    pub uniform: FlowUniform,
}

// App world: filled by the step system, consumed by extraction
#[derive(Resource, Default)]
pub struct PendingStep(pub Option<StepDispatch>);

// Render world copy
#[derive(Resource, Default)]
pub struct ExtractedStep(pub Option<StepDispatch>);

#[derive(Resource, Clone)]
pub struct FlowBindGroupLayout(pub BindGroupLayout);

#[derive(Resource)]
pub struct FlowBindGroup {
    pub bind_group: BindGroup,
    pub side: u32,
}

#[derive(Resource)]
pub struct FlowUniformBuffer {
    pub buffer: Buffer,
}

// =====================================================================

// ========================== backend ==================================

/// Allocates state slots as storage images and turns `advance` into a
/// dispatch the render graph runs before the camera draws.
pub struct GpuFlowBackend<'a> {
    pub images: &'a mut Assets<Image>,
    pub pending: &'a mut PendingStep,
}

pub fn state_image(state: &EncodedState) -> Image {
    let size = Extent3d {
        width: state.grid.side,
        height: state.grid.side,
        depth_or_array_layers: 1,
    };
    let mut image = Image::new(
        size,
        TextureDimension::D2,
        state.as_bytes().to_vec(),
        STATE_FORMAT,
        RenderAssetUsages::RENDER_WORLD,
    );
    image.texture_descriptor.usage =
        TextureUsages::COPY_DST | TextureUsages::STORAGE_BINDING | TextureUsages::TEXTURE_BINDING;
    image.sampler = ImageSampler::nearest();
    image
}

impl FlowBackend for GpuFlowBackend<'_> {
    type Slot = Handle<Image>;

    fn allocate(&mut self, state: &EncodedState) -> Self::Slot {
        self.images.add(state_image(state))
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
        self.pending.0 = Some(StepDispatch {
            read: read.clone(),
            write: write.clone(),
            base: base.clone(),
            uniform: flow_uniform(grid, ctx, params),
        });
    }
}

pub fn flow_uniform(grid: &StateGrid, ctx: &SimulationContext, params: &FlowParams) -> FlowUniform {
    FlowUniform {
        elapsed: ctx.elapsed,
        delta: ctx.delta,
        influence: params.influence,
        strength: params.strength,
        frequency: params.frequency,
        recall: BASE_RECALL_RATE,
        side: grid.side,
        count: grid.count,
    }
}

// =====================================================================

// ========================== systems ==================================

// Update systems (App world)

pub fn step_simulation(
    ctx: Res<SimulationContext>,
    params: Res<FlowParams>,
    mut stage: ResMut<GpuComputeStage>,
    mut images: ResMut<Assets<Image>>,
    mut pending: ResMut<PendingStep>,
) -> Result {
    let mut backend = GpuFlowBackend {
        images: &mut *images,
        pending: &mut *pending,
    };
    stage.step(&mut backend, &ctx, &params.clamped())?;
    Ok(())
}

// Extract systems that send from App to Render

pub fn extract_step(mut commands: Commands, pending: Extract<Res<PendingStep>>) {
    commands.insert_resource(ExtractedStep(pending.0.clone()));
}

// Render world

impl FromWorld for FlowBindGroupLayout {
    fn from_world(world: &mut World) -> Self {
        let render_device = world.resource::<RenderDevice>();
        let state_texture = BindingType::Texture {
            sample_type: TextureSampleType::Float { filterable: false },
            view_dimension: TextureViewDimension::D2,
            multisampled: false,
        };
        let layout = render_device.create_bind_group_layout(
            Some("flow_bind_group_layout"),
            &[
                // binding 0: previous state
                BindGroupLayoutEntry {
                    binding: 0,
                    visibility: ShaderStages::COMPUTE,
                    ty: state_texture,
                    count: None,
                },
                // binding 1: base (mesh) state
                BindGroupLayoutEntry {
                    binding: 1,
                    visibility: ShaderStages::COMPUTE,
                    ty: state_texture,
                    count: None,
                },
                // binding 2: next state
                BindGroupLayoutEntry {
                    binding: 2,
                    visibility: ShaderStages::COMPUTE,
                    ty: BindingType::StorageTexture {
                        access: StorageTextureAccess::WriteOnly,
                        format: STATE_FORMAT,
                        view_dimension: TextureViewDimension::D2,
                    },
                    count: None,
                },
                // binding 3: FlowUniform
                BindGroupLayoutEntry {
                    binding: 3,
                    visibility: ShaderStages::COMPUTE,
                    ty: BindingType::Buffer {
                        ty: BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
        );
        FlowBindGroupLayout(layout)
    }
}

impl FromWorld for FlowUniformBuffer {
    fn from_world(world: &mut World) -> Self {
        let render_device = world.resource::<RenderDevice>();
        let buffer = render_device.create_buffer_with_data(&BufferInitDescriptor {
            label: Some("flow_uniform"),
            contents: bytemuck::bytes_of(&FlowUniform::default()),
            usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
        });
        FlowUniformBuffer { buffer }
    }
}

pub fn prepare_flow_bind_group(
    mut commands: Commands,
    render_device: Res<RenderDevice>,
    render_queue: Res<RenderQueue>,
    layout: Res<FlowBindGroupLayout>,
    uniform: Res<FlowUniformBuffer>,
    step: Option<Res<ExtractedStep>>,
    gpu_images: Res<RenderAssets<GpuImage>>,
) {
    let Some(dispatch) = step.as_ref().and_then(|s| s.0.as_ref()) else {
        commands.remove_resource::<FlowBindGroup>();
        return;
    };

    // images upload a frame or two after creation; skip until all three exist
    let (Some(read), Some(base), Some(write)) = (
        gpu_images.get(&dispatch.read),
        gpu_images.get(&dispatch.base),
        gpu_images.get(&dispatch.write),
    ) else {
        commands.remove_resource::<FlowBindGroup>();
        return;
    };

    render_queue.write_buffer(&uniform.buffer, 0, bytemuck::bytes_of(&dispatch.uniform));

    let bind_group = render_device.create_bind_group(
        Some("flow_bind_group"),
        &layout.0,
        &[
            BindGroupEntry {
                binding: 0,
                resource: BindingResource::TextureView(&read.texture_view),
            },
            BindGroupEntry {
                binding: 1,
                resource: BindingResource::TextureView(&base.texture_view),
            },
            BindGroupEntry {
                binding: 2,
                resource: BindingResource::TextureView(&write.texture_view),
            },
            BindGroupEntry {
                binding: 3,
                resource: uniform.buffer.as_entire_binding(),
            },
        ],
    );
    commands.insert_resource(FlowBindGroup {
        bind_group,
        side: dispatch.uniform.side,
    });
}
