use bevy::prelude::*;
use bevy::render::render_asset::RenderAssets;
use bevy::render::render_resource::*;
use bevy::render::renderer::{RenderDevice, RenderQueue};
use bevy::render::texture::GpuImage;
use bevy::render::Extract;

use crate::cpu::encoder::StateGrid;
use crate::gpu::buffers::GpuComputeStage;
use crate::gpu::ffi::{DrawUniform, ParticleInstance};
use crate::params::RenderParams;
use crate::viewport::FrameUniforms;

// ---------------- Types ----------------

/// Marks the entity whose transform places the whole point cloud.
#[derive(Component)]
pub struct ParticleCloud;

/// The camera that renders and composites the cloud.
#[derive(Component)]
pub struct ParticleCamera;

/// Point batch owned by the app world. `instances` holds one
/// `ParticleInstance` per particle and is never rewritten.
#[derive(Resource)]
pub struct ParticleRenderStage {
    pub instances: Buffer,
    pub grid: StateGrid,
}

/// State texture the draw samples this frame. Re-fetched after every step.
#[derive(Resource, Default)]
pub struct DrawSource(pub Option<Handle<Image>>);

#[derive(Resource, Clone)]
pub struct ExtractedDraw {
    pub state: Handle<Image>,
    pub instances: Buffer,
    pub count: u32,
}

#[derive(Resource)]
pub struct DrawResources {
    pub layout: BindGroupLayout,
    pub sampler: Sampler,
    pub uniform: Buffer,
}

#[derive(Resource)]
pub struct DrawBindGroup(pub BindGroup);

#[derive(Resource)]
pub struct QuadVertexBuffer {
    pub buffer: Buffer,
}

const QUAD_VERTS: &[[f32; 2]] = &[
    [-0.5, -0.5],
    [0.5, -0.5],
    [0.5, 0.5],
    [-0.5, -0.5],
    [0.5, 0.5],
    [-0.5, 0.5],
];

impl ParticleRenderStage {
    pub fn new(render_device: &RenderDevice, grid: StateGrid, instances: &[ParticleInstance]) -> Self {
        let instances = render_device.create_buffer_with_data(&BufferInitDescriptor {
            label: Some("particle_instances"),
            contents: bytemuck::cast_slice(instances),
            usage: BufferUsages::VERTEX,
        });
        Self { instances, grid }
    }
}

// ---------------- Systems (App world) ----------------

/// Points the draw at the texture the step just wrote. Runs after every
/// step; handles fetched before the step are stale.
pub fn refresh_draw_source(stage: Res<GpuComputeStage>, mut source: ResMut<DrawSource>) -> Result {
    let current = stage.current_state()?;
    if source.0.as_ref() != Some(current) {
        source.0 = Some(current.clone());
    }
    Ok(())
}

pub fn update_draw_uniform(
    params: Res<RenderParams>,
    stage: Res<GpuComputeStage>,
    camera: Query<(&Camera, &Transform), With<ParticleCamera>>,
    cloud: Query<&Transform, With<ParticleCloud>>,
    mut uniforms: ResMut<FrameUniforms>,
) -> Result {
    let (Ok((camera, camera_transform)), Ok(cloud_transform)) = (camera.single(), cloud.single())
    else {
        return Ok(());
    };

    let view_from_world = camera_transform.compute_matrix().inverse();
    let clip_from_world = camera.clip_from_view() * view_from_world;

    let draw = &mut uniforms.draw;
    draw.clip_from_world = clip_from_world.to_cols_array_2d();
    draw.world_from_local = cloud_transform.compute_matrix().to_cols_array_2d();
    draw.point_size = params.clamped().point_size;
    draw.side = stage.grid()?.side as f32;
    Ok(())
}

pub fn extract_draw(
    mut commands: Commands,
    stage: Extract<Option<Res<ParticleRenderStage>>>,
    source: Extract<Res<DrawSource>>,
) {
    let (Some(stage), Some(state)) = (stage.as_ref(), source.0.as_ref()) else {
        commands.remove_resource::<ExtractedDraw>();
        return;
    };
    commands.insert_resource(ExtractedDraw {
        state: state.clone(),
        instances: stage.instances.clone(),
        count: stage.grid.count,
    });
}

// ---------------- Systems (Render world) ----------------

impl FromWorld for DrawResources {
    fn from_world(world: &mut World) -> Self {
        let rd = world.resource::<RenderDevice>();

        // Layout: 0 = state texture, 1 = nearest sampler, 2 = draw UBO
        let layout = rd.create_bind_group_layout(
            Some("draw_bgl"),
            &[
                BindGroupLayoutEntry {
                    binding: 0,
                    visibility: ShaderStages::VERTEX, // positions are fetched per vertex
                    ty: BindingType::Texture {
                        sample_type: TextureSampleType::Float { filterable: false },
                        view_dimension: TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                BindGroupLayoutEntry {
                    binding: 1,
                    visibility: ShaderStages::VERTEX,
                    ty: BindingType::Sampler(SamplerBindingType::NonFiltering),
                    count: None,
                },
                BindGroupLayoutEntry {
                    binding: 2,
                    visibility: ShaderStages::VERTEX | ShaderStages::FRAGMENT,
                    ty: BindingType::Buffer {
                        ty: BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
        );

        let sampler = rd.create_sampler(&SamplerDescriptor {
            label: Some("particle_state_sampler"),
            mag_filter: FilterMode::Nearest,
            min_filter: FilterMode::Nearest,
            ..default()
        });

        let uniform = rd.create_buffer_with_data(&BufferInitDescriptor {
            label: Some("draw_uniform"),
            contents: bytemuck::bytes_of(&DrawUniform::default()),
            usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
        });

        info!("draw resources READY");
        DrawResources {
            layout,
            sampler,
            uniform,
        }
    }
}

impl FromWorld for QuadVertexBuffer {
    fn from_world(world: &mut World) -> Self {
        let rd = world.resource::<RenderDevice>();
        let buffer = rd.create_buffer_with_data(&BufferInitDescriptor {
            label: Some("particle_quad_vb"),
            contents: bytemuck::cast_slice(QUAD_VERTS),
            usage: BufferUsages::VERTEX,
        });
        QuadVertexBuffer { buffer }
    }
}

// Create the BG: state texture + sampler + draw UBO
pub fn prepare_draw_bind_group(
    mut commands: Commands,
    rd: Res<RenderDevice>,
    rq: Res<RenderQueue>,
    resources: Res<DrawResources>,
    draw: Option<Res<ExtractedDraw>>,
    uniforms: Option<Res<FrameUniforms>>,
    gpu_images: Res<RenderAssets<GpuImage>>,
) {
    let (Some(draw), Some(uniforms)) = (draw, uniforms) else {
        commands.remove_resource::<DrawBindGroup>();
        return;
    };
    let Some(state) = gpu_images.get(&draw.state) else {
        commands.remove_resource::<DrawBindGroup>();
        return;
    };

    rq.write_buffer(&resources.uniform, 0, bytemuck::bytes_of(&uniforms.draw));

    let bg = rd.create_bind_group(
        Some("draw_bg"),
        &resources.layout,
        &[
            BindGroupEntry {
                binding: 0,
                resource: BindingResource::TextureView(&state.texture_view),
            },
            BindGroupEntry {
                binding: 1,
                resource: BindingResource::Sampler(&resources.sampler),
            },
            BindGroupEntry {
                binding: 2,
                resource: resources.uniform.as_entire_binding(),
            },
        ],
    );
    commands.insert_resource(DrawBindGroup(bg));
}
