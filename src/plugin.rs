use bevy::core_pipeline::core_3d::graph::{Core3d, Node3d};
use bevy::core_pipeline::tonemapping::Tonemapping;
use bevy::ecs::system::SystemParam;
use bevy::prelude::*;
use bevy::render::extract_component::ExtractComponentPlugin;
use bevy::render::extract_resource::ExtractResourcePlugin;
use bevy::render::render_graph::{RenderGraphApp, ViewNodeRunner};
use bevy::render::render_resource::{TextureFormatFeatureFlags, TextureUsages};
use bevy::render::renderer::{RenderAdapter, RenderDevice};
use bevy::render::view::ViewTarget;
use bevy::render::{ExtractSchedule, Render, RenderApp, RenderSet};
use bevy::window::PrimaryWindow;
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::composite::{CompositePlan, RenderCapabilities};
use crate::config::ParticlesConfig;
use crate::context::{advance_simulation_context, SimulationContext};
use crate::cpu::encoder::encode_particles;
use crate::cpu::texel_map::particle_instances;
use crate::cursor::CursorVelocity;
use crate::debug_view::{spawn_debug_view, update_debug_view, StateDebugMaterial};
use crate::error::SetupError;
use crate::gpu::buffers::{
    extract_step, prepare_flow_bind_group, step_simulation, FlowBindGroupLayout,
    FlowUniformBuffer, GpuComputeStage, GpuFlowBackend, PendingStep, STATE_FORMAT,
    STATE_FORMAT_NAME,
};
use crate::gpu::draw_buffers::{
    extract_draw, prepare_draw_bind_group, refresh_draw_source, update_draw_uniform,
    DrawResources, DrawSource, ParticleCamera, ParticleCloud, ParticleRenderStage,
    QuadVertexBuffer,
};
use crate::gpu::draw_pass::{ParticlesDrawNode, ParticlesDrawPassLabel};
use crate::gpu::draw_pipeline::prepare_draw_pipeline;
use crate::gpu::pipeline::{
    add_flow_node_to_graph, exit_on_pipeline_failure, prepare_flow_pipeline, PipelineHealth,
};
use crate::gpu::post_process::{
    prepare_effect_uniform, watch_effect_pipeline, ColorShift, CompositeLabel, CompositeView,
    EffectNode, EffectPipeline, FallbackAntiAlias, FallbackAntiAliasing, FullscreenEffect,
    GammaCorrection,
};
use crate::input::{
    apply_clear_color, handle_resize, parallax_camera, sample_pointer, spin, tune_parameters,
    update_cursor_velocity,
};
use crate::mesh_source::{poll_mesh, request_mesh, MeshSource};
use crate::params::{FlowParams, RenderParams};
use crate::viewport::{FrameUniforms, Viewport};
use crate::{CameraParallax, ParallaxAnchor, Rotates, TuningControl};

const CAMERA_POSITION: Vec3 = Vec3::new(4.5, 4.0, 11.0);
const CAMERA_FOV_DEGREES: f32 = 35.0;
// xor'd into the seed so sizes don't replay the phase sequence
const SIZE_STREAM: u64 = 0x9e37_79b9_7f4a_7c15;

#[derive(States, Default, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimulationState {
    #[default]
    Loading,
    Running,
}

/// Per-tick order. Nothing reads a value produced by a later set.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameSet {
    Clock,
    Input,
    Velocity,
    Simulate,
    Render,
}

// ========================== setup ====================================

#[derive(SystemParam)]
pub struct PipelineBuilder<'w, 's> {
    commands: Commands<'w, 's>,
    config: Res<'w, ParticlesConfig>,
    render_device: Res<'w, RenderDevice>,
    render_adapter: Res<'w, RenderAdapter>,
    windows: Query<'w, 's, &'static Window, With<PrimaryWindow>>,
    images: ResMut<'w, Assets<Image>>,
    meshes: ResMut<'w, Assets<Mesh>>,
    debug_materials: ResMut<'w, Assets<StateDebugMaterial>>,
    stage: ResMut<'w, GpuComputeStage>,
    pending: ResMut<'w, PendingStep>,
    uniforms: ResMut<'w, FrameUniforms>,
}

impl PipelineBuilder<'_, '_> {
    fn capabilities(&self) -> Result<RenderCapabilities, SetupError> {
        let state_features = self.render_adapter.get_texture_format_features(STATE_FORMAT);
        if !state_features
            .allowed_usages
            .contains(TextureUsages::STORAGE_BINDING)
        {
            return Err(SetupError::UnsupportedStateFormat {
                format: STATE_FORMAT_NAME,
            });
        }

        let hdr_features = self
            .render_adapter
            .get_texture_format_features(ViewTarget::TEXTURE_FORMAT_HDR);
        let native_multisample = !self.config.no_msaa
            && hdr_features
                .flags
                .contains(TextureFormatFeatureFlags::MULTISAMPLE_X4);

        let pixel_ratio = self
            .windows
            .single()
            .map(|window| window.scale_factor())
            .unwrap_or(1.0);

        Ok(RenderCapabilities {
            pixel_ratio: Viewport::new(1.0, 1.0, pixel_ratio).pixel_ratio(),
            native_multisample,
        })
    }

    /// Everything the frame loop needs, built in one go from the mesh positions.
    fn build(&mut self, positions: &[glam::Vec3]) -> Result<(), SetupError> {
        let caps = self.capabilities()?;

        let mut rng = StdRng::seed_from_u64(self.config.seed);
        let encoded = encode_particles(positions, &mut rng)?;
        let mut size_rng = StdRng::seed_from_u64(self.config.seed ^ SIZE_STREAM);
        let instances = particle_instances(&encoded.grid, &mut size_rng);

        let mut backend = GpuFlowBackend {
            images: &mut *self.images,
            pending: &mut *self.pending,
        };
        self.stage.initialize(&mut backend, &encoded);
        info!(
            "{} particles in a {}x{} state texture",
            encoded.grid.count, encoded.grid.side, encoded.grid.side
        );

        self.commands.insert_resource(ParticleRenderStage::new(
            &self.render_device,
            encoded.grid,
            &instances,
        ));

        let plan = CompositePlan::resolve(&caps);
        info!("composite passes {:?} ({:?})", plan.passes(), plan.anti_aliasing);
        self.commands.insert_resource(plan);

        if let Ok(window) = self.windows.single() {
            let viewport = Viewport::new(window.width(), window.height(), window.scale_factor());
            self.uniforms.resize(&viewport);
        }

        let msaa = match plan.sample_count() {
            4 => Msaa::Sample4,
            _ => Msaa::Off,
        };
        let mut camera = self.commands.spawn((
            Camera3d::default(),
            Camera {
                hdr: true,
                ..default()
            },
            Projection::from(PerspectiveProjection {
                fov: CAMERA_FOV_DEGREES.to_radians(),
                near: 0.1,
                far: 100.0,
                ..default()
            }),
            Tonemapping::None,
            msaa,
            Transform::from_translation(CAMERA_POSITION).looking_at(Vec3::ZERO, Vec3::Y),
            ParticleCamera,
            CompositeView,
            ParallaxAnchor(CAMERA_POSITION),
        ));
        if plan.uses_fallback_pass() {
            camera.insert(FallbackAntiAliasing);
        }

        self.commands.spawn((
            Transform::default(),
            ParticleCloud,
            Rotates {
                axis: Vec3::Y,
                speed: self.config.angular_rate,
            },
        ));

        if self.config.debug_view {
            if let Ok(state) = self.stage.current_state() {
                spawn_debug_view(
                    &mut self.commands,
                    &mut *self.meshes,
                    &mut *self.debug_materials,
                    state.clone(),
                );
            }
        }
        Ok(())
    }
}

fn finish_loading(
    mut builder: PipelineBuilder,
    source: Res<MeshSource>,
    assets: Res<AssetServer>,
    mut next: ResMut<NextState<SimulationState>>,
    mut exit: EventWriter<AppExit>,
) {
    let result = {
        let meshes = &builder.meshes;
        poll_mesh(&source, &assets, meshes)
    };
    let outcome = match result {
        Ok(None) => return,
        Ok(Some(positions)) => builder.build(&positions),
        Err(err) => Err(err),
    };

    match outcome {
        Ok(()) => {
            info!("setup done, starting simulation");
            next.set(SimulationState::Running);
        }
        Err(err) => {
            error!("setup failed: {err}");
            exit.write(AppExit::error());
        }
    }
}

// =====================================================================

// Plugin

#[derive(Default)]
pub struct GpgpuParticlesPlugin {
    pub config: ParticlesConfig,
}

impl Plugin for GpgpuParticlesPlugin {
    fn build(&self, app: &mut App) {
        let health = PipelineHealth::default();

        // App
        app.insert_resource(self.config.clone())
            .insert_resource(health.clone())
            .insert_resource(CameraParallax {
                enabled: self.config.parallax,
                amount: self.config.parallax_amount,
            })
            .init_resource::<FlowParams>()
            .init_resource::<RenderParams>()
            .init_resource::<TuningControl>()
            .init_resource::<SimulationContext>()
            .init_resource::<CursorVelocity>()
            .init_resource::<GpuComputeStage>()
            .init_resource::<PendingStep>()
            .init_resource::<DrawSource>()
            .init_resource::<FrameUniforms>()
            .init_state::<SimulationState>()
            .add_plugins((
                MaterialPlugin::<StateDebugMaterial>::default(),
                ExtractResourcePlugin::<FrameUniforms>::default(),
                ExtractResourcePlugin::<CompositePlan>::default(),
                ExtractComponentPlugin::<CompositeView>::default(),
                ExtractComponentPlugin::<FallbackAntiAliasing>::default(),
            ))
            .configure_sets(
                Update,
                (
                    FrameSet::Clock,
                    FrameSet::Input,
                    FrameSet::Velocity,
                    FrameSet::Simulate,
                    FrameSet::Render,
                )
                    .chain()
                    .run_if(in_state(SimulationState::Running)),
            )
            .add_systems(Startup, request_mesh)
            .add_systems(Update, exit_on_pipeline_failure)
            .add_systems(
                Update,
                finish_loading.run_if(in_state(SimulationState::Loading)),
            )
            .add_systems(Update, advance_simulation_context.in_set(FrameSet::Clock))
            .add_systems(
                Update,
                (sample_pointer, handle_resize, tune_parameters, apply_clear_color)
                    .chain()
                    .in_set(FrameSet::Input),
            )
            .add_systems(
                Update,
                (update_cursor_velocity, parallax_camera)
                    .chain()
                    .in_set(FrameSet::Velocity),
            )
            .add_systems(Update, step_simulation.in_set(FrameSet::Simulate))
            .add_systems(
                Update,
                (spin, refresh_draw_source, update_draw_uniform, update_debug_view)
                    .chain()
                    .in_set(FrameSet::Render),
            );

        // Render
        let render_app = app.sub_app_mut(RenderApp);
        render_app
            .insert_resource(health)
            .add_systems(ExtractSchedule, (extract_step, extract_draw))
            .add_systems(
                Render,
                (
                    prepare_flow_pipeline.in_set(RenderSet::Prepare),
                    prepare_draw_pipeline.in_set(RenderSet::Prepare),
                    prepare_effect_uniform::<ColorShift>.in_set(RenderSet::Prepare),
                    prepare_effect_uniform::<GammaCorrection>.in_set(RenderSet::Prepare),
                    prepare_effect_uniform::<FallbackAntiAlias>.in_set(RenderSet::Prepare),
                    watch_effect_pipeline::<ColorShift>.in_set(RenderSet::Prepare),
                    watch_effect_pipeline::<GammaCorrection>.in_set(RenderSet::Prepare),
                    watch_effect_pipeline::<FallbackAntiAlias>.in_set(RenderSet::Prepare),
                    prepare_flow_bind_group.in_set(RenderSet::PrepareBindGroups),
                    prepare_draw_bind_group.in_set(RenderSet::PrepareBindGroups),
                ),
            );

        add_flow_node_to_graph(render_app);

        render_app
            .add_render_graph_node::<ViewNodeRunner<ParticlesDrawNode>>(
                Core3d,
                ParticlesDrawPassLabel,
            )
            .add_render_graph_edges(
                Core3d,
                (
                    Node3d::MainTransparentPass,
                    ParticlesDrawPassLabel,
                    Node3d::EndMainPass,
                ),
            )
            .add_render_graph_node::<ViewNodeRunner<EffectNode<ColorShift>>>(
                Core3d,
                ColorShift::LABEL,
            )
            .add_render_graph_node::<ViewNodeRunner<EffectNode<GammaCorrection>>>(
                Core3d,
                GammaCorrection::LABEL,
            )
            .add_render_graph_node::<ViewNodeRunner<EffectNode<FallbackAntiAlias>>>(
                Core3d,
                FallbackAntiAlias::LABEL,
            )
            .add_render_graph_edges(
                Core3d,
                (
                    Node3d::Tonemapping,
                    CompositeLabel::ColorShift,
                    CompositeLabel::GammaCorrection,
                    CompositeLabel::FallbackAntiAlias,
                    Node3d::EndMainPassPostProcessing,
                ),
            );
    }

    fn finish(&self, app: &mut App) {
        // everything below needs the RenderDevice, which only exists from here on
        let render_app = app.sub_app_mut(RenderApp);
        render_app
            .init_resource::<FlowBindGroupLayout>()
            .init_resource::<FlowUniformBuffer>()
            .init_resource::<DrawResources>()
            .init_resource::<QuadVertexBuffer>()
            .init_resource::<EffectPipeline<ColorShift>>()
            .init_resource::<EffectPipeline<GammaCorrection>>()
            .init_resource::<EffectPipeline<FallbackAntiAlias>>();
    }
}
