use bevy::prelude::*;
use bevy::reflect::TypePath;
use bevy::render::render_resource::{AsBindGroup, ShaderRef};

use crate::gpu::draw_buffers::DrawSource;

/// Shows the raw state texture (xyz as rgb) on a quad next to the cloud.
#[derive(Asset, TypePath, AsBindGroup, Debug, Clone)]
pub struct StateDebugMaterial {
    // Rgba32Float can't be filtered, the state images carry a nearest sampler
    #[texture(0, sample_type = "float", filterable = false)]
    #[sampler(1, sampler_type = "non_filtering")]
    pub state: Handle<Image>,
}

impl Material for StateDebugMaterial {
    fn fragment_shader() -> ShaderRef {
        "shaders/state_debug.wgsl".into()
    }
}

#[derive(Component)]
pub struct StateDebugView;

pub fn spawn_debug_view(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StateDebugMaterial>,
    state: Handle<Image>,
) {
    commands.spawn((
        Mesh3d(meshes.add(Rectangle::new(3.0, 3.0))),
        MeshMaterial3d(materials.add(StateDebugMaterial { state })),
        Transform::from_xyz(3.0, 0.0, 0.0),
        StateDebugView,
    ));
}

// follows the ping-pong swap, the handle from last tick is the write target now
pub fn update_debug_view(
    source: Res<DrawSource>,
    views: Query<&MeshMaterial3d<StateDebugMaterial>, With<StateDebugView>>,
    mut materials: ResMut<Assets<StateDebugMaterial>>,
) {
    let Some(current) = source.0.as_ref() else {
        return;
    };
    for view in &views {
        if let Some(material) = materials.get_mut(&view.0) {
            if material.state != *current {
                material.state = current.clone();
            }
        }
    }
}
