use bevy::asset::LoadState;
use bevy::gltf::GltfAssetLabel;
use bevy::prelude::*;
use bevy::render::mesh::VertexAttributeValues;

use crate::config::ParticlesConfig;
use crate::error::SetupError;

/// The one mesh the particles are sampled from.
#[derive(Resource)]
pub struct MeshSource {
    pub path: String,
    pub handle: Handle<Mesh>,
}

pub fn request_mesh(mut commands: Commands, config: Res<ParticlesConfig>, assets: Res<AssetServer>) {
    let label = GltfAssetLabel::Primitive {
        mesh: config.mesh_index,
        primitive: 0,
    };
    let handle = assets.load(label.from_asset(config.mesh.clone()));
    info!("loading mesh {}", config.mesh);
    commands.insert_resource(MeshSource {
        path: config.mesh.clone(),
        handle,
    });
}

/// `Ok(None)` while the asset is still in flight.
pub fn poll_mesh(
    source: &MeshSource,
    assets: &AssetServer,
    meshes: &Assets<Mesh>,
) -> Result<Option<Vec<glam::Vec3>>, SetupError> {
    match assets.load_state(&source.handle) {
        LoadState::Loaded => {
            let mesh = meshes
                .get(&source.handle)
                .ok_or_else(|| SetupError::AssetLoadFailed {
                    path: source.path.clone(),
                    reason: "mesh vanished right after loading".into(),
                })?;
            positions_from_mesh(mesh).map(Some)
        }
        LoadState::Failed(err) => Err(SetupError::AssetLoadFailed {
            path: source.path.clone(),
            reason: err.to_string(),
        }),
        _ => Ok(None),
    }
}

pub fn positions_from_mesh(mesh: &Mesh) -> Result<Vec<glam::Vec3>, SetupError> {
    let Some(VertexAttributeValues::Float32x3(values)) = mesh.attribute(Mesh::ATTRIBUTE_POSITION)
    else {
        return Err(SetupError::MissingPositions);
    };
    if values.is_empty() {
        return Err(SetupError::EmptyMesh);
    }
    Ok(values.iter().map(|p| glam::Vec3::from_array(*p)).collect())
}
