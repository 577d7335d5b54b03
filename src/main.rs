use bevy::prelude::*;
use bevy_gpgpu_particles::config::ParticlesConfig;
use bevy_gpgpu_particles::params::RenderParams;
use bevy_gpgpu_particles::GpgpuParticlesPlugin;
use clap::Parser;

fn main() -> AppExit {
    let config = ParticlesConfig::parse();

    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "gpgpu lotus".into(),
                ..default()
            }),
            ..default()
        }))
        .insert_resource(ClearColor(RenderParams::default().clear_color))
        .add_plugins(GpgpuParticlesPlugin { config })
        .run()
}
