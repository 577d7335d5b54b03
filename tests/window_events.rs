use bevy::prelude::*;
use bevy::window::{WindowResized, WindowResolution, WindowScaleFactorChanged};
use bevy_gpgpu_particles::input::handle_resize;
use bevy_gpgpu_particles::viewport::FrameUniforms;

fn close(a: [f32; 2], b: [f32; 2]) -> bool {
    a.iter()
        .zip(b)
        .all(|(x, y)| (x - y).abs() <= 1e-3 * y.abs().max(1.0))
}

fn app_with_window() -> (App, Entity) {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins)
        .add_event::<WindowResized>()
        .add_event::<WindowScaleFactorChanged>()
        .init_resource::<FrameUniforms>()
        .add_systems(Update, handle_resize);

    let window = app
        .world_mut()
        .spawn(Window {
            resolution: WindowResolution::new(800.0, 600.0),
            ..default()
        })
        .id();
    app.world_mut().send_event(WindowResized {
        window,
        width: 800.0,
        height: 600.0,
    });
    app.update();
    (app, window)
}

#[test]
fn resize_event_sets_the_resolution() {
    let (app, _) = app_with_window();
    for res in app.world().resource::<FrameUniforms>().resolutions() {
        assert!(close(res, [800.0, 600.0]), "{res:?}");
    }
}

#[test]
fn scale_factor_change_alone_updates_the_resolution() {
    let (mut app, window) = app_with_window();

    // same logical size on a denser monitor: no WindowResized is sent
    {
        let mut entity = app.world_mut().entity_mut(window);
        let mut w = entity.get_mut::<Window>().unwrap();
        w.resolution.set_physical_resolution(1600, 1200);
        w.resolution.set_scale_factor(2.0);
    }
    app.world_mut().send_event(WindowScaleFactorChanged {
        window,
        scale_factor: 2.0,
    });
    app.update();

    for res in app.world().resource::<FrameUniforms>().resolutions() {
        assert!(close(res, [1600.0, 1200.0]), "{res:?}");
    }
}
