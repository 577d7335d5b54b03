use bevy::prelude::*;
use bevy::window::{PrimaryWindow, WindowResized, WindowScaleFactorChanged};

use crate::context::SimulationContext;
use crate::cursor::{normalize_pointer, CursorVelocity};
use crate::params::{FlowParams, RenderParams};
use crate::viewport::{FrameUniforms, Viewport};
use crate::{CameraParallax, ParallaxAnchor, Rotates, TuningControl, TuningTarget};

pub fn sample_pointer(
    mut moved: EventReader<CursorMoved>,
    windows: Query<&Window, With<PrimaryWindow>>,
    mut cursor: ResMut<CursorVelocity>,
) {
    // only the newest sample of the tick matters
    let Some(last) = moved.read().last() else {
        return;
    };
    let Ok(window) = windows.single() else {
        return;
    };
    let size = glam::Vec2::new(window.width(), window.height());
    let screen = glam::Vec2::new(last.position.x, last.position.y);
    cursor.sample(normalize_pointer(screen, size));
}

pub fn update_cursor_velocity(mut cursor: ResMut<CursorVelocity>, mut uniforms: ResMut<FrameUniforms>) {
    cursor.update();

    let follow = cursor.follow_position();
    uniforms.color_shift.follow = [follow.x, follow.y];
    uniforms.color_shift.speed = cursor.clamped_speed();
}

/// Keeps every resolution-aware uniform on the real target size. A move to
/// a monitor with another scale factor changes the physical size without
/// a `WindowResized`, so both events count.
pub fn handle_resize(
    mut resized: EventReader<WindowResized>,
    mut rescaled: EventReader<WindowScaleFactorChanged>,
    windows: Query<&Window>,
    mut uniforms: ResMut<FrameUniforms>,
) {
    let mut touched: Vec<Entity> = resized.read().map(|event| event.window).collect();
    touched.extend(rescaled.read().map(|event| event.window));
    touched.dedup();

    for entity in touched {
        let Ok(window) = windows.get(entity) else {
            continue;
        };
        let viewport = Viewport::new(window.width(), window.height(), window.scale_factor());
        uniforms.resize(&viewport);
        debug!("viewport resized to {:?}", viewport.physical_size());
    }
}

pub fn spin(mut query: Query<(&mut Transform, &Rotates)>, ctx: Res<SimulationContext>) {
    for (mut transform, rotates) in &mut query {
        transform.rotate(Quat::from_axis_angle(rotates.axis, rotates.speed * ctx.delta));
    }
}

pub fn parallax_camera(
    parallax: Res<CameraParallax>,
    cursor: Res<CursorVelocity>,
    mut cameras: Query<(&mut Transform, &ParallaxAnchor)>,
) {
    if !parallax.enabled {
        return;
    }
    let follow = cursor.follow_position();
    let offset = Vec3::new(follow.x - 0.5, follow.y - 0.5, 0.0) * parallax.amount;
    for (mut transform, anchor) in &mut cameras {
        transform.translation = anchor.0 + offset;
        transform.look_at(Vec3::ZERO, Vec3::Y);
    }
}

/// Keyboard stand-in for the tuning panel: 1-4 pick a parameter,
/// Up/Down nudge it (Shift for bigger steps).
pub fn tune_parameters(
    keys: Res<ButtonInput<KeyCode>>,
    mut control: ResMut<TuningControl>,
    mut flow: ResMut<FlowParams>,
    mut render: ResMut<RenderParams>,
) {
    for (key, target) in [
        (KeyCode::Digit1, TuningTarget::Influence),
        (KeyCode::Digit2, TuningTarget::Strength),
        (KeyCode::Digit3, TuningTarget::Frequency),
        (KeyCode::Digit4, TuningTarget::PointSize),
    ] {
        if keys.just_pressed(key) && control.target != target {
            control.target = target;
            info!("tuning {:?}", target);
        }
    }

    let direction = match (keys.just_pressed(KeyCode::ArrowUp), keys.just_pressed(KeyCode::ArrowDown)) {
        (true, false) => 1.0,
        (false, true) => -1.0,
        _ => return,
    };
    let multiplier = if keys.pressed(KeyCode::ShiftLeft) || keys.pressed(KeyCode::ShiftRight) {
        10.0
    } else {
        1.0
    };
    let nudge = |value: &mut f32, (min, max): (f32, f32)| {
        *value += direction * multiplier * control.step * (max - min);
    };

    match control.target {
        TuningTarget::Influence => nudge(&mut flow.influence, FlowParams::INFLUENCE_RANGE),
        TuningTarget::Strength => nudge(&mut flow.strength, FlowParams::STRENGTH_RANGE),
        TuningTarget::Frequency => nudge(&mut flow.frequency, FlowParams::FREQUENCY_RANGE),
        TuningTarget::PointSize => nudge(&mut render.point_size, RenderParams::POINT_SIZE_RANGE),
    }
    *flow = flow.clamped();
    *render = render.clamped();
    info!("{:?} -> flow {:?}, point size {:.3}", control.target, *flow, render.point_size);
}

pub fn apply_clear_color(render: Res<RenderParams>, mut clear: ResMut<ClearColor>) {
    if render.is_changed() {
        clear.0 = render.clear_color;
    }
}
