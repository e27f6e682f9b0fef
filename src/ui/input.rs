//! Input handling systems

use bevy::prelude::*;

use super::components::{MainCamera, SimWorldResource};
use crate::simulation::{ControlFlags, Position};

/// Sample the movement keys into this frame's control flags
pub fn sample_controls(keyboard: Res<ButtonInput<KeyCode>>, mut sim_world: ResMut<SimWorldResource>) {
    let held = |a: KeyCode, b: KeyCode| keyboard.pressed(a) || keyboard.pressed(b);
    sim_world.0.set_controls(ControlFlags {
        forward: held(KeyCode::KeyW, KeyCode::ArrowUp),
        backward: held(KeyCode::KeyS, KeyCode::ArrowDown),
        left: held(KeyCode::KeyA, KeyCode::ArrowLeft),
        right: held(KeyCode::KeyD, KeyCode::ArrowRight),
    });
}

/// Mode, camera, audio and route shortcuts
pub fn handle_input(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut sim_world: ResMut<SimWorldResource>,
    mut exit: MessageWriter<AppExit>,
) {
    if keyboard.just_pressed(KeyCode::Escape) {
        exit.write(AppExit::Success);
    }

    let world = &mut sim_world.0;
    if keyboard.just_pressed(KeyCode::Tab) {
        world.cycle_mode();
    }
    if keyboard.just_pressed(KeyCode::KeyC) {
        world.toggle_camera();
    }
    if keyboard.just_pressed(KeyCode::KeyM) {
        world.audio.toggle_mute();
    }
    if keyboard.just_pressed(KeyCode::Backspace) {
        world.clear_route();
    }
}

/// Place a draft waypoint where the cursor meets the ground
pub fn handle_ground_click(
    mouse_button: Res<ButtonInput<MouseButton>>,
    windows: Query<&Window>,
    camera_query: Query<(&Camera, &GlobalTransform), With<MainCamera>>,
    mut sim_world: ResMut<SimWorldResource>,
) {
    if !mouse_button.just_pressed(MouseButton::Left) {
        return;
    }

    let Ok(window) = windows.single() else {
        return;
    };
    let Ok((camera, camera_transform)) = camera_query.single() else {
        return;
    };
    let Some(cursor_position) = window.cursor_position() else {
        return;
    };
    let Ok(ray) = camera.viewport_to_world(camera_transform, cursor_position) else {
        return;
    };
    let Some(distance) = ray.intersect_plane(Vec3::ZERO, InfinitePlane3d::new(Vec3::Y)) else {
        return;
    };

    let point = ray.get_point(distance);
    sim_world.0.click_ground(Position::new(point.x, 0.0, point.z));
}
