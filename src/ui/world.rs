//! World setup systems for camera, lighting, ground and HUD

use bevy::prelude::*;

use super::components::{to_vec3, Ground, HudText, MainCamera};
use crate::simulation::{INITIAL_CAMERA_POSITION, ROAD_HALF_WIDTH};

const GROUND_SIZE: f32 = 4000.0;

/// System to setup the world environment (ground, lighting, camera)
pub fn setup_world(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    commands.spawn((
        MainCamera,
        Camera3d::default(),
        Transform::from_translation(to_vec3(INITIAL_CAMERA_POSITION)).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    commands.spawn((
        DirectionalLight {
            illuminance: 10000.0,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_xyz(50.0, 50.0, 25.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    // Ground and road strip follow the observer along Z, see `follow_ground`
    commands.spawn((
        Ground,
        Mesh3d(meshes.add(Plane3d::default().mesh().size(GROUND_SIZE, GROUND_SIZE))),
        MeshMaterial3d(materials.add(Color::srgb(0.3, 0.45, 0.3))),
    ));
    commands.spawn((
        Ground,
        Mesh3d(meshes.add(Plane3d::default().mesh().size(ROAD_HALF_WIDTH * 2.0, GROUND_SIZE))),
        MeshMaterial3d(materials.add(Color::srgb(0.2, 0.2, 0.22))),
        Transform::from_xyz(0.0, 0.02, 0.0),
    ));
}

/// HUD overlay in the top-left corner
pub fn setup_hud(mut commands: Commands) {
    commands
        .spawn((
            Node {
                width: Val::Auto,
                height: Val::Auto,
                position_type: PositionType::Absolute,
                top: Val::Px(10.0),
                left: Val::Px(10.0),
                padding: UiRect::all(Val::Px(10.0)),
                flex_direction: FlexDirection::Column,
                row_gap: Val::Px(5.0),
                ..default()
            },
            BackgroundColor(Color::srgba(0.0, 0.0, 0.0, 0.7)),
        ))
        .with_children(|parent| {
            for (line, size, color) in [
                (HudText::Status, 20.0, Color::srgb(0.2, 1.0, 0.2)),
                (HudText::Route, 16.0, Color::srgb(0.9, 0.9, 0.9)),
                (HudText::Help, 14.0, Color::srgb(0.7, 0.7, 0.7)),
            ] {
                parent.spawn((
                    Text::new(""),
                    TextFont {
                        font_size: size,
                        ..default()
                    },
                    TextColor(color),
                    line,
                ));
            }
        });
}
