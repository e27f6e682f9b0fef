//! Systems for syncing Bevy entities with simulation state

use bevy::prelude::*;

use super::components::{
    to_vec3, EntityMappings, Ground, HudText, MainCamera, NpcLink, SimWorldResource, TruckVisual,
    WalkerVisual,
};
use crate::simulation::{AgentSnapshot, GameMode};

/// System to run simulation tick
pub fn tick_simulation(time: Res<Time>, mut sim_world: ResMut<SimWorldResource>) {
    sim_world.0.tick(time.delta_secs());
}

fn agent_transform(agent: &AgentSnapshot) -> Transform {
    Transform::from_translation(to_vec3(agent.position)).with_rotation(Quat::from_rotation_y(agent.heading))
}

/// Place the truck and the walker; the walker is only shown in walk mode
pub fn sync_agents(
    sim_world: Res<SimWorldResource>,
    mut truck_query: Query<&mut Transform, (With<TruckVisual>, Without<WalkerVisual>)>,
    mut walker_query: Query<(&mut Transform, &mut Visibility), (With<WalkerVisual>, Without<TruckVisual>)>,
) {
    let world = &sim_world.0;

    for mut transform in truck_query.iter_mut() {
        *transform = agent_transform(&world.truck());
    }

    for (mut transform, mut visibility) in walker_query.iter_mut() {
        *transform = agent_transform(&world.walker());
        *visibility = if world.mode() == GameMode::Walk {
            Visibility::Visible
        } else {
            Visibility::Hidden
        };
    }
}

/// System to sync NPC car visuals from the traffic pool
pub fn sync_npcs(
    sim_world: Res<SimWorldResource>,
    mappings: Res<EntityMappings>,
    mut npc_query: Query<&mut Transform, With<NpcLink>>,
) {
    for npc in sim_world.0.traffic.agents() {
        let Some(entity) = mappings.npcs.get(&npc.id) else {
            continue;
        };
        if let Ok(mut transform) = npc_query.get_mut(*entity) {
            transform.translation = to_vec3(npc.render_position());
        }
    }
}

/// Copy the tracked camera pose onto the Bevy camera
pub fn sync_camera(
    sim_world: Res<SimWorldResource>,
    mut camera_query: Query<&mut Transform, With<MainCamera>>,
) {
    let camera = &sim_world.0.camera;
    let eye = to_vec3(camera.position());
    let target = to_vec3(camera.look_at());
    for mut transform in camera_query.iter_mut() {
        *transform = Transform::from_translation(eye).looking_at(target, Vec3::Y);
    }
}

/// Slide the ground planes along with the observer so they never run out
pub fn follow_ground(
    sim_world: Res<SimWorldResource>,
    mut ground_query: Query<&mut Transform, With<Ground>>,
) {
    let z = sim_world.0.observer().z;
    for mut transform in ground_query.iter_mut() {
        transform.translation.z = z;
    }
}

/// System to update the HUD text lines
pub fn update_hud_text(sim_world: Res<SimWorldResource>, mut text_query: Query<(&HudText, &mut Text)>) {
    let hud = sim_world.0.hud();

    for (line, mut text) in text_query.iter_mut() {
        match line {
            HudText::Status => {
                **text = match hud.mode {
                    GameMode::RouteCreator => format!(
                        "Route creator: {} waypoints{}",
                        sim_world.0.draft.len(),
                        if sim_world.0.draft.is_valid() { " (ready)" } else { "" }
                    ),
                    _ => format!(
                        "{} km/h  |  {} view  |  audio {}",
                        hud.speed_kmh,
                        hud.camera.label(),
                        if hud.audio_muted { "muted" } else { "on" }
                    ),
                };
            }
            HudText::Route => {
                **text = match &hud.route {
                    Some(route) => {
                        let distance = route
                            .distance
                            .map(|d| format!("  Distance: {}m", d))
                            .unwrap_or_default();
                        format!("{}: {}{}", route.name, route.progress_text, distance)
                    }
                    None => String::new(),
                };
            }
            HudText::Help => {
                **text = match hud.mode {
                    GameMode::Drive => "W/S throttle and brake, A/D steer, C camera, M mute, Tab mode".to_string(),
                    GameMode::Walk => "W/A/S/D walk, Tab mode".to_string(),
                    GameMode::RouteCreator => "Click on the ground to place waypoints, Tab mode".to_string(),
                };
            }
        }
    }
}
