//! Systems for spawning visual entities from simulation state

use bevy::prelude::*;

use super::components::{
    palette_color, to_vec3, EntityMappings, NpcLink, SceneryVisual, SceneryWindows,
    SimWorldResource, TruckVisual, WalkerVisual, WaypointMarkers, WaypointVisual,
};
use crate::simulation::{Position, Scenery, SimWorld, ROAD_HALF_WIDTH};

/// System to create the agents and the NPC pool
pub fn spawn_initial_visuals(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    sim_world: Res<SimWorldResource>,
    mut mappings: ResMut<EntityMappings>,
) {
    let world = &sim_world.0;

    commands.spawn((
        TruckVisual,
        Mesh3d(meshes.add(Cuboid::new(2.4, 2.0, 6.0))),
        MeshMaterial3d(materials.add(Color::srgb(0.8, 0.3, 0.1))),
        Transform::from_translation(to_vec3(world.truck().position)),
    ));

    commands.spawn((
        WalkerVisual,
        Mesh3d(meshes.add(Capsule3d::new(0.3, 1.2))),
        MeshMaterial3d(materials.add(Color::srgb(0.2, 0.4, 0.9))),
        Transform::from_translation(to_vec3(world.walker().position)),
        Visibility::Hidden,
    ));

    for npc in world.traffic.agents() {
        let (w, h, l) = npc.appearance.body.dimensions();
        let entity = commands
            .spawn((
                NpcLink(npc.id),
                Mesh3d(meshes.add(Cuboid::new(w, h, l))),
                MeshMaterial3d(materials.add(palette_color(npc.appearance.color()))),
                Transform::from_translation(to_vec3(npc.render_position())),
            ))
            .id();
        mappings.npcs.insert(npc.id, entity);
    }
}

fn windows_of(scenery: &Scenery) -> SceneryWindows {
    SceneryWindows(vec![
        scenery.roads.window(),
        scenery.cities.window(),
        scenery.construction.window(),
        scenery.power_stations.window(),
        scenery.poles.window(),
    ])
}

/// Respawn scenery whenever any category's tile window moved
pub fn rebuild_scenery(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    sim_world: Res<SimWorldResource>,
    mut built_for: ResMut<SceneryWindows>,
    existing: Query<Entity, With<SceneryVisual>>,
) {
    let current = windows_of(&sim_world.0.scenery);
    if *built_for == current {
        return;
    }
    *built_for = current;

    for entity in existing.iter() {
        commands.entity(entity).despawn();
    }

    let mut spawn_box = |position: Position, size: Vec3, color: Color| {
        commands.spawn((
            SceneryVisual,
            Mesh3d(meshes.add(Cuboid::from_size(size))),
            MeshMaterial3d(materials.add(color)),
            Transform::from_translation(to_vec3(position)),
        ));
    };

    let scenery = &sim_world.0.scenery;

    for segment in scenery.roads.features() {
        let marking = Color::srgb(0.9, 0.9, 0.9 * (1.0 - segment.feature.marking_wear));
        for side in [-1.0, 1.0] {
            let edge = Position::new(side * (ROAD_HALF_WIDTH - 0.3), 0.03, segment.feature.center_z());
            spawn_box(edge, Vec3::new(0.2, 0.02, segment.feature.length), marking);
        }
        for patch in &segment.feature.patches {
            spawn_box(
                Position::new(patch.x, 0.025, patch.z),
                Vec3::new(2.0, 0.01, patch.length),
                Color::srgb(0.15, 0.15, 0.16),
            );
        }
    }

    for city in scenery.cities.features() {
        for b in &city.feature.buildings {
            let center = Position::new(b.position.x, b.height / 2.0, b.position.z);
            spawn_box(center, Vec3::new(b.width, b.height, b.depth), palette_color(b.color()));
        }
        for light in &city.feature.lights {
            spawn_box(*light, Vec3::splat(0.4), Color::srgb(1.0, 0.9, 0.5));
        }
    }

    for zone in scenery.construction.features() {
        for cone in &zone.feature.cones {
            spawn_box(*cone + Position::new(0.0, 0.4, 0.0), Vec3::new(0.4, 0.8, 0.4), Color::srgb(1.0, 0.4, 0.0));
        }
        for barrel in &zone.feature.barrels {
            spawn_box(*barrel + Position::new(0.0, 0.6, 0.0), Vec3::new(0.8, 1.2, 0.8), Color::srgb(0.9, 0.5, 0.1));
        }
        spawn_box(zone.feature.sign + Position::new(0.0, 1.5, 0.0), Vec3::new(2.0, 1.5, 0.1), Color::srgb(1.0, 0.8, 0.0));
    }

    for station in scenery.power_stations.features() {
        let s = &station.feature;
        spawn_box(s.center + Position::new(0.0, 3.0, 0.0), Vec3::new(8.0, 6.0, 6.0), Color::srgb(0.5, 0.5, 0.55));
        for t in s.transformers() {
            spawn_box(t, Vec3::new(2.0, 3.0, 2.0), Color::srgb(0.4, 0.4, 0.4));
        }
        for tower in s.towers() {
            spawn_box(tower + Position::new(0.0, 10.0, 0.0), Vec3::new(1.0, 20.0, 1.0), Color::srgb(0.6, 0.6, 0.6));
        }
        for post in s.fence_posts() {
            spawn_box(post, Vec3::new(0.15, 2.0, 0.15), Color::srgb(0.7, 0.7, 0.7));
        }
    }

    for pair in scenery.poles.features() {
        for pole in [&pair.feature.left, &pair.feature.right] {
            let center = pole.base + Position::new(0.0, pole.height / 2.0, 0.0);
            spawn_box(center, Vec3::new(0.3, pole.height, 0.3), Color::srgb(0.4, 0.3, 0.2));
            if pole.has_transformer {
                let can = pole.base + Position::new(0.5, pole.arm_height() - 1.0, 0.0);
                spawn_box(can, Vec3::new(0.6, 0.9, 0.6), Color::srgb(0.5, 0.5, 0.5));
            }
        }
    }

    let (left, right) = scenery.cables();
    for span in left.iter().chain(right.iter()) {
        for (a, b) in [(span.start, span.mid), (span.mid, span.end)] {
            let length = a.distance(&b);
            if length <= 0.0 {
                continue;
            }
            let mid = a.lerp(&b, 0.5);
            let direction = (to_vec3(b) - to_vec3(a)).normalize_or_zero();
            commands.spawn((
                SceneryVisual,
                Mesh3d(meshes.add(Cuboid::new(0.05, 0.05, length))),
                MeshMaterial3d(materials.add(Color::srgb(0.1, 0.1, 0.1))),
                Transform::from_translation(to_vec3(mid)).looking_to(direction, Vec3::Y),
            ));
        }
    }
}

fn spawn_marker(
    commands: &mut Commands,
    meshes: &mut ResMut<Assets<Mesh>>,
    materials: &mut ResMut<Assets<StandardMaterial>>,
    position: Position,
    color: Color,
) {
    commands.spawn((
        WaypointVisual,
        Mesh3d(meshes.add(Cylinder::new(1.0, 4.0))),
        MeshMaterial3d(materials.add(color)),
        Transform::from_translation(to_vec3(position + Position::new(0.0, 2.0, 0.0))),
    ));
}

fn markers_of(world: &SimWorld) -> WaypointMarkers {
    WaypointMarkers {
        route: world
            .tracker
            .route()
            .map(|r| (r.id.clone(), world.tracker.current_index())),
        draft: world.draft.len(),
    }
}

/// Respawn waypoint markers when the route, its progress or the draft changed
pub fn rebuild_waypoints(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    sim_world: Res<SimWorldResource>,
    mut built_for: ResMut<WaypointMarkers>,
    existing: Query<Entity, With<WaypointVisual>>,
) {
    let world = &sim_world.0;
    let current = markers_of(world);
    if *built_for == current {
        return;
    }
    *built_for = current;

    for entity in existing.iter() {
        commands.entity(entity).despawn();
    }

    if let Some(route) = world.tracker.route() {
        for (i, wp) in route.waypoints.iter().enumerate() {
            let color = if i < world.tracker.current_index() {
                Color::srgb(0.3, 0.3, 0.3)
            } else if i == world.tracker.current_index() {
                Color::srgb(0.1, 1.0, 0.2)
            } else {
                Color::srgb(0.2, 0.5, 1.0)
            };
            spawn_marker(&mut commands, &mut meshes, &mut materials, wp.position(), color);
        }
    }

    for wp in world.draft.waypoints() {
        spawn_marker(&mut commands, &mut meshes, &mut materials, wp.position, Color::srgb(1.0, 0.8, 0.1));
    }
}
