//! UI components and resources for linking Bevy entities to simulation state

use bevy::prelude::*;
use std::collections::HashMap;
use std::ops::RangeInclusive;

use crate::simulation::{NpcId, Position, SimWorld};

/// Resource wrapper for the simulation world
#[derive(Resource)]
pub struct SimWorldResource(pub SimWorld);

/// Marker component for ground plane
#[derive(Component)]
pub struct Ground;

/// Marker component for the main camera
#[derive(Component)]
pub struct MainCamera;

/// The player's truck
#[derive(Component)]
pub struct TruckVisual;

/// The pedestrian
#[derive(Component)]
pub struct WalkerVisual;

/// Links a Bevy entity to a pooled NPC car
#[derive(Component)]
pub struct NpcLink(pub NpcId);

/// Streamed scenery, despawned whenever the tile windows move
#[derive(Component)]
pub struct SceneryVisual;

/// Waypoint markers of the active route or the draft
#[derive(Component)]
pub struct WaypointVisual;

/// Resource to track Bevy entities mapped to simulation entities
#[derive(Resource, Default)]
pub struct EntityMappings {
    pub npcs: HashMap<NpcId, Entity>,
}

/// Tile windows the current scenery entities were built for
#[derive(Resource, Default, PartialEq)]
pub struct SceneryWindows(pub Vec<Option<RangeInclusive<i64>>>);

/// Number of waypoint markers currently spawned, by source
#[derive(Resource, Default, PartialEq)]
pub struct WaypointMarkers {
    pub route: Option<(String, usize)>,
    pub draft: usize,
}

/// HUD text lines
#[derive(Component)]
pub enum HudText {
    Status,
    Route,
    Help,
}

/// Convert a simulation position to a Bevy vector
pub fn to_vec3(p: Position) -> Vec3 {
    Vec3::new(p.x, p.y, p.z)
}

/// Parse a `#rrggbb` palette entry
pub fn palette_color(hex: &str) -> Color {
    Srgba::hex(hex).map(Color::from).unwrap_or(Color::WHITE)
}
