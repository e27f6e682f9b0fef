//! UI module that visualizes the simulation state using Bevy
//!
//! This module is purely for visualization - all simulation logic is in the `simulation` module.
//! The UI samples the keyboard into control flags, ticks `SimWorld` on the fixed
//! schedule and mirrors its snapshots onto Bevy transforms.

mod components;
mod input;
pub mod spawner;
mod sync;
mod world;

use bevy::prelude::*;

pub use components::{EntityMappings, SimWorldResource};

use crate::simulation::{GameMode, SimWorld};
use components::*;
use input::{handle_ground_click, handle_input, sample_controls};
use spawner::{rebuild_scenery, rebuild_waypoints, spawn_initial_visuals};
use sync::{follow_ground, sync_agents, sync_camera, sync_npcs, tick_simulation, update_hud_text};
use world::{setup_hud, setup_world};

/// Plugin to register all UI systems
pub struct DriveSimUIPlugin {
    pub start_mode: GameMode,
}

impl Default for DriveSimUIPlugin {
    fn default() -> Self {
        Self {
            start_mode: GameMode::Drive,
        }
    }
}

impl Plugin for DriveSimUIPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(SimWorldResource(SimWorld::new_in_mode(self.start_mode)))
            .init_resource::<EntityMappings>()
            .init_resource::<SceneryWindows>()
            .init_resource::<WaypointMarkers>()
            .add_systems(
                Startup,
                (
                    setup_world,
                    spawn_initial_visuals.after(setup_world),
                    setup_hud,
                ),
            )
            .add_systems(FixedPreUpdate, sample_controls)
            .add_systems(FixedUpdate, tick_simulation)
            .add_systems(
                Update,
                (
                    handle_input,
                    handle_ground_click,
                    sync_agents,
                    sync_npcs,
                    sync_camera,
                    follow_ground,
                    rebuild_scenery,
                    rebuild_waypoints,
                    update_hud_text,
                ),
            );
    }
}
