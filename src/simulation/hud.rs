//! Per-frame HUD summary
//!
//! A read-only view assembled after the tick. Front ends render it; the
//! headless runner prints it.

use std::fmt;

use super::audio::DrivingAudio;
use super::camera::CameraMode;
use super::route::RouteProgressTracker;
use super::traffic::TrafficPool;
use super::types::{GameMode, NpcId, MS_TO_KMH};
use super::vehicle::AgentSnapshot;

#[derive(Debug, Clone, PartialEq)]
pub struct RouteHud {
    pub name: String,
    /// "Waypoint i / n", one-based
    pub progress_text: String,
    /// Rounded distance to the next waypoint; hidden while zero
    pub distance: Option<u32>,
    pub finished: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HudSnapshot {
    pub mode: GameMode,
    /// Shown in drive and walk modes; 0 while editing routes
    pub speed_kmh: u32,
    pub camera: CameraMode,
    pub audio_muted: bool,
    /// Active route info, shown only while driving
    pub route: Option<RouteHud>,
    pub nearest_npc: Option<(NpcId, f32)>,
}

/// Speed readout in whole km/h
pub fn speed_kmh(speed: f32) -> u32 {
    (speed * MS_TO_KMH).abs().round() as u32
}

impl HudSnapshot {
    pub fn compose(
        mode: GameMode,
        agent: &AgentSnapshot,
        tracker: &RouteProgressTracker,
        camera: CameraMode,
        audio: &DrivingAudio,
        traffic: &TrafficPool,
    ) -> Self {
        let speed_kmh = match mode {
            GameMode::Drive | GameMode::Walk => speed_kmh(agent.speed),
            GameMode::RouteCreator => 0,
        };

        let route = match (mode, tracker.route()) {
            (GameMode::Drive, Some(route)) => {
                let distance = tracker.distance_to_next();
                Some(RouteHud {
                    name: route.name.clone(),
                    progress_text: format!(
                        "Waypoint {} / {}",
                        tracker.current_index() + 1,
                        route.waypoints.len()
                    ),
                    distance: (distance > 0.0).then(|| distance.round() as u32),
                    finished: tracker.is_at_final_waypoint(),
                })
            }
            _ => None,
        };

        Self {
            mode,
            speed_kmh,
            camera,
            audio_muted: audio.is_muted(),
            route,
            nearest_npc: traffic
                .nearest_to(&agent.position)
                .map(|(npc, d)| (npc.id, d)),
        }
    }
}

impl fmt::Display for HudSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {} km/h, {} view", self.mode.label(), self.speed_kmh, self.camera.label())?;
        if self.audio_muted {
            write!(f, ", muted")?;
        }
        if let Some(route) = &self.route {
            write!(f, " | {}: {}", route.name, route.progress_text)?;
            if let Some(d) = route.distance {
                write!(f, " ({}m)", d)?;
            }
            if route.finished {
                write!(f, " finished")?;
            }
        }
        if let Some((id, d)) = self.nearest_npc {
            write!(f, " | nearest car #{} at {:.0}m", id.0 .0, d)?;
        }
        Ok(())
    }
}
