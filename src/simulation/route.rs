//! Route records and progress tracking
//!
//! Routes are owned by the store; the tracker keeps its own copy of the active
//! one and only reads it.

use log::{debug, info};
use serde::{Deserialize, Serialize};

use super::types::Position;

/// Arrival radius used when a waypoint doesn't set its own
pub const DEFAULT_WAYPOINT_RADIUS: f32 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WaypointType {
    Checkpoint,
    Start,
    Finish,
    Obstacle,
    #[default]
    Standard,
}

/// Plain serialized coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Coordinates {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl From<Coordinates> for Position {
    fn from(c: Coordinates) -> Self {
        Position::new(c.x, c.y, c.z)
    }
}

impl From<Position> for Coordinates {
    fn from(p: Position) -> Self {
        Coordinates {
            x: p.x,
            y: p.y,
            z: p.z,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Waypoint {
    pub coordinates: Coordinates,
    pub waypoint_type: WaypointType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radius: Option<f32>,
}

impl Waypoint {
    pub fn standard(position: Position) -> Self {
        Self {
            coordinates: position.into(),
            waypoint_type: WaypointType::Standard,
            label_text: None,
            radius: None,
        }
    }

    pub fn position(&self) -> Position {
        self.coordinates.into()
    }

    /// Arrival radius; unset or non-positive radii fall back to the default
    pub fn arrival_radius(&self) -> f32 {
        match self.radius {
            Some(r) if r > 0.0 => r,
            _ => DEFAULT_WAYPOINT_RADIUS,
        }
    }
}

/// A persisted route
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<String>,
    /// Nanoseconds since the Unix epoch
    pub created: i64,
    /// Nanoseconds since the Unix epoch
    pub updated: i64,
    pub author: String,
    pub length: f32,
    pub waypoints: Vec<Waypoint>,
}

impl Route {
    pub fn summary(&self) -> RouteSummary {
        RouteSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
            difficulty: self.difficulty.clone(),
            created: self.created,
            updated: self.updated,
            author: self.author.clone(),
            length: self.length,
            waypoint_count: self.waypoints.len(),
        }
    }
}

/// A route without its waypoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteSummary {
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<String>,
    pub created: i64,
    pub updated: i64,
    pub author: String,
    pub length: f32,
    pub waypoint_count: usize,
}

/// Sum of straight-line distances between consecutive points
pub fn polyline_length<I>(points: I) -> f32
where
    I: IntoIterator<Item = Position>,
{
    let mut points = points.into_iter();
    let Some(mut previous) = points.next() else {
        return 0.0;
    };
    let mut total = 0.0;
    for point in points {
        total += previous.distance(&point);
        previous = point;
    }
    total
}

/// Externally visible progress state
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RouteProgress {
    Idle,
    Tracking { index: usize, distance: f32 },
}

/// Follows the agent along the active route, one waypoint at a time
#[derive(Debug, Clone, Default)]
pub struct RouteProgressTracker {
    route: Option<Route>,
    current_index: usize,
    distance_to_next: f32,
    /// Set once a tick has measured `distance_to_next` for the active route
    measured: bool,
}

impl RouteProgressTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start tracking `route` from its first waypoint
    pub fn load_route(&mut self, route: Route) {
        info!(
            "Tracking route '{}' ({} waypoints, {:.0} units)",
            route.name,
            route.waypoints.len(),
            route.length
        );
        self.route = Some(route);
        self.current_index = 0;
        self.distance_to_next = 0.0;
        self.measured = false;
    }

    /// Stop tracking. Safe to call repeatedly.
    pub fn clear_route(&mut self) {
        if let Some(route) = self.route.take() {
            debug!("Cleared route '{}'", route.name);
        }
        self.current_index = 0;
        self.distance_to_next = 0.0;
        self.measured = false;
    }

    /// Measure the distance to the current waypoint and advance past it when
    /// inside its radius. Never skips more than one waypoint per call.
    /// Returns the new index when it advanced.
    pub fn tick(&mut self, position: &Position) -> Option<usize> {
        let route = self.route.as_ref()?;
        let waypoint = route.waypoints.get(self.current_index)?;

        let distance = position.distance(&waypoint.position());
        self.distance_to_next = distance;
        self.measured = true;

        if distance < waypoint.arrival_radius() && self.current_index + 1 < route.waypoints.len() {
            self.current_index += 1;
            info!(
                "Reached waypoint {} of '{}'",
                self.current_index,
                route.name
            );
            return Some(self.current_index);
        }
        None
    }

    pub fn state(&self) -> RouteProgress {
        match self.route {
            None => RouteProgress::Idle,
            Some(_) => RouteProgress::Tracking {
                index: self.current_index,
                distance: self.distance_to_next,
            },
        }
    }

    pub fn route(&self) -> Option<&Route> {
        self.route.as_ref()
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn distance_to_next(&self) -> f32 {
        self.distance_to_next
    }

    pub fn current_waypoint(&self) -> Option<&Waypoint> {
        self.route.as_ref()?.waypoints.get(self.current_index)
    }

    /// True while the last waypoint is the target and the last measurement
    /// was inside its radius
    pub fn is_at_final_waypoint(&self) -> bool {
        let Some(route) = &self.route else {
            return false;
        };
        let Some(waypoint) = route.waypoints.last() else {
            return false;
        };
        self.measured
            && self.current_index + 1 == route.waypoints.len()
            && self.distance_to_next < waypoint.arrival_radius()
    }
}
