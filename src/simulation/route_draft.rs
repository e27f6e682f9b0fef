//! Editable route draft used while authoring a route
//!
//! The draft is owned by the route-creator flow and becomes a [`Route`] only
//! when it is saved.

use anyhow::{bail, Result};
use log::debug;
use rand::Rng;

use super::route::{polyline_length, Route, Waypoint};
use super::types::Position;

/// Message shown when saving a draft that isn't ready
pub const INVALID_DRAFT_MESSAGE: &str = "Route must have a name and at least 2 waypoints";

/// Minimum number of waypoints a saved route needs
pub const MIN_ROUTE_WAYPOINTS: usize = 2;

#[derive(Debug, Clone, PartialEq)]
pub struct WaypointDraft {
    pub id: String,
    pub position: Position,
}

#[derive(Debug, Clone, Default)]
pub struct RouteDraftManager {
    waypoints: Vec<WaypointDraft>,
    name: String,
    description: String,
    selected: Option<String>,
    next_id: u64,
}

impl RouteDraftManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn waypoints(&self) -> &[WaypointDraft] {
        &self.waypoints
    }

    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Ids are unique for the life of the manager: a running counter plus a
    /// random suffix so ids from separate sessions don't collide either.
    fn fresh_id(&mut self) -> String {
        self.next_id += 1;
        let suffix: u32 = rand::rng().random();
        format!("wp-{}-{:08x}", self.next_id, suffix)
    }

    /// Append a waypoint at the end and return its id
    pub fn append(&mut self, position: Position) -> String {
        let id = self.fresh_id();
        debug!(
            "Draft waypoint {} at ({:.1}, {:.1}, {:.1})",
            id, position.x, position.y, position.z
        );
        self.waypoints.push(WaypointDraft {
            id: id.clone(),
            position,
        });
        id
    }

    /// Remove by id. Clears the selection if it pointed at the removed waypoint.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.waypoints.len();
        self.waypoints.retain(|wp| wp.id != id);
        if self.selected.as_deref() == Some(id) {
            self.selected = None;
        }
        self.waypoints.len() != before
    }

    /// Move a waypoint. Returns false for an unknown id.
    pub fn update(&mut self, id: &str, position: Position) -> bool {
        match self.waypoints.iter_mut().find(|wp| wp.id == id) {
            Some(wp) => {
                wp.position = position;
                true
            }
            None => false,
        }
    }

    /// Take the waypoint at `from` out and insert it at `to`.
    /// Ignored unless both indices are in range.
    pub fn reorder(&mut self, from: usize, to: usize) -> bool {
        let len = self.waypoints.len();
        if from >= len || to >= len {
            return false;
        }
        let waypoint = self.waypoints.remove(from);
        self.waypoints.insert(to, waypoint);
        true
    }

    pub fn move_up(&mut self, index: usize) -> bool {
        index > 0 && self.reorder(index, index - 1)
    }

    pub fn move_down(&mut self, index: usize) -> bool {
        index
            .checked_add(1)
            .is_some_and(|to| self.reorder(index, to))
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    /// Select a waypoint by id, or clear the selection with `None`.
    /// Unknown ids leave the selection unchanged.
    pub fn select(&mut self, id: Option<&str>) -> bool {
        match id {
            None => {
                self.selected = None;
                true
            }
            Some(id) if self.waypoints.iter().any(|wp| wp.id == id) => {
                self.selected = Some(id.to_string());
                true
            }
            Some(_) => false,
        }
    }

    /// Drop every waypoint, the name, the description and the selection
    pub fn clear(&mut self) {
        self.waypoints.clear();
        self.name.clear();
        self.description.clear();
        self.selected = None;
    }

    pub fn is_valid(&self) -> bool {
        self.waypoints.len() >= MIN_ROUTE_WAYPOINTS && !self.name.trim().is_empty()
    }

    /// Length of the path through the draft waypoints in order
    pub fn length(&self) -> f32 {
        polyline_length(self.waypoints.iter().map(|wp| wp.position))
    }

    /// Build the route record to save. The draft itself is left untouched.
    pub fn to_route(&self, id: impl Into<String>, author: impl Into<String>, now_ns: i64) -> Result<Route> {
        if !self.is_valid() {
            bail!(INVALID_DRAFT_MESSAGE);
        }
        Ok(Route {
            id: id.into(),
            name: self.name.trim().to_string(),
            description: self.description.clone(),
            difficulty: None,
            created: now_ns,
            updated: now_ns,
            author: author.into(),
            length: self.length(),
            waypoints: self
                .waypoints
                .iter()
                .map(|wp| Waypoint::standard(wp.position))
                .collect(),
        })
    }
}
