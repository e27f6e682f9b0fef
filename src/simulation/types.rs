//! Core types for the driving simulation
//!
//! These are standalone types that don't depend on Bevy.

use std::ops::{Add, AddAssign, Mul, Sub};

/// A unique identifier for simulation entities
/// This is a simple wrapper around a usize for type safety
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SimId(pub usize);

/// A wrapper type for NPC traffic agent IDs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NpcId(pub SimId);

/// The mode the player is in. Each mode owns its own controls and camera.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, clap::ValueEnum)]
pub enum GameMode {
    /// Driving the truck along the corridor
    #[default]
    Drive,
    /// Placing waypoints for a new route
    RouteCreator,
    /// Walking on foot
    Walk,
}

impl GameMode {
    /// The mode the mode-toggle button switches to (drive -> creator -> walk -> drive)
    pub fn next(self) -> GameMode {
        match self {
            GameMode::Drive => GameMode::RouteCreator,
            GameMode::RouteCreator => GameMode::Walk,
            GameMode::Walk => GameMode::Drive,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            GameMode::Drive => "drive",
            GameMode::RouteCreator => "route-creator",
            GameMode::Walk => "walk",
        }
    }
}

/// A 3D position in the simulation
///
/// The travel axis of the corridor is +Z; X is lateral and Y is up.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Position {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Position {
    pub const ZERO: Position = Position {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn distance(&self, other: &Position) -> f32 {
        (*self - *other).length()
    }

    pub fn length(&self) -> f32 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// Unit vector in the same direction, or zero for a zero vector
    pub fn normalize_or_zero(&self) -> Position {
        let len = self.length();
        if len > 0.0 {
            *self * (1.0 / len)
        } else {
            Position::ZERO
        }
    }

    pub fn lerp(&self, other: &Position, t: f32) -> Position {
        Position {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
            z: self.z + (other.z - self.z) * t,
        }
    }
}

impl Add for Position {
    type Output = Position;

    fn add(self, rhs: Position) -> Position {
        Position::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl AddAssign for Position {
    fn add_assign(&mut self, rhs: Position) {
        self.x += rhs.x;
        self.y += rhs.y;
        self.z += rhs.z;
    }
}

impl Sub for Position {
    type Output = Position;

    fn sub(self, rhs: Position) -> Position {
        Position::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f32> for Position {
    type Output = Position;

    fn mul(self, rhs: f32) -> Position {
        Position::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

/// Unit vector pointing along `heading` on the ground plane
pub fn heading_vector(heading: f32) -> Position {
    Position::new(heading.sin(), 0.0, heading.cos())
}

/// Conversion factor from world units per second to km/h
pub const MS_TO_KMH: f32 = 3.6;

/// Half-width of the main road corridor
pub const ROAD_HALF_WIDTH: f32 = 6.0;
