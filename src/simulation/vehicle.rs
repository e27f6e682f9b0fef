//! Motion models for the player's truck and the pedestrian
//!
//! Each agent's state lives inside its motion model and is only written by
//! `integrate`. Everything else (camera, route tracker, HUD, audio) reads a
//! copied [`AgentSnapshot`] taken after integration.

use super::terrain::{SurfaceProbe, PROBE_START_HEIGHT};
use super::types::{heading_vector, Position};

/// Top forward speed of the truck
pub const MAX_SPEED: f32 = 30.0;
/// Forward acceleration while throttle is held
pub const FORWARD_ACCEL: f32 = 15.0;
/// Deceleration (and reverse acceleration) while brake is held
pub const BRAKE_ACCEL: f32 = 20.0;
/// Rolling friction when neither pedal is held
pub const FRICTION: f32 = 5.0;
/// Steering rate at full speed, radians per second
pub const TURN_RATE: f32 = 1.5;
/// Fastest the truck goes in reverse
pub const REVERSE_SPEED_CAP: f32 = -MAX_SPEED * 0.5;
/// Below this absolute speed the wheels don't steer the truck
pub const STEER_SPEED_THRESHOLD: f32 = 0.1;
/// Height of the truck origin above the surface under it
pub const VEHICLE_CLEARANCE: f32 = 1.0;

/// Walking speed of the pedestrian
pub const WALK_SPEED: f32 = 5.0;
/// Height of the pedestrian origin above the surface under it
pub const PEDESTRIAN_CLEARANCE: f32 = 0.9;

/// Control flags sampled once per tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ControlFlags {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
}

impl ControlFlags {
    pub const NONE: ControlFlags = ControlFlags {
        forward: false,
        backward: false,
        left: false,
        right: false,
    };

    pub fn any(&self) -> bool {
        self.forward || self.backward || self.left || self.right
    }
}

/// Read-only copy of an agent's state
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AgentSnapshot {
    pub position: Position,
    pub velocity: Position,
    /// Radians; 0 faces +Z
    pub heading: f32,
    pub speed: f32,
    /// Current steering rate (always 0 for pedestrians)
    pub steering: f32,
    /// True while throttle or brake is held
    pub is_accelerating: bool,
}

/// An agent integrator. The model is the only writer of its agent's state.
pub trait MotionModel {
    /// Advance one tick. Non-finite or negative `delta_secs` leaves the state untouched.
    fn integrate(&mut self, controls: ControlFlags, delta_secs: f32, probe: &dyn SurfaceProbe);

    fn snapshot(&self) -> AgentSnapshot;

    /// Place the agent, clearing all motion
    fn reset(&mut self, position: Position, heading: f32);
}

fn valid_delta(delta_secs: f32) -> bool {
    delta_secs.is_finite() && delta_secs >= 0.0
}

/// Snap `position.y` to the surface under it, keeping it when nothing is there
fn follow_ground(position: &mut Position, clearance: f32, probe: &dyn SurfaceProbe) {
    let from_y = position.y + PROBE_START_HEIGHT;
    if let Some(surface) = probe.surface_below(position.x, position.z, from_y) {
        position.y = surface + clearance;
    }
}

/// Wheeled vehicle with throttle, brake, friction and speed-scaled steering
#[derive(Debug, Clone, PartialEq)]
pub struct VehicleMotion {
    position: Position,
    velocity: Position,
    heading: f32,
    speed: f32,
    steering: f32,
    is_accelerating: bool,
}

impl Default for VehicleMotion {
    fn default() -> Self {
        Self::new(Position::new(0.0, VEHICLE_CLEARANCE, 0.0), 0.0)
    }
}

impl VehicleMotion {
    pub fn new(position: Position, heading: f32) -> Self {
        Self {
            position,
            velocity: Position::ZERO,
            heading,
            speed: 0.0,
            steering: 0.0,
            is_accelerating: false,
        }
    }

    fn update_speed(&mut self, controls: ControlFlags, delta_secs: f32) {
        if controls.forward {
            self.speed = (self.speed + FORWARD_ACCEL * delta_secs).min(MAX_SPEED);
        } else if controls.backward {
            self.speed = (self.speed - BRAKE_ACCEL * delta_secs).max(REVERSE_SPEED_CAP);
        } else if self.speed > 0.0 {
            self.speed = (self.speed - FRICTION * delta_secs).max(0.0);
        } else if self.speed < 0.0 {
            self.speed = (self.speed + FRICTION * delta_secs).min(0.0);
        }
    }

    fn update_heading(&mut self, controls: ControlFlags, delta_secs: f32) {
        if self.speed.abs() <= STEER_SPEED_THRESHOLD {
            return;
        }
        self.steering = if controls.left {
            TURN_RATE
        } else if controls.right {
            -TURN_RATE
        } else {
            0.0
        };
        self.heading += self.steering * delta_secs * (self.speed / MAX_SPEED);
    }
}

impl MotionModel for VehicleMotion {
    fn integrate(&mut self, controls: ControlFlags, delta_secs: f32, probe: &dyn SurfaceProbe) {
        if !valid_delta(delta_secs) {
            return;
        }

        self.is_accelerating = controls.forward || controls.backward;
        self.update_speed(controls, delta_secs);
        self.update_heading(controls, delta_secs);

        self.velocity = heading_vector(self.heading) * self.speed;
        self.position += self.velocity * delta_secs;
        follow_ground(&mut self.position, VEHICLE_CLEARANCE, probe);
    }

    fn snapshot(&self) -> AgentSnapshot {
        AgentSnapshot {
            position: self.position,
            velocity: self.velocity,
            heading: self.heading,
            speed: self.speed,
            steering: self.steering,
            is_accelerating: self.is_accelerating,
        }
    }

    fn reset(&mut self, position: Position, heading: f32) {
        *self = Self::new(position, heading);
    }
}

/// Pedestrian: no inertia, instant facing, constant walking speed
#[derive(Debug, Clone, PartialEq)]
pub struct PedestrianMotion {
    position: Position,
    velocity: Position,
    heading: f32,
    speed: f32,
}

impl Default for PedestrianMotion {
    fn default() -> Self {
        Self::new(Position::new(0.0, PEDESTRIAN_CLEARANCE, 0.0), 0.0)
    }
}

impl PedestrianMotion {
    pub fn new(position: Position, heading: f32) -> Self {
        Self {
            position,
            velocity: Position::ZERO,
            heading,
            speed: 0.0,
        }
    }

    /// Local movement direction from the flags; left and forward win ties.
    fn input_vector(controls: ControlFlags) -> (f32, f32) {
        let z = if controls.forward {
            1.0
        } else if controls.backward {
            -1.0
        } else {
            0.0
        };
        let x = if controls.left {
            -1.0
        } else if controls.right {
            1.0
        } else {
            0.0
        };
        (x, z)
    }
}

impl MotionModel for PedestrianMotion {
    fn integrate(&mut self, controls: ControlFlags, delta_secs: f32, probe: &dyn SurfaceProbe) {
        if !valid_delta(delta_secs) {
            return;
        }

        let (x, z) = Self::input_vector(controls);
        if x != 0.0 || z != 0.0 {
            self.heading = x.atan2(z);
            let direction = Position::new(x, 0.0, z).normalize_or_zero();
            self.velocity = direction * WALK_SPEED;
            self.position += self.velocity * delta_secs;
            self.speed = WALK_SPEED;
        } else {
            self.velocity = Position::ZERO;
            self.speed = 0.0;
        }

        follow_ground(&mut self.position, PEDESTRIAN_CLEARANCE, probe);
    }

    fn snapshot(&self) -> AgentSnapshot {
        AgentSnapshot {
            position: self.position,
            velocity: self.velocity,
            heading: self.heading,
            speed: self.speed,
            steering: 0.0,
            is_accelerating: false,
        }
    }

    fn reset(&mut self, position: Position, heading: f32) {
        *self = Self::new(position, heading);
    }
}
