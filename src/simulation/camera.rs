//! Smoothed follow camera
//!
//! The camera chases a target pose derived from the agent snapshot. Each
//! update moves it a fixed fraction of the way there, so mode switches glide
//! instead of snapping. The fraction is per tick, not per second.

use super::types::Position;
use super::vehicle::AgentSnapshot;

/// Height above the agent the camera looks at
pub const EYE_HEIGHT: f32 = 1.0;
/// Starting camera position
pub const INITIAL_CAMERA_POSITION: Position = Position {
    x: 0.0,
    y: 5.0,
    z: 10.0,
};

/// Viewing modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CameraMode {
    /// Behind and above the truck
    #[default]
    Chase,
    /// Inside the truck cab
    Cab,
    /// Over the shoulder of the pedestrian
    PedestrianFollow,
    /// High behind the agent while placing waypoints
    OverheadEdit,
}

/// Framing parameters of a camera mode
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraModeParams {
    /// Distance behind the agent; negative puts the camera ahead of its origin
    pub distance: f32,
    pub height: f32,
    pub look_ahead: f32,
    /// Fraction of the remaining gap the position closes per update
    pub position_smoothing: f32,
    /// Fraction of the remaining gap the look-at point closes per update
    pub look_at_smoothing: f32,
}

impl CameraMode {
    pub fn params(self) -> CameraModeParams {
        match self {
            CameraMode::Chase => CameraModeParams {
                distance: 20.0,
                height: 10.0,
                look_ahead: 8.0,
                position_smoothing: 0.08,
                look_at_smoothing: 0.1,
            },
            CameraMode::Cab => CameraModeParams {
                distance: -1.5,
                height: 2.8,
                look_ahead: 20.0,
                position_smoothing: 0.35,
                look_at_smoothing: 0.35,
            },
            CameraMode::PedestrianFollow => CameraModeParams {
                distance: 6.0,
                height: 3.0,
                look_ahead: 2.0,
                position_smoothing: 0.1,
                look_at_smoothing: 0.15,
            },
            CameraMode::OverheadEdit => CameraModeParams {
                distance: 15.0,
                height: 8.0,
                look_ahead: 0.0,
                position_smoothing: 0.05,
                look_at_smoothing: 0.1,
            },
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CameraMode::Chase => "chase",
            CameraMode::Cab => "cab",
            CameraMode::PedestrianFollow => "pedestrian-follow",
            CameraMode::OverheadEdit => "overhead-edit",
        }
    }
}

/// Camera pose that eases towards the agent every update
#[derive(Debug, Clone, PartialEq)]
pub struct CameraTracker {
    mode: CameraMode,
    position: Position,
    look_at: Position,
}

impl Default for CameraTracker {
    fn default() -> Self {
        Self::new(CameraMode::Chase)
    }
}

impl CameraTracker {
    pub fn new(mode: CameraMode) -> Self {
        Self {
            mode,
            position: INITIAL_CAMERA_POSITION,
            look_at: Position::ZERO,
        }
    }

    pub fn mode(&self) -> CameraMode {
        self.mode
    }

    /// Change the framing. The current pose is kept and glides to the new target.
    pub fn set_mode(&mut self, mode: CameraMode) {
        self.mode = mode;
    }

    /// Flip between the chase and cab views; other modes go to chase.
    pub fn toggle_drive_view(&mut self) -> CameraMode {
        self.mode = match self.mode {
            CameraMode::Chase => CameraMode::Cab,
            _ => CameraMode::Chase,
        };
        self.mode
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn look_at(&self) -> Position {
        self.look_at
    }

    /// Where the camera would sit and look at for `agent` in the current mode
    pub fn desired_pose(&self, agent: &AgentSnapshot) -> (Position, Position) {
        let p = self.mode.params();
        let (sin, cos) = agent.heading.sin_cos();
        let position = agent.position + Position::new(-sin * p.distance, p.height, -cos * p.distance);
        let look_at = agent.position + Position::new(sin * p.look_ahead, EYE_HEIGHT, cos * p.look_ahead);
        (position, look_at)
    }

    /// Ease the pose towards the agent
    pub fn update(&mut self, agent: &AgentSnapshot) {
        let p = self.mode.params();
        let (desired_position, desired_look_at) = self.desired_pose(agent);
        self.position = self.position.lerp(&desired_position, p.position_smoothing);
        self.look_at = self.look_at.lerp(&desired_look_at, p.look_at_smoothing);
    }
}
