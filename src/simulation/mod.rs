//! Standalone driving simulation module
//!
//! This module contains all the core simulation logic that can run
//! independently of the Bevy game engine. It can be tested via console
//! without needing to boot up the full game.

mod audio;
mod camera;
mod controls;
mod hud;
mod random;
mod route;
mod route_draft;
mod route_store;
mod scenery;
mod terrain;
mod tiles;
mod traffic;
mod types;
mod vehicle;
mod world;

// Re-export public types for external use
// These may not be used within this crate but are part of the public API
#[allow(unused_imports)]
pub use audio::{AudioOutput, DrivingAudio, OscillatorState};
#[allow(unused_imports)]
pub use camera::{CameraMode, CameraModeParams, CameraTracker, EYE_HEIGHT, INITIAL_CAMERA_POSITION};
#[allow(unused_imports)]
pub use controls::{ControlRegistry, ControlScope};
#[allow(unused_imports)]
pub use hud::{speed_kmh, HudSnapshot, RouteHud};
#[allow(unused_imports)]
pub use random::SeededGenerator;
#[allow(unused_imports)]
pub use route::{
    polyline_length, Coordinates, Route, RouteProgress, RouteProgressTracker, RouteSummary,
    Waypoint, WaypointType, DEFAULT_WAYPOINT_RADIUS,
};
#[allow(unused_imports)]
pub use route_draft::{RouteDraftManager, WaypointDraft, INVALID_DRAFT_MESSAGE};
#[allow(unused_imports)]
pub use route_store::{
    read_route, read_routes, JsonRouteStore, MemoryRouteStore, RouteRequest, RouteRequests,
    RouteResponse, RouteStore,
};
#[allow(unused_imports)]
pub use scenery::{
    cable_spans, Building, CableSpan, CityCluster, CityClusters, ConstructionZone,
    ConstructionZones, PolePair, PowerStation, PowerStations, RoadPatch, RoadSegment,
    RoadSegments, Scenery, UtilityPole, UtilityPoles, CITY_CLUSTERS, CONSTRUCTION_ZONES,
    POLE_LINE_OFFSET, POWER_STATIONS, ROAD_SEGMENTS, UTILITY_POLES,
};
#[allow(unused_imports)]
pub use terrain::{SurfacePatch, SurfaceProbe, Terrain, PROBE_START_HEIGHT};
#[allow(unused_imports)]
pub use tiles::{features_around, generate_tile, FeatureGenerator, TileCategory, TileFeature, TileStreamer};
#[allow(unused_imports)]
pub use traffic::{
    Appearance, BodyType, NpcAgent, TrafficPool, LANE_SPREAD, NPC_COLORS, RECYCLE_DISTANCE,
    TRAFFIC_POOL_SIZE, TRAFFIC_SEED,
};
#[allow(unused_imports)]
pub use types::{heading_vector, GameMode, NpcId, Position, SimId, MS_TO_KMH, ROAD_HALF_WIDTH};
#[allow(unused_imports)]
pub use vehicle::{
    AgentSnapshot, ControlFlags, MotionModel, PedestrianMotion, VehicleMotion, BRAKE_ACCEL,
    FORWARD_ACCEL, FRICTION, MAX_SPEED, PEDESTRIAN_CLEARANCE, REVERSE_SPEED_CAP,
    STEER_SPEED_THRESHOLD, TURN_RATE, VEHICLE_CLEARANCE, WALK_SPEED,
};
pub use world::SimWorld;
