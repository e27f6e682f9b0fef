//! Main simulation world that ties everything together
//!
//! This is the entry point for running the driving simulation
//! without any Bevy dependencies.

use anyhow::{Context, Result};
use log::{info, warn};
use rand::Rng;

use super::audio::DrivingAudio;
use super::camera::{CameraMode, CameraTracker};
use super::controls::{ControlRegistry, ControlScope};
use super::hud::HudSnapshot;
use super::route::{Route, RouteProgressTracker};
use super::route_draft::RouteDraftManager;
use super::route_store::{RouteRequest, RouteRequests, RouteResponse, RouteStore};
use super::scenery::{Scenery, POLE_LINE_OFFSET};
use super::terrain::Terrain;
use super::traffic::{TrafficPool, TRAFFIC_POOL_SIZE, TRAFFIC_SEED};
use super::types::{GameMode, Position, ROAD_HALF_WIDTH};
use super::vehicle::{
    AgentSnapshot, ControlFlags, MotionModel, PedestrianMotion, VehicleMotion,
};

/// The main simulation world
pub struct SimWorld {
    mode: GameMode,

    /// Terrain probed for ground following
    pub terrain: Terrain,

    truck: VehicleMotion,
    walker: PedestrianMotion,

    pub camera: CameraTracker,
    /// Drive view picked with the camera toggle, restored on re-entering drive mode
    drive_view: CameraMode,

    pub tracker: RouteProgressTracker,
    pub draft: RouteDraftManager,

    pub scenery: Scenery,
    pub traffic: TrafficPool,
    pub audio: DrivingAudio,

    controls: ControlRegistry,
    scope: Option<ControlScope>,

    routes: Option<RouteRequests>,
    /// Drafts queued for saving so far
    saved_drafts: u64,

    /// Simulation time
    pub time: f32,
    pub ticks: u64,
}

impl Default for SimWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl SimWorld {
    fn new_internal(traffic: TrafficPool, mode: GameMode) -> Self {
        let mut world = Self {
            mode,
            terrain: Terrain::corridor(),
            truck: VehicleMotion::default(),
            walker: PedestrianMotion::default(),
            camera: CameraTracker::default(),
            drive_view: CameraMode::Chase,
            tracker: RouteProgressTracker::new(),
            draft: RouteDraftManager::new(),
            scenery: Scenery::new(),
            traffic,
            audio: DrivingAudio::new(),
            controls: ControlRegistry::new(),
            scope: None,
            routes: None,
            saved_drafts: 0,
            time: 0.0,
            ticks: 0,
        };
        world.enter_mode(mode);
        world.scenery.update(world.observer().z);
        world
    }

    pub fn new() -> Self {
        Self::new_internal(TrafficPool::default(), GameMode::Drive)
    }

    /// Create a world whose traffic pool uses `seed` instead of the default
    pub fn new_with_seed(seed: i64) -> Self {
        Self::new_internal(TrafficPool::new(seed, TRAFFIC_POOL_SIZE), GameMode::Drive)
    }

    /// Create a world starting in `mode`
    pub fn new_in_mode(mode: GameMode) -> Self {
        Self::new_internal(TrafficPool::new(TRAFFIC_SEED, TRAFFIC_POOL_SIZE), mode)
    }

    pub fn mode(&self) -> GameMode {
        self.mode
    }

    pub fn controls(&self) -> &ControlRegistry {
        &self.controls
    }

    fn camera_mode_for(&self, mode: GameMode) -> CameraMode {
        match mode {
            GameMode::Drive => self.drive_view,
            GameMode::RouteCreator => CameraMode::OverheadEdit,
            GameMode::Walk => CameraMode::PedestrianFollow,
        }
    }

    fn enter_mode(&mut self, mode: GameMode) {
        self.mode = mode;
        self.scope = Some(self.controls.register(mode));
        self.camera.set_mode(self.camera_mode_for(mode));
        if mode == GameMode::Drive {
            self.audio.start();
        }
    }

    fn exit_mode(&mut self) {
        // Dropping the scope releases every held key of the old mode
        self.scope = None;
        if self.mode == GameMode::Drive {
            self.audio.stop();
        }
    }

    /// Switch mode. The old mode's controls and audio are torn down first.
    pub fn set_mode(&mut self, mode: GameMode) {
        if mode == self.mode {
            return;
        }
        info!("Mode {} -> {}", self.mode.label(), mode.label());
        self.exit_mode();
        self.enter_mode(mode);
    }

    /// Advance to the next mode in the drive, route-creator, walk cycle
    pub fn cycle_mode(&mut self) -> GameMode {
        self.set_mode(self.mode.next());
        self.mode
    }

    /// Publish this frame's input for the current mode
    pub fn set_controls(&mut self, flags: ControlFlags) {
        if let Some(scope) = &self.scope {
            scope.set_flags(flags);
        }
    }

    /// Flip chase and cab views. Only meaningful while driving.
    pub fn toggle_camera(&mut self) -> CameraMode {
        if self.mode == GameMode::Drive {
            self.drive_view = self.camera.toggle_drive_view();
        }
        self.camera.mode()
    }

    pub fn truck(&self) -> AgentSnapshot {
        self.truck.snapshot()
    }

    pub fn walker(&self) -> AgentSnapshot {
        self.walker.snapshot()
    }

    /// Snapshot of the agent the camera follows in the current mode
    pub fn active_agent(&self) -> AgentSnapshot {
        match self.mode {
            GameMode::Walk => self.walker.snapshot(),
            GameMode::Drive | GameMode::RouteCreator => self.truck.snapshot(),
        }
    }

    /// Position scenery and traffic are streamed around
    pub fn observer(&self) -> Position {
        self.active_agent().position
    }

    /// Put the truck somewhere, stopped
    pub fn place_truck(&mut self, position: Position, heading: f32) {
        self.truck.reset(position, heading);
    }

    pub fn place_walker(&mut self, position: Position, heading: f32) {
        self.walker.reset(position, heading);
    }

    /// Ground click. Adds a draft waypoint while in route-creator mode.
    pub fn click_ground(&mut self, point: Position) -> Option<String> {
        match self.mode {
            GameMode::RouteCreator => Some(self.draft.append(point)),
            _ => None,
        }
    }

    pub fn load_route(&mut self, route: Route) {
        self.tracker.load_route(route);
    }

    pub fn clear_route(&mut self) {
        self.tracker.clear_route();
    }

    /// Run a route store on a background worker
    pub fn attach_store<S>(&mut self, store: S)
    where
        S: RouteStore + Send + 'static,
    {
        self.routes = Some(RouteRequests::spawn(store));
    }

    pub fn request(&mut self, request: RouteRequest) -> Result<()> {
        self.routes
            .as_mut()
            .context("No route store attached")?
            .submit(request)
    }

    /// Validate the draft and queue it for saving. The draft is kept so a
    /// failed save loses nothing.
    ///
    /// Ids are `route-<ms>-<n>-<8 hex>`: two saves in the same millisecond
    /// differ by the counter, two worlds by the random suffix.
    pub fn save_draft(&mut self, author: &str, now_ns: i64) -> Result<String> {
        let suffix: u32 = rand::rng().random();
        let id = format!(
            "route-{}-{}-{:08x}",
            now_ns / 1_000_000,
            self.saved_drafts + 1,
            suffix
        );
        let route = self.draft.to_route(id.clone(), author, now_ns)?;
        self.request(RouteRequest::Save { route })?;
        self.saved_drafts += 1;
        Ok(id)
    }

    /// Drain finished store requests
    pub fn poll_routes(&mut self) -> Vec<RouteResponse> {
        match &mut self.routes {
            Some(routes) => routes.poll(),
            None => Vec::new(),
        }
    }

    /// Run one frame: input, motion, route progress, camera, then streaming.
    pub fn tick(&mut self, delta_secs: f32) {
        if !delta_secs.is_finite() || delta_secs < 0.0 {
            warn!("Ignoring tick with invalid delta {}", delta_secs);
            return;
        }

        let flags = self.controls.flags();
        match self.mode {
            GameMode::Drive => self.truck.integrate(flags, delta_secs, &self.terrain),
            GameMode::Walk => self.walker.integrate(flags, delta_secs, &self.terrain),
            GameMode::RouteCreator => {}
        }

        let truck = self.truck.snapshot();
        self.tracker.tick(&truck.position);

        let agent = self.active_agent();
        self.camera.update(&agent);

        let z = agent.position.z;
        self.scenery.update(z);
        self.traffic.tick(delta_secs, z);

        self.audio.update(truck.speed, truck.is_accelerating);

        self.time += delta_secs;
        self.ticks += 1;
    }

    pub fn hud(&self) -> HudSnapshot {
        HudSnapshot::compose(
            self.mode,
            &self.active_agent(),
            &self.tracker,
            self.camera.mode(),
            &self.audio,
            &self.traffic,
        )
    }

    pub fn print_summary(&self) {
        let agent = self.active_agent();
        println!("=== Driving Simulation Summary ===");
        println!("Time: {:.2}s ({} ticks)", self.time, self.ticks);
        println!("Mode: {}", self.mode.label());
        println!(
            "Agent: pos=({:.1}, {:.1}, {:.1}) heading={:.2} speed={:.1}",
            agent.position.x, agent.position.y, agent.position.z, agent.heading, agent.speed
        );
        let cam = self.camera.position();
        println!(
            "Camera: {} at ({:.1}, {:.1}, {:.1})",
            self.camera.mode().label(),
            cam.x,
            cam.y,
            cam.z
        );
        println!("{}", self.hud());
        println!();

        println!("--- Scenery ---");
        println!(
            "  Roads: {}, Cities: {}, Construction: {}, Power stations: {}, Pole pairs: {}",
            self.scenery.roads.features().len(),
            self.scenery.cities.features().len(),
            self.scenery.construction.features().len(),
            self.scenery.power_stations.features().len(),
            self.scenery.poles.features().len()
        );

        println!("--- Traffic ---");
        for npc in self.traffic.agents() {
            println!(
                "  Car {:?}: z={:.1}, lane={:.2}, speed={:.1}, {:?} {}, recycled={}",
                npc.id.0 .0,
                npc.position.z,
                npc.lane_offset,
                npc.speed,
                npc.appearance.body,
                npc.appearance.color(),
                npc.recycled
            );
        }

        if let Some(route) = self.tracker.route() {
            println!("--- Route ---");
            println!(
                "  {}: waypoint {}/{}, {:.1} to next",
                route.name,
                self.tracker.current_index() + 1,
                route.waypoints.len(),
                self.tracker.distance_to_next()
            );
        }

        if !self.draft.is_empty() {
            println!("--- Draft ---");
            println!(
                "  '{}' with {} waypoints ({:.1} units), {}",
                self.draft.name(),
                self.draft.len(),
                self.draft.length(),
                if self.draft.is_valid() { "ready" } else { "incomplete" }
            );
        }
    }

    /// Print an ASCII strip of the corridor around the observer, +Z up
    pub fn draw_map(&self) {
        const HALF_WIDTH: f32 = 100.0;
        const HALF_LENGTH: f32 = 200.0;
        const COL_SCALE: f32 = 0.25; // 4 units per column
        const ROW_SCALE: f32 = 0.1; // 10 units per row

        let observer = self.observer();
        let width = (2.0 * HALF_WIDTH * COL_SCALE) as usize + 1;
        let height = (2.0 * HALF_LENGTH * ROW_SCALE) as usize + 1;
        let mut grid = vec![vec![' '; width]; height];

        let max_z = observer.z + HALF_LENGTH;
        let to_grid = |x: f32, z: f32| -> Option<(usize, usize)> {
            let col = ((x + HALF_WIDTH) * COL_SCALE).round();
            let row = ((max_z - z) * ROW_SCALE).round();
            if col < 0.0 || row < 0.0 || col as usize >= width || row as usize >= height {
                return None;
            }
            Some((row as usize, col as usize))
        };

        let plot = |grid: &mut Vec<Vec<char>>, x: f32, z: f32, c: char| {
            if let Some((row, col)) = to_grid(x, z) {
                grid[row][col] = c;
            }
        };

        // Road edges and bridge deck
        for row in 0..height {
            let z = max_z - row as f32 / ROW_SCALE;
            plot(&mut grid, -ROAD_HALF_WIDTH, z, '|');
            plot(&mut grid, ROAD_HALF_WIDTH, z, '|');
            for patch in &self.terrain.patches {
                if z >= patch.min_z && z <= patch.max_z {
                    let mut x = patch.min_x;
                    while x <= patch.max_x {
                        plot(&mut grid, x, z, '=');
                        x += 1.0 / COL_SCALE;
                    }
                }
            }
        }

        for pair in self.scenery.poles.features() {
            plot(&mut grid, -POLE_LINE_OFFSET, pair.feature.left.base.z, 'i');
            plot(&mut grid, POLE_LINE_OFFSET, pair.feature.right.base.z, 'i');
        }
        for city in self.scenery.cities.features() {
            for b in &city.feature.buildings {
                plot(&mut grid, b.position.x, b.position.z, 'B');
            }
        }
        for zone in self.scenery.construction.features() {
            for cone in &zone.feature.cones {
                plot(&mut grid, cone.x, cone.z, 'c');
            }
        }
        for station in self.scenery.power_stations.features() {
            let c = station.feature.center;
            plot(&mut grid, c.x, c.z, 'P');
        }
        for npc in self.traffic.agents() {
            let p = npc.render_position();
            plot(&mut grid, p.x, p.z, 'C');
        }
        if let Some(route) = self.tracker.route() {
            for (i, wp) in route.waypoints.iter().enumerate() {
                let c = if i == self.tracker.current_index() { 'W' } else { 'w' };
                plot(&mut grid, wp.coordinates.x, wp.coordinates.z, c);
            }
        }
        for wp in self.draft.waypoints() {
            plot(&mut grid, wp.position.x, wp.position.z, '+');
        }
        plot(&mut grid, observer.x, observer.z, '@');

        println!("\n=== Corridor Map (z {:.0}..{:.0}) ===", observer.z - HALF_LENGTH, max_z);
        println!("Legend: @=You, C=Car, B=Building, c=Cone, P=Power station, i=Pole, W/w=Waypoint, +=Draft, ==Bridge, |=Road edge");
        println!();
        for row in &grid {
            let line: String = row.iter().collect();
            println!("{}", line.trim_end());
        }
        println!();
    }
}
