//! NPC traffic pool
//!
//! A fixed number of cars drive along the corridor. Unlike scenery they carry
//! continuous motion state, so they are advanced every tick and teleported to
//! the other side of the observer when they drift too far away. Cars are never
//! created or destroyed after startup.

use log::trace;
use ordered_float::OrderedFloat;

use super::random::SeededGenerator;
use super::types::{NpcId, Position, SimId};

/// Seed of the pool generator
pub const TRAFFIC_SEED: i64 = 999;
/// Number of NPC cars in the pool
pub const TRAFFIC_POOL_SIZE: usize = 12;
/// Distance from the observer along the travel axis at which a car is recycled
pub const RECYCLE_DISTANCE: f32 = 150.0;
/// Lane offsets are drawn from `[-LANE_SPREAD, LANE_SPREAD)`
pub const LANE_SPREAD: f32 = 4.0;
/// Initial cars are spread over `[-INITIAL_SPREAD, INITIAL_SPREAD)` along the road
pub const INITIAL_SPREAD: f32 = 200.0;
/// Height of an NPC car's origin above the road
pub const NPC_RIDE_HEIGHT: f32 = 0.6;

/// Body colours NPC cars are painted with
pub const NPC_COLORS: [&str; 6] = ["#2a5a8a", "#8a2a2a", "#2a8a2a", "#6a6a6a", "#8a6a2a", "#4a4a4a"];

/// Body style of an NPC car
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyType {
    Sedan,
    Suv,
    Van,
}

impl BodyType {
    pub const ALL: [BodyType; 3] = [BodyType::Sedan, BodyType::Suv, BodyType::Van];

    /// (width, height, length) of the body
    pub fn dimensions(self) -> (f32, f32, f32) {
        match self {
            BodyType::Sedan => (1.8, 1.2, 4.0),
            BodyType::Suv => (2.0, 1.6, 4.5),
            BodyType::Van => (2.0, 2.0, 5.0),
        }
    }
}

/// Appearance tag of an NPC car
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Appearance {
    /// Index into [`NPC_COLORS`]
    pub color_index: usize,
    pub body: BodyType,
}

impl Appearance {
    pub fn color(&self) -> &'static str {
        NPC_COLORS[self.color_index]
    }
}

/// A pooled NPC car
#[derive(Debug, Clone, PartialEq)]
pub struct NpcAgent {
    pub id: NpcId,
    /// Position along the corridor; `x` is the spawn lane, superseded by `lane_offset`
    pub position: Position,
    /// Forward speed along +Z in units per second
    pub speed: f32,
    pub lane_offset: f32,
    pub appearance: Appearance,
    /// How many times this car has been teleported
    pub recycled: u32,
}

impl NpcAgent {
    /// Where the car is drawn: its lane offset replaces the spawn lane
    pub fn render_position(&self) -> Position {
        Position::new(self.lane_offset, self.position.y, self.position.z)
    }
}

/// Fixed-size pool of NPC cars
#[derive(Debug, Clone)]
pub struct TrafficPool {
    agents: Vec<NpcAgent>,
    rng: SeededGenerator,
}

impl Default for TrafficPool {
    fn default() -> Self {
        Self::new(TRAFFIC_SEED, TRAFFIC_POOL_SIZE)
    }
}

impl TrafficPool {
    /// Seed the pool. All initial draws come from one generator, which is
    /// then kept for the lane offsets drawn on recycle.
    pub fn new(seed: i64, size: usize) -> Self {
        let mut rng = SeededGenerator::new(seed);
        let agents = (0..size)
            .map(|i| {
                let lane = rng.range(-LANE_SPREAD, LANE_SPREAD);
                let z = rng.range(-INITIAL_SPREAD, INITIAL_SPREAD);
                let speed = rng.range(12.0, 20.0);
                let color_index = rng.int(0, NPC_COLORS.len() as i32) as usize;
                let body = *rng.pick(&BodyType::ALL).unwrap_or(&BodyType::Sedan);
                let lane_offset = rng.range(-LANE_SPREAD, LANE_SPREAD);
                NpcAgent {
                    id: NpcId(SimId(i)),
                    position: Position::new(lane, NPC_RIDE_HEIGHT, z),
                    speed,
                    lane_offset,
                    appearance: Appearance { color_index, body },
                    recycled: 0,
                }
            })
            .collect();

        Self { agents, rng }
    }

    pub fn agents(&self) -> &[NpcAgent] {
        &self.agents
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// Advance every car and recycle the ones that left the window around
    /// `observer_z`. Returns how many cars were recycled this tick.
    /// Non-finite or negative `delta_secs` leaves the pool untouched.
    pub fn tick(&mut self, delta_secs: f32, observer_z: f32) -> usize {
        if !delta_secs.is_finite() || delta_secs < 0.0 {
            return 0;
        }

        let mut recycled = 0;
        for agent in &mut self.agents {
            agent.position.z += agent.speed * delta_secs;

            let ahead = agent.position.z - observer_z;
            if ahead > RECYCLE_DISTANCE {
                agent.position.z = observer_z - RECYCLE_DISTANCE;
            } else if ahead < -RECYCLE_DISTANCE {
                agent.position.z = observer_z + RECYCLE_DISTANCE;
            } else {
                continue;
            }

            agent.lane_offset = self.rng.range(-LANE_SPREAD, LANE_SPREAD);
            agent.recycled += 1;
            recycled += 1;
            trace!(
                "Recycled NPC {:?} to z={:.1} lane={:.2}",
                agent.id.0,
                agent.position.z,
                agent.lane_offset
            );
        }
        recycled
    }

    /// The car closest to `observer`, measured at its drawn position
    pub fn nearest_to(&self, observer: &Position) -> Option<(&NpcAgent, f32)> {
        self.agents
            .iter()
            .map(|a| (a, a.render_position().distance(observer)))
            .min_by_key(|(_, d)| OrderedFloat(*d))
    }
}
