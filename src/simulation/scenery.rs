//! Procedural scenery categories streamed along the corridor
//!
//! Each category has its own prime and spawn probability and never shares a
//! generator with another category. The draw order inside `generate` is part
//! of each category's contract: reordering draws changes every tile.

use super::random::SeededGenerator;
use super::tiles::{FeatureGenerator, TileCategory, TileFeature, TileStreamer};
use super::types::Position;

pub const ROAD_SEGMENTS: TileCategory = TileCategory {
    name: "road segments",
    tile_size: 200.0,
    view_distance: 400.0,
    spawn_probability: 1.0,
    prime: 6151,
};

pub const CITY_CLUSTERS: TileCategory = TileCategory {
    name: "city clusters",
    tile_size: 400.0,
    view_distance: 800.0,
    spawn_probability: 0.1,
    prime: 8191,
};

pub const CONSTRUCTION_ZONES: TileCategory = TileCategory {
    name: "construction zones",
    tile_size: 200.0,
    view_distance: 400.0,
    spawn_probability: 0.2,
    prime: 7919,
};

pub const POWER_STATIONS: TileCategory = TileCategory {
    name: "power stations",
    tile_size: 300.0,
    view_distance: 600.0,
    spawn_probability: 0.15,
    prime: 9973,
};

pub const UTILITY_POLES: TileCategory = TileCategory {
    name: "utility poles",
    tile_size: 40.0,
    view_distance: 400.0,
    spawn_probability: 1.0,
    prime: 104_729,
};

/// Building colours for city clusters
pub const BUILDING_PALETTE: [&str; 5] = ["#4a5a6a", "#5a6a7a", "#3a4a5a", "#6a7a8a", "#2a3a4a"];

/// Number of window lights scattered around a city cluster
pub const CITY_LIGHT_COUNT: usize = 20;

/// Lateral distance of the pole lines from the road centre
pub const POLE_LINE_OFFSET: f32 = 25.0;
/// Nominal pole height before jitter
pub const POLE_BASE_HEIGHT: f32 = 8.0;
/// Vertical sag of a cable at the midpoint between two poles
pub const CABLE_SAG: f32 = 1.2;
/// Lateral offsets of the three parallel cables on each cross-arm
pub const CABLE_OFFSETS: [f32; 3] = [-1.4, 0.0, 1.4];

// ---------------------------------------------------------------------------
// Road segments

/// A patch of repaired asphalt on a road segment
#[derive(Debug, Clone, PartialEq)]
pub struct RoadPatch {
    pub z: f32,
    pub x: f32,
    pub length: f32,
}

/// One recycled road segment with its marking layout
#[derive(Debug, Clone, PartialEq)]
pub struct RoadSegment {
    pub z_start: f32,
    pub length: f32,
    /// How faded the lane markings are, 0 = fresh
    pub marking_wear: f32,
    pub patches: Vec<RoadPatch>,
}

impl RoadSegment {
    pub fn center_z(&self) -> f32 {
        self.z_start + self.length / 2.0
    }
}

#[derive(Debug, Clone, Default)]
pub struct RoadSegments;

impl FeatureGenerator for RoadSegments {
    type Feature = RoadSegment;

    fn category(&self) -> &TileCategory {
        &ROAD_SEGMENTS
    }

    fn generate(&self, tile: i64, rng: &mut SeededGenerator) -> RoadSegment {
        let category = self.category();
        let z_start = category.tile_start(tile);
        let marking_wear = rng.range(0.0, 1.0);
        let patch_count = rng.int(0, 4);

        let patches = (0..patch_count)
            .map(|_| RoadPatch {
                z: z_start + rng.range(0.0, category.tile_size),
                x: rng.range(-5.0, 5.0),
                length: rng.range(2.0, 8.0),
            })
            .collect();

        RoadSegment {
            z_start,
            length: category.tile_size,
            marking_wear,
            patches,
        }
    }
}

// ---------------------------------------------------------------------------
// City clusters

#[derive(Debug, Clone, PartialEq)]
pub struct Building {
    /// Base centre of the building
    pub position: Position,
    pub height: f32,
    pub width: f32,
    pub depth: f32,
    /// Index into [`BUILDING_PALETTE`]
    pub palette_index: usize,
}

impl Building {
    pub fn color(&self) -> &'static str {
        BUILDING_PALETTE[self.palette_index]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CityCluster {
    pub center: Position,
    pub buildings: Vec<Building>,
    pub lights: Vec<Position>,
}

#[derive(Debug, Clone, Default)]
pub struct CityClusters;

impl FeatureGenerator for CityClusters {
    type Feature = CityCluster;

    fn category(&self) -> &TileCategory {
        &CITY_CLUSTERS
    }

    fn generate(&self, tile: i64, rng: &mut SeededGenerator) -> CityCluster {
        let half = self.category().tile_size / 2.0;
        let z_offset = rng.range(-half, half);
        let side = rng.side();
        let x = side * rng.range(30.0, 80.0);
        let z = self.category().tile_start(tile) + z_offset;

        let building_count = rng.int(15, 30);
        let buildings = (0..building_count)
            .map(|_| {
                let bx = x + rng.range(-25.0, 25.0);
                let bz = z + rng.range(-25.0, 25.0);
                let height = rng.range(8.0, 40.0);
                let width = rng.range(3.0, 8.0);
                let depth = rng.range(3.0, 8.0);
                let palette_index = rng.int(0, BUILDING_PALETTE.len() as i32) as usize;
                Building {
                    position: Position::new(bx, 0.0, bz),
                    height,
                    width,
                    depth,
                    palette_index,
                }
            })
            .collect();

        let lights = (0..CITY_LIGHT_COUNT)
            .map(|_| {
                let lx = x + rng.range(-30.0, 30.0);
                let ly = rng.range(5.0, 15.0);
                let lz = z + rng.range(-30.0, 30.0);
                Position::new(lx, ly, lz)
            })
            .collect();

        CityCluster {
            center: Position::new(x, 0.0, z),
            buildings,
            lights,
        }
    }
}

// ---------------------------------------------------------------------------
// Construction zones

#[derive(Debug, Clone, PartialEq)]
pub struct ConstructionZone {
    pub center: Position,
    pub cones: Vec<Position>,
    pub barrels: Vec<Position>,
    /// Centre of the "ROAD WORK AHEAD" sign panel
    pub sign: Position,
}

#[derive(Debug, Clone, Default)]
pub struct ConstructionZones;

impl FeatureGenerator for ConstructionZones {
    type Feature = ConstructionZone;

    fn category(&self) -> &TileCategory {
        &CONSTRUCTION_ZONES
    }

    fn generate(&self, tile: i64, rng: &mut SeededGenerator) -> ConstructionZone {
        let half = self.category().tile_size / 2.0;
        let z_offset = rng.range(-half, half);
        let x = rng.range(-5.0, 5.0);
        let z = self.category().tile_start(tile) + z_offset;

        let cone_count = rng.int(5, 12);
        let cones = (0..cone_count)
            .map(|i| {
                let cx = x + rng.range(-3.0, 3.0);
                let cz = z + i as f32 * rng.range(3.0, 6.0);
                Position::new(cx, 0.3, cz)
            })
            .collect();

        let barrels = (0..3)
            .map(|i| Position::new(x + rng.range(-2.0, 2.0), 0.4, z + i as f32 * 8.0))
            .collect();

        ConstructionZone {
            center: Position::new(x, 0.0, z),
            cones,
            barrels,
            sign: Position::new(x - 4.0, 1.5, z),
        }
    }
}

// ---------------------------------------------------------------------------
// Power stations

#[derive(Debug, Clone, PartialEq)]
pub struct PowerStation {
    pub center: Position,
}

impl PowerStation {
    /// Radius of the perimeter fence
    pub const FENCE_RADIUS: f32 = 10.0;
    pub const FENCE_POSTS: usize = 12;

    /// Transformer units lined up in front of the main building
    pub fn transformers(&self) -> [Position; 3] {
        [0.0, 1.0, 2.0].map(|i| self.center + Position::new(-4.0 + i * 4.0, 1.5, 8.0))
    }

    /// Feet of the two lattice towers behind the building
    pub fn towers(&self) -> [Position; 2] {
        [-6.0, 6.0].map(|x| self.center + Position::new(x, 0.0, -8.0))
    }

    pub fn fence_posts(&self) -> Vec<Position> {
        (0..Self::FENCE_POSTS)
            .map(|i| {
                let angle = i as f32 / Self::FENCE_POSTS as f32 * std::f32::consts::TAU;
                self.center
                    + Position::new(
                        angle.sin() * Self::FENCE_RADIUS,
                        1.0,
                        angle.cos() * Self::FENCE_RADIUS,
                    )
            })
            .collect()
    }
}

#[derive(Debug, Clone, Default)]
pub struct PowerStations;

impl FeatureGenerator for PowerStations {
    type Feature = PowerStation;

    fn category(&self) -> &TileCategory {
        &POWER_STATIONS
    }

    fn generate(&self, tile: i64, rng: &mut SeededGenerator) -> PowerStation {
        let half = self.category().tile_size / 2.0;
        let z_offset = rng.range(-half, half);
        let side = rng.side();
        let x = side * rng.range(20.0, 50.0);
        PowerStation {
            center: Position::new(x, 0.0, self.category().tile_start(tile) + z_offset),
        }
    }
}

// ---------------------------------------------------------------------------
// Utility poles and cables

#[derive(Debug, Clone, PartialEq)]
pub struct UtilityPole {
    /// Foot of the pole
    pub base: Position,
    pub height: f32,
    pub has_transformer: bool,
    pub has_guy_wire: bool,
}

impl UtilityPole {
    /// Height of the cross-arm the cables hang from
    pub fn arm_height(&self) -> f32 {
        self.height - 1.0
    }
}

/// A pair of poles facing each other across the road
#[derive(Debug, Clone, PartialEq)]
pub struct PolePair {
    pub left: UtilityPole,
    pub right: UtilityPole,
}

#[derive(Debug, Clone, Default)]
pub struct UtilityPoles;

impl UtilityPoles {
    fn pole(tile: i64, x: f32, z: f32, rng: &mut SeededGenerator) -> UtilityPole {
        let jitter = rng.range(-0.5, 0.5);
        let has_transformer = rng.next() > 0.7;
        // Only every fifth pole can carry a guy wire; others skip the draw.
        let has_guy_wire = tile.rem_euclid(5) == 0 && rng.next() > 0.5;
        UtilityPole {
            base: Position::new(x, 0.0, z),
            height: POLE_BASE_HEIGHT + jitter,
            has_transformer,
            has_guy_wire,
        }
    }
}

impl FeatureGenerator for UtilityPoles {
    type Feature = PolePair;

    fn category(&self) -> &TileCategory {
        &UTILITY_POLES
    }

    fn generate(&self, tile: i64, rng: &mut SeededGenerator) -> PolePair {
        let z = self.category().tile_start(tile);
        let left = Self::pole(tile, -POLE_LINE_OFFSET, z, rng);
        let right = Self::pole(tile, POLE_LINE_OFFSET, z, rng);
        PolePair { left, right }
    }
}

/// One cable between two neighbouring poles
#[derive(Debug, Clone, PartialEq)]
pub struct CableSpan {
    pub start: Position,
    pub mid: Position,
    pub end: Position,
}

/// Cables for one line of poles, ordered by z.
///
/// Every consecutive pair of poles gets three parallel cables hanging from the
/// cross-arm, each sagging by [`CABLE_SAG`] at the midpoint.
pub fn cable_spans(poles: &[&UtilityPole]) -> Vec<CableSpan> {
    let mut spans = Vec::new();
    for pair in poles.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        for offset in CABLE_OFFSETS {
            let start = Position::new(a.base.x + offset, a.arm_height(), a.base.z);
            let end = Position::new(b.base.x + offset, b.arm_height(), b.base.z);
            let mid = Position::new(
                (a.base.x + b.base.x) / 2.0 + offset,
                (a.arm_height() + b.arm_height()) / 2.0 - CABLE_SAG,
                (a.base.z + b.base.z) / 2.0,
            );
            spans.push(CableSpan { start, mid, end });
        }
    }
    spans
}

// ---------------------------------------------------------------------------

/// All scenery categories streamed around the observer
#[derive(Debug, Clone)]
pub struct Scenery {
    pub roads: TileStreamer<RoadSegments>,
    pub cities: TileStreamer<CityClusters>,
    pub construction: TileStreamer<ConstructionZones>,
    pub power_stations: TileStreamer<PowerStations>,
    pub poles: TileStreamer<UtilityPoles>,
}

impl Default for Scenery {
    fn default() -> Self {
        Self::new()
    }
}

impl Scenery {
    pub fn new() -> Self {
        Self {
            roads: TileStreamer::new(RoadSegments),
            cities: TileStreamer::new(CityClusters),
            construction: TileStreamer::new(ConstructionZones),
            power_stations: TileStreamer::new(PowerStations),
            poles: TileStreamer::new(UtilityPoles),
        }
    }

    /// Regenerate every category for observer coordinate `z`
    pub fn update(&mut self, z: f32) {
        self.roads.update(z);
        self.cities.update(z);
        self.construction.update(z);
        self.power_stations.update(z);
        self.poles.update(z);
    }

    /// Cables of the left and right pole lines currently streamed in
    pub fn cables(&self) -> (Vec<CableSpan>, Vec<CableSpan>) {
        let pairs: &[TileFeature<PolePair>] = self.poles.features();
        let left: Vec<&UtilityPole> = pairs.iter().map(|p| &p.feature.left).collect();
        let right: Vec<&UtilityPole> = pairs.iter().map(|p| &p.feature.right).collect();
        (cable_spans(&left), cable_spans(&right))
    }

    /// Total number of features currently materialized across categories
    pub fn feature_count(&self) -> usize {
        self.roads.features().len()
            + self.cities.features().len()
            + self.construction.features().len()
            + self.power_stations.features().len()
            + self.poles.features().len()
    }
}
