//! Deterministic tile streaming
//!
//! The travel axis is cut into fixed-length tiles. Whether a tile holds a
//! feature, and where that feature sits, is derived purely from the tile index
//! and the category's prime. Nothing is remembered between frames: the window
//! around the observer is regenerated every tick, so moving back and forth
//! across a boundary always produces the same features.

use std::fmt::Debug;
use std::ops::RangeInclusive;

use log::debug;

use super::random::SeededGenerator;

/// Fixed parameters of one procedural category
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileCategory {
    pub name: &'static str,
    /// Length of one tile along the travel axis
    pub tile_size: f32,
    /// How far ahead of and behind the observer tiles are materialized
    pub view_distance: f32,
    /// Probability that a tile holds a feature
    pub spawn_probability: f32,
    /// Large prime multiplied with the tile index to seed the tile generator
    pub prime: i64,
}

impl TileCategory {
    /// Inclusive range of tile indices visible from observer coordinate `z`.
    ///
    /// Tiles are right-open (`floor` division) so a coordinate on a boundary
    /// belongs to exactly one tile.
    pub fn window(&self, z: f32) -> RangeInclusive<i64> {
        let start = ((z - self.view_distance) / self.tile_size).floor() as i64;
        let end = ((z + self.view_distance) / self.tile_size).floor() as i64;
        start..=end
    }

    /// Seed for a given tile index
    pub fn tile_seed(&self, tile: i64) -> i64 {
        tile.wrapping_mul(self.prime)
    }

    /// World coordinate where a tile begins
    pub fn tile_start(&self, tile: i64) -> f32 {
        tile as f32 * self.tile_size
    }
}

/// Produces the feature for one tile from a generator seeded for that tile.
///
/// Implementations must consume the generator in the same order every time,
/// otherwise revisiting a tile would produce a different feature.
pub trait FeatureGenerator {
    type Feature: Clone + PartialEq + Debug;

    fn category(&self) -> &TileCategory;

    /// Draw all placement parameters after the spawn draw has succeeded.
    fn generate(&self, tile: i64, rng: &mut SeededGenerator) -> Self::Feature;
}

/// A generated feature together with the tile it came from
#[derive(Debug, Clone, PartialEq)]
pub struct TileFeature<F> {
    pub tile: i64,
    pub seed: i64,
    pub feature: F,
}

/// Generate a single tile. Returns `None` when the spawn draw fails.
pub fn generate_tile<G: FeatureGenerator>(generator: &G, tile: i64) -> Option<TileFeature<G::Feature>> {
    let category = generator.category();
    let seed = category.tile_seed(tile);
    let mut rng = SeededGenerator::new(seed);

    if !rng.chance(category.spawn_probability) {
        return None;
    }

    Some(TileFeature {
        tile,
        seed,
        feature: generator.generate(tile, &mut rng),
    })
}

/// Generate every feature in the window around `z`, in tile order.
pub fn features_around<G: FeatureGenerator>(generator: &G, z: f32) -> Vec<TileFeature<G::Feature>> {
    generator
        .category()
        .window(z)
        .filter_map(|tile| generate_tile(generator, tile))
        .collect()
}

/// Streams one category around a moving observer.
///
/// Holds the features of the current frame for readers (renderer, map, HUD).
/// They are replaced wholesale every `update`, never patched.
#[derive(Debug, Clone)]
pub struct TileStreamer<G: FeatureGenerator> {
    generator: G,
    window: Option<RangeInclusive<i64>>,
    features: Vec<TileFeature<G::Feature>>,
}

impl<G: FeatureGenerator> TileStreamer<G> {
    pub fn new(generator: G) -> Self {
        Self {
            generator,
            window: None,
            features: Vec::new(),
        }
    }

    pub fn category(&self) -> &TileCategory {
        self.generator.category()
    }

    pub fn generator(&self) -> &G {
        &self.generator
    }

    /// Recompute the feature list for observer coordinate `z`.
    pub fn update(&mut self, z: f32) -> &[TileFeature<G::Feature>] {
        let window = self.generator.category().window(z);
        if self.window.as_ref() != Some(&window) {
            debug!(
                "{} window now tiles {}..={}",
                self.generator.category().name,
                window.start(),
                window.end()
            );
        }
        self.features = features_around(&self.generator, z);
        self.window = Some(window);
        &self.features
    }

    /// Features emitted by the last `update`
    pub fn features(&self) -> &[TileFeature<G::Feature>] {
        &self.features
    }

    /// Tile window used by the last `update`
    pub fn window(&self) -> Option<RangeInclusive<i64>> {
        self.window.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Marker(TileCategory);

    impl FeatureGenerator for Marker {
        type Feature = f32;

        fn category(&self) -> &TileCategory {
            &self.0
        }

        fn generate(&self, _tile: i64, rng: &mut SeededGenerator) -> f32 {
            rng.range(0.0, 1.0)
        }
    }

    fn marker() -> Marker {
        Marker(TileCategory {
            name: "marker",
            tile_size: 100.0,
            view_distance: 250.0,
            spawn_probability: 0.5,
            prime: 7919,
        })
    }

    #[test]
    fn window_uses_floor_division() {
        let m = marker();
        assert_eq!(m.category().window(0.0), -3..=2);
        assert_eq!(m.category().window(50.0), -2..=3);
        assert_eq!(m.category().window(-50.0), -3..=2);
    }

    #[test]
    fn boundary_coordinate_belongs_to_one_tile() {
        let m = marker();
        // z - D lands exactly on the start of tile -1
        let w = m.category().window(150.0);
        assert_eq!(*w.start(), -1);
        assert_eq!(*w.end(), 4);
    }

    #[test]
    fn update_replaces_features() {
        let mut streamer = TileStreamer::new(marker());
        let first = streamer.update(0.0).to_vec();
        let far = streamer.update(10_000.0).to_vec();
        assert!(first.iter().all(|f| f.tile <= 2));
        assert!(far.iter().all(|f| f.tile >= 97));
        assert_eq!(streamer.update(0.0), first.as_slice());
    }
}
