//! Terrain height probing for ground following
//!
//! Agents cast a probe straight down from a point above their head and snap to
//! the first surface it hits. That lets them drive up ramps and across the
//! bridge deck without falling through or floating.

/// Height above the agent the downward probe starts from
pub const PROBE_START_HEIGHT: f32 = 10.0;

/// Anything that can answer "what surface is under this point?"
pub trait SurfaceProbe {
    /// Height of the highest surface at `(x, z)` that lies at or below
    /// `from_y`, or `None` when the probe hits nothing.
    fn surface_below(&self, x: f32, z: f32, from_y: f32) -> Option<f32>;
}

/// A rectangular walkable surface, optionally sloped along the travel axis
#[derive(Debug, Clone, PartialEq)]
pub struct SurfacePatch {
    pub min_x: f32,
    pub max_x: f32,
    pub min_z: f32,
    pub max_z: f32,
    /// Height at `min_z`
    pub height_start: f32,
    /// Height at `max_z`
    pub height_end: f32,
}

impl SurfacePatch {
    /// A level deck
    pub fn flat(min_x: f32, max_x: f32, min_z: f32, max_z: f32, height: f32) -> Self {
        Self {
            min_x,
            max_x,
            min_z,
            max_z,
            height_start: height,
            height_end: height,
        }
    }

    /// Height at `(x, z)` if the point lies over this patch
    pub fn height_at(&self, x: f32, z: f32) -> Option<f32> {
        if x < self.min_x || x > self.max_x || z < self.min_z || z > self.max_z {
            return None;
        }
        let span = self.max_z - self.min_z;
        let t = if span > 0.0 { (z - self.min_z) / span } else { 0.0 };
        Some(self.height_start + (self.height_end - self.height_start) * t)
    }
}

/// Ground plane plus raised structures
#[derive(Debug, Clone, PartialEq)]
pub struct Terrain {
    pub ground_height: f32,
    /// Half-size of the ground plane around the origin; `None` for unbounded
    pub ground_half_extent: Option<f32>,
    pub patches: Vec<SurfacePatch>,
}

impl Default for Terrain {
    fn default() -> Self {
        Self::corridor()
    }
}

impl Terrain {
    /// Unbounded flat ground and nothing else
    pub fn flat() -> Self {
        Self {
            ground_height: 0.0,
            ground_half_extent: None,
            patches: Vec::new(),
        }
    }

    /// The standard corridor: flat ground with the overpass west of the road.
    ///
    /// The bridge deck sits 8 units up, 18 wide and 80 long, centred on
    /// (-80, 100), with a ramp at each end.
    pub fn corridor() -> Self {
        let (min_x, max_x) = (-89.0, -71.0);
        Self {
            ground_height: 0.0,
            ground_half_extent: None,
            patches: vec![
                SurfacePatch {
                    min_x,
                    max_x,
                    min_z: 20.0,
                    max_z: 60.0,
                    height_start: 0.0,
                    height_end: 8.0,
                },
                SurfacePatch::flat(min_x, max_x, 60.0, 140.0, 8.0),
                SurfacePatch {
                    min_x,
                    max_x,
                    min_z: 140.0,
                    max_z: 180.0,
                    height_start: 8.0,
                    height_end: 0.0,
                },
            ],
        }
    }

    fn ground_at(&self, x: f32, z: f32) -> Option<f32> {
        match self.ground_half_extent {
            Some(half) if x.abs() > half || z.abs() > half => None,
            _ => Some(self.ground_height),
        }
    }
}

impl SurfaceProbe for Terrain {
    fn surface_below(&self, x: f32, z: f32, from_y: f32) -> Option<f32> {
        self.patches
            .iter()
            .filter_map(|p| p.height_at(x, z))
            .chain(self.ground_at(x, z))
            .filter(|h| *h <= from_y)
            .reduce(f32::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_ground_everywhere() {
        let t = Terrain::flat();
        assert_eq!(t.surface_below(1e6, -1e6, 5.0), Some(0.0));
    }

    #[test]
    fn bridge_deck_above_ground() {
        let t = Terrain::corridor();
        assert_eq!(t.surface_below(-80.0, 100.0, 20.0), Some(8.0));
        // Probe starting under the deck only sees the ground
        assert_eq!(t.surface_below(-80.0, 100.0, 5.0), Some(0.0));
    }

    #[test]
    fn ramp_interpolates() {
        let t = Terrain::corridor();
        let h = t.surface_below(-80.0, 40.0, 20.0).unwrap();
        assert!((h - 4.0).abs() < 1e-4);
    }

    #[test]
    fn bounded_ground_has_edges() {
        let t = Terrain {
            ground_half_extent: Some(1000.0),
            ..Terrain::flat()
        };
        assert_eq!(t.surface_below(0.0, 1500.0, 10.0), None);
    }
}
