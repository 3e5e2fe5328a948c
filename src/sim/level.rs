//! Levels: a path, the region the cursor may occupy, and what to put on it
//!
//! Two kinds of level exist. Terrain levels sample their path from a terrain
//! mesh and are bounded by a box. Road levels follow authored platforms and
//! end the run as soon as the cursor steps off every platform.

use glam::Vec3;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::bounds::Bounds;
use super::path::{Path, RoadSegment, TerrainMesh, path_from_road, path_from_terrain};
use crate::error::LevelError;

/// Margin around a terrain path before the cursor is out of bounds
pub const TERRAIN_MARGIN: f32 = 10.0;
/// Length of the straight path used when level geometry is unusable
pub const FALLBACK_LENGTH: f32 = 20.0;

/// Tree meshes picked at random for obstacles
pub const TREE_MODELS: [&str; 10] = [
    "Tree_Apple_01.obj",
    "Tree_Apple_02.obj",
    "Tree_Apple_03.obj",
    "Tree_Asian_Shaped_01.obj",
    "Tree_Asian_Shaped_03.obj",
    "Tree_Asian_Shaped_04.obj",
    "Tree_Bamboo_02.obj",
    "Tree_Bamboo_10.obj",
    "Tree_Common_01.obj",
    "Tree_Common_02.obj",
];
/// Crown mesh
pub const CROWN_MODEL: &str = "Crown_0.obj";

/// Lateral distance of roadside trees from the path
const TREE_OFFSET: f32 = 2.5;
/// Every n-th waypoint gets a pair of roadside trees
const TREE_SPACING: usize = 6;
/// Every n-th waypoint may get a gem
const GEM_SPACING: usize = 3;
const GEM_CHANCE: f64 = 0.5;
const GEM_JITTER: f32 = 0.3;

/// Authored road: (extent, position) of each platform
const DEFAULT_ROAD: [([f32; 3], [f32; 3]); 72] = [
    ([4.0, 0.1, 2.0], [2.0, -0.55, 0.0]),
    ([2.0, 0.1, 3.0], [3.0, -0.55, 1.5]),
    ([4.0, 0.1, 2.0], [4.0, -0.55, 2.0]),
    ([2.0, 0.1, 3.0], [5.0, -0.55, 3.5]),
    ([4.0, 0.1, 2.0], [6.0, -0.55, 4.0]),
    ([2.0, 0.1, 3.0], [7.0, -0.55, 5.5]),
    ([4.0, 0.1, 2.0], [8.0, -0.55, 6.0]),
    ([2.0, 0.1, 3.0], [9.0, -0.55, 7.5]),
    ([4.0, 0.1, 2.0], [10.0, -0.55, 8.0]),
    ([2.0, 0.1, 3.0], [11.0, -0.55, 9.5]),
    ([4.0, 0.1, 2.0], [12.0, -0.55, 10.0]),
    ([2.0, 0.1, 3.0], [13.0, -0.55, 11.5]),
    ([4.0, 0.1, 2.0], [14.0, -0.55, 12.0]),
    ([2.0, 0.1, 3.0], [15.0, -0.55, 13.5]),
    ([4.0, 0.1, 2.0], [16.0, -0.55, 14.0]),
    ([2.0, 0.1, 3.0], [17.0, -0.55, 15.5]),
    ([4.0, 0.1, 2.0], [18.0, -0.55, 16.0]),
    ([2.0, 0.1, 3.0], [19.0, -0.55, 17.5]),
    ([4.0, 0.1, 2.0], [20.0, -0.55, 18.0]),
    ([2.0, 0.1, 3.0], [21.0, -0.55, 19.5]),
    ([4.0, 0.1, 2.0], [22.0, -0.55, 20.0]),
    ([2.0, 0.1, 3.0], [23.0, -0.55, 21.5]),
    ([4.0, 0.1, 2.0], [24.0, -0.55, 22.0]),
    ([2.0, 0.1, 3.0], [25.0, -0.55, 23.5]),
    ([1.0, 0.1, 1.5], [25.5, -0.55, 23.75]),
    ([2.0, 0.1, 1.0], [26.0, -0.55, 24.5]),
    ([1.0, 0.1, 1.5], [26.5, -0.55, 24.75]),
    ([2.0, 0.1, 1.0], [27.0, -0.55, 25.5]),
    ([1.0, 0.1, 1.5], [27.5, -0.55, 25.75]),
    ([2.0, 0.1, 1.0], [28.0, -0.55, 26.5]),
    ([1.0, 0.1, 1.5], [28.5, -0.55, 26.75]),
    ([2.0, 0.1, 1.0], [29.0, -0.55, 27.5]),
    ([1.0, 0.1, 1.5], [29.5, -0.55, 27.75]),
    ([2.0, 0.1, 1.0], [30.0, -0.55, 28.5]),
    ([1.0, 0.1, 1.5], [30.5, -0.55, 28.75]),
    ([2.0, 0.1, 1.0], [31.0, -0.55, 29.5]),
    ([1.0, 0.1, 1.5], [31.5, -0.55, 29.75]),
    ([2.0, 0.1, 1.0], [32.0, -0.55, 30.5]),
    ([1.0, 0.1, 1.5], [32.5, -0.55, 30.75]),
    ([2.0, 0.1, 1.0], [33.0, -0.55, 31.5]),
    ([1.0, 0.1, 1.5], [33.5, -0.55, 31.75]),
    ([2.0, 0.1, 1.0], [34.0, -0.55, 32.5]),
    ([1.0, 0.1, 1.5], [34.5, -0.55, 32.75]),
    ([2.0, 0.1, 1.0], [35.0, -0.55, 33.5]),
    ([1.0, 0.1, 1.5], [35.5, -0.55, 33.75]),
    ([2.0, 0.1, 1.0], [36.0, -0.55, 34.5]),
    ([1.0, 0.1, 1.5], [36.5, -0.55, 34.75]),
    ([2.0, 0.1, 1.0], [37.0, -0.55, 35.5]),
    ([1.0, 0.1, 1.5], [37.5, -0.55, 35.75]),
    ([2.0, 0.1, 1.0], [38.0, -0.55, 36.5]),
    ([1.0, 0.1, 1.5], [38.5, -0.55, 36.75]),
    ([2.0, 0.1, 1.0], [39.0, -0.55, 37.5]),
    ([1.0, 0.1, 1.5], [39.5, -0.55, 37.75]),
    ([2.0, 0.1, 1.0], [40.0, -0.55, 38.5]),
    ([1.0, 0.1, 1.5], [40.5, -0.55, 38.75]),
    ([2.0, 0.1, 1.0], [41.0, -0.55, 39.5]),
    ([2.0, 0.1, 3.0], [42.0, -0.55, 41.0]),
    ([4.0, 0.1, 2.0], [43.0, -0.55, 41.5]),
    ([2.0, 0.1, 3.0], [44.0, -0.55, 43.0]),
    ([4.0, 0.1, 2.0], [45.0, -0.55, 43.5]),
    ([2.0, 0.1, 3.0], [46.0, -0.55, 45.0]),
    ([4.0, 0.1, 2.0], [47.0, -0.55, 45.5]),
    ([2.0, 0.1, 3.0], [48.0, -0.55, 47.0]),
    ([4.0, 0.1, 2.0], [49.0, -0.55, 47.5]),
    ([2.0, 0.1, 3.0], [50.0, -0.55, 49.0]),
    ([4.0, 0.1, 2.0], [51.0, -0.55, 49.5]),
    ([2.0, 0.1, 3.0], [52.0, -0.55, 51.0]),
    ([4.0, 0.1, 2.0], [53.0, -0.55, 51.5]),
    ([2.0, 0.1, 3.0], [54.0, -0.55, 53.0]),
    ([4.0, 0.1, 2.0], [55.0, -0.55, 53.5]),
    ([2.0, 0.1, 3.0], [56.0, -0.55, 55.0]),
    ([4.0, 0.1, 2.0], [57.0, -0.55, 55.5]),
];

/// How the path and region were derived
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LevelKind {
    Terrain,
    Road,
}

/// Authored road level file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoadFile {
    pub segments: Vec<RoadSegment>,
}

/// Level geometry (immutable once built)
#[derive(Debug, Clone, PartialEq)]
pub struct Level {
    pub kind: LevelKind,
    pub path: Path,
    pub bounds: Bounds,
}

impl Level {
    pub fn new(kind: LevelKind, path: Path, bounds: Bounds) -> Self {
        Self { kind, path, bounds }
    }

    /// Path sampled from terrain, bounded by a box around it
    pub fn from_terrain(mesh: &TerrainMesh, min_angle_deg: f32) -> Result<Self, LevelError> {
        let points = path_from_terrain(mesh)?;
        let bounds = Bounds::around(&points, TERRAIN_MARGIN);
        let path = Path::new(points, min_angle_deg)?;
        Ok(Self::new(LevelKind::Terrain, path, bounds))
    }

    /// Path through the centres of authored platforms, bounded by them
    pub fn from_road(segments: &[RoadSegment], min_angle_deg: f32) -> Result<Self, LevelError> {
        let points = path_from_road(segments)?;
        let path = Path::new(points, min_angle_deg)?;
        Ok(Self::new(LevelKind::Road, path, Bounds::road(segments)))
    }

    /// Parse a `RoadFile` from JSON
    pub fn from_json(json: &str, min_angle_deg: f32) -> Result<Self, LevelError> {
        let file: RoadFile = serde_json::from_str(json)?;
        Self::from_road(&file.segments, min_angle_deg)
    }

    /// Straight default path with a generous box
    pub fn fallback() -> Self {
        let path = Path::straight(FALLBACK_LENGTH);
        let bounds = Bounds::around(path.points(), TERRAIN_MARGIN);
        Self::new(LevelKind::Terrain, path, bounds)
    }

    /// Terrain level, or the straight fallback if the mesh is unusable
    pub fn terrain_or_fallback(mesh: &TerrainMesh, min_angle_deg: f32) -> Self {
        Self::from_terrain(mesh, min_angle_deg).unwrap_or_else(|err| {
            log::warn!("Terrain unusable ({err}), falling back to a straight path");
            Self::fallback()
        })
    }

    /// The built-in zig-zag road
    pub fn default_road(min_angle_deg: f32) -> Self {
        Self::from_road(&default_road_segments(), min_angle_deg).unwrap_or_else(|err| {
            log::warn!("Default road unusable ({err}), falling back to a straight path");
            Self::fallback()
        })
    }

    /// Terrain level over procedurally generated terrain
    pub fn demo_terrain(seed: u64, min_angle_deg: f32) -> Self {
        Self::terrain_or_fallback(&TerrainMesh::winding(seed, 48), min_angle_deg)
    }
}

/// Platforms of the built-in road
pub fn default_road_segments() -> Vec<RoadSegment> {
    DEFAULT_ROAD
        .iter()
        .map(|&(extent, position)| {
            RoadSegment::new(Vec3::from_array(position), Vec3::from_array(extent))
        })
        .collect()
}

/// Where collectibles and obstacles go on a fresh level
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Population {
    pub gems: Vec<Vec3>,
    /// Position and sound index
    pub crowns: Vec<(Vec3, u8)>,
    pub trees: Vec<Vec3>,
}

/// Lay out gems, crowns and roadside trees along `path`
pub fn populate(path: &Path, rng: &mut Pcg32) -> Population {
    let points = path.points();
    let last = path.last_index();
    let mut population = Population::default();

    for i in (GEM_SPACING..last).step_by(GEM_SPACING) {
        if rng.random_bool(GEM_CHANCE) {
            let jitter = rng.random_range(-GEM_JITTER..=GEM_JITTER);
            population.gems.push(points[i] + Vec3::X * jitter);
        }
    }

    let mut crown_indices = vec![points.len() / 3, points.len() * 2 / 3, last.saturating_sub(1)];
    crown_indices.retain(|&i| i > 0 && i < last);
    crown_indices.dedup();
    for (sound_index, i) in crown_indices.into_iter().enumerate() {
        population.crowns.push((points[i], sound_index as u8));
    }

    for i in (0..points.len()).step_by(TREE_SPACING) {
        population.trees.push(points[i] + Vec3::X * TREE_OFFSET);
        population.trees.push(points[i] - Vec3::X * TREE_OFFSET);
    }

    population
}

/// Pick a tree mesh
pub fn random_tree_model(rng: &mut Pcg32) -> &'static str {
    TREE_MODELS[rng.random_range(0..TREE_MODELS.len())]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_default_road_is_a_road_level() {
        let level = Level::default_road(10.0);
        assert_eq!(level.kind, LevelKind::Road);
        assert_eq!(level.path.len(), DEFAULT_ROAD.len());
        // Start and every waypoint are on the road
        for p in level.path.points() {
            assert!(level.bounds.contains(*p));
        }
        // The zig-zag needs a turn at nearly every platform
        assert!(level.path.turns().len() > 50);
    }

    #[test]
    fn test_default_road_segments_between_waypoints_stay_on_road() {
        let level = Level::default_road(10.0);
        for pair in level.path.points().windows(2) {
            for k in 0..=20 {
                let p = pair[0].lerp(pair[1], k as f32 / 20.0);
                assert!(level.bounds.contains(p), "off road at {p:?}");
            }
        }
    }

    #[test]
    fn test_from_json() {
        let json = r#"{"segments":[
            {"position":[0.0,0.0,0.0],"extent":[2.0,0.1,2.0]},
            {"position":[0.0,0.0,4.0],"extent":[2.0,0.1,6.0]},
            {"position":[4.0,0.0,4.0],"extent":[6.0,0.1,2.0]}
        ]}"#;
        let level = Level::from_json(json, 10.0).unwrap();
        assert_eq!(level.path.turns(), &[1]);
        assert!(matches!(level.bounds, Bounds::Road(ref r) if r.len() == 3));

        assert!(matches!(
            Level::from_json("{\"segments\": 3}", 10.0),
            Err(LevelError::Malformed(_))
        ));
        assert_eq!(
            Level::from_json("{\"segments\": []}", 10.0),
            Err(LevelError::InvalidLevelGeometry { points: 0 })
        );
    }

    #[test]
    fn test_terrain_fallback() {
        let level = Level::terrain_or_fallback(&TerrainMesh::default(), 10.0);
        assert_eq!(level, Level::fallback());
        assert_eq!(level.path.len(), 2);
    }

    #[test]
    fn test_demo_terrain_contains_its_path() {
        let level = Level::demo_terrain(3, 10.0);
        assert_eq!(level.kind, LevelKind::Terrain);
        assert_eq!(level.path.len(), 48);
        for p in level.path.points() {
            assert!(level.bounds.contains(*p));
        }
    }

    #[test]
    fn test_populate_is_deterministic() {
        let level = Level::default_road(10.0);
        let a = populate(&level.path, &mut Pcg32::seed_from_u64(42));
        let b = populate(&level.path, &mut Pcg32::seed_from_u64(42));
        assert_eq!(a, b);
        assert_eq!(a.crowns.len(), 3);
        assert_eq!(
            a.crowns.iter().map(|c| c.1).collect::<Vec<_>>(),
            vec![0, 1, 2]
        );
        // Two trees per 6 waypoints
        assert_eq!(a.trees.len(), 2 * DEFAULT_ROAD.len().div_ceil(TREE_SPACING));
        assert!(a.gems.len() <= DEFAULT_ROAD.len() / GEM_SPACING);
    }

    #[test]
    fn test_populate_short_path() {
        let path = Path::new(vec![Vec3::ZERO, Vec3::Z, Vec3::new(1.0, 0.0, 1.0)], 10.0).unwrap();
        let population = populate(&path, &mut Pcg32::seed_from_u64(1));
        assert!(population.gems.is_empty());
        assert_eq!(population.crowns, vec![(Vec3::Z, 0)]);
        assert_eq!(population.trees.len(), 2);
    }
}
