//! Path building
//!
//! A level's path is an ordered list of waypoints. It is either sampled from
//! a terrain mesh or read off a list of authored road platforms.

use std::collections::BTreeMap;

use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::turns::find_turns;
use crate::consts::{SNAP_EPSILON, WAYPOINT_LIFT};
use crate::error::LevelError;

/// Raw terrain vertices (already in world space)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TerrainMesh {
    pub vertices: Vec<Vec3>,
}

impl TerrainMesh {
    pub fn new(vertices: Vec<Vec3>) -> Self {
        Self { vertices }
    }

    /// Procedural stand-in for the terrain model: a strip three vertices wide
    /// whose centre line meanders left and right in straight runs.
    pub fn winding(seed: u64, rows: usize) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let mut vertices = Vec::with_capacity(rows * 3);
        let mut x = 0.0f32;
        let mut drift = 0.0f32;
        let mut run_left = 0usize;

        for row in 0..rows {
            if run_left == 0 {
                // Straight runs of 4-8 rows, drifting by at most one unit per row
                run_left = rng.random_range(4..=8);
                drift = match rng.random_range(0..3) {
                    0 => -1.0,
                    1 => 0.0,
                    _ => 1.0,
                };
                // Stay within the strip the default bounds expect
                if (x + drift * run_left as f32).abs() > 8.0 {
                    drift = -drift;
                }
            }
            if row > 0 {
                x += drift;
            }
            run_left -= 1;

            let z = row as f32 * 2.0;
            for dx in [-1.0, 0.0, 1.0] {
                vertices.push(Vec3::new(x + dx, 0.0, z));
            }
        }
        Self { vertices }
    }
}

/// One authored road platform: centre position and box extent
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoadSegment {
    pub position: Vec3,
    pub extent: Vec3,
}

impl RoadSegment {
    pub fn new(position: Vec3, extent: Vec3) -> Self {
        Self { position, extent }
    }
}

/// Sample a path from a terrain mesh.
///
/// Vertices are grouped by z (rounded to 0.1). Groups are visited in
/// ascending z; each contributes its median-by-x vertex, lifted above the
/// highest vertex of the group.
pub fn path_from_terrain(mesh: &TerrainMesh) -> Result<Vec<Vec3>, LevelError> {
    let mut groups: BTreeMap<i64, Vec<Vec3>> = BTreeMap::new();
    for v in &mesh.vertices {
        let key = (v.z * 10.0).round() as i64;
        groups.entry(key).or_default().push(*v);
    }

    let points: Vec<Vec3> = groups
        .into_values()
        .map(|mut group| {
            group.sort_by(|a, b| a.x.total_cmp(&b.x));
            let mid = group[group.len() / 2];
            let max_y = group.iter().map(|p| p.y).fold(f32::NEG_INFINITY, f32::max);
            Vec3::new(mid.x, max_y + WAYPOINT_LIFT, mid.z)
        })
        .collect();

    check_len(points)
}

/// Waypoints at the centre of each platform, lifted onto its surface
pub fn path_from_road(segments: &[RoadSegment]) -> Result<Vec<Vec3>, LevelError> {
    let points = segments
        .iter()
        .map(|s| s.position + Vec3::Y * WAYPOINT_LIFT)
        .collect();
    check_len(points)
}

fn check_len(points: Vec<Vec3>) -> Result<Vec<Vec3>, LevelError> {
    if points.len() < 2 {
        return Err(LevelError::InvalidLevelGeometry {
            points: points.len(),
        });
    }
    Ok(points)
}

/// Waypoints plus the turn indices derived from them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Path {
    points: Vec<Vec3>,
    turns: Vec<usize>,
}

impl Path {
    /// Build a path, detecting turns sharper than `min_angle_deg`.
    ///
    /// Repeated waypoints are merged first, so every segment has a length
    /// and a corner next to a duplicate is still seen as a corner.
    pub fn new(mut points: Vec<Vec3>, min_angle_deg: f32) -> Result<Self, LevelError> {
        points.dedup_by(|next, prev| next.distance(*prev) <= SNAP_EPSILON);
        let points = check_len(points)?;
        let turns = find_turns(&points, min_angle_deg);
        Ok(Self { points, turns })
    }

    /// Straight run along +z, used when level geometry is unusable
    pub fn straight(length: f32) -> Self {
        Self {
            points: vec![Vec3::ZERO, Vec3::new(0.0, 0.0, length.max(1.0))],
            turns: Vec::new(),
        }
    }

    pub fn points(&self) -> &[Vec3] {
        &self.points
    }

    pub fn turns(&self) -> &[usize] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Never true: a path always has a start and an end
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn start(&self) -> Vec3 {
        self.points[0]
    }

    pub fn last_index(&self) -> usize {
        self.points.len() - 1
    }

    pub fn is_turn(&self, index: usize) -> bool {
        self.turns.binary_search(&index).is_ok()
    }

    /// Unit direction from waypoint `index` to the next one (zero at the end
    /// or across a zero-length segment)
    pub fn direction(&self, index: usize) -> Vec3 {
        match (self.points.get(index), self.points.get(index + 1)) {
            (Some(a), Some(b)) => (*b - *a).normalize_or_zero(),
            _ => Vec3::ZERO,
        }
    }

    /// Length of the segment starting at waypoint `index`
    pub fn segment_length(&self, index: usize) -> f32 {
        match (self.points.get(index), self.points.get(index + 1)) {
            (Some(a), Some(b)) => a.distance(*b),
            _ => 0.0,
        }
    }
}
