//! Collectibles, obstacles and the proximity scans over them
//!
//! Scans are linear and first-match-wins: the earliest entry within range is
//! taken, not the closest. Removal happens by index after the scan.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::scene::Handle;
use crate::consts::MAX_GROWTH;

/// Collectible types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CollectibleKind {
    Gem,
    /// Each crown chimes with its own sound
    Crown { sound_index: u8 },
}

impl CollectibleKind {
    fn same_category(&self, other: &CollectibleKind) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }
}

/// A gem or crown waiting to be picked up
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Collectible {
    pub pos: Vec3,
    pub kind: CollectibleKind,
    /// Scene object, if one was placed
    pub handle: Option<Handle>,
}

/// How an obstacle is shown
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Visual {
    Model(Handle),
    Placeholder(Handle),
}

impl Visual {
    pub fn handle(&self) -> Handle {
        match self {
            Visual::Model(h) | Visual::Placeholder(h) => *h,
        }
    }
}

/// A tree. Obstacles stay for the whole level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    /// Base of the trunk
    pub pos: Vec3,
    pub visual: Option<Visual>,
    /// Grows once per tick up to `MAX_GROWTH`
    pub growth: u8,
}

impl Obstacle {
    pub fn new(pos: Vec3) -> Self {
        Self {
            pos,
            visual: None,
            growth: 0,
        }
    }

    pub fn grow(&mut self) {
        if self.growth < MAX_GROWTH {
            self.growth += 1;
        }
    }

    /// Presentation scale of the model
    pub fn scale(&self) -> f32 {
        0.15 * self.growth as f32
    }
}

/// Index of the first collectible of `kind`'s category within `radius` of `at`
pub fn first_in_reach(
    collectibles: &[Collectible],
    kind: CollectibleKind,
    at: Vec3,
    radius: f32,
) -> Option<usize> {
    collectibles
        .iter()
        .position(|c| c.kind.same_category(&kind) && c.pos.distance(at) < radius)
}

/// Take the first collectible of each category within reach of `at`.
/// At most one gem and one crown are removed per call.
pub fn collect_at(collectibles: &mut Vec<Collectible>, at: Vec3, radius: f32) -> Vec<Collectible> {
    let mut taken = Vec::new();
    for category in [CollectibleKind::Gem, CollectibleKind::Crown { sound_index: 0 }] {
        if let Some(idx) = first_in_reach(collectibles, category, at, radius) {
            taken.push(collectibles.remove(idx));
        }
    }
    taken
}

/// Whether any obstacle is within `radius` of `at`
pub fn hits_obstacle(obstacles: &[Obstacle], at: Vec3, radius: f32) -> bool {
    obstacles.iter().any(|o| o.pos.distance(at) < radius)
}
