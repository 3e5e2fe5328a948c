//! Traversable regions
//!
//! Terrain levels are bounded by a box around the path. Road levels are the
//! union of their platform footprints: step off every platform and the run
//! is over.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use super::path::RoadSegment;
use crate::horizontal;

/// Axis-aligned rectangle on the ground plane (x, z), inclusive
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self {
            min: min.min(max),
            max: min.max(max),
        }
    }

    /// Footprint of a road platform
    pub fn footprint(segment: &RoadSegment) -> Self {
        let centre = horizontal(segment.position);
        let half = Vec2::new(segment.extent.x, segment.extent.z) * 0.5;
        Self::new(centre - half, centre + half)
    }

    #[inline]
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    pub fn grow(&self, margin: f32) -> Self {
        Self::new(self.min - Vec2::splat(margin), self.max + Vec2::splat(margin))
    }
}

/// Where the cursor may be
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Bounds {
    /// Inside a single box
    Box(Rect),
    /// On at least one platform
    Road(Vec<Rect>),
}

impl Bounds {
    /// Box around `points` grown by `margin`
    pub fn around(points: &[Vec3], margin: f32) -> Self {
        let mut min = Vec2::splat(f32::INFINITY);
        let mut max = Vec2::splat(f32::NEG_INFINITY);
        for p in points {
            let h = horizontal(*p);
            min = min.min(h);
            max = max.max(h);
        }
        if points.is_empty() {
            min = Vec2::ZERO;
            max = Vec2::ZERO;
        }
        Bounds::Box(Rect::new(min, max).grow(margin))
    }

    pub fn road(segments: &[RoadSegment]) -> Self {
        Bounds::Road(segments.iter().map(Rect::footprint).collect())
    }

    /// Horizontal containment test (height is ignored)
    pub fn contains(&self, pos: Vec3) -> bool {
        let p = horizontal(pos);
        match self {
            Bounds::Box(rect) => rect.contains(p),
            Bounds::Road(rects) => rects.iter().any(|r| r.contains(p)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_footprint_matches_authored_road_test() {
        // { scale: [4, 0.1, 2], position: [2, -0.55, 0] } covers x 0..4, z -1..1
        let seg = RoadSegment::new(Vec3::new(2.0, -0.55, 0.0), Vec3::new(4.0, 0.1, 2.0));
        let rect = Rect::footprint(&seg);
        assert_eq!(rect.min, Vec2::new(0.0, -1.0));
        assert_eq!(rect.max, Vec2::new(4.0, 1.0));
        // Edges are on the road
        assert!(rect.contains(Vec2::new(4.0, 1.0)));
        assert!(!rect.contains(Vec2::new(4.01, 0.0)));
    }

    #[test]
    fn test_road_union() {
        let bounds = Bounds::road(&[
            RoadSegment::new(Vec3::new(2.0, 0.0, 0.0), Vec3::new(4.0, 0.1, 2.0)),
            RoadSegment::new(Vec3::new(3.0, 0.0, 1.5), Vec3::new(2.0, 0.1, 3.0)),
        ]);
        assert!(bounds.contains(Vec3::new(1.0, 0.0, 0.0)));
        assert!(bounds.contains(Vec3::new(3.5, 0.0, 2.8)));
        // Height does not matter
        assert!(bounds.contains(Vec3::new(3.5, 100.0, 2.8)));
        assert!(!bounds.contains(Vec3::new(0.5, 0.0, 2.0)));
    }

    #[test]
    fn test_box_around_points() {
        let bounds = Bounds::around(&[Vec3::new(0.0, 0.0, 0.0), Vec3::new(4.0, 3.0, 10.0)], 2.0);
        assert_eq!(
            bounds,
            Bounds::Box(Rect::new(Vec2::new(-2.0, -2.0), Vec2::new(6.0, 12.0)))
        );
        assert!(bounds.contains(Vec3::new(-1.9, -50.0, 11.9)));
        assert!(!bounds.contains(Vec3::new(-2.1, 0.0, 0.0)));
    }
}
