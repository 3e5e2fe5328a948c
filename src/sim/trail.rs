//! Trail of cubes left behind the cursor
//!
//! Every placement asks the scene for a cube and remembers its handle. The
//! trail holds at most `cap` cubes; the oldest one is removed from the scene
//! when a new one pushes past the cap. A cap of zero keeps no cubes at all;
//! placements still report their positions so pickups are scanned.

use std::collections::VecDeque;

use glam::Vec3;

use super::scene::{Handle, Piece, Scene};
use crate::consts::{CUBE_SIZE, MAX_FILL_STEPS};

/// A placed trail cube
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrailSegment {
    pub pos: Vec3,
    pub handle: Handle,
}

/// Bounded FIFO of trail cubes (oldest first)
#[derive(Debug, Clone)]
pub struct Trail {
    segments: VecDeque<TrailSegment>,
    cap: usize,
    fill_gaps: bool,
    last: Option<Vec3>,
}

impl Trail {
    pub fn new(cap: usize, fill_gaps: bool) -> Self {
        Self {
            segments: VecDeque::with_capacity(cap),
            cap,
            fill_gaps,
            last: None,
        }
    }

    /// Place a cube at `pos`, preceded by grid-aligned filler cubes when gap
    /// filling is on. Returns every position placed, in order.
    pub fn place(&mut self, pos: Vec3, scene: &mut dyn Scene) -> Vec<Vec3> {
        let mut placed = match self.last {
            Some(last) if self.fill_gaps => fill_positions(last, pos, CUBE_SIZE),
            _ => Vec::new(),
        };
        placed.push(pos);

        for &p in &placed {
            self.push(p, scene);
        }
        self.last = Some(pos);
        placed
    }

    fn push(&mut self, pos: Vec3, scene: &mut dyn Scene) {
        if self.cap == 0 {
            return;
        }
        let handle = scene.place(Piece::TrailCube, pos);
        self.segments.push_back(TrailSegment { pos, handle });
        while self.segments.len() > self.cap {
            if let Some(oldest) = self.segments.pop_front() {
                scene.remove(oldest.handle);
            }
        }
    }

    /// Remove every cube from the scene and forget the last position
    pub fn clear(&mut self, scene: &mut dyn Scene) {
        for segment in self.segments.drain(..) {
            scene.remove(segment.handle);
        }
        self.last = None;
    }

    /// Most recently placed cube
    pub fn latest(&self) -> Option<&TrailSegment> {
        self.segments.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TrailSegment> {
        self.segments.iter()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

/// Filler positions strictly between `from` and `to`, walking x first and
/// then z in steps of at most `step`, so consecutive cubes never sit
/// diagonally. Height follows `to`. Bounded by `MAX_FILL_STEPS`.
pub fn fill_positions(from: Vec3, to: Vec3, step: f32) -> Vec<Vec3> {
    let mut pos = Vec3::new(from.x, to.y, from.z);
    let mut out = Vec::new();

    for _ in 0..MAX_FILL_STEPS {
        if pos.x != to.x {
            pos.x = step_toward(pos.x, to.x, step);
        } else if pos.z != to.z {
            pos.z = step_toward(pos.z, to.z, step);
        } else {
            break;
        }
        if pos.x == to.x && pos.z == to.z {
            break;
        }
        out.push(pos);
    }
    out
}

#[inline]
fn step_toward(from: f32, to: f32, step: f32) -> f32 {
    if to > from {
        (from + step).min(to)
    } else {
        (from - step).max(to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::scene::HeadlessScene;

    #[test]
    fn test_cap_evicts_oldest() {
        let mut scene = HeadlessScene::new();
        let mut trail = Trail::new(3, false);
        for i in 0..5 {
            trail.place(Vec3::new(0.0, 0.0, i as f32), &mut scene);
        }
        assert_eq!(trail.len(), 3);
        assert_eq!(scene.count(Piece::TrailCube), 3);
        let zs: Vec<f32> = trail.iter().map(|s| s.pos.z).collect();
        assert_eq!(zs, vec![2.0, 3.0, 4.0]);
        assert_eq!(trail.latest().map(|s| s.pos.z), Some(4.0));
    }

    #[test]
    fn test_zero_cap_places_nothing() {
        let mut scene = HeadlessScene::new();
        let mut trail = Trail::new(0, true);
        trail.place(Vec3::ZERO, &mut scene);
        let placed = trail.place(Vec3::new(2.0, 0.0, 1.0), &mut scene);
        assert_eq!(placed.len(), 3);
        assert!(trail.is_empty());
        assert!(trail.latest().is_none());
        assert_eq!(scene.live_count(), 0);
    }

    #[test]
    fn test_fill_is_axis_aligned() {
        let fill = fill_positions(Vec3::ZERO, Vec3::new(2.5, 0.0, 1.5), 1.0);
        assert_eq!(
            fill,
            vec![
                Vec3::new(1.0, 0.0, 0.0),
                Vec3::new(2.0, 0.0, 0.0),
                Vec3::new(2.5, 0.0, 0.0),
                Vec3::new(2.5, 0.0, 1.0),
            ]
        );
        // Never a diagonal step between neighbours
        let mut prev = Vec3::ZERO;
        for p in fill.iter().chain(std::iter::once(&Vec3::new(2.5, 0.0, 1.5))) {
            assert!(p.x == prev.x || p.z == prev.z);
            prev = *p;
        }
    }

    #[test]
    fn test_fill_negative_direction_and_no_gap() {
        let fill = fill_positions(Vec3::new(3.0, 0.0, 3.0), Vec3::new(1.0, 0.0, 2.0), 1.0);
        assert_eq!(fill, vec![Vec3::new(2.0, 0.0, 3.0), Vec3::new(1.0, 0.0, 3.0)]);

        // Short single-axis moves need no filler
        assert!(fill_positions(Vec3::ZERO, Vec3::new(0.0, 0.0, 0.5), 1.0).is_empty());
        assert!(fill_positions(Vec3::ZERO, Vec3::ZERO, 1.0).is_empty());
    }

    #[test]
    fn test_fill_is_bounded() {
        let fill = fill_positions(Vec3::ZERO, Vec3::new(1e6, 0.0, 0.0), 1.0);
        assert_eq!(fill.len(), MAX_FILL_STEPS);
    }

    #[test]
    fn test_place_with_fill_returns_all_positions() {
        let mut scene = HeadlessScene::new();
        let mut trail = Trail::new(50, true);
        assert_eq!(trail.place(Vec3::ZERO, &mut scene), vec![Vec3::ZERO]);
        let placed = trail.place(Vec3::new(1.0, 0.0, 1.0), &mut scene);
        assert_eq!(placed, vec![Vec3::new(1.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 1.0)]);
        assert_eq!(trail.len(), 3);
    }

    #[test]
    fn test_clear_removes_from_scene() {
        let mut scene = HeadlessScene::new();
        let mut trail = Trail::new(10, true);
        trail.place(Vec3::ZERO, &mut scene);
        trail.place(Vec3::new(3.0, 0.0, 0.0), &mut scene);
        assert!(scene.live_count() > 0);
        trail.clear(&mut scene);
        assert!(trail.is_empty());
        assert_eq!(scene.live_count(), 0);
        // No filler after a clear
        assert_eq!(trail.place(Vec3::new(9.0, 0.0, 9.0), &mut scene).len(), 1);
    }
}
