//! Placement sink between the simulation and whatever draws it
//!
//! The simulation never touches a renderer. It asks a `Scene` to place a
//! piece at a position and keeps the returned `Handle` as an opaque token it
//! can later hand back for removal.

use std::collections::HashMap;

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Opaque token for a placed object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Handle(pub u32);

/// Kinds of geometry the simulation places
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Piece {
    /// One trail cube
    TrailCube,
    /// Octahedron gem
    Gem,
    /// Box stand-in for a model that failed to load
    Placeholder,
}

impl Piece {
    /// Stable numeric code for the JS host
    pub fn code(&self) -> u32 {
        match self {
            Piece::TrailCube => 0,
            Piece::Gem => 1,
            Piece::Placeholder => 2,
        }
    }
}

/// Something that can show and hide placed pieces
pub trait Scene {
    fn place(&mut self, piece: Piece, pos: Vec3) -> Handle;
    fn remove(&mut self, handle: Handle);
}

/// In-memory scene used by the native runner and tests
#[derive(Debug, Default)]
pub struct HeadlessScene {
    next: u32,
    live: HashMap<Handle, (Piece, Vec3)>,
}

impl HeadlessScene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of pieces currently placed
    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    /// Number of placed pieces of one kind
    pub fn count(&self, piece: Piece) -> usize {
        self.live.values().filter(|(p, _)| *p == piece).count()
    }

    pub fn contains(&self, handle: Handle) -> bool {
        self.live.contains_key(&handle)
    }

    /// Hand out a fresh handle without placing anything (stands in for a
    /// model the host loaded itself)
    pub fn issue(&mut self) -> Handle {
        self.next += 1;
        Handle(self.next)
    }
}

impl Scene for HeadlessScene {
    fn place(&mut self, piece: Piece, pos: Vec3) -> Handle {
        let handle = self.issue();
        self.live.insert(handle, (piece, pos));
        handle
    }

    fn remove(&mut self, handle: Handle) {
        self.live.remove(&handle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headless_scene_tracks_live_pieces() {
        let mut scene = HeadlessScene::new();
        let a = scene.place(Piece::TrailCube, Vec3::ZERO);
        let b = scene.place(Piece::Gem, Vec3::X);
        assert_ne!(a, b);
        assert_eq!(scene.live_count(), 2);
        assert_eq!(scene.count(Piece::Gem), 1);

        scene.remove(a);
        assert!(!scene.contains(a));
        assert!(scene.contains(b));
        assert_eq!(scene.live_count(), 1);
    }
}
