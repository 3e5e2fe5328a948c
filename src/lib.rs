//! Dancing Line - a 3D path-following arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (path, turns, trail, pickups, run state)
//! - `assets`: Pending asynchronous model loads, spliced in between ticks
//! - `settings`: Persisted player preferences and gameplay tuning
//! - `error`: Level construction and asset errors
//! - `audio`: Event sounds, played procedurally on the web

pub mod assets;
pub mod audio;
pub mod error;
pub mod settings;
pub mod sim;

pub use error::{AssetLoadFailure, FailReason, LevelError};
pub use settings::{QualityPreset, Settings};

use glam::{Vec2, Vec3};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Cursor speed in world units per second
    pub const BASE_SPEED: f32 = 2.0;
    /// Speed added per completed level (0.01 per frame at 60 FPS)
    pub const LEVEL_SPEED_BONUS: f32 = 0.6;

    /// Minimum bend (degrees) that requires a player turn
    pub const TURN_MIN_ANGLE_DEG: f32 = 10.0;
    /// Distance under which the cursor snaps onto the next waypoint
    pub const SNAP_EPSILON: f32 = 1e-4;

    /// Height of a waypoint above the surface it was sampled from
    pub const WAYPOINT_LIFT: f32 = 0.5;
    /// Cursor dies below this height
    pub const FALL_THRESHOLD: f32 = -5.0;

    /// Trail cube edge length
    pub const CUBE_SIZE: f32 = 1.0;
    /// Distance travelled between trail samples
    pub const TRAIL_STEP: f32 = 0.5;
    /// Default maximum number of trail cubes
    pub const TRAIL_CAP: usize = 200;
    /// Safety cap on gap-filling iterations per placement
    pub const MAX_FILL_STEPS: usize = 100;

    /// Pickup distance for gems and crowns
    pub const PICKUP_RADIUS: f32 = 0.8;
    /// Obstacle proximity that ends the run (half a cube plus slack)
    pub const COLLISION_RADIUS: f32 = CUBE_SIZE * 0.5 + 0.05;

    /// Score values
    pub const GEM_SCORE: u64 = 10;
    pub const CROWN_SCORE: u64 = 50;
    pub const LEVEL_SCORE: u64 = 100;

    /// Obstacle growth steps (presentation scale = 0.15 * growth)
    pub const MAX_GROWTH: u8 = 10;
}

/// Project a world position onto the ground plane (x, z)
#[inline]
pub fn horizontal(pos: Vec3) -> Vec2 {
    Vec2::new(pos.x, pos.z)
}

/// Angle between two directions in degrees, 0 if either is degenerate
#[inline]
pub fn angle_between_deg(a: Vec3, b: Vec3) -> f32 {
    let a = a.normalize_or_zero();
    let b = b.normalize_or_zero();
    if a == Vec3::ZERO || b == Vec3::ZERO {
        return 0.0;
    }
    // Drift can push the dot product just outside acos' domain
    a.dot(b).clamp(-1.0, 1.0).acos().to_degrees()
}
