//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (list order, first match wins)
//! - No rendering or platform dependencies; geometry goes through `Scene`

pub mod bounds;
pub mod level;
pub mod path;
pub mod pickups;
pub mod scene;
pub mod state;
pub mod tick;
pub mod trail;
pub mod turns;

pub use bounds::{Bounds, Rect};
pub use level::{Level, LevelKind, RoadFile, default_road_segments};
pub use path::{Path, RoadSegment, TerrainMesh, path_from_road, path_from_terrain};
pub use pickups::{Collectible, CollectibleKind, Obstacle, Visual, collect_at, hits_obstacle};
pub use scene::{Handle, HeadlessScene, Piece, Scene};
pub use state::{Cursor, GameEvent, GameState, RunState, Spawn, Tuning};
pub use tick::{TickInput, next_level, tick};
pub use trail::{Trail, TrailSegment, fill_positions};
pub use turns::find_turns;
