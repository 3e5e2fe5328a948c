//! Game state and core simulation types
//!
//! Everything a run needs lives in `GameState`, which is passed to `tick`.
//! There is no global state.

use glam::Vec3;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::level::{CROWN_MODEL, Level, populate, random_tree_model};
use super::path::Path;
use super::pickups::{Collectible, CollectibleKind, Obstacle, Visual};
use super::scene::{Piece, Scene};
use super::trail::Trail;
use crate::assets::AssetQueue;
use crate::consts::*;
use crate::error::FailReason;

/// Gameplay parameters for one session
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tuning {
    /// Base cursor speed (units/s) on level 1
    pub speed: f32,
    /// Bends sharper than this (degrees) need a turn
    pub turn_angle_deg: f32,
    pub trail_cap: usize,
    /// Distance between trail samples
    pub trail_step: f32,
    /// Fill diagonal gaps between trail cubes
    pub fill_trail_gaps: bool,
    pub pickup_radius: f32,
    pub collision_radius: f32,
    pub fall_threshold: f32,
    /// Seconds the player may wait at a turn (None = forever)
    pub turn_window: Option<f32>,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            speed: BASE_SPEED,
            turn_angle_deg: TURN_MIN_ANGLE_DEG,
            trail_cap: TRAIL_CAP,
            trail_step: TRAIL_STEP,
            fill_trail_gaps: true,
            pickup_radius: PICKUP_RADIUS,
            collision_radius: COLLISION_RADIUS,
            fall_threshold: FALL_THRESHOLD,
            turn_window: None,
        }
    }
}

/// Where the moving head of the line is
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Cursor {
    pub pos: Vec3,
    /// Unit direction of travel
    pub dir: Vec3,
    /// Most recently reached waypoint
    pub index: usize,
    /// Distance covered along the current segment
    pub travelled: f32,
    /// Distance covered since the last trail sample
    pub since_sample: f32,
    /// Seconds spent waiting at a turn
    pub waited: f32,
}

impl Cursor {
    pub fn at_start(path: &Path) -> Self {
        Self {
            pos: path.start(),
            dir: path.direction(0),
            index: 0,
            travelled: 0.0,
            since_sample: 0.0,
            waited: 0.0,
        }
    }
}

/// Run state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunState {
    /// Moving toward the next waypoint
    Advancing,
    /// Stopped on a turn waypoint until the player turns
    AwaitingTurn,
    /// Run over; only a reset leaves this state
    Failed(FailReason),
    /// Final waypoint reached; reset or next level
    Completed,
}

impl RunState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunState::Failed(_) | RunState::Completed)
    }
}

/// Notifications for scoring, audio and UI, drained by the caller
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GameEvent {
    LevelStarted { level: u32 },
    TurnRequired { index: usize },
    Turned { index: usize },
    GemCollected { score: u64 },
    CrownCollected { sound_index: u8, score: u64 },
    ObstacleSpawned { pos: Vec3 },
    RunFailed { reason: FailReason, score: u64 },
    RunCompleted { level: u32, score: u64 },
}

/// What to add to the level once a model has loaded
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Spawn {
    Tree(Vec3),
    Crown { pos: Vec3, sound_index: u8 },
}

impl Spawn {
    pub fn pos(&self) -> Vec3 {
        match self {
            Spawn::Tree(pos) | Spawn::Crown { pos, .. } => *pos,
        }
    }
}

/// Population RNG for a level; the same seed and level always give the same layout
fn level_rng(seed: u64, level_number: u32) -> Pcg32 {
    Pcg32::seed_from_u64(seed ^ (level_number as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15))
}

/// Complete session state
#[derive(Debug)]
pub struct GameState {
    /// Session seed for reproducible population
    pub seed: u64,
    /// 1-based
    pub level_number: u32,
    pub level: Level,
    pub tuning: Tuning,
    pub cursor: Cursor,
    pub run: RunState,
    pub paused: bool,
    pub score: u64,
    /// Score carried into the current level; a reset returns to it
    pub level_start_score: u64,
    /// Simulation tick counter (since the last reset)
    pub time_ticks: u64,
    pub trail: Trail,
    pub collectibles: Vec<Collectible>,
    pub obstacles: Vec<Obstacle>,
    /// Tree and crown models still loading
    pub assets: AssetQueue<Spawn>,
    pub rng: Pcg32,
    events: Vec<GameEvent>,
}

impl GameState {
    /// Create a session on level 1 and place its initial pieces
    pub fn new(level: Level, tuning: Tuning, seed: u64, scene: &mut dyn Scene) -> Self {
        let cursor = Cursor::at_start(&level.path);
        let mut state = Self {
            seed,
            level_number: 1,
            level,
            tuning,
            cursor,
            run: RunState::Advancing,
            paused: false,
            score: 0,
            level_start_score: 0,
            time_ticks: 0,
            trail: Trail::new(tuning.trail_cap, tuning.fill_trail_gaps),
            collectibles: Vec::new(),
            obstacles: Vec::new(),
            assets: AssetQueue::new(),
            rng: level_rng(seed, 1),
            events: Vec::new(),
        };
        state.reset(scene);
        state
    }

    /// Cursor speed on the current level
    pub fn speed(&self) -> f32 {
        self.tuning.speed + LEVEL_SPEED_BONUS * self.level_number.saturating_sub(1) as f32
    }

    /// Put the run back at the start of the current level.
    ///
    /// Clears every placed piece, drops outstanding loads and repopulates
    /// from the level seed, so resetting twice equals resetting once.
    pub fn reset(&mut self, scene: &mut dyn Scene) {
        self.trail.clear(scene);
        for collectible in self.collectibles.drain(..) {
            if let Some(handle) = collectible.handle {
                scene.remove(handle);
            }
        }
        for obstacle in self.obstacles.drain(..) {
            if let Some(visual) = obstacle.visual {
                scene.remove(visual.handle());
            }
        }
        for handle in self.assets.clear() {
            scene.remove(handle);
        }

        self.trail = Trail::new(self.tuning.trail_cap, self.tuning.fill_trail_gaps);
        self.rng = level_rng(self.seed, self.level_number);
        self.cursor = Cursor::at_start(&self.level.path);
        self.run = RunState::Advancing;
        self.paused = false;
        self.time_ticks = 0;
        self.score = self.level_start_score;

        let population = populate(&self.level.path, &mut self.rng);
        for pos in population.gems {
            let handle = scene.place(Piece::Gem, pos);
            self.collectibles.push(Collectible {
                pos,
                kind: CollectibleKind::Gem,
                handle: Some(handle),
            });
        }
        for (pos, sound_index) in population.crowns {
            self.assets
                .request(CROWN_MODEL, Spawn::Crown { pos, sound_index });
        }
        for pos in population.trees {
            let model = random_tree_model(&mut self.rng);
            self.assets.request(model, Spawn::Tree(pos));
        }

        self.trail.place(self.cursor.pos, scene);
        self.events.push(GameEvent::LevelStarted {
            level: self.level_number,
        });
        log::info!(
            "Level {} started: {} waypoints, {} turns, {} gems",
            self.level_number,
            self.level.path.len(),
            self.level.path.turns().len(),
            self.collectibles.len()
        );
    }

    /// Apply finished model loads. Failed loads get a placeholder box.
    pub fn splice_assets(&mut self, scene: &mut dyn Scene) {
        for resolved in self.assets.drain_resolved() {
            let pos = resolved.payload.pos();
            let visual = match resolved.result {
                Ok(handle) => Visual::Model(handle),
                Err(err) => {
                    log::warn!("{err}; using a placeholder");
                    Visual::Placeholder(scene.place(Piece::Placeholder, pos))
                }
            };
            match resolved.payload {
                Spawn::Tree(pos) => {
                    self.obstacles.push(Obstacle {
                        pos,
                        visual: Some(visual),
                        growth: 0,
                    });
                    self.events.push(GameEvent::ObstacleSpawned { pos });
                }
                Spawn::Crown { pos, sound_index } => {
                    self.collectibles.push(Collectible {
                        pos,
                        kind: CollectibleKind::Crown { sound_index },
                        handle: Some(visual.handle()),
                    });
                }
            }
        }
    }

    pub(crate) fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Take all notifications since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AssetLoadFailure;
    use crate::sim::scene::{Handle, HeadlessScene};

    fn corner_level() -> Level {
        Level::from_json(
            r#"{"segments":[
                {"position":[0.0,-0.5,0.0],"extent":[2.0,0.1,2.0]},
                {"position":[0.0,-0.5,5.0],"extent":[2.0,0.1,12.0]},
                {"position":[5.0,-0.5,5.0],"extent":[12.0,0.1,2.0]}
            ]}"#,
            TURN_MIN_ANGLE_DEG,
        )
        .unwrap()
    }

    #[test]
    fn test_new_state_places_start_cube() {
        let mut scene = HeadlessScene::new();
        let state = GameState::new(corner_level(), Tuning::default(), 7, &mut scene);
        assert_eq!(state.run, RunState::Advancing);
        assert_eq!(state.cursor.pos, Vec3::ZERO);
        assert_eq!(state.cursor.dir, Vec3::Z);
        assert_eq!(state.trail.len(), 1);
        assert_eq!(scene.count(Piece::TrailCube), 1);
        // One crown and two roadside trees waiting on models
        assert_eq!(state.assets.pending(), 3);
    }

    #[test]
    fn test_reset_twice_equals_once() {
        let mut scene = HeadlessScene::new();
        let mut state = GameState::new(Level::default_road(10.0), Tuning::default(), 11, &mut scene);
        state.reset(&mut scene);
        let cursor = state.cursor;
        let gems: Vec<Vec3> = state.collectibles.iter().map(|c| c.pos).collect();
        let live = scene.live_count();

        state.reset(&mut scene);
        assert_eq!(state.cursor, cursor);
        assert_eq!(state.collectibles.iter().map(|c| c.pos).collect::<Vec<_>>(), gems);
        assert_eq!(scene.live_count(), live);
        assert_eq!(state.run, RunState::Advancing);
    }

    #[test]
    fn test_splice_assets() {
        let mut scene = HeadlessScene::new();
        let mut state = GameState::new(corner_level(), Tuning::default(), 7, &mut scene);
        state.drain_events();

        let mut first = true;
        state.assets.resolve_all_with(|job| {
            if std::mem::take(&mut first) {
                Ok(Handle(900))
            } else {
                Err(AssetLoadFailure {
                    model: job.model.clone(),
                    reason: "not found".to_string(),
                })
            }
        });
        state.splice_assets(&mut scene);

        assert!(state.assets.is_empty());
        // Crown was requested first and got the model
        assert_eq!(state.collectibles.len(), 1);
        assert_eq!(state.collectibles[0].handle, Some(Handle(900)));
        // Both trees failed and got placeholders
        assert_eq!(state.obstacles.len(), 2);
        assert!(
            state
                .obstacles
                .iter()
                .all(|o| matches!(o.visual, Some(Visual::Placeholder(_))))
        );
        assert_eq!(scene.count(Piece::Placeholder), 2);
        let spawned = state
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, GameEvent::ObstacleSpawned { .. }))
            .count();
        assert_eq!(spawned, 2);
    }

    #[test]
    fn test_reset_drops_stale_loads() {
        let mut scene = HeadlessScene::new();
        let mut state = GameState::new(corner_level(), Tuning::default(), 7, &mut scene);
        let jobs = state.assets.take_unstarted();
        state.reset(&mut scene);
        assert!(!state.assets.resolve(jobs[0].ticket, Ok(Handle(1))));
    }

    #[test]
    fn test_reset_removes_loaded_but_unspliced_models() {
        let mut scene = HeadlessScene::new();
        let mut state = GameState::new(corner_level(), Tuning::default(), 7, &mut scene);
        let jobs = state.assets.take_unstarted();
        let handle = scene.place(Piece::Placeholder, jobs[0].payload.pos());
        assert!(state.assets.resolve(jobs[0].ticket, Ok(handle)));
        let live = scene.live_count();

        // Reset before the load was spliced in
        state.reset(&mut scene);
        assert!(!scene.contains(handle));
        assert_eq!(scene.live_count(), live - 1);
    }

    #[test]
    fn test_speed_per_level() {
        let mut scene = HeadlessScene::new();
        let mut state = GameState::new(corner_level(), Tuning::default(), 7, &mut scene);
        assert_eq!(state.speed(), BASE_SPEED);
        state.level_number = 3;
        assert!((state.speed() - (BASE_SPEED + 2.0 * LEVEL_SPEED_BONUS)).abs() < 1e-6);
    }
}
