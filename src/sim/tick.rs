//! Fixed timestep simulation tick
//!
//! Advances the run state machine deterministically. Per tick:
//! 1. finished model loads are spliced in
//! 2. pause and reset inputs are handled
//! 3. turn and steer inputs are applied
//! 4. the cursor advances, placing trail cubes and scanning pickups
//! 5. the cursor is checked against the level geometry

use glam::Vec3;
use rand::Rng;

use super::level::random_tree_model;
use super::pickups::{CollectibleKind, collect_at, hits_obstacle};
use super::scene::Scene;
use super::state::{GameEvent, GameState, RunState, Spawn};
use crate::consts::*;
use crate::error::FailReason;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Copy, Default)]
pub struct TickInput {
    /// Turn at the current waypoint (space/enter)
    pub turn: bool,
    /// Any steer key; only legal while not at a turn
    pub steer: bool,
    /// Restart the level after the run has ended
    pub reset: bool,
    /// Pause toggle
    pub pause: bool,
}

/// Advance the game state by one timestep
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32, scene: &mut dyn Scene) {
    state.splice_assets(scene);

    // Handle pause toggle
    if input.pause && !state.run.is_terminal() {
        state.paused = !state.paused;
        log::debug!("Paused: {}", state.paused);
    }
    if state.paused {
        return;
    }

    if state.run.is_terminal() {
        if input.reset {
            state.reset(scene);
        }
        return;
    }

    state.time_ticks += 1;
    for obstacle in &mut state.obstacles {
        obstacle.grow();
    }

    if input.turn {
        if state.run == RunState::AwaitingTurn {
            take_turn(state);
        } else {
            fail(state, FailReason::Misstep);
            return;
        }
    } else if input.steer && state.run == RunState::AwaitingTurn {
        fail(state, FailReason::Misstep);
        return;
    }

    match state.run {
        RunState::Advancing => advance(state, dt, scene),
        RunState::AwaitingTurn => wait_for_turn(state, dt),
        RunState::Failed(_) | RunState::Completed => {}
    }

    if !state.run.is_terminal() {
        check_geometry(state);
    }
}

/// Move on to the next level after a completed run. Returns false (and does
/// nothing) in any other state.
pub fn next_level(state: &mut GameState, scene: &mut dyn Scene) -> bool {
    if state.run != RunState::Completed {
        log::warn!("Next level requested while {:?}", state.run);
        return false;
    }
    state.level_number += 1;
    state.level_start_score = state.score;
    state.reset(scene);
    true
}

fn take_turn(state: &mut GameState) {
    let index = state.cursor.index;
    state.cursor.dir = state.level.path.direction(index);
    state.cursor.waited = 0.0;
    state.run = RunState::Advancing;
    state.push_event(GameEvent::Turned { index });
    log::debug!("Turned at waypoint {index}");
}

fn wait_for_turn(state: &mut GameState, dt: f32) {
    let Some(window) = state.tuning.turn_window else {
        return;
    };
    state.cursor.waited += dt.max(0.0);
    if state.cursor.waited > window {
        fail(state, FailReason::Misstep);
    }
}

/// Move the cursor along its segment, never past the next waypoint
fn advance(state: &mut GameState, dt: f32, scene: &mut dyn Scene) {
    if dt <= 0.0 {
        return;
    }
    let index = state.cursor.index;
    if index >= state.level.path.last_index() {
        complete(state);
        return;
    }

    let segment_length = state.level.path.segment_length(index);
    let remaining = (segment_length - state.cursor.travelled).max(0.0);
    let step = (state.speed() * dt).min(remaining);
    state.cursor.travelled += step;
    state.cursor.since_sample += step;

    if segment_length - state.cursor.travelled <= SNAP_EPSILON {
        // Leftover distance this tick is dropped
        arrive(state, index + 1, scene);
        return;
    }

    let start = state.level.path.points()[index];
    state.cursor.pos = start + state.cursor.dir * state.cursor.travelled;
    if state.cursor.since_sample >= state.tuning.trail_step {
        state.cursor.since_sample = 0.0;
        let pos = state.cursor.pos;
        place_trail(state, pos, scene);
    }
}

/// Snap onto waypoint `index` and decide what happens there
fn arrive(state: &mut GameState, index: usize, scene: &mut dyn Scene) {
    let pos = state.level.path.points()[index];
    state.cursor.pos = pos;
    state.cursor.index = index;
    state.cursor.travelled = 0.0;
    state.cursor.since_sample = 0.0;

    place_trail(state, pos, scene);
    if state.run.is_terminal() {
        return;
    }

    if index == state.level.path.last_index() {
        complete(state);
    } else if state.level.path.is_turn(index) {
        state.run = RunState::AwaitingTurn;
        state.cursor.waited = 0.0;
        state.push_event(GameEvent::TurnRequired { index });
        log::debug!("Waiting for a turn at waypoint {index}");
    } else {
        state.cursor.dir = state.level.path.direction(index);
    }
}

/// Place trail cubes ending at `pos`, then scan pickups and obstacles at
/// each of them
fn place_trail(state: &mut GameState, pos: Vec3, scene: &mut dyn Scene) {
    let placed = state.trail.place(pos, scene);
    for at in placed {
        for taken in collect_at(&mut state.collectibles, at, state.tuning.pickup_radius) {
            if let Some(handle) = taken.handle {
                scene.remove(handle);
            }
            match taken.kind {
                CollectibleKind::Gem => {
                    state.score += GEM_SCORE;
                    state.push_event(GameEvent::GemCollected { score: state.score });
                    spawn_tree_beside(state, taken.pos);
                }
                CollectibleKind::Crown { sound_index } => {
                    state.score += CROWN_SCORE;
                    state.push_event(GameEvent::CrownCollected {
                        sound_index,
                        score: state.score,
                    });
                }
            }
        }

        if hits_obstacle(&state.obstacles, at, state.tuning.collision_radius) {
            fail(state, FailReason::Collision);
            return;
        }
    }
}

/// A collected gem leaves a tree behind, two to three units to either side
fn spawn_tree_beside(state: &mut GameState, gem: Vec3) {
    let side = if state.rng.random_bool(0.5) { 1.0 } else { -1.0 };
    let offset = state.rng.random_range(2.0..=3.0f32) * side;
    let model = random_tree_model(&mut state.rng);
    state
        .assets
        .request(model, Spawn::Tree(gem + Vec3::X * offset));
}

fn check_geometry(state: &mut GameState) {
    let pos = state.cursor.pos;
    let radius = state.tuning.collision_radius;

    if pos.y < state.tuning.fall_threshold {
        fail(state, FailReason::Fall);
    } else if !state.level.bounds.contains(pos) {
        fail(state, FailReason::OutOfBounds);
    } else if hits_obstacle(&state.obstacles, pos, radius)
        || state
            .trail
            .latest()
            .is_some_and(|segment| hits_obstacle(&state.obstacles, segment.pos, radius))
    {
        fail(state, FailReason::Collision);
    }
}

fn complete(state: &mut GameState) {
    state.run = RunState::Completed;
    state.score += LEVEL_SCORE;
    state.push_event(GameEvent::RunCompleted {
        level: state.level_number,
        score: state.score,
    });
    log::info!("Level {} complete, score {}", state.level_number, state.score);
}

fn fail(state: &mut GameState, reason: FailReason) {
    state.run = RunState::Failed(reason);
    state.push_event(GameEvent::RunFailed {
        reason,
        score: state.score,
    });
    log::info!("Run failed at {:?}: {}", state.cursor.pos, reason.as_str());
}
