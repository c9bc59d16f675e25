//! Spawn director
//!
//! Feeds small enemies into the arena on a timer. Opening enemies are placed
//! near the player; later ones come in from the side and bottom edges.

use glam::Vec2;
use rand::Rng;

use super::state::GameState;
use crate::consts::{ARENA_HEIGHT, ARENA_WIDTH};

/// How far outside the arena edge spawns start
const EDGE_OFFSET: f32 = 4.0;

/// Pick an edge spawn point: half the time a side edge at a random height,
/// otherwise the bottom edge at a random column
pub fn edge_spawn_position(rng: &mut impl Rng) -> Vec2 {
    if rng.random_bool(0.5) {
        let y = rng.random_range(-2..ARENA_HEIGHT as i32 + 2) as f32;
        let x = if rng.random_bool(0.5) {
            -EDGE_OFFSET
        } else {
            ARENA_WIDTH + EDGE_OFFSET
        };
        Vec2::new(x, y)
    } else {
        let x = rng.random_range(0..ARENA_WIDTH as i32) as f32;
        Vec2::new(x, -EDGE_OFFSET)
    }
}

/// Opening spawn point: a random offset in each axis with random sign
pub fn initial_spawn_position(rng: &mut impl Rng, player: Vec2, min: i32, max: i32) -> Vec2 {
    let offset = rng.random_range(min..=max) as f32;
    let sx = if rng.random_bool(0.5) { 1.0 } else { -1.0 };
    let sy = if rng.random_bool(0.5) { 1.0 } else { -1.0 };
    player + Vec2::new(sx * offset, sy * offset)
}

/// Place the opening enemies around the player
pub(crate) fn spawn_initial_enemies(state: &mut GameState) {
    let Some(center) = state.player.as_ref().map(|p| p.pos) else {
        return;
    };
    let (min, max) = (state.tuning.initial_offset_min, state.tuning.initial_offset_max);
    for _ in 0..state.tuning.initial_enemy_count {
        let pos = initial_spawn_position(&mut state.rng, center, min, max);
        state.spawn_enemy(pos);
    }
}

/// Advance the spawn timer; spawn one edge enemy when it runs out
pub(crate) fn update_spawner(state: &mut GameState, dt: f32) {
    state.spawn_timer -= dt;
    if state.spawn_timer > 0.0 {
        return;
    }

    let pos = edge_spawn_position(&mut state.rng);
    state.spawn_enemy(pos);

    state.spawn_interval = state.run.spawn_interval(&state.tuning);
    state.spawn_timer = state.spawn_interval;
}
