//! Fixed timestep simulation tick
//!
//! Core game loop that advances the run deterministically. One tick:
//! lifecycle input, player movement and attack, actor movement, contact
//! combat, the death pass, the spawn director, then due deferred actions.

use glam::Vec2;
use rand::Rng;

use super::boss;
use super::combat;
use super::spawn;
use super::state::{Entity, GameState, Phase, Strike};
use super::timers::TimedAction;
use crate::consts::*;
use crate::presentation::{Presentation, SoundCue};
use crate::{axis_sign, clamp_to_arena};

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Movement direction; each axis is reduced to its sign
    pub movement: Vec2,
    /// Attack trigger held
    pub attack: bool,
    /// Generic "activate" (advance title/story, restart after run-over)
    pub activate: bool,
    /// Idle/demo mode - AI steers the player
    pub idle_mode: bool,
}

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32, hooks: &mut dyn Presentation) {
    state.events.clear();

    match state.phase {
        Phase::Title => {
            if input.activate {
                state.set_phase(Phase::Story);
            }
            return;
        }
        Phase::Story | Phase::RunOver => {
            if input.activate {
                state.start_run(hooks);
            }
            return;
        }
        Phase::Active => {}
    }

    // Idle/demo mode - AI picks the movement and always attacks
    let mut input = input.clone();
    if input.idle_mode {
        input.movement = autopilot(state);
        input.attack = true;
    }
    let input = &input;

    state.time_ticks += 1;
    state.clock += dt as f64;

    update_player(state, input, dt);
    update_strikes(state, dt);
    update_actors(state, dt);

    combat::resolve_strikes(state, hooks);
    combat::resolve_enemy_contacts(state, hooks);
    combat::collect_items(state, hooks);
    combat::resolve_deaths(state, hooks);
    combat::check_player_death(state, hooks);

    // Strikes live out their lifetime after this tick's contacts
    state.strikes.retain(|s| !s.is_expired());

    if state.run_over_pending {
        let zoomed = (state.camera_scale + CAMERA_ZOOM_STEP).min(CAMERA_MAX_SCALE);
        if zoomed != state.camera_scale {
            state.camera_scale = zoomed;
            hooks.zoom_camera(zoomed);
        }
    }

    spawn::update_spawner(state, dt);
    fire_timers(state, hooks);
}

/// Move the player and emit a strike when the cadence allows
fn update_player(state: &mut GameState, input: &TickInput, dt: f32) {
    let Some(player) = state.player.as_mut() else {
        return;
    };
    if player.is_dead() {
        player.vel = Vec2::ZERO;
        return;
    }

    let dir = axis_sign(input.movement);
    if dir != Vec2::ZERO {
        player.aim = dir;
        player.face_angle = dir.y.atan2(dir.x);
    }
    player.pos = clamp_to_arena(player.pos + (dir * PLAYER_SPEED + player.vel) * dt);

    player.attack_cooldown = (player.attack_cooldown - dt).max(0.0);
    if player.attack_cooldown <= 0.0 && (input.attack || state.tuning.auto_attack) {
        state.strikes.push(Strike {
            pos: player.pos,
            vel: player.aim * player.strike_speed(),
            size: player.strike_size(),
            angle: player.face_angle,
            damage: player.strike_damage(),
            remaining: state.tuning.strike_lifetime,
            hits: Vec::new(),
            spent: false,
        });
        player.attack_cooldown = state.tuning.attack_cooldown(player.level);
    }
}

fn update_strikes(state: &mut GameState, dt: f32) {
    for strike in state.strikes.iter_mut() {
        strike.pos += strike.vel * dt;
        strike.remaining -= dt;
    }
}

/// Pursue the living player, integrate knockback, stay in the arena
fn update_actors(state: &mut GameState, dt: f32) {
    let target = state
        .player
        .as_ref()
        .filter(|p| !p.is_dead())
        .map(|p| p.pos);
    let rng = &mut state.rng;

    for (_, entity) in state.entities.iter_mut() {
        let Entity::Actor(actor) = entity else {
            continue;
        };
        if let Some(target) = target {
            let dir = axis_sign(target - actor.pos);
            let step = Vec2::new(
                rng.random_range(0..3) as f32,
                rng.random_range(0..3) as f32,
            );
            actor.pos += dir * step * ENEMY_STEP_SPEED * dt;
        }
        actor.pos = clamp_to_arena(actor.pos + actor.vel * dt);
    }
}

/// Fire every due deferred action.
///
/// Each action re-checks its target; anything that has gone away is skipped.
fn fire_timers(state: &mut GameState, hooks: &mut dyn Presentation) {
    for action in state.timers.pop_due(state.clock) {
        // Run-over tears the run down; later actions belong to it
        if state.phase != Phase::Active {
            break;
        }
        apply_timed_action(state, action, hooks);
    }
}

fn apply_timed_action(state: &mut GameState, action: TimedAction, hooks: &mut dyn Presentation) {
    match action {
        TimedAction::EndHitRecovery(handle) => {
            if let Some(Entity::Actor(actor)) = state.entities.get_mut(handle) {
                actor.vel = Vec2::ZERO;
                actor.taking_damage = false;
            }
        }
        TimedAction::EndContactKnockback(handle) => {
            if let Some(player) = state.player.as_mut() {
                player.vel = Vec2::ZERO;
            }
            if let Some(Entity::Actor(actor)) = state.entities.get_mut(handle) {
                actor.vel = Vec2::ZERO;
            }
        }
        TimedAction::EndInvulnerability => {
            if let Some(player) = state.player.as_mut() {
                player.invulnerable = false;
            }
        }
        TimedAction::CompleteBossRitual { pos, fountain } => {
            boss::complete_ritual(state, pos, fountain, hooks);
        }
        TimedAction::BossRoar => hooks.play_sound(SoundCue::BossRoar),
        TimedAction::EnterRunOver => {
            hooks.play_sound(SoundCue::BossRoar);
            let hud = state.hud();
            state.teardown(hooks);
            hooks.zoom_camera(state.camera_scale);
            state.set_phase(Phase::RunOver);
            log::info!(
                "Run over: {} kills, {} bosses, difficulty {:.1}x",
                hud.kill_count,
                hud.boss_kills,
                hud.difficulty
            );
        }
    }
}

/// Demo steering: heal up when hurt, otherwise hunt the nearest actor
fn autopilot(state: &GameState) -> Vec2 {
    let Some(player) = state.player.as_ref() else {
        return Vec2::ZERO;
    };

    let nearest = |want_actor: bool| {
        state
            .entities
            .iter()
            .filter(|(_, e)| e.as_actor().is_some() == want_actor)
            .map(|(_, e)| e.pos())
            .min_by(|a, b| {
                a.distance(player.pos)
                    .partial_cmp(&b.distance(player.pos))
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
    };

    match (nearest(true), nearest(false)) {
        (_, Some(item)) if player.health() < 60 => item - player.pos,
        // Strikes travel along the facing, so walk at the threat
        (Some(enemy), _) => enemy - player.pos,
        (None, Some(item)) => item - player.pos,
        (None, None) => Vec2::ZERO,
    }
}
