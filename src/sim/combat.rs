//! Contact-driven combat resolution
//!
//! Three contact passes run each tick (strike vs actor, actor vs player,
//! player vs item), followed by a separate death pass. Contact passes only
//! mutate health, velocity and flags; removal happens in the death pass so
//! each dead actor is visited exactly once.

use glam::Vec2;
use rand::Rng;

use super::boss;
use super::registry::Handle;
use super::state::{Entity, GameEvent, GameState, ItemKind, Phase, Tier};
use super::timers::TimedAction;
use crate::axis_sign;
use crate::consts::*;
use crate::presentation::{EffectKind, EffectParams, Presentation, SoundCue};
use crate::tuning::StrikePolicy;

/// Overlap test for two centred axis-aligned boxes
#[inline]
pub fn boxes_overlap(a_pos: Vec2, a_size: Vec2, b_pos: Vec2, b_size: Vec2) -> bool {
    let d = (a_pos - b_pos).abs();
    let reach = (a_size + b_size) * 0.5;
    d.x < reach.x && d.y < reach.y
}

/// Distance-threshold contact test
#[inline]
pub fn in_contact(a: Vec2, b: Vec2, radius: f32) -> bool {
    a.distance(b) < radius
}

/// Strikes against actors.
///
/// An actor already recovering from a hit is skipped, so overlapping strikes
/// cannot double-count in one tick.
pub(crate) fn resolve_strikes(state: &mut GameState, hooks: &mut dyn Presentation) {
    if state.strikes.is_empty() {
        return;
    }
    let targets = state.entities.handles();
    let policy = state.tuning.strike_policy;
    let recovery = state.tuning.enemy_hit_recovery;

    for strike in state.strikes.iter_mut() {
        for &handle in &targets {
            if strike.is_expired() {
                break;
            }
            if strike.hits.contains(&handle) {
                continue;
            }
            let Some(Entity::Actor(actor)) = state.entities.get_mut(handle) else {
                continue;
            };
            if actor.taking_damage {
                continue;
            }
            let size = Vec2::splat(actor.tier.size());
            if !boxes_overlap(strike.pos, strike.size, actor.pos, size) {
                continue;
            }

            // Knockback is set, not accumulated; the recovery timer zeroes it
            actor.vel = strike.vel * actor.tier.knockback_factor();
            actor.health -= strike.damage;
            actor.taking_damage = true;
            state
                .timers
                .schedule(state.clock, recovery, TimedAction::EndHitRecovery(handle));

            hooks.play_sound(SoundCue::AttackHit);
            hooks.emit_effect(
                EffectKind::HitSpark,
                strike.pos,
                EffectParams {
                    angle: strike.vel.y.atan2(strike.vel.x),
                    dark: true,
                },
            );
            log::trace!("Strike hit {:?} for {} ({} left)", handle, strike.damage, actor.health);
            state.events.push(GameEvent::StrikeHit {
                handle,
                damage: strike.damage,
            });

            strike.hits.push(handle);
            if policy == StrikePolicy::SingleHit {
                strike.spent = true;
            }
        }
    }
}

/// Actors touching the player
pub(crate) fn resolve_enemy_contacts(state: &mut GameState, hooks: &mut dyn Presentation) {
    let Some(player) = state.player.as_mut() else {
        return;
    };

    for handle in state.entities.handles() {
        if player.invulnerable || player.is_dead() {
            return;
        }
        let Some(Entity::Actor(actor)) = state.entities.get_mut(handle) else {
            continue;
        };
        // Killed earlier this tick; the death pass removes it
        if actor.is_dead() || !in_contact(player.pos, actor.pos, CONTACT_RADIUS) {
            continue;
        }

        player.take_damage(actor.damage);

        // Opposite shoves along the separation, per axis
        let dir = axis_sign(actor.pos - player.pos);
        player.vel = -dir * CONTACT_KNOCKBACK_SPEED;
        actor.vel = dir * CONTACT_KNOCKBACK_SPEED;
        state.timers.schedule(
            state.clock,
            state.tuning.contact_knockback_duration,
            TimedAction::EndContactKnockback(handle),
        );

        player.invulnerable = true;
        state.timers.schedule(
            state.clock,
            state.tuning.invulnerability_duration,
            TimedAction::EndInvulnerability,
        );

        hooks.emit_effect(EffectKind::DamageBurst, player.pos, EffectParams::default());
        hooks.play_sound(SoundCue::PlayerDamaged);
        log::debug!("Player hit by {:?} for {} ({} left)", handle, actor.damage, player.health());
        state.events.push(GameEvent::PlayerDamaged {
            damage: actor.damage,
            health: player.health(),
        });
    }
}

/// Items touched by a living player
pub(crate) fn collect_items(state: &mut GameState, hooks: &mut dyn Presentation) {
    let Some(player_pos) = state.player.as_ref().filter(|p| !p.is_dead()).map(|p| p.pos) else {
        return;
    };

    for handle in state.entities.handles() {
        let touching = state
            .entities
            .get(handle)
            .and_then(Entity::as_item)
            .is_some_and(|item| {
                boxes_overlap(
                    player_pos,
                    Vec2::splat(PLAYER_SIZE),
                    item.pos,
                    Vec2::splat(ITEM_SIZE),
                )
            });
        if !touching {
            continue;
        }
        let Some(Entity::Item(item)) = state.despawn(handle, hooks) else {
            continue;
        };
        let Some(player) = state.player.as_mut() else {
            return;
        };

        match item.kind {
            ItemKind::Healing => {
                player.heal(state.tuning.heal_amount);
                hooks.play_sound(SoundCue::Heal);
            }
            ItemKind::PowerUp => {
                player.level += 1;
                hooks.play_sound(SoundCue::PowerUp);
            }
        }
        hooks.emit_effect(EffectKind::PickupBurst, item.pos, EffectParams::default());
        log::debug!("Collected {:?} (health {}, level {})", item.kind, player.health(), player.level);
        state.events.push(GameEvent::ItemCollected { kind: item.kind });
    }
}

/// Remove dead actors and apply their death consequences.
///
/// Removal and side effects happen together, so a handle can only be
/// observed dead once.
pub(crate) fn resolve_deaths(state: &mut GameState, hooks: &mut dyn Presentation) {
    for handle in state.entities.handles() {
        let dead = state
            .entities
            .get(handle)
            .and_then(Entity::as_actor)
            .is_some_and(|a| a.is_dead());
        if !dead {
            continue;
        }
        let Some(Entity::Actor(actor)) = state.despawn(handle, hooks) else {
            continue;
        };
        on_actor_death(state, handle, actor.tier, actor.pos, hooks);
    }
}

fn on_actor_death(state: &mut GameState, handle: Handle, tier: Tier, pos: Vec2, hooks: &mut dyn Presentation) {
    hooks.play_sound(SoundCue::EnemyDie);
    hooks.emit_effect(EffectKind::DeathBurst, pos, EffectParams::default());
    state.events.push(GameEvent::EnemyKilled { handle, tier });

    match tier {
        Tier::Normal => {
            if state.rng.random_bool(state.tuning.item_drop_chance) {
                state.spawn_item(pos, Some(ItemKind::Healing), hooks);
            }
            if state.run.should_trigger_boss() {
                let kill_count = state.run.kill_count();
                log::info!("Kill {} summons a boss", kill_count);
                state.events.push(GameEvent::BossEligible { kill_count });
                boss::begin_ritual(state, pos, hooks);
            }
        }
        Tier::Boss => {
            state.spawn_item(pos, Some(ItemKind::PowerUp), hooks);
            state.run.record_boss_kill();
            log::info!("Boss defeated ({} total)", state.run.boss_kills());
            state.events.push(GameEvent::BossDefeated {
                boss_kills: state.run.boss_kills(),
            });
        }
    }
}

/// Freeze a dead player and schedule the run-over transition (once)
pub(crate) fn check_player_death(state: &mut GameState, hooks: &mut dyn Presentation) {
    if state.run_over_pending || state.phase != Phase::Active {
        return;
    }
    let Some(player) = state.player.as_mut() else {
        return;
    };
    if !player.is_dead() {
        return;
    }

    player.vel = Vec2::ZERO;
    state.run_over_pending = true;
    hooks.play_sound(SoundCue::MusicStop);
    log::info!(
        "Player died (kills {}, bosses {})",
        state.run.kill_count(),
        state.run.boss_kills()
    );
    state.events.push(GameEvent::PlayerDied);
    state.timers.schedule(
        state.clock,
        state.tuning.run_over_delay,
        TimedAction::EnterRunOver,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presentation::Recorder;
    use crate::sim::state::{Actor, Strike};
    use crate::tuning::Tuning;

    /// Active state with no opening enemies and nothing random in the way
    fn quiet_state() -> (GameState, Recorder) {
        let tuning = Tuning {
            initial_enemy_count: 0,
            item_drop_chance: 0.0,
            auto_attack: false,
            ..Default::default()
        };
        let mut hooks = Recorder::new();
        let mut state = GameState::with_tuning(77, tuning);
        state.start_run(&mut hooks);
        hooks.clear();
        (state, hooks)
    }

    fn strike_at(pos: Vec2, damage: i32) -> Strike {
        Strike {
            pos,
            vel: Vec2::new(13.2, 0.0),
            size: Vec2::splat(1.2),
            angle: 0.0,
            damage,
            remaining: 0.2,
            hits: Vec::new(),
            spent: false,
        }
    }

    fn actor(state: &GameState, h: Handle) -> &Actor {
        state.entities.get(h).and_then(Entity::as_actor).unwrap()
    }

    #[test]
    fn test_boxes_overlap() {
        assert!(boxes_overlap(Vec2::ZERO, Vec2::ONE, Vec2::new(0.9, 0.0), Vec2::ONE));
        assert!(!boxes_overlap(Vec2::ZERO, Vec2::ONE, Vec2::new(1.0, 0.0), Vec2::ONE));
        assert!(boxes_overlap(Vec2::ZERO, Vec2::ONE, Vec2::new(1.4, 1.4), Vec2::splat(2.0)));
    }

    #[test]
    fn test_strike_damages_and_knocks_back() {
        let (mut state, mut hooks) = quiet_state();
        let pos = Vec2::new(5.0, 5.0);
        let h = state.spawn_enemy(pos);
        state.strikes.push(strike_at(pos, 15));

        resolve_strikes(&mut state, &mut hooks);
        let a = actor(&state, h);
        assert_eq!(a.health, 5);
        assert!(a.taking_damage);
        assert!((a.vel.x - 13.2 * NORMAL_KNOCKBACK).abs() < 0.0001);
        assert_eq!(hooks.sound_count(SoundCue::AttackHit), 1);
        assert_eq!(hooks.effect_count(EffectKind::HitSpark), 1);
        assert!(state.timers.contains(|t| *t == TimedAction::EndHitRecovery(h)));
    }

    #[test]
    fn test_boss_resists_knockback() {
        let (mut state, mut hooks) = quiet_state();
        let pos = Vec2::new(5.0, 5.0);
        let h = state.spawn_boss(pos);
        state.strikes.push(strike_at(pos, 15));
        resolve_strikes(&mut state, &mut hooks);
        assert!((actor(&state, h).vel.x - 13.2 * BOSS_KNOCKBACK).abs() < 0.0001);
    }

    #[test]
    fn test_overlapping_strikes_hit_once() {
        let (mut state, mut hooks) = quiet_state();
        let pos = Vec2::new(5.0, 5.0);
        let h = state.spawn_enemy(pos);
        state.strikes.push(strike_at(pos, 15));
        state.strikes.push(strike_at(pos, 15));

        resolve_strikes(&mut state, &mut hooks);
        assert_eq!(actor(&state, h).health, 5);
        assert_eq!(hooks.sound_count(SoundCue::AttackHit), 1);
    }

    #[test]
    fn test_pierce_hits_distinct_targets() {
        let (mut state, mut hooks) = quiet_state();
        let a = state.spawn_enemy(Vec2::new(5.0, 5.0));
        let b = state.spawn_enemy(Vec2::new(5.5, 5.0));
        state.strikes.push(strike_at(Vec2::new(5.25, 5.0), 15));

        resolve_strikes(&mut state, &mut hooks);
        assert_eq!(actor(&state, a).health, 5);
        assert_eq!(actor(&state, b).health, 5);
        assert_eq!(state.strikes[0].hits, vec![a, b]);
    }

    #[test]
    fn test_single_hit_policy_stops_after_first() {
        let (mut state, mut hooks) = quiet_state();
        state.tuning.strike_policy = StrikePolicy::SingleHit;
        let a = state.spawn_enemy(Vec2::new(5.0, 5.0));
        let b = state.spawn_enemy(Vec2::new(5.5, 5.0));
        state.strikes.push(strike_at(Vec2::new(5.25, 5.0), 15));

        resolve_strikes(&mut state, &mut hooks);
        assert_eq!(actor(&state, a).health, 5);
        assert_eq!(actor(&state, b).health, 20);
        assert!(state.strikes[0].is_expired());
    }

    #[test]
    fn test_contact_damages_player_and_grants_grace() {
        let (mut state, mut hooks) = quiet_state();
        let player_pos = state.player.as_ref().unwrap().pos;
        state.player.as_mut().unwrap().set_health(10);
        let h = state.spawn_enemy(player_pos + Vec2::new(0.5, 0.0));

        resolve_enemy_contacts(&mut state, &mut hooks);
        let player = state.player.as_ref().unwrap();
        assert_eq!(player.health(), 0);
        assert!(player.invulnerable);
        assert_eq!(player.vel, Vec2::new(-CONTACT_KNOCKBACK_SPEED, 0.0));
        assert_eq!(actor(&state, h).vel, Vec2::new(CONTACT_KNOCKBACK_SPEED, 0.0));

        // Second contact inside the grace window does nothing
        resolve_enemy_contacts(&mut state, &mut hooks);
        assert_eq!(state.player.as_ref().unwrap().health(), 0);
        assert_eq!(hooks.sound_count(SoundCue::PlayerDamaged), 1);
    }

    #[test]
    fn test_dead_actor_does_not_touch_player() {
        let (mut state, mut hooks) = quiet_state();
        let player_pos = state.player.as_ref().unwrap().pos;
        let h = state.spawn_enemy(player_pos + Vec2::new(0.5, 0.0));
        if let Some(Entity::Actor(a)) = state.entities.get_mut(h) {
            a.health = -5;
        }

        resolve_enemy_contacts(&mut state, &mut hooks);
        let player = state.player.as_ref().unwrap();
        assert_eq!(player.health(), 100);
        assert!(!player.invulnerable);
        assert_eq!(player.vel, Vec2::ZERO);
        assert_eq!(actor(&state, h).vel, Vec2::ZERO);
        assert_eq!(hooks.sound_count(SoundCue::PlayerDamaged), 0);
        assert!(!state.timers.contains(|t| *t == TimedAction::EndInvulnerability));
    }

    #[test]
    fn test_two_enemies_same_tick_only_one_hurts() {
        let (mut state, mut hooks) = quiet_state();
        let player_pos = state.player.as_ref().unwrap().pos;
        state.spawn_enemy(player_pos + Vec2::new(0.3, 0.0));
        state.spawn_enemy(player_pos - Vec2::new(0.3, 0.0));

        resolve_enemy_contacts(&mut state, &mut hooks);
        assert_eq!(state.player.as_ref().unwrap().health(), 90);
    }

    #[test]
    fn test_far_enemy_does_not_touch() {
        let (mut state, mut hooks) = quiet_state();
        let player_pos = state.player.as_ref().unwrap().pos;
        state.spawn_enemy(player_pos + Vec2::new(1.5, 0.0));
        resolve_enemy_contacts(&mut state, &mut hooks);
        assert_eq!(state.player.as_ref().unwrap().health(), 100);
    }

    #[test]
    fn test_death_pass_runs_once_per_actor() {
        let (mut state, mut hooks) = quiet_state();
        let h = state.spawn_enemy(Vec2::new(5.0, 5.0));
        if let Some(Entity::Actor(a)) = state.entities.get_mut(h) {
            a.health = -30;
        }

        resolve_deaths(&mut state, &mut hooks);
        resolve_deaths(&mut state, &mut hooks);
        assert!(!state.is_alive(h));
        assert_eq!(state.run.kill_count(), 1);
        assert_eq!(hooks.sound_count(SoundCue::EnemyDie), 1);
        let kills = state
            .events
            .iter()
            .filter(|e| matches!(e, GameEvent::EnemyKilled { .. }))
            .count();
        assert_eq!(kills, 1);
    }

    #[test]
    fn test_normal_enemy_drop_chance() {
        let (mut state, mut hooks) = quiet_state();
        state.tuning.item_drop_chance = 1.0;
        let h = state.spawn_enemy(Vec2::new(5.0, 5.0));
        if let Some(Entity::Actor(a)) = state.entities.get_mut(h) {
            a.health = 0;
        }
        resolve_deaths(&mut state, &mut hooks);
        assert_eq!(state.item_count(), 1);
        let (_, item) = state.entities.iter().next().unwrap();
        assert_eq!(item.as_item().unwrap().kind, ItemKind::Healing);
    }

    #[test]
    fn test_boss_death_drops_power_up() {
        let (mut state, mut hooks) = quiet_state();
        let h = state.spawn_boss(Vec2::new(8.0, 8.0));
        if let Some(Entity::Actor(a)) = state.entities.get_mut(h) {
            a.health = 0;
        }
        resolve_deaths(&mut state, &mut hooks);
        assert_eq!(state.run.boss_kills(), 1);
        assert_eq!(state.run.kill_count(), 0);
        let kinds: Vec<_> = state
            .entities
            .iter()
            .filter_map(|(_, e)| e.as_item().map(|i| i.kind))
            .collect();
        assert_eq!(kinds, vec![ItemKind::PowerUp]);
    }

    #[test]
    fn test_collect_heals_clamped_and_releases_aura() {
        let (mut state, mut hooks) = quiet_state();
        let player_pos = state.player.as_ref().unwrap().pos;
        state.player.as_mut().unwrap().set_health(90);
        let h = state.spawn_item(player_pos, Some(ItemKind::Healing), &mut hooks);
        let aura = state.entities.get(h).and_then(Entity::as_item).unwrap().aura;

        collect_items(&mut state, &mut hooks);
        assert_eq!(state.player.as_ref().unwrap().health(), 100);
        assert!(!state.is_alive(h));
        assert_eq!(hooks.release_count(aura), 1);
        assert_eq!(hooks.sound_count(SoundCue::Heal), 1);
    }

    #[test]
    fn test_collect_power_up_raises_level() {
        let (mut state, mut hooks) = quiet_state();
        let player_pos = state.player.as_ref().unwrap().pos;
        state.spawn_item(player_pos + Vec2::new(0.5, 0.5), Some(ItemKind::PowerUp), &mut hooks);
        collect_items(&mut state, &mut hooks);
        assert_eq!(state.player.as_ref().unwrap().level, 2);
        assert_eq!(hooks.sound_count(SoundCue::PowerUp), 1);
    }

    #[test]
    fn test_player_death_schedules_run_over_once() {
        let (mut state, mut hooks) = quiet_state();
        state.player.as_mut().unwrap().take_damage(200);

        check_player_death(&mut state, &mut hooks);
        check_player_death(&mut state, &mut hooks);
        assert!(state.run_over_pending);
        assert_eq!(hooks.sound_count(SoundCue::MusicStop), 1);
        let pending = state.timers.clear();
        assert_eq!(
            pending.iter().filter(|a| **a == TimedAction::EnterRunOver).count(),
            1
        );
    }
}
