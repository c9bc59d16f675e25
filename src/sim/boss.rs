//! Boss ritual sequencing
//!
//! A qualifying kill starts a ritual: summon cue and a dark fountain at the
//! kill site, then after a delay the boss appears there, the fountain is
//! released and difficulty goes up one step.
//!
//! Rituals are not mutually excluded here. The kill cadence returns `true`
//! once per qualifying kill, so a second ritual can only start after another
//! full cadence of kills; if that somehow happens inside the delay, each
//! ritual still completes independently with its own fountain and boss.

use glam::Vec2;

use super::state::{GameEvent, GameState};
use super::timers::TimedAction;
use crate::presentation::{EffectId, EffectKind, Presentation, SoundCue};

/// Start a ritual at `pos`
pub(crate) fn begin_ritual(state: &mut GameState, pos: Vec2, hooks: &mut dyn Presentation) {
    hooks.play_sound(SoundCue::BossSummon);
    let fountain = state.effects.attach(EffectKind::SummonFountain, pos, hooks);
    state.timers.schedule(
        state.clock,
        state.tuning.boss_ritual_delay,
        TimedAction::CompleteBossRitual { pos, fountain },
    );
    log::debug!("Boss ritual started at {:?}", pos);
}

/// Finish a ritual: recentre, spawn the boss, release the fountain, escalate
pub(crate) fn complete_ritual(
    state: &mut GameState,
    pos: Vec2,
    fountain: EffectId,
    hooks: &mut dyn Presentation,
) {
    if let Some(player) = &state.player {
        hooks.recenter_camera(player.pos);
    }
    let handle = state.spawn_boss(pos);
    state.effects.release(fountain, hooks);
    let tuning = &state.tuning;
    state.run.increase_difficulty(tuning);

    let difficulty = state.run.difficulty_multiplier();
    log::info!("Boss {:?} summoned, difficulty now {:.1}x", handle, difficulty);
    state.events.push(GameEvent::BossSummoned { handle, difficulty });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presentation::Recorder;
    use crate::sim::state::{Entity, Tier};

    #[test]
    fn test_ritual_spawns_boss_after_delay() {
        let mut hooks = Recorder::new();
        let mut state = GameState::new(5);
        state.start_run(&mut hooks);
        hooks.clear();

        let pos = Vec2::new(10.0, 12.0);
        begin_ritual(&mut state, pos, &mut hooks);
        assert_eq!(hooks.sound_count(SoundCue::BossSummon), 1);
        assert!(state.ritual_pending());
        assert_eq!(state.actor_count(Tier::Boss), 0);
        assert_eq!(state.live_effects(), 1);

        // Nothing due before the delay
        assert!(state.timers.pop_due(state.clock + 0.5).is_empty());
        let due = state.timers.pop_due(state.clock + 1.0);
        let [TimedAction::CompleteBossRitual { pos: at, fountain }] = due.as_slice() else {
            panic!("expected ritual completion, got {due:?}");
        };
        complete_ritual(&mut state, *at, *fountain, &mut hooks);

        assert_eq!(state.actor_count(Tier::Boss), 1);
        assert_eq!(state.live_effects(), 0);
        assert_eq!(hooks.release_count(*fountain), 1);
        assert!((state.run.difficulty_multiplier() - 1.2).abs() < 0.0001);

        let (_, boss) = state
            .entities
            .iter()
            .find(|(_, e)| e.as_actor().is_some_and(|a| a.tier == Tier::Boss))
            .unwrap();
        assert_eq!(boss.pos(), pos);
        // Boss stats use the multiplier from before the bump
        assert!(matches!(boss, Entity::Actor(a) if a.health == 50 && a.damage == 20));
    }

    #[test]
    fn test_overlapping_rituals_each_complete_once() {
        let mut hooks = Recorder::new();
        let mut state = GameState::new(6);
        state.start_run(&mut hooks);

        begin_ritual(&mut state, Vec2::new(3.0, 3.0), &mut hooks);
        begin_ritual(&mut state, Vec2::new(20.0, 3.0), &mut hooks);
        let due = state.timers.pop_due(state.clock + 1.0);
        assert_eq!(due.len(), 2);
        for action in due {
            if let TimedAction::CompleteBossRitual { pos, fountain } = action {
                complete_ritual(&mut state, pos, fountain, &mut hooks);
            }
        }
        assert_eq!(state.actor_count(Tier::Boss), 2);
        assert_eq!(state.live_effects(), state.item_count());
        assert!((state.run.difficulty_multiplier() - 1.4).abs() < 0.0001);
    }
}
