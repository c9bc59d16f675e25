//! Run counters and difficulty escalation
//!
//! A single [`RunContext`] owns every counter a run accumulates. The
//! lifecycle resets it on run start; nothing else writes to it directly.

use serde::{Deserialize, Serialize};

use crate::consts::BOSS_KILL_CADENCE;
use crate::tuning::Tuning;

/// Per-run progression counters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunContext {
    /// Difficulty multiplier in percent (100 = 1.0x). Kept integral so
    /// scaled stats floor exactly.
    difficulty_percent: u32,
    /// Normal enemies killed this run
    kill_count: u32,
    /// Bosses killed this run
    boss_kills: u32,
}

impl Default for RunContext {
    fn default() -> Self {
        Self {
            difficulty_percent: 100,
            kill_count: 0,
            boss_kills: 0,
        }
    }
}

impl RunContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Back to 1.0x and zero counters
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Count a normal-enemy kill and report whether it summons a boss.
    ///
    /// Eligible exactly when the post-increment count is a multiple of the
    /// cadence. Each qualifying kill returns `true` once, which is what keeps
    /// boss rituals from overlapping under normal play.
    pub fn should_trigger_boss(&mut self) -> bool {
        self.kill_count += 1;
        self.kill_count % BOSS_KILL_CADENCE == 0
    }

    /// Raise the multiplier by one step (called when a boss is summoned)
    pub fn increase_difficulty(&mut self, tuning: &Tuning) {
        self.difficulty_percent += tuning.difficulty_step_percent;
    }

    pub fn record_boss_kill(&mut self) {
        self.boss_kills += 1;
    }

    pub fn difficulty_multiplier(&self) -> f32 {
        self.difficulty_percent as f32 / 100.0
    }

    pub fn difficulty_percent(&self) -> u32 {
        self.difficulty_percent
    }

    pub fn kill_count(&self) -> u32 {
        self.kill_count
    }

    pub fn boss_kills(&self) -> u32 {
        self.boss_kills
    }

    /// Scale a base stat by the current multiplier, floored
    pub fn scale_stat(&self, base: i32) -> i32 {
        (base as i64 * self.difficulty_percent as i64 / 100) as i32
    }

    /// Seconds between spawns: `max(base - step * boss_kills, min)`
    pub fn spawn_interval(&self, tuning: &Tuning) -> f32 {
        (tuning.spawn_interval_base - tuning.spawn_interval_step * self.boss_kills as f32)
            .max(tuning.spawn_interval_min)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_boss_cadence() {
        let mut ctx = RunContext::new();
        let eligible: Vec<u32> = (1..=40)
            .filter(|_| ctx.should_trigger_boss())
            .collect();
        assert_eq!(eligible, vec![13, 26, 39]);
        assert_eq!(ctx.kill_count(), 40);
    }

    #[test]
    fn test_difficulty_scaling_floors() {
        let tuning = Tuning::default();
        let mut ctx = RunContext::new();
        assert_eq!(ctx.scale_stat(20), 20);

        ctx.increase_difficulty(&tuning);
        ctx.increase_difficulty(&tuning);
        assert!((ctx.difficulty_multiplier() - 1.4).abs() < 0.0001);
        assert_eq!(ctx.scale_stat(tuning.enemy_base_health), 28);
        assert_eq!(ctx.scale_stat(tuning.enemy_base_damage), 14);

        // 1.2 * 7 = 8.4 -> 8
        let mut ctx = RunContext::new();
        ctx.increase_difficulty(&tuning);
        assert_eq!(ctx.scale_stat(7), 8);
    }

    #[test]
    fn test_spawn_interval_floor() {
        let tuning = Tuning::default();
        let mut ctx = RunContext::new();
        let mut at = |kills: u32| {
            while ctx.boss_kills() < kills {
                ctx.record_boss_kill();
            }
            ctx.spawn_interval(&tuning)
        };
        assert!((at(0) - 2.0).abs() < 0.0001);
        assert!((at(5) - 1.0).abs() < 0.0001);
        assert!((at(10) - 0.5).abs() < 0.0001);
        assert!((at(20) - 0.5).abs() < 0.0001);
    }

    #[test]
    fn test_reset() {
        let tuning = Tuning::default();
        let mut ctx = RunContext::new();
        ctx.should_trigger_boss();
        ctx.record_boss_kill();
        ctx.increase_difficulty(&tuning);
        ctx.reset();
        assert_eq!(ctx, RunContext::default());
        assert_eq!(ctx.difficulty_multiplier(), 1.0);
    }

    proptest! {
        #[test]
        fn prop_eligible_iff_multiple_of_cadence(kills in 1u32..500) {
            let mut ctx = RunContext::new();
            let mut last = false;
            for _ in 0..kills {
                last = ctx.should_trigger_boss();
            }
            prop_assert_eq!(last, kills % BOSS_KILL_CADENCE == 0);
        }

        #[test]
        fn prop_interval_never_below_floor(kills in 0u32..200) {
            let tuning = Tuning::default();
            let mut ctx = RunContext::new();
            for _ in 0..kills {
                ctx.record_boss_kill();
            }
            let interval = ctx.spawn_interval(&tuning);
            prop_assert!(interval >= tuning.spawn_interval_min);
            prop_assert!(interval <= tuning.spawn_interval_base);
        }

        #[test]
        fn prop_difficulty_monotonic(steps in 0usize..30, base in 1i32..500) {
            let tuning = Tuning::default();
            let mut ctx = RunContext::new();
            let mut prev = ctx.scale_stat(base);
            for _ in 0..steps {
                ctx.increase_difficulty(&tuning);
                let next = ctx.scale_stat(base);
                prop_assert!(next >= prev);
                prev = next;
            }
        }
    }
}
