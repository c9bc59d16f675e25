//! Game balance table
//!
//! Every number that shapes a run lives here. Defaults reproduce the
//! shipped balance; tables can be loaded from JSON for experiments.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How a strike treats enemies after its first hit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum StrikePolicy {
    /// Keeps going until its lifetime ends, hitting each distinct enemy once
    #[default]
    Pierce,
    /// Expires immediately after dealing its first hit
    SingleHit,
}

impl StrikePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            StrikePolicy::Pierce => "Pierce",
            StrikePolicy::SingleHit => "SingleHit",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pierce" | "multi" => Some(StrikePolicy::Pierce),
            "single" | "singlehit" | "single-hit" => Some(StrikePolicy::SingleHit),
            _ => None,
        }
    }
}

/// Rejected tuning tables
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("failed to read tuning table: {0}")]
    Io(#[from] std::io::Error),

    #[error("tuning table JSON error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("unknown strike policy `{0}`")]
    UnknownStrikePolicy(String),

    #[error("`{field}` must be positive, got {value}")]
    NonPositive { field: &'static str, value: f32 },

    #[error("`{field}` must be at least 1, got {value}")]
    NonPositiveStat { field: &'static str, value: i32 },

    #[error("spawn interval step must not be negative, got {0}")]
    NegativeIntervalStep(f32),

    #[error("spawn interval floor {min} exceeds base interval {base}")]
    IntervalFloorAboveBase { min: f32, base: f32 },

    #[error("initial offset range is inverted: {min} > {max}")]
    InvertedOffsetRange { min: i32, max: i32 },

    #[error("item drop chance must be within [0, 1], got {0}")]
    DropChanceOutOfRange(f64),
}

/// Balance table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Enemy stats (scaled by difficulty at creation) ===
    pub enemy_base_health: i32,
    pub enemy_base_damage: i32,
    pub boss_base_health: i32,
    pub boss_base_damage: i32,
    /// Difficulty added per summoned boss, in percent of the base multiplier
    pub difficulty_step_percent: u32,

    // === Spawn director ===
    /// Seconds between spawns with no bosses killed
    pub spawn_interval_base: f32,
    /// Seconds shaved off per boss kill
    pub spawn_interval_step: f32,
    /// Fastest allowed cadence
    pub spawn_interval_min: f32,
    pub initial_enemy_count: u32,
    pub initial_offset_min: i32,
    pub initial_offset_max: i32,

    // === Loot ===
    /// Chance a normal enemy drops a healing item
    pub item_drop_chance: f64,
    pub heal_amount: i32,

    // === Combat timing (seconds) ===
    pub strike_policy: StrikePolicy,
    pub strike_lifetime: f32,
    pub enemy_hit_recovery: f32,
    pub contact_knockback_duration: f32,
    pub invulnerability_duration: f32,

    // === Sequencing (seconds) ===
    pub boss_ritual_delay: f32,
    pub boss_roar_delay: f32,
    pub run_over_delay: f32,

    // === Input ===
    /// Attack whenever the cadence allows, without holding the trigger
    pub auto_attack: bool,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            enemy_base_health: 20,
            enemy_base_damage: 10,
            boss_base_health: 50,
            boss_base_damage: 20,
            difficulty_step_percent: 20,

            spawn_interval_base: 2.0,
            spawn_interval_step: 0.2,
            spawn_interval_min: 0.5,
            initial_enemy_count: 3,
            initial_offset_min: 5,
            initial_offset_max: 12,

            item_drop_chance: 0.1,
            heal_amount: 25,

            strike_policy: StrikePolicy::Pierce,
            strike_lifetime: 0.2,
            enemy_hit_recovery: 0.3,
            contact_knockback_duration: 0.1,
            invulnerability_duration: 1.0,

            boss_ritual_delay: 1.0,
            boss_roar_delay: 0.2,
            run_over_delay: 2.0,

            auto_attack: true,
        }
    }
}

impl Tuning {
    /// Parse and validate a JSON tuning table (missing fields take defaults)
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Read, parse and validate a tuning file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TuningError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Serialize to pretty JSON (for dumping the active table)
    pub fn to_json(&self) -> Result<String, TuningError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check that stats and durations are positive and ranges are ordered
    pub fn validate(&self) -> Result<(), TuningError> {
        let stats = [
            ("enemy_base_health", self.enemy_base_health),
            ("enemy_base_damage", self.enemy_base_damage),
            ("boss_base_health", self.boss_base_health),
            ("boss_base_damage", self.boss_base_damage),
            ("heal_amount", self.heal_amount),
        ];
        for (field, value) in stats {
            if value <= 0 {
                log::warn!("Rejecting tuning table: {field} = {value}");
                return Err(TuningError::NonPositiveStat { field, value });
            }
        }

        let durations = [
            ("spawn_interval_base", self.spawn_interval_base),
            ("spawn_interval_min", self.spawn_interval_min),
            ("strike_lifetime", self.strike_lifetime),
            ("enemy_hit_recovery", self.enemy_hit_recovery),
            ("contact_knockback_duration", self.contact_knockback_duration),
            ("invulnerability_duration", self.invulnerability_duration),
            ("boss_ritual_delay", self.boss_ritual_delay),
            ("boss_roar_delay", self.boss_roar_delay),
            ("run_over_delay", self.run_over_delay),
        ];
        for (field, value) in durations {
            if value <= 0.0 || !value.is_finite() {
                log::warn!("Rejecting tuning table: {field} = {value}");
                return Err(TuningError::NonPositive { field, value });
            }
        }

        // Boss kills may only tighten the cadence
        if self.spawn_interval_step < 0.0 || !self.spawn_interval_step.is_finite() {
            return Err(TuningError::NegativeIntervalStep(self.spawn_interval_step));
        }

        if self.spawn_interval_min > self.spawn_interval_base {
            return Err(TuningError::IntervalFloorAboveBase {
                min: self.spawn_interval_min,
                base: self.spawn_interval_base,
            });
        }

        if self.initial_offset_min > self.initial_offset_max {
            return Err(TuningError::InvertedOffsetRange {
                min: self.initial_offset_min,
                max: self.initial_offset_max,
            });
        }

        if !(0.0..=1.0).contains(&self.item_drop_chance) {
            return Err(TuningError::DropChanceOutOfRange(self.item_drop_chance));
        }

        Ok(())
    }

    /// Attack cooldown for a sword level (seconds)
    pub fn attack_cooldown(&self, level: u32) -> f32 {
        (1.0 - level.saturating_sub(1) as f32 * 0.05).max(0.2)
    }
}
