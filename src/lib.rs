//! Thirteen Souls - encounter core for a top-down survival arena
//!
//! Core modules:
//! - `sim`: Deterministic simulation (registry, combat, spawning, boss rituals, run lifecycle)
//! - `presentation`: Outward hooks (sound cues, visual effects, camera)
//! - `tuning`: Data-driven game balance

pub mod presentation;
pub mod sim;
pub mod tuning;

pub use presentation::{EffectId, EffectKind, EffectParams, Headless, Presentation, Recorder, SoundCue};
pub use tuning::{StrikePolicy, Tuning, TuningError};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz, the cadence the balance was tuned at)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Arena dimensions (units)
    pub const ARENA_WIDTH: f32 = 30.0;
    pub const ARENA_HEIGHT: f32 = 30.0;
    /// Clamp margins on the far edges (sprite footprint)
    pub const ARENA_MAX_X: f32 = ARENA_WIDTH - 1.0;
    pub const ARENA_MAX_Y: f32 = ARENA_HEIGHT - 1.25;

    /// Player defaults
    pub const PLAYER_MAX_HEALTH: i32 = 100;
    pub const PLAYER_SPEED: f32 = 6.0;
    pub const PLAYER_BASE_DAMAGE: i32 = 10;
    /// Shove speed applied to both sides of an enemy contact
    pub const CONTACT_KNOCKBACK_SPEED: f32 = 12.0;
    /// Enemy contact distance against the player
    pub const CONTACT_RADIUS: f32 = 1.0;

    /// Actor footprints (box edge length)
    pub const ENEMY_SIZE: f32 = 1.0;
    pub const BOSS_SIZE: f32 = 2.0;
    pub const ITEM_SIZE: f32 = 1.0;
    pub const PLAYER_SIZE: f32 = 1.0;
    /// Pursuit speed per random step unit
    pub const ENEMY_STEP_SPEED: f32 = 1.5;

    /// Strike knockback factor by tier
    pub const NORMAL_KNOCKBACK: f32 = 1.2;
    pub const BOSS_KNOCKBACK: f32 = 0.2;

    /// Boss eligibility cadence (every Nth normal kill)
    pub const BOSS_KILL_CADENCE: u32 = 13;

    /// Camera zoom while the player is dying
    pub const CAMERA_BASE_SCALE: f32 = 46.0;
    pub const CAMERA_MAX_SCALE: f32 = 88.0;
    pub const CAMERA_ZOOM_STEP: f32 = 2.0;
}

/// Centre of the arena (player spawn point)
#[inline]
pub fn arena_center() -> Vec2 {
    Vec2::new(consts::ARENA_WIDTH / 2.0, consts::ARENA_HEIGHT / 2.0)
}

/// Clamp a position onto the playable arena
#[inline]
pub fn clamp_to_arena(pos: Vec2) -> Vec2 {
    Vec2::new(
        pos.x.clamp(0.0, consts::ARENA_MAX_X),
        pos.y.clamp(0.0, consts::ARENA_MAX_Y),
    )
}

/// Per-axis sign with zero kept at zero (8-way direction)
#[inline]
pub fn axis_sign(v: Vec2) -> Vec2 {
    fn sign(x: f32) -> f32 {
        if x > 0.0 {
            1.0
        } else if x < 0.0 {
            -1.0
        } else {
            0.0
        }
    }
    Vec2::new(sign(v.x), sign(v.y))
}

/// Install the platform logger.
///
/// Native builds use `env_logger` (honours `RUST_LOG`); wasm builds log to the
/// browser console and install the panic hook. Safe to call more than once.
pub fn init_logging() {
    #[cfg(target_arch = "wasm32")]
    {
        console_error_panic_hook::set_once();
        let _ = console_log::init_with_level(log::Level::Info);
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        let _ = env_logger::try_init();
    }
}
