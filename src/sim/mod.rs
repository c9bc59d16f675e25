//! Deterministic simulation module
//!
//! All encounter logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by registry slot)
//! - No rendering or platform dependencies; outward effects go through `Presentation`

pub mod boss;
pub mod combat;
pub mod progression;
pub mod registry;
pub mod spawn;
pub mod state;
pub mod tick;
pub mod timers;

pub use combat::{boxes_overlap, in_contact};
pub use progression::RunContext;
pub use registry::{Handle, Registry};
pub use spawn::{edge_spawn_position, initial_spawn_position};
pub use state::{
    Actor, AmbientEffects, Entity, GameEvent, GameState, HudSnapshot, Item, ItemKind, Phase,
    Player, Strike, Tier,
};
pub use tick::{TickInput, tick};
pub use timers::{TimedAction, TimerQueue};
