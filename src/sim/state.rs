//! Game state and core simulation types
//!
//! Everything a run owns lives in [`GameState`]: the player, the entity
//! registry, in-flight strikes, deferred actions and the run counters.

use std::collections::BTreeSet;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::progression::RunContext;
use super::registry::{Handle, Registry};
use super::timers::{TimedAction, TimerQueue};
use crate::consts::*;
use crate::presentation::{EffectId, EffectKind, Presentation, SoundCue};
use crate::tuning::Tuning;
use crate::{arena_center, clamp_to_arena};

/// Lifecycle phase of the game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// Title screen, waiting for activate
    Title,
    /// Story screen, waiting for activate
    Story,
    /// A run is in progress
    Active,
    /// Player died; waiting for activate to start another run
    RunOver,
}

/// Actor classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tier {
    Normal,
    Boss,
}

impl Tier {
    /// Footprint edge length
    pub fn size(&self) -> f32 {
        match self {
            Tier::Normal => ENEMY_SIZE,
            Tier::Boss => BOSS_SIZE,
        }
    }

    /// Fraction of strike velocity transferred as knockback
    pub fn knockback_factor(&self) -> f32 {
        match self {
            Tier::Normal => NORMAL_KNOCKBACK,
            Tier::Boss => BOSS_KNOCKBACK,
        }
    }
}

/// A hostile actor (small enemy or boss)
#[derive(Debug, Clone, PartialEq)]
pub struct Actor {
    pub tier: Tier,
    pub pos: Vec2,
    /// Knockback velocity (units/s), zeroed when the pulse ends
    pub vel: Vec2,
    /// May go negative between a hit and the death pass
    pub health: i32,
    pub damage: i32,
    /// Set for the hit-recovery window; further strikes are ignored
    pub taking_damage: bool,
}

impl Actor {
    pub fn new(tier: Tier, pos: Vec2, health: i32, damage: i32) -> Self {
        Self {
            tier,
            pos,
            vel: Vec2::ZERO,
            health,
            damage,
            taking_damage: false,
        }
    }

    pub fn is_dead(&self) -> bool {
        self.health <= 0
    }
}

/// Pickup types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemKind {
    /// Restores health
    Healing,
    /// Raises sword level
    PowerUp,
}

/// A pickup lying in the arena
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    pub kind: ItemKind,
    pub pos: Vec2,
    /// Ambient aura owned by this item
    pub aura: EffectId,
}

/// Anything stored in the registry
#[derive(Debug, Clone, PartialEq)]
pub enum Entity {
    Actor(Actor),
    Item(Item),
}

impl Entity {
    pub fn pos(&self) -> Vec2 {
        match self {
            Entity::Actor(a) => a.pos,
            Entity::Item(i) => i.pos,
        }
    }

    pub fn as_actor(&self) -> Option<&Actor> {
        match self {
            Entity::Actor(a) => Some(a),
            Entity::Item(_) => None,
        }
    }

    pub fn as_actor_mut(&mut self) -> Option<&mut Actor> {
        match self {
            Entity::Actor(a) => Some(a),
            Entity::Item(_) => None,
        }
    }

    pub fn as_item(&self) -> Option<&Item> {
        match self {
            Entity::Item(i) => Some(i),
            Entity::Actor(_) => None,
        }
    }
}

/// The player character
#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    pub pos: Vec2,
    /// Knockback velocity (units/s)
    pub vel: Vec2,
    health: i32,
    /// Facing angle (radians)
    pub face_angle: f32,
    /// Last non-zero movement direction; strikes travel along it
    pub aim: Vec2,
    /// Sword level, starts at 1
    pub level: u32,
    pub invulnerable: bool,
    /// Seconds until the next strike may be emitted
    pub attack_cooldown: f32,
}

impl Player {
    pub fn new(pos: Vec2) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            health: PLAYER_MAX_HEALTH,
            face_angle: 0.0,
            aim: Vec2::X,
            level: 1,
            invulnerable: false,
            attack_cooldown: 0.0,
        }
    }

    pub fn health(&self) -> i32 {
        self.health
    }

    /// Set health, clamped into [0, max]
    pub fn set_health(&mut self, health: i32) {
        self.health = health.clamp(0, PLAYER_MAX_HEALTH);
    }

    pub fn heal(&mut self, amount: i32) {
        self.set_health(self.health.saturating_add(amount));
    }

    pub fn take_damage(&mut self, amount: i32) {
        self.set_health(self.health.saturating_sub(amount));
    }

    pub fn is_dead(&self) -> bool {
        self.health <= 0
    }

    /// Strike damage at the current level
    pub fn strike_damage(&self) -> i32 {
        PLAYER_BASE_DAMAGE + self.level as i32 * 5
    }

    /// Strike hitbox size at the current level
    pub fn strike_size(&self) -> Vec2 {
        Vec2::new(1.0 + self.level as f32 * 0.1, 1.0 + self.level as f32 * 0.2)
    }

    /// Strike travel speed at the current level (units/s)
    pub fn strike_speed(&self) -> f32 {
        12.0 + self.level as f32 * 1.2
    }
}

/// Transient attack hitbox, owned by the state and never registered
#[derive(Debug, Clone, PartialEq)]
pub struct Strike {
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: Vec2,
    pub angle: f32,
    pub damage: i32,
    /// Seconds left before it disappears
    pub remaining: f32,
    /// Actors already hit by this strike
    pub hits: Vec<Handle>,
    /// Used up under the single-hit policy
    pub spent: bool,
}

impl Strike {
    pub fn is_expired(&self) -> bool {
        self.spent || self.remaining <= 0.0
    }
}

/// Ledger of ambient effects currently attached in the presentation layer
#[derive(Debug, Clone, Default)]
pub struct AmbientEffects {
    live: BTreeSet<EffectId>,
    next_id: u32,
}

impl AmbientEffects {
    /// Start an ambient effect and return its id
    pub fn attach(&mut self, kind: EffectKind, pos: Vec2, hooks: &mut dyn Presentation) -> EffectId {
        let id = EffectId(self.next_id);
        self.next_id += 1;
        self.live.insert(id);
        hooks.attach_effect(id, kind, pos);
        id
    }

    /// Release an effect. Only the first release of an id reaches the hook.
    pub fn release(&mut self, id: EffectId, hooks: &mut dyn Presentation) -> bool {
        if self.live.remove(&id) {
            hooks.release_effect(id);
            true
        } else {
            false
        }
    }

    pub fn release_all(&mut self, hooks: &mut dyn Presentation) {
        for id in std::mem::take(&mut self.live) {
            hooks.release_effect(id);
        }
    }

    pub fn is_live(&self, id: EffectId) -> bool {
        self.live.contains(&id)
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }
}

/// Things that happened during the last tick (telemetry / HUD feed)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum GameEvent {
    PhaseChanged { from: Phase, to: Phase },
    EnemySpawned { handle: Handle, tier: Tier },
    StrikeHit { handle: Handle, damage: i32 },
    PlayerDamaged { damage: i32, health: i32 },
    EnemyKilled { handle: Handle, tier: Tier },
    BossEligible { kill_count: u32 },
    BossSummoned { handle: Handle, difficulty: f32 },
    BossDefeated { boss_kills: u32 },
    ItemDropped { handle: Handle, kind: ItemKind },
    ItemCollected { kind: ItemKind },
    PlayerDied,
}

/// Read-only run summary for the HUD
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HudSnapshot {
    pub phase: Phase,
    pub health: i32,
    pub level: u32,
    pub kill_count: u32,
    pub boss_kills: u32,
    pub difficulty: f32,
    pub spawn_interval: f32,
    pub live_entities: usize,
}

/// Complete game state (deterministic for a given seed and input sequence)
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    /// Balance table
    pub tuning: Tuning,
    pub(crate) rng: Pcg32,
    /// Current phase
    pub phase: Phase,
    /// Simulation clock (seconds since the run started)
    pub clock: f64,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// The player (absent outside a run)
    pub player: Option<Player>,
    /// Live actors and items
    pub entities: Registry<Entity>,
    /// In-flight strikes
    pub strikes: Vec<Strike>,
    /// Kill counters and difficulty
    pub run: RunContext,
    /// Current spawn interval (seconds)
    pub spawn_interval: f32,
    /// Seconds until the next edge spawn
    pub spawn_timer: f32,
    pub(crate) timers: TimerQueue,
    pub(crate) effects: AmbientEffects,
    /// Camera zoom hint (grows while the player is dying)
    pub camera_scale: f32,
    /// Player death seen; run-over transition already scheduled
    pub run_over_pending: bool,
    /// Events recorded during the last tick
    pub events: Vec<GameEvent>,
}

impl GameState {
    /// Create a new game state with the given seed and default tuning
    pub fn new(seed: u64) -> Self {
        Self::with_tuning(seed, Tuning::default())
    }

    pub fn with_tuning(seed: u64, tuning: Tuning) -> Self {
        let spawn_interval = tuning.spawn_interval_base;
        Self {
            seed,
            tuning,
            rng: Pcg32::seed_from_u64(seed),
            phase: Phase::Title,
            clock: 0.0,
            time_ticks: 0,
            player: None,
            entities: Registry::new(),
            strikes: Vec::new(),
            run: RunContext::new(),
            spawn_interval,
            spawn_timer: spawn_interval,
            timers: TimerQueue::new(),
            effects: AmbientEffects::default(),
            camera_scale: CAMERA_BASE_SCALE,
            run_over_pending: false,
            events: Vec::new(),
        }
    }

    /// Move to another phase, recording the change
    pub(crate) fn set_phase(&mut self, to: Phase) {
        if self.phase != to {
            log::info!("Phase {:?} -> {:?}", self.phase, to);
            self.events.push(GameEvent::PhaseChanged { from: self.phase, to });
            self.phase = to;
        }
    }

    /// Reset everything and begin a fresh run
    pub fn start_run(&mut self, hooks: &mut dyn Presentation) {
        self.teardown(hooks);

        self.run.reset();
        self.clock = 0.0;
        self.spawn_interval = self.run.spawn_interval(&self.tuning);
        self.spawn_timer = self.spawn_interval;
        self.player = Some(Player::new(arena_center()));

        super::spawn::spawn_initial_enemies(self);
        hooks.play_sound(SoundCue::MusicStart);
        self.set_phase(Phase::Active);
        log::info!("Run started (seed {}, {} enemies)", self.seed, self.entities.len());
    }

    /// Destroy the player and every live entity, drop pending actions and
    /// release every ambient effect
    pub fn teardown(&mut self, hooks: &mut dyn Presentation) {
        self.player = None;
        for (_, entity) in self.entities.drain_all() {
            if let Entity::Item(item) = entity {
                self.effects.release(item.aura, hooks);
            }
        }
        self.strikes.clear();
        let dropped = self.timers.clear();
        if !dropped.is_empty() {
            log::debug!("Discarded {} pending actions", dropped.len());
        }
        // Fountains of rituals that never completed
        self.effects.release_all(hooks);
        self.run_over_pending = false;
        self.camera_scale = CAMERA_BASE_SCALE;
    }

    /// Create an actor with stats scaled by the current difficulty
    pub(crate) fn spawn_actor(&mut self, tier: Tier, pos: Vec2) -> Handle {
        let (base_health, base_damage) = match tier {
            Tier::Normal => (self.tuning.enemy_base_health, self.tuning.enemy_base_damage),
            Tier::Boss => (self.tuning.boss_base_health, self.tuning.boss_base_damage),
        };
        let actor = Actor::new(
            tier,
            pos,
            self.run.scale_stat(base_health),
            self.run.scale_stat(base_damage),
        );
        let handle = self.entities.insert(Entity::Actor(actor));
        log::debug!("Spawned {:?} enemy {:?} at {:?}", tier, handle, pos);
        self.events.push(GameEvent::EnemySpawned { handle, tier });
        handle
    }

    /// Create a normal enemy
    pub fn spawn_enemy(&mut self, pos: Vec2) -> Handle {
        self.spawn_actor(Tier::Normal, pos)
    }

    /// Create a boss; its roar follows shortly after
    pub fn spawn_boss(&mut self, pos: Vec2) -> Handle {
        let handle = self.spawn_actor(Tier::Boss, pos);
        self.timers
            .schedule(self.clock, self.tuning.boss_roar_delay, TimedAction::BossRoar);
        handle
    }

    /// Drop an item; without a kind it rolls healing or power-up evenly
    pub fn spawn_item(&mut self, pos: Vec2, kind: Option<ItemKind>, hooks: &mut dyn Presentation) -> Handle {
        let kind = kind.unwrap_or_else(|| {
            if self.rng.random_bool(0.5) {
                ItemKind::Healing
            } else {
                ItemKind::PowerUp
            }
        });
        let pos = clamp_to_arena(pos);
        let aura = self.effects.attach(EffectKind::ItemAura, pos, hooks);
        let handle = self.entities.insert(Entity::Item(Item { kind, pos, aura }));
        log::debug!("Dropped {:?} item {:?}", kind, handle);
        self.events.push(GameEvent::ItemDropped { handle, kind });
        handle
    }

    /// Remove an entity and release what it owns. Absent handles are a no-op.
    pub fn despawn(&mut self, handle: Handle, hooks: &mut dyn Presentation) -> Option<Entity> {
        let entity = self.entities.remove(handle)?;
        if let Entity::Item(item) = &entity {
            self.effects.release(item.aura, hooks);
        }
        Some(entity)
    }

    pub fn is_alive(&self, handle: Handle) -> bool {
        self.entities.is_alive(handle)
    }

    /// Live actors of a tier
    pub fn actor_count(&self, tier: Tier) -> usize {
        self.entities
            .iter()
            .filter(|(_, e)| e.as_actor().is_some_and(|a| a.tier == tier))
            .count()
    }

    pub fn item_count(&self) -> usize {
        self.entities.iter().filter(|(_, e)| e.as_item().is_some()).count()
    }

    /// Ambient effects still attached
    pub fn live_effects(&self) -> usize {
        self.effects.live_count()
    }

    /// Whether a boss ritual is waiting to complete
    pub fn ritual_pending(&self) -> bool {
        self.timers
            .contains(|a| matches!(a, TimedAction::CompleteBossRitual { .. }))
    }

    pub fn hud(&self) -> HudSnapshot {
        HudSnapshot {
            phase: self.phase,
            health: self.player.as_ref().map_or(0, |p| p.health()),
            level: self.player.as_ref().map_or(1, |p| p.level),
            kill_count: self.run.kill_count(),
            boss_kills: self.run.boss_kills(),
            difficulty: self.run.difficulty_multiplier(),
            spawn_interval: self.spawn_interval,
            live_entities: self.entities.len(),
        }
    }
}
