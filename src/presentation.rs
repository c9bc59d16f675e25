//! Outward hooks into the presentation layer
//!
//! The simulation decides what happens; whoever implements [`Presentation`]
//! decides how it looks and sounds. Every hook defaults to a no-op so a
//! headless harness can ignore the whole surface.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Sound cue identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SoundCue {
    /// Strike connected with an enemy
    AttackHit,
    /// Enemy or boss destroyed
    EnemyDie,
    /// Enemy touched the player
    PlayerDamaged,
    /// Healing item collected
    Heal,
    /// Power-up item collected
    PowerUp,
    /// Boss ritual begins
    BossSummon,
    /// Boss arrives (also plays when the run ends)
    BossRoar,
    /// Ambient music on run start
    MusicStart,
    /// Ambient music stops on player death
    MusicStop,
}

/// Visual effect kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EffectKind {
    /// Burst at a strike contact
    HitSpark,
    /// Burst when the player is hurt
    DamageBurst,
    /// Burst when an actor dies
    DeathBurst,
    /// Burst when an item is collected
    PickupBurst,
    /// Fountain hovering over an uncollected item (ambient)
    ItemAura,
    /// Large dark fountain during a boss ritual (ambient)
    SummonFountain,
}

/// Extra parameters for one-shot effects
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EffectParams {
    /// Emission angle (radians)
    pub angle: f32,
    /// Dark palette instead of light
    pub dark: bool,
}

/// Identifier of an ambient effect owned by the simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EffectId(pub u32);

/// Hooks the simulation calls outward
pub trait Presentation {
    fn play_sound(&mut self, _cue: SoundCue) {}

    /// Fire-and-forget effect
    fn emit_effect(&mut self, _kind: EffectKind, _pos: Vec2, _params: EffectParams) {}

    /// Start an ambient effect; it stays until [`Presentation::release_effect`]
    fn attach_effect(&mut self, _id: EffectId, _kind: EffectKind, _pos: Vec2) {}

    /// Stop an ambient effect. Called exactly once per attached id.
    fn release_effect(&mut self, _id: EffectId) {}

    fn recenter_camera(&mut self, _pos: Vec2) {}

    fn zoom_camera(&mut self, _scale: f32) {}
}

/// Presentation that does nothing (tests, servers, benchmarks)
#[derive(Debug, Default, Clone, Copy)]
pub struct Headless;

impl Presentation for Headless {}

/// One recorded hook call
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum PresentationCall {
    Sound(SoundCue),
    Effect(EffectKind, Vec2),
    Attach(EffectId, EffectKind),
    Release(EffectId),
    Recenter(Vec2),
    Zoom(f32),
}

/// Presentation that records every call, for tests and the harness
#[derive(Debug, Default, Clone)]
pub struct Recorder {
    pub calls: Vec<PresentationCall>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of times a sound cue was played
    pub fn sound_count(&self, cue: SoundCue) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, PresentationCall::Sound(s) if *s == cue))
            .count()
    }

    /// Number of one-shot effects of a kind
    pub fn effect_count(&self, kind: EffectKind) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, PresentationCall::Effect(k, _) if *k == kind))
            .count()
    }

    /// Number of times an ambient id was released
    pub fn release_count(&self, id: EffectId) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, PresentationCall::Release(r) if *r == id))
            .count()
    }

    pub fn clear(&mut self) {
        self.calls.clear();
    }
}

impl Presentation for Recorder {
    fn play_sound(&mut self, cue: SoundCue) {
        self.calls.push(PresentationCall::Sound(cue));
    }

    fn emit_effect(&mut self, kind: EffectKind, pos: Vec2, _params: EffectParams) {
        self.calls.push(PresentationCall::Effect(kind, pos));
    }

    fn attach_effect(&mut self, id: EffectId, kind: EffectKind, _pos: Vec2) {
        self.calls.push(PresentationCall::Attach(id, kind));
    }

    fn release_effect(&mut self, id: EffectId) {
        self.calls.push(PresentationCall::Release(id));
    }

    fn recenter_camera(&mut self, pos: Vec2) {
        self.calls.push(PresentationCall::Recenter(pos));
    }

    fn zoom_camera(&mut self, scale: f32) {
        self.calls.push(PresentationCall::Zoom(scale));
    }
}
