//! Outbound notifications for renderer, audio and UI
//!
//! Fire-and-forget: the simulation never reads these back.

use serde::{Deserialize, Serialize};

use super::enemy::EnemyKind;
use super::session::Ability;

/// Visual/sound cue kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EffectKind {
    /// Melee swing started
    Slash,
    /// Melee swing connected with an enemy
    Hit,
    /// Player took damage
    PlayerHurt,
    FireballLaunch,
    Explosion,
    /// Sentry began charging
    SentryCharge,
    /// Sentry fired its ray
    Ray,
    /// Experience or ability orb picked up
    OrbCollected,
}

/// Something the outside world may want to react to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    HealthChanged { health: i32, max_health: i32 },
    ExperienceChanged { experience: u32, level: u32 },
    LevelUp { level: u32 },
    AbilityUnlocked { ability: Ability, text: String },
    Death,
    Victory,
    DoorLocked { x: f32, y: f32 },
    SavePointActivated { x: f32, y: f32 },
    EnemyKilled { id: u32, kind: EnemyKind },
    Effect { kind: EffectKind, x: f32, y: f32 },
}

/// Receiver for events raised during an update
pub trait EventSink {
    fn emit(&mut self, event: GameEvent);

    /// Shorthand for `GameEvent::Effect`
    fn effect(&mut self, kind: EffectKind, x: f32, y: f32) {
        self.emit(GameEvent::Effect { kind, x, y });
    }
}

impl EventSink for Vec<GameEvent> {
    fn emit(&mut self, event: GameEvent) {
        self.push(event);
    }
}

/// Sink that drops everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&mut self, _event: GameEvent) {}
}
