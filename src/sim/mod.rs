//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Step size clamped, velocities scaled per nominal frame
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering, audio or platform dependencies

pub mod body;
pub mod collision;
pub mod enemy;
pub mod events;
pub mod interact;
pub mod level;
pub mod pickup;
pub mod player;
pub mod projectile;
pub mod rect;
pub mod session;
pub mod state;
pub mod tick;
pub mod timers;

pub use body::{Body, Contacts, Facing};
pub use collision::{
    Circle, aabb_overlap, circle_overlap, first_overlap, line_of_sight_clear, point_in_rect,
    segment_blocked_by_rect, segment_intersect,
};
pub use enemy::{ChaserState, Enemy, EnemyKind, PatrolBounds, SentryState};
pub use events::{EffectKind, EventSink, GameEvent, NullSink};
pub use interact::{Door, SavePoint};
pub use level::LevelData;
pub use pickup::{AbilityOrb, ExperienceOrb};
pub use player::Player;
pub use projectile::Fireball;
pub use rect::Rect;
pub use session::{Abilities, Ability, Session};
pub use state::{GamePhase, RngState, World};
pub use tick::TickInput;
pub use timers::{Countdown, PlayerTimers};
