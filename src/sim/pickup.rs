//! Collectibles: ability orbs placed by the level and experience orbs
//! dropped by dying enemies.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::collision::{Circle, circle_overlap, first_overlap};
use super::events::{EffectKind, EventSink, GameEvent};
use super::rect::Rect;
use super::session::{Ability, Session};
use crate::frame_multiplier;
use crate::tuning::Tuning;

/// Per-frame horizontal damping while falling
const FALL_DRAG_X: f32 = 0.9;
/// Per-frame vertical damping while falling
const FALL_DRAG_Y: f32 = 0.95;
/// Vertical speed under which a falling orb settles
const SETTLE_SPEED: f32 = 0.1;
/// Upper bound on the fall phase
const MAX_FALL_SECS: f32 = 2.0;
/// Seeking orbs closer than this are picked up outright
const SNAP_DISTANCE: f32 = 6.0;

/// Unlocks an ability once touched
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbilityOrb {
    /// Persisted identifier, unique within the level
    pub id: String,
    pub ability: Ability,
    pub pos: Vec2,
    pub radius: f32,
    pub collected: bool,
}

impl AbilityOrb {
    pub fn new(id: impl Into<String>, ability: Ability, pos: Vec2, radius: f32) -> Self {
        Self {
            id: id.into(),
            ability,
            pos,
            radius,
            collected: false,
        }
    }

    pub fn in_reach(&self, point: Vec2, reach: f32) -> bool {
        !self.collected
            && circle_overlap(
                &Circle::new(self.pos, self.radius),
                &Circle::new(point, reach),
            )
    }

    /// Record the orb and unlock its ability; a repeat call does nothing
    pub fn collect(&mut self, session: &mut Session, events: &mut dyn EventSink) -> bool {
        if self.collected {
            return false;
        }
        self.collected = true;
        session.record_orb(&self.id);

        if session.abilities.unlock(self.ability) {
            log::info!("Unlocked {}", self.ability.as_str());
            events.emit(GameEvent::AbilityUnlocked {
                ability: self.ability,
                text: self.ability.unlock_text().to_string(),
            });
        }
        events.effect(EffectKind::OrbCollected, self.pos.x, self.pos.y);
        true
    }
}

/// Experience drop: pops up, falls and settles, then homes on the player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperienceOrb {
    pub pos: Vec2,
    pub vel: Vec2,
    pub amount: u32,
    pub radius: f32,
    pub settled: bool,
    pub collecting: bool,
    pub collected: bool,
    pub expired: bool,
    pub age: f32,
    fall_time: f32,
    rewarded: bool,
}

impl ExperienceOrb {
    pub fn spawn<R: Rng>(pos: Vec2, amount: u32, rng: &mut R, tuning: &Tuning) -> Self {
        let vx = rng.random_range(-1.0..1.0);
        Self {
            pos,
            vel: Vec2::new(vx, -tuning.experience.launch_speed),
            amount,
            radius: tuning.experience.radius,
            settled: false,
            collecting: false,
            collected: false,
            expired: false,
            age: 0.0,
            fall_time: 0.0,
            rewarded: false,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::centered(self.pos, self.radius * 2.0, self.radius * 2.0)
    }

    /// Collected or expired
    pub fn is_done(&self) -> bool {
        self.collected || self.expired
    }

    pub fn tick(&mut self, dt: f32, target: Vec2, platforms: &[Rect], tuning: &Tuning) {
        if self.is_done() {
            return;
        }
        let exp = &tuning.experience;

        self.age += dt;
        if self.age >= exp.max_age {
            self.expired = true;
            return;
        }

        if !self.settled && !self.collecting {
            self.fall(dt, platforms, tuning);
            return;
        }

        let to_target = target - self.pos;
        let distance = to_target.length();
        if distance < exp.collection_distance {
            self.collecting = true;
        }
        if !self.collecting {
            return;
        }

        if distance < SNAP_DISTANCE {
            self.collected = true;
            return;
        }
        let travel = exp.collection_speed * dt;
        if travel >= distance {
            self.pos = target;
            self.collected = true;
        } else {
            self.pos += to_target / distance * travel;
        }
    }

    fn fall(&mut self, dt: f32, platforms: &[Rect], tuning: &Tuning) {
        let frames = frame_multiplier(dt);
        self.fall_time += dt;

        self.vel.y += tuning.experience.gravity * frames;
        self.pos += self.vel * frames;
        self.vel.x *= FALL_DRAG_X.powf(frames);

        if let Some(i) = first_overlap(&self.rect(), platforms) {
            if self.vel.y > 0.0 {
                self.pos.y = platforms[i].y - self.radius;
            }
            self.settle();
        } else if self.vel.y.abs() > SETTLE_SPEED && self.fall_time < MAX_FALL_SECS {
            self.vel.y *= FALL_DRAG_Y.powf(frames);
        } else {
            self.settle();
        }
    }

    fn settle(&mut self) {
        self.settled = true;
        self.vel = Vec2::ZERO;
    }

    /// Experience owed once the orb is collected, handed out exactly once
    pub fn take_reward(&mut self) -> Option<u32> {
        if self.collected && !self.rewarded {
            self.rewarded = true;
            Some(self.amount)
        } else {
            None
        }
    }
}
