//! Countdown timers gating actor actions
//!
//! Every timer counts simulation seconds down to zero and never goes
//! negative. `tick` reports the step on which a timer expires so callers can
//! run one-shot side effects.

use serde::{Deserialize, Serialize};

/// A single countdown in simulation seconds
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Countdown(f32);

impl Countdown {
    pub const ZERO: Countdown = Countdown(0.0);

    /// Start (or restart) the countdown
    #[inline]
    pub fn arm(&mut self, secs: f32) {
        self.0 = secs.max(0.0);
    }

    #[inline]
    pub fn clear(&mut self) {
        self.0 = 0.0;
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.0 > 0.0
    }

    #[inline]
    pub fn remaining(&self) -> f32 {
        self.0
    }

    /// Advance by `dt`; true only on the step the timer reaches zero
    pub fn tick(&mut self, dt: f32) -> bool {
        if self.0 <= 0.0 {
            return false;
        }
        self.0 = (self.0 - dt).max(0.0);
        self.0 == 0.0
    }
}

/// The player's action gates
///
/// Damage stun and attack recovery are separate sources; the player counts
/// as stunned while either is running.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerTimers {
    pub attack_cooldown: Countdown,
    pub attack_duration: Countdown,
    pub fireball_cooldown: Countdown,
    pub invincible: Countdown,
    pub damage_stun: Countdown,
    pub attack_stun: Countdown,
    pub coyote: Countdown,
}

/// Timers that expired during one `PlayerTimers::tick`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Expired {
    pub attack: bool,
    pub invincible: bool,
    pub damage_stun: bool,
    pub attack_stun: bool,
}

impl PlayerTimers {
    /// Advance every timer except coyote, which follows the grounded state
    pub fn tick(&mut self, dt: f32) -> Expired {
        self.attack_cooldown.tick(dt);
        self.fireball_cooldown.tick(dt);
        Expired {
            attack: self.attack_duration.tick(dt),
            invincible: self.invincible.tick(dt),
            damage_stun: self.damage_stun.tick(dt),
            attack_stun: self.attack_stun.tick(dt),
        }
    }

    #[inline]
    pub fn is_stunned(&self) -> bool {
        self.damage_stun.is_active() || self.attack_stun.is_active()
    }

    #[inline]
    pub fn is_attacking(&self) -> bool {
        self.attack_duration.is_active()
    }

    #[inline]
    pub fn is_invincible(&self) -> bool {
        self.invincible.is_active()
    }

    /// Refresh coyote time while grounded, decay it otherwise
    pub fn update_coyote(&mut self, grounded: bool, coyote_time: f32, dt: f32) {
        if grounded {
            self.coyote.arm(coyote_time);
        } else {
            self.coyote.tick(dt);
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
