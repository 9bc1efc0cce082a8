//! Shared actor motion: gravity integration and axis-separated collision
//!
//! Velocities are per nominal 1/60 s frame. Every displacement and
//! acceleration is scaled by `frame_multiplier(dt)`.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::aabb_overlap;
use super::rect::Rect;
use crate::frame_multiplier;

/// Facing direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Facing {
    Left,
    #[default]
    Right,
}

impl Facing {
    /// -1.0 for left, +1.0 for right
    #[inline]
    pub fn sign(self) -> f32 {
        match self {
            Facing::Left => -1.0,
            Facing::Right => 1.0,
        }
    }

    /// Facing that points from `from` toward `to` (right on a tie)
    pub fn toward(from: f32, to: f32) -> Self {
        if to < from { Facing::Left } else { Facing::Right }
    }

    pub fn flipped(self) -> Self {
        match self {
            Facing::Left => Facing::Right,
            Facing::Right => Facing::Left,
        }
    }
}

/// What the last `move_and_collide` ran into
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Contacts {
    /// Blocked while moving horizontally
    pub wall: bool,
    /// Landed on a platform top
    pub landed: bool,
    /// Hit a platform underside while rising
    pub bonked: bool,
}

/// Position, velocity and extent of one actor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Body {
    /// Top-left corner
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: Vec2,
    pub grounded: bool,
    pub facing: Facing,
}

impl Body {
    pub fn new(pos: Vec2, size: Vec2) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            size,
            grounded: false,
            facing: Facing::Right,
        }
    }

    #[inline]
    pub fn rect(&self) -> Rect {
        Rect::new(self.pos.x, self.pos.y, self.size.x, self.size.y)
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.pos + self.size / 2.0
    }

    /// Every component is a finite number
    pub fn is_finite(&self) -> bool {
        self.pos.is_finite() && self.vel.is_finite() && self.size.is_finite()
    }

    /// `vy += gravity * frames`, clamped to `max_fall_speed`
    pub fn apply_gravity(&mut self, dt: f32, gravity: f32, max_fall_speed: f32) {
        self.vel.y += gravity * frame_multiplier(dt);
        self.vel.y = self.vel.y.min(max_fall_speed);
    }

    /// Integrate horizontally then vertically, resolving overlaps after each axis
    ///
    /// `grounded` is cleared before the vertical pass and only set again by a
    /// landing this step, so leaving a ledge is observed one step late.
    pub fn move_and_collide(&mut self, dt: f32, platforms: &[Rect]) -> Contacts {
        let frames = frame_multiplier(dt);
        let mut contacts = Contacts::default();

        self.pos.x += self.vel.x * frames;
        for platform in platforms {
            if aabb_overlap(&self.rect(), platform) {
                if self.vel.x > 0.0 {
                    self.pos.x = platform.x - self.size.x;
                } else if self.vel.x < 0.0 {
                    self.pos.x = platform.x + platform.width;
                }
                self.vel.x = 0.0;
                contacts.wall = true;
            }
        }

        self.pos.y += self.vel.y * frames;
        self.grounded = false;
        for platform in platforms {
            if aabb_overlap(&self.rect(), platform) {
                if self.vel.y > 0.0 {
                    self.pos.y = platform.y - self.size.y;
                    self.vel.y = 0.0;
                    self.grounded = true;
                    contacts.landed = true;
                } else if self.vel.y < 0.0 {
                    self.pos.y = platform.y + platform.height;
                    self.vel.y = 0.0;
                    contacts.bonked = true;
                }
            }
        }

        contacts
    }
}
