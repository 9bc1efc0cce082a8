//! Homing fireball: seek-blend steering, pre-move geometry check and
//! area-of-effect explosion.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::body::Facing;
use super::collision::{aabb_overlap, first_overlap};
use super::enemy::Enemy;
use super::events::{EffectKind, EventSink};
use super::player::{FireballShot, Player};
use super::rect::Rect;
use super::timers::Countdown;
use crate::frame_multiplier;
use crate::tuning::Tuning;

/// Target acquisition reaches further than the fuse
const ACQUIRE_RANGE_FACTOR: f32 = 1.5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fireball {
    pub id: u32,
    /// Center
    pub pos: Vec2,
    pub vel: Vec2,
    /// Launch direction, kept as the non-homing share of each step
    pub heading: Vec2,
    pub radius: f32,
    pub speed: f32,
    pub damage: i32,
    pub max_distance: f32,
    pub distance_traveled: f32,
    /// Enemy id being homed on
    pub target: Option<u32>,
    pub exploded: bool,
    /// Explosion recorded but area damage not yet applied
    blast_pending: bool,
    pub explosion_timer: Countdown,
    /// False once the explosion window closes
    pub active: bool,
}

impl Fireball {
    /// Spawn from a player shot; explodes in place if the spawn overlaps geometry
    pub fn launch(
        id: u32,
        shot: &FireballShot,
        enemies: &[Enemy],
        platforms: &[Rect],
        tuning: &Tuning,
    ) -> Self {
        let f = &tuning.fireball;
        let heading = Vec2::new(shot.facing.sign(), 0.0);
        let mut fireball = Self {
            id,
            pos: shot.center,
            vel: heading * f.speed,
            heading,
            radius: f.radius,
            speed: f.speed,
            damage: shot.damage,
            max_distance: f.max_distance,
            distance_traveled: 0.0,
            target: acquire_target(
                shot.center,
                shot.facing,
                enemies,
                f.max_distance * ACQUIRE_RANGE_FACTOR,
            ),
            exploded: false,
            blast_pending: false,
            explosion_timer: Countdown::ZERO,
            active: true,
        };

        if first_overlap(&fireball.bounds_at(fireball.pos), platforms).is_some() {
            log::debug!("Fireball {} spawned inside geometry", id);
            fireball.detonate(tuning);
        }
        fireball
    }

    fn bounds_at(&self, center: Vec2) -> Rect {
        Rect::centered(center, self.radius * 2.0, self.radius * 2.0)
    }

    pub fn rect(&self) -> Rect {
        self.bounds_at(self.pos)
    }

    fn facing(&self) -> Facing {
        if self.heading.x < 0.0 {
            Facing::Left
        } else {
            Facing::Right
        }
    }

    /// Mark exploded; the blast lands on the next `tick`
    fn detonate(&mut self, tuning: &Tuning) {
        self.exploded = true;
        self.blast_pending = true;
        self.vel = Vec2::ZERO;
        self.explosion_timer.arm(tuning.fireball.explosion_duration);
    }

    /// Advance flight, or the explosion window once exploded
    pub fn tick(
        &mut self,
        dt: f32,
        platforms: &[Rect],
        enemies: &mut [Enemy],
        player: &mut Player,
        tuning: &Tuning,
        events: &mut dyn EventSink,
    ) {
        if !self.active {
            return;
        }

        if self.exploded {
            if self.blast_pending {
                self.blast(enemies, player, tuning, events);
            }
            if self.explosion_timer.tick(dt) {
                self.active = false;
            }
            return;
        }

        let f = &tuning.fireball;
        let target_alive = self
            .target
            .and_then(|id| enemies.iter().find(|e| e.id == id))
            .is_some_and(|e| e.alive);
        if !target_alive {
            self.target = acquire_target(
                self.pos,
                self.facing(),
                enemies,
                self.max_distance * ACQUIRE_RANGE_FACTOR,
            );
        }
        let target_center = self
            .target
            .and_then(|id| enemies.iter().find(|e| e.id == id))
            .map(|e| e.center());

        let dir = match target_center {
            Some(tc) => {
                let toward = (tc - self.pos).normalize_or_zero();
                (toward * f.homing_weight + self.heading * (1.0 - f.homing_weight))
                    .normalize_or(self.heading)
            }
            None => self.heading,
        };
        self.vel = dir * self.speed;

        let step = self.vel * frame_multiplier(dt);
        let next = self.pos + step;
        if first_overlap(&self.bounds_at(next), platforms).is_some() {
            self.detonate(tuning);
            self.blast(enemies, player, tuning, events);
            return;
        }
        self.pos = next;
        self.distance_traveled += step.length();

        let hit_target =
            target_center.is_some_and(|tc| self.pos.distance(tc) < f.target_hit_distance);
        let bounds = self.rect();
        let hit_enemy = enemies
            .iter()
            .any(|e| e.alive && aabb_overlap(&bounds, &e.rect()));

        if hit_target || hit_enemy || self.distance_traveled >= self.max_distance {
            self.detonate(tuning);
            self.blast(enemies, player, tuning, events);
        }
    }

    /// Area damage to every enemy in radius; self-damage and knockback to the player
    fn blast(
        &mut self,
        enemies: &mut [Enemy],
        player: &mut Player,
        tuning: &Tuning,
        events: &mut dyn EventSink,
    ) {
        self.blast_pending = false;
        let f = &tuning.fireball;
        events.effect(EffectKind::Explosion, self.pos.x, self.pos.y);

        for enemy in enemies.iter_mut().filter(|e| e.alive) {
            if enemy.center().distance(self.pos) < f.explosion_radius {
                enemy.take_damage(self.damage);
            }
        }

        if player.alive && player.center().distance(self.pos) < f.explosion_radius {
            player.apply_blast(f.self_damage, self.pos, f.explosion_knockback, tuning, events);
        }
    }
}

/// Nearest living enemy ahead of `facing` within `range`
pub fn acquire_target(origin: Vec2, facing: Facing, enemies: &[Enemy], range: f32) -> Option<u32> {
    enemies
        .iter()
        .filter(|e| e.alive)
        .filter(|e| (e.center().x - origin.x) * facing.sign() > 0.0)
        .map(|e| (e.id, e.center().distance(origin)))
        .filter(|(_, d)| *d <= range)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(id, _)| id)
}
