//! Enemy archetypes and their behavior state machines
//!
//! All enemies share a `Body` and combat stats. What diverges lives in
//! `Behavior`: patrol bounds, chase state, or the sentry's charge cycle.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::body::{Body, Facing};
use super::collision::line_of_sight_clear;
use super::events::{EffectKind, EventSink};
use super::rect::Rect;
use super::timers::Countdown;
use crate::tuning::{EnemyStats, Tuning};

/// Archetype tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnemyKind {
    /// Walks back and forth, ignores the player
    Patrol,
    /// Patrols until the player comes close, then runs at them
    Chaser,
    /// Stationary; charges and fires a ray when it can see the player
    Sentry,
}

impl EnemyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnemyKind::Patrol => "patrol",
            EnemyKind::Chaser => "chaser",
            EnemyKind::Sentry => "sentry",
        }
    }

    /// Whether the archetype walks between patrol bounds
    pub fn patrols(&self) -> bool {
        matches!(self, EnemyKind::Patrol | EnemyKind::Chaser)
    }

    pub fn stats<'a>(&self, tuning: &'a Tuning) -> &'a EnemyStats {
        match self {
            EnemyKind::Patrol => &tuning.patrol,
            EnemyKind::Chaser => &tuning.chaser.stats,
            EnemyKind::Sentry => &tuning.sentry.stats,
        }
    }
}

/// Horizontal range an enemy walks within
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PatrolBounds {
    pub left: f32,
    pub right: f32,
}

impl PatrolBounds {
    /// Turn around at either bound; the right bound applies to the body's far edge
    fn bounce(&self, body: &mut Body) {
        if body.pos.x <= self.left {
            body.facing = Facing::Right;
        } else if body.pos.x >= self.right - body.size.x {
            body.facing = Facing::Left;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ChaserState {
    #[default]
    Patrolling,
    Chasing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SentryState {
    #[default]
    Idle,
    Charging,
    Attacking,
    Cooldown,
}

/// Sentry perception and charge cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sentry {
    pub state: SentryState,
    /// Charge time while charging, cooldown while cooling down
    pub timer: Countdown,
    /// Player center captured when the charge completed
    pub locked_target: Option<Vec2>,
    detection_range: f32,
    charge_time: f32,
    cooldown: f32,
    abort_margin: f32,
    hit_threshold: f32,
}

impl Sentry {
    fn new(tuning: &Tuning) -> Self {
        let s = &tuning.sentry;
        Self {
            state: SentryState::Idle,
            timer: Countdown::ZERO,
            locked_target: None,
            detection_range: s.stats.detection_range,
            charge_time: s.charge_time,
            cooldown: s.cooldown,
            abort_margin: s.abort_margin,
            hit_threshold: s.hit_threshold,
        }
    }

    fn reset(&mut self) {
        self.state = SentryState::Idle;
        self.timer.clear();
        self.locked_target = None;
    }

    /// Advance the charge cycle; returns true on the step the ray lands on the player
    fn update(
        &mut self,
        dt: f32,
        body: &mut Body,
        target: &Target,
        platforms: &[Rect],
        events: &mut dyn EventSink,
    ) -> bool {
        let eye = body.center();
        let distance = eye.distance(target.center);

        match self.state {
            SentryState::Idle => {
                if target.alive
                    && distance < self.detection_range
                    && line_of_sight_clear(eye, target.center, platforms)
                {
                    self.state = SentryState::Charging;
                    self.timer.arm(self.charge_time);
                    body.facing = Facing::toward(eye.x, target.center.x);
                    events.effect(EffectKind::SentryCharge, eye.x, eye.y);
                }
                false
            }
            SentryState::Charging => {
                let aborted = !target.alive
                    || distance > self.detection_range * self.abort_margin
                    || !line_of_sight_clear(eye, target.center, platforms);
                if aborted {
                    log::debug!("Sentry charge aborted");
                    self.reset();
                    return false;
                }

                body.facing = Facing::toward(eye.x, target.center.x);
                if self.timer.tick(dt) {
                    self.locked_target = Some(target.center);
                    self.state = SentryState::Attacking;
                    events.effect(EffectKind::Ray, target.center.x, target.center.y);
                }
                false
            }
            SentryState::Attacking => {
                let hit = match self.locked_target.take() {
                    Some(locked) => {
                        target.alive
                            && target.center.distance(locked) < self.hit_threshold
                            && line_of_sight_clear(eye, target.center, platforms)
                    }
                    None => false,
                };
                self.state = SentryState::Cooldown;
                self.timer.arm(self.cooldown);
                hit
            }
            SentryState::Cooldown => {
                if self.timer.tick(dt) {
                    self.state = SentryState::Idle;
                }
                false
            }
        }
    }
}

/// Per-archetype state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Behavior {
    Patrol {
        bounds: PatrolBounds,
    },
    Chaser {
        bounds: PatrolBounds,
        state: ChaserState,
        detection_range: f32,
        chase_multiplier: f32,
    },
    Sentry(Sentry),
}

/// What an enemy perceives of the player
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Target {
    pub center: Vec2,
    pub alive: bool,
}

/// Damage an enemy landed on the player this step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Strike {
    pub damage: i32,
    pub source_x: f32,
}

/// Gravity applied to enemies
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnemyPhysics {
    pub gravity: f32,
    pub max_fall_speed: f32,
}

impl EnemyPhysics {
    pub fn from_tuning(tuning: &Tuning) -> Self {
        Self {
            gravity: tuning.player.gravity * tuning.enemy_gravity_factor,
            max_fall_speed: tuning.player.max_fall_speed,
        }
    }
}

/// An enemy entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enemy {
    pub id: u32,
    pub kind: EnemyKind,
    pub body: Body,
    pub health: i32,
    pub max_health: i32,
    pub damage: i32,
    pub speed: f32,
    /// Experience granted on death
    pub experience: u32,
    pub alive: bool,
    /// Blocks a second melee hit from the same swing
    pub hit_debounce: Countdown,
    pub behavior: Behavior,
    spawn: Vec2,
    /// Death noticed but experience not yet handed out
    drop_pending: bool,
}

impl Enemy {
    pub fn new(
        id: u32,
        kind: EnemyKind,
        pos: Vec2,
        bounds: Option<PatrolBounds>,
        tuning: &Tuning,
    ) -> Self {
        let stats = kind.stats(tuning);
        let size = Vec2::new(stats.width, stats.height);
        let bounds = bounds.unwrap_or(PatrolBounds {
            left: pos.x,
            right: pos.x + size.x,
        });
        let behavior = match kind {
            EnemyKind::Patrol => Behavior::Patrol { bounds },
            EnemyKind::Chaser => Behavior::Chaser {
                bounds,
                state: ChaserState::Patrolling,
                detection_range: stats.detection_range,
                chase_multiplier: tuning.chaser.chase_multiplier,
            },
            EnemyKind::Sentry => Behavior::Sentry(Sentry::new(tuning)),
        };

        Self {
            id,
            kind,
            body: Body::new(pos, size),
            health: stats.health,
            max_health: stats.health,
            damage: stats.damage,
            speed: stats.speed,
            experience: stats.experience,
            alive: true,
            hit_debounce: Countdown::ZERO,
            behavior,
            spawn: pos,
            drop_pending: false,
        }
    }

    #[inline]
    pub fn rect(&self) -> Rect {
        self.body.rect()
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.body.center()
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    pub fn chaser_state(&self) -> Option<ChaserState> {
        match &self.behavior {
            Behavior::Chaser { state, .. } => Some(*state),
            _ => None,
        }
    }

    pub fn sentry(&self) -> Option<&Sentry> {
        match &self.behavior {
            Behavior::Sentry(sentry) => Some(sentry),
            _ => None,
        }
    }

    /// Advance AI and motion by one step; returns a strike if the enemy hit the player
    pub fn tick(
        &mut self,
        dt: f32,
        platforms: &[Rect],
        target: &Target,
        physics: EnemyPhysics,
        events: &mut dyn EventSink,
    ) -> Option<Strike> {
        if !self.alive {
            return None;
        }

        self.hit_debounce.tick(dt);

        let mut struck = false;
        match &mut self.behavior {
            Behavior::Patrol { bounds } => {
                bounds.bounce(&mut self.body);
                self.body.vel.x = self.speed * self.body.facing.sign();
            }
            Behavior::Chaser {
                bounds,
                state,
                detection_range,
                chase_multiplier,
            } => {
                let center = self.body.center();
                let distance = center.distance(target.center);
                if target.alive && distance < *detection_range {
                    *state = ChaserState::Chasing;
                    self.body.facing = Facing::toward(center.x, target.center.x);
                } else {
                    *state = ChaserState::Patrolling;
                    bounds.bounce(&mut self.body);
                }
                let multiplier = match state {
                    ChaserState::Chasing => *chase_multiplier,
                    ChaserState::Patrolling => 1.0,
                };
                self.body.vel.x = self.speed * self.body.facing.sign() * multiplier;
            }
            Behavior::Sentry(sentry) => {
                self.body.vel.x = 0.0;
                struck = sentry.update(dt, &mut self.body, target, platforms, events);
            }
        }

        self.body
            .apply_gravity(dt, physics.gravity, physics.max_fall_speed);
        let contacts = self.body.move_and_collide(dt, platforms);
        if contacts.wall && self.kind.patrols() {
            self.body.facing = self.body.facing.flipped();
        }

        struck.then(|| Strike {
            damage: self.damage,
            source_x: self.body.center().x,
        })
    }

    /// Apply damage; returns true if this hit killed the enemy
    pub fn take_damage(&mut self, amount: i32) -> bool {
        if !self.alive {
            return false;
        }
        self.health = (self.health - amount.max(0)).max(0);
        if self.health == 0 {
            self.alive = false;
            self.drop_pending = true;
            log::debug!("Enemy {} ({}) died", self.id, self.kind.as_str());
            return true;
        }
        false
    }

    /// Experience owed for a death, handed out exactly once
    pub fn take_drop(&mut self) -> Option<u32> {
        if self.drop_pending {
            self.drop_pending = false;
            Some(self.experience)
        } else {
            None
        }
    }

    /// Back to the spawn state for a level reset
    pub fn reset(&mut self) {
        self.alive = true;
        self.health = self.max_health;
        self.body.pos = self.spawn;
        self.body.vel = Vec2::ZERO;
        self.body.grounded = false;
        self.body.facing = Facing::Right;
        self.hit_debounce.clear();
        self.drop_pending = false;
        match &mut self.behavior {
            Behavior::Chaser { state, .. } => *state = ChaserState::Patrolling,
            Behavior::Sentry(sentry) => sentry.reset(),
            Behavior::Patrol { .. } => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::NOMINAL_DT;
    use crate::sim::events::NullSink;

    fn floor() -> Vec<Rect> {
        vec![Rect::new(0.0, 1100.0, 2000.0, 100.0)]
    }

    fn settle(enemy: &mut Enemy, platforms: &[Rect], target: &Target, tuning: &Tuning) {
        for _ in 0..30 {
            enemy.tick(
                NOMINAL_DT,
                platforms,
                target,
                EnemyPhysics::from_tuning(tuning),
                &mut NullSink,
            );
        }
    }

    fn far_target() -> Target {
        Target {
            center: Vec2::new(10_000.0, 1075.0),
            alive: true,
        }
    }

    #[test]
    fn test_patrol_turns_at_bounds() {
        let tuning = Tuning::default();
        let platforms = floor();
        let bounds = PatrolBounds {
            left: 300.0,
            right: 500.0,
        };
        let mut enemy = Enemy::new(1, EnemyKind::Patrol, Vec2::new(400.0, 1060.0), Some(bounds), &tuning);

        let mut min_x = f32::MAX;
        let mut max_x = f32::MIN;
        for _ in 0..600 {
            enemy.tick(
                NOMINAL_DT,
                &platforms,
                &far_target(),
                EnemyPhysics::from_tuning(&tuning),
                &mut NullSink,
            );
            min_x = min_x.min(enemy.body.pos.x);
            max_x = max_x.max(enemy.body.pos.x);
        }

        // Overshoot is at most one step of travel
        assert!(min_x >= bounds.left - tuning.patrol.speed - 0.01);
        assert!(max_x <= bounds.right - enemy.body.size.x + tuning.patrol.speed + 0.01);
        assert!(min_x < 320.0 && max_x > 440.0, "should cover the range");
        assert!(enemy.body.grounded);
    }

    #[test]
    fn test_chaser_detects_and_faces_player() {
        let tuning = Tuning::default();
        let platforms = floor();
        let bounds = PatrolBounds {
            left: 600.0,
            right: 1400.0,
        };
        let mut enemy = Enemy::new(1, EnemyKind::Chaser, Vec2::new(700.0, 1055.0), Some(bounds), &tuning);
        settle(&mut enemy, &platforms, &far_target(), &tuning);
        assert_eq!(enemy.chaser_state(), Some(ChaserState::Patrolling));

        // Player to the left, within range
        let target = Target {
            center: enemy.center() - Vec2::new(100.0, 0.0),
            alive: true,
        };
        enemy.tick(
            NOMINAL_DT,
            &platforms,
            &target,
            EnemyPhysics::from_tuning(&tuning),
            &mut NullSink,
        );
        assert_eq!(enemy.chaser_state(), Some(ChaserState::Chasing));
        assert!(enemy.body.vel.x < 0.0);
        assert!(
            (enemy.body.vel.x.abs() - tuning.chaser.stats.speed * tuning.chaser.chase_multiplier)
                .abs()
                < 1e-5
        );
    }

    #[test]
    fn test_chaser_ignores_dead_player() {
        let tuning = Tuning::default();
        let platforms = floor();
        let mut enemy = Enemy::new(
            1,
            EnemyKind::Chaser,
            Vec2::new(700.0, 1055.0),
            Some(PatrolBounds {
                left: 600.0,
                right: 1400.0,
            }),
            &tuning,
        );
        let target = Target {
            center: enemy.center() + Vec2::new(50.0, 0.0),
            alive: false,
        };
        enemy.tick(
            NOMINAL_DT,
            &platforms,
            &target,
            EnemyPhysics::from_tuning(&tuning),
            &mut NullSink,
        );
        assert_eq!(enemy.chaser_state(), Some(ChaserState::Patrolling));
    }

    #[test]
    fn test_sentry_full_cycle_hits_stationary_player() {
        let tuning = Tuning::default();
        let platforms = floor();
        let mut enemy = Enemy::new(1, EnemyKind::Sentry, Vec2::new(600.0, 1050.0), None, &tuning);
        let target = Target {
            center: Vec2::new(400.0, 1075.0),
            alive: true,
        };
        let physics = EnemyPhysics::from_tuning(&tuning);

        enemy.tick(NOMINAL_DT, &platforms, &target, physics, &mut NullSink);
        assert_eq!(enemy.sentry().unwrap().state, SentryState::Charging);
        assert_eq!(enemy.body.facing, Facing::Left);

        let mut strikes = 0;
        let mut saw_attacking = false;
        for _ in 0..60 {
            if enemy
                .tick(NOMINAL_DT, &platforms, &target, physics, &mut NullSink)
                .is_some()
            {
                strikes += 1;
            }
            if enemy.sentry().unwrap().state == SentryState::Attacking {
                saw_attacking = true;
            }
        }
        assert!(saw_attacking);
        assert_eq!(strikes, 1);
        assert_eq!(enemy.sentry().unwrap().state, SentryState::Cooldown);
    }

    #[test]
    fn test_sentry_ray_misses_after_dodge() {
        let tuning = Tuning::default();
        let platforms = floor();
        let physics = EnemyPhysics::from_tuning(&tuning);
        let mut enemy = Enemy::new(1, EnemyKind::Sentry, Vec2::new(600.0, 1050.0), None, &tuning);
        let mut target = Target {
            center: Vec2::new(400.0, 1075.0),
            alive: true,
        };

        while enemy.sentry().unwrap().state != SentryState::Attacking {
            assert!(enemy.tick(NOMINAL_DT, &platforms, &target, physics, &mut NullSink).is_none());
        }
        // Locked point stays where the player was
        target.center.x -= 100.0;
        assert!(enemy.tick(NOMINAL_DT, &platforms, &target, physics, &mut NullSink).is_none());
        assert_eq!(enemy.sentry().unwrap().state, SentryState::Cooldown);
    }

    #[test]
    fn test_sentry_ray_blocked_by_cover_after_lock() {
        let tuning = Tuning::default();
        let physics = EnemyPhysics::from_tuning(&tuning);
        let mut enemy = Enemy::new(1, EnemyKind::Sentry, Vec2::new(600.0, 1050.0), None, &tuning);
        let target = Target {
            center: Vec2::new(400.0, 1075.0),
            alive: true,
        };

        let open = floor();
        while enemy.sentry().unwrap().state != SentryState::Attacking {
            enemy.tick(NOMINAL_DT, &open, &target, physics, &mut NullSink);
        }
        // Player has not moved, but a wall now stands between them
        let mut covered = open.clone();
        covered.push(Rect::new(500.0, 950.0, 20.0, 150.0));
        assert!(enemy.tick(NOMINAL_DT, &covered, &target, physics, &mut NullSink).is_none());
        assert_eq!(enemy.sentry().unwrap().state, SentryState::Cooldown);
    }

    #[test]
    fn test_sentry_cooldown_returns_to_idle() {
        let tuning = Tuning::default();
        let platforms = floor();
        let physics = EnemyPhysics::from_tuning(&tuning);
        let mut enemy = Enemy::new(1, EnemyKind::Sentry, Vec2::new(600.0, 1050.0), None, &tuning);
        let target = Target {
            center: Vec2::new(400.0, 1075.0),
            alive: true,
        };
        while enemy.sentry().unwrap().state != SentryState::Cooldown {
            enemy.tick(NOMINAL_DT, &platforms, &target, physics, &mut NullSink);
        }
        let dead = Target {
            alive: false,
            ..target
        };
        let ticks = (tuning.sentry.cooldown / NOMINAL_DT).ceil() as usize + 1;
        for _ in 0..ticks {
            enemy.tick(NOMINAL_DT, &platforms, &dead, physics, &mut NullSink);
        }
        assert_eq!(enemy.sentry().unwrap().state, SentryState::Idle);
    }

    #[test]
    fn test_death_drops_experience_once() {
        let tuning = Tuning::default();
        let mut enemy = Enemy::new(7, EnemyKind::Chaser, Vec2::ZERO, None, &tuning);
        assert!(!enemy.take_damage(3));
        assert!(enemy.take_damage(3));
        assert_eq!(enemy.health, 0);
        assert!(!enemy.take_damage(3));
        assert_eq!(enemy.take_drop(), Some(tuning.chaser.stats.experience));
        assert_eq!(enemy.take_drop(), None);
    }

    #[test]
    fn test_reset_restores_spawn() {
        let tuning = Tuning::default();
        let mut enemy = Enemy::new(1, EnemyKind::Patrol, Vec2::new(50.0, 60.0), None, &tuning);
        enemy.body.pos = Vec2::new(500.0, 500.0);
        enemy.take_damage(99);
        enemy.reset();
        assert!(enemy.alive);
        assert_eq!(enemy.health, enemy.max_health);
        assert_eq!(enemy.body.pos, Vec2::new(50.0, 60.0));
        assert_eq!(enemy.take_drop(), None);
    }
}
