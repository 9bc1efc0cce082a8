//! Player controller: movement, jumping, melee and fireball attacks,
//! damage response, leveling and interaction range.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::body::{Body, Facing};
use super::collision::aabb_overlap;
use super::enemy::Enemy;
use super::events::{EffectKind, EventSink, GameEvent};
use super::rect::Rect;
use super::session::{Ability, Session};
use super::tick::TickInput;
use super::timers::PlayerTimers;
use crate::frame_multiplier;
use crate::tuning::Tuning;

/// Request to spawn a fireball, produced by a fireball press
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FireballShot {
    /// Spawn center, already offset past the body edge
    pub center: Vec2,
    pub facing: Facing,
    pub damage: i32,
}

/// Discrete actions taken on this step's button edges
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Actions {
    pub fireball: Option<FireballShot>,
    /// Index of the nearest interactable in range when interact was pressed
    pub interact: Option<usize>,
}

/// The player character
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub body: Body,
    pub health: i32,
    pub max_health: i32,
    pub experience: u32,
    pub level: u32,
    pub alive: bool,
    pub timers: PlayerTimers,
    /// Double jump still available this airborne period
    pub has_double_jump: bool,
    /// Current swing started in the air
    pub air_attacking: bool,
    /// Facing locked when the swing started
    pub attack_facing: Facing,
    /// Interactable indices within reach, nearest first
    pub nearby: Vec<usize>,
    /// Buttons held last step, for edge detection
    prev_input: TickInput,
    /// Horizontal buttons held this step
    held: TickInput,
}

impl Player {
    pub fn new(spawn: Vec2, tuning: &Tuning) -> Self {
        let p = &tuning.player;
        Self {
            body: Body::new(spawn, Vec2::new(p.width, p.height)),
            health: p.max_health,
            max_health: p.max_health,
            experience: 0,
            level: 1,
            alive: true,
            timers: PlayerTimers::default(),
            has_double_jump: false,
            air_attacking: false,
            attack_facing: Facing::Right,
            nearby: Vec::new(),
            prev_input: TickInput::default(),
            held: TickInput::default(),
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

    #[inline]
    pub fn is_attacking(&self) -> bool {
        self.timers.is_attacking()
    }

    #[inline]
    pub fn is_stunned(&self) -> bool {
        self.timers.is_stunned()
    }

    #[inline]
    pub fn is_invincible(&self) -> bool {
        self.timers.is_invincible()
    }

    /// Melee hitbox in front of the body, in the facing locked at swing start
    pub fn attack_box(&self, tuning: &Tuning) -> Rect {
        let p = &tuning.player;
        let x = match self.attack_facing {
            Facing::Right => self.body.pos.x + self.body.size.x,
            Facing::Left => self.body.pos.x - p.attack_width,
        };
        let y = self.body.pos.y + (self.body.size.y - p.attack_height) / 2.0;
        Rect::new(x, y, p.attack_width, p.attack_height)
    }

    fn level_bonus(&self, tuning: &Tuning) -> i32 {
        (self.level.saturating_sub(1) as i32) * tuning.progression.damage_per_level
    }

    pub fn melee_damage(&self, tuning: &Tuning) -> i32 {
        tuning.player.attack_damage + self.level_bonus(tuning)
    }

    pub fn fireball_damage(&self, tuning: &Tuning) -> i32 {
        tuning.fireball.damage + self.level_bonus(tuning)
    }

    /// Process button edges; movement buttons are read by `tick`
    pub fn handle_input(
        &mut self,
        input: &TickInput,
        tuning: &Tuning,
        events: &mut dyn EventSink,
    ) -> Actions {
        let pressed = input.pressed_since(&self.prev_input);
        self.prev_input = *input;
        self.held = *input;

        let mut actions = Actions::default();
        if !self.alive {
            return actions;
        }

        if pressed.jump {
            self.jump(tuning);
        }
        if pressed.attack {
            self.attack(tuning, events);
        }
        if pressed.fireball {
            actions.fireball = self.cast_fireball(tuning, events);
        }
        if pressed.interact {
            actions.interact = self.nearby.first().copied();
        }
        actions
    }

    /// Ground/coyote jump, falling back to the double jump
    pub fn jump(&mut self, tuning: &Tuning) -> bool {
        if self.is_stunned() || self.is_attacking() {
            return false;
        }

        if self.body.grounded || self.timers.coyote.is_active() {
            self.body.vel.y = tuning.player.jump_force;
            self.body.grounded = false;
            self.timers.coyote.clear();
            true
        } else if self.has_double_jump {
            self.body.vel.y = tuning.player.double_jump_force;
            self.has_double_jump = false;
            true
        } else {
            false
        }
    }

    /// Start a melee swing
    pub fn attack(&mut self, tuning: &Tuning, events: &mut dyn EventSink) -> bool {
        if self.timers.attack_cooldown.is_active() || self.is_stunned() {
            return false;
        }

        let p = &tuning.player;
        self.timers.attack_duration.arm(p.attack_duration);
        self.timers.attack_cooldown.arm(p.attack_cooldown);
        self.attack_facing = self.body.facing;
        if self.body.grounded {
            self.body.vel.x = 0.0;
        } else {
            self.air_attacking = true;
        }

        let center = self.attack_box(tuning).center();
        events.effect(EffectKind::Slash, center.x, center.y);
        true
    }

    fn cast_fireball(&mut self, tuning: &Tuning, events: &mut dyn EventSink) -> Option<FireballShot> {
        if self.timers.fireball_cooldown.is_active() || self.is_stunned() {
            return None;
        }
        self.timers.fireball_cooldown.arm(tuning.player.fireball_cooldown);

        let offset = tuning.player.fireball_spawn_offset + tuning.fireball.radius;
        let facing = self.body.facing;
        let x = match facing {
            Facing::Right => self.body.pos.x + self.body.size.x + offset,
            Facing::Left => self.body.pos.x - offset,
        };
        let center = Vec2::new(x, self.center().y);
        events.effect(EffectKind::FireballLaunch, center.x, center.y);

        Some(FireballShot {
            center,
            facing,
            damage: self.fireball_damage(tuning),
        })
    }

    /// Advance one step: timers, movement, collision, melee hits, interaction scan
    #[allow(clippy::too_many_arguments)]
    pub fn tick(
        &mut self,
        dt: f32,
        platforms: &[Rect],
        enemies: &mut [Enemy],
        interactables: &[Vec2],
        session: &Session,
        tuning: &Tuning,
        events: &mut dyn EventSink,
    ) {
        if !self.alive {
            return;
        }
        let p = &tuning.player;

        let expired = self.timers.tick(dt);
        if expired.attack {
            self.air_attacking = false;
            self.timers.attack_stun.arm(p.attack_stun_duration);
        }

        if self.is_stunned() {
            self.body.apply_gravity(dt, p.gravity, p.max_fall_speed);
            self.body.move_and_collide(dt, platforms);
            return;
        }

        if !self.is_attacking() {
            self.handle_movement(dt, tuning);
        }
        self.body.apply_gravity(dt, p.gravity, p.max_fall_speed);

        self.timers.update_coyote(self.body.grounded, p.coyote_time, dt);
        if self.body.grounded {
            self.has_double_jump = session.has(Ability::DoubleJump);
        }

        self.body.move_and_collide(dt, platforms);

        if self.is_attacking() {
            self.check_attack_hits(enemies, session, tuning, events);
        }

        self.scan_interactables(interactables, tuning.interaction.interact_radius);
    }

    fn handle_movement(&mut self, dt: f32, tuning: &Tuning) {
        let p = &tuning.player;
        let frames = frame_multiplier(dt);
        let (accel, decel) = if self.body.grounded {
            (p.move_acceleration, p.move_deceleration)
        } else {
            (p.air_move_acceleration, p.air_move_deceleration)
        };

        let vx = &mut self.body.vel.x;
        if self.held.move_left {
            *vx -= accel * frames;
            self.body.facing = Facing::Left;
        } else if self.held.move_right {
            *vx += accel * frames;
            self.body.facing = Facing::Right;
        } else if *vx > 0.0 {
            *vx = (*vx - decel * frames).max(0.0);
        } else if *vx < 0.0 {
            *vx = (*vx + decel * frames).min(0.0);
        }
        *vx = vx.clamp(-p.max_speed, p.max_speed);
    }

    fn check_attack_hits(
        &mut self,
        enemies: &mut [Enemy],
        session: &Session,
        tuning: &Tuning,
        events: &mut dyn EventSink,
    ) {
        let hitbox = self.attack_box(tuning);
        let damage = self.melee_damage(tuning);
        // Outlast the rest of the swing so one swing hits each enemy once
        let debounce = tuning
            .player
            .hit_debounce
            .max(self.timers.attack_duration.remaining());

        for enemy in enemies.iter_mut() {
            if !enemy.alive || enemy.hit_debounce.is_active() {
                continue;
            }
            if !aabb_overlap(&hitbox, &enemy.rect()) {
                continue;
            }

            enemy.take_damage(damage);
            enemy.hit_debounce.arm(debounce);
            let c = enemy.center();
            events.effect(EffectKind::Hit, c.x, c.y);

            if self.air_attacking && self.body.vel.y > 0.0 {
                self.body.vel.y = tuning.player.pogo_bounce_force;
                self.has_double_jump = session.has(Ability::DoubleJump);
            }
        }
    }

    /// Refresh the nearest-first list of interactables within `radius`
    pub fn scan_interactables(&mut self, centers: &[Vec2], radius: f32) {
        let me = self.center();
        let mut in_range: Vec<(usize, f32)> = centers
            .iter()
            .enumerate()
            .map(|(i, c)| (i, me.distance(*c)))
            .filter(|(_, d)| *d <= radius)
            .collect();
        in_range.sort_by(|a, b| a.1.total_cmp(&b.1));
        self.nearby = in_range.into_iter().map(|(i, _)| i).collect();
    }

    /// Contact damage from overlapping living enemies
    pub fn check_enemy_contact(
        &mut self,
        enemies: &[Enemy],
        tuning: &Tuning,
        events: &mut dyn EventSink,
    ) {
        for enemy in enemies {
            if self.is_invincible() || !self.alive {
                return;
            }
            if enemy.alive && aabb_overlap(&self.rect(), &enemy.rect()) {
                self.take_damage(enemy.damage, enemy.center().x, tuning, events);
            }
        }
    }

    /// Apply a hit; ignored while dead or invincible. Returns true if it landed.
    pub fn take_damage(
        &mut self,
        amount: i32,
        source_x: f32,
        tuning: &Tuning,
        events: &mut dyn EventSink,
    ) -> bool {
        if !self.alive || self.is_invincible() {
            return false;
        }
        let p = &tuning.player;

        self.health = (self.health - amount.max(0)).max(0);
        self.timers.invincible.arm(p.hit_invincible_time);
        self.timers.damage_stun.arm(p.hit_stun_time);

        self.body.vel.x = self.away_from(source_x) * p.hit_knockback;
        self.body.vel.y = p.jump_force * 0.5;

        let c = self.center();
        events.effect(EffectKind::PlayerHurt, c.x, c.y);
        events.emit(GameEvent::HealthChanged {
            health: self.health,
            max_health: self.max_health,
        });

        if self.health == 0 {
            self.alive = false;
            log::info!("Player died");
            events.emit(GameEvent::Death);
        }
        true
    }

    /// Explosion on the player: damage unless invincible, knockback always
    pub fn apply_blast(
        &mut self,
        damage: i32,
        origin: Vec2,
        knockback: f32,
        tuning: &Tuning,
        events: &mut dyn EventSink,
    ) {
        if !self.alive {
            return;
        }
        self.take_damage(damage, origin.x, tuning, events);
        self.body.vel.x = self.away_from(origin.x) * knockback;
        self.body.vel.y = -knockback * 0.5;
    }

    /// +1 when the source is left of the body center, else -1
    fn away_from(&self, source_x: f32) -> f32 {
        if source_x < self.center().x { 1.0 } else { -1.0 }
    }

    /// Grant experience and apply every level-up it pays for
    pub fn add_experience(&mut self, amount: u32, tuning: &Tuning, events: &mut dyn EventSink) {
        self.experience = self.experience.saturating_add(amount);

        let prog = &tuning.progression;
        while self.level < prog.max_level {
            match prog.exp_per_level.get(self.level as usize) {
                Some(&required) if self.experience >= required => {
                    self.level += 1;
                    log::info!("Level up: {}", self.level);
                    events.emit(GameEvent::LevelUp { level: self.level });
                }
                _ => break,
            }
        }

        events.emit(GameEvent::ExperienceChanged {
            experience: self.experience,
            level: self.level,
        });
    }

    /// (experience into the current level, experience the level spans);
    /// the span is 0 at max level
    pub fn level_progress(&self, tuning: &Tuning) -> (u32, u32) {
        let thresholds = &tuning.progression.exp_per_level;
        let floor = thresholds
            .get(self.level.saturating_sub(1) as usize)
            .copied()
            .unwrap_or(0);
        let into = self.experience.saturating_sub(floor);
        if self.level >= tuning.progression.max_level {
            return (into, 0);
        }
        match thresholds.get(self.level as usize) {
            Some(&next) => (into, next.saturating_sub(floor)),
            None => (into, 0),
        }
    }

    /// Restore at `point` with full health and cleared timers
    pub fn respawn(&mut self, point: Vec2, session: &Session, events: &mut dyn EventSink) {
        self.body.pos = point;
        self.body.vel = Vec2::ZERO;
        self.body.grounded = false;
        self.health = self.max_health;
        self.alive = true;
        self.timers.reset();
        self.air_attacking = false;
        self.has_double_jump = session.has(Ability::DoubleJump);
        self.nearby.clear();
        events.emit(GameEvent::HealthChanged {
            health: self.health,
            max_health: self.max_health,
        });
    }
}
