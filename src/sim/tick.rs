//! Fixed-order world step
//!
//! One call advances every entity exactly once, in this order: player,
//! enemies, fireballs, pickups and interaction, then enemy-to-player damage.

use serde::{Deserialize, Serialize};

use super::enemy::{EnemyPhysics, Target};
use super::events::{EffectKind, EventSink, GameEvent};
use super::interact::{Interactable, interactables};
use super::pickup::ExperienceOrb;
use super::player::Actions;
use super::projectile::Fireball;
use super::state::{GamePhase, World};
use crate::clamp_dt;

/// Buttons held during a single step
///
/// Actions fire on the press edge; movement follows the held state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickInput {
    pub move_left: bool,
    pub move_right: bool,
    pub jump: bool,
    pub attack: bool,
    pub fireball: bool,
    pub interact: bool,
}

impl TickInput {
    /// Buttons down now that were up in `prev`
    pub fn pressed_since(&self, prev: &TickInput) -> TickInput {
        TickInput {
            move_left: self.move_left && !prev.move_left,
            move_right: self.move_right && !prev.move_right,
            jump: self.jump && !prev.jump,
            attack: self.attack && !prev.attack,
            fireball: self.fireball && !prev.fireball,
            interact: self.interact && !prev.interact,
        }
    }
}

impl World {
    /// Advance the world by one step of `dt` seconds (clamped)
    pub fn step(&mut self, input: &TickInput, dt: f32) {
        if self.phase != GamePhase::Playing {
            return;
        }
        let dt = clamp_dt(dt);
        self.time_ticks += 1;

        let (refs, centers) = interactables(&self.doors, &self.save_points);

        // 1. Player, including melee hits
        let before = self.player.clone();
        let actions = self.player.handle_input(input, &self.tuning, &mut self.events);
        self.player.tick(
            dt,
            &self.platforms,
            &mut self.enemies,
            &centers,
            &self.session,
            &self.tuning,
            &mut self.events,
        );
        if !self.player.body.is_finite() {
            log::warn!("Player state went non-finite at tick {}; reverting", self.time_ticks);
            self.player = before;
        }
        if let Some(shot) = actions.fireball {
            let id = self.next_entity_id();
            self.fireballs.push(Fireball::launch(
                id,
                &shot,
                &self.enemies,
                &self.platforms,
                &self.tuning,
            ));
        }

        // 2. Enemies, each isolated
        let target = Target {
            center: self.player.center(),
            alive: self.player.alive,
        };
        let physics = EnemyPhysics::from_tuning(&self.tuning);
        let mut strikes = Vec::new();
        for enemy in &mut self.enemies {
            let before = enemy.clone();
            let strike = enemy.tick(dt, &self.platforms, &target, physics, &mut self.events);
            if !enemy.body.is_finite() {
                log::warn!("Enemy {} went non-finite; skipped this tick", enemy.id);
                *enemy = before;
                continue;
            }
            strikes.extend(strike);
        }

        // 3. Fireballs
        for fireball in &mut self.fireballs {
            fireball.tick(
                dt,
                &self.platforms,
                &mut self.enemies,
                &mut self.player,
                &self.tuning,
                &mut self.events,
            );
            if !fireball.pos.is_finite() {
                log::warn!("Fireball {} went non-finite; discarded", fireball.id);
                fireball.active = false;
            }
        }
        self.fireballs.retain(|f| f.active);

        // 4. Drops, pickups, doors, interaction
        self.spawn_drops();
        self.update_pickups(dt);
        for door in &mut self.doors {
            door.update(&self.session);
        }
        self.interact(&actions, &refs);

        // 5. Enemy attacks and contact damage
        for strike in strikes {
            self.player
                .take_damage(strike.damage, strike.source_x, &self.tuning, &mut self.events);
        }
        self.player
            .check_enemy_contact(&self.enemies, &self.tuning, &mut self.events);

        if !self.player.alive && self.phase == GamePhase::Playing {
            self.phase = GamePhase::Dead;
        }
    }

    /// Turn fresh enemy deaths into experience orbs
    fn spawn_drops(&mut self) {
        for enemy in &mut self.enemies {
            let Some(amount) = enemy.take_drop() else {
                continue;
            };
            self.events.emit(GameEvent::EnemyKilled {
                id: enemy.id,
                kind: enemy.kind,
            });
            let mut rng = self.rng_state.next_rng();
            self.exp_orbs.push(ExperienceOrb::spawn(
                enemy.center(),
                amount,
                &mut rng,
                &self.tuning,
            ));
        }
    }

    fn update_pickups(&mut self, dt: f32) {
        if !self.player.alive {
            return;
        }
        let center = self.player.center();
        let reach = self.tuning.interaction.ability_orb_reach;

        for orb in &mut self.ability_orbs {
            if orb.in_reach(center, reach) {
                orb.collect(&mut self.session, &mut self.events);
            }
        }

        for orb in &mut self.exp_orbs {
            orb.tick(dt, self.player.center(), &self.platforms, &self.tuning);
            if let Some(amount) = orb.take_reward() {
                self.events.effect(EffectKind::OrbCollected, orb.pos.x, orb.pos.y);
                self.player
                    .add_experience(amount, &self.tuning, &mut self.events);
            }
        }
        self.exp_orbs.retain(|o| !o.is_done());
    }

    fn interact(&mut self, actions: &Actions, refs: &[Interactable]) {
        let Some(target) = actions.interact.and_then(|i| refs.get(i).copied()) else {
            return;
        };
        match target {
            Interactable::Door(i) => {
                if self.doors[i].open(&mut self.events) {
                    self.phase = GamePhase::Victory;
                }
            }
            Interactable::SavePoint(i) => {
                let save_point = &mut self.save_points[i];
                save_point.activate(&mut self.events);
                self.last_save = Some(save_point.pos);
            }
        }
    }

    /// Run `ticks` steps of `dt` with the same held input
    pub fn run(&mut self, input: &TickInput, dt: f32, ticks: usize) {
        for _ in 0..ticks {
            self.step(input, dt);
        }
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec2;

    use super::*;
    use crate::consts::NOMINAL_DT;
    use crate::sim::enemy::EnemyKind;
    use crate::sim::level::{LevelData, Point};
    use crate::sim::session::{Ability, Session};
    use crate::tuning::Tuning;

    fn world() -> World {
        World::new(
            LevelData::forgotten_crossroads(),
            Tuning::default(),
            Session::default(),
            99999,
        )
        .unwrap()
    }

    #[test]
    fn test_pressed_since() {
        let prev = TickInput {
            jump: true,
            ..Default::default()
        };
        let now = TickInput {
            jump: true,
            attack: true,
            ..Default::default()
        };
        let pressed = now.pressed_since(&prev);
        assert!(!pressed.jump);
        assert!(pressed.attack);
    }

    #[test]
    fn test_determinism() {
        let mut a = world();
        let mut b = world();
        let inputs = [
            TickInput {
                move_right: true,
                ..Default::default()
            },
            TickInput {
                move_right: true,
                jump: true,
                ..Default::default()
            },
            TickInput {
                fireball: true,
                ..Default::default()
            },
            TickInput {
                attack: true,
                move_left: true,
                ..Default::default()
            },
            TickInput::default(),
        ];
        for _ in 0..60 {
            for input in &inputs {
                a.step(input, NOMINAL_DT);
                b.step(input, NOMINAL_DT);
            }
        }
        assert_eq!(a, b);
        assert_eq!(a.drain_events(), b.drain_events());
    }

    #[test]
    fn test_player_falls_to_ground_from_spawn() {
        let mut world = world();
        world.run(&TickInput::default(), NOMINAL_DT, 180);
        assert!(world.player.body.grounded);
        assert_eq!(world.player.body.pos.y, 1050.0);
    }

    #[test]
    fn test_large_dt_is_clamped() {
        let mut a = world();
        let mut b = world();
        a.step(&TickInput::default(), 5.0);
        b.step(&TickInput::default(), crate::consts::MAX_DT);
        assert_eq!(a.player, b.player);
    }

    #[test]
    fn test_dead_world_stops() {
        let mut world = world();
        let tuning = world.tuning.clone();
        world
            .player
            .take_damage(99, 0.0, &tuning, &mut crate::sim::NullSink);
        world.step(&TickInput::default(), NOMINAL_DT);
        assert_eq!(world.phase, GamePhase::Dead);

        let ticks = world.time_ticks;
        world.step(&TickInput::default(), NOMINAL_DT);
        assert_eq!(world.time_ticks, ticks);

        world.respawn();
        assert_eq!(world.phase, GamePhase::Playing);
    }

    #[test]
    fn test_kill_drops_and_grants_experience() {
        let mut world = world();
        // Park the player next to a patrol enemy on the ground
        world.enemies.retain(|e| e.kind == EnemyKind::Patrol);
        let enemy = &mut world.enemies[0];
        enemy.body.pos = Vec2::new(300.0, 1060.0);
        let id = enemy.id;
        world.player.body.pos = Vec2::new(200.0, 1050.0);
        world.player.timers.invincible.arm(100.0);

        enemy_kill(&mut world, id);
        world.step(&TickInput::default(), NOMINAL_DT);

        let events = world.drain_events();
        assert!(events.contains(&GameEvent::EnemyKilled {
            id,
            kind: EnemyKind::Patrol
        }));
        assert_eq!(world.exp_orbs.len(), 1);

        world.run(&TickInput::default(), NOMINAL_DT, 120);
        assert_eq!(world.player.experience, world.tuning.patrol.experience);
        assert!(world.exp_orbs.is_empty());
    }

    fn enemy_kill(world: &mut World, id: u32) {
        if let Some(enemy) = world.enemies.iter_mut().find(|e| e.id == id) {
            enemy.take_damage(99);
        }
    }

    #[test]
    fn test_ability_orb_pickup_unlocks_once() {
        let mut world = world();
        let orb = world.ability_orbs[0].pos;
        world.player.body.pos = orb - world.player.body.size / 2.0;
        world.step(&TickInput::default(), NOMINAL_DT);
        world.step(&TickInput::default(), NOMINAL_DT);

        assert!(world.session.has(Ability::DoubleJump));
        let unlocks = world
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, GameEvent::AbilityUnlocked { .. }))
            .count();
        assert_eq!(unlocks, 1);
    }

    #[test]
    fn test_save_point_interaction_sets_respawn() {
        let mut level = LevelData::forgotten_crossroads();
        level.enemies.clear();
        level.spawn_point = Point { x: 140.0, y: 1050.0 };
        let mut world = World::new(level, Tuning::default(), Session::default(), 1).unwrap();

        world.step(&TickInput::default(), NOMINAL_DT);
        assert!(!world.player.nearby.is_empty());
        world.step(
            &TickInput {
                interact: true,
                ..Default::default()
            },
            NOMINAL_DT,
        );
        assert_eq!(world.last_save, Some(Vec2::new(150.0, 1100.0)));
        assert!(world
            .drain_events()
            .contains(&GameEvent::SavePointActivated { x: 150.0, y: 1100.0 }));
    }

    #[test]
    fn test_door_needs_ability_then_grants_victory() {
        let mut level = LevelData::forgotten_crossroads();
        level.enemies.clear();
        level.spawn_point = Point { x: 1880.0, y: 1050.0 };
        let mut world = World::new(level, Tuning::default(), Session::default(), 1).unwrap();
        let interact = TickInput {
            interact: true,
            ..Default::default()
        };

        world.step(&TickInput::default(), NOMINAL_DT);
        world.step(&interact, NOMINAL_DT);
        assert!(world
            .drain_events()
            .iter()
            .any(|e| matches!(e, GameEvent::DoorLocked { .. })));
        assert_eq!(world.phase, GamePhase::Playing);

        world.session.abilities.unlock(Ability::DoubleJump);
        world.step(&TickInput::default(), NOMINAL_DT);
        world.step(&interact, NOMINAL_DT);
        assert_eq!(world.phase, GamePhase::Victory);
        assert!(world.drain_events().contains(&GameEvent::Victory));
    }
}
