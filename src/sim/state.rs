//! World state and queries
//!
//! Everything the step mutates lives here. Two worlds built from the same
//! level, tuning, session and seed stay identical under identical input.

use glam::Vec2;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::enemy::Enemy;
use super::events::GameEvent;
use super::interact::{Door, SavePoint};
use super::level::LevelData;
use super::pickup::{AbilityOrb, ExperienceOrb};
use super::player::Player;
use super::projectile::Fireball;
use super::rect::Rect;
use super::session::Session;
use crate::error::LoadError;
use crate::persistence::{PlayerSave, SaveData, SavePosition};
use crate::tuning::Tuning;

/// Current phase of play
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Active gameplay
    Playing,
    /// Player died; waiting for `respawn`
    Dead,
    /// An unlocked door was opened
    Victory,
}

/// Seed plus a draw counter, so the RNG survives serialization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RngState {
    pub seed: u64,
    pub stream: u64,
}

impl RngState {
    pub fn new(seed: u64) -> Self {
        Self { seed, stream: 0 }
    }

    /// Fresh generator for one draw site; advances the stream
    pub fn next_rng(&mut self) -> Pcg32 {
        let rng = Pcg32::new(self.seed, self.stream);
        self.stream += 1;
        rng
    }
}

/// Complete simulation state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct World {
    pub tuning: Tuning,
    pub level: LevelData,
    /// Solid geometry, in level order
    pub platforms: Vec<Rect>,
    pub player: Player,
    /// Sorted by id
    pub enemies: Vec<Enemy>,
    pub fireballs: Vec<Fireball>,
    pub ability_orbs: Vec<AbilityOrb>,
    pub exp_orbs: Vec<ExperienceOrb>,
    pub doors: Vec<Door>,
    pub save_points: Vec<SavePoint>,
    pub session: Session,
    pub phase: GamePhase,
    /// Steps taken
    pub time_ticks: u64,
    pub rng_state: RngState,
    /// Base center of the last activated save point
    pub last_save: Option<Vec2>,
    /// Raised since the last drain
    #[serde(skip)]
    pub(crate) events: Vec<GameEvent>,
    next_id: u32,
}

impl World {
    /// Validate tuning and level, then instantiate every entity in the level
    pub fn new(
        level: LevelData,
        tuning: Tuning,
        session: Session,
        seed: u64,
    ) -> Result<Self, LoadError> {
        tuning.validate()?;
        level.validate(&tuning)?;

        let platforms = level.platform_rects();
        let player = Player::new(level.spawn_point.into(), &tuning);
        let ability_orbs = level
            .ability_orbs
            .iter()
            .map(|spawn| {
                let mut orb = AbilityOrb::new(
                    spawn.orb_id(),
                    spawn.ability,
                    Vec2::new(spawn.x, spawn.y),
                    tuning.interaction.ability_orb_radius,
                );
                orb.collected = session.is_orb_collected(&orb.id);
                orb
            })
            .collect();
        let doors = level
            .doors
            .iter()
            .map(|d| Door::new(d.rect, d.locked, d.required_ability))
            .collect();
        let save_points = level
            .save_points
            .iter()
            .map(|p| SavePoint::new((*p).into()))
            .collect();

        let mut world = Self {
            tuning,
            platforms,
            player,
            enemies: Vec::with_capacity(level.enemies.len()),
            fireballs: Vec::new(),
            ability_orbs,
            exp_orbs: Vec::new(),
            doors,
            save_points,
            session,
            phase: GamePhase::Playing,
            time_ticks: 0,
            rng_state: RngState::new(seed),
            last_save: None,
            events: Vec::new(),
            next_id: 1,
            level,
        };

        for i in 0..world.level.enemies.len() {
            let spawn = &world.level.enemies[i];
            let (kind, pos, bounds) = (spawn.kind, Vec2::new(spawn.x, spawn.y), spawn.bounds());
            let id = world.next_entity_id();
            world
                .enemies
                .push(Enemy::new(id, kind, pos, bounds, &world.tuning));
        }

        log::info!(
            "World ready: '{}' with {} enemies (seed {})",
            world.level.name,
            world.enemies.len(),
            seed
        );
        Ok(world)
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Take every event raised since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn pending_events(&self) -> &[GameEvent] {
        &self.events
    }

    pub fn living_enemies(&self) -> impl Iterator<Item = &Enemy> {
        self.enemies.iter().filter(|e| e.alive)
    }

    pub fn enemy(&self, id: u32) -> Option<&Enemy> {
        self.enemies.iter().find(|e| e.id == id)
    }

    /// Where the player reappears: the last save point, else the level spawn
    pub fn respawn_point(&self) -> Vec2 {
        match self.last_save {
            Some(base) => SavePoint::new(base).respawn_position(self.player.body.size),
            None => self.level.spawn_point.into(),
        }
    }

    /// Reset the level around a revived player; progress is kept
    pub fn respawn(&mut self) {
        for enemy in &mut self.enemies {
            enemy.reset();
        }
        self.fireballs.clear();
        self.exp_orbs.clear();

        let point = self.respawn_point();
        self.player.respawn(point, &self.session, &mut self.events);
        self.phase = GamePhase::Playing;
        log::info!("Respawned at ({}, {})", point.x, point.y);
    }

    /// Persisted form of the current progress
    pub fn snapshot(&self, timestamp: impl Into<String>) -> SaveData {
        let base = self.last_save.unwrap_or_else(|| {
            let spawn: Vec2 = self.level.spawn_point.into();
            spawn + Vec2::new(self.player.body.size.x / 2.0, self.player.body.size.y)
        });
        SaveData {
            player_state: PlayerSave {
                level: self.player.level,
                experience: self.player.experience,
                health: self.player.health,
                abilities: self.session.abilities,
                collected_orbs: self.session.collected_orbs.clone(),
            },
            save_point_position: SavePosition {
                x: base.x,
                y: base.y,
            },
            timestamp: timestamp.into(),
        }
    }

    /// Apply a save: progress, session and position
    pub fn restore(&mut self, save: &SaveData) {
        let p = &save.player_state;
        let max_level = self.tuning.progression.max_level;
        self.player.level = p.level.clamp(1, max_level.max(1));
        self.player.experience = p.experience;
        self.player.health = p.health.clamp(1, self.player.max_health.max(1));
        self.player.alive = true;

        self.session.abilities = p.abilities;
        self.session.collected_orbs = p.collected_orbs.clone();
        for orb in &mut self.ability_orbs {
            orb.collected = self.session.is_orb_collected(&orb.id);
        }

        self.last_save = Some(Vec2::new(
            save.save_point_position.x,
            save.save_point_position.y,
        ));
        self.player.body.pos = self.respawn_point();
        self.player.body.vel = Vec2::ZERO;
        self.phase = GamePhase::Playing;
        log::info!("Restored save from {}", save.timestamp);
    }

    /// Start a fresh game: clears the session and every level entity
    pub fn reset_session(&mut self) {
        self.session.reset();
        self.last_save = None;
        for orb in &mut self.ability_orbs {
            orb.collected = false;
        }
        for door in &mut self.doors {
            door.opened = false;
        }
        for (door, spawn) in self.doors.iter_mut().zip(&self.level.doors) {
            door.locked = spawn.locked;
        }
        self.player = Player::new(self.level.spawn_point.into(), &self.tuning);
        self.respawn();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ConfigError, LevelError};
    use crate::sim::events::NullSink;
    use crate::sim::session::Ability;

    fn world() -> World {
        World::new(
            LevelData::forgotten_crossroads(),
            Tuning::default(),
            Session::default(),
            12345,
        )
        .unwrap()
    }

    #[test]
    fn test_new_world_from_builtin_level() {
        let world = world();
        assert_eq!(world.phase, GamePhase::Playing);
        assert_eq!(world.enemies.len(), 5);
        assert_eq!(world.player.body.pos, Vec2::new(100.0, 500.0));
        assert!(world.enemies.windows(2).all(|w| w[0].id < w[1].id));
        assert!(!world.ability_orbs[0].collected);
    }

    #[test]
    fn test_session_marks_collected_orbs() {
        let mut session = Session::default();
        session.record_orb("doubleJump");
        let world = World::new(
            LevelData::forgotten_crossroads(),
            Tuning::default(),
            session,
            1,
        )
        .unwrap();
        assert!(world.ability_orbs[0].collected);
    }

    #[test]
    fn test_invalid_level_rejected() {
        let mut level = LevelData::forgotten_crossroads();
        level.platforms[0].rect.height = -1.0;
        let err = World::new(level, Tuning::default(), Session::default(), 1).unwrap_err();
        assert!(matches!(err, LoadError::Level(LevelError::InvalidPlatform { index: 0, .. })));
    }

    #[test]
    fn test_invalid_tuning_rejected() {
        let mut tuning = Tuning::default();
        tuning.progression.max_level = 0;
        let err = World::new(
            LevelData::forgotten_crossroads(),
            tuning,
            Session::default(),
            1,
        )
        .unwrap_err();
        assert!(matches!(err, LoadError::Config(ConfigError::Thresholds(_))));

        let mut tuning = Tuning::default();
        tuning.player.attack_cooldown = 0.05;
        let err = World::new(LevelData::forgotten_crossroads(), tuning, Session::default(), 1)
            .unwrap_err();
        assert!(matches!(
            err,
            LoadError::Config(ConfigError::CooldownShorterThanDuration { .. })
        ));
    }

    #[test]
    fn test_restore_clamps_out_of_range_save() {
        let mut world = world();
        let mut save = world.snapshot("t");
        save.player_state.level = 99;
        save.player_state.health = 0;
        world.restore(&save);
        assert_eq!(world.player.level, world.tuning.progression.max_level);
        assert_eq!(world.player.health, 1);
    }

    #[test]
    fn test_rng_streams_advance() {
        use rand::Rng;
        let mut state = RngState::new(5);
        let a: u32 = state.next_rng().random();
        let b: u32 = state.next_rng().random();
        assert_ne!(a, b);
        assert_eq!(state.stream, 2);

        let mut replay = RngState::new(5);
        let again: u32 = replay.next_rng().random();
        assert_eq!(a, again);
    }

    #[test]
    fn test_snapshot_restore() {
        let mut world = world();
        world.player.experience = 30;
        world.player.level = 3;
        world.player.health = 2;
        world.session.abilities.unlock(Ability::DoubleJump);
        world.session.record_orb("doubleJump");
        world.last_save = Some(Vec2::new(150.0, 1100.0));

        let save = world.snapshot("t0");
        assert_eq!(save.save_point_position, SavePosition { x: 150.0, y: 1100.0 });

        let mut fresh = self::world();
        fresh.restore(&save);
        assert_eq!(fresh.player.level, 3);
        assert_eq!(fresh.player.experience, 30);
        assert_eq!(fresh.player.health, 2);
        assert!(fresh.session.has(Ability::DoubleJump));
        assert!(fresh.ability_orbs[0].collected);
        assert_eq!(fresh.player.body.pos, Vec2::new(135.0, 1050.0));
    }

    #[test]
    fn test_respawn_restores_enemies_and_player() {
        let mut world = world();
        world.enemies[0].take_damage(99);
        world.enemies[1].body.pos = Vec2::new(5.0, 5.0);
        let tuning = world.tuning.clone();
        world.player.take_damage(99, 0.0, &tuning, &mut NullSink);
        world.phase = GamePhase::Dead;

        world.respawn();
        assert_eq!(world.phase, GamePhase::Playing);
        assert!(world.enemies.iter().all(|e| e.alive));
        assert_eq!(world.enemies[1].body.pos, Vec2::new(1100.0, 800.0));
        assert!(world.player.alive);
        assert_eq!(world.player.body.pos, Vec2::new(100.0, 500.0));
        assert!(world
            .drain_events()
            .contains(&GameEvent::HealthChanged { health: 5, max_health: 5 }));
    }

    #[test]
    fn test_reset_session() {
        let mut world = world();
        world.session.abilities.unlock(Ability::DoubleJump);
        world.doors[0].update(&world.session.clone());
        assert!(!world.doors[0].locked);
        world.player.level = 4;

        world.reset_session();
        assert_eq!(world.session, Session::default());
        assert!(world.doors[0].locked);
        assert_eq!(world.player.level, 1);
    }
}
