//! Data-driven game balance
//!
//! Velocities and accelerations are authored per nominal 1/60 s frame, timers
//! in seconds. Every field has a default so partial JSON overrides work.

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ConfigError;

/// Player movement, jump, combat and damage response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerTuning {
    pub width: f32,
    pub height: f32,
    pub max_health: i32,

    pub move_acceleration: f32,
    pub move_deceleration: f32,
    pub air_move_acceleration: f32,
    pub air_move_deceleration: f32,
    pub max_speed: f32,

    pub jump_force: f32,
    pub double_jump_force: f32,
    pub gravity: f32,
    pub max_fall_speed: f32,
    /// Seconds after leaving a ledge during which a jump is still honored
    pub coyote_time: f32,

    pub attack_width: f32,
    pub attack_height: f32,
    pub attack_cooldown: f32,
    pub attack_duration: f32,
    pub attack_damage: i32,
    /// Recovery after a swing ends
    pub attack_stun_duration: f32,
    pub pogo_bounce_force: f32,
    /// Per-enemy suppression window after a melee hit
    pub hit_debounce: f32,

    pub fireball_cooldown: f32,
    /// Gap between the body edge and a freshly spawned fireball
    pub fireball_spawn_offset: f32,

    pub hit_invincible_time: f32,
    pub hit_knockback: f32,
    pub hit_stun_time: f32,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            width: 30.0,
            height: 50.0,
            max_health: 5,

            move_acceleration: 0.8,
            move_deceleration: 0.6,
            air_move_acceleration: 0.3,
            air_move_deceleration: 0.2,
            max_speed: 5.0,

            jump_force: -12.0,
            double_jump_force: -10.0,
            gravity: 0.6,
            max_fall_speed: 15.0,
            coyote_time: 0.1,

            attack_width: 60.0,
            attack_height: 40.0,
            attack_cooldown: 0.3,
            attack_duration: 0.2,
            attack_damage: 1,
            attack_stun_duration: 0.1,
            pogo_bounce_force: -8.0,
            hit_debounce: 0.1,

            fireball_cooldown: 0.6,
            fireball_spawn_offset: 4.0,

            hit_invincible_time: 0.5,
            hit_knockback: 8.0,
            hit_stun_time: 0.3,
        }
    }
}

/// Stats shared by every enemy archetype
///
/// Each archetype has its own defaults; a partial override block only
/// replaces the fields it names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemyStats {
    pub width: f32,
    pub height: f32,
    pub speed: f32,
    pub health: i32,
    pub damage: i32,
    /// 0 disables perception
    pub detection_range: f32,
    /// Experience dropped on death
    pub experience: u32,
}

impl EnemyStats {
    pub fn patrol() -> Self {
        Self {
            width: 40.0,
            height: 40.0,
            speed: 2.0,
            health: 3,
            damage: 1,
            detection_range: 0.0,
            experience: 5,
        }
    }

    pub fn chaser() -> Self {
        Self {
            width: 45.0,
            height: 45.0,
            speed: 3.5,
            health: 4,
            damage: 1,
            detection_range: 300.0,
            experience: 8,
        }
    }

    pub fn sentry() -> Self {
        Self {
            width: 40.0,
            height: 50.0,
            speed: 0.0,
            health: 3,
            damage: 1,
            detection_range: 400.0,
            experience: 12,
        }
    }
}

impl Default for EnemyStats {
    fn default() -> Self {
        Self::patrol()
    }
}

/// Fields present in an enemy stats override
#[derive(Deserialize)]
struct EnemyStatsOverride {
    width: Option<f32>,
    height: Option<f32>,
    speed: Option<f32>,
    health: Option<i32>,
    damage: Option<i32>,
    detection_range: Option<f32>,
    experience: Option<u32>,
}

impl EnemyStatsOverride {
    fn apply(self, base: EnemyStats) -> EnemyStats {
        EnemyStats {
            width: self.width.unwrap_or(base.width),
            height: self.height.unwrap_or(base.height),
            speed: self.speed.unwrap_or(base.speed),
            health: self.health.unwrap_or(base.health),
            damage: self.damage.unwrap_or(base.damage),
            detection_range: self.detection_range.unwrap_or(base.detection_range),
            experience: self.experience.unwrap_or(base.experience),
        }
    }
}

fn patrol_stats<'de, D: Deserializer<'de>>(d: D) -> Result<EnemyStats, D::Error> {
    EnemyStatsOverride::deserialize(d).map(|o| o.apply(EnemyStats::patrol()))
}

fn chaser_stats<'de, D: Deserializer<'de>>(d: D) -> Result<EnemyStats, D::Error> {
    EnemyStatsOverride::deserialize(d).map(|o| o.apply(EnemyStats::chaser()))
}

fn sentry_stats<'de, D: Deserializer<'de>>(d: D) -> Result<EnemyStats, D::Error> {
    EnemyStatsOverride::deserialize(d).map(|o| o.apply(EnemyStats::sentry()))
}

/// Chaser-specific behavior
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChaserTuning {
    #[serde(deserialize_with = "chaser_stats")]
    pub stats: EnemyStats,
    /// Speed multiplier while chasing
    pub chase_multiplier: f32,
}

impl Default for ChaserTuning {
    fn default() -> Self {
        Self {
            stats: EnemyStats::chaser(),
            chase_multiplier: 1.5,
        }
    }
}

/// Sentry charge / ray attack cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SentryTuning {
    #[serde(deserialize_with = "sentry_stats")]
    pub stats: EnemyStats,
    pub charge_time: f32,
    pub cooldown: f32,
    /// Charge aborts once the player is beyond `detection_range * abort_margin`
    pub abort_margin: f32,
    /// Ray damages the player within this distance of the locked point
    pub hit_threshold: f32,
}

impl Default for SentryTuning {
    fn default() -> Self {
        Self {
            stats: EnemyStats::sentry(),
            charge_time: 0.8,
            cooldown: 1.5,
            abort_margin: 1.25,
            hit_threshold: 40.0,
        }
    }
}

/// Homing fireball
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FireballTuning {
    pub speed: f32,
    pub radius: f32,
    pub max_distance: f32,
    /// Share of each step steered toward the target (rest keeps the launch heading)
    pub homing_weight: f32,
    /// Distance to the target counted as a direct hit
    pub target_hit_distance: f32,
    pub damage: i32,
    pub self_damage: i32,
    pub explosion_radius: f32,
    pub explosion_knockback: f32,
    /// Post-explosion effect window before the projectile is discarded
    pub explosion_duration: f32,
}

impl Default for FireballTuning {
    fn default() -> Self {
        Self {
            speed: 8.0,
            radius: 10.0,
            max_distance: 600.0,
            homing_weight: 0.7,
            target_hit_distance: 20.0,
            damage: 2,
            self_damage: 1,
            explosion_radius: 80.0,
            explosion_knockback: 6.0,
            explosion_duration: 0.4,
        }
    }
}

/// Experience orb drop and pickup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperienceTuning {
    pub collection_distance: f32,
    /// Seek speed in px/s
    pub collection_speed: f32,
    pub gravity: f32,
    pub launch_speed: f32,
    pub max_age: f32,
    pub radius: f32,
}

impl Default for ExperienceTuning {
    fn default() -> Self {
        Self {
            collection_distance: 150.0,
            collection_speed: 400.0,
            gravity: 0.3,
            launch_speed: 3.0,
            max_age: 30.0,
            radius: 8.0,
        }
    }
}

/// Leveling curve
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressionTuning {
    pub max_level: u32,
    /// Cumulative experience required to leave each level (index = level)
    pub exp_per_level: Vec<u32>,
    pub damage_per_level: i32,
}

impl Default for ProgressionTuning {
    fn default() -> Self {
        Self {
            max_level: 10,
            exp_per_level: vec![0, 10, 25, 45, 70, 100, 135, 175, 220, 270],
            damage_per_level: 1,
        }
    }
}

/// Interactables and ability orbs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionTuning {
    pub interact_radius: f32,
    pub ability_orb_radius: f32,
    /// Added to the orb radius for the pickup test
    pub ability_orb_reach: f32,
}

impl Default for InteractionTuning {
    fn default() -> Self {
        Self {
            interact_radius: 80.0,
            ability_orb_radius: 20.0,
            ability_orb_reach: 30.0,
        }
    }
}

/// Complete tuning set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub player: PlayerTuning,
    #[serde(deserialize_with = "patrol_stats")]
    pub patrol: EnemyStats,
    pub chaser: ChaserTuning,
    pub sentry: SentryTuning,
    /// Enemy gravity as a fraction of player gravity
    pub enemy_gravity_factor: f32,
    pub fireball: FireballTuning,
    pub experience: ExperienceTuning,
    pub progression: ProgressionTuning,
    pub interaction: InteractionTuning,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            player: PlayerTuning::default(),
            patrol: EnemyStats::patrol(),
            chaser: ChaserTuning::default(),
            sentry: SentryTuning::default(),
            enemy_gravity_factor: 0.8,
            fireball: FireballTuning::default(),
            experience: ExperienceTuning::default(),
            progression: ProgressionTuning::default(),
            interaction: InteractionTuning::default(),
        }
    }
}

impl Tuning {
    /// Parse and validate a JSON override
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let tuning: Tuning =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        tuning.validate()?;
        log::info!("Loaded tuning override");
        Ok(tuning)
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let p = &self.player;
        for (field, value) in [
            ("player.width", p.width),
            ("player.height", p.height),
            ("player.move_acceleration", p.move_acceleration),
            ("player.move_deceleration", p.move_deceleration),
            ("player.air_move_acceleration", p.air_move_acceleration),
            ("player.air_move_deceleration", p.air_move_deceleration),
            ("player.max_speed", p.max_speed),
            ("player.gravity", p.gravity),
            ("player.max_fall_speed", p.max_fall_speed),
            ("player.coyote_time", p.coyote_time),
            ("player.attack_width", p.attack_width),
            ("player.attack_height", p.attack_height),
            ("player.attack_cooldown", p.attack_cooldown),
            ("player.attack_duration", p.attack_duration),
            ("player.attack_stun_duration", p.attack_stun_duration),
            ("player.hit_debounce", p.hit_debounce),
            ("player.fireball_cooldown", p.fireball_cooldown),
            ("player.fireball_spawn_offset", p.fireball_spawn_offset),
            ("player.hit_invincible_time", p.hit_invincible_time),
            ("player.hit_knockback", p.hit_knockback),
            ("player.hit_stun_time", p.hit_stun_time),
            ("enemy_gravity_factor", self.enemy_gravity_factor),
            ("fireball.speed", self.fireball.speed),
            ("fireball.radius", self.fireball.radius),
            ("fireball.max_distance", self.fireball.max_distance),
            ("fireball.target_hit_distance", self.fireball.target_hit_distance),
            ("fireball.explosion_radius", self.fireball.explosion_radius),
            ("fireball.explosion_knockback", self.fireball.explosion_knockback),
            ("fireball.explosion_duration", self.fireball.explosion_duration),
            ("experience.collection_distance", self.experience.collection_distance),
            ("experience.collection_speed", self.experience.collection_speed),
            ("experience.max_age", self.experience.max_age),
            ("experience.radius", self.experience.radius),
            ("interaction.interact_radius", self.interaction.interact_radius),
            ("interaction.ability_orb_radius", self.interaction.ability_orb_radius),
            ("interaction.ability_orb_reach", self.interaction.ability_orb_reach),
            ("sentry.charge_time", self.sentry.charge_time),
            ("sentry.cooldown", self.sentry.cooldown),
            ("sentry.abort_margin", self.sentry.abort_margin),
            ("sentry.hit_threshold", self.sentry.hit_threshold),
            ("chaser.chase_multiplier", self.chaser.chase_multiplier),
        ] {
            non_negative(field, value)?;
        }

        for (name, stats) in [
            ("patrol", &self.patrol),
            ("chaser", &self.chaser.stats),
            ("sentry", &self.sentry.stats),
        ] {
            non_negative(name, stats.width)?;
            non_negative(name, stats.height)?;
            non_negative(name, stats.speed)?;
            non_negative(name, stats.detection_range)?;
            if stats.health <= 0 {
                return Err(ConfigError::InvalidValue {
                    field: name,
                    value: stats.health as f32,
                });
            }
        }

        if p.max_health <= 0 {
            return Err(ConfigError::InvalidValue {
                field: "player.max_health",
                value: p.max_health as f32,
            });
        }

        if p.attack_cooldown < p.attack_duration {
            return Err(ConfigError::CooldownShorterThanDuration {
                cooldown: "player.attack_cooldown",
                cooldown_secs: p.attack_cooldown,
                duration: "player.attack_duration",
                duration_secs: p.attack_duration,
            });
        }

        if !(0.0..=1.0).contains(&self.fireball.homing_weight) {
            return Err(ConfigError::InvalidValue {
                field: "fireball.homing_weight",
                value: self.fireball.homing_weight,
            });
        }

        let prog = &self.progression;
        if prog.max_level == 0 {
            return Err(ConfigError::Thresholds("max_level must be at least 1".into()));
        }
        if prog.exp_per_level.len() < prog.max_level as usize {
            return Err(ConfigError::Thresholds(format!(
                "{} thresholds for max level {}",
                prog.exp_per_level.len(),
                prog.max_level
            )));
        }
        if prog.exp_per_level.windows(2).any(|w| w[1] <= w[0]) {
            return Err(ConfigError::Thresholds("must be strictly increasing".into()));
        }

        Ok(())
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue { field, value })
    }
}
