//! Error types for loading tuning, level data and saves.
//!
//! Only raised at load time. The simulation tick itself never fails.

use thiserror::Error;

/// Rejected tuning values.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    /// JSON could not be parsed.
    #[error("Tuning parse error: {0}")]
    Parse(String),

    /// A length, speed or duration was negative or not finite.
    #[error("Invalid value for '{field}': {value}")]
    InvalidValue { field: &'static str, value: f32 },

    /// Cooldown shorter than the action it gates.
    #[error("'{cooldown}' ({cooldown_secs}s) is shorter than '{duration}' ({duration_secs}s)")]
    CooldownShorterThanDuration {
        cooldown: &'static str,
        cooldown_secs: f32,
        duration: &'static str,
        duration_secs: f32,
    },

    /// Experience thresholds are missing or not strictly increasing.
    #[error("Experience thresholds invalid: {0}")]
    Thresholds(String),
}

/// Malformed level data.
#[derive(Debug, Error, PartialEq)]
pub enum LevelError {
    /// JSON could not be parsed.
    #[error("Level parse error: {0}")]
    Parse(String),

    /// Platform with negative or non-finite size.
    #[error("Platform {index} has invalid size {width}x{height}")]
    InvalidPlatform { index: usize, width: f32, height: f32 },

    /// Patrolling enemy without usable bounds.
    #[error("Enemy {index} ({kind}) needs patrol bounds with left < right")]
    PatrolBounds { index: usize, kind: String },

    /// Something spawns overlapping solid geometry.
    #[error("{what} at ({x}, {y}) spawns inside platform {platform}")]
    SpawnInsideGeometry {
        what: String,
        x: f32,
        y: f32,
        platform: usize,
    },

    /// A spawn or pickup placed outside the level bounds.
    #[error("{what} at ({x}, {y}) lies outside the level bounds")]
    OutOfBounds { what: String, x: f32, y: f32 },

    /// Door rect with negative or non-finite size.
    #[error("Door {index} has invalid size {width}x{height}")]
    InvalidDoor { index: usize, width: f32, height: f32 },

    /// Two ability orbs share an id, so collection state would alias.
    #[error("Duplicate ability orb id '{0}'")]
    DuplicateOrb(String),
}

/// Anything that stops a world from being built.
#[derive(Debug, Error, PartialEq)]
pub enum LoadError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Level(#[from] LevelError),
}

/// Failures reading or writing a save.
#[derive(Debug, Error)]
pub enum SaveError {
    /// The backing store rejected the operation.
    #[error("Save store error: {0}")]
    Store(String),

    /// Stored payload was not a valid save.
    #[error("Corrupt save data: {0}")]
    Decode(#[from] serde_json::Error),
}
