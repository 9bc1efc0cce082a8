//! Save/load of player progress through a key/value store
//!
//! The store itself belongs to the host (browser storage, a file, a test
//! map). Saves are written only on save point activation; nothing here runs
//! inside the tick.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::SaveError;
use crate::sim::session::Abilities;

/// Key the save lives under
pub const SAVE_KEY: &str = "gameSave";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerSave {
    pub level: u32,
    pub experience: u32,
    pub health: i32,
    pub abilities: Abilities,
    pub collected_orbs: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SavePosition {
    pub x: f32,
    pub y: f32,
}

/// Persisted game progress
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveData {
    pub player_state: PlayerSave,
    pub save_point_position: SavePosition,
    /// Supplied by the host, typically an ISO-8601 string
    pub timestamp: String,
}

/// Host key/value storage
pub trait SaveStore {
    fn get(&self, key: &str) -> Result<Option<String>, SaveError>;
    fn set(&mut self, key: &str, value: String) -> Result<(), SaveError>;
    fn remove(&mut self, key: &str) -> Result<(), SaveError>;
}

/// In-memory store for tests and headless runs
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SaveStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, SaveError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), SaveError> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), SaveError> {
        self.entries.remove(key);
        Ok(())
    }
}

pub fn save_game(store: &mut dyn SaveStore, data: &SaveData) -> Result<(), SaveError> {
    let json = serde_json::to_string(data)?;
    store.set(SAVE_KEY, json)?;
    log::info!(
        "Saved game at ({}, {})",
        data.save_point_position.x,
        data.save_point_position.y
    );
    Ok(())
}

/// `Ok(None)` when no save exists
pub fn load_game(store: &dyn SaveStore) -> Result<Option<SaveData>, SaveError> {
    match store.get(SAVE_KEY)? {
        Some(json) => {
            let data = serde_json::from_str(&json)?;
            log::info!("Loaded save");
            Ok(Some(data))
        }
        None => Ok(None),
    }
}

pub fn clear_game(store: &mut dyn SaveStore) -> Result<(), SaveError> {
    store.remove(SAVE_KEY)?;
    log::info!("Cleared save");
    Ok(())
}
