//! Progress that outlives level reloads: unlocked abilities and collected orbs
//!
//! The session is owned by the world and handed to whoever needs it. There is
//! no global copy; `reset` is the only way back to a fresh game.

use serde::{Deserialize, Serialize};

/// Unlockable abilities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Ability {
    DoubleJump,
    Dash,
    WallJump,
    DownSlam,
}

impl Ability {
    pub const ALL: [Ability; 4] = [
        Ability::DoubleJump,
        Ability::Dash,
        Ability::WallJump,
        Ability::DownSlam,
    ];

    /// Stable identifier used for orb ids and saves
    pub fn as_str(&self) -> &'static str {
        match self {
            Ability::DoubleJump => "doubleJump",
            Ability::Dash => "dash",
            Ability::WallJump => "wallJump",
            Ability::DownSlam => "downSlam",
        }
    }

    /// Text shown when the ability is unlocked
    pub fn unlock_text(&self) -> &'static str {
        match self {
            Ability::DoubleJump => "Ability gained: Double Jump!",
            Ability::Dash => "Ability gained: Dash!",
            Ability::WallJump => "Ability gained: Wall Jump!",
            Ability::DownSlam => "Ability gained: Down Slam!",
        }
    }
}

/// Ability flags in persisted form
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Abilities {
    pub double_jump: bool,
    pub dash: bool,
    pub wall_jump: bool,
    pub down_slam: bool,
}

impl Abilities {
    pub fn has(&self, ability: Ability) -> bool {
        match ability {
            Ability::DoubleJump => self.double_jump,
            Ability::Dash => self.dash,
            Ability::WallJump => self.wall_jump,
            Ability::DownSlam => self.down_slam,
        }
    }

    /// Returns true if the ability was newly unlocked
    pub fn unlock(&mut self, ability: Ability) -> bool {
        let flag = match ability {
            Ability::DoubleJump => &mut self.double_jump,
            Ability::Dash => &mut self.dash,
            Ability::WallJump => &mut self.wall_jump,
            Ability::DownSlam => &mut self.down_slam,
        };
        let newly = !*flag;
        *flag = true;
        newly
    }
}

/// Session-wide progress
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub abilities: Abilities,
    pub collected_orbs: Vec<String>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has(&self, ability: Ability) -> bool {
        self.abilities.has(ability)
    }

    pub fn is_orb_collected(&self, id: &str) -> bool {
        self.collected_orbs.iter().any(|o| o == id)
    }

    /// Record an orb id once
    pub fn record_orb(&mut self, id: &str) {
        if !self.is_orb_collected(id) {
            self.collected_orbs.push(id.to_string());
        }
    }

    /// Back to a fresh game
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
