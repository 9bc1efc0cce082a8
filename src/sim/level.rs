//! Level data: serde schema, load-time validation and the built-in level

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::{first_overlap, point_in_rect};
use super::enemy::{EnemyKind, PatrolBounds};
use super::rect::Rect;
use super::session::Ability;
use crate::error::LevelError;
use crate::tuning::Tuning;

/// A point in level JSON (`{ "x": .., "y": .. }`)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl From<Point> for Vec2 {
    fn from(p: Point) -> Self {
        Vec2::new(p.x, p.y)
    }
}

/// Solid geometry; `style` only matters to renderers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlatformData {
    #[serde(flatten)]
    pub rect: Rect,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnemySpawn {
    #[serde(rename = "type")]
    pub kind: EnemyKind,
    /// Top-left
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub patrol_left: Option<f32>,
    #[serde(default)]
    pub patrol_right: Option<f32>,
}

impl EnemySpawn {
    pub fn bounds(&self) -> Option<PatrolBounds> {
        match (self.patrol_left, self.patrol_right) {
            (Some(left), Some(right)) => Some(PatrolBounds { left, right }),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbilityOrbSpawn {
    /// Defaults to the ability name
    #[serde(default)]
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub ability: Ability,
    /// Center
    pub x: f32,
    pub y: f32,
}

impl AbilityOrbSpawn {
    pub fn orb_id(&self) -> &str {
        self.id.as_deref().unwrap_or(self.ability.as_str())
    }
}

fn locked_by_default() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DoorSpawn {
    #[serde(flatten)]
    pub rect: Rect,
    #[serde(default = "locked_by_default")]
    pub locked: bool,
    #[serde(default)]
    pub required_ability: Option<Ability>,
}

/// One playable area
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelData {
    pub name: String,
    pub bounds: Rect,
    /// Player top-left at level start
    pub spawn_point: Point,
    pub platforms: Vec<PlatformData>,
    #[serde(default)]
    pub enemies: Vec<EnemySpawn>,
    #[serde(default)]
    pub ability_orbs: Vec<AbilityOrbSpawn>,
    #[serde(default)]
    pub doors: Vec<DoorSpawn>,
    /// Base centers
    #[serde(default)]
    pub save_points: Vec<Point>,
}

impl LevelData {
    /// Parse and validate level JSON
    pub fn from_json(json: &str, tuning: &Tuning) -> Result<Self, LevelError> {
        let level: LevelData =
            serde_json::from_str(json).map_err(|e| LevelError::Parse(e.to_string()))?;
        level.validate(tuning)?;
        log::info!(
            "Loaded level '{}' ({} platforms, {} enemies)",
            level.name,
            level.platforms.len(),
            level.enemies.len()
        );
        Ok(level)
    }

    pub fn platform_rects(&self) -> Vec<Rect> {
        self.platforms.iter().map(|p| p.rect).collect()
    }

    /// Reject data the simulation cannot start from
    pub fn validate(&self, tuning: &Tuning) -> Result<(), LevelError> {
        for (index, p) in self.platforms.iter().enumerate() {
            if !p.rect.is_well_formed() {
                return Err(LevelError::InvalidPlatform {
                    index,
                    width: p.rect.width,
                    height: p.rect.height,
                });
            }
        }
        let platforms = self.platform_rects();

        let player = Rect::new(
            self.spawn_point.x,
            self.spawn_point.y,
            tuning.player.width,
            tuning.player.height,
        );
        if let Some(platform) = first_overlap(&player, &platforms) {
            return Err(LevelError::SpawnInsideGeometry {
                what: "player".into(),
                x: player.x,
                y: player.y,
                platform,
            });
        }

        for (index, spawn) in self.enemies.iter().enumerate() {
            if spawn.kind.patrols() && !spawn.bounds().is_some_and(|b| b.left < b.right) {
                return Err(LevelError::PatrolBounds {
                    index,
                    kind: spawn.kind.as_str().into(),
                });
            }
            let stats = spawn.kind.stats(tuning);
            let rect = Rect::new(spawn.x, spawn.y, stats.width, stats.height);
            if let Some(platform) = first_overlap(&rect, &platforms) {
                return Err(LevelError::SpawnInsideGeometry {
                    what: format!("{} enemy {}", spawn.kind.as_str(), index),
                    x: spawn.x,
                    y: spawn.y,
                    platform,
                });
            }
        }

        let placed = std::iter::once(("player spawn".to_string(), self.spawn_point))
            .chain(
                self.ability_orbs
                    .iter()
                    .map(|o| (format!("orb '{}'", o.orb_id()), Point { x: o.x, y: o.y })),
            )
            .chain(self.enemies.iter().enumerate().map(|(i, e)| {
                (
                    format!("{} enemy {}", e.kind.as_str(), i),
                    Point { x: e.x, y: e.y },
                )
            }))
            .chain(
                self.save_points
                    .iter()
                    .enumerate()
                    .map(|(i, p)| (format!("save point {}", i), *p)),
            );
        for (what, p) in placed {
            if !point_in_rect(p.into(), &self.bounds) {
                return Err(LevelError::OutOfBounds { what, x: p.x, y: p.y });
            }
        }

        for (index, door) in self.doors.iter().enumerate() {
            let r = door.rect;
            if !r.is_well_formed() {
                return Err(LevelError::InvalidDoor {
                    index,
                    width: r.width,
                    height: r.height,
                });
            }
            // Opposite corners in bounds keep the whole door inside
            for corner in [Vec2::new(r.left(), r.top()), Vec2::new(r.right(), r.bottom())] {
                if !point_in_rect(corner, &self.bounds) {
                    return Err(LevelError::OutOfBounds {
                        what: format!("door {}", index),
                        x: corner.x,
                        y: corner.y,
                    });
                }
            }
        }

        let mut seen: Vec<&str> = Vec::with_capacity(self.ability_orbs.len());
        for orb in &self.ability_orbs {
            let id = orb.orb_id();
            if seen.contains(&id) {
                return Err(LevelError::DuplicateOrb(id.to_string()));
            }
            seen.push(id);
        }

        Ok(())
    }

    /// The built-in starting area
    pub fn forgotten_crossroads() -> Self {
        let platform = |x, y, width, height| PlatformData {
            rect: Rect::new(x, y, width, height),
            style: None,
        };
        let walker = |kind, x, y, left, right| EnemySpawn {
            kind,
            x,
            y,
            patrol_left: Some(left),
            patrol_right: Some(right),
        };

        Self {
            name: "Forgotten Crossroads".into(),
            bounds: Rect::new(0.0, 0.0, 2000.0, 1200.0),
            spawn_point: Point { x: 100.0, y: 500.0 },
            platforms: vec![
                // Ground
                platform(0.0, 1100.0, 800.0, 100.0),
                platform(900.0, 1100.0, 1100.0, 100.0),
                // Middle ledges
                platform(300.0, 900.0, 200.0, 30.0),
                platform(600.0, 750.0, 250.0, 30.0),
                platform(1000.0, 850.0, 200.0, 30.0),
                platform(1300.0, 700.0, 200.0, 30.0),
                // High ledges
                platform(200.0, 600.0, 150.0, 30.0),
                platform(500.0, 500.0, 200.0, 30.0),
                platform(900.0, 550.0, 180.0, 30.0),
                platform(1200.0, 400.0, 200.0, 30.0),
                // Walls
                platform(-50.0, 0.0, 50.0, 1200.0),
                platform(2000.0, 0.0, 50.0, 1200.0),
            ],
            enemies: vec![
                walker(EnemyKind::Patrol, 400.0, 850.0, 300.0, 500.0),
                walker(EnemyKind::Patrol, 1100.0, 800.0, 1000.0, 1200.0),
                walker(EnemyKind::Chaser, 700.0, 700.0, 600.0, 1400.0),
                walker(EnemyKind::Chaser, 1400.0, 350.0, 1200.0, 1600.0),
                EnemySpawn {
                    kind: EnemyKind::Sentry,
                    x: 1700.0,
                    y: 1050.0,
                    patrol_left: None,
                    patrol_right: None,
                },
            ],
            ability_orbs: vec![AbilityOrbSpawn {
                id: None,
                ability: Ability::DoubleJump,
                x: 1300.0,
                y: 350.0,
            }],
            doors: vec![DoorSpawn {
                rect: Rect::new(1900.0, 1000.0, 60.0, 100.0),
                locked: true,
                required_ability: Some(Ability::DoubleJump),
            }],
            save_points: vec![Point { x: 150.0, y: 1100.0 }],
        }
    }
}
