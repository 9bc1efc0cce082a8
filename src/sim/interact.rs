//! Doors and save points: objects the player operates with the interact action

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::events::{EventSink, GameEvent};
use super::rect::Rect;
use super::session::{Ability, Session};

/// A door guarding the level exit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Door {
    pub rect: Rect,
    pub locked: bool,
    /// Ability that unlocks the door once the session holds it
    pub required_ability: Option<Ability>,
    pub opened: bool,
}

impl Door {
    pub fn new(rect: Rect, locked: bool, required_ability: Option<Ability>) -> Self {
        Self {
            rect,
            locked,
            required_ability,
            opened: false,
        }
    }

    pub fn center(&self) -> Vec2 {
        self.rect.center()
    }

    /// Unlock once the required ability is held
    pub fn update(&mut self, session: &Session) {
        if self.opened || !self.locked {
            return;
        }
        if self.required_ability.is_some_and(|a| session.has(a)) {
            self.locked = false;
            log::info!("Door at ({}, {}) unlocked", self.rect.x, self.rect.y);
        }
    }

    /// Try the door; true if it opened on this call
    pub fn open(&mut self, events: &mut dyn EventSink) -> bool {
        if self.opened {
            return false;
        }
        let c = self.center();
        if self.locked {
            events.emit(GameEvent::DoorLocked { x: c.x, y: c.y });
            return false;
        }
        self.opened = true;
        log::info!("Door opened");
        events.emit(GameEvent::Victory);
        true
    }
}

/// A checkpoint; `pos` is the base center the player respawns on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavePoint {
    pub pos: Vec2,
    pub activated: bool,
}

impl SavePoint {
    pub fn new(pos: Vec2) -> Self {
        Self {
            pos,
            activated: false,
        }
    }

    /// Activation can repeat; each one re-announces the position
    pub fn activate(&mut self, events: &mut dyn EventSink) {
        self.activated = true;
        log::info!("Save point activated at ({}, {})", self.pos.x, self.pos.y);
        events.emit(GameEvent::SavePointActivated {
            x: self.pos.x,
            y: self.pos.y,
        });
    }

    /// Top-left for a body of `size` standing on the save point
    pub fn respawn_position(&self, size: Vec2) -> Vec2 {
        Vec2::new(self.pos.x - size.x / 2.0, self.pos.y - size.y)
    }
}

/// Reference into the world's doors or save points
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interactable {
    Door(usize),
    SavePoint(usize),
}

/// Every interactable with its center, doors first; indices stay stable for a level
pub fn interactables(doors: &[Door], save_points: &[SavePoint]) -> (Vec<Interactable>, Vec<Vec2>) {
    let refs = (0..doors.len())
        .map(Interactable::Door)
        .chain((0..save_points.len()).map(Interactable::SavePoint))
        .collect();
    let centers = doors
        .iter()
        .map(Door::center)
        .chain(save_points.iter().map(|s| s.pos))
        .collect();
    (refs, centers)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locked_door_reports_and_stays_shut() {
        let mut door = Door::new(Rect::new(0.0, 0.0, 40.0, 100.0), true, Some(Ability::DoubleJump));
        let mut events = Vec::new();
        assert!(!door.open(&mut events));
        assert_eq!(events, vec![GameEvent::DoorLocked { x: 20.0, y: 50.0 }]);
        assert!(!door.opened);
    }

    #[test]
    fn test_door_unlocks_with_ability_then_wins() {
        let mut door = Door::new(Rect::new(0.0, 0.0, 40.0, 100.0), true, Some(Ability::DoubleJump));
        let mut session = Session::default();
        door.update(&session);
        assert!(door.locked);

        session.abilities.unlock(Ability::DoubleJump);
        door.update(&session);
        assert!(!door.locked);

        let mut events = Vec::new();
        assert!(door.open(&mut events));
        assert!(!door.open(&mut events));
        assert_eq!(events, vec![GameEvent::Victory]);
    }

    #[test]
    fn test_door_without_requirement_stays_locked() {
        let mut door = Door::new(Rect::new(0.0, 0.0, 40.0, 100.0), true, None);
        let mut session = Session::default();
        for ability in Ability::ALL {
            session.abilities.unlock(ability);
        }
        door.update(&session);
        assert!(door.locked);
    }

    #[test]
    fn test_save_point_reactivates() {
        let mut sp = SavePoint::new(Vec2::new(500.0, 1100.0));
        let mut events = Vec::new();
        sp.activate(&mut events);
        sp.activate(&mut events);
        assert_eq!(events.len(), 2);
        assert_eq!(
            sp.respawn_position(Vec2::new(30.0, 50.0)),
            Vec2::new(485.0, 1050.0)
        );
    }

    #[test]
    fn test_interactables_index_doors_first() {
        let doors = [Door::new(Rect::new(0.0, 0.0, 10.0, 10.0), false, None)];
        let saves = [SavePoint::new(Vec2::new(100.0, 0.0))];
        let (refs, centers) = interactables(&doors, &saves);
        assert_eq!(refs, vec![Interactable::Door(0), Interactable::SavePoint(0)]);
        assert_eq!(centers[1], Vec2::new(100.0, 0.0));
    }
}
