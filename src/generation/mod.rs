//! # Generation Module
//!
//! Procedural content for a level: the dug-out floor plan, the monsters, and
//! the items.
//!
//! Generation happens only when a level starts. The digger produces a
//! [`Dungeon`] whose free-space pool is then consumed by the spawners, so
//! every spawned thing gets its own tile.

pub mod dungeon;
pub mod encounters;
pub mod items;

pub use dungeon::*;
pub use encounters::*;
pub use items::*;

use crate::config;
use crate::game::{FreeSpacePool, Position, TileMap};
use crate::{DelveError, DelveResult};
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

/// Configuration for the room-and-corridor digger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Level width in tiles
    pub width: i32,
    /// Level height in tiles
    pub height: i32,
    /// Minimum room floor width
    pub min_room_width: i32,
    /// Maximum room floor width
    pub max_room_width: i32,
    /// Minimum room floor height
    pub min_room_height: i32,
    /// Maximum room floor height
    pub max_room_height: i32,
    /// Keep digging until this many rooms exist
    pub min_rooms: usize,
    /// Stop digging once this fraction of the interior is floor
    pub dig_target: f64,
    /// Room placement attempts before giving up on reaching the target
    pub max_room_attempts: u32,
    /// Extra corridors per room, for loops (0.0 to 1.0)
    pub extra_connection_chance: f64,
    /// Whole-level retries when a layout fails validation
    pub max_level_attempts: u32,
}

impl GenerationConfig {
    /// Creates the production configuration for a level of the given size.
    ///
    /// # Examples
    ///
    /// ```
    /// use delve::GenerationConfig;
    ///
    /// let config = GenerationConfig::new(50, 25);
    /// assert!(config.min_room_width >= 3);
    /// assert!(config.max_room_width >= config.min_room_width);
    /// assert!(config.validate().is_ok());
    /// ```
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            width,
            height,
            min_room_width: 3,
            max_room_width: 9,
            min_room_height: 3,
            max_room_height: 5,
            min_rooms: 3,
            dig_target: 0.2,
            max_room_attempts: 300,
            extra_connection_chance: 0.15,
            max_level_attempts: 10,
        }
    }

    /// Creates a configuration for testing with a small level.
    pub fn for_testing() -> Self {
        Self {
            width: 20,
            height: 12,
            min_room_width: 3,
            max_room_width: 5,
            min_room_height: 2,
            max_room_height: 3,
            min_rooms: 2,
            dig_target: 0.2,
            max_room_attempts: 100,
            extra_connection_chance: 0.0,
            max_level_attempts: 10,
        }
    }

    /// Checks that the largest room fits inside the border wall.
    pub fn validate(&self) -> DelveResult<()> {
        if self.min_room_width < 1 || self.min_room_height < 1 {
            return Err(DelveError::GenerationFailed(
                "Rooms must be at least 1x1".to_string(),
            ));
        }
        if self.min_room_width > self.max_room_width
            || self.min_room_height > self.max_room_height
        {
            return Err(DelveError::GenerationFailed(
                "Minimum room size exceeds maximum".to_string(),
            ));
        }
        if self.max_room_width > self.width - 2 || self.max_room_height > self.height - 2 {
            return Err(DelveError::GenerationFailed(format!(
                "A {}x{} room cannot fit in a {}x{} level",
                self.max_room_width, self.max_room_height, self.width, self.height
            )));
        }
        Ok(())
    }

    /// Number of tiles inside the one-tile border.
    pub fn interior_area(&self) -> usize {
        ((self.width - 2).max(0) * (self.height - 2).max(0)) as usize
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self::new(config::DUNGEON_WIDTH, config::DUNGEON_HEIGHT)
    }
}

/// A rectangular room. All tiles inside the rectangle are floor; the walls
/// around it are implicit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    /// Unique identifier for this room
    pub id: u32,
    /// Top-left floor tile
    pub top_left: Position,
    /// Floor width
    pub width: i32,
    /// Floor height
    pub height: i32,
}

impl Room {
    /// Creates a new room with the given parameters.
    ///
    /// # Examples
    ///
    /// ```
    /// use delve::{Room, Position};
    ///
    /// let room = Room::new(1, Position::new(5, 5), 4, 3);
    /// assert_eq!(room.area(), 12);
    /// assert!(room.contains(Position::new(8, 7)));
    /// assert!(!room.contains(Position::new(9, 7)));
    /// ```
    pub fn new(id: u32, top_left: Position, width: i32, height: i32) -> Self {
        Self {
            id,
            top_left,
            width,
            height,
        }
    }

    /// Gets the bottom-right floor tile.
    pub fn bottom_right(&self) -> Position {
        Position::new(
            self.top_left.x + self.width - 1,
            self.top_left.y + self.height - 1,
        )
    }

    /// Gets the center position of the room.
    pub fn center(&self) -> Position {
        Position::new(
            self.top_left.x + self.width / 2,
            self.top_left.y + self.height / 2,
        )
    }

    pub fn area(&self) -> usize {
        (self.width * self.height) as usize
    }

    /// Checks if a position is inside this room.
    pub fn contains(&self, pos: Position) -> bool {
        let bottom_right = self.bottom_right();
        pos.x >= self.top_left.x
            && pos.y >= self.top_left.y
            && pos.x <= bottom_right.x
            && pos.y <= bottom_right.y
    }

    /// Checks if this room comes within `margin` tiles of another room.
    pub fn overlaps(&self, other: &Room, margin: i32) -> bool {
        let a = self.bottom_right();
        let b = other.bottom_right();
        !(self.top_left.x > b.x + margin
            || other.top_left.x > a.x + margin
            || self.top_left.y > b.y + margin
            || other.top_left.y > a.y + margin)
    }

    /// Gets all floor positions within this room.
    pub fn floor_positions(&self) -> Vec<Position> {
        let bottom_right = self.bottom_right();
        (self.top_left.y..=bottom_right.y)
            .flat_map(|y| (self.top_left.x..=bottom_right.x).map(move |x| Position::new(x, y)))
            .collect()
    }
}

/// A freshly dug level: the floor plan plus every floor tile as spawn space.
#[derive(Debug, Clone)]
pub struct Dungeon {
    pub map: TileMap,
    pub free_spaces: FreeSpacePool,
    pub rooms: Vec<Room>,
}

/// Trait for procedural generators.
pub trait Generator<T> {
    /// Generates content using the provided configuration and random number generator.
    fn generate(&self, config: &GenerationConfig, rng: &mut StdRng) -> DelveResult<T>;

    /// Validates that the generated content meets requirements.
    fn validate(&self, content: &T, config: &GenerationConfig) -> DelveResult<()>;

    /// Gets the generator type name for logging and debugging.
    fn generator_type(&self) -> &'static str;
}

/// Utility functions for generation algorithms.
pub mod utils {
    use super::*;

    /// Checks that a level has floor and that all of it is one region.
    pub fn validate_map(map: &TileMap) -> DelveResult<()> {
        if map.is_empty() {
            return Err(DelveError::GenerationFailed(
                "Level has no floor tiles".to_string(),
            ));
        }

        if !map.is_connected() {
            return Err(DelveError::GenerationFailed(
                "Level floor is split into disconnected regions".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_generation_config_creation() {
        let config = GenerationConfig::default();
        assert_eq!(config.width, 50);
        assert_eq!(config.height, 25);
        assert!(config.validate().is_ok());
        assert!(GenerationConfig::for_testing().validate().is_ok());
    }

    #[test]
    fn test_generation_config_rejects_oversized_rooms() {
        let mut config = GenerationConfig::new(10, 10);
        config.max_room_width = 9;
        assert!(config.validate().is_err());

        let mut config = GenerationConfig::new(50, 25);
        config.min_room_height = 6;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_room_geometry() {
        let room = Room::new(1, Position::new(5, 5), 10, 8);

        assert_eq!(room.bottom_right(), Position::new(14, 12));
        assert_eq!(room.center(), Position::new(10, 9));

        assert!(room.contains(Position::new(5, 5)));
        assert!(room.contains(Position::new(14, 12)));
        assert!(!room.contains(Position::new(4, 5)));
        assert!(!room.contains(Position::new(15, 12)));
    }

    #[test]
    fn test_room_overlap_with_margin() {
        let room1 = Room::new(1, Position::new(5, 5), 4, 4); // 5..=8
        let touching = Room::new(2, Position::new(9, 5), 3, 3);
        let one_gap = Room::new(3, Position::new(10, 5), 3, 3);
        let far = Room::new(4, Position::new(30, 20), 3, 3);

        // Margin 1 demands a wall tile between rooms
        assert!(!room1.overlaps(&touching, 0));
        assert!(room1.overlaps(&touching, 1));
        assert!(!room1.overlaps(&one_gap, 1));
        assert!(room1.overlaps(&one_gap, 2));
        assert!(!room1.overlaps(&far, 1));
        assert!(room1.overlaps(&room1, 0));
    }

    #[test]
    fn test_room_floor_positions() {
        let room = Room::new(1, Position::new(2, 3), 3, 2);
        let floor: HashSet<_> = room.floor_positions().into_iter().collect();

        assert_eq!(floor.len(), 6);
        assert!(floor.iter().all(|pos| room.contains(*pos)));
    }

    #[test]
    fn test_validate_map() {
        assert!(utils::validate_map(&TileMap::new(5, 5)).is_err());

        let split = TileMap::from_floors(5, 5, vec![Position::new(1, 1), Position::new(3, 3)])
            .unwrap();
        assert!(utils::validate_map(&split).is_err());

        let joined = TileMap::from_floors(5, 5, vec![Position::new(1, 1), Position::new(2, 1)])
            .unwrap();
        assert!(utils::validate_map(&joined).is_ok());
    }
}
