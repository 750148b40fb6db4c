//! # World Representation
//!
//! The per-level floor map and the pool of unclaimed floor tiles used while
//! spawning.
//!
//! Only floor is stored. Any in-bounds coordinate that is not floor is wall,
//! and everything out of bounds is wall as well.

use crate::{DelveError, DelveResult, Position};
use pathfinding::prelude::bfs_reach;
use rand::Rng;
use std::collections::HashSet;

/// Walkability map for a single level.
///
/// # Examples
///
/// ```
/// use delve::{Position, TileMap};
///
/// let mut map = TileMap::new(10, 10);
/// assert!(!map.is_floor(Position::new(3, 3)));
///
/// map.carve(Position::new(3, 3)).unwrap();
/// assert!(map.is_floor(Position::new(3, 3)));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileMap {
    /// Level width in tiles
    pub width: i32,
    /// Level height in tiles
    pub height: i32,
    floors: HashSet<Position>,
}

impl TileMap {
    /// Creates a map of the given size that is solid wall everywhere.
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            width,
            height,
            floors: HashSet::new(),
        }
    }

    /// Builds a map from an explicit list of floor tiles.
    ///
    /// Fails if any tile lies outside the bounds.
    pub fn from_floors(
        width: i32,
        height: i32,
        floors: impl IntoIterator<Item = Position>,
    ) -> DelveResult<Self> {
        let mut map = Self::new(width, height);
        for pos in floors {
            map.carve(pos)?;
        }
        Ok(map)
    }

    /// Whether the position lies inside the level bounds.
    pub fn is_valid_position(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.y >= 0 && pos.x < self.width && pos.y < self.height
    }

    /// Whether the tile is walkable.
    pub fn is_floor(&self, pos: Position) -> bool {
        self.floors.contains(&pos)
    }

    /// Light passes through floor and nothing else.
    pub fn is_transparent(&self, pos: Position) -> bool {
        self.is_floor(pos)
    }

    /// Turns a wall tile into floor. Carving floor again is a no-op.
    pub fn carve(&mut self, pos: Position) -> DelveResult<()> {
        if !self.is_valid_position(pos) {
            return Err(DelveError::InvalidState(format!(
                "Cannot carve {} outside a {}x{} level",
                pos, self.width, self.height
            )));
        }
        self.floors.insert(pos);
        Ok(())
    }

    /// Number of floor tiles.
    pub fn floor_count(&self) -> usize {
        self.floors.len()
    }

    /// Whether the level has no floor at all.
    pub fn is_empty(&self) -> bool {
        self.floors.is_empty()
    }

    /// All floor tiles in row-major order.
    pub fn floor_positions(&self) -> Vec<Position> {
        let mut positions: Vec<Position> = self.floors.iter().copied().collect();
        positions.sort_by_key(|pos| (pos.y, pos.x));
        positions
    }

    /// Floor tiles reachable from `start` by cardinal steps.
    pub fn reachable_from(&self, start: Position) -> HashSet<Position> {
        if !self.is_floor(start) {
            return HashSet::new();
        }
        bfs_reach(start, |pos| {
            pos.cardinal_adjacent_positions()
                .into_iter()
                .filter(|next| self.is_floor(*next))
                .collect::<Vec<_>>()
        })
        .collect()
    }

    /// Whether every floor tile can reach every other one.
    ///
    /// An empty map is not considered connected.
    pub fn is_connected(&self) -> bool {
        match self.floors.iter().next() {
            Some(&start) => self.reachable_from(start).len() == self.floors.len(),
            None => false,
        }
    }
}

/// Floor tiles not yet claimed by the player, an enemy, or an item.
///
/// Drawing removes the chosen tile, so two spawns can never share a tile.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FreeSpacePool {
    spaces: Vec<Position>,
}

impl FreeSpacePool {
    /// Creates a pool over the given tiles.
    pub fn new(spaces: Vec<Position>) -> Self {
        Self { spaces }
    }

    /// Pool of every floor tile in the map.
    pub fn from_map(map: &TileMap) -> Self {
        Self::new(map.floor_positions())
    }

    /// Removes and returns a uniformly chosen tile, or None once exhausted.
    pub fn draw<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<Position> {
        if self.spaces.is_empty() {
            return None;
        }
        let index = rng.gen_range(0..self.spaces.len());
        Some(self.spaces.swap_remove(index))
    }

    pub fn len(&self) -> usize {
        self.spaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spaces.is_empty()
    }

    pub fn contains(&self, pos: Position) -> bool {
        self.spaces.contains(&pos)
    }
}
