//! # Dungeon Generation
//!
//! Room-and-corridor digger.
//!
//! The digger works on a level that starts as solid rock:
//! 1. Drop a random room somewhere inside the border, keeping a wall between rooms
//! 2. Dig an L-shaped corridor from the previous room's center to the new one
//! 3. Repeat until enough of the level is floor or the attempt budget runs out
//! 4. Dig a few extra corridors between random rooms so the layout has loops
//!
//! Chaining every room to its predecessor keeps the floor a single connected
//! region; the result is still checked with a reachability pass.

use crate::generation::utils;
use crate::{
    DelveError, DelveResult, Dungeon, FreeSpacePool, GenerationConfig, Generator, Position, Room,
    TileMap,
};
use log::debug;
use rand::{rngs::StdRng, Rng};

/// Level generator that carves rooms and joins them with corridors.
#[derive(Debug, Clone, Default)]
pub struct Digger;

impl Digger {
    /// Creates a new digger.
    ///
    /// # Examples
    ///
    /// ```
    /// use delve::{Digger, GenerationConfig, Generator};
    /// use rand::{rngs::StdRng, SeedableRng};
    ///
    /// let mut rng = StdRng::seed_from_u64(7);
    /// let dungeon = Digger::new().generate(&GenerationConfig::default(), &mut rng).unwrap();
    /// assert!(dungeon.map.is_connected());
    /// ```
    pub fn new() -> Self {
        Self
    }

    /// Generates a level, retrying when a layout fails validation.
    pub fn generate_level(
        &self,
        config: &GenerationConfig,
        rng: &mut StdRng,
    ) -> DelveResult<Dungeon> {
        let mut last_error = None;

        for attempt in 1..=config.max_level_attempts.max(1) {
            match self.generate(config, rng) {
                Ok(dungeon) => return Ok(dungeon),
                Err(error) => {
                    debug!("Level layout attempt {} rejected: {}", attempt, error);
                    last_error = Some(error);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| {
            DelveError::GenerationFailed("No level attempts were made".to_string())
        }))
    }

    /// Places rooms until the dig target is met or attempts run out.
    fn place_rooms(
        &self,
        map: &mut TileMap,
        config: &GenerationConfig,
        rng: &mut StdRng,
    ) -> DelveResult<Vec<Room>> {
        let target = (config.interior_area() as f64 * config.dig_target).ceil() as usize;
        let mut rooms: Vec<Room> = Vec::new();

        for _ in 0..config.max_room_attempts {
            if map.floor_count() >= target && rooms.len() >= config.min_rooms {
                break;
            }

            let room = self.generate_room_candidate(config, rng, rooms.len() as u32);
            if rooms.iter().any(|existing| room.overlaps(existing, 1)) {
                continue;
            }

            self.carve_room(map, &room)?;
            if let Some(previous) = rooms.last() {
                let horizontal_first = rng.gen_bool(0.5);
                self.carve_corridor(map, previous.center(), room.center(), horizontal_first)?;
            }
            rooms.push(room);
        }

        if rooms.is_empty() {
            return Err(DelveError::GenerationFailed(
                "Failed to place any rooms".to_string(),
            ));
        }

        Ok(rooms)
    }

    /// Picks a random room that lies inside the border wall.
    fn generate_room_candidate(
        &self,
        config: &GenerationConfig,
        rng: &mut StdRng,
        room_id: u32,
    ) -> Room {
        let width = rng.gen_range(config.min_room_width..=config.max_room_width);
        let height = rng.gen_range(config.min_room_height..=config.max_room_height);
        let x = rng.gen_range(1..=config.width - 1 - width);
        let y = rng.gen_range(1..=config.height - 1 - height);

        Room::new(room_id, Position::new(x, y), width, height)
    }

    fn carve_room(&self, map: &mut TileMap, room: &Room) -> DelveResult<()> {
        for pos in room.floor_positions() {
            map.carve(pos)?;
        }
        Ok(())
    }

    /// Carves an L-shaped corridor between two points.
    fn carve_corridor(
        &self,
        map: &mut TileMap,
        start: Position,
        end: Position,
        horizontal_first: bool,
    ) -> DelveResult<()> {
        let corner = if horizontal_first {
            Position::new(end.x, start.y)
        } else {
            Position::new(start.x, end.y)
        };

        self.carve_line(map, start, corner)?;
        self.carve_line(map, corner, end)
    }

    /// Carves a straight horizontal or vertical run, both ends included.
    fn carve_line(&self, map: &mut TileMap, from: Position, to: Position) -> DelveResult<()> {
        let mut pos = from;
        map.carve(pos)?;
        while pos != to {
            pos = pos.step_toward(to);
            map.carve(pos)?;
        }
        Ok(())
    }

    /// Adds corridors between random room pairs to create loops.
    fn add_extra_connections(
        &self,
        map: &mut TileMap,
        rooms: &[Room],
        config: &GenerationConfig,
        rng: &mut StdRng,
    ) -> DelveResult<()> {
        if rooms.len() < 3 {
            return Ok(());
        }

        let extra_connections = (rooms.len() as f64 * config.extra_connection_chance) as usize;
        for _ in 0..extra_connections {
            let first = rng.gen_range(0..rooms.len());
            let second = rng.gen_range(0..rooms.len());
            if first != second {
                let horizontal_first = rng.gen_bool(0.5);
                self.carve_corridor(
                    map,
                    rooms[first].center(),
                    rooms[second].center(),
                    horizontal_first,
                )?;
            }
        }

        Ok(())
    }
}

impl Generator<Dungeon> for Digger {
    fn generate(&self, config: &GenerationConfig, rng: &mut StdRng) -> DelveResult<Dungeon> {
        config.validate()?;

        let mut map = TileMap::new(config.width, config.height);
        let rooms = self.place_rooms(&mut map, config, rng)?;
        self.add_extra_connections(&mut map, &rooms, config, rng)?;

        let dungeon = Dungeon {
            free_spaces: FreeSpacePool::from_map(&map),
            map,
            rooms,
        };
        self.validate(&dungeon, config)?;

        debug!(
            "{} dug {} rooms, {} floor tiles",
            self.generator_type(),
            dungeon.rooms.len(),
            dungeon.map.floor_count()
        );

        Ok(dungeon)
    }

    fn validate(&self, dungeon: &Dungeon, config: &GenerationConfig) -> DelveResult<()> {
        if dungeon.map.width != config.width || dungeon.map.height != config.height {
            return Err(DelveError::GenerationFailed(format!(
                "Level is {}x{}, expected {}x{}",
                dungeon.map.width, dungeon.map.height, config.width, config.height
            )));
        }
        utils::validate_map(&dungeon.map)
    }

    fn generator_type(&self) -> &'static str {
        "Digger"
    }
}
