//! # Persistence Module
//!
//! JSON save format and the save slot it is written to.
//!
//! A save captures everything needed to resume play exactly: the level
//! number, end-of-run flags, the message log, the floor plan, what has been
//! seen, the player and every living enemy and item. The random number
//! generator and the free-space pool are not saved; a loaded game draws fresh
//! randomness from then on.
//!
//! ```text
//! { "game":     { "currentLevel", "gameOver", "victory", "messages",
//!                 "map", "explored", "visible" },
//!   "player":   { "x", "y", "hp", "maxHp", "attack", "gold", "potions" },
//!   "entities": { "enemies": [{ "x", "y", "type", "hp", "maxHp", "attack", "xp" }],
//!                 "items":   [{ "x", "y", "type" }] } }
//! ```

use crate::config;
use crate::{
    DelveError, DelveResult, Enemy, EnemyKind, FreeSpacePool, GameState, GameStatus, Item,
    ItemKind, MessageLog, Player, Position, RejectReason, TileMap, TurnOutcome,
};
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// File name used by the binary when no save path is given.
pub const DEFAULT_SAVE_FILE: &str = "delve-save.json";

#[derive(Debug, Serialize, Deserialize)]
struct SaveFile {
    game: SavedGame,
    player: SavedPlayer,
    entities: SavedEntities,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SavedGame {
    current_level: u32,
    game_over: bool,
    victory: bool,
    messages: Vec<String>,
    /// Floor tiles; everything else is wall
    map: Vec<Position>,
    #[serde(default)]
    explored: Vec<Position>,
    #[serde(default)]
    visible: Vec<Position>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SavedPlayer {
    x: i32,
    y: i32,
    hp: i32,
    max_hp: i32,
    attack: i32,
    gold: u32,
    potions: u32,
}

#[derive(Debug, Serialize, Deserialize)]
struct SavedEntities {
    enemies: Vec<SavedEnemy>,
    items: Vec<SavedItem>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SavedEnemy {
    x: i32,
    y: i32,
    #[serde(rename = "type")]
    kind: EnemyKind,
    hp: i32,
    max_hp: i32,
    attack: i32,
    xp: u32,
}

#[derive(Debug, Serialize, Deserialize)]
struct SavedItem {
    x: i32,
    y: i32,
    #[serde(rename = "type")]
    kind: ItemKind,
}

fn sorted(positions: impl IntoIterator<Item = Position>) -> Vec<Position> {
    let mut positions: Vec<Position> = positions.into_iter().collect();
    positions.sort();
    positions
}

fn corrupt(reason: impl Into<String>) -> DelveError {
    DelveError::CorruptSave(reason.into())
}

/// Serializes a game state to its JSON save blob.
///
/// Tile lists are written in sorted order, so equal states give equal blobs.
pub fn encode(state: &GameState) -> DelveResult<String> {
    let save = SaveFile {
        game: SavedGame {
            current_level: state.level,
            game_over: state.is_game_over(),
            victory: state.is_victory(),
            messages: state.messages.to_vec(),
            map: state.map.floor_positions(),
            explored: sorted(state.visibility.explored.iter().copied()),
            visible: sorted(state.visibility.visible.iter().copied()),
        },
        player: SavedPlayer {
            x: state.player.position.x,
            y: state.player.position.y,
            hp: state.player.hp,
            max_hp: state.player.max_hp,
            attack: state.player.attack,
            gold: state.player.gold,
            potions: state.player.potions,
        },
        entities: SavedEntities {
            enemies: state
                .enemies
                .iter()
                .map(|enemy| SavedEnemy {
                    x: enemy.position.x,
                    y: enemy.position.y,
                    kind: enemy.kind,
                    hp: enemy.hp,
                    max_hp: enemy.max_hp,
                    attack: enemy.attack,
                    xp: enemy.xp,
                })
                .collect(),
            items: state
                .items
                .iter()
                .map(|item| SavedItem {
                    x: item.position.x,
                    y: item.position.y,
                    kind: item.kind,
                })
                .collect(),
        },
    };

    Ok(serde_json::to_string(&save)?)
}

/// Restores a game state from a save blob, with fresh randomness.
pub fn decode(blob: &str) -> DelveResult<GameState> {
    decode_with_rng(blob, StdRng::from_entropy())
}

/// Restores a game state from a save blob, continuing with the given RNG.
///
/// The blob must describe a state the engine could have reached; anything
/// else is reported as [`DelveError::CorruptSave`].
pub fn decode_with_rng(blob: &str, rng: StdRng) -> DelveResult<GameState> {
    let save: SaveFile = serde_json::from_str(blob)?;
    let mut state = GameState::unstarted(rng);
    let (width, height) = (state.generation.width, state.generation.height);

    let game = save.game;
    if game.current_level < 1 || game.current_level > config::MAX_LEVELS {
        return Err(corrupt(format!("level {} out of range", game.current_level)));
    }
    state.level = game.current_level;
    state.status = match (game.game_over, game.victory) {
        (false, false) => GameStatus::Playing,
        (true, false) => GameStatus::GameOver,
        (false, true) => GameStatus::Victory,
        (true, true) => return Err(corrupt("both game over and victory are set")),
    };

    if game.messages.len() > config::MESSAGE_LOG_CAPACITY {
        return Err(corrupt(format!("{} messages saved", game.messages.len())));
    }
    state.messages = MessageLog::from_lines(game.messages);

    state.map = TileMap::from_floors(width, height, game.map)
        .map_err(|error| corrupt(format!("map: {}", error)))?;
    if state.map.is_empty() {
        return Err(corrupt("map has no floor"));
    }
    state.free_spaces = FreeSpacePool::default();

    for pos in game.explored.iter().chain(game.visible.iter()) {
        if !state.map.is_valid_position(*pos) {
            return Err(corrupt(format!("seen tile {} out of bounds", pos)));
        }
    }
    state.visibility.visible = game.visible.into_iter().collect();
    state.visibility.explored = game.explored.into_iter().collect();
    let visible = state.visibility.visible.clone();
    state.visibility.explored.extend(visible);

    state.player = restore_player(&save.player, &state.map, state.status)?;

    let mut occupied = HashSet::from([state.player.position]);
    for saved in &save.entities.enemies {
        let enemy = restore_enemy(saved, &state.map)?;
        if !occupied.insert(enemy.position) {
            return Err(corrupt(format!("two creatures on {}", enemy.position)));
        }
        state.enemies.push(enemy);
    }

    let mut item_tiles = HashSet::new();
    for saved in &save.entities.items {
        let position = Position::new(saved.x, saved.y);
        if !state.map.is_floor(position) {
            return Err(corrupt(format!("{:?} on wall at {}", saved.kind, position)));
        }
        if !item_tiles.insert(position) {
            return Err(corrupt(format!("two items on {}", position)));
        }
        state.items.push(Item::new(saved.kind, position));
    }

    debug!(
        "Decoded save: level {}, {} enemies, {} items",
        state.level,
        state.enemies.len(),
        state.items.len()
    );

    Ok(state)
}

fn restore_player(saved: &SavedPlayer, map: &TileMap, status: GameStatus) -> DelveResult<Player> {
    let position = Position::new(saved.x, saved.y);
    if !map.is_floor(position) {
        return Err(corrupt(format!("player on wall at {}", position)));
    }
    if saved.max_hp <= 0 || saved.hp > saved.max_hp {
        return Err(corrupt(format!("player hp {}/{}", saved.hp, saved.max_hp)));
    }
    if saved.hp <= 0 && status != GameStatus::GameOver {
        return Err(corrupt("dead player in a running game"));
    }
    if saved.attack < config::DAMAGE_JITTER {
        return Err(corrupt(format!("player attack {}", saved.attack)));
    }

    Ok(Player {
        position,
        hp: saved.hp,
        max_hp: saved.max_hp,
        attack: saved.attack,
        gold: saved.gold,
        potions: saved.potions,
    })
}

fn restore_enemy(saved: &SavedEnemy, map: &TileMap) -> DelveResult<Enemy> {
    let position = Position::new(saved.x, saved.y);
    if !map.is_floor(position) {
        return Err(corrupt(format!("{:?} on wall at {}", saved.kind, position)));
    }
    if saved.hp <= 0 || saved.hp > saved.max_hp {
        return Err(corrupt(format!(
            "{:?} hp {}/{}",
            saved.kind, saved.hp, saved.max_hp
        )));
    }
    // Below the jitter floor a hit could heal its target
    if saved.attack < config::DAMAGE_JITTER {
        return Err(corrupt(format!("{:?} attack {}", saved.kind, saved.attack)));
    }

    Ok(Enemy {
        position,
        kind: saved.kind,
        hp: saved.hp,
        max_hp: saved.max_hp,
        attack: saved.attack,
        xp: saved.xp,
    })
}

/// A single save slot holding one blob.
pub trait SaveStore {
    /// Reads the blob, or `None` if nothing has been saved yet.
    fn load(&self) -> DelveResult<Option<String>>;

    /// Replaces the blob.
    fn save(&mut self, blob: &str) -> DelveResult<()>;

    /// Empties the slot. Clearing an empty slot is not an error.
    fn clear(&mut self) -> DelveResult<()>;
}

/// Save slot backed by one file on disk.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }
}

impl SaveStore for FileStore {
    fn load(&self) -> DelveResult<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(blob) => Ok(Some(blob)),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(None),
            Err(error) => Err(error.into()),
        }
    }

    fn save(&mut self, blob: &str) -> DelveResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, blob)?;
        Ok(())
    }

    fn clear(&mut self) -> DelveResult<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(()),
            Err(error) => Err(error.into()),
        }
    }
}

/// In-memory save slot, for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    slot: Option<String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_blob(blob: impl Into<String>) -> Self {
        Self {
            slot: Some(blob.into()),
        }
    }

    pub fn blob(&self) -> Option<&str> {
        self.slot.as_deref()
    }
}

impl SaveStore for MemoryStore {
    fn load(&self) -> DelveResult<Option<String>> {
        Ok(self.slot.clone())
    }

    fn save(&mut self, blob: &str) -> DelveResult<()> {
        self.slot = Some(blob.to_string());
        Ok(())
    }

    fn clear(&mut self) -> DelveResult<()> {
        self.slot = None;
        Ok(())
    }
}

impl GameState {
    /// Resumes the saved game, or starts a new one.
    ///
    /// An empty slot is the normal first-run case. An unreadable or corrupt
    /// save is logged and discarded in favour of a new game.
    pub fn load_or_new(store: &dyn SaveStore, seed: Option<u64>) -> DelveResult<Self> {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        match store.load() {
            Ok(Some(blob)) => match decode_with_rng(&blob, rng) {
                Ok(state) => {
                    info!("Resumed saved game on level {}", state.level);
                    return Ok(state);
                }
                Err(error) => warn!("Discarding unreadable save: {}", error),
            },
            Ok(None) => debug!("No save found, starting a new game"),
            Err(error) => warn!("Could not read save slot: {}", error),
        }

        GameState::new(seed)
    }

    /// Writes this state to the store.
    pub fn save_to(&self, store: &mut dyn SaveStore) -> DelveResult<()> {
        store.save(&encode(self)?)
    }

    /// Writes this state to the store, logging instead of failing.
    pub fn autosave(&self, store: &mut dyn SaveStore) {
        if let Err(error) = self.save_to(store) {
            warn!("Save failed: {}", error);
        }
    }

    /// Clears the slot, restarts, and saves the new run.
    ///
    /// A run still in progress is left alone, store included.
    pub fn restart_and_save(&mut self, store: &mut dyn SaveStore) -> DelveResult<TurnOutcome> {
        if !self.is_terminal() {
            return Ok(TurnOutcome::Rejected(RejectReason::RunInProgress));
        }
        if let Err(error) = store.clear() {
            warn!("Could not clear save slot: {}", error);
        }
        self.restart()?;
        self.autosave(store);
        Ok(TurnOutcome::Restarted)
    }
}
