//! # Delve
//!
//! A turn-based dungeon crawl engine: five procedurally dug levels, shadowcast
//! fog of war, a greedy-chase monster AI and a JSON save format.
//!
//! ## Architecture Overview
//!
//! The engine is a single owned [`GameState`] value that every operation takes
//! by `&mut`. There is no ambient global state:
//!
//! - **Generation**: room-and-corridor digger plus enemy and item spawners
//! - **Visibility**: symmetric shadowcasting with a permanent explored set
//! - **Turn engine**: player actions, melee, enemy turn, level transitions
//! - **Persistence**: flat JSON blob that restores play exactly
//!
//! Rendering and input live in thin adapter modules so the binary is playable
//! in a terminal, but the engine never calls into them.

pub mod game;
pub mod generation;
pub mod input;
pub mod persistence;
pub mod rendering;

pub use game::*;
pub use generation::*;
pub use input::*;
pub use persistence::*;
pub use rendering::*;

/// Core error type for the Delve engine.
#[derive(thiserror::Error, Debug)]
pub enum DelveError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Save blob parsed but does not describe a reachable game state
    #[error("Corrupt save: {0}")]
    CorruptSave(String),

    /// Game state is invalid
    #[error("Invalid game state: {0}")]
    InvalidState(String),

    /// Generation failed
    #[error("Generation failed: {0}")]
    GenerationFailed(String),
}

/// Result type used throughout the Delve codebase.
pub type DelveResult<T> = Result<T, DelveError>;

/// Version information for the game.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Game configuration constants.
pub mod config {
    /// Dungeon width in tiles
    pub const DUNGEON_WIDTH: i32 = 50;

    /// Dungeon height in tiles
    pub const DUNGEON_HEIGHT: i32 = 25;

    /// Descending from this level wins the game
    pub const MAX_LEVELS: u32 = 5;

    /// How far the player can see
    pub const FOV_RADIUS: i32 = 8;

    /// Number of messages kept in the rolling log
    pub const MESSAGE_LOG_CAPACITY: usize = 5;

    /// Player starting health
    pub const PLAYER_MAX_HP: i32 = 50;

    /// Player starting attack
    pub const PLAYER_ATTACK: i32 = 8;

    /// Health restored by one potion
    pub const POTION_HEAL: i32 = 20;

    /// Melee damage is `attack + jitter` with jitter in `-DAMAGE_JITTER..=DAMAGE_JITTER`
    pub const DAMAGE_JITTER: i32 = 2;

    /// Smallest gold pile
    pub const GOLD_PILE_MIN: u32 = 10;

    /// Largest gold pile
    pub const GOLD_PILE_MAX: u32 = 30;
}
