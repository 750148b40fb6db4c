//! # Rendering Module
//!
//! Plain-text presentation of a [`GameState`](crate::GameState).
//!
//! The engine never calls into this module. The binary uses it to draw an
//! ASCII frame after every turn: the map with fog of war, a status block,
//! the message log and the end-of-run banner.

pub mod display;
pub mod ui;

pub use display::*;
pub use ui::*;
