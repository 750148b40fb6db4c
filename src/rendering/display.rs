//! # Display Management
//!
//! ASCII map rendering.
//!
//! Draw order, lowest to highest:
//! - floor and wall tiles that are visible or remembered
//! - items, including remembered ones out of sight
//! - enemies, only while visible
//! - the player, always
//! - the look cursor, if any

use crate::rendering::ui;
use crate::{GameState, Position};

const WALL: char = '#';
const FLOOR: char = '.';
const UNSEEN: char = ' ';
const PLAYER: char = '@';
const CURSOR: char = 'X';

/// Builds text frames for a game state.
#[derive(Debug, Clone, Default)]
pub struct AsciiDisplay {
    /// Tile under inspection, drawn as a cursor and described in the HUD
    pub look_cursor: Option<Position>,
}

impl AsciiDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Renders the map followed by the HUD, one line per row.
    pub fn render(&self, game_state: &GameState) -> String {
        let mut lines = self.render_map(game_state);
        lines.push(String::new());
        lines.extend(ui::hud_lines(game_state, self.look_cursor));
        lines.join("\n")
    }

    /// Renders only the map rows.
    pub fn render_map(&self, game_state: &GameState) -> Vec<String> {
        let map = &game_state.map;
        let mut grid = vec![vec![UNSEEN; map.width.max(0) as usize]; map.height.max(0) as usize];

        let mut put = |pos: Position, glyph: char| {
            if map.is_valid_position(pos) {
                grid[pos.y as usize][pos.x as usize] = glyph;
            }
        };

        for &pos in &game_state.visibility.explored {
            put(pos, if map.is_floor(pos) { FLOOR } else { WALL });
        }

        for item in &game_state.items {
            if game_state.visibility.is_explored(item.position)
                || game_state.visibility.is_visible(item.position)
            {
                put(item.position, item.kind.glyph());
            }
        }

        for enemy in &game_state.enemies {
            if game_state.visibility.is_visible(enemy.position) {
                put(enemy.position, enemy.kind.template().glyph);
            }
        }

        put(game_state.player.position, PLAYER);

        if let Some(cursor) = self.look_cursor {
            put(cursor, CURSOR);
        }

        grid.into_iter()
            .map(|row| row.into_iter().collect::<String>().trim_end().to_string())
            .collect()
    }

    /// Moves the look cursor by a delta, keeping it inside the map.
    pub fn move_cursor(&mut self, game_state: &GameState, delta: Position) {
        let current = self.look_cursor.unwrap_or(game_state.player.position);
        let moved = current + delta;
        if game_state.map.is_valid_position(moved) {
            self.look_cursor = Some(moved);
        }
    }

    /// Enters look mode on the player's tile, or leaves it, noting either in
    /// the message log.
    pub fn toggle_look(&mut self, game_state: &mut GameState) {
        match self.look_cursor {
            Some(_) => {
                self.look_cursor = None;
                game_state.add_message("Look mode off.");
            }
            None => {
                self.look_cursor = Some(game_state.player.position);
                game_state
                    .add_message("Look mode: Use movement keys to look around. Press L to exit.");
            }
        }
    }
}

/// Renders a full frame with no look cursor.
///
/// # Examples
///
/// ```
/// use delve::{render_frame, GameState};
///
/// let game_state = GameState::new(Some(1)).unwrap();
/// let frame = render_frame(&game_state);
/// assert!(frame.contains('@'));
/// assert!(frame.contains("Level: 1/5"));
/// ```
pub fn render_frame(game_state: &GameState) -> String {
    AsciiDisplay::new().render(game_state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Enemy, EnemyKind, Item, ItemKind, TileMap};
    use rand::{rngs::StdRng, SeedableRng};

    fn small_state() -> GameState {
        let mut state = GameState::unstarted(StdRng::seed_from_u64(0));
        state.map = TileMap::from_floors(
            7,
            3,
            (1..6).map(|x| Position::new(x, 1)),
        )
        .unwrap();
        state.player.position = Position::new(1, 1);
        state
    }

    #[test]
    fn test_unexplored_is_blank() {
        let state = small_state();
        let rows = AsciiDisplay::new().render_map(&state);

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1], " @");
        assert_eq!(rows[0], "");
    }

    #[test]
    fn test_visible_tiles_and_entities() {
        let mut state = small_state();
        state
            .enemies
            .push(Enemy::new(EnemyKind::Orc, Position::new(4, 1)));
        state.items.push(Item::new(ItemKind::Gold, Position::new(3, 1)));
        state.recompute_visibility();

        let rows = AsciiDisplay::new().render_map(&state);
        assert_eq!(rows[0], "#######");
        assert_eq!(rows[1], "#@.$o.#");
        assert_eq!(rows[2], "#######");
    }

    #[test]
    fn test_remembered_items_shown_enemies_hidden() {
        let mut state = small_state();
        state
            .visibility
            .explored
            .extend([Position::new(3, 1), Position::new(4, 1)]);
        state.items.push(Item::new(ItemKind::Potion, Position::new(3, 1)));
        state
            .enemies
            .push(Enemy::new(EnemyKind::Goblin, Position::new(4, 1)));

        let rows = AsciiDisplay::new().render_map(&state);
        assert_eq!(rows[1], " @ !.");
    }

    #[test]
    fn test_look_cursor_stays_on_map() {
        let mut state = small_state();
        let mut display = AsciiDisplay::new();

        display.toggle_look(&mut state);
        assert_eq!(display.look_cursor, Some(Position::new(1, 1)));
        assert!(state.messages.latest().unwrap().starts_with("Look mode: "));

        display.move_cursor(&state, Position::new(-1, 0));
        display.move_cursor(&state, Position::new(-1, 0));
        assert_eq!(display.look_cursor, Some(Position::new(0, 1)));

        let rows = display.render_map(&state);
        assert_eq!(rows[1], "X@");

        display.toggle_look(&mut state);
        assert_eq!(display.look_cursor, None);
        assert_eq!(state.messages.latest(), Some("Look mode off."));
    }
}
