//! # User Interface Elements
//!
//! Status block, message log and tile descriptions for look mode.

use crate::config;
use crate::{GameState, GameStatus, Position};

const HEALTH_BAR_WIDTH: usize = 20;

/// Text bar for a health value, e.g. `[#####-----]`.
pub fn health_bar(hp: i32, max_hp: i32, width: usize) -> String {
    let filled = if max_hp > 0 {
        let ratio = hp.clamp(0, max_hp) as f64 / max_hp as f64;
        (ratio * width as f64).round() as usize
    } else {
        0
    };
    format!("[{}{}]", "#".repeat(filled), "-".repeat(width - filled))
}

/// The lines shown under the map.
pub fn hud_lines(game_state: &GameState, look_cursor: Option<Position>) -> Vec<String> {
    let player = &game_state.player;
    let mut lines = vec![
        format!(
            "HP: {} {}/{}{}",
            health_bar(player.hp, player.max_hp, HEALTH_BAR_WIDTH),
            player.hp,
            player.max_hp,
            if player.is_badly_hurt() { " (badly hurt)" } else { "" }
        ),
        format!(
            "Level: {}/{}  ATK: {}  Gold: {}  Potions: {}",
            game_state.level,
            config::MAX_LEVELS,
            player.attack,
            player.gold,
            player.potions
        ),
        String::new(),
    ];

    lines.extend(game_state.messages.iter().map(str::to_string));

    if let Some(pos) = look_cursor {
        lines.push(String::new());
        lines.push(format!("[LOOK MODE] {}", describe_tile(game_state, pos)));
    }

    match game_state.status {
        GameStatus::GameOver => lines.push("GAME OVER - Press R to Restart".to_string()),
        GameStatus::Victory => lines.push(format!("VICTORY! Final Score: {}", player.gold)),
        GameStatus::Playing => {}
    }

    lines
}

fn capitalized(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Describes what the player knows about a tile.
///
/// Enemies are only reported while in sight; items are remembered.
///
/// # Examples
///
/// ```
/// use delve::{describe_tile, GameState, Position};
///
/// let game_state = GameState::new(Some(1)).unwrap();
/// let here = describe_tile(&game_state, game_state.player.position);
/// assert!(here.starts_with("You (50/50 HP"));
/// assert_eq!(
///     describe_tile(&game_state, Position::new(-5, -5)),
///     "You haven't explored this area yet."
/// );
/// ```
pub fn describe_tile(game_state: &GameState, pos: Position) -> String {
    let visible = game_state.visibility.is_visible(pos);
    let explored = game_state.visibility.is_explored(pos);

    if !visible && !explored {
        return "You haven't explored this area yet.".to_string();
    }

    if !game_state.map.is_floor(pos) {
        return "A solid stone wall.".to_string();
    }

    if visible {
        if let Some(index) = game_state.enemy_index_at(pos) {
            let enemy = &game_state.enemies[index];
            return format!(
                "{} ({}/{} HP) - {}",
                capitalized(enemy.kind.name()),
                enemy.hp,
                enemy.max_hp,
                enemy.kind.template().description
            );
        }
    }

    if let Some(index) = game_state.item_index_at(pos) {
        return game_state.items[index].kind.description().to_string();
    }

    let player = &game_state.player;
    if pos == player.position {
        return format!("You ({}/{} HP, {} ATK)", player.hp, player.max_hp, player.attack);
    }

    if visible {
        "An empty stone floor.".to_string()
    } else {
        "An empty stone floor (remembered).".to_string()
    }
}
