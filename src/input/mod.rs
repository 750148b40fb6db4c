//! # Input Module
//!
//! Key mapping for player commands.
//!
//! Two movement layouts are understood at once:
//! - `w a s d` for the four cardinal steps, `q e z c` for diagonals
//! - phone-style digits, with `1 2 3` on top: `2` up, `8` down, `4` left,
//!   `6` right, `1` `3` `7` `9` diagonals

use crate::{Action, Direction};

/// Input handler for turning key presses into player inputs.
#[derive(Debug, Clone)]
pub struct InputHandler {
    /// Whether the phone-style digit layout is active
    pub digit_keys_enabled: bool,
}

impl Default for InputHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl InputHandler {
    /// Creates a new input handler.
    ///
    /// # Examples
    ///
    /// ```
    /// use delve::{Direction, InputHandler, PlayerInput};
    ///
    /// let input_handler = InputHandler::new();
    /// assert_eq!(input_handler.map_key('w'), Some(PlayerInput::Move(Direction::North)));
    /// assert_eq!(input_handler.map_key('2'), Some(PlayerInput::Move(Direction::North)));
    /// ```
    pub fn new() -> Self {
        Self {
            digit_keys_enabled: true,
        }
    }

    /// Maps one key to an input, or `None` if the key means nothing.
    ///
    /// Letters are case-insensitive.
    pub fn map_key(&self, key: char) -> Option<PlayerInput> {
        let key = key.to_ascii_lowercase();

        let direction = match key {
            'w' => Some(Direction::North),
            's' => Some(Direction::South),
            'a' => Some(Direction::West),
            'd' => Some(Direction::East),
            'q' => Some(Direction::Northwest),
            'e' => Some(Direction::Northeast),
            'z' => Some(Direction::Southwest),
            'c' => Some(Direction::Southeast),
            _ if self.digit_keys_enabled => match key {
                '2' => Some(Direction::North),
                '8' => Some(Direction::South),
                '4' => Some(Direction::West),
                '6' => Some(Direction::East),
                '1' => Some(Direction::Northwest),
                '3' => Some(Direction::Northeast),
                '7' => Some(Direction::Southwest),
                '9' => Some(Direction::Southeast),
                _ => None,
            },
            _ => None,
        };
        if let Some(direction) = direction {
            return Some(PlayerInput::Move(direction));
        }

        match key {
            'h' => Some(PlayerInput::UsePotion),
            '5' if self.digit_keys_enabled => Some(PlayerInput::UsePotion),
            'r' => Some(PlayerInput::Restart),
            'l' => Some(PlayerInput::ToggleLook),
            'x' => Some(PlayerInput::Quit),
            '?' => Some(PlayerInput::Help),
            _ => None,
        }
    }

    /// Maps every recognised key in a line of text, in order.
    pub fn map_line(&self, line: &str) -> Vec<PlayerInput> {
        line.chars().filter_map(|key| self.map_key(key)).collect()
    }

    /// Converts an input to an engine action.
    ///
    /// Inputs that only affect the front end (look mode, help, quit) have no
    /// action.
    pub fn input_to_action(&self, input: PlayerInput) -> Option<Action> {
        match input {
            PlayerInput::Move(direction) => Some(Action::Move(direction)),
            PlayerInput::UsePotion => Some(Action::UsePotion),
            PlayerInput::Restart => Some(Action::Restart),
            PlayerInput::ToggleLook | PlayerInput::Help | PlayerInput::Quit => None,
        }
    }
}

/// Player input types that can be processed by the input handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerInput {
    /// Move in a direction, or move the look cursor while looking
    Move(Direction),
    /// Drink a health potion
    UsePotion,
    /// Start a new game
    Restart,
    /// Enter or leave look mode
    ToggleLook,
    /// Show the key reference
    Help,
    /// Quit the game
    Quit,
}

/// One-screen key reference.
pub const HELP_TEXT: &str = "\
Move:    w a s d, diagonals q e z c (or digits 2 8 4 6, diagonals 1 3 7 9)
Potion:  h or 5
Look:    l, then move the cursor; l again to leave
Restart: r    Quit: x    Help: ?";
