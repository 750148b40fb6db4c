//! # Actions
//!
//! The closed set of things a player can ask the engine to do, and the single
//! dispatcher that routes them to the turn engine.

use crate::{DelveResult, Direction, GameState, RejectReason, TurnOutcome};
use log::debug;
use serde::{Deserialize, Serialize};

/// A player command, already decoded from whatever input device produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    /// Step, attack, or pick up in a direction
    Move(Direction),
    /// Drink a health potion
    UsePotion,
    /// Abandon the run and start over on level 1
    Restart,
}

impl GameState {
    /// Applies one action and reports what came of it.
    ///
    /// Restart is only accepted once the run has ended; everything else is
    /// only accepted while it lasts.
    ///
    /// # Examples
    ///
    /// ```
    /// use delve::{Action, GameState, GameStatus, TurnOutcome};
    ///
    /// let mut game_state = GameState::new(Some(3)).unwrap();
    /// let outcome = game_state.apply(Action::Restart).unwrap();
    /// assert!(!outcome.consumed_turn());
    ///
    /// game_state.status = GameStatus::GameOver;
    /// let outcome = game_state.apply(Action::Restart).unwrap();
    /// assert_eq!(outcome, TurnOutcome::Restarted);
    /// assert_eq!(game_state.level, 1);
    /// ```
    pub fn apply(&mut self, action: Action) -> DelveResult<TurnOutcome> {
        let outcome = match action {
            Action::Move(direction) => self.step_player(direction)?,
            Action::UsePotion => self.use_potion()?,
            Action::Restart if !self.is_terminal() => {
                TurnOutcome::Rejected(RejectReason::RunInProgress)
            }
            Action::Restart => {
                self.restart()?;
                TurnOutcome::Restarted
            }
        };

        debug!("{:?} -> {:?}", action, outcome);
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{GameStatus, Position, TileMap};
    use rand::{rngs::StdRng, SeedableRng};

    fn corridor() -> GameState {
        let mut state = GameState::unstarted(StdRng::seed_from_u64(1));
        state.map = TileMap::from_floors(8, 3, (1..7).map(|x| Position::new(x, 1))).unwrap();
        state.player.position = Position::new(1, 1);
        state.recompute_visibility();
        state
    }

    #[test]
    fn test_move_action() {
        let mut state = corridor();
        assert_eq!(
            state.apply(Action::Move(Direction::East)).unwrap(),
            TurnOutcome::Acted
        );
        assert_eq!(state.player.position, Position::new(2, 1));

        assert_eq!(
            state.apply(Action::Move(Direction::North)).unwrap(),
            TurnOutcome::Rejected(RejectReason::Blocked)
        );
    }

    #[test]
    fn test_restart_allowed_after_victory() {
        let mut state = corridor();
        state.status = GameStatus::Victory;

        assert_eq!(
            state.apply(Action::UsePotion).unwrap(),
            TurnOutcome::Rejected(RejectReason::SessionOver)
        );
        assert_eq!(state.apply(Action::Restart).unwrap(), TurnOutcome::Restarted);
        assert_eq!(state.status, GameStatus::Playing);
    }

    #[test]
    fn test_restart_ignored_mid_run() {
        let mut state = corridor();
        state.level = 3;
        state.player.gold = 300;
        let player = state.player.clone();

        assert_eq!(
            state.apply(Action::Restart).unwrap(),
            TurnOutcome::Rejected(RejectReason::RunInProgress)
        );
        assert_eq!(state.level, 3);
        assert_eq!(state.player, player);
        assert_eq!(state.status, GameStatus::Playing);
    }
}
