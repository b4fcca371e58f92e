//! # Game Controller Module - Authoritative Match State
//!
//! The `GameController` plays the referee's part in a match: it owns the "real"
//! game state, checks every move against the rules before applying it, and keeps
//! the move history. Agents only ever see clones or references of that state; the
//! positions inside their search trees are their own.
//!
//! ## Key Benefits
//! - **Move Validation**: illegal moves are rejected before they touch the state
//! - **Consistency**: one source of truth for both agents
//! - **Auditability**: complete move history with timestamps

use crate::GameState;
use std::fmt;
use std::time::SystemTime;
use thiserror::Error;

/// Result of successfully applying a move
#[derive(Debug, Clone)]
pub struct MoveOutcome<M> {
    /// The applied move
    pub move_made: M,
    /// Player who made the move
    pub player: i32,
    /// Whether the game is now over
    pub game_over: bool,
    /// Winner if game is over (None for draw)
    pub winner: Option<i32>,
}

/// Reasons a move is rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoveValidationError {
    /// Move is not in the list of legal moves
    #[error("illegal move")]
    IllegalMove,
    /// The game is already in a terminal state
    #[error("game is already over")]
    GameAlreadyOver,
}

/// A single entry in the move history
#[derive(Debug, Clone)]
pub struct MoveHistoryEntry<M> {
    /// When the move was made
    pub timestamp: SystemTime,
    /// Player who made the move
    pub player: i32,
    /// The move that was made
    pub move_made: M,
    /// Move number (1-indexed)
    pub move_number: usize,
}

impl<M> MoveHistoryEntry<M> {
    /// Create a new move history entry
    pub fn new(player: i32, move_made: M, move_number: usize) -> Self {
        Self {
            timestamp: SystemTime::now(),
            player,
            move_made,
            move_number,
        }
    }
}

/// Current game status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStatus {
    /// Game is still in progress
    InProgress,
    /// Game ended with a winner
    Win(i32),
    /// Game ended in a draw
    Draw,
}

impl GameStatus {
    /// Check if the game is over
    pub fn is_game_over(&self) -> bool {
        !matches!(self, GameStatus::InProgress)
    }
}

/// The controller that owns the authoritative game state
///
/// # Usage
/// ```rust,ignore
/// let mut controller = GameController::new(InfexionState::new());
///
/// match controller.try_make_move(mv) {
///     Ok(outcome) if outcome.game_over => { /* report the result */ }
///     Ok(_) => { /* next turn */ }
///     Err(reason) => { /* move was rejected */ }
/// }
/// ```
#[derive(Debug, Clone)]
pub struct GameController<S: GameState> {
    /// The authoritative game state
    game_state: S,
    /// Complete history of moves made
    move_history: Vec<MoveHistoryEntry<S::Move>>,
    /// Current game status
    status: GameStatus,
}

impl<S: GameState> GameController<S> {
    /// Create a new game controller with the given initial state
    pub fn new(initial_state: S) -> Self {
        let status = Self::status_of(&initial_state);
        Self {
            game_state: initial_state,
            move_history: Vec::new(),
            status,
        }
    }

    fn status_of(state: &S) -> GameStatus {
        if !state.is_terminal() {
            GameStatus::InProgress
        } else {
            match state.get_winner() {
                Some(w) => GameStatus::Win(w),
                None => GameStatus::Draw,
            }
        }
    }

    /// Validate a move without applying it
    pub fn validate_move(&self, mv: &S::Move) -> Result<(), MoveValidationError> {
        if self.status.is_game_over() {
            return Err(MoveValidationError::GameAlreadyOver);
        }
        if !self.game_state.get_possible_moves().contains(mv) {
            return Err(MoveValidationError::IllegalMove);
        }
        Ok(())
    }

    /// Validates the move and applies it if valid.
    pub fn try_make_move(&mut self, mv: S::Move) -> Result<MoveOutcome<S::Move>, MoveValidationError> {
        self.validate_move(&mv)?;

        let player = self.game_state.get_current_player();
        let move_number = self.move_history.len() + 1;

        self.game_state.make_move(&mv);
        self.move_history
            .push(MoveHistoryEntry::new(player, mv.clone(), move_number));
        self.status = Self::status_of(&self.game_state);

        Ok(MoveOutcome {
            move_made: mv,
            player,
            game_over: self.status.is_game_over(),
            winner: self.get_winner(),
        })
    }

    /// Get a reference to the authoritative state
    pub fn state(&self) -> &S {
        &self.game_state
    }

    /// Get the current player
    pub fn get_current_player(&self) -> i32 {
        self.game_state.get_current_player()
    }

    /// Get the current game status
    pub fn get_status(&self) -> GameStatus {
        self.status
    }

    /// Check if the game is over
    pub fn is_game_over(&self) -> bool {
        self.status.is_game_over()
    }

    /// Get the winner if the game is over
    pub fn get_winner(&self) -> Option<i32> {
        match self.status {
            GameStatus::Win(w) => Some(w),
            _ => None,
        }
    }

    /// Get the complete move history
    pub fn get_move_history(&self) -> &[MoveHistoryEntry<S::Move>] {
        &self.move_history
    }

    /// Get the number of moves made
    pub fn move_count(&self) -> usize {
        self.move_history.len()
    }

    /// Get the last move made, if any
    pub fn get_last_move(&self) -> Option<&MoveHistoryEntry<S::Move>> {
        self.move_history.last()
    }

    /// Reset the game to a new initial state
    pub fn reset(&mut self, new_state: S) {
        self.status = Self::status_of(&new_state);
        self.game_state = new_state;
        self.move_history.clear();
    }

    /// Format the move history as plain text.
    ///
    /// # Arguments
    /// * `title` - Game name for the header line
    /// * `player_name` - Maps a player id to a display name
    pub fn format_history(&self, title: &str, player_name: impl Fn(i32) -> String) -> String
    where
        S::Move: fmt::Display,
    {
        if self.move_history.is_empty() {
            return String::from("No moves made yet.");
        }

        let mut output = format!("=== {} Game History ===\n\n", title);
        for entry in &self.move_history {
            output.push_str(&format!(
                "{}. {} - {}\n",
                entry.move_number,
                player_name(entry.player),
                entry.move_made
            ));
        }

        match self.status {
            GameStatus::Win(winner) => {
                output.push_str(&format!("\nResult: {} wins!\n", player_name(winner)));
            }
            GameStatus::Draw => output.push_str("\nResult: Draw\n"),
            GameStatus::InProgress => {
                output.push_str(&format!(
                    "\n(Game in progress - {} to move)\n",
                    player_name(self.get_current_player())
                ));
            }
        }
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::infexion::{player_name, HexPos, InfexionMove, InfexionState, RED};
    use crate::games::nim::{NimMove, NimState};

    fn spawn(r: u8, q: u8) -> InfexionMove {
        InfexionMove::Spawn(HexPos::new(r, q).unwrap())
    }

    #[test]
    fn test_valid_move() {
        let mut controller = GameController::new(InfexionState::new());

        let outcome = controller.try_make_move(spawn(3, 3)).unwrap();
        assert_eq!(outcome.player, RED);
        assert!(!outcome.game_over);
        assert_eq!(outcome.winner, None);
    }

    #[test]
    fn test_invalid_move_occupied() {
        let mut controller = GameController::new(InfexionState::new());
        controller.try_make_move(spawn(3, 3)).unwrap();

        assert_eq!(
            controller.try_make_move(spawn(3, 3)).unwrap_err(),
            MoveValidationError::IllegalMove
        );
        assert_eq!(controller.move_count(), 1);
    }

    #[test]
    fn test_game_over_blocks_moves() {
        let mut controller = GameController::new(NimState::new(2, 2));

        let outcome = controller.try_make_move(NimMove(2)).unwrap();
        assert!(outcome.game_over);
        assert_eq!(outcome.winner, Some(1));
        assert_eq!(controller.get_status(), GameStatus::Win(1));

        assert_eq!(
            controller.try_make_move(NimMove(1)).unwrap_err(),
            MoveValidationError::GameAlreadyOver
        );
    }

    #[test]
    fn test_move_history_and_reset() {
        let mut controller = GameController::new(InfexionState::new());
        controller.try_make_move(spawn(0, 0)).unwrap();
        controller.try_make_move(spawn(6, 6)).unwrap();

        assert_eq!(controller.move_count(), 2);
        assert_eq!(controller.get_move_history()[0].player, 1);
        assert_eq!(controller.get_move_history()[1].player, -1);
        assert_eq!(controller.get_last_move().unwrap().move_number, 2);

        controller.reset(InfexionState::new());
        assert_eq!(controller.move_count(), 0);
        assert!(matches!(controller.get_status(), GameStatus::InProgress));
    }

    #[test]
    fn test_format_history() {
        let mut controller = GameController::new(InfexionState::new());
        controller.try_make_move(spawn(2, 4)).unwrap();

        let history = controller.format_history("Infexion", |p| player_name(p).to_string());
        assert!(history.contains("Infexion Game History"));
        assert!(history.contains("1. Red - SPAWN 2 4"));
        assert!(history.contains("Blue to move"));
    }
}
