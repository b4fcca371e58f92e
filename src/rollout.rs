//! Simulation phase: playouts and reward derivation.

use crate::error::SearchError;
use crate::GameState;
use rand::Rng;

/// Plays a position out to a terminal state.
pub trait RolloutPolicy<S: GameState>: Send + Sync {
    /// Plays a private copy of `state` to the end and returns the winner
    /// (`None` for a draw).
    ///
    /// # Errors
    /// [`SearchError::NoLegalMoves`] if a non-terminal position offers no move.
    fn playout<R: Rng + ?Sized>(&self, state: &S, rng: &mut R) -> Result<Option<i32>, SearchError>;
}

/// Uniformly random playouts.
///
/// Relies on the game to terminate every line of play; the playout length is not
/// capped here.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomRollout;

impl<S: GameState> RolloutPolicy<S> for RandomRollout {
    fn playout<R: Rng + ?Sized>(&self, state: &S, rng: &mut R) -> Result<Option<i32>, SearchError> {
        let mut sim_state = state.clone();
        while !sim_state.is_terminal() {
            let mv = sim_state.random_move(rng).ok_or(SearchError::NoLegalMoves)?;
            sim_state.make_move(&mv);
        }
        Ok(sim_state.get_winner())
    }
}

/// Converts a playout result into a reward for `player`.
///
/// `1.0` if `player` won, `0.0` if the opponent won, `draw_reward` otherwise.
#[inline]
pub fn reward_for(winner: Option<i32>, player: i32, draw_reward: f64) -> f64 {
    match winner {
        Some(w) if w == player => 1.0,
        Some(_) => 0.0,
        None => draw_reward,
    }
}
