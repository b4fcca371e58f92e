//! Turn-loop interface for an external referee.
//!
//! An [`Agent`] plays one side of a match. The referee asks it for a move with
//! [`Agent::action`] and reports every move actually played, by either side, with
//! [`Agent::turn`]. The agent keeps its own copy of the position in step with the
//! referee and moves its retained search tree along with it.

use crate::config::MctsConfig;
use crate::error::SearchError;
use crate::search::{Mcts, SearchStatistics};
use crate::GameState;
use tracing::{debug, info};

/// One player of a match, backed by a persistent search tree.
pub struct Agent<S: GameState> {
    /// Player id this agent moves for
    player: i32,
    /// The agent's view of the current position
    state: S,
    engine: Mcts<S>,
    /// Iterations per move
    iterations: u32,
    last_stats: Option<SearchStatistics>,
}

impl<S: GameState> Agent<S> {
    /// Creates an agent for `player`, starting from `initial_state`.
    ///
    /// The per-move budget is `config.iterations`.
    pub fn new(player: i32, initial_state: S, config: MctsConfig) -> Result<Self, SearchError> {
        let iterations = config.iterations;
        Ok(Self {
            player,
            state: initial_state,
            engine: Mcts::new(config)?,
            iterations,
            last_stats: None,
        })
    }

    pub fn player(&self) -> i32 {
        self.player
    }

    pub fn state(&self) -> &S {
        &self.state
    }

    pub fn engine(&self) -> &Mcts<S> {
        &self.engine
    }

    /// Statistics of the most recent search.
    pub fn last_stats(&self) -> Option<&SearchStatistics> {
        self.last_stats.as_ref()
    }

    /// Searches the current position and returns the move to play.
    ///
    /// The move is not applied; the referee reports it back through
    /// [`turn`](Self::turn) like any other move.
    pub fn action(&mut self) -> Result<S::Move, SearchError> {
        let (mv, stats) = self.engine.search(&self.state, self.iterations)?;
        info!(
            player = self.player,
            ?mv,
            iterations = stats.iterations,
            reused = stats.carried_visits,
            mean = stats.best_mean,
            "agent chose move"
        );
        self.last_stats = Some(stats);
        Ok(mv)
    }

    /// Applies a move made by `player` and re-roots the tree at the new position.
    pub fn turn(&mut self, player: i32, mv: &S::Move) {
        self.state.make_move(mv);
        let reused = if player == self.player {
            self.engine.advance_root(mv)
        } else {
            self.engine.notify_opponent_action(&self.state, mv)
        };
        debug!(agent = self.player, mover = player, ?mv, reused, "turn applied");
    }
}
