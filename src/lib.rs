//! # UCB1 Monte Carlo Tree Search
//!
//! A single-owner MCTS engine for two-player, alternating-turn, perfect-information
//! board games. Every game plugs in through the [`GameState`] trait; the engine
//! never looks inside a position beyond what the trait exposes.
//!
//! ## Search loop
//! Each iteration runs four phases over an arena-allocated [`SearchTree`]:
//! 1. **Selection**: descend from the root by UCB1 until a node that is terminal or
//!    still has untried moves
//! 2. **Expansion**: take one untried move at random and add its child node
//! 3. **Simulation**: random playout from the new leaf to a terminal position
//! 4. **Backpropagation**: add the reward to every node on the path, flipping it
//!    between players at each level
//!
//! After the iteration budget is spent, [`Mcts::select_action`] returns the move of
//! the root child with the best mean score. Between real moves the retained subtree
//! becomes the new root, so statistics gathered on earlier turns keep paying off.
//!
//! ## Usage
//! ```rust,ignore
//! use mcts::{Mcts, MctsConfig};
//! use mcts::games::infexion::InfexionState;
//!
//! let mut engine = Mcts::new(MctsConfig::default().with_seed(7))?;
//! let state = InfexionState::new();
//! let mv = engine.select_action(&state, 1_000)?;
//! let next = state.apply(&mv);
//! engine.advance_root(&mv);
//! ```

use rand::seq::IndexedRandom;
use rand::Rng;
use std::fmt::Debug;
use std::hash::Hash;

pub mod agent;
pub mod config;
pub mod error;
pub mod game_controller;
pub mod games;
pub mod node;
pub mod policy;
pub mod rollout;
pub mod search;
pub mod tree;

pub use agent::Agent;
pub use config::MctsConfig;
pub use error::{ConfigError, SearchError};
pub use node::{NodeId, SearchNode};
pub use policy::Ucb1;
pub use rollout::{RandomRollout, RolloutPolicy};
pub use search::{Mcts, SearchStatistics};
pub use tree::SearchTree;

/// The state of the game. Must be cloneable to be used in the MCTS.
///
/// `Eq` and `Hash` identify positions so the tree can find transpositions and the
/// node reached after a real move. `Send` and `Sync` are required for parallel
/// rollouts.
pub trait GameState: Clone + Eq + Hash + Send + Sync {
    /// The type of a move in the game.
    type Move: Clone + Eq + Hash + Debug + Send + Sync;

    /// Returns a vector of all possible moves from the current state.
    fn get_possible_moves(&self) -> Vec<Self::Move>;
    /// Applies a move to the state, modifying it.
    fn make_move(&mut self, mv: &Self::Move);
    /// Returns true if the game is over.
    ///
    /// Every sequence of moves must reach a terminal state in finitely many steps;
    /// rollouts rely on this and do not cap their own length.
    fn is_terminal(&self) -> bool;
    /// Returns the winner of the game, if any.
    /// Should return `Some(player_id)` if a player has won, `None` for a draw or if the game is not over.
    fn get_winner(&self) -> Option<i32>;
    /// Returns the player whose turn it is to move.
    fn get_current_player(&self) -> i32;

    /// Returns the state reached by playing `mv`, leaving `self` untouched.
    ///
    /// The engine derives every new tree state through this method, so states
    /// stored in nodes are never mutated in place.
    fn apply(&self, mv: &Self::Move) -> Self {
        let mut next = self.clone();
        next.make_move(mv);
        next
    }

    /// Returns a uniformly random legal move, or `None` if there is none.
    fn random_move<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Self::Move> {
        self.get_possible_moves().choose(rng).cloned()
    }
}
