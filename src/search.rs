//! The MCTS engine.
//!
//! [`Mcts`] owns the search tree for one player across a whole match. Each call to
//! [`Mcts::search`] first re-roots the retained tree at the given position (or
//! plants a fresh root), then runs the iteration budget:
//!
//! 1. Selection: UCB1 descent to a node that is terminal or has untried moves
//! 2. Expansion: one random untried move becomes a new child
//! 3. Simulation: random playout(s) from the new leaf
//! 4. Backpropagation: reward flipped at every level up to the root
//!
//! With `rollouts_per_leaf > 1` the playouts of one leaf run on a rayon pool. Each
//! worker gets its own Xoshiro stream seeded from the engine's stream before
//! dispatch, and the tree itself is only ever touched by the calling thread, so a
//! fixed seed gives the same search regardless of thread count.

use crate::config::MctsConfig;
use crate::error::SearchError;
use crate::node::NodeId;
use crate::policy::Ucb1;
use crate::rollout::{reward_for, RandomRollout, RolloutPolicy};
use crate::tree::SearchTree;
use crate::GameState;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::{debug, trace, warn};

/// Summary of one search episode.
#[derive(Debug, Clone, Default)]
pub struct SearchStatistics {
    /// Iterations actually run (less than the budget only under a time limit)
    pub iterations: u32,
    /// Root visits inherited from earlier turns
    pub carried_visits: u32,
    /// Root visits after the search
    pub root_visits: u32,
    /// Nodes in the tree after the search
    pub total_nodes: usize,
    /// Deepest level below the root
    pub max_depth: usize,
    /// Mean score of the chosen child (from the searching player's view)
    pub best_mean: f64,
    pub elapsed: Duration,
}

/// The main MCTS engine.
pub struct Mcts<S: GameState, P: RolloutPolicy<S> = RandomRollout> {
    /// Retained search tree; `None` until the first search or after a position
    /// outside the tree was reached.
    tree: Option<SearchTree<S>>,
    config: MctsConfig,
    policy: Ucb1,
    rollout: P,
    rng: Xoshiro256PlusPlus,
    /// Rollout workers, only built when several playouts run per leaf.
    pool: Option<ThreadPool>,
}

impl<S: GameState> Mcts<S> {
    /// Creates an engine with uniformly random playouts.
    pub fn new(config: MctsConfig) -> Result<Self, SearchError> {
        Self::with_rollout(config, RandomRollout)
    }
}

impl<S: GameState, P: RolloutPolicy<S>> Mcts<S, P> {
    /// Creates an engine with a custom playout policy.
    ///
    /// # Errors
    /// Rejects invalid configurations and reports thread pool failures.
    pub fn with_rollout(config: MctsConfig, rollout: P) -> Result<Self, SearchError> {
        config.validate()?;

        let rng = match config.seed {
            Some(seed) => Xoshiro256PlusPlus::seed_from_u64(seed),
            None => Xoshiro256PlusPlus::from_rng(&mut rand::rng()),
        };
        let pool = if config.rollouts_per_leaf > 1 {
            let builder = ThreadPoolBuilder::new();
            let builder = if config.num_threads > 0 {
                builder.num_threads(config.num_threads)
            } else {
                builder
            };
            Some(builder.build()?)
        } else {
            None
        };

        Ok(Self {
            tree: None,
            policy: Ucb1::new(config.exploration_constant),
            config,
            rollout,
            rng,
            pool,
        })
    }

    pub fn config(&self) -> &MctsConfig {
        &self.config
    }

    /// The retained tree, if any.
    pub fn tree(&self) -> Option<&SearchTree<S>> {
        self.tree.as_ref()
    }

    /// Drops the retained tree.
    pub fn reset(&mut self) {
        self.tree = None;
    }

    /// Runs a search episode from `state` and returns the chosen move.
    pub fn select_action(&mut self, state: &S, iterations: u32) -> Result<S::Move, SearchError> {
        self.search(state, iterations).map(|(mv, _)| mv)
    }

    /// Runs `iterations` select/expand/simulate/backpropagate cycles from `state`.
    ///
    /// Returns the move of the root child with the highest mean score together
    /// with statistics about the episode. A root with a single legal move needs at
    /// most one iteration.
    ///
    /// # Errors
    /// * [`SearchError::TerminalRoot`] if `state` is terminal
    /// * [`SearchError::NoLegalMoves`] if the game reports no moves for a live position
    /// * [`SearchError::NoVisitedChildren`] if no root child was visited
    pub fn search(
        &mut self,
        state: &S,
        iterations: u32,
    ) -> Result<(S::Move, SearchStatistics), SearchError> {
        if state.is_terminal() {
            return Err(SearchError::TerminalRoot);
        }
        self.sync_root(state)?;

        let tree = self.tree_ref()?;
        let carried_visits = tree.root_node().visits();
        let only_move = tree.only_root_move();
        let budget = if only_move.is_some() {
            iterations.min(1)
        } else {
            iterations
        };

        let start = Instant::now();
        let mut done = 0;
        while done < budget {
            if let Some(limit) = self.config.time_limit {
                if start.elapsed() >= limit {
                    break;
                }
            }
            self.run_iteration()?;
            done += 1;
        }

        let tree = self.tree_ref()?;
        let (mv, best_mean) = match (only_move, tree.best_child()) {
            (Some(mv), best) => (mv, best.map_or(f64::NEG_INFINITY, |id| tree.get(id).mean_score())),
            (None, Some(id)) => {
                let node = tree.get(id);
                let mv = node
                    .incoming_move()
                    .cloned()
                    .ok_or(SearchError::NoVisitedChildren(iterations))?;
                (mv, node.mean_score())
            }
            (None, None) => return Err(SearchError::NoVisitedChildren(iterations)),
        };

        let stats = SearchStatistics {
            iterations: done,
            carried_visits,
            root_visits: tree.root_node().visits(),
            total_nodes: tree.len(),
            max_depth: tree.max_depth(),
            best_mean,
            elapsed: start.elapsed(),
        };
        debug!(
            iterations = stats.iterations,
            carried = stats.carried_visits,
            nodes = stats.total_nodes,
            depth = stats.max_depth,
            mean = stats.best_mean,
            chosen = ?mv,
            "search finished"
        );
        Ok((mv, stats))
    }

    /// Keeps the tree in step with a move the other player made, without searching.
    ///
    /// Re-roots at the child reached by `mv` if it holds `state_after`, otherwise at
    /// any node holding `state_after`. Returns `true` if statistics were carried
    /// over; otherwise the tree is dropped and the next search starts fresh.
    pub fn notify_opponent_action(&mut self, state_after: &S, mv: &S::Move) -> bool {
        if !self.config.reuse_tree {
            self.tree = None;
            return false;
        }
        let Some(tree) = self.tree.as_mut() else {
            return false;
        };

        let target = tree
            .child_by_move(tree.root(), mv)
            .filter(|&id| tree.get(id).state() == state_after)
            .or_else(|| tree.lookup(state_after));
        self.reroot_or_drop(target, mv)
    }

    /// Advances the root of the tree to the node corresponding to the given move.
    /// This is useful to preserve the search tree between moves.
    ///
    /// Returns `true` if statistics were carried over.
    pub fn advance_root(&mut self, mv: &S::Move) -> bool {
        if !self.config.reuse_tree {
            self.tree = None;
            return false;
        }
        let Some(tree) = self.tree.as_ref() else {
            return false;
        };

        let target = tree.child_by_move(tree.root(), mv).or_else(|| {
            let next = tree.root_node().state().apply(mv);
            tree.lookup(&next)
        });
        self.reroot_or_drop(target, mv)
    }

    /// Returns statistics for the children of the root node.
    /// The stats are a map from a move to a tuple of (total score, visits).
    pub fn get_root_children_stats(&self) -> HashMap<S::Move, (f64, u32)> {
        let Some(tree) = self.tree.as_ref() else {
            return HashMap::new();
        };
        tree.root_node()
            .children()
            .iter()
            .filter_map(|&id| {
                let node = tree.get(id);
                node.incoming_move()
                    .map(|mv| (mv.clone(), (node.total_score(), node.visits())))
            })
            .collect()
    }

    fn tree_ref(&self) -> Result<&SearchTree<S>, SearchError> {
        // sync_root always leaves a tree behind; a missing tree means the root
        // could not be planted.
        self.tree.as_ref().ok_or(SearchError::NoLegalMoves)
    }

    fn reroot_or_drop(&mut self, target: Option<NodeId>, mv: &S::Move) -> bool {
        match (self.tree.as_mut(), target) {
            (Some(tree), Some(id)) => {
                let before = tree.len();
                tree.reroot(id);
                trace!(?mv, kept = tree.len(), dropped = before - tree.len(), "re-rooted");
                true
            }
            _ => {
                debug!(?mv, "reached position not in tree; discarding it");
                self.tree = None;
                false
            }
        }
    }

    /// Makes the tree root hold `state`, reusing the retained tree when possible.
    fn sync_root(&mut self, state: &S) -> Result<(), SearchError> {
        if self.config.reuse_tree {
            if let Some(tree) = self.tree.as_mut() {
                if tree.root_node().state() == state {
                    return Ok(());
                }
                if let Some(id) = tree.lookup(state) {
                    tree.reroot(id);
                    trace!(kept = tree.len(), "re-rooted at searched position");
                    return Ok(());
                }
                warn!("searched position not in retained tree; planting a fresh root");
            }
        }
        self.tree = Some(SearchTree::new(state.clone())?);
        Ok(())
    }

    /// One full select/expand/simulate/backpropagate cycle.
    fn run_iteration(&mut self) -> Result<(), SearchError> {
        let Self {
            tree,
            config,
            policy,
            rollout,
            rng,
            pool,
        } = self;
        let tree = tree.as_mut().ok_or(SearchError::NoLegalMoves)?;

        // --- Selection Phase ---
        let mut path = tree.select(policy);
        let selected = path[path.len() - 1];

        // --- Expansion Phase ---
        if let Some(child) = tree.expand(selected, rng)? {
            path.push(child);
        }
        let leaf_id = path[path.len() - 1];
        let leaf = tree.get(leaf_id);

        // The reward is taken for the player who moved into the leaf.
        let mover = match leaf.parent() {
            Some(parent) => tree.get(parent).state().get_current_player(),
            None => -leaf.state().get_current_player(),
        };

        // --- Simulation Phase ---
        let reward = if leaf.is_terminal() {
            reward_for(leaf.state().get_winner(), mover, config.draw_reward)
        } else {
            match pool.as_ref() {
                Some(pool) => {
                    let seeds: Vec<u64> = (0..config.rollouts_per_leaf)
                        .map(|_| rng.random::<u64>())
                        .collect();
                    let state = leaf.state();
                    let rollout = &*rollout;
                    let draw = config.draw_reward;
                    let rewards = pool.install(|| {
                        seeds
                            .par_iter()
                            .map(|&seed| {
                                let mut worker_rng = Xoshiro256PlusPlus::seed_from_u64(seed);
                                rollout
                                    .playout(state, &mut worker_rng)
                                    .map(|winner| reward_for(winner, mover, draw))
                            })
                            .collect::<Result<Vec<f64>, SearchError>>()
                    })?;
                    rewards.iter().sum::<f64>() / rewards.len() as f64
                }
                None => {
                    let winner = rollout.playout(leaf.state(), rng)?;
                    reward_for(winner, mover, config.draw_reward)
                }
            }
        };

        // --- Backpropagation Phase ---
        tree.backpropagate(&path, reward);
        Ok(())
    }
}
