//! MCTS configuration parameters.

use crate::error::ConfigError;
use std::time::Duration;

/// Exploration weight used when nothing else is configured.
pub const DEFAULT_EXPLORATION: f64 = 1.41;

/// Reward credited for a playout that ends without a winner.
pub const DEFAULT_DRAW_REWARD: f64 = 0.5;

/// Configuration for Monte Carlo Tree Search.
#[derive(Debug, Clone)]
pub struct MctsConfig {
    /// Number of iterations per search when the caller does not pass a budget.
    pub iterations: u32,

    /// Exploration constant `C` of the UCB1 formula.
    /// Higher values encourage exploration, lower values favor exploitation.
    /// Typical range: 1.0 - 2.0
    pub exploration_constant: f64,

    /// Reward for a drawn playout. Must lie strictly between loss (0) and win (1).
    pub draw_reward: f64,

    /// Independent playouts run for every selected leaf. Values above 1 run the
    /// playouts on the thread pool and backpropagate their mean once.
    pub rollouts_per_leaf: usize,

    /// Worker threads for the rollout pool. 0 lets rayon decide.
    pub num_threads: usize,

    /// Seed for the engine's random stream. `None` draws one from the OS.
    pub seed: Option<u64>,

    /// Optional wall-clock cap, checked only between iterations.
    pub time_limit: Option<Duration>,

    /// Keep the subtree of the reached position between moves.
    pub reuse_tree: bool,
}

impl Default for MctsConfig {
    fn default() -> Self {
        Self {
            iterations: 1_000,
            exploration_constant: DEFAULT_EXPLORATION,
            draw_reward: DEFAULT_DRAW_REWARD,
            rollouts_per_leaf: 1,
            num_threads: 0,
            seed: None,
            time_limit: None,
            reuse_tree: true,
        }
    }
}

impl MctsConfig {
    /// Create a fast, reproducible config for testing.
    pub fn for_testing() -> Self {
        Self {
            iterations: 200,
            num_threads: 1,
            seed: Some(0x5EED),
            ..Self::default()
        }
    }

    /// Builder pattern: set the default iteration budget.
    pub fn with_iterations(mut self, n: u32) -> Self {
        self.iterations = n;
        self
    }

    /// Builder pattern: set the UCB1 exploration constant.
    pub fn with_exploration(mut self, c: f64) -> Self {
        self.exploration_constant = c;
        self
    }

    /// Builder pattern: set the draw reward.
    pub fn with_draw_reward(mut self, reward: f64) -> Self {
        self.draw_reward = reward;
        self
    }

    /// Builder pattern: set playouts per leaf and the worker count.
    pub fn with_parallel_rollouts(mut self, rollouts_per_leaf: usize, num_threads: usize) -> Self {
        self.rollouts_per_leaf = rollouts_per_leaf;
        self.num_threads = num_threads;
        self
    }

    /// Builder pattern: fix the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Builder pattern: cap the wall-clock time of one search.
    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }

    /// Builder pattern: enable or disable tree reuse between moves.
    pub fn with_tree_reuse(mut self, reuse: bool) -> Self {
        self.reuse_tree = reuse;
        self
    }

    /// Checks the numeric parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let c = self.exploration_constant;
        if !c.is_finite() || c < 0.0 {
            return Err(ConfigError::Exploration(c));
        }
        let draw = self.draw_reward;
        if !(draw > 0.0 && draw < 1.0) {
            return Err(ConfigError::DrawReward(draw));
        }
        if self.rollouts_per_leaf == 0 {
            return Err(ConfigError::RolloutsPerLeaf);
        }
        Ok(())
    }
}
