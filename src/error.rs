//! Error types for the search engine.

use thiserror::Error;

/// Errors that can occur during MCTS search.
#[derive(Debug, Error)]
pub enum SearchError {
    /// Action selection was requested for a position that is already over.
    #[error("cannot select an action from a terminal state")]
    TerminalRoot,

    /// A non-terminal state reported no legal moves. The game's terminal check and
    /// its move generator disagree.
    #[error("non-terminal state has no legal moves")]
    NoLegalMoves,

    /// The search finished without visiting any child of the root.
    #[error("search produced no visited root children (iteration budget {0})")]
    NoVisitedChildren(u32),

    #[error("invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigError),

    #[error("failed to build rollout thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Reasons an [`MctsConfig`](crate::MctsConfig) is rejected.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("exploration constant must be finite and non-negative, got {0}")]
    Exploration(f64),

    #[error("draw reward must lie strictly between 0 and 1, got {0}")]
    DrawReward(f64),

    #[error("rollouts per leaf must be at least 1")]
    RolloutsPerLeaf,
}
