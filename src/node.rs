//! Search tree node representation.
//!
//! Each node owns one game state together with the statistics gathered for it.
//! Nodes live in the arena of a [`SearchTree`](crate::SearchTree) and point at each
//! other through [`NodeId`] indices; the parent index is a non-owning back link.

use crate::error::SearchError;
use crate::GameState;
use rand::Rng;

/// Index into the node arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// A node in the Monte Carlo Search Tree.
///
/// `total_score` is always accumulated from the point of view of the player who
/// made `incoming_move`, i.e. the player to move at the parent. A parent can
/// therefore rank its children by their mean score directly.
pub struct SearchNode<S: GameState> {
    /// Position represented by this node. Never mutated after creation.
    pub(crate) state: S,
    /// Parent node (None for root)
    pub(crate) parent: Option<NodeId>,
    /// Children in expansion order.
    pub(crate) children: Vec<NodeId>,
    /// Move that led here from the parent (None for a planted root)
    pub(crate) incoming_move: Option<S::Move>,
    /// Number of times this node has been backpropagated through
    pub(crate) visits: u32,
    /// Sum of rewards from the incoming mover's perspective
    pub(crate) total_score: f64,
    /// Legal moves not yet expanded into children
    pub(crate) untried_moves: Vec<S::Move>,
    /// Cached `state.is_terminal()`
    terminal: bool,
}

impl<S: GameState> SearchNode<S> {
    /// Creates an unvisited node for `state`.
    ///
    /// # Errors
    /// [`SearchError::NoLegalMoves`] if the state is not terminal yet offers no moves.
    pub fn new(
        state: S,
        parent: Option<NodeId>,
        incoming_move: Option<S::Move>,
    ) -> Result<Self, SearchError> {
        let terminal = state.is_terminal();
        let untried_moves = if terminal {
            Vec::new()
        } else {
            let moves = state.get_possible_moves();
            if moves.is_empty() {
                return Err(SearchError::NoLegalMoves);
            }
            moves
        };

        Ok(Self {
            state,
            parent,
            children: Vec::new(),
            incoming_move,
            visits: 0,
            total_score: 0.0,
            untried_moves,
            terminal,
        })
    }

    pub fn state(&self) -> &S {
        &self.state
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn incoming_move(&self) -> Option<&S::Move> {
        self.incoming_move.as_ref()
    }

    pub fn visits(&self) -> u32 {
        self.visits
    }

    pub fn total_score(&self) -> f64 {
        self.total_score
    }

    pub fn untried_moves(&self) -> &[S::Move] {
        &self.untried_moves
    }

    #[inline]
    pub fn is_terminal(&self) -> bool {
        self.terminal
    }

    #[inline]
    pub fn has_untried_moves(&self) -> bool {
        !self.untried_moves.is_empty()
    }

    /// True once every legal move has a child, or for terminal nodes.
    pub fn is_fully_expanded(&self) -> bool {
        self.untried_moves.is_empty() && (!self.children.is_empty() || self.terminal)
    }

    /// Mean reward, or `None` while the node is unvisited.
    ///
    /// Selection treats `None` as better than any visited sibling, so every child
    /// is tried once before averages are compared.
    #[inline]
    pub fn score_estimate(&self) -> Option<f64> {
        if self.visits == 0 {
            None
        } else {
            Some(self.total_score / self.visits as f64)
        }
    }

    /// Mean reward used for the final move choice; unvisited nodes rank last.
    #[inline]
    pub fn mean_score(&self) -> f64 {
        self.score_estimate().unwrap_or(f64::NEG_INFINITY)
    }

    /// Removes and returns one untried move chosen uniformly at random.
    pub(crate) fn take_untried_move<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<S::Move> {
        if self.untried_moves.is_empty() {
            return None;
        }
        let idx = rng.random_range(0..self.untried_moves.len());
        Some(self.untried_moves.swap_remove(idx))
    }

    /// Records one backpropagated reward in `[0, 1]`.
    #[inline]
    pub(crate) fn record(&mut self, reward: f64) {
        debug_assert!((0.0..=1.0).contains(&reward), "reward {reward} out of range");
        self.visits += 1;
        self.total_score += reward;
        debug_assert!(
            self.total_score >= 0.0 && self.total_score <= self.visits as f64 + 1e-9,
            "score {} exceeds visits {}",
            self.total_score,
            self.visits
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::nim::{NimMove, NimState};
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256PlusPlus;

    #[test]
    fn test_new_node_lists_moves() {
        let node = SearchNode::new(NimState::new(5, 3), None, None).unwrap();

        assert!(node.parent().is_none());
        assert_eq!(node.visits(), 0);
        assert_eq!(node.total_score(), 0.0);
        assert!(node.has_untried_moves());
        assert_eq!(node.untried_moves().len(), 3);
        assert!(!node.is_fully_expanded());
        assert!(node.score_estimate().is_none());
    }

    #[test]
    fn test_terminal_node() {
        let node = SearchNode::new(NimState::new(0, 3), None, None).unwrap();

        assert!(node.is_terminal());
        assert!(!node.has_untried_moves());
        assert!(node.is_fully_expanded());
    }

    #[test]
    fn test_score_estimate_after_updates() {
        let mut node = SearchNode::new(NimState::new(4, 2), None, None).unwrap();
        assert_eq!(node.mean_score(), f64::NEG_INFINITY);

        node.record(1.0);
        node.record(0.0);
        node.record(0.5);
        node.record(0.5);

        assert_eq!(node.visits(), 4);
        assert!((node.score_estimate().unwrap() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_take_untried_move_drains_each_move_once() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(3);
        let mut node = SearchNode::new(NimState::new(10, 3), None, None).unwrap();

        let mut taken = Vec::new();
        while let Some(mv) = node.take_untried_move(&mut rng) {
            taken.push(mv);
        }
        taken.sort_by_key(|m| m.0);

        assert_eq!(taken, vec![NimMove(1), NimMove(2), NimMove(3)]);
        assert!(node.take_untried_move(&mut rng).is_none());
    }
}
