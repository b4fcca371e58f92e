//! UCB1 child selection.

use crate::node::{NodeId, SearchNode};
use crate::GameState;

/// Upper Confidence Bound 1 selection policy.
///
/// `UCB1(n) = mean(n) + C * sqrt(ln(N_parent) / N(n))`
#[derive(Debug, Clone, Copy)]
pub struct Ucb1 {
    /// Exploration constant `C`
    pub exploration: f64,
}

impl Ucb1 {
    pub fn new(exploration: f64) -> Self {
        Self { exploration }
    }

    /// Calculates the UCB1 score of a child.
    /// This score balances exploration and exploitation.
    ///
    /// # Arguments
    /// * `total_score` - Sum of rewards recorded at the child.
    /// * `visits` - Visits of the child.
    /// * `parent_visits` - Visits of the parent node.
    ///
    /// # Returns
    /// `+inf` for an unvisited child, and also when the parent itself was never
    /// visited (where `ln(0)` is undefined).
    #[inline]
    pub fn score(&self, total_score: f64, visits: u32, parent_visits: u32) -> f64 {
        if visits == 0 || parent_visits == 0 {
            return f64::INFINITY;
        }
        let visits = visits as f64;
        total_score / visits + self.exploration * ((parent_visits as f64).ln() / visits).sqrt()
    }

    /// Scores `child` relative to `parent`.
    #[inline]
    pub fn score_node<S: GameState>(&self, child: &SearchNode<S>, parent: &SearchNode<S>) -> f64 {
        self.score(child.total_score, child.visits, parent.visits)
    }

    /// Picks the child with the highest UCB1 score.
    ///
    /// Ties go to the first child in expansion order. Returns `None` for a node
    /// without children.
    pub fn select_child<S: GameState>(
        &self,
        arena: &[SearchNode<S>],
        parent: NodeId,
    ) -> Option<NodeId> {
        let parent_node = &arena[parent.index()];
        let mut best: Option<(NodeId, f64)> = None;
        for &child in &parent_node.children {
            let score = self.score_node(&arena[child.index()], parent_node);
            match best {
                Some((_, best_score)) if score <= best_score => {}
                _ => best = Some((child, score)),
            }
        }
        best.map(|(id, _)| id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::nim::NimState;

    fn node(visits: u32, total_score: f64) -> SearchNode<NimState> {
        let mut n = SearchNode::new(NimState::new(5, 2), None, None).unwrap();
        n.visits = visits;
        n.total_score = total_score;
        n
    }

    #[test]
    fn test_ucb1_formula() {
        let policy = Ucb1::new(1.5);
        let expected = 0.5 + 1.5 * ((100f64).ln() / 10.0).sqrt();
        assert!((policy.score(5.0, 10, 100) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_unvisited_child_is_infinite() {
        let policy = Ucb1::new(1.41);
        assert_eq!(policy.score(0.0, 0, 50), f64::INFINITY);
        assert_eq!(policy.score(3.0, 4, 0), f64::INFINITY);
    }

    #[test]
    fn test_unvisited_outranks_strong_sibling() {
        let policy = Ucb1::new(0.0);
        let mut parent = node(11, 5.0);
        parent.children = vec![NodeId(1), NodeId(2)];
        let arena = vec![parent, node(10, 10.0), node(0, 0.0)];

        assert_eq!(policy.select_child(&arena, NodeId(0)), Some(NodeId(2)));
    }

    #[test]
    fn test_ties_pick_first_child() {
        let policy = Ucb1::new(1.0);
        let mut parent = node(8, 4.0);
        parent.children = vec![NodeId(1), NodeId(2), NodeId(3)];
        let arena = vec![parent, node(4, 2.0), node(4, 2.0), node(4, 2.0)];

        assert_eq!(policy.select_child(&arena, NodeId(0)), Some(NodeId(1)));
    }

    #[test]
    fn test_exploration_prefers_less_visited() {
        let policy = Ucb1::new(2.0);
        let mut parent = node(101, 50.0);
        parent.children = vec![NodeId(1), NodeId(2)];
        // Same mean, far fewer visits on the second child.
        let arena = vec![parent, node(95, 47.5), node(6, 3.0)];

        assert_eq!(policy.select_child(&arena, NodeId(0)), Some(NodeId(2)));
    }

    #[test]
    fn test_no_children() {
        let policy = Ucb1::new(1.0);
        let arena = vec![node(3, 1.0)];
        assert_eq!(policy.select_child(&arena, NodeId(0)), None);
    }
}
