//! MCTS tree structure with arena allocation.
//!
//! Nodes are stored in a contiguous Vec and referenced by [`NodeId`] indices.
//! Children form a strict tree: every node has exactly one parent chain back to
//! the root. The node table maps positions to nodes so a position reached by a
//! real move, or by another move order, can be found again without walking the
//! tree. It may alias transposed positions but never links them.

use crate::error::SearchError;
use crate::node::{NodeId, SearchNode};
use crate::policy::Ucb1;
use crate::GameState;
use rand::Rng;
use std::collections::{HashMap, VecDeque};

/// MCTS tree with arena-based node storage.
pub struct SearchTree<S: GameState> {
    /// Arena storing all nodes
    nodes: Vec<SearchNode<S>>,
    /// Root node index (always 0 after construction or re-rooting)
    root: NodeId,
    /// First node seen for each position (the shallowest one after re-rooting)
    node_table: HashMap<S, NodeId>,
}

impl<S: GameState> SearchTree<S> {
    /// Create a new tree holding a single unvisited root for `state`.
    pub fn new(state: S) -> Result<Self, SearchError> {
        let root = SearchNode::new(state.clone(), None, None)?;
        let mut node_table = HashMap::new();
        node_table.insert(state, NodeId(0));
        Ok(Self {
            nodes: vec![root],
            root: NodeId(0),
            node_table,
        })
    }

    /// Get the root node ID.
    #[inline]
    pub fn root(&self) -> NodeId {
        self.root
    }

    #[inline]
    pub fn root_node(&self) -> &SearchNode<S> {
        self.get(self.root)
    }

    /// Get a reference to a node by ID.
    #[inline]
    pub fn get(&self, id: NodeId) -> &SearchNode<S> {
        &self.nodes[id.index()]
    }

    #[inline]
    fn get_mut(&mut self, id: NodeId) -> &mut SearchNode<S> {
        &mut self.nodes[id.index()]
    }

    /// Get the total number of nodes in the tree.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if tree is empty (never true after construction).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Get the arena slice for read access.
    #[inline]
    pub fn arena(&self) -> &[SearchNode<S>] {
        &self.nodes
    }

    /// Finds a node holding `state`.
    pub fn lookup(&self, state: &S) -> Option<NodeId> {
        self.node_table.get(state).copied()
    }

    /// Finds the child of `parent` reached by `mv`.
    pub fn child_by_move(&self, parent: NodeId, mv: &S::Move) -> Option<NodeId> {
        self.get(parent)
            .children
            .iter()
            .copied()
            .find(|&id| self.get(id).incoming_move.as_ref() == Some(mv))
    }

    /// Selection phase.
    ///
    /// Walks from the root by UCB1 until it reaches a node that is terminal or
    /// still has untried moves, and returns the visited path (root first).
    pub fn select(&self, policy: &Ucb1) -> Vec<NodeId> {
        let mut path = vec![self.root];
        let mut current = self.root;
        loop {
            let node = self.get(current);
            if node.is_terminal() || node.has_untried_moves() {
                return path;
            }
            match policy.select_child(&self.nodes, current) {
                Some(next) => {
                    path.push(next);
                    current = next;
                }
                None => return path,
            }
        }
    }

    /// Expansion phase.
    ///
    /// Takes one untried move of `parent` at random and adds the resulting child.
    /// Returns `None` if `parent` is terminal or already fully expanded.
    pub fn expand<R: Rng + ?Sized>(
        &mut self,
        parent: NodeId,
        rng: &mut R,
    ) -> Result<Option<NodeId>, SearchError> {
        if self.get(parent).is_terminal() {
            return Ok(None);
        }
        let Some(mv) = self.get_mut(parent).take_untried_move(rng) else {
            return Ok(None);
        };

        let child_state = self.get(parent).state.apply(&mv);
        let child = SearchNode::new(child_state.clone(), Some(parent), Some(mv))?;
        let child_id = NodeId(self.nodes.len() as u32);
        self.nodes.push(child);
        self.get_mut(parent).children.push(child_id);
        self.node_table.entry(child_state).or_insert(child_id);

        Ok(Some(child_id))
    }

    /// Backpropagation phase.
    ///
    /// `reward` is the result for the player who moved into the last node of
    /// `path`. It is flipped (`1 - reward`) at every step towards the root,
    /// since a win for one player is a loss for the other.
    pub fn backpropagate(&mut self, path: &[NodeId], reward: f64) {
        let mut reward = reward;
        for &id in path.iter().rev() {
            self.get_mut(id).record(reward);
            reward = 1.0 - reward;
        }
    }

    /// Root child with the highest mean score, ignoring unvisited children.
    /// Ties go to the first child in expansion order.
    pub fn best_child(&self) -> Option<NodeId> {
        let mut best: Option<(NodeId, f64)> = None;
        for &child in &self.root_node().children {
            let mean = self.get(child).mean_score();
            if mean == f64::NEG_INFINITY {
                continue;
            }
            match best {
                Some((_, best_mean)) if mean <= best_mean => {}
                _ => best = Some((child, mean)),
            }
        }
        best.map(|(id, _)| id)
    }

    /// Move leading to [`best_child`](Self::best_child).
    pub fn best_move(&self) -> Option<S::Move> {
        self.best_child()
            .and_then(|id| self.get(id).incoming_move.clone())
    }

    /// The root's move when it has exactly one legal move.
    pub fn only_root_move(&self) -> Option<S::Move> {
        let root = self.root_node();
        match (root.untried_moves(), root.children()) {
            ([mv], []) => Some(mv.clone()),
            ([], [child]) => self.get(*child).incoming_move.clone(),
            _ => None,
        }
    }

    /// Makes `new_root` the root and drops every node outside its subtree.
    ///
    /// The arena is compacted in breadth-first order, so the new root gets index 0
    /// and the statistics of retained nodes are carried over unchanged.
    pub fn reroot(&mut self, new_root: NodeId) {
        if new_root == self.root {
            return;
        }

        let order = self.subtree_order(new_root);
        let mut remap: Vec<Option<NodeId>> = vec![None; self.nodes.len()];
        for (new_idx, old) in order.iter().enumerate() {
            remap[old.index()] = Some(NodeId(new_idx as u32));
        }

        let mut slots: Vec<Option<SearchNode<S>>> =
            std::mem::take(&mut self.nodes).into_iter().map(Some).collect();
        let mut nodes = Vec::with_capacity(order.len());
        for old in order {
            if let Some(mut node) = slots[old.index()].take() {
                node.parent = node.parent.and_then(|p| remap[p.index()]);
                node.children = node
                    .children
                    .iter()
                    .filter_map(|c| remap[c.index()])
                    .collect();
                nodes.push(node);
            }
        }
        // Everything left in `slots` is unreachable from the new root.
        drop(slots);

        let mut node_table = HashMap::with_capacity(nodes.len());
        for (idx, node) in nodes.iter().enumerate() {
            node_table
                .entry(node.state.clone())
                .or_insert(NodeId(idx as u32));
        }

        self.nodes = nodes;
        self.root = NodeId(0);
        self.node_table = node_table;
    }

    /// Breadth-first node order of the subtree below `start`.
    fn subtree_order(&self, start: NodeId) -> Vec<NodeId> {
        let mut order = Vec::new();
        let mut queue = VecDeque::from([start]);
        while let Some(id) = queue.pop_front() {
            order.push(id);
            queue.extend(self.get(id).children.iter().copied());
        }
        order
    }

    /// Deepest level below the root.
    pub fn max_depth(&self) -> usize {
        let mut max_depth = 0;
        let mut stack = vec![(self.root, 0usize)];
        while let Some((id, depth)) = stack.pop() {
            max_depth = max_depth.max(depth);
            stack.extend(self.get(id).children.iter().map(|&c| (c, depth + 1)));
        }
        max_depth
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::nim::{NimMove, NimState};
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256PlusPlus;

    fn rng() -> Xoshiro256PlusPlus {
        Xoshiro256PlusPlus::seed_from_u64(42)
    }

    #[test]
    fn test_new_tree() {
        let tree = SearchTree::new(NimState::new(6, 3)).unwrap();

        assert_eq!(tree.len(), 1);
        assert_eq!(tree.root(), NodeId(0));
        assert!(tree.root_node().parent().is_none());
        assert_eq!(tree.lookup(&NimState::new(6, 3)), Some(NodeId(0)));
    }

    #[test]
    fn test_expand_adds_one_child_per_call() {
        let mut rng = rng();
        let mut tree = SearchTree::new(NimState::new(6, 3)).unwrap();

        let first = tree.expand(tree.root(), &mut rng).unwrap().unwrap();
        assert_eq!(tree.len(), 2);
        assert_eq!(tree.get(first).parent(), Some(tree.root()));
        assert_eq!(tree.root_node().untried_moves().len(), 2);

        tree.expand(tree.root(), &mut rng).unwrap();
        tree.expand(tree.root(), &mut rng).unwrap();
        assert!(tree.expand(tree.root(), &mut rng).unwrap().is_none());
        assert_eq!(tree.root_node().children().len(), 3);
        assert!(tree.root_node().is_fully_expanded());
    }

    #[test]
    fn test_expand_terminal_is_noop() {
        let mut rng = rng();
        let mut tree = SearchTree::new(NimState::new(0, 3)).unwrap();
        assert!(tree.expand(tree.root(), &mut rng).unwrap().is_none());
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn test_select_stops_at_node_with_untried_moves() {
        let mut rng = rng();
        let policy = Ucb1::new(1.41);
        let mut tree = SearchTree::new(NimState::new(6, 2)).unwrap();

        assert_eq!(tree.select(&policy), vec![tree.root()]);

        let a = tree.expand(tree.root(), &mut rng).unwrap().unwrap();
        let b = tree.expand(tree.root(), &mut rng).unwrap().unwrap();
        tree.backpropagate(&[tree.root(), a], 1.0);
        tree.backpropagate(&[tree.root(), b], 0.0);

        // Root is fully expanded; the better child still has untried moves.
        assert_eq!(tree.select(&policy), vec![tree.root(), a]);
    }

    #[test]
    fn test_backpropagate_flips_reward() {
        let mut rng = rng();
        let mut tree = SearchTree::new(NimState::new(9, 1)).unwrap();

        let child = tree.expand(tree.root(), &mut rng).unwrap().unwrap();
        let grandchild = tree.expand(child, &mut rng).unwrap().unwrap();
        tree.backpropagate(&[tree.root(), child, grandchild], 1.0);

        assert_eq!(tree.get(grandchild).visits(), 1);
        assert_eq!(tree.get(child).visits(), 1);
        assert_eq!(tree.root_node().visits(), 1);

        assert!((tree.get(grandchild).total_score() - 1.0).abs() < 1e-9);
        assert!(tree.get(child).total_score().abs() < 1e-9);
        assert!((tree.root_node().total_score() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_best_child_ignores_unvisited() {
        let mut rng = rng();
        let mut tree = SearchTree::new(NimState::new(6, 3)).unwrap();
        assert!(tree.best_child().is_none());

        let a = tree.expand(tree.root(), &mut rng).unwrap().unwrap();
        let b = tree.expand(tree.root(), &mut rng).unwrap().unwrap();
        tree.expand(tree.root(), &mut rng).unwrap();
        tree.backpropagate(&[tree.root(), a], 0.0);
        tree.backpropagate(&[tree.root(), b], 0.5);

        assert_eq!(tree.best_child(), Some(b));
        assert_eq!(tree.best_move(), tree.get(b).incoming_move().cloned());
    }

    #[test]
    fn test_reroot_keeps_subtree_statistics() {
        let mut rng = rng();
        let mut tree = SearchTree::new(NimState::new(8, 2)).unwrap();

        let a = tree.expand(tree.root(), &mut rng).unwrap().unwrap();
        let b = tree.expand(tree.root(), &mut rng).unwrap().unwrap();
        let a1 = tree.expand(a, &mut rng).unwrap().unwrap();
        let b1 = tree.expand(b, &mut rng).unwrap().unwrap();
        tree.backpropagate(&[tree.root(), a, a1], 1.0);
        tree.backpropagate(&[tree.root(), a, a1], 0.5);
        tree.backpropagate(&[tree.root(), b, b1], 0.0);

        let a_state = tree.get(a).state().clone();
        let a1_state = tree.get(a1).state().clone();
        let b_state = tree.get(b).state().clone();
        let (a_visits, a_score) = (tree.get(a).visits(), tree.get(a).total_score());

        tree.reroot(a);

        assert_eq!(tree.len(), 2);
        assert_eq!(tree.root(), NodeId(0));
        assert!(tree.root_node().parent().is_none());
        assert_eq!(tree.root_node().state(), &a_state);
        assert_eq!(tree.root_node().visits(), a_visits);
        assert_eq!(tree.root_node().total_score(), a_score);

        let child = tree.root_node().children()[0];
        assert_eq!(tree.get(child).parent(), Some(NodeId(0)));
        assert_eq!(tree.get(child).visits(), 2);
        assert_eq!(tree.lookup(&a1_state), Some(child));
        assert_eq!(tree.lookup(&b_state), None);
    }

    #[test]
    fn test_transposition_table_keeps_first_node() {
        let mut rng = rng();
        let mut tree = SearchTree::new(NimState::new(10, 2)).unwrap();

        // Fully expand two plies: 1+2 and 2+1 both reach a pile of 7.
        let children: Vec<_> = (0..2)
            .map(|_| tree.expand(tree.root(), &mut rng).unwrap().unwrap())
            .collect();
        for &c in &children {
            while tree.expand(c, &mut rng).unwrap().is_some() {}
        }

        let seven = NimState::new(10, 2).apply(&NimMove(1)).apply(&NimMove(2));
        let found = tree.lookup(&seven).unwrap();
        assert_eq!(tree.get(found).state(), &seven);

        let holders = tree
            .arena()
            .iter()
            .filter(|n| n.state() == &seven)
            .count();
        assert_eq!(holders, 2, "children stay a strict tree");
        assert_eq!(tree.max_depth(), 2);
    }
}
