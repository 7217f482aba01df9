use std::cmp::Ordering;

use fixedbitset::FixedBitSet;
use petgraph::graph::NodeIndex;

/// Partial path on the search frontier
#[derive(Debug, Clone)]
pub(super) struct PathState {
    pub(super) cost: f64,
    /// Insertion order, keeps pops of equal cost first-in first-out
    pub(super) seq: u64,
    pub(super) nodes: Vec<NodeIndex>,
    pub(super) members: FixedBitSet,
}

impl PathState {
    pub(super) fn last(&self) -> NodeIndex {
        self.nodes[self.nodes.len() - 1]
    }
}

impl PartialEq for PathState {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for PathState {}

impl Ord for PathState {
    fn cmp(&self, other: &Self) -> Ordering {
        // Cheapest pop first; equal costs in insertion order
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for PathState {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Node on the Dijkstra frontier
#[derive(Debug, Copy, Clone)]
pub(super) struct NodeState {
    pub(super) cost: f64,
    pub(super) node: NodeIndex,
}

impl PartialEq for NodeState {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for NodeState {}

impl Ord for NodeState {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for NodeState {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
