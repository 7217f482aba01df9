use std::collections::BinaryHeap;

use fixedbitset::FixedBitSet;
use hashbrown::{HashMap, HashSet};
use petgraph::graph::NodeIndex;

use super::graph::RoadGraph;
use super::k_shortest::WeightedPath;
use super::state::NodeState;

/// Undirected edge key, smaller index first
pub(super) fn edge_key(a: NodeIndex, b: NodeIndex) -> (NodeIndex, NodeIndex) {
    if a <= b { (a, b) } else { (b, a) }
}

/// Nodes and edges hidden from a shortest-path query
#[derive(Debug, Clone)]
pub(super) struct Exclusions {
    pub(super) nodes: FixedBitSet,
    pub(super) edges: HashSet<(NodeIndex, NodeIndex)>,
}

impl Exclusions {
    pub(super) fn new(node_count: usize) -> Self {
        Self {
            nodes: FixedBitSet::with_capacity(node_count),
            edges: HashSet::new(),
        }
    }

    fn allows(&self, from: NodeIndex, to: NodeIndex) -> bool {
        !self.nodes.contains(to.index()) && !self.edges.contains(&edge_key(from, to))
    }
}

/// Dijkstra's algorithm between two junctions, skipping excluded nodes and edges.
/// Returns the cheapest path, or `None` if `end` is unreachable.
pub(super) fn shortest_path<F>(
    graph: &RoadGraph,
    start: NodeIndex,
    end: NodeIndex,
    weight: &F,
    excluded: &Exclusions,
) -> Option<WeightedPath>
where
    F: Fn(NodeIndex, NodeIndex) -> f64,
{
    if excluded.nodes.contains(start.index()) {
        return None;
    }

    let mut distances: HashMap<NodeIndex, f64> = HashMap::new();
    let mut predecessors: HashMap<NodeIndex, NodeIndex> = HashMap::new();
    let mut heap = BinaryHeap::new();

    distances.insert(start, 0.0);
    heap.push(NodeState {
        cost: 0.0,
        node: start,
    });

    while let Some(NodeState { cost, node }) = heap.pop() {
        if node == end {
            break;
        }

        // Stale heap entry
        if distances.get(&node).is_some_and(|&best| cost > best) {
            continue;
        }

        for next in graph.neighbors(node) {
            if !excluded.allows(node, next) {
                continue;
            }

            let next_cost = cost + weight(node, next);
            let improved = distances.get(&next).is_none_or(|&known| next_cost < known);
            if improved {
                distances.insert(next, next_cost);
                predecessors.insert(next, node);
                heap.push(NodeState {
                    cost: next_cost,
                    node: next,
                });
            }
        }
    }

    let cost = *distances.get(&end)?;

    let mut nodes = vec![end];
    let mut current = end;
    while current != start {
        current = *predecessors.get(&current)?;
        nodes.push(current);
    }
    nodes.reverse();

    Some(WeightedPath { nodes, cost })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{JunctionId, RoadId};

    fn line(len: usize) -> (RoadGraph, Vec<NodeIndex>) {
        let mut graph = RoadGraph::default();
        let nodes: Vec<_> = (0..len).map(|i| graph.add_node(JunctionId(i))).collect();
        for pair in nodes.windows(2) {
            graph.add_edge(pair[0], pair[1], vec![RoadId(0)]);
        }
        (graph, nodes)
    }

    #[test]
    fn finds_path_along_a_line() {
        let (graph, nodes) = line(4);
        let excluded = Exclusions::new(graph.node_count());
        let path = shortest_path(&graph, nodes[0], nodes[3], &|_, _| 2.0, &excluded).unwrap();
        assert_eq!(path.nodes, nodes);
        assert!((path.cost - 6.0).abs() < 1e-9);
    }

    #[test]
    fn excluded_edge_disconnects() {
        let (graph, nodes) = line(3);
        let mut excluded = Exclusions::new(graph.node_count());
        excluded.edges.insert(edge_key(nodes[2], nodes[1]));
        assert!(shortest_path(&graph, nodes[0], nodes[2], &|_, _| 1.0, &excluded).is_none());
    }

    #[test]
    fn excluded_node_disconnects() {
        let (graph, nodes) = line(3);
        let mut excluded = Exclusions::new(graph.node_count());
        excluded.nodes.insert(nodes[1].index());
        assert!(shortest_path(&graph, nodes[0], nodes[2], &|_, _| 1.0, &excluded).is_none());
    }
}
