use std::collections::BinaryHeap;

use fixedbitset::FixedBitSet;
use petgraph::graph::NodeIndex;

use super::graph::RoadGraph;
use super::state::PathState;

/// Simple path through the junction graph with its accumulated weight
#[derive(Debug, Clone, PartialEq)]
pub struct WeightedPath {
    pub nodes: Vec<NodeIndex>,
    pub cost: f64,
}

/// Best-first search over whole paths.
///
/// Each frontier entry is a complete path from `start`; the cheapest one is
/// popped and extended to every neighbor not already on it. The search ends
/// once `k` popped paths have reached `end`, so results come out in
/// ascending cost order. Only nodes on the current path are excluded, which
/// keeps paths simple but can still explore exponentially many prefixes on
/// dense graphs.
pub fn k_shortest_paths<F>(
    graph: &RoadGraph,
    start: NodeIndex,
    end: NodeIndex,
    k: usize,
    weight: F,
) -> Vec<WeightedPath>
where
    F: Fn(NodeIndex, NodeIndex) -> f64,
{
    let mut found = Vec::with_capacity(k);
    if k == 0 || graph.node_weight(start).is_none() || graph.node_weight(end).is_none() {
        return found;
    }

    let mut heap = BinaryHeap::new();
    let mut seq = 0_u64;

    let mut members = FixedBitSet::with_capacity(graph.node_count());
    members.insert(start.index());
    heap.push(PathState {
        cost: 0.0,
        seq,
        nodes: vec![start],
        members,
    });

    while let Some(state) = heap.pop() {
        let last = state.last();

        if last == end {
            log::trace!("Path #{} found with cost {:.2}", found.len() + 1, state.cost);
            found.push(WeightedPath {
                nodes: state.nodes,
                cost: state.cost,
            });
            if found.len() == k {
                break;
            }
            continue;
        }

        for next in graph.neighbors(last) {
            if state.members.contains(next.index()) {
                continue;
            }

            seq += 1;
            let mut nodes = Vec::with_capacity(state.nodes.len() + 1);
            nodes.extend_from_slice(&state.nodes);
            nodes.push(next);
            let mut members = state.members.clone();
            members.insert(next.index());

            heap.push(PathState {
                cost: state.cost + weight(last, next),
                seq,
                nodes,
                members,
            });
        }
    }

    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{JunctionId, RoadId};

    /// Cycle A-B-C-D-A
    fn square() -> (RoadGraph, [NodeIndex; 4]) {
        let mut graph = RoadGraph::default();
        let nodes = [0, 1, 2, 3].map(|i| graph.add_node(JunctionId(i)));
        for i in 0..4 {
            graph.add_edge(nodes[i], nodes[(i + 1) % 4], vec![RoadId(i)]);
        }
        (graph, nodes)
    }

    fn assert_simple(path: &WeightedPath) {
        let mut seen = path.nodes.clone();
        seen.sort_unstable();
        seen.dedup();
        assert_eq!(seen.len(), path.nodes.len(), "path repeats a node: {path:?}");
    }

    #[test]
    fn two_paths_around_a_square() {
        let (graph, [a, b, c, d]) = square();
        let paths = k_shortest_paths(&graph, a, c, 2, |_, _| 1.0);

        assert_eq!(paths.len(), 2);
        for path in &paths {
            assert_simple(path);
            assert_eq!(path.nodes.first(), Some(&a));
            assert_eq!(path.nodes.last(), Some(&c));
            assert!((path.cost - 2.0).abs() < 1e-9);
        }
        let middles: Vec<_> = paths.iter().map(|p| p.nodes[1]).collect();
        assert!(middles.contains(&b) && middles.contains(&d));
    }

    #[test]
    fn paths_ordered_by_weight() {
        let (graph, [a, b, c, _]) = square();
        // Going through B costs more
        let weight = |from: NodeIndex, to: NodeIndex| if from == b || to == b { 3.0 } else { 1.0 };
        let paths = k_shortest_paths(&graph, a, c, 3, weight);

        assert_eq!(paths.len(), 2, "a square has only two simple paths");
        assert!(paths[0].cost < paths[1].cost);
        assert!(!paths[0].nodes.contains(&b));
        assert!((paths[1].cost - 6.0).abs() < 1e-9);
    }

    #[test]
    fn unreachable_target_yields_nothing() {
        let (mut graph, [a, ..]) = square();
        let island = graph.add_node(JunctionId(9));
        assert!(k_shortest_paths(&graph, a, island, 3, |_, _| 1.0).is_empty());
    }

    #[test]
    fn start_equal_to_end_is_a_single_stop_path() {
        let (graph, [a, ..]) = square();
        let paths = k_shortest_paths(&graph, a, a, 3, |_, _| 1.0);
        assert_eq!(paths, vec![WeightedPath { nodes: vec![a], cost: 0.0 }]);
    }

    #[test]
    fn zero_k_returns_empty() {
        let (graph, [a, _, c, _]) = square();
        assert!(k_shortest_paths(&graph, a, c, 0, |_, _| 1.0).is_empty());
    }
}
