use petgraph::graph::NodeIndex;

use super::dijkstra::{Exclusions, edge_key, shortest_path};
use super::graph::RoadGraph;
use super::k_shortest::WeightedPath;

/// Yen's algorithm for the `k` cheapest loopless paths.
///
/// Every accepted path is distinct, and the work per path is bounded by one
/// Dijkstra run per spur node, so it scales to dense graphs where the
/// whole-path search in [`super::k_shortest_paths`] would blow up.
pub fn yen_k_shortest_paths<F>(
    graph: &RoadGraph,
    start: NodeIndex,
    end: NodeIndex,
    k: usize,
    weight: F,
) -> Vec<WeightedPath>
where
    F: Fn(NodeIndex, NodeIndex) -> f64,
{
    let mut accepted: Vec<WeightedPath> = Vec::with_capacity(k);
    if k == 0 || graph.node_weight(start).is_none() || graph.node_weight(end).is_none() {
        return accepted;
    }

    let none_excluded = Exclusions::new(graph.node_count());
    let Some(first) = shortest_path(graph, start, end, &weight, &none_excluded) else {
        return accepted;
    };
    accepted.push(first);

    let mut candidates: Vec<WeightedPath> = Vec::new();

    while accepted.len() < k {
        let previous = accepted[accepted.len() - 1].nodes.clone();

        for spur_index in 0..previous.len().saturating_sub(1) {
            let spur_node = previous[spur_index];
            let root = &previous[..=spur_index];

            let mut excluded = Exclusions::new(graph.node_count());
            // Edges leaving the root along already accepted paths
            for path in &accepted {
                if path.nodes.len() > spur_index + 1 && path.nodes[..=spur_index] == *root {
                    excluded
                        .edges
                        .insert(edge_key(path.nodes[spur_index], path.nodes[spur_index + 1]));
                }
            }
            // Root nodes other than the spur node keep the result loopless
            for node in &root[..spur_index] {
                excluded.nodes.insert(node.index());
            }

            let Some(spur) = shortest_path(graph, spur_node, end, &weight, &excluded) else {
                continue;
            };

            let mut nodes = root[..spur_index].to_vec();
            nodes.extend_from_slice(&spur.nodes);
            let cost = path_cost(&nodes, &weight);
            let candidate = WeightedPath { nodes, cost };

            let known = accepted
                .iter()
                .chain(candidates.iter())
                .any(|p| p.nodes == candidate.nodes);
            if !known {
                candidates.push(candidate);
            }
        }

        // First minimum wins, so equal-cost candidates keep discovery order
        let Some(best) = candidates
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| a.cost.total_cmp(&b.cost))
            .map(|(index, _)| index)
        else {
            break;
        };
        accepted.push(candidates.remove(best));
    }

    accepted
}

fn path_cost<F>(nodes: &[NodeIndex], weight: &F) -> f64
where
    F: Fn(NodeIndex, NodeIndex) -> f64,
{
    nodes.windows(2).map(|pair| weight(pair[0], pair[1])).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::k_shortest_paths;
    use crate::{JunctionId, RoadId};

    /// 3x3 grid, node index = row * 3 + col
    fn grid() -> (RoadGraph, Vec<NodeIndex>) {
        let mut graph = RoadGraph::default();
        let nodes: Vec<_> = (0..9).map(|i| graph.add_node(JunctionId(i))).collect();
        let mut road = 0;
        for row in 0..3 {
            for col in 0..3 {
                let here = row * 3 + col;
                if col < 2 {
                    graph.add_edge(nodes[here], nodes[here + 1], vec![RoadId(road)]);
                    road += 1;
                }
                if row < 2 {
                    graph.add_edge(nodes[here], nodes[here + 3], vec![RoadId(road)]);
                    road += 1;
                }
            }
        }
        (graph, nodes)
    }

    fn weight(nodes: &[NodeIndex]) -> impl Fn(NodeIndex, NodeIndex) -> f64 + '_ {
        // The center junction is expensive to touch
        move |a: NodeIndex, b: NodeIndex| if a == nodes[4] || b == nodes[4] { 4.0 } else { 1.0 }
    }

    #[test]
    fn paths_are_distinct_simple_and_sorted() {
        let (graph, nodes) = grid();
        let paths = yen_k_shortest_paths(&graph, nodes[0], nodes[8], 5, weight(&nodes));

        assert_eq!(paths.len(), 5);
        for window in paths.windows(2) {
            assert!(window[0].cost <= window[1].cost + 1e-9);
            assert_ne!(window[0].nodes, window[1].nodes);
        }
        for path in &paths {
            let mut seen = path.nodes.clone();
            seen.sort_unstable();
            seen.dedup();
            assert_eq!(seen.len(), path.nodes.len());
            assert!((path_cost(&path.nodes, &weight(&nodes)) - path.cost).abs() < 1e-9);
        }
        // Both perimeter routes avoid the center and cost 4
        assert!((paths[0].cost - 4.0).abs() < 1e-9);
        assert!((paths[1].cost - 4.0).abs() < 1e-9);
    }

    #[test]
    fn agrees_with_whole_path_search_on_costs() {
        let (graph, nodes) = grid();
        let naive = k_shortest_paths(&graph, nodes[0], nodes[8], 4, weight(&nodes));
        let yen = yen_k_shortest_paths(&graph, nodes[0], nodes[8], 4, weight(&nodes));

        let costs = |paths: &[WeightedPath]| paths.iter().map(|p| p.cost).collect::<Vec<_>>();
        assert_eq!(costs(&naive), costs(&yen));
    }

    #[test]
    fn stops_when_no_more_paths_exist() {
        let mut graph = RoadGraph::default();
        let a = graph.add_node(JunctionId(0));
        let b = graph.add_node(JunctionId(1));
        graph.add_edge(a, b, vec![RoadId(0)]);
        let paths = yen_k_shortest_paths(&graph, a, b, 3, |_, _| 1.0);
        assert_eq!(paths.len(), 1);
        assert_eq!(paths[0].nodes, vec![a, b]);
    }
}
