use hashbrown::HashMap;
use itertools::Itertools;
use petgraph::graph::{NodeIndex, UnGraph};

use crate::model::Junction;
use crate::{JunctionId, RoadId};

/// Undirected junction graph; each edge carries the roads the two junctions share
pub type RoadGraph = UnGraph<JunctionId, Vec<RoadId>>;

/// Junction adjacency graph, rebuilt for every route query
#[derive(Debug, Clone)]
pub struct RoadNetworkGraph {
    pub graph: RoadGraph,
    nodes: HashMap<JunctionId, NodeIndex>,
}

impl RoadNetworkGraph {
    pub fn node(&self, junction: JunctionId) -> Option<NodeIndex> {
        self.nodes.get(&junction).copied()
    }

    pub fn junction(&self, node: NodeIndex) -> JunctionId {
        self.graph[node]
    }

    /// Roads connecting two adjacent junctions, empty if they are not adjacent
    pub fn shared_roads(&self, a: NodeIndex, b: NodeIndex) -> &[RoadId] {
        match self.graph.find_edge(a, b) {
            Some(edge) => self.graph[edge].as_slice(),
            None => &[],
        }
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }
}

/// Two junctions are adjacent iff they have at least one road in common
pub fn build_adjacency(junctions: &[Junction]) -> RoadNetworkGraph {
    let mut graph = RoadGraph::with_capacity(junctions.len(), junctions.len() * 2);
    let mut nodes = HashMap::with_capacity(junctions.len());

    for junction in junctions {
        nodes.insert(junction.id, graph.add_node(junction.id));
    }

    for (a, b) in junctions.iter().tuple_combinations() {
        let shared: Vec<RoadId> = a
            .roads
            .iter()
            .copied()
            .filter(|road| b.connects(*road))
            .collect();

        if !shared.is_empty() {
            graph.add_edge(nodes[&a.id], nodes[&b.id], shared);
        }
    }

    log::trace!(
        "Built junction graph with {} nodes and {} edges",
        graph.node_count(),
        graph.edge_count()
    );

    RoadNetworkGraph { graph, nodes }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn junction(id: usize, roads: &[usize]) -> Junction {
        let now = NaiveDate::from_ymd_opt(2025, 2, 13)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        Junction::new(
            JunctionId(id),
            format!("J{id}"),
            roads.iter().map(|&r| RoadId(r)).collect(),
            now,
        )
    }

    #[test]
    fn adjacency_through_shared_roads() {
        // J0 and J1 share road 1, J1 and J2 share roads 2 and 3, J3 is isolated
        let junctions = vec![
            junction(0, &[0, 1]),
            junction(1, &[1, 2, 3]),
            junction(2, &[2, 3, 4]),
            junction(3, &[5, 6]),
        ];
        let network = build_adjacency(&junctions);

        assert_eq!(network.node_count(), 4);
        assert_eq!(network.edge_count(), 2);

        let n = |id| network.node(JunctionId(id)).unwrap();
        assert_eq!(network.shared_roads(n(0), n(1)), &[RoadId(1)]);
        assert_eq!(network.shared_roads(n(2), n(1)), &[RoadId(2), RoadId(3)]);
        assert!(network.shared_roads(n(0), n(2)).is_empty());
        assert_eq!(network.graph.neighbors(n(3)).count(), 0);
        assert_eq!(network.junction(n(2)), JunctionId(2));
    }
}
