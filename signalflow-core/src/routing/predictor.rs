use rayon::prelude::*;
use serde::Serialize;

use super::congestion::{self, CongestionPrediction, CongestionState};
use super::graph::{RoadNetworkGraph, build_adjacency};
use super::k_shortest::{WeightedPath, k_shortest_paths};
use super::yen::yen_k_shortest_paths;
use crate::config::{PathSearch, RoutingConfig};
use crate::{JunctionId, LightStatus, RoadId, Timestamp, TrafficModel};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RouteStatus {
    Recommended,
    Avoid,
}

impl RouteStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            RouteStatus::Recommended => "RECOMMENDED",
            RouteStatus::Avoid => "AVOID",
        }
    }
}

/// One junction along a candidate route
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteStop {
    pub junction: JunctionId,
    pub name: String,
    /// Road used to reach this junction from the previous one
    pub entry_road: Option<String>,
    /// Signal on `entry_road` when the route was evaluated
    pub entry_light: Option<LightStatus>,
    pub prediction: CongestionPrediction,
}

impl RouteStop {
    pub fn is_congested(&self) -> bool {
        self.prediction.current_state.is_congested
    }

    pub fn has_red_light(&self) -> bool {
        self.entry_light == Some(LightStatus::Red)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlternateRoute {
    pub junctions: Vec<String>,
    /// Search weight of the path
    pub total_weight: f64,
    pub stops: Vec<RouteStop>,
    pub average_congestion_probability: f64,
    pub currently_congested_junctions: usize,
    pub red_light_junctions: usize,
    /// Minutes
    pub estimated_time: u32,
    pub route_status: RouteStatus,
}

/// Travel time in minutes: a fixed time per junction, scaled up by the mean
/// congestion probability, plus flat penalties per congested junction and per
/// junction entered on RED.
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn estimate_travel_time(
    stops: &[RouteStop],
    average_probability: f64,
    congested_count: usize,
    config: &RoutingConfig,
) -> u32 {
    let red_lights = stops.iter().filter(|s| s.has_red_light()).count();

    let base = config.minutes_per_junction * stops.len() as f64;
    let historical_penalty = base * average_probability / 100.0;
    let congestion_penalty = config.congested_penalty_minutes * congested_count as f64;
    let signal_penalty = config.red_light_penalty_minutes * red_lights as f64;

    (base + historical_penalty + congestion_penalty + signal_penalty)
        .round()
        .max(0.0) as u32
}

/// Route and congestion queries over a [`TrafficModel`].
///
/// The only state it touches is the lazy light resolution of roads it
/// inspects; analytics are read-only.
#[derive(Debug, Clone, Copy)]
pub struct TrafficPredictor<'a> {
    model: &'a TrafficModel,
}

impl<'a> TrafficPredictor<'a> {
    pub fn new(model: &'a TrafficModel) -> Self {
        Self { model }
    }

    pub fn build_graph(&self) -> RoadNetworkGraph {
        build_adjacency(self.model.junctions())
    }

    pub fn current_congestion_state(&self, junction: JunctionId, now: Timestamp) -> CongestionState {
        congestion::current_congestion_state(
            self.model.analytics(),
            &self.model.config().congestion,
            junction,
            now,
        )
    }

    pub fn predict_congestion(
        &self,
        junction: JunctionId,
        target_time: Timestamp,
    ) -> CongestionPrediction {
        congestion::predict_congestion(
            self.model.analytics(),
            &self.model.config().congestion,
            junction,
            target_time,
        )
    }

    /// Up to `k` cheapest simple paths, weighting each edge by the live
    /// congestion of both of its junctions
    pub fn find_k_shortest_paths(
        &self,
        start: JunctionId,
        end: JunctionId,
        graph: &RoadNetworkGraph,
        now: Timestamp,
        k: usize,
    ) -> Vec<WeightedPath> {
        let (Some(start), Some(end)) = (graph.node(start), graph.node(end)) else {
            return Vec::new();
        };

        let factors: Vec<f64> = graph
            .graph
            .node_indices()
            .map(|node| {
                self.current_congestion_state(graph.junction(node), now)
                    .weight_factor()
            })
            .collect();
        let weight = |a: petgraph::graph::NodeIndex, b: petgraph::graph::NodeIndex| {
            factors[a.index()] * factors[b.index()]
        };

        match self.model.config().routing.search {
            PathSearch::Naive => k_shortest_paths(&graph.graph, start, end, k, weight),
            PathSearch::Yen => yen_k_shortest_paths(&graph.graph, start, end, k, weight),
        }
    }

    /// Ranks candidate routes between two junctions, least congested first and
    /// fastest among equally congested ones. Empty when `end` is unreachable.
    pub fn alternate_routes(
        &self,
        start: JunctionId,
        end: JunctionId,
        now: Timestamp,
    ) -> Vec<AlternateRoute> {
        let graph = self.build_graph();
        let k = self.model.config().routing.k;
        let paths = self.find_k_shortest_paths(start, end, &graph, now, k);

        log::debug!(
            "Found {} candidate routes from {:?} to {:?}",
            paths.len(),
            start,
            end
        );

        let mut routes: Vec<AlternateRoute> = paths
            .par_iter()
            .map(|path| self.describe_route(&graph, path, now))
            .collect();

        routes.sort_by_key(|r| (r.currently_congested_junctions, r.estimated_time));
        routes
    }

    fn describe_route(
        &self,
        graph: &RoadNetworkGraph,
        path: &WeightedPath,
        now: Timestamp,
    ) -> AlternateRoute {
        let stops: Vec<RouteStop> = path
            .nodes
            .iter()
            .enumerate()
            .map(|(position, &node)| {
                let junction = graph.junction(node);
                let entry = if position == 0 {
                    None
                } else {
                    self.entry_signal(graph.shared_roads(path.nodes[position - 1], node), now)
                };

                RouteStop {
                    junction,
                    name: self.model.junction_by_id(junction).name.clone(),
                    entry_road: entry.map(|(road, _)| self.model.road_name(road)),
                    entry_light: entry.map(|(_, status)| status),
                    prediction: self.predict_congestion(junction, now),
                }
            })
            .collect();

        #[allow(clippy::cast_precision_loss)]
        let average_congestion_probability = if stops.is_empty() {
            0.0
        } else {
            stops.iter().map(|s| s.prediction.probability).sum::<f64>() / stops.len() as f64
        };
        let currently_congested_junctions = stops.iter().filter(|s| s.is_congested()).count();
        let red_light_junctions = stops.iter().filter(|s| s.has_red_light()).count();
        let estimated_time = estimate_travel_time(
            &stops,
            average_congestion_probability,
            currently_congested_junctions,
            &self.model.config().routing,
        );

        AlternateRoute {
            junctions: stops.iter().map(|s| s.name.clone()).collect(),
            total_weight: path.cost,
            average_congestion_probability,
            currently_congested_junctions,
            red_light_junctions,
            estimated_time,
            route_status: if currently_congested_junctions > 0 {
                RouteStatus::Avoid
            } else {
                RouteStatus::Recommended
            },
            stops,
        }
    }

    /// Picks the road a driver would enter by: any GREEN shared road, otherwise
    /// the first one (which is then RED)
    fn entry_signal(&self, shared: &[RoadId], now: Timestamp) -> Option<(RoadId, LightStatus)> {
        let controller = self.model.controller();
        let mut fallback = None;

        for &road in shared {
            match controller.road_status(road, now) {
                LightStatus::Green => return Some((road, LightStatus::Green)),
                LightStatus::Red => {
                    fallback.get_or_insert((road, LightStatus::Red));
                }
            }
        }

        fallback
    }
}
