//! Congestion-aware route prediction over the junction adjacency graph

mod congestion;
mod dijkstra;
mod graph;
mod k_shortest;
mod predictor;
mod state;
mod yen;

pub use congestion::{
    CongestionLevel, CongestionPrediction, CongestionState, Confidence, PeakHour,
    current_congestion_state, historical_peak_hours, predict_congestion,
};
pub use graph::{RoadGraph, RoadNetworkGraph, build_adjacency};
pub use k_shortest::{WeightedPath, k_shortest_paths};
pub use predictor::{AlternateRoute, RouteStatus, RouteStop, TrafficPredictor, estimate_travel_time};
pub use yen::yen_k_shortest_paths;
