//! Registry of vehicles, roads and junctions, and the event records tied to them

mod junction;
mod passage;
mod road;
mod traffic_model;
mod types;
mod vehicle;

pub use junction::Junction;
pub use passage::{Passage, PassageOutcome};
pub use road::Road;
pub use traffic_model::{RouteSummaryDelivery, TrafficModel};
pub use types::{JunctionId, LightStatus, RoadId, VehicleCategory, VehicleId, ViolationId};
pub use vehicle::Vehicle;
