//! Traffic-signal control, violation detection, hourly traffic analytics and
//! congestion-aware route prediction for a road network.
//!
//! [`TrafficModel`] owns the network and exposes every operation. Time is
//! always passed in by the caller; nothing in the crate reads the system clock.

pub mod analytics;
pub mod config;
mod error;
pub mod model;
pub mod notify;
pub mod prelude;
pub mod routing;
pub mod signal;
mod sync;
pub mod violation;

pub use error::{EntityKind, Error};
pub use model::{
    JunctionId, LightStatus, RoadId, TrafficModel, VehicleCategory, VehicleId, ViolationId,
};

/// Naive local date-time; all timestamps of one network share the same zone
pub type Timestamp = chrono::NaiveDateTime;
