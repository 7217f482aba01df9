pub use crate::{Error, Timestamp};

// Re-export key components
pub use crate::analytics::{CongestionReport, DailySummary, RiskLevel, TrafficBucket, parse_date};
pub use crate::config::{PathSearch, TrafficConfig};
pub use crate::model::{Junction, Passage, PassageOutcome, Road, RouteSummaryDelivery, TrafficModel, Vehicle};
pub use crate::notify::{Message, Notifier, NotifyError};
pub use crate::routing::{
    AlternateRoute, CongestionLevel, CongestionPrediction, CongestionState, Confidence, RouteStatus,
};
pub use crate::violation::{Severity, SpeedingOutcome, Violation, ViolationType, calculate_fine};

// Identifiers and signal types
pub use crate::JunctionId;
pub use crate::LightStatus;
pub use crate::RoadId;
pub use crate::VehicleCategory;
pub use crate::ViolationId;
