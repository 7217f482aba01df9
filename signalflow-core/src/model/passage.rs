use serde::Serialize;

use crate::violation::Violation;
use crate::{JunctionId, LightStatus, RoadId, Timestamp};

/// Append-only record of a vehicle passing through a junction
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Passage {
    pub junction: JunctionId,
    pub plate: String,
    pub entry_road: RoadId,
    pub timestamp: Timestamp,
}

/// Result of logging a vehicle at a junction
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PassageOutcome {
    pub passage: Passage,
    /// Status of the entry road at the moment of passage
    pub light_status: LightStatus,
    pub violation: Option<Violation>,
    /// Set when an emergency vehicle forced its entry road GREEN
    pub emergency_override: bool,
}
