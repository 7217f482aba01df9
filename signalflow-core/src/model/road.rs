use serde::Serialize;

use crate::signal::SignalClock;
use crate::{LightStatus, RoadId, Timestamp};

/// Road entering one or more junctions, carrying its own signal state
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Road {
    pub id: RoadId,
    pub name: String,
    pub light_status: LightStatus,
    pub last_status_change: Timestamp,
}

impl Road {
    pub(crate) fn new(id: RoadId, name: String, now: Timestamp) -> Self {
        Self {
            id,
            name,
            light_status: LightStatus::Red,
            last_status_change: now,
        }
    }

    /// Brings the stored signal state up to `now` and returns the current status
    pub fn resolve(&mut self, clock: &SignalClock, now: Timestamp) -> LightStatus {
        let (status, last_change) =
            clock.resolve_status(self.last_status_change, self.light_status, now);

        if status != self.light_status {
            log::debug!("Road '{}' switched to {status}", self.name);
        }
        self.light_status = status;
        self.last_status_change = last_change;
        status
    }

    /// Sets the status outside the regular cycle, restarting the phase at `now`
    pub(crate) fn force(&mut self, status: LightStatus, now: Timestamp) {
        self.light_status = status;
        self.last_status_change = now;
    }
}
