use std::sync::Mutex;

use crate::sync::lock;
use crate::{JunctionId, RoadId, Timestamp};

/// Intersection of at least two roads.
///
/// Membership is fixed at creation; only the junction-level reference time
/// used by the two-road phase swap changes afterwards.
#[derive(Debug)]
pub struct Junction {
    pub id: JunctionId,
    pub name: String,
    pub roads: Vec<RoadId>,
    last_status_change: Mutex<Timestamp>,
}

impl Junction {
    pub(crate) fn new(id: JunctionId, name: String, roads: Vec<RoadId>, now: Timestamp) -> Self {
        Self {
            id,
            name,
            roads,
            last_status_change: Mutex::new(now),
        }
    }

    pub fn connects(&self, road: RoadId) -> bool {
        self.roads.contains(&road)
    }

    pub fn last_status_change(&self) -> Timestamp {
        *lock(&self.last_status_change)
    }

    pub(crate) fn reference(&self) -> &Mutex<Timestamp> {
        &self.last_status_change
    }
}
