use serde::Serialize;

use crate::{Timestamp, VehicleCategory};

/// Registered vehicle, identified by its plate
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Vehicle {
    pub plate: String,
    pub owner_name: String,
    /// Free-form type label as entered at registration
    pub vehicle_type: String,
    pub owner_email: String,
    pub registered_at: Timestamp,
}

impl Vehicle {
    pub fn category(&self) -> VehicleCategory {
        VehicleCategory::from_label(&self.vehicle_type)
    }

    pub fn is_emergency(&self) -> bool {
        self.category() == VehicleCategory::Emergency
    }
}
