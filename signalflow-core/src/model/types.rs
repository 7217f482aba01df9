//! Identifiers and small value types shared across the model

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::Error;

/// Index of a road in the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RoadId(pub usize);

/// Index of a junction in the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct JunctionId(pub usize);

/// Index of a vehicle in the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VehicleId(pub usize);

/// Index of a violation record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ViolationId(pub usize);

/// Signal shown to traffic entering a junction from a road
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LightStatus {
    #[default]
    Red,
    Green,
}

impl LightStatus {
    pub fn flipped(self) -> Self {
        match self {
            LightStatus::Red => LightStatus::Green,
            LightStatus::Green => LightStatus::Red,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LightStatus::Red => "RED",
            LightStatus::Green => "GREEN",
        }
    }
}

impl fmt::Display for LightStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LightStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "RED" => Ok(LightStatus::Red),
            "GREEN" => Ok(LightStatus::Green),
            other => Err(Error::Validation(format!("Unknown light status '{other}'"))),
        }
    }
}

/// Behavioral category of a vehicle, derived from its free-form type label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VehicleCategory {
    Regular,
    /// Overrides junction signals instead of being fined
    Emergency,
}

impl VehicleCategory {
    pub fn from_label(label: &str) -> Self {
        if label.trim().eq_ignore_ascii_case("emergency") {
            VehicleCategory::Emergency
        } else {
            VehicleCategory::Regular
        }
    }
}
