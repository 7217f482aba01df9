//! Violation records and fine computation.
//!
//! Fines are `BASE_FINE[type] * MULTIPLIER[severity]`, computed once when a
//! record is created. Records are never updated or removed.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::{Error, JunctionId, Timestamp, ViolationId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ViolationType {
    RedLight,
    Speeding,
    Parking,
}

impl ViolationType {
    pub fn base_fine(self) -> f64 {
        match self {
            ViolationType::RedLight => 300.0,
            ViolationType::Speeding => 250.0,
            ViolationType::Parking => 100.0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ViolationType::RedLight => "RED_LIGHT",
            ViolationType::Speeding => "SPEEDING",
            ViolationType::Parking => "PARKING",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ViolationType::RedLight => "Running Red Light",
            ViolationType::Speeding => "Speeding",
            ViolationType::Parking => "Parking Violation",
        }
    }
}

impl fmt::Display for ViolationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ViolationType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "RED_LIGHT" => Ok(ViolationType::RedLight),
            "SPEEDING" => Ok(ViolationType::Speeding),
            "PARKING" => Ok(ViolationType::Parking),
            other => Err(Error::Validation(format!(
                "Unknown violation type '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub fn multiplier(self) -> f64 {
        match self {
            Severity::Low => 1.0,
            Severity::Medium => 1.5,
            Severity::High => 2.0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Low => "LOW",
            Severity::Medium => "MEDIUM",
            Severity::High => "HIGH",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "LOW" => Ok(Severity::Low),
            "MEDIUM" => Ok(Severity::Medium),
            "HIGH" => Ok(Severity::High),
            other => Err(Error::Validation(format!("Unknown severity '{other}'"))),
        }
    }
}

pub fn calculate_fine(violation_type: ViolationType, severity: Severity) -> f64 {
    violation_type.base_fine() * severity.multiplier()
}

/// Severity of a speeding event, `None` when the vehicle was within the limit.
///
/// More than 30 over the limit is HIGH, more than 15 is MEDIUM, anything else LOW.
///
/// # Errors
///
/// Returns [`Error::Computation`] if either value is negative or not a finite number
pub fn speeding_severity(speed: f64, limit: f64) -> Result<Option<Severity>, Error> {
    if !speed.is_finite() || !limit.is_finite() {
        return Err(Error::Computation(format!(
            "Speed and speed limit must be numbers, got {speed} and {limit}"
        )));
    }
    if speed < 0.0 || limit < 0.0 {
        return Err(Error::Computation(format!(
            "Speed and speed limit must not be negative, got {speed} and {limit}"
        )));
    }

    let difference = speed - limit;
    let severity = if difference <= 0.0 {
        None
    } else if difference > 30.0 {
        Some(Severity::High)
    } else if difference > 15.0 {
        Some(Severity::Medium)
    } else {
        Some(Severity::Low)
    };

    Ok(severity)
}

/// Immutable violation record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Violation {
    pub id: ViolationId,
    pub plate: String,
    pub violation_type: ViolationType,
    pub severity: Severity,
    pub junction: Option<JunctionId>,
    pub description: String,
    pub timestamp: Timestamp,
    pub fine_amount: f64,
}

impl Violation {
    pub(crate) fn new(
        id: ViolationId,
        plate: String,
        violation_type: ViolationType,
        severity: Severity,
        junction: Option<JunctionId>,
        description: String,
        timestamp: Timestamp,
    ) -> Self {
        Self {
            id,
            plate,
            violation_type,
            severity,
            junction,
            description,
            timestamp,
            fine_amount: calculate_fine(violation_type, severity),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - {} ({})",
            self.plate,
            self.violation_type.label(),
            self.severity
        )
    }
}

/// Result of checking a recorded speed against the road's limit
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SpeedingOutcome {
    WithinLimit { speed: f64, speed_limit: f64 },
    Violation { violation: Violation, difference: f64 },
}
