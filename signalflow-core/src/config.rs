//! Tunable constants of the signal, analytics and routing layers.
//!
//! Every field has a default equal to the behavior of the reference
//! deployment, so an empty JSON object is a valid configuration.

use serde::{Deserialize, Serialize};

use crate::Error;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrafficConfig {
    pub signal: SignalConfig,
    pub analytics: AnalyticsConfig,
    pub congestion: CongestionConfig,
    pub routing: RoutingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalConfig {
    /// Length of one light phase in seconds
    pub cycle_seconds: i64,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self { cycle_seconds: 30 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    /// An hour bucket is a peak hour when its count exceeds this value
    pub peak_threshold: u32,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self { peak_threshold: 4 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CongestionConfig {
    /// Live count above which a junction is congested (MEDIUM level)
    pub congested_above: u32,
    /// Live count above which congestion is HIGH
    pub high_above: u32,
}

impl Default for CongestionConfig {
    fn default() -> Self {
        Self {
            congested_above: 5,
            high_above: 8,
        }
    }
}

/// Strategy used to enumerate candidate routes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathSearch {
    /// Best-first search over whole paths, pruning only nodes already on the path
    #[default]
    Naive,
    /// Yen's loopless k-shortest paths
    Yen,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingConfig {
    /// Number of candidate routes to compute
    pub k: usize,
    pub search: PathSearch,
    pub minutes_per_junction: f64,
    pub congested_penalty_minutes: f64,
    pub red_light_penalty_minutes: f64,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            k: 3,
            search: PathSearch::Naive,
            minutes_per_junction: 3.0,
            congested_penalty_minutes: 10.0,
            red_light_penalty_minutes: 1.0,
        }
    }
}

impl TrafficConfig {
    /// Parses and validates a JSON configuration document
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the document is malformed or a value is out of range
    pub fn from_json_str(json: &str) -> Result<Self, Error> {
        let config: TrafficConfig =
            serde_json::from_str(json).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    ///
    /// Returns [`Error::Config`] naming the first out-of-range value
    pub fn validate(&self) -> Result<(), Error> {
        if self.signal.cycle_seconds <= 0 {
            return Err(Error::Config(format!(
                "signal.cycle_seconds must be positive, got {}",
                self.signal.cycle_seconds
            )));
        }

        if self.congestion.high_above < self.congestion.congested_above {
            return Err(Error::Config(
                "congestion.high_above must not be lower than congestion.congested_above"
                    .to_string(),
            ));
        }

        let minutes = [
            self.routing.minutes_per_junction,
            self.routing.congested_penalty_minutes,
            self.routing.red_light_penalty_minutes,
        ];
        if minutes.iter().any(|m| !m.is_finite() || *m < 0.0) {
            return Err(Error::Config(
                "routing penalties must be finite and non-negative".to_string(),
            ));
        }

        Ok(())
    }
}
