use chrono::{Datelike, Timelike};
use itertools::Itertools;
use serde::Serialize;

use crate::analytics::{TrafficAnalytics, TrafficBucket};
use crate::config::CongestionConfig;
use crate::{JunctionId, Timestamp};

/// Minutes a currently congested junction is expected to stay congested
const CONGESTION_SPELL_MINUTES: f64 = 30.0;
const PEAK_HOURS_REPORTED: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CongestionLevel {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

/// Live congestion of a junction, read from the current hour's bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CongestionState {
    pub is_congested: bool,
    pub vehicle_count: u32,
    pub level: CongestionLevel,
}

impl CongestionState {
    pub fn classify(vehicle_count: u32, config: &CongestionConfig) -> Self {
        let level = if vehicle_count > config.high_above {
            CongestionLevel::High
        } else if vehicle_count > config.congested_above {
            CongestionLevel::Medium
        } else {
            CongestionLevel::Low
        };

        Self {
            is_congested: vehicle_count > config.congested_above,
            vehicle_count,
            level,
        }
    }

    /// Factor this junction contributes to the weight of every edge touching it
    pub fn weight_factor(&self) -> f64 {
        let mut factor = 1.0;
        if self.is_congested {
            factor *= 3.0;
        }
        if self.level == CongestionLevel::Medium {
            factor *= 1.5;
        }
        factor
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PeakHour {
    pub hour: u32,
    /// Number of days on which this hour was a peak hour
    pub occurrences: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CongestionPrediction {
    /// Percentage in `0.0..=100.0`
    pub probability: f64,
    pub confidence: Confidence,
    pub current_state: CongestionState,
    /// Minutes
    pub expected_duration: u32,
    pub historical_peak_hours: Vec<PeakHour>,
    /// Buckets from earlier days sharing the target's hour and weekday
    pub samples: usize,
}

pub fn current_congestion_state(
    analytics: &TrafficAnalytics,
    config: &CongestionConfig,
    junction: JunctionId,
    now: Timestamp,
) -> CongestionState {
    let count = analytics
        .bucket(junction, now)
        .map_or(0, |bucket| bucket.vehicle_count);
    CongestionState::classify(count, config)
}

/// Blends the live state at `target_time` with how often the same hour of the
/// same weekday was a peak hour on earlier days.
pub fn predict_congestion(
    analytics: &TrafficAnalytics,
    config: &CongestionConfig,
    junction: JunctionId,
    target_time: Timestamp,
) -> CongestionPrediction {
    let current_state = current_congestion_state(analytics, config, junction, target_time);
    let history = analytics.buckets_for(junction);

    let date = target_time.date();
    let weekday = target_time.weekday();
    let hour = target_time.hour();
    let (samples, peaks) = history
        .iter()
        .filter(|b| b.date < date && b.hour == hour && b.date.weekday() == weekday)
        .fold((0_usize, 0_usize), |(samples, peaks), b| {
            (samples + 1, peaks + usize::from(b.peak_status))
        });

    let (probability, confidence) = if samples == 0 {
        if current_state.is_congested {
            (100.0, Confidence::High)
        } else {
            (0.0, Confidence::Low)
        }
    } else {
        #[allow(clippy::cast_precision_loss)]
        let historical = peaks as f64 / samples as f64 * 100.0;
        if current_state.is_congested {
            ((historical * 1.5).min(100.0), Confidence::High)
        } else {
            let confidence = if samples > 30 {
                Confidence::High
            } else if samples > 10 {
                Confidence::Medium
            } else {
                Confidence::Low
            };
            (historical * 0.8, confidence)
        }
    };

    CongestionPrediction {
        probability,
        confidence,
        current_state,
        expected_duration: expected_duration(probability),
        historical_peak_hours: historical_peak_hours(&history),
        samples,
    }
}

// Scales the congestion spell by the probability: 100% -> 30 min, 0% -> 0 min
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn expected_duration(probability: f64) -> u32 {
    (probability / 100.0 * CONGESTION_SPELL_MINUTES).round() as u32
}

/// Hours that were most often peak hours, most frequent first, earlier hour on ties
pub fn historical_peak_hours(history: &[TrafficBucket]) -> Vec<PeakHour> {
    history
        .iter()
        .filter(|b| b.peak_status)
        .counts_by(|b| b.hour)
        .into_iter()
        .map(|(hour, occurrences)| PeakHour { hour, occurrences })
        .sorted_by(|a, b| b.occurrences.cmp(&a.occurrences).then(a.hour.cmp(&b.hour)))
        .take(PEAK_HOURS_REPORTED)
        .collect()
}
