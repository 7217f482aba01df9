use chrono::NaiveDate;
use serde::Serialize;

use super::TrafficAnalytics;
use crate::{Error, JunctionId};

/// Aggregate over all hour buckets of one junction on one day
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailySummary {
    pub total_vehicles: u64,
    /// Mean over the hours that saw traffic, not over all 24
    pub avg_vehicles_per_hour: f64,
    pub peak_hours_count: usize,
}

impl TrafficAnalytics {
    /// Daily totals for a junction, `None` when no passage was recorded that day
    pub fn daily_summary(&self, junction: JunctionId, date: NaiveDate) -> Option<DailySummary> {
        let buckets = self.collect_sorted(|b| b.junction == junction && b.date == date);
        if buckets.is_empty() {
            return None;
        }

        let total_vehicles: u64 = buckets.iter().map(|b| u64::from(b.vehicle_count)).sum();
        #[allow(clippy::cast_precision_loss)]
        let avg_vehicles_per_hour = total_vehicles as f64 / buckets.len() as f64;
        let peak_hours_count = buckets.iter().filter(|b| b.peak_status).count();

        Some(DailySummary {
            total_vehicles,
            avg_vehicles_per_hour,
            peak_hours_count,
        })
    }

    /// `(hour, vehicle_count)` pairs of a junction's day, ascending by hour
    pub fn hourly_counts(&self, junction: JunctionId, date: NaiveDate) -> Vec<(u32, u32)> {
        self.collect_sorted(|b| b.junction == junction && b.date == date)
            .into_iter()
            .map(|b| (b.hour, b.vehicle_count))
            .collect()
    }
}

/// Parses a `YYYY-MM-DD` date
///
/// # Errors
///
/// Returns [`Error::Validation`] if the input is not a valid calendar date in that format
pub fn parse_date(input: &str) -> Result<NaiveDate, Error> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d").map_err(|_| {
        Error::Validation(format!(
            "Date must be in YYYY-MM-DD format, for example 2025-02-13; got '{input}'"
        ))
    })
}
