use std::cmp::Ordering;

use itertools::Itertools;
use rayon::prelude::*;
use serde::Serialize;

use super::TrafficBucket;
use crate::JunctionId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
    Severe,
}

impl RiskLevel {
    pub fn from_frequency(congestion_frequency: f64) -> Self {
        if congestion_frequency > 75.0 {
            RiskLevel::Severe
        } else if congestion_frequency > 50.0 {
            RiskLevel::High
        } else if congestion_frequency > 25.0 {
            RiskLevel::Moderate
        } else {
            RiskLevel::Low
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RiskLevel::Low => "LOW",
            RiskLevel::Moderate => "MODERATE",
            RiskLevel::High => "HIGH",
            RiskLevel::Severe => "SEVERE",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CongestionStats {
    /// Buckets in the window whose count exceeds the threshold
    pub total_peak_hours: usize,
    /// Mean count per recorded hour bucket, rounded to two decimals
    pub avg_daily_vehicles: f64,
    pub max_hourly_vehicles: u32,
    /// `total_peak_hours / days * 100`, rounded to two decimals
    pub congestion_frequency: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CongestionReport {
    pub junction: JunctionId,
    pub junction_name: String,
    pub risk_level: RiskLevel,
    pub stats: CongestionStats,
}

/// Ranks junctions by how often their hourly count exceeded `threshold`.
///
/// `buckets` should already be restricted to the analysis window. Only
/// junctions with at least one bucket appear in the result, most congested
/// first.
pub fn congestion_prone_areas<F>(
    buckets: Vec<TrafficBucket>,
    threshold: u32,
    days: u32,
    junction_name: F,
) -> Vec<CongestionReport>
where
    F: Fn(JunctionId) -> String + Sync,
{
    let by_junction = buckets.into_iter().into_group_map_by(|b| b.junction);

    let mut reports: Vec<CongestionReport> = by_junction
        .into_par_iter()
        .map(|(junction, buckets)| {
            let (stats, risk_level) = junction_stats(&buckets, threshold, days);
            CongestionReport {
                junction,
                junction_name: junction_name(junction),
                risk_level,
                stats,
            }
        })
        .collect();

    reports.sort_by(|a, b| {
        b.stats
            .congestion_frequency
            .partial_cmp(&a.stats.congestion_frequency)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.junction_name.cmp(&b.junction_name))
    });

    reports
}

#[allow(clippy::cast_precision_loss)]
fn junction_stats(
    buckets: &[TrafficBucket],
    threshold: u32,
    days: u32,
) -> (CongestionStats, RiskLevel) {
    let total_peak_hours = buckets
        .iter()
        .filter(|b| b.vehicle_count > threshold)
        .count();
    let total: u64 = buckets.iter().map(|b| u64::from(b.vehicle_count)).sum();
    let max_hourly_vehicles = buckets.iter().map(|b| b.vehicle_count).max().unwrap_or(0);

    let avg = if buckets.is_empty() {
        0.0
    } else {
        total as f64 / buckets.len() as f64
    };
    let frequency = total_peak_hours as f64 / f64::from(days.max(1)) * 100.0;

    // Risk follows the exact frequency, not the rounded one
    let stats = CongestionStats {
        total_peak_hours,
        avg_daily_vehicles: round2(avg),
        max_hourly_vehicles,
        congestion_frequency: round2(frequency),
    };
    (stats, RiskLevel::from_frequency(frequency))
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn bucket(junction: usize, day: u32, hour: u32, count: u32) -> TrafficBucket {
        TrafficBucket {
            junction: JunctionId(junction),
            date: NaiveDate::from_ymd_opt(2025, 2, day).unwrap(),
            hour,
            vehicle_count: count,
            peak_status: count > 4,
        }
    }

    #[test]
    fn risk_level_boundaries() {
        assert_eq!(RiskLevel::from_frequency(76.0), RiskLevel::Severe);
        assert_eq!(RiskLevel::from_frequency(75.0), RiskLevel::High);
        assert_eq!(RiskLevel::from_frequency(50.0), RiskLevel::Moderate);
        assert_eq!(RiskLevel::from_frequency(25.0), RiskLevel::Low);
        assert_eq!(RiskLevel::from_frequency(0.0), RiskLevel::Low);
    }

    #[test]
    fn ranks_by_frequency() {
        let buckets = vec![
            bucket(0, 13, 8, 6),
            bucket(0, 13, 9, 3),
            bucket(1, 13, 8, 9),
            bucket(1, 13, 9, 7),
            bucket(1, 14, 8, 12),
            bucket(2, 14, 8, 1),
        ];
        let names = ["Central", "Harbor", "Quiet"];
        let reports = congestion_prone_areas(buckets, 5, 2, |j| names[j.0].to_string());

        assert_eq!(reports.len(), 3);
        assert_eq!(reports[0].junction_name, "Harbor");
        assert_eq!(reports[0].stats.total_peak_hours, 3);
        assert!((reports[0].stats.congestion_frequency - 150.0).abs() < 1e-9);
        assert_eq!(reports[0].risk_level, RiskLevel::Severe);
        assert!((reports[0].stats.avg_daily_vehicles - 9.33).abs() < 1e-9);
        assert_eq!(reports[0].stats.max_hourly_vehicles, 12);

        assert_eq!(reports[1].junction_name, "Central");
        assert!((reports[1].stats.congestion_frequency - 50.0).abs() < 1e-9);
        assert_eq!(reports[1].risk_level, RiskLevel::Moderate);

        assert_eq!(reports[2].junction_name, "Quiet");
        assert_eq!(reports[2].stats.total_peak_hours, 0);
        assert_eq!(reports[2].risk_level, RiskLevel::Low);
    }

    #[test]
    fn risk_uses_unrounded_frequency() {
        // 10000 peaks over 13333 days is 75.0019%, shown as 75.0
        let buckets = vec![bucket(0, 13, 8, 6); 10_000];
        let reports = congestion_prone_areas(buckets, 5, 13_333, |_| "Central".to_string());

        assert!((reports[0].stats.congestion_frequency - 75.0).abs() < 1e-9);
        assert_eq!(reports[0].risk_level, RiskLevel::Severe);
    }

    #[test]
    fn empty_window_gives_empty_report() {
        let reports = congestion_prone_areas(Vec::new(), 5, 1, |j| j.0.to_string());
        assert!(reports.is_empty());
    }
}
