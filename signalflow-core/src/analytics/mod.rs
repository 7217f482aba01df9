//! Per-junction, per-hour traffic counting.
//!
//! Buckets are keyed by (junction, date, hour), created on the first passage
//! of an hour and incremented once per passage afterwards.

mod report;
mod summary;

use std::sync::Mutex;

use chrono::{NaiveDate, Timelike};
use hashbrown::HashMap;
use serde::Serialize;

use crate::sync::lock;
use crate::{Error, JunctionId, Timestamp};

pub use report::{CongestionReport, CongestionStats, RiskLevel, congestion_prone_areas};
pub use summary::{DailySummary, parse_date};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BucketKey {
    pub junction: JunctionId,
    pub date: NaiveDate,
    pub hour: u32,
}

impl BucketKey {
    pub fn at(junction: JunctionId, timestamp: Timestamp) -> Self {
        Self {
            junction,
            date: timestamp.date(),
            hour: timestamp.hour(),
        }
    }
}

/// Vehicle count of one junction during one hour of one day
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrafficBucket {
    pub junction: JunctionId,
    pub date: NaiveDate,
    pub hour: u32,
    pub vehicle_count: u32,
    pub peak_status: bool,
}

#[derive(Debug)]
pub struct TrafficAnalytics {
    peak_threshold: u32,
    buckets: Mutex<HashMap<BucketKey, TrafficBucket>>,
}

impl TrafficAnalytics {
    pub fn new(peak_threshold: u32) -> Self {
        Self {
            peak_threshold,
            buckets: Mutex::new(HashMap::new()),
        }
    }

    pub fn peak_threshold(&self) -> u32 {
        self.peak_threshold
    }

    /// Counts one passage at `junction` in the hour containing `timestamp`
    pub fn record_traffic(&self, junction: JunctionId, timestamp: Timestamp) -> TrafficBucket {
        let key = BucketKey::at(junction, timestamp);
        let mut buckets = lock(&self.buckets);

        let bucket = buckets.entry(key).or_insert_with(|| TrafficBucket {
            junction,
            date: key.date,
            hour: key.hour,
            vehicle_count: 0,
            peak_status: false,
        });
        bucket.vehicle_count += 1;
        bucket.peak_status = bucket.vehicle_count > self.peak_threshold;

        bucket.clone()
    }

    /// Stores a bucket loaded from historical records, replacing any existing count
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if `hour` is outside 0..=23
    pub fn import_bucket(
        &self,
        junction: JunctionId,
        date: NaiveDate,
        hour: u32,
        vehicle_count: u32,
    ) -> Result<TrafficBucket, Error> {
        if hour > 23 {
            return Err(Error::Validation(format!(
                "Hour must be between 0 and 23, got {hour}"
            )));
        }

        let bucket = TrafficBucket {
            junction,
            date,
            hour,
            vehicle_count,
            peak_status: vehicle_count > self.peak_threshold,
        };
        lock(&self.buckets).insert(
            BucketKey {
                junction,
                date,
                hour,
            },
            bucket.clone(),
        );
        Ok(bucket)
    }

    pub fn bucket(&self, junction: JunctionId, timestamp: Timestamp) -> Option<TrafficBucket> {
        lock(&self.buckets)
            .get(&BucketKey::at(junction, timestamp))
            .cloned()
    }

    /// All buckets of a junction, ordered by date and hour
    pub fn buckets_for(&self, junction: JunctionId) -> Vec<TrafficBucket> {
        self.collect_sorted(|b| b.junction == junction)
    }

    /// Buckets of every junction with `start <= date <= end`
    pub fn buckets_between(&self, start: NaiveDate, end: NaiveDate) -> Vec<TrafficBucket> {
        self.collect_sorted(|b| b.date >= start && b.date <= end)
    }

    pub fn len(&self) -> usize {
        lock(&self.buckets).len()
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.buckets).is_empty()
    }

    fn collect_sorted(&self, filter: impl Fn(&TrafficBucket) -> bool) -> Vec<TrafficBucket> {
        let mut selected: Vec<TrafficBucket> = lock(&self.buckets)
            .values()
            .filter(|b| filter(b))
            .cloned()
            .collect();
        selected.sort_unstable_by_key(|b| (b.junction, b.date, b.hour));
        selected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(day: u32, hour: u32, minute: u32) -> Timestamp {
        NaiveDate::from_ymd_opt(2025, 2, day)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    #[test]
    fn five_passages_make_a_peak_hour() {
        let analytics = TrafficAnalytics::new(4);
        let junction = JunctionId(0);

        for minute in 0..4 {
            let bucket = analytics.record_traffic(junction, at(13, 9, minute));
            assert!(!bucket.peak_status);
        }
        let bucket = analytics.record_traffic(junction, at(13, 9, 59));
        assert_eq!(bucket.vehicle_count, 5);
        assert!(bucket.peak_status);
        assert_eq!(analytics.len(), 1);
    }

    #[test]
    fn four_passages_are_not_peak() {
        let analytics = TrafficAnalytics::new(4);
        for minute in 0..4 {
            analytics.record_traffic(JunctionId(1), at(13, 17, minute));
        }
        let bucket = analytics.bucket(JunctionId(1), at(13, 17, 30)).unwrap();
        assert_eq!(bucket.vehicle_count, 4);
        assert!(!bucket.peak_status);
    }

    #[test]
    fn buckets_split_by_hour_date_and_junction() {
        let analytics = TrafficAnalytics::new(4);
        analytics.record_traffic(JunctionId(0), at(13, 9, 0));
        analytics.record_traffic(JunctionId(0), at(13, 10, 0));
        analytics.record_traffic(JunctionId(0), at(14, 9, 0));
        analytics.record_traffic(JunctionId(1), at(13, 9, 0));

        assert_eq!(analytics.len(), 4);
        let own = analytics.buckets_for(JunctionId(0));
        assert_eq!(own.len(), 3);
        assert_eq!(own[0].date, NaiveDate::from_ymd_opt(2025, 2, 13).unwrap());
        assert_eq!(own[0].hour, 9);
        assert_eq!(own[2].date, NaiveDate::from_ymd_opt(2025, 2, 14).unwrap());
    }

    #[test]
    fn import_rejects_invalid_hour() {
        let analytics = TrafficAnalytics::new(4);
        let date = NaiveDate::from_ymd_opt(2025, 2, 13).unwrap();
        assert!(analytics.import_bucket(JunctionId(0), date, 24, 3).is_err());
        let bucket = analytics.import_bucket(JunctionId(0), date, 23, 9).unwrap();
        assert!(bucket.peak_status);
    }

    #[test]
    fn concurrent_recording_loses_no_updates() {
        let analytics = TrafficAnalytics::new(4);
        std::thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| {
                    for _ in 0..25 {
                        analytics.record_traffic(JunctionId(3), at(13, 8, 15));
                    }
                });
            }
        });
        let bucket = analytics.bucket(JunctionId(3), at(13, 8, 0)).unwrap();
        assert_eq!(bucket.vehicle_count, 200);
    }
}
