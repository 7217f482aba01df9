use std::sync::Mutex;

use super::SignalClock;
use crate::model::{Junction, Road};
use crate::sync::lock;
use crate::{LightStatus, RoadId, Timestamp};

/// Coordinates the signal state of the roads meeting at junctions.
///
/// Lock order is junction reference time first, then roads by ascending id.
/// Every status resolution happens while holding the road's lock, so two
/// readers crossing the same cycle boundary cannot both apply the flip.
#[derive(Debug, Clone, Copy)]
pub struct JunctionController<'a> {
    clock: SignalClock,
    roads: &'a [Mutex<Road>],
}

impl<'a> JunctionController<'a> {
    pub(crate) fn new(clock: SignalClock, roads: &'a [Mutex<Road>]) -> Self {
        Self { clock, roads }
    }

    pub fn clock(&self) -> SignalClock {
        self.clock
    }

    /// Current status of a single road, persisting any cycle advance
    pub fn road_status(&self, road: RoadId, now: Timestamp) -> LightStatus {
        lock(&self.roads[road.0]).resolve(&self.clock, now)
    }

    /// First member GREEN, the rest RED, all phases starting at `now`
    pub(crate) fn assign_initial_phases(&self, members: &[RoadId], now: Timestamp) {
        for (position, road) in members.iter().enumerate() {
            let status = if position == 0 {
                LightStatus::Green
            } else {
                LightStatus::Red
            };
            lock(&self.roads[road.0]).force(status, now);
        }
    }

    /// Advances junction-level cycling.
    ///
    /// Two-road junctions swap both statuses together on an odd number of
    /// elapsed cycles and restart both phases at `now`, so the roads never show
    /// the same color. Junctions with more roads resolve every member on its
    /// own clock.
    pub fn update_light_statuses(&self, junction: &Junction, now: Timestamp) {
        let mut reference = lock(junction.reference());
        let cycles = self.clock.elapsed_cycles(*reference, now);
        if cycles == 0 {
            return;
        }

        if let [a, b] = junction.roads[..] {
            let (low, high) = if a < b { (a, b) } else { (b, a) };
            let mut first = lock(&self.roads[low.0]);
            let mut second = lock(&self.roads[high.0]);

            // Both roads share a phase-aligned clock, so resolving each one
            // swaps them together even if one was already read on its own.
            let first_status = first.resolve(&self.clock, now);
            let second_status = second.resolve(&self.clock, now);
            if cycles % 2 == 1 {
                first.force(first_status, now);
                second.force(second_status, now);

                log::debug!(
                    "Junction '{}' swapped phases: '{}' {first_status}, '{}' {second_status}",
                    junction.name,
                    first.name,
                    second.name
                );
            }
        } else {
            for &road in &junction.roads {
                self.road_status(road, now);
            }
        }

        *reference = now;
    }

    /// Updates junction cycling and reports every member road's status
    pub fn statuses(&self, junction: &Junction, now: Timestamp) -> Vec<(RoadId, LightStatus)> {
        self.update_light_statuses(junction, now);
        junction
            .roads
            .iter()
            .map(|&road| (road, self.road_status(road, now)))
            .collect()
    }

    /// Emergency override: `entry` GREEN, all siblings RED, phases restarted at `now`
    pub fn force_green(&self, junction: &Junction, entry: RoadId, now: Timestamp) {
        let mut reference = lock(junction.reference());

        let mut members = junction.roads.clone();
        members.sort_unstable();
        let mut guards: Vec<_> = members.iter().map(|r| lock(&self.roads[r.0])).collect();

        for road in &mut guards {
            let status = if road.id == entry {
                LightStatus::Green
            } else {
                LightStatus::Red
            };
            road.force(status, now);
        }
        *reference = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::JunctionId;
    use chrono::{NaiveDate, TimeDelta};

    fn at(seconds: i64) -> Timestamp {
        NaiveDate::from_ymd_opt(2025, 2, 13)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
            + TimeDelta::seconds(seconds)
    }

    fn roads(count: usize) -> Vec<Mutex<Road>> {
        (0..count)
            .map(|i| Mutex::new(Road::new(RoadId(i), format!("road-{i}"), at(0))))
            .collect()
    }

    fn junction(members: &[usize]) -> Junction {
        Junction::new(
            JunctionId(0),
            "j".to_string(),
            members.iter().map(|&i| RoadId(i)).collect(),
            at(0),
        )
    }

    fn status(roads: &[Mutex<Road>], i: usize) -> LightStatus {
        lock(&roads[i]).light_status
    }

    #[test]
    fn initial_phases_first_green_rest_red() {
        let roads = roads(3);
        let controller = JunctionController::new(SignalClock::default(), &roads);
        controller.assign_initial_phases(&[RoadId(1), RoadId(0), RoadId(2)], at(5));

        assert_eq!(status(&roads, 1), LightStatus::Green);
        assert_eq!(status(&roads, 0), LightStatus::Red);
        assert_eq!(status(&roads, 2), LightStatus::Red);
        assert_eq!(lock(&roads[2]).last_status_change, at(5));
    }

    #[test]
    fn two_road_swap_keeps_roads_opposite() {
        let roads = roads(2);
        let junction = junction(&[0, 1]);
        let controller = JunctionController::new(SignalClock::default(), &roads);
        controller.assign_initial_phases(&junction.roads, at(0));

        controller.update_light_statuses(&junction, at(31));
        assert_eq!(status(&roads, 0), LightStatus::Red);
        assert_eq!(status(&roads, 1), LightStatus::Green);
        assert_eq!(lock(&roads[0]).last_status_change, at(31));
        assert_eq!(lock(&roads[1]).last_status_change, at(31));
        assert_eq!(junction.last_status_change(), at(31));

        // Same window: nothing moves
        controller.update_light_statuses(&junction, at(50));
        assert_eq!(status(&roads, 0), LightStatus::Red);

        // Two cycles later: even, no swap but reference advances
        controller.update_light_statuses(&junction, at(95));
        assert_eq!(status(&roads, 0), LightStatus::Red);
        assert_eq!(status(&roads, 1), LightStatus::Green);
        assert_eq!(junction.last_status_change(), at(95));
    }

    #[test]
    fn swap_after_single_road_read_stays_opposite() {
        let roads = roads(2);
        let junction = junction(&[0, 1]);
        let controller = JunctionController::new(SignalClock::default(), &roads);
        controller.assign_initial_phases(&junction.roads, at(0));

        assert_eq!(controller.road_status(RoadId(0), at(31)), LightStatus::Red);
        controller.update_light_statuses(&junction, at(35));
        assert_eq!(status(&roads, 0), LightStatus::Red);
        assert_eq!(status(&roads, 1), LightStatus::Green);
        assert_eq!(lock(&roads[0]).last_status_change, at(35));
    }

    #[test]
    fn concurrent_reads_flip_a_road_once() {
        let roads = roads(2);
        let controller = JunctionController::new(SignalClock::default(), &roads);
        controller.assign_initial_phases(&[RoadId(0), RoadId(1)], at(0));

        let observed: Vec<LightStatus> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|i| scope.spawn(move || controller.road_status(RoadId(0), at(31 + i))))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert!(observed.iter().all(|&s| s == LightStatus::Red));
        assert_eq!(status(&roads, 0), LightStatus::Red);
        assert_eq!(lock(&roads[0]).last_status_change, at(30));
    }

    #[test]
    fn larger_junctions_fall_back_to_road_clocks() {
        let roads = roads(3);
        let junction = junction(&[0, 1, 2]);
        let controller = JunctionController::new(SignalClock::default(), &roads);
        controller.assign_initial_phases(&junction.roads, at(0));

        let statuses = controller.statuses(&junction, at(45));
        assert_eq!(
            statuses,
            vec![
                (RoadId(0), LightStatus::Red),
                (RoadId(1), LightStatus::Green),
                (RoadId(2), LightStatus::Green),
            ]
        );
        assert_eq!(lock(&roads[0]).last_status_change, at(30));
    }

    #[test]
    fn force_green_overrides_current_phases() {
        let roads = roads(3);
        let junction = junction(&[0, 1, 2]);
        let controller = JunctionController::new(SignalClock::default(), &roads);
        controller.assign_initial_phases(&junction.roads, at(0));

        controller.force_green(&junction, RoadId(2), at(10));
        assert_eq!(status(&roads, 0), LightStatus::Red);
        assert_eq!(status(&roads, 1), LightStatus::Red);
        assert_eq!(status(&roads, 2), LightStatus::Green);
        assert_eq!(junction.last_status_change(), at(10));
        assert_eq!(controller.road_status(RoadId(2), at(39)), LightStatus::Green);
    }
}
