use std::cmp::Reverse;
use std::sync::{Mutex, RwLock};

use chrono::{Days, NaiveDate};
use hashbrown::HashMap;
use itertools::Itertools;
use serde::Serialize;

use super::{Junction, Passage, PassageOutcome, Road, Vehicle};
use crate::analytics::{
    CongestionReport, DailySummary, TrafficAnalytics, TrafficBucket, congestion_prone_areas,
};
use crate::config::TrafficConfig;
use crate::error::{EntityKind, Error};
use crate::notify::{self, Notifier};
use crate::routing::{AlternateRoute, CongestionPrediction, CongestionState, TrafficPredictor};
use crate::signal::{JunctionController, SignalClock};
use crate::sync::{lock, read, write};
use crate::violation::{Severity, SpeedingOutcome, Violation, ViolationType, speeding_severity};
use crate::{JunctionId, LightStatus, RoadId, Timestamp, VehicleId, ViolationId};

/// Alternate routes mailed to a vehicle owner
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteSummaryDelivery {
    pub routes: Vec<AlternateRoute>,
    pub notification_sent: bool,
}

/// In-memory traffic network: the registry of vehicles, roads and junctions
/// together with the passage log, violation records and hourly analytics.
///
/// Registration takes `&mut self`; every event and query takes `&self`, so a
/// built network can be shared between threads.
#[derive(Debug)]
pub struct TrafficModel {
    config: TrafficConfig,
    clock: SignalClock,

    vehicles: Vec<Vehicle>,
    vehicle_index: HashMap<String, VehicleId>,

    roads: Vec<Mutex<Road>>,
    road_index: HashMap<String, RoadId>,

    junctions: Vec<Junction>,
    junction_index: HashMap<String, JunctionId>,

    passages: RwLock<Vec<Passage>>,
    violations: RwLock<Vec<Violation>>,
    analytics: TrafficAnalytics,
}

impl Default for TrafficModel {
    fn default() -> Self {
        Self::build(TrafficConfig::default())
    }
}

impl TrafficModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// # Errors
    ///
    /// Returns [`Error::Config`] if the configuration is out of range
    pub fn with_config(config: TrafficConfig) -> Result<Self, Error> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: TrafficConfig) -> Self {
        Self {
            clock: SignalClock::new(config.signal.cycle_seconds),
            analytics: TrafficAnalytics::new(config.analytics.peak_threshold),
            config,
            vehicles: Vec::new(),
            vehicle_index: HashMap::new(),
            roads: Vec::new(),
            road_index: HashMap::new(),
            junctions: Vec::new(),
            junction_index: HashMap::new(),
            passages: RwLock::new(Vec::new()),
            violations: RwLock::new(Vec::new()),
        }
    }

    pub fn config(&self) -> &TrafficConfig {
        &self.config
    }

    pub fn analytics(&self) -> &TrafficAnalytics {
        &self.analytics
    }

    pub fn controller(&self) -> JunctionController<'_> {
        JunctionController::new(self.clock, &self.roads)
    }

    pub fn predictor(&self) -> TrafficPredictor<'_> {
        TrafficPredictor::new(self)
    }

    pub fn vehicle_count(&self) -> usize {
        self.vehicles.len()
    }

    pub fn road_count(&self) -> usize {
        self.roads.len()
    }

    pub fn junction_count(&self) -> usize {
        self.junctions.len()
    }

    // Registry

    /// Registers a vehicle, or updates the owner details of an existing plate.
    /// Returns the vehicle id and whether it was newly created.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if any field is empty
    pub fn register_vehicle(
        &mut self,
        plate: &str,
        owner_name: &str,
        vehicle_type: &str,
        owner_email: &str,
        now: Timestamp,
    ) -> Result<(VehicleId, bool), Error> {
        let plate = required("Number plate", plate)?;
        let owner_name = required("Owner name", owner_name)?;
        let vehicle_type = required("Vehicle type", vehicle_type)?;
        let owner_email = required("Owner email", owner_email)?;

        if let Some(&id) = self.vehicle_index.get(&plate) {
            let vehicle = &mut self.vehicles[id.0];
            vehicle.owner_name = owner_name;
            vehicle.vehicle_type = vehicle_type;
            vehicle.owner_email = owner_email;
            log::info!("Updated vehicle {plate}");
            return Ok((id, false));
        }

        let id = VehicleId(self.vehicles.len());
        log::info!("Registered vehicle {plate} ({vehicle_type})");
        self.vehicle_index.insert(plate.clone(), id);
        self.vehicles.push(Vehicle {
            plate,
            owner_name,
            vehicle_type,
            owner_email,
            registered_at: now,
        });
        Ok((id, true))
    }

    /// Returns the road with this name, creating it RED if it does not exist yet
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if the name is empty
    pub fn create_road(&mut self, name: &str, now: Timestamp) -> Result<(RoadId, bool), Error> {
        let name = required("Road name", name)?;
        if let Some(&id) = self.road_index.get(&name) {
            return Ok((id, false));
        }

        let id = RoadId(self.roads.len());
        log::info!("Created road '{name}'");
        self.road_index.insert(name.clone(), id);
        self.roads.push(Mutex::new(Road::new(id, name, now)));
        Ok((id, true))
    }

    /// Creates a junction of existing roads; the first road starts GREEN, the rest RED.
    ///
    /// # Errors
    ///
    /// - [`Error::Validation`] for an empty or taken name, fewer than two roads,
    ///   or a road listed twice
    /// - [`Error::NotFound`] for an unknown road
    pub fn create_junction<S: AsRef<str>>(
        &mut self,
        name: &str,
        road_names: &[S],
        now: Timestamp,
    ) -> Result<JunctionId, Error> {
        let name = required("Junction name", name)?;
        if self.junction_index.contains_key(&name) {
            return Err(Error::Validation(format!(
                "Junction '{name}' already exists"
            )));
        }
        if road_names.len() < 2 {
            return Err(Error::Validation(format!(
                "A junction must be created with at least 2 roads, got {}",
                road_names.len()
            )));
        }

        let roads = road_names
            .iter()
            .map(|road| self.road_id(road.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        if let Some(duplicate) = roads.iter().duplicates().next() {
            return Err(Error::Validation(format!(
                "Road '{}' is listed more than once",
                self.road_name(*duplicate)
            )));
        }

        let id = JunctionId(self.junctions.len());
        self.controller().assign_initial_phases(&roads, now);

        log::info!(
            "Created junction '{name}' with roads {}",
            road_names.iter().map(|road| road.as_ref()).join(", ")
        );
        self.junction_index.insert(name.clone(), id);
        self.junctions.push(Junction::new(id, name, roads, now));
        Ok(id)
    }

    /// # Errors
    ///
    /// Returns [`Error::NotFound`] for an unknown plate
    pub fn vehicle(&self, plate: &str) -> Result<&Vehicle, Error> {
        self.vehicle_index
            .get(plate.trim())
            .map(|id| &self.vehicles[id.0])
            .ok_or_else(|| Error::not_found(EntityKind::Vehicle, plate))
    }

    /// Snapshot of a road as currently stored, without resolving its clock
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] for an unknown road
    pub fn road(&self, name: &str) -> Result<Road, Error> {
        let id = self.road_id(name)?;
        Ok(lock(&self.roads[id.0]).clone())
    }

    /// Current signal of a road, advancing its stored state to `now`
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] for an unknown road
    pub fn road_status(&self, name: &str, now: Timestamp) -> Result<LightStatus, Error> {
        let id = self.road_id(name)?;
        Ok(self.controller().road_status(id, now))
    }

    /// # Errors
    ///
    /// Returns [`Error::NotFound`] for an unknown junction
    pub fn junction(&self, name: &str) -> Result<&Junction, Error> {
        self.junction_index
            .get(name.trim())
            .map(|id| &self.junctions[id.0])
            .ok_or_else(|| Error::not_found(EntityKind::Junction, name))
    }

    pub fn junctions(&self) -> &[Junction] {
        &self.junctions
    }

    pub(crate) fn junction_by_id(&self, id: JunctionId) -> &Junction {
        &self.junctions[id.0]
    }

    pub(crate) fn road_name(&self, id: RoadId) -> String {
        lock(&self.roads[id.0]).name.clone()
    }

    fn road_id(&self, name: &str) -> Result<RoadId, Error> {
        self.road_index
            .get(name.trim())
            .copied()
            .ok_or_else(|| Error::not_found(EntityKind::Road, name))
    }

    // Signals and passages

    /// Status of every road of a junction after advancing junction-level cycling
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] for an unknown junction
    pub fn junction_statuses(
        &self,
        name: &str,
        now: Timestamp,
    ) -> Result<Vec<(String, LightStatus)>, Error> {
        let junction = self.junction(name)?;
        Ok(self
            .controller()
            .statuses(junction, now)
            .into_iter()
            .map(|(road, status)| (self.road_name(road), status))
            .collect())
    }

    /// Records a vehicle entering a junction.
    ///
    /// Emergency vehicles force their entry road GREEN and every other road
    /// of the junction RED. Any other vehicle entering on RED gets a HIGH
    /// severity red-light violation. Every passage is counted in the hourly
    /// analytics.
    ///
    /// # Errors
    ///
    /// - [`Error::NotFound`] for an unknown junction, plate or road
    /// - [`Error::NotConnected`] if the road does not belong to the junction
    pub fn log_vehicle(
        &self,
        junction_name: &str,
        plate: &str,
        entry_road: &str,
        now: Timestamp,
    ) -> Result<PassageOutcome, Error> {
        let junction = self.junction(junction_name)?;
        let vehicle = self.vehicle(plate)?;
        let road = self.road_id(entry_road)?;
        if !junction.connects(road) {
            return Err(Error::NotConnected {
                road: self.road_name(road),
                junction: junction.name.clone(),
            });
        }

        let controller = self.controller();
        let (light_status, violation, emergency_override) = if vehicle.is_emergency() {
            controller.force_green(junction, road, now);
            log::info!(
                "Emergency vehicle {} took priority at '{}' from '{}'",
                vehicle.plate,
                junction.name,
                self.road_name(road)
            );
            (LightStatus::Green, None, true)
        } else {
            let status = controller.road_status(road, now);
            let violation = (status == LightStatus::Red).then(|| {
                let description = format!(
                    "Vehicle ran red light at {} entering {} junction",
                    self.road_name(road),
                    junction.name
                );
                self.push_violation(
                    &vehicle.plate,
                    ViolationType::RedLight,
                    Severity::High,
                    Some(junction.id),
                    description,
                    now,
                )
            });
            (status, violation, false)
        };

        let passage = Passage {
            junction: junction.id,
            plate: vehicle.plate.clone(),
            entry_road: road,
            timestamp: now,
        };
        write(&self.passages).push(passage.clone());
        self.analytics.record_traffic(junction.id, now);

        Ok(PassageOutcome {
            passage,
            light_status,
            violation,
            emergency_override,
        })
    }

    /// Passages through a junction, newest first
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] for an unknown junction
    pub fn passages_at(&self, junction_name: &str) -> Result<Vec<Passage>, Error> {
        let junction = self.junction(junction_name)?.id;
        let mut passages: Vec<Passage> = read(&self.passages)
            .iter()
            .rev()
            .filter(|p| p.junction == junction)
            .cloned()
            .collect();
        passages.sort_by_key(|p| Reverse(p.timestamp));
        Ok(passages)
    }

    /// Distinct plates seen at a junction, most recent first
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] for an unknown junction
    pub fn logged_vehicles(&self, junction_name: &str) -> Result<Vec<String>, Error> {
        Ok(self
            .passages_at(junction_name)?
            .into_iter()
            .map(|p| p.plate)
            .unique()
            .collect())
    }

    // Violations

    /// Records a violation of any type; the fine follows from type and severity
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] for an unknown plate or junction
    pub fn create_violation(
        &self,
        plate: &str,
        violation_type: ViolationType,
        severity: Severity,
        junction_name: Option<&str>,
        description: &str,
        now: Timestamp,
    ) -> Result<Violation, Error> {
        let vehicle = self.vehicle(plate)?;
        let junction = junction_name
            .map(|name| self.junction(name).map(|j| j.id))
            .transpose()?;

        Ok(self.push_violation(
            &vehicle.plate,
            violation_type,
            severity,
            junction,
            description.trim().to_string(),
            now,
        ))
    }

    /// Checks a speed reading against the limit, recording a SPEEDING
    /// violation when the vehicle was too fast
    ///
    /// # Errors
    ///
    /// - [`Error::Computation`] for negative or non-finite values; nothing is recorded
    /// - [`Error::NotFound`] for an unknown plate or road
    pub fn record_speeding(
        &self,
        plate: &str,
        road_name: &str,
        speed: f64,
        speed_limit: f64,
        now: Timestamp,
    ) -> Result<SpeedingOutcome, Error> {
        let severity = speeding_severity(speed, speed_limit)?;
        let vehicle = self.vehicle(plate)?;
        let road = self.road_id(road_name)?;

        let Some(severity) = severity else {
            return Ok(SpeedingOutcome::WithinLimit { speed, speed_limit });
        };

        let description = format!(
            "Vehicle was recorded at {speed} km/h in a {speed_limit} km/h zone on {}",
            self.road_name(road)
        );
        let violation = self.push_violation(
            &vehicle.plate,
            ViolationType::Speeding,
            severity,
            None,
            description,
            now,
        );

        Ok(SpeedingOutcome::Violation {
            violation,
            difference: speed - speed_limit,
        })
    }

    /// Records a LOW severity parking violation
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] for an unknown plate or junction
    pub fn record_parking(
        &self,
        plate: &str,
        junction_name: Option<&str>,
        description: &str,
        now: Timestamp,
    ) -> Result<Violation, Error> {
        self.create_violation(
            plate,
            ViolationType::Parking,
            Severity::Low,
            junction_name,
            description,
            now,
        )
    }

    /// # Errors
    ///
    /// Returns [`Error::NotFound`] for an unknown id
    pub fn violation(&self, id: ViolationId) -> Result<Violation, Error> {
        read(&self.violations)
            .get(id.0)
            .cloned()
            .ok_or_else(|| Error::not_found(EntityKind::Violation, id.0.to_string()))
    }

    /// Violations of one vehicle in the order they were recorded
    pub fn violations_for(&self, plate: &str) -> Vec<Violation> {
        let plate = plate.trim();
        read(&self.violations)
            .iter()
            .filter(|v| v.plate == plate)
            .cloned()
            .collect()
    }

    /// Plates with at least one violation, in order of their first violation
    pub fn violators(&self) -> Vec<String> {
        read(&self.violations)
            .iter()
            .map(|v| v.plate.clone())
            .unique()
            .collect()
    }

    fn push_violation(
        &self,
        plate: &str,
        violation_type: ViolationType,
        severity: Severity,
        junction: Option<JunctionId>,
        description: String,
        now: Timestamp,
    ) -> Violation {
        let mut violations = write(&self.violations);
        let violation = Violation::new(
            ViolationId(violations.len()),
            plate.to_string(),
            violation_type,
            severity,
            junction,
            description,
            now,
        );
        violations.push(violation.clone());

        log::warn!(
            "Recorded violation {violation}, fine {:.2}",
            violation.fine_amount
        );
        violation
    }

    // Analytics

    /// Counts a passage without logging a vehicle
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] for an unknown junction
    pub fn record_traffic(
        &self,
        junction_name: &str,
        timestamp: Timestamp,
    ) -> Result<TrafficBucket, Error> {
        let junction = self.junction(junction_name)?;
        Ok(self.analytics.record_traffic(junction.id, timestamp))
    }

    /// Loads an hourly count from historical records
    ///
    /// # Errors
    ///
    /// - [`Error::NotFound`] for an unknown junction
    /// - [`Error::Validation`] if `hour` is outside 0..=23
    pub fn import_bucket(
        &self,
        junction_name: &str,
        date: NaiveDate,
        hour: u32,
        vehicle_count: u32,
    ) -> Result<TrafficBucket, Error> {
        let junction = self.junction(junction_name)?;
        self.analytics
            .import_bucket(junction.id, date, hour, vehicle_count)
    }

    /// # Errors
    ///
    /// Returns [`Error::NotFound`] for an unknown junction
    pub fn daily_summary(
        &self,
        junction_name: &str,
        date: NaiveDate,
    ) -> Result<Option<DailySummary>, Error> {
        let junction = self.junction(junction_name)?;
        Ok(self.analytics.daily_summary(junction.id, date))
    }

    /// # Errors
    ///
    /// Returns [`Error::NotFound`] for an unknown junction
    pub fn hourly_counts(
        &self,
        junction_name: &str,
        date: NaiveDate,
    ) -> Result<Vec<(u32, u32)>, Error> {
        let junction = self.junction(junction_name)?;
        Ok(self.analytics.hourly_counts(junction.id, date))
    }

    /// Junctions ranked by how often they exceeded `threshold` vehicles per
    /// hour during the `days` days up to and including `today`
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] unless both `threshold` and `days` are positive
    pub fn congestion_prone_areas(
        &self,
        threshold: u32,
        days: u32,
        today: NaiveDate,
    ) -> Result<Vec<CongestionReport>, Error> {
        if threshold == 0 || days == 0 {
            return Err(Error::Validation(format!(
                "Threshold and days must be positive, got {threshold} and {days}"
            )));
        }
        let start = today
            .checked_sub_days(Days::new(u64::from(days)))
            .ok_or_else(|| Error::Validation(format!("{days} days before {today} is out of range")))?;

        let buckets = self.analytics.buckets_between(start, today);
        Ok(congestion_prone_areas(buckets, threshold, days, |id| {
            self.junction_by_id(id).name.clone()
        }))
    }

    // Prediction

    /// # Errors
    ///
    /// Returns [`Error::NotFound`] for an unknown junction
    pub fn current_congestion(
        &self,
        junction_name: &str,
        now: Timestamp,
    ) -> Result<CongestionState, Error> {
        let junction = self.junction(junction_name)?;
        Ok(self.predictor().current_congestion_state(junction.id, now))
    }

    /// # Errors
    ///
    /// Returns [`Error::NotFound`] for an unknown junction
    pub fn predict_congestion(
        &self,
        junction_name: &str,
        target_time: Timestamp,
    ) -> Result<CongestionPrediction, Error> {
        let junction = self.junction(junction_name)?;
        Ok(self.predictor().predict_congestion(junction.id, target_time))
    }

    /// Ranked routes between two junctions; empty when they are not connected
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] for an unknown junction
    pub fn alternate_routes(
        &self,
        start: &str,
        end: &str,
        now: Timestamp,
    ) -> Result<Vec<AlternateRoute>, Error> {
        let start = self.junction(start)?.id;
        let end = self.junction(end)?.id;
        Ok(self.predictor().alternate_routes(start, end, now))
    }

    // Notifications

    /// Computes alternate routes and mails them to the vehicle's owner.
    /// A failed delivery is reported in the result, not as an error.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] for an unknown plate or junction
    pub fn send_route_summary(
        &self,
        notifier: &dyn Notifier,
        plate: &str,
        start: &str,
        end: &str,
        now: Timestamp,
    ) -> Result<RouteSummaryDelivery, Error> {
        let vehicle = self.vehicle(plate)?;
        let routes = self.alternate_routes(start, end, now)?;

        let message = notify::format_route_summary(vehicle, start.trim(), end.trim(), &routes);
        let notification_sent = notify::deliver(notifier, &message);

        Ok(RouteSummaryDelivery {
            routes,
            notification_sent,
        })
    }

    /// Mails a violation notice to the offending vehicle's owner
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] for an unknown violation
    pub fn notify_violation(&self, notifier: &dyn Notifier, id: ViolationId) -> Result<bool, Error> {
        let violation = self.violation(id)?;
        let vehicle = self.vehicle(&violation.plate)?;
        let message = notify::format_violation_notice(vehicle, &violation);
        Ok(notify::deliver(notifier, &message))
    }
}

fn required(field: &str, value: &str) -> Result<String, Error> {
    let value = value.trim();
    if value.is_empty() {
        return Err(Error::Validation(format!("{field} is required")));
    }
    Ok(value.to_string())
}
