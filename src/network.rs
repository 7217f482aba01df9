use chrono::{NaiveDate, NaiveDateTime};
use pyo3::prelude::*;
use pyo3::types::PyDict;
#[cfg(feature = "stubgen")]
use pyo3_stub_gen::derive::{gen_stub_pyclass, gen_stub_pymethods};

use signalflow_core::prelude::*;

use crate::convert::to_python;
use crate::error::to_py_err;
use crate::notifier::CallbackNotifier;

/// TrafficNetwork
///
/// In-memory road network with self-cycling traffic lights, violation
/// records, hourly traffic counts and congestion-aware routing.
///
/// All times are naive ``datetime.datetime`` values supplied by the caller.
///
/// Example:
///
/// .. code-block:: python
///
///     network = TrafficNetwork()
///     network.create_road("Nizami", now)
///     network.create_road("Fuzuli", now)
///     network.create_junction("Fountain", ["Nizami", "Fuzuli"], now)
///     network.register_vehicle("10-AB-123", "Leyla", "Sedan", "leyla@example.com", now)
///     outcome = network.log_vehicle("Fountain", "10-AB-123", "Fuzuli", now)
#[cfg_attr(feature = "stubgen", gen_stub_pyclass)]
#[pyclass(name = "TrafficNetwork")]
pub struct PyTrafficNetwork {
    pub(crate) model: TrafficModel,
}

#[cfg_attr(feature = "stubgen", gen_stub_pymethods)]
#[pymethods]
impl PyTrafficNetwork {
    /// Create an empty network
    ///
    /// Parameters
    /// ----------
    /// config_json : str, optional
    ///     JSON document overriding any of the default tuning constants
    ///
    /// Raises
    /// ------
    /// RuntimeError
    ///     If the configuration is malformed or out of range
    #[new]
    #[pyo3(signature = (config_json=None))]
    pub fn new(config_json: Option<&str>) -> PyResult<Self> {
        let model = match config_json {
            Some(json) => TrafficConfig::from_json_str(json).and_then(TrafficModel::with_config),
            None => Ok(TrafficModel::new()),
        }
        .map_err(to_py_err)?;

        Ok(Self { model })
    }

    /// Active configuration as a JSON string
    pub fn config_json(&self) -> PyResult<String> {
        serde_json::to_string(self.model.config()).map_err(|e| {
            PyErr::new::<pyo3::exceptions::PyRuntimeError, _>(format!(
                "Failed to serialize configuration: {e}"
            ))
        })
    }

    /// Register a vehicle or update the owner of a known plate.
    /// Returns ``(vehicle_id, created)``.
    pub fn register_vehicle(
        &mut self,
        plate: &str,
        owner_name: &str,
        vehicle_type: &str,
        owner_email: &str,
        now: NaiveDateTime,
    ) -> PyResult<(usize, bool)> {
        let (id, created) = self
            .model
            .register_vehicle(plate, owner_name, vehicle_type, owner_email, now)
            .map_err(to_py_err)?;
        Ok((id.0, created))
    }

    /// Get or create a road. Returns ``(road_id, created)``.
    pub fn create_road(&mut self, name: &str, now: NaiveDateTime) -> PyResult<(usize, bool)> {
        let (id, created) = self.model.create_road(name, now).map_err(to_py_err)?;
        Ok((id.0, created))
    }

    /// Current light of a road, ``"RED"`` or ``"GREEN"``
    pub fn road_status(&self, name: &str, now: NaiveDateTime) -> PyResult<String> {
        let status = self.model.road_status(name, now).map_err(to_py_err)?;
        Ok(status.as_str().to_string())
    }

    /// Create a junction of at least two existing roads; the first one starts GREEN
    pub fn create_junction(
        &mut self,
        name: &str,
        roads: Vec<String>,
        now: NaiveDateTime,
    ) -> PyResult<usize> {
        let id = self
            .model
            .create_junction(name, &roads, now)
            .map_err(to_py_err)?;
        Ok(id.0)
    }

    /// Mapping of road name to light status for every road of a junction
    pub fn junction_statuses<'py>(
        &self,
        py: Python<'py>,
        name: &str,
        now: NaiveDateTime,
    ) -> PyResult<Bound<'py, PyDict>> {
        let statuses = self.model.junction_statuses(name, now).map_err(to_py_err)?;
        let dict = PyDict::new(py);
        for (road, status) in statuses {
            dict.set_item(road, status.as_str())?;
        }
        Ok(dict)
    }

    /// Record a vehicle entering a junction
    ///
    /// Returns
    /// -------
    /// dict
    ///     ``passage``, ``light_status``, ``violation`` (or None) and
    ///     ``emergency_override``
    ///
    /// Raises
    /// ------
    /// KeyError
    ///     If the junction, vehicle or road is unknown
    /// ValueError
    ///     If the road does not belong to the junction
    pub fn log_vehicle<'py>(
        &self,
        py: Python<'py>,
        junction: &str,
        plate: &str,
        entry_road: &str,
        now: NaiveDateTime,
    ) -> PyResult<Bound<'py, PyAny>> {
        let outcome = self
            .model
            .log_vehicle(junction, plate, entry_road, now)
            .map_err(to_py_err)?;
        to_python(py, &outcome)
    }

    /// Passages through a junction, newest first
    pub fn passages<'py>(&self, py: Python<'py>, junction: &str) -> PyResult<Bound<'py, PyAny>> {
        let passages = self.model.passages_at(junction).map_err(to_py_err)?;
        to_python(py, &passages)
    }

    /// Distinct plates seen at a junction, most recent first
    pub fn logged_vehicles(&self, junction: &str) -> PyResult<Vec<String>> {
        self.model.logged_vehicles(junction).map_err(to_py_err)
    }

    /// Record a violation with an explicit type (``RED_LIGHT``, ``SPEEDING``,
    /// ``PARKING``) and severity (``LOW``, ``MEDIUM``, ``HIGH``)
    #[pyo3(signature = (plate, violation_type, severity, now, junction=None, description=""))]
    #[allow(clippy::too_many_arguments)]
    pub fn create_violation<'py>(
        &self,
        py: Python<'py>,
        plate: &str,
        violation_type: &str,
        severity: &str,
        now: NaiveDateTime,
        junction: Option<&str>,
        description: &str,
    ) -> PyResult<Bound<'py, PyAny>> {
        let violation_type: ViolationType = violation_type.parse().map_err(to_py_err)?;
        let severity: Severity = severity.parse().map_err(to_py_err)?;
        let violation = self
            .model
            .create_violation(plate, violation_type, severity, junction, description, now)
            .map_err(to_py_err)?;
        to_python(py, &violation)
    }

    /// Check a speed reading against the limit
    ///
    /// Returns
    /// -------
    /// dict
    ///     ``{"outcome": "within_limit", ...}`` or
    ///     ``{"outcome": "violation", "violation": {...}, "difference": float}``
    pub fn record_speeding<'py>(
        &self,
        py: Python<'py>,
        plate: &str,
        road: &str,
        speed: f64,
        speed_limit: f64,
        now: NaiveDateTime,
    ) -> PyResult<Bound<'py, PyAny>> {
        let outcome = self
            .model
            .record_speeding(plate, road, speed, speed_limit, now)
            .map_err(to_py_err)?;
        to_python(py, &outcome)
    }

    #[pyo3(signature = (plate, now, junction=None, description=""))]
    pub fn record_parking<'py>(
        &self,
        py: Python<'py>,
        plate: &str,
        now: NaiveDateTime,
        junction: Option<&str>,
        description: &str,
    ) -> PyResult<Bound<'py, PyAny>> {
        let violation = self
            .model
            .record_parking(plate, junction, description, now)
            .map_err(to_py_err)?;
        to_python(py, &violation)
    }

    pub fn violations_for<'py>(&self, py: Python<'py>, plate: &str) -> PyResult<Bound<'py, PyAny>> {
        to_python(py, &self.model.violations_for(plate))
    }

    /// Plates with at least one violation
    pub fn violators(&self) -> Vec<String> {
        self.model.violators()
    }

    /// Count one passage at a junction without logging a vehicle
    pub fn record_traffic<'py>(
        &self,
        py: Python<'py>,
        junction: &str,
        timestamp: NaiveDateTime,
    ) -> PyResult<Bound<'py, PyAny>> {
        let bucket = self
            .model
            .record_traffic(junction, timestamp)
            .map_err(to_py_err)?;
        to_python(py, &bucket)
    }

    /// Load an hourly count from historical records
    pub fn import_bucket<'py>(
        &self,
        py: Python<'py>,
        junction: &str,
        date: NaiveDate,
        hour: u32,
        vehicle_count: u32,
    ) -> PyResult<Bound<'py, PyAny>> {
        let bucket = self
            .model
            .import_bucket(junction, date, hour, vehicle_count)
            .map_err(to_py_err)?;
        to_python(py, &bucket)
    }

    /// Daily totals for a junction, or None when nothing was recorded
    ///
    /// Parameters
    /// ----------
    /// junction : str
    /// date : str
    ///     Day in ``YYYY-MM-DD`` format
    pub fn daily_summary<'py>(
        &self,
        py: Python<'py>,
        junction: &str,
        date: &str,
    ) -> PyResult<Bound<'py, PyAny>> {
        let date = parse_date(date).map_err(to_py_err)?;
        let summary = self
            .model
            .daily_summary(junction, date)
            .map_err(to_py_err)?;
        to_python(py, &summary)
    }

    /// ``(hour, vehicle_count)`` pairs for a ``YYYY-MM-DD`` day
    pub fn hourly_counts(&self, junction: &str, date: &str) -> PyResult<Vec<(u32, u32)>> {
        let date = parse_date(date).map_err(to_py_err)?;
        self.model.hourly_counts(junction, date).map_err(to_py_err)
    }

    /// Junctions ranked by how often an hour exceeded ``threshold`` vehicles
    /// during the ``days`` days up to ``today``
    #[pyo3(signature = (today, threshold=5, days=1))]
    pub fn congestion_prone_areas<'py>(
        &self,
        py: Python<'py>,
        today: NaiveDate,
        threshold: u32,
        days: u32,
    ) -> PyResult<Bound<'py, PyAny>> {
        let reports = self
            .model
            .congestion_prone_areas(threshold, days, today)
            .map_err(to_py_err)?;
        to_python(py, &reports)
    }

    pub fn current_congestion<'py>(
        &self,
        py: Python<'py>,
        junction: &str,
        now: NaiveDateTime,
    ) -> PyResult<Bound<'py, PyAny>> {
        let state = self
            .model
            .current_congestion(junction, now)
            .map_err(to_py_err)?;
        to_python(py, &state)
    }

    pub fn predict_congestion<'py>(
        &self,
        py: Python<'py>,
        junction: &str,
        target_time: NaiveDateTime,
    ) -> PyResult<Bound<'py, PyAny>> {
        let prediction = self
            .model
            .predict_congestion(junction, target_time)
            .map_err(to_py_err)?;
        to_python(py, &prediction)
    }

    /// Ranked alternate routes between two junctions
    ///
    /// Routes through currently congested junctions are marked ``AVOID`` and
    /// sorted after the others. The search runs without holding the GIL.
    pub fn alternate_routes<'py>(
        &self,
        py: Python<'py>,
        start: &str,
        end: &str,
        now: NaiveDateTime,
    ) -> PyResult<Bound<'py, PyAny>> {
        let model = &self.model;
        let routes = py
            .detach(|| model.alternate_routes(start, end, now))
            .map_err(to_py_err)?;
        to_python(py, &routes)
    }

    /// Compute alternate routes and send them to the vehicle's owner through
    /// ``send(recipient, subject, body)``. A ``send`` that raises or returns a
    /// falsy value only sets ``notification_sent`` to False.
    pub fn send_route_summary<'py>(
        &self,
        py: Python<'py>,
        send: Bound<'py, PyAny>,
        plate: &str,
        start: &str,
        end: &str,
        now: NaiveDateTime,
    ) -> PyResult<Bound<'py, PyAny>> {
        let notifier = CallbackNotifier::new(send)?;
        let delivery = self
            .model
            .send_route_summary(&notifier, plate, start, end, now)
            .map_err(to_py_err)?;
        to_python(py, &delivery)
    }

    /// Send a violation notice to the vehicle's owner; returns whether it went out
    pub fn notify_violation(&self, send: Bound<'_, PyAny>, violation_id: usize) -> PyResult<bool> {
        let notifier = CallbackNotifier::new(send)?;
        self.model
            .notify_violation(&notifier, ViolationId(violation_id))
            .map_err(to_py_err)
    }

    fn __repr__(&self) -> String {
        format!(
            "TrafficNetwork with {} junctions, {} roads and {} vehicles",
            self.model.junction_count(),
            self.model.road_count(),
            self.model.vehicle_count()
        )
    }

    fn __str__(&self) -> String {
        self.__repr__()
    }
}
