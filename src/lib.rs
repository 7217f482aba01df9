use pyo3::prelude::*;
#[cfg(feature = "stubgen")]
use pyo3_stub_gen::define_stub_info_gatherer;

use network::PyTrafficNetwork;

mod convert;
mod error;
pub mod network;
mod notifier;

/// Traffic-signal control, violation tracking and congestion-aware routing.
#[pymodule]
fn signalflow(m: &Bound<'_, PyModule>) -> PyResult<()> {
    pyo3_log::init();

    m.add_class::<PyTrafficNetwork>()?;
    m.add("CYCLE_SECONDS", signalflow_core::signal::CYCLE_SECONDS)?;
    Ok(())
}

#[cfg(feature = "stubgen")]
define_stub_info_gatherer!(stub_info);
