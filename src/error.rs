use pyo3::PyErr;
use pyo3::exceptions::{PyKeyError, PyRuntimeError, PyValueError};
use signalflow_core::Error;

/// Maps core errors onto the closest built-in Python exception
pub(crate) fn to_py_err(err: Error) -> PyErr {
    let message = err.to_string();
    match err {
        Error::NotFound { .. } => PyKeyError::new_err(message),
        Error::Config(_) => PyRuntimeError::new_err(message),
        Error::Validation(_) | Error::NotConnected { .. } | Error::Computation(_) => {
            PyValueError::new_err(message)
        }
    }
}
