use pyo3::prelude::*;
use signalflow_core::notify::{Notifier, NotifyError};

/// Forwards notifications to a Python callable `send(recipient, subject, body)`.
///
/// Any exception raised by the callable, or a falsy return value such as the
/// `0` Django's `send_mail` gives for an unsent message, counts as a failed
/// delivery.
pub(crate) struct CallbackNotifier<'py> {
    callback: Bound<'py, PyAny>,
}

impl<'py> CallbackNotifier<'py> {
    pub(crate) fn new(callback: Bound<'py, PyAny>) -> PyResult<Self> {
        if !callback.is_callable() {
            return Err(pyo3::exceptions::PyTypeError::new_err(
                "send must be callable as send(recipient, subject, body)",
            ));
        }
        Ok(Self { callback })
    }
}

impl Notifier for CallbackNotifier<'_> {
    fn send(&self, recipient: &str, subject: &str, body: &str) -> Result<(), NotifyError> {
        let sent = self
            .callback
            .call1((recipient, subject, body))
            .and_then(|reply| reply.is_truthy())
            .map_err(|e| NotifyError::Transport(e.to_string()))?;
        if sent {
            Ok(())
        } else {
            Err(NotifyError::Rejected)
        }
    }
}
