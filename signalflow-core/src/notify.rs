//! Outgoing notifications to vehicle owners.
//!
//! Delivery itself belongs to the embedding application; the core only
//! formats messages and hands them to a [`Notifier`].

use std::fmt::Write as _;

use thiserror::Error;

use crate::model::Vehicle;
use crate::routing::AlternateRoute;
use crate::violation::Violation;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NotifyError {
    #[error("Notification transport failed: {0}")]
    Transport(String),
    #[error("Recipient address is empty")]
    MissingRecipient,
    #[error("Sender reported the message was not sent")]
    Rejected,
}

/// Transport for owner notifications, typically an email gateway.
///
/// A transport that answers without raising but declines the message
/// reports [`NotifyError::Rejected`].
pub trait Notifier {
    fn send(&self, recipient: &str, subject: &str, body: &str) -> Result<(), NotifyError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub recipient: String,
    pub subject: String,
    pub body: String,
}

/// Sends `message`, returning whether it went out. Failures are logged, not raised.
pub fn deliver(notifier: &dyn Notifier, message: &Message) -> bool {
    let result = if message.recipient.trim().is_empty() {
        Err(NotifyError::MissingRecipient)
    } else {
        notifier.send(&message.recipient, &message.subject, &message.body)
    };

    match result {
        Ok(()) => {
            log::info!("Sent '{}' to {}", message.subject, message.recipient);
            true
        }
        Err(e) => {
            log::warn!("Could not send '{}': {e}", message.subject);
            false
        }
    }
}

pub fn format_route_summary(
    vehicle: &Vehicle,
    start: &str,
    end: &str,
    routes: &[AlternateRoute],
) -> Message {
    let mut body = format!(
        "Hello {},\n\nRoute options from {start} to {end}:\n",
        vehicle.owner_name
    );

    if routes.is_empty() {
        body.push_str("\nNo route connects these junctions.\n");
    }
    for (rank, route) in routes.iter().enumerate() {
        let _ = write!(
            body,
            "\n{}. {} [{}]\n   Estimated time: {} min, congestion probability: {:.1}%, \
             congested junctions: {}, red lights: {}\n",
            rank + 1,
            route.junctions.join(" -> "),
            route.route_status.as_str(),
            route.estimated_time,
            route.average_congestion_probability,
            route.currently_congested_junctions,
            route.red_light_junctions,
        );
    }

    Message {
        recipient: vehicle.owner_email.clone(),
        subject: format!("Traffic update: {start} to {end}"),
        body,
    }
}

pub fn format_violation_notice(vehicle: &Vehicle, violation: &Violation) -> Message {
    let body = format!(
        "Hello {},\n\nA traffic violation was recorded for vehicle {}.\n\n\
         Violation: {}\nSeverity: {}\nTime: {}\nDetails: {}\nFine: {:.2}\n",
        vehicle.owner_name,
        vehicle.plate,
        violation.violation_type.label(),
        violation.severity,
        violation.timestamp.format("%Y-%m-%d %H:%M:%S"),
        violation.description,
        violation.fine_amount,
    );

    Message {
        recipient: vehicle.owner_email.clone(),
        subject: format!("Traffic violation notice: {violation}"),
        body,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::violation::{Severity, ViolationType};
    use crate::{JunctionId, Timestamp, ViolationId};
    use chrono::NaiveDate;

    #[derive(Default)]
    struct Outbox {
        sent: Mutex<Vec<(String, String)>>,
        fail: bool,
        decline: bool,
    }

    impl Notifier for Outbox {
        fn send(&self, recipient: &str, subject: &str, _body: &str) -> Result<(), NotifyError> {
            if self.fail {
                return Err(NotifyError::Transport("smtp down".to_string()));
            }
            if self.decline {
                return Err(NotifyError::Rejected);
            }
            self.sent
                .lock()
                .unwrap()
                .push((recipient.to_string(), subject.to_string()));
            Ok(())
        }
    }

    fn now() -> Timestamp {
        NaiveDate::from_ymd_opt(2025, 2, 13)
            .unwrap()
            .and_hms_opt(8, 30, 0)
            .unwrap()
    }

    fn vehicle(email: &str) -> Vehicle {
        Vehicle {
            plate: "10-AB-123".to_string(),
            owner_name: "Leyla".to_string(),
            vehicle_type: "Sedan".to_string(),
            owner_email: email.to_string(),
            registered_at: now(),
        }
    }

    fn violation() -> Violation {
        Violation::new(
            ViolationId(0),
            "10-AB-123".to_string(),
            ViolationType::RedLight,
            Severity::High,
            Some(JunctionId(0)),
            "Vehicle ran red light at Nizami entering Fountain junction".to_string(),
            now(),
        )
    }

    #[test]
    fn violation_notice_carries_fine_and_label() {
        let message = format_violation_notice(&vehicle("owner@example.com"), &violation());
        assert_eq!(message.recipient, "owner@example.com");
        assert_eq!(
            message.subject,
            "Traffic violation notice: 10-AB-123 - Running Red Light (HIGH)"
        );
        assert!(message.body.contains("Fine: 600.00"));
        assert!(message.body.contains("2025-02-13 08:30:00"));
    }

    #[test]
    fn empty_route_list_is_stated() {
        let message = format_route_summary(&vehicle("owner@example.com"), "A", "D", &[]);
        assert_eq!(message.subject, "Traffic update: A to D");
        assert!(message.body.contains("No route connects these junctions."));
    }

    #[test]
    fn delivery_outcomes() {
        let outbox = Outbox::default();
        let message = format_violation_notice(&vehicle("owner@example.com"), &violation());
        assert!(deliver(&outbox, &message));
        assert_eq!(outbox.sent.lock().unwrap().len(), 1);

        let no_address = format_violation_notice(&vehicle("  "), &violation());
        assert!(!deliver(&outbox, &no_address));
        assert_eq!(outbox.sent.lock().unwrap().len(), 1);

        let broken = Outbox {
            fail: true,
            ..Outbox::default()
        };
        assert!(!deliver(&broken, &message));

        let declining = Outbox {
            decline: true,
            ..Outbox::default()
        };
        assert!(!deliver(&declining, &message));
        assert!(declining.sent.lock().unwrap().is_empty());
    }
}
