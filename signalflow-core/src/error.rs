use std::fmt;

use thiserror::Error;

/// Kind of registry entity referenced by name or id
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Vehicle,
    Road,
    Junction,
    Violation,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::Vehicle => "Vehicle",
            EntityKind::Road => "Road",
            EntityKind::Junction => "Junction",
            EntityKind::Violation => "Violation",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug, PartialEq)]
pub enum Error {
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("{kind} not found: {name}")]
    NotFound { kind: EntityKind, name: String },
    #[error("Road '{road}' is not connected to junction '{junction}'")]
    NotConnected { road: String, junction: String },
    #[error("Computation error: {0}")]
    Computation(String),
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl Error {
    pub(crate) fn not_found(kind: EntityKind, name: impl Into<String>) -> Self {
        Error::NotFound {
            kind,
            name: name.into(),
        }
    }
}
