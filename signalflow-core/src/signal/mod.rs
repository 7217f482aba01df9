//! Traffic-signal state machine: per-road lazy cycling and junction coordination

mod clock;
mod controller;

pub use clock::{CYCLE_SECONDS, SignalClock, resolve_status};
pub use controller::JunctionController;
