//! # tumble-telemetry
//!
//! Structured simulation events for monitoring and debugging.
//!
//! The engine emits lightweight [`SimulationEvent`]s through an
//! [`EventBus`]; pluggable [`sinks::EventSink`]s consume them. A
//! disabled bus (the default) is a strict no-op, so instrumented code
//! pays nothing in production.

pub mod bus;
pub mod events;
pub mod sinks;

pub use bus::EventBus;
pub use events::{EventKind, SimulationEvent};
pub use sinks::{EventSink, TracingSink, VecSink};
