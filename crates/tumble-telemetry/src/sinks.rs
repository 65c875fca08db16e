//! Event sinks.

use std::sync::{Arc, Mutex};

use crate::events::SimulationEvent;

/// Consumer of simulation events.
pub trait EventSink: Send {
    /// Handle one event.
    fn handle(&mut self, event: &SimulationEvent);

    /// Sink name for diagnostics.
    fn name(&self) -> &str;
}

/// A sink that collects events into a shared vector. Intended for
/// tests and short captures.
#[derive(Clone, Default)]
pub struct VecSink {
    events: Arc<Mutex<Vec<SimulationEvent>>>,
}

impl VecSink {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the captured events.
    pub fn events(&self) -> Vec<SimulationEvent> {
        self.events.lock().expect("event sink poisoned").clone()
    }

    /// Number of captured events.
    pub fn len(&self) -> usize {
        self.events.lock().expect("event sink poisoned").len()
    }

    /// Returns true if nothing has been captured.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl EventSink for VecSink {
    fn handle(&mut self, event: &SimulationEvent) {
        self.events
            .lock()
            .expect("event sink poisoned")
            .push(event.clone());
    }

    fn name(&self) -> &str {
        "vec_sink"
    }
}

/// A sink that logs events using the `tracing` crate.
pub struct TracingSink;

impl EventSink for TracingSink {
    fn handle(&mut self, event: &SimulationEvent) {
        tracing::info!(step = event.step, kind = ?event.kind, "simulation event");
    }

    fn name(&self) -> &str {
        "tracing_sink"
    }
}
