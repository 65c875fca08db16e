//! Simulation event types.
//!
//! Structured events emitted by the simulation at fixed points in each
//! timestep. Events are lightweight value types carrying just enough
//! data to be useful for monitoring and debugging.

use serde::{Deserialize, Serialize};

/// An event emitted by the simulation.
///
/// Events are tagged with the step number they were emitted in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationEvent {
    /// Simulation step number (the space's generation stamp).
    pub step: u64,
    /// Event payload.
    pub kind: EventKind,
}

/// Event payload variants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum EventKind {
    /// A simulation step started.
    StepBegin {
        /// Timestep length (seconds).
        dt: f64,
    },

    /// A simulation step completed.
    StepEnd {
        /// Wall-clock time for the entire step (seconds).
        wall_time: f64,
    },

    /// Broad phase finished re-indexing.
    BroadPhase {
        /// Number of candidate pairs in the touching cache.
        candidate_pairs: u32,
    },

    /// Narrow phase and arbiter update finished.
    ContactDetection {
        /// Number of arbiters in this step's working set.
        arbiter_count: u32,
        /// Total contact points across all working arbiters.
        contact_count: u32,
    },

    /// Sleep-island processing finished.
    Islands {
        /// Bodies in the simulated (awake) set.
        active_bodies: u32,
        /// Bodies currently asleep.
        sleeping_bodies: u32,
    },

    /// Custom event for extensibility.
    Custom {
        /// Arbitrary label.
        label: String,
        /// JSON-encoded payload.
        payload: String,
    },
}

impl SimulationEvent {
    /// Creates a new event for the given step.
    pub fn new(step: u64, kind: EventKind) -> Self {
        Self { step, kind }
    }
}
