//! Benchmark result records.

use serde::{Deserialize, Serialize};
use tumble_types::{TumbleError, TumbleResult};

/// Metrics collected from one scenario run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkMetrics {
    /// Scenario name.
    pub scenario: String,
    /// Timesteps executed.
    pub timesteps: u32,
    /// Total wall-clock time (seconds).
    pub total_wall_time: f64,
    /// Mean step wall time (seconds).
    pub avg_step_time: f64,
    /// Fastest step (seconds).
    pub min_step_time: f64,
    /// Slowest step (seconds).
    pub max_step_time: f64,
    /// Kinetic energy of all bodies at the end of the run.
    pub final_kinetic_energy: f64,
    /// Arbiters in the working set on the final step.
    pub final_arbiters: u32,
    /// Bodies asleep at the end of the run.
    pub sleeping_bodies: u32,
    /// Bodies simulated.
    pub body_count: u32,
}

impl BenchmarkMetrics {
    /// Serialize to pretty JSON for reports.
    pub fn to_json(&self) -> TumbleResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| TumbleError::Serialization(e.to_string()))
    }
}
