//! # tumble-bench
//!
//! Benchmark scenarios and the runner that executes them.
//!
//! Each scenario builds a self-contained [`tumble_dynamics::Space`];
//! the runner steps it for a fixed number of timesteps and reports
//! wall-time and simulation-health metrics.

pub mod metrics;
pub mod runner;
pub mod scenarios;

pub use metrics::BenchmarkMetrics;
pub use runner::BenchmarkRunner;
pub use scenarios::{Scenario, ScenarioKind};
