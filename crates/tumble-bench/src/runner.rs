//! Benchmark runner — executes scenarios and collects metrics.

use std::time::Instant;

use tumble_types::TumbleResult;

use crate::metrics::BenchmarkMetrics;
use crate::scenarios::{Scenario, ScenarioKind};

/// Runs benchmark scenarios and collects metrics.
pub struct BenchmarkRunner;

impl BenchmarkRunner {
    /// Run a single scenario to completion.
    pub fn run(scenario: &Scenario) -> TumbleResult<BenchmarkMetrics> {
        let mut space = scenario.build();

        let body_count = space.iter_bodies().count() as u32;
        let mut step_times: Vec<f64> = Vec::with_capacity(scenario.timesteps as usize);
        let mut final_info = tumble_dynamics::StepInfo::default();

        let total_start = Instant::now();
        for _ in 0..scenario.timesteps {
            let info = space.step(scenario.dt);
            step_times.push(info.wall_time);
            final_info = info;
        }
        let total_wall_time = total_start.elapsed().as_secs_f64();

        let final_kinetic_energy: f64 = space
            .iter_bodies()
            .filter(|(_, b)| !b.is_static())
            .map(|(_, b)| b.kinetic_energy())
            .sum();

        let avg_step = if step_times.is_empty() {
            0.0
        } else {
            step_times.iter().sum::<f64>() / step_times.len() as f64
        };
        let min_step = step_times.iter().copied().fold(f64::MAX, f64::min);
        let max_step = step_times.iter().copied().fold(0.0, f64::max);

        Ok(BenchmarkMetrics {
            scenario: scenario.kind.name().to_string(),
            timesteps: scenario.timesteps,
            total_wall_time,
            avg_step_time: avg_step,
            min_step_time: min_step,
            max_step_time: max_step,
            final_kinetic_energy,
            final_arbiters: final_info.arbiters,
            sleeping_bodies: final_info.sleeping_bodies,
            body_count,
        })
    }

    /// Run every defined scenario.
    pub fn run_all() -> TumbleResult<Vec<BenchmarkMetrics>> {
        let mut results = Vec::new();
        for &kind in ScenarioKind::all() {
            let scenario = Scenario::from_kind(kind);
            results.push(Self::run(&scenario)?);
        }
        Ok(results)
    }
}
