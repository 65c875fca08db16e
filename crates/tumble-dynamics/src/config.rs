//! Space configuration.
//!
//! Global solver tunables: iteration count, gravity, damping, contact
//! correction parameters, and the sleeping thresholds.

use serde::{Deserialize, Serialize};
use tumble_math::Vec2;
use tumble_types::constants::{
    DEFAULT_COLLISION_BIAS, DEFAULT_COLLISION_PERSISTENCE, DEFAULT_COLLISION_SLOP,
    DEFAULT_ITERATIONS,
};
use tumble_types::{TumbleError, TumbleResult};

/// Configuration for a [`crate::Space`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpaceConfig {
    /// Impulse-solver iterations per timestep.
    pub iterations: u32,

    /// Global gravity applied to dynamic bodies.
    pub gravity: Vec2,

    /// Fraction of velocity a body retains per second (1.0 = none lost).
    pub damping: f64,

    /// Speed below which a body counts as idle for sleep accounting.
    /// Zero derives the threshold from gravity instead.
    pub idle_speed_threshold: f64,

    /// Time a whole island must stay idle before it is put to sleep.
    /// `INFINITY` disables sleeping.
    pub sleep_time_threshold: f64,

    /// Allowed overlap between shapes before position correction
    /// pushes them apart.
    pub collision_slop: f64,

    /// Fraction of penetration remaining after one second of
    /// correction (smaller = stiffer correction).
    pub collision_bias: f64,

    /// Generations a non-touching collision pair is kept cached for
    /// warm-starting.
    pub collision_persistence: u64,
}

impl Default for SpaceConfig {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_ITERATIONS,
            gravity: Vec2::ZERO,
            damping: 1.0,
            idle_speed_threshold: 0.0,
            sleep_time_threshold: f64::INFINITY,
            collision_slop: DEFAULT_COLLISION_SLOP,
            collision_bias: DEFAULT_COLLISION_BIAS,
            collision_persistence: DEFAULT_COLLISION_PERSISTENCE,
        }
    }
}

impl SpaceConfig {
    /// Config tuned for stacking stability: more iterations, stiffer
    /// position correction.
    pub fn high_accuracy() -> Self {
        Self {
            iterations: 30,
            collision_bias: (1.0 - 0.5_f64).powi(60),
            ..Default::default()
        }
    }

    /// Validate ranges. Structural misuse of the space panics; bad
    /// config *data* is an error the caller can handle.
    pub fn validate(&self) -> TumbleResult<()> {
        if self.iterations == 0 {
            return Err(TumbleError::InvalidConfig(
                "iterations must be at least 1".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.damping) {
            return Err(TumbleError::InvalidConfig(format!(
                "damping must be in [0, 1], got {}",
                self.damping
            )));
        }
        if self.collision_slop < 0.0 {
            return Err(TumbleError::InvalidConfig(format!(
                "collision_slop must be non-negative, got {}",
                self.collision_slop
            )));
        }
        if !(0.0..1.0).contains(&self.collision_bias) {
            return Err(TumbleError::InvalidConfig(format!(
                "collision_bias must be in [0, 1), got {}",
                self.collision_bias
            )));
        }
        if self.sleep_time_threshold <= 0.0 {
            return Err(TumbleError::InvalidConfig(
                "sleep_time_threshold must be positive (INFINITY disables sleeping)".into(),
            ));
        }
        Ok(())
    }
}
