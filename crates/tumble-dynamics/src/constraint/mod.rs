//! Joint constraints.
//!
//! Every constraint implements the same four-method solver protocol the
//! space drives arbiters with: `pre_step` (recompute scratch state),
//! `apply_cached_impulse` (warm start), `apply_impulse` (one
//! Gauss-Seidel sweep), and `impulse` (magnitude of the last applied
//! impulse, for breakage logic in user code). `pre_solve`/`post_solve`
//! are optional per-step hooks.

pub mod damped_spring;
pub mod pin_joint;
pub mod pivot_joint;

pub use damped_spring::DampedSpring;
pub use pin_joint::PinJoint;
pub use pivot_joint::PivotJoint;

use serde::{Deserialize, Serialize};
use tumble_types::BodyId;

use crate::body::Body;

/// Generic solver parameters shared by every constraint type.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ConstraintProps {
    /// Maximum force the constraint may apply (clamps the impulse).
    pub max_force: f64,
    /// Fraction of positional error remaining after one second of
    /// correction (same convention as the space's collision bias).
    pub error_bias: f64,
    /// Maximum speed at which positional error is corrected.
    pub max_bias: f64,
}

impl Default for ConstraintProps {
    fn default() -> Self {
        Self {
            max_force: f64::INFINITY,
            // (1 - 0.1)^60: correct ~10% of the error per step at 60 Hz.
            error_bias: (1.0 - 0.1_f64).powi(60),
            max_bias: f64::INFINITY,
        }
    }
}

/// The constraint solver protocol.
///
/// The space calls these in a fixed order each step, interleaved with
/// the arbiter solver (see the step pipeline): `pre_solve` and
/// `pre_step` during preparation, `apply_cached_impulse` once for warm
/// starting, `apply_impulse` once per solver iteration, and
/// `post_solve` after the last iteration.
pub trait Constraint: Send {
    /// The constrained body pair.
    fn bodies(&self) -> (BodyId, BodyId);

    /// Generic solver parameters.
    fn props(&self) -> &ConstraintProps;

    /// Mutable access to the generic solver parameters.
    fn props_mut(&mut self) -> &mut ConstraintProps;

    /// Hook called before `pre_step`, with read access to the bodies.
    fn pre_solve(&mut self, _a: &Body, _b: &Body) {}

    /// Recompute per-step scratch state (anchors, effective masses,
    /// bias velocities).
    fn pre_step(&mut self, a: &mut Body, b: &mut Body, dt: f64);

    /// Reapply the previous step's accumulated impulse, scaled by the
    /// timestep ratio.
    fn apply_cached_impulse(&mut self, a: &mut Body, b: &mut Body, dt_coef: f64);

    /// One Gauss-Seidel sweep.
    fn apply_impulse(&mut self, a: &mut Body, b: &mut Body);

    /// Magnitude of the most recent accumulated impulse.
    fn impulse(&self) -> f64;

    /// Hook called after the solver has finished this step.
    fn post_solve(&mut self, _a: &Body, _b: &Body) {}
}
