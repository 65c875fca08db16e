//! # tumble-dynamics
//!
//! Bodies, contact arbiters, joint constraints, sleep islands, and the
//! [`Space`] that steps them.
//!
//! # Error handling
//!
//! Data validation (degenerate polygons, bad configuration) returns
//! [`tumble_types::TumbleResult`]. Contract violations — mutating a
//! locked space, zero-mass bodies, sleeping a rogue body, removing
//! something that isn't there — panic: they are programmer errors, not
//! runtime conditions, and are documented per method under `# Panics`.
//! Numerically risky but legal configurations (zero-length pin joints,
//! degenerate springs, non-finite body state) log a `tracing` warning
//! and continue.

pub mod arbiter;
mod arena;
pub mod body;
pub mod config;
pub mod constraint;
pub mod handler;
mod query;
mod sleeping;
pub mod solver;
pub mod space;

pub use arbiter::{Arbiter, ArbiterState, ContactPoint};
pub use body::Body;
pub use config::SpaceConfig;
pub use constraint::{Constraint, ConstraintProps, DampedSpring, PinJoint, PivotJoint};
pub use handler::CollisionHandler;
pub use space::{Space, StepInfo};
