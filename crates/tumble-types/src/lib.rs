//! # tumble-types
//!
//! Shared types, identifiers, error types, and physical constants
//! for the Tumble 2D rigid-body physics engine.
//!
//! This crate has zero domain logic — it defines the vocabulary
//! that all other Tumble crates share.

pub mod constants;
pub mod error;
pub mod ids;
pub mod scalar;

pub use error::{TumbleError, TumbleResult};
pub use ids::{BodyId, CollisionType, ConstraintId, Group, Layers, ShapeId};
pub use scalar::Scalar;
