//! # tumble-math
//!
//! 2D math for the Tumble physics engine: vector helpers over
//! [`glam::DVec2`] and the axis-aligned bounding box [`Bb`].
//!
//! Vectors and boxes are pure immutable value types — every operation
//! returns a new value. The engine's determinism depends on that: there
//! are no shared mutable math objects anywhere in the workspace.

pub mod bb;
pub mod vec;

pub use bb::Bb;
pub use vec::Vec2;
