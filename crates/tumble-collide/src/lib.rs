//! # tumble-collide
//!
//! Collision shapes and narrow-phase contact generation.
//!
//! Shapes cache their world-space data (bounding box, transformed
//! vertices/planes) and are only refreshed by an explicit
//! [`Shape::update`] call from whoever moved the owning body — nothing
//! here recomputes geometry implicitly.
//!
//! The narrow phase ([`collide`]) is a pure function from an ordered
//! shape pair to a list of [`Contact`]s. Each contact carries a feature
//! hash that is stable across frames for the same geometric feature, so
//! the caller can match new contacts against cached ones and carry
//! accumulated impulses over.

pub mod circle;
pub mod contact;
pub mod narrow;
pub mod polygon;
pub mod segment;
pub mod shape;

pub use circle::Circle;
pub use contact::Contact;
pub use narrow::collide;
pub use polygon::Poly;
pub use segment::Segment;
pub use shape::{PointQueryInfo, SegmentQueryInfo, Shape, ShapeKind};
