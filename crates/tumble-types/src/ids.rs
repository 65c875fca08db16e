//! Strongly-typed identifiers for simulation entities.
//!
//! Newtype wrappers prevent accidental mixing of body handles with
//! shape handles or constraint handles. `ShapeId`s are allocated from a
//! monotonic counter and never reused — contact feature hashes derived
//! from them stay stable for the lifetime of a space.

use serde::{Deserialize, Serialize};

/// Handle to a body slot in a space's body arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BodyId(pub u32);

/// Monotonic identifier of a shape within its space. Never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ShapeId(pub u32);

/// Handle to a constraint within its space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ConstraintId(pub u32);

/// User-assigned collision type tag, used to look up collision handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub struct CollisionType(pub u32);

/// Collision group. Shapes sharing a non-zero group never collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Group(pub u32);

/// Collision layer bitmask. Shapes collide only if their layers overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Layers(pub u32);

impl BodyId {
    /// Returns the raw index as `usize` for array indexing.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl ShapeId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl ConstraintId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl Group {
    /// The "no group" value: never excludes a pair.
    pub const NONE: Group = Group(0);
}

impl Layers {
    /// All layers set: collides with everything.
    pub const ALL: Layers = Layers(u32::MAX);

    /// Returns true if the two masks share at least one layer.
    #[inline]
    pub fn intersects(self, other: Layers) -> bool {
        self.0 & other.0 != 0
    }
}

impl Default for Group {
    fn default() -> Self {
        Group::NONE
    }
}

impl Default for Layers {
    fn default() -> Self {
        Layers::ALL
    }
}

impl From<u32> for BodyId {
    fn from(val: u32) -> Self {
        Self(val)
    }
}

impl From<u32> for ShapeId {
    fn from(val: u32) -> Self {
        Self(val)
    }
}

impl From<u32> for ConstraintId {
    fn from(val: u32) -> Self {
        Self(val)
    }
}

impl From<u32> for CollisionType {
    fn from(val: u32) -> Self {
        Self(val)
    }
}
