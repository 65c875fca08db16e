//! Contact manifold point.

use serde::{Deserialize, Serialize};
use tumble_math::Vec2;
use tumble_types::constants::hash_pair;

/// One narrow-phase manifold point.
///
/// `dist` is signed: negative means the shapes overlap by that much
/// along `normal`. The `hash` identifies the geometric feature that
/// produced the contact (e.g. a polygon vertex index mixed with the
/// shape's id) and is the key used to persist accumulated impulses
/// across frames.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Contact {
    /// World-space contact position.
    pub point: Vec2,
    /// Unit contact normal, pointing from the first shape toward the second.
    pub normal: Vec2,
    /// Signed separation (negative = penetrating).
    pub dist: f64,
    /// Persistent feature hash.
    pub hash: u64,
}

impl Contact {
    /// Creates a contact for a single-feature pair (hash 0).
    #[inline]
    pub fn new(point: Vec2, normal: Vec2, dist: f64) -> Self {
        Self {
            point,
            normal,
            dist,
            hash: 0,
        }
    }

    /// Creates a contact keyed to a specific feature of a shape.
    #[inline]
    pub fn with_feature(point: Vec2, normal: Vec2, dist: f64, shape_hash: u64, feature: u64) -> Self {
        Self {
            point,
            normal,
            dist,
            hash: hash_pair(shape_hash, feature),
        }
    }

    /// Returns true if the contact represents actual penetration.
    #[inline]
    pub fn is_penetrating(&self) -> bool {
        self.dist < 0.0
    }

    /// Penetration depth (positive if penetrating, zero otherwise).
    #[inline]
    pub fn penetration_depth(&self) -> f64 {
        (-self.dist).max(0.0)
    }
}
