//! Axis-aligned bounding box.
//!
//! `Bb` is the currency of the spatial index: leaf keys, branch unions,
//! and query volumes are all boxes. Intersection is inclusive — boxes
//! that merely touch along an edge count as intersecting.

use serde::{Deserialize, Serialize};

use crate::vec::Vec2;

/// Axis-aligned box `(left, bottom, right, top)`.
///
/// Invariant (assumed, not checked): `l <= r` and `b <= t`. Degenerate
/// boxes from point queries (`l == r`) are allowed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bb {
    /// Left edge.
    pub l: f64,
    /// Bottom edge.
    pub b: f64,
    /// Right edge.
    pub r: f64,
    /// Top edge.
    pub t: f64,
}

impl Bb {
    /// Creates a box from its four edges.
    #[inline]
    pub fn new(l: f64, b: f64, r: f64, t: f64) -> Self {
        Self { l, b, r, t }
    }

    /// The box covering a circle at `center` with radius `radius`.
    #[inline]
    pub fn for_circle(center: Vec2, radius: f64) -> Self {
        Self::new(
            center.x - radius,
            center.y - radius,
            center.x + radius,
            center.y + radius,
        )
    }

    /// A degenerate box containing only `p`.
    #[inline]
    pub fn for_point(p: Vec2) -> Self {
        Self::new(p.x, p.y, p.x, p.y)
    }

    /// Inclusive intersection test: touching edges count.
    #[inline]
    pub fn intersects(&self, other: &Bb) -> bool {
        self.l <= other.r && other.l <= self.r && self.b <= other.t && other.b <= self.t
    }

    /// Returns true if `other` lies entirely inside this box.
    #[inline]
    pub fn contains(&self, other: &Bb) -> bool {
        self.l <= other.l && self.r >= other.r && self.b <= other.b && self.t >= other.t
    }

    /// Returns true if the point `p` lies inside this box.
    #[inline]
    pub fn contains_point(&self, p: Vec2) -> bool {
        self.l <= p.x && self.r >= p.x && self.b <= p.y && self.t >= p.y
    }

    /// The smallest box covering both boxes.
    #[inline]
    pub fn merge(&self, other: &Bb) -> Bb {
        Bb::new(
            self.l.min(other.l),
            self.b.min(other.b),
            self.r.max(other.r),
            self.t.max(other.t),
        )
    }

    /// The box grown (if needed) to cover the point `p`.
    #[inline]
    pub fn expand(&self, p: Vec2) -> Bb {
        Bb::new(
            self.l.min(p.x),
            self.b.min(p.y),
            self.r.max(p.x),
            self.t.max(p.y),
        )
    }

    /// Center point.
    #[inline]
    pub fn center(&self) -> Vec2 {
        Vec2::new((self.l + self.r) * 0.5, (self.b + self.t) * 0.5)
    }

    /// Area of the box.
    #[inline]
    pub fn area(&self) -> f64 {
        (self.r - self.l) * (self.t - self.b)
    }

    /// Area of the merged box — the cost metric for tree insertion.
    #[inline]
    pub fn merged_area(&self, other: &Bb) -> f64 {
        (self.r.max(other.r) - self.l.min(other.l)) * (self.t.max(other.t) - self.b.min(other.b))
    }

    /// Manhattan distance between box centers, doubled.
    ///
    /// Used as the tie-break "proximity" cost when two merge costs are
    /// exactly equal during tree insertion.
    #[inline]
    pub fn proximity(&self, other: &Bb) -> f64 {
        (self.l + self.r - other.l - other.r).abs() + (self.b + self.t - other.b - other.t).abs()
    }

    /// Entry time `t in [0, 1]` at which the segment `a`–`b` first
    /// overlaps this box, or `f64::INFINITY` if it never does.
    pub fn segment_query(&self, a: Vec2, b: Vec2) -> f64 {
        let idx = 1.0 / (b.x - a.x);
        let tx1 = if self.l == a.x { f64::NEG_INFINITY } else { (self.l - a.x) * idx };
        let tx2 = if self.r == a.x { f64::INFINITY } else { (self.r - a.x) * idx };
        let txmin = tx1.min(tx2);
        let txmax = tx1.max(tx2);

        let idy = 1.0 / (b.y - a.y);
        let ty1 = if self.b == a.y { f64::NEG_INFINITY } else { (self.b - a.y) * idy };
        let ty2 = if self.t == a.y { f64::INFINITY } else { (self.t - a.y) * idy };
        let tymin = ty1.min(ty2);
        let tymax = ty1.max(ty2);

        if tymin <= txmax && txmin <= tymax {
            let min = txmin.max(tymin);
            let max = txmax.min(tymax);
            if 0.0 <= max && min <= 1.0 {
                return min.max(0.0);
            }
        }
        f64::INFINITY
    }

    /// Returns true if the segment `a`–`b` overlaps this box anywhere.
    #[inline]
    pub fn intersects_segment(&self, a: Vec2, b: Vec2) -> bool {
        self.segment_query(a, b) != f64::INFINITY
    }

    /// `p` clamped to lie within the box.
    #[inline]
    pub fn clamp_point(&self, p: Vec2) -> Vec2 {
        Vec2::new(p.x.clamp(self.l, self.r), p.y.clamp(self.b, self.t))
    }
}
