//! Circle collision shape.

use serde::{Deserialize, Serialize};
use tumble_math::vec::rotate;
use tumble_math::{Bb, Vec2};

/// A circle at a body-local offset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Circle {
    /// Center offset in body-local coordinates.
    pub offset: Vec2,
    /// Radius.
    pub radius: f64,
    /// Cached world-space center. Valid after `update`.
    pub tc: Vec2,
}

impl Circle {
    /// Creates a circle shape. `radius` must be non-negative.
    pub fn new(offset: Vec2, radius: f64) -> Self {
        assert!(radius >= 0.0, "circle radius must be non-negative");
        Self {
            offset,
            radius,
            tc: offset,
        }
    }

    /// Recompute the world center for the owning body's transform and
    /// return the new bounding box.
    pub fn update(&mut self, pos: Vec2, rot: Vec2) -> Bb {
        self.tc = pos + rotate(self.offset, rot);
        Bb::for_circle(self.tc, self.radius)
    }

    /// Closest point on the circle to `p`, and the signed distance
    /// (negative inside).
    pub fn nearest_point(&self, p: Vec2) -> (Vec2, f64) {
        let delta = p - self.tc;
        let d = delta.length();
        let closest = if d > 0.0 {
            self.tc + delta * (self.radius / d)
        } else {
            self.tc + Vec2::new(self.radius, 0.0)
        };
        (closest, d - self.radius)
    }
}

/// First intersection of the segment `a`–`b` with a circle at `center`,
/// as `(t, normal)`, or `None` if the segment misses.
pub(crate) fn circle_segment_query(center: Vec2, r: f64, a: Vec2, b: Vec2) -> Option<(f64, Vec2)> {
    let da = a - center;
    let db = b - center;

    let qa = da.dot(da) - 2.0 * da.dot(db) + db.dot(db);
    let qb = -2.0 * da.dot(da) + 2.0 * da.dot(db);
    let qc = da.dot(da) - r * r;

    let det = qb * qb - 4.0 * qa * qc;
    if det >= 0.0 {
        let t = (-qb - det.sqrt()) / (2.0 * qa);
        if (0.0..=1.0).contains(&t) {
            return Some((t, da.lerp(db, t).normalize()));
        }
    }
    None
}

/// Moment of inertia for a (possibly hollow) circle of mass `m` with
/// inner radius `r1`, outer radius `r2`, centered at `offset` from the
/// body's center of gravity.
pub fn moment_for_circle(m: f64, r1: f64, r2: f64, offset: Vec2) -> f64 {
    m * (0.5 * (r1 * r1 + r2 * r2) + offset.length_squared())
}

/// Area of a (possibly hollow) circle.
pub fn area_for_circle(r1: f64, r2: f64) -> f64 {
    std::f64::consts::PI * (r1 * r1 - r2 * r2).abs()
}
