//! Line-segment collision shape (a capsule: a segment with a radius).

use serde::{Deserialize, Serialize};
use tumble_math::vec::{closest_point_on_segment, cross, perp, rotate};
use tumble_math::{Bb, Vec2};

use crate::circle::circle_segment_query;

/// A rounded line segment in body-local coordinates.
///
/// Segments can form smooth chains: when the neighbor tangents are set
/// (via [`Segment::set_neighbors`]), endpoint contacts whose normal
/// points "outward" of the chain are rejected by the narrow phase,
/// which kills the phantom collisions terrain chains otherwise produce
/// at shared vertices.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Segment {
    /// First endpoint (body-local).
    pub a: Vec2,
    /// Second endpoint (body-local).
    pub b: Vec2,
    /// Half-thickness of the segment.
    pub radius: f64,
    /// Unit normal (body-local), perpendicular to `b - a`.
    pub n: Vec2,
    /// Tangent toward the previous chain neighbor (zero if none).
    pub a_tangent: Vec2,
    /// Tangent toward the next chain neighbor (zero if none).
    pub b_tangent: Vec2,
    /// Cached world-space endpoint `a`. Valid after `update`.
    pub ta: Vec2,
    /// Cached world-space endpoint `b`.
    pub tb: Vec2,
    /// Cached world-space normal.
    pub tn: Vec2,
    /// Cached world-space `a_tangent`.
    pub ta_tangent: Vec2,
    /// Cached world-space `b_tangent`.
    pub tb_tangent: Vec2,
}

impl Segment {
    /// Creates a segment from `a` to `b` with half-thickness `radius`.
    pub fn new(a: Vec2, b: Vec2, radius: f64) -> Self {
        assert!(radius >= 0.0, "segment radius must be non-negative");
        let n = perp((b - a).normalize());
        Self {
            a,
            b,
            radius,
            n,
            a_tangent: Vec2::ZERO,
            b_tangent: Vec2::ZERO,
            ta: a,
            tb: b,
            tn: n,
            ta_tangent: Vec2::ZERO,
            tb_tangent: Vec2::ZERO,
        }
    }

    /// Declare the chain neighbors of this segment: `prev` connects to
    /// endpoint `a`, `next` to endpoint `b`.
    pub fn set_neighbors(&mut self, prev: Vec2, next: Vec2) {
        self.a_tangent = prev - self.a;
        self.b_tangent = next - self.b;
    }

    /// Recompute cached world-space data and return the new bounding box.
    pub fn update(&mut self, pos: Vec2, rot: Vec2) -> Bb {
        self.ta = pos + rotate(self.a, rot);
        self.tb = pos + rotate(self.b, rot);
        self.tn = rotate(self.n, rot);
        self.ta_tangent = rotate(self.a_tangent, rot);
        self.tb_tangent = rotate(self.b_tangent, rot);

        let (l, r) = if self.ta.x < self.tb.x {
            (self.ta.x, self.tb.x)
        } else {
            (self.tb.x, self.ta.x)
        };
        let (b, t) = if self.ta.y < self.tb.y {
            (self.ta.y, self.tb.y)
        } else {
            (self.tb.y, self.ta.y)
        };
        Bb::new(l - self.radius, b - self.radius, r + self.radius, t + self.radius)
    }

    /// Closest point on the (rounded) segment to `p`, and the signed
    /// distance (negative inside the radius).
    pub fn nearest_point(&self, p: Vec2) -> (Vec2, f64) {
        let closest = closest_point_on_segment(p, self.ta, self.tb);
        let delta = p - closest;
        let d = delta.length();
        let point = if d > 0.0 {
            closest + delta * (self.radius / d)
        } else {
            closest
        };
        (point, d - self.radius)
    }

    /// First intersection of the query segment `a`–`b` with this shape,
    /// as `(t, normal)`.
    pub fn segment_query(&self, a: Vec2, b: Vec2) -> Option<(f64, Vec2)> {
        let n = self.tn;
        let d = self.ta.dot(n);
        let r = self.radius;

        let an = a.dot(n);
        let bn = b.dot(n);

        if an != bn {
            let d_offset = d + if an > d { r } else { -r };
            let t = (d_offset - an) / (bn - an);

            if (0.0..=1.0).contains(&t) {
                let point = a.lerp(b, t);
                let dt = -cross(n, point);
                let dt_min = -cross(n, self.ta);
                let dt_max = -cross(n, self.tb);

                if dt_min < dt && dt < dt_max {
                    let normal = if an > d { n } else { -n };
                    return Some((t, normal));
                }
            }
        }

        if r > 0.0 {
            let hit_a = circle_segment_query(self.ta, r, a, b);
            let hit_b = circle_segment_query(self.tb, r, a, b);
            return match (hit_a, hit_b) {
                (Some(ha), Some(hb)) => Some(if ha.0 < hb.0 { ha } else { hb }),
                (Some(ha), None) => Some(ha),
                (None, Some(hb)) => Some(hb),
                (None, None) => None,
            };
        }
        None
    }
}

/// Moment of inertia for a segment of mass `m` from `a` to `b`
/// (relative to the body's center of gravity).
pub fn moment_for_segment(m: f64, a: Vec2, b: Vec2) -> f64 {
    let offset = (a + b) * 0.5;
    m * ((b - a).length_squared() / 12.0 + offset.length_squared())
}

/// Area of a rounded segment (a stadium shape).
pub fn area_for_segment(a: Vec2, b: Vec2, r: f64) -> f64 {
    r * (std::f64::consts::PI * r + 2.0 * (b - a).length())
}
