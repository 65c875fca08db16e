//! Convex polygon collision shape.

use serde::{Deserialize, Serialize};
use tumble_math::vec::{closest_point_on_segment, cross, perp, rotate};
use tumble_math::{Bb, Vec2};
use tumble_types::{TumbleError, TumbleResult};

/// A splitting plane: outward unit normal `n` and offset `d` such that
/// points `p` with `n·p > d` are outside the edge.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Plane {
    /// Outward unit normal.
    pub n: Vec2,
    /// Plane offset along the normal.
    pub d: f64,
}

impl Plane {
    /// Signed distance of `p` from the plane (positive = outside).
    #[inline]
    pub fn compare(&self, p: Vec2) -> f64 {
        self.n.dot(p) - self.d
    }
}

/// A convex polygon with clockwise winding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Poly {
    /// Body-local vertices (clockwise).
    pub verts: Vec<Vec2>,
    /// Body-local edge planes, one per vertex (edge `i` → `i+1`).
    pub planes: Vec<Plane>,
    /// Cached world-space vertices. Valid after `update`.
    pub t_verts: Vec<Vec2>,
    /// Cached world-space planes.
    pub t_planes: Vec<Plane>,
}

impl Poly {
    /// Creates a polygon from clockwise-wound convex `verts`, each
    /// offset by `offset` in body-local space.
    ///
    /// Returns an error for fewer than three vertices or a vertex list
    /// that is not convex with clockwise winding.
    pub fn new(verts: &[Vec2], offset: Vec2) -> TumbleResult<Self> {
        if verts.len() < 3 {
            return Err(TumbleError::InvalidShape(format!(
                "polygon needs at least 3 vertices, got {}",
                verts.len()
            )));
        }
        if !validate(verts) {
            return Err(TumbleError::InvalidShape(
                "polygon vertices must be convex with clockwise winding".into(),
            ));
        }

        let n = verts.len();
        let mut local_verts = Vec::with_capacity(n);
        let mut planes = Vec::with_capacity(n);
        for i in 0..n {
            let a = verts[i] + offset;
            let b = verts[(i + 1) % n] + offset;
            let normal = perp(b - a).normalize();
            local_verts.push(a);
            planes.push(Plane {
                n: normal,
                d: normal.dot(a),
            });
        }

        Ok(Self {
            t_verts: local_verts.clone(),
            t_planes: planes.clone(),
            verts: local_verts,
            planes,
        })
    }

    /// An axis-aligned box of `width` × `height` centered on the body's
    /// center of gravity.
    pub fn new_box(width: f64, height: f64) -> TumbleResult<Self> {
        let hw = width / 2.0;
        let hh = height / 2.0;
        Self::new(
            &[
                Vec2::new(-hw, -hh),
                Vec2::new(-hw, hh),
                Vec2::new(hw, hh),
                Vec2::new(hw, -hh),
            ],
            Vec2::ZERO,
        )
    }

    /// Number of vertices.
    #[inline]
    pub fn count(&self) -> usize {
        self.verts.len()
    }

    /// Recompute cached world-space vertices/planes and return the new
    /// bounding box.
    pub fn update(&mut self, pos: Vec2, rot: Vec2) -> Bb {
        let mut bb = Bb::new(f64::INFINITY, f64::INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY);
        for i in 0..self.verts.len() {
            let v = pos + rotate(self.verts[i], rot);
            self.t_verts[i] = v;
            bb = bb.expand(v);

            let n = rotate(self.planes[i].n, rot);
            self.t_planes[i] = Plane {
                n,
                d: n.dot(pos) + self.planes[i].d,
            };
        }
        bb
    }

    /// Minimum signed distance of the polygon's vertices along axis
    /// `(n, d)`. Negative means the polygon reaches behind the plane.
    pub fn value_on_axis(&self, n: Vec2, d: f64) -> f64 {
        let mut min = f64::INFINITY;
        for &v in &self.t_verts {
            min = min.min(n.dot(v));
        }
        min - d
    }

    /// Returns true if `v` lies inside every edge plane.
    pub fn contains_vert(&self, v: Vec2) -> bool {
        self.t_planes.iter().all(|plane| plane.compare(v) <= 0.0)
    }

    /// Like [`Poly::contains_vert`], but only tests planes whose normal
    /// has a positive component along `n` — the relaxed containment
    /// used by the degenerate-overlap fallback of the polygon collider.
    pub fn contains_vert_partial(&self, v: Vec2, n: Vec2) -> bool {
        self.t_planes
            .iter()
            .filter(|plane| plane.n.dot(n) >= 0.0)
            .all(|plane| plane.compare(v) <= 0.0)
    }

    /// Closest point on the polygon's perimeter (or `p` itself when
    /// inside), with the signed distance (negative inside).
    pub fn nearest_point(&self, p: Vec2) -> (Vec2, f64) {
        let count = self.count();
        let mut v0 = self.t_verts[count - 1];
        let mut min_dist = f64::INFINITY;
        let mut closest = Vec2::ZERO;
        let mut outside = false;

        for i in 0..count {
            if self.t_planes[i].compare(p) > 0.0 {
                outside = true;
            }
            let v1 = self.t_verts[i];
            let c = closest_point_on_segment(p, v0, v1);
            let dist = p.distance(c);
            if dist < min_dist {
                min_dist = dist;
                closest = c;
            }
            v0 = v1;
        }

        if outside {
            (closest, min_dist)
        } else {
            (p, -min_dist)
        }
    }

    /// First intersection of the query segment `a`–`b` with the polygon
    /// boundary, as `(t, normal)`.
    pub fn segment_query(&self, a: Vec2, b: Vec2) -> Option<(f64, Vec2)> {
        let count = self.count();
        let mut best: Option<(f64, Vec2)> = None;

        for i in 0..count {
            let n = self.t_planes[i].n;
            let an = a.dot(n);
            if self.t_planes[i].d > an {
                continue;
            }

            let bn = b.dot(n);
            let t = (self.t_planes[i].d - an) / (bn - an);
            if !(0.0..=1.0).contains(&t) {
                continue;
            }

            let point = a.lerp(b, t);
            let dt = -cross(n, point);
            let dt_min = -cross(n, self.t_verts[i]);
            let dt_max = -cross(n, self.t_verts[(i + 1) % count]);

            if dt_min <= dt && dt <= dt_max && best.map_or(true, |(bt, _)| t < bt) {
                best = Some((t, n));
            }
        }
        best
    }
}

/// Returns true if `verts` form a convex polygon with clockwise winding.
pub fn validate(verts: &[Vec2]) -> bool {
    let n = verts.len();
    for i in 0..n {
        let a = verts[i];
        let b = verts[(i + 1) % n];
        let c = verts[(i + 2) % n];
        if cross(b - a, c - a) > 0.0 {
            return false;
        }
    }
    true
}

/// Moment of inertia for a polygon of mass `m` with vertices offset by
/// `offset` from the body's center of gravity.
pub fn moment_for_poly(m: f64, verts: &[Vec2], offset: Vec2) -> f64 {
    let n = verts.len();
    let mut sum1 = 0.0;
    let mut sum2 = 0.0;
    for i in 0..n {
        let v1 = verts[i] + offset;
        let v2 = verts[(i + 1) % n] + offset;

        let a = cross(v2, v1);
        let b = v1.dot(v1) + v1.dot(v2) + v2.dot(v2);

        sum1 += a * b;
        sum2 += a;
    }
    (m * sum1) / (6.0 * sum2)
}

/// Moment of inertia for a solid box of mass `m`.
pub fn moment_for_box(m: f64, width: f64, height: f64) -> f64 {
    m * (width * width + height * height) / 12.0
}

/// Signed area of a polygon (positive for clockwise winding).
pub fn area_for_poly(verts: &[Vec2]) -> f64 {
    let n = verts.len();
    let mut area = 0.0;
    for i in 0..n {
        area += cross(verts[i], verts[(i + 1) % n]);
    }
    -area / 2.0
}

/// Centroid of a polygon.
pub fn centroid_for_poly(verts: &[Vec2]) -> Vec2 {
    let n = verts.len();
    let mut sum = 0.0;
    let mut vsum = Vec2::ZERO;
    for i in 0..n {
        let v1 = verts[i];
        let v2 = verts[(i + 1) % n];
        let c = cross(v1, v2);
        sum += c;
        vsum += (v1 + v2) * c;
    }
    vsum / (3.0 * sum)
}
