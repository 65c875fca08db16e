//! Vector helpers over `glam::DVec2`.
//!
//! glam provides the arithmetic; this module adds the 2D-physics
//! operations it lacks (scalar cross product, complex-number rotation,
//! length clamping) as free functions so call sites read like the math.

/// The 2D vector type used throughout the engine (f64).
pub type Vec2 = glam::DVec2;

/// The 2D scalar cross product: `a.x*b.y - a.y*b.x`.
///
/// Its sign tells which side of `a` the vector `b` lies on.
#[inline]
pub fn cross(a: Vec2, b: Vec2) -> f64 {
    a.x * b.y - a.y * b.x
}

/// Counter-clockwise perpendicular: `(-y, x)`.
#[inline]
pub fn perp(v: Vec2) -> Vec2 {
    Vec2::new(-v.y, v.x)
}

/// Clockwise perpendicular: `(y, -x)`.
#[inline]
pub fn rperp(v: Vec2) -> Vec2 {
    Vec2::new(v.y, -v.x)
}

/// Rotate `v` by the unit rotation vector `rot = (cos θ, sin θ)`
/// (complex multiplication).
#[inline]
pub fn rotate(v: Vec2, rot: Vec2) -> Vec2 {
    Vec2::new(v.x * rot.x - v.y * rot.y, v.x * rot.y + v.y * rot.x)
}

/// Inverse of [`rotate`] (complex multiplication by the conjugate).
#[inline]
pub fn unrotate(v: Vec2, rot: Vec2) -> Vec2 {
    Vec2::new(v.x * rot.x + v.y * rot.y, -v.x * rot.y + v.y * rot.x)
}

/// Unit rotation vector for the angle `a` (radians).
#[inline]
pub fn for_angle(a: f64) -> Vec2 {
    Vec2::new(a.cos(), a.sin())
}

/// Angle of `v` in radians.
#[inline]
pub fn to_angle(v: Vec2) -> f64 {
    v.y.atan2(v.x)
}

/// Clamp `v` to at most `len` long. Vectors already shorter pass through
/// unchanged, so direction is always preserved.
#[inline]
pub fn clamp_len(v: Vec2, len: f64) -> Vec2 {
    if v.dot(v) > len * len {
        v.normalize() * len
    } else {
        v
    }
}

/// Normalize `v`, substituting the unit x-axis for a zero vector.
///
/// Degenerate directions get an explicit fallback instead of NaN so
/// the solver never has to untangle non-finite state after the fact.
#[inline]
pub fn normalize_or_x(v: Vec2) -> Vec2 {
    let len = v.length();
    if len > 0.0 {
        v / len
    } else {
        Vec2::new(1.0, 0.0)
    }
}

/// Closest point to `p` on the segment `a`–`b` (clamped to the endpoints).
#[inline]
pub fn closest_point_on_segment(p: Vec2, a: Vec2, b: Vec2) -> Vec2 {
    let delta = b - a;
    let len_sq = delta.dot(delta);
    if len_sq == 0.0 {
        return a;
    }
    let t = (delta.dot(p - a) / len_sq).clamp(0.0, 1.0);
    a + delta * t
}
