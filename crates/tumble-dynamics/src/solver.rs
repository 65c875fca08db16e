//! Shared solver building blocks.
//!
//! Both the contact solver (arbiters) and the joint constraints are
//! sequential-impulse solvers over body pairs; the effective-mass and
//! impulse-application helpers live here so the math is written once.

use tumble_math::vec::{cross, perp};
use tumble_math::Vec2;

use crate::body::Body;

/// A 2×2 matrix for block-solving two-DOF constraints.
#[derive(Debug, Clone, Copy)]
pub struct Mat2x2 {
    /// Row 1, column 1.
    pub a: f64,
    /// Row 1, column 2.
    pub b: f64,
    /// Row 2, column 1.
    pub c: f64,
    /// Row 2, column 2.
    pub d: f64,
}

impl Mat2x2 {
    /// Apply the matrix to a vector.
    #[inline]
    pub fn transform(&self, v: Vec2) -> Vec2 {
        Vec2::new(v.x * self.a + v.y * self.b, v.x * self.c + v.y * self.d)
    }
}

/// Velocity of the contact point on body `b` relative to the same point
/// on body `a` (includes the angular contribution at offsets `r1`/`r2`).
#[inline]
pub fn relative_velocity(a: &Body, b: &Body, r1: Vec2, r2: Vec2) -> Vec2 {
    let v1 = a.v + perp(r1) * a.w;
    let v2 = b.v + perp(r2) * b.w;
    v2 - v1
}

/// Component of the relative velocity along `n`.
#[inline]
pub fn normal_relative_velocity(a: &Body, b: &Body, r1: Vec2, r2: Vec2, n: Vec2) -> f64 {
    relative_velocity(a, b, r1, r2).dot(n)
}

/// Apply equal and opposite impulses to a body pair.
#[inline]
pub fn apply_impulses(a: &mut Body, b: &mut Body, r1: Vec2, r2: Vec2, j: Vec2) {
    a.apply_impulse(-j, r1);
    b.apply_impulse(j, r2);
}

/// Apply equal and opposite position-correction impulses. These only
/// move the bias pseudo-velocities, never real momentum.
#[inline]
pub(crate) fn apply_bias_impulses(a: &mut Body, b: &mut Body, r1: Vec2, r2: Vec2, j: Vec2) {
    a.apply_bias_impulse(-j, r1);
    b.apply_bias_impulse(j, r2);
}

#[inline]
fn k_scalar_body(body: &Body, r: Vec2, n: Vec2) -> f64 {
    let rcn = cross(r, n);
    body.mass_inv() + body.moment_inv() * rcn * rcn
}

/// Effective mass denominator of a 1-DOF constraint along axis `n`:
/// `Σ 1/m + (r × n)² / I`.
///
/// # Panics
/// Panics when the value is zero — two infinite-mass bodies cannot be
/// constrained against each other.
#[inline]
pub fn k_scalar(a: &Body, b: &Body, r1: Vec2, r2: Vec2, n: Vec2) -> f64 {
    let value = k_scalar_body(a, r1, n) + k_scalar_body(b, r2, n);
    assert!(value != 0.0, "unsolvable collision or constraint (infinite mass pair)");
    value
}

/// Inverse effective-mass matrix of a 2-DOF point constraint.
///
/// # Panics
/// Panics when the matrix is singular (unsolvable constraint).
pub fn k_tensor(a: &Body, b: &Body, r1: Vec2, r2: Vec2) -> Mat2x2 {
    let m_sum = a.mass_inv() + b.mass_inv();

    let mut k11 = m_sum;
    let mut k12 = 0.0;
    let mut k21 = 0.0;
    let mut k22 = m_sum;

    let a_i_inv = a.moment_inv();
    k11 += r1.y * r1.y * a_i_inv;
    k12 += -r1.x * r1.y * a_i_inv;
    k21 += -r1.x * r1.y * a_i_inv;
    k22 += r1.x * r1.x * a_i_inv;

    let b_i_inv = b.moment_inv();
    k11 += r2.y * r2.y * b_i_inv;
    k12 += -r2.x * r2.y * b_i_inv;
    k21 += -r2.x * r2.y * b_i_inv;
    k22 += r2.x * r2.x * b_i_inv;

    let det = k11 * k22 - k12 * k21;
    assert!(det != 0.0, "unsolvable constraint (singular effective-mass matrix)");

    let det_inv = 1.0 / det;
    Mat2x2 {
        a: k22 * det_inv,
        b: -k12 * det_inv,
        c: -k21 * det_inv,
        d: k11 * det_inv,
    }
}

/// Per-step error-correction coefficient from an error *bias* rate:
/// the fraction of positional error corrected this step, where `bias`
/// is the fraction allowed to *remain* after one second.
#[inline]
pub fn bias_coef(error_bias: f64, dt: f64) -> f64 {
    1.0 - error_bias.powf(dt)
}
