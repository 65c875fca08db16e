//! Rigid-body state.

use tumble_math::vec::{clamp_len, cross, for_angle, rotate, unrotate};
use tumble_math::Vec2;
use tumble_types::{ConstraintId, ShapeId};

use crate::arbiter::ArbiterKey;

/// Sleep-island linkage. `root`/`next` stitch a sleeping island into a
/// singly-linked list of body handles; both are `None` except while
/// the body sleeps (or is being grouped during island construction).
#[derive(Debug, Clone, Copy)]
pub(crate) struct SleepNode {
    pub(crate) root: Option<tumble_types::BodyId>,
    pub(crate) next: Option<tumble_types::BodyId>,
    pub(crate) idle_time: f64,
}

/// A rigid body: position, velocity, mass/inertia, and bookkeeping for
/// shapes, contacts, constraints, and sleeping.
///
/// Mass and moment are `f64::INFINITY` for static bodies; zero or
/// negative values are contract violations. A body is *static* iff its
/// idle time is pinned at infinity by construction; it is *rogue* while
/// it is registered with a space but not simulated.
pub struct Body {
    /// Position of the center of gravity.
    pub p: Vec2,
    /// Linear velocity.
    pub v: Vec2,
    /// Accumulated force, reset by [`Body::reset_forces`].
    pub f: Vec2,
    /// Angular velocity (rad/s).
    pub w: f64,
    /// Accumulated torque.
    pub t: f64,
    /// Maximum speed; velocity updates clamp to this.
    pub v_limit: f64,
    /// Maximum angular speed.
    pub w_limit: f64,

    a: f64,
    rot: Vec2,
    m: f64,
    m_inv: f64,
    i: f64,
    i_inv: f64,

    /// Position-correction pseudo-velocity. Never feeds into momentum.
    pub(crate) v_bias: Vec2,
    /// Angular pseudo-velocity for position correction.
    pub(crate) w_bias: f64,

    pub(crate) shapes: Vec<ShapeId>,
    pub(crate) arbiters: Vec<ArbiterKey>,
    pub(crate) constraints: Vec<ConstraintId>,
    pub(crate) node: SleepNode,
    pub(crate) rogue: bool,
}

impl Body {
    /// Creates a dynamic body with the given mass and moment of inertia.
    ///
    /// # Panics
    /// Panics if `mass` or `moment` is zero or negative (use
    /// [`Body::new_static`] for infinite-mass bodies).
    pub fn new(mass: f64, moment: f64) -> Self {
        let mut body = Self {
            p: Vec2::ZERO,
            v: Vec2::ZERO,
            f: Vec2::ZERO,
            w: 0.0,
            t: 0.0,
            v_limit: f64::INFINITY,
            w_limit: f64::INFINITY,
            a: 0.0,
            rot: Vec2::new(1.0, 0.0),
            m: 0.0,
            m_inv: 0.0,
            i: 0.0,
            i_inv: 0.0,
            v_bias: Vec2::ZERO,
            w_bias: 0.0,
            shapes: Vec::new(),
            arbiters: Vec::new(),
            constraints: Vec::new(),
            node: SleepNode {
                root: None,
                next: None,
                idle_time: 0.0,
            },
            rogue: true,
        };
        body.set_mass(mass);
        body.set_moment(moment);
        body
    }

    /// Creates a static body: infinite mass and inertia, never
    /// integrated, eligible to carry static shapes.
    pub fn new_static() -> Self {
        let mut body = Self::new(f64::INFINITY, f64::INFINITY);
        body.node.idle_time = f64::INFINITY;
        body
    }

    // ─── Mass Properties ──────────────────────────────────────

    /// Body mass.
    #[inline]
    pub fn mass(&self) -> f64 {
        self.m
    }

    /// Inverse mass (zero for static bodies).
    #[inline]
    pub fn mass_inv(&self) -> f64 {
        self.m_inv
    }

    /// Moment of inertia.
    #[inline]
    pub fn moment(&self) -> f64 {
        self.i
    }

    /// Inverse moment (zero for static bodies).
    #[inline]
    pub fn moment_inv(&self) -> f64 {
        self.i_inv
    }

    /// Set the body's mass.
    ///
    /// # Panics
    /// Panics unless `mass > 0` (infinity is allowed).
    pub fn set_mass(&mut self, mass: f64) {
        assert!(mass > 0.0, "mass must be positive and non-zero");
        self.m = mass;
        self.m_inv = if mass == f64::INFINITY { 0.0 } else { 1.0 / mass };
    }

    /// Set the body's moment of inertia.
    ///
    /// # Panics
    /// Panics unless `moment > 0` (infinity is allowed).
    pub fn set_moment(&mut self, moment: f64) {
        assert!(moment > 0.0, "moment of inertia must be positive and non-zero");
        self.i = moment;
        self.i_inv = if moment == f64::INFINITY {
            0.0
        } else {
            1.0 / moment
        };
    }

    // ─── Orientation ──────────────────────────────────────────

    /// Rotation angle in radians.
    #[inline]
    pub fn angle(&self) -> f64 {
        self.a
    }

    /// Unit rotation vector `(cos a, sin a)`, kept in sync with the angle.
    #[inline]
    pub fn rotation(&self) -> Vec2 {
        self.rot
    }

    /// Set the rotation angle (also refreshes the rotation vector).
    pub fn set_angle(&mut self, angle: f64) {
        self.a = angle;
        self.rot = for_angle(angle);
    }

    /// Transform a body-local point to world coordinates.
    #[inline]
    pub fn local_to_world(&self, p: Vec2) -> Vec2 {
        self.p + rotate(p, self.rot)
    }

    /// Transform a world point to body-local coordinates.
    #[inline]
    pub fn world_to_local(&self, p: Vec2) -> Vec2 {
        unrotate(p - self.p, self.rot)
    }

    // ─── Classification ───────────────────────────────────────

    /// A static body participates in collisions with infinite mass but
    /// is never simulated.
    #[inline]
    pub fn is_static(&self) -> bool {
        self.node.idle_time == f64::INFINITY
    }

    /// A rogue body is registered with a space but not simulated by it.
    /// Static bodies are rogue.
    #[inline]
    pub fn is_rogue(&self) -> bool {
        self.rogue
    }

    /// A body is sleeping iff it belongs to a deactivated island.
    #[inline]
    pub fn is_sleeping(&self) -> bool {
        self.node.root.is_some()
    }

    /// Time this body has spent below the idle threshold.
    #[inline]
    pub fn idle_time(&self) -> f64 {
        self.node.idle_time
    }

    /// Shapes attached to this body.
    pub fn shapes(&self) -> &[ShapeId] {
        &self.shapes
    }

    /// Constraints attached to this body.
    pub fn constraints(&self) -> &[ConstraintId] {
        &self.constraints
    }

    // ─── Forces & Impulses ────────────────────────────────────

    /// Zero the accumulated force and torque.
    pub fn reset_forces(&mut self) {
        self.f = Vec2::ZERO;
        self.t = 0.0;
    }

    /// Accumulate a force `f` applied at offset `r` from the center of
    /// gravity (world-aligned offset).
    pub fn apply_force(&mut self, f: Vec2, r: Vec2) {
        self.f += f;
        self.t += cross(r, f);
    }

    /// Apply an impulse `j` at offset `r` from the center of gravity,
    /// changing velocity immediately.
    pub fn apply_impulse(&mut self, j: Vec2, r: Vec2) {
        self.v += j * self.m_inv;
        self.w += self.i_inv * cross(r, j);
    }

    /// Apply a position-correction impulse (pseudo-velocities only).
    pub(crate) fn apply_bias_impulse(&mut self, j: Vec2, r: Vec2) {
        self.v_bias += j * self.m_inv;
        self.w_bias += self.i_inv * cross(r, j);
    }

    /// Kinetic energy, skipping infinite terms so static/pinned bodies
    /// report zero for the frozen degrees of freedom.
    pub fn kinetic_energy(&self) -> f64 {
        let vsq = self.v.dot(self.v);
        let wsq = self.w * self.w;
        (if vsq > 0.0 { vsq * self.m } else { 0.0 })
            + (if wsq > 0.0 { wsq * self.i } else { 0.0 })
    }

    // ─── Integration ──────────────────────────────────────────

    /// Semi-implicit Euler velocity update: gravity, damping, and
    /// accumulated forces, clamped to the body's limits.
    pub(crate) fn update_velocity(&mut self, gravity: Vec2, damping: f64, dt: f64) {
        self.v = clamp_len(
            self.v * damping + (gravity + self.f * self.m_inv) * dt,
            self.v_limit,
        );
        self.w = (self.w * damping + self.t * self.i_inv * dt).clamp(-self.w_limit, self.w_limit);
        self.sanity_check();
    }

    /// Position update using the velocity solved at the end of the
    /// previous step, plus the position-correction pseudo-velocities
    /// (which are consumed here and zeroed).
    pub(crate) fn update_position(&mut self, dt: f64) {
        self.p += (self.v + self.v_bias) * dt;
        self.set_angle(self.a + (self.w + self.w_bias) * dt);
        self.v_bias = Vec2::ZERO;
        self.w_bias = 0.0;
        self.sanity_check();
    }

    /// Advisory check for non-finite state (NaN/∞ position or velocity
    /// usually means a degenerate configuration upstream). Logs and
    /// continues; it is not an integrity guarantee.
    fn sanity_check(&self) {
        if !(self.p.x.is_finite() && self.p.y.is_finite() && self.a.is_finite()) {
            tracing::warn!(
                "body position is not finite (p = {:?}, a = {})",
                self.p,
                self.a
            );
        }
        if !(self.v.x.is_finite() && self.v.y.is_finite() && self.w.is_finite()) {
            tracing::warn!(
                "body velocity is not finite (v = {:?}, w = {})",
                self.v,
                self.w
            );
        }
    }
}
