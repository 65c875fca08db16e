//! Contact arbiter: per-pair persistent contact state.
//!
//! An arbiter bridges detection and solving across frames. Each step
//! the narrow phase produces a fresh manifold; the arbiter matches the
//! new contacts against its cached ones by feature hash and carries
//! over only the accumulated impulses, so the solver warm-starts from
//! last frame's answer instead of from zero.

use tumble_collide::{Contact, Shape};
use tumble_math::vec::{perp, rotate};
use tumble_math::Vec2;
use tumble_types::{BodyId, ShapeId};

use crate::body::Body;
use crate::handler::CollisionHandler;
use crate::solver::{
    apply_bias_impulses, apply_impulses, k_scalar, normal_relative_velocity, relative_velocity,
};

/// Cache key for an arbiter: the unordered shape pair, stored with the
/// smaller id first.
pub type ArbiterKey = (ShapeId, ShapeId);

/// Canonical cache key for a shape pair.
#[inline]
pub fn arbiter_key(a: ShapeId, b: ShapeId) -> ArbiterKey {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Arbiter lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArbiterState {
    /// Created this step, or re-activated from the cache.
    FirstContact,
    /// Active; has been through at least one solve.
    Normal,
    /// Rejected by a `begin` handler: skipped until physical separation.
    Ignore,
    /// Not geometrically touching this step; retained for warm starts
    /// in case the pair comes back before eviction.
    Cached,
}

/// One contact point plus its solver scratch state.
///
/// Only the accumulated impulses (`jn_acc`, `jt_acc`) persist across
/// frames; geometry comes fresh from the narrow phase every step, and
/// everything else is recomputed by `pre_step`.
#[derive(Debug, Clone, Copy)]
pub struct ContactPoint {
    /// World position.
    pub point: Vec2,
    /// Unit normal (from the arbiter's first shape toward the second).
    pub normal: Vec2,
    /// Signed separation (negative = penetration).
    pub dist: f64,
    /// Persistent feature hash.
    pub hash: u64,

    r1: Vec2,
    r2: Vec2,
    n_mass: f64,
    t_mass: f64,
    bounce: f64,
    bias: f64,
    j_bias: f64,
    /// Accumulated normal impulse (warm-start carry-over).
    pub jn_acc: f64,
    /// Accumulated tangential (friction) impulse.
    pub jt_acc: f64,
}

impl ContactPoint {
    fn from_contact(con: &Contact) -> Self {
        Self {
            point: con.point,
            normal: con.normal,
            dist: con.dist,
            hash: con.hash,
            r1: Vec2::ZERO,
            r2: Vec2::ZERO,
            n_mass: 0.0,
            t_mass: 0.0,
            bounce: 0.0,
            bias: 0.0,
            j_bias: 0.0,
            jn_acc: 0.0,
            jt_acc: 0.0,
        }
    }
}

/// Persistent state for one colliding shape pair.
pub struct Arbiter {
    pub(crate) shape_a: ShapeId,
    pub(crate) shape_b: ShapeId,
    pub(crate) body_a: BodyId,
    pub(crate) body_b: BodyId,
    pub(crate) contacts: Vec<ContactPoint>,
    pub(crate) state: ArbiterState,
    /// Generation at which this arbiter last saw fresh contacts.
    pub(crate) stamp: u64,
    /// True when the solver's shape order differs from the order the
    /// matched handler was registered with.
    pub(crate) swapped: bool,

    /// Combined restitution for this pair.
    pub e: f64,
    /// Combined friction for this pair.
    pub u: f64,
    /// Relative surface velocity of the two shapes.
    pub surface_vr: Vec2,
}

impl Arbiter {
    pub(crate) fn new(shape_a: ShapeId, shape_b: ShapeId, body_a: BodyId, body_b: BodyId) -> Self {
        Self {
            shape_a,
            shape_b,
            body_a,
            body_b,
            contacts: Vec::new(),
            state: ArbiterState::FirstContact,
            stamp: 0,
            swapped: false,
            e: 0.0,
            u: 0.0,
            surface_vr: Vec2::ZERO,
        }
    }

    // ─── Update (contact persistence) ─────────────────────────

    /// Replace the manifold with fresh contacts, matching old contacts
    /// by hash to carry accumulated impulses over, and recompute the
    /// pair's combined material properties.
    ///
    /// `a`/`b` must be in solver (collision-code) order.
    pub(crate) fn update(
        &mut self,
        contacts: Vec<Contact>,
        handler: &CollisionHandler,
        a: &Shape,
        b: &Shape,
    ) {
        let mut new_contacts: Vec<ContactPoint> =
            contacts.iter().map(ContactPoint::from_contact).collect();

        for old in &self.contacts {
            for new in &mut new_contacts {
                // Hash collisions would cross-wire impulses, but feature
                // hashes are unique within one manifold.
                if new.hash == old.hash {
                    new.jn_acc = old.jn_acc;
                    new.jt_acc = old.jt_acc;
                }
            }
        }
        self.contacts = new_contacts;

        self.e = a.elasticity * b.elasticity;
        self.u = a.friction * b.friction;
        self.surface_vr = a.surface_velocity - b.surface_velocity;

        self.shape_a = a.id();
        self.shape_b = b.id();
        self.body_a = a.body();
        self.body_b = b.body();
        self.swapped = a.collision_type != handler.type_a;

        if self.state == ArbiterState::Cached {
            self.state = ArbiterState::FirstContact;
        }
    }

    /// Permanently ignore this pair until separation (set by a `begin`
    /// handler returning false).
    pub fn ignore(&mut self) {
        self.state = ArbiterState::Ignore;
    }

    // ─── Introspection (handler-facing) ───────────────────────

    /// The shape pair, in the order the matched handler declared its
    /// collision types (not the internal solver order).
    pub fn shapes(&self) -> (ShapeId, ShapeId) {
        if self.swapped {
            (self.shape_b, self.shape_a)
        } else {
            (self.shape_a, self.shape_b)
        }
    }

    /// The body pair, ordered like [`Arbiter::shapes`].
    pub fn bodies(&self) -> (BodyId, BodyId) {
        if self.swapped {
            (self.body_b, self.body_a)
        } else {
            (self.body_a, self.body_b)
        }
    }

    /// Number of contact points.
    pub fn count(&self) -> usize {
        self.contacts.len()
    }

    /// Contact normal of point `i`, oriented for the handler's declared
    /// shape order.
    pub fn normal(&self, i: usize) -> Vec2 {
        let n = self.contacts[i].normal;
        if self.swapped {
            -n
        } else {
            n
        }
    }

    /// World position of contact point `i`.
    pub fn point(&self, i: usize) -> Vec2 {
        self.contacts[i].point
    }

    /// Penetration depth of contact point `i` (negative = overlapping).
    pub fn depth(&self, i: usize) -> f64 {
        self.contacts[i].dist
    }

    /// Contact points (read-only).
    pub fn contacts(&self) -> &[ContactPoint] {
        &self.contacts
    }

    /// True the first step a pair touches (or re-touches after being
    /// cached).
    pub fn is_first_contact(&self) -> bool {
        self.state == ArbiterState::FirstContact
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ArbiterState {
        self.state
    }

    /// Sum of the normal impulses applied this step.
    pub fn total_impulse(&self) -> Vec2 {
        let mut sum = Vec2::ZERO;
        for con in &self.contacts {
            sum += con.normal * con.jn_acc;
        }
        if self.swapped {
            -sum
        } else {
            sum
        }
    }

    /// Sum of the applied impulses including friction.
    pub fn total_impulse_with_friction(&self) -> Vec2 {
        let mut sum = Vec2::ZERO;
        for con in &self.contacts {
            sum += rotate(con.normal, Vec2::new(con.jn_acc, con.jt_acc));
        }
        if self.swapped {
            -sum
        } else {
            sum
        }
    }

    /// Estimate of the energy lost to collisions and friction this step.
    pub fn total_kinetic_energy(&self, a: &Body, b: &Body) -> f64 {
        let e_coef = (1.0 - self.e) / (1.0 + self.e);
        let mut sum = 0.0;
        for con in &self.contacts {
            let jn_acc = con.jn_acc;
            let jt_acc = con.jt_acc;
            sum += e_coef * jn_acc * jn_acc / k_scalar(a, b, con.r1, con.r2, con.normal)
                + jt_acc * jt_acc / k_scalar(a, b, con.r1, con.r2, perp(con.normal));
        }
        sum
    }

    // ─── Solver ───────────────────────────────────────────────

    /// Recompute per-contact solver scratch for this step: anchor
    /// offsets, effective masses, the Baumgarte bias target (only
    /// penetration deeper than `slop` is corrected), and the bounce
    /// target from the pre-solve relative velocity.
    pub(crate) fn pre_step(&mut self, a: &mut Body, b: &mut Body, dt: f64, slop: f64, bias: f64) {
        for con in &mut self.contacts {
            con.r1 = con.point - a.p;
            con.r2 = con.point - b.p;

            con.n_mass = 1.0 / k_scalar(a, b, con.r1, con.r2, con.normal);
            con.t_mass = 1.0 / k_scalar(a, b, con.r1, con.r2, perp(con.normal));

            con.bias = -bias * (con.dist + slop).min(0.0) / dt;
            con.j_bias = 0.0;

            con.bounce = normal_relative_velocity(a, b, con.r1, con.r2, con.normal) * self.e;
        }
    }

    /// Warm start: reapply last step's accumulated impulses, rotated
    /// into the current normal frame and scaled by the timestep ratio.
    /// Skipped entirely on first contact — there is nothing to reapply.
    pub(crate) fn apply_cached_impulse(&mut self, a: &mut Body, b: &mut Body, dt_coef: f64) {
        if self.is_first_contact() {
            return;
        }
        for con in &self.contacts {
            let j = rotate(con.normal, Vec2::new(con.jn_acc, con.jt_acc));
            apply_impulses(a, b, con.r1, con.r2, j * dt_coef);
        }
    }

    /// One Gauss-Seidel sweep over this arbiter's contacts.
    ///
    /// Solves, in order: the non-negative bias (position-correction)
    /// impulse against the pseudo-velocities, the non-negative normal
    /// impulse against the bounce target, and the friction impulse
    /// box-clamped to `±u` times the *current* accumulated normal
    /// impulse. All deltas are applied immediately.
    pub(crate) fn apply_impulse(&mut self, a: &mut Body, b: &mut Body) {
        let surface_vr = self.surface_vr;
        let friction = self.u;

        for con in &mut self.contacts {
            let n_mass = con.n_mass;
            let n = con.normal;
            let r1 = con.r1;
            let r2 = con.r2;

            let vb1 = a.v_bias + perp(r1) * a.w_bias;
            let vb2 = b.v_bias + perp(r2) * b.w_bias;
            let vr = relative_velocity(a, b, r1, r2) + surface_vr;

            let vbn = (vb2 - vb1).dot(n);
            let vrn = vr.dot(n);
            let vrt = vr.dot(perp(n));

            let jbn = (con.bias - vbn) * n_mass;
            let jbn_old = con.j_bias;
            con.j_bias = (jbn_old + jbn).max(0.0);

            let jn = -(con.bounce + vrn) * n_mass;
            let jn_old = con.jn_acc;
            con.jn_acc = (jn_old + jn).max(0.0);

            let jt_max = friction * con.jn_acc;
            let jt = -vrt * con.t_mass;
            let jt_old = con.jt_acc;
            con.jt_acc = (jt_old + jt).clamp(-jt_max, jt_max);

            apply_bias_impulses(a, b, r1, r2, n * (con.j_bias - jbn_old));
            apply_impulses(
                a,
                b,
                r1,
                r2,
                rotate(n, Vec2::new(con.jn_acc - jn_old, con.jt_acc - jt_old)),
            );
        }
    }
}

use std::fmt;

impl fmt::Debug for Arbiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Arbiter")
            .field("shapes", &(self.shape_a, self.shape_b))
            .field("state", &self.state)
            .field("contacts", &self.contacts.len())
            .field("stamp", &self.stamp)
            .finish()
    }
}
