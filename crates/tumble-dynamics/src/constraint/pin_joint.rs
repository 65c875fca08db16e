//! Pin joint: keeps two anchor points at a fixed distance.

use tumble_math::vec::{normalize_or_x, rotate};
use tumble_math::Vec2;
use tumble_types::BodyId;

use crate::body::Body;
use crate::solver::{apply_impulses, bias_coef, k_scalar, normal_relative_velocity};

use super::{Constraint, ConstraintProps};

/// Distance constraint between one anchor on each body.
pub struct PinJoint {
    body_a: BodyId,
    body_b: BodyId,
    /// Anchor on body A, body-local.
    pub anchor_a: Vec2,
    /// Anchor on body B, body-local.
    pub anchor_b: Vec2,
    /// Rest distance between the anchors.
    pub dist: f64,
    /// Generic solver parameters.
    pub props: ConstraintProps,

    // Solver scratch.
    r1: Vec2,
    r2: Vec2,
    n: Vec2,
    n_mass: f64,
    jn_acc: f64,
    jn_max: f64,
    bias: f64,
}

impl PinJoint {
    /// Creates a pin joint whose rest distance is the current distance
    /// between the two world-space anchor points.
    ///
    /// A zero-length pin joint is numerically fragile (the constraint
    /// axis is undefined); it is allowed but warned about — a pivot
    /// joint is the stable way to model coincident anchors.
    pub fn new(a: &Body, body_a: BodyId, anchor_a: Vec2, b: &Body, body_b: BodyId, anchor_b: Vec2) -> Self {
        let p1 = a.local_to_world(anchor_a);
        let p2 = b.local_to_world(anchor_b);
        let dist = (p2 - p1).length();

        if dist <= 0.0 {
            tracing::warn!(
                "created a zero-length pin joint; a pivot joint is more stable"
            );
        }

        Self {
            body_a,
            body_b,
            anchor_a,
            anchor_b,
            dist,
            props: ConstraintProps::default(),
            r1: Vec2::ZERO,
            r2: Vec2::ZERO,
            n: Vec2::ZERO,
            n_mass: 0.0,
            jn_acc: 0.0,
            jn_max: 0.0,
            bias: 0.0,
        }
    }
}

impl Constraint for PinJoint {
    fn bodies(&self) -> (BodyId, BodyId) {
        (self.body_a, self.body_b)
    }

    fn props(&self) -> &ConstraintProps {
        &self.props
    }

    fn props_mut(&mut self) -> &mut ConstraintProps {
        &mut self.props
    }

    fn pre_step(&mut self, a: &mut Body, b: &mut Body, dt: f64) {
        self.r1 = rotate(self.anchor_a, a.rotation());
        self.r2 = rotate(self.anchor_b, b.rotation());

        let delta = (b.p + self.r2) - (a.p + self.r1);
        let dist = delta.length();
        self.n = if dist > 0.0 {
            delta / dist
        } else {
            normalize_or_x(Vec2::ZERO)
        };

        self.n_mass = 1.0 / k_scalar(a, b, self.r1, self.r2, self.n);

        let max_bias = self.props.max_bias;
        self.bias = (-bias_coef(self.props.error_bias, dt) * (dist - self.dist) / dt)
            .clamp(-max_bias, max_bias);

        self.jn_max = self.props.max_force * dt;
    }

    fn apply_cached_impulse(&mut self, a: &mut Body, b: &mut Body, dt_coef: f64) {
        let j = self.n * (self.jn_acc * dt_coef);
        apply_impulses(a, b, self.r1, self.r2, j);
    }

    fn apply_impulse(&mut self, a: &mut Body, b: &mut Body) {
        let vrn = normal_relative_velocity(a, b, self.r1, self.r2, self.n);

        // Accumulate and clamp to the max force.
        let jn = (self.bias - vrn) * self.n_mass;
        let jn_old = self.jn_acc;
        self.jn_acc = (jn_old + jn).clamp(-self.jn_max, self.jn_max);
        let jn = self.jn_acc - jn_old;

        apply_impulses(a, b, self.r1, self.r2, self.n * jn);
    }

    fn impulse(&self) -> f64 {
        self.jn_acc.abs()
    }
}
