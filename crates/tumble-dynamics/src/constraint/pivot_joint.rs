//! Pivot joint: pins one anchor on each body to the same world point.

use tumble_math::vec::{clamp_len, rotate};
use tumble_math::Vec2;
use tumble_types::BodyId;

use crate::body::Body;
use crate::solver::{apply_impulses, bias_coef, k_tensor, relative_velocity, Mat2x2};

use super::{Constraint, ConstraintProps};

/// Two-DOF point constraint solved as a 2×2 block.
pub struct PivotJoint {
    body_a: BodyId,
    body_b: BodyId,
    /// Anchor on body A, body-local.
    pub anchor_a: Vec2,
    /// Anchor on body B, body-local.
    pub anchor_b: Vec2,
    /// Generic solver parameters.
    pub props: ConstraintProps,

    // Solver scratch.
    r1: Vec2,
    r2: Vec2,
    k: Mat2x2,
    j_acc: Vec2,
    j_max: f64,
    bias: Vec2,
}

impl PivotJoint {
    /// Creates a pivot joint anchored at the world point `pivot`.
    pub fn new(a: &Body, body_a: BodyId, b: &Body, body_b: BodyId, pivot: Vec2) -> Self {
        Self::with_anchors(
            body_a,
            a.world_to_local(pivot),
            body_b,
            b.world_to_local(pivot),
        )
    }

    /// Creates a pivot joint from explicit body-local anchors.
    pub fn with_anchors(body_a: BodyId, anchor_a: Vec2, body_b: BodyId, anchor_b: Vec2) -> Self {
        Self {
            body_a,
            body_b,
            anchor_a,
            anchor_b,
            props: ConstraintProps::default(),
            r1: Vec2::ZERO,
            r2: Vec2::ZERO,
            k: Mat2x2 {
                a: 0.0,
                b: 0.0,
                c: 0.0,
                d: 0.0,
            },
            j_acc: Vec2::ZERO,
            j_max: 0.0,
            bias: Vec2::ZERO,
        }
    }

    /// Accumulated impulse vector (diagnostics).
    pub fn impulse_vector(&self) -> Vec2 {
        self.j_acc
    }
}

impl Constraint for PivotJoint {
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

        self.k = k_tensor(a, b, self.r1, self.r2);

        let delta = (b.p + self.r2) - (a.p + self.r1);
        self.bias = clamp_len(
            delta * (-bias_coef(self.props.error_bias, dt) / dt),
            self.props.max_bias,
        );

        self.j_max = self.props.max_force * dt;
    }

    fn apply_cached_impulse(&mut self, a: &mut Body, b: &mut Body, dt_coef: f64) {
        apply_impulses(a, b, self.r1, self.r2, self.j_acc * dt_coef);
    }

    fn apply_impulse(&mut self, a: &mut Body, b: &mut Body) {
        let vr = relative_velocity(a, b, self.r1, self.r2);

        let j = self.k.transform(self.bias - vr);
        let j_old = self.j_acc;
        self.j_acc = clamp_len(self.j_acc + j, self.j_max);
        let j = self.j_acc - j_old;

        apply_impulses(a, b, self.r1, self.r2, j);
    }

    fn impulse(&self) -> f64 {
        self.j_acc.length()
    }
}
