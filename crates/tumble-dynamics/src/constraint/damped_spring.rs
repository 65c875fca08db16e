//! Damped spring: a soft constraint applying spring force in
//! `pre_step` and implicit damping during the solver iterations.

use tumble_math::vec::rotate;
use tumble_math::Vec2;
use tumble_types::BodyId;

use crate::body::Body;
use crate::solver::{apply_impulses, k_scalar, normal_relative_velocity};

use super::{Constraint, ConstraintProps};

/// Spring between one anchor on each body.
pub struct DampedSpring {
    body_a: BodyId,
    body_b: BodyId,
    /// Anchor on body A, body-local.
    pub anchor_a: Vec2,
    /// Anchor on body B, body-local.
    pub anchor_b: Vec2,
    /// Rest length of the spring.
    pub rest_length: f64,
    /// Spring constant (force per unit extension).
    pub stiffness: f64,
    /// Damping coefficient.
    pub damping: f64,
    /// Generic solver parameters.
    pub props: ConstraintProps,

    // Solver scratch.
    r1: Vec2,
    r2: Vec2,
    n: Vec2,
    n_mass: f64,
    target_vrn: f64,
    v_coef: f64,
    applied_force: f64,
}

impl DampedSpring {
    /// Creates a damped spring. A non-positive stiffness is numerically
    /// degenerate (the spring can push the solver around without ever
    /// restoring) and is warned about.
    pub fn new(
        body_a: BodyId,
        anchor_a: Vec2,
        body_b: BodyId,
        anchor_b: Vec2,
        rest_length: f64,
        stiffness: f64,
        damping: f64,
    ) -> Self {
        if stiffness <= 0.0 {
            tracing::warn!("created a degenerate spring (stiffness {stiffness} <= 0)");
        }

        Self {
            body_a,
            body_b,
            anchor_a,
            anchor_b,
            rest_length,
            stiffness,
            damping,
            props: ConstraintProps::default(),
            r1: Vec2::ZERO,
            r2: Vec2::ZERO,
            n: Vec2::ZERO,
            n_mass: 0.0,
            target_vrn: 0.0,
            v_coef: 0.0,
            applied_force: 0.0,
        }
    }

    /// Spring force at extension `dist` (override point for nonlinear
    /// springs in subtype wrappers).
    fn spring_force(&self, dist: f64) -> f64 {
        (self.rest_length - dist) * self.stiffness
    }
}

impl Constraint for DampedSpring {
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
        self.n = if dist > 0.0 { delta / dist } else { Vec2::ZERO };

        let k = k_scalar(a, b, self.r1, self.r2, self.n);
        self.n_mass = 1.0 / k;

        self.target_vrn = 0.0;
        self.v_coef = 1.0 - (-self.damping * dt * k).exp();

        // Apply the spring force as an impulse over this timestep.
        let f_spring = self.spring_force(dist);
        self.applied_force = f_spring;
        apply_impulses(a, b, self.r1, self.r2, self.n * (f_spring * dt));
    }

    fn apply_cached_impulse(&mut self, _a: &mut Body, _b: &mut Body, _dt_coef: f64) {
        // Springs recompute their force from geometry every step;
        // nothing is warm-started.
    }

    fn apply_impulse(&mut self, a: &mut Body, b: &mut Body) {
        let vrn = normal_relative_velocity(a, b, self.r1, self.r2, self.n);

        // Implicit drag: relax the relative normal velocity toward the
        // damped target.
        let v_damp = (self.target_vrn - vrn) * self.v_coef;
        self.target_vrn = vrn + v_damp;

        apply_impulses(a, b, self.r1, self.r2, self.n * (v_damp * self.n_mass));
    }

    fn impulse(&self) -> f64 {
        self.applied_force.abs()
    }
}
