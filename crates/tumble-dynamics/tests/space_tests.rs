//! Integration tests for tumble-dynamics: the step pipeline, contact
//! persistence, sleeping, and constraints.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use tumble_collide::circle::moment_for_circle;
use tumble_dynamics::{Body, CollisionHandler, PivotJoint, Space, SpaceConfig};
use tumble_math::Vec2;
use tumble_types::{BodyId, CollisionType, ShapeId};

const DT: f64 = 1.0 / 60.0;

fn circle_body(space: &mut Space, pos: Vec2, mass: f64, radius: f64) -> (BodyId, ShapeId) {
    let mut body = Body::new(mass, moment_for_circle(mass, 0.0, radius, Vec2::ZERO));
    body.p = pos;
    let id = space.add_body(body);
    let shape = space.add_circle(id, radius, Vec2::ZERO);
    (id, shape)
}

// ─── Integration ──────────────────────────────────────────────

#[test]
fn circle_free_fall_matches_discrete_recurrence() {
    let mut space = Space::new();
    space.config.gravity = Vec2::new(0.0, -10.0);

    let (ball, _) = circle_body(&mut space, Vec2::new(0.0, 10.0), 1.0, 1.0);

    // Discrete semi-implicit Euler: positions integrate the velocity
    // solved at the END of the previous step.
    let mut y = 10.0;
    let mut vy = 0.0;
    for _ in 0..60 {
        y += vy * DT;
        vy += -10.0 * DT;
        space.step(DT);
    }

    let p = space.body(ball).p;
    assert!(
        (p.y - y).abs() < 1e-9,
        "free fall diverged from the discrete recurrence: {} vs {}",
        p.y,
        y
    );
    // The continuous-time value (10 - 0.5*10*1²) is close but NOT what
    // a discrete integrator produces.
    assert!((p.y - 5.0).abs() < 0.1);
    assert!((p.y - 5.0).abs() > 1e-6);
}

#[test]
fn zero_dt_step_is_a_noop() {
    let mut space = Space::new();
    space.config.gravity = Vec2::new(0.0, -10.0);
    let (ball, _) = circle_body(&mut space, Vec2::new(0.0, 10.0), 1.0, 1.0);

    let stamp = space.stamp();
    space.step(0.0);
    assert_eq!(space.stamp(), stamp);
    assert_eq!(space.body(ball).p, Vec2::new(0.0, 10.0));
}

// ─── Contact Resolution ───────────────────────────────────────

#[test]
fn circle_rests_on_static_segment_at_slop_depth() {
    let mut space = Space::new();
    space.config.gravity = Vec2::new(0.0, -10.0);

    let ground = space.static_body();
    space.add_segment(ground, Vec2::new(-5.0, 0.0), Vec2::new(5.0, 0.0), 0.0);

    let (ball, _) = circle_body(&mut space, Vec2::new(0.0, 3.0), 1.0, 1.0);

    for _ in 0..180 {
        space.step(DT);
    }

    // Settles with the allowed slop of penetration remaining.
    let y = space.body(ball).p.y;
    let expected = 1.0 - space.config.collision_slop;
    assert!(
        (y - expected).abs() < 0.02,
        "resting height {y} != {expected}"
    );
    // And stays there.
    space.step(DT);
    assert!((space.body(ball).p.y - y).abs() < 1e-3);

    assert_eq!(space.current_time_step(), DT);
}

#[test]
fn resting_contact_impulse_converges_with_warm_start() {
    let mut space = Space::new();
    space.config.gravity = Vec2::new(0.0, -10.0);

    let ground = space.static_body();
    let seg = space.add_segment(ground, Vec2::new(-5.0, 0.0), Vec2::new(5.0, 0.0), 0.0);
    let (_, ball_shape) = circle_body(&mut space, Vec2::new(0.0, 1.5), 1.0, 1.0);

    for _ in 0..120 {
        space.step(DT);
    }

    // At rest the accumulated normal impulse balances one step of
    // gravity: |j| = m g dt.
    let mut impulses = Vec::new();
    for _ in 0..5 {
        space.step(DT);
        let arb = space.arbiter(ball_shape, seg).expect("resting pair has an arbiter");
        assert!(!arb.is_first_contact());
        assert_eq!(arb.count(), 1);
        impulses.push(arb.contacts()[0].jn_acc);
    }

    let expected = 1.0 * 10.0 * DT;
    for &jn in &impulses {
        assert!(
            (jn - expected).abs() < 0.05 * expected,
            "normal impulse {jn} far from m*g*dt = {expected}"
        );
    }
    // Converged, not oscillating: successive residuals are tiny.
    for pair in impulses.windows(2) {
        assert!((pair[1] - pair[0]).abs() < 1e-6);
    }
}

#[test]
fn elastic_circle_bounces() {
    let mut space = Space::new();
    space.config.gravity = Vec2::new(0.0, -10.0);

    let ground = space.static_body();
    let seg = space.add_segment(ground, Vec2::new(-5.0, 0.0), Vec2::new(5.0, 0.0), 0.0);
    space.shape_mut(seg).elasticity = 1.0;

    let (ball, ball_shape) = circle_body(&mut space, Vec2::new(0.0, 3.0), 1.0, 1.0);
    space.shape_mut(ball_shape).elasticity = 0.9;

    let mut max_after_bounce: f64 = 0.0;
    let mut bounced = false;
    for _ in 0..240 {
        space.step(DT);
        let v = space.body(ball).v;
        if v.y > 0.0 {
            bounced = true;
        }
        if bounced {
            max_after_bounce = max_after_bounce.max(space.body(ball).p.y);
        }
    }

    assert!(bounced, "elastic ball never bounced");
    // Restitution 0.9 should return it most of the way up.
    assert!(max_after_bounce > 2.0, "bounce apex {max_after_bounce}");
}

#[test]
fn identical_simulations_are_bitwise_deterministic() {
    let run = || {
        let mut space = Space::new();
        space.config.gravity = Vec2::new(0.0, -10.0);
        let ground = space.static_body();
        space.add_segment(ground, Vec2::new(-20.0, 0.0), Vec2::new(20.0, 0.0), 0.0);

        let mut balls = Vec::new();
        for i in 0..8 {
            let x = (i as f64) * 0.9 - 4.0;
            let (id, _) = circle_body(&mut space, Vec2::new(x, 2.0 + (i % 3) as f64), 1.0, 0.5);
            balls.push(id);
        }
        for _ in 0..120 {
            space.step(DT);
        }
        balls
            .iter()
            .map(|&b| {
                let body = space.body(b);
                (body.p.x.to_bits(), body.p.y.to_bits(), body.w.to_bits())
            })
            .collect::<Vec<_>>()
    };

    assert_eq!(run(), run());
}

// ─── Collision Handlers ───────────────────────────────────────

#[test]
fn begin_returning_false_ignores_pair_until_separation() {
    let mut space = Space::new();
    space.config.gravity = Vec2::new(0.0, -10.0);

    let ground = space.static_body();
    let seg = space.add_segment(ground, Vec2::new(-5.0, 0.0), Vec2::new(5.0, 0.0), 0.0);
    space.shape_mut(seg).collision_type = CollisionType(2);

    let (ball, ball_shape) = circle_body(&mut space, Vec2::new(0.0, 2.0), 1.0, 1.0);
    space.shape_mut(ball_shape).collision_type = CollisionType(1);

    let begins = Arc::new(AtomicU32::new(0));
    let begins_cb = begins.clone();
    space.add_collision_handler(
        CollisionType(1),
        CollisionType(2),
        CollisionHandler {
            begin: Some(Arc::new(move |_arb, _space| {
                begins_cb.fetch_add(1, Ordering::SeqCst);
                false
            })),
            ..CollisionHandler::accept()
        },
    );

    for _ in 0..120 {
        space.step(DT);
    }

    // The ball fell straight through the segment.
    assert!(space.body(ball).p.y < -1.0);
    // begin fired once for the encounter, not once per step.
    assert_eq!(begins.load(Ordering::SeqCst), 1);
}

#[test]
fn pre_solve_false_skips_only_that_step() {
    let mut space = Space::new();
    space.config.gravity = Vec2::new(0.0, -10.0);

    let ground = space.static_body();
    let seg = space.add_segment(ground, Vec2::new(-5.0, 0.0), Vec2::new(5.0, 0.0), 0.0);
    space.shape_mut(seg).collision_type = CollisionType(2);

    let (ball, ball_shape) = circle_body(&mut space, Vec2::new(0.0, 1.05), 1.0, 1.0);
    space.shape_mut(ball_shape).collision_type = CollisionType(1);

    let calls = Arc::new(AtomicU32::new(0));
    let calls_cb = calls.clone();
    space.add_collision_handler(
        CollisionType(1),
        CollisionType(2),
        CollisionHandler {
            pre_solve: Some(Arc::new(move |_arb, _space| {
                // Skip solving for the first 10 touching steps; the
                // ball sinks into the segment meanwhile.
                calls_cb.fetch_add(1, Ordering::SeqCst) >= 10
            })),
            ..CollisionHandler::accept()
        },
    );

    for _ in 0..240 {
        space.step(DT);
    }

    // Once pre_solve starts accepting, the contact pushes the ball
    // back out and holds it up.
    assert!(space.body(ball).p.y > 0.5, "ball fell: {}", space.body(ball).p.y);
    assert!(calls.load(Ordering::SeqCst) > 10);
}

#[test]
fn separate_fires_when_pair_stops_touching() {
    let mut space = Space::new();

    let ground = space.static_body();
    let seg = space.add_segment(ground, Vec2::new(-5.0, 0.0), Vec2::new(5.0, 0.0), 0.0);
    space.shape_mut(seg).collision_type = CollisionType(2);

    // Overlapping at first, then driven upward and away.
    let (ball, ball_shape) = circle_body(&mut space, Vec2::new(0.0, 0.5), 1.0, 1.0);
    space.shape_mut(ball_shape).collision_type = CollisionType(1);

    let separates = Arc::new(AtomicU32::new(0));
    let separates_cb = separates.clone();
    space.add_collision_handler(
        CollisionType(1),
        CollisionType(2),
        CollisionHandler {
            separate: Some(Arc::new(move |_arb, _space| {
                separates_cb.fetch_add(1, Ordering::SeqCst);
            })),
            ..CollisionHandler::accept()
        },
    );

    space.step(DT);
    assert_eq!(separates.load(Ordering::SeqCst), 0);

    space.body_mut(ball).v = Vec2::new(0.0, 50.0);
    for _ in 0..30 {
        space.step(DT);
    }

    assert_eq!(separates.load(Ordering::SeqCst), 1);
    assert!(space.arbiter(ball_shape, seg).is_none(), "arbiter should be evicted");
}

#[test]
fn sensors_detect_but_do_not_collide() {
    let mut space = Space::new();
    space.config.gravity = Vec2::new(0.0, -10.0);

    let ground = space.static_body();
    let seg = space.add_segment(ground, Vec2::new(-5.0, 0.0), Vec2::new(5.0, 0.0), 0.0);
    space.shape_mut(seg).collision_type = CollisionType(2);
    space.shape_mut(seg).sensor = true;

    let (ball, ball_shape) = circle_body(&mut space, Vec2::new(0.0, 2.0), 1.0, 1.0);
    space.shape_mut(ball_shape).collision_type = CollisionType(1);

    let begins = Arc::new(AtomicU32::new(0));
    let begins_cb = begins.clone();
    space.add_collision_handler(
        CollisionType(1),
        CollisionType(2),
        CollisionHandler {
            begin: Some(Arc::new(move |_arb, _space| {
                begins_cb.fetch_add(1, Ordering::SeqCst);
                true
            })),
            ..CollisionHandler::accept()
        },
    );

    for _ in 0..120 {
        space.step(DT);
    }

    assert_eq!(begins.load(Ordering::SeqCst), 1, "sensor begin fired");
    assert!(space.body(ball).p.y < -1.0, "sensor must not block the ball");
}

// ─── Post-Step Callbacks & Locking ────────────────────────────

#[test]
fn post_step_callback_defers_mutation_out_of_the_locked_region() {
    let mut space = Space::new();
    space.config.gravity = Vec2::new(0.0, -10.0);

    let ground = space.static_body();
    let seg = space.add_segment(ground, Vec2::new(-5.0, 0.0), Vec2::new(5.0, 0.0), 0.0);
    space.shape_mut(seg).collision_type = CollisionType(2);

    // Overlapping from the start so `begin` fires on the first step.
    let (_, ball_shape) = circle_body(&mut space, Vec2::new(0.0, 0.95), 1.0, 1.0);
    space.shape_mut(ball_shape).collision_type = CollisionType(1);

    space.add_collision_handler(
        CollisionType(1),
        CollisionType(2),
        CollisionHandler {
            begin: Some(Arc::new(move |arb, space| {
                let (shape, _) = arb.shapes();
                // Structural mutation is illegal here; defer it.
                let first = space.add_post_step_callback(shape.0 as u64, move |s| {
                    s.remove_shape(shape);
                });
                // Re-adding the same key in the same step is a no-op.
                let second = space.add_post_step_callback(shape.0 as u64, move |_s| {
                    panic!("duplicate post-step key must not run");
                });
                assert!(first);
                assert!(!second);
                true
            })),
            ..CollisionHandler::accept()
        },
    );

    space.step(DT);

    // The callback ran after the step and removed the ball's shape.
    assert!(space.body(space.static_body()).shapes().len() == 1);
    let mut shape_count = 0;
    space.bb_query(
        &tumble_math::Bb::new(-100.0, -100.0, 100.0, 100.0),
        tumble_types::Layers::ALL,
        tumble_types::Group::NONE,
        |_| shape_count += 1,
    );
    assert_eq!(shape_count, 1, "only the segment should remain");
}

#[test]
#[should_panic(expected = "cannot be done safely")]
fn mutating_a_locked_space_panics() {
    let mut space = Space::new();
    space.config.gravity = Vec2::new(0.0, -10.0);

    let ground = space.static_body();
    let seg = space.add_segment(ground, Vec2::new(-5.0, 0.0), Vec2::new(5.0, 0.0), 0.0);
    space.shape_mut(seg).collision_type = CollisionType(2);

    let (_, ball_shape) = circle_body(&mut space, Vec2::new(0.0, 0.95), 1.0, 1.0);
    space.shape_mut(ball_shape).collision_type = CollisionType(1);

    space.add_collision_handler(
        CollisionType(1),
        CollisionType(2),
        CollisionHandler {
            begin: Some(Arc::new(|_arb, space| {
                // Contract violation: structural mutation while locked.
                space.add_body(Body::new(1.0, 1.0));
                true
            })),
            ..CollisionHandler::accept()
        },
    );

    space.step(DT);
}

// ─── Sleeping ─────────────────────────────────────────────────

fn pivot_chain(space: &mut Space) -> (BodyId, BodyId, BodyId) {
    let mut make = |x: f64| {
        let mut body = Body::new(1.0, 1.0);
        body.p = Vec2::new(x, 0.0);
        space.add_body(body)
    };
    let a = make(0.0);
    let b = make(2.0);
    let c = make(4.0);

    let pivot_ab = {
        let (ba, bb) = (space.body(a), space.body(b));
        PivotJoint::new(ba, a, bb, b, Vec2::new(1.0, 0.0))
    };
    space.add_constraint(Box::new(pivot_ab));
    let pivot_bc = {
        let (bb, bc) = (space.body(b), space.body(c));
        PivotJoint::new(bb, b, bc, c, Vec2::new(3.0, 0.0))
    };
    space.add_constraint(Box::new(pivot_bc));
    (a, b, c)
}

#[test]
fn islands_sleep_all_or_nothing() {
    let mut space = Space::new();
    space.config.sleep_time_threshold = 0.2;
    space.config.idle_speed_threshold = 0.5;
    space.config.damping = 0.01;

    let (a, b, c) = pivot_chain(&mut space);

    // Keep B moving: even though A and C accrue idle time, the island
    // must not sleep while any member is active.
    for _ in 0..40 {
        space.body_mut(b).v = Vec2::new(0.0, 2.0);
        space.step(DT);
        assert!(!space.body(a).is_sleeping(), "A slept while B was moving");
        assert!(!space.body(b).is_sleeping());
        assert!(!space.body(c).is_sleeping(), "C slept while B was moving");
    }

    // Let everything damp out; the whole island sleeps as a unit.
    for _ in 0..120 {
        space.step(DT);
    }
    assert!(space.body(a).is_sleeping());
    assert!(space.body(b).is_sleeping());
    assert!(space.body(c).is_sleeping());
    assert_eq!(space.sleeping_body_count(), 3);
    assert_eq!(space.active_bodies().len(), 0);

    // Waking any member wakes the island.
    space.activate(c);
    assert!(!space.body(a).is_sleeping());
    assert!(!space.body(b).is_sleeping());
    assert!(!space.body(c).is_sleeping());
    assert_eq!(space.active_bodies().len(), 3);
}

#[test]
fn sleeping_bodies_skip_integration_until_woken() {
    let mut space = Space::new();
    space.config.gravity = Vec2::new(0.0, -10.0);
    space.config.sleep_time_threshold = 0.1;

    let ground = space.static_body();
    space.add_segment(ground, Vec2::new(-5.0, 0.0), Vec2::new(5.0, 0.0), 0.0);
    let (ball, _) = circle_body(&mut space, Vec2::new(0.0, 1.05), 1.0, 1.0);

    for _ in 0..300 {
        space.step(DT);
    }
    assert!(space.body(ball).is_sleeping(), "resting ball never slept");
    let rest_y = space.body(ball).p.y;

    // A sleeping body is frozen even though gravity is on.
    for _ in 0..60 {
        space.step(DT);
    }
    assert_eq!(space.body(ball).p.y, rest_y);

    // Impulse + explicit wake.
    space.body_mut(ball).apply_impulse(Vec2::new(0.0, 8.0), Vec2::ZERO);
    space.activate(ball);
    assert!(!space.body(ball).is_sleeping());
    space.step(DT);
    assert!(space.body(ball).p.y > rest_y);
}

#[test]
fn forced_sleep_and_group_wake_together() {
    let mut space = Space::new();
    space.config.sleep_time_threshold = 10.0;

    let (a, _) = circle_body(&mut space, Vec2::new(0.0, 0.0), 1.0, 0.5);
    let (b, _) = circle_body(&mut space, Vec2::new(5.0, 0.0), 1.0, 0.5);

    space.sleep_body(a);
    assert!(space.body(a).is_sleeping());
    space.sleep_body_with_group(b, a);
    assert!(space.body(b).is_sleeping());
    assert_eq!(space.sleeping_body_count(), 2);

    space.activate(b);
    assert!(!space.body(a).is_sleeping(), "grouped sleeper must wake with its group");
    assert!(!space.body(b).is_sleeping());
}

#[test]
#[should_panic(expected = "cannot be put to sleep")]
fn sleeping_a_static_body_panics() {
    let mut space = Space::new();
    let ground = space.static_body();
    space.sleep_body(ground);
}

// ─── Constraints ──────────────────────────────────────────────

#[test]
fn pivot_joint_holds_anchors_together_under_gravity() {
    let mut space = Space::new();
    space.config.gravity = Vec2::new(0.0, -10.0);

    let ground = space.static_body();
    let mut bob = Body::new(1.0, 1.0);
    bob.p = Vec2::new(1.0, 0.0);
    let bob = space.add_body(bob);

    let pivot = {
        let (ga, bb) = (space.body(ground), space.body(bob));
        PivotJoint::new(ga, ground, bb, bob, Vec2::ZERO)
    };
    let pivot = space.add_constraint(Box::new(pivot));

    let mut min_y = f64::INFINITY;
    for _ in 0..240 {
        space.step(DT);
        min_y = min_y.min(space.body(bob).p.y);
    }

    // The pendulum swung down through the bottom of its arc.
    assert!(min_y < -0.5, "pendulum never swung (min y = {min_y})");
    // The anchor error stays within the bias-correction tolerance:
    // the bob's local anchor (-1, 0) maps back onto the pivot point.
    let world_anchor = space.body(bob).local_to_world(Vec2::new(-1.0, 0.0));
    assert!(
        world_anchor.length() < 0.01,
        "pivot drifted to {world_anchor:?}"
    );
    assert!(space.constraint(pivot).impulse() > 0.0);
}

#[test]
fn pivot_joint_between_free_bodies_keeps_separation() {
    let mut space = Space::new();
    space.config.gravity = Vec2::new(0.0, -10.0);

    let (a, b, _c) = {
        let mut make = |x: f64| {
            let mut body = Body::new(1.0, 1.0);
            body.p = Vec2::new(x, 0.0);
            space.add_body(body)
        };
        (make(0.0), make(2.0), ())
    };
    let pivot = {
        let (ba, bb) = (space.body(a), space.body(b));
        PivotJoint::new(ba, a, bb, b, Vec2::new(1.0, 0.0))
    };
    space.add_constraint(Box::new(pivot));

    // Perturb to make the constraint work.
    space.body_mut(a).v = Vec2::new(0.0, 3.0);

    for _ in 0..120 {
        space.step(DT);
    }

    let pa = space.body(a).local_to_world(Vec2::new(1.0, 0.0));
    let pb = space.body(b).local_to_world(Vec2::new(-1.0, 0.0));
    assert!(
        (pa - pb).length() < 0.02,
        "pivot anchors drifted apart: {:?} vs {:?}",
        pa,
        pb
    );
}

#[test]
fn damped_spring_pulls_bodies_toward_rest_length() {
    use tumble_dynamics::DampedSpring;

    let mut space = Space::new();

    let mut make = |x: f64| {
        let mut body = Body::new(1.0, 1.0);
        body.p = Vec2::new(x, 0.0);
        space.add_body(body)
    };
    let a = make(0.0);
    let b = make(4.0);

    // Rest length 2, currently stretched to 4.
    let spring = DampedSpring::new(a, Vec2::ZERO, b, Vec2::ZERO, 2.0, 5.0, 0.5);
    space.add_constraint(Box::new(spring));

    for _ in 0..240 {
        space.step(DT);
    }

    let dist = (space.body(b).p - space.body(a).p).length();
    assert!(
        (dist - 2.0).abs() < 0.3,
        "spring settled at {dist}, wanted ~2"
    );
}

#[test]
fn pin_joint_maintains_distance() {
    use tumble_dynamics::{Constraint, PinJoint};

    let mut space = Space::new();

    let mut make = |x: f64| {
        let mut body = Body::new(1.0, 1.0);
        body.p = Vec2::new(x, 0.0);
        space.add_body(body)
    };
    let a = make(0.0);
    let b = make(3.0);

    let pin = {
        let (ba, bb) = (space.body(a), space.body(b));
        PinJoint::new(ba, a, Vec2::ZERO, bb, b, Vec2::ZERO)
    };
    assert_eq!(pin.bodies(), (a, b));
    space.add_constraint(Box::new(pin));

    space.body_mut(b).v = Vec2::new(2.0, 5.0);
    for _ in 0..120 {
        space.step(DT);
    }

    let dist = (space.body(b).p - space.body(a).p).length();
    assert!((dist - 3.0).abs() < 0.05, "pin distance drifted to {dist}");
}

#[test]
fn remove_constraint_frees_the_bodies() {
    let mut space = Space::new();
    space.config.gravity = Vec2::new(0.0, -10.0);

    let ground = space.static_body();
    let mut bob = Body::new(1.0, 1.0);
    bob.p = Vec2::new(0.0, 0.0);
    let bob = space.add_body(bob);

    let pivot = {
        let (ga, bb) = (space.body(ground), space.body(bob));
        PivotJoint::new(ga, ground, bb, bob, Vec2::ZERO)
    };
    let pivot = space.add_constraint(Box::new(pivot));

    for _ in 0..30 {
        space.step(DT);
    }
    // Pinned at the pivot: barely moved.
    assert!(space.body(bob).p.length() < 0.05);

    space.remove_constraint(pivot);
    for _ in 0..30 {
        space.step(DT);
    }
    // Free fall after removal.
    assert!(space.body(bob).p.y < -0.5);
    assert!(space.body(bob).constraints().is_empty());
}

// ─── Body Contract ────────────────────────────────────────────

#[test]
#[should_panic(expected = "mass must be positive")]
fn zero_mass_body_panics() {
    let _ = Body::new(0.0, 1.0);
}

#[test]
#[should_panic(expected = "static bodies are not simulated")]
fn adding_static_body_as_dynamic_panics() {
    let mut space = Space::new();
    space.add_body(Body::new_static());
}

#[test]
fn remove_body_requires_detached_shapes() {
    let mut space = Space::new();
    let (ball, shape) = circle_body(&mut space, Vec2::ZERO, 1.0, 1.0);

    space.remove_shape(shape);
    let body = space.remove_body(ball);
    assert!(!body.is_static());
    assert_eq!(space.active_bodies().len(), 0);
}

#[test]
fn config_validation_rejects_bad_values() {
    let mut config = SpaceConfig::default();
    assert!(config.validate().is_ok());

    config.iterations = 0;
    assert!(config.validate().is_err());

    let mut config = SpaceConfig::default();
    config.damping = 1.5;
    assert!(config.validate().is_err());

    let config = SpaceConfig::high_accuracy();
    assert!(config.validate().is_ok());
    assert!(config.iterations > SpaceConfig::default().iterations);
}
