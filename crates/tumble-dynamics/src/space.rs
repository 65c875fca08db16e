//! The `Space`: owner of bodies, shapes, constraints, and arbiters,
//! and driver of the simulation step.
//!
//! Structural mutation (adding/removing bodies, shapes, constraints)
//! is forbidden while the space is locked — i.e. during a step or
//! inside a collision callback. Callbacks that need to mutate must
//! defer through [`Space::add_post_step_callback`], which runs after
//! the outermost unlock.

use std::collections::{BTreeMap, HashMap};
use std::time::Instant;

use tumble_collide::{collide, Shape, ShapeKind};
use tumble_index::{BoundsSource, SpatialIndex};
use tumble_math::{Bb, Vec2};
use tumble_telemetry::{EventBus, EventKind, SimulationEvent};
use tumble_types::{BodyId, CollisionType, ConstraintId, ShapeId, TumbleResult};

use crate::arbiter::{arbiter_key, Arbiter, ArbiterKey, ArbiterState};
use crate::arena::Arena;
use crate::body::Body;
use crate::config::SpaceConfig;
use crate::constraint::Constraint;
use crate::handler::CollisionHandler;

/// Summary of one completed step.
#[derive(Debug, Clone, Copy, Default)]
pub struct StepInfo {
    /// Arbiters in this step's working set.
    pub arbiters: u32,
    /// Contact points across the working set.
    pub contacts: u32,
    /// Bodies asleep after island processing.
    pub sleeping_bodies: u32,
    /// Wall-clock duration of the step (seconds).
    pub wall_time: f64,
}

pub(crate) struct PostStepCallback {
    pub(crate) key: u64,
    pub(crate) func: Option<Box<dyn FnOnce(&mut Space) + Send>>,
}

/// A 2D rigid-body simulation.
pub struct Space {
    /// Solver tunables. Safe to adjust between steps.
    pub config: SpaceConfig,
    /// Telemetry bus; disabled (free) unless a sink is registered.
    pub events: EventBus,

    pub(crate) stamp: u64,
    pub(crate) curr_dt: f64,
    pub(crate) locked: u32,

    pub(crate) bodies: Arena<Body>,
    pub(crate) active_bodies: Vec<BodyId>,
    pub(crate) sleeping_roots: Vec<BodyId>,
    static_body: BodyId,

    pub(crate) shapes: BTreeMap<ShapeId, Shape>,
    shape_id_counter: u32,
    pub(crate) index: SpatialIndex,

    pub(crate) arbiters: BTreeMap<ArbiterKey, Arbiter>,
    pub(crate) working: Vec<ArbiterKey>,

    pub(crate) constraints: BTreeMap<ConstraintId, Box<dyn Constraint>>,
    pub(crate) live_constraints: Vec<ConstraintId>,
    constraint_id_counter: u32,

    handlers: HashMap<(CollisionType, CollisionType), CollisionHandler>,
    default_handler: CollisionHandler,

    pub(crate) roused: Vec<BodyId>,
    post_step: Vec<PostStepCallback>,
    skip_post_step: bool,
}

/// Bounds provider handed to the spatial index: tight boxes from the
/// shape cache, velocities from the owning bodies.
pub(crate) struct SpaceBounds<'a> {
    pub(crate) shapes: &'a BTreeMap<ShapeId, Shape>,
    pub(crate) bodies: &'a Arena<Body>,
}

impl BoundsSource for SpaceBounds<'_> {
    fn bb(&self, shape: ShapeId) -> Bb {
        self.shapes[&shape].bb
    }

    fn velocity(&self, shape: ShapeId) -> Option<Vec2> {
        Some(self.bodies.get(self.shapes[&shape].body()).v)
    }
}

impl Space {
    /// Creates an empty space with default configuration.
    pub fn new() -> Self {
        Self::with_config(SpaceConfig::default())
    }

    /// Creates an empty space with the given configuration.
    pub fn with_config(config: SpaceConfig) -> Self {
        let mut bodies = Arena::new();
        let static_body = bodies.insert(Body::new_static());
        Self {
            config,
            events: EventBus::new(),
            stamp: 0,
            curr_dt: 0.0,
            locked: 0,
            bodies,
            active_bodies: Vec::new(),
            sleeping_roots: Vec::new(),
            static_body,
            shapes: BTreeMap::new(),
            shape_id_counter: 0,
            index: SpatialIndex::new(),
            arbiters: BTreeMap::new(),
            working: Vec::new(),
            constraints: BTreeMap::new(),
            live_constraints: Vec::new(),
            constraint_id_counter: 0,
            handlers: HashMap::new(),
            default_handler: CollisionHandler::accept(),
            roused: Vec::new(),
            post_step: Vec::new(),
            skip_post_step: false,
        }
    }

    // ─── Accessors ────────────────────────────────────────────

    /// The space's built-in static body.
    #[inline]
    pub fn static_body(&self) -> BodyId {
        self.static_body
    }

    /// The `dt` passed to the most recent [`Space::step`].
    #[inline]
    pub fn current_time_step(&self) -> f64 {
        self.curr_dt
    }

    /// Returns true while a step or callback is in flight.
    #[inline]
    pub fn is_locked(&self) -> bool {
        self.locked > 0
    }

    /// Current generation stamp (increments once per step).
    #[inline]
    pub fn stamp(&self) -> u64 {
        self.stamp
    }

    /// Borrow a body.
    #[inline]
    pub fn body(&self, id: BodyId) -> &Body {
        self.bodies.get(id)
    }

    /// Mutably borrow a body. Mutating a sleeping body does not wake
    /// it; call [`Space::activate`] explicitly.
    #[inline]
    pub fn body_mut(&mut self, id: BodyId) -> &mut Body {
        self.bodies.get_mut(id)
    }

    /// Borrow a shape.
    #[inline]
    pub fn shape(&self, id: ShapeId) -> &Shape {
        &self.shapes[&id]
    }

    /// Mutably borrow a shape (material/filter fields; geometry changes
    /// require re-adding the shape).
    #[inline]
    pub fn shape_mut(&mut self, id: ShapeId) -> &mut Shape {
        self.shapes.get_mut(&id).expect("stale shape handle")
    }

    /// Borrow a constraint (downcast in the caller if needed).
    #[inline]
    pub fn constraint(&self, id: ConstraintId) -> &dyn Constraint {
        self.constraints[&id].as_ref()
    }

    /// Ids of the currently simulated (awake, non-rogue) bodies.
    pub fn active_bodies(&self) -> &[BodyId] {
        &self.active_bodies
    }

    /// Number of sleeping bodies.
    pub fn sleeping_body_count(&self) -> u32 {
        let mut count = 0;
        for &root in &self.sleeping_roots {
            let mut cur = Some(root);
            while let Some(id) = cur {
                count += 1;
                cur = self.bodies.get(id).node.next;
            }
        }
        count
    }

    /// The live arbiter for a shape pair, if the pair is colliding.
    pub fn arbiter(&self, a: ShapeId, b: ShapeId) -> Option<&Arbiter> {
        self.arbiters.get(&arbiter_key(a, b))
    }

    /// Iterate every registered body (simulated, sleeping, and rogue)
    /// in handle order.
    pub fn iter_bodies(&self) -> impl Iterator<Item = (BodyId, &Body)> {
        self.bodies.iter()
    }

    fn assert_unlocked(&self) {
        assert!(
            self.locked == 0,
            "this operation cannot be done safely during a step or query; \
             defer it with a post-step callback"
        );
    }

    // ─── Bodies ───────────────────────────────────────────────

    /// Add a dynamic body to the simulation.
    ///
    /// # Panics
    /// Panics if the body is static (static bodies are rogue by
    /// definition — use [`Space::add_rogue_body`]) or the space is
    /// locked.
    pub fn add_body(&mut self, body: Body) -> BodyId {
        assert!(
            !body.is_static(),
            "static bodies are not simulated; add them as rogue bodies"
        );
        self.assert_unlocked();
        let mut body = body;
        body.rogue = false;
        let id = self.bodies.insert(body);
        self.active_bodies.push(id);
        id
    }

    /// Register a body without simulating it (a "rogue" body): it can
    /// carry shapes and be referenced by constraints, but the space
    /// never integrates it. Static bodies are added this way.
    pub fn add_rogue_body(&mut self, body: Body) -> BodyId {
        self.assert_unlocked();
        self.bodies.insert(body)
    }

    /// Remove a body.
    ///
    /// # Panics
    /// Panics if the space is locked, the body is the built-in static
    /// body, or shapes/constraints are still attached (the caller must
    /// remove those first — arbiters are evicted with their shapes).
    pub fn remove_body(&mut self, id: BodyId) -> Body {
        self.assert_unlocked();
        assert!(
            id != self.static_body,
            "cannot remove the space's built-in static body"
        );
        if self.bodies.get(id).is_sleeping() {
            self.activate(id);
        }
        let body = self.bodies.get(id);
        assert!(
            body.shapes.is_empty() && body.constraints.is_empty() && body.arbiters.is_empty(),
            "remove a body's shapes and constraints before removing the body"
        );
        if let Some(pos) = self.active_bodies.iter().position(|&b| b == id) {
            self.active_bodies.remove(pos);
        }
        self.bodies.remove(id)
    }

    // ─── Shapes ───────────────────────────────────────────────

    /// Attach a shape to `body`. Shapes on static bodies go into the
    /// static tree; everything else is tracked by the active tree.
    pub fn add_shape(&mut self, body: BodyId, kind: ShapeKind) -> ShapeId {
        let is_static = self.bodies.get(body).is_static();
        self.add_shape_internal(body, kind, is_static)
    }

    /// Attach a shape to `body` and index it as static regardless of
    /// the body — for immobile geometry hung off rogue bodies.
    pub fn add_static_shape(&mut self, body: BodyId, kind: ShapeKind) -> ShapeId {
        self.add_shape_internal(body, kind, true)
    }

    fn add_shape_internal(&mut self, body_id: BodyId, kind: ShapeKind, is_static: bool) -> ShapeId {
        self.assert_unlocked();
        let id = ShapeId(self.shape_id_counter);
        self.shape_id_counter += 1;

        let body = self.bodies.get(body_id);
        let (p, rot) = (body.p, body.rotation());

        let mut shape = Shape::new(id, body_id, kind);
        shape.update(p, rot);
        self.shapes.insert(id, shape);
        self.bodies.get_mut(body_id).shapes.push(id);

        {
            let bounds = SpaceBounds {
                shapes: &self.shapes,
                bodies: &self.bodies,
            };
            if is_static {
                self.index.insert_static(id, &bounds);
            } else {
                self.index.insert(id, &bounds);
            }
        }

        if !is_static {
            self.activate(body_id);
        }
        id
    }

    /// Attach a circle shape to `body`.
    pub fn add_circle(&mut self, body: BodyId, radius: f64, offset: Vec2) -> ShapeId {
        self.add_shape(body, ShapeKind::Circle(tumble_collide::Circle::new(offset, radius)))
    }

    /// Attach a segment shape to `body`.
    pub fn add_segment(&mut self, body: BodyId, a: Vec2, b: Vec2, radius: f64) -> ShapeId {
        self.add_shape(body, ShapeKind::Segment(tumble_collide::Segment::new(a, b, radius)))
    }

    /// Attach a pre-built segment (e.g. with chain neighbors set).
    pub fn add_segment_shape(&mut self, body: BodyId, segment: tumble_collide::Segment) -> ShapeId {
        self.add_shape(body, ShapeKind::Segment(segment))
    }

    /// Attach a convex polygon shape to `body`.
    pub fn add_poly(&mut self, body: BodyId, verts: &[Vec2], offset: Vec2) -> TumbleResult<ShapeId> {
        let poly = tumble_collide::Poly::new(verts, offset)?;
        Ok(self.add_shape(body, ShapeKind::Poly(poly)))
    }

    /// Attach a centered box shape to `body`.
    pub fn add_box(&mut self, body: BodyId, width: f64, height: f64) -> TumbleResult<ShapeId> {
        let poly = tumble_collide::Poly::new_box(width, height)?;
        Ok(self.add_shape(body, ShapeKind::Poly(poly)))
    }

    /// Remove a shape, evicting every arbiter that references it
    /// (running `separate` callbacks for pairs still touching).
    ///
    /// # Panics
    /// Panics if the space is locked or the shape is unknown.
    pub fn remove_shape(&mut self, id: ShapeId) {
        self.assert_unlocked();
        assert!(self.shapes.contains_key(&id), "shape is not in this space");

        let body_id = self.shapes[&id].body();
        if self.bodies.get(body_id).is_static() {
            self.activate_bodies_touching_shape(id);
        } else {
            self.activate(body_id);
        }

        // Evict arbiters referencing this shape.
        let keys: Vec<ArbiterKey> = self
            .arbiters
            .iter()
            .filter(|(_, arb)| arb.shape_a == id || arb.shape_b == id)
            .map(|(&k, _)| k)
            .collect();
        for key in keys {
            let mut arb = self.arbiters.remove(&key).expect("arbiter vanished");
            if arb.state != ArbiterState::Cached {
                self.call_separate(&mut arb);
            }
            self.unthread_arbiter(key, arb.body_a, arb.body_b);
            if let Some(pos) = self.working.iter().position(|&k| k == key) {
                self.working.remove(pos);
            }
        }

        let body = self.bodies.get_mut(body_id);
        if let Some(pos) = body.shapes.iter().position(|&s| s == id) {
            body.shapes.remove(pos);
        }

        self.index.remove(id);
        self.shapes.remove(&id);
    }

    /// Re-cache and re-index every static shape. Call after moving a
    /// static body; static leaves are otherwise never refreshed.
    pub fn reindex_static(&mut self) {
        self.assert_unlocked();
        let static_ids: Vec<ShapeId> = self
            .shapes
            .keys()
            .copied()
            .filter(|&id| self.index.is_static(id))
            .collect();
        for id in static_ids {
            let body_id = self.shapes[&id].body();
            let body = self.bodies.get(body_id);
            let (p, rot) = (body.p, body.rotation());
            self.shapes
                .get_mut(&id)
                .expect("stale shape handle")
                .update(p, rot);
        }
        let bounds = SpaceBounds {
            shapes: &self.shapes,
            bodies: &self.bodies,
        };
        self.index.reindex_static(&bounds);
    }

    /// Re-cache and re-index a single shape immediately.
    pub fn reindex_shape(&mut self, id: ShapeId) {
        self.assert_unlocked();
        let body_id = self.shapes[&id].body();
        let body = self.bodies.get(body_id);
        let (p, rot) = (body.p, body.rotation());
        self.shapes
            .get_mut(&id)
            .expect("stale shape handle")
            .update(p, rot);
        let bounds = SpaceBounds {
            shapes: &self.shapes,
            bodies: &self.bodies,
        };
        self.index.reindex_shape(id, &bounds);
    }

    // ─── Constraints ──────────────────────────────────────────

    /// Add a constraint, waking both constrained bodies.
    ///
    /// # Panics
    /// Panics if the space is locked or the constraint connects a body
    /// to itself.
    pub fn add_constraint(&mut self, constraint: Box<dyn Constraint>) -> ConstraintId {
        self.assert_unlocked();
        let (a, b) = constraint.bodies();
        assert!(a != b, "a constraint cannot connect a body to itself");

        self.activate(a);
        self.activate(b);

        let id = ConstraintId(self.constraint_id_counter);
        self.constraint_id_counter += 1;
        self.constraints.insert(id, constraint);
        self.live_constraints.push(id);
        self.bodies.get_mut(a).constraints.push(id);
        self.bodies.get_mut(b).constraints.push(id);
        id
    }

    /// Remove a constraint, waking both constrained bodies.
    pub fn remove_constraint(&mut self, id: ConstraintId) -> Box<dyn Constraint> {
        self.assert_unlocked();
        let constraint = self.constraints.remove(&id).expect("stale constraint handle");
        let (a, b) = constraint.bodies();
        self.activate(a);
        self.activate(b);

        if let Some(pos) = self.live_constraints.iter().position(|&c| c == id) {
            self.live_constraints.remove(pos);
        }
        for body_id in [a, b] {
            let body = self.bodies.get_mut(body_id);
            if let Some(pos) = body.constraints.iter().position(|&c| c == id) {
                body.constraints.remove(pos);
            }
        }
        constraint
    }

    // ─── Collision Handlers ───────────────────────────────────

    /// Register callbacks for collisions between two collision types.
    pub fn add_collision_handler(
        &mut self,
        type_a: CollisionType,
        type_b: CollisionType,
        mut handler: CollisionHandler,
    ) {
        self.assert_unlocked();
        handler.type_a = type_a;
        handler.type_b = type_b;
        self.handlers.insert(handler_key(type_a, type_b), handler);
    }

    /// Remove the handler registered for a type pair.
    pub fn remove_collision_handler(&mut self, type_a: CollisionType, type_b: CollisionType) {
        self.assert_unlocked();
        self.handlers.remove(&handler_key(type_a, type_b));
    }

    /// Set the handler used for type pairs with no specific handler.
    pub fn set_default_collision_handler(&mut self, handler: CollisionHandler) {
        self.assert_unlocked();
        self.default_handler = handler;
    }

    pub(crate) fn lookup_handler(&self, a: CollisionType, b: CollisionType) -> &CollisionHandler {
        self.handlers
            .get(&handler_key(a, b))
            .unwrap_or(&self.default_handler)
    }

    pub(crate) fn handler_for_arbiter(&self, arb: &Arbiter) -> CollisionHandler {
        let ta = self.shapes[&arb.shape_a].collision_type;
        let tb = self.shapes[&arb.shape_b].collision_type;
        self.lookup_handler(ta, tb).clone()
    }

    pub(crate) fn call_separate(&mut self, arb: &mut Arbiter) {
        let handler = self.handler_for_arbiter(arb);
        if let Some(separate) = handler.separate {
            separate(arb, self);
        }
    }

    // ─── Lock & Post-Step Callbacks ───────────────────────────

    pub(crate) fn lock(&mut self) {
        self.locked += 1;
    }

    pub(crate) fn unlock(&mut self, run_post_step: bool) {
        assert!(self.locked > 0, "space lock underflow");
        self.locked -= 1;

        if self.locked == 0 && run_post_step && !self.skip_post_step {
            self.skip_post_step = true;

            let roused = std::mem::take(&mut self.roused);
            for id in roused {
                self.activate_body_now(id);
            }

            // Drain in submission order; callbacks may enqueue more,
            // which are handled in this same drain pass.
            while !self.post_step.is_empty() {
                let mut cb = self.post_step.remove(0);
                if let Some(func) = cb.func.take() {
                    func(self);
                }
            }

            self.skip_post_step = false;
        }
    }

    /// Schedule `func` to run once the space unlocks. Keys deduplicate:
    /// scheduling an already-pending key is a no-op returning false.
    pub fn add_post_step_callback(
        &mut self,
        key: u64,
        func: impl FnOnce(&mut Space) + Send + 'static,
    ) -> bool {
        if self.post_step.iter().any(|cb| cb.key == key) {
            return false;
        }
        self.post_step.push(PostStepCallback {
            key,
            func: Some(Box::new(func)),
        });
        true
    }

    // ─── Step ─────────────────────────────────────────────────

    /// Advance the simulation by `dt`. No-op when `dt == 0`.
    ///
    /// Phase order (each phase completes before the next): integrate
    /// positions → re-cache shapes + re-index + narrow phase → rebuild
    /// sleep islands → prepare solvers + integrate velocities → warm
    /// start → solver iterations → post-solve callbacks.
    pub fn step(&mut self, dt: f64) -> StepInfo {
        self.assert_unlocked();
        if dt == 0.0 {
            return StepInfo::default();
        }
        let start = Instant::now();

        self.stamp += 1;
        let prev_dt = self.curr_dt;
        self.curr_dt = dt;

        self.events
            .emit(SimulationEvent::new(self.stamp, EventKind::StepBegin { dt }));

        // Reset last step's working set; unthread arbiters whose
        // bodies are both awake (sleeping pairs keep their contact
        // graph edges so islands and wake-ups can see them).
        let prev_working = std::mem::take(&mut self.working);
        for key in prev_working {
            let Some(arb) = self.arbiters.get_mut(&key) else {
                continue;
            };
            arb.state = ArbiterState::Normal;
            let (ba, bb) = (arb.body_a, arb.body_b);
            if !self.bodies.get(ba).is_sleeping() && !self.bodies.get(bb).is_sleeping() {
                self.unthread_arbiter(key, ba, bb);
            }
        }

        self.lock();
        {
            // 1. Integrate positions.
            for i in 0..self.active_bodies.len() {
                let id = self.active_bodies[i];
                self.bodies.get_mut(id).update_position(dt);
            }

            // 2. Re-cache world data for every shape in the active
            // tree (this includes shapes on rogue dynamic bodies),
            // then re-index and run the narrow phase.
            let moving: Vec<ShapeId> = self
                .shapes
                .keys()
                .copied()
                .filter(|&sid| !self.index.is_static(sid))
                .collect();
            for sid in moving {
                let body_id = self.shapes[&sid].body();
                let body = self.bodies.get(body_id);
                let (p, rot) = (body.p, body.rotation());
                self.shapes
                    .get_mut(&sid)
                    .expect("stale shape handle")
                    .update(p, rot);
            }
            {
                let bounds = SpaceBounds {
                    shapes: &self.shapes,
                    bodies: &self.bodies,
                };
                self.index.reindex(&bounds);
            }

            let mut pairs = Vec::new();
            self.index.touching_pairs(|a, b| pairs.push((a, b)));
            self.events.emit(SimulationEvent::new(
                self.stamp,
                EventKind::BroadPhase {
                    candidate_pairs: pairs.len() as u32,
                },
            ));

            for (a, b) in pairs {
                self.process_pair(a, b);
            }

            let contact_count: usize = self
                .working
                .iter()
                .map(|k| self.arbiters[k].contacts.len())
                .sum();
            self.events.emit(SimulationEvent::new(
                self.stamp,
                EventKind::ContactDetection {
                    arbiter_count: self.working.len() as u32,
                    contact_count: contact_count as u32,
                },
            ));
        }
        self.unlock(false);

        // 3. Rebuild the contact graph and sleep islands.
        self.process_components(dt);
        let sleeping_bodies = self.sleeping_body_count();
        self.events.emit(SimulationEvent::new(
            self.stamp,
            EventKind::Islands {
                active_bodies: self.active_bodies.len() as u32,
                sleeping_bodies,
            },
        ));

        self.lock();
        {
            // Evict stale arbiters; fire separate callbacks.
            self.filter_arbiters();

            // 4. Prepare the solvers.
            let slop = self.config.collision_slop;
            let bias = 1.0 - self.config.collision_bias.powf(dt);
            for i in 0..self.working.len() {
                let key = self.working[i];
                let arb = self.arbiters.get_mut(&key).expect("working arbiter vanished");
                let (a, b) = self.bodies.get2_mut(arb.body_a, arb.body_b);
                arb.pre_step(a, b, dt, slop, bias);
            }
            for i in 0..self.live_constraints.len() {
                let id = self.live_constraints[i];
                let constraint = self.constraints.get_mut(&id).expect("live constraint vanished");
                let (ba, bb) = constraint.bodies();
                let (a, b) = self.bodies.get2_mut(ba, bb);
                constraint.pre_solve(a, b);
                constraint.pre_step(a, b, dt);
            }

            // Integrate velocities.
            let damping = self.config.damping.powf(dt);
            let gravity = self.config.gravity;
            for i in 0..self.active_bodies.len() {
                let id = self.active_bodies[i];
                self.bodies.get_mut(id).update_velocity(gravity, damping, dt);
            }

            // 5. Warm start from the previous step's impulses.
            let dt_coef = if prev_dt == 0.0 { 0.0 } else { dt / prev_dt };
            for i in 0..self.working.len() {
                let key = self.working[i];
                let arb = self.arbiters.get_mut(&key).expect("working arbiter vanished");
                let (a, b) = self.bodies.get2_mut(arb.body_a, arb.body_b);
                arb.apply_cached_impulse(a, b, dt_coef);
            }
            for i in 0..self.live_constraints.len() {
                let id = self.live_constraints[i];
                let constraint = self.constraints.get_mut(&id).expect("live constraint vanished");
                let (ba, bb) = constraint.bodies();
                let (a, b) = self.bodies.get2_mut(ba, bb);
                constraint.apply_cached_impulse(a, b, dt_coef);
            }

            // 6. Gauss-Seidel iterations: arbiters, then constraints,
            // in list order every sweep.
            for _ in 0..self.config.iterations {
                for i in 0..self.working.len() {
                    let key = self.working[i];
                    let arb = self.arbiters.get_mut(&key).expect("working arbiter vanished");
                    let (a, b) = self.bodies.get2_mut(arb.body_a, arb.body_b);
                    arb.apply_impulse(a, b);
                }
                for i in 0..self.live_constraints.len() {
                    let id = self.live_constraints[i];
                    let constraint =
                        self.constraints.get_mut(&id).expect("live constraint vanished");
                    let (ba, bb) = constraint.bodies();
                    let (a, b) = self.bodies.get2_mut(ba, bb);
                    constraint.apply_impulse(a, b);
                }
            }

            // 7. Post-solve callbacks: constraints first, then arbiter
            // handlers; working arbiters settle into Normal.
            for i in 0..self.live_constraints.len() {
                let id = self.live_constraints[i];
                let constraint = self.constraints.get_mut(&id).expect("live constraint vanished");
                let (ba, bb) = constraint.bodies();
                let (a, b) = self.bodies.get2_mut(ba, bb);
                constraint.post_solve(a, b);
            }
            for i in 0..self.working.len() {
                let key = self.working[i];
                let handler = {
                    let arb = &self.arbiters[&key];
                    self.handler_for_arbiter(arb)
                };
                if let Some(post_solve) = handler.post_solve {
                    let mut arb = self.arbiters.remove(&key).expect("working arbiter vanished");
                    post_solve(&mut arb, self);
                    self.arbiters.insert(key, arb);
                }
                self.arbiters
                    .get_mut(&key)
                    .expect("working arbiter vanished")
                    .state = ArbiterState::Normal;
            }
        }
        self.unlock(true);

        let wall_time = start.elapsed().as_secs_f64();
        self.events.emit(SimulationEvent::new(
            self.stamp,
            EventKind::StepEnd { wall_time },
        ));
        self.events.flush();

        let contacts: usize = self
            .working
            .iter()
            .filter_map(|k| self.arbiters.get(k))
            .map(|arb| arb.contacts.len())
            .sum();
        StepInfo {
            arbiters: self.working.len() as u32,
            contacts: contacts as u32,
            sleeping_bodies,
            wall_time,
        }
    }

    // ─── Collision Pipeline ───────────────────────────────────

    /// Run the filter + narrow-phase + arbiter-update pipeline for one
    /// broad-phase candidate pair.
    fn process_pair(&mut self, s1: ShapeId, s2: ShapeId) {
        let (sensor, handler) = {
            let a = &self.shapes[&s1];
            let b = &self.shapes[&s2];

            if !a.bb.intersects(&b.bb)
                || a.body() == b.body()
                || (a.group != tumble_types::Group::NONE && a.group == b.group)
                || !a.layers.intersects(b.layers)
            {
                return;
            }

            let handler = self.lookup_handler(a.collision_type, b.collision_type).clone();
            let sensor = a.sensor || b.sensor;
            (sensor, handler)
        };

        // Sensors with no interested handler generate nothing.
        if sensor && handler.is_empty() {
            return;
        }

        // The narrow phase wants the pair in collision-code order.
        let (sa, sb) = if self.shapes[&s1].collision_code() > self.shapes[&s2].collision_code() {
            (s2, s1)
        } else {
            (s1, s2)
        };

        let contacts = collide(&self.shapes[&sa], &self.shapes[&sb]);
        if contacts.is_empty() {
            return; // not touching; any cached arbiter ages out
        }

        let key = arbiter_key(s1, s2);
        let mut arb = self.arbiters.remove(&key).unwrap_or_else(|| {
            Arbiter::new(sa, sb, self.shapes[&sa].body(), self.shapes[&sb].body())
        });
        arb.update(contacts, &handler, &self.shapes[&sa], &self.shapes[&sb]);

        if arb.state == ArbiterState::FirstContact {
            let accepted = handler
                .begin
                .as_ref()
                .map_or(true, |begin| begin(&mut arb, self));
            if !accepted {
                arb.ignore();
            }
        }

        let solve = arb.state != ArbiterState::Ignore
            && handler
                .pre_solve
                .as_ref()
                .map_or(true, |pre_solve| pre_solve(&mut arb, self))
            && !sensor;

        if solve {
            self.working.push(key);
        } else {
            arb.contacts.clear();
            if arb.state != ArbiterState::Ignore {
                arb.state = ArbiterState::Normal;
            }
        }

        arb.stamp = self.stamp;
        self.arbiters.insert(key, arb);
    }

    /// Age the arbiter cache: pairs that stopped touching get their
    /// `separate` callback and become `Cached`; pairs stale for longer
    /// than the persistence window are evicted. Pairs whose bodies are
    /// all sleeping or static are preserved as-is.
    fn filter_arbiters(&mut self) {
        let keys: Vec<ArbiterKey> = self.arbiters.keys().copied().collect();
        for key in keys {
            let (ticks, preserved, needs_separate) = {
                let arb = &self.arbiters[&key];
                let a = self.bodies.get(arb.body_a);
                let b = self.bodies.get(arb.body_b);
                let ticks = self.stamp - arb.stamp;
                let preserved = (a.is_static() || a.is_sleeping())
                    && (b.is_static() || b.is_sleeping());
                let needs_separate = ticks >= 1 && arb.state != ArbiterState::Cached;
                (ticks, preserved, needs_separate)
            };
            if preserved {
                continue;
            }

            if needs_separate {
                let mut arb = self.arbiters.remove(&key).expect("arbiter vanished");
                self.call_separate(&mut arb);
                arb.state = ArbiterState::Cached;
                self.arbiters.insert(key, arb);
            }

            if ticks >= self.config.collision_persistence {
                let arb = self.arbiters.remove(&key).expect("arbiter vanished");
                self.unthread_arbiter(key, arb.body_a, arb.body_b);
            }
        }
    }

    pub(crate) fn unthread_arbiter(&mut self, key: ArbiterKey, a: BodyId, b: BodyId) {
        for body_id in [a, b] {
            let body = self.bodies.get_mut(body_id);
            if let Some(pos) = body.arbiters.iter().position(|&k| k == key) {
                body.arbiters.swap_remove(pos);
            }
        }
    }
}

impl Default for Space {
    fn default() -> Self {
        Self::new()
    }
}

#[inline]
fn handler_key(a: CollisionType, b: CollisionType) -> (CollisionType, CollisionType) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}
