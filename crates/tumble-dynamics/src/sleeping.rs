//! Sleep islands: idle tracking, flood fill, deactivation, and waking.
//!
//! Bodies connected by arbiters or constraints form an undirected
//! contact graph. Sleeping is all-or-nothing per connected component:
//! an island is deactivated only when *every* member has been idle for
//! longer than the threshold, and waking any member wakes the whole
//! island. Rogue and static bodies never join components — a body
//! touching one can still sleep, but never *through* one.

use tumble_types::{BodyId, ShapeId};

use crate::space::{Space, SpaceBounds};

impl Space {
    // ─── Waking ───────────────────────────────────────────────

    /// Wake a body (and its entire island, if it was sleeping). Resets
    /// the body's idle timer. No-op for rogue (including static) bodies.
    pub fn activate(&mut self, id: BodyId) {
        if self.bodies.get(id).is_rogue() {
            return;
        }
        self.bodies.get_mut(id).node.idle_time = 0.0;
        if let Some(root) = self.bodies.get(id).node.root {
            self.component_activate(root);
        }
    }

    /// Wake every sleeping body in the component rooted at `root`.
    fn component_activate(&mut self, root: BodyId) {
        if !self.bodies.get(root).is_sleeping() {
            return;
        }
        assert!(
            !self.bodies.get(root).is_rogue(),
            "internal: a rogue body cannot root a sleep island"
        );

        let mut cur = Some(root);
        while let Some(id) = cur {
            let body = self.bodies.get_mut(id);
            let next = body.node.next;
            body.node.idle_time = 0.0;
            body.node.root = None;
            body.node.next = None;
            self.activate_body_now(id);
            cur = next;
        }

        if let Some(pos) = self.sleeping_roots.iter().position(|&r| r == root) {
            self.sleeping_roots.remove(pos);
        }
    }

    /// Move a (previously sleeping or newly added) body into the
    /// simulated set: active list, active spatial tree, and restore its
    /// cached arbiters and constraints to the live solver lists. While
    /// the space is locked the work is deferred to the next unlock.
    pub(crate) fn activate_body_now(&mut self, id: BodyId) {
        assert!(
            !self.bodies.get(id).is_rogue(),
            "internal: cannot activate a rogue body"
        );

        if self.is_locked() {
            if !self.roused.contains(&id) {
                self.roused.push(id);
            }
            return;
        }

        self.active_bodies.push(id);

        let shape_ids = self.bodies.get(id).shapes.clone();
        for sid in shape_ids {
            self.index.remove(sid);
            let bounds = SpaceBounds {
                shapes: &self.shapes,
                bodies: &self.bodies,
            };
            self.index.insert(sid, &bounds);
        }

        // Restore cached arbiters through whichever body is the
        // "primary" side, re-stamping them so they are not evicted as
        // stale on the next filter pass.
        let arb_keys = self.bodies.get(id).arbiters.clone();
        for key in arb_keys {
            let primary = {
                let Some(arb) = self.arbiters.get(&key) else {
                    continue;
                };
                arb.body_a == id || self.bodies.get(arb.body_a).is_static()
            };
            if primary {
                let stamp = self.stamp;
                let arb = self.arbiters.get_mut(&key).expect("arbiter vanished");
                arb.stamp = stamp;
                if !self.working.contains(&key) {
                    self.working.push(key);
                }
            }
        }

        let cids = self.bodies.get(id).constraints.clone();
        for cid in cids {
            let ca = self.constraints[&cid].bodies().0;
            if ca == id || self.bodies.get(ca).is_static() {
                if !self.live_constraints.contains(&cid) {
                    self.live_constraints.push(cid);
                }
            }
        }
    }

    /// Wake every body touching the given static shape. Used when a
    /// static shape is removed or moved.
    pub(crate) fn activate_bodies_touching_shape(&mut self, shape: ShapeId) {
        let body_id = self.shapes[&shape].body();
        let keys = self.bodies.get(body_id).arbiters.clone();
        for key in keys {
            if key.0 == shape || key.1 == shape {
                let (ba, bb) = {
                    let arb = &self.arbiters[&key];
                    (arb.body_a, arb.body_b)
                };
                self.activate(if ba == body_id { bb } else { ba });
            }
        }
    }

    // ─── Sleeping ─────────────────────────────────────────────

    /// Force a body to sleep immediately, as its own one-body island.
    ///
    /// # Panics
    /// Panics for rogue/static bodies, while the space is locked, or if
    /// the body is already sleeping.
    pub fn sleep_body(&mut self, id: BodyId) {
        self.sleep_body_internal(id, None);
    }

    /// Force a body to sleep as part of the island `group` already
    /// belongs to, so the whole set wakes together.
    ///
    /// # Panics
    /// As [`Space::sleep_body`]; additionally `group` must be sleeping.
    pub fn sleep_body_with_group(&mut self, id: BodyId, group: BodyId) {
        self.sleep_body_internal(id, Some(group));
    }

    fn sleep_body_internal(&mut self, id: BodyId, group: Option<BodyId>) {
        assert!(
            !self.bodies.get(id).is_rogue(),
            "rogue and static bodies cannot be put to sleep"
        );
        assert!(
            !self.is_locked(),
            "bodies cannot be put to sleep during a step; use a post-step callback"
        );
        if let Some(g) = group {
            assert!(
                self.bodies.get(g).is_sleeping(),
                "a sleep group identifier must itself be sleeping"
            );
        }

        if self.bodies.get(id).is_sleeping() {
            let my_root = self.bodies.get(id).node.root;
            let group_root = group.and_then(|g| self.bodies.get(g).node.root);
            assert!(
                my_root == group_root,
                "the body is already sleeping and its group cannot be reassigned"
            );
            return;
        }

        // Freeze the shape caches at the body's final transform.
        let (p, rot, sids) = {
            let body = self.bodies.get(id);
            (body.p, body.rotation(), body.shapes.clone())
        };
        for sid in sids {
            self.shapes
                .get_mut(&sid)
                .expect("body references unknown shape")
                .update(p, rot);
        }

        self.deactivate_body(id);

        match group {
            Some(g) => {
                let root = self.bodies.get(g).node.root.expect("group is sleeping");
                let root_next = self.bodies.get(root).node.next;
                let body = self.bodies.get_mut(id);
                body.node.root = Some(root);
                body.node.next = root_next;
                body.node.idle_time = 0.0;
                self.bodies.get_mut(root).node.next = Some(id);
            }
            None => {
                let body = self.bodies.get_mut(id);
                body.node.root = Some(id);
                body.node.next = None;
                body.node.idle_time = 0.0;
                self.sleeping_roots.push(id);
            }
        }
    }

    /// Remove a body from the simulated set: active list, spatial tree
    /// (shapes migrate to the static tree), and the live solver lists.
    /// Sleep linkage is the caller's business.
    fn deactivate_body(&mut self, id: BodyId) {
        assert!(
            !self.bodies.get(id).is_rogue(),
            "internal: cannot deactivate a rogue body"
        );

        if let Some(pos) = self.active_bodies.iter().position(|&b| b == id) {
            self.active_bodies.remove(pos);
        }

        let shape_ids = self.bodies.get(id).shapes.clone();
        for sid in shape_ids {
            self.index.remove(sid);
            let bounds = SpaceBounds {
                shapes: &self.shapes,
                bodies: &self.bodies,
            };
            self.index.insert_static(sid, &bounds);
        }

        let arb_keys = self.bodies.get(id).arbiters.clone();
        for key in arb_keys {
            let primary = {
                let Some(arb) = self.arbiters.get(&key) else {
                    continue;
                };
                arb.body_a == id || self.bodies.get(arb.body_a).is_static()
            };
            if primary {
                if let Some(pos) = self.working.iter().position(|&k| k == key) {
                    self.working.remove(pos);
                }
            }
        }

        let cids = self.bodies.get(id).constraints.clone();
        for cid in cids {
            let ca = self.constraints[&cid].bodies().0;
            if ca == id || self.bodies.get(ca).is_static() {
                if let Some(pos) = self.live_constraints.iter().position(|&c| c == cid) {
                    self.live_constraints.remove(pos);
                }
            }
        }
    }

    // ─── Island Processing ────────────────────────────────────

    /// Rebuild the contact graph for this step and put fully idle
    /// islands to sleep. Runs between collision detection and the
    /// solver; sleeping here removes an island's arbiters and
    /// constraints from the solver's working sets.
    pub(crate) fn process_components(&mut self, dt: f64) {
        let sleep = self.config.sleep_time_threshold != f64::INFINITY;

        if sleep {
            // Threshold kinetic energy per unit mass: either the
            // configured idle speed, or one step's worth of gravity.
            let dv = self.config.idle_speed_threshold;
            let dvsq = if dv != 0.0 {
                dv * dv
            } else {
                self.config.gravity.length_squared() * dt * dt
            };

            for i in 0..self.active_bodies.len() {
                let id = self.active_bodies[i];
                let body = self.bodies.get_mut(id);
                let ke_threshold = if dvsq != 0.0 { body.mass() * dvsq } else { 0.0 };
                body.node.idle_time = if body.kinetic_energy() > ke_threshold {
                    0.0
                } else {
                    body.node.idle_time + dt
                };
            }
        }

        // Wake bodies touched by this step's collisions, then thread
        // the arbiters into the contact graph.
        let working = self.working.clone();
        for key in working {
            let (ba, bb) = {
                let arb = &self.arbiters[&key];
                (arb.body_a, arb.body_b)
            };

            if sleep {
                let a_rogue_dyn = {
                    let b = self.bodies.get(ba);
                    b.is_rogue() && !b.is_static()
                };
                let b_rogue_dyn = {
                    let b = self.bodies.get(bb);
                    b.is_rogue() && !b.is_static()
                };
                if b_rogue_dyn || self.bodies.get(ba).is_sleeping() {
                    self.activate(ba);
                }
                if a_rogue_dyn || self.bodies.get(bb).is_sleeping() {
                    self.activate(bb);
                }
            }

            for body_id in [ba, bb] {
                let body = self.bodies.get_mut(body_id);
                if !body.arbiters.contains(&key) {
                    body.arbiters.push(key);
                }
            }
        }

        if !sleep {
            return;
        }

        // A joint to a non-static rogue body holds both ends awake.
        for i in 0..self.live_constraints.len() {
            let cid = self.live_constraints[i];
            let (ca, cb) = self.constraints[&cid].bodies();
            let a_rogue_dyn = {
                let b = self.bodies.get(ca);
                b.is_rogue() && !b.is_static()
            };
            let b_rogue_dyn = {
                let b = self.bodies.get(cb);
                b.is_rogue() && !b.is_static()
            };
            if b_rogue_dyn {
                self.activate(ca);
            }
            if a_rogue_dyn {
                self.activate(cb);
            }
        }

        // Generate components and deactivate the ones that are idle
        // throughout.
        let threshold = self.config.sleep_time_threshold;
        let snapshot = self.active_bodies.clone();
        for id in snapshot {
            if self.bodies.get(id).node.root.is_some() {
                continue; // already grouped this pass (or just put to sleep)
            }

            self.flood_fill(id);

            if !self.component_active(id, threshold) {
                self.sleeping_roots.push(id);
                let mut cur = Some(id);
                while let Some(b) = cur {
                    cur = self.bodies.get(b).node.next;
                    self.deactivate_body(b);
                }
            }
        }

        // Only sleeping bodies retain their component linkage.
        for i in 0..self.active_bodies.len() {
            let id = self.active_bodies[i];
            let body = self.bodies.get_mut(id);
            body.node.root = None;
            body.node.next = None;
        }
    }

    /// Iterative DFS over the arbiter + constraint adjacency, rooting
    /// every reachable non-rogue body at `root`.
    fn flood_fill(&mut self, root: BodyId) {
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            if self.bodies.get(id).is_rogue() {
                continue;
            }
            match self.bodies.get(id).node.root {
                Some(r) => {
                    debug_assert_eq!(r, root, "inconsistency detected in the contact graph");
                }
                None => {
                    {
                        let root_next = self.bodies.get(root).node.next;
                        let body = self.bodies.get_mut(id);
                        body.node.root = Some(root);
                        if id != root {
                            body.node.next = root_next;
                            self.bodies.get_mut(root).node.next = Some(id);
                        }
                    }

                    let body = self.bodies.get(id);
                    for &key in &body.arbiters {
                        let arb = &self.arbiters[&key];
                        stack.push(if arb.body_a == id { arb.body_b } else { arb.body_a });
                    }
                    for &cid in &body.constraints {
                        let (ca, cb) = self.constraints[&cid].bodies();
                        stack.push(if ca == id { cb } else { ca });
                    }
                }
            }
        }
    }

    /// An island stays awake while any member's idle time is below the
    /// threshold.
    fn component_active(&self, root: BodyId, threshold: f64) -> bool {
        let mut cur = Some(root);
        while let Some(id) = cur {
            let body = self.bodies.get(id);
            if body.node.idle_time < threshold {
                return true;
            }
            cur = body.node.next;
        }
        false
    }
}
