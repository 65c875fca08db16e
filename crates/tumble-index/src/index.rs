//! The spatial index: two trees, one arena, one generation counter.
//!
//! Re-indexing is lazy. A leaf's stored box is inflated beyond the
//! shape's tight box (optionally stretched along its velocity), and the
//! leaf is only re-inserted — and its touching set only recomputed —
//! when the tight box escapes the stored box. The cost of a pass is
//! therefore proportional to how much actually moved, not to the size
//! of the tree.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tumble_math::{Bb, Vec2};
use tumble_types::constants::BB_INFLATION_FACTOR;
use tumble_types::ShapeId;

use crate::tree::{new_leaf, node_other, subtree_insert, subtree_remove, NodeArena, NodeId, NodeKind};

/// Supplies current tight boxes (and optionally velocities) for the
/// shapes tracked by the index. The index never computes geometry
/// itself — the owner of the shapes does.
pub trait BoundsSource {
    /// Current tight world-space bounding box of `shape`.
    fn bb(&self, shape: ShapeId) -> Bb;

    /// Estimated velocity of `shape`, used to stretch its stored box
    /// toward its near-future position. Return `None` to disable
    /// prediction (the stored box is then inflated symmetrically).
    fn velocity(&self, shape: ShapeId) -> Option<Vec2>;
}

#[derive(Debug, Clone, Copy)]
struct LeafRef {
    node: NodeId,
    is_static: bool,
}

/// Incremental BVH over shapes, split into an active and a static tree.
///
/// Static leaves are only re-examined via [`SpatialIndex::reindex_static`]
/// or [`SpatialIndex::reindex_shape`]; active leaves are refreshed by
/// [`SpatialIndex::reindex`] once per simulation step. Both trees share
/// one generation counter so leaf stamps stay comparable.
#[derive(Debug, Default)]
pub struct SpatialIndex {
    arena: NodeArena,
    active_root: Option<NodeId>,
    static_root: Option<NodeId>,
    leaves: BTreeMap<ShapeId, LeafRef>,
    stamp: u64,
}

/// Snapshot of index shape, for diagnostics and tests.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct IndexStats {
    /// Number of leaves in the active tree.
    pub active_leaves: usize,
    /// Number of leaves in the static tree.
    pub static_leaves: usize,
    /// Total touching-pair count (each unordered pair counted once).
    pub touching_pairs: usize,
    /// Height of the active tree (0 for empty).
    pub active_height: usize,
}

impl SpatialIndex {
    /// Creates an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current generation stamp.
    #[inline]
    pub fn stamp(&self) -> u64 {
        self.stamp
    }

    /// Number of shapes tracked (active + static).
    pub fn len(&self) -> usize {
        self.leaves.len()
    }

    /// Returns true if no shapes are tracked.
    pub fn is_empty(&self) -> bool {
        self.leaves.is_empty()
    }

    /// Returns true if `shape` is tracked by this index.
    pub fn contains(&self, shape: ShapeId) -> bool {
        self.leaves.contains_key(&shape)
    }

    /// Returns true if `shape` is in the static tree.
    pub fn is_static(&self, shape: ShapeId) -> bool {
        self.leaves.get(&shape).is_some_and(|l| l.is_static)
    }

    // ─── Insertion / Removal ──────────────────────────────────

    /// Insert `shape` into the active tree.
    ///
    /// The new leaf's touching set is computed immediately so a shape
    /// added mid-step still collides this step.
    ///
    /// # Panics
    /// Panics if the shape is already tracked.
    pub fn insert(&mut self, shape: ShapeId, source: &impl BoundsSource) {
        assert!(
            !self.leaves.contains_key(&shape),
            "shape is already in the spatial index"
        );
        let bb = inflated_bb(source, shape);
        let leaf = new_leaf(&mut self.arena, shape, bb, self.stamp);
        self.leaves.insert(shape, LeafRef { node: leaf, is_static: false });

        let root = subtree_insert(&mut self.arena, self.active_root, leaf);
        self.arena.get_mut(root).parent = None;
        self.active_root = Some(root);

        self.mark_leaf(leaf);
        self.stamp += 1;
    }

    /// Insert `shape` into the static tree with its tight box (no
    /// inflation — static leaves are not expected to move).
    ///
    /// # Panics
    /// Panics if the shape is already tracked.
    pub fn insert_static(&mut self, shape: ShapeId, source: &impl BoundsSource) {
        assert!(
            !self.leaves.contains_key(&shape),
            "shape is already in the spatial index"
        );
        let bb = source.bb(shape);
        let leaf = new_leaf(&mut self.arena, shape, bb, self.stamp);
        self.leaves.insert(shape, LeafRef { node: leaf, is_static: true });

        let root = subtree_insert(&mut self.arena, self.static_root, leaf);
        self.arena.get_mut(root).parent = None;
        self.static_root = Some(root);

        // A fresh static leaf only needs testing against the active tree;
        // static/static pairs are never candidates.
        if let Some(active_root) = self.active_root {
            self.mark_leaf_query(active_root, leaf);
        }
        self.stamp += 1;
    }

    /// Remove `shape` from whichever tree holds it, dropping all of its
    /// cached touching pairs symmetrically.
    ///
    /// # Panics
    /// Panics if the shape is not tracked.
    pub fn remove(&mut self, shape: ShapeId) {
        let leaf_ref = self
            .leaves
            .remove(&shape)
            .expect("shape is not in the spatial index");
        let leaf = leaf_ref.node;

        self.clear_touching(leaf);

        let root = if leaf_ref.is_static {
            self.static_root
        } else {
            self.active_root
        }
        .expect("tracked leaf but empty tree");

        let new_root = subtree_remove(&mut self.arena, root, leaf);
        if let Some(r) = new_root {
            self.arena.get_mut(r).parent = None;
        }
        if leaf_ref.is_static {
            self.static_root = new_root;
        } else {
            self.active_root = new_root;
        }

        self.arena.dealloc(leaf);
    }

    // ─── Re-indexing ──────────────────────────────────────────

    /// Refresh the active tree for this generation.
    ///
    /// Pass 1 re-inserts every leaf whose tight box escaped its stored
    /// box (rebuilding the stored box, clearing its touching set, and
    /// stamping it). Pass 2 recomputes touching sets for exactly the
    /// leaves stamped this generation, walking from each up to the root
    /// and testing sibling subtrees, plus the static root. Finally the
    /// generation counter advances.
    pub fn reindex(&mut self, source: &impl BoundsSource) {
        let active: Vec<(ShapeId, NodeId)> = self
            .leaves
            .iter()
            .filter(|(_, l)| !l.is_static)
            .map(|(&s, l)| (s, l.node))
            .collect();

        for &(shape, leaf) in &active {
            self.leaf_update(shape, leaf, source);
        }

        for &(_, leaf) in &active {
            if self.arena.get(leaf).leaf().stamp == self.stamp {
                self.mark_leaf(leaf);
            }
        }

        self.stamp += 1;
    }

    /// Refresh every static leaf from `source` (tight boxes) and
    /// recompute its pairs against the active tree. Call after moving
    /// static shapes.
    pub fn reindex_static(&mut self, source: &impl BoundsSource) {
        let statics: Vec<(ShapeId, NodeId)> = self
            .leaves
            .iter()
            .filter(|(_, l)| l.is_static)
            .map(|(&s, l)| (s, l.node))
            .collect();

        for &(shape, leaf) in &statics {
            let bb = source.bb(shape);
            if !self.arena.get(leaf).bb.contains(&bb) {
                self.move_leaf(leaf, bb, true);
                if let Some(active_root) = self.active_root {
                    self.mark_leaf_query(active_root, leaf);
                }
            }
        }

        self.stamp += 1;
    }

    /// Refresh a single shape's leaf (active or static) immediately.
    pub fn reindex_shape(&mut self, shape: ShapeId, source: &impl BoundsSource) {
        let leaf_ref = *self
            .leaves
            .get(&shape)
            .expect("shape is not in the spatial index");
        if leaf_ref.is_static {
            let bb = source.bb(shape);
            if !self.arena.get(leaf_ref.node).bb.contains(&bb) {
                self.move_leaf(leaf_ref.node, bb, true);
                if let Some(active_root) = self.active_root {
                    self.mark_leaf_query(active_root, leaf_ref.node);
                }
                self.stamp += 1;
            }
        } else if self.leaf_update(shape, leaf_ref.node, source) {
            self.mark_leaf(leaf_ref.node);
            self.stamp += 1;
        }
    }

    /// Pass-1 step for one active leaf. Returns true if the leaf moved.
    fn leaf_update(
        &mut self,
        shape: ShapeId,
        leaf: NodeId,
        source: &impl BoundsSource,
    ) -> bool {
        let tight = source.bb(shape);
        if self.arena.get(leaf).bb.contains(&tight) {
            return false;
        }
        let inflated = inflated_bb(source, shape);
        self.move_leaf(leaf, inflated, false);
        true
    }

    /// Re-insert a leaf with a new stored box, clearing its pairs and
    /// stamping it with the current generation.
    fn move_leaf(&mut self, leaf: NodeId, bb: Bb, is_static: bool) {
        let root = if is_static {
            self.static_root
        } else {
            self.active_root
        }
        .expect("tracked leaf but empty tree");

        let removed_root = subtree_remove(&mut self.arena, root, leaf);

        {
            let node = self.arena.get_mut(leaf);
            node.bb = bb;
            node.parent = None;
        }

        let new_root = subtree_insert(&mut self.arena, removed_root, leaf);
        self.arena.get_mut(new_root).parent = None;
        if is_static {
            self.static_root = Some(new_root);
        } else {
            self.active_root = Some(new_root);
        }

        self.clear_touching(leaf);
        let stamp = self.stamp;
        self.arena.get_mut(leaf).leaf_mut().stamp = stamp;
    }

    // ─── Touch tracking ───────────────────────────────────────

    /// Recompute pairs for a freshly stamped leaf: test the static root,
    /// then walk up to the root testing each sibling subtree.
    fn mark_leaf(&mut self, leaf: NodeId) {
        if let Some(static_root) = self.static_root {
            self.mark_leaf_query(static_root, leaf);
        }

        let mut node = leaf;
        while let Some(parent) = self.arena.get(node).parent {
            let sibling = node_other(&self.arena, parent, node);
            self.mark_leaf_query(sibling, leaf);
            node = parent;
        }
    }

    /// Record every leaf under `subtree` whose box overlaps `leaf`'s box
    /// as touching `leaf` (symmetrically, idempotently).
    fn mark_leaf_query(&mut self, subtree: NodeId, leaf: NodeId) {
        let leaf_bb = self.arena.get(leaf).bb;
        if !leaf_bb.intersects(&self.arena.get(subtree).bb) {
            return;
        }
        if self.arena.get(subtree).is_leaf() {
            self.add_touch(leaf, subtree);
        } else {
            let (a, b) = self.arena.get(subtree).children();
            self.mark_leaf_query(a, leaf);
            self.mark_leaf_query(b, leaf);
        }
    }

    /// Insert the symmetric touching relation, once.
    fn add_touch(&mut self, a: NodeId, b: NodeId) {
        if a == b {
            return;
        }
        if self.arena.get(a).leaf().touching.contains(&b) {
            return;
        }
        self.arena.get_mut(a).leaf_mut().touching.push(b);
        self.arena.get_mut(b).leaf_mut().touching.push(a);
    }

    /// Drop all of `leaf`'s pairs, symmetrically.
    fn clear_touching(&mut self, leaf: NodeId) {
        let touching = std::mem::take(&mut self.arena.get_mut(leaf).leaf_mut().touching);
        for other in touching {
            let list = &mut self.arena.get_mut(other).leaf_mut().touching;
            if let Some(pos) = list.iter().position(|&n| n == leaf) {
                list.swap_remove(pos);
            }
        }
    }

    /// Enumerate every cached touching pair exactly once, in ascending
    /// shape-id order of the smaller member.
    ///
    /// Dedup rule: a pair `(a, b)` is emitted from `a`'s side iff
    /// `a < b`; touching sets are symmetric so this covers every pair.
    pub fn touching_pairs(&self, mut f: impl FnMut(ShapeId, ShapeId)) {
        for (&shape, leaf_ref) in &self.leaves {
            let leaf = self.arena.get(leaf_ref.node).leaf();
            for &other_node in &leaf.touching {
                let other = self.arena.get(other_node).leaf().shape;
                if shape < other {
                    f(shape, other);
                }
            }
        }
    }

    // ─── Queries ──────────────────────────────────────────────

    /// Invoke `f` for every shape whose stored box intersects `bb`.
    pub fn query(&self, bb: &Bb, mut f: impl FnMut(ShapeId)) {
        if let Some(root) = self.active_root {
            self.subtree_query(root, bb, &mut f);
        }
        if let Some(root) = self.static_root {
            self.subtree_query(root, bb, &mut f);
        }
    }

    /// Invoke `f` for every shape whose stored box contains `p`.
    pub fn point_query(&self, p: Vec2, f: impl FnMut(ShapeId)) {
        self.query(&Bb::for_point(p), f);
    }

    fn subtree_query(&self, node: NodeId, bb: &Bb, f: &mut impl FnMut(ShapeId)) {
        let n = self.arena.get(node);
        if !n.bb.intersects(bb) {
            return;
        }
        match n.kind {
            NodeKind::Leaf(ref data) => f(data.shape),
            NodeKind::Branch { a, b } => {
                self.subtree_query(a, bb, f);
                self.subtree_query(b, bb, f);
            }
        }
    }

    /// Invoke `f` for every shape whose stored box the segment `a`–`b`
    /// passes through, nearest boxes first. `f` returns a new exit
    /// parameter in `[0, 1]`; returning less than 1 prunes everything
    /// beyond that point (used for "first hit" raycasts).
    pub fn segment_query(
        &self,
        a: Vec2,
        b: Vec2,
        t_exit: f64,
        mut f: impl FnMut(ShapeId) -> f64,
    ) {
        let mut t_exit = t_exit;
        if let Some(root) = self.active_root {
            t_exit = self.subtree_segment_query(root, a, b, t_exit, &mut f);
        }
        if let Some(root) = self.static_root {
            self.subtree_segment_query(root, a, b, t_exit, &mut f);
        }
    }

    fn subtree_segment_query(
        &self,
        node: NodeId,
        a: Vec2,
        b: Vec2,
        mut t_exit: f64,
        f: &mut impl FnMut(ShapeId) -> f64,
    ) -> f64 {
        let n = self.arena.get(node);
        match n.kind {
            NodeKind::Leaf(ref data) => f(data.shape).min(t_exit),
            NodeKind::Branch { a: ca, b: cb } => {
                let t_a = self.arena.get(ca).bb.segment_query(a, b);
                let t_b = self.arena.get(cb).bb.segment_query(a, b);

                let (first, t_first, second, t_second) = if t_a < t_b {
                    (ca, t_a, cb, t_b)
                } else {
                    (cb, t_b, ca, t_a)
                };

                if t_first < t_exit {
                    t_exit = t_exit.min(self.subtree_segment_query(first, a, b, t_exit, f));
                }
                if t_second < t_exit {
                    t_exit = t_exit.min(self.subtree_segment_query(second, a, b, t_exit, f));
                }
                t_exit
            }
        }
    }

    /// Invoke `f` once per tracked shape, in ascending shape-id order.
    pub fn each(&self, mut f: impl FnMut(ShapeId)) {
        for &shape in self.leaves.keys() {
            f(shape);
        }
    }

    // ─── Diagnostics ──────────────────────────────────────────

    /// Gather tree statistics.
    pub fn stats(&self) -> IndexStats {
        let mut pairs = 0;
        self.touching_pairs(|_, _| pairs += 1);
        IndexStats {
            active_leaves: self.leaves.values().filter(|l| !l.is_static).count(),
            static_leaves: self.leaves.values().filter(|l| l.is_static).count(),
            touching_pairs: pairs,
            active_height: self.active_root.map_or(0, |r| self.height(r)),
        }
    }

    fn height(&self, node: NodeId) -> usize {
        match self.arena.get(node).kind {
            NodeKind::Leaf(_) => 1,
            NodeKind::Branch { a, b } => 1 + self.height(a).max(self.height(b)),
        }
    }

    /// Check structural invariants, panicking with a description on the
    /// first violation. Used by tests; cheap enough for debug asserts.
    ///
    /// Verified: every branch box is the exact union of its children's
    /// boxes, parent links are consistent, every tracked leaf is
    /// reachable, and touching sets are symmetric.
    pub fn validate(&self) {
        if let Some(root) = self.active_root {
            assert!(self.arena.get(root).parent.is_none(), "active root has a parent");
            self.validate_subtree(root);
        }
        if let Some(root) = self.static_root {
            assert!(self.arena.get(root).parent.is_none(), "static root has a parent");
            self.validate_subtree(root);
        }

        for (&shape, leaf_ref) in &self.leaves {
            let node = self.arena.get(leaf_ref.node);
            assert!(node.is_leaf(), "leaf registry points at a branch");
            assert_eq!(node.leaf().shape, shape, "leaf registry shape mismatch");
            for &other in &node.leaf().touching {
                let back = &self.arena.get(other).leaf().touching;
                assert!(
                    back.contains(&leaf_ref.node),
                    "touching set is not symmetric"
                );
            }
        }
    }

    fn validate_subtree(&self, node: NodeId) {
        let n = self.arena.get(node);
        if let NodeKind::Branch { a, b } = n.kind {
            let merged = self.arena.get(a).bb.merge(&self.arena.get(b).bb);
            assert_eq!(n.bb, merged, "branch box is not the union of its children");
            assert_eq!(self.arena.get(a).parent, Some(node), "bad parent link");
            assert_eq!(self.arena.get(b).parent, Some(node), "bad parent link");
            self.validate_subtree(a);
            self.validate_subtree(b);
        }
    }
}

/// Stored box for an active leaf: the tight box grown by a fraction of
/// its own size, stretched along the predicted velocity when available.
fn inflated_bb(source: &impl BoundsSource, shape: ShapeId) -> Bb {
    let bb = source.bb(shape);
    match source.velocity(shape) {
        Some(v) => {
            let coef = BB_INFLATION_FACTOR;
            let x = (bb.r - bb.l) * coef;
            let y = (bb.t - bb.b) * coef;
            let v = v * coef;
            Bb::new(
                bb.l + (-x).min(v.x),
                bb.b + (-y).min(v.y),
                bb.r + x.max(v.x),
                bb.t + y.max(v.y),
            )
        }
        None => bb,
    }
}
