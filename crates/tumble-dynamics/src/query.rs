//! Read-only spatial queries against a space.
//!
//! Every query takes a layer mask and a group: shapes that share a
//! non-zero group with the query, or have no layer in common with it,
//! are skipped. Queries borrow the space immutably, so callbacks
//! cannot structurally mutate it — defer mutations to post-step
//! callbacks instead.

use tumble_collide::{collide, Contact, SegmentQueryInfo, Shape};
use tumble_math::{Bb, Vec2};
use tumble_types::{Group, Layers, ShapeId};

use crate::space::Space;

#[inline]
fn filter_reject(shape: &Shape, layers: Layers, group: Group) -> bool {
    (group != Group::NONE && shape.group == group) || !shape.layers.intersects(layers)
}

impl Space {
    /// Invoke `f` for every shape containing `point`.
    pub fn point_query(
        &self,
        point: Vec2,
        layers: Layers,
        group: Group,
        mut f: impl FnMut(&Shape),
    ) {
        self.index.point_query(point, |sid| {
            let shape = self.shape(sid);
            if !filter_reject(shape, layers, group) && shape.contains_point(point) {
                f(shape);
            }
        });
    }

    /// First shape found containing `point` (sensors excluded).
    pub fn point_query_first(&self, point: Vec2, layers: Layers, group: Group) -> Option<ShapeId> {
        let mut found = None;
        self.point_query(point, layers, group, |shape| {
            if found.is_none() && !shape.sensor {
                found = Some(shape.id());
            }
        });
        found
    }

    /// Invoke `f` for every shape whose bounding box intersects `bb`.
    pub fn bb_query(&self, bb: &Bb, layers: Layers, group: Group, mut f: impl FnMut(&Shape)) {
        self.index.query(bb, |sid| {
            let shape = self.shape(sid);
            if !filter_reject(shape, layers, group) && shape.bb.intersects(bb) {
                f(shape);
            }
        });
    }

    /// Invoke `f(shape, t, normal)` for every shape the segment
    /// `start`–`end` passes through, in spatial-index traversal order.
    pub fn segment_query(
        &self,
        start: Vec2,
        end: Vec2,
        layers: Layers,
        group: Group,
        mut f: impl FnMut(&Shape, f64, Vec2),
    ) {
        self.index.segment_query(start, end, 1.0, |sid| {
            let shape = self.shape(sid);
            if !filter_reject(shape, layers, group) {
                if let Some(info) = shape.segment_query(start, end) {
                    f(shape, info.t, info.normal);
                }
            }
            1.0
        });
    }

    /// Nearest hit along the segment `start`–`end` (sensors excluded).
    pub fn segment_query_first(
        &self,
        start: Vec2,
        end: Vec2,
        layers: Layers,
        group: Group,
    ) -> Option<SegmentQueryInfo> {
        let mut best: Option<SegmentQueryInfo> = None;
        self.index.segment_query(start, end, 1.0, |sid| {
            let shape = self.shape(sid);
            if !filter_reject(shape, layers, group) && !shape.sensor {
                if let Some(info) = shape.segment_query(start, end) {
                    if best.map_or(true, |b| info.t < b.t) {
                        best = Some(info);
                    }
                }
            }
            best.map_or(1.0, |b| b.t)
        });
        best
    }

    /// Collide a caller-owned shape against everything in the space,
    /// invoking `f(hit_shape, contacts)` per touching shape. Contact
    /// normals always point away from the queried shape. Returns true
    /// if anything non-sensor touched.
    ///
    /// The query shape must have had [`Shape::update`] called for the
    /// pose to test at; it does not need to be added to the space.
    pub fn shape_query(&self, shape: &Shape, mut f: impl FnMut(&Shape, &[Contact])) -> bool {
        let mut any_collision = false;

        self.index.query(&shape.bb, |sid| {
            if sid == shape.id() {
                return;
            }
            let other = self.shape(sid);
            if (shape.group != Group::NONE && shape.group == other.group)
                || !shape.layers.intersects(other.layers)
            {
                return;
            }

            let contacts = if shape.collision_code() <= other.collision_code() {
                collide(shape, other)
            } else {
                let mut contacts = collide(other, shape);
                for con in &mut contacts {
                    con.normal = -con.normal;
                }
                contacts
            };

            if !contacts.is_empty() {
                any_collision |= !(shape.sensor || other.sensor);
                f(other, &contacts);
            }
        });

        any_collision
    }
}
