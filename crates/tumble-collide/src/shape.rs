//! The `Shape` wrapper: geometry plus identity, filtering, and material.

use tumble_math::{Bb, Vec2};
use tumble_types::{BodyId, CollisionType, Group, Layers, ShapeId};

use crate::circle::{circle_segment_query, Circle};
use crate::polygon::Poly;
use crate::segment::Segment;

/// Tagged shape geometry.
#[derive(Debug, Clone)]
pub enum ShapeKind {
    /// Circle.
    Circle(Circle),
    /// Rounded line segment.
    Segment(Segment),
    /// Convex polygon.
    Poly(Poly),
}

impl ShapeKind {
    /// Fixed ordering code used by the narrow phase: circle < segment
    /// < polygon. Pair routines only exist for `code(a) <= code(b)`.
    #[inline]
    pub fn collision_code(&self) -> u8 {
        match self {
            ShapeKind::Circle(_) => 0,
            ShapeKind::Segment(_) => 1,
            ShapeKind::Poly(_) => 2,
        }
    }
}

/// Result of a nearest-point query against a shape.
#[derive(Debug, Clone, Copy)]
pub struct PointQueryInfo {
    /// The shape queried.
    pub shape: ShapeId,
    /// Closest point on the shape's surface.
    pub point: Vec2,
    /// Signed distance to the surface (negative if inside).
    pub distance: f64,
}

/// Result of a segment (raycast) query against a shape.
#[derive(Debug, Clone, Copy)]
pub struct SegmentQueryInfo {
    /// The shape hit.
    pub shape: ShapeId,
    /// Normalized hit time along the query segment, in `[0, 1]`.
    pub t: f64,
    /// Surface normal at the hit point.
    pub normal: Vec2,
}

/// A collision shape attached to a body.
///
/// The cached bounding box (and the kind's cached world-space data) is
/// refreshed only by [`Shape::update`]; the owner calls it whenever the
/// body's position or rotation changes.
#[derive(Debug, Clone)]
pub struct Shape {
    id: ShapeId,
    body: BodyId,
    /// Geometry.
    pub kind: ShapeKind,
    /// Cached world-space bounding box.
    pub bb: Bb,
    /// Sensors detect collisions but generate no collision response.
    pub sensor: bool,
    /// Coefficient of restitution, combined multiplicatively per pair.
    pub elasticity: f64,
    /// Friction coefficient, combined multiplicatively per pair.
    pub friction: f64,
    /// Surface velocity (e.g. conveyor belts), used by the friction solver.
    pub surface_velocity: Vec2,
    /// Tag used to look up collision handlers.
    pub collision_type: CollisionType,
    /// Shapes in the same non-zero group never collide.
    pub group: Group,
    /// Shapes collide only if their layer masks overlap.
    pub layers: Layers,
}

impl Shape {
    /// Wrap geometry into a shape with default material and filtering.
    pub fn new(id: ShapeId, body: BodyId, kind: ShapeKind) -> Self {
        let bb = match &kind {
            ShapeKind::Circle(c) => Bb::for_circle(c.tc, c.radius),
            ShapeKind::Segment(s) => Bb::new(
                s.ta.x.min(s.tb.x) - s.radius,
                s.ta.y.min(s.tb.y) - s.radius,
                s.ta.x.max(s.tb.x) + s.radius,
                s.ta.y.max(s.tb.y) + s.radius,
            ),
            ShapeKind::Poly(p) => {
                let mut bb = Bb::for_point(p.t_verts[0]);
                for &v in &p.t_verts[1..] {
                    bb = bb.expand(v);
                }
                bb
            }
        };
        Self {
            id,
            body,
            kind,
            bb,
            sensor: false,
            elasticity: 0.0,
            friction: 0.0,
            surface_velocity: Vec2::ZERO,
            collision_type: CollisionType::default(),
            group: Group::NONE,
            layers: Layers::ALL,
        }
    }

    /// Circle shape helper.
    pub fn circle(id: ShapeId, body: BodyId, radius: f64, offset: Vec2) -> Self {
        Self::new(id, body, ShapeKind::Circle(Circle::new(offset, radius)))
    }

    /// Segment shape helper.
    pub fn segment(id: ShapeId, body: BodyId, a: Vec2, b: Vec2, radius: f64) -> Self {
        Self::new(id, body, ShapeKind::Segment(Segment::new(a, b, radius)))
    }

    /// This shape's id. Ids are monotonic within a space and never
    /// reused, which keeps contact feature hashes stable.
    #[inline]
    pub fn id(&self) -> ShapeId {
        self.id
    }

    /// The owning body.
    #[inline]
    pub fn body(&self) -> BodyId {
        self.body
    }

    /// Reassign the owning body (used when re-rooting shapes).
    pub fn set_body(&mut self, body: BodyId) {
        self.body = body;
    }

    /// Hash key for contact features derived from this shape.
    #[inline]
    pub fn hash_id(&self) -> u64 {
        self.id.0 as u64
    }

    /// Narrow-phase ordering code of this shape's kind.
    #[inline]
    pub fn collision_code(&self) -> u8 {
        self.kind.collision_code()
    }

    /// Recompute all cached world-space data for the body transform
    /// `(pos, rot)` — `rot` is the body's unit rotation vector.
    pub fn update(&mut self, pos: Vec2, rot: Vec2) {
        self.bb = match &mut self.kind {
            ShapeKind::Circle(c) => c.update(pos, rot),
            ShapeKind::Segment(s) => s.update(pos, rot),
            ShapeKind::Poly(p) => p.update(pos, rot),
        };
    }

    /// Nearest point on this shape to `p`.
    pub fn nearest_point_query(&self, p: Vec2) -> PointQueryInfo {
        let (point, distance) = match &self.kind {
            ShapeKind::Circle(c) => c.nearest_point(p),
            ShapeKind::Segment(s) => s.nearest_point(p),
            ShapeKind::Poly(poly) => poly.nearest_point(p),
        };
        PointQueryInfo {
            shape: self.id,
            point,
            distance,
        }
    }

    /// Returns true if `p` is inside this shape.
    pub fn contains_point(&self, p: Vec2) -> bool {
        self.nearest_point_query(p).distance <= 0.0
    }

    /// First intersection of the query segment `a`–`b` with this shape.
    pub fn segment_query(&self, a: Vec2, b: Vec2) -> Option<SegmentQueryInfo> {
        let hit = match &self.kind {
            ShapeKind::Circle(c) => circle_segment_query(c.tc, c.radius, a, b),
            ShapeKind::Segment(s) => s.segment_query(a, b),
            ShapeKind::Poly(p) => p.segment_query(a, b),
        };
        hit.map(|(t, normal)| SegmentQueryInfo {
            shape: self.id,
            t,
            normal,
        })
    }
}
