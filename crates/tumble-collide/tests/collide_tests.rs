//! Integration tests for tumble-collide.

use tumble_collide::circle::{area_for_circle, moment_for_circle};
use tumble_collide::polygon::{
    area_for_poly, centroid_for_poly, moment_for_box, moment_for_poly, Poly,
};
use tumble_collide::segment::{moment_for_segment, Segment};
use tumble_collide::shape::{Shape, ShapeKind};
use tumble_collide::{collide, Contact};
use tumble_math::Vec2;
use tumble_types::{BodyId, ShapeId};

const EPS: f64 = 1e-9;

fn circle_shape(id: u32, center: Vec2, radius: f64) -> Shape {
    let mut s = Shape::circle(ShapeId(id), BodyId(0), radius, Vec2::ZERO);
    s.update(center, Vec2::new(1.0, 0.0));
    s
}

fn segment_shape(id: u32, a: Vec2, b: Vec2, radius: f64) -> Shape {
    let mut s = Shape::segment(ShapeId(id), BodyId(0), a, b, radius);
    s.update(Vec2::ZERO, Vec2::new(1.0, 0.0));
    s
}

fn box_shape(id: u32, center: Vec2, w: f64, h: f64) -> Shape {
    let poly = Poly::new_box(w, h).unwrap();
    let mut s = Shape::new(ShapeId(id), BodyId(0), ShapeKind::Poly(poly));
    s.update(center, Vec2::new(1.0, 0.0));
    s
}

// ─── Circle × Circle ──────────────────────────────────────────

#[test]
fn circle_circle_overlap() {
    let a = circle_shape(1, Vec2::new(0.0, 0.0), 1.0);
    let b = circle_shape(2, Vec2::new(1.5, 0.0), 1.0);

    let contacts = collide(&a, &b);
    assert_eq!(contacts.len(), 1);
    let con = &contacts[0];
    assert!((con.dist - (-0.5)).abs() < EPS);
    assert!((con.normal - Vec2::new(1.0, 0.0)).length() < EPS);
    // Weighted split point: equal radii meet in the middle.
    assert!((con.point - Vec2::new(0.75, 0.0)).length() < EPS);
    assert_eq!(con.hash, 0);
}

#[test]
fn circle_circle_separated() {
    let a = circle_shape(1, Vec2::new(0.0, 0.0), 1.0);
    let b = circle_shape(2, Vec2::new(2.5, 0.0), 1.0);
    assert!(collide(&a, &b).is_empty());
}

#[test]
fn circle_circle_touching_is_not_contact() {
    // dist == r1 + r2 exactly: the strict comparison rejects it.
    let a = circle_shape(1, Vec2::new(0.0, 0.0), 1.0);
    let b = circle_shape(2, Vec2::new(2.0, 0.0), 1.0);
    assert!(collide(&a, &b).is_empty());
}

#[test]
fn circle_circle_coincident_uses_fallback_normal() {
    let a = circle_shape(1, Vec2::new(0.0, 0.0), 1.0);
    let b = circle_shape(2, Vec2::new(0.0, 0.0), 1.0);
    let contacts = collide(&a, &b);
    assert_eq!(contacts.len(), 1);
    assert_eq!(contacts[0].normal, Vec2::new(1.0, 0.0));
    assert!((contacts[0].dist - (-2.0)).abs() < EPS);
}

// ─── Circle × Segment ─────────────────────────────────────────

#[test]
fn circle_segment_face_contact() {
    let c = circle_shape(1, Vec2::new(0.0, 0.5), 1.0);
    let s = segment_shape(2, Vec2::new(-5.0, 0.0), Vec2::new(5.0, 0.0), 0.0);

    let contacts = collide(&c, &s);
    assert_eq!(contacts.len(), 1);
    let con = &contacts[0];
    assert!((con.dist - (-0.5)).abs() < EPS);
    // Normal points from the circle toward the segment.
    assert!((con.normal - Vec2::new(0.0, -1.0)).length() < EPS);
}

#[test]
fn circle_segment_misses_when_far() {
    let c = circle_shape(1, Vec2::new(0.0, 3.0), 1.0);
    let s = segment_shape(2, Vec2::new(-5.0, 0.0), Vec2::new(5.0, 0.0), 0.0);
    assert!(collide(&c, &s).is_empty());
}

#[test]
fn circle_segment_endpoint_rejected_by_chain_tangent() {
    // Circle past endpoint b of a chain segment. The next segment in the
    // chain continues to (10, 0), so the endpoint contact whose normal
    // points along the chain must be rejected.
    let c = circle_shape(1, Vec2::new(5.5, 0.0), 1.0);

    let mut seg = Segment::new(Vec2::new(-5.0, 0.0), Vec2::new(5.0, 0.0), 0.0);
    seg.set_neighbors(Vec2::new(-10.0, 0.0), Vec2::new(10.0, 0.0));
    let mut s = Shape::new(ShapeId(2), BodyId(0), ShapeKind::Segment(seg));
    s.update(Vec2::ZERO, Vec2::new(1.0, 0.0));

    assert!(collide(&c, &s).is_empty());

    // Without neighbor info the same configuration does produce the
    // endcap contact.
    let s_plain = segment_shape(3, Vec2::new(-5.0, 0.0), Vec2::new(5.0, 0.0), 0.0);
    assert_eq!(collide(&c, &s_plain).len(), 1);
}

// ─── Circle × Polygon ─────────────────────────────────────────

#[test]
fn circle_poly_face_contact() {
    let c = circle_shape(1, Vec2::new(0.0, 1.5), 1.0);
    let b = box_shape(2, Vec2::ZERO, 2.0, 2.0);

    let contacts = collide(&c, &b);
    assert_eq!(contacts.len(), 1);
    let con = &contacts[0];
    assert!((con.dist - (-0.5)).abs() < EPS);
    assert!((con.normal - Vec2::new(0.0, -1.0)).length() < EPS);
    assert!((con.point - Vec2::new(0.0, 0.75)).length() < EPS);
}

#[test]
fn circle_poly_separated_by_corner_distance() {
    // SAT alone would call this overlapping; the corner test must not.
    let c = circle_shape(1, Vec2::new(1.8, 1.8), 1.0);
    let b = box_shape(2, Vec2::ZERO, 2.0, 2.0);
    assert!(collide(&c, &b).is_empty());
}

#[test]
fn circle_poly_vertex_contact() {
    let c = circle_shape(1, Vec2::new(1.5, 1.5), 1.0);
    let b = box_shape(2, Vec2::ZERO, 2.0, 2.0);

    let contacts = collide(&c, &b);
    assert_eq!(contacts.len(), 1);
    // Distance from (1.5,1.5) to corner (1,1) is sqrt(0.5) ≈ 0.707.
    let expected = 0.5_f64.sqrt() - 1.0;
    assert!((contacts[0].dist - expected).abs() < EPS);
}

// ─── Polygon × Polygon ────────────────────────────────────────

#[test]
fn poly_poly_overlapping_boxes() {
    let a = box_shape(1, Vec2::ZERO, 2.0, 2.0);
    let b = box_shape(2, Vec2::new(1.5, 0.0), 2.0, 2.0);

    let contacts = collide(&a, &b);
    assert_eq!(contacts.len(), 4);
    for con in &contacts {
        assert!((con.dist - (-0.5)).abs() < EPS);
        assert!((con.normal - Vec2::new(1.0, 0.0)).length() < EPS);
    }
}

#[test]
fn poly_poly_separated() {
    let a = box_shape(1, Vec2::ZERO, 2.0, 2.0);
    let b = box_shape(2, Vec2::new(3.0, 0.0), 2.0, 2.0);
    assert!(collide(&a, &b).is_empty());
}

#[test]
fn poly_poly_contact_hashes_are_stable() {
    // Same pair at the same relative pose twice: identical hash sets.
    let hashes = || {
        let a = box_shape(1, Vec2::ZERO, 2.0, 2.0);
        let b = box_shape(2, Vec2::new(1.5, 0.5), 2.0, 2.0);
        let mut h: Vec<u64> = collide(&a, &b).iter().map(|c| c.hash).collect();
        h.sort_unstable();
        h
    };
    let first = hashes();
    assert!(!first.is_empty());
    assert_eq!(first, hashes());

    // Hashes must be distinct per feature so impulse matching can't
    // cross wires within one manifold.
    let mut dedup = first.clone();
    dedup.dedup();
    assert_eq!(dedup, first);
}

// ─── Segment × Polygon ────────────────────────────────────────

#[test]
fn segment_poly_box_resting_on_segment() {
    let s = segment_shape(1, Vec2::new(-5.0, 0.0), Vec2::new(5.0, 0.0), 0.0);
    let b = box_shape(2, Vec2::new(0.0, 0.9), 2.0, 2.0);

    let contacts = collide(&s, &b);
    assert_eq!(contacts.len(), 2);
    for con in &contacts {
        assert!((con.dist - (-0.1)).abs() < EPS);
        // Normal points from the segment up into the box.
        assert!((con.normal - Vec2::new(0.0, 1.0)).length() < EPS);
        assert!(con.hash != 0);
    }
}

#[test]
fn segment_poly_separated() {
    let s = segment_shape(1, Vec2::new(-5.0, 0.0), Vec2::new(5.0, 0.0), 0.0);
    let b = box_shape(2, Vec2::new(0.0, 3.0), 2.0, 2.0);
    assert!(collide(&s, &b).is_empty());
}

#[test]
fn segment_segment_is_unhandled() {
    let a = segment_shape(1, Vec2::new(-1.0, 0.0), Vec2::new(1.0, 0.0), 0.5);
    let b = segment_shape(2, Vec2::new(0.0, -1.0), Vec2::new(0.0, 1.0), 0.5);
    assert!(collide(&a, &b).is_empty());
}

// ─── Shape Queries ────────────────────────────────────────────

#[test]
fn shape_bb_updates_with_transform() {
    let mut s = Shape::circle(ShapeId(1), BodyId(0), 0.5, Vec2::new(1.0, 0.0));
    s.update(Vec2::new(2.0, 3.0), Vec2::new(1.0, 0.0));
    assert!((s.bb.l - 2.5).abs() < EPS);
    assert!((s.bb.r - 3.5).abs() < EPS);

    // Quarter turn moves the offset onto the y axis.
    s.update(Vec2::new(2.0, 3.0), Vec2::new(0.0, 1.0));
    assert!((s.bb.b - 3.5).abs() < EPS);
    assert!((s.bb.t - 4.5).abs() < EPS);
}

#[test]
fn nearest_point_on_circle() {
    let s = circle_shape(1, Vec2::new(0.0, 0.0), 1.0);
    let info = s.nearest_point_query(Vec2::new(3.0, 0.0));
    assert!((info.distance - 2.0).abs() < EPS);
    assert!((info.point - Vec2::new(1.0, 0.0)).length() < EPS);
    assert!(!s.contains_point(Vec2::new(3.0, 0.0)));
    assert!(s.contains_point(Vec2::new(0.5, 0.0)));
}

#[test]
fn nearest_point_inside_poly_is_negative() {
    let b = box_shape(1, Vec2::ZERO, 2.0, 2.0);
    let info = b.nearest_point_query(Vec2::new(0.5, 0.0));
    assert!(info.distance < 0.0);
    assert!((info.distance - (-0.5)).abs() < EPS);
}

#[test]
fn segment_query_against_circle() {
    let s = circle_shape(1, Vec2::new(5.0, 0.0), 1.0);
    let info = s
        .segment_query(Vec2::new(0.0, 0.0), Vec2::new(10.0, 0.0))
        .unwrap();
    assert!((info.t - 0.4).abs() < EPS);
    assert!((info.normal - Vec2::new(-1.0, 0.0)).length() < EPS);
}

#[test]
fn segment_query_against_poly() {
    let b = box_shape(1, Vec2::new(5.0, 0.0), 2.0, 2.0);
    let info = b
        .segment_query(Vec2::new(0.0, 0.0), Vec2::new(10.0, 0.0))
        .unwrap();
    assert!((info.t - 0.4).abs() < EPS);
    assert!((info.normal - Vec2::new(-1.0, 0.0)).length() < EPS);

    assert!(b
        .segment_query(Vec2::new(0.0, 5.0), Vec2::new(10.0, 5.0))
        .is_none());
}

#[test]
fn segment_query_against_segment_shape() {
    let s = segment_shape(1, Vec2::new(-5.0, 1.0), Vec2::new(5.0, 1.0), 0.0);
    let info = s
        .segment_query(Vec2::new(0.0, 0.0), Vec2::new(0.0, 2.0))
        .unwrap();
    assert!((info.t - 0.5).abs() < EPS);
}

// ─── Polygon Validation ───────────────────────────────────────

#[test]
fn poly_rejects_too_few_vertices() {
    assert!(Poly::new(&[Vec2::ZERO, Vec2::new(1.0, 0.0)], Vec2::ZERO).is_err());
}

#[test]
fn poly_rejects_counterclockwise_winding() {
    // Counter-clockwise square.
    let verts = [
        Vec2::new(-1.0, -1.0),
        Vec2::new(1.0, -1.0),
        Vec2::new(1.0, 1.0),
        Vec2::new(-1.0, 1.0),
    ];
    assert!(Poly::new(&verts, Vec2::ZERO).is_err());
}

// ─── Mass Properties ──────────────────────────────────────────

#[test]
fn moment_helpers_agree_for_boxes() {
    let poly = [
        Vec2::new(-1.0, -0.5),
        Vec2::new(-1.0, 0.5),
        Vec2::new(1.0, 0.5),
        Vec2::new(1.0, -0.5),
    ];
    let from_poly = moment_for_poly(3.0, &poly, Vec2::ZERO);
    let from_box = moment_for_box(3.0, 2.0, 1.0);
    assert!((from_poly - from_box).abs() < 1e-9);
}

#[test]
fn moment_for_circle_matches_disc_formula() {
    // Solid disc: I = m r² / 2.
    assert!((moment_for_circle(2.0, 0.0, 3.0, Vec2::ZERO) - 9.0).abs() < EPS);
    // Parallel-axis offset term.
    let offset = Vec2::new(2.0, 0.0);
    assert!((moment_for_circle(2.0, 0.0, 3.0, offset) - (9.0 + 8.0)).abs() < EPS);
}

#[test]
fn moment_for_segment_matches_rod_formula() {
    // Centered rod of length L: I = m L² / 12.
    let a = Vec2::new(-2.0, 0.0);
    let b = Vec2::new(2.0, 0.0);
    assert!((moment_for_segment(3.0, a, b) - 3.0 * 16.0 / 12.0).abs() < EPS);
}

#[test]
fn poly_area_and_centroid() {
    let verts = [
        Vec2::new(0.0, 0.0),
        Vec2::new(0.0, 2.0),
        Vec2::new(4.0, 2.0),
        Vec2::new(4.0, 0.0),
    ];
    assert!((area_for_poly(&verts) - 8.0).abs() < EPS);
    assert!((centroid_for_poly(&verts) - Vec2::new(2.0, 1.0)).length() < EPS);
    assert!((area_for_circle(2.0, 0.0) - std::f64::consts::PI * 4.0).abs() < EPS);
}

#[test]
fn contact_serializes() {
    let con = Contact::new(Vec2::new(1.0, 2.0), Vec2::new(0.0, 1.0), -0.25);
    let json = serde_json::to_string(&con).unwrap();
    let back: Contact = serde_json::from_str(&json).unwrap();
    assert_eq!(back.dist, con.dist);
    assert_eq!(back.hash, 0);
}
