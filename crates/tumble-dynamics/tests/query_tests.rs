//! Integration tests for the space query API.

use tumble_collide::circle::moment_for_circle;
use tumble_collide::{Shape, ShapeKind};
use tumble_dynamics::{Body, Space};
use tumble_math::{Bb, Vec2};
use tumble_types::{BodyId, Group, Layers, ShapeId};

fn world() -> (Space, ShapeId, ShapeId, ShapeId) {
    let mut space = Space::new();

    let ground = space.static_body();
    let seg = space.add_segment(ground, Vec2::new(-10.0, 0.0), Vec2::new(10.0, 0.0), 0.1);

    let mut a = Body::new(1.0, moment_for_circle(1.0, 0.0, 1.0, Vec2::ZERO));
    a.p = Vec2::new(0.0, 3.0);
    let a = space.add_body(a);
    let ca = space.add_circle(a, 1.0, Vec2::ZERO);

    let mut b = Body::new(1.0, moment_for_circle(1.0, 0.0, 1.0, Vec2::ZERO));
    b.p = Vec2::new(6.0, 3.0);
    let b = space.add_body(b);
    let cb = space.add_circle(b, 1.0, Vec2::ZERO);

    (space, seg, ca, cb)
}

#[test]
fn point_query_finds_containing_shapes() {
    let (space, _seg, ca, _cb) = world();

    let mut hits = Vec::new();
    space.point_query(Vec2::new(0.0, 3.5), Layers::ALL, Group::NONE, |shape| {
        hits.push(shape.id());
    });
    assert_eq!(hits, vec![ca]);

    assert_eq!(
        space.point_query_first(Vec2::new(0.0, 3.5), Layers::ALL, Group::NONE),
        Some(ca)
    );
    assert_eq!(
        space.point_query_first(Vec2::new(0.0, 10.0), Layers::ALL, Group::NONE),
        None
    );
}

#[test]
fn point_query_respects_layers_and_groups() {
    let (mut space, _seg, ca, _cb) = world();
    space.shape_mut(ca).layers = Layers(0b0010);

    // Disjoint query layers miss the shape.
    assert_eq!(
        space.point_query_first(Vec2::new(0.0, 3.5), Layers(0b0100), Group::NONE),
        None
    );
    // Shared layer hits it.
    assert_eq!(
        space.point_query_first(Vec2::new(0.0, 3.5), Layers(0b0010), Group::NONE),
        Some(ca)
    );

    // Group exclusion.
    space.shape_mut(ca).group = Group(7);
    assert_eq!(
        space.point_query_first(Vec2::new(0.0, 3.5), Layers::ALL, Group(7)),
        None
    );
}

#[test]
fn bb_query_enumerates_overlapping_boxes() {
    let (space, seg, ca, cb) = world();

    let mut hits = Vec::new();
    space.bb_query(
        &Bb::new(-20.0, -1.0, 20.0, 5.0),
        Layers::ALL,
        Group::NONE,
        |shape| hits.push(shape.id()),
    );
    hits.sort();
    assert_eq!(hits, vec![seg, ca, cb]);

    let mut hits = Vec::new();
    space.bb_query(
        &Bb::new(4.0, 2.0, 8.0, 4.0),
        Layers::ALL,
        Group::NONE,
        |shape| hits.push(shape.id()),
    );
    assert_eq!(hits, vec![cb]);
}

#[test]
fn segment_query_first_returns_nearest_hit() {
    let (space, _seg, ca, _cb) = world();

    // Ray from the left at circle height: hits circle A first.
    let info = space
        .segment_query_first(Vec2::new(-10.0, 3.0), Vec2::new(10.0, 3.0), Layers::ALL, Group::NONE)
        .expect("ray should hit");
    assert_eq!(info.shape, ca);
    // Entry point at x = -1 → t = 9/20.
    assert!((info.t - 0.45).abs() < 1e-9);
    assert!((info.normal - Vec2::new(-1.0, 0.0)).length() < 1e-9);

    // Straight down through everything: the segment floor is hit too.
    let mut hits = Vec::new();
    space.segment_query(
        Vec2::new(0.0, 5.0),
        Vec2::new(0.0, -1.0),
        Layers::ALL,
        Group::NONE,
        |shape, _t, _n| hits.push(shape.id()),
    );
    assert_eq!(hits.len(), 2, "ray should pierce the circle and the floor");
}

#[test]
fn shape_query_reports_contacts_with_outward_normals() {
    let (space, _seg, ca, _cb) = world();

    // A probe circle overlapping circle A from the left.
    let mut probe = Shape::new(
        ShapeId(u32::MAX),
        BodyId(u32::MAX),
        ShapeKind::Circle(tumble_collide::Circle::new(Vec2::ZERO, 1.0)),
    );
    probe.update(Vec2::new(-1.5, 3.0), Vec2::new(1.0, 0.0));

    let mut hits = Vec::new();
    let touching = space.shape_query(&probe, |shape, contacts| {
        hits.push((shape.id(), contacts[0].normal));
    });

    assert!(touching);
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].0, ca);
    // Normal points from the probe toward the hit shape.
    assert!((hits[0].1 - Vec2::new(1.0, 0.0)).length() < 1e-9);
}

#[test]
fn reindex_static_tracks_moved_static_shapes() {
    let mut space = Space::new();

    let mut platform = Body::new_static();
    platform.p = Vec2::new(0.0, 0.0);
    let platform = space.add_rogue_body(platform);
    let seg = space.add_segment(platform, Vec2::new(-2.0, 0.0), Vec2::new(2.0, 0.0), 0.1);

    assert!(space
        .point_query_first(Vec2::new(0.0, 0.0), Layers::ALL, Group::NONE)
        .is_some());

    // Teleport the platform; until a static reindex the query still
    // sees the stale pose.
    space.body_mut(platform).p = Vec2::new(0.0, 5.0);
    space.reindex_static();

    assert!(space
        .point_query_first(Vec2::new(0.0, 0.0), Layers::ALL, Group::NONE)
        .is_none());
    assert_eq!(
        space.point_query_first(Vec2::new(0.0, 5.0), Layers::ALL, Group::NONE),
        Some(seg)
    );
}
