//! Narrow-phase collision dispatch.
//!
//! [`collide`] maps an ordered pair of shapes to a contact manifold.
//! Callers must present the pair with `collision_code(a) <=
//! collision_code(b)` (circle < segment < polygon) and negate normals
//! themselves if they swapped; that keeps every pair routine
//! one-directional.

use tumble_math::vec::cross;
use tumble_math::Vec2;
use tumble_types::constants::hash_pair;

use crate::circle::Circle;
use crate::contact::Contact;
use crate::polygon::Poly;
use crate::segment::Segment;
use crate::shape::{Shape, ShapeKind};

/// Generate the contact manifold for an ordered shape pair.
///
/// Contact normals point from `a` toward `b`'s interior direction as
/// each routine defines it; `dist` is negative where the shapes
/// overlap. Unhandled pairs (segment×segment) produce no contacts.
///
/// # Panics
/// Debug-asserts the type-ordering precondition.
pub fn collide(a: &Shape, b: &Shape) -> Vec<Contact> {
    debug_assert!(
        a.collision_code() <= b.collision_code(),
        "collide() requires shapes ordered by collision code"
    );

    match (&a.kind, &b.kind) {
        (ShapeKind::Circle(c1), ShapeKind::Circle(c2)) => circle_to_circle(c1, c2),
        (ShapeKind::Circle(c), ShapeKind::Segment(s)) => circle_to_segment(c, s),
        (ShapeKind::Circle(c), ShapeKind::Poly(p)) => circle_to_poly(c, p),
        (ShapeKind::Segment(s), ShapeKind::Poly(p)) => segment_to_poly(s, p, a.hash_id(), b.hash_id()),
        (ShapeKind::Poly(p1), ShapeKind::Poly(p2)) => poly_to_poly(p1, p2, a.hash_id(), b.hash_id()),
        (ShapeKind::Segment(_), ShapeKind::Segment(_)) => Vec::new(),
        _ => unreachable!("shape pair out of collision-code order"),
    }
}

/// Core circle-vs-circle test shared by several routines.
///
/// The contact point splits the center line proportionally to the
/// radii; the normal is the center-to-center direction, falling back to
/// the unit x-axis when the centers coincide.
fn circle_to_circle_query(p1: Vec2, p2: Vec2, r1: f64, r2: f64, hash: u64) -> Option<Contact> {
    let min_dist = r1 + r2;
    let delta = p2 - p1;
    let dist_sq = delta.length_squared();
    if dist_sq >= min_dist * min_dist {
        return None;
    }

    let dist = dist_sq.sqrt();
    let normal = if dist > 0.0 {
        delta / dist
    } else {
        Vec2::new(1.0, 0.0)
    };
    Some(Contact {
        point: p1.lerp(p2, r1 / (r1 + r2)),
        normal,
        dist: dist - min_dist,
        hash,
    })
}

fn circle_to_circle(c1: &Circle, c2: &Circle) -> Vec<Contact> {
    circle_to_circle_query(c1.tc, c2.tc, c1.radius, c2.radius, 0)
        .into_iter()
        .collect()
}

fn circle_to_segment(circle: &Circle, segment: &Segment) -> Vec<Contact> {
    let seg_delta = segment.tb - segment.ta;
    let closest_t =
        (seg_delta.dot(circle.tc - segment.ta) / seg_delta.length_squared()).clamp(0.0, 1.0);
    let closest = segment.ta + seg_delta * closest_t;

    match circle_to_circle_query(circle.tc, closest, circle.radius, segment.radius, 0) {
        Some(con) => {
            let n = con.normal;
            // Reject endcap contacts pointing outward of a smooth chain.
            if (closest_t == 0.0 && n.dot(segment.ta_tangent) < 0.0)
                || (closest_t == 1.0 && n.dot(segment.tb_tangent) < 0.0)
            {
                Vec::new()
            } else {
                vec![con]
            }
        }
        None => Vec::new(),
    }
}

fn circle_to_poly(circle: &Circle, poly: &Poly) -> Vec<Contact> {
    let planes = &poly.t_planes;
    let count = poly.count();

    // Find the supporting plane: max signed distance minus the radius.
    let mut mini = 0;
    let mut min = planes[0].compare(circle.tc) - circle.radius;
    for (i, plane) in planes.iter().enumerate() {
        let dist = plane.compare(circle.tc) - circle.radius;
        if dist > 0.0 {
            return Vec::new(); // separating axis found
        } else if dist > min {
            min = dist;
            mini = i;
        }
    }

    let n = planes[mini].n;
    let a = poly.t_verts[mini];
    let b = poly.t_verts[(mini + 1) % count];
    let dta = cross(n, a);
    let dtb = cross(n, b);
    let dt = cross(n, circle.tc);

    if dt < dtb {
        // Beyond endpoint b: vertex contact.
        circle_to_circle_query(circle.tc, b, circle.radius, 0.0, 0)
            .into_iter()
            .collect()
    } else if dt < dta {
        // Face contact against the supporting edge.
        vec![Contact::new(
            circle.tc - n * (circle.radius + min / 2.0),
            -n,
            min,
        )]
    } else {
        // Beyond endpoint a: vertex contact.
        circle_to_circle_query(circle.tc, a, circle.radius, 0.0, 0)
            .into_iter()
            .collect()
    }
}

/// Minimum distance of the segment's two (radius-inset) endpoints along
/// axis `(n, d)`.
fn segment_value_on_axis(seg: &Segment, n: Vec2, d: f64) -> f64 {
    let a = n.dot(seg.ta) - seg.radius;
    let b = n.dot(seg.tb) - seg.radius;
    a.min(b) - d
}

/// Collect polygon vertices lying behind the segment's face, clipped to
/// the segment's finite extent by cross-product range tests.
fn points_behind_segment(
    contacts: &mut Vec<Contact>,
    seg: &Segment,
    poly: &Poly,
    p_dist: f64,
    coef: f64,
    poly_hash: u64,
) {
    let dta = cross(seg.tn, seg.ta);
    let dtb = cross(seg.tn, seg.tb);
    let n = seg.tn * coef;

    for (i, &v) in poly.t_verts.iter().enumerate() {
        if v.dot(n) < seg.tn.dot(seg.ta) * coef + seg.radius {
            let dt = cross(seg.tn, v);
            if dta >= dt && dt >= dtb {
                contacts.push(Contact {
                    point: v,
                    normal: n,
                    dist: p_dist,
                    hash: hash_pair(poly_hash, i as u64),
                });
            }
        }
    }
}

fn segment_to_poly(seg: &Segment, poly: &Poly, seg_hash: u64, poly_hash: u64) -> Vec<Contact> {
    let planes = &poly.t_planes;

    let seg_d = seg.tn.dot(seg.ta);
    let min_norm = poly.value_on_axis(seg.tn, seg_d) - seg.radius;
    let min_neg = poly.value_on_axis(-seg.tn, -seg_d) - seg.radius;
    if min_neg > 0.0 || min_norm > 0.0 {
        return Vec::new();
    }

    // Most-penetrated polygon face relative to the segment.
    let mut mini = 0;
    let mut poly_min = segment_value_on_axis(seg, planes[0].n, planes[0].d);
    if poly_min > 0.0 {
        return Vec::new();
    }
    for (i, plane) in planes.iter().enumerate() {
        let dist = segment_value_on_axis(seg, plane.n, plane.d);
        if dist > 0.0 {
            return Vec::new();
        } else if dist > poly_min {
            poly_min = dist;
            mini = i;
        }
    }

    let mut contacts = Vec::new();
    let poly_n = -planes[mini].n;

    let va = seg.ta + poly_n * seg.radius;
    let vb = seg.tb + poly_n * seg.radius;
    if poly.contains_vert(va) {
        contacts.push(Contact {
            point: va,
            normal: poly_n,
            dist: poly_min,
            hash: hash_pair(seg_hash, 0),
        });
    }
    if poly.contains_vert(vb) {
        contacts.push(Contact {
            point: vb,
            normal: poly_n,
            dist: poly_min,
            hash: hash_pair(seg_hash, 1),
        });
    }

    if min_norm >= poly_min || min_neg >= poly_min {
        if min_norm > min_neg {
            points_behind_segment(&mut contacts, seg, poly, min_norm, 1.0, poly_hash);
        } else {
            points_behind_segment(&mut contacts, seg, poly, min_neg, -1.0, poly_hash);
        }
    }

    // If no contact points were found, try colliding the endpoints.
    if contacts.is_empty() {
        let count = poly.count();
        let poly_a = poly.t_verts[mini];
        let poly_b = poly.t_verts[(mini + 1) % count];

        for (seg_end, poly_vert) in [
            (seg.ta, poly_a),
            (seg.tb, poly_a),
            (seg.ta, poly_b),
            (seg.tb, poly_b),
        ] {
            if let Some(con) = circle_to_circle_query(seg_end, poly_vert, seg.radius, 0.0, 0) {
                return vec![con];
            }
        }
    }

    contacts
}

/// Find the polygon's minimum separating axis against `planes`.
/// Returns `None` if a separating axis exists.
fn find_min_separating_axis(poly: &Poly, planes: &[crate::polygon::Plane]) -> Option<(usize, f64)> {
    let mut min_index = 0;
    let mut min = poly.value_on_axis(planes[0].n, planes[0].d);
    if min > 0.0 {
        return None;
    }

    for (i, plane) in planes.iter().enumerate().skip(1) {
        let dist = poly.value_on_axis(plane.n, plane.d);
        if dist > 0.0 {
            return None;
        } else if dist > min {
            min = dist;
            min_index = i;
        }
    }

    Some((min_index, min))
}

/// Collect vertices of each polygon contained in the other, keyed by
/// stable (shape, vertex-index) hashes.
fn find_verts(
    poly1: &Poly,
    poly2: &Poly,
    n: Vec2,
    dist: f64,
    hash1: u64,
    hash2: u64,
) -> Vec<Contact> {
    let mut contacts = Vec::new();

    for (i, &v) in poly1.t_verts.iter().enumerate() {
        if poly2.contains_vert(v) {
            contacts.push(Contact {
                point: v,
                normal: n,
                dist,
                hash: hash_pair(hash1, i as u64),
            });
        }
    }
    for (i, &v) in poly2.t_verts.iter().enumerate() {
        if poly1.contains_vert(v) {
            contacts.push(Contact {
                point: v,
                normal: n,
                dist,
                hash: hash_pair(hash2, i as u64),
            });
        }
    }

    if contacts.is_empty() {
        find_verts_fallback(poly1, poly2, n, dist, hash1, hash2)
    } else {
        contacts
    }
}

/// Degenerate-overlap fallback ("star of david" configurations): no
/// vertex of either polygon is strictly inside the other, yet the SAT
/// says they overlap. Relax containment to the feature-compatible
/// planes only.
fn find_verts_fallback(
    poly1: &Poly,
    poly2: &Poly,
    n: Vec2,
    dist: f64,
    hash1: u64,
    hash2: u64,
) -> Vec<Contact> {
    let mut contacts = Vec::new();

    for (i, &v) in poly1.t_verts.iter().enumerate() {
        if poly2.contains_vert_partial(v, -n) {
            contacts.push(Contact {
                point: v,
                normal: n,
                dist,
                hash: hash_pair(hash1, i as u64),
            });
        }
    }
    for (i, &v) in poly2.t_verts.iter().enumerate() {
        if poly1.contains_vert_partial(v, n) {
            contacts.push(Contact {
                point: v,
                normal: n,
                dist,
                hash: hash_pair(hash2, i as u64),
            });
        }
    }

    contacts
}

fn poly_to_poly(poly1: &Poly, poly2: &Poly, hash1: u64, hash2: u64) -> Vec<Contact> {
    let Some((mini1, min1)) = find_min_separating_axis(poly2, &poly1.t_planes) else {
        return Vec::new();
    };
    let Some((mini2, min2)) = find_min_separating_axis(poly1, &poly2.t_planes) else {
        return Vec::new();
    };

    // Penetrating: push along the axis of least penetration.
    if min1 > min2 {
        find_verts(poly1, poly2, poly1.t_planes[mini1].n, min1, hash1, hash2)
    } else {
        find_verts(poly1, poly2, -poly2.t_planes[mini2].n, min2, hash1, hash2)
    }
}
