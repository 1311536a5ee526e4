//! Collision Tests - SAT Detection and Symmetry
//!
//! Checks `find_collision` across a spread of convex shapes, offsets and
//! rotations: argument order must never change whether two shapes overlap,
//! and swapping the arguments reverses the axis exactly.

use std::f64::consts::PI;

use polyarcade_engine::physics::{Polygon, VEC_TOLERANCE, VecExt, Vector2, find_collision};

fn shapes() -> Vec<Polygon> {
    vec![
        Polygon::rect(2.0, 2.0),
        Polygon::rect(6.0, 1.0),
        Polygon::regular(1.5, 3),
        Polygon::regular(1.0, 5),
        Polygon::regular(2.0, 32),
        Polygon::ellipse(3.0, 1.0, 24),
        Polygon::sector(2.0, PI / 3.0, PI / 3.0, 8),
    ]
}

fn placed(shape: &Polygon, offset: Vector2, angle: f64) -> Polygon {
    let mut shape = shape.clone();
    let centroid = shape.centroid();
    shape.rotate(angle, centroid);
    shape.translate(offset - centroid);
    shape
}

/// Centroid offsets for the second shape. Zero is left out: coincident
/// centroids leave the axis direction undefined.
fn offsets() -> Vec<Vector2> {
    let mut out = Vec::new();
    for ring in [0.5, 1.7, 2.9, 5.0] {
        for k in 0..8 {
            let angle = k as f64 * PI / 4.0 + 0.1;
            out.push(Vector2::new(angle.cos(), angle.sin()) * ring);
        }
    }
    out
}

// ============================================================================
// Overlap Symmetry
// ============================================================================

#[test]
fn test_overlap_symmetric_across_shape_pairs() {
    let shapes = shapes();
    let mut collisions = 0;
    let mut misses = 0;

    for a in &shapes {
        for b in &shapes {
            for offset in offsets() {
                for angle in [0.0, 0.3, PI / 2.0] {
                    let first = placed(a, Vector2::ZERO, 0.0);
                    let second = placed(b, offset, angle);

                    let forward = find_collision(&first, &second);
                    let backward = find_collision(&second, &first);

                    assert_eq!(forward.collided, backward.collided);
                    if forward.collided {
                        collisions += 1;
                        assert!(
                            forward.axis.is_close(-backward.axis, VEC_TOLERANCE),
                            "axis {} vs reversed {}",
                            forward.axis,
                            -backward.axis
                        );
                        assert!((forward.axis.length() - 1.0).abs() < 1e-9);
                        assert!(forward.overlap > 0.0);
                    } else {
                        misses += 1;
                    }
                }
            }
        }
    }

    // The grid must exercise both outcomes
    assert!(collisions > 0);
    assert!(misses > 0);
}

#[test]
fn test_axis_points_from_first_toward_second() {
    let shapes = shapes();
    for a in &shapes {
        for b in &shapes {
            for offset in offsets() {
                let first = placed(a, Vector2::ZERO, 0.0);
                let second = placed(b, offset, 0.0);
                let info = find_collision(&first, &second);
                if info.collided {
                    let between = second.centroid() - first.centroid();
                    assert!(info.axis.dot(between) >= 0.0);
                }
            }
        }
    }
}

// ============================================================================
// Edge Cases
// ============================================================================

#[test]
fn test_aligned_boxes_tie_break_is_order_independent() {
    // Equal overlap on x and y
    let a = Polygon::rect(2.0, 2.0);
    let b = placed(&a, Vector2::new(1.5, 1.5), 0.0);

    let forward = find_collision(&a, &b);
    let backward = find_collision(&b, &a);
    assert!(forward.collided);
    assert!(forward.axis.is_close(-backward.axis, VEC_TOLERANCE));
    assert!((forward.overlap - 0.5).abs() < 1e-9);
}

#[test]
fn test_touching_edges_do_not_collide() {
    let a = Polygon::rect(2.0, 2.0);
    let b = placed(&a, Vector2::new(2.0, 0.0), 0.0);
    assert!(!find_collision(&a, &b).collided);
}

#[test]
fn test_far_apart_reports_zero_axis() {
    let a = Polygon::regular(1.0, 12);
    let b = placed(&a, Vector2::new(100.0, -40.0), 0.0);
    let info = find_collision(&a, &b);
    assert!(!info.collided);
    assert_eq!(info.axis, Vector2::ZERO);
    assert_eq!(info.overlap, 0.0);
}

#[test]
fn test_contained_shape_collides() {
    let big = Polygon::regular(10.0, 32);
    let small = placed(&Polygon::rect(1.0, 1.0), Vector2::new(2.0, 1.0), 0.4);
    assert!(find_collision(&big, &small).collided);
    assert!(find_collision(&small, &big).collided);
}
