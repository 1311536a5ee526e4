//! Collision detection module
//!
//! Separating-axis test (SAT) for convex polygons.
//!
//! # Algorithm
//!
//! Every edge of both polygons contributes its outward normal as a
//! candidate axis. Both polygons are projected onto each axis; disjoint
//! intervals on any axis prove the polygons apart (early exit). When every
//! axis overlaps, the polygons intersect and the collision axis is the
//! candidate with the smallest overlap, oriented from the first polygon's
//! centroid toward the second's.
//!
//! # Tie-break
//!
//! Candidates whose overlap lies within [`AXIS_TIE_EPSILON`] of the minimum
//! are compared by canonical direction: the axis is flipped into the upper
//! half-plane (polar angle in `[0, PI)`) and the smallest angle wins. The
//! choice does not depend on argument order, so swapping the polygons
//! reverses the axis exactly, even for edge-aligned boxes.
//!
//! # Example
//!
//! ```ignore
//! use polyarcade_engine::physics::{Polygon, Vector2, find_collision};
//!
//! let a = Polygon::rect(2.0, 2.0);
//! let mut b = Polygon::rect(2.0, 2.0);
//! b.translate(Vector2::new(1.5, 0.0));
//!
//! let info = find_collision(&a, &b);
//! assert!(info.collided);
//! assert_eq!(info.axis, Vector2::X);
//! ```

use super::polygon::Polygon;
use super::types::Vector2;

/// Overlaps closer than this to the minimum count as ties.
pub const AXIS_TIE_EPSILON: f64 = 1e-9;

/// Result of a SAT query between two polygons.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionInfo {
    /// Whether the polygons overlap
    pub collided: bool,
    /// Unit collision axis pointing from the first polygon toward the second
    /// (zero when `collided` is false)
    pub axis: Vector2,
    /// Penetration depth along `axis` (zero when `collided` is false)
    pub overlap: f64,
}

impl CollisionInfo {
    /// No-collision result.
    pub fn none() -> Self {
        Self {
            collided: false,
            axis: Vector2::ZERO,
            overlap: 0.0,
        }
    }
}

/// Flip `axis` into the half-plane `angle in [0, PI)`.
fn canonical(axis: Vector2) -> Vector2 {
    if axis.y < 0.0 || (axis.y == 0.0 && axis.x < 0.0) {
        -axis
    } else {
        axis
    }
}

/// Test two convex polygons for overlap.
///
/// Both shapes must have at least three vertices. Touching polygons (zero
/// overlap) are reported as not colliding.
pub fn find_collision(first: &Polygon, second: &Polygon) -> CollisionInfo {
    debug_assert!(
        first.len() >= 3 && second.len() >= 3,
        "collision test needs polygons with at least 3 vertices"
    );

    // (overlap, canonical axis) for every candidate
    let mut candidates: Vec<(f64, Vector2)> = Vec::with_capacity(first.len() + second.len());

    for (start, end) in first.edges().chain(second.edges()) {
        let edge = end - start;
        if edge.length_squared() == 0.0 {
            continue;
        }
        let normal = Vector2::new(edge.y, -edge.x).normalize();

        let (min_a, max_a) = first.project(normal);
        let (min_b, max_b) = second.project(normal);
        let overlap = max_a.min(max_b) - min_a.max(min_b);
        if overlap <= 0.0 {
            return CollisionInfo::none();
        }
        candidates.push((overlap, canonical(normal)));
    }

    let Some(min_overlap) = candidates.iter().map(|(o, _)| *o).reduce(f64::min) else {
        return CollisionInfo::none();
    };

    let (overlap, axis) = candidates
        .iter()
        .filter(|(o, _)| *o - min_overlap <= AXIS_TIE_EPSILON)
        .min_by(|(_, a), (_, b)| a.y.atan2(a.x).total_cmp(&b.y.atan2(b.x)))
        .copied()
        .unwrap_or(candidates[0]);

    let toward_second = second.centroid() - first.centroid();
    let axis = if toward_second.dot(axis) < 0.0 { -axis } else { axis };

    CollisionInfo {
        collided: true,
        axis,
        overlap,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::types::{VEC_TOLERANCE, VecExt, within};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn square_at(x: f64, y: f64) -> Polygon {
        let mut square = Polygon::rect(2.0, 2.0);
        square.translate(Vector2::new(x, y));
        square
    }

    #[test]
    fn test_overlapping_squares_collide() {
        let info = find_collision(&square_at(0.0, 0.0), &square_at(1.5, 0.2));
        assert!(info.collided);
        assert!(info.axis.is_close(Vector2::X, VEC_TOLERANCE));
        assert!(within(1e-12, info.overlap, 0.5));
    }

    #[test]
    fn test_separated_squares_do_not_collide() {
        let info = find_collision(&square_at(0.0, 0.0), &square_at(3.0, 0.0));
        assert!(!info.collided);
        assert_eq!(info.axis, Vector2::ZERO);
    }

    #[test]
    fn test_touching_edges_do_not_collide() {
        let info = find_collision(&square_at(0.0, 0.0), &square_at(2.0, 0.0));
        assert!(!info.collided);
    }

    #[test]
    fn test_axis_points_from_first_to_second() {
        let info = find_collision(&square_at(0.0, 0.0), &square_at(0.3, -1.8));
        assert!(info.collided);
        assert!(info.axis.is_close(-Vector2::Y, VEC_TOLERANCE));
    }

    #[test]
    fn test_diagonal_separation_found_on_rotated_axis() {
        // Boxes overlap on both x and y projections but a diamond's edge
        // normal separates them
        let mut diamond = Polygon::rect(2.0, 2.0);
        diamond.rotate(std::f64::consts::FRAC_PI_4, Vector2::ZERO);
        diamond.translate(Vector2::new(2.2, 2.2));
        let info = find_collision(&square_at(0.0, 0.0), &diamond);
        assert!(!info.collided);
    }

    #[test]
    fn test_equal_overlap_tie_prefers_smallest_canonical_angle() {
        // Overlap is 0.5 along both x and y; x (angle 0) wins
        let a = square_at(0.0, 0.0);
        let b = square_at(1.5, 1.5);
        let forward = find_collision(&a, &b);
        assert!(forward.collided);
        assert!(forward.axis.is_close(Vector2::X, VEC_TOLERANCE));

        let backward = find_collision(&b, &a);
        assert!(backward.axis.is_close(-Vector2::X, VEC_TOLERANCE));
    }

    #[test]
    fn test_tie_break_independent_of_vertex_start() {
        // Same square but vertex list rotated: enumeration order changes,
        // chosen axis must not
        let a = square_at(0.0, 0.0);
        let b = square_at(-1.5, 1.5);
        let mut shifted = b.vertices().to_vec();
        shifted.rotate_left(2);
        let b_shifted = Polygon::new(shifted);
        let one = find_collision(&a, &b);
        let two = find_collision(&a, &b_shifted);
        assert!(one.axis.is_close(two.axis, VEC_TOLERANCE));
        assert!(one.axis.is_close(-Vector2::X, VEC_TOLERANCE));
    }

    #[test]
    fn test_symmetry_random_convex_pairs() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut hits = 0;
        for _ in 0..500 {
            let mut a = Polygon::regular(rng.gen_range(0.5..3.0), rng.gen_range(3..10));
            let mut b = Polygon::regular(rng.gen_range(0.5..3.0), rng.gen_range(3..10));
            a.rotate(rng.gen_range(0.0..6.3), Vector2::ZERO);
            b.rotate(rng.gen_range(0.0..6.3), Vector2::ZERO);
            b.translate(Vector2::new(rng.gen_range(-5.0..5.0), rng.gen_range(-5.0..5.0)));

            let forward = find_collision(&a, &b);
            let backward = find_collision(&b, &a);
            assert_eq!(forward.collided, backward.collided);
            if forward.collided {
                hits += 1;
                assert!(forward.axis.is_close(-backward.axis, 1e-9));
                assert!(within(1e-9, forward.overlap, backward.overlap));
                assert!(within(1e-9, forward.axis.length(), 1.0));
            }
        }
        assert!(hits > 0, "random layout should produce some overlaps");
    }
}
