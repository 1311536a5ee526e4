//! Polygon shapes
//!
//! A [`Polygon`] is an ordered list of at least three vertices in absolute
//! world coordinates (not relative to the centroid). Translation and
//! rotation rewrite every vertex in place, so a renderer can draw
//! `vertices()` as-is.
//!
//! Collision detection assumes a simple convex polygon with a consistent
//! winding. The constructors below wind counter-clockwise. `star` and a
//! `sector` sweeping more than half a turn are concave; they are fine for
//! field interactions (gravity, springs) but must not be paired in a
//! collision.

use std::f64::consts::{PI, TAU};

use super::types::{VecExt, Vector2};

/// Convex polygon with absolute vertices.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    vertices: Vec<Vector2>,
}

impl Polygon {
    /// Wrap a vertex list.
    ///
    /// Fewer than three vertices is a precondition violation (checked in
    /// debug builds only).
    pub fn new(vertices: Vec<Vector2>) -> Self {
        debug_assert!(
            vertices.len() >= 3,
            "polygon needs at least 3 vertices, got {}",
            vertices.len()
        );
        Self { vertices }
    }

    /// Axis-aligned rectangle centred on the origin.
    pub fn rect(width: f64, height: f64) -> Self {
        let (hw, hh) = (width / 2.0, height / 2.0);
        Self::new(vec![
            Vector2::new(-hw, -hh),
            Vector2::new(hw, -hh),
            Vector2::new(hw, hh),
            Vector2::new(-hw, hh),
        ])
    }

    /// Regular polygon centred on the origin, starting at `(radius, 0)`.
    ///
    /// With enough sides this is the demos' circle approximation.
    pub fn regular(radius: f64, sides: usize) -> Self {
        let reference = Vector2::new(radius, 0.0);
        Self::new(
            (0..sides)
                .map(|i| reference.rotated(TAU * i as f64 / sides as f64))
                .collect(),
        )
    }

    /// Ellipse approximation with semi-axes `rx`, `ry`.
    pub fn ellipse(rx: f64, ry: f64, sides: usize) -> Self {
        Self::new(
            (0..sides)
                .map(|i| {
                    let theta = TAU * i as f64 / sides as f64;
                    Vector2::new(rx * theta.cos(), ry * theta.sin())
                })
                .collect(),
        )
    }

    /// Star with `points` tips; every other vertex sits at `inner_ratio * outer`.
    ///
    /// Concave: do not use in collisions.
    pub fn star(points: usize, outer: f64, inner_ratio: f64) -> Self {
        let vertex_count = points * 2;
        let reference = Vector2::new(0.0, outer);
        Self::new(
            (0..vertex_count)
                .map(|i| {
                    let v = reference.rotated(TAU * i as f64 / vertex_count as f64);
                    if i % 2 == 1 { v * inner_ratio } else { v }
                })
                .collect(),
        )
    }

    /// Circular sector: the origin followed by `arc_vertices` points on the
    /// arc from `start_angle` sweeping counter-clockwise by `sweep`.
    ///
    /// Convex while `sweep <= PI` (invader domes); wider sweeps give the
    /// chase demo's open-mouthed shape.
    pub fn sector(radius: f64, start_angle: f64, sweep: f64, arc_vertices: usize) -> Self {
        let first = Vector2::new(radius, 0.0).rotated(start_angle);
        let steps = arc_vertices.max(2) - 1;
        let mut vertices = Vec::with_capacity(arc_vertices + 1);
        vertices.push(Vector2::ZERO);
        vertices.extend((0..=steps).map(|i| first.rotated(sweep * i as f64 / steps as f64)));
        Self::new(vertices)
    }

    /// Absolute vertices in winding order.
    pub fn vertices(&self) -> &[Vector2] {
        &self.vertices
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Edges as `(start, end)` pairs, wrapping from the last vertex to the first.
    pub fn edges(&self) -> impl Iterator<Item = (Vector2, Vector2)> + '_ {
        let n = self.vertices.len();
        (0..n).map(move |i| (self.vertices[i], self.vertices[(i + 1) % n]))
    }

    /// Signed shoelace area (positive for counter-clockwise winding).
    pub fn signed_area(&self) -> f64 {
        self.edges().map(|(a, b)| a.cross(b)).sum::<f64>() / 2.0
    }

    pub fn area(&self) -> f64 {
        self.signed_area().abs()
    }

    /// Area-weighted centroid.
    pub fn centroid(&self) -> Vector2 {
        let signed_area = self.signed_area();
        debug_assert!(signed_area != 0.0, "centroid of a zero-area polygon");
        let sum = self
            .edges()
            .fold(Vector2::ZERO, |acc, (a, b)| acc + (a + b) * a.cross(b));
        sum / (6.0 * signed_area)
    }

    /// Shift every vertex by `offset`.
    pub fn translate(&mut self, offset: Vector2) {
        for v in self.vertices.iter_mut() {
            *v += offset;
        }
    }

    /// Rotate every vertex counter-clockwise by `angle` about `pivot`.
    pub fn rotate(&mut self, angle: f64, pivot: Vector2) {
        for v in self.vertices.iter_mut() {
            *v = pivot + (*v - pivot).rotated(angle);
        }
    }

    /// Largest vertex distance from `point`.
    pub fn max_radius(&self, point: Vector2) -> f64 {
        self.vertices
            .iter()
            .map(|v| v.distance(point))
            .fold(0.0, f64::max)
    }

    /// Projection interval `(min, max)` of all vertices onto `axis`.
    pub fn project(&self, axis: Vector2) -> (f64, f64) {
        self.vertices
            .iter()
            .map(|v| v.dot(axis))
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
                (lo.min(p), hi.max(p))
            })
    }
}

/// Angle helper for sectors pointing "up" (centred on +Y).
pub fn upward_sector_start(sweep: f64) -> f64 {
    PI / 2.0 - sweep / 2.0
}
