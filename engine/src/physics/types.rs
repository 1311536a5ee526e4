//! Vector math
//!
//! The engine's vector type is glam's `DVec2`, re-exported as [`Vector2`].
//! glam already provides add, subtract, scale, negate and dot as operators;
//! [`VecExt`] adds the rotation and tolerance helpers the engine relies on.

pub use glam::DVec2;

/// 2D vector with `f64` components. Plain `Copy` value type.
pub type Vector2 = DVec2;

/// Default absolute tolerance used by closeness comparisons.
pub const VEC_TOLERANCE: f64 = 1e-7;

/// Extra vector operations on top of glam.
pub trait VecExt {
    /// Rotate counter-clockwise by `angle` radians (standard rotation matrix).
    fn rotated(self, angle: f64) -> Self;

    /// Component-wise closeness within `tolerance`.
    fn is_close(self, other: Self, tolerance: f64) -> bool;

    /// Scalar 2D cross product (`x1 * y2 - y1 * x2`).
    fn cross(self, other: Self) -> f64;
}

impl VecExt for DVec2 {
    #[inline]
    fn rotated(self, angle: f64) -> Self {
        let (sin, cos) = angle.sin_cos();
        DVec2::new(self.x * cos - self.y * sin, self.x * sin + self.y * cos)
    }

    #[inline]
    fn is_close(self, other: Self, tolerance: f64) -> bool {
        within(tolerance, self.x, other.x) && within(tolerance, self.y, other.y)
    }

    #[inline]
    fn cross(self, other: Self) -> f64 {
        self.perp_dot(other)
    }
}

/// Returns true when `a` and `b` differ by strictly less than `tolerance`.
#[inline]
pub fn within(tolerance: f64, a: f64, b: f64) -> bool {
    (a - b).abs() < tolerance
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, PI};

    #[test]
    fn test_rotate_quarter_turn_is_counter_clockwise() {
        let v = Vector2::new(1.0, 0.0).rotated(FRAC_PI_2);
        assert!(v.is_close(Vector2::new(0.0, 1.0), VEC_TOLERANCE));
    }

    #[test]
    fn test_rotate_half_turn_negates() {
        let v = Vector2::new(3.0, -4.0);
        assert!(v.rotated(PI).is_close(-v, VEC_TOLERANCE));
    }

    #[test]
    fn test_rotate_preserves_length() {
        let v = Vector2::new(2.5, 7.0);
        assert!(within(1e-12, v.rotated(1.234).length(), v.length()));
    }

    #[test]
    fn test_operator_arithmetic() {
        let a = Vector2::new(1.0, 2.0);
        let b = Vector2::new(-3.0, 0.5);
        assert_eq!(a + b, Vector2::new(-2.0, 2.5));
        assert_eq!(a - b, Vector2::new(4.0, 1.5));
        assert_eq!(a * 2.0, Vector2::new(2.0, 4.0));
        assert_eq!(-a, Vector2::new(-1.0, -2.0));
        assert_eq!(a.dot(b), -2.0);
    }

    #[test]
    fn test_cross_sign() {
        let x = Vector2::X;
        let y = Vector2::Y;
        assert_eq!(x.cross(y), 1.0);
        assert_eq!(y.cross(x), -1.0);
    }

    #[test]
    fn test_within_is_strict() {
        assert!(within(0.1, 1.0, 1.05));
        assert!(!within(0.1, 1.0, 1.2));
    }
}
