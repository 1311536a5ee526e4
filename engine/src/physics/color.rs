//! Render-facing color
//!
//! Physics never reads colors. They ride along on each body so the external
//! renderer can draw the body list without keeping a parallel mapping.

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

/// Linear RGB color with components in `0.0..=1.0`.
///
/// Layout matches a `vec3<f32>` so a renderer can upload it directly.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable, Serialize, Deserialize)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

static_assertions::assert_eq_size!(Rgb, [f32; 3]);

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0.0, 0.0, 0.0);
    pub const WHITE: Rgb = Rgb::new(1.0, 1.0, 1.0);
    pub const RED: Rgb = Rgb::new(1.0, 0.0, 0.0);
    pub const GREEN: Rgb = Rgb::new(0.0, 1.0, 0.0);
    pub const BLUE: Rgb = Rgb::new(0.0, 0.0, 1.0);
    pub const YELLOW: Rgb = Rgb::new(1.0, 1.0, 0.0);
    pub const MAGENTA: Rgb = Rgb::new(1.0, 0.0, 1.0);
    pub const GRAY: Rgb = Rgb::new(0.7, 0.7, 0.7);

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Build a color, clamping every component into `0.0..=1.0`.
    pub fn clamped(r: f32, g: f32, b: f32) -> Self {
        Self {
            r: r.clamp(0.0, 1.0),
            g: g.clamp(0.0, 1.0),
            b: b.clamp(0.0, 1.0),
        }
    }

    /// Rainbow gradient used by the damping demo: phase-shifted sines.
    pub fn rainbow(index: usize, frequency: f32) -> Self {
        let phase = frequency * index as f32;
        Self::clamped(phase.sin() + 1.0, (phase + 2.0).sin() + 1.0, (phase + 4.0).sin() + 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamped_limits_components() {
        let c = Rgb::clamped(1.5, -0.2, 0.4);
        assert_eq!(c, Rgb::new(1.0, 0.0, 0.4));
    }

    #[test]
    fn test_rainbow_stays_in_range() {
        for i in 0..100 {
            let c = Rgb::rainbow(i, 0.3);
            for component in [c.r, c.g, c.b] {
                assert!((0.0..=1.0).contains(&component));
            }
        }
    }

    #[test]
    fn test_rgb_is_pod() {
        let c = Rgb::MAGENTA;
        let bytes: &[u8] = bytemuck::bytes_of(&c);
        assert_eq!(bytes.len(), 12);
        let back: &Rgb = bytemuck::from_bytes(bytes);
        assert_eq!(*back, c);
    }
}
