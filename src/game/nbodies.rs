//! N-body gravity
//!
//! Randomly sized, randomly placed stars pulling on each other with
//! pairwise Newtonian gravity. No collisions; the demo never ends.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::physics::{Body, ConfigError, Polygon, Rgb, Scene, Vector2};

use super::{
    BodyKind, DEMO_TIME_SCALE, Demo, DemoConfig, GameError, KeyEvent, Outcome, require,
    require_extent, require_positive,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NBodiesConfig {
    pub field: Vector2,
    pub time_scale: f64,
    pub count: usize,
    /// Star tips (the polygon has twice as many vertices)
    pub points: usize,
    pub inner_ratio: f64,
    /// Outer radius range, `[min, max)`
    pub radius: [f64; 2],
    /// Mass range, `[min, max)`
    pub mass: [f64; 2],
    pub gravity: f64,
    pub rotation_speed: f64,
}

impl Default for NBodiesConfig {
    fn default() -> Self {
        Self {
            field: Vector2::new(1000.0, 500.0),
            time_scale: DEMO_TIME_SCALE,
            count: 100,
            points: 4,
            inner_ratio: 0.5,
            radius: [5.0, 30.0],
            mass: [5.0, 10.0],
            gravity: 10.0,
            rotation_speed: 0.0,
        }
    }
}

/// `[min, max)` with a positive lower bound.
fn require_range(field: &str, [min, max]: [f64; 2]) -> Result<(), ConfigError> {
    require(
        min > 0.0 && max >= min && max.is_finite(),
        field,
        format!("[{min}, {max}]"),
        "0 < min <= max",
    )
}

impl DemoConfig for NBodiesConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        require_extent("field", self.field)?;
        require_positive("time_scale", self.time_scale)?;
        require(self.points >= 2, "points", self.points, ">= 2")?;
        require(
            self.inner_ratio > 0.0 && self.inner_ratio <= 1.0,
            "inner_ratio",
            self.inner_ratio,
            "within (0, 1]",
        )?;
        require_range("radius", self.radius)?;
        require_range("mass", self.mass)
    }
}

pub struct NBodies {
    config: NBodiesConfig,
    scene: Scene<BodyKind>,
}

impl NBodies {
    pub fn new(config: NBodiesConfig, seed: u64) -> Result<Self, GameError> {
        config.validate()?;
        let mut rng = StdRng::seed_from_u64(seed);
        let mut scene = Scene::new();

        let stars: Vec<_> = (0..config.count)
            .map(|_| {
                let radius = sample(&mut rng, config.radius);
                let color = Rgb::new(
                    rng.gen_range(0.0..1.0),
                    rng.gen_range(0.0..1.0),
                    rng.gen_range(0.0..1.0),
                );
                let mut star = Body::with_info(
                    Polygon::star(config.points, radius, config.inner_ratio),
                    sample(&mut rng, config.mass),
                    color,
                    BodyKind::Star,
                );
                star.set_rotation_speed(config.rotation_speed);
                star.set_centroid(Vector2::new(
                    rng.gen_range(0.0..config.field.x),
                    rng.gen_range(0.0..config.field.y),
                ));
                scene.add_body(star)
            })
            .collect();

        for (i, &a) in stars.iter().enumerate() {
            for &b in &stars[i + 1..] {
                scene.add_newtonian_gravity(config.gravity, a, b)?;
            }
        }

        Ok(Self { config, scene })
    }

    /// Total momentum of all stars.
    pub fn momentum(&self) -> Vector2 {
        self.scene
            .iter()
            .map(|(_, body)| body.velocity() * body.mass())
            .sum()
    }
}

fn sample(rng: &mut StdRng, [min, max]: [f64; 2]) -> f64 {
    if max > min { rng.gen_range(min..max) } else { min }
}

impl Demo for NBodies {
    fn name(&self) -> &'static str {
        "nbodies"
    }

    fn scene(&self) -> &Scene<BodyKind> {
        &self.scene
    }

    fn handle_key(&mut self, _event: KeyEvent) {}

    fn step(&mut self, dt: f64) -> Outcome {
        self.scene.tick(dt * self.config.time_scale);
        Outcome::Running
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_pair_is_attracted() {
        let config = NBodiesConfig {
            count: 6,
            ..NBodiesConfig::default()
        };
        let demo = NBodies::new(config, 5).unwrap();
        assert_eq!(demo.scene().body_count(), 6);
        assert_eq!(demo.scene().interaction_count(), 15);
    }

    #[test]
    fn test_same_seed_same_layout() {
        let a = NBodies::new(NBodiesConfig::default(), 9).unwrap();
        let b = NBodies::new(NBodiesConfig::default(), 9).unwrap();
        let first = |d: &NBodies| d.scene().get_body(0).unwrap().centroid();
        assert_eq!(first(&a), first(&b));
    }

    #[test]
    fn test_invalid_ranges_rejected() {
        for config in [
            NBodiesConfig { radius: [10.0, 5.0], ..NBodiesConfig::default() },
            NBodiesConfig { mass: [0.0, 5.0], ..NBodiesConfig::default() },
            NBodiesConfig { field: Vector2::new(0.0, 500.0), ..NBodiesConfig::default() },
            NBodiesConfig { points: 1, ..NBodiesConfig::default() },
        ] {
            assert!(NBodies::new(config.clone(), 1).is_err(), "{config:?} was accepted");
        }
        // A degenerate range is a fixed value
        let config = NBodiesConfig {
            count: 3,
            mass: [7.0, 7.0],
            ..NBodiesConfig::default()
        };
        let demo = NBodies::new(config, 1).unwrap();
        assert!(demo.scene().iter().all(|(_, b)| b.mass() == 7.0));
    }

    #[test]
    fn test_momentum_is_conserved() {
        let config = NBodiesConfig {
            count: 10,
            ..NBodiesConfig::default()
        };
        let mut demo = NBodies::new(config, 2).unwrap();
        for _ in 0..200 {
            demo.step(0.001);
        }
        let p = demo.momentum();
        assert!(p.length() < 1e-6, "momentum drifted to {p}");
        assert!(demo.scene().get_body(0).unwrap().velocity() != Vector2::ZERO);
    }
}
