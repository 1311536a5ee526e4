//! Damped springs
//!
//! A row of rainbow balls across the field. The left third hangs on stiff,
//! lightly damped springs; the right third on soft, heavily damped ones.
//! Each spring pulls toward an infinite-mass anchor on the midline, so the
//! balls oscillate vertically and settle at different rates. The middle
//! third starts at rest on the midline.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::physics::{Body, BodyHandle, ConfigError, INFINITE_MASS, Polygon, Rgb, Scene, Vector2};

use super::{
    BodyKind, DEMO_TIME_SCALE, Demo, DemoConfig, GameError, KeyEvent, Outcome, require,
    require_extent, require_mass, require_positive, require_sides,
};

/// Spring and starting-curve parameters for one side of the row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpringGroup {
    pub stiffness: f64,
    pub drag: f64,
    /// Start height offset, as a fraction of the field height
    pub shift: f64,
    /// Start curve amplitude, as a fraction of the field height
    pub amplitude: f64,
    pub cos_multiplier: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DampingConfig {
    pub field: Vector2,
    pub time_scale: f64,
    pub ball_radius: f64,
    pub ball_sides: usize,
    pub ball_mass: f64,
    /// Share of the row on springs at each end
    pub sprung_fraction: f64,
    pub left: SpringGroup,
    pub right: SpringGroup,
    pub color_frequency: f32,
}

impl Default for DampingConfig {
    fn default() -> Self {
        Self {
            field: Vector2::new(1000.0, 500.0),
            time_scale: DEMO_TIME_SCALE,
            ball_radius: 10.0,
            ball_sides: 32,
            ball_mass: 50.0,
            sprung_fraction: 1.0 / 3.0,
            left: SpringGroup {
                stiffness: 0.5,
                drag: 0.3,
                shift: 3.0 / 4.0,
                amplitude: 1.0 / 4.0,
                cos_multiplier: 3.0,
            },
            right: SpringGroup {
                stiffness: 0.01,
                drag: 0.8,
                shift: 9.0 / 16.0,
                amplitude: 1.0 / 16.0,
                cos_multiplier: 3.0,
            },
            color_frequency: 0.3,
        }
    }
}

impl SpringGroup {
    fn validate(&self, side: &str) -> Result<(), ConfigError> {
        require(self.stiffness >= 0.0, &format!("{side}.stiffness"), self.stiffness, ">= 0")?;
        require(self.drag >= 0.0, &format!("{side}.drag"), self.drag, ">= 0")
    }
}

impl DemoConfig for DampingConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        require_extent("field", self.field)?;
        require_positive("time_scale", self.time_scale)?;
        require_positive("ball_radius", self.ball_radius)?;
        require(
            self.field.x >= 2.0 * self.ball_radius,
            "ball_radius",
            self.ball_radius,
            "at most half the field width",
        )?;
        require_sides("ball_sides", self.ball_sides)?;
        require_mass("ball_mass", self.ball_mass)?;
        // The two sprung groups must not overlap
        require(
            (0.0..=0.5).contains(&self.sprung_fraction),
            "sprung_fraction",
            self.sprung_fraction,
            "within 0..=0.5",
        )?;
        self.left.validate("left")?;
        self.right.validate("right")
    }
}

pub struct Damping {
    config: DampingConfig,
    scene: Scene<BodyKind>,
    balls: Vec<BodyHandle>,
}

impl Damping {
    pub fn new(config: DampingConfig) -> Result<Self, GameError> {
        config.validate()?;
        let mut scene = Scene::new();
        let count = (config.field.x / (2.0 * config.ball_radius)) as usize;
        let r = config.ball_radius;
        let h = config.field.y;
        let midline = h / 2.0 - r;

        let balls: Vec<BodyHandle> = (0..count)
            .map(|i| {
                let phase = i as f64 * PI / count as f64;
                let y = if (i as f64) <= count as f64 * config.sprung_fraction {
                    let g = &config.left;
                    h * g.shift + h * g.amplitude * (phase * g.cos_multiplier).cos() - r
                } else if (i as f64) > count as f64 * (1.0 - config.sprung_fraction) {
                    let g = &config.right;
                    h * g.shift - h * g.amplitude * (phase * g.cos_multiplier).cos() - r
                } else {
                    midline
                };
                let mut ball = Body::with_info(
                    Polygon::regular(r, config.ball_sides),
                    config.ball_mass,
                    Rgb::rainbow(i, config.color_frequency),
                    BodyKind::Ball,
                );
                ball.set_centroid(Vector2::new(r + 2.0 * r * i as f64, y));
                scene.add_body(ball)
            })
            .collect();

        let left_count = (count as f64 * config.sprung_fraction) as usize;
        let right_start = count - (count as f64 * config.sprung_fraction) as usize;
        let groups = [(0..left_count, &config.left), (right_start..count, &config.right)];
        for (range, group) in groups {
            for &ball in &balls[range] {
                let x = scene.body(ball).map_or(0.0, |b| b.centroid().x);
                let mut anchor = Body::with_info(
                    Polygon::regular(3.0, 3),
                    INFINITE_MASS,
                    Rgb::BLACK,
                    BodyKind::Anchor,
                );
                anchor.set_centroid(Vector2::new(x, midline));
                let anchor = scene.add_body(anchor);
                scene.add_spring(group.stiffness, ball, anchor)?;
                scene.add_drag(group.drag, ball)?;
            }
        }

        Ok(Self {
            config,
            scene,
            balls,
        })
    }

    pub fn balls(&self) -> &[BodyHandle] {
        &self.balls
    }

    /// Height of the line the springs pull toward.
    pub fn midline(&self) -> f64 {
        self.config.field.y / 2.0 - self.config.ball_radius
    }
}

impl Demo for Damping {
    fn name(&self) -> &'static str {
        "damping"
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
