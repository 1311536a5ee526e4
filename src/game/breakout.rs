//! Breakout
//!
//! Paddle at the bottom, three walls, rows of bricks and one ball. The ball
//! bounces off everything elastically and destroys bricks on contact. The
//! paddle grows as bricks run out. Losing the ball resets the level (or ends
//! the game when `reset_on_loss` is off); clearing every brick wins.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::physics::{
    Body, BodyHandle, ConfigError, INFINITE_MASS, Polygon, Rgb, Scene, SimulationConfig, Vector2,
};

use super::{
    BodyKind, Demo, DemoConfig, GameError, Key, KeyEvent, KeyEventKind, LossReason, Outcome,
    require, require_elasticity, require_extent, require_mass, require_positive, require_sides,
};

/// Layout and tuning for [`Breakout`]. `Default` is the classic 10x3 brick
/// layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BreakoutConfig {
    /// Playfield size (origin at bottom-left)
    pub field: Vector2,
    pub rows: usize,
    pub cols: usize,
    /// Gap between bricks and around the brick grid
    pub brick_gap: f64,
    pub brick_height: f64,
    pub paddle_width: f64,
    pub paddle_height: f64,
    pub paddle_speed: f64,
    /// Paddle doubles below the first count of remaining bricks and triples
    /// below the second
    pub widen_below: [usize; 2],
    pub wall_thickness: f64,
    pub ball_radius: f64,
    pub ball_mass: f64,
    pub ball_sides: usize,
    pub ball_velocity: Vector2,
    /// Integer jitter added to the ball's spawn point on each axis
    pub ball_jitter: u32,
    /// Ball bounce elasticity; unset uses the simulation default
    pub elasticity: Option<f64>,
    /// Simulated seconds per input second
    pub time_scale: f64,
    pub reset_on_loss: bool,
}

impl Default for BreakoutConfig {
    fn default() -> Self {
        Self {
            field: Vector2::new(100.0, 50.0),
            rows: 3,
            cols: 10,
            brick_gap: 1.0,
            brick_height: 3.0,
            paddle_width: 10.0,
            paddle_height: 2.0,
            paddle_speed: 80.0,
            widen_below: [20, 10],
            wall_thickness: 1.0,
            ball_radius: 1.0,
            ball_mass: 2.0,
            ball_sides: 40,
            ball_velocity: Vector2::new(30.0, 30.0),
            ball_jitter: 5,
            elasticity: None,
            time_scale: 1.0,
            reset_on_loss: true,
        }
    }
}

impl BreakoutConfig {
    fn brick_length(&self) -> f64 {
        self.field.x / self.cols as f64 - self.brick_gap
    }

    fn elasticity(&self) -> f64 {
        self.elasticity
            .unwrap_or_else(|| SimulationConfig::default().default_elasticity)
    }
}

impl DemoConfig for BreakoutConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        require_extent("field", self.field)?;
        require(self.rows >= 1, "rows", self.rows, ">= 1")?;
        require(self.cols >= 1, "cols", self.cols, ">= 1")?;
        require(self.brick_gap >= 0.0, "brick_gap", self.brick_gap, ">= 0")?;
        require(
            self.brick_length() > 0.0,
            "brick_gap",
            self.brick_gap,
            "smaller than field.x / cols",
        )?;
        require_positive("brick_height", self.brick_height)?;
        require_positive("paddle_width", self.paddle_width)?;
        require_positive("paddle_height", self.paddle_height)?;
        require(self.paddle_speed >= 0.0, "paddle_speed", self.paddle_speed, ">= 0")?;
        require_positive("wall_thickness", self.wall_thickness)?;
        require_positive("ball_radius", self.ball_radius)?;
        require_mass("ball_mass", self.ball_mass)?;
        require_sides("ball_sides", self.ball_sides)?;
        require_elasticity("elasticity", self.elasticity)?;
        require_positive("time_scale", self.time_scale)
    }
}

pub struct Breakout {
    config: BreakoutConfig,
    rng: StdRng,
    scene: Scene<BodyKind>,
    paddle: BodyHandle,
    ball: BodyHandle,
    paddle_velocity: f64,
    /// 0 = base width, 1 = doubled, 2 = tripled
    widen_stage: usize,
    resets: u32,
}

impl Breakout {
    pub fn new(config: BreakoutConfig, seed: u64) -> Result<Self, GameError> {
        let mut demo = Self {
            config,
            rng: StdRng::seed_from_u64(seed),
            scene: Scene::new(),
            paddle: BodyHandle::from_raw(0),
            ball: BodyHandle::from_raw(0),
            paddle_velocity: 0.0,
            widen_stage: 0,
            resets: 0,
        };
        demo.build_level()?;
        Ok(demo)
    }

    pub fn bricks_remaining(&self) -> usize {
        self.scene
            .iter()
            .filter(|(_, body)| body.info() == Some(&BodyKind::Brick))
            .count()
    }

    /// How many times the level was rebuilt after losing the ball.
    pub fn resets(&self) -> u32 {
        self.resets
    }

    pub fn paddle(&self) -> BodyHandle {
        self.paddle
    }

    pub fn ball(&self) -> BodyHandle {
        self.ball
    }

    fn build_level(&mut self) -> Result<(), GameError> {
        self.config.validate()?;
        self.scene.clear();
        self.widen_stage = 0;
        self.paddle_velocity = 0.0;

        let cfg = self.config.clone();

        let mut paddle = Body::with_info(
            Polygon::rect(cfg.paddle_width, cfg.paddle_height),
            INFINITE_MASS,
            Rgb::YELLOW,
            BodyKind::Paddle,
        );
        paddle.set_centroid(Vector2::new(cfg.field.x / 2.0, cfg.paddle_height / 2.0));
        self.paddle = self.scene.add_body(paddle);

        let brick_length = cfg.brick_length();
        let elasticity = cfg.elasticity();
        let mut bricks = Vec::with_capacity(cfg.rows * cfg.cols);
        for row in 0..cfg.rows {
            for col in 0..cfg.cols {
                let color = Rgb::new(
                    self.rng.gen_range(0.0..1.0),
                    self.rng.gen_range(0.0..1.0),
                    self.rng.gen_range(0.0..1.0),
                );
                let mut brick = Body::with_info(
                    Polygon::rect(brick_length, cfg.brick_height),
                    INFINITE_MASS,
                    color,
                    BodyKind::Brick,
                );
                brick.set_centroid(Vector2::new(
                    col as f64 * (brick_length + cfg.brick_gap) + brick_length / 2.0 + cfg.brick_gap,
                    cfg.field.y
                        - row as f64 * (cfg.brick_height + cfg.brick_gap)
                        - (cfg.brick_height / 2.0 + cfg.brick_gap),
                ));
                bricks.push(self.scene.add_body(brick));
            }
        }

        let (w, h, t) = (cfg.field.x, cfg.field.y, cfg.wall_thickness);
        let walls = [
            (Polygon::rect(t, h), Vector2::new(0.0, h / 2.0)),
            (Polygon::rect(t, h), Vector2::new(w, h / 2.0)),
            (Polygon::rect(w, t), Vector2::new(w / 2.0, h - t / 2.0)),
        ]
        .map(|(shape, centroid)| {
            let mut wall = Body::with_info(shape, INFINITE_MASS, Rgb::BLUE, BodyKind::Wall);
            wall.set_centroid(centroid);
            self.scene.add_body(wall)
        });

        let jitter = if cfg.ball_jitter > 0 {
            Vector2::new(
                self.rng.gen_range(0..cfg.ball_jitter) as f64,
                self.rng.gen_range(0..cfg.ball_jitter) as f64,
            )
        } else {
            Vector2::ZERO
        };
        let mut ball = Body::with_info(
            Polygon::regular(cfg.ball_radius, cfg.ball_sides),
            cfg.ball_mass,
            Rgb::RED,
            BodyKind::Ball,
        );
        ball.set_centroid(Vector2::new(w / 2.0, cfg.paddle_height + 10.0) + jitter);
        ball.set_velocity(cfg.ball_velocity);
        self.ball = self.scene.add_body(ball);

        self.scene
            .add_physics_collision(elasticity, self.ball, self.paddle)?;
        for wall in walls {
            self.scene.add_physics_collision(elasticity, self.ball, wall)?;
        }
        for brick in bricks {
            self.scene.add_physics_collision(elasticity, self.ball, brick)?;
            self.scene
                .add_destructive_collision_after(self.ball, brick, [false, true], 1)?;
        }
        Ok(())
    }

    fn paddle_width(&self) -> f64 {
        self.config.paddle_width * (self.widen_stage + 1) as f64
    }

    fn update_paddle(&mut self, dt: f64) {
        let stage = match self.bricks_remaining() {
            n if n < self.config.widen_below[1] => 2,
            n if n < self.config.widen_below[0] => 1,
            _ => 0,
        };
        if stage > self.widen_stage {
            self.widen_stage = stage;
            let shape = Polygon::rect(self.paddle_width(), self.config.paddle_height);
            if let Some(paddle) = self.scene.body_mut(self.paddle) {
                paddle.set_shape(shape);
            }
        }

        let half = self.paddle_width() / 2.0;
        let max_x = self.config.field.x - half;
        let velocity = self.paddle_velocity;
        if let Some(paddle) = self.scene.body_mut(self.paddle) {
            // Infinite-mass bodies are not integrated, so the paddle is
            // driven directly
            paddle.translate(Vector2::new(velocity * dt, 0.0));
            let centroid = paddle.centroid();
            let x = centroid.x.clamp(half, max_x.max(half));
            if x != centroid.x {
                paddle.set_centroid(Vector2::new(x, centroid.y));
            }
        }
    }
}

impl Demo for Breakout {
    fn name(&self) -> &'static str {
        "breakout"
    }

    fn scene(&self) -> &Scene<BodyKind> {
        &self.scene
    }

    fn handle_key(&mut self, event: KeyEvent) {
        match (event.kind, event.key) {
            (KeyEventKind::Pressed, Key::Left) => self.paddle_velocity = -self.config.paddle_speed,
            (KeyEventKind::Pressed, Key::Right) => self.paddle_velocity = self.config.paddle_speed,
            (KeyEventKind::Released, _) => self.paddle_velocity = 0.0,
            _ => {}
        }
    }

    fn step(&mut self, dt: f64) -> Outcome {
        let dt = dt * self.config.time_scale;
        self.update_paddle(dt);

        if self.bricks_remaining() == 0 {
            return Outcome::Won;
        }

        let ball_lost = self
            .scene
            .body(self.ball)
            .is_none_or(|ball| ball.centroid().y <= 0.0);
        if ball_lost {
            if !self.config.reset_on_loss {
                return Outcome::Lost(LossReason::BallLost);
            }
            self.resets += 1;
            info!(resets = self.resets, "Ball lost, resetting level");
            if let Err(err) = self.build_level() {
                error!("Failed to rebuild breakout level: {err}");
                return Outcome::Lost(LossReason::BallLost);
            }
        }

        self.scene.tick(dt);
        Outcome::Running
    }
}
