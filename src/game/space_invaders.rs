//! Space Invaders
//!
//! Rows of dome-shaped invaders sweep side to side and step down at each
//! edge. The player shoots one bullet at a time; invaders fire on a timer.
//! Bullets destroy whatever they hit (and themselves).

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::physics::polygon::upward_sector_start;
use crate::physics::{Body, BodyHandle, ConfigError, Polygon, Rgb, Scene, SceneError, Vector2};

use super::{
    BodyKind, DEMO_TIME_SCALE, Demo, DemoConfig, GameError, Key, KeyEvent, KeyEventKind,
    LossReason, Outcome, require, require_extent, require_mass, require_positive, require_sides,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpaceInvadersConfig {
    pub field: Vector2,
    pub time_scale: f64,
    /// Invaders below this height have landed
    pub lose_height: f64,

    /// Bullet half extents
    pub bullet_half_size: Vector2,
    pub bullet_mass: f64,
    pub player_bullet_velocity: Vector2,
    pub invader_bullet_velocity: Vector2,
    /// Simulated seconds between invader shots
    pub invader_shot_interval: f64,

    /// Player ellipse semi-axes
    pub player_radii: Vector2,
    pub player_sides: usize,
    pub player_speed: f64,
    pub player_mass: f64,

    pub invader_radius: f64,
    /// Full-circle vertex count the dome arc is cut from
    pub invader_circle_vertices: usize,
    /// Fraction of the circle the dome spans
    pub invader_arc_fraction: f64,
    pub invader_spawn_height: f64,
    pub invader_gap: f64,
    pub invader_rows: usize,
    pub invader_speed: f64,
    pub invader_mass: f64,
}

impl Default for SpaceInvadersConfig {
    fn default() -> Self {
        Self {
            field: Vector2::new(1000.0, 500.0),
            time_scale: DEMO_TIME_SCALE,
            lose_height: 50.0,
            bullet_half_size: Vector2::new(3.0, 10.0),
            bullet_mass: 10.0,
            player_bullet_velocity: Vector2::new(0.0, 15.0),
            invader_bullet_velocity: Vector2::new(0.0, -10.0),
            invader_shot_interval: 40.0,
            player_radii: Vector2::new(20.0, 10.0),
            player_sides: 32,
            player_speed: 10.0,
            player_mass: 100.0,
            invader_radius: 30.0,
            invader_circle_vertices: 32,
            invader_arc_fraction: 1.0 / 3.0,
            invader_spawn_height: 470.0,
            invader_gap: 3.0,
            invader_rows: 3,
            invader_speed: 3.0,
            invader_mass: 100.0,
        }
    }
}

impl SpaceInvadersConfig {
    /// Dome shape: the arc spans whole vertex steps of the full circle on
    /// either side of the top.
    fn invader_shape(&self) -> Polygon {
        let n = self.invader_circle_vertices as f64;
        let steps = ((self.invader_arc_fraction * n / 2.0).floor() as usize).max(1);
        let sweep = 2.0 * std::f64::consts::TAU * steps as f64 / n;
        Polygon::sector(
            self.invader_radius,
            upward_sector_start(sweep),
            sweep,
            2 * steps + 1,
        )
    }

    fn row_step(&self) -> f64 {
        self.invader_radius + self.invader_gap
    }
}

impl DemoConfig for SpaceInvadersConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        require_extent("field", self.field)?;
        require_positive("time_scale", self.time_scale)?;
        require_extent("bullet_half_size", self.bullet_half_size)?;
        require_mass("bullet_mass", self.bullet_mass)?;
        require_positive("invader_shot_interval", self.invader_shot_interval)?;
        require_extent("player_radii", self.player_radii)?;
        require_sides("player_sides", self.player_sides)?;
        require_mass("player_mass", self.player_mass)?;
        require_positive("invader_radius", self.invader_radius)?;
        require_sides("invader_circle_vertices", self.invader_circle_vertices)?;
        require(
            self.invader_arc_fraction > 0.0 && self.invader_arc_fraction <= 0.5,
            "invader_arc_fraction",
            self.invader_arc_fraction,
            "within (0, 0.5]",
        )?;
        require(self.invader_gap >= 0.0, "invader_gap", self.invader_gap, ">= 0")?;
        require_mass("invader_mass", self.invader_mass)
    }
}

pub struct SpaceInvaders {
    config: SpaceInvadersConfig,
    rng: StdRng,
    scene: Scene<BodyKind>,
    player: BodyHandle,
    since_last_shot: f64,
}

impl SpaceInvaders {
    pub fn new(config: SpaceInvadersConfig, seed: u64) -> Result<Self, GameError> {
        config.validate()?;
        let mut scene = Scene::new();

        let mut player = Body::with_info(
            Polygon::ellipse(config.player_radii.x, config.player_radii.y, config.player_sides),
            config.player_mass,
            Rgb::MAGENTA,
            BodyKind::player(),
        );
        player.set_centroid(Vector2::new(config.field.x / 2.0, config.player_radii.y));
        let player = scene.add_body(player);

        let spacing = 2.0 * config.invader_radius + config.invader_gap;
        let per_row = (config.field.x / spacing) as usize;
        for row in 0..config.invader_rows {
            for col in 0..per_row {
                let mut invader = Body::with_info(
                    config.invader_shape(),
                    config.invader_mass,
                    Rgb::GRAY,
                    BodyKind::Invader,
                );
                invader.set_centroid(Vector2::new(
                    (col + 1) as f64 * spacing,
                    config.invader_spawn_height - row as f64 * config.row_step(),
                ));
                invader.set_velocity(Vector2::new(config.invader_speed, 0.0));
                scene.add_body(invader);
            }
        }

        Ok(Self {
            config,
            rng: StdRng::seed_from_u64(seed),
            scene,
            player,
            since_last_shot: 0.0,
        })
    }

    pub fn player(&self) -> BodyHandle {
        self.player
    }

    pub fn invaders(&self) -> Vec<BodyHandle> {
        self.handles_of(BodyKind::Invader)
    }

    fn handles_of(&self, kind: BodyKind) -> Vec<BodyHandle> {
        self.scene
            .iter()
            .filter(|(_, body)| body.info() == Some(&kind) && !body.is_removed())
            .map(|(handle, _)| handle)
            .collect()
    }

    /// Spawn a bullet at `origin` and bind it to its targets.
    fn shoot(&mut self, origin: Vector2, from_player: bool) -> Result<BodyHandle, SceneError> {
        let half = self.config.bullet_half_size;
        let (kind, velocity, color) = if from_player {
            (BodyKind::PlayerBullet, self.config.player_bullet_velocity, Rgb::GREEN)
        } else {
            (BodyKind::InvaderBullet, self.config.invader_bullet_velocity, Rgb::RED)
        };
        let mut bullet = Body::with_info(
            Polygon::rect(2.0 * half.x, 2.0 * half.y),
            self.config.bullet_mass,
            color,
            kind,
        );
        bullet.set_centroid(origin);
        bullet.set_velocity(velocity);
        let bullet = self.scene.add_body(bullet);

        if from_player {
            for invader in self.invaders() {
                self.scene.add_destructive_collision(bullet, invader)?;
            }
        } else {
            self.scene.add_destructive_collision(bullet, self.player)?;
        }
        Ok(bullet)
    }

    fn check_game_end(&self) -> Option<Outcome> {
        if !self.scene.contains(self.player) {
            return Some(Outcome::Lost(LossReason::PlayerHit));
        }
        let mut invaders = self
            .scene
            .iter()
            .filter(|(_, body)| body.info() == Some(&BodyKind::Invader))
            .peekable();
        if invaders.peek().is_none() {
            return Some(Outcome::Won);
        }
        if invaders.any(|(_, body)| body.centroid().y < self.config.lose_height) {
            return Some(Outcome::Lost(LossReason::InvadersLanded));
        }
        None
    }

    /// Bounce invaders off the side walls and drop them a block of rows.
    fn shift_invaders(&mut self) {
        let cfg = &self.config;
        let r = cfg.invader_radius;
        let drop = cfg.invader_rows as f64 * cfg.row_step();
        for (_, body) in self.scene.iter_mut() {
            if body.info() != Some(&BodyKind::Invader) {
                continue;
            }
            let c = body.centroid();
            let (x, speed) = if c.x + r > cfg.field.x {
                (cfg.field.x - r - cfg.invader_gap, -cfg.invader_speed)
            } else if c.x - r < 0.0 {
                (r + cfg.invader_gap, cfg.invader_speed)
            } else {
                continue;
            };
            body.set_velocity(Vector2::new(speed, 0.0));
            body.set_centroid(Vector2::new(x, c.y - drop));
        }
    }

    fn keep_in_bounds(&mut self) {
        let (width, height) = (self.config.field.x, self.config.field.y);
        let half = self.config.player_radii.x;
        for (_, body) in self.scene.iter_mut() {
            let c = body.centroid();
            match body.info().copied() {
                Some(BodyKind::Player { .. }) => {
                    if c.x + half > width {
                        body.set_centroid(Vector2::new(width - half, c.y));
                    } else if c.x - half < 0.0 {
                        body.set_centroid(Vector2::new(half, c.y));
                    }
                }
                Some(BodyKind::PlayerBullet) if c.y > height => body.mark_removed(),
                Some(BodyKind::InvaderBullet) if c.y < 0.0 => body.mark_removed(),
                _ => {}
            }
        }
    }

    fn invaders_fire(&mut self) {
        if self.since_last_shot <= self.config.invader_shot_interval {
            return;
        }
        let shooter = self
            .invaders()
            .choose(&mut self.rng)
            .and_then(|&h| self.scene.body(h))
            .map(|body| body.centroid());
        if let Some(origin) = shooter {
            match self.shoot(origin, false) {
                Ok(bullet) => debug!(%bullet, "Invader fired"),
                Err(err) => debug!("Invader shot skipped: {err}"),
            }
        }
        self.since_last_shot = 0.0;
    }

    fn set_player_velocity(&mut self, vx: f64) {
        if let Some(player) = self.scene.body_mut(self.player) {
            player.set_velocity(Vector2::new(vx, 0.0));
        }
    }
}

impl Demo for SpaceInvaders {
    fn name(&self) -> &'static str {
        "space_invaders"
    }

    fn scene(&self) -> &Scene<BodyKind> {
        &self.scene
    }

    fn handle_key(&mut self, event: KeyEvent) {
        let speed = self.config.player_speed;
        match (event.kind, event.key) {
            (KeyEventKind::Pressed, Key::Space) => {
                if !self.handles_of(BodyKind::PlayerBullet).is_empty() {
                    return;
                }
                if let Some(origin) = self.scene.body(self.player).map(|p| p.centroid()) {
                    if let Err(err) = self.shoot(origin, true) {
                        debug!("Player shot skipped: {err}");
                    }
                }
            }
            (KeyEventKind::Pressed, Key::Left) => self.set_player_velocity(-speed),
            (KeyEventKind::Pressed, Key::Right) => self.set_player_velocity(speed),
            (KeyEventKind::Released, key) if key != Key::Space => self.set_player_velocity(0.0),
            _ => {}
        }
    }

    fn step(&mut self, dt: f64) -> Outcome {
        let dt = dt * self.config.time_scale;
        self.since_last_shot += dt;

        if let Some(outcome) = self.check_game_end() {
            return outcome;
        }
        self.shift_invaders();
        self.keep_in_bounds();
        self.invaders_fire();

        self.scene.tick(dt);
        Outcome::Running
    }
}
