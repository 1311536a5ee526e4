//! Powerups
//!
//! A player stands on the ground under gravity. Weapon crates drop from the
//! sky on a timer; walking into one swaps the player's weapon for a limited
//! number of shots. Bullets are tethered to the player and vanish once they
//! fly out of range.
//!
//! | Weapon | Shot |
//! |---|---|
//! | Pistol | one bullet, destroyed by walls |
//! | Shotgun | three spread bullets, destroyed by walls |
//! | Ricochet | one bullet that bounces off walls and ground |

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::physics::{
    Body, BodyHandle, ConfigError, INFINITE_MASS, Polygon, Rgb, Scene, SceneError, SimulationConfig,
    VecExt, Vector2, find_collision,
};

use super::{
    BodyKind, Demo, DemoConfig, GameError, Key, KeyEvent, KeyEventKind, Outcome, Weapon, require,
    require_elasticity, require_extent, require_mass, require_positive,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PowerupsConfig {
    pub field: Vector2,
    pub time_scale: f64,
    pub wall_thickness: f64,
    pub gravity: Vector2,

    pub player_size: Vector2,
    pub player_mass: f64,
    pub player_speed: f64,
    pub jump_speed: f64,

    pub powerup_size: f64,
    pub powerup_mass: f64,
    /// Seconds between drops
    pub powerup_interval: f64,
    pub max_powerups: usize,

    pub bullet_size: f64,
    pub bullet_mass: f64,
    pub bullet_speed: f64,
    /// Bullets further than this from the player are removed
    pub bullet_range: f64,
    /// Angle between shotgun pellets (radians)
    pub shotgun_spread: f64,
    pub shotgun_shots: u32,
    pub ricochet_shots: u32,
    /// Ricochet bounce elasticity; unset uses the simulation default
    pub ricochet_elasticity: Option<f64>,
}

impl Default for PowerupsConfig {
    fn default() -> Self {
        Self {
            field: Vector2::new(400.0, 200.0),
            time_scale: 1.0,
            wall_thickness: 10.0,
            gravity: Vector2::new(0.0, -200.0),
            player_size: Vector2::new(10.0, 20.0),
            player_mass: 70.0,
            player_speed: 80.0,
            jump_speed: 120.0,
            powerup_size: 8.0,
            powerup_mass: 1.0,
            powerup_interval: 3.0,
            max_powerups: 3,
            bullet_size: 2.0,
            bullet_mass: 1.0,
            bullet_speed: 200.0,
            bullet_range: 150.0,
            shotgun_spread: 0.15,
            shotgun_shots: 6,
            ricochet_shots: 10,
            ricochet_elasticity: None,
        }
    }
}

impl PowerupsConfig {
    fn shots_for(&self, weapon: Weapon) -> u32 {
        match weapon {
            Weapon::Pistol => 0,
            Weapon::Shotgun => self.shotgun_shots,
            Weapon::Ricochet => self.ricochet_shots,
        }
    }

    fn ricochet_elasticity(&self) -> f64 {
        self.ricochet_elasticity
            .unwrap_or_else(|| SimulationConfig::default().default_elasticity)
    }
}

impl DemoConfig for PowerupsConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        require_extent("field", self.field)?;
        require_positive("time_scale", self.time_scale)?;
        require_positive("wall_thickness", self.wall_thickness)?;
        require_extent("player_size", self.player_size)?;
        require_mass("player_mass", self.player_mass)?;
        require_positive("powerup_size", self.powerup_size)?;
        require_mass("powerup_mass", self.powerup_mass)?;
        // Drops land strictly between the walls
        let margin = self.wall_thickness + self.powerup_size;
        require(
            self.field.x > 2.0 * margin,
            "field",
            self.field,
            "wider than twice wall_thickness + powerup_size",
        )?;
        require_positive("powerup_interval", self.powerup_interval)?;
        require_positive("bullet_size", self.bullet_size)?;
        require_mass("bullet_mass", self.bullet_mass)?;
        require_positive("bullet_range", self.bullet_range)?;
        require_elasticity("ricochet_elasticity", self.ricochet_elasticity)
    }
}

pub struct Powerups {
    config: PowerupsConfig,
    rng: StdRng,
    scene: Scene<BodyKind>,
    player: BodyHandle,
    ground: BodyHandle,
    walls: [BodyHandle; 2],
    /// +1 facing right, -1 facing left
    facing: f64,
    since_drop: f64,
}

impl Powerups {
    pub fn new(config: PowerupsConfig, seed: u64) -> Result<Self, GameError> {
        config.validate()?;
        let mut scene = Scene::new();
        let (w, h, t) = (config.field.x, config.field.y, config.wall_thickness);

        let mut ground = Body::with_info(Polygon::rect(w, t), INFINITE_MASS, Rgb::GRAY, BodyKind::Ground);
        ground.set_centroid(Vector2::new(w / 2.0, t / 2.0));
        let ground = scene.add_body(ground);

        let walls = [0.0, w].map(|x| {
            let mut wall = Body::with_info(Polygon::rect(t, h), INFINITE_MASS, Rgb::BLUE, BodyKind::Wall);
            wall.set_centroid(Vector2::new(x, h / 2.0));
            scene.add_body(wall)
        });

        let mut player = Body::with_info(
            Polygon::rect(config.player_size.x, config.player_size.y),
            config.player_mass,
            Rgb::GREEN,
            BodyKind::player(),
        );
        player.set_centroid(Vector2::new(w / 2.0, t + config.player_size.y / 2.0));
        let player = scene.add_body(player);
        scene.add_uniform_gravity(player, config.gravity)?;
        scene.add_normal_force(player, ground)?;

        Ok(Self {
            config,
            rng: StdRng::seed_from_u64(seed),
            scene,
            player,
            ground,
            walls,
            facing: 1.0,
            since_drop: 0.0,
        })
    }

    pub fn player(&self) -> BodyHandle {
        self.player
    }

    /// Current weapon and remaining special shots.
    pub fn weapon(&self) -> Option<(Weapon, u32)> {
        match self.scene.body(self.player)?.info()? {
            BodyKind::Player { weapon, shots_left } => Some((*weapon, *shots_left)),
            _ => None,
        }
    }

    pub fn count_of(&self, predicate: impl Fn(&BodyKind) -> bool) -> usize {
        self.scene
            .iter()
            .filter(|(_, body)| body.info().is_some_and(&predicate))
            .count()
    }

    /// Drop a crate of `weapon` at `x`, near the top of the field.
    pub fn spawn_powerup(&mut self, x: f64, weapon: Weapon) -> Result<BodyHandle, SceneError> {
        let size = self.config.powerup_size;
        let mut crate_body = Body::with_info(
            Polygon::rect(size, size),
            self.config.powerup_mass,
            Rgb::YELLOW,
            BodyKind::Powerup(weapon),
        );
        crate_body.set_centroid(Vector2::new(x, self.config.field.y - size));
        let powerup = self.scene.add_body(crate_body);

        self.scene.add_uniform_gravity(powerup, self.config.gravity)?;
        self.scene.add_normal_force(powerup, self.ground)?;

        let shots = [Weapon::Pistol, Weapon::Ricochet, Weapon::Shotgun].map(|w| (w, self.config.shots_for(w)));
        self.scene.add_pickup(self.player, powerup, move |player, pickup| {
            let Some(&BodyKind::Powerup(new_weapon)) = pickup.info() else {
                return;
            };
            if let Some(BodyKind::Player { weapon, shots_left }) = player.info_mut() {
                *weapon = new_weapon;
                *shots_left = shots
                    .iter()
                    .find(|(w, _)| *w == new_weapon)
                    .map_or(0, |(_, n)| *n);
            }
        })?;
        Ok(powerup)
    }

    /// Fire the current weapon. Returns the spawned bullets.
    pub fn shoot(&mut self) -> Result<Vec<BodyHandle>, SceneError> {
        let Some((weapon, shots_left)) = self.weapon() else {
            return Ok(Vec::new());
        };
        let Some(origin) = self.scene.body(self.player).map(|p| p.centroid()) else {
            return Ok(Vec::new());
        };

        let forward = Vector2::new(self.facing, 0.0);
        let directions = match weapon {
            Weapon::Shotgun => {
                let spread = self.config.shotgun_spread;
                vec![forward.rotated(spread), forward, forward.rotated(-spread)]
            }
            Weapon::Pistol | Weapon::Ricochet => vec![forward],
        };

        let offset = forward * (self.config.player_size.x / 2.0 + self.config.bullet_size);
        let mut bullets = Vec::with_capacity(directions.len());
        for direction in directions {
            let size = self.config.bullet_size;
            let mut bullet = Body::with_info(
                Polygon::rect(size, size),
                self.config.bullet_mass,
                Rgb::RED,
                BodyKind::PlayerBullet,
            );
            bullet.set_centroid(origin + offset);
            bullet.set_velocity(direction * self.config.bullet_speed);
            let bullet = self.scene.add_body(bullet);

            self.scene
                .add_radial_destructive(self.player, bullet, self.config.bullet_range, [false, true])?;
            for obstacle in [self.ground, self.walls[0], self.walls[1]] {
                if weapon == Weapon::Ricochet {
                    let elasticity = self.config.ricochet_elasticity();
                    self.scene.add_physics_collision(elasticity, bullet, obstacle)?;
                } else {
                    self.scene
                        .add_destructive_collision_after(bullet, obstacle, [true, false], 1)?;
                }
            }
            bullets.push(bullet);
        }

        if weapon != Weapon::Pistol {
            let remaining = shots_left.saturating_sub(1);
            if let Some(BodyKind::Player { weapon, shots_left }) =
                self.scene.body_mut(self.player).and_then(|p| p.info_mut())
            {
                *shots_left = remaining;
                if remaining == 0 {
                    *weapon = Weapon::Pistol;
                }
            }
        }
        debug!(?weapon, bullets = bullets.len(), "Player fired");
        Ok(bullets)
    }

    fn on_ground(&self) -> bool {
        match (self.scene.body(self.player), self.scene.body(self.ground)) {
            (Some(player), Some(ground)) => find_collision(player.shape(), ground.shape()).collided,
            _ => false,
        }
    }

    fn set_player_vx(&mut self, vx: f64) {
        if let Some(player) = self.scene.body_mut(self.player) {
            player.set_velocity(Vector2::new(vx, player.velocity().y));
        }
    }

    fn maybe_drop_powerup(&mut self) {
        if self.since_drop < self.config.powerup_interval {
            return;
        }
        self.since_drop = 0.0;
        if self.count_of(|k| matches!(k, BodyKind::Powerup(_))) >= self.config.max_powerups {
            return;
        }
        let margin = self.config.wall_thickness + self.config.powerup_size;
        let x = self.rng.gen_range(margin..self.config.field.x - margin);
        let weapon = if self.rng.gen_bool(0.5) {
            Weapon::Shotgun
        } else {
            Weapon::Ricochet
        };
        if let Err(err) = self.spawn_powerup(x, weapon) {
            debug!("Powerup drop skipped: {err}");
        }
    }

    fn keep_player_in_field(&mut self) {
        let half = self.config.player_size.x / 2.0;
        let min_x = self.config.wall_thickness / 2.0 + half;
        let max_x = self.config.field.x - min_x;
        if let Some(player) = self.scene.body_mut(self.player) {
            let c = player.centroid();
            let x = c.x.clamp(min_x, max_x);
            if x != c.x {
                player.set_centroid(Vector2::new(x, c.y));
            }
        }
    }
}

impl Demo for Powerups {
    fn name(&self) -> &'static str {
        "powerups"
    }

    fn scene(&self) -> &Scene<BodyKind> {
        &self.scene
    }

    fn handle_key(&mut self, event: KeyEvent) {
        let speed = self.config.player_speed;
        match (event.kind, event.key) {
            (KeyEventKind::Pressed, Key::Left) => {
                self.facing = -1.0;
                self.set_player_vx(-speed);
            }
            (KeyEventKind::Pressed, Key::Right) => {
                self.facing = 1.0;
                self.set_player_vx(speed);
            }
            (KeyEventKind::Released, Key::Left | Key::Right) => self.set_player_vx(0.0),
            (KeyEventKind::Pressed, Key::Up) => {
                if self.on_ground() {
                    let jump = self.config.jump_speed;
                    if let Some(player) = self.scene.body_mut(self.player) {
                        player.set_velocity(Vector2::new(player.velocity().x, jump));
                    }
                }
            }
            (KeyEventKind::Pressed, Key::Space) => {
                if let Err(err) = self.shoot() {
                    debug!("Shot skipped: {err}");
                }
            }
            _ => {}
        }
    }

    fn step(&mut self, dt: f64) -> Outcome {
        let dt = dt * self.config.time_scale;
        self.since_drop += dt;
        self.maybe_drop_powerup();
        self.keep_player_in_field();
        self.scene.tick(dt);
        Outcome::Running
    }
}
