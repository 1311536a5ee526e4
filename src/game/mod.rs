//! Game Module
//!
//! Arcade demos built on top of the physics engine. Each demo owns a
//! [`Scene`] of [`BodyKind`]-tagged bodies, reacts to [`KeyEvent`]s and
//! reports an [`Outcome`] after every step instead of exiting the process.

pub mod breakout;
pub mod damping;
pub mod nbodies;
pub mod powerups;
pub mod space_invaders;

use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::physics::{ConfigError, EngineError, Scene, SceneError, SimulationConfig};

pub use breakout::{Breakout, BreakoutConfig};
pub use damping::{Damping, DampingConfig};
pub use nbodies::{NBodies, NBodiesConfig};
pub use powerups::{Powerups, PowerupsConfig};
pub use space_invaders::{SpaceInvaders, SpaceInvadersConfig};

/// Time multiplier the demos were tuned for.
pub const DEMO_TIME_SCALE: f64 = 50.0;

// ============================================================================
// Body tags
// ============================================================================

/// Player weapons in the powerups demo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Weapon {
    Pistol,
    Ricochet,
    Shotgun,
}

/// What a body is, as far as game rules care.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BodyKind {
    Player { weapon: Weapon, shots_left: u32 },
    Paddle,
    Ball,
    Brick,
    Wall,
    Ground,
    Invader,
    PlayerBullet,
    InvaderBullet,
    Star,
    Anchor,
    Powerup(Weapon),
}

impl BodyKind {
    pub const fn player() -> Self {
        Self::Player {
            weapon: Weapon::Pistol,
            shots_left: 0,
        }
    }

    pub fn is_player(&self) -> bool {
        matches!(self, Self::Player { .. })
    }
}

// ============================================================================
// Input
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Left,
    Right,
    Up,
    Down,
    Space,
    Char(char),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEventKind {
    Pressed,
    Released,
}

/// One key transition delivered by the input layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: Key,
    pub kind: KeyEventKind,
}

impl KeyEvent {
    pub fn pressed(key: Key) -> Self {
        Self {
            key,
            kind: KeyEventKind::Pressed,
        }
    }

    pub fn released(key: Key) -> Self {
        Self {
            key,
            kind: KeyEventKind::Released,
        }
    }
}

// ============================================================================
// Demo contract
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LossReason {
    /// Breakout ball fell past the paddle
    BallLost,
    /// Player was destroyed by an enemy shot
    PlayerHit,
    /// Invaders reached the bottom of the field
    InvadersLanded,
}

/// State of a demo after a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Running,
    Won,
    Lost(LossReason),
}

impl Outcome {
    pub fn is_finished(&self) -> bool {
        !matches!(self, Self::Running)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Running => write!(f, "running"),
            Self::Won => write!(f, "won"),
            Self::Lost(LossReason::BallLost) => write!(f, "lost (ball lost)"),
            Self::Lost(LossReason::PlayerHit) => write!(f, "lost (player hit)"),
            Self::Lost(LossReason::InvadersLanded) => write!(f, "lost (invaders landed)"),
        }
    }
}

/// A playable demo driven by an external loop.
pub trait Demo {
    fn name(&self) -> &'static str;

    /// Bodies to draw, in insertion order.
    fn scene(&self) -> &Scene<BodyKind>;

    fn handle_key(&mut self, event: KeyEvent);

    /// Apply game rules and tick the scene by `dt` of simulated time.
    fn step(&mut self, dt: f64) -> Outcome;
}

// ============================================================================
// Demo selection
// ============================================================================

#[derive(Debug, Error)]
pub enum GameError {
    #[error("Unknown demo '{0}' (expected one of: breakout, space_invaders, nbodies, damping, powerups)")]
    UnknownDemo(String),

    #[error(transparent)]
    Engine(#[from] EngineError),
}

impl From<ConfigError> for GameError {
    fn from(err: ConfigError) -> Self {
        Self::Engine(err.into())
    }
}

impl From<SceneError> for GameError {
    fn from(err: SceneError) -> Self {
        Self::Engine(err.into())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DemoKind {
    Breakout,
    SpaceInvaders,
    NBodies,
    Damping,
    Powerups,
}

impl DemoKind {
    pub const ALL: [DemoKind; 5] = [
        DemoKind::Breakout,
        DemoKind::SpaceInvaders,
        DemoKind::NBodies,
        DemoKind::Damping,
        DemoKind::Powerups,
    ];

    /// Build the demo, reading its configuration from `json` when given.
    ///
    /// Collision elasticities the demo config leaves unset fall back to
    /// `sim.default_elasticity`.
    pub fn build(
        self,
        json: Option<&str>,
        seed: u64,
        sim: &SimulationConfig,
    ) -> Result<Box<dyn Demo>, GameError> {
        let demo: Box<dyn Demo> = match self {
            Self::Breakout => {
                let mut config: BreakoutConfig = load_config(json)?;
                config.elasticity = config.elasticity.or(Some(sim.default_elasticity));
                Box::new(Breakout::new(config, seed)?)
            }
            Self::SpaceInvaders => Box::new(SpaceInvaders::new(load_config(json)?, seed)?),
            Self::NBodies => Box::new(NBodies::new(load_config(json)?, seed)?),
            Self::Damping => Box::new(Damping::new(load_config(json)?)?),
            Self::Powerups => {
                let mut config: PowerupsConfig = load_config(json)?;
                config.ricochet_elasticity = config.ricochet_elasticity.or(Some(sim.default_elasticity));
                Box::new(Powerups::new(config, seed)?)
            }
        };
        Ok(demo)
    }
}

impl FromStr for DemoKind {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "breakout" => Ok(Self::Breakout),
            "space_invaders" | "invaders" => Ok(Self::SpaceInvaders),
            "nbodies" | "n_bodies" => Ok(Self::NBodies),
            "damping" => Ok(Self::Damping),
            "powerups" => Ok(Self::Powerups),
            _ => Err(GameError::UnknownDemo(s.to_string())),
        }
    }
}

// ============================================================================
// Demo configuration
// ============================================================================

/// A demo's tunables. Every field has a serde default.
pub trait DemoConfig: DeserializeOwned + Default {
    /// Reject values the demo cannot build a scene from.
    fn validate(&self) -> Result<(), ConfigError>;
}

/// Parse and validate a demo config, falling back to defaults for missing
/// fields or a missing document.
pub fn load_config<T: DemoConfig>(json: Option<&str>) -> Result<T, ConfigError> {
    let config = match json {
        Some(text) => serde_json::from_str(text)?,
        None => T::default(),
    };
    config.validate()?;
    Ok(config)
}

/// `Err(InvalidValue)` naming `field` unless `ok`.
pub(crate) fn require(
    ok: bool,
    field: &str,
    value: impl fmt::Display,
    rule: &str,
) -> Result<(), ConfigError> {
    if ok {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, format!("{value} (must be {rule})")))
    }
}

pub(crate) fn require_positive(field: &str, value: f64) -> Result<(), ConfigError> {
    require(value > 0.0 && value.is_finite(), field, value, "> 0")
}

/// Positive mass, or [`INFINITE_MASS`](crate::physics::INFINITE_MASS).
pub(crate) fn require_mass(field: &str, value: f64) -> Result<(), ConfigError> {
    require(value > 0.0, field, value, "> 0")
}

pub(crate) fn require_extent(field: &str, value: crate::physics::Vector2) -> Result<(), ConfigError> {
    require(
        value.x > 0.0 && value.y > 0.0 && value.is_finite(),
        field,
        value,
        "> 0 on both axes",
    )
}

pub(crate) fn require_sides(field: &str, value: usize) -> Result<(), ConfigError> {
    require(value >= 3, field, value, ">= 3")
}

pub(crate) fn require_elasticity(field: &str, value: Option<f64>) -> Result<(), ConfigError> {
    match value {
        Some(e) => require((0.0..=1.0).contains(&e), field, e, "within 0..=1"),
        None => Ok(()),
    }
}
