//! Physics module for Polyarcade
//!
//! This module provides the whole simulation core. It is built from scratch
//! without an external physics library: glam supplies the vector type and
//! everything else (polygon math, SAT, impulses) lives here.
//!
//! # Frame Model
//!
//! A [`Scene`] is advanced by [`Scene::tick`] with an externally supplied
//! `dt`. Each tick runs four phases in a fixed order:
//!
//! 1. Field interactions (gravity, spring, drag, normal force, radial tethers)
//! 2. Collision interactions (SAT test, then the handler on overlap)
//! 3. Integration of finite-mass bodies (`centroid += velocity * dt`)
//! 4. Purge of removed bodies and every interaction that depended on them
//!
//! # Submodules
//!
//! - [`types`] - `Vector2` (glam `DVec2`) and the `VecExt` helpers
//! - [`color`] - Render-facing `Rgb` color
//! - [`polygon`] - Convex polygon shapes and shape constructors
//! - [`body`] - Rigid polygon bodies
//! - [`collision`] - Separating-axis overlap test
//! - [`forces`] - Interaction variants and their built-in behaviors
//! - [`scene`] - Body arena, registration and the per-frame algorithm
//! - [`clock`] - Explicit time sources for the driver
//! - [`config`] - JSON-loadable simulation configuration
//! - [`error`] - Error types

pub mod body;
pub mod clock;
pub mod collision;
pub mod color;
pub mod config;
pub mod error;
pub mod forces;
pub mod polygon;
pub mod scene;
pub mod types;

// Re-export commonly used types at the physics module level
pub use body::{Body, INFINITE_MASS};
pub use clock::{FixedStep, FrameClock, TimeSource};
pub use collision::{CollisionInfo, find_collision};
pub use color::Rgb;
pub use config::SimulationConfig;
pub use error::{ConfigError, EngineError, SceneError};
pub use forces::{CollisionHandler, Interaction, Phase, UpgradeFn};
pub use polygon::Polygon;
pub use scene::{BodyHandle, Bodies, Scene};
pub use types::{VEC_TOLERANCE, VecExt, Vector2, within};
