//! Polyarcade Engine Library
//!
//! A discrete-time 2D polygon physics engine for arcade-style demos.
//! The library owns a scene of rigid convex polygons, advances their motion
//! once per frame, and evaluates pluggable interactions (fields such as
//! gravity, springs and drag, and collision responses such as elastic
//! bounce, destruction and pickups) without hard-coding them into the loop.
//!
//! # Modules
//!
//! - [`physics`] - Vector math, bodies, scenes, interactions and SAT collision
//! - [`game`] - Headless game-rule layer (demos, input model, outcomes)
//!
//! # Example
//!
//! ```ignore
//! use polyarcade_engine::physics::{Body, Polygon, Rgb, Scene, Vector2};
//!
//! let mut scene: Scene = Scene::new();
//! let ball = scene.add_body(Body::new(Polygon::regular(1.0, 16), 2.0, Rgb::RED));
//! let wall = scene.add_body(Body::new(Polygon::rect(1.0, 50.0), f64::INFINITY, Rgb::BLUE));
//!
//! scene.body_mut(ball).unwrap().set_velocity(Vector2::new(30.0, 0.0));
//! scene.add_physics_collision(1.0, ball, wall).unwrap();
//!
//! // The external driver supplies elapsed time every frame
//! scene.tick(1.0 / 60.0);
//! ```

pub mod physics;

// Game-rule layer (located in src/game/ directory)
#[path = "../../src/game/mod.rs"]
pub mod game;

// Re-export the types almost every caller touches
pub use physics::{
    Body, BodyHandle, EngineError, Interaction, Polygon, Rgb, Scene, SceneError,
    SimulationConfig, Vector2,
};
