//! Error types
//!
//! Precondition violations (malformed shapes, non-positive mass) are
//! programming errors and panic in debug builds. The types here cover the
//! recoverable cases: stale handles, bad indices and bad configuration.
//! [`Scene::tick`](super::Scene::tick) never returns an error.

use thiserror::Error;

use super::scene::BodyHandle;

/// Top-level error type for the engine.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Scene error: {0}")]
    Scene(#[from] SceneError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Errors from scene accessors and interaction registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SceneError {
    #[error("Body index {index} out of range (scene has {len} bodies)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Unknown or removed body: {0}")]
    UnknownBody(BodyHandle),

    #[error("Interaction needs two distinct bodies, got {0} twice")]
    SelfInteraction(BodyHandle),
}

/// Configuration loading and validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

impl ConfigError {
    pub fn invalid(field: &str, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            message: message.into(),
        }
    }
}
