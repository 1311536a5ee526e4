//! Simulation configuration
//!
//! Driver-level knobs, loadable from JSON. Every field has a serde default,
//! so `{}` is a valid configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::error::ConfigError;

const fn default_time_scale() -> f64 {
    1.0
}
const fn default_max_frame_dt() -> f64 {
    0.1
}
const fn default_elasticity() -> f64 {
    1.0
}

/// Driver configuration for advancing a scene from a time source.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Multiplier applied to elapsed time before ticking (demos use 50).
    #[serde(default = "default_time_scale")]
    pub time_scale: f64,

    /// Upper bound on a single frame's elapsed time (seconds, before scaling).
    /// Long stalls are clamped so one tick cannot tunnel everything.
    #[serde(default = "default_max_frame_dt")]
    pub max_frame_dt: f64,

    /// Elasticity used by callers that do not pick their own.
    #[serde(default = "default_elasticity")]
    pub default_elasticity: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            time_scale: default_time_scale(),
            max_frame_dt: default_max_frame_dt(),
            default_elasticity: default_elasticity(),
        }
    }
}

impl SimulationConfig {
    /// Parse and validate a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.time_scale > 0.0 && self.time_scale.is_finite()) {
            return Err(ConfigError::invalid("time_scale", format!("{} (must be > 0)", self.time_scale)));
        }
        if !(self.max_frame_dt > 0.0) {
            return Err(ConfigError::invalid("max_frame_dt", format!("{} (must be > 0)", self.max_frame_dt)));
        }
        if !(0.0..=1.0).contains(&self.default_elasticity) {
            return Err(ConfigError::invalid(
                "default_elasticity",
                format!("{} (must be within 0..=1)", self.default_elasticity),
            ));
        }
        Ok(())
    }

    /// Simulated time for a frame that took `elapsed` wall-clock seconds.
    pub fn scaled_dt(&self, elapsed: f64) -> f64 {
        elapsed.clamp(0.0, self.max_frame_dt) * self.time_scale
    }
}
