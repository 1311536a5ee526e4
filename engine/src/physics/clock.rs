//! Time sources
//!
//! The scene has no global clock. Drivers own a [`TimeSource`] and pass it
//! (or the `dt` it yields) into the scene each frame, so headless runs and
//! tests are reproducible.

use std::time::Instant;

/// Something that reports the time elapsed since it was last asked.
pub trait TimeSource {
    /// Seconds since the previous call.
    fn elapsed(&mut self) -> f64;
}

/// Wall-clock time source. The first call returns `0.0`.
#[derive(Debug, Default)]
pub struct FrameClock {
    last: Option<Instant>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TimeSource for FrameClock {
    fn elapsed(&mut self) -> f64 {
        let now = Instant::now();
        let dt = self
            .last
            .map(|last| now.duration_since(last).as_secs_f64())
            .unwrap_or(0.0);
        self.last = Some(now);
        dt
    }
}

/// Deterministic source that always reports the same step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedStep(pub f64);

impl TimeSource for FixedStep {
    fn elapsed(&mut self) -> f64 {
        self.0
    }
}
