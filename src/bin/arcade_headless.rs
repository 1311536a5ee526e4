//! Headless Arcade Runner
//!
//! Runs one of the demos for a fixed number of frames without a window and
//! logs how the scene evolves.
//!
//! Usage:
//!   cargo run --bin arcade_headless -- --demo breakout --frames 600
//!   cargo run --bin arcade_headless -- --demo nbodies --dt 0.02 --config sim.json
//!   RUST_LOG=polyarcade_engine=debug cargo run --bin arcade_headless -- --demo space_invaders
//!
//! Scripted input: `--press right@10 --release right@40 --press space@50`
//! delivers key events before the given frame.

use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use polyarcade_engine::game::{DemoKind, GameError, Key, KeyEvent, Outcome};
use polyarcade_engine::physics::{ConfigError, FixedStep, SimulationConfig, TimeSource};

#[derive(Parser)]
#[command(about = "Run an arcade physics demo headlessly")]
struct Args {
    /// Demo to run: breakout, space_invaders, nbodies, damping, powerups
    #[arg(long, default_value = "breakout")]
    demo: DemoKind,

    /// Number of frames to simulate
    #[arg(long, default_value_t = 600)]
    frames: u64,

    /// Wall-clock seconds per frame fed to the clock
    #[arg(long, default_value_t = 1.0 / 60.0)]
    dt: f64,

    /// Simulation config (JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Demo-specific config (JSON)
    #[arg(long)]
    demo_config: Option<PathBuf>,

    /// Seed for demo layouts
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Log body counts every N frames (0 = only at the end)
    #[arg(long, default_value_t = 60)]
    log_every: u64,

    /// Key press as `key@frame` (left, right, up, down, space)
    #[arg(long)]
    press: Vec<ScriptedKey>,

    /// Key release as `key@frame`
    #[arg(long)]
    release: Vec<ScriptedKey>,
}

#[derive(Debug, Clone, Copy)]
struct ScriptedKey {
    key: Key,
    frame: u64,
}

impl FromStr for ScriptedKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, frame) = s
            .split_once('@')
            .ok_or_else(|| format!("expected key@frame, got '{s}'"))?;
        let key = match name.to_ascii_lowercase().as_str() {
            "left" => Key::Left,
            "right" => Key::Right,
            "up" => Key::Up,
            "down" => Key::Down,
            "space" => Key::Space,
            other => match other.chars().collect::<Vec<_>>().as_slice() {
                [c] => Key::Char(*c),
                _ => return Err(format!("unknown key '{name}'")),
            },
        };
        let frame = frame
            .parse()
            .map_err(|e| format!("bad frame in '{s}': {e}"))?;
        Ok(Self { key, frame })
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    match run(&args) {
        Ok(outcome) => {
            info!(%outcome, "Finished");
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<Outcome, GameError> {
    let sim = match &args.config {
        Some(path) => SimulationConfig::from_json_file(path)?,
        None => SimulationConfig::default(),
    };
    let demo_json = match &args.demo_config {
        Some(path) => Some(std::fs::read_to_string(path).map_err(ConfigError::from)?),
        None => None,
    };

    let mut demo = args.demo.build(demo_json.as_deref(), args.seed, &sim)?;
    let mut clock = FixedStep(args.dt);
    info!(
        demo = demo.name(),
        bodies = demo.scene().body_count(),
        interactions = demo.scene().interaction_count(),
        "Starting"
    );

    let mut outcome = Outcome::Running;
    for frame in 0..args.frames {
        for scripted in args.press.iter().filter(|k| k.frame == frame) {
            demo.handle_key(KeyEvent::pressed(scripted.key));
        }
        for scripted in args.release.iter().filter(|k| k.frame == frame) {
            demo.handle_key(KeyEvent::released(scripted.key));
        }

        let dt = sim.scaled_dt(clock.elapsed());
        outcome = demo.step(dt);

        if args.log_every > 0 && frame % args.log_every == 0 {
            info!(
                frame,
                bodies = demo.scene().body_count(),
                interactions = demo.scene().interaction_count(),
                "Progress"
            );
        }
        if outcome.is_finished() {
            info!(frame, %outcome, "Demo ended");
            break;
        }
    }

    info!(
        frames = demo.scene().frame(),
        bodies = demo.scene().body_count(),
        "Final scene"
    );
    Ok(outcome)
}
