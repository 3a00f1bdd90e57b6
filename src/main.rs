//! Deep Feast - Headless Runner
//!
//! Plays a full run with a simple autopilot and reports the result. Useful for
//! balancing passes and for checking that a seed reproduces.

use std::path::PathBuf;

use clap::Parser;
use glam::Vec3;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use deep_feast::core::error::Result;
use deep_feast::simulation::{
    HighScoreStore, InputEvent, JsonHighScoreFile, LogRankingSink, MemoryHighScore, RunSummary,
};
use deep_feast::{GameConfig, SimEvent, Simulation};

/// Headless Runner - autopilot runs for tuning and regression checks
#[derive(Parser, Debug)]
#[command(name = "deep-feast")]
#[command(about = "Run the Deep Feast simulation headless with an autopilot")]
struct Args {
    /// Random seed (overrides the config file's seed)
    #[arg(long)]
    seed: Option<u64>,

    /// Maximum frames to simulate
    #[arg(long, default_value_t = 36_000)]
    frames: u64,

    /// Frame delta in seconds
    #[arg(long, default_value_t = 1.0 / 60.0)]
    dt: f32,

    /// TOML config file; unspecified values keep their defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Name attached to the run summary
    #[arg(long, default_value = "autopilot")]
    nickname: String,

    /// JSON file holding the best score across runs
    #[arg(long)]
    high_score_file: Option<PathBuf>,

    /// Write the final run summary as JSON to this path
    #[arg(long)]
    summary_json: Option<PathBuf>,
}

/// JSON output when the run was cut off by the frame limit
#[derive(Serialize)]
struct UnfinishedRun {
    frames: u64,
    score: u64,
    tier: u8,
    kills: u64,
    play_time_secs: f64,
}

/// Look distance for prey and for threats worth dashing away from
const SEEK_RADIUS: f32 = 60.0;
const THREAT_RADIUS: f32 = 6.0;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("deep_feast=info")),
        )
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => GameConfig::load_from_toml(path)?,
        None => GameConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    tracing::info!("Deep Feast headless run (seed {})", config.seed);

    let mut sim = Simulation::new(config);
    sim.start();
    let mut autopilot = Autopilot::default();

    let mut frame = 0;
    while frame < args.frames && !sim.state().is_terminal() {
        autopilot.steer(&mut sim);
        for event in sim.tick(args.dt) {
            log_milestone(&event);
            autopilot.react(&mut sim, &event);
        }
        frame += 1;
    }

    let mut ranking = LogRankingSink;
    let summary = match &args.high_score_file {
        Some(path) => {
            let mut scores = JsonHighScoreFile::new(path);
            let summary = sim.finish(&args.nickname, &mut ranking, &mut scores)?;
            tracing::info!("Best score on file: {}", scores.load()?);
            summary
        }
        None => sim.finish(&args.nickname, &mut ranking, &mut MemoryHighScore::default())?,
    };

    match summary {
        Some(summary) => report(&summary, args.summary_json.as_ref())?,
        None => {
            let player = sim.store().player();
            let unfinished = UnfinishedRun {
                frames: frame,
                score: player.score,
                tier: player.tier,
                kills: player.kills,
                play_time_secs: player.play_time(sim.now()),
            };
            println!("{}", serde_json::to_string_pretty(&unfinished)?);
        }
    }
    Ok(())
}

fn report(summary: &RunSummary, path: Option<&PathBuf>) -> Result<()> {
    let json = serde_json::to_string_pretty(summary)?;
    println!("{}", json);
    if let Some(path) = path {
        std::fs::write(path, &json)?;
        tracing::info!("Summary written to {}", path.display());
    }
    Ok(())
}

fn log_milestone(event: &SimEvent) {
    match event {
        SimEvent::TierUp { tier } => tracing::info!("Reached tier {}", tier),
        SimEvent::Evolved { tier, cost } => tracing::info!("Evolved to tier {} for {} gold", tier, cost),
        SimEvent::BossWarning { spawn_at } => tracing::info!("Boss incoming at {:.1}s", spawn_at),
        SimEvent::WorldEventStarted { kind, .. } => tracing::info!("World event: {:?}", kind),
        SimEvent::QuestCompleted { id } => tracing::info!("Quest complete: {}", id),
        SimEvent::Cleared { at } => tracing::info!("Cleared at {:.1}s", at),
        SimEvent::GameOver { at } => tracing::info!("Eaten at {:.1}s", at),
        _ => {}
    }
}

/// Keyboard-and-mouse driver that chases the nearest prey
#[derive(Debug, Default)]
struct Autopilot {
    rising: bool,
    sinking: bool,
}

impl Autopilot {
    fn steer(&mut self, sim: &mut Simulation) {
        let store = sim.store();
        let player = store.player();
        let position = player.position;
        let tier = player.tier;

        let threat_near = store.npcs().iter().any(|n| {
            n.alive && !n.is_edible_by(tier) && n.position.distance(position) < THREAT_RADIUS
        }) || store
            .boss()
            .is_some_and(|b| b.position.distance(position) < THREAT_RADIUS * 2.0);

        let target = store
            .npcs()
            .iter()
            .filter(|n| n.alive && n.is_edible_by(tier))
            .map(|n| (n.position, n.position.distance(position)))
            .filter(|(_, dist)| *dist < SEEK_RADIUS)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(pos, _)| pos);
        let current_yaw = sim.input().yaw;

        if threat_near {
            sim.handle_input(InputEvent::KeyDown("ShiftLeft".into()));
            sim.handle_input(InputEvent::KeyUp("ShiftLeft".into()));
        }

        let Some(target) = target else {
            sim.handle_input(InputEvent::KeyUp("KeyW".into()));
            self.set_vertical(sim, 0.0);
            return;
        };
        let to_target = target - position;

        // Forward for yaw θ is (-sin θ, 0, -cos θ)
        let flat = Vec3::new(to_target.x, 0.0, to_target.z);
        if flat.length() > 0.5 {
            let wanted = (-flat.x).atan2(-flat.z);
            let delta = wrap_angle(wanted - current_yaw);
            // Mouse drag rotates yaw by -dx * 0.005
            sim.handle_input(InputEvent::MouseDown { x: 0.0, y: 0.0 });
            sim.handle_input(InputEvent::MouseMove { x: -delta / 0.005, y: 0.0 });
            sim.handle_input(InputEvent::MouseUp);
        }
        sim.handle_input(InputEvent::KeyDown("KeyW".into()));
        self.set_vertical(sim, to_target.y);
    }

    fn set_vertical(&mut self, sim: &mut Simulation, dy: f32) {
        let rise = dy > 0.5;
        let sink = dy < -0.5;
        if rise != self.rising {
            let code = "Space".to_string();
            sim.handle_input(if rise { InputEvent::KeyDown(code) } else { InputEvent::KeyUp(code) });
            self.rising = rise;
        }
        if sink != self.sinking {
            let code = "KeyC".to_string();
            sim.handle_input(if sink { InputEvent::KeyDown(code) } else { InputEvent::KeyUp(code) });
            self.sinking = sink;
        }
    }

    /// Spend whatever the run hands out
    fn react(&mut self, sim: &mut Simulation, event: &SimEvent) {
        match event {
            SimEvent::PerkOffered { options } => {
                if let Some(perk) = options.first() {
                    sim.choose_perk(*perk);
                }
            }
            SimEvent::QuestCompleted { id } => {
                sim.claim_quest(id);
            }
            SimEvent::Ate { .. } => {
                sim.evolve();
            }
            _ => {}
        }
    }
}

fn wrap_angle(angle: f32) -> f32 {
    use std::f32::consts::{PI, TAU};
    (angle + PI).rem_euclid(TAU) - PI
}
