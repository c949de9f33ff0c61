//! Castle Siege headless runner
//!
//! Builds a level, trades scripted shots between the two castles and logs
//! what happened. Useful for tuning configs and checking blueprints.

#[cfg(not(target_arch = "wasm32"))]
use std::path::PathBuf;

#[cfg(not(target_arch = "wasm32"))]
use anyhow::{Context, Result};
#[cfg(not(target_arch = "wasm32"))]
use clap::Parser;

#[cfg(not(target_arch = "wasm32"))]
#[derive(Parser, Debug)]
#[command(name = "castle-siege")]
#[command(about = "Run a headless castle siege and report the damage")]
struct Cli {
    /// Blueprint text file (one row per line, `-` for empty)
    #[arg(long)]
    blueprint: Option<PathBuf>,

    /// JSON game config; missing keys keep their defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Config overrides, e.g. `--set physicsSpeed=0.5`
    #[arg(long = "set", value_name = "KEY=VALUE")]
    overrides: Vec<String>,

    /// Frames to simulate after each shot
    #[arg(long, default_value_t = 240)]
    frames: u32,

    /// Number of shots, alternating red and blue
    #[arg(long, default_value_t = 2)]
    shots: u32,

    /// Slingshot pull for red as `dx,dy` (launch goes opposite the pull)
    #[arg(long, value_delimiter = ',', num_args = 2, allow_hyphen_values = true, default_values_t = [-160.0, 90.0])]
    pull: Vec<f32>,

    #[arg(long, default_value_t = 1)]
    seed: u64,

    #[arg(long, default_value_t = 1600.0)]
    width: f32,

    #[arg(long, default_value_t = 900.0)]
    height: f32,

    /// Print the normalized blueprint and exit
    #[arg(long)]
    export: bool,
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> Result<()> {
    use castle_siege::blueprint::{Blueprint, castle_blueprint, load_blueprint};
    use castle_siege::render::Frame;
    use castle_siege::sim::{Shot, TickInput, tick};
    use castle_siege::{GameConfig, Session, Team};
    use glam::Vec2;

    env_logger::init();
    let cli = Cli::parse();

    let blueprint = match &cli.blueprint {
        Some(path) => Blueprint::new(load_blueprint(path)?.as_slice()),
        None => castle_blueprint(),
    };
    if cli.export {
        print!("{}", blueprint.to_text());
        return Ok(());
    }

    let mut config = match &cli.config {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::default(),
    };
    for entry in &cli.overrides {
        let (key, value) = entry
            .split_once('=')
            .with_context(|| format!("override {entry:?} is not KEY=VALUE"))?;
        let value: f32 = value
            .trim()
            .parse()
            .with_context(|| format!("override {entry:?} has a non-numeric value"))?;
        config.set(key.trim(), value)?;
    }

    log::info!("Castle Siege (headless) seed {}", cli.seed);
    let mut session = Session::new(config, cli.width, cli.height, cli.seed).with_blueprint(blueprint);
    session.reset_level();
    let blocks_at_start = session.telemetry().live_blocks;

    let red_pull = match cli.pull.as_slice() {
        [dx, dy] => Vec2::new(*dx, *dy),
        _ => anyhow::bail!("--pull takes exactly two numbers"),
    };

    let mut destroyed = 0;
    let mut hits = 0;
    for shot_index in 0..cli.shots {
        let team = session.current_team;
        // Blue fires leftward: mirror the pull
        let pull = match team {
            Team::Red => red_pull,
            Team::Blue => Vec2::new(-red_pull.x, red_pull.y),
        };
        let shot = Shot::new(Vec2::ZERO, pull);

        if let Some(path) = session.aim_preview(&shot) {
            if let Some(landing) = path.last() {
                log::info!(
                    "Shot {} ({}): predicted landing ({:.0}, {:.0}) after {} steps",
                    shot_index + 1,
                    team.as_str(),
                    landing.x,
                    landing.y,
                    path.len()
                );
            }
        }

        let mut input = TickInput { fire: Some(shot), ..Default::default() };
        for _ in 0..cli.frames {
            let report = tick(&mut session, &input);
            if report.fired.is_none() && input.fire.is_some() {
                log::warn!("{} could not fire", team.as_str());
            }
            input.fire = None;
            hits += report.blocks_hit;
            destroyed += report.destroyed.len();
        }

        let telemetry = session.telemetry();
        log::info!(
            "After shot {}: frame {}, {} blocks left, {} bodies moving",
            shot_index + 1,
            telemetry.frame,
            telemetry.live_blocks,
            telemetry.moving_bodies
        );
    }

    let frame = Frame::capture(&session, None);
    log::info!(
        "Done: {} block hits, {} of {} blocks destroyed, final frame has {} rects / {} circles / {} lines",
        hits,
        destroyed,
        blocks_at_start,
        frame.rects.len(),
        frame.circles.len(),
        frame.lines.len()
    );
    Ok(())
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The library is the product on wasm; there is no runner
}
