//! Point of No Return headless driver
//!
//! Runs one autopilot session at the fixed tick rate without a window and
//! reports what happened. A windowed frontend consumes the same
//! `sim::tick` + `render::RenderFrame` pair.
//!
//! ```text
//! point-of-no-return [--assets DIR] [--tuning FILE] [--settings FILE]
//!                    [--seed N] [--ticks N] [--screenshot FILE.png]
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use point_of_no_return::assets::GameAssets;
use point_of_no_return::render::RenderFrame;
use point_of_no_return::sim::{GameEvent, GamePhase, GameState, TickInput, tick};
use point_of_no_return::{Settings, Tuning};

/// Default session length: two minutes of play
const DEFAULT_TICKS: u64 = 120 * 60;

/// Headless autopilot run of Point of No Return
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory holding one sub-folder of frames per animation
    #[arg(long, value_name = "DIR")]
    assets: Option<PathBuf>,

    /// Balance overrides as JSON
    #[arg(long, value_name = "FILE")]
    tuning: Option<PathBuf>,

    /// Presentation settings as JSON
    #[arg(long, value_name = "FILE")]
    settings: Option<PathBuf>,

    /// Run seed; defaults to the current time
    #[arg(long, value_name = "N")]
    seed: Option<u64>,

    /// Maximum number of ticks to simulate
    #[arg(long, value_name = "N", default_value_t = DEFAULT_TICKS)]
    ticks: u64,

    /// Write the final frame as a PNG
    #[arg(long, value_name = "FILE.png")]
    screenshot: Option<PathBuf>,
}

fn default_seed() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let tuning = match &args.tuning {
        Some(path) => Tuning::load(path)?,
        None => Tuning::default(),
    };
    let settings = match &args.settings {
        Some(path) => Settings::load(path),
        None => Settings::default(),
    };
    let assets = match &args.assets {
        Some(dir) => GameAssets::load(dir, tuning.tick_rate)?,
        None => {
            log::info!("No asset directory given, using placeholder art");
            GameAssets::placeholder()
        }
    };

    let seed = args.seed.unwrap_or_else(default_seed);
    let mut state = GameState::new(seed, tuning, assets)?;
    log::info!("Game initialized with seed: {}", seed);

    let ticks = args.ticks;
    let mut input = TickInput {
        start: true,
        autopilot: true,
        ..Default::default()
    };
    let mut kills = 0u32;
    let mut hits = 0u32;

    for _ in 0..ticks {
        tick(&mut state, &input);
        input.start = false;

        for event in state.outbox.drain() {
            match event {
                GameEvent::DemonKilled { .. } => kills += 1,
                GameEvent::PlayerHit { health } => {
                    hits += 1;
                    log::info!("Player hit, {} health left", health);
                }
                GameEvent::PlayerDied { score } => log::info!("Player died with score {}", score),
                other => log::debug!("{:?}", other),
            }
        }

        if state.phase == GamePhase::Ended {
            break;
        }
    }

    if let Some(path) = &args.screenshot {
        RenderFrame::build(&state, &settings).rasterize().save(path)?;
        log::info!("Screenshot saved to {}", path.display());
    }

    let seconds = state.time_ticks as f32 / state.tuning.tick_rate as f32;
    println!(
        "seed {} | {:.1}s survived | {} demons killed | {} hits taken | score {}",
        seed, seconds, kills, hits, state.score
    );
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();
    log::info!("Point of No Return (headless) starting...");

    let args = Args::parse();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["point-of-no-return"]).unwrap();
        assert_eq!(args.ticks, DEFAULT_TICKS);
        assert!(args.seed.is_none());
        assert!(args.assets.is_none());
        assert!(args.screenshot.is_none());
    }

    #[test]
    fn test_all_flags() {
        let args = Args::try_parse_from([
            "point-of-no-return",
            "--assets",
            "art",
            "--tuning",
            "tuning.json",
            "--settings",
            "settings.json",
            "--seed",
            "42",
            "--ticks",
            "600",
            "--screenshot",
            "out.png",
        ])
        .unwrap();
        assert_eq!(args.assets, Some(PathBuf::from("art")));
        assert_eq!(args.tuning, Some(PathBuf::from("tuning.json")));
        assert_eq!(args.settings, Some(PathBuf::from("settings.json")));
        assert_eq!(args.seed, Some(42));
        assert_eq!(args.ticks, 600);
        assert_eq!(args.screenshot, Some(PathBuf::from("out.png")));
    }

    #[test]
    fn test_bad_values_rejected() {
        assert!(Args::try_parse_from(["point-of-no-return", "--seed", "abc"]).is_err());
        assert!(Args::try_parse_from(["point-of-no-return", "--ticks"]).is_err());
        assert!(Args::try_parse_from(["point-of-no-return", "--window"]).is_err());
    }
}
