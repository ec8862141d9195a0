//! Dash Runner entry point
//!
//! Native headless demo: plays every level found in the level directory with
//! the autopilot and logs how each run ended.
//!
//! Usage: `dash-runner [settings.json]`

use std::path::{Path, PathBuf};

use dash_runner::{
    Settings,
    assets::{LevelAssets, NullAssets},
    audio::AudioManager,
    consts::*,
    sim::{FixedStep, GameState, Level, LevelError, Outcome, TickInput, discover_levels},
};

/// Simulated seconds before a demo run is abandoned
const DEMO_TIME_LIMIT: f32 = 120.0;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Dash Runner (headless demo) starting...");

    let settings_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("settings.json"));
    let settings = Settings::load_or_default(&settings_path);

    let levels = match discover_levels(&settings.level_dir) {
        Ok(levels) => levels,
        Err(e) => {
            log::error!("{e}");
            std::process::exit(1);
        }
    };
    if levels.is_empty() {
        log::warn!("No levels found in {}", settings.level_dir.display());
        return;
    }

    for info in &levels {
        match play(&info.path, &settings) {
            Ok((outcome, elapsed)) => log::info!("{}: {:?} after {:.2}s", info.title, outcome, elapsed),
            Err(e) => log::error!("{}: {e}", info.title),
        }
    }
}

/// Play one level to the end (or the time limit) with the autopilot
fn play(path: &Path, settings: &Settings) -> Result<(Outcome, f32), LevelError> {
    let level = Level::load_from_file(path)?;
    let assets = LevelAssets::resolve(&level, &settings.asset_root, &mut NullAssets);

    let mut audio = AudioManager::default();
    settings.apply_audio(&mut audio);
    audio.set_music(assets.music.clone());
    audio.start_music();

    let seed = settings.seed.unwrap_or_else(rand::random::<u64>);
    log::info!("Starting run with seed {seed}");
    let mut state = GameState::new(level, settings.tuning, seed);
    let mut stepper = FixedStep::new();
    let mut input = TickInput {
        idle_mode: true,
        ..Default::default()
    };

    while state.outcome() == Outcome::Playing && state.run.elapsed < DEMO_TIME_LIMIT {
        stepper.advance(SIM_DT, &mut state, &mut input, &mut audio);
        for event in state.drain_events() {
            log::debug!("{:.2}s {event:?}", state.run.elapsed);
        }
    }

    Ok((state.outcome(), state.run.elapsed))
}
