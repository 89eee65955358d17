//! # Handmade
//!
//! Runs the frame loop against the scripted platform.
//!
//! ```bash
//! # Default config (./handmade.toml, built-in defaults if absent)
//! ./handmade
//!
//! # Explicit config, verbose
//! RUST_LOG=debug ./handmade demo.toml
//! ```

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use handmade::constants::{CONFIG_ARENA_KB, DEFAULT_CONFIG_PATH};
use handmade::render::encode_ppm;
use handmade::{App, AppConfig, AppResult, AudioSettings, ScriptedPlatform};
use handmade_core::{kilobytes, write_file, Arena};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true))
        .init();
}

/// Reads the config through a scratch arena. A missing default file means
/// built-in defaults; a missing explicit file is an error.
fn load_config(path: &Path, explicit: bool) -> AppResult<(AppConfig, Option<i64>)> {
    if !explicit && !path.exists() {
        tracing::info!(path = %path.display(), "no config file, using defaults");
        return Ok((AppConfig::default(), None));
    }

    let mut scratch = Arena::create(kilobytes(CONFIG_ARENA_KB))?;
    let (config, modified) = AppConfig::load(path, &mut scratch)?;
    scratch.destroy();
    Ok((config, Some(modified)))
}

fn run() -> AppResult<()> {
    let arg = std::env::args_os().nth(1);
    let explicit = arg.is_some();
    let path = arg.map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);

    let (config, modified) = load_config(&path, explicit)?;
    let platform = ScriptedPlatform::from_config(
        &config.headless,
        &AudioSettings::from_config(&config.audio),
        config.frame.target_fps,
    )?;
    let snapshot_path = config.headless.snapshot_path.clone();

    let mut app = App::new(platform, config)?;
    if let Some(modified) = modified {
        app.watch_config(&path, modified);
    }

    app.run()?;

    if let Some(snapshot) = snapshot_path {
        write_file(&snapshot, &encode_ppm(app.platform().last_frame()))?;
        tracing::info!(path = %snapshot.display(), "last frame written");
    }

    if let Some(state) = app.game_state() {
        tracing::info!(
            blue_offset = state.blue_offset,
            green_offset = state.green_offset,
            tone_hz = state.tone_hz,
            audio_frames = app.platform().total_queued_frames(),
            "final state"
        );
    }
    app.stats().print_summary();
    Ok(())
}

fn main() -> ExitCode {
    init_logging();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "handmade failed");
            ExitCode::FAILURE
        }
    }
}
