mod config;
mod error;
mod logging;
mod ops;
mod player;
mod types;
mod ui;

use std::path::{Path, PathBuf};

use clap::Parser;

use crate::config::PlayerSettings;
use crate::logging::init_logging;
use crate::player::default_engine;
use crate::player::loop_controller::LoopController;
use crate::ui::app::LoopApp;

/// Loops a video between the start and end times listed in a timestamp file.
#[derive(Parser, Debug)]
#[command(name = "vidloop", version)]
struct Args {
    /// Timestamp file (JSON). A video with the same name next to it is opened too.
    #[arg(value_name = "TIMESTAMP_FILE")]
    timestamp_file: Option<PathBuf>,

    /// Video to open, overriding the one found next to the timestamp file.
    #[arg(long, alias = "video_filename", value_name = "VIDEO")]
    video_filename: Option<PathBuf>,

    /// Settings file (TOML).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Debug logging unless VIDLOOP_LOG or RUST_LOG say otherwise.
    #[arg(short, long)]
    verbose: bool,
}

fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    init_logging(args.verbose);

    let settings = PlayerSettings::load(args.config.as_deref())?;
    let engine = default_engine(&settings)?;
    let mut app = LoopApp::new(LoopController::new(engine, settings));

    if let Some(path) = &args.timestamp_file {
        app.open_timestamps(&absolute(path));
    }
    if let Some(path) = &args.video_filename {
        app.open_video(&absolute(path));
    }

    let native_options = eframe::NativeOptions::default();
    eframe::run_native(
        "vidloop",
        native_options,
        Box::new(|_cc| Ok(Box::new(app))),
    )?;
    Ok(())
}
