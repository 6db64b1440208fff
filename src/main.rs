use anyhow::{anyhow, Context, Result};
use clap::Parser;
use eframe::NativeOptions;
use egui::WindowLevel;
use tracing_subscriber::EnvFilter;

use egui_playlist::cli::{self, Args, USAGE};
use egui_playlist::PlaylistApp;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("warn,egui_playlist=info")),
        )
        .init();

    let args = Args::parse();

    let playlist = match args.playlist() {
        Ok(playlist) => playlist,
        Err(e) => {
            println!("Error: {e}");
            println!("{USAGE}");
            std::process::exit(1);
        }
    };

    ffmpeg_next::init().context("Failed to initialize FFmpeg")?;
    tracing::info!(videos = playlist.len(), "Starting playlist");

    let window_level = if args.windowed {
        WindowLevel::Normal
    } else {
        WindowLevel::AlwaysOnTop
    };

    let options = NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Video Player")
            .with_inner_size([800.0, 650.0])
            .with_min_inner_size([480.0, 360.0])
            .with_window_level(window_level),
        ..Default::default()
    };

    cli::print_controls();

    eframe::run_native(
        "Video Player",
        options,
        Box::new(move |cc| Ok(Box::new(PlaylistApp::new(cc, playlist)))),
    )
    .map_err(|e| anyhow!("{e}"))
}
