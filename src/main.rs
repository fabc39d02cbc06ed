mod app;
mod state;
mod ui;

use std::path::PathBuf;

use app::SpectraApp;
use clap::Parser;
use eframe::egui;
use rusty_spectra::Config;

/// Interactive spectral viewer
#[derive(Parser)]
#[command(name = "rusty-spectra")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Files to open at startup
    #[arg(value_name = "FILE")]
    files: Vec<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    let mut app = SpectraApp::new(config);
    for path in &args.files {
        app.state.load_path(path);
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Rusty Spectra – Spectral Viewer",
        options,
        Box::new(|_cc| Ok(Box::new(app))),
    )
    .map_err(|e| anyhow::anyhow!("viewer failed: {e}"))
}
