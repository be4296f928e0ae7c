mod app;
mod color;
mod state;
mod ui;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use eframe::egui;

use app::ExplorerApp;
use cord19_explorer::{report, ExplorerConfig, ExplorerSession};
use state::AppState;

/// Explore CORD-19 paper metadata.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Metadata file to open (csv, tsv, json or parquet).
    #[arg(long)]
    data: Option<PathBuf>,

    /// JSON config file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print a text report to stdout instead of opening the window.
    #[arg(long)]
    report: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut config = ExplorerConfig::load(args.config.as_deref()).context("loading config")?;
    if let Some(data) = args.data {
        config.data_path = data;
    }

    let mut session = ExplorerSession::new(config);

    if args.report {
        let config = session.config().clone();
        let table = session.load().context("loading metadata")?;
        print!("{}", report::render(table, &config));
        return Ok(());
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 860.0])
            .with_min_inner_size([720.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "CORD-19 Data Explorer",
        options,
        Box::new(|_cc| Ok(Box::new(ExplorerApp::new(AppState::new(session))))),
    )
    .map_err(|e| anyhow::anyhow!("running the explorer window: {e}"))
}
