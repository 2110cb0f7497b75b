mod app;
mod data;

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use spendfield::{Board, BoardConfig};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Ledger JSON with `transactions` and `categories`; a built-in sample when omitted.
    #[arg(long)]
    data: Option<PathBuf>,

    /// Board configuration JSON; unspecified values keep their defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Any day of the week to show in detail, as YYYY-MM-DD.
    #[arg(long)]
    week: Option<NaiveDate>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("spendfield=info")),
        )
        .init();

    let args = Args::parse();
    let ledger = match &args.data {
        Some(path) => data::load_ledger(path)?,
        None => data::sample_ledger(),
    };
    let config = match &args.config {
        Some(path) => data::load_config(path)?,
        None => BoardConfig::default(),
    };

    let mut board = Board::new(ledger, config).context("failed to build board")?;
    if let Some(week) = args.week {
        board
            .set_selected_week(week)
            .context("failed to select week")?;
    }

    let layout = board.config().layout;
    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_inner_size([layout.width + 40.0, layout.height + 80.0]),
        ..Default::default()
    };

    eframe::run_native(
        "spendfield",
        options,
        Box::new(move |cc| Ok(Box::new(app::SpendfieldApp::new(cc, board)))),
    )
    .map_err(|error| anyhow::anyhow!("{error}"))
}
