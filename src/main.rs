mod app;
mod builtin;
mod catalog;
mod config;
mod geometry;
mod input;
mod logging;
mod mascot;
mod meme;
mod menu;
mod player;
mod render;
mod rng;
mod timers;

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(name = "termascot")]
#[command(about = "A sprite mascot that lives in your terminal", long_about = None)]
pub(crate) struct Cli {
    /// Sprites directory; extends and overrides the built-in pack
    #[arg(long)]
    pub(crate) sprites: Option<PathBuf>,

    /// Settings file (default: settings.json in the data directory)
    #[arg(long)]
    pub(crate) settings: Option<PathBuf>,

    /// AFK behaviour toggle file
    #[arg(long)]
    pub(crate) afk_settings: Option<PathBuf>,

    /// RNG seed; 0 picks one from the clock
    #[arg(long)]
    pub(crate) seed: Option<u64>,

    /// Log file (default: termascot.log in the data directory)
    #[arg(long)]
    pub(crate) log_file: Option<PathBuf>,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    pub(crate) log_level: String,

    /// Never fetch memes; the meme cart carries the placeholder card
    #[arg(long, default_value_t = false)]
    pub(crate) no_meme: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let paths = config::project_paths()?;

    let log_path = cli.log_file.clone().unwrap_or_else(|| paths.log_path.clone());
    logging::init(&log_path, &cli.log_level)?;

    app::run(&cli, paths)
}
