use anyhow::Context;
use clap::Parser;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

mod audio;
mod color;
mod config;
mod driver;
mod error;
mod firework;
mod launcher;
mod phase;
mod session;
mod simulation;
mod surface;
mod timer;

use driver::ShowOptions;

/// Fireworks in the terminal, with a message revealed after the opening show.
///
/// Enter or Space starts the show, r replays it, q / Esc / Ctrl+C quits.
#[derive(Parser, Debug)]
#[command(name = "skyburst", version, about)]
struct Cli {
    /// Seed for the show's random source (launch positions, burst shapes)
    #[arg(long)]
    seed: Option<u64>,

    /// Write logs to this file (RUST_LOG overrides the default filter)
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Disable the detonation tone
    #[arg(long)]
    mute: bool,

    /// Headline shown when the message is revealed
    #[arg(long, default_value = "I love you")]
    message: String,

    /// Start the show immediately instead of waiting at the prompt
    #[arg(long)]
    autostart: bool,
}

// Logging goes to a file only: anything written to the terminal would land on the show.
fn init_logging(path: &Path) -> anyhow::Result<()> {
    let file = File::create(path).with_context(|| format!("creating log file {}", path.display()))?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("skyburst=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Some(path) = &cli.log_file {
        init_logging(path)?;
    }

    tracing::info!(seed = ?cli.seed, mute = cli.mute, "starting");

    let options = ShowOptions {
        seed: cli.seed,
        muted: cli.mute,
        headline: cli.message,
        autostart: cli.autostart,
    };
    driver::run(&options)
}
