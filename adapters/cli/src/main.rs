#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that launches either arcade game.

mod clock;
mod config;
mod puzzle;
mod tank;

use std::path::PathBuf;

use anyhow::{Context, Result};
use arcade_rendering_macroquad::MacroquadBackend;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::config::GameConfig;

/// Command-line arguments accepted by the arcade launcher.
#[derive(Debug, Parser)]
#[command(name = "arcade", about = "Falling-block puzzle and tank chase")]
struct CliArgs {
    /// Optional TOML configuration file.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Seed for every random source; drawn from the OS when omitted.
    #[arg(long)]
    seed: Option<u64>,
    /// Log the frame rate once per second.
    #[arg(long)]
    show_fps: bool,
    /// Synchronise presentation with the display refresh rate.
    #[arg(long, value_name = "BOOL")]
    vsync: Option<bool>,
    #[command(subcommand)]
    game: GameChoice,
}

/// Game selected on the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Subcommand)]
enum GameChoice {
    /// Falling-block puzzle.
    Puzzle,
    /// Tank and pellet chase.
    Tank,
}

/// Entry point for the arcade command-line interface.
fn main() -> Result<()> {
    init_tracing();
    let args = CliArgs::parse();

    let config = match &args.config {
        Some(path) => GameConfig::load(path)
            .with_context(|| format!("failed to load configuration from {}", path.display()))?,
        None => GameConfig::default(),
    };
    let seed = args.seed.or(config.seed).unwrap_or_else(rand::random);

    let mut backend = MacroquadBackend::new().with_show_fps(args.show_fps);
    if let Some(vsync) = args.vsync {
        backend = backend.with_vsync(vsync);
    }

    match args.game {
        GameChoice::Puzzle => puzzle::run(&config.puzzle, seed, backend),
        GameChoice::Tank => {
            let layout = config.tank.layout().context("failed to load tank level")?;
            tank::run(&config.tank, layout, seed, backend)
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}
