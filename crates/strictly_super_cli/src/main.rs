//! Strictly Super - terminal front end
//!
//! Plays, replays and prints super tic-tac-toe games. Game output goes to
//! stdout; logs go to stderr.

#![warn(missing_docs)]

mod cli;
mod config;
mod play;
mod replay;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Command, FirstPlayer};
use config::CliConfig;
use std::path::Path;
use strictly_super::{GameState, GameStateDto, MoveRequest};
use tracing::{info, instrument};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = CliConfig::load(cli.config.as_deref())?;
    initialize_tracing(config.log_filter());

    match cli.command {
        Command::Play { starting_player } => run_play(config, starting_player),
        Command::Replay { file, starting_player } => run_replay(config, &file, starting_player),
        Command::New => run_new(config),
    }
}

fn initialize_tracing(fallback: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback)),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Run the interactive game
#[instrument(skip(config))]
fn run_play(config: CliConfig, starting_player: Option<FirstPlayer>) -> Result<()> {
    let config = config.with_starting_player(starting_player.map(Into::into));
    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();
    play::Repl::new(&config).run(stdin.lock(), &mut stdout)
}

/// Replay a move file and print the final state
#[instrument(skip(config), fields(file = %file.display()))]
fn run_replay(config: CliConfig, file: &Path, starting_player: Option<FirstPlayer>) -> Result<()> {
    let config = config.with_starting_player(starting_player.map(Into::into));
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read move file {}", file.display()))?;
    let requests: Vec<MoveRequest> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse move file {}", file.display()))?;

    info!(count = requests.len(), "Replaying moves");
    let state = replay::replay(*config.starting_player(), &requests)?;
    print_state(&state)
}

/// Print a fresh game
#[instrument(skip(config))]
fn run_new(config: CliConfig) -> Result<()> {
    print_state(&GameState::starting_with(*config.starting_player()))
}

fn print_state(state: &GameState) -> Result<()> {
    let json = serde_json::to_string_pretty(&GameStateDto::from(state))
        .context("Failed to serialize game state")?;
    println!("{json}");
    Ok(())
}
