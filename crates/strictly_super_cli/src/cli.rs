//! Command-line interface for strictly_super.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use strictly_super::Player;

/// Strictly Super - super tic-tac-toe in the terminal
#[derive(Parser, Debug)]
#[command(name = "strictly_super")]
#[command(about = "Play or replay super tic-tac-toe games", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to a TOML config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Play interactively, reading moves from stdin
    Play {
        /// Who moves first (overrides the config file)
        #[arg(long, value_enum)]
        starting_player: Option<FirstPlayer>,
    },

    /// Replay a JSON list of moves and print the final state
    Replay {
        /// File holding `[{"board_index": 0, "cell_index": 4}, ...]`
        file: PathBuf,

        /// Who made the first move (overrides the config file)
        #[arg(long, value_enum)]
        starting_player: Option<FirstPlayer>,
    },

    /// Print the initial game state as JSON
    New,
}

/// Player choice on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FirstPlayer {
    /// X moves first
    #[value(name = "X", alias = "x")]
    X,
    /// O moves first
    #[value(name = "O", alias = "o")]
    O,
}

impl From<FirstPlayer> for Player {
    fn from(choice: FirstPlayer) -> Self {
        match choice {
            FirstPlayer::X => Player::X,
            FirstPlayer::O => Player::O,
        }
    }
}
