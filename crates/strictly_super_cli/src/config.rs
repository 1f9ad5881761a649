//! Front-end configuration.

use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::path::Path;
use strictly_super::Player;
use tracing::{debug, info, instrument};

/// Settings read from an optional TOML file.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct CliConfig {
    /// Who moves first in a new game.
    #[serde(default = "default_starting_player")]
    starting_player: Player,

    /// Log filter used when `RUST_LOG` is not set.
    #[serde(default = "default_log_filter")]
    log_filter: String,

    /// Print the legal moves after every turn.
    #[serde(default = "default_show_legal_moves")]
    show_legal_moves: bool,
}

fn default_starting_player() -> Player {
    Player::X
}

fn default_log_filter() -> String {
    "warn".to_string()
}

fn default_show_legal_moves() -> bool {
    true
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            starting_player: default_starting_player(),
            log_filter: default_log_filter(),
            show_legal_moves: default_show_legal_moves(),
        }
    }
}

impl CliConfig {
    /// Loads configuration from a TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;

        info!(starting_player = %config.starting_player, "Config loaded successfully");
        Ok(config)
    }

    /// Loads `path` if given, otherwise returns the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    /// Returns a copy with the starting player replaced.
    pub fn with_starting_player(mut self, player: Option<Player>) -> Self {
        if let Some(player) = player {
            self.starting_player = player;
        }
        self
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}
