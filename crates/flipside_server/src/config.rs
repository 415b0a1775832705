//! Process configuration loaded from TOML.

use derive_getters::Getters;
use derive_more::{Display, Error};
use derive_setters::Setters;
use flipside_tictactoe::{
    BoardConfig, DEFAULT_FLIP_ODDS, DEFAULT_FLIP_PERIOD, FlipPolicy, MIN_BOARD_SIZE,
    MIN_WIN_LENGTH,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info, instrument};

/// Complete server configuration. Every field has a default, so an empty
/// or partial file is valid.
#[derive(Debug, Clone, Default, PartialEq, Getters, Setters, Serialize, Deserialize)]
#[setters(prefix = "with_")]
#[serde(default)]
pub struct Settings {
    /// Defaults for newly created games.
    game: GameSettings,
    /// HTTP listener.
    server: ServerSettings,
    /// Game storage backend.
    storage: StorageSettings,
    /// Random source used by the flip rule.
    random: RandomSettings,
}

/// Defaults applied to new games.
#[derive(Debug, Clone, PartialEq, Getters, Setters, Serialize, Deserialize)]
#[setters(prefix = "with_")]
#[serde(default)]
pub struct GameSettings {
    /// Board side length.
    board_size: usize,
    /// Run length needed to win.
    win_length: usize,
    /// Every `flip_period`-th move may flip.
    flip_period: usize,
    /// One eligible move in `flip_odds` flips.
    flip_odds: u32,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            board_size: MIN_BOARD_SIZE,
            win_length: MIN_WIN_LENGTH,
            flip_period: DEFAULT_FLIP_PERIOD,
            flip_odds: DEFAULT_FLIP_ODDS,
        }
    }
}

impl GameSettings {
    /// Validated board configuration for new games.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the board size or win length is out of bounds.
    #[track_caller]
    pub fn board_config(&self) -> Result<BoardConfig, ConfigError> {
        BoardConfig::new(self.board_size, self.win_length)
            .map_err(|e| ConfigError::new(format!("[game] {}", e)))
    }

    /// Validated flip policy.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the period or odds is zero.
    #[track_caller]
    pub fn flip_policy(&self) -> Result<FlipPolicy, ConfigError> {
        FlipPolicy::new(self.flip_period, self.flip_odds)
            .map_err(|e| ConfigError::new(format!("[game] {}", e)))
    }
}

/// HTTP listener settings.
#[derive(Debug, Clone, PartialEq, Getters, Setters, Serialize, Deserialize)]
#[setters(prefix = "with_")]
#[serde(default)]
pub struct ServerSettings {
    /// Host to bind to.
    host: String,
    /// Port to bind to.
    port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

/// Which store keeps games.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// SQLite database file.
    #[default]
    Sqlite,
    /// Process memory; games vanish on exit.
    Memory,
}

/// Storage settings.
#[derive(Debug, Clone, PartialEq, Getters, Setters, Serialize, Deserialize)]
#[setters(prefix = "with_")]
#[serde(default)]
pub struct StorageSettings {
    /// Backend kind.
    backend: StorageBackend,
    /// SQLite database path (created if missing).
    database_url: String,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Sqlite,
            database_url: "flipside.db".to_string(),
        }
    }
}

/// Random source settings.
#[derive(Debug, Clone, Default, PartialEq, Getters, Setters, Serialize, Deserialize)]
#[setters(prefix = "with_")]
#[serde(default)]
pub struct RandomSettings {
    /// Fixed seed for reproducible flips; OS entropy when absent.
    seed: Option<u64>,
}

impl Settings {
    /// Loads settings from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read, parsed, or validated.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading settings from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;

        let settings = Self::from_toml(&content)?;
        info!(
            board_size = settings.game.board_size,
            win_length = settings.game.win_length,
            backend = ?settings.storage.backend,
            "Settings loaded"
        );
        Ok(settings)
    }

    /// Parses and validates settings from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] on malformed TOML or invalid game settings.
    #[instrument(skip(content))]
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let settings: Self = toml::from_str(content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Loads settings from `path` if given, else defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be loaded.
    #[instrument]
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                debug!("No config file given, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Checks that the game settings describe a playable game.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.
    #[instrument(skip(self))]
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.game.board_config()?;
        self.game.flip_policy()?;
        Ok(())
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
