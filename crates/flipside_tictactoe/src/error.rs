//! Error types for game creation and move application.

use super::types::Player;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Stable error category exposed to transport layers.
///
/// Callers map categories to status codes without inspecting
/// engine internals.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display, strum::AsRefStr,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCategory {
    /// Bad board size, win length or flip settings.
    Configuration,
    /// Unknown game identifier.
    NotFound,
    /// A move broke a game rule, or its input was malformed.
    RuleViolation,
    /// Another writer changed the game first.
    Conflict,
    /// Storage or other infrastructure failure.
    Internal,
}

/// The configuration bound that was violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum ConfigBound {
    /// Board size below the minimum.
    #[display("board size {} is below the minimum of {}", board_size, minimum)]
    BoardTooSmall {
        /// Requested board size.
        board_size: usize,
        /// Smallest accepted board size.
        minimum: usize,
    },
    /// Board size above the maximum.
    #[display("board size {} exceeds the maximum of {}", board_size, maximum)]
    BoardTooLarge {
        /// Requested board size.
        board_size: usize,
        /// Largest accepted board size.
        maximum: usize,
    },
    /// Win length below the minimum.
    #[display("win length {} is below the minimum of {}", win_length, minimum)]
    WinLengthTooShort {
        /// Requested win length.
        win_length: usize,
        /// Smallest accepted win length.
        minimum: usize,
    },
    /// Win length longer than a board side.
    #[display("win length {} exceeds board size {}", win_length, board_size)]
    WinLengthExceedsBoard {
        /// Requested win length.
        win_length: usize,
        /// Requested board size.
        board_size: usize,
    },
    /// Flip period of zero.
    #[display("flip period must be at least 1")]
    FlipPeriodZero,
    /// Flip odds of zero.
    #[display("flip odds must be at least 1")]
    FlipOddsZero,
}

/// Error that can occur when creating a game or applying a move.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum GameError {
    /// Board size or win length out of bounds.
    #[display("Invalid configuration: {}", _0)]
    InvalidConfiguration(ConfigBound),

    /// The game already reached a win or draw.
    #[display("The game has been completed at {}", _0)]
    GameAlreadyCompleted(DateTime<Utc>),

    /// The submitted player is not the one to move.
    #[display("{} has turn now", expected)]
    WrongPlayerTurn {
        /// Player whose turn it is.
        expected: Player,
    },

    /// Row or column outside the board.
    #[display(
        "Coordinates ({}, {}) are out of board range 0..{}",
        row,
        col,
        board_size
    )]
    CoordinatesOutOfRange {
        /// Submitted row.
        row: i64,
        /// Submitted column.
        col: i64,
        /// Side length of the board.
        board_size: usize,
    },

    /// Target square already holds a mark.
    #[display("Position ({}, {}) is already occupied", row, col)]
    CellOccupied {
        /// Row of the occupied square.
        row: usize,
        /// Column of the occupied square.
        col: usize,
    },
}

impl std::error::Error for GameError {}

impl GameError {
    /// Returns the stable category of this error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            GameError::InvalidConfiguration(_) => ErrorCategory::Configuration,
            GameError::GameAlreadyCompleted(_)
            | GameError::WrongPlayerTurn { .. }
            | GameError::CoordinatesOutOfRange { .. }
            | GameError::CellOccupied { .. } => ErrorCategory::RuleViolation,
        }
    }
}

impl From<ConfigBound> for GameError {
    fn from(bound: ConfigBound) -> Self {
        GameError::InvalidConfiguration(bound)
    }
}
