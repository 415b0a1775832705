//! Board dimensions fixed at game creation.

use super::error::{ConfigBound, GameError};
use serde::{Deserialize, Serialize};
use tracing::{instrument, warn};

/// Smallest accepted board side length.
pub const MIN_BOARD_SIZE: usize = 3;

/// Largest accepted board side length.
pub const MAX_BOARD_SIZE: usize = 100;

/// Smallest accepted winning run length.
pub const MIN_WIN_LENGTH: usize = 3;

/// Validated board size and win length.
///
/// Only constructible through [`BoardConfig::new`], so any value of this
/// type satisfies `3 <= win_length <= board_size <= MAX_BOARD_SIZE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct BoardConfig {
    board_size: usize,
    win_length: usize,
}

impl BoardConfig {
    /// Validates and creates a board configuration.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidConfiguration`] naming the first bound
    /// that failed.
    #[instrument]
    pub fn new(board_size: usize, win_length: usize) -> Result<Self, GameError> {
        let bound = if board_size < MIN_BOARD_SIZE {
            Some(ConfigBound::BoardTooSmall {
                board_size,
                minimum: MIN_BOARD_SIZE,
            })
        } else if board_size > MAX_BOARD_SIZE {
            Some(ConfigBound::BoardTooLarge {
                board_size,
                maximum: MAX_BOARD_SIZE,
            })
        } else if win_length < MIN_WIN_LENGTH {
            Some(ConfigBound::WinLengthTooShort {
                win_length,
                minimum: MIN_WIN_LENGTH,
            })
        } else if win_length > board_size {
            Some(ConfigBound::WinLengthExceedsBoard {
                win_length,
                board_size,
            })
        } else {
            None
        };

        if let Some(bound) = bound {
            warn!(%bound, "Rejected board configuration");
            return Err(bound.into());
        }

        Ok(Self {
            board_size,
            win_length,
        })
    }

    /// Side length of the board.
    pub fn board_size(&self) -> usize {
        self.board_size
    }

    /// Number of consecutive marks needed to win.
    pub fn win_length(&self) -> usize {
        self.win_length
    }

    /// Total number of squares.
    pub fn cell_count(&self) -> usize {
        self.board_size * self.board_size
    }
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            board_size: MIN_BOARD_SIZE,
            win_length: MIN_WIN_LENGTH,
        }
    }
}

impl<'de> Deserialize<'de> for BoardConfig {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Raw {
            board_size: usize,
            win_length: usize,
        }

        let raw = Raw::deserialize(deserializer)?;
        BoardConfig::new(raw.board_size, raw.win_length).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classic_board_is_valid() {
        let config = BoardConfig::new(3, 3).expect("3x3 is valid");
        assert_eq!(config.board_size(), 3);
        assert_eq!(config.win_length(), 3);
        assert_eq!(config.cell_count(), 9);
        assert_eq!(config, BoardConfig::default());
    }

    #[test]
    fn test_board_too_small() {
        assert_eq!(
            BoardConfig::new(2, 3),
            Err(GameError::InvalidConfiguration(ConfigBound::BoardTooSmall {
                board_size: 2,
                minimum: 3,
            }))
        );
    }

    #[test]
    fn test_board_too_large() {
        assert!(BoardConfig::new(MAX_BOARD_SIZE, 3).is_ok());
        assert_eq!(
            BoardConfig::new(MAX_BOARD_SIZE + 1, 3),
            Err(GameError::InvalidConfiguration(ConfigBound::BoardTooLarge {
                board_size: MAX_BOARD_SIZE + 1,
                maximum: MAX_BOARD_SIZE,
            }))
        );
        // Side lengths whose square overflows usize are rejected before any allocation.
        assert!(matches!(
            BoardConfig::new(1usize << 33, 3),
            Err(GameError::InvalidConfiguration(ConfigBound::BoardTooLarge { .. }))
        ));
        let huge = serde_json::from_str::<BoardConfig>(r#"{"board_size":100000,"win_length":3}"#);
        assert!(huge.is_err());
    }

    #[test]
    fn test_win_length_too_short() {
        assert!(matches!(
            BoardConfig::new(5, 2),
            Err(GameError::InvalidConfiguration(
                ConfigBound::WinLengthTooShort { win_length: 2, .. }
            ))
        ));
    }

    #[test]
    fn test_win_length_exceeds_board() {
        assert!(matches!(
            BoardConfig::new(4, 5),
            Err(GameError::InvalidConfiguration(
                ConfigBound::WinLengthExceedsBoard {
                    win_length: 5,
                    board_size: 4
                }
            ))
        ));
    }

    #[test]
    fn test_deserialize_validates() {
        let ok: BoardConfig =
            serde_json::from_str(r#"{"board_size":5,"win_length":4}"#).expect("valid");
        assert_eq!(ok.win_length(), 4);

        let bad = serde_json::from_str::<BoardConfig>(r#"{"board_size":3,"win_length":4}"#);
        assert!(bad.is_err());
    }
}
