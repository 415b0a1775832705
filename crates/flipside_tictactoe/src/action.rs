//! First-class move types.
//!
//! Moves carry the caller's intent, coordinates unchecked. Bounds are
//! validated by the game in a fixed order, so rows and columns stay signed.

use super::Player;
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// A move: a player claiming the square at `(row, col)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    /// The player nominally making the move.
    pub player: Player,
    /// Zero-based row.
    pub row: i64,
    /// Zero-based column.
    pub col: i64,
}

impl Move {
    /// Creates a new move.
    #[instrument]
    pub fn new(player: Player, row: i64, col: i64) -> Self {
        Self { player, row, col }
    }
}

impl std::fmt::Display for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> ({}, {})", self.player, self.row, self.col)
    }
}

/// What an accepted move did to the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveOutcome {
    /// Row of the claimed square.
    pub row: usize,
    /// Column of the claimed square.
    pub col: usize,
    /// Mark actually written, after any flip.
    pub placed: Player,
    /// Whether the flip rule inverted the submitted mark.
    pub flipped: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(Move::new(Player::O, 2, 1).to_string(), "O -> (2, 1)");
    }
}
