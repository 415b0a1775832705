//! Core domain types for flipside tic-tac-toe.

use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Player symbol in the game.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumIter,
)]
pub enum Player {
    /// Player X (always moves first).
    X,
    /// Player O.
    O,
}

impl Player {
    /// Returns the opponent player.
    pub fn opponent(self) -> Self {
        match self {
            Player::X => Player::O,
            Player::O => Player::X,
        }
    }

    /// Returns the display character for this player.
    pub fn symbol(self) -> char {
        match self {
            Player::X => 'X',
            Player::O => 'O',
        }
    }

    /// Parses a single case-insensitive symbol character.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownSymbol`] for anything other than `x` or `o`.
    #[instrument]
    pub fn from_symbol(symbol: char) -> Result<Self, UnknownSymbol> {
        match symbol.to_ascii_lowercase() {
            'x' => Ok(Player::X),
            'o' => Ok(Player::O),
            _ => Err(UnknownSymbol(symbol)),
        }
    }
}

impl std::str::FromStr for Player {
    type Err = UnknownSymbol;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.trim().chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Player::from_symbol(c),
            (Some(c), Some(_)) => Err(UnknownSymbol(c)),
            (None, _) => Err(UnknownSymbol(' ')),
        }
    }
}

/// A symbol that does not name either player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
#[display("Symbol {:?} is not recognized", _0)]
pub struct UnknownSymbol(pub char);

impl std::error::Error for UnknownSymbol {}

/// A square on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Square {
    /// Empty square.
    #[default]
    Empty,
    /// Square occupied by a player's mark.
    Occupied(Player),
}

impl Square {
    /// Returns the occupying player, if any.
    pub fn player(self) -> Option<Player> {
        match self {
            Square::Empty => None,
            Square::Occupied(player) => Some(player),
        }
    }

    /// Checks if the square is empty.
    pub fn is_empty(self) -> bool {
        self == Square::Empty
    }
}

/// Current status of the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameStatus {
    /// Game is ongoing.
    InProgress,
    /// Game ended with a winning run.
    Won(Player),
    /// Board filled up without a winning run.
    Draw,
}

impl GameStatus {
    /// Checks whether the game has reached a terminal state.
    pub fn is_over(self) -> bool {
        !matches!(self, GameStatus::InProgress)
    }

    /// Returns the winner, if the game was won.
    pub fn winner(self) -> Option<Player> {
        match self {
            GameStatus::Won(player) => Some(player),
            GameStatus::InProgress | GameStatus::Draw => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opponent_alternates() {
        assert_eq!(Player::X.opponent(), Player::O);
        assert_eq!(Player::O.opponent(), Player::X);
    }

    #[test]
    fn test_symbol_parsing_is_case_insensitive() {
        assert_eq!(Player::from_symbol('x'), Ok(Player::X));
        assert_eq!(Player::from_symbol('X'), Ok(Player::X));
        assert_eq!(Player::from_symbol('o'), Ok(Player::O));
        assert_eq!(Player::from_symbol('O'), Ok(Player::O));
        assert_eq!(Player::from_symbol('z'), Err(UnknownSymbol('z')));
        assert_eq!(Player::from_symbol('0'), Err(UnknownSymbol('0')));
    }

    #[test]
    fn test_from_str_requires_single_char() {
        assert_eq!("o".parse::<Player>(), Ok(Player::O));
        assert!("xo".parse::<Player>().is_err());
        assert!("".parse::<Player>().is_err());
    }

    #[test]
    fn test_status_winner() {
        assert_eq!(GameStatus::Won(Player::O).winner(), Some(Player::O));
        assert_eq!(GameStatus::Draw.winner(), None);
        assert!(GameStatus::Draw.is_over());
        assert!(!GameStatus::InProgress.is_over());
    }
}
