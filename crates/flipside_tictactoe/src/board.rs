//! N×N board storage.

use super::types::{Player, Square};
use serde::{Deserialize, Serialize};

/// Square board of side `size`, squares stored in row-major order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    size: usize,
    squares: Vec<Square>,
}

impl Board {
    /// Creates an empty board of the given side length.
    ///
    /// `size` comes from a validated [`BoardConfig`](crate::BoardConfig).
    pub(crate) fn new(size: usize) -> Self {
        Self {
            size,
            squares: vec![Square::Empty; size * size],
        }
    }

    /// Builds a board from row-major squares.
    ///
    /// Returns `None` if the number of squares is not `size * size`.
    pub fn from_squares(size: usize, squares: Vec<Square>) -> Option<Self> {
        let expected = size.checked_mul(size)?;
        (squares.len() == expected).then_some(Self { size, squares })
    }

    /// Side length of the board.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Gets the square at `(row, col)`, or `None` when off the board.
    pub fn get(&self, row: usize, col: usize) -> Option<Square> {
        self.index(row, col).map(|idx| self.squares[idx])
    }

    /// Places a mark at `(row, col)`.
    ///
    /// Bounds are the caller's responsibility; out-of-range writes are ignored.
    pub(crate) fn place(&mut self, row: usize, col: usize, player: Player) {
        if let Some(idx) = self.index(row, col) {
            self.squares[idx] = Square::Occupied(player);
        }
    }

    /// Checks if the square at `(row, col)` is empty.
    pub fn is_empty(&self, row: usize, col: usize) -> bool {
        matches!(self.get(row, col), Some(Square::Empty))
    }

    /// Checks if every square holds a mark.
    pub fn is_full(&self) -> bool {
        self.squares.iter().all(|s| !s.is_empty())
    }

    /// Number of occupied squares.
    pub fn occupied_count(&self) -> usize {
        self.squares.iter().filter(|s| !s.is_empty()).count()
    }

    /// Returns all squares in row-major order.
    pub fn squares(&self) -> &[Square] {
        &self.squares
    }

    /// Iterates over the board one row at a time.
    pub fn rows(&self) -> impl Iterator<Item = &[Square]> {
        self.squares.chunks(self.size.max(1))
    }

    fn index(&self, row: usize, col: usize) -> Option<usize> {
        (row < self.size && col < self.size).then(|| row * self.size + col)
    }

    /// Formats the board as a human-readable grid.
    pub fn display(&self) -> String {
        let separator = vec!["-"; self.size].join("+");
        self.rows()
            .map(|row| {
                row.iter()
                    .map(|square| match square {
                        Square::Empty => ".".to_string(),
                        Square::Occupied(player) => player.to_string(),
                    })
                    .collect::<Vec<_>>()
                    .join("|")
            })
            .collect::<Vec<_>>()
            .join(&format!("\n{}\n", separator))
    }
}

impl std::fmt::Display for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_board_is_empty() {
        let board = Board::new(4);
        assert_eq!(board.squares().len(), 16);
        assert!(board.squares().iter().all(|s| s.is_empty()));
        assert_eq!(board.occupied_count(), 0);
    }

    #[test]
    fn test_place_and_get() {
        let mut board = Board::new(3);
        board.place(1, 2, Player::O);
        assert_eq!(board.get(1, 2), Some(Square::Occupied(Player::O)));
        assert_eq!(board.squares()[5], Square::Occupied(Player::O));
        assert!(!board.is_empty(1, 2));
        assert_eq!(board.get(3, 0), None);
    }

    #[test]
    fn test_full_board() {
        let mut board = Board::new(3);
        for row in 0..3 {
            for col in 0..3 {
                board.place(row, col, Player::X);
            }
        }
        assert!(board.is_full());
    }

    #[test]
    fn test_from_squares_checks_length() {
        assert!(Board::from_squares(3, vec![Square::Empty; 9]).is_some());
        assert!(Board::from_squares(3, vec![Square::Empty; 8]).is_none());
        assert!(Board::from_squares(1usize << 33, vec![Square::Empty; 4]).is_none());
    }

    #[test]
    fn test_display() {
        let mut board = Board::new(3);
        board.place(0, 0, Player::X);
        board.place(2, 2, Player::O);
        assert_eq!(board.display(), "X|.|.\n-+-+-\n.|.|.\n-+-+-\n.|.|O");
    }
}
