//! Win detection for boards of any size and run length.

use super::super::{Board, Player, Square};
use tracing::{debug, instrument};

/// Scan direction for a run, as a `(row, col)` step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Left to right along a row.
    Right,
    /// Top to bottom along a column.
    Down,
    /// Main diagonal, top-left to bottom-right.
    DownRight,
    /// Anti-diagonal, top-right to bottom-left.
    DownLeft,
}

impl Direction {
    /// Scan order used by [`check_winner`].
    pub const ALL: [Direction; 4] = [
        Direction::Right,
        Direction::Down,
        Direction::DownRight,
        Direction::DownLeft,
    ];

    /// Step applied per cell of a run.
    pub fn delta(self) -> (isize, isize) {
        match self {
            Direction::Right => (0, 1),
            Direction::Down => (1, 0),
            Direction::DownRight => (1, 1),
            Direction::DownLeft => (1, -1),
        }
    }

    /// Anchors from which a run of `win_length` fits on a `size` board,
    /// in scan order.
    pub fn anchors(self, size: usize, win_length: usize) -> Vec<(usize, usize)> {
        if win_length == 0 || win_length > size {
            return Vec::new();
        }
        let last_start = size - win_length;
        match self {
            Direction::Right => (0..size)
                .flat_map(|row| (0..=last_start).map(move |col| (row, col)))
                .collect(),
            Direction::Down => (0..size)
                .flat_map(|col| (0..=last_start).map(move |row| (row, col)))
                .collect(),
            Direction::DownRight => (0..=last_start)
                .flat_map(|row| (0..=last_start).map(move |col| (row, col)))
                .collect(),
            Direction::DownLeft => (0..=last_start)
                .flat_map(|row| (win_length - 1..size).map(move |col| (row, col)))
                .collect(),
        }
    }
}

/// Returns the player owning a run of `length` squares starting at
/// `(row, col)` and stepping in `direction`, if every square matches.
pub fn run_at(
    board: &Board,
    row: usize,
    col: usize,
    direction: Direction,
    length: usize,
) -> Option<Player> {
    let first = board.get(row, col)?.player()?;
    let (dr, dc) = direction.delta();

    for step in 1..length {
        let step = step as isize;
        let r = row.checked_add_signed(dr * step)?;
        let c = col.checked_add_signed(dc * step)?;
        if board.get(r, c)? != Square::Occupied(first) {
            return None;
        }
    }

    Some(first)
}

/// Checks if there is a winner on the board.
///
/// Scans rows, then columns, then main diagonals, then anti-diagonals;
/// the first run of `win_length` identical marks wins.
#[instrument(skip(board), fields(board_size = board.size()))]
pub fn check_winner(board: &Board, win_length: usize) -> Option<Player> {
    for direction in Direction::ALL {
        for (row, col) in direction.anchors(board.size(), win_length) {
            if let Some(player) = run_at(board, row, col, direction, win_length) {
                debug!(?player, ?direction, row, col, "Winning run found");
                return Some(player);
            }
        }
    }

    None
}
