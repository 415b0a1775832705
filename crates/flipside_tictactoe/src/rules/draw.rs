//! Draw detection logic.

use super::super::Board;
use super::win::check_winner;
use tracing::instrument;

/// Checks if the game is a draw: board full with no winning run.
#[instrument(skip(board))]
pub fn is_draw(board: &Board, win_length: usize) -> bool {
    board.is_full() && check_winner(board, win_length).is_none()
}
