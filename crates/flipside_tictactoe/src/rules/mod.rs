//! Game rules for flipside tic-tac-toe.
//!
//! Pure functions evaluating a board against a win length. Rules are
//! separated from board storage so they can be run over any position.

pub mod draw;
pub mod win;

pub use draw::is_draw;
pub use win::{Direction, check_winner, run_at};

use super::board::Board;
use super::types::GameStatus;
use tracing::instrument;

/// Evaluates the board: a winning run first, then a full board, else in progress.
#[instrument(skip(board), fields(board_size = board.size()))]
pub fn evaluate(board: &Board, win_length: usize) -> GameStatus {
    if let Some(winner) = check_winner(board, win_length) {
        GameStatus::Won(winner)
    } else if board.is_full() {
        GameStatus::Draw
    } else {
        GameStatus::InProgress
    }
}
