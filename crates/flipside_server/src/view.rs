//! Client-facing representation of a game.

use chrono::{DateTime, Utc};
use flipside_tictactoe::{Game, GameStatus, Square};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Winner label for a drawn game.
pub const DRAW: &str = "draw";

/// JSON view of a game.
///
/// `player_turn` is `null` once the game is over. `winner` is `"X"`, `"O"`,
/// `"draw"`, or `null` while play continues.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameView {
    /// Game id.
    pub id: Uuid,
    /// Board side length.
    pub board_size: usize,
    /// Run length needed to win.
    pub win_length: usize,
    /// Rows of `'X'`, `'O'` or `' '`.
    pub board: Vec<Vec<char>>,
    /// Player to move, if any.
    pub player_turn: Option<char>,
    /// Outcome label, if decided.
    pub winner: Option<String>,
    /// Accepted moves so far.
    pub moves_applied: usize,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last accepted move.
    pub modified_at: DateTime<Utc>,
}

impl From<&Game> for GameView {
    fn from(game: &Game) -> Self {
        let config = game.config();
        let board = game
            .board()
            .rows()
            .map(|row| {
                row.iter()
                    .map(|square| match square {
                        Square::Empty => ' ',
                        Square::Occupied(player) => player.symbol(),
                    })
                    .collect()
            })
            .collect();
        let winner = match game.status() {
            GameStatus::InProgress => None,
            GameStatus::Won(player) => Some(player.symbol().to_string()),
            GameStatus::Draw => Some(DRAW.to_string()),
        };

        Self {
            id: game.id(),
            board_size: config.board_size(),
            win_length: config.win_length(),
            board,
            player_turn: game.turn().map(|p| p.symbol()),
            winner,
            moves_applied: game.moves_applied(),
            created_at: game.created_at(),
            modified_at: game.last_modified(),
        }
    }
}

/// Entity tag for a game: its last-modified time in microseconds, quoted.
pub fn etag(game: &Game) -> String {
    format!("\"{}\"", game.last_modified().timestamp_micros())
}

/// Whether an `If-Match` header value matches the game's current tag.
///
/// Accepts `*`, a comma-separated list, and weak tags.
pub fn if_match_satisfied(header: &str, game: &Game) -> bool {
    let current = etag(game);
    header.split(',').map(str::trim).any(|candidate| {
        candidate == "*" || candidate.trim_start_matches("W/") == current
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use flipside_tictactoe::{FixedRandom, Move, Player};

    #[test]
    fn test_fresh_game_view() {
        let game = Game::create(4, 3).expect("valid config");
        let view = GameView::from(&game);

        assert_eq!(view.board_size, 4);
        assert_eq!(view.board.len(), 4);
        assert!(view.board.iter().all(|row| row == &vec![' '; 4]));
        assert_eq!(view.player_turn, Some('X'));
        assert_eq!(view.winner, None);
    }

    #[test]
    fn test_won_game_view() {
        let mut game = Game::create(3, 3).expect("valid config");
        let mut random = FixedRandom::constant(1);
        for (player, row, col) in [
            (Player::X, 0, 0),
            (Player::O, 1, 0),
            (Player::X, 0, 1),
            (Player::O, 1, 1),
            (Player::X, 0, 2),
        ] {
            game.make_move(Move::new(player, row, col), &mut random)
                .expect("legal move");
        }

        let view = GameView::from(&game);
        assert_eq!(view.board[0], vec!['X', 'X', 'X']);
        assert_eq!(view.board[1], vec!['O', 'O', ' ']);
        assert_eq!(view.player_turn, None);
        assert_eq!(view.winner.as_deref(), Some("X"));

        let json = serde_json::to_value(&view).expect("serializes");
        assert_eq!(json["player_turn"], serde_json::Value::Null);
        assert_eq!(json["board"][0][0], "X");
    }

    #[test]
    fn test_if_match() {
        let game = Game::create(3, 3).expect("valid config");
        let tag = etag(&game);

        assert!(if_match_satisfied(&tag, &game));
        assert!(if_match_satisfied("*", &game));
        assert!(if_match_satisfied(&format!("W/{tag}"), &game));
        assert!(if_match_satisfied(&format!("\"1\", {tag}"), &game));
        assert!(!if_match_satisfied("\"1\"", &game));
    }
}
