//! Row model for the `games` table and its mapping to [`Game`].

use chrono::NaiveDateTime;
use derive_getters::Getters;
use diesel::prelude::*;
use flipside_tictactoe::{Game, GameSnapshot, GameStatus, Player, Square};
use tracing::instrument;
use uuid::Uuid;

use crate::db::{DbError, schema};
use crate::store::StoreError;

const EMPTY_CELL: char = '.';

/// One stored game.
///
/// Squares are kept as a row-major string with one character per square:
/// `X`, `O`, or `.` for empty.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Insertable, AsChangeset, Getters)]
#[diesel(table_name = schema::games)]
#[diesel(treat_none_as_null = true)]
pub struct GameRecord {
    id: String,
    board_size: i32,
    win_length: i32,
    cells: String,
    current_turn: String,
    moves_applied: i32,
    status: String,
    winner: Option<String>,
    created_at: NaiveDateTime,
    modified_at: NaiveDateTime,
}

impl TryFrom<&Game> for GameRecord {
    type Error = DbError;

    #[track_caller]
    fn try_from(game: &Game) -> Result<Self, Self::Error> {
        let column = |name: &str, value: usize| {
            i32::try_from(value)
                .map_err(|_| DbError::encoding(format!("{} {} does not fit a column", name, value)))
        };
        let config = game.config();

        Ok(Self {
            id: game.id().to_string(),
            board_size: column("board_size", config.board_size())?,
            win_length: column("win_length", config.win_length())?,
            cells: game.board().squares().iter().map(|s| encode_square(*s)).collect(),
            current_turn: game.current_turn().symbol().to_string(),
            moves_applied: column("moves_applied", game.moves_applied())?,
            status: status_to_db_string(game.status()).to_string(),
            winner: game.winner().map(|p| p.symbol().to_string()),
            created_at: game.created_at().naive_utc(),
            modified_at: game.last_modified().naive_utc(),
        })
    }
}

impl TryFrom<GameRecord> for Game {
    type Error = StoreError;

    #[instrument(skip(record), fields(game_id = %record.id))]
    fn try_from(record: GameRecord) -> Result<Self, Self::Error> {
        let corrupt = |reason: String| StoreError::CorruptRecord {
            id: record.id.clone(),
            reason,
        };
        let count = |name: &str, value: i32| {
            usize::try_from(value).map_err(|_| corrupt(format!("negative {}: {}", name, value)))
        };

        let id = Uuid::parse_str(&record.id).map_err(|e| corrupt(format!("bad id: {}", e)))?;
        let squares = record
            .cells
            .chars()
            .map(|c| decode_square(c).map_err(|e| corrupt(e.to_string())))
            .collect::<Result<Vec<_>, _>>()?;
        let current_turn = record
            .current_turn
            .parse::<Player>()
            .map_err(|e| corrupt(format!("bad current_turn: {}", e)))?;
        let status = status_from_db(&record.status, record.winner.as_deref())
            .map_err(|e| corrupt(e.to_string()))?;

        let snapshot = GameSnapshot {
            id,
            board_size: count("board_size", record.board_size)?,
            win_length: count("win_length", record.win_length)?,
            squares,
            current_turn,
            moves_applied: count("moves_applied", record.moves_applied)?,
            status,
            created_at: record.created_at.and_utc(),
            last_modified: record.modified_at.and_utc(),
        };

        Game::restore(snapshot).map_err(|e| corrupt(e.to_string()))
    }
}

fn encode_square(square: Square) -> char {
    match square {
        Square::Empty => EMPTY_CELL,
        Square::Occupied(player) => player.symbol(),
    }
}

fn decode_square(c: char) -> Result<Square, DbError> {
    match c {
        EMPTY_CELL => Ok(Square::Empty),
        'X' => Ok(Square::Occupied(Player::X)),
        'O' => Ok(Square::Occupied(Player::O)),
        other => Err(DbError::encoding(format!("Invalid cell: '{}'", other))),
    }
}

/// Converts a status to the string stored in the database.
fn status_to_db_string(status: GameStatus) -> &'static str {
    match status {
        GameStatus::InProgress => "in_progress",
        GameStatus::Won(_) => "won",
        GameStatus::Draw => "draw",
    }
}

/// Parses the stored status and winner columns.
fn status_from_db(status: &str, winner: Option<&str>) -> Result<GameStatus, DbError> {
    match (status, winner) {
        ("in_progress", None) => Ok(GameStatus::InProgress),
        ("draw", None) => Ok(GameStatus::Draw),
        ("won", Some(winner)) => winner
            .parse::<Player>()
            .map(GameStatus::Won)
            .map_err(|e| DbError::encoding(format!("Invalid winner: {}", e))),
        _ => Err(DbError::encoding(format!(
            "Invalid status '{}' with winner {:?}",
            status, winner
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flipside_tictactoe::{FixedRandom, Move};

    fn won_game() -> Game {
        let mut game = Game::create(3, 3).expect("valid config");
        let mut random = FixedRandom::constant(4);
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
        game
    }

    #[test]
    fn test_record_encoding() {
        let game = won_game();
        let record = GameRecord::try_from(&game).expect("encodes");

        assert_eq!(record.cells(), "XXXOO....");
        assert_eq!(record.current_turn(), "O");
        assert_eq!(record.status(), "won");
        assert_eq!(record.winner().as_deref(), Some("X"));
        assert_eq!(*record.moves_applied(), 5);
    }

    #[test]
    fn test_record_decodes_to_same_game() {
        let game = won_game();
        let record = GameRecord::try_from(&game).expect("encodes");
        let restored = Game::try_from(record).expect("decodes");
        assert_eq!(restored, game);
    }

    #[test]
    fn test_bad_cell_is_corrupt() {
        let game = Game::create(3, 3).expect("valid config");
        let mut record = GameRecord::try_from(&game).expect("encodes");
        record.cells = "Z........".to_string();

        let err = Game::try_from(record).expect_err("corrupt");
        assert!(matches!(err, StoreError::CorruptRecord { .. }));
        assert!(err.to_string().contains("Invalid cell"));
    }

    #[test]
    fn test_inconsistent_counts_are_corrupt() {
        let game = Game::create(3, 3).expect("valid config");
        let mut record = GameRecord::try_from(&game).expect("encodes");
        record.moves_applied = 4;

        assert!(matches!(
            Game::try_from(record),
            Err(StoreError::CorruptRecord { .. })
        ));
    }

    #[test]
    fn test_status_winner_mismatch_is_corrupt() {
        assert!(status_from_db("won", None).is_err());
        assert!(status_from_db("draw", Some("X")).is_err());
        assert_eq!(
            status_from_db("won", Some("O")).expect("valid"),
            GameStatus::Won(Player::O)
        );
    }
}
