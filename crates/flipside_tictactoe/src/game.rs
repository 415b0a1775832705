//! The game aggregate: state plus the single move-application entry point.

use super::action::{Move, MoveOutcome};
use super::board::Board;
use super::config::BoardConfig;
use super::error::GameError;
use super::flip::FlipPolicy;
use super::invariants;
use super::random::RandomSource;
use super::rules;
use super::types::{GameStatus, Player, Square};
use chrono::{DateTime, SubsecRound, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// Current UTC time truncated to microseconds, so timestamps survive
/// storage round trips unchanged.
fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// An N×N game with a fixed win length.
///
/// All mutation goes through [`Game::make_move`], which validates the move
/// before touching any state. A rejected move leaves the game unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Game {
    id: Uuid,
    config: BoardConfig,
    board: Board,
    current_turn: Player,
    moves_applied: usize,
    status: GameStatus,
    created_at: DateTime<Utc>,
    last_modified: DateTime<Utc>,
}

impl Game {
    /// Creates a new game with a fresh identifier.
    #[instrument]
    pub fn new(config: BoardConfig) -> Self {
        let created_at = now();
        let game = Self {
            id: Uuid::now_v7(),
            config,
            board: Board::new(config.board_size()),
            current_turn: Player::X,
            moves_applied: 0,
            status: GameStatus::InProgress,
            created_at,
            last_modified: created_at,
        };
        info!(
            game_id = %game.id,
            board_size = config.board_size(),
            win_length = config.win_length(),
            "Game created"
        );
        game
    }

    /// Validates the dimensions and creates a new game.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidConfiguration`] if `board_size` is outside
    /// `3..=MAX_BOARD_SIZE` or the win length is outside `3..=board_size`.
    #[instrument]
    pub fn create(board_size: usize, win_length: usize) -> Result<Self, GameError> {
        Ok(Self::new(BoardConfig::new(board_size, win_length)?))
    }

    /// Unique identifier.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Board dimensions and win length.
    pub fn config(&self) -> BoardConfig {
        self.config
    }

    /// The board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Player whose move is next. Meaningless once the game is completed.
    pub fn current_turn(&self) -> Player {
        self.current_turn
    }

    /// Player to move, or `None` once the game is completed.
    pub fn turn(&self) -> Option<Player> {
        (!self.is_completed()).then_some(self.current_turn)
    }

    /// Number of accepted moves.
    pub fn moves_applied(&self) -> usize {
        self.moves_applied
    }

    /// Game status.
    pub fn status(&self) -> GameStatus {
        self.status
    }

    /// Whether a win or draw has been reached.
    pub fn is_completed(&self) -> bool {
        self.status.is_over()
    }

    /// The winner; `None` while in progress or after a draw.
    pub fn winner(&self) -> Option<Player> {
        self.status.winner()
    }

    /// Creation time.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Time of the last accepted move (creation time before any move).
    pub fn last_modified(&self) -> DateTime<Utc> {
        self.last_modified
    }

    /// Applies a move under the default flip rule.
    ///
    /// # Errors
    ///
    /// See [`Game::make_move_with_policy`].
    #[instrument(skip(self, random), fields(game_id = %self.id))]
    pub fn make_move(
        &mut self,
        mv: Move,
        random: &mut dyn RandomSource,
    ) -> Result<MoveOutcome, GameError> {
        self.make_move_with_policy(mv, &FlipPolicy::default(), random)
    }

    /// Validates and applies a move.
    ///
    /// Checks run in a fixed order and the first failure wins: completed
    /// game, wrong player, coordinates off the board, occupied square.
    /// On success the flip policy may invert the placed mark, the board is
    /// re-evaluated, and the turn passes to the opponent of the submitted
    /// player.
    ///
    /// # Errors
    ///
    /// Returns the first failing [`GameError`]; the game is left untouched.
    #[instrument(skip(self, policy, random), fields(game_id = %self.id, moves_applied = self.moves_applied))]
    pub fn make_move_with_policy(
        &mut self,
        mv: Move,
        policy: &FlipPolicy,
        random: &mut dyn RandomSource,
    ) -> Result<MoveOutcome, GameError> {
        let (row, col) = self.validate(&mv).inspect_err(|e| {
            warn!(%mv, error = %e, "Move rejected");
        })?;

        let flipped = policy.should_flip(self.moves_applied, random);
        let placed = if flipped {
            mv.player.opponent()
        } else {
            mv.player
        };
        if flipped {
            info!(submitted = %mv.player, %placed, row, col, "Mark flipped");
        }

        self.board.place(row, col, placed);
        self.moves_applied += 1;
        // Strictly increasing, so every accepted move gets a fresh tag.
        self.last_modified = now().max(self.last_modified + TimeDelta::microseconds(1));
        self.status = rules::evaluate(&self.board, self.config.win_length());
        self.current_turn = mv.player.opponent();

        debug_assert!(
            invariants::check_game(self).is_ok(),
            "Game invariants violated after move"
        );

        match self.status {
            GameStatus::Won(winner) => info!(%winner, moves = self.moves_applied, "Game won"),
            GameStatus::Draw => info!(moves = self.moves_applied, "Game drawn"),
            GameStatus::InProgress => debug!(next = %self.current_turn, "Move applied"),
        }

        Ok(MoveOutcome {
            row,
            col,
            placed,
            flipped,
        })
    }

    /// Checks a move against the rules without applying it.
    fn validate(&self, mv: &Move) -> Result<(usize, usize), GameError> {
        if self.is_completed() {
            return Err(GameError::GameAlreadyCompleted(self.last_modified));
        }
        if mv.player != self.current_turn {
            return Err(GameError::WrongPlayerTurn {
                expected: self.current_turn,
            });
        }

        let size = self.config.board_size();
        let in_range = |v: i64| usize::try_from(v).ok().filter(|&v| v < size);
        let (Some(row), Some(col)) = (in_range(mv.row), in_range(mv.col)) else {
            return Err(GameError::CoordinatesOutOfRange {
                row: mv.row,
                col: mv.col,
                board_size: size,
            });
        };

        if !self.board.is_empty(row, col) {
            return Err(GameError::CellOccupied { row, col });
        }

        Ok((row, col))
    }

    /// Captures the full state for storage.
    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            id: self.id,
            board_size: self.config.board_size(),
            win_length: self.config.win_length(),
            squares: self.board.squares().to_vec(),
            current_turn: self.current_turn,
            moves_applied: self.moves_applied,
            status: self.status,
            created_at: self.created_at,
            last_modified: self.last_modified,
        }
    }

    /// Rebuilds a game from a snapshot, re-checking every invariant.
    ///
    /// # Errors
    ///
    /// Returns [`RestoreError`] if the snapshot could not have been produced
    /// by a sequence of legal moves.
    #[instrument(skip(snapshot), fields(game_id = %snapshot.id))]
    pub fn restore(snapshot: GameSnapshot) -> Result<Self, RestoreError> {
        let config = BoardConfig::new(snapshot.board_size, snapshot.win_length)
            .map_err(RestoreError::Config)?;

        let found = snapshot.squares.len();
        let board = Board::from_squares(config.board_size(), snapshot.squares).ok_or(
            RestoreError::SquareCount {
                expected: config.cell_count(),
                found,
            },
        )?;

        let game = Self {
            id: snapshot.id,
            config,
            board,
            current_turn: snapshot.current_turn,
            moves_applied: snapshot.moves_applied,
            status: snapshot.status,
            created_at: snapshot.created_at,
            last_modified: snapshot.last_modified,
        };

        invariants::check_game(&game).map_err(RestoreError::Invariant)?;
        debug!(moves = game.moves_applied, "Game restored");
        Ok(game)
    }
}

/// Plain-data copy of a game's state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSnapshot {
    /// Unique identifier.
    pub id: Uuid,
    /// Side length of the board.
    pub board_size: usize,
    /// Run length needed to win.
    pub win_length: usize,
    /// Squares in row-major order.
    pub squares: Vec<Square>,
    /// Player to move.
    pub current_turn: Player,
    /// Number of accepted moves.
    pub moves_applied: usize,
    /// Game status.
    pub status: GameStatus,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Time of the last accepted move.
    pub last_modified: DateTime<Utc>,
}

/// A snapshot that does not describe a reachable game.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum RestoreError {
    /// Stored dimensions fail validation.
    #[display("Stored configuration is invalid: {}", _0)]
    Config(GameError),
    /// Wrong number of squares for the board size.
    #[display("Expected {} squares, found {}", expected, found)]
    SquareCount {
        /// Squares required by the board size.
        expected: usize,
        /// Squares present in the snapshot.
        found: usize,
    },
    /// Snapshot breaks a game invariant.
    #[display("Invariant violation: {}", _0)]
    Invariant(String),
}

impl std::error::Error for RestoreError {}
