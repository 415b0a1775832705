//! Game storage abstraction and the in-memory backend.

use crate::db::DbError;
use derive_more::Display;
use flipside_tictactoe::Game;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// Storage failure.
#[derive(Debug, Clone, Display)]
pub enum StoreError {
    /// A game with this id is already stored.
    #[display("Game {} already exists", id)]
    Duplicate {
        /// Game id.
        id: Uuid,
    },

    /// Update targeted a game that was never stored.
    #[display("Game {} does not exist", id)]
    Missing {
        /// Game id.
        id: Uuid,
    },

    /// The stored game moved on since it was read.
    #[display(
        "Game {} was modified concurrently (expected {} stored moves)",
        id,
        expected_moves
    )]
    Conflict {
        /// Game id.
        id: Uuid,
        /// Move count the update expected to replace.
        expected_moves: usize,
    },

    /// A stored row does not decode to a valid game.
    #[display("Stored game {} is corrupt: {}", id, reason)]
    CorruptRecord {
        /// Raw id column.
        id: String,
        /// What failed to decode.
        reason: String,
    },

    /// Underlying database failure.
    #[display("{}", _0)]
    Database(DbError),
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Database(e) => Some(e),
            _ => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(err: DbError) -> Self {
        Self::Database(err)
    }
}

impl From<diesel::result::Error> for StoreError {
    #[track_caller]
    fn from(err: diesel::result::Error) -> Self {
        Self::Database(DbError::from(err))
    }
}

/// Keyed storage for games.
///
/// `update` is a compare-and-swap on the move count: it succeeds only when
/// the stored game has exactly one move fewer than the game being written.
pub trait GameStore: Send + Sync {
    /// Stores a new game.
    ///
    /// # Errors
    ///
    /// [`StoreError::Duplicate`] if the id is taken.
    fn create(&self, game: &Game) -> Result<(), StoreError>;

    /// Looks up a game by id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backend fails or the record is corrupt.
    fn find(&self, id: Uuid) -> Result<Option<Game>, StoreError>;

    /// Replaces a stored game after one accepted move.
    ///
    /// # Errors
    ///
    /// [`StoreError::Conflict`] if another writer got there first,
    /// [`StoreError::Missing`] if the game was never stored.
    fn update(&self, game: &Game) -> Result<(), StoreError>;
}

/// Games held in process memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryGameStore {
    games: Arc<Mutex<HashMap<Uuid, Game>>>,
}

impl InMemoryGameStore {
    /// Creates an empty store.
    #[instrument]
    pub fn new() -> Self {
        info!("Creating in-memory game store");
        Self::default()
    }

    /// Number of stored games.
    pub fn len(&self) -> usize {
        self.games
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether the store holds no games.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl GameStore for InMemoryGameStore {
    #[instrument(skip(self, game), fields(game_id = %game.id()))]
    fn create(&self, game: &Game) -> Result<(), StoreError> {
        let mut games = self.games.lock().unwrap_or_else(PoisonError::into_inner);
        if games.contains_key(&game.id()) {
            warn!("Duplicate game id");
            return Err(StoreError::Duplicate { id: game.id() });
        }
        games.insert(game.id(), game.clone());
        debug!(count = games.len(), "Game stored");
        Ok(())
    }

    #[instrument(skip(self))]
    fn find(&self, id: Uuid) -> Result<Option<Game>, StoreError> {
        let games = self.games.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(games.get(&id).cloned())
    }

    #[instrument(skip(self, game), fields(game_id = %game.id(), moves = game.moves_applied()))]
    fn update(&self, game: &Game) -> Result<(), StoreError> {
        let mut games = self.games.lock().unwrap_or_else(PoisonError::into_inner);
        let id = game.id();
        let stored = games.get_mut(&id).ok_or(StoreError::Missing { id })?;

        let expected_moves = game.moves_applied().saturating_sub(1);
        if game.moves_applied() == 0 || stored.moves_applied() != expected_moves {
            warn!(stored = stored.moves_applied(), "Stale update rejected");
            return Err(StoreError::Conflict { id, expected_moves });
        }

        *stored = game.clone();
        debug!("Game updated");
        Ok(())
    }
}
