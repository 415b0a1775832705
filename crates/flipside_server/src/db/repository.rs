//! SQLite-backed game store.

use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use flipside_tictactoe::Game;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::db::{DbError, DbErrorKind, GameRecord, schema};
use crate::store::{GameStore, StoreError};

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Game store backed by a SQLite file.
///
/// Opens a fresh connection per operation.
#[derive(Debug, Clone)]
pub struct SqliteGameStore {
    db_path: String,
}

impl SqliteGameStore {
    /// Opens the database at `db_path`, creating it and applying pending
    /// migrations as needed.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the database cannot be opened or migrated.
    #[instrument(skip(db_path), fields(db_path = %db_path.as_ref()))]
    pub fn open(db_path: impl AsRef<str>) -> Result<Self, DbError> {
        let store = Self {
            db_path: db_path.as_ref().to_string(),
        };
        let mut conn = store.connection()?;
        let applied = conn
            .run_pending_migrations(MIGRATIONS)
            .map_err(|e| DbError::new(DbErrorKind::Migration, e.to_string()))?;
        info!(path = %store.db_path, migrations = applied.len(), "SQLite game store ready");
        Ok(store)
    }

    /// Path of the backing database.
    pub fn db_path(&self) -> &str {
        &self.db_path
    }

    #[instrument(skip(self))]
    fn connection(&self) -> Result<SqliteConnection, DbError> {
        debug!(path = %self.db_path, "Establishing connection");
        SqliteConnection::establish(&self.db_path).map_err(|e| {
            DbError::new(
                DbErrorKind::Connection,
                format!("'{}': {}", self.db_path, e),
            )
        })
    }
}

impl GameStore for SqliteGameStore {
    #[instrument(skip(self, game), fields(game_id = %game.id()))]
    fn create(&self, game: &Game) -> Result<(), StoreError> {
        let record = GameRecord::try_from(game)?;
        let mut conn = self.connection()?;

        match diesel::insert_into(schema::games::table)
            .values(&record)
            .execute(&mut conn)
        {
            Ok(_) => {
                debug!("Game inserted");
                Ok(())
            }
            Err(DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _)) => {
                warn!("Duplicate game id");
                Err(StoreError::Duplicate { id: game.id() })
            }
            Err(e) => Err(e.into()),
        }
    }

    #[instrument(skip(self))]
    fn find(&self, id: Uuid) -> Result<Option<Game>, StoreError> {
        let mut conn = self.connection()?;

        let record = schema::games::table
            .find(id.to_string())
            .select(GameRecord::as_select())
            .first::<GameRecord>(&mut conn)
            .optional()?;

        match record {
            Some(record) => {
                debug!("Game found");
                Game::try_from(record).map(Some)
            }
            None => {
                debug!("Game not found");
                Ok(None)
            }
        }
    }

    #[instrument(skip(self, game), fields(game_id = %game.id(), moves = game.moves_applied()))]
    fn update(&self, game: &Game) -> Result<(), StoreError> {
        use schema::games::dsl;

        let id = game.id();
        let expected_moves = game.moves_applied().saturating_sub(1);
        if game.moves_applied() == 0 {
            return Err(StoreError::Conflict { id, expected_moves });
        }

        let record = GameRecord::try_from(game)?;
        let stored_moves = i32::try_from(expected_moves)
            .map_err(|_| DbError::encoding(format!("Move count {} out of range", expected_moves)))?;
        let mut conn = self.connection()?;

        let updated = diesel::update(
            dsl::games
                .filter(dsl::id.eq(id.to_string()))
                .filter(dsl::moves_applied.eq(stored_moves)),
        )
        .set(&record)
        .execute(&mut conn)?;

        if updated == 1 {
            debug!("Game updated");
            return Ok(());
        }

        let exists = dsl::games
            .find(id.to_string())
            .select(dsl::id)
            .first::<String>(&mut conn)
            .optional()?
            .is_some();
        if exists {
            warn!(expected_moves, "Stale update rejected");
            Err(StoreError::Conflict { id, expected_moves })
        } else {
            Err(StoreError::Missing { id })
        }
    }
}
