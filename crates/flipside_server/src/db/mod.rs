//! SQLite persistence for games.

mod error;
mod models;
mod repository;
mod schema;

pub use error::{DbError, DbErrorKind};
pub use models::GameRecord;
pub use repository::SqliteGameStore;
