//! Database error types.

use derive_more::{Display, Error};
use tracing::instrument;

/// Stage of a database operation that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum DbErrorKind {
    /// Opening the SQLite file.
    Connection,
    /// Applying embedded migrations.
    Migration,
    /// Running a statement.
    Query,
    /// Converting a game to or from its row.
    Encoding,
}

/// Database error tagged with the stage that failed and the caller's location.
#[derive(Debug, Clone, Display, Error)]
#[display("{} error: {} at {}:{}", kind, message, file, line)]
pub struct DbError {
    /// Failing stage.
    pub kind: DbErrorKind,
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl DbError {
    /// Creates an error at the caller's location.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(kind: DbErrorKind, message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            kind,
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }

    /// Shorthand for an [`DbErrorKind::Encoding`] error.
    #[track_caller]
    pub fn encoding(message: impl Into<String>) -> Self {
        Self::new(DbErrorKind::Encoding, message)
    }
}

impl From<diesel::result::Error> for DbError {
    #[track_caller]
    fn from(err: diesel::result::Error) -> Self {
        Self::new(DbErrorKind::Query, err.to_string())
    }
}

impl From<diesel::ConnectionError> for DbError {
    #[track_caller]
    fn from(err: diesel::ConnectionError) -> Self {
        Self::new(DbErrorKind::Connection, err.to_string())
    }
}
