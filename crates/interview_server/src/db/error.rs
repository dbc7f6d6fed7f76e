//! Database error types.

use derive_more::{Display, Error};
use diesel::result::DatabaseErrorKind;
use tracing::instrument;

/// Broad category of a database failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum DbErrorKind {
    /// The database file could not be opened.
    #[display("connection")]
    Connection,
    /// Applying the embedded migrations failed.
    #[display("migration")]
    Migration,
    /// A row with the same session id already exists.
    #[display("duplicate")]
    Duplicate,
    /// Any other query failure.
    #[display("query")]
    Query,
}

/// Database error with location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("Database {} error: {} at {}:{}", kind, message, file, line)]
pub struct DbError {
    /// Failure category.
    pub kind: DbErrorKind,
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl DbError {
    /// Creates a new database error with caller location tracking.
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

    /// Returns true when the insert collided with an existing session record.
    pub fn is_duplicate(&self) -> bool {
        self.kind == DbErrorKind::Duplicate
    }
}

impl From<diesel::result::Error> for DbError {
    #[track_caller]
    fn from(err: diesel::result::Error) -> Self {
        let kind = match &err {
            diesel::result::Error::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                DbErrorKind::Duplicate
            }
            _ => DbErrorKind::Query,
        };
        Self::new(kind, format!("Diesel error: {}", err))
    }
}

impl From<diesel::ConnectionError> for DbError {
    #[track_caller]
    fn from(err: diesel::ConnectionError) -> Self {
        Self::new(DbErrorKind::Connection, format!("Connection error: {}", err))
    }
}
