//! Database repository for finished session results.

use diesel::prelude::*;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::{debug, info, instrument};

use crate::db::{DbError, DbErrorKind, NewStudentResult, ResultSummary, StudentResult, schema};

/// Schema migrations compiled into the binary.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Append-only store of session results.
#[derive(Debug, Clone)]
pub struct ResultRepository {
    db_path: String,
}

impl ResultRepository {
    /// Creates a repository for the database at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the path is blank.
    #[instrument(skip(db_path), fields(db_path = %db_path))]
    pub fn new(db_path: String) -> Result<Self, DbError> {
        if db_path.trim().is_empty() {
            return Err(DbError::new(
                DbErrorKind::Connection,
                "Database path must not be empty",
            ));
        }
        info!(path = %db_path, "Creating ResultRepository");
        Ok(Self { db_path })
    }

    /// Establishes a database connection.
    #[instrument(skip(self))]
    fn connection(&self) -> Result<SqliteConnection, DbError> {
        debug!(path = %self.db_path, "Establishing connection");
        SqliteConnection::establish(&self.db_path).map_err(|e| {
            DbError::new(
                DbErrorKind::Connection,
                format!("Failed to connect to '{}': {}", self.db_path, e),
            )
        })
    }

    /// Applies any pending schema migrations.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the connection or a migration fails.
    #[instrument(skip(self))]
    pub fn migrate(&self) -> Result<(), DbError> {
        let mut conn = self.connection()?;
        let applied = conn.run_pending_migrations(MIGRATIONS).map_err(|e| {
            DbError::new(DbErrorKind::Migration, format!("Migrations failed: {}", e))
        })?;
        info!(count = applied.len(), "Migrations applied");
        Ok(())
    }

    /// Stores the result of a finished session.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] with [`DbErrorKind::Duplicate`] if this run of the
    /// session was already stored, or for any other database failure.
    #[instrument(skip(self, result), fields(session_id = %result.session_id(), run = result.run(), score = result.score()))]
    pub fn record_result(&self, result: NewStudentResult) -> Result<StudentResult, DbError> {
        debug!("Recording session result");
        let mut conn = self.connection()?;

        let stored = diesel::insert_into(schema::student_results::table)
            .values(&result)
            .returning(StudentResult::as_returning())
            .get_result(&mut conn)?;

        info!(
            result_id = stored.id(),
            student = %format!("{} {}", stored.first_name(), stored.last_name()),
            "Session result recorded"
        );
        Ok(stored)
    }

    /// Looks up the stored result of one run of a session. Returns `None` if absent.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn find_run(&self, session_id: &str, run: u64) -> Result<Option<StudentResult>, DbError> {
        let run = i64::try_from(run).unwrap_or(i64::MAX);
        let mut conn = self.connection()?;
        let found = schema::student_results::table
            .filter(schema::student_results::session_id.eq(session_id))
            .filter(schema::student_results::run.eq(run))
            .select(StudentResult::as_select())
            .first(&mut conn)
            .optional()?;
        debug!(found = found.is_some(), "Session result lookup");
        Ok(found)
    }

    /// Lists every stored result, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn list_results(&self) -> Result<Vec<StudentResult>, DbError> {
        let mut conn = self.connection()?;

        let results = schema::student_results::table
            .order((
                schema::student_results::created_at.desc(),
                schema::student_results::id.desc(),
            ))
            .select(StudentResult::as_select())
            .load(&mut conn)?;

        info!(count = results.len(), "Results loaded");
        Ok(results)
    }

    /// Builds the dashboard summary.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn summary(&self) -> Result<ResultSummary, DbError> {
        let summary = ResultSummary::new(self.list_results()?);
        info!(average = ?summary.average_score(), "Result summary computed");
        Ok(summary)
    }
}
