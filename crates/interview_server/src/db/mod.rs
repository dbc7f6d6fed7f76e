//! Persistence of finished sessions for the professor dashboard.

mod error;
mod models;
mod repository;
mod schema; // Diesel generated schema - internal use only

pub use error::{DbError, DbErrorKind};
pub use models::{NewStudentResult, ResultSummary, StudentResult};
pub use repository::{MIGRATIONS, ResultRepository};
