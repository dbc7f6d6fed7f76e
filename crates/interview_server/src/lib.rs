//! Server side of the interview escape game.
//!
//! Hosts player sessions over an axum HTTP API, stores finished sessions
//! in SQLite for the professor dashboard and notifies the professor with a
//! results email.
//!
//! # Architecture
//!
//! - **Sessions**: one [`interview_core::Progression`] per player, behind a shared lock
//! - **Reporter**: one-shot hand-off of a finished session (persist, then notify)
//! - **Mailer**: HTML results email sent through the Resend API
//! - **Database**: append-only `student_results` table
//!
//! # Example
//!
//! ```no_run
//! use interview_server::{AppConfig, AppState, router};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = AppConfig::load(None)?;
//! let state = AppState::from_config(config)?;
//! state.repository.migrate()?;
//!
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:3000").await?;
//! axum::serve(listener, router(state)).await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod api;
mod config;
pub mod db;
pub mod mailer;
mod notify;
mod reporter;
mod session;

pub use api::{ActionResponse, ApiError, AppState, IdentifyRequest, ReorderRequest, router};
pub use config::{
    AppConfig, ConfigError, DATABASE_URL_VAR, IdentificationDefaults, MailSettings,
    RESEND_API_KEY_VAR,
};
pub use notify::{
    HttpNotifier, LevelResultPayload, NotificationRequest, NotificationResponse, Notifier,
    NotifyError, StudentResultPayload,
};
pub use reporter::{
    DeliveryOutcome, DeliveryStatus, ReportGuard, ReportJob, ResultReporter, ResultSink,
};
pub use session::{SessionEntry, SessionId, SessionManager, SessionNotFound, SessionSnapshot};
