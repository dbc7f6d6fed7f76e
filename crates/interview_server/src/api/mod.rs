//! HTTP API: session actions, the results dashboard and the email function.

mod error;
mod results;
mod sessions;

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::Request;
use axum::routing::{get, post};
use tower::ServiceBuilder;
use tracing::{info, instrument};

use crate::config::AppConfig;
use crate::db::{DbError, ResultRepository};
use crate::mailer::ResendClient;
use crate::notify::HttpNotifier;
use crate::reporter::ResultReporter;
use crate::session::SessionManager;

pub use error::ApiError;
pub use sessions::{ActionResponse, IdentifyRequest, ReorderRequest};

/// Shared state of every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Live sessions.
    pub sessions: SessionManager,
    /// Report hand-off for finished sessions.
    pub reporter: ResultReporter,
    /// Stored results.
    pub repository: ResultRepository,
    /// Results email sender.
    pub mailer: ResendClient,
    /// Server configuration.
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// Wires the production collaborators from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the database path is unusable.
    #[instrument(skip(config), fields(db = %config.database_path()))]
    pub fn from_config(config: AppConfig) -> Result<Self, DbError> {
        let repository = ResultRepository::new(config.database_path().clone())?;
        let notifier = HttpNotifier::new(config.notification_endpoint());
        let reporter = ResultReporter::new(Arc::new(repository.clone()), Arc::new(notifier));
        let mailer = ResendClient::new(config.mail(), config.resend_api_key());
        info!("Application state ready");
        Ok(Self {
            sessions: SessionManager::new(),
            reporter,
            repository,
            mailer,
            config: Arc::new(config),
        })
    }
}

/// Builds the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/sessions", post(sessions::create))
        .route(
            "/api/sessions/{id}",
            get(sessions::show).delete(sessions::remove),
        )
        .route("/api/sessions/{id}/identify", post(sessions::identify))
        .route("/api/sessions/{id}/start", post(sessions::start))
        .route("/api/sessions/{id}/submit", post(sessions::submit))
        .route("/api/sessions/{id}/reorder", post(sessions::reorder))
        .route("/api/sessions/{id}/retry", post(sessions::retry))
        .route("/api/sessions/{id}/continue", post(sessions::advance))
        .route("/api/sessions/{id}/report", post(sessions::report))
        .route("/api/sessions/{id}/restart", post(sessions::restart))
        .route("/api/results", get(results::list))
        .route("/api/send-email", post(results::send_email))
        .layer(ServiceBuilder::new().map_request(|req: Request<Body>| {
            info!(method = %req.method(), uri = %req.uri(), "Incoming HTTP request");
            req
        }))
        .with_state(state)
}
