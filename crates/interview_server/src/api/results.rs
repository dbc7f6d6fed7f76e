//! Professor dashboard and results-email endpoints.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use tracing::{info, instrument, warn};

use super::{ApiError, AppState};
use crate::db::ResultSummary;
use crate::notify::{NotificationRequest, NotificationResponse};

/// Stored results, newest first, with the rounded average score.
#[instrument(skip(state))]
pub(super) async fn list(State(state): State<AppState>) -> Result<Json<ResultSummary>, ApiError> {
    let repository = state.repository.clone();
    let summary = tokio::task::spawn_blocking(move || repository.summary())
        .await
        .map_err(|e| ApiError::Internal(format!("Dashboard task aborted: {}", e)))??;
    info!(count = summary.results().len(), "Dashboard served");
    Ok(Json(summary))
}

/// Formats and sends the results email.
///
/// Answers `{success: true, data}` or `{success: false, error}` with 500.
#[instrument(skip(state, request), fields(to = %request.professor_email()))]
pub(super) async fn send_email(
    State(state): State<AppState>,
    Json(request): Json<NotificationRequest>,
) -> (StatusCode, Json<NotificationResponse>) {
    match state.mailer.send_results(&request).await {
        Ok(data) => {
            info!("Results email delivered");
            (StatusCode::OK, Json(NotificationResponse::delivered(data)))
        }
        Err(e) => {
            warn!(error = %e, "Results email failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(NotificationResponse::failed(e.to_string())),
            )
        }
    }
}
