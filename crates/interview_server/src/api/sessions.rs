//! Session action handlers.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use interview_core::{Feedback, Navigation, ProgressionError, StudentInfo, Submission};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use super::{ApiError, AppState};
use crate::config::IdentificationDefaults;
use crate::reporter::{ReportGuard, ReportJob};
use crate::session::{SessionEntry, SessionSnapshot};

/// Answer of every session action.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionResponse {
    /// Where the client should go next, for navigating actions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub navigation: Option<Navigation>,
    /// Verdict of a judged submission.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feedback: Option<Feedback>,
    /// Session after the action.
    pub session: SessionSnapshot,
}

impl ActionResponse {
    fn of(session: SessionSnapshot) -> Self {
        Self {
            navigation: None,
            feedback: None,
            session,
        }
    }
}

/// Identification form. Blank group, grade or professor email fall back
/// to the configured defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IdentifyRequest {
    /// Family name.
    pub last_name: String,
    /// Given name.
    pub first_name: String,
    /// Class group.
    pub group: Option<String>,
    /// Study year.
    pub grade: Option<String>,
    /// Specialty.
    pub specialty: String,
    /// Professor receiving the results.
    pub professor_email: Option<String>,
}

impl IdentifyRequest {
    /// Builds the student record, filling blanks from `defaults`.
    pub fn into_student(self, defaults: &IdentificationDefaults) -> StudentInfo {
        fn or_default(value: Option<String>, default: &str) -> String {
            value
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        }

        StudentInfo::new(
            self.last_name.trim(),
            self.first_name.trim(),
            or_default(self.group, defaults.group()),
            or_default(self.grade, defaults.grade()),
            self.specialty.trim(),
            or_default(self.professor_email, defaults.professor_email()).trim(),
        )
    }
}

/// Block move within the working arrangement.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ReorderRequest {
    /// Index of the block to move.
    pub from: usize,
    /// Destination index.
    pub to: usize,
}

#[instrument(skip(state))]
pub(super) async fn create(State(state): State<AppState>) -> (StatusCode, Json<SessionSnapshot>) {
    let snapshot = state.sessions.create();
    info!(session_id = %snapshot.id, "Session opened");
    (StatusCode::CREATED, Json(snapshot))
}

#[instrument(skip(state))]
pub(super) async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SessionSnapshot>, ApiError> {
    Ok(Json(state.sessions.snapshot(&id)?))
}

#[instrument(skip(state))]
pub(super) async fn remove(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.sessions.remove(&id)?;
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state, form))]
pub(super) async fn identify(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(form): Json<IdentifyRequest>,
) -> Result<Json<ActionResponse>, ApiError> {
    let student = form.into_student(state.config.identification());
    let (result, session) = state
        .sessions
        .with_session(&id, |entry| entry.progression.identify(student))?;
    result?;
    Ok(Json(ActionResponse::of(session)))
}

#[instrument(skip(state))]
pub(super) async fn start(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ActionResponse>, ApiError> {
    let (result, session) = state
        .sessions
        .with_session(&id, |entry| entry.progression.start())?;
    Ok(Json(ActionResponse {
        navigation: Some(result?),
        ..ActionResponse::of(session)
    }))
}

#[instrument(skip(state, submission))]
pub(super) async fn submit(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(submission): Json<Submission>,
) -> Result<Json<ActionResponse>, ApiError> {
    let (result, session) = state
        .sessions
        .with_session(&id, |entry| entry.progression.submit(submission))?;
    let feedback = result?;
    debug!(correct = feedback.verdict().is_correct(), "Submission judged");
    Ok(Json(ActionResponse {
        feedback: Some(feedback),
        ..ActionResponse::of(session)
    }))
}

#[instrument(skip(state))]
pub(super) async fn reorder(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<ReorderRequest>,
) -> Result<Json<ActionResponse>, ApiError> {
    let (result, session) = state.sessions.with_session(&id, |entry| {
        entry
            .progression
            .move_block(request.from, request.to)
            .map(|_| ())
    })?;
    result?;
    Ok(Json(ActionResponse::of(session)))
}

#[instrument(skip(state))]
pub(super) async fn retry(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ActionResponse>, ApiError> {
    let (result, session) = state
        .sessions
        .with_session(&id, |entry| entry.progression.retry())?;
    result?;
    Ok(Json(ActionResponse::of(session)))
}

/// Advances the session. Reaching the result screen claims the report and
/// spawns the hand-off once the session lock is released.
#[instrument(skip(state))]
pub(super) async fn advance(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ActionResponse>, ApiError> {
    let (result, session) = state.sessions.with_session(&id, |entry| {
        let navigation = entry.progression.advance()?;
        let job = match navigation {
            Navigation::Result => claim_report(&id, entry, ReportGuard::begin),
            _ => None,
        };
        Ok::<_, ProgressionError>((navigation, job))
    })?;
    let (navigation, job) = result?;

    if let Some(job) = job {
        dispatch_report(&state, job);
    }
    Ok(Json(ActionResponse {
        navigation: Some(navigation),
        ..ActionResponse::of(session)
    }))
}

/// Re-sends a failed report.
#[instrument(skip(state))]
pub(super) async fn report(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ActionResponse>, ApiError> {
    let (job, session) = state
        .sessions
        .with_session(&id, |entry| claim_report(&id, entry, ReportGuard::begin_resend))?;
    let job = job.ok_or_else(|| ApiError::Conflict("No failed report to re-send".to_string()))?;
    dispatch_report(&state, job);
    Ok(Json(ActionResponse::of(session)))
}

#[instrument(skip(state))]
pub(super) async fn restart(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ActionResponse>, ApiError> {
    let ((), session) = state.sessions.with_session(&id, |entry| {
        entry.progression.restart();
        entry.report.reset();
    })?;
    info!(session_id = %id, "Session restarted");
    Ok(Json(ActionResponse::of(session)))
}

/// Claims the report with `claim` once the session has a student and a
/// scorecard, and captures the job.
fn claim_report(
    id: &str,
    entry: &mut SessionEntry,
    claim: fn(&mut ReportGuard) -> bool,
) -> Option<ReportJob> {
    let student = entry.progression.state().student_info().clone()?;
    let scorecard = entry.progression.scorecard()?.clone();
    if !claim(&mut entry.report) {
        return None;
    }
    Some(ReportJob::new(id, &entry.report, student, scorecard))
}

fn dispatch_report(state: &AppState, job: ReportJob) {
    let sessions = state.sessions.clone();
    let id = job.session_id().clone();
    state
        .reporter
        .spawn(job, move |generation, outcome| {
            sessions.complete_report(&id, generation, outcome);
        });
}
