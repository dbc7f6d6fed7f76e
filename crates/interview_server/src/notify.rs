//! Professor notification: wire payload and HTTP delivery.
//!
//! The payload keeps the field names the results-email function expects
//! (`nom`, `prenom`, `groupe`, ...), so the notifier can target either
//! this server's own `/api/send-email` or an external function.

use async_trait::async_trait;
use derive_getters::Getters;
use derive_more::Display;
use interview_core::{Scorecard, StudentInfo};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

/// One row of the per-level table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct LevelResultPayload {
    level: u8,
    title: String,
    completed: bool,
}

/// Student and score block of the notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
#[serde(rename_all = "camelCase")]
pub struct StudentResultPayload {
    #[serde(rename = "nom")]
    last_name: String,
    #[serde(rename = "prenom")]
    first_name: String,
    #[serde(rename = "groupe")]
    group: String,
    #[serde(rename = "niveau")]
    grade: String,
    #[serde(rename = "specialite")]
    specialty: String,
    score: u8,
    completed_levels: Vec<u8>,
    /// Minutes, rounded.
    time_elapsed: i64,
    level_results: Vec<LevelResultPayload>,
}

/// Body posted to the notification endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
#[serde(rename_all = "camelCase")]
pub struct NotificationRequest {
    professor_email: String,
    student_result: StudentResultPayload,
}

impl NotificationRequest {
    /// Builds the notification for a finished session.
    pub fn from_scorecard(student: &StudentInfo, scorecard: &Scorecard) -> Self {
        let completed_levels = scorecard
            .level_results()
            .iter()
            .filter(|result| *result.completed())
            .map(|result| result.level().number())
            .collect();
        let level_results = scorecard
            .level_results()
            .iter()
            .map(|result| LevelResultPayload {
                level: result.level().number(),
                title: result.title().clone(),
                completed: *result.completed(),
            })
            .collect();

        Self {
            professor_email: student.professor_email().clone(),
            student_result: StudentResultPayload {
                last_name: student.last_name().clone(),
                first_name: student.first_name().clone(),
                group: student.group().clone(),
                grade: student.grade().clone(),
                specialty: student.specialty().clone(),
                score: *scorecard.score(),
                completed_levels,
                time_elapsed: *scorecard.elapsed_minutes(),
                level_results,
            },
        }
    }

    /// Number of completed levels.
    pub fn completed_count(&self) -> usize {
        self.student_result.completed_levels.len()
    }
}

/// Answer of the notification endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters)]
pub struct NotificationResponse {
    success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    data: Option<serde_json::Value>,
}

impl NotificationResponse {
    /// Successful answer carrying the provider's response.
    pub fn delivered(data: serde_json::Value) -> Self {
        Self {
            success: true,
            error: None,
            data: Some(data),
        }
    }

    /// Failed answer.
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            data: None,
        }
    }
}

/// Reasons a notification was not delivered.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum NotifyError {
    /// The endpoint could not be reached.
    #[display("Notification endpoint unreachable: {_0}")]
    Transport(String),
    /// The endpoint answered `success: false`.
    #[display("Notification rejected: {_0}")]
    Rejected(String),
    /// The endpoint answered with a non-success status and no usable body.
    #[display("Notification endpoint returned HTTP {_0}")]
    Status(u16),
    /// The body could not be parsed.
    #[display("Malformed notification response: {_0}")]
    MalformedResponse(String),
}

impl std::error::Error for NotifyError {}

/// Sends the results notification for a finished session.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Delivers `request`.
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError`] when delivery failed in any way.
    async fn notify(&self, request: &NotificationRequest) -> Result<(), NotifyError>;
}

/// Notifier posting JSON to an HTTP endpoint.
#[derive(Debug, Clone)]
pub struct HttpNotifier {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpNotifier {
    /// Creates a notifier for `endpoint`.
    #[instrument]
    pub fn new(endpoint: String) -> Self {
        info!("Creating HTTP notifier");
        Self {
            client: reqwest::Client::new(),
            endpoint,
        }
    }

    /// Target endpoint.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Notifier for HttpNotifier {
    #[instrument(skip(self, request), fields(endpoint = %self.endpoint, score = request.student_result().score()))]
    async fn notify(&self, request: &NotificationRequest) -> Result<(), NotifyError> {
        debug!("Posting results notification");
        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Notification request failed");
                NotifyError::Transport(e.to_string())
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| NotifyError::Transport(format!("Failed to read response: {}", e)))?;

        let parsed: NotificationResponse = match serde_json::from_str(&body) {
            Ok(parsed) => parsed,
            Err(_) if !status.is_success() => {
                warn!(status = %status, "Notification endpoint error without body");
                return Err(NotifyError::Status(status.as_u16()));
            }
            Err(e) => {
                warn!(error = %e, body = %body, "Unparseable notification response");
                return Err(NotifyError::MalformedResponse(e.to_string()));
            }
        };

        if *parsed.success() {
            info!("Results notification delivered");
            Ok(())
        } else {
            let reason = parsed
                .error()
                .clone()
                .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));
            warn!(reason = %reason, "Notification rejected");
            Err(NotifyError::Rejected(reason))
        }
    }
}
