//! Minimal Resend API client.

use derive_more::Display;
use serde::Serialize;
use tracing::{debug, error, info, instrument};

use super::template::{render_results_email, subject_line};
use crate::config::MailSettings;
use crate::notify::NotificationRequest;

/// Reasons an email could not be sent.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum MailError {
    /// No API key is configured.
    #[display("RESEND_API_KEY n'est pas configurée")]
    MissingApiKey,
    /// The API could not be reached.
    #[display("Resend API request failed: {_0}")]
    Transport(String),
    /// The API refused the message.
    #[display("Resend API error {status}: {body}")]
    Api {
        /// HTTP status.
        status: u16,
        /// Response body.
        body: String,
    },
}

impl std::error::Error for MailError {}

#[derive(Debug, Serialize)]
struct OutgoingEmail<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: String,
    html: String,
}

/// Sends results emails through `POST {api_url}` with a bearer key.
#[derive(Clone)]
pub struct ResendClient {
    client: reqwest::Client,
    api_url: String,
    sender: String,
    api_key: Option<String>,
}

impl std::fmt::Debug for ResendClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResendClient")
            .field("api_url", &self.api_url)
            .field("sender", &self.sender)
            .field("has_key", &self.api_key.is_some())
            .finish()
    }
}

impl ResendClient {
    /// Creates a client from the mail settings and an optional API key.
    #[instrument(skip(settings, api_key), fields(api_url = %settings.api_url(), has_key = api_key.is_some()))]
    pub fn new(settings: &MailSettings, api_key: Option<String>) -> Self {
        info!("Creating Resend client");
        Self {
            client: reqwest::Client::new(),
            api_url: settings.api_url().clone(),
            sender: settings.sender().clone(),
            api_key,
        }
    }

    /// Renders and sends the results email for `request`.
    ///
    /// Returns the provider's JSON answer.
    ///
    /// # Errors
    ///
    /// Returns [`MailError`] when no key is configured or the API call fails.
    #[instrument(skip(self, request), fields(to = %request.professor_email()))]
    pub async fn send_results(
        &self,
        request: &NotificationRequest,
    ) -> Result<serde_json::Value, MailError> {
        let api_key = self.api_key.as_deref().ok_or(MailError::MissingApiKey)?;
        let result = request.student_result();

        let email = OutgoingEmail {
            from: &self.sender,
            to: [request.professor_email().as_str()],
            subject: subject_line(result),
            html: render_results_email(result),
        };
        debug!(subject = %email.subject, "Sending results email");

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(api_key)
            .json(&email)
            .send()
            .await
            .map_err(|e| {
                error!(error = ?e, "Resend API request failed");
                MailError::Transport(e.to_string())
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| MailError::Transport(format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            error!(status = %status, body = %body, "Resend API error");
            return Err(MailError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let data = serde_json::from_str(&body).unwrap_or(serde_json::Value::String(body));
        info!("Results email sent");
        Ok(data)
    }
}
