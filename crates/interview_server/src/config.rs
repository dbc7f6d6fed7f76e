//! Server configuration.
//!
//! Values come from an optional TOML file; anything missing falls back to
//! the defaults below. Secrets are never read from the file, only from the
//! environment (after `dotenvy` has loaded `.env`).

use std::path::Path;

use derive_getters::Getters;
use derive_more::{Display, Error};
use derive_setters::Setters;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

/// Environment variable holding the Resend API key.
pub const RESEND_API_KEY_VAR: &str = "RESEND_API_KEY";

/// Environment variable overriding the database path.
pub const DATABASE_URL_VAR: &str = "DATABASE_URL";

/// Values pre-filled on the identification form.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Setters, Serialize, Deserialize)]
#[setters(prefix = "with_", into)]
#[serde(default)]
pub struct IdentificationDefaults {
    group: String,
    grade: String,
    professor_email: String,
}

impl Default for IdentificationDefaults {
    fn default() -> Self {
        Self {
            group: "3ème Année".to_string(),
            grade: "3ème Année".to_string(),
            professor_email: "isetentretien499@gmail.com".to_string(),
        }
    }
}

/// Outgoing mail settings.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Setters, Serialize, Deserialize)]
#[setters(prefix = "with_", into)]
#[serde(default)]
pub struct MailSettings {
    api_url: String,
    sender: String,
}

impl Default for MailSettings {
    fn default() -> Self {
        Self {
            api_url: "https://api.resend.com/emails".to_string(),
            sender: "Simulateur Entretien <onboarding@resend.dev>".to_string(),
        }
    }
}

/// Complete server configuration.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Setters, Serialize, Deserialize)]
#[setters(prefix = "with_", into)]
#[serde(default)]
pub struct AppConfig {
    host: String,
    port: u16,
    database_path: String,
    /// Endpoint receiving the results notification. Defaults to this
    /// server's own `/api/send-email`.
    notification_url: Option<String>,
    identification: IdentificationDefaults,
    mail: MailSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            database_path: "interview_escape.db".to_string(),
            notification_url: None,
            identification: IdentificationDefaults::default(),
            mail: MailSettings::default(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;
        Self::from_toml(&content)
    }

    /// Parses configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the text is not valid configuration.
    #[instrument(skip(content))]
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;
        config.check()?;
        info!(host = %config.host, port = config.port, "Config loaded");
        Ok(config)
    }

    /// Loads the file when given, otherwise the defaults, then applies
    /// environment overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a given file is unusable.
    #[instrument(skip(path))]
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                debug!("No config file given, using defaults");
                Self::default()
            }
        };
        Ok(config.with_env_overrides())
    }

    /// Applies `DATABASE_URL` when set.
    pub fn with_env_overrides(self) -> Self {
        match std::env::var(DATABASE_URL_VAR) {
            Ok(path) if !path.trim().is_empty() => {
                debug!(path = %path, "Database path overridden from environment");
                self.with_database_path(path)
            }
            _ => self,
        }
    }

    /// Socket address string to bind.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Endpoint the notifier posts to.
    pub fn notification_endpoint(&self) -> String {
        self.notification_url
            .clone()
            .unwrap_or_else(|| format!("http://{}/api/send-email", self.bind_address()))
    }

    /// Reads the Resend API key from the environment.
    #[instrument(skip(self))]
    pub fn resend_api_key(&self) -> Option<String> {
        match std::env::var(RESEND_API_KEY_VAR) {
            Ok(key) if !key.trim().is_empty() => Some(key),
            _ => {
                warn!("{} is not set, results emails cannot be sent", RESEND_API_KEY_VAR);
                None
            }
        }
    }

    fn check(&self) -> Result<(), ConfigError> {
        if self.database_path.trim().is_empty() {
            return Err(ConfigError::new("database_path must not be empty".to_string()));
        }
        if self.port == 0 {
            return Err(ConfigError::new("port must not be 0".to_string()));
        }
        Ok(())
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config = AppConfig::from_toml("").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.identification().grade(), "3ème Année");
        assert_eq!(
            config.notification_endpoint(),
            "http://127.0.0.1:3000/api/send-email"
        );
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let config = AppConfig::from_toml(
            r#"
            port = 8080
            notification_url = "http://mailer.local/send"

            [identification]
            professor_email = "chef@iset.tn"
            "#,
        )
        .unwrap();
        assert_eq!(*config.port(), 8080);
        assert_eq!(config.host(), "127.0.0.1");
        assert_eq!(config.notification_endpoint(), "http://mailer.local/send");
        assert_eq!(config.identification().professor_email(), "chef@iset.tn");
        assert_eq!(config.identification().group(), "3ème Année");
        assert_eq!(config.mail().api_url(), "https://api.resend.com/emails");
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(AppConfig::from_toml("port = 0").is_err());
        assert!(AppConfig::from_toml("database_path = ''").is_err());
        assert!(AppConfig::from_toml("port = 'abc'").is_err());
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = AppConfig::from_file("/definitely/not/here.toml").unwrap_err();
        assert!(err.message.contains("Failed to read"));
    }
}
