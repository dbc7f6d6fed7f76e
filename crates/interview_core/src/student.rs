//! Student identification collected before the first level.

use std::sync::LazyLock;

use derive_getters::Getters;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

/// Specialties offered on the identification form.
pub const SPECIALTIES: [&str; 3] = ["Informatique", "Electrique", "Mécanique"];

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap_or_else(|e| unreachable!("static pattern: {e}"))
});

/// Identity of the student playing a session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Getters)]
#[serde(rename_all = "camelCase")]
pub struct StudentInfo {
    last_name: String,
    first_name: String,
    group: String,
    grade: String,
    specialty: String,
    professor_email: String,
}

impl StudentInfo {
    /// Creates student information from the identification form fields.
    pub fn new(
        last_name: impl Into<String>,
        first_name: impl Into<String>,
        group: impl Into<String>,
        grade: impl Into<String>,
        specialty: impl Into<String>,
        professor_email: impl Into<String>,
    ) -> Self {
        Self {
            last_name: last_name.into(),
            first_name: first_name.into(),
            group: group.into(),
            grade: grade.into(),
            specialty: specialty.into(),
            professor_email: professor_email.into(),
        }
    }

    /// Returns "First Last".
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Checks that every field is filled in and the professor email is well formed.
    ///
    /// # Errors
    ///
    /// Returns the first missing field, or [`IdentificationError::InvalidEmail`].
    #[instrument(skip(self), fields(student = %self.full_name()))]
    pub fn validate(&self) -> Result<(), IdentificationError> {
        let fields = [
            ("lastName", &self.last_name),
            ("firstName", &self.first_name),
            ("group", &self.group),
            ("grade", &self.grade),
            ("specialty", &self.specialty),
            ("professorEmail", &self.professor_email),
        ];
        if let Some((name, _)) = fields.iter().find(|(_, value)| value.trim().is_empty()) {
            warn!(field = *name, "Identification field missing");
            return Err(IdentificationError::MissingField(*name));
        }

        if !EMAIL_PATTERN.is_match(&self.professor_email) {
            warn!(email = %self.professor_email, "Professor email rejected");
            return Err(IdentificationError::InvalidEmail(self.professor_email.clone()));
        }

        debug!("Identification accepted");
        Ok(())
    }
}

/// Reasons an identification form is refused.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum IdentificationError {
    /// A required field is blank.
    #[display("Veuillez remplir tous les champs ({_0} manquant)")]
    MissingField(&'static str),
    /// The professor email does not look like `local@domain.tld`.
    #[display("Veuillez entrer une adresse email valide ({_0})")]
    InvalidEmail(String),
}

impl std::error::Error for IdentificationError {}
