//! Level identifiers and their static descriptions.

use serde::{Deserialize, Serialize};
use strum::{EnumIter, IntoEnumIterator};

/// One of the five levels of the interview training flow.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, EnumIter,
    derive_more::Display,
)]
#[serde(into = "u8", try_from = "u8")]
pub enum LevelId {
    /// Level 1: pick the qualities that matter for an internship.
    #[display("Niveau 1")]
    SelfAssessment,
    /// Level 2: research the company's domain and values.
    #[display("Niveau 2")]
    Investigation,
    /// Level 3: answer the interview invitation email.
    #[display("Niveau 3")]
    Invitation,
    /// Level 4: choose an outfit and structure the opening pitch.
    #[display("Niveau 4")]
    Interview,
    /// Level 5: react to interview situations.
    #[display("Niveau 5")]
    Reaction,
}

impl LevelId {
    /// Number of levels in a session.
    pub const COUNT: usize = 5;

    /// Value of `currentLevel` once every level is behind the player.
    pub const FINISHED: u8 = 6;

    /// Returns the 1-based level number.
    pub fn number(self) -> u8 {
        match self {
            Self::SelfAssessment => 1,
            Self::Investigation => 2,
            Self::Invitation => 3,
            Self::Interview => 4,
            Self::Reaction => 5,
        }
    }

    /// Looks a level up by its 1-based number.
    pub fn from_number(number: u8) -> Option<Self> {
        Self::iter().find(|level| level.number() == number)
    }

    /// Returns the level that follows this one, if any.
    pub fn next(self) -> Option<Self> {
        Self::from_number(self.number() + 1)
    }

    /// Title shown in the level header.
    pub fn title(self) -> &'static str {
        match self {
            Self::SelfAssessment => "Le Bilan de Soi",
            Self::Investigation => "L'Investigation",
            Self::Invitation => "L'Invitation",
            Self::Interview => "L'Entretien",
            Self::Reaction => "Réagir en situation",
        }
    }

    /// Short title used on the result screen and in the professor email.
    pub fn result_title(self) -> &'static str {
        match self {
            Self::SelfAssessment => "Se connaître",
            Self::Investigation => "Rechercher l'entreprise",
            Self::Invitation => "Communiquer",
            Self::Interview => "Se présenter",
            Self::Reaction => "Réagir",
        }
    }

    /// Learning objective of the level.
    pub fn objective(self) -> &'static str {
        match self {
            Self::SelfAssessment => {
                "Identifier ses qualités personnelles les plus importantes pour réussir un stage PFE."
            }
            Self::Investigation => {
                "Apprendre à analyser une entreprise, comprendre son domaine d'activité et identifier ses valeurs essentielles avant un entretien."
            }
            Self::Invitation => {
                "Savoir répondre correctement à un e-mail d'entretien, avec une formulation claire, polie et professionnelle."
            }
            Self::Interview => {
                "Adopter une posture professionnelle et construire une présentation personnelle claire et structurée lors du début d'un entretien."
            }
            Self::Reaction => {
                "Développer les bons réflexes professionnels face à des situations et questions courantes en entreprise."
            }
        }
    }
}

impl From<LevelId> for u8 {
    fn from(level: LevelId) -> Self {
        level.number()
    }
}

impl TryFrom<u8> for LevelId {
    type Error = String;

    fn try_from(number: u8) -> Result<Self, Self::Error> {
        Self::from_number(number).ok_or_else(|| format!("no level numbered {number}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_round_trip_through_lookup() {
        for level in LevelId::iter() {
            assert_eq!(LevelId::from_number(level.number()), Some(level));
        }
        assert_eq!(LevelId::from_number(0), None);
        assert_eq!(LevelId::from_number(LevelId::FINISHED), None);
    }

    #[test]
    fn last_level_has_no_successor() {
        assert_eq!(LevelId::Invitation.next(), Some(LevelId::Interview));
        assert_eq!(LevelId::Reaction.next(), None);
    }

    #[test]
    fn serializes_as_its_number() {
        let json = serde_json::to_string(&LevelId::Invitation).unwrap();
        assert_eq!(json, "3");
        let parsed: LevelId = serde_json::from_str("5").unwrap();
        assert_eq!(parsed, LevelId::Reaction);
        assert!(serde_json::from_str::<LevelId>("9").is_err());
    }
}
