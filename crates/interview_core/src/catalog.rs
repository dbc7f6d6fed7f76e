//! Static answer keys and content for every level.
//!
//! Nothing here is mutated at runtime. Validators compare submissions
//! against these tables; prompts expose them without the correctness flags.

use serde::Serialize;

use crate::StudentInfo;

/// Number of items a player must pick in the multi-select levels.
pub const REQUIRED_SELECTIONS: usize = 4;

/// A selectable option with its correctness flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChoiceOption {
    /// Stable option identifier.
    pub id: &'static str,
    /// Label shown to the player.
    pub label: &'static str,
    /// Whether this option belongs to the answer key.
    pub correct: bool,
}

impl ChoiceOption {
    const fn new(id: &'static str, label: &'static str, correct: bool) -> Self {
        Self { id, label, correct }
    }
}

/// A text block the player has to put in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextBlock {
    /// Stable block identifier.
    pub id: &'static str,
    /// Text displayed for the block.
    pub content: String,
}

/// A level-5 interview situation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scenario {
    /// Question identifier used as key in the recorded answers.
    pub id: &'static str,
    /// Situation described to the player.
    pub question: &'static str,
    /// Possible reactions, exactly one of which is correct.
    pub options: [ChoiceOption; 3],
}

impl Scenario {
    /// Returns the correct reaction.
    pub fn best_option(&self) -> &ChoiceOption {
        self.options
            .iter()
            .find(|option| option.correct)
            .unwrap_or(&self.options[0])
    }
}

/// Level 1 qualities.
pub const QUALITIES: [ChoiceOption; 8] = [
    ChoiceOption::new("rigueur", "Rigueur", true),
    ChoiceOption::new("curiosite", "Curiosité", true),
    ChoiceOption::new("esprit-equipe", "Esprit d'équipe", true),
    ChoiceOption::new("autonomie", "Autonomie", true),
    ChoiceOption::new("ponctualite", "Ponctualité", false),
    ChoiceOption::new("patience", "Patience", false),
    ChoiceOption::new("humour", "Sens de l'humour", false),
    ChoiceOption::new("competitivite", "Compétitivité", false),
];

/// Level 2, first sub-check: the company's field of activity.
pub const DOMAINS: [ChoiceOption; 4] = [
    ChoiceOption::new("A", "Sites e-commerce grand public", false),
    ChoiceOption::new("B", "Jeux vidéo", false),
    ChoiceOption::new(
        "C",
        "Solutions ERP personnalisées et transformation digitale des PME tunisiennes",
        true,
    ),
    ChoiceOption::new("D", "Cybersécurité", false),
];

/// Level 2, second sub-check: the company's values.
pub const COMPANY_VALUES: [ChoiceOption; 8] = [
    ChoiceOption::new("innovation", "Innovation", true),
    ChoiceOption::new("competitivite", "Compétitivité à tout prix", false),
    ChoiceOption::new("collaboration", "Collaboration", true),
    ChoiceOption::new("rapidite", "Rapidité avant qualité", false),
    ChoiceOption::new("rigueur", "Rigueur", true),
    ChoiceOption::new("travail-individuel", "Travail 100% individuel", false),
    ChoiceOption::new("proximite", "Proximité client", true),
    ChoiceOption::new("standardisation", "Standardisation maximale", false),
];

/// Level 3 mail blocks, in canonical order.
pub const MAIL_BLOCKS: [(&str, &str); 4] = [
    ("salutation", "Chère Madame Fatma,"),
    (
        "remerciement",
        "Je vous remercie de votre invitation et vous confirme ma présence à l'entretien de stage PFE à TechTunis.",
    ),
    (
        "disponibilite",
        "Je reste disponible pour toute information complémentaire.",
    ),
    ("signature", "Cordialement,"),
];

/// Level 4, first sub-check: interview outfits.
pub const AVATARS: [ChoiceOption; 4] = [
    ChoiceOption::new("professionnel", "Professionnel", true),
    ChoiceOption::new("decontracte", "Décontracté", false),
    ChoiceOption::new("sportif", "Sportif", false),
    ChoiceOption::new("casual", "Casual", false),
];

/// Level 4 pitch block ids, in canonical order.
pub const PITCH_BLOCK_IDS: [&str; 4] = ["salutation", "presentation", "motivation", "conclusion"];

/// Level 5 situations, presented in this order.
pub const SCENARIOS: [Scenario; 3] = [
    Scenario {
        id: "q1",
        question: "Votre recruteur vous demande : \"Parlez-moi de votre plus grand échec.\" Que répondez-vous ?",
        options: [
            ChoiceOption::new("a", "Je n'ai jamais échoué, je réussis toujours tout.", false),
            ChoiceOption::new(
                "b",
                "Lors d'un projet universitaire, j'ai sous-estimé le temps nécessaire. J'ai appris à mieux planifier depuis.",
                true,
            ),
            ChoiceOption::new("c", "Je préfère ne pas en parler, c'est personnel.", false),
        ],
    },
    Scenario {
        id: "q2",
        question: "On vous propose un café avant l'entretien. Que faites-vous ?",
        options: [
            ChoiceOption::new("a", "Je refuse poliment mais je remercie.", false),
            ChoiceOption::new("b", "J'accepte avec un sourire et je remercie.", true),
            ChoiceOption::new("c", "Je demande plutôt un jus d'orange.", false),
        ],
    },
    Scenario {
        id: "q3",
        question: "Le recruteur vous dit : \"Avez-vous des questions ?\" Que répondez-vous ?",
        options: [
            ChoiceOption::new("a", "Non, vous avez tout expliqué clairement.", false),
            ChoiceOption::new("b", "Combien d'heures de pause ai-je par jour ?", false),
            ChoiceOption::new(
                "c",
                "Oui, quelles sont les technologies utilisées dans vos projets actuels ?",
                true,
            ),
        ],
    },
];

/// Returns the ids of the options flagged correct.
pub fn correct_ids(options: &[ChoiceOption]) -> Vec<&'static str> {
    options
        .iter()
        .filter(|option| option.correct)
        .map(|option| option.id)
        .collect()
}

/// Level 3 blocks in canonical order.
pub fn mail_blocks() -> Vec<TextBlock> {
    MAIL_BLOCKS
        .iter()
        .map(|(id, content)| TextBlock {
            id: *id,
            content: (*content).to_string(),
        })
        .collect()
}

/// Level 4 pitch blocks in canonical order, personalised for the student.
///
/// Placeholders are used until the student has identified.
pub fn pitch_blocks(student: Option<&StudentInfo>) -> Vec<TextBlock> {
    let (first_name, last_name, specialty) = match student {
        Some(info) => (
            info.first_name().as_str(),
            info.last_name().as_str(),
            info.specialty().as_str(),
        ),
        None => ("Prénom", "Nom", "Informatique"),
    };

    let contents = [
        "Bonjour, merci de me recevoir aujourd'hui.".to_string(),
        format!(
            "Je m'appelle {first_name} {last_name}, étudiant(e) en 3ème année {specialty}."
        ),
        "Je suis passionné(e) par mon domaine et je souhaite mettre mes compétences au service de TechTunis."
            .to_string(),
        "Ce stage PFE représente pour moi une opportunité idéale de contribuer à des projets concrets."
            .to_string(),
    ];

    PITCH_BLOCK_IDS
        .iter()
        .zip(contents)
        .map(|(id, content)| TextBlock { id: *id, content })
        .collect()
}
