//! Progression controller: the state machine that drives a session.
//!
//! The controller is the only component that judges submissions and moves
//! the player between stages. It owns the [`GameStore`], so the aggregate
//! can only advance through the transitions below:
//!
//! ```text
//! NotStarted --identify--> Identifying --start--> Playing{Qualities, Answering}
//! Playing{s, Answering} --submit--> Playing{s, Correct | Incorrect}
//! Playing{s, Incorrect} --retry--> Playing{s, Answering}
//! Playing{s, Correct} --advance--> next stage, next level or Finished
//! any --restart--> NotStarted
//! ```

use std::collections::BTreeSet;

use derive_getters::Getters;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::catalog::{
    self, AVATARS, COMPANY_VALUES, DOMAINS, QUALITIES, REQUIRED_SELECTIONS, SCENARIOS, TextBlock,
};
use crate::validate::{self, SubmissionError, Verdict};
use crate::{GameState, GameStore, IdentificationError, LevelId, Scorecard, StudentInfo};

/// Number of level-5 situations.
pub const SCENARIO_COUNT: usize = SCENARIOS.len();

/// One screen of the flow. Levels 2 and 4 have two sub-checks, level 5 has one per scenario.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display,
)]
#[serde(rename_all = "camelCase")]
pub enum Stage {
    /// Level 1.
    #[display("qualities")]
    Qualities,
    /// Level 2, sub-check (a).
    #[display("domain")]
    Domain,
    /// Level 2, sub-check (b).
    #[display("company values")]
    CompanyValues,
    /// Level 3.
    #[display("mail order")]
    MailOrder,
    /// Level 4, sub-check (a).
    #[display("avatar")]
    Avatar,
    /// Level 4, sub-check (b).
    #[display("pitch order")]
    PitchOrder,
    /// Level 5, scenario at the given index.
    #[display("scenario {_0}")]
    Scenario(usize),
}

impl Stage {
    /// Entry stage of `level`.
    pub fn first_of(level: LevelId) -> Self {
        match level {
            LevelId::SelfAssessment => Self::Qualities,
            LevelId::Investigation => Self::Domain,
            LevelId::Invitation => Self::MailOrder,
            LevelId::Interview => Self::Avatar,
            LevelId::Reaction => Self::Scenario(0),
        }
    }

    /// Level this stage belongs to.
    pub fn level(self) -> LevelId {
        match self {
            Self::Qualities => LevelId::SelfAssessment,
            Self::Domain | Self::CompanyValues => LevelId::Investigation,
            Self::MailOrder => LevelId::Invitation,
            Self::Avatar | Self::PitchOrder => LevelId::Interview,
            Self::Scenario(_) => LevelId::Reaction,
        }
    }

    /// Following stage inside the same level, if any.
    pub fn next_in_level(self) -> Option<Self> {
        match self {
            Self::Domain => Some(Self::CompanyValues),
            Self::Avatar => Some(Self::PitchOrder),
            Self::Scenario(index) if index + 1 < SCENARIO_COUNT => Some(Self::Scenario(index + 1)),
            _ => None,
        }
    }

    /// Returns true for stages that arrange text blocks.
    pub fn is_ordering(self) -> bool {
        matches!(self, Self::MailOrder | Self::PitchOrder)
    }

    /// Returns true for level-5 scenarios.
    pub fn is_scenario(self) -> bool {
        matches!(self, Self::Scenario(_))
    }

    fn expected_submission(self) -> &'static str {
        match self {
            Self::Qualities | Self::CompanyValues => "une sélection",
            Self::Domain | Self::Avatar | Self::Scenario(_) => "un choix unique",
            Self::MailOrder | Self::PitchOrder => "un ordre de blocs",
        }
    }
}

/// Where the player stands within the current stage.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display,
)]
#[serde(rename_all = "camelCase")]
pub enum AttemptStatus {
    /// Waiting for a submission.
    #[display("answering")]
    Answering,
    /// The last submission was wrong.
    #[display("incorrect")]
    Incorrect,
    /// The last submission was right.
    #[display("correct")]
    Correct,
}

/// Controller state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, derive_more::Display)]
#[serde(tag = "phase", rename_all = "camelCase")]
pub enum Phase {
    /// Nothing happened yet.
    #[display("not started")]
    NotStarted,
    /// The student identified and may start.
    #[display("identifying")]
    Identifying,
    /// A stage is on screen.
    #[display("playing {stage} ({status})")]
    Playing {
        /// Current stage.
        stage: Stage,
        /// Progress within the stage.
        status: AttemptStatus,
    },
    /// Every level is behind the player.
    #[display("finished")]
    Finished,
}

/// A player's answer to the current stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum Submission {
    /// Unordered multi-select.
    Selection(Vec<String>),
    /// Single choice; `None` means nothing was picked.
    Choice(Option<String>),
    /// Explicit block order.
    Order(Vec<String>),
    /// The working arrangement as it currently stands.
    Arrangement,
}

/// Result of a judged submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct Feedback {
    verdict: Verdict,
    message: String,
}

/// Abstract navigation signal emitted by transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "to", content = "target", rename_all = "camelCase")]
pub enum Navigation {
    /// Another stage of the same level.
    Stage(Stage),
    /// The first stage of another level.
    Level(LevelId),
    /// The result screen.
    Result,
}

/// Reasons a controller action is refused. Nothing is mutated when one is returned.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum ProgressionError {
    /// Identification form refused.
    #[display("{_0}")]
    Identification(IdentificationError),
    /// Malformed submission.
    #[display("{_0}")]
    Submission(SubmissionError),
    /// Action not allowed from the current phase.
    #[display("Cannot {action} while {phase}")]
    IllegalTransition {
        /// Refused action.
        action: &'static str,
        /// Phase at the time of the request.
        phase: Phase,
    },
    /// Submission shape does not fit the stage.
    #[display("L'étape {stage} attend {expected}")]
    WrongSubmissionKind {
        /// Current stage.
        stage: Stage,
        /// Expected submission shape.
        expected: &'static str,
    },
    /// Scenarios cannot be retried.
    #[display("Les mises en situation ne peuvent pas être rejouées")]
    RetryNotAllowed,
    /// Block move outside the arrangement.
    #[display("Déplacement impossible de {from} vers {to} ({len} blocs)")]
    BlockOutOfRange {
        /// Source index.
        from: usize,
        /// Destination index.
        to: usize,
        /// Number of blocks.
        len: usize,
    },
    /// Post-transition check failed.
    #[display("Invariant violated: {_0}")]
    InvariantViolation(String),
}

impl std::error::Error for ProgressionError {}

impl From<IdentificationError> for ProgressionError {
    fn from(err: IdentificationError) -> Self {
        Self::Identification(err)
    }
}

impl From<SubmissionError> for ProgressionError {
    fn from(err: SubmissionError) -> Self {
        Self::Submission(err)
    }
}

/// A selectable option as shown to the player, without its correctness flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OptionView {
    /// Option identifier to submit.
    pub id: &'static str,
    /// Displayed label.
    pub label: &'static str,
}

/// Content of the current stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Getters)]
#[serde(rename_all = "camelCase")]
pub struct Prompt {
    level: LevelId,
    stage: Stage,
    title: &'static str,
    objective: &'static str,
    instruction: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    required: Option<usize>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    options: Vec<OptionView>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    blocks: Vec<TextBlock>,
}

/// Read-only snapshot of a session, taken after each transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Getters)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    phase: Phase,
    current_level: u8,
    student: Option<StudentInfo>,
    completed_levels: Vec<LevelId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    prompt: Option<Prompt>,
    #[serde(skip_serializing_if = "Option::is_none")]
    scorecard: Option<Scorecard>,
}

/// State machine for one player.
#[derive(Debug, Clone)]
pub struct Progression {
    store: GameStore,
    phase: Phase,
    arrangement: Vec<TextBlock>,
    rng: StdRng,
    scenario_hits: usize,
    scorecard: Option<Scorecard>,
}

impl Default for Progression {
    fn default() -> Self {
        Self::new()
    }
}

impl Progression {
    /// Creates a controller with an entropy-seeded shuffler.
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Creates a controller whose block shuffles are reproducible.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            store: GameStore::new(),
            phase: Phase::NotStarted,
            arrangement: Vec::new(),
            rng,
            scenario_hits: 0,
            scorecard: None,
        }
    }

    /// Current controller state.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Latest aggregate.
    pub fn state(&self) -> &GameState {
        self.store.state()
    }

    /// Working block arrangement of the current ordering stage.
    pub fn arrangement(&self) -> &[TextBlock] {
        &self.arrangement
    }

    /// Number of level-5 scenarios answered correctly so far.
    pub fn scenario_hits(&self) -> usize {
        self.scenario_hits
    }

    /// Final scorecard, available once finished.
    pub fn scorecard(&self) -> Option<&Scorecard> {
        self.scorecard.as_ref()
    }

    /// Records the identification form.
    ///
    /// # Errors
    ///
    /// Refused outside `NotStarted`/`Identifying`, or when the form is invalid.
    #[instrument(skip(self, info), fields(student = %info.full_name()))]
    pub fn identify(&mut self, info: StudentInfo) -> Result<(), ProgressionError> {
        if !matches!(self.phase, Phase::NotStarted | Phase::Identifying) {
            return Err(self.illegal("identify"));
        }
        info.validate()?;

        self.store.set_student_info(info);
        self.phase = Phase::Identifying;
        info!("Student identified");
        Ok(())
    }

    /// Enters level 1 and starts the clock.
    ///
    /// # Errors
    ///
    /// Refused unless the student has identified.
    #[instrument(skip(self))]
    pub fn start(&mut self) -> Result<Navigation, ProgressionError> {
        if self.phase != Phase::Identifying {
            return Err(self.illegal("start"));
        }
        let checkpoint = self.clone();
        self.store.start_game();
        self.enter(Stage::Qualities);
        self.commit(checkpoint, Navigation::Level(LevelId::SelfAssessment))
    }

    /// Judges a submission for the current stage.
    ///
    /// # Errors
    ///
    /// Refused unless a stage is waiting for an answer, when the shape does
    /// not fit the stage, or when the submission is malformed.
    #[instrument(skip(self))]
    pub fn submit(&mut self, submission: Submission) -> Result<Feedback, ProgressionError> {
        let stage = match self.phase {
            Phase::Playing {
                stage,
                status: AttemptStatus::Answering,
            } => stage,
            _ => return Err(self.illegal("submit")),
        };

        let verdict = match (stage, submission) {
            (Stage::Qualities, Submission::Selection(ids)) => {
                let verdict = validate::validate_qualities(&ids)?;
                self.store.set_level1_choices(into_set(ids));
                verdict
            }
            (Stage::Domain, Submission::Choice(choice)) => {
                let verdict = validate::validate_domain(choice.as_deref())?;
                self.store.set_level2_domain(choice.unwrap_or_default());
                verdict
            }
            (Stage::CompanyValues, Submission::Selection(ids)) => {
                let verdict = validate::validate_company_values(&ids)?;
                self.store.set_level2_values(into_set(ids));
                verdict
            }
            (Stage::MailOrder, Submission::Order(ids)) => {
                let verdict = validate::validate_mail_order(&ids)?;
                self.store.set_level3_order(ids);
                verdict
            }
            (Stage::MailOrder, Submission::Arrangement) => {
                let ids = self.arranged_ids();
                let verdict = validate::validate_mail_order(&ids)?;
                self.store.set_level3_order(ids);
                verdict
            }
            (Stage::Avatar, Submission::Choice(choice)) => {
                let verdict = validate::validate_avatar(choice.as_deref())?;
                self.store.set_level4_avatar(choice.unwrap_or_default());
                verdict
            }
            (Stage::PitchOrder, Submission::Order(ids)) => {
                let verdict = validate::validate_pitch_order(&ids)?;
                self.store.set_level4_pitch_order(ids);
                verdict
            }
            (Stage::PitchOrder, Submission::Arrangement) => {
                let ids = self.arranged_ids();
                let verdict = validate::validate_pitch_order(&ids)?;
                self.store.set_level4_pitch_order(ids);
                verdict
            }
            (Stage::Scenario(index), Submission::Choice(choice)) => {
                let verdict = validate::validate_scenario_answer(index, choice.as_deref())?;
                let question = SCENARIOS[index].id.to_string();
                self.store
                    .set_level5_answer(question, choice.unwrap_or_default());
                if verdict.is_correct() {
                    self.scenario_hits += 1;
                }
                verdict
            }
            (stage, submission) => {
                warn!(%stage, ?submission, "Submission shape does not fit the stage");
                return Err(ProgressionError::WrongSubmissionKind {
                    stage,
                    expected: stage.expected_submission(),
                });
            }
        };

        let status = if verdict.is_correct() {
            AttemptStatus::Correct
        } else {
            AttemptStatus::Incorrect
        };
        self.phase = Phase::Playing { stage, status };
        info!(%stage, ?verdict, "Submission judged");

        Ok(Feedback {
            verdict,
            message: feedback_message(stage, verdict),
        })
    }

    /// Moves the block at `from` to position `to` in the working arrangement.
    ///
    /// # Errors
    ///
    /// Refused outside an answering ordering stage or for out-of-range indices.
    #[instrument(skip(self))]
    pub fn move_block(&mut self, from: usize, to: usize) -> Result<&[TextBlock], ProgressionError> {
        match self.phase {
            Phase::Playing {
                stage,
                status: AttemptStatus::Answering,
            } if stage.is_ordering() => {}
            _ => return Err(self.illegal("move a block")),
        }

        let len = self.arrangement.len();
        if from >= len || to >= len {
            return Err(ProgressionError::BlockOutOfRange { from, to, len });
        }
        let block = self.arrangement.remove(from);
        self.arrangement.insert(to, block);
        debug!(from, to, "Block moved");
        Ok(&self.arrangement)
    }

    /// Returns to answering after an incorrect submission.
    ///
    /// The working arrangement of ordering stages is reshuffled; the last
    /// recorded submission is kept.
    ///
    /// # Errors
    ///
    /// Refused unless the last submission was incorrect, and always for scenarios.
    #[instrument(skip(self))]
    pub fn retry(&mut self) -> Result<(), ProgressionError> {
        let stage = match self.phase {
            Phase::Playing {
                stage,
                status: AttemptStatus::Incorrect,
            } => stage,
            _ => return Err(self.illegal("retry")),
        };
        if stage.is_scenario() {
            return Err(ProgressionError::RetryNotAllowed);
        }

        if stage.is_ordering() {
            self.arrangement.shuffle(&mut self.rng);
        }
        self.phase = Phase::Playing {
            stage,
            status: AttemptStatus::Answering,
        };
        debug!(%stage, "Retrying stage");
        Ok(())
    }

    /// Moves past a solved stage.
    ///
    /// This is the only transition that completes levels. Scenarios advance on
    /// either verdict; the last scenario finishes the session.
    ///
    /// # Errors
    ///
    /// Refused unless the current stage has been solved (or answered, for scenarios).
    #[instrument(skip(self))]
    pub fn advance(&mut self) -> Result<Navigation, ProgressionError> {
        let stage = match self.phase {
            Phase::Playing {
                stage,
                status: AttemptStatus::Correct,
            } => stage,
            Phase::Playing {
                stage,
                status: AttemptStatus::Incorrect,
            } if stage.is_scenario() => stage,
            _ => return Err(self.illegal("continue")),
        };

        if let Some(next) = stage.next_in_level() {
            self.enter(next);
            return Ok(Navigation::Stage(next));
        }

        let checkpoint = self.clone();
        let level = stage.level();
        self.store.complete_level(level);

        let navigation = match level.next() {
            Some(next_level) => {
                self.enter(Stage::first_of(next_level));
                Navigation::Level(next_level)
            }
            None => {
                self.store.finish();
                let scorecard = Scorecard::from_state(self.store.state(), self.scenario_hits);
                info!(score = scorecard.score(), "Session finished");
                self.scorecard = Some(scorecard);
                self.arrangement.clear();
                self.phase = Phase::Finished;
                Navigation::Result
            }
        };
        self.commit(checkpoint, navigation)
    }

    /// Discards the session and returns to the welcome state.
    #[instrument(skip(self))]
    pub fn restart(&mut self) {
        self.store.reset_game();
        self.phase = Phase::NotStarted;
        self.arrangement.clear();
        self.scenario_hits = 0;
        self.scorecard = None;
        info!("Session restarted");
    }

    /// Content of the current stage, without any correctness information.
    pub fn prompt(&self) -> Option<Prompt> {
        let Phase::Playing { stage, .. } = self.phase else {
            return None;
        };
        let level = stage.level();
        let (instruction, required, options, blocks) = match stage {
            Stage::Qualities => (
                "Sélectionnez exactement 4 qualités parmi les 8 proposées".to_string(),
                Some(REQUIRED_SELECTIONS),
                option_views(&QUALITIES),
                Vec::new(),
            ),
            Stage::Domain => (
                "Étape 1 – Quel est le domaine d'activité principal de TechTunis ?".to_string(),
                None,
                option_views(&DOMAINS),
                Vec::new(),
            ),
            Stage::CompanyValues => (
                "Étape 2 – Sélectionnez les 4 valeurs fondamentales de TechTunis".to_string(),
                Some(REQUIRED_SELECTIONS),
                option_views(&COMPANY_VALUES),
                Vec::new(),
            ),
            Stage::MailOrder => (
                "Reconstituez un mail de réponse professionnel".to_string(),
                None,
                Vec::new(),
                self.arrangement.clone(),
            ),
            Stage::Avatar => (
                "Choisissez votre avatar pour l'entretien".to_string(),
                None,
                option_views(&AVATARS),
                Vec::new(),
            ),
            Stage::PitchOrder => (
                "Construisez votre pitch de présentation".to_string(),
                None,
                Vec::new(),
                self.arrangement.clone(),
            ),
            Stage::Scenario(index) => (
                format!(
                    "Situation {}/{SCENARIO_COUNT} : {}",
                    index + 1,
                    SCENARIOS[index].question
                ),
                None,
                option_views(&SCENARIOS[index].options),
                Vec::new(),
            ),
        };

        Some(Prompt {
            level,
            stage,
            title: level.title(),
            objective: level.objective(),
            instruction,
            required,
            options,
            blocks,
        })
    }

    /// Snapshot for view layers.
    pub fn view(&self) -> SessionView {
        let state = self.store.state();
        SessionView {
            phase: self.phase,
            current_level: *state.current_level(),
            student: state.student_info().clone(),
            completed_levels: state.completed_levels().clone(),
            prompt: self.prompt(),
            scorecard: self.scorecard.clone(),
        }
    }

    fn enter(&mut self, stage: Stage) {
        self.arrangement = match stage {
            Stage::MailOrder => catalog::mail_blocks(),
            Stage::PitchOrder => catalog::pitch_blocks(self.store.state().student_info().as_ref()),
            _ => Vec::new(),
        };
        self.arrangement.shuffle(&mut self.rng);
        self.phase = Phase::Playing {
            stage,
            status: AttemptStatus::Answering,
        };
        debug!(%stage, "Entered stage");
    }

    fn arranged_ids(&self) -> Vec<String> {
        self.arrangement
            .iter()
            .map(|block| block.id.to_string())
            .collect()
    }

    fn illegal(&self, action: &'static str) -> ProgressionError {
        warn!(action, phase = %self.phase, "Illegal transition");
        ProgressionError::IllegalTransition {
            action,
            phase: self.phase,
        }
    }

    /// Keeps the transition when the postconditions hold, otherwise restores
    /// `checkpoint` so a refused transition leaves no trace.
    fn commit<T>(&mut self, checkpoint: Self, value: T) -> Result<T, ProgressionError> {
        match self.verify(checkpoint.store.state()) {
            Ok(()) => Ok(value),
            Err(err) => {
                warn!(error = %err, "Transition rolled back");
                *self = checkpoint;
                Err(err)
            }
        }
    }

    #[cfg(debug_assertions)]
    fn verify(&self, before: &GameState) -> Result<(), ProgressionError> {
        crate::invariants::check_transition(before, self.store.state()).map_err(|violations| {
            let descriptions = violations
                .iter()
                .map(|v| v.description.as_str())
                .collect::<Vec<_>>()
                .join("; ");
            ProgressionError::InvariantViolation(descriptions)
        })
    }

    #[cfg(not(debug_assertions))]
    fn verify(&self, _before: &GameState) -> Result<(), ProgressionError> {
        Ok(())
    }
}

fn into_set(ids: Vec<String>) -> BTreeSet<String> {
    ids.into_iter().collect()
}

fn option_views(options: &[catalog::ChoiceOption]) -> Vec<OptionView> {
    options
        .iter()
        .map(|option| OptionView {
            id: option.id,
            label: option.label,
        })
        .collect()
}

fn feedback_message(stage: Stage, verdict: Verdict) -> String {
    let message = match (stage, verdict) {
        (Stage::Qualities, Verdict::Correct) => {
            "Bravo ! Vous avez identifié les 4 qualités essentielles !"
        }
        (Stage::Qualities, Verdict::Incorrect) => "Ce n'est pas tout à fait correct. Réessayez !",
        (Stage::Domain, Verdict::Correct) => "Bonne réponse !",
        (Stage::Domain, Verdict::Incorrect) => "Ce n'est pas la bonne réponse",
        (Stage::CompanyValues, Verdict::Correct) => {
            "Excellent ! Vous connaissez bien TechTunis !"
        }
        (Stage::CompanyValues, Verdict::Incorrect) => "Ce n'est pas tout à fait correct",
        (Stage::MailOrder, Verdict::Correct) => {
            "Bravo ! Votre réponse est claire et professionnelle !"
        }
        (Stage::MailOrder, Verdict::Incorrect) => "L'ordre n'est pas correct. Réessayez !",
        (Stage::Avatar, Verdict::Correct) => {
            "Excellent choix ! Une tenue professionnelle est essentielle pour un entretien."
        }
        (Stage::Avatar, Verdict::Incorrect) => {
            "Cette tenue n'est pas appropriée pour un entretien professionnel."
        }
        (Stage::PitchOrder, Verdict::Correct) => {
            "Excellent ! Votre pitch est parfaitement structuré !"
        }
        (Stage::PitchOrder, Verdict::Incorrect) => "L'ordre n'est pas optimal. Réessayez !",
        (Stage::Scenario(_), Verdict::Correct) => "Bonne réponse !",
        (Stage::Scenario(index), Verdict::Incorrect) => {
            return format!(
                "La meilleure réponse était : \"{}\"",
                SCENARIOS[index].best_option().label
            );
        }
    };
    message.to_string()
}
