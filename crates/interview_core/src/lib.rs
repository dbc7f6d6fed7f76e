//! Game logic for the interview escape game.
//!
//! Five levels train students for an internship interview: self-assessment,
//! company research, replying to the invitation, the opening pitch and
//! reacting to common situations. This crate holds the answer keys, the
//! pure validators, the session aggregate with its reducer, and the
//! [`Progression`] state machine that ties them together. It performs no
//! I/O; persistence and notification live in the server crate.
//!
//! ```
//! use interview_core::{Navigation, Progression, StudentInfo, Submission};
//!
//! let mut game = Progression::with_seed(42);
//! game.identify(StudentInfo::new(
//!     "Ben Ali", "Sami", "3ème Année", "3ème Année", "Informatique", "prof@iset.tn",
//! ))?;
//! game.start()?;
//!
//! let feedback = game.submit(Submission::Selection(
//!     ["rigueur", "curiosite", "esprit-equipe", "autonomie"]
//!         .map(String::from)
//!         .to_vec(),
//! ))?;
//! assert!(feedback.verdict().is_correct());
//! assert!(matches!(game.advance()?, Navigation::Level(_)));
//! # Ok::<(), interview_core::ProgressionError>(())
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod catalog;
mod invariants;
mod level;
mod progression;
mod score;
mod state;
mod student;
pub mod validate;

pub use invariants::{
    IdentifiedBeforeStartInvariant, Invariant, InvariantSet, InvariantViolation,
    LevelInRangeInvariant, SessionInvariants, UniqueCompletionInvariant, check_transition,
};
pub use level::LevelId;
pub use progression::{
    AttemptStatus, Feedback, Navigation, OptionView, Phase, Progression, ProgressionError,
    Prompt, SCENARIO_COUNT, SessionView, Stage, Submission,
};
pub use score::{LevelResult, ScoreTier, Scorecard, score_percent};
pub use state::{GameEvent, GameState, GameStore, reduce};
pub use student::{IdentificationError, SPECIALTIES, StudentInfo};
pub use validate::{SubmissionError, Verdict};
