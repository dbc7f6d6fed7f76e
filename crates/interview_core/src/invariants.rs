//! First-class invariants of the session aggregate.
//!
//! Invariants are logical properties that must hold after every
//! controller transition. They are checked in debug builds and can be
//! tested independently.

use std::collections::BTreeSet;

use tracing::{instrument, warn};

use crate::{GameState, LevelId};

/// A logical property that must hold for a given state.
pub trait Invariant<S> {
    /// Checks if the invariant holds for the given state.
    fn holds(state: &S) -> bool;

    /// Human-readable description of the invariant.
    fn description() -> &'static str;
}

/// Violation of an invariant.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
#[display("{description}")]
pub struct InvariantViolation {
    /// Description of the violated invariant.
    pub description: String,
}

impl InvariantViolation {
    /// Creates a new invariant violation.
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
        }
    }
}

/// A set of invariants that can be checked together.
///
/// Implementations are provided for tuples.
pub trait InvariantSet<S> {
    /// Checks all invariants in the set, collecting every violation.
    fn check_all(state: &S) -> Result<(), Vec<InvariantViolation>>;
}

impl<S, I1, I2> InvariantSet<S> for (I1, I2)
where
    I1: Invariant<S>,
    I2: Invariant<S>,
{
    fn check_all(state: &S) -> Result<(), Vec<InvariantViolation>> {
        let violations: Vec<_> = [
            (I1::holds(state), I1::description()),
            (I2::holds(state), I2::description()),
        ]
        .into_iter()
        .filter(|(holds, _)| !holds)
        .map(|(_, description)| InvariantViolation::new(description))
        .collect();

        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations)
        }
    }
}

impl<S, I1, I2, I3> InvariantSet<S> for (I1, I2, I3)
where
    I1: Invariant<S>,
    I2: Invariant<S>,
    I3: Invariant<S>,
{
    fn check_all(state: &S) -> Result<(), Vec<InvariantViolation>> {
        let violations: Vec<_> = [
            (I1::holds(state), I1::description()),
            (I2::holds(state), I2::description()),
            (I3::holds(state), I3::description()),
        ]
        .into_iter()
        .filter(|(holds, _)| !holds)
        .map(|(_, description)| InvariantViolation::new(description))
        .collect();

        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations)
        }
    }
}

/// Invariant: a level appears at most once in `completedLevels`.
pub struct UniqueCompletionInvariant;

impl Invariant<GameState> for UniqueCompletionInvariant {
    #[instrument(skip(state))]
    fn holds(state: &GameState) -> bool {
        let unique: BTreeSet<LevelId> = state.completed_levels().iter().copied().collect();
        let valid = unique.len() == state.completed_levels().len();
        if !valid {
            warn!(completed = ?state.completed_levels(), "Level completed twice");
        }
        valid
    }

    fn description() -> &'static str {
        "Each level is completed at most once"
    }
}

/// Invariant: the student is identified before the clock starts.
pub struct IdentifiedBeforeStartInvariant;

impl Invariant<GameState> for IdentifiedBeforeStartInvariant {
    #[instrument(skip(state))]
    fn holds(state: &GameState) -> bool {
        let valid = state.start_time().is_none() || state.student_info().is_some();
        if !valid {
            warn!("Game started without identification");
        }
        valid
    }

    fn description() -> &'static str {
        "Student information is set before the start time"
    }
}

/// Invariant: `currentLevel` stays within 0..=6.
pub struct LevelInRangeInvariant;

impl Invariant<GameState> for LevelInRangeInvariant {
    fn holds(state: &GameState) -> bool {
        *state.current_level() <= LevelId::FINISHED
    }

    fn description() -> &'static str {
        "Current level is between 0 and 6"
    }
}

/// All aggregate invariants as a composable set.
pub type SessionInvariants = (
    UniqueCompletionInvariant,
    IdentifiedBeforeStartInvariant,
    LevelInRangeInvariant,
);

/// Postcondition of a controller transition.
///
/// Besides the state invariants, `currentLevel` must not decrease unless
/// the transition reset the aggregate.
#[instrument(skip(before, after))]
pub fn check_transition(before: &GameState, after: &GameState) -> Result<(), Vec<InvariantViolation>> {
    let mut violations = match SessionInvariants::check_all(after) {
        Ok(()) => Vec::new(),
        Err(violations) => violations,
    };

    let reset = after == &GameState::default();
    if !reset && after.current_level() < before.current_level() {
        warn!(
            before = before.current_level(),
            after = after.current_level(),
            "Current level decreased"
        );
        violations.push(InvariantViolation::new(
            "Current level never decreases outside a reset",
        ));
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(violations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{GameEvent, GameStore, StudentInfo, reduce};
    use chrono::Utc;

    fn identified() -> GameStore {
        let mut store = GameStore::new();
        store.set_student_info(StudentInfo::new(
            "Mansour",
            "Ines",
            "G3",
            "3ème Année",
            "Informatique",
            "prof@iset.tn",
        ));
        store
    }

    #[test]
    fn invariants_hold_for_empty_state() {
        assert!(SessionInvariants::check_all(&GameState::default()).is_ok());
    }

    #[test]
    fn invariants_hold_through_a_normal_flow() {
        let mut store = identified();
        store.start_game();
        store.complete_level(LevelId::SelfAssessment);
        store.complete_level(LevelId::Investigation);
        assert!(SessionInvariants::check_all(store.state()).is_ok());
    }

    #[test]
    fn start_without_identification_is_detected() {
        let state = reduce(&GameState::default(), GameEvent::StartGame, Utc::now());
        let violations = SessionInvariants::check_all(&state).unwrap_err();
        assert_eq!(violations.len(), 1);
        assert_eq!(
            violations[0].description,
            IdentifiedBeforeStartInvariant::description()
        );
    }

    #[test]
    fn out_of_range_level_is_detected() {
        let state = reduce(&GameState::default(), GameEvent::GoToLevel(9), Utc::now());
        type RangeOnly = (LevelInRangeInvariant, UniqueCompletionInvariant);
        assert!(RangeOnly::check_all(&state).is_err());
    }

    #[test]
    fn backwards_jump_breaks_the_transition_contract() {
        let mut store = identified();
        store.start_game();
        store.complete_level(LevelId::SelfAssessment);
        let before = store.state().clone();
        store.go_to_level(1);
        assert!(check_transition(&before, store.state()).is_err());
    }

    #[test]
    fn reset_is_an_allowed_decrease() {
        let mut store = identified();
        store.start_game();
        store.complete_level(LevelId::SelfAssessment);
        let before = store.state().clone();
        store.reset_game();
        assert!(check_transition(&before, store.state()).is_ok());
    }
}
