//! Pure level validators.
//!
//! Every validator first checks the shape of the submission (count,
//! duplicates, unknown ids) and only then compares it with the answer key,
//! so a malformed submission never reads as a wrong answer.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::catalog::{
    self, AVATARS, COMPANY_VALUES, ChoiceOption, DOMAINS, MAIL_BLOCKS, PITCH_BLOCK_IDS, QUALITIES,
    REQUIRED_SELECTIONS, SCENARIOS,
};

/// Outcome of comparing a well-formed submission with the answer key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    /// The submission matches the key.
    Correct,
    /// The submission is well formed but wrong.
    Incorrect,
}

impl Verdict {
    /// Returns true for [`Verdict::Correct`].
    pub fn is_correct(self) -> bool {
        matches!(self, Self::Correct)
    }
}

impl From<bool> for Verdict {
    fn from(correct: bool) -> Self {
        if correct { Self::Correct } else { Self::Incorrect }
    }
}

/// A submission that cannot be judged.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum SubmissionError {
    /// Too few or too many items.
    #[display("Veuillez sélectionner exactement {expected} éléments ({actual} sélectionnés)")]
    WrongCount {
        /// Required number of items.
        expected: usize,
        /// Number of items received.
        actual: usize,
    },
    /// No option was chosen.
    #[display("Veuillez sélectionner une réponse")]
    NothingSelected,
    /// The same id appears twice.
    #[display("'{_0}' est sélectionné plusieurs fois")]
    DuplicateEntry(String),
    /// The id is not one of the offered options.
    #[display("'{_0}' ne fait pas partie des choix proposés")]
    UnknownOption(String),
}

impl std::error::Error for SubmissionError {}

/// Checks an unordered selection of exactly `expected` ids against the options' key.
///
/// # Errors
///
/// Returns [`SubmissionError`] when the selection is not well formed.
#[instrument(skip(options))]
pub fn check_selection(
    submitted: &[String],
    options: &[ChoiceOption],
    expected: usize,
) -> Result<Verdict, SubmissionError> {
    let unique = distinct(submitted)?;
    if unique.len() != expected {
        return Err(SubmissionError::WrongCount {
            expected,
            actual: unique.len(),
        });
    }
    let offered: Vec<&str> = options.iter().map(|option| option.id).collect();
    ensure_known(submitted, &offered)?;

    let key: BTreeSet<&str> = catalog::correct_ids(options).into_iter().collect();
    let verdict = Verdict::from(unique == key);
    debug!(?verdict, "Selection judged");
    Ok(verdict)
}

/// Checks a single choice against the options' key.
///
/// # Errors
///
/// Returns [`SubmissionError::NothingSelected`] for a missing or blank choice and
/// [`SubmissionError::UnknownOption`] for an id that was never offered.
#[instrument(skip(options))]
pub fn check_choice(
    choice: Option<&str>,
    options: &[ChoiceOption],
) -> Result<Verdict, SubmissionError> {
    let choice = match choice.map(str::trim) {
        Some(choice) if !choice.is_empty() => choice,
        _ => return Err(SubmissionError::NothingSelected),
    };
    let option = options
        .iter()
        .find(|option| option.id == choice)
        .ok_or_else(|| SubmissionError::UnknownOption(choice.to_string()))?;

    let verdict = Verdict::from(option.correct);
    debug!(?verdict, "Choice judged");
    Ok(verdict)
}

/// Checks an ordering against the canonical sequence, position by position.
///
/// # Errors
///
/// Returns [`SubmissionError`] when the ordering is not a permutation of the canonical ids.
#[instrument(skip(canonical))]
pub fn check_order(submitted: &[String], canonical: &[&str]) -> Result<Verdict, SubmissionError> {
    distinct(submitted)?;
    if submitted.len() != canonical.len() {
        return Err(SubmissionError::WrongCount {
            expected: canonical.len(),
            actual: submitted.len(),
        });
    }
    ensure_known(submitted, canonical)?;

    let verdict = Verdict::from(
        submitted
            .iter()
            .zip(canonical)
            .all(|(given, expected)| given.as_str() == *expected),
    );
    debug!(?verdict, "Ordering judged");
    Ok(verdict)
}

/// Level 1: the four essential qualities.
pub fn validate_qualities(submitted: &[String]) -> Result<Verdict, SubmissionError> {
    check_selection(submitted, &QUALITIES, REQUIRED_SELECTIONS)
}

/// Level 2a: the company's field of activity.
pub fn validate_domain(choice: Option<&str>) -> Result<Verdict, SubmissionError> {
    check_choice(choice, &DOMAINS)
}

/// Level 2b: the company's four values.
pub fn validate_company_values(submitted: &[String]) -> Result<Verdict, SubmissionError> {
    check_selection(submitted, &COMPANY_VALUES, REQUIRED_SELECTIONS)
}

/// Level 3: the reply to the invitation email.
pub fn validate_mail_order(submitted: &[String]) -> Result<Verdict, SubmissionError> {
    let canonical: Vec<&str> = MAIL_BLOCKS.iter().map(|(id, _)| *id).collect();
    check_order(submitted, &canonical)
}

/// Level 4a: the interview outfit.
pub fn validate_avatar(choice: Option<&str>) -> Result<Verdict, SubmissionError> {
    check_choice(choice, &AVATARS)
}

/// Level 4b: the opening pitch.
pub fn validate_pitch_order(submitted: &[String]) -> Result<Verdict, SubmissionError> {
    check_order(submitted, &PITCH_BLOCK_IDS)
}

/// Level 5: the reaction to the scenario at `index`.
///
/// # Errors
///
/// An out-of-range index is reported as [`SubmissionError::UnknownOption`].
pub fn validate_scenario_answer(
    index: usize,
    choice: Option<&str>,
) -> Result<Verdict, SubmissionError> {
    let scenario = SCENARIOS
        .get(index)
        .ok_or_else(|| SubmissionError::UnknownOption(format!("scenario {index}")))?;
    check_choice(choice, &scenario.options)
}

fn distinct(submitted: &[String]) -> Result<BTreeSet<&str>, SubmissionError> {
    let mut seen = BTreeSet::new();
    for id in submitted {
        if !seen.insert(id.as_str()) {
            return Err(SubmissionError::DuplicateEntry(id.clone()));
        }
    }
    Ok(seen)
}

fn ensure_known(submitted: &[String], known: &[&str]) -> Result<(), SubmissionError> {
    match submitted.iter().find(|id| !known.contains(&id.as_str())) {
        Some(unknown) => Err(SubmissionError::UnknownOption(unknown.clone())),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| (*v).to_string()).collect()
    }

    fn permutations(items: &[&str]) -> Vec<Vec<String>> {
        if items.len() <= 1 {
            return vec![ids(items)];
        }
        let mut all = Vec::new();
        for (i, head) in items.iter().enumerate() {
            let mut rest = items.to_vec();
            rest.remove(i);
            for mut tail in permutations(&rest) {
                tail.insert(0, (*head).to_string());
                all.push(tail);
            }
        }
        all
    }

    #[test]
    fn qualities_key_is_order_independent() {
        let key = ["rigueur", "curiosite", "esprit-equipe", "autonomie"];
        for order in permutations(&key) {
            assert_eq!(validate_qualities(&order), Ok(Verdict::Correct), "{order:?}");
        }
    }

    #[test]
    fn distractor_quality_is_incorrect() {
        let submitted = ids(&["rigueur", "curiosite", "esprit-equipe", "ponctualite"]);
        assert_eq!(validate_qualities(&submitted), Ok(Verdict::Incorrect));
    }

    #[test]
    fn wrong_count_is_rejected_before_comparison() {
        assert_eq!(
            validate_qualities(&[]),
            Err(SubmissionError::WrongCount {
                expected: 4,
                actual: 0
            })
        );
        let five = ids(&["rigueur", "curiosite", "esprit-equipe", "autonomie", "humour"]);
        assert_eq!(
            validate_qualities(&five),
            Err(SubmissionError::WrongCount {
                expected: 4,
                actual: 5
            })
        );
    }

    #[test]
    fn duplicate_and_unknown_ids_are_rejected() {
        let duplicated = ids(&["rigueur", "rigueur", "curiosite", "autonomie"]);
        assert_eq!(
            validate_qualities(&duplicated),
            Err(SubmissionError::DuplicateEntry("rigueur".to_string()))
        );
        let unknown = ids(&["rigueur", "curiosite", "autonomie", "charisme"]);
        assert_eq!(
            validate_qualities(&unknown),
            Err(SubmissionError::UnknownOption("charisme".to_string()))
        );
    }

    #[test]
    fn company_values_key_is_order_independent() {
        let key = ["proximite", "rigueur", "collaboration", "innovation"];
        for order in permutations(&key) {
            assert_eq!(validate_company_values(&order), Ok(Verdict::Correct));
        }
        let wrong = ids(&["innovation", "collaboration", "rigueur", "rapidite"]);
        assert_eq!(validate_company_values(&wrong), Ok(Verdict::Incorrect));
    }

    #[test]
    fn domain_choice() {
        assert_eq!(validate_domain(Some("A")), Ok(Verdict::Incorrect));
        assert_eq!(validate_domain(Some("C")), Ok(Verdict::Correct));
        assert_eq!(validate_domain(None), Err(SubmissionError::NothingSelected));
        assert_eq!(validate_domain(Some(" ")), Err(SubmissionError::NothingSelected));
        assert_eq!(
            validate_domain(Some("Z")),
            Err(SubmissionError::UnknownOption("Z".to_string()))
        );
    }

    #[test]
    fn canonical_mail_order_is_correct() {
        let canonical = ids(&["salutation", "remerciement", "disponibilite", "signature"]);
        assert_eq!(validate_mail_order(&canonical), Ok(Verdict::Correct));
    }

    #[test]
    fn any_adjacent_swap_breaks_the_order() {
        let canonical = ["salutation", "remerciement", "disponibilite", "signature"];
        for i in 0..canonical.len() - 1 {
            let mut swapped = ids(&canonical);
            swapped.swap(i, i + 1);
            assert_eq!(validate_mail_order(&swapped), Ok(Verdict::Incorrect), "{swapped:?}");
        }

        for i in 0..PITCH_BLOCK_IDS.len() - 1 {
            let mut swapped = ids(&PITCH_BLOCK_IDS);
            swapped.swap(i, i + 1);
            assert_eq!(validate_pitch_order(&swapped), Ok(Verdict::Incorrect));
        }
    }

    #[test]
    fn only_canonical_permutation_passes() {
        let correct = permutations(&PITCH_BLOCK_IDS)
            .into_iter()
            .filter(|order| validate_pitch_order(order) == Ok(Verdict::Correct))
            .count();
        assert_eq!(correct, 1);
    }

    #[test]
    fn partial_orderings_are_rejected() {
        let partial = ids(&["salutation", "signature"]);
        assert_eq!(
            validate_mail_order(&partial),
            Err(SubmissionError::WrongCount {
                expected: 4,
                actual: 2
            })
        );
    }

    #[test]
    fn avatar_and_scenarios() {
        assert_eq!(validate_avatar(Some("professionnel")), Ok(Verdict::Correct));
        assert_eq!(validate_avatar(Some("sportif")), Ok(Verdict::Incorrect));
        assert_eq!(validate_scenario_answer(0, Some("b")), Ok(Verdict::Correct));
        assert_eq!(validate_scenario_answer(2, Some("b")), Ok(Verdict::Incorrect));
        assert!(validate_scenario_answer(3, Some("a")).is_err());
    }
}
