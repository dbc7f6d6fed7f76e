//! Final score and per-level breakdown of a finished session.

use chrono::{DateTime, Utc};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

use crate::{GameState, LevelId};

/// Score as a rounded percentage of completed levels.
pub fn score_percent(completed: usize) -> u8 {
    let ratio = completed.min(LevelId::COUNT) as f64 / LevelId::COUNT as f64;
    (ratio * 100.0).round() as u8
}

/// Congratulation band of a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, derive_more::Display)]
#[serde(rename_all = "camelCase")]
pub enum ScoreTier {
    /// Every level completed.
    #[display("Félicitations !")]
    Perfect,
    /// 80 or more.
    #[display("Excellent travail !")]
    Excellent,
    /// 60 or more.
    #[display("Bon travail !")]
    Good,
    /// Anything lower.
    #[display("Courage !")]
    KeepGoing,
}

impl ScoreTier {
    /// Picks the band for `score`.
    pub fn for_score(score: u8) -> Self {
        match score {
            100.. => Self::Perfect,
            80.. => Self::Excellent,
            60.. => Self::Good,
            _ => Self::KeepGoing,
        }
    }

    /// Encouragement shown under the tier title.
    pub fn message(self) -> &'static str {
        match self {
            Self::Perfect => "Vous êtes prêt(e) pour votre entretien !",
            Self::Excellent => "Vous avez très bien compris les bases.",
            Self::Good => "Continuez à vous entraîner.",
            Self::KeepGoing => "La pratique mène à la perfection.",
        }
    }
}

/// Outcome of one level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
#[serde(rename_all = "camelCase")]
pub struct LevelResult {
    level: LevelId,
    title: String,
    completed: bool,
}

impl LevelResult {
    /// Stored per-level score: 100 when completed, 0 otherwise.
    pub fn points(&self) -> u8 {
        if self.completed { 100 } else { 0 }
    }
}

/// Everything the result screen, the database and the notification need.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
#[serde(rename_all = "camelCase")]
pub struct Scorecard {
    score: u8,
    completed_levels: usize,
    level_results: Vec<LevelResult>,
    duration_seconds: i64,
    elapsed_minutes: i64,
    start_time: Option<DateTime<Utc>>,
    end_time: Option<DateTime<Utc>>,
    scenario_hits: usize,
    tier: ScoreTier,
}

impl Scorecard {
    /// Computes the scorecard of `state`.
    ///
    /// `scenario_hits` counts the level-5 scenarios answered correctly; it
    /// is informational and does not affect the score.
    pub fn from_state(state: &GameState, scenario_hits: usize) -> Self {
        let completed = state.completed_levels().len();
        let score = score_percent(completed);
        let level_results = LevelId::iter()
            .map(|level| LevelResult {
                level,
                title: level.result_title().to_string(),
                completed: state.is_completed(level),
            })
            .collect();

        let duration_seconds = match (state.start_time(), state.end_time()) {
            (Some(start), Some(end)) => (*end - *start).num_seconds().max(0),
            _ => 0,
        };
        let elapsed_minutes = (duration_seconds as f64 / 60.0).round() as i64;

        Self {
            score,
            completed_levels: completed,
            level_results,
            duration_seconds,
            elapsed_minutes,
            start_time: *state.start_time(),
            end_time: *state.end_time(),
            scenario_hits,
            tier: ScoreTier::for_score(score),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{GameEvent, reduce};
    use chrono::TimeZone;

    fn finished_with(levels: &[LevelId], seconds: i64) -> GameState {
        let start = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let mut state = reduce(&GameState::default(), GameEvent::StartGame, start);
        for level in levels {
            state = reduce(&state, GameEvent::CompleteLevel(*level), start);
        }
        reduce(
            &state,
            GameEvent::Finish,
            start + chrono::Duration::seconds(seconds),
        )
    }

    #[test]
    fn score_is_rounded_share_of_levels() {
        assert_eq!(score_percent(0), 0);
        assert_eq!(score_percent(2), 40);
        assert_eq!(score_percent(5), 100);
    }

    #[test]
    fn all_levels_give_full_score() {
        let all: Vec<_> = LevelId::iter().collect();
        let card = Scorecard::from_state(&finished_with(&all, 600), 3);
        assert_eq!(*card.score(), 100);
        assert_eq!(*card.tier(), ScoreTier::Perfect);
        assert!(card.level_results().iter().all(|r| r.points() == 100));
    }

    #[test]
    fn partial_completion() {
        let card = Scorecard::from_state(
            &finished_with(&[LevelId::SelfAssessment, LevelId::Invitation], 150),
            0,
        );
        assert_eq!(*card.score(), 40);
        assert_eq!(*card.completed_levels(), 2);
        assert_eq!(*card.duration_seconds(), 150);
        assert_eq!(*card.elapsed_minutes(), 3);
        assert_eq!(*card.tier(), ScoreTier::KeepGoing);

        let completed: Vec<bool> = card.level_results().iter().map(|r| *r.completed()).collect();
        assert_eq!(completed, vec![true, false, true, false, false]);
        assert_eq!(card.level_results()[1].title(), "Rechercher l'entreprise");
    }

    #[test]
    fn empty_session_scores_zero() {
        let card = Scorecard::from_state(&GameState::default(), 0);
        assert_eq!(*card.score(), 0);
        assert_eq!(*card.duration_seconds(), 0);
    }

    #[test]
    fn tiers() {
        assert_eq!(ScoreTier::for_score(80), ScoreTier::Excellent);
        assert_eq!(ScoreTier::for_score(60), ScoreTier::Good);
        assert_eq!(ScoreTier::for_score(59), ScoreTier::KeepGoing);
        assert_eq!(ScoreTier::Good.to_string(), "Bon travail !");
    }
}
