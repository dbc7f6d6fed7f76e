//! Session aggregate and the reducer that evolves it.
//!
//! The aggregate is never mutated in place by callers. Each
//! [`GameEvent`] produces a new [`GameState`] through [`reduce`], and the
//! [`GameStore`] swaps the whole value, so readers never observe a
//! half-applied update.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::{LevelId, StudentInfo};

/// Everything known about one player's session.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, Getters)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    /// 0 before the start, 1..=5 while playing, 6 once finished.
    current_level: u8,
    student_info: Option<StudentInfo>,
    level1_choices: BTreeSet<String>,
    level2_domain: Option<String>,
    level2_values: BTreeSet<String>,
    level3_order: Vec<String>,
    level4_avatar: Option<String>,
    level4_pitch_order: Vec<String>,
    level5_answers: BTreeMap<String, String>,
    /// Completed levels in completion order, without repeats.
    completed_levels: Vec<LevelId>,
    start_time: Option<DateTime<Utc>>,
    end_time: Option<DateTime<Utc>>,
}

impl GameState {
    /// Returns true once `level` has been completed.
    pub fn is_completed(&self, level: LevelId) -> bool {
        self.completed_levels.contains(&level)
    }

    /// Returns true once every level is behind the player.
    pub fn is_finished(&self) -> bool {
        self.current_level >= LevelId::FINISHED
    }
}

/// A single mutation of the aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    /// Records the identification form.
    SetStudentInfo(StudentInfo),
    /// Records the level-1 selection.
    SetLevel1Choices(BTreeSet<String>),
    /// Records the level-2 domain choice.
    SetLevel2Domain(String),
    /// Records the level-2 values selection.
    SetLevel2Values(BTreeSet<String>),
    /// Records the level-3 block order.
    SetLevel3Order(Vec<String>),
    /// Records the level-4 avatar choice.
    SetLevel4Avatar(String),
    /// Records the level-4 pitch order.
    SetLevel4PitchOrder(Vec<String>),
    /// Records the answer to one level-5 question.
    SetLevel5Answer {
        /// Question id.
        question: String,
        /// Chosen option id.
        option: String,
    },
    /// Enters level 1 and stamps the start time.
    StartGame,
    /// Marks a level complete and moves past it.
    CompleteLevel(LevelId),
    /// Jumps to an arbitrary `currentLevel` value.
    GoToLevel(u8),
    /// Stamps the end time (first call only).
    Finish,
    /// Discards the whole aggregate.
    ResetGame,
}

/// Applies `event` to `state`, returning the next aggregate.
pub fn reduce(state: &GameState, event: GameEvent, now: DateTime<Utc>) -> GameState {
    let mut next = state.clone();
    match event {
        GameEvent::SetStudentInfo(info) => next.student_info = Some(info),
        GameEvent::SetLevel1Choices(choices) => next.level1_choices = choices,
        GameEvent::SetLevel2Domain(domain) => next.level2_domain = Some(domain),
        GameEvent::SetLevel2Values(values) => next.level2_values = values,
        GameEvent::SetLevel3Order(order) => next.level3_order = order,
        GameEvent::SetLevel4Avatar(avatar) => next.level4_avatar = Some(avatar),
        GameEvent::SetLevel4PitchOrder(order) => next.level4_pitch_order = order,
        GameEvent::SetLevel5Answer { question, option } => {
            next.level5_answers.insert(question, option);
        }
        GameEvent::StartGame => {
            next.current_level = 1;
            next.start_time = Some(now);
        }
        GameEvent::CompleteLevel(level) => {
            if !next.completed_levels.contains(&level) {
                next.completed_levels.push(level);
            }
            next.current_level = level.number() + 1;
        }
        GameEvent::GoToLevel(level) => next.current_level = level,
        GameEvent::Finish => {
            if next.end_time.is_none() {
                next.end_time = Some(now);
            }
        }
        GameEvent::ResetGame => next = GameState::default(),
    }
    next
}

/// Owner of a session's aggregate.
///
/// Every mutator is a thin wrapper that dispatches one [`GameEvent`].
#[derive(Debug, Clone, Default)]
pub struct GameStore {
    state: GameState,
}

impl GameStore {
    /// Creates a store holding the empty aggregate.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the latest aggregate.
    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Applies an event using the current wall-clock time.
    pub fn dispatch(&mut self, event: GameEvent) -> &GameState {
        self.dispatch_at(event, Utc::now())
    }

    /// Applies an event at an explicit instant.
    #[instrument(skip(self))]
    pub fn dispatch_at(&mut self, event: GameEvent, now: DateTime<Utc>) -> &GameState {
        debug!(current_level = self.state.current_level, "Dispatching game event");
        self.state = reduce(&self.state, event, now);
        &self.state
    }

    /// Replaces the student information.
    pub fn set_student_info(&mut self, info: StudentInfo) {
        self.dispatch(GameEvent::SetStudentInfo(info));
    }

    /// Replaces the level-1 selection.
    pub fn set_level1_choices(&mut self, choices: BTreeSet<String>) {
        self.dispatch(GameEvent::SetLevel1Choices(choices));
    }

    /// Replaces the level-2 domain.
    pub fn set_level2_domain(&mut self, domain: String) {
        self.dispatch(GameEvent::SetLevel2Domain(domain));
    }

    /// Replaces the level-2 values.
    pub fn set_level2_values(&mut self, values: BTreeSet<String>) {
        self.dispatch(GameEvent::SetLevel2Values(values));
    }

    /// Replaces the level-3 order.
    pub fn set_level3_order(&mut self, order: Vec<String>) {
        self.dispatch(GameEvent::SetLevel3Order(order));
    }

    /// Replaces the level-4 avatar.
    pub fn set_level4_avatar(&mut self, avatar: String) {
        self.dispatch(GameEvent::SetLevel4Avatar(avatar));
    }

    /// Replaces the level-4 pitch order.
    pub fn set_level4_pitch_order(&mut self, order: Vec<String>) {
        self.dispatch(GameEvent::SetLevel4PitchOrder(order));
    }

    /// Records one level-5 answer.
    pub fn set_level5_answer(&mut self, question: String, option: String) {
        self.dispatch(GameEvent::SetLevel5Answer { question, option });
    }

    /// Enters level 1. Calling it again restarts the clock.
    pub fn start_game(&mut self) {
        info!("Game started");
        self.dispatch(GameEvent::StartGame);
    }

    /// Marks `level` complete and moves to the next one.
    pub fn complete_level(&mut self, level: LevelId) {
        info!(level = level.number(), "Level completed");
        self.dispatch(GameEvent::CompleteLevel(level));
    }

    /// Jumps to `level` without any reachability check.
    pub fn go_to_level(&mut self, level: u8) {
        self.dispatch(GameEvent::GoToLevel(level));
    }

    /// Stamps the end of the session.
    pub fn finish(&mut self) {
        self.dispatch(GameEvent::Finish);
    }

    /// Discards everything.
    pub fn reset_game(&mut self) {
        info!("Game reset");
        self.dispatch(GameEvent::ResetGame);
    }
}
