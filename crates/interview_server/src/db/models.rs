//! Database models for stored session results.

use chrono::NaiveDateTime;
use derive_getters::Getters;
use derive_new::new;
use diesel::prelude::*;
use interview_core::{LevelId, Scorecard, StudentInfo};
use serde::Serialize;
use tracing::instrument;

use crate::db::schema;

/// A finished session as stored in the database.
#[derive(Debug, Clone, Queryable, Identifiable, Selectable, Getters, Serialize)]
#[diesel(table_name = schema::student_results)]
#[serde(rename_all = "camelCase")]
pub struct StudentResult {
    id: i32,
    last_name: String,
    first_name: String,
    student_group: String,
    grade: String,
    specialty: String,
    professor_email: String,
    score: i32,
    total_questions: i32,
    duration_seconds: Option<i32>,
    start_time: Option<NaiveDateTime>,
    end_time: Option<NaiveDateTime>,
    level1_score: i32,
    level2_score: i32,
    level3_score: i32,
    level4_score: i32,
    level5_score: i32,
    session_id: String,
    run: i64,
    created_at: NaiveDateTime,
}

impl StudentResult {
    /// Per-level scores in level order.
    pub fn level_scores(&self) -> [i32; LevelId::COUNT] {
        [
            self.level1_score,
            self.level2_score,
            self.level3_score,
            self.level4_score,
            self.level5_score,
        ]
    }
}

/// Insertable row for a finished session.
#[derive(Debug, Clone, Insertable, new, Getters)]
#[diesel(table_name = schema::student_results)]
pub struct NewStudentResult {
    last_name: String,
    first_name: String,
    student_group: String,
    grade: String,
    specialty: String,
    professor_email: String,
    score: i32,
    total_questions: i32,
    duration_seconds: Option<i32>,
    start_time: Option<NaiveDateTime>,
    end_time: Option<NaiveDateTime>,
    level1_score: i32,
    level2_score: i32,
    level3_score: i32,
    level4_score: i32,
    level5_score: i32,
    session_id: String,
    run: i64,
}

impl NewStudentResult {
    /// Builds the row for one run of `session_id` from the student and their
    /// scorecard. Each restart of a session starts a new run.
    #[instrument(skip(student, scorecard), fields(score = scorecard.score()))]
    pub fn from_scorecard(
        session_id: &str,
        run: u64,
        student: &StudentInfo,
        scorecard: &Scorecard,
    ) -> Self {
        let points = |level: LevelId| {
            scorecard
                .level_results()
                .iter()
                .find(|result| *result.level() == level)
                .map_or(0, |result| i32::from(result.points()))
        };
        let duration = scorecard
            .start_time()
            .map(|_| i32::try_from(*scorecard.duration_seconds()).unwrap_or(i32::MAX));

        Self {
            last_name: student.last_name().clone(),
            first_name: student.first_name().clone(),
            student_group: student.group().clone(),
            grade: student.grade().clone(),
            specialty: student.specialty().clone(),
            professor_email: student.professor_email().clone(),
            score: i32::from(*scorecard.score()),
            total_questions: LevelId::COUNT as i32,
            duration_seconds: duration,
            start_time: scorecard.start_time().map(|t| t.naive_utc()),
            end_time: scorecard.end_time().map(|t| t.naive_utc()),
            level1_score: points(LevelId::SelfAssessment),
            level2_score: points(LevelId::Investigation),
            level3_score: points(LevelId::Invitation),
            level4_score: points(LevelId::Interview),
            level5_score: points(LevelId::Reaction),
            session_id: session_id.to_string(),
            run: i64::try_from(run).unwrap_or(i64::MAX),
        }
    }
}

/// Dashboard listing: every stored result, newest first, and the average score.
#[derive(Debug, Clone, Serialize, Getters)]
#[serde(rename_all = "camelCase")]
pub struct ResultSummary {
    results: Vec<StudentResult>,
    average_score: Option<i32>,
}

impl ResultSummary {
    /// Computes the rounded average over `results`.
    pub fn new(results: Vec<StudentResult>) -> Self {
        let average_score = if results.is_empty() {
            None
        } else {
            let total: i64 = results.iter().map(|r| i64::from(r.score)).sum();
            Some((total as f64 / results.len() as f64).round() as i32)
        };
        Self {
            results,
            average_score,
        }
    }
}
