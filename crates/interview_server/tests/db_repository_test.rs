//! Tests for the result repository.

use chrono::{TimeZone, Utc};
use interview_core::{GameEvent, GameState, LevelId, Scorecard, StudentInfo, reduce};
use interview_server::db::{NewStudentResult, ResultRepository};
use tempfile::NamedTempFile;

/// Creates a temporary database file with schema applied, returns the file
/// handle (must stay in scope to keep the file alive) and a ready repository.
fn setup_test_db() -> (NamedTempFile, ResultRepository) {
    let db_file = NamedTempFile::new().expect("Failed to create temp file");
    let db_path = db_file.path().to_str().expect("Invalid path").to_string();
    let repo = ResultRepository::new(db_path).expect("Failed to create repository");
    repo.migrate().expect("Migrations failed");
    (db_file, repo)
}

fn student(last_name: &str) -> StudentInfo {
    StudentInfo::new(
        last_name,
        "Amine",
        "G1",
        "3ème Année",
        "Informatique",
        "prof@iset.tn",
    )
}

fn scorecard(levels: &[LevelId], seconds: i64) -> Scorecard {
    let start = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
    let mut state = reduce(&GameState::default(), GameEvent::StartGame, start);
    for level in levels {
        state = reduce(&state, GameEvent::CompleteLevel(*level), start);
    }
    state = reduce(
        &state,
        GameEvent::Finish,
        start + chrono::Duration::seconds(seconds),
    );
    Scorecard::from_state(&state, 0)
}

fn record(session_id: &str, last_name: &str, levels: &[LevelId]) -> NewStudentResult {
    record_run(session_id, 0, last_name, levels)
}

fn record_run(session_id: &str, run: u64, last_name: &str, levels: &[LevelId]) -> NewStudentResult {
    NewStudentResult::from_scorecard(session_id, run, &student(last_name), &scorecard(levels, 420))
}

#[test]
fn test_blank_path_is_rejected() {
    assert!(ResultRepository::new("  ".to_string()).is_err());
}

#[test]
fn test_record_result_maps_scorecard() {
    let (_db, repo) = setup_test_db();
    let stored = repo
        .record_result(record(
            "session-1",
            "Mansour",
            &[LevelId::SelfAssessment, LevelId::Invitation, LevelId::Reaction],
        ))
        .expect("Insert failed");

    assert!(*stored.id() > 0);
    assert_eq!(stored.last_name(), "Mansour");
    assert_eq!(stored.student_group(), "G1");
    assert_eq!(*stored.score(), 60);
    assert_eq!(*stored.total_questions(), 5);
    assert_eq!(*stored.duration_seconds(), Some(420));
    assert_eq!(stored.level_scores(), [100, 0, 100, 0, 100]);
    assert!(stored.start_time().is_some());
    assert!(stored.end_time().is_some());
}

#[test]
fn test_same_run_is_stored_once() {
    let (_db, repo) = setup_test_db();
    repo.record_result(record("session-1", "Mansour", &[LevelId::SelfAssessment]))
        .expect("First insert failed");

    let err = repo
        .record_result(record("session-1", "Mansour", &[LevelId::SelfAssessment]))
        .unwrap_err();
    assert!(err.is_duplicate(), "unexpected error: {}", err);
    assert_eq!(repo.list_results().unwrap().len(), 1);
}

#[test]
fn test_each_run_of_a_session_is_stored() {
    let (_db, repo) = setup_test_db();
    repo.record_result(record_run("session-1", 0, "Mansour", &[LevelId::SelfAssessment]))
        .expect("First run failed");
    let second = repo
        .record_result(record_run(
            "session-1",
            1,
            "Mansour",
            &[LevelId::SelfAssessment, LevelId::Investigation],
        ))
        .expect("Second run failed");
    assert_eq!(*second.run(), 1);
    assert_eq!(*second.score(), 40);

    let err = repo
        .record_result(record_run("session-1", 1, "Mansour", &[]))
        .unwrap_err();
    assert!(err.is_duplicate(), "unexpected error: {}", err);
    assert_eq!(repo.list_results().unwrap().len(), 2);
}

#[test]
fn test_find_run() {
    let (_db, repo) = setup_test_db();
    repo.record_result(record("session-7", "Gharbi", &[]))
        .expect("Insert failed");
    repo.record_result(record_run("session-7", 1, "Gharbi", &[LevelId::SelfAssessment]))
        .expect("Insert failed");

    let found = repo.find_run("session-7", 1).expect("Query failed");
    assert_eq!(*found.unwrap().score(), 20);
    assert_eq!(*repo.find_run("session-7", 0).unwrap().unwrap().score(), 0);
    assert!(repo.find_run("session-7", 2).unwrap().is_none());
    assert!(repo.find_run("missing", 0).unwrap().is_none());
}

#[test]
fn test_results_are_listed_newest_first() {
    let (_db, repo) = setup_test_db();
    for (i, name) in ["Premier", "Second", "Troisieme"].iter().enumerate() {
        repo.record_result(record(&format!("session-{}", i), name, &[]))
            .expect("Insert failed");
    }

    let names: Vec<String> = repo
        .list_results()
        .unwrap()
        .iter()
        .map(|r| r.last_name().clone())
        .collect();
    assert_eq!(names, ["Troisieme", "Second", "Premier"]);
}

#[test]
fn test_summary_average_is_rounded() {
    let (_db, repo) = setup_test_db();
    assert_eq!(*repo.summary().unwrap().average_score(), None);

    repo.record_result(record("a", "A", &[LevelId::SelfAssessment]))
        .unwrap();
    repo.record_result(record(
        "b",
        "B",
        &[LevelId::SelfAssessment, LevelId::Investigation],
    ))
    .unwrap();
    repo.record_result(record(
        "c",
        "C",
        &[LevelId::SelfAssessment, LevelId::Investigation],
    ))
    .unwrap();

    // (20 + 40 + 40) / 3 = 33.3
    let summary = repo.summary().unwrap();
    assert_eq!(summary.results().len(), 3);
    assert_eq!(*summary.average_score(), Some(33));
}
