//! End-to-end tests for the progression state machine.

use interview_core::{
    AttemptStatus, InvariantSet, LevelId, Navigation, Phase, Progression, ProgressionError,
    ScoreTier, SessionInvariants, Stage, StudentInfo, Submission, Verdict,
};

fn student() -> StudentInfo {
    StudentInfo::new(
        "Haddad",
        "Rim",
        "3ème Année",
        "3ème Année",
        "Electrique",
        "isetentretien499@gmail.com",
    )
}

fn selection(values: &[&str]) -> Submission {
    Submission::Selection(values.iter().map(|v| (*v).to_string()).collect())
}

fn order(values: &[&str]) -> Submission {
    Submission::Order(values.iter().map(|v| (*v).to_string()).collect())
}

fn choice(value: &str) -> Submission {
    Submission::Choice(Some(value.to_string()))
}

fn solve(game: &mut Progression, submission: Submission) -> Navigation {
    let feedback = game.submit(submission).unwrap();
    assert_eq!(*feedback.verdict(), Verdict::Correct, "{}", feedback.message());
    game.advance().unwrap()
}

#[test]
fn test_perfect_playthrough() {
    let mut game = Progression::with_seed(2024);
    game.identify(student()).unwrap();
    assert_eq!(game.start().unwrap(), Navigation::Level(LevelId::SelfAssessment));

    let nav = solve(
        &mut game,
        selection(&["rigueur", "curiosite", "esprit-equipe", "autonomie"]),
    );
    assert_eq!(nav, Navigation::Level(LevelId::Investigation));

    assert_eq!(
        solve(&mut game, choice("C")),
        Navigation::Stage(Stage::CompanyValues)
    );
    assert_eq!(
        solve(
            &mut game,
            selection(&["innovation", "collaboration", "rigueur", "proximite"])
        ),
        Navigation::Level(LevelId::Invitation)
    );
    assert_eq!(
        solve(
            &mut game,
            order(&["salutation", "remerciement", "disponibilite", "signature"])
        ),
        Navigation::Level(LevelId::Interview)
    );
    assert_eq!(
        solve(&mut game, choice("professionnel")),
        Navigation::Stage(Stage::PitchOrder)
    );
    assert_eq!(
        solve(
            &mut game,
            order(&["salutation", "presentation", "motivation", "conclusion"])
        ),
        Navigation::Level(LevelId::Reaction)
    );
    assert_eq!(solve(&mut game, choice("b")), Navigation::Stage(Stage::Scenario(1)));
    assert_eq!(solve(&mut game, choice("b")), Navigation::Stage(Stage::Scenario(2)));
    assert_eq!(solve(&mut game, choice("c")), Navigation::Result);

    let card = game.scorecard().unwrap();
    assert_eq!(*card.score(), 100);
    assert_eq!(*card.tier(), ScoreTier::Perfect);
    assert_eq!(*card.scenario_hits(), 3);
    assert_eq!(game.state().completed_levels().len(), LevelId::COUNT);
    assert!(SessionInvariants::check_all(game.state()).is_ok());
}

#[test]
fn test_wrong_scenarios_still_complete_level_five() {
    let mut game = Progression::with_seed(5);
    game.identify(student()).unwrap();
    game.start().unwrap();
    solve(
        &mut game,
        selection(&["rigueur", "curiosite", "esprit-equipe", "autonomie"]),
    );
    solve(&mut game, choice("C"));
    solve(
        &mut game,
        selection(&["innovation", "collaboration", "rigueur", "proximite"]),
    );
    solve(
        &mut game,
        order(&["salutation", "remerciement", "disponibilite", "signature"]),
    );
    solve(&mut game, choice("professionnel"));
    solve(
        &mut game,
        order(&["salutation", "presentation", "motivation", "conclusion"]),
    );

    for _ in 0..3 {
        let feedback = game.submit(choice("a")).unwrap();
        assert_eq!(*feedback.verdict(), Verdict::Incorrect);
        assert!(feedback.message().starts_with("La meilleure réponse était"));
        game.advance().unwrap();
    }

    assert_eq!(game.phase(), Phase::Finished);
    assert!(game.state().is_completed(LevelId::Reaction));
    assert_eq!(*game.scorecard().unwrap().scenario_hits(), 0);
    assert_eq!(*game.scorecard().unwrap().score(), 100);
}

#[test]
fn test_retry_reshuffles_but_keeps_last_order() {
    let mut game = Progression::with_seed(11);
    game.identify(student()).unwrap();
    game.start().unwrap();
    solve(
        &mut game,
        selection(&["rigueur", "curiosite", "esprit-equipe", "autonomie"]),
    );
    solve(&mut game, choice("C"));
    solve(
        &mut game,
        selection(&["innovation", "collaboration", "rigueur", "proximite"]),
    );

    let wrong = ["signature", "remerciement", "disponibilite", "salutation"];
    let feedback = game.submit(order(&wrong)).unwrap();
    assert_eq!(*feedback.verdict(), Verdict::Incorrect);
    game.retry().unwrap();

    assert_eq!(
        game.phase(),
        Phase::Playing {
            stage: Stage::MailOrder,
            status: AttemptStatus::Answering
        }
    );
    assert_eq!(game.arrangement().len(), 4);
    assert_eq!(game.state().level3_order(), &wrong.map(String::from).to_vec());
}

#[test]
fn test_pitch_blocks_use_student_name() {
    let mut game = Progression::with_seed(3);
    game.identify(student()).unwrap();
    game.start().unwrap();
    solve(
        &mut game,
        selection(&["rigueur", "curiosite", "esprit-equipe", "autonomie"]),
    );
    solve(&mut game, choice("C"));
    solve(
        &mut game,
        selection(&["innovation", "collaboration", "rigueur", "proximite"]),
    );
    solve(
        &mut game,
        order(&["salutation", "remerciement", "disponibilite", "signature"]),
    );
    solve(&mut game, choice("professionnel"));

    let presentation = game
        .arrangement()
        .iter()
        .find(|block| block.id == "presentation")
        .unwrap();
    assert!(presentation.content.contains("Rim Haddad"));
    assert!(presentation.content.contains("Electrique"));
}

#[test]
fn test_actions_out_of_order_are_refused() {
    let mut game = Progression::with_seed(9);
    assert!(matches!(
        game.submit(choice("C")),
        Err(ProgressionError::IllegalTransition { .. })
    ));
    assert!(game.advance().is_err());
    assert!(game.retry().is_err());
    assert!(game.move_block(0, 1).is_err());

    game.identify(student()).unwrap();
    game.start().unwrap();
    assert!(matches!(
        game.identify(student()),
        Err(ProgressionError::IllegalTransition { .. })
    ));
    assert!(matches!(
        game.start(),
        Err(ProgressionError::IllegalTransition { .. })
    ));
}

#[test]
fn test_view_serializes_phase_and_prompt() {
    let mut game = Progression::with_seed(1);
    game.identify(student()).unwrap();
    game.start().unwrap();

    let view = serde_json::to_value(game.view()).unwrap();
    assert_eq!(view["phase"]["phase"], "playing");
    assert_eq!(view["phase"]["stage"], "qualities");
    assert_eq!(view["currentLevel"], 1);
    assert_eq!(view["prompt"]["title"], "Le Bilan de Soi");
    assert!(view.get("scorecard").is_none());
}
