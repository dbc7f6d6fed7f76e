//! Tests for the results email: rendering and the Resend client.

use interview_core::{GameEvent, GameState, LevelId, Scorecard, StudentInfo, reduce};
use interview_server::mailer::{MailError, ResendClient, render_results_email, subject_line};
use interview_server::{MailSettings, NotificationRequest};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn request(last_name: &str, levels: &[LevelId]) -> NotificationRequest {
    let student = StudentInfo::new(
        last_name,
        "Yassine",
        "G5",
        "3ème Année",
        "Electrique",
        "prof@iset.tn",
    );
    let start = chrono::Utc::now();
    let mut state = reduce(&GameState::default(), GameEvent::StartGame, start);
    for level in levels {
        state = reduce(&state, GameEvent::CompleteLevel(*level), start);
    }
    state = reduce(
        &state,
        GameEvent::Finish,
        start + chrono::Duration::minutes(12),
    );
    NotificationRequest::from_scorecard(&student, &Scorecard::from_state(&state, 0))
}

fn settings(server: &MockServer) -> MailSettings {
    MailSettings::default().with_api_url(format!("{}/emails", server.uri()))
}

#[test]
fn subject_names_student_and_score() {
    let request = request(
        "Jebali",
        &[LevelId::SelfAssessment, LevelId::Investigation, LevelId::Interview],
    );
    assert_eq!(
        subject_line(request.student_result()),
        "Résultats de Yassine Jebali - Score: 60%"
    );
}

#[test]
fn body_lists_every_level_and_escapes_names() {
    let request = request("<Jebali>", &[LevelId::SelfAssessment]);
    let html = render_results_email(request.student_result());

    assert!(html.contains("Yassine &lt;Jebali&gt;"));
    assert!(!html.contains("<Jebali>"));
    assert!(html.contains("#dc2626"));
    assert!(html.contains("20%"));
    assert!(html.contains("1/5 niveaux complétés • 12 min"));
    assert_eq!(html.matches("✓ Complété").count(), 1);
    assert_eq!(html.matches("✗ Non complété").count(), 4);
}

#[tokio::test]
async fn sends_with_bearer_key() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/emails"))
        .and(header("authorization", "Bearer re_test_key"))
        .and(body_partial_json(serde_json::json!({
            "from": "Simulateur Entretien <onboarding@resend.dev>",
            "to": ["prof@iset.tn"],
            "subject": "Résultats de Yassine Jebali - Score: 100%"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "id": "abc" })))
        .expect(1)
        .mount(&server)
        .await;

    let client = ResendClient::new(&settings(&server), Some("re_test_key".to_string()));
    let all: Vec<LevelId> = vec![
        LevelId::SelfAssessment,
        LevelId::Investigation,
        LevelId::Invitation,
        LevelId::Interview,
        LevelId::Reaction,
    ];
    let data = client.send_results(&request("Jebali", &all)).await.unwrap();
    assert_eq!(data["id"], "abc");
}

#[tokio::test]
async fn missing_key_sends_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = ResendClient::new(&settings(&server), None);
    let err = client
        .send_results(&request("Jebali", &[]))
        .await
        .unwrap_err();
    assert_eq!(err, MailError::MissingApiKey);
}

#[tokio::test]
async fn api_error_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(422).set_body_string("invalid from"))
        .mount(&server)
        .await;

    let client = ResendClient::new(&settings(&server), Some("re_test_key".to_string()));
    let err = client
        .send_results(&request("Jebali", &[]))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        MailError::Api {
            status: 422,
            body: "invalid from".to_string()
        }
    );
}
