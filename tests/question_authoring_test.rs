use std::env;

use chrono::{Duration, Utc};
use serde_json::json;
use uuid::Uuid;

fn setup_env() {
    dotenvy::dotenv().ok();
    env::set_var("SERVER_ADDRESS", "127.0.0.1:0");
    env::set_var("JWT_SECRET", "test_secret_key");
    env::set_var("NOTIFICATION_WEBHOOK_URL", "http://localhost/webhook");
    let _ = exam_backend::config::init_config();
}

async fn seed_exam(pool: &sqlx::PgPool) -> Uuid {
    let exam_id = Uuid::new_v4();
    let now = Utc::now();
    sqlx::query(
        r#"INSERT INTO exams (id, title, start_date, end_date, duration_minutes, is_active)
           VALUES ($1, $2, $3, $4, $5, TRUE)"#,
    )
    .bind(exam_id)
    .bind("Authoring Target")
    .bind(now - Duration::hours(1))
    .bind(now + Duration::hours(1))
    .bind(45)
    .execute(pool)
    .await
    .expect("seed exam");
    exam_id
}

fn payload(value: serde_json::Value) -> exam_backend::dto::question_dto::AddQuestionRequest {
    serde_json::from_value(value).expect("payload")
}

#[tokio::test]
#[ignore = "requires a live PostgreSQL via DATABASE_URL"]
async fn authoring_invariants_are_enforced() {
    setup_env();
    let pool = exam_backend::database::pool::create_pool()
        .await
        .expect("pool");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("migrations");

    let exam_id = seed_exam(&pool).await;
    let service = exam_backend::services::question_service::QuestionService::new(pool.clone());

    // Unknown exam.
    let err = service
        .add_question(
            Uuid::new_v4(),
            payload(json!({
                "title": "q",
                "kind": "single_correct",
                "choices": [
                    {"text": "a", "is_correct": true},
                    {"text": "b", "is_correct": false}
                ]
            })),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, exam_backend::error::Error::NotFound(_)));

    // Single-correct with two correct choices.
    let err = service
        .add_question(
            exam_id,
            payload(json!({
                "title": "q",
                "kind": "single_correct",
                "choices": [
                    {"text": "a", "is_correct": true},
                    {"text": "b", "is_correct": true}
                ]
            })),
        )
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        exam_backend::error::Error::InvalidCorrectCount(_)
    ));

    // Case-insensitive duplicate text.
    let err = service
        .add_question(
            exam_id,
            payload(json!({
                "title": "q",
                "kind": "multi_select",
                "choices": [
                    {"text": "Paris", "is_correct": true},
                    {"text": "paris", "is_correct": false}
                ]
            })),
        )
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        exam_backend::error::Error::DuplicateChoiceText(_)
    ));

    // Too few choices.
    let err = service
        .add_question(
            exam_id,
            payload(json!({
                "title": "q",
                "kind": "multi_select",
                "choices": [{"text": "only", "is_correct": true}]
            })),
        )
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        exam_backend::error::Error::InvalidChoiceCount(1)
    ));

    // A valid question persists the full choice set with ids.
    let created = service
        .add_question(
            exam_id,
            payload(json!({
                "title": "Capital of France?",
                "kind": "single_correct",
                "choices": [
                    {"text": "Paris", "is_correct": true},
                    {"text": "Lyon", "is_correct": false},
                    {"text": "Marseille", "is_correct": false}
                ]
            })),
        )
        .await
        .expect("create question");
    assert_eq!(created.choices.len(), 3);
    assert_eq!(
        created
            .choices
            .iter()
            .filter(|c| c.is_correct)
            .count(),
        1
    );
}

#[tokio::test]
#[ignore = "requires a live PostgreSQL via DATABASE_URL"]
async fn update_reconciles_against_the_final_set() {
    setup_env();
    let pool = exam_backend::database::pool::create_pool()
        .await
        .expect("pool");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("migrations");

    let exam_id = seed_exam(&pool).await;
    let service = exam_backend::services::question_service::QuestionService::new(pool.clone());

    let created = service
        .add_question(
            exam_id,
            payload(json!({
                "title": "Pick primes",
                "kind": "multi_select",
                "choices": [
                    {"text": "2", "is_correct": true},
                    {"text": "3", "is_correct": true},
                    {"text": "4", "is_correct": false}
                ]
            })),
        )
        .await
        .expect("create");

    // Empty update is rejected.
    let err = service
        .update_question(
            created.question.id,
            serde_json::from_value(json!({})).expect("payload"),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, exam_backend::error::Error::NoFieldsChanged));

    // Keep "2" (renamed), drop the others, add a fresh pair; the rule is
    // checked against the set as it will exist afterwards.
    let kept = created.choices[0].id;
    let updated = service
        .update_question(
            created.question.id,
            serde_json::from_value(json!({
                "title": "Pick even primes",
                "choices": [
                    {"id": kept, "text": "two", "is_correct": true},
                    {"text": "five", "is_correct": false}
                ]
            }))
            .expect("payload"),
        )
        .await
        .expect("update");
    assert_eq!(updated.question.title, "Pick even primes");
    assert_eq!(updated.choices.len(), 2);
    let renamed = updated.choices.iter().find(|c| c.id == kept).unwrap();
    assert_eq!(renamed.text, "two");

    // Flipping the kind to single_correct is validated against the
    // resulting set, which still has exactly one correct choice: ok.
    let flipped = service
        .update_question(
            created.question.id,
            serde_json::from_value(json!({ "kind": "single_correct" })).expect("payload"),
        )
        .await
        .expect("flip kind");
    assert_eq!(
        flipped.question.kind,
        exam_backend::models::question::QuestionKind::SingleCorrect
    );

    // Removing every correct choice must fail, leaving the row untouched.
    let err = service
        .update_question(
            created.question.id,
            serde_json::from_value(json!({
                "choices": [
                    {"text": "red", "is_correct": false},
                    {"text": "blue", "is_correct": false}
                ]
            }))
            .expect("payload"),
        )
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        exam_backend::error::Error::InvalidCorrectCount(_)
    ));

    // Soft deletion hides the question from authoring reads.
    service
        .delete_question(created.question.id)
        .await
        .expect("delete");
    let err = service
        .update_question(
            created.question.id,
            serde_json::from_value(json!({ "title": "ghost" })).expect("payload"),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, exam_backend::error::Error::NotFound(_)));
}
