use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Extension, Json,
};
use chrono::Duration;
use uuid::Uuid;
use validator::Validate;

use crate::dto::attempt_dto::{
    AdmissionStatus, AttemptSummary, QuestionView, StartAttemptResponse, SubmitExamRequest,
    SubmitExamResponse,
};
use crate::error::Result;
use crate::middleware::auth::AuthContext;
use crate::services::admission_service::Admission;
use crate::AppState;

#[utoipa::path(
    post,
    path = "/api/exams/{exam_id}/attempts/start",
    responses(
        (status = 200, description = "Attempt created or resumed, with the question set", body = Json<serde_json::Value>),
        (status = 403, description = "Exam inactive or outside its time window"),
        (status = 404, description = "Exam not found"),
        (status = 409, description = "Exam has no questions"),
    ),
)]
#[axum::debug_handler]
pub async fn start_attempt(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Path(exam_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let (admission, exam, questions) = state
        .admission_service
        .start_attempt(ctx.user_id, exam_id)
        .await?;

    let (outcome, attempt, remaining) = match admission {
        Admission::Created { attempt } => {
            let remaining = Duration::minutes(exam.duration_minutes as i64);
            (AdmissionStatus::Created, attempt, remaining)
        }
        Admission::Resumed { attempt, remaining } => {
            (AdmissionStatus::Resumed, attempt, remaining)
        }
    };

    let response = StartAttemptResponse {
        outcome,
        attempt_id: attempt.id,
        attempt_number: attempt.attempt_number,
        started_at: attempt.started_at,
        expires_at: attempt.deadline(exam.duration_minutes),
        remaining_seconds: remaining.num_seconds(),
        questions: questions.iter().map(QuestionView::from).collect(),
    };
    Ok(Json(response))
}

#[utoipa::path(
    post,
    path = "/api/exams/{exam_id}/attempts/submit",
    request_body = SubmitExamRequest,
    responses(
        (status = 200, description = "Attempt graded and finalized", body = Json<serde_json::Value>),
        (status = 409, description = "No active attempt for this exam"),
    ),
)]
#[axum::debug_handler]
pub async fn submit_attempt(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Path(exam_id): Path<Uuid>,
    Json(payload): Json<SubmitExamRequest>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let outcome = state
        .submission_service
        .submit(ctx.user_id, exam_id, payload)
        .await?;

    let response = SubmitExamResponse {
        attempt_id: outcome.attempt.id,
        score: outcome.attempt.score,
        total_questions: outcome.attempt.total_questions,
        percentage: outcome.percentage,
        grade: outcome.grade,
        finished_at: outcome.attempt.finished_at.unwrap_or_else(chrono::Utc::now),
        breakdown: outcome.breakdown,
    };
    Ok(Json(response))
}

#[axum::debug_handler]
pub async fn list_my_attempts(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Path(exam_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let attempts = state
        .admission_service
        .list_attempts(ctx.user_id, exam_id)
        .await?;
    let summaries: Vec<AttemptSummary> =
        attempts.into_iter().map(AttemptSummary::from).collect();
    Ok(Json(summaries))
}
