use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::dto::question_dto::{AddQuestionRequest, UpdateQuestionRequest};
use crate::error::Result;
use crate::AppState;

#[utoipa::path(
    post,
    path = "/api/exams/{exam_id}/questions",
    request_body = AddQuestionRequest,
    responses(
        (status = 201, description = "Question created with its choices", body = Json<serde_json::Value>),
        (status = 400, description = "Choice set violates the question-kind invariants"),
        (status = 404, description = "Exam not found"),
    ),
)]
#[axum::debug_handler]
pub async fn add_question(
    State(state): State<AppState>,
    Path(exam_id): Path<Uuid>,
    Json(payload): Json<AddQuestionRequest>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let created = state.question_service.add_question(exam_id, payload).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[axum::debug_handler]
pub async fn list_questions(
    State(state): State<AppState>,
    Path(exam_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let questions = state.question_service.list_questions(exam_id).await?;
    Ok(Json(questions))
}

#[utoipa::path(
    patch,
    path = "/api/questions/{id}",
    request_body = UpdateQuestionRequest,
    responses(
        (status = 200, description = "Question updated", body = Json<serde_json::Value>),
        (status = 400, description = "No fields changed or resulting choice set invalid"),
        (status = 404, description = "Question not found"),
    ),
)]
#[axum::debug_handler]
pub async fn update_question(
    State(state): State<AppState>,
    Path(question_id): Path<Uuid>,
    Json(payload): Json<UpdateQuestionRequest>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let updated = state
        .question_service
        .update_question(question_id, payload)
        .await?;
    Ok(Json(updated))
}

#[axum::debug_handler]
pub async fn delete_question(
    State(state): State<AppState>,
    Path(question_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    state.question_service.delete_question(question_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
