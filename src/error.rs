use axum::{
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::json;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Exam unavailable: {0}")]
    Unavailable(String),

    #[error("Exam has no questions")]
    NoQuestions,

    #[error("Invalid choice count: {0} (must be between 2 and 10)")]
    InvalidChoiceCount(usize),

    #[error("Duplicate choice text: {0}")]
    DuplicateChoiceText(String),

    #[error("Invalid correct-choice count: {0}")]
    InvalidCorrectCount(String),

    #[error("No fields changed")]
    NoFieldsChanged,

    #[error("No active attempt for this exam")]
    NoActiveAttempt,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Validation error: {0}")]
    Payload(#[from] validator::ValidationErrors),

    #[error("Database error: {0}")]
    Database(sqlx::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Stable machine-readable code included in every error response.
    pub fn code(&self) -> &'static str {
        match self {
            Error::Config(_) => "config_error",
            Error::NotFound(_) => "not_found",
            Error::Unavailable(_) => "exam_unavailable",
            Error::NoQuestions => "no_questions",
            Error::InvalidChoiceCount(_) => "invalid_choice_count",
            Error::DuplicateChoiceText(_) => "duplicate_choice_text",
            Error::InvalidCorrectCount(_) => "invalid_correct_count",
            Error::NoFieldsChanged => "no_fields_changed",
            Error::NoActiveAttempt => "no_active_attempt",
            Error::Validation(_) | Error::Payload(_) => "validation_error",
            Error::Database(_) => "database_error",
            Error::Json(_) => "invalid_json",
            Error::Anyhow(_) => "bad_request",
            Error::Internal(_) => "internal_error",
            Error::Io(_) => "io_error",
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Unavailable(_) => StatusCode::FORBIDDEN,
            Error::NoQuestions | Error::NoActiveAttempt => StatusCode::CONFLICT,
            Error::InvalidChoiceCount(_)
            | Error::DuplicateChoiceText(_)
            | Error::InvalidCorrectCount(_)
            | Error::NoFieldsChanged
            | Error::Validation(_)
            | Error::Payload(_)
            | Error::Json(_)
            | Error::Anyhow(_) => StatusCode::BAD_REQUEST,
            Error::Config(_) | Error::Database(_) | Error::Internal(_) | Error::Io(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = Json(json!({ "error": self.code(), "message": self.to_string() }));
        (status, body).into_response()
    }
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => Error::NotFound("Resource not found".to_string()),
            other => Error::Database(other),
        }
    }
}
