use crate::models::attempt::Attempt;
use crate::models::question::{QuestionKind, QuestionWithChoices};
use crate::services::grading_service::{GradedAnswer, LetterGrade};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Question as shown to a candidate: choice text visible, correctness
/// withheld.
#[derive(Debug, Clone, Serialize)]
pub struct QuestionView {
    pub id: Uuid,
    pub title: String,
    pub kind: QuestionKind,
    pub choices: Vec<ChoiceView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChoiceView {
    pub id: Uuid,
    pub text: String,
}

impl From<&QuestionWithChoices> for QuestionView {
    fn from(q: &QuestionWithChoices) -> Self {
        Self {
            id: q.question.id,
            title: q.question.title.clone(),
            kind: q.question.kind,
            choices: q
                .choices
                .iter()
                .map(|c| ChoiceView {
                    id: c.id,
                    text: c.text.clone(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdmissionStatus {
    Created,
    Resumed,
}

#[derive(Debug, Clone, Serialize)]
pub struct StartAttemptResponse {
    pub outcome: AdmissionStatus,
    pub attempt_id: Uuid,
    pub attempt_number: i32,
    pub started_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub remaining_seconds: i64,
    pub questions: Vec<QuestionView>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SubmittedAnswer {
    pub question_id: Uuid,
    #[serde(default)]
    pub choice_ids: Vec<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SubmitExamRequest {
    pub answers: Vec<SubmittedAnswer>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubmitExamResponse {
    pub attempt_id: Uuid,
    pub score: i32,
    pub total_questions: i32,
    pub percentage: f64,
    pub grade: LetterGrade,
    pub finished_at: DateTime<Utc>,
    pub breakdown: Vec<GradedAnswer>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AttemptSummary {
    pub id: Uuid,
    pub attempt_number: i32,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub score: i32,
    pub total_questions: i32,
    pub is_highest_score: bool,
}

impl From<Attempt> for AttemptSummary {
    fn from(a: Attempt) -> Self {
        Self {
            id: a.id,
            attempt_number: a.attempt_number,
            started_at: a.started_at,
            finished_at: a.finished_at,
            score: a.score,
            total_questions: a.total_questions,
            is_highest_score: a.is_highest_score,
        }
    }
}
