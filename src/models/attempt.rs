use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One timed instance of a user taking an exam.
///
/// An attempt is *ongoing* while `finished_at` is NULL. Finalization by
/// submission is the only mutation an attempt ever receives; an ongoing
/// attempt whose window has elapsed is simply superseded by the next
/// admission and keeps its NULL `finished_at` forever.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Attempt {
    pub id: Uuid,
    pub user_id: Uuid,
    pub exam_id: Uuid,
    pub attempt_number: i32,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub score: i32,
    pub total_questions: i32,
    pub is_highest_score: bool,
    pub is_deleted: bool,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Attempt {
    pub fn is_ongoing(&self) -> bool {
        self.finished_at.is_none()
    }

    pub fn deadline(&self, duration_minutes: i32) -> DateTime<Utc> {
        self.started_at + Duration::minutes(duration_minutes as i64)
    }
}
