use crate::error::Result;
use crate::models::attempt::Attempt;
use chrono::{DateTime, Utc};
use sqlx::PgExecutor;
use uuid::Uuid;

/// All attempts for (user, exam), oldest first.
pub async fn list_by_user_and_exam(
    ex: impl PgExecutor<'_>,
    user_id: Uuid,
    exam_id: Uuid,
) -> Result<Vec<Attempt>> {
    let attempts = sqlx::query_as::<_, Attempt>(
        r#"SELECT * FROM attempts
           WHERE user_id = $1 AND exam_id = $2 AND is_deleted = FALSE
           ORDER BY started_at ASC, created_at ASC"#,
    )
    .bind(user_id)
    .bind(exam_id)
    .fetch_all(ex)
    .await?;
    Ok(attempts)
}

/// Most recent attempt with `finished_at` still NULL, if any.
pub async fn latest_ongoing(
    ex: impl PgExecutor<'_>,
    user_id: Uuid,
    exam_id: Uuid,
) -> Result<Option<Attempt>> {
    let attempt = sqlx::query_as::<_, Attempt>(
        r#"SELECT * FROM attempts
           WHERE user_id = $1 AND exam_id = $2
             AND finished_at IS NULL AND is_deleted = FALSE
           ORDER BY started_at DESC, created_at DESC
           LIMIT 1"#,
    )
    .bind(user_id)
    .bind(exam_id)
    .fetch_optional(ex)
    .await?;
    Ok(attempt)
}

pub async fn insert(
    ex: impl PgExecutor<'_>,
    user_id: Uuid,
    exam_id: Uuid,
    attempt_number: i32,
    started_at: DateTime<Utc>,
) -> Result<Attempt> {
    let attempt = sqlx::query_as::<_, Attempt>(
        r#"INSERT INTO attempts (id, user_id, exam_id, attempt_number, started_at, score, total_questions)
           VALUES ($1, $2, $3, $4, $5, 0, 0)
           RETURNING *"#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(exam_id)
    .bind(attempt_number)
    .bind(started_at)
    .fetch_one(ex)
    .await?;
    Ok(attempt)
}

/// One-time finalization. The `finished_at IS NULL` guard makes a second
/// finalization of the same row return None instead of overwriting.
pub async fn finalize(
    ex: impl PgExecutor<'_>,
    attempt_id: Uuid,
    score: i32,
    total_questions: i32,
    finished_at: DateTime<Utc>,
) -> Result<Option<Attempt>> {
    let attempt = sqlx::query_as::<_, Attempt>(
        r#"UPDATE attempts
           SET score = $2, total_questions = $3, finished_at = $4, updated_at = NOW()
           WHERE id = $1 AND finished_at IS NULL AND is_deleted = FALSE
           RETURNING *"#,
    )
    .bind(attempt_id)
    .bind(score)
    .bind(total_questions)
    .bind(finished_at)
    .fetch_optional(ex)
    .await?;
    Ok(attempt)
}

/// Recompute `is_highest_score` across the user's finished attempts for an
/// exam: best score wins, earliest finish breaks ties.
pub async fn refresh_highest_score(
    ex: impl PgExecutor<'_>,
    user_id: Uuid,
    exam_id: Uuid,
) -> Result<()> {
    sqlx::query(
        r#"UPDATE attempts
           SET is_highest_score = (id = (
                   SELECT id FROM attempts
                   WHERE user_id = $1 AND exam_id = $2
                     AND finished_at IS NOT NULL AND is_deleted = FALSE
                   ORDER BY score DESC, finished_at ASC
                   LIMIT 1
               )),
               updated_at = NOW()
           WHERE user_id = $1 AND exam_id = $2 AND is_deleted = FALSE"#,
    )
    .bind(user_id)
    .bind(exam_id)
    .execute(ex)
    .await?;
    Ok(())
}
