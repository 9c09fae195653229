use crate::error::Result;
use crate::models::exam::Exam;
use sqlx::PgExecutor;
use uuid::Uuid;

pub async fn get_visible(ex: impl PgExecutor<'_>, exam_id: Uuid) -> Result<Option<Exam>> {
    let exam = sqlx::query_as::<_, Exam>(
        r#"SELECT * FROM exams WHERE id = $1 AND is_deleted = FALSE"#,
    )
    .bind(exam_id)
    .fetch_optional(ex)
    .await?;
    Ok(exam)
}
