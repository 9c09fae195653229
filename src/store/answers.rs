use crate::error::Result;
use crate::models::answer::Answer;
use sqlx::PgExecutor;
use uuid::Uuid;

pub async fn insert_answer(
    ex: impl PgExecutor<'_>,
    attempt_id: Uuid,
    question_id: Uuid,
) -> Result<Answer> {
    let answer = sqlx::query_as::<_, Answer>(
        r#"INSERT INTO answers (id, attempt_id, question_id)
           VALUES ($1, $2, $3)
           RETURNING *"#,
    )
    .bind(Uuid::new_v4())
    .bind(attempt_id)
    .bind(question_id)
    .fetch_one(ex)
    .await?;
    Ok(answer)
}

pub async fn insert_selected_choice(
    ex: impl PgExecutor<'_>,
    answer_id: Uuid,
    choice_id: Uuid,
) -> Result<()> {
    sqlx::query(
        r#"INSERT INTO selected_choices (id, answer_id, choice_id)
           VALUES ($1, $2, $3)"#,
    )
    .bind(Uuid::new_v4())
    .bind(answer_id)
    .bind(choice_id)
    .execute(ex)
    .await?;
    Ok(())
}
