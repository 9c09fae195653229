use crate::error::Result;
use crate::models::question::{Choice, Question, QuestionKind, QuestionWithChoices};
use sqlx::{PgExecutor, PgPool};
use std::collections::HashMap;
use uuid::Uuid;

pub async fn get_visible(ex: impl PgExecutor<'_>, question_id: Uuid) -> Result<Option<Question>> {
    let question = sqlx::query_as::<_, Question>(
        r#"SELECT * FROM questions WHERE id = $1 AND is_deleted = FALSE"#,
    )
    .bind(question_id)
    .fetch_optional(ex)
    .await?;
    Ok(question)
}

pub async fn list_visible_with_choices(
    pool: &PgPool,
    exam_id: Uuid,
) -> Result<Vec<QuestionWithChoices>> {
    let questions = sqlx::query_as::<_, Question>(
        r#"SELECT * FROM questions
           WHERE exam_id = $1 AND is_deleted = FALSE
           ORDER BY created_at ASC, id ASC"#,
    )
    .bind(exam_id)
    .fetch_all(pool)
    .await?;

    if questions.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<Uuid> = questions.iter().map(|q| q.id).collect();
    let choices = sqlx::query_as::<_, Choice>(
        r#"SELECT * FROM choices
           WHERE question_id = ANY($1) AND is_deleted = FALSE
           ORDER BY created_at ASC, id ASC"#,
    )
    .bind(&ids)
    .fetch_all(pool)
    .await?;

    let mut by_question: HashMap<Uuid, Vec<Choice>> = HashMap::new();
    for choice in choices {
        by_question.entry(choice.question_id).or_default().push(choice);
    }

    Ok(questions
        .into_iter()
        .map(|question| {
            let choices = by_question.remove(&question.id).unwrap_or_default();
            QuestionWithChoices { question, choices }
        })
        .collect())
}

pub async fn list_visible_choices(
    ex: impl PgExecutor<'_>,
    question_id: Uuid,
) -> Result<Vec<Choice>> {
    let choices = sqlx::query_as::<_, Choice>(
        r#"SELECT * FROM choices
           WHERE question_id = $1 AND is_deleted = FALSE
           ORDER BY created_at ASC, id ASC"#,
    )
    .bind(question_id)
    .fetch_all(ex)
    .await?;
    Ok(choices)
}

pub async fn insert(
    ex: impl PgExecutor<'_>,
    exam_id: Uuid,
    title: &str,
    kind: QuestionKind,
) -> Result<Question> {
    let question = sqlx::query_as::<_, Question>(
        r#"INSERT INTO questions (id, exam_id, title, kind)
           VALUES ($1, $2, $3, $4)
           RETURNING *"#,
    )
    .bind(Uuid::new_v4())
    .bind(exam_id)
    .bind(title)
    .bind(kind)
    .fetch_one(ex)
    .await?;
    Ok(question)
}

pub async fn update_fields(
    ex: impl PgExecutor<'_>,
    question_id: Uuid,
    title: Option<&str>,
    kind: Option<QuestionKind>,
) -> Result<Option<Question>> {
    let question = sqlx::query_as::<_, Question>(
        r#"UPDATE questions
           SET title = COALESCE($2, title),
               kind = COALESCE($3, kind),
               updated_at = NOW()
           WHERE id = $1 AND is_deleted = FALSE
           RETURNING *"#,
    )
    .bind(question_id)
    .bind(title)
    .bind(kind)
    .fetch_optional(ex)
    .await?;
    Ok(question)
}

pub async fn soft_delete(ex: impl PgExecutor<'_>, question_id: Uuid) -> Result<()> {
    sqlx::query(
        r#"UPDATE questions
           SET is_deleted = TRUE, deleted_at = NOW(), updated_at = NOW()
           WHERE id = $1 AND is_deleted = FALSE"#,
    )
    .bind(question_id)
    .execute(ex)
    .await?;
    Ok(())
}

pub async fn insert_choice(
    ex: impl PgExecutor<'_>,
    question_id: Uuid,
    text: &str,
    is_correct: bool,
) -> Result<Choice> {
    let choice = sqlx::query_as::<_, Choice>(
        r#"INSERT INTO choices (id, question_id, text, is_correct)
           VALUES ($1, $2, $3, $4)
           RETURNING *"#,
    )
    .bind(Uuid::new_v4())
    .bind(question_id)
    .bind(text)
    .bind(is_correct)
    .fetch_one(ex)
    .await?;
    Ok(choice)
}

pub async fn update_choice(
    ex: impl PgExecutor<'_>,
    choice_id: Uuid,
    text: &str,
    is_correct: bool,
) -> Result<()> {
    sqlx::query(
        r#"UPDATE choices
           SET text = $2, is_correct = $3, updated_at = NOW()
           WHERE id = $1 AND is_deleted = FALSE"#,
    )
    .bind(choice_id)
    .bind(text)
    .bind(is_correct)
    .execute(ex)
    .await?;
    Ok(())
}

pub async fn soft_delete_choices(ex: impl PgExecutor<'_>, choice_ids: &[Uuid]) -> Result<()> {
    if choice_ids.is_empty() {
        return Ok(());
    }
    sqlx::query(
        r#"UPDATE choices
           SET is_deleted = TRUE, deleted_at = NOW(), updated_at = NOW()
           WHERE id = ANY($1) AND is_deleted = FALSE"#,
    )
    .bind(choice_ids)
    .execute(ex)
    .await?;
    Ok(())
}

pub async fn soft_delete_choices_by_question(
    ex: impl PgExecutor<'_>,
    question_id: Uuid,
) -> Result<()> {
    sqlx::query(
        r#"UPDATE choices
           SET is_deleted = TRUE, deleted_at = NOW(), updated_at = NOW()
           WHERE question_id = $1 AND is_deleted = FALSE"#,
    )
    .bind(question_id)
    .execute(ex)
    .await?;
    Ok(())
}
