use crate::error::{Error, Result};
use crate::models::attempt::Attempt;
use crate::models::exam::Exam;
use crate::models::question::QuestionWithChoices;
use crate::store;
use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;
use uuid::Uuid;

/// Outcome of admission: either the caller's still-running attempt, or a
/// freshly created one. This is the only place that decides
/// resume-vs-create.
#[derive(Debug, Clone)]
pub enum Admission {
    Created { attempt: Attempt },
    Resumed { attempt: Attempt, remaining: Duration },
}

impl Admission {
    pub fn attempt(&self) -> &Attempt {
        match self {
            Admission::Created { attempt } => attempt,
            Admission::Resumed { attempt, .. } => attempt,
        }
    }
}

#[derive(Debug)]
pub(crate) enum Decision<'a> {
    Resume {
        attempt: &'a Attempt,
        remaining: Duration,
    },
    StartNew {
        attempt_number: i32,
    },
}

/// Pure resume-vs-create decision over the caller's prior attempts,
/// oldest first. A stale ongoing attempt is passed over without being
/// touched; it is superseded by the next attempt number.
pub(crate) fn decide<'a>(
    prior: &'a [Attempt],
    duration_minutes: i32,
    now: DateTime<Utc>,
) -> Decision<'a> {
    if let Some(last) = prior.last() {
        if last.is_ongoing() {
            let remaining = last.deadline(duration_minutes) - now;
            if remaining > Duration::zero() {
                return Decision::Resume {
                    attempt: last,
                    remaining,
                };
            }
        }
    }
    Decision::StartNew {
        attempt_number: prior.len() as i32 + 1,
    }
}

#[derive(Clone)]
pub struct AdmissionService {
    pool: PgPool,
}

impl AdmissionService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn start_attempt(
        &self,
        user_id: Uuid,
        exam_id: Uuid,
    ) -> Result<(Admission, Exam, Vec<QuestionWithChoices>)> {
        let now = Utc::now();

        let exam = store::exams::get_visible(&self.pool, exam_id)
            .await?
            .ok_or_else(|| Error::NotFound("Exam not found".to_string()))?;
        if !exam.is_active {
            return Err(Error::Unavailable("Exam is not active".to_string()));
        }
        if now < exam.start_date {
            return Err(Error::Unavailable("Exam has not started yet".to_string()));
        }
        if now > exam.end_date {
            return Err(Error::Unavailable("Exam window has closed".to_string()));
        }

        let questions = store::questions::list_visible_with_choices(&self.pool, exam_id).await?;
        if questions.is_empty() {
            return Err(Error::NoQuestions);
        }

        let prior =
            store::attempts::list_by_user_and_exam(&self.pool, user_id, exam_id).await?;

        let admission = match decide(&prior, exam.duration_minutes, now) {
            Decision::Resume { attempt, remaining } => {
                tracing::info!(
                    attempt_id = %attempt.id,
                    user_id = %user_id,
                    remaining_seconds = remaining.num_seconds(),
                    "Resuming ongoing attempt"
                );
                Admission::Resumed {
                    attempt: attempt.clone(),
                    remaining,
                }
            }
            Decision::StartNew { attempt_number } => {
                let attempt =
                    store::attempts::insert(&self.pool, user_id, exam_id, attempt_number, now)
                        .await?;
                tracing::info!(
                    attempt_id = %attempt.id,
                    user_id = %user_id,
                    attempt_number,
                    "Created new attempt"
                );
                Admission::Created { attempt }
            }
        };

        Ok((admission, exam, questions))
    }

    /// The caller's attempt history for an exam, oldest first.
    pub async fn list_attempts(&self, user_id: Uuid, exam_id: Uuid) -> Result<Vec<Attempt>> {
        store::exams::get_visible(&self.pool, exam_id)
            .await?
            .ok_or_else(|| Error::NotFound("Exam not found".to_string()))?;
        store::attempts::list_by_user_and_exam(&self.pool, user_id, exam_id).await
    }
}
