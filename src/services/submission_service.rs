use crate::dto::attempt_dto::{SubmitExamRequest, SubmittedAnswer};
use crate::error::{Error, Result};
use crate::models::attempt::Attempt;
use crate::models::question::QuestionWithChoices;
use crate::services::grading_service::{GradedAnswer, GradingService, LetterGrade};
use crate::services::notification_service::NotificationService;
use crate::store;
use chrono::Utc;
use sqlx::PgPool;
use std::collections::{BTreeSet, HashMap};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct SubmissionOutcome {
    pub attempt: Attempt,
    pub percentage: f64,
    pub grade: LetterGrade,
    pub breakdown: Vec<GradedAnswer>,
}

/// Fold the raw payload into one selection set per known question.
/// Question ids not belonging to the exam are silently dropped, as are
/// choice ids not belonging to their question; a question submitted twice
/// keeps the last entry.
pub(crate) fn fold_answers(
    questions: &[QuestionWithChoices],
    answers: Vec<SubmittedAnswer>,
) -> HashMap<Uuid, BTreeSet<Uuid>> {
    let known: HashMap<Uuid, BTreeSet<Uuid>> = questions
        .iter()
        .map(|q| (q.question.id, q.choices.iter().map(|c| c.id).collect()))
        .collect();

    let mut folded = HashMap::new();
    for answer in answers {
        let Some(valid_choices) = known.get(&answer.question_id) else {
            continue;
        };
        let chosen: BTreeSet<Uuid> = answer
            .choice_ids
            .into_iter()
            .filter(|id| valid_choices.contains(id))
            .collect();
        folded.insert(answer.question_id, chosen);
    }
    folded
}

#[derive(Clone)]
pub struct SubmissionService {
    pool: PgPool,
    notifications: NotificationService,
}

impl SubmissionService {
    pub fn new(pool: PgPool, notifications: NotificationService) -> Self {
        Self {
            pool,
            notifications,
        }
    }

    /// Persist the submitted answers, grade them against the live question
    /// set, and finalize the attempt, all in one transaction. Fails with
    /// NoActiveAttempt when nothing is ongoing, including a re-submission
    /// against an already-finalized attempt.
    pub async fn submit(
        &self,
        user_id: Uuid,
        exam_id: Uuid,
        req: SubmitExamRequest,
    ) -> Result<SubmissionOutcome> {
        let attempt = store::attempts::latest_ongoing(&self.pool, user_id, exam_id)
            .await?
            .ok_or(Error::NoActiveAttempt)?;

        let questions = store::questions::list_visible_with_choices(&self.pool, exam_id).await?;
        let submitted = fold_answers(&questions, req.answers);
        let graded = GradingService::grade(&questions, &submitted);

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;
        for (question_id, choice_ids) in &submitted {
            let answer =
                store::answers::insert_answer(&mut *tx, attempt.id, *question_id).await?;
            for choice_id in choice_ids {
                store::answers::insert_selected_choice(&mut *tx, answer.id, *choice_id).await?;
            }
        }
        let finalized = store::attempts::finalize(
            &mut *tx,
            attempt.id,
            graded.score,
            graded.total_questions,
            now,
        )
        .await?
        .ok_or(Error::NoActiveAttempt)?;
        store::attempts::refresh_highest_score(&mut *tx, user_id, exam_id).await?;
        tx.commit().await?;

        let percentage = graded.percentage();
        let grade = graded.grade();
        tracing::info!(
            attempt_id = %finalized.id,
            user_id = %user_id,
            score = finalized.score,
            total_questions = finalized.total_questions,
            %grade,
            "Attempt finalized"
        );

        let body = format!(
            "Attempt #{}: you scored {}/{} ({:.1}%), grade {}.",
            finalized.attempt_number, finalized.score, finalized.total_questions, percentage, grade
        );
        if let Err(err) = self
            .notifications
            .enqueue(user_id, "Exam results available", &body)
            .await
        {
            tracing::error!(error = ?err, "Failed to enqueue result notification");
        }

        Ok(SubmissionOutcome {
            attempt: finalized,
            percentage,
            grade,
            breakdown: graded.breakdown,
        })
    }
}
