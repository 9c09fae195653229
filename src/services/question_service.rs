use crate::dto::question_dto::{AddQuestionRequest, ChoiceUpsert, UpdateQuestionRequest};
use crate::error::{Error, Result};
use crate::models::question::{Choice, QuestionKind, QuestionWithChoices};
use crate::store;
use sqlx::PgPool;
use std::collections::HashSet;
use uuid::Uuid;

pub(crate) const MIN_CHOICES: usize = 2;
pub(crate) const MAX_CHOICES: usize = 10;

/// Validate a would-be final choice set against the per-kind invariants:
/// count in [2, 10], case-insensitive text uniqueness, and the
/// correct-choice count rule (exactly one for single-correct, at least
/// one for multi-select).
pub(crate) fn validate_choice_set(kind: QuestionKind, choices: &[(String, bool)]) -> Result<()> {
    if choices.len() < MIN_CHOICES || choices.len() > MAX_CHOICES {
        return Err(Error::InvalidChoiceCount(choices.len()));
    }

    let mut seen = HashSet::new();
    for (text, _) in choices {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(Error::Validation("Choice text must not be empty".to_string()));
        }
        if !seen.insert(trimmed.to_lowercase()) {
            return Err(Error::DuplicateChoiceText(trimmed.to_string()));
        }
    }

    let correct = choices.iter().filter(|(_, is_correct)| *is_correct).count();
    match kind {
        QuestionKind::SingleCorrect if correct != 1 => Err(Error::InvalidCorrectCount(format!(
            "single-correct questions need exactly one correct choice, got {}",
            correct
        ))),
        QuestionKind::MultiSelect if correct == 0 => Err(Error::InvalidCorrectCount(
            "multi-select questions need at least one correct choice".to_string(),
        )),
        _ => Ok(()),
    }
}

#[derive(Debug, Default)]
pub(crate) struct ChoicePlan {
    pub updates: Vec<(Uuid, String, bool)>,
    pub inserts: Vec<(String, bool)>,
    pub deletes: Vec<Uuid>,
}

impl ChoicePlan {
    /// The choice set as it will exist after the plan is applied.
    pub fn final_set(&self) -> Vec<(String, bool)> {
        self.updates
            .iter()
            .map(|(_, text, is_correct)| (text.clone(), *is_correct))
            .chain(self.inserts.iter().cloned())
            .collect()
    }
}

/// Reconcile an update payload against the existing visible choices:
/// id-carrying entries update in place, id-less entries insert, existing
/// ids absent from the payload are scheduled for soft-deletion.
pub(crate) fn plan_reconciliation(
    existing: &[Choice],
    payload: &[ChoiceUpsert],
) -> Result<ChoicePlan> {
    let existing_ids: HashSet<Uuid> = existing.iter().map(|c| c.id).collect();
    let mut plan = ChoicePlan::default();
    let mut kept = HashSet::new();

    for entry in payload {
        match entry.id {
            Some(id) => {
                if !existing_ids.contains(&id) {
                    return Err(Error::NotFound(format!("Choice {} not found", id)));
                }
                kept.insert(id);
                plan.updates.push((id, entry.text.clone(), entry.is_correct));
            }
            None => plan.inserts.push((entry.text.clone(), entry.is_correct)),
        }
    }

    plan.deletes = existing
        .iter()
        .filter(|c| !kept.contains(&c.id))
        .map(|c| c.id)
        .collect();

    Ok(plan)
}

#[derive(Clone)]
pub struct QuestionService {
    pool: PgPool,
}

impl QuestionService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn add_question(
        &self,
        exam_id: Uuid,
        payload: AddQuestionRequest,
    ) -> Result<QuestionWithChoices> {
        let exam = store::exams::get_visible(&self.pool, exam_id)
            .await?
            .ok_or_else(|| Error::NotFound("Exam not found".to_string()))?;

        let set: Vec<(String, bool)> = payload
            .choices
            .iter()
            .map(|c| (c.text.clone(), c.is_correct))
            .collect();
        validate_choice_set(payload.kind, &set)?;

        let mut tx = self.pool.begin().await?;
        let question =
            store::questions::insert(&mut *tx, exam.id, payload.title.trim(), payload.kind)
                .await?;
        let mut choices = Vec::with_capacity(set.len());
        for (text, is_correct) in &set {
            choices
                .push(store::questions::insert_choice(&mut *tx, question.id, text, *is_correct).await?);
        }
        tx.commit().await?;

        tracing::info!(question_id = %question.id, exam_id = %exam.id, "Question created");
        Ok(QuestionWithChoices { question, choices })
    }

    pub async fn list_questions(&self, exam_id: Uuid) -> Result<Vec<QuestionWithChoices>> {
        store::exams::get_visible(&self.pool, exam_id)
            .await?
            .ok_or_else(|| Error::NotFound("Exam not found".to_string()))?;
        store::questions::list_visible_with_choices(&self.pool, exam_id).await
    }

    pub async fn update_question(
        &self,
        question_id: Uuid,
        payload: UpdateQuestionRequest,
    ) -> Result<QuestionWithChoices> {
        let question = store::questions::get_visible(&self.pool, question_id)
            .await?
            .ok_or_else(|| Error::NotFound("Question not found".to_string()))?;

        if payload.is_empty() {
            return Err(Error::NoFieldsChanged);
        }

        let existing = store::questions::list_visible_choices(&self.pool, question_id).await?;
        let kind = payload.kind.unwrap_or(question.kind);

        // The type rule is checked against the set as it will exist after
        // the update, not against the delta.
        let plan = match &payload.choices {
            Some(entries) => {
                let plan = plan_reconciliation(&existing, entries)?;
                validate_choice_set(kind, &plan.final_set())?;
                Some(plan)
            }
            None => {
                let current: Vec<(String, bool)> = existing
                    .iter()
                    .map(|c| (c.text.clone(), c.is_correct))
                    .collect();
                validate_choice_set(kind, &current)?;
                None
            }
        };

        let mut tx = self.pool.begin().await?;
        let updated = store::questions::update_fields(
            &mut *tx,
            question_id,
            payload.title.as_deref(),
            payload.kind,
        )
        .await?
        .ok_or_else(|| Error::NotFound("Question not found".to_string()))?;

        if let Some(plan) = plan {
            for (id, text, is_correct) in &plan.updates {
                store::questions::update_choice(&mut *tx, *id, text, *is_correct).await?;
            }
            for (text, is_correct) in &plan.inserts {
                store::questions::insert_choice(&mut *tx, question_id, text, *is_correct).await?;
            }
            store::questions::soft_delete_choices(&mut *tx, &plan.deletes).await?;
        }
        tx.commit().await?;

        let choices = store::questions::list_visible_choices(&self.pool, question_id).await?;
        tracing::info!(question_id = %question_id, "Question updated");
        Ok(QuestionWithChoices {
            question: updated,
            choices,
        })
    }

    pub async fn delete_question(&self, question_id: Uuid) -> Result<()> {
        let question = store::questions::get_visible(&self.pool, question_id)
            .await?
            .ok_or_else(|| Error::NotFound("Question not found".to_string()))?;

        let mut tx = self.pool.begin().await?;
        store::questions::soft_delete(&mut *tx, question.id).await?;
        store::questions::soft_delete_choices_by_question(&mut *tx, question.id).await?;
        tx.commit().await?;

        tracing::info!(question_id = %question.id, "Question soft-deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn set(entries: &[(&str, bool)]) -> Vec<(String, bool)> {
        entries
            .iter()
            .map(|(text, is_correct)| (text.to_string(), *is_correct))
            .collect()
    }

    fn choice(text: &str, is_correct: bool) -> Choice {
        let now = Utc::now();
        Choice {
            id: Uuid::new_v4(),
            question_id: Uuid::new_v4(),
            text: text.to_string(),
            is_correct,
            is_deleted: false,
            deleted_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn single_correct_requires_exactly_one() {
        let kind = QuestionKind::SingleCorrect;
        assert!(validate_choice_set(kind, &set(&[("a", true), ("b", false)])).is_ok());
        assert!(matches!(
            validate_choice_set(kind, &set(&[("a", true), ("b", true)])),
            Err(Error::InvalidCorrectCount(_))
        ));
        assert!(matches!(
            validate_choice_set(kind, &set(&[("a", false), ("b", false)])),
            Err(Error::InvalidCorrectCount(_))
        ));
    }

    #[test]
    fn multi_select_requires_at_least_one() {
        let kind = QuestionKind::MultiSelect;
        assert!(validate_choice_set(kind, &set(&[("a", true), ("b", true)])).is_ok());
        assert!(validate_choice_set(kind, &set(&[("a", true), ("b", false)])).is_ok());
        assert!(matches!(
            validate_choice_set(kind, &set(&[("a", false), ("b", false)])),
            Err(Error::InvalidCorrectCount(_))
        ));
    }

    #[test]
    fn choice_count_bounds() {
        let kind = QuestionKind::MultiSelect;
        assert!(matches!(
            validate_choice_set(kind, &set(&[("a", true)])),
            Err(Error::InvalidChoiceCount(1))
        ));

        let mut eleven: Vec<(String, bool)> =
            (0..11).map(|i| (format!("choice {}", i), false)).collect();
        eleven[0].1 = true;
        assert!(matches!(
            validate_choice_set(kind, &eleven),
            Err(Error::InvalidChoiceCount(11))
        ));

        let mut ten: Vec<(String, bool)> =
            (0..10).map(|i| (format!("choice {}", i), false)).collect();
        ten[0].1 = true;
        assert!(validate_choice_set(kind, &ten).is_ok());
    }

    #[test]
    fn duplicate_text_is_case_insensitive() {
        let kind = QuestionKind::MultiSelect;
        assert!(matches!(
            validate_choice_set(kind, &set(&[("Paris", true), ("paris", false)])),
            Err(Error::DuplicateChoiceText(_))
        ));
        assert!(matches!(
            validate_choice_set(kind, &set(&[("Paris ", true), ("paris", false)])),
            Err(Error::DuplicateChoiceText(_))
        ));
    }

    #[test]
    fn blank_choice_text_is_rejected() {
        assert!(matches!(
            validate_choice_set(QuestionKind::MultiSelect, &set(&[("a", true), ("  ", false)])),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn reconciliation_splits_updates_inserts_and_deletes() {
        let kept = choice("stays", true);
        let dropped = choice("goes", false);
        let payload = vec![
            ChoiceUpsert {
                id: Some(kept.id),
                text: "stays, renamed".to_string(),
                is_correct: true,
            },
            ChoiceUpsert {
                id: None,
                text: "brand new".to_string(),
                is_correct: false,
            },
        ];

        let plan = plan_reconciliation(&[kept.clone(), dropped.clone()], &payload).unwrap();
        assert_eq!(plan.updates.len(), 1);
        assert_eq!(plan.updates[0].0, kept.id);
        assert_eq!(plan.updates[0].1, "stays, renamed");
        assert_eq!(plan.inserts, vec![("brand new".to_string(), false)]);
        assert_eq!(plan.deletes, vec![dropped.id]);

        let final_set = plan.final_set();
        assert_eq!(final_set.len(), 2);
    }

    #[test]
    fn unknown_choice_id_is_rejected() {
        let existing = vec![choice("a", true)];
        let payload = vec![ChoiceUpsert {
            id: Some(Uuid::new_v4()),
            text: "phantom".to_string(),
            is_correct: false,
        }];
        assert!(matches!(
            plan_reconciliation(&existing, &payload),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn empty_payload_deletes_everything() {
        let existing = vec![choice("a", true), choice("b", false)];
        let plan = plan_reconciliation(&existing, &[]).unwrap();
        assert!(plan.updates.is_empty());
        assert!(plan.inserts.is_empty());
        assert_eq!(plan.deletes.len(), 2);
        // The resulting set would be empty, which the count rule rejects.
        assert!(matches!(
            validate_choice_set(QuestionKind::MultiSelect, &plan.final_set()),
            Err(Error::InvalidChoiceCount(0))
        ));
    }
}
