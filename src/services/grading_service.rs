use crate::models::question::QuestionWithChoices;
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LetterGrade {
    A,
    B,
    C,
    D,
    F,
}

impl LetterGrade {
    pub fn from_percentage(percentage: f64) -> Self {
        if percentage >= 90.0 {
            LetterGrade::A
        } else if percentage >= 80.0 {
            LetterGrade::B
        } else if percentage >= 70.0 {
            LetterGrade::C
        } else if percentage >= 60.0 {
            LetterGrade::D
        } else {
            LetterGrade::F
        }
    }
}

impl fmt::Display for LetterGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LetterGrade::A => "A",
            LetterGrade::B => "B",
            LetterGrade::C => "C",
            LetterGrade::D => "D",
            LetterGrade::F => "F",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GradedAnswer {
    pub question_id: Uuid,
    pub is_correct: bool,
    pub selected: Vec<String>,
    pub correct: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct GradeOutcome {
    pub score: i32,
    pub total_questions: i32,
    pub breakdown: Vec<GradedAnswer>,
}

impl GradeOutcome {
    pub fn percentage(&self) -> f64 {
        if self.total_questions > 0 {
            self.score as f64 / self.total_questions as f64 * 100.0
        } else {
            0.0
        }
    }

    pub fn grade(&self) -> LetterGrade {
        LetterGrade::from_percentage(self.percentage())
    }
}

pub struct GradingService;

impl GradingService {
    /// Grade submitted selections against the exam's questions.
    ///
    /// An answer is correct iff its selected-choice set exactly equals the
    /// question's correct-choice set; a single-correct question is just a
    /// multi-select whose correct set has size one, so one comparison
    /// covers both kinds. Questions absent from `submitted` count as
    /// incorrect, and every exam question counts toward the total.
    pub fn grade(
        questions: &[QuestionWithChoices],
        submitted: &HashMap<Uuid, BTreeSet<Uuid>>,
    ) -> GradeOutcome {
        let mut score = 0;
        let mut breakdown = Vec::with_capacity(questions.len());

        for q in questions {
            let correct_ids: BTreeSet<Uuid> = q
                .choices
                .iter()
                .filter(|c| c.is_correct)
                .map(|c| c.id)
                .collect();

            let chosen = submitted.get(&q.question.id);
            let is_correct = matches!(chosen, Some(set) if *set == correct_ids);
            if is_correct {
                score += 1;
            }

            let selected = match chosen {
                Some(set) => q
                    .choices
                    .iter()
                    .filter(|c| set.contains(&c.id))
                    .map(|c| c.text.clone())
                    .collect(),
                None => Vec::new(),
            };

            breakdown.push(GradedAnswer {
                question_id: q.question.id,
                is_correct,
                selected,
                correct: q
                    .choices
                    .iter()
                    .filter(|c| c.is_correct)
                    .map(|c| c.text.clone())
                    .collect(),
            });
        }

        GradeOutcome {
            score,
            total_questions: questions.len() as i32,
            breakdown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::question::{Choice, Question, QuestionKind};
    use chrono::Utc;

    fn question(kind: QuestionKind, correct: &[&str], wrong: &[&str]) -> QuestionWithChoices {
        let now = Utc::now();
        let question_id = Uuid::new_v4();
        let mut choices = Vec::new();
        for (text, is_correct) in correct
            .iter()
            .map(|t| (*t, true))
            .chain(wrong.iter().map(|t| (*t, false)))
        {
            choices.push(Choice {
                id: Uuid::new_v4(),
                question_id,
                text: text.to_string(),
                is_correct,
                is_deleted: false,
                deleted_at: None,
                created_at: now,
                updated_at: now,
            });
        }
        QuestionWithChoices {
            question: Question {
                id: question_id,
                exam_id: Uuid::new_v4(),
                title: "q".to_string(),
                kind,
                is_deleted: false,
                deleted_at: None,
                created_at: now,
                updated_at: now,
            },
            choices,
        }
    }

    fn correct_ids(q: &QuestionWithChoices) -> BTreeSet<Uuid> {
        q.choices
            .iter()
            .filter(|c| c.is_correct)
            .map(|c| c.id)
            .collect()
    }

    #[test]
    fn exact_match_is_correct_for_both_kinds() {
        let single = question(QuestionKind::SingleCorrect, &["yes"], &["no", "maybe"]);
        let multi = question(QuestionKind::MultiSelect, &["a", "b"], &["c"]);

        let mut submitted = HashMap::new();
        submitted.insert(single.question.id, correct_ids(&single));
        submitted.insert(multi.question.id, correct_ids(&multi));

        let outcome = GradingService::grade(&[single, multi], &submitted);
        assert_eq!(outcome.score, 2);
        assert_eq!(outcome.total_questions, 2);
        assert_eq!(outcome.percentage(), 100.0);
        assert_eq!(outcome.grade(), LetterGrade::A);
        assert!(outcome.breakdown.iter().all(|b| b.is_correct));
    }

    #[test]
    fn proper_subset_is_incorrect() {
        let multi = question(QuestionKind::MultiSelect, &["a", "b"], &["c"]);
        let one_of_two: BTreeSet<Uuid> =
            correct_ids(&multi).into_iter().take(1).collect();

        let mut submitted = HashMap::new();
        submitted.insert(multi.question.id, one_of_two);

        let outcome = GradingService::grade(&[multi], &submitted);
        assert_eq!(outcome.score, 0);
        assert!(!outcome.breakdown[0].is_correct);
    }

    #[test]
    fn superset_is_incorrect() {
        let multi = question(QuestionKind::MultiSelect, &["a", "b"], &["c"]);
        let wrong_extra: Uuid = multi
            .choices
            .iter()
            .find(|c| !c.is_correct)
            .map(|c| c.id)
            .unwrap();
        let mut all = correct_ids(&multi);
        all.insert(wrong_extra);

        let mut submitted = HashMap::new();
        submitted.insert(multi.question.id, all);

        let outcome = GradingService::grade(&[multi], &submitted);
        assert_eq!(outcome.score, 0);
    }

    #[test]
    fn wrong_single_choice_scores_zero() {
        let single = question(QuestionKind::SingleCorrect, &["right"], &["wrong"]);
        let wrong_id = single
            .choices
            .iter()
            .find(|c| !c.is_correct)
            .map(|c| c.id)
            .unwrap();

        let mut submitted = HashMap::new();
        submitted.insert(single.question.id, BTreeSet::from([wrong_id]));

        let outcome = GradingService::grade(&[single], &submitted);
        assert_eq!(outcome.score, 0);
        assert_eq!(outcome.percentage(), 0.0);
        assert_eq!(outcome.grade(), LetterGrade::F);
    }

    #[test]
    fn unanswered_questions_count_toward_total() {
        let q1 = question(QuestionKind::SingleCorrect, &["a"], &["b"]);
        let q2 = question(QuestionKind::SingleCorrect, &["a"], &["b"]);

        let mut submitted = HashMap::new();
        submitted.insert(q1.question.id, correct_ids(&q1));

        let outcome = GradingService::grade(&[q1, q2], &submitted);
        assert_eq!(outcome.score, 1);
        assert_eq!(outcome.total_questions, 2);
        assert_eq!(outcome.percentage(), 50.0);
        let unanswered = &outcome.breakdown[1];
        assert!(!unanswered.is_correct);
        assert!(unanswered.selected.is_empty());
    }

    #[test]
    fn empty_exam_has_zero_percentage() {
        let outcome = GradingService::grade(&[], &HashMap::new());
        assert_eq!(outcome.total_questions, 0);
        assert_eq!(outcome.percentage(), 0.0);
    }

    #[test]
    fn grade_buckets() {
        assert_eq!(LetterGrade::from_percentage(95.0), LetterGrade::A);
        assert_eq!(LetterGrade::from_percentage(90.0), LetterGrade::A);
        assert_eq!(LetterGrade::from_percentage(82.0), LetterGrade::B);
        assert_eq!(LetterGrade::from_percentage(80.0), LetterGrade::B);
        assert_eq!(LetterGrade::from_percentage(71.0), LetterGrade::C);
        assert_eq!(LetterGrade::from_percentage(65.0), LetterGrade::D);
        assert_eq!(LetterGrade::from_percentage(60.0), LetterGrade::D);
        assert_eq!(LetterGrade::from_percentage(59.9), LetterGrade::F);
        assert_eq!(LetterGrade::from_percentage(40.0), LetterGrade::F);
        assert_eq!(LetterGrade::from_percentage(0.0), LetterGrade::F);
    }

    #[test]
    fn breakdown_reports_choice_texts() {
        let single = question(QuestionKind::SingleCorrect, &["right"], &["wrong"]);
        let wrong_id = single
            .choices
            .iter()
            .find(|c| !c.is_correct)
            .map(|c| c.id)
            .unwrap();

        let mut submitted = HashMap::new();
        submitted.insert(single.question.id, BTreeSet::from([wrong_id]));

        let outcome = GradingService::grade(&[single], &submitted);
        assert_eq!(outcome.breakdown[0].selected, vec!["wrong".to_string()]);
        assert_eq!(outcome.breakdown[0].correct, vec!["right".to_string()]);
    }
}
