use crate::models::question::QuestionKind;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewChoice {
    #[validate(length(min = 1, message = "Choice text must not be empty"))]
    pub text: String,
    #[serde(default)]
    pub is_correct: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AddQuestionRequest {
    #[validate(length(min = 1, message = "Question title must not be empty"))]
    pub title: String,
    pub kind: QuestionKind,
    pub choices: Vec<NewChoice>,
}

/// A choice entry in an update payload. With an id it updates that choice
/// in place; without one it is inserted. Existing choices whose id is
/// absent from the payload are soft-deleted.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ChoiceUpsert {
    pub id: Option<Uuid>,
    #[validate(length(min = 1, message = "Choice text must not be empty"))]
    pub text: String,
    #[serde(default)]
    pub is_correct: bool,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateQuestionRequest {
    // Empty strings are treated as absent so a blank form field cannot
    // wipe the title.
    #[serde(default, deserialize_with = "trim_optional_string")]
    pub title: Option<String>,
    pub kind: Option<QuestionKind>,
    pub choices: Option<Vec<ChoiceUpsert>>,
}

impl UpdateQuestionRequest {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.kind.is_none() && self.choices.is_none()
    }
}

fn trim_optional_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value.and_then(|s| {
        let trimmed = s.trim().to_string();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed)
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_title_deserializes_as_absent() {
        let req: UpdateQuestionRequest =
            serde_json::from_str(r#"{"title": "   "}"#).expect("deserialize");
        assert!(req.title.is_none());
        assert!(req.is_empty());
    }

    #[test]
    fn title_is_trimmed() {
        let req: UpdateQuestionRequest =
            serde_json::from_str(r#"{"title": "  What is Rust?  "}"#).expect("deserialize");
        assert_eq!(req.title.as_deref(), Some("What is Rust?"));
    }
}
