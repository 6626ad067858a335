use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::answer::ImageRef;

/// How a step's answer is checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerType {
    Text,
    Image,
}

/// One task in the quest.
///
/// `step_order` is unique among non-deleted steps and defines the active
/// ordering; a soft-deleted step (`is_deleted`) never appears in it.
/// `is_asterisk` marks a step the user may skip without answering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    pub id: i64,
    pub step_order: i64,
    pub text: String,
    pub answer_type: AnswerType,
    pub has_auto_check: bool,
    pub is_active: bool,
    pub is_deleted: bool,
    pub is_asterisk: bool,
    pub answers: Vec<String>,
    pub images: Vec<ImageRef>,
    pub hint_text: Option<String>,
    pub hint_image: Option<ImageRef>,
    pub created_at: DateTime<Utc>,
}

impl Step {
    /// Whether the step is part of the live ordering: active, non-deleted.
    pub fn is_in_active_ordering(&self) -> bool {
        self.is_active && !self.is_deleted
    }

    /// `true` iff `candidate`, normalized (lowercase, trimmed), matches one
    /// of this step's accepted answers. Accepted answers are stored already
    /// normalized, so only the candidate needs canonicalizing here.
    pub fn accepts(&self, candidate: &str) -> bool {
        let candidate = crate::normalize_answer(candidate);
        self.answers.iter().any(|a| a == &candidate)
    }
}
