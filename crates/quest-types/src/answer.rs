use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A stored media reference (platform file id), with a stable position
/// within its parent's ordered image list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageRef {
    pub file_id: String,
    pub position: i64,
}

/// An accepted answer string for a step. Stored normalized
/// (`quest_types::normalize_answer`) at write time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepAnswer {
    pub id: i64,
    pub step_id: i64,
    pub text: String,
}

/// One append-only attempt at a step. Never mutated after insert; multiple
/// attempts per (user, step) are expected, only an approved [`crate::UserProgress`]
/// row closes the step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserAnswer {
    pub id: i64,
    pub user_id: i64,
    pub step_id: i64,
    pub text_answer: Option<String>,
    pub hint_used: bool,
    pub created_at: DateTime<Utc>,
    pub images: Vec<ImageRef>,
}

impl UserAnswer {
    pub fn is_image_answer(&self) -> bool {
        !self.images.is_empty()
    }
}
