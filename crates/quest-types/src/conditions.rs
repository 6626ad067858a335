use serde::{Deserialize, Serialize};

/// A sparse record of optional predicates an achievement may require.
///
/// Every absent field is ignored by every evaluator; this is the
/// self-describing shape that lets `quest-store` add a new predicate without
/// a schema migration — the whole struct round-trips through a single JSON
/// TEXT column.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct AchievementConditions {
    /// Minimum number of approved steps.
    pub correct_answers: Option<u32>,
    /// Completion must be under this many minutes.
    pub completion_time_minutes: Option<u32>,
    /// Completion path has zero rejected/incorrect attempts.
    pub no_errors: Option<bool>,
    /// Zero hints used across the whole quest.
    pub no_hints: Option<bool>,
    /// Minimum number of hint-assisted answers.
    pub hint_count: Option<u32>,
    /// A normalized answer string that must appear somewhere in the user's
    /// answer log (e.g. an easter egg).
    pub specific_answer: Option<String>,
    /// At least one image answer submitted.
    pub photo_submitted: Option<bool>,
    /// Minimum run length of consecutive correct first-try answers.
    pub consecutive_correct: Option<u32>,
    /// 1-based rank among all users, for unique/position achievements.
    pub position: Option<u32>,
    /// Ordered list of achievement keys that must already be held.
    pub required_achievements: Option<Vec<String>>,
    /// The user's very first answer used a hint.
    pub hint_on_first_task: Option<bool>,
    /// Every step that offered a hint was answered using it.
    pub all_hints_used: Option<bool>,
    /// An image answer was submitted on a text-type step.
    pub photo_on_text_task: Option<bool>,
    /// Minimum hours of inactivity (reserved; no evaluator implements this
    /// yet, see DESIGN.md's inactive_hours open question).
    pub inactive_hours: Option<u32>,
    /// The achievement can only be earned after quest completion.
    pub post_completion: Option<bool>,
    /// 1-based rank by completion order (distinct from `position`, which
    /// ranks by earliest-approved-step timestamp).
    pub completion_position: Option<u32>,
    /// The user has had progress reset by an admin at least once.
    pub progress_reset: Option<bool>,
    /// A text answer was submitted on an image-type step.
    pub text_on_image_task: Option<bool>,
    /// Never auto-evaluated; only an explicit admin award sets this.
    pub manual_award: Option<bool>,
}

impl AchievementConditions {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}
