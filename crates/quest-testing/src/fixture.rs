use chrono::{DateTime, Utc};
use quest_core::Result;
use quest_store::{NewStep, Store, StoreConfig};
use quest_types::{AnswerType, ImageRef, ProgressStatus, Step, User};

/// An in-memory store plus convenience helpers for building up a quest
/// scenario in a few lines instead of repeating repository calls in every
/// test.
pub struct QuestFixture {
    pub store: Store,
}

impl QuestFixture {
    pub fn new() -> Self {
        Self {
            store: Store::open_in_memory(StoreConfig::for_tests()).unwrap(),
        }
    }

    pub fn add_user(&self, id: i64) -> User {
        self.store.users.get_or_create(id, format!("user-{id}")).unwrap()
    }

    pub fn add_text_step(&self, text: &str, answers: &[&str]) -> Step {
        self.store
            .steps
            .create(NewStep {
                text: text.to_string(),
                answer_type: AnswerType::Text,
                has_auto_check: true,
                is_asterisk: false,
                answers: answers.iter().map(|a| a.to_string()).collect(),
            })
            .unwrap()
    }

    pub fn add_image_step(&self, text: &str) -> Step {
        self.store
            .steps
            .create(NewStep {
                text: text.to_string(),
                answer_type: AnswerType::Image,
                has_auto_check: false,
                is_asterisk: false,
                answers: Vec::new(),
            })
            .unwrap()
    }

    /// Records a text answer then marks the step approved, as if the
    /// text matched on the first try.
    pub fn approve_text(&self, user_id: i64, step_id: i64, text: &str) {
        self.store.answers.record_text(user_id, step_id, text.into(), false).unwrap();
        self.store
            .progress
            .upsert(user_id, step_id, ProgressStatus::Approved)
            .unwrap();
    }

    /// Like [`Self::approve_text`], but stamps `completed_at` as `at`
    /// instead of now, so a test can build a specific approval ordering.
    pub fn approve_text_at(&self, user_id: i64, step_id: i64, text: &str, at: DateTime<Utc>) {
        self.store.answers.record_text(user_id, step_id, text.into(), false).unwrap();
        self.store
            .progress
            .upsert_at(user_id, step_id, ProgressStatus::Approved, at)
            .unwrap();
    }

    pub fn approve_with_hint(&self, user_id: i64, step_id: i64, text: &str) {
        self.store.answers.record_text(user_id, step_id, text.into(), true).unwrap();
        self.store
            .progress
            .upsert(user_id, step_id, ProgressStatus::Approved)
            .unwrap();
    }

    pub fn skip(&self, user_id: i64, step_id: i64) {
        self.store.progress.create_skipped(user_id, step_id).unwrap();
    }

    /// Records an image answer then marks the step approved.
    pub fn approve_image(&self, user_id: i64, step_id: i64, file_id: &str) {
        self.store
            .answers
            .record_image(
                user_id,
                step_id,
                vec![ImageRef { file_id: file_id.to_string(), position: 0 }],
                false,
            )
            .unwrap();
        self.store
            .progress
            .upsert(user_id, step_id, ProgressStatus::Approved)
            .unwrap();
    }

    /// Records a text answer without approving the step (e.g. a rejected
    /// attempt, or to plant a specific-answer string without completing).
    pub fn record_text(&self, user_id: i64, step_id: i64, text: &str) {
        self.store.answers.record_text(user_id, step_id, text.into(), false).unwrap();
    }

    pub fn reject(&self, user_id: i64, step_id: i64) {
        self.store
            .progress
            .upsert(user_id, step_id, ProgressStatus::Rejected)
            .unwrap();
    }

    pub fn held_keys(&self, user_id: i64) -> Result<Vec<String>> {
        let awards = self.store.achievements.list_by_user(user_id)?;
        awards
            .into_iter()
            .map(|ua| self.store.achievements.get_by_id(ua.achievement_id).map(|a| a.key))
            .collect()
    }

    /// Parse a fixed instant for building a specific timeline in a test.
    pub fn at(rfc3339: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(rfc3339).unwrap().with_timezone(&Utc)
    }
}

impl Default for QuestFixture {
    fn default() -> Self {
        Self::new()
    }
}
