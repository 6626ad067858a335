use thiserror::Error;

/// Crate-wide error type for the queue, the store, and the achievement
/// engine. Repositories never log; they propagate one of these instead.
#[derive(Debug, Error)]
pub enum QuestError {
    /// A `rusqlite` call failed. Retried up to `Queue`'s attempt budget
    /// before reaching here.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// A single-row fetch found nothing. The engine discriminates this from
    /// every other error to decide "first assignment" vs. "fatal".
    #[error("not found")]
    NotFound,

    /// A constraint was violated deliberately (e.g. `user_achievements`
    /// UNIQUE) and the caller did not opt into INSERT-OR-IGNORE semantics.
    #[error("constraint violation: {0}")]
    Constraint(String),

    /// `Queue::execute` was called after `Queue::shutdown`. A programmer
    /// error, not recovered.
    #[error("queue is closed")]
    QueueClosed,

    /// `AchievementConditions` failed to (de)serialize.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl QuestError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, QuestError::NotFound)
    }
}
