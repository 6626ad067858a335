pub mod achievement;
pub mod answer;
pub mod aux;
pub mod progress;
pub mod step;
pub mod user;

pub use achievement::AchievementRepository;
pub use answer::AnswerRepository;
pub use aux::{AdminMessageRepository, AdminStateRepository, ChatStateRepository, SettingsRepository, StickerPackRepository};
pub use progress::ProgressRepository;
pub use step::StepRepository;
pub use user::UserRepository;

use chrono::{DateTime, Utc};
use quest_core::{QuestError, Result};

/// Parse an RFC3339 timestamp stored in a TEXT column. Centralized so every
/// repository agrees on one failure mode for a corrupt timestamp.
pub(crate) fn parse_ts(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| QuestError::Constraint(format!("invalid timestamp: {raw}")))
}
