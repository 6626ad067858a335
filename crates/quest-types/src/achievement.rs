use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::conditions::AchievementConditions;

/// Grouping used for user-facing listing (`list_by_user_and_category`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AchievementCategory {
    Progress,
    Completion,
    Special,
    Hints,
    Composite,
    Unique,
}

/// Which evaluator dispatches on this achievement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AchievementKind {
    ProgressBased,
    TimeBased,
    ActionBased,
    Composite,
    Unique,
    Manual,
}

/// One catalog entry. `key` is the stable identifier evaluators and
/// `required_achievements` reference; `id` is only the storage row id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Achievement {
    pub id: i64,
    pub key: String,
    pub name: String,
    pub description: String,
    pub category: AchievementCategory,
    pub kind: AchievementKind,
    pub is_unique: bool,
    pub conditions: AchievementConditions,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// A recorded award. At most one row per (user_id, achievement_id) — enforced
/// by a UNIQUE constraint at the store, not by application logic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserAchievement {
    pub id: i64,
    pub user_id: i64,
    pub achievement_id: i64,
    pub earned_at: DateTime<Utc>,
    pub is_retroactive: bool,
}
