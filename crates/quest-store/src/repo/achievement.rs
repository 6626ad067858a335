//! Achievement catalog and award ledger.

use std::sync::Arc;

use chrono::Utc;
use quest_core::{QuestError, Result};
use quest_queue::Queue;
use quest_types::{Achievement, AchievementCategory, AchievementConditions, AchievementKind, UserAchievement};
use rusqlite::{params, Connection, OptionalExtension};

use super::parse_ts;

pub(crate) fn category_to_str(c: AchievementCategory) -> &'static str {
    match c {
        AchievementCategory::Progress => "progress",
        AchievementCategory::Completion => "completion",
        AchievementCategory::Special => "special",
        AchievementCategory::Hints => "hints",
        AchievementCategory::Composite => "composite",
        AchievementCategory::Unique => "unique",
    }
}

fn category_from_str(raw: &str) -> Result<AchievementCategory> {
    match raw {
        "progress" => Ok(AchievementCategory::Progress),
        "completion" => Ok(AchievementCategory::Completion),
        "special" => Ok(AchievementCategory::Special),
        "hints" => Ok(AchievementCategory::Hints),
        "composite" => Ok(AchievementCategory::Composite),
        "unique" => Ok(AchievementCategory::Unique),
        other => Err(QuestError::Constraint(format!("unknown achievement category: {other}"))),
    }
}

pub(crate) fn kind_to_str(k: AchievementKind) -> &'static str {
    match k {
        AchievementKind::ProgressBased => "progress_based",
        AchievementKind::TimeBased => "time_based",
        AchievementKind::ActionBased => "action_based",
        AchievementKind::Composite => "composite",
        AchievementKind::Unique => "unique",
        AchievementKind::Manual => "manual",
    }
}

fn kind_from_str(raw: &str) -> Result<AchievementKind> {
    match raw {
        "progress_based" => Ok(AchievementKind::ProgressBased),
        "time_based" => Ok(AchievementKind::TimeBased),
        "action_based" => Ok(AchievementKind::ActionBased),
        "composite" => Ok(AchievementKind::Composite),
        "unique" => Ok(AchievementKind::Unique),
        "manual" => Ok(AchievementKind::Manual),
        other => Err(QuestError::Constraint(format!("unknown achievement kind: {other}"))),
    }
}

const ACHIEVEMENT_COLUMNS: &str =
    "id, key, name, description, category, kind, is_unique, conditions, is_active, created_at";

fn row_to_achievement(row: &rusqlite::Row) -> Result<Achievement> {
    let category: String = row.get(4)?;
    let kind: String = row.get(5)?;
    let conditions_json: String = row.get(7)?;
    let created_at: String = row.get(9)?;

    Ok(Achievement {
        id: row.get(0)?,
        key: row.get(1)?,
        name: row.get(2)?,
        description: row.get(3)?,
        category: category_from_str(&category)?,
        kind: kind_from_str(&kind)?,
        is_unique: row.get(6)?,
        conditions: AchievementConditions::from_json(&conditions_json)?,
        is_active: row.get(8)?,
        created_at: parse_ts(&created_at)?,
    })
}

fn fetch_one_achievement(conn: &Connection, sql: &str, id: i64) -> Result<Option<Achievement>> {
    let outer: rusqlite::Result<Result<Achievement>> =
        conn.query_row(sql, [id], |row| Ok(row_to_achievement(row)));
    match outer {
        Ok(inner) => inner.map(Some),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(QuestError::from(e)),
    }
}

fn row_to_user_achievement(row: &rusqlite::Row) -> Result<UserAchievement> {
    let earned_at: String = row.get(3)?;
    Ok(UserAchievement {
        id: row.get(0)?,
        user_id: row.get(1)?,
        achievement_id: row.get(2)?,
        earned_at: parse_ts(&earned_at)?,
        is_retroactive: row.get(4)?,
    })
}

#[derive(Clone)]
pub struct AchievementRepository {
    queue: Arc<Queue>,
}

impl AchievementRepository {
    pub(crate) fn new(queue: Arc<Queue>) -> Self {
        Self { queue }
    }

    pub fn get_by_key(&self, key: String) -> Result<Achievement> {
        self.queue.execute(move |conn| {
            let outer: rusqlite::Result<Result<Achievement>> = conn.query_row(
                &format!("SELECT {ACHIEVEMENT_COLUMNS} FROM achievements WHERE key = ?1"),
                [&key],
                |row| Ok(row_to_achievement(row)),
            );
            match outer {
                Ok(inner) => inner,
                Err(rusqlite::Error::QueryReturnedNoRows) => Err(QuestError::NotFound),
                Err(e) => Err(QuestError::from(e)),
            }
        })
    }

    pub fn get_by_id(&self, id: i64) -> Result<Achievement> {
        self.queue.execute(move |conn| {
            fetch_one_achievement(
                conn,
                &format!("SELECT {ACHIEVEMENT_COLUMNS} FROM achievements WHERE id = ?1"),
                id,
            )?
            .ok_or(QuestError::NotFound)
        })
    }

    pub fn list_active(&self) -> Result<Vec<Achievement>> {
        self.queue.execute(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {ACHIEVEMENT_COLUMNS} FROM achievements WHERE is_active = 1 ORDER BY id"
            ))?;
            let rows = stmt
                .query_map([], |row| Ok(row_to_achievement(row)))?
                .collect::<rusqlite::Result<Vec<Result<Achievement>>>>()?
                .into_iter()
                .collect::<Result<Vec<Achievement>>>()?;
            Ok(rows)
        })
    }

    pub fn list_by_category(&self, category: AchievementCategory) -> Result<Vec<Achievement>> {
        self.queue.execute(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {ACHIEVEMENT_COLUMNS} FROM achievements \
                 WHERE is_active = 1 AND category = ?1 ORDER BY id"
            ))?;
            let rows = stmt
                .query_map([category_to_str(category)], |row| Ok(row_to_achievement(row)))?
                .collect::<rusqlite::Result<Vec<Result<Achievement>>>>()?
                .into_iter()
                .collect::<Result<Vec<Achievement>>>()?;
            Ok(rows)
        })
    }

    /// Award `achievement_id` to `user_id` at `earned_at`. A no-op if already
    /// held: the `(user_id, achievement_id)` UNIQUE constraint makes this
    /// idempotent without a pre-check round trip. Live awards pass
    /// `Utc::now()`; retroactive scans pass the moment the user actually
    /// first qualified.
    pub fn assign(
        &self,
        user_id: i64,
        achievement_id: i64,
        earned_at: chrono::DateTime<Utc>,
        is_retroactive: bool,
    ) -> Result<bool> {
        self.queue.execute(move |conn| {
            let n = conn.execute(
                "INSERT OR IGNORE INTO user_achievements \
                 (user_id, achievement_id, earned_at, is_retroactive) \
                 VALUES (?1, ?2, ?3, ?4)",
                params![user_id, achievement_id, earned_at.to_rfc3339(), is_retroactive],
            )?;
            Ok(n > 0)
        })
    }

    pub fn has(&self, user_id: i64, achievement_id: i64) -> Result<bool> {
        self.queue.execute(move |conn| {
            conn.query_row(
                "SELECT 1 FROM user_achievements WHERE user_id = ?1 AND achievement_id = ?2",
                params![user_id, achievement_id],
                |_| Ok(()),
            )
            .optional()
            .map(|r| r.is_some())
            .map_err(QuestError::from)
        })
    }

    pub fn list_by_user(&self, user_id: i64) -> Result<Vec<UserAchievement>> {
        self.queue.execute(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, user_id, achievement_id, earned_at, is_retroactive \
                 FROM user_achievements WHERE user_id = ?1 ORDER BY earned_at",
            )?;
            let rows = stmt
                .query_map([user_id], |row| Ok(row_to_user_achievement(row)))?
                .collect::<rusqlite::Result<Vec<Result<UserAchievement>>>>()?
                .into_iter()
                .collect::<Result<Vec<UserAchievement>>>()?;
            Ok(rows)
        })
    }

    /// How many users already hold `achievement_id`, in award order. Used by
    /// the unique/position evaluator to find the next free rank.
    pub fn holder_count(&self, achievement_id: i64) -> Result<u32> {
        self.queue.execute(move |conn| {
            conn.query_row(
                "SELECT count(*) FROM user_achievements WHERE achievement_id = ?1",
                [achievement_id],
                |row| row.get(0),
            )
            .map_err(QuestError::from)
        })
    }

    /// Every award row for `achievement_id`, ordered by `earned_at` ascending.
    pub fn holders(&self, achievement_id: i64) -> Result<Vec<UserAchievement>> {
        self.queue.execute(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, user_id, achievement_id, earned_at, is_retroactive \
                 FROM user_achievements WHERE achievement_id = ?1 ORDER BY earned_at ASC",
            )?;
            let rows = stmt
                .query_map([achievement_id], |row| Ok(row_to_user_achievement(row)))?
                .collect::<rusqlite::Result<Vec<Result<UserAchievement>>>>()?
                .into_iter()
                .collect::<Result<Vec<UserAchievement>>>()?;
            Ok(rows)
        })
    }

    /// Every achievement a user holds within one category, ordered by
    /// `earned_at` ascending.
    pub fn list_by_user_and_category(
        &self,
        user_id: i64,
        category: AchievementCategory,
    ) -> Result<Vec<Achievement>> {
        self.queue.execute(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT a.id, a.key, a.name, a.description, a.category, a.kind, \
                 a.is_unique, a.conditions, a.is_active, a.created_at \
                 FROM achievements a \
                 JOIN user_achievements ua ON ua.achievement_id = a.id \
                 WHERE ua.user_id = ?1 AND a.category = ?2 \
                 ORDER BY ua.earned_at ASC"
            ))?;
            let rows = stmt
                .query_map(params![user_id, category_to_str(category)], |row| {
                    Ok(row_to_achievement(row))
                })?
                .collect::<rusqlite::Result<Vec<Result<Achievement>>>>()?
                .into_iter()
                .collect::<Result<Vec<Achievement>>>()?;
            Ok(rows)
        })
    }
}
