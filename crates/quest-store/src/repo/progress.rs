//! Per-(user, step) progress tracking.

use std::sync::Arc;

use chrono::Utc;
use quest_core::{QuestError, Result};
use quest_queue::Queue;
use quest_types::{ProgressStatus, UserProgress};
use rusqlite::{params, OptionalExtension};

use super::parse_ts;

fn status_to_str(s: ProgressStatus) -> &'static str {
    match s {
        ProgressStatus::Pending => "pending",
        ProgressStatus::WaitingReview => "waiting_review",
        ProgressStatus::Approved => "approved",
        ProgressStatus::Rejected => "rejected",
        ProgressStatus::Skipped => "skipped",
    }
}

fn status_from_str(raw: &str) -> Result<ProgressStatus> {
    match raw {
        "pending" => Ok(ProgressStatus::Pending),
        "waiting_review" => Ok(ProgressStatus::WaitingReview),
        "approved" => Ok(ProgressStatus::Approved),
        "rejected" => Ok(ProgressStatus::Rejected),
        "skipped" => Ok(ProgressStatus::Skipped),
        other => Err(QuestError::Constraint(format!("unknown progress status: {other}"))),
    }
}

fn row_to_progress(row: &rusqlite::Row) -> Result<UserProgress> {
    let status: String = row.get(2)?;
    let completed_at: Option<String> = row.get(3)?;
    Ok(UserProgress {
        user_id: row.get(0)?,
        step_id: row.get(1)?,
        status: status_from_str(&status)?,
        completed_at: completed_at.map(|ts| parse_ts(&ts)).transpose()?,
    })
}

#[derive(Clone)]
pub struct ProgressRepository {
    queue: Arc<Queue>,
}

impl ProgressRepository {
    pub(crate) fn new(queue: Arc<Queue>) -> Self {
        Self { queue }
    }

    /// Create or overwrite the progress row for `(user_id, step_id)` with
    /// `status`. `completed_at` is stamped only for terminal statuses.
    pub fn upsert(&self, user_id: i64, step_id: i64, status: ProgressStatus) -> Result<()> {
        self.upsert_at(user_id, step_id, status, Utc::now())
    }

    /// Same as [`Self::upsert`], but with an explicit `completed_at` instead
    /// of `Utc::now()`. Lets tests build a specific approval timeline.
    pub fn upsert_at(
        &self,
        user_id: i64,
        step_id: i64,
        status: ProgressStatus,
        at: chrono::DateTime<Utc>,
    ) -> Result<()> {
        self.queue.execute(move |conn| {
            let completed_at = status.counts_as_answered().then(|| at.to_rfc3339());
            conn.execute(
                r#"
                INSERT INTO user_progress (user_id, step_id, status, completed_at)
                VALUES (?1, ?2, ?3, ?4)
                ON CONFLICT (user_id, step_id) DO UPDATE SET
                    status = excluded.status,
                    completed_at = excluded.completed_at
                "#,
                params![user_id, step_id, status_to_str(status), completed_at],
            )?;
            Ok(())
        })
    }

    /// Upsert to `Skipped` with `completed_at` set to now, regardless of
    /// whatever row was there before, except an already-`Approved` row,
    /// which is terminal and never overwritten by a skip.
    pub fn create_skipped(&self, user_id: i64, step_id: i64) -> Result<()> {
        let now = Utc::now();
        self.queue.execute(move |conn| {
            conn.execute(
                r#"
                INSERT INTO user_progress (user_id, step_id, status, completed_at)
                VALUES (?1, ?2, 'skipped', ?3)
                ON CONFLICT (user_id, step_id) DO UPDATE SET
                    status = 'skipped',
                    completed_at = ?3
                WHERE user_progress.status != 'approved'
                "#,
                params![user_id, step_id, now.to_rfc3339()],
            )?;
            Ok(())
        })
    }

    pub fn get(&self, user_id: i64, step_id: i64) -> Result<Option<UserProgress>> {
        self.queue.execute(move |conn| {
            let outer: rusqlite::Result<Result<UserProgress>> = conn.query_row(
                "SELECT user_id, step_id, status, completed_at FROM user_progress \
                 WHERE user_id = ?1 AND step_id = ?2",
                params![user_id, step_id],
                |row| Ok(row_to_progress(row)),
            );
            match outer {
                Ok(inner) => inner.map(Some),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(QuestError::from(e)),
            }
        })
    }

    pub fn list_by_user(&self, user_id: i64) -> Result<Vec<UserProgress>> {
        self.queue.execute(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT user_id, step_id, status, completed_at FROM user_progress \
                 WHERE user_id = ?1",
            )?;
            let rows = stmt
                .query_map([user_id], |row| Ok(row_to_progress(row)))?
                .collect::<rusqlite::Result<Vec<Result<UserProgress>>>>()?
                .into_iter()
                .collect::<Result<Vec<UserProgress>>>()?;
            Ok(rows)
        })
    }

    pub fn count_by_step_and_status(&self, step_id: i64, status: ProgressStatus) -> Result<i64> {
        self.queue.execute(move |conn| {
            conn.query_row(
                "SELECT count(*) FROM user_progress WHERE step_id = ?1 AND status = ?2",
                params![step_id, status_to_str(status)],
                |row| row.get(0),
            )
            .map_err(QuestError::from)
        })
    }

    /// Whether `user_id` ever had a `Rejected` row recorded, i.e. made at
    /// least one incorrect attempt.
    pub fn has_ever_rejected(&self, user_id: i64) -> Result<bool> {
        self.queue.execute(move |conn| {
            conn.query_row(
                "SELECT 1 FROM user_progress WHERE user_id = ?1 AND status = 'rejected'",
                [user_id],
                |_| Ok(()),
            )
            .optional()
            .map(|r| r.is_some())
            .map_err(QuestError::from)
        })
    }

    /// Reset every progress row for `user_id` back to pending (an admin
    /// action). Answer history is left intact.
    pub fn reset_for_user(&self, user_id: i64) -> Result<()> {
        self.queue.execute(move |conn| {
            conn.execute("DELETE FROM user_progress WHERE user_id = ?1", [user_id])?;
            Ok(())
        })
    }

    pub fn count_approved_for_user(&self, user_id: i64) -> Result<i64> {
        self.queue.execute(move |conn| {
            conn.query_row(
                "SELECT count(*) FROM user_progress WHERE user_id = ?1 AND status = 'approved'",
                [user_id],
                |row| row.get(0),
            )
            .map_err(QuestError::from)
        })
    }

    /// Every user's earliest approved-step timestamp, ordered ascending with
    /// ties broken by `user_id` ascending. Backs the unique/position
    /// evaluator's ranking.
    pub fn earliest_approved_per_user(&self) -> Result<Vec<(i64, chrono::DateTime<Utc>)>> {
        self.queue.execute(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT user_id, min(completed_at) AS earliest FROM user_progress \
                 WHERE status = 'approved' GROUP BY user_id ORDER BY earliest ASC, user_id ASC",
            )?;
            let rows = stmt
                .query_map([], |row| {
                    let ts: String = row.get(1)?;
                    Ok((row.get::<_, i64>(0)?, ts))
                })?
                .collect::<rusqlite::Result<Vec<(i64, String)>>>()?;
            rows.into_iter()
                .map(|(uid, ts)| parse_ts(&ts).map(|dt| (uid, dt)))
                .collect()
        })
    }
}
