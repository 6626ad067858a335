//! Append-only answer attempt log.

use std::sync::Arc;

use chrono::Utc;
use quest_core::{QuestError, Result};
use quest_queue::Queue;
use quest_types::{ImageRef, UserAnswer};
use rusqlite::{params, Connection};

use super::parse_ts;

fn load_answer_images(conn: &Connection, user_answer_id: i64) -> Result<Vec<ImageRef>> {
    let mut stmt = conn.prepare(
        "SELECT file_id, position FROM answer_images WHERE user_answer_id = ?1 ORDER BY position",
    )?;
    let rows = stmt
        .query_map([user_answer_id], |row| {
            Ok(ImageRef {
                file_id: row.get(0)?,
                position: row.get(1)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<ImageRef>>>()?;
    Ok(rows)
}

fn row_to_answer(conn: &Connection, row: &rusqlite::Row) -> Result<UserAnswer> {
    let id: i64 = row.get(0)?;
    let created_at: String = row.get(4)?;
    Ok(UserAnswer {
        id,
        user_id: row.get(1)?,
        step_id: row.get(2)?,
        text_answer: row.get(3)?,
        hint_used: row.get(5)?,
        created_at: parse_ts(&created_at)?,
        images: load_answer_images(conn, id)?,
    })
}

const ANSWER_COLUMNS: &str = "id, user_id, step_id, text_answer, created_at, hint_used";

#[derive(Clone)]
pub struct AnswerRepository {
    queue: Arc<Queue>,
}

impl AnswerRepository {
    pub(crate) fn new(queue: Arc<Queue>) -> Self {
        Self { queue }
    }

    /// Record one attempt. Normalizes `text` at write time
    /// (`quest_types::normalize_answer`) so every later comparison reads a
    /// consistent form back out.
    pub fn record_text(&self, user_id: i64, step_id: i64, text: String, hint_used: bool) -> Result<UserAnswer> {
        let normalized = quest_types::normalize_answer(&text);
        let now = Utc::now();
        self.queue.execute(move |conn| {
            conn.execute(
                "INSERT INTO user_answers (user_id, step_id, text_answer, hint_used, created_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![user_id, step_id, normalized, hint_used, now.to_rfc3339()],
            )?;
            let id = conn.last_insert_rowid();
            conn.query_row(
                &format!("SELECT {ANSWER_COLUMNS} FROM user_answers WHERE id = ?1"),
                [id],
                |row| Ok(row_to_answer(conn, row)),
            )?
        })
    }

    pub fn record_image(
        &self,
        user_id: i64,
        step_id: i64,
        images: Vec<ImageRef>,
        hint_used: bool,
    ) -> Result<UserAnswer> {
        let now = Utc::now();
        self.queue.execute(move |conn| {
            conn.execute(
                "INSERT INTO user_answers (user_id, step_id, text_answer, hint_used, created_at) \
                 VALUES (?1, ?2, NULL, ?3, ?4)",
                params![user_id, step_id, hint_used, now.to_rfc3339()],
            )?;
            let id = conn.last_insert_rowid();
            for image in &images {
                conn.execute(
                    "INSERT INTO answer_images (user_answer_id, file_id, position) VALUES (?1, ?2, ?3)",
                    params![id, image.file_id, image.position],
                )?;
            }
            conn.query_row(
                &format!("SELECT {ANSWER_COLUMNS} FROM user_answers WHERE id = ?1"),
                [id],
                |row| Ok(row_to_answer(conn, row)),
            )?
        })
    }

    pub fn list_by_user(&self, user_id: i64) -> Result<Vec<UserAnswer>> {
        self.queue.execute(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {ANSWER_COLUMNS} FROM user_answers WHERE user_id = ?1 ORDER BY created_at"
            ))?;
            let rows = stmt
                .query_map([user_id], |row| Ok(row_to_answer(conn, row)))?
                .collect::<rusqlite::Result<Vec<Result<UserAnswer>>>>()?
                .into_iter()
                .collect::<Result<Vec<UserAnswer>>>()?;
            Ok(rows)
        })
    }

    pub fn count_for_user(&self, user_id: i64) -> Result<i64> {
        self.queue.execute(move |conn| {
            conn.query_row(
                "SELECT count(*) FROM user_answers WHERE user_id = ?1",
                [user_id],
                |row| row.get(0),
            )
            .map_err(QuestError::from)
        })
    }

    pub fn hint_count_for_user(&self, user_id: i64) -> Result<i64> {
        self.queue.execute(move |conn| {
            conn.query_row(
                "SELECT count(*) FROM user_answers WHERE user_id = ?1 AND hint_used = 1",
                [user_id],
                |row| row.get(0),
            )
            .map_err(QuestError::from)
        })
    }

    /// First and last answer timestamps for `user_id`, used by the
    /// time-based evaluator to compute completion duration.
    pub fn answer_time_span(&self, user_id: i64) -> Result<Option<(chrono::DateTime<Utc>, chrono::DateTime<Utc>)>> {
        self.queue.execute(move |conn| {
            let bounds: Option<(String, String)> = conn
                .query_row(
                    "SELECT min(created_at), max(created_at) FROM user_answers WHERE user_id = ?1",
                    [user_id],
                    |row| {
                        let first: Option<String> = row.get(0)?;
                        let last: Option<String> = row.get(1)?;
                        Ok(first.zip(last))
                    },
                )?;
            bounds
                .map(|(first, last)| Ok((parse_ts(&first)?, parse_ts(&last)?)))
                .transpose()
        })
    }
}
