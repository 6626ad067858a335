//! User directory.

use std::sync::Arc;

use chrono::Utc;
use quest_core::{QuestError, Result};
use quest_queue::Queue;
use quest_types::User;
use rusqlite::{params, OptionalExtension};

use super::parse_ts;

fn row_to_user(row: &rusqlite::Row) -> Result<User> {
    let created_at: String = row.get(4)?;
    Ok(User {
        id: row.get(0)?,
        display_name: row.get(1)?,
        handle: row.get(2)?,
        is_blocked: row.get(3)?,
        created_at: parse_ts(&created_at)?,
    })
}

#[derive(Clone)]
pub struct UserRepository {
    queue: Arc<Queue>,
}

impl UserRepository {
    pub(crate) fn new(queue: Arc<Queue>) -> Self {
        Self { queue }
    }

    /// Create `id` on first contact if it doesn't exist yet, otherwise leave
    /// the existing row untouched and return it. Identity is
    /// platform-assigned; a `User` is never re-created.
    pub fn get_or_create(&self, id: i64, display_name: String) -> Result<User> {
        let now = Utc::now();
        self.queue.execute(move |conn| {
            conn.execute(
                "INSERT OR IGNORE INTO users (id, display_name, is_blocked, created_at) \
                 VALUES (?1, ?2, 0, ?3)",
                params![id, display_name, now.to_rfc3339()],
            )?;
            conn.query_row(
                "SELECT id, display_name, handle, is_blocked, created_at FROM users WHERE id = ?1",
                [id],
                |row| Ok(row_to_user(row)),
            )?
        })
    }

    pub fn get(&self, id: i64) -> Result<Option<User>> {
        self.queue.execute(move |conn| {
            let outer: rusqlite::Result<Result<User>> = conn.query_row(
                "SELECT id, display_name, handle, is_blocked, created_at FROM users WHERE id = ?1",
                [id],
                |row| Ok(row_to_user(row)),
            );
            match outer {
                Ok(inner) => inner.map(Some),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(QuestError::from(e)),
            }
        })
    }

    pub fn set_handle(&self, id: i64, handle: Option<String>) -> Result<()> {
        self.queue.execute(move |conn| {
            conn.execute("UPDATE users SET handle = ?1 WHERE id = ?2", params![handle, id])?;
            Ok(())
        })
    }

    pub fn set_blocked(&self, id: i64, blocked: bool) -> Result<()> {
        self.queue.execute(move |conn| {
            conn.execute("UPDATE users SET is_blocked = ?1 WHERE id = ?2", params![blocked, id])?;
            Ok(())
        })
    }

    pub fn list_all(&self) -> Result<Vec<User>> {
        self.queue.execute(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, display_name, handle, is_blocked, created_at FROM users ORDER BY created_at",
            )?;
            let rows = stmt
                .query_map([], |row| Ok(row_to_user(row)))?
                .collect::<rusqlite::Result<Vec<Result<User>>>>()?
                .into_iter()
                .collect::<Result<Vec<User>>>()?;
            Ok(rows)
        })
    }

    pub fn count_not_blocked(&self) -> Result<i64> {
        self.queue.execute(move |conn| {
            conn.query_row(
                "SELECT count(*) FROM users WHERE is_blocked = 0",
                [],
                |row| row.get(0),
            )
            .map_err(QuestError::from)
        })
    }

    pub fn exists(&self, id: i64) -> Result<bool> {
        self.queue.execute(move |conn| {
            conn.query_row("SELECT 1 FROM users WHERE id = ?1", [id], |_| Ok(()))
                .optional()
                .map(|r| r.is_some())
                .map_err(QuestError::from)
        })
    }
}
