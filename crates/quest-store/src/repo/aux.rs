//! Adapter-facing key/value stores. None of these are read by
//! `quest-engine`; they only give the messaging adapter somewhere durable
//! to keep its own conversational state.

use std::sync::Arc;

use quest_core::{QuestError, Result};
use quest_queue::Queue;
use quest_types::{AdminMessage, AdminState, ChatState, Settings, StickerPack};
use rusqlite::{params, OptionalExtension};

#[derive(Clone)]
pub struct SettingsRepository {
    queue: Arc<Queue>,
}

impl SettingsRepository {
    pub(crate) fn new(queue: Arc<Queue>) -> Self {
        Self { queue }
    }

    pub fn get(&self, key: String) -> Result<Option<String>> {
        self.queue.execute(move |conn| {
            conn.query_row("SELECT value FROM settings WHERE key = ?1", [&key], |row| row.get(0))
                .optional()
                .map_err(QuestError::from)
        })
    }

    pub fn set(&self, key: String, value: String) -> Result<()> {
        self.queue.execute(move |conn| {
            conn.execute(
                "INSERT INTO settings (key, value) VALUES (?1, ?2) \
                 ON CONFLICT (key) DO UPDATE SET value = excluded.value",
                params![key, value],
            )?;
            Ok(())
        })
    }

    pub fn list_all(&self) -> Result<Vec<Settings>> {
        self.queue.execute(move |conn| {
            let mut stmt = conn.prepare("SELECT key, value FROM settings ORDER BY key")?;
            let rows = stmt
                .query_map([], |row| {
                    Ok(Settings {
                        key: row.get(0)?,
                        value: row.get(1)?,
                    })
                })?
                .collect::<rusqlite::Result<Vec<Settings>>>()?;
            Ok(rows)
        })
    }
}

#[derive(Clone)]
pub struct ChatStateRepository {
    queue: Arc<Queue>,
}

impl ChatStateRepository {
    pub(crate) fn new(queue: Arc<Queue>) -> Self {
        Self { queue }
    }

    pub fn get(&self, user_id: i64, key: String) -> Result<Option<String>> {
        self.queue.execute(move |conn| {
            conn.query_row(
                "SELECT value FROM user_chat_state WHERE user_id = ?1 AND key = ?2",
                params![user_id, key],
                |row| row.get(0),
            )
            .optional()
            .map_err(QuestError::from)
        })
    }

    pub fn set(&self, user_id: i64, key: String, value: String) -> Result<()> {
        self.queue.execute(move |conn| {
            conn.execute(
                "INSERT INTO user_chat_state (user_id, key, value) VALUES (?1, ?2, ?3) \
                 ON CONFLICT (user_id, key) DO UPDATE SET value = excluded.value",
                params![user_id, key, value],
            )?;
            Ok(())
        })
    }

    pub fn clear(&self, user_id: i64, key: String) -> Result<()> {
        self.queue.execute(move |conn| {
            conn.execute(
                "DELETE FROM user_chat_state WHERE user_id = ?1 AND key = ?2",
                params![user_id, key],
            )?;
            Ok(())
        })
    }

    pub fn all_for_user(&self, user_id: i64) -> Result<Vec<ChatState>> {
        self.queue.execute(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT user_id, key, value FROM user_chat_state WHERE user_id = ?1",
            )?;
            let rows = stmt
                .query_map([user_id], |row| {
                    Ok(ChatState {
                        user_id: row.get(0)?,
                        key: row.get(1)?,
                        value: row.get(2)?,
                    })
                })?
                .collect::<rusqlite::Result<Vec<ChatState>>>()?;
            Ok(rows)
        })
    }
}

#[derive(Clone)]
pub struct AdminStateRepository {
    queue: Arc<Queue>,
}

impl AdminStateRepository {
    pub(crate) fn new(queue: Arc<Queue>) -> Self {
        Self { queue }
    }

    pub fn get(&self, admin_id: i64, key: String) -> Result<Option<String>> {
        self.queue.execute(move |conn| {
            conn.query_row(
                "SELECT value FROM admin_state WHERE admin_id = ?1 AND key = ?2",
                params![admin_id, key],
                |row| row.get(0),
            )
            .optional()
            .map_err(QuestError::from)
        })
    }

    pub fn set(&self, admin_id: i64, key: String, value: String) -> Result<()> {
        self.queue.execute(move |conn| {
            conn.execute(
                "INSERT INTO admin_state (admin_id, key, value) VALUES (?1, ?2, ?3) \
                 ON CONFLICT (admin_id, key) DO UPDATE SET value = excluded.value",
                params![admin_id, key, value],
            )?;
            Ok(())
        })
    }

    pub fn clear(&self, admin_id: i64, key: String) -> Result<()> {
        self.queue.execute(move |conn| {
            conn.execute(
                "DELETE FROM admin_state WHERE admin_id = ?1 AND key = ?2",
                params![admin_id, key],
            )?;
            Ok(())
        })
    }

    pub fn all_for_admin(&self, admin_id: i64) -> Result<Vec<AdminState>> {
        self.queue.execute(move |conn| {
            let mut stmt =
                conn.prepare("SELECT admin_id, key, value FROM admin_state WHERE admin_id = ?1")?;
            let rows = stmt
                .query_map([admin_id], |row| {
                    Ok(AdminState {
                        admin_id: row.get(0)?,
                        key: row.get(1)?,
                        value: row.get(2)?,
                    })
                })?
                .collect::<rusqlite::Result<Vec<AdminState>>>()?;
            Ok(rows)
        })
    }
}

#[derive(Clone)]
pub struct AdminMessageRepository {
    queue: Arc<Queue>,
}

impl AdminMessageRepository {
    pub(crate) fn new(queue: Arc<Queue>) -> Self {
        Self { queue }
    }

    pub fn queue_message(&self, admin_id: i64, text: String) -> Result<AdminMessage> {
        self.queue.execute(move |conn| {
            conn.execute(
                "INSERT INTO admin_messages (admin_id, text) VALUES (?1, ?2)",
                params![admin_id, text],
            )?;
            let id = conn.last_insert_rowid();
            Ok(AdminMessage {
                id,
                admin_id,
                text: text.clone(),
            })
        })
    }

    pub fn list_pending(&self) -> Result<Vec<AdminMessage>> {
        self.queue.execute(move |conn| {
            let mut stmt =
                conn.prepare("SELECT id, admin_id, text FROM admin_messages ORDER BY id")?;
            let rows = stmt
                .query_map([], |row| {
                    Ok(AdminMessage {
                        id: row.get(0)?,
                        admin_id: row.get(1)?,
                        text: row.get(2)?,
                    })
                })?
                .collect::<rusqlite::Result<Vec<AdminMessage>>>()?;
            Ok(rows)
        })
    }

    pub fn delete(&self, id: i64) -> Result<()> {
        self.queue.execute(move |conn| {
            conn.execute("DELETE FROM admin_messages WHERE id = ?1", [id])?;
            Ok(())
        })
    }
}

#[derive(Clone)]
pub struct StickerPackRepository {
    queue: Arc<Queue>,
}

impl StickerPackRepository {
    pub(crate) fn new(queue: Arc<Queue>) -> Self {
        Self { queue }
    }

    pub fn set(&self, name: String, file_id: String) -> Result<()> {
        self.queue.execute(move |conn| {
            conn.execute(
                "INSERT INTO sticker_packs (name, file_id) VALUES (?1, ?2) \
                 ON CONFLICT (name) DO UPDATE SET file_id = excluded.file_id",
                params![name, file_id],
            )?;
            Ok(())
        })
    }

    pub fn get(&self, name: String) -> Result<Option<StickerPack>> {
        self.queue.execute(move |conn| {
            conn.query_row(
                "SELECT name, file_id FROM sticker_packs WHERE name = ?1",
                [&name],
                |row| {
                    Ok(StickerPack {
                        name: row.get(0)?,
                        file_id: row.get(1)?,
                    })
                },
            )
            .optional()
            .map_err(QuestError::from)
        })
    }
}
