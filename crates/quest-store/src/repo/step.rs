//! Step repository and quest progression logic.

use std::sync::Arc;

use chrono::Utc;
use quest_core::{QuestError, Result};
use quest_queue::Queue;
use quest_types::{AnswerType, ImageRef, Step};
use rusqlite::{params, Connection, OptionalExtension};

use super::parse_ts;

fn answer_type_to_str(t: AnswerType) -> &'static str {
    match t {
        AnswerType::Text => "text",
        AnswerType::Image => "image",
    }
}

fn answer_type_from_str(raw: &str) -> Result<AnswerType> {
    match raw {
        "text" => Ok(AnswerType::Text),
        "image" => Ok(AnswerType::Image),
        other => Err(QuestError::Constraint(format!(
            "unknown answer_type: {other}"
        ))),
    }
}

fn load_answers(conn: &Connection, step_id: i64) -> Result<Vec<String>> {
    let mut stmt = conn.prepare("SELECT text FROM step_answers WHERE step_id = ?1 ORDER BY id")?;
    let rows = stmt
        .query_map([step_id], |row| row.get(0))?
        .collect::<rusqlite::Result<Vec<String>>>()?;
    Ok(rows)
}

fn load_images(conn: &Connection, step_id: i64) -> Result<Vec<ImageRef>> {
    let mut stmt = conn.prepare(
        "SELECT file_id, position FROM step_images WHERE step_id = ?1 ORDER BY position",
    )?;
    let rows = stmt
        .query_map([step_id], |row| {
            Ok(ImageRef {
                file_id: row.get(0)?,
                position: row.get(1)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<ImageRef>>>()?;
    Ok(rows)
}

fn row_to_step(conn: &Connection, row: &rusqlite::Row) -> Result<Step> {
    let id: i64 = row.get(0)?;
    let answer_type: String = row.get(3)?;
    let created_at: String = row.get(10)?;
    let hint_image_file_id: Option<String> = row.get(9)?;

    Ok(Step {
        id,
        step_order: row.get(1)?,
        text: row.get(2)?,
        answer_type: answer_type_from_str(&answer_type)?,
        has_auto_check: row.get(4)?,
        is_active: row.get(5)?,
        is_deleted: row.get(6)?,
        is_asterisk: row.get(7)?,
        answers: load_answers(conn, id)?,
        images: load_images(conn, id)?,
        hint_text: row.get(8)?,
        hint_image: hint_image_file_id.map(|file_id| ImageRef {
            file_id,
            position: 0,
        }),
        created_at: parse_ts(&created_at)?,
    })
}

const STEP_COLUMNS: &str = "id, step_order, text, answer_type, has_auto_check, is_active, \
     is_deleted, is_asterisk, hint_text, hint_image_file_id, created_at";

/// Run a single-row query whose row needs the fallible `row_to_step`
/// conversion. `query_row`'s callback must return a `rusqlite::Result`, so
/// the `QuestError` side of `row_to_step` is carried out-of-band in a nested
/// `Result` and unwrapped here, with `QueryReturnedNoRows` folded into
/// `Ok(None)`.
fn fetch_one_step(conn: &Connection, sql: &str, id: i64) -> Result<Option<Step>> {
    let outer: rusqlite::Result<Result<Step>> =
        conn.query_row(sql, [id], |row| Ok(row_to_step(conn, row)));
    match outer {
        Ok(inner) => inner.map(Some),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(QuestError::from(e)),
    }
}

/// Fields needed to create a new step. `step_order` is assigned by the
/// repository (one past the current max), not by the caller.
#[derive(Debug, Clone)]
pub struct NewStep {
    pub text: String,
    pub answer_type: AnswerType,
    pub has_auto_check: bool,
    pub is_asterisk: bool,
    pub answers: Vec<String>,
}

#[derive(Clone)]
pub struct StepRepository {
    queue: Arc<Queue>,
}

impl StepRepository {
    pub(crate) fn new(queue: Arc<Queue>) -> Self {
        Self { queue }
    }

    pub fn create(&self, new_step: NewStep) -> Result<Step> {
        let now = Utc::now();
        self.queue.execute(move |conn| {
            let next_order: i64 = conn.query_row(
                "SELECT COALESCE(MAX(step_order), 0) + 1 FROM steps WHERE is_deleted = 0",
                [],
                |row| row.get(0),
            )?;

            conn.execute(
                r#"
                INSERT INTO steps
                    (step_order, text, answer_type, has_auto_check, is_active,
                     is_deleted, is_asterisk, created_at)
                VALUES (?1, ?2, ?3, ?4, 1, 0, ?5, ?6)
                "#,
                params![
                    next_order,
                    new_step.text,
                    answer_type_to_str(new_step.answer_type),
                    new_step.has_auto_check,
                    new_step.is_asterisk,
                    now.to_rfc3339(),
                ],
            )?;
            let step_id = conn.last_insert_rowid();

            for answer in &new_step.answers {
                let normalized = quest_types::normalize_answer(answer);
                conn.execute(
                    "INSERT INTO step_answers (step_id, text) VALUES (?1, ?2)",
                    params![step_id, normalized],
                )?;
            }

            fetch_one_step(
                conn,
                &format!("SELECT {STEP_COLUMNS} FROM steps WHERE id = ?1"),
                step_id,
            )?
            .ok_or(QuestError::NotFound)
        })
    }

    pub fn get_by_id(&self, id: i64) -> Result<Step> {
        self.queue.execute(move |conn| {
            fetch_one_step(
                conn,
                &format!("SELECT {STEP_COLUMNS} FROM steps WHERE id = ?1"),
                id,
            )?
            .ok_or(QuestError::NotFound)
        })
    }

    pub fn get_all(&self) -> Result<Vec<Step>> {
        self.queue.execute(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {STEP_COLUMNS} FROM steps WHERE is_deleted = 0 ORDER BY step_order"
            ))?;
            let steps = stmt
                .query_map([], |row| Ok(row_to_step(conn, row)))?
                .collect::<rusqlite::Result<Vec<Result<Step>>>>()?
                .into_iter()
                .collect::<Result<Vec<Step>>>()?;
            Ok(steps)
        })
    }

    pub fn get_active(&self) -> Result<Vec<Step>> {
        self.queue.execute(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {STEP_COLUMNS} FROM steps WHERE is_active = 1 AND is_deleted = 0 \
                 ORDER BY step_order"
            ))?;
            let steps = stmt
                .query_map([], |row| Ok(row_to_step(conn, row)))?
                .collect::<rusqlite::Result<Vec<Result<Step>>>>()?
                .into_iter()
                .collect::<Result<Vec<Step>>>()?;
            Ok(steps)
        })
    }

    pub fn get_max_order(&self) -> Result<i64> {
        self.queue.execute(move |conn| {
            conn.query_row(
                "SELECT COALESCE(MAX(step_order), 0) FROM steps WHERE is_deleted = 0",
                [],
                |row| row.get(0),
            )
            .map_err(QuestError::from)
        })
    }

    pub fn update_text(&self, id: i64, text: String) -> Result<()> {
        self.queue.execute(move |conn| {
            let n = conn.execute("UPDATE steps SET text = ?1 WHERE id = ?2", params![text, id])?;
            if n == 0 {
                return Err(QuestError::NotFound);
            }
            Ok(())
        })
    }

    pub fn soft_delete(&self, id: i64) -> Result<()> {
        self.queue.execute(move |conn| {
            let n = conn.execute(
                "UPDATE steps SET is_deleted = 1, is_active = 0 WHERE id = ?1",
                [id],
            )?;
            if n == 0 {
                return Err(QuestError::NotFound);
            }
            Ok(())
        })
    }

    pub fn set_active(&self, id: i64, active: bool) -> Result<()> {
        self.queue.execute(move |conn| {
            let n =
                conn.execute("UPDATE steps SET is_active = ?1 WHERE id = ?2", params![active, id])?;
            if n == 0 {
                return Err(QuestError::NotFound);
            }
            Ok(())
        })
    }

    pub fn add_image(&self, step_id: i64, file_id: String, position: i64) -> Result<()> {
        self.queue.execute(move |conn| {
            conn.execute(
                "INSERT INTO step_images (step_id, file_id, position) VALUES (?1, ?2, ?3)",
                params![step_id, file_id, position],
            )?;
            Ok(())
        })
    }

    pub fn delete_image(&self, image_id: i64) -> Result<()> {
        self.queue.execute(move |conn| {
            conn.execute("DELETE FROM step_images WHERE id = ?1", [image_id])?;
            Ok(())
        })
    }

    pub fn add_answer(&self, step_id: i64, text: String) -> Result<()> {
        let normalized = quest_types::normalize_answer(&text);
        self.queue.execute(move |conn| {
            conn.execute(
                "INSERT INTO step_answers (step_id, text) VALUES (?1, ?2)",
                params![step_id, normalized],
            )?;
            Ok(())
        })
    }

    pub fn delete_answer(&self, answer_id: i64) -> Result<()> {
        self.queue.execute(move |conn| {
            conn.execute("DELETE FROM step_answers WHERE id = ?1", [answer_id])?;
            Ok(())
        })
    }

    /// The lowest-ordered active, non-deleted step with `step_order >
    /// after_order` that `user_id` has not marked skipped. A single
    /// serialized query: the skip check is a `NOT EXISTS`
    /// subquery, not a separate read-then-filter step.
    pub fn get_next_active(&self, after_order: i64, user_id: i64) -> Result<Option<Step>> {
        self.queue.execute(move |conn| {
            let sql = "SELECT s.id, s.step_order, s.text, s.answer_type, s.has_auto_check, \
                 s.is_active, s.is_deleted, s.is_asterisk, s.hint_text, s.hint_image_file_id, \
                 s.created_at \
                 FROM steps s \
                 WHERE s.is_active = 1 AND s.is_deleted = 0 AND s.step_order > ?1 \
                 AND NOT EXISTS ( \
                     SELECT 1 FROM user_progress p \
                     WHERE p.user_id = ?2 AND p.step_id = s.id AND p.status = 'skipped' \
                 ) \
                 ORDER BY s.step_order ASC LIMIT 1";

            let outer: rusqlite::Result<Result<Step>> =
                conn.query_row(sql, params![after_order, user_id], |row| {
                    Ok(row_to_step(conn, row))
                });
            match outer {
                Ok(inner) => inner.map(Some),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(QuestError::from(e)),
            }
        })
    }

    /// Exchange `a`'s and `b`'s `step_order` atomically. A temporary negative
    /// sentinel dodges the partial-unique-index on `step_order` without
    /// needing SQLite's limited support for deferred unique constraints; the
    /// whole swap runs as one `rusqlite::Transaction`, so no intermediate
    /// state is ever observable by another reader.
    pub fn swap(&self, a: i64, b: i64) -> Result<()> {
        self.queue.execute(move |conn| {
            let tx = conn.unchecked_transaction()?;
            let a_order: i64 =
                tx.query_row("SELECT step_order FROM steps WHERE id = ?1", [a], |r| r.get(0))?;
            let b_order: i64 =
                tx.query_row("SELECT step_order FROM steps WHERE id = ?1", [b], |r| r.get(0))?;

            tx.execute("UPDATE steps SET step_order = -1 WHERE id = ?1", [a])?;
            tx.execute(
                "UPDATE steps SET step_order = ?1 WHERE id = ?2",
                params![a_order, b],
            )?;
            tx.execute(
                "UPDATE steps SET step_order = ?1 WHERE id = ?2",
                params![b_order, a],
            )?;
            tx.commit()?;
            Ok(())
        })
    }

    pub fn can_move_up(&self, id: i64) -> Result<bool> {
        Ok(self.neighbor_id(id, Direction::Up)?.is_some())
    }

    pub fn can_move_down(&self, id: i64) -> Result<bool> {
        Ok(self.neighbor_id(id, Direction::Down)?.is_some())
    }

    pub fn move_up(&self, id: i64) -> Result<()> {
        match self.neighbor_id(id, Direction::Up)? {
            Some(neighbor) => self.swap(id, neighbor),
            None => Ok(()),
        }
    }

    pub fn move_down(&self, id: i64) -> Result<()> {
        match self.neighbor_id(id, Direction::Down)? {
            Some(neighbor) => self.swap(id, neighbor),
            None => Ok(()),
        }
    }

    fn neighbor_id(&self, id: i64, direction: Direction) -> Result<Option<i64>> {
        self.queue.execute(move |conn| {
            let order: i64 = conn
                .query_row(
                    "SELECT step_order FROM steps WHERE id = ?1 AND is_deleted = 0",
                    [id],
                    |r| r.get(0),
                )
                .optional()?
                .ok_or(QuestError::NotFound)?;

            let query = match direction {
                Direction::Up => {
                    "SELECT id FROM steps WHERE is_deleted = 0 AND step_order < ?1 \
                     ORDER BY step_order DESC LIMIT 1"
                }
                Direction::Down => {
                    "SELECT id FROM steps WHERE is_deleted = 0 AND step_order > ?1 \
                     ORDER BY step_order ASC LIMIT 1"
                }
            };

            conn.query_row(query, [order], |r| r.get(0))
                .optional()
                .map_err(QuestError::from)
        })
    }

    pub fn answered_steps_count(&self, user_id: i64) -> Result<i64> {
        self.queue.execute(move |conn| {
            conn.query_row(
                "SELECT count(*) FROM user_progress WHERE user_id = ?1 \
                 AND status IN ('approved', 'skipped')",
                [user_id],
                |row| row.get(0),
            )
            .map_err(QuestError::from)
        })
    }

    pub fn active_steps_count(&self) -> Result<i64> {
        self.queue.execute(move |conn| {
            conn.query_row(
                "SELECT count(*) FROM steps WHERE is_active = 1 AND is_deleted = 0",
                [],
                |row| row.get(0),
            )
            .map_err(QuestError::from)
        })
    }

    /// "Completed the quest": every active step answered (approved or
    /// skipped) and at least one active step exists.
    pub fn has_completed_quest(&self, user_id: i64) -> Result<bool> {
        let answered = self.answered_steps_count(user_id)?;
        let active = self.active_steps_count()?;
        Ok(active > 0 && answered >= active)
    }
}

#[derive(Clone, Copy)]
enum Direction {
    Up,
    Down,
}
