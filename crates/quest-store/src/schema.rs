//! DDL and additive migrations for the quest store.
//!
//! `init_schema` is `CREATE TABLE IF NOT EXISTS` for the full schema;
//! `run_migrations` is a fixed, append-only list of `ALTER TABLE`
//! statements run best-effort on every startup. A migration failing because
//! the column already exists is expected and swallowed at `debug` level —
//! that's load-bearing, not a bug.

use rusqlite::Connection;

use quest_core::Result;

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY,
            display_name TEXT NOT NULL,
            handle TEXT,
            is_blocked INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS steps (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            step_order INTEGER NOT NULL,
            text TEXT NOT NULL,
            answer_type TEXT NOT NULL,
            has_auto_check INTEGER NOT NULL DEFAULT 0,
            is_active INTEGER NOT NULL DEFAULT 1,
            is_deleted INTEGER NOT NULL DEFAULT 0,
            is_asterisk INTEGER NOT NULL DEFAULT 0,
            hint_text TEXT,
            hint_image_file_id TEXT,
            created_at TEXT NOT NULL
        );

        -- step_order is unique only among non-deleted steps.
        CREATE UNIQUE INDEX IF NOT EXISTS idx_steps_order_active
            ON steps(step_order) WHERE is_deleted = 0;

        CREATE TABLE IF NOT EXISTS step_images (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            step_id INTEGER NOT NULL REFERENCES steps(id),
            file_id TEXT NOT NULL,
            position INTEGER NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_step_images_step ON step_images(step_id);

        CREATE TABLE IF NOT EXISTS step_answers (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            step_id INTEGER NOT NULL REFERENCES steps(id),
            text TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_step_answers_step ON step_answers(step_id);

        CREATE TABLE IF NOT EXISTS user_progress (
            user_id INTEGER NOT NULL,
            step_id INTEGER NOT NULL,
            status TEXT NOT NULL,
            completed_at TEXT,
            PRIMARY KEY (user_id, step_id)
        );
        CREATE INDEX IF NOT EXISTS idx_user_progress_user ON user_progress(user_id);
        CREATE INDEX IF NOT EXISTS idx_user_progress_step ON user_progress(step_id, status);

        CREATE TABLE IF NOT EXISTS user_answers (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL,
            step_id INTEGER NOT NULL,
            text_answer TEXT,
            hint_used INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_user_answers_user ON user_answers(user_id, created_at);
        CREATE INDEX IF NOT EXISTS idx_user_answers_step ON user_answers(step_id);

        CREATE TABLE IF NOT EXISTS answer_images (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_answer_id INTEGER NOT NULL REFERENCES user_answers(id),
            file_id TEXT NOT NULL,
            position INTEGER NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_answer_images_answer ON answer_images(user_answer_id);

        CREATE TABLE IF NOT EXISTS user_chat_state (
            user_id INTEGER NOT NULL,
            key TEXT NOT NULL,
            value TEXT NOT NULL,
            PRIMARY KEY (user_id, key)
        );

        CREATE TABLE IF NOT EXISTS admin_state (
            admin_id INTEGER NOT NULL,
            key TEXT NOT NULL,
            value TEXT NOT NULL,
            PRIMARY KEY (admin_id, key)
        );

        CREATE TABLE IF NOT EXISTS admin_messages (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            admin_id INTEGER NOT NULL,
            text TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS settings (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS sticker_packs (
            name TEXT PRIMARY KEY,
            file_id TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS achievements (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            key TEXT NOT NULL UNIQUE,
            name TEXT NOT NULL,
            description TEXT NOT NULL,
            category TEXT NOT NULL,
            kind TEXT NOT NULL,
            is_unique INTEGER NOT NULL DEFAULT 0,
            conditions TEXT NOT NULL,
            is_active INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_achievements_key ON achievements(key);
        CREATE INDEX IF NOT EXISTS idx_achievements_category ON achievements(category);

        CREATE TABLE IF NOT EXISTS user_achievements (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL,
            achievement_id INTEGER NOT NULL,
            earned_at TEXT NOT NULL,
            is_retroactive INTEGER NOT NULL DEFAULT 0,
            UNIQUE (user_id, achievement_id)
        );
        CREATE INDEX IF NOT EXISTS idx_user_achievements_user ON user_achievements(user_id);
        CREATE INDEX IF NOT EXISTS idx_user_achievements_achievement ON user_achievements(achievement_id);
        CREATE INDEX IF NOT EXISTS idx_user_achievements_earned_at ON user_achievements(earned_at);
        "#,
    )?;

    Ok(())
}

/// Additive migrations, in the order they must run. Each entry is applied
/// with errors swallowed: a column that already exists is not a failure.
const MIGRATIONS: &[&str] = &[
    // New columns are appended here, never by editing init_schema's CREATE
    // TABLE statements, so existing on-disk databases upgrade in place.
    "ALTER TABLE steps ADD COLUMN hint_text TEXT",
    "ALTER TABLE steps ADD COLUMN hint_image_file_id TEXT",
];

pub fn run_migrations(conn: &Connection) {
    for migration in MIGRATIONS {
        if let Err(err) = conn.execute(migration, []) {
            tracing::debug!(migration, error = %err, "quest-store: migration skipped (likely already applied)");
        }
    }
}
