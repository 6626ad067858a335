//! Single-writer SQLite persistence for the quest.
//!
//! [`Store`] owns one [`quest_queue::Queue`] and hands out typed repository
//! handles over it; every repository method submits exactly one closure to
//! the queue; two concurrent callers never touch the connection directly.

mod config;
mod repo;
mod schema;
mod seed;

pub use config::StoreConfig;
pub use repo::{
    AchievementRepository, AdminMessageRepository, AdminStateRepository, AnswerRepository,
    ChatStateRepository, ProgressRepository, SettingsRepository, StepRepository,
    StickerPackRepository, UserRepository,
};
pub use repo::step::NewStep;

use std::path::Path;
use std::sync::Arc;

use quest_core::Result;
use quest_queue::Queue;

/// The quest's durable state. Cheap to clone: every field is an `Arc`-backed
/// handle onto the same queue and worker thread.
#[derive(Clone)]
pub struct Store {
    pub users: UserRepository,
    pub steps: StepRepository,
    pub progress: ProgressRepository,
    pub answers: AnswerRepository,
    pub achievements: AchievementRepository,
    pub settings: SettingsRepository,
    pub chat_state: ChatStateRepository,
    pub admin_state: AdminStateRepository,
    pub admin_messages: AdminMessageRepository,
    pub sticker_packs: StickerPackRepository,
}

impl Store {
    pub fn open(path: impl AsRef<Path>, config: StoreConfig) -> Result<Self> {
        let queue = Queue::open(path, config.queue, Self::init)?;
        Ok(Self::from_queue(queue))
    }

    pub fn open_in_memory(config: StoreConfig) -> Result<Self> {
        let queue = Queue::open_in_memory(config.queue, Self::init)?;
        Ok(Self::from_queue(queue))
    }

    /// Runs once on the worker thread before the first task is served:
    /// create any missing tables, apply pending additive migrations, then
    /// seed the built-in achievement catalog and default settings.
    fn init(conn: &rusqlite::Connection) -> Result<()> {
        schema::init_schema(conn)?;
        schema::run_migrations(conn);
        seed::seed_catalog(conn)?;
        seed::seed_settings(conn)?;
        Ok(())
    }

    fn from_queue(queue: Queue) -> Self {
        let queue = Arc::new(queue);
        Self {
            users: UserRepository::new(queue.clone()),
            steps: StepRepository::new(queue.clone()),
            progress: ProgressRepository::new(queue.clone()),
            answers: AnswerRepository::new(queue.clone()),
            achievements: AchievementRepository::new(queue.clone()),
            settings: SettingsRepository::new(queue.clone()),
            chat_state: ChatStateRepository::new(queue.clone()),
            admin_state: AdminStateRepository::new(queue.clone()),
            admin_messages: AdminMessageRepository::new(queue.clone()),
            sticker_packs: StickerPackRepository::new(queue),
        }
    }
}
