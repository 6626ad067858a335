//! quest-sdk: the single entry point a messaging adapter embeds.
//!
//! # Overview
//!
//! `quest-sdk` is a thin facade over [`quest_store::Store`] and
//! [`quest_engine::Engine`]. It exists so that an external adapter (a chat
//! bot, an admin surface, a one-off migration script) wires up exactly one
//! type instead of juggling a `Store` and an `Engine` separately, and so
//! that the wiring between "a repository write happened" and "run the
//! matching evaluator" lives in one place rather than being re-derived by
//! every caller.
//!
//! # Quickstart
//!
//! ```no_run
//! use quest_sdk::Quest;
//! use quest_store::{NewStep, StoreConfig};
//! use quest_types::{AnswerType, ProgressStatus};
//!
//! # fn main() -> quest_core::Result<()> {
//! let quest = Quest::open("/var/lib/quest/bot.db", StoreConfig::default())?;
//!
//! let user = quest.store().users.get_or_create(42, "alice".into())?;
//! let step = quest.store().steps.create(NewStep {
//!     text: "What's the capital of France?".into(),
//!     answer_type: AnswerType::Text,
//!     has_auto_check: true,
//!     is_asterisk: false,
//!     answers: vec!["paris".into()],
//! })?;
//!
//! quest.store().answers.record_text(user.id, step.id, "Paris".into(), false)?;
//! quest.store().progress.upsert(user.id, step.id, ProgressStatus::Approved)?;
//!
//! let newly_awarded = quest.engine().on_correct_answer(user.id)?;
//! for key in newly_awarded {
//!     println!("awarded: {key}");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! This facade sits over:
//! - `quest-store`: the `rusqlite` storage layer, entity repositories, and
//!   step/progression logic.
//! - `quest-engine`: the achievement evaluators and event hooks.
//!
//! Both are `Clone` (cheap, `Arc`-backed), so `Quest` is too — an adapter
//! can hand a clone to each of its own concurrent event-handling tasks
//! without any locking of its own; correctness comes from `quest-queue`'s
//! FIFO worker and the `user_achievements` UNIQUE constraint, not from a
//! mutex the facade holds.

mod quest;

pub use quest::Quest;
pub use quest_core::{QuestError, Result};
pub use quest_engine::{Engine, UserState};
pub use quest_store::{NewStep, Store, StoreConfig};
