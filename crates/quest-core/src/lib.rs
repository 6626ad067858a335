//! Shared error type and small utilities used across `quest-queue`,
//! `quest-store`, and `quest-engine`.

mod error;

pub use error::QuestError;

pub type Result<T> = std::result::Result<T, QuestError>;
