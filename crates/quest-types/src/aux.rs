//! Auxiliary single-row-per-key state used by the external messaging
//! adapter. `quest-engine` never reads any of these; they are specified
//! here only as typed key/value stores.

use serde::{Deserialize, Serialize};

/// Per-user conversational state the adapter persists between messages
/// (e.g. "awaiting answer for step 7").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatState {
    pub user_id: i64,
    pub key: String,
    pub value: String,
}

/// Per-admin scratch state (e.g. "currently editing step 3").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminState {
    pub admin_id: i64,
    pub key: String,
    pub value: String,
}

/// A message an admin queued for broadcast or moderation review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminMessage {
    pub id: i64,
    pub admin_id: i64,
    pub text: String,
}

/// A plain-text key/value setting. No schema is enforced on `value`; the
/// catalog of well-known keys (`welcome_message`, `quest_state`, ...) is
/// defined by the seed step, not by this type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub key: String,
    pub value: String,
}

/// A generated sticker pack reference, keyed by name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StickerPack {
    pub name: String,
    pub file_id: String,
}
