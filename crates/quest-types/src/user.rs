use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A quest participant.
///
/// Identity is assigned by the messaging platform, not by this crate: a
/// `User` row is created on first contact and is never deleted afterwards.
/// Blocking a user only sets `is_blocked`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub display_name: String,
    pub handle: Option<String>,
    pub is_blocked: bool,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(id: i64, display_name: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            display_name: display_name.into(),
            handle: None,
            is_blocked: false,
            created_at,
        }
    }
}
