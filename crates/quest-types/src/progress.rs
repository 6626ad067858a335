use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Where a (user, step) pair sits in its lifecycle.
///
/// Transitions: `Pending -> WaitingReview -> {Approved, Rejected}`; any state
/// can move to `Skipped`, but only for asterisk steps. `Approved` is terminal
/// except for an explicit admin reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressStatus {
    Pending,
    WaitingReview,
    Approved,
    Rejected,
    Skipped,
}

impl ProgressStatus {
    /// Whether this status counts toward "answered".
    pub fn counts_as_answered(self) -> bool {
        matches!(self, ProgressStatus::Approved | ProgressStatus::Skipped)
    }
}

/// One row per (user, step): the current status of that pairing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProgress {
    pub user_id: i64,
    pub step_id: i64,
    pub status: ProgressStatus,
    pub completed_at: Option<DateTime<Utc>>,
}
