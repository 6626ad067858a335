//! Completion evaluators: time-based speed tiers and the fixed action-based
//! completion achievements.

use chrono::Utc;
use quest_core::Result;
use quest_store::Store;
use quest_types::{AchievementCategory, AchievementKind};

use crate::award::award_by_key;
use crate::state::UserState;

/// Time-based speed tiers. At most one is ever awarded per user — the
/// tightest tier that qualifies — so a user who already holds any tier is
/// skipped outright rather than re-evaluated against looser ones.
pub fn evaluate_time_based(store: &Store, state: &UserState) -> Result<Vec<String>> {
    if !state.is_completed {
        return Ok(Vec::new());
    }

    let mut tiers: Vec<_> = store
        .achievements
        .list_by_category(AchievementCategory::Completion)?
        .into_iter()
        .filter(|a| a.kind == AchievementKind::TimeBased)
        .filter_map(|a| a.conditions.completion_time_minutes.map(|t| (t, a.key)))
        .collect();
    tiers.sort_by_key(|(threshold, _)| *threshold);

    if tiers.iter().any(|(_, key)| state.holds(key)) {
        return Ok(Vec::new());
    }

    let Some(time) = state.completion_time_minutes else {
        return Ok(Vec::new());
    };

    let now = Utc::now();
    for (threshold, key) in tiers {
        if time < threshold as i64 {
            return Ok(award_by_key(store, state.user_id, &key, now, false)?
                .into_iter()
                .collect());
        }
    }

    Ok(Vec::new())
}

/// `winner`, `perfect_path`, `self_sufficient`. Unlike the threshold-driven
/// evaluators these three have fixed semantics tied to their catalog key,
/// not a single generic condition field.
pub fn evaluate_action_based(store: &Store, state: &UserState) -> Result<Vec<String>> {
    if !state.is_completed {
        return Ok(Vec::new());
    }

    let now = Utc::now();
    let mut awarded = Vec::new();

    if !state.holds("winner") {
        if let Some(key) = award_by_key(store, state.user_id, "winner", now, false)? {
            awarded.push(key);
        }
    }

    if state.total_answers == state.approved_steps_count && !state.holds("perfect_path") {
        if let Some(key) = award_by_key(store, state.user_id, "perfect_path", now, false)? {
            awarded.push(key);
        }
    }

    if state.hints_used == 0 && !state.holds("self_sufficient") {
        if let Some(key) = award_by_key(store, state.user_id, "self_sufficient", now, false)? {
            awarded.push(key);
        }
    }

    Ok(awarded)
}
