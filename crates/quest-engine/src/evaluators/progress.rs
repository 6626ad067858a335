//! Progress-based evaluator: threshold achievements keyed off
//! `correct_answers` in an achievement's conditions.

use chrono::Utc;
use quest_core::Result;
use quest_store::Store;
use quest_types::AchievementCategory;

use crate::award::award_by_key;
use crate::state::UserState;

/// Award every progress achievement whose `correct_answers` threshold the
/// user has just met or already exceeded and does not yet hold. Every
/// threshold is checked, not just the one the latest approval crossed,
/// so a single catch-up scan after several approvals awards them all.
pub fn evaluate(store: &Store, state: &UserState) -> Result<Vec<String>> {
    let now = Utc::now();
    let mut awarded = Vec::new();

    for achievement in store.achievements.list_by_category(AchievementCategory::Progress)? {
        let Some(threshold) = achievement.conditions.correct_answers else {
            continue;
        };
        if state.holds(&achievement.key) {
            continue;
        }
        if state.approved_steps_count >= threshold as i64 {
            if let Some(key) = award_by_key(store, state.user_id, &achievement.key, now, false)? {
                awarded.push(key);
            }
        }
    }

    Ok(awarded)
}
