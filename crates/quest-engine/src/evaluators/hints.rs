//! Hint-usage evaluator: threshold achievements plus the two fixed-semantics
//! keys `hint_master` and `skeptic`.

use chrono::Utc;
use quest_core::Result;
use quest_store::Store;
use quest_types::AchievementCategory;

use crate::award::award_by_key;
use crate::state::UserState;

pub fn evaluate(store: &Store, state: &UserState) -> Result<Vec<String>> {
    let now = Utc::now();
    let mut awarded = Vec::new();

    for achievement in store.achievements.list_by_category(AchievementCategory::Hints)? {
        if state.holds(&achievement.key) {
            continue;
        }

        let qualifies = if let Some(threshold) = achievement.conditions.hint_count {
            state.hints_used >= threshold as i64
        } else if achievement.key == "hint_master" {
            state.active_steps_count > 0 && state.hints_used >= state.active_steps_count
        } else if achievement.key == "skeptic" {
            state.first_answer_used_hint
        } else {
            false
        };

        if qualifies {
            if let Some(key) = award_by_key(store, state.user_id, &achievement.key, now, false)? {
                awarded.push(key);
            }
        }
    }

    Ok(awarded)
}
