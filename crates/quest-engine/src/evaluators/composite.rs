//! Composite evaluator: award iff every required achievement is already
//! held and every flag predicate present in the conditions holds.

use chrono::Utc;
use quest_core::Result;
use quest_store::Store;
use quest_types::AchievementCategory;

use crate::award::award_by_key;
use crate::state::UserState;

pub fn evaluate(store: &Store, state: &UserState) -> Result<Vec<String>> {
    let now = Utc::now();
    let mut awarded = Vec::new();

    for achievement in store.achievements.list_by_category(AchievementCategory::Composite)? {
        if state.holds(&achievement.key) {
            continue;
        }

        let conditions = &achievement.conditions;

        let required_held = conditions
            .required_achievements
            .as_ref()
            .is_none_or(|keys| keys.iter().all(|k| state.holds(k)));

        let no_errors_ok = conditions.no_errors != Some(true) || !state.has_ever_rejected;
        let no_hints_ok = conditions.no_hints != Some(true) || state.hints_used == 0;
        let completion_time_ok = match conditions.completion_time_minutes {
            None => true,
            Some(limit) => state.is_completed
                && state.completion_time_minutes.is_some_and(|t| t < limit as i64),
        };

        if required_held && no_errors_ok && no_hints_ok && completion_time_ok {
            if let Some(key) = award_by_key(store, state.user_id, &achievement.key, now, false)? {
                awarded.push(key);
            }
        }
    }

    Ok(awarded)
}
