//! Retroactive bulk scan: award a single achievement to every user who
//! already qualifies, backdated to the moment they first did.

use chrono::{DateTime, Utc};
use quest_core::Result;
use quest_store::Store;
use quest_types::{Achievement, AchievementKind, ProgressStatus};

use crate::state::UserState;

/// Scan every user for `key` and award it retroactively wherever the user
/// already qualifies. Returns the user ids newly awarded.
pub fn evaluate(store: &Store, key: &str) -> Result<Vec<i64>> {
    let achievement = store.achievements.get_by_key(key.to_string())?;
    let mut newly_awarded = Vec::new();

    for user in store.users.list_all()? {
        let state = UserState::compute(store, user.id)?;
        if state.holds(key) {
            continue;
        }

        let Some(earned_at) = qualifying_moment(store, &achievement, &state)? else {
            continue;
        };

        if store
            .achievements
            .assign(user.id, achievement.id, earned_at, true)?
        {
            newly_awarded.push(user.id);
        }
    }

    Ok(newly_awarded)
}

/// The instant `state`'s user first satisfied `achievement`'s condition, or
/// `None` if they don't qualify at all. For a progress threshold this is
/// the `completed_at` of the Nth approved step in chronological order; for
/// a time-based tier it's the completion moment (the last answer).
fn qualifying_moment(
    store: &Store,
    achievement: &Achievement,
    state: &UserState,
) -> Result<Option<DateTime<Utc>>> {
    match achievement.kind {
        AchievementKind::ProgressBased => {
            let Some(threshold) = achievement.conditions.correct_answers else {
                return Ok(None);
            };
            if state.approved_steps_count < threshold as i64 {
                return Ok(None);
            }
            let mut approved_times: Vec<DateTime<Utc>> = store
                .progress
                .list_by_user(state.user_id)?
                .into_iter()
                .filter(|p| p.status == ProgressStatus::Approved)
                .filter_map(|p| p.completed_at)
                .collect();
            approved_times.sort();
            Ok(approved_times.get(threshold as usize - 1).copied())
        }
        AchievementKind::TimeBased => {
            let Some(limit) = achievement.conditions.completion_time_minutes else {
                return Ok(None);
            };
            if !state.is_completed {
                return Ok(None);
            }
            let time = state.completion_time_minutes.unwrap_or(0);
            if time >= limit as i64 {
                return Ok(None);
            }
            Ok(state.last_answer_time)
        }
        _ => Ok(None),
    }
}
