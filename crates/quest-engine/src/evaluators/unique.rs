//! Unique/position evaluator: exactly one holder forever, the user at rank
//! K by earliest-approved-step timestamp.

use quest_core::Result;
use quest_store::Store;
use quest_types::AchievementCategory;

use crate::award::award_by_key;

/// Global scan: for every active unique achievement with no current holder,
/// rank all users by earliest approved-step timestamp (ties broken by
/// `user_id` ascending) and award the user sitting at that achievement's
/// position, if any. Returns `(user_id, key)` pairs for every new award.
pub fn evaluate(store: &Store) -> Result<Vec<(i64, String)>> {
    let ranking = store.progress.earliest_approved_per_user()?;
    let mut awarded = Vec::new();

    for achievement in store.achievements.list_by_category(AchievementCategory::Unique)? {
        let Some(position) = achievement.conditions.position else {
            continue;
        };
        if store.achievements.holder_count(achievement.id)? > 0 {
            continue;
        }
        let Some((user_id, earned_at)) = ranking.get(position as usize - 1).copied() else {
            continue;
        };
        if award_by_key(store, user_id, &achievement.key, earned_at, false)?.is_some() {
            awarded.push((user_id, achievement.key.clone()));
        }
    }

    Ok(awarded)
}

/// Per-user variant: a no-op once a holder already exists, otherwise the
/// same ranking rule applied only to this one achievement.
pub fn evaluate_for_user(store: &Store, user_id: i64, key: &str) -> Result<Option<String>> {
    let achievement = store.achievements.get_by_key(key.to_string())?;
    let Some(position) = achievement.conditions.position else {
        return Ok(None);
    };
    if store.achievements.holder_count(achievement.id)? > 0 {
        return Ok(None);
    }

    let ranking = store.progress.earliest_approved_per_user()?;
    match ranking.get(position as usize - 1) {
        Some((ranked_user, earned_at)) if *ranked_user == user_id => {
            award_by_key(store, user_id, key, *earned_at, false)
        }
        _ => Ok(None),
    }
}
