use chrono::{DateTime, Utc};
use quest_core::Result;
use quest_store::Store;

/// Look up `key` in the catalog and award it to `user_id` if not already
/// held. Returns `Some(key)` only when this call newly awarded it, so
/// callers can accumulate the awarded-keys list evaluators return.
/// Idempotent: a second call for an already-held key awards nothing.
pub(crate) fn award_by_key(
    store: &Store,
    user_id: i64,
    key: &str,
    earned_at: DateTime<Utc>,
    is_retroactive: bool,
) -> Result<Option<String>> {
    let achievement = store.achievements.get_by_key(key.to_string())?;
    let newly_awarded = store
        .achievements
        .assign(user_id, achievement.id, earned_at, is_retroactive)?;
    Ok(newly_awarded.then(|| key.to_string()))
}
