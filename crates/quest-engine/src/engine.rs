use quest_core::Result;
use quest_store::Store;

use crate::evaluators::{completion, composite, hints, progress, special, unique};
use crate::retroactive;
use crate::state::UserState;

/// The achievement engine. Holds the `quest-store`
/// repositories it needs directly rather than a `Queue` handle — every
/// evaluator call is a handful of repository reads plus `assign` calls,
/// each of which already serializes through the store's own queue.
#[derive(Clone)]
pub struct Engine {
    store: Store,
}

impl Engine {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    #[tracing::instrument(skip(self))]
    pub fn on_correct_answer(&self, user_id: i64) -> Result<Vec<String>> {
        self.evaluate_progress_achievements(user_id)
    }

    /// Runs the composite evaluator to a fixpoint: an award can make another
    /// composite achievement newly eligible (e.g. `super_collector` after
    /// the fifth progress milestone), so this repeats until a pass awards
    /// nothing new.
    #[tracing::instrument(skip(self))]
    pub fn on_achievement_awarded(&self, user_id: i64) -> Result<Vec<String>> {
        let mut all_awarded = Vec::new();
        loop {
            let newly = self.evaluate_composite_achievements(user_id)?;
            if newly.is_empty() {
                break;
            }
            all_awarded.extend(newly);
        }
        Ok(all_awarded)
    }

    #[tracing::instrument(skip(self))]
    pub fn evaluate_progress_achievements(&self, user_id: i64) -> Result<Vec<String>> {
        let state = UserState::compute(&self.store, user_id)?;
        progress::evaluate(&self.store, &state)
    }

    #[tracing::instrument(skip(self))]
    pub fn evaluate_completion_achievements(&self, user_id: i64) -> Result<Vec<String>> {
        let state = UserState::compute(&self.store, user_id)?;
        let mut awarded = completion::evaluate_time_based(&self.store, &state)?;
        awarded.extend(completion::evaluate_action_based(&self.store, &state)?);
        Ok(awarded)
    }

    #[tracing::instrument(skip(self))]
    pub fn evaluate_hint_achievements(&self, user_id: i64) -> Result<Vec<String>> {
        let state = UserState::compute(&self.store, user_id)?;
        hints::evaluate(&self.store, &state)
    }

    #[tracing::instrument(skip(self))]
    pub fn evaluate_special_achievements(&self, user_id: i64) -> Result<Vec<String>> {
        let state = UserState::compute(&self.store, user_id)?;
        special::evaluate(&self.store, &state)
    }

    /// Global: every active unique/position achievement, against every user.
    #[tracing::instrument(skip(self))]
    pub fn evaluate_unique_achievements(&self) -> Result<Vec<(i64, String)>> {
        unique::evaluate(&self.store)
    }

    #[tracing::instrument(skip(self))]
    pub fn evaluate_composite_achievements(&self, user_id: i64) -> Result<Vec<String>> {
        let state = UserState::compute(&self.store, user_id)?;
        composite::evaluate(&self.store, &state)
    }

    /// Bulk scan: award `key` to every currently-qualifying user, backdated
    /// to the moment each first qualified. Returns the newly awarded user
    /// ids.
    #[tracing::instrument(skip(self))]
    pub fn evaluate_retroactive_achievements(&self, key: &str) -> Result<Vec<i64>> {
        retroactive::evaluate(&self.store, key)
    }

    /// Runs every per-user evaluator once, then the composite fixpoint.
    /// Convenience for callers (e.g. an admin "recompute everything for this
    /// user" action) that don't need the granular entry points individually.
    #[tracing::instrument(skip(self))]
    pub fn evaluate_all(&self, user_id: i64) -> Result<Vec<String>> {
        let mut awarded = self.evaluate_progress_achievements(user_id)?;
        awarded.extend(self.evaluate_completion_achievements(user_id)?);
        awarded.extend(self.evaluate_hint_achievements(user_id)?);
        awarded.extend(self.evaluate_special_achievements(user_id)?);
        if !awarded.is_empty() {
            awarded.extend(self.on_achievement_awarded(user_id)?);
        }
        Ok(awarded)
    }

    pub fn get_consecutive_correct_count(&self, user_id: i64) -> Result<u32> {
        Ok(UserState::compute(&self.store, user_id)?.longest_consecutive_correct)
    }

    pub fn get_current_consecutive_correct(&self, user_id: i64) -> Result<u32> {
        Ok(UserState::compute(&self.store, user_id)?.current_consecutive_correct)
    }
}
