//! Per-user state snapshot: every evaluator reads from one of these instead
//! of re-querying the store, so a single engine call never issues more than
//! one round of reads per table.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use quest_core::Result;
use quest_store::Store;
use quest_types::{AnswerType, ProgressStatus};

#[derive(Debug, Clone)]
pub struct UserState {
    pub user_id: i64,
    pub active_steps_count: i64,
    pub answered_steps_count: i64,
    pub approved_steps_count: i64,
    pub is_completed: bool,
    pub total_answers: i64,
    pub hints_used: i64,
    pub first_answer_time: Option<DateTime<Utc>>,
    pub last_answer_time: Option<DateTime<Utc>>,
    /// Whole minutes, truncated. `None` when the user has not answered yet.
    pub completion_time_minutes: Option<i64>,
    pub has_image_answer_on_image_step: bool,
    pub has_image_answer_on_text_step: bool,
    pub has_ever_rejected: bool,
    pub first_answer_used_hint: bool,
    pub specific_answers: HashSet<String>,
    pub longest_consecutive_correct: u32,
    pub current_consecutive_correct: u32,
    pub held_achievement_keys: HashSet<String>,
}

impl UserState {
    /// Build the snapshot for `user_id` from the store's current data. One
    /// round of reads per table (answers, progress, steps, achievements);
    /// everything else is computed in memory.
    pub fn compute(store: &Store, user_id: i64) -> Result<Self> {
        let active_steps_count = store.steps.active_steps_count()?;
        let answered_steps_count = store.steps.answered_steps_count(user_id)?;
        let approved_steps_count = store.progress.count_approved_for_user(user_id)?;
        let is_completed = active_steps_count > 0 && answered_steps_count >= active_steps_count;

        let answers = store.answers.list_by_user(user_id)?;
        let total_answers = answers.len() as i64;
        let hints_used = answers.iter().filter(|a| a.hint_used).count() as i64;

        let first_answer_time = answers.first().map(|a| a.created_at);
        let last_answer_time = answers.last().map(|a| a.created_at);
        let completion_time_minutes = match (first_answer_time, last_answer_time) {
            _ if total_answers <= 1 => Some(0),
            (Some(first), Some(last)) => Some((last - first).num_minutes()),
            _ => None,
        };

        let steps = store.steps.get_all()?;
        let step_answer_type: std::collections::HashMap<i64, AnswerType> =
            steps.iter().map(|s| (s.id, s.answer_type)).collect();

        let mut has_image_answer_on_image_step = false;
        let mut has_image_answer_on_text_step = false;
        let mut specific_answers = HashSet::new();
        for answer in &answers {
            if let Some(text) = &answer.text_answer {
                specific_answers.insert(text.clone());
            }
            if answer.is_image_answer() {
                match step_answer_type.get(&answer.step_id) {
                    Some(AnswerType::Image) => has_image_answer_on_image_step = true,
                    Some(AnswerType::Text) => has_image_answer_on_text_step = true,
                    None => {}
                }
            }
        }

        let first_answer_used_hint = answers.first().map(|a| a.hint_used).unwrap_or(false);

        let progress = store.progress.list_by_user(user_id)?;
        let approved_completion: std::collections::HashMap<i64, DateTime<Utc>> = progress
            .iter()
            .filter(|p| p.status == ProgressStatus::Approved)
            .filter_map(|p| p.completed_at.map(|c| (p.step_id, c)))
            .collect();
        let has_ever_rejected = progress.iter().any(|p| p.status == ProgressStatus::Rejected);

        let (longest_consecutive_correct, current_consecutive_correct) =
            consecutive_correct_runs(&answers, &approved_completion);

        let held_achievement_keys = store
            .achievements
            .list_by_user(user_id)?
            .into_iter()
            .map(|ua| ua.achievement_id)
            .map(|id| store.achievements.get_by_id(id).map(|a| a.key))
            .collect::<Result<HashSet<String>>>()?;

        Ok(Self {
            user_id,
            active_steps_count,
            answered_steps_count,
            approved_steps_count,
            is_completed,
            total_answers,
            hints_used,
            first_answer_time,
            last_answer_time,
            completion_time_minutes,
            has_image_answer_on_image_step,
            has_image_answer_on_text_step,
            has_ever_rejected,
            first_answer_used_hint,
            specific_answers,
            longest_consecutive_correct,
            current_consecutive_correct,
            held_achievement_keys,
        })
    }

    pub fn holds(&self, key: &str) -> bool {
        self.held_achievement_keys.contains(key)
    }
}

/// An answer is "correct" iff an approved progress row exists for its step
/// with `completed_at >= this answer's created_at`. This definition is taken
/// literally rather than inferring a first-try-only semantics the source
/// left ambiguous (see DESIGN.md open question on `bullseye`).
fn consecutive_correct_runs(
    answers: &[quest_types::UserAnswer],
    approved_completion: &std::collections::HashMap<i64, DateTime<Utc>>,
) -> (u32, u32) {
    let mut longest = 0u32;
    let mut current_run = 0u32;
    let mut trailing = 0u32;

    for answer in answers {
        let correct = approved_completion
            .get(&answer.step_id)
            .is_some_and(|completed_at| *completed_at >= answer.created_at);

        if correct {
            current_run += 1;
            longest = longest.max(current_run);
            trailing += 1;
        } else {
            current_run = 0;
            trailing = 0;
        }
    }

    (longest, trailing)
}
