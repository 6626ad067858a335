//! Special-category evaluator: `photographer`, `paparazzi`, `bullseye`,
//! `secret_agent`.

use chrono::Utc;
use quest_core::Result;
use quest_store::Store;

use crate::award::award_by_key;
use crate::state::UserState;

pub fn evaluate(store: &Store, state: &UserState) -> Result<Vec<String>> {
    let now = Utc::now();
    let mut awarded = Vec::new();

    let mut try_award = |key: &str, qualifies: bool, awarded: &mut Vec<String>| -> Result<()> {
        if qualifies && !state.holds(key) {
            if let Some(key) = award_by_key(store, state.user_id, key, now, false)? {
                awarded.push(key);
            }
        }
        Ok(())
    };

    try_award("photographer", state.has_image_answer_on_image_step, &mut awarded)?;
    try_award("paparazzi", state.has_image_answer_on_text_step, &mut awarded)?;

    if let Ok(bullseye) = store.achievements.get_by_key("bullseye".into()) {
        let threshold = bullseye.conditions.consecutive_correct.unwrap_or(10);
        try_award(
            "bullseye",
            state.longest_consecutive_correct >= threshold,
            &mut awarded,
        )?;
    }

    if let Ok(secret_agent) = store.achievements.get_by_key("secret_agent".into()) {
        if let Some(phrase) = &secret_agent.conditions.specific_answer {
            let found = state.specific_answers.contains(phrase);
            try_award("secret_agent", found, &mut awarded)?;
        }
    }

    Ok(awarded)
}
