//! Shared fixture builder and proptest strategies for `quest-store` and
//! `quest-engine` tests. Not published, not meant to be depended on outside
//! this workspace.

mod fixture;
mod strategies;

pub use fixture::QuestFixture;
pub use strategies::{arb_answer_text, arb_step_texts, arb_user_id};
