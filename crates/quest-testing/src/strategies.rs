use proptest::prelude::*;

/// A plausible platform-assigned user id.
pub fn arb_user_id() -> impl Strategy<Value = i64> {
    1i64..10_000
}

/// A short lowercase-ish answer string, deliberately including mixed case
/// and surrounding whitespace so tests exercise `normalize_answer`.
pub fn arb_answer_text() -> impl Strategy<Value = String> {
    "[ A-Za-z]{1,12}"
}

/// A batch of distinct step prompt texts, `n` of them.
pub fn arb_step_texts(n: usize) -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[a-z]{3,10}", n)
}
