//! If a work unit succeeds on attempt k <= 3, `execute` returns success with
//! exactly k attempts; if it fails on all 3, `execute` returns the last
//! error with exactly 3 attempts.

use proptest::prelude::*;
use quest_core::QuestError;
use quest_queue::{Queue, QueueConfig};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

fn queue() -> Queue {
    Queue::open_in_memory(QueueConfig::for_tests(), |_| Ok(())).unwrap()
}

proptest! {
    #[test]
    fn retry_fidelity_for_any_success_point(success_attempt in 1u32..=3) {
        let q = queue();
        let attempts = Arc::new(AtomicU32::new(0));
        let counted = attempts.clone();

        let result: quest_core::Result<u32> = q.execute(move |_conn| {
            let n = counted.fetch_add(1, Ordering::SeqCst) + 1;
            if n < success_attempt {
                Err(QuestError::Constraint("not yet".into()))
            } else {
                Ok(n)
            }
        });

        prop_assert!(result.is_ok());
        prop_assert_eq!(attempts.load(Ordering::SeqCst), success_attempt);
    }

    #[test]
    fn retry_fidelity_for_permanent_failure(_seed in 0u32..10) {
        let q = queue();
        let attempts = Arc::new(AtomicU32::new(0));
        let counted = attempts.clone();

        let result: quest_core::Result<()> = q.execute(move |_conn| {
            counted.fetch_add(1, Ordering::SeqCst);
            Err(QuestError::Constraint("always fails".into()))
        });

        prop_assert!(result.is_err());
        prop_assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }
}
