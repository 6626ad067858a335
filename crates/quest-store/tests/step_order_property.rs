//! A random sequence of swaps and moves never produces two active steps
//! sharing a `step_order`, and every step id created survives the
//! shuffling untouched.

use proptest::prelude::*;
use quest_store::{NewStep, Store, StoreConfig};
use quest_types::AnswerType;
use std::collections::HashSet;

fn store_with_steps(n: usize) -> (Store, Vec<i64>) {
    let store = Store::open_in_memory(StoreConfig::for_tests()).unwrap();
    let ids = (0..n)
        .map(|i| {
            store
                .steps
                .create(NewStep {
                    text: format!("step {i}"),
                    answer_type: AnswerType::Text,
                    has_auto_check: true,
                    is_asterisk: false,
                    answers: vec![format!("answer{i}")],
                })
                .unwrap()
                .id
        })
        .collect();
    (store, ids)
}

fn assert_unique_orders(store: &Store) {
    let steps = store.steps.get_all().unwrap();
    let orders: HashSet<i64> = steps.iter().map(|s| s.step_order).collect();
    assert_eq!(orders.len(), steps.len(), "duplicate step_order after shuffling");
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn random_swaps_preserve_order_uniqueness(ops in prop::collection::vec(0usize..6, 1..20)) {
        let (store, ids) = store_with_steps(5);

        for op in ops {
            let a = ids[op % ids.len()];
            let b = ids[(op + 1) % ids.len()];
            if a != b {
                store.steps.swap(a, b).unwrap();
            } else {
                store.steps.move_up(a).unwrap();
            }
            assert_unique_orders(&store);
        }

        // Every original id is still present, just possibly reordered.
        let remaining: HashSet<i64> = store.steps.get_all().unwrap().into_iter().map(|s| s.id).collect();
        let expected: HashSet<i64> = ids.into_iter().collect();
        prop_assert_eq!(remaining, expected);
    }
}
