//! However many `assign` calls are issued for the same (user, achievement)
//! pair, exactly one `user_achievements` row survives.

use proptest::prelude::*;
use quest_store::{Store, StoreConfig};

fn store() -> Store {
    Store::open_in_memory(StoreConfig::for_tests()).unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn repeated_assign_calls_leave_exactly_one_row(call_count in 1usize..10) {
        let store = store();
        let user = store.users.get_or_create(1, "alice".into()).unwrap();
        let achievement = store.achievements.get_by_key("pioneer".into()).unwrap();

        let now = chrono::Utc::now();
        let mut successes = 0;
        for _ in 0..call_count {
            if store.achievements.assign(user.id, achievement.id, now, false).unwrap() {
                successes += 1;
            }
        }

        prop_assert_eq!(successes, 1);
        prop_assert_eq!(store.achievements.list_by_user(user.id).unwrap().len(), 1);
    }
}
