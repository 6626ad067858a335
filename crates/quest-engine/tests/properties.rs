use proptest::prelude::*;

use quest_engine::Engine;
use quest_testing::{arb_user_id, QuestFixture};

const PROGRESS_TIERS: [(u32, &str); 5] = [
    (5, "beginner_5"),
    (10, "experienced_10"),
    (15, "advanced_15"),
    (20, "expert_20"),
    (25, "master_25"),
];

proptest! {
    /// Property 2: after evaluating progress achievements for a user with
    /// exactly N approved steps, every tier <= N is held and every tier > N
    /// is not.
    #[test]
    fn threshold_monotonicity(n in 0u32..27, user_id in arb_user_id()) {
        let fixture = QuestFixture::new();
        fixture.add_user(user_id);
        let engine = Engine::new(fixture.store.clone());

        for i in 0..n {
            let step = fixture.add_text_step(&format!("s{i}"), &["ok"]);
            fixture.approve_text(user_id, step.id, "ok");
        }
        engine.evaluate_progress_achievements(user_id).unwrap();

        let held = fixture.held_keys(user_id).unwrap();
        for (threshold, key) in PROGRESS_TIERS {
            let should_hold = n >= threshold;
            prop_assert_eq!(held.contains(&key.to_string()), should_hold);
        }
    }

    /// Property 7 (progress slice): a second consecutive evaluator call
    /// awards nothing new, regardless of how many steps are approved.
    #[test]
    fn progress_evaluator_is_idempotent(n in 0u32..27) {
        let fixture = QuestFixture::new();
        let user = fixture.add_user(1);
        let engine = Engine::new(fixture.store.clone());

        for i in 0..n {
            let step = fixture.add_text_step(&format!("s{i}"), &["ok"]);
            fixture.approve_text(user.id, step.id, "ok");
        }
        engine.evaluate_progress_achievements(user.id).unwrap();
        let second = engine.evaluate_progress_achievements(user.id).unwrap();
        prop_assert!(second.is_empty());
    }
}

/// Property 4: after a global unique-achievement scan, the position-K
/// achievement belongs to whichever user has the K-th smallest
/// earliest-approved-step timestamp. Exercised with a handful of randomly
/// shuffled approval orders rather than a single fixed arrangement.
#[test]
fn position_ordering_matches_earliest_approval_rank() {
    let orderings: [[i64; 5]; 3] =
        [[1, 2, 3, 4, 5], [5, 4, 3, 2, 1], [3, 1, 4, 5, 2]];

    for order in orderings {
        let fixture = QuestFixture::new();
        let engine = Engine::new(fixture.store.clone());
        let step = fixture.add_text_step("only step", &["ok"]);

        for &user_id in &order {
            fixture.add_user(user_id);
            fixture.approve_text(user_id, step.id, "ok");
        }

        engine.evaluate_unique_achievements().unwrap();

        let position_keys =
            ["pioneer", "second_place", "third_place", "fourth_place", "fifth_place"];
        for (rank, key) in position_keys.iter().enumerate() {
            let expected_user = order[rank];
            let holders = fixture.store.achievements.list_by_user(expected_user).unwrap();
            let achievement = fixture.store.achievements.get_by_key((*key).into()).unwrap();
            assert!(
                holders.iter().any(|ua| ua.achievement_id == achievement.id),
                "expected user {expected_user} to hold {key} for approval order {order:?}"
            );
        }
    }
}

/// Property 3: for the `pioneer` (position 1) achievement, the holder count
/// is never more than one, and calling the global scan again after a user
/// already holds it never adds a second holder or moves it to someone else.
#[test]
fn unique_achievement_never_gains_a_second_holder() {
    let fixture = QuestFixture::new();
    let engine = Engine::new(fixture.store.clone());
    let step = fixture.add_text_step("only step", &["ok"]);

    let first_user = fixture.add_user(1);
    fixture.approve_text(first_user.id, step.id, "ok");
    engine.evaluate_unique_achievements().unwrap();

    let pioneer = fixture.store.achievements.get_by_key("pioneer".into()).unwrap();
    assert_eq!(fixture.store.achievements.holder_count(pioneer.id).unwrap(), 1);

    let second_user = fixture.add_user(2);
    fixture.approve_text(second_user.id, step.id, "ok");
    engine.evaluate_unique_achievements().unwrap();

    assert_eq!(fixture.store.achievements.holder_count(pioneer.id).unwrap(), 1);
    assert!(fixture.held_keys(first_user.id).unwrap().contains(&"pioneer".to_string()));
    assert!(!fixture.held_keys(second_user.id).unwrap().contains(&"pioneer".to_string()));
}
