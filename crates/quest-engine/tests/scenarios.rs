use quest_engine::Engine;
use quest_testing::QuestFixture;

/// S1: 30 active steps, approved in order. The progress evaluator fires on
/// every threshold the latest approval just crossed and nothing else.
#[test]
fn s1_progress_thresholds_fire_at_exact_counts() {
    let fixture = QuestFixture::new();
    let user = fixture.add_user(1);
    let engine = Engine::new(fixture.store.clone());

    let steps: Vec<_> = (0..30)
        .map(|i| fixture.add_text_step(&format!("step {i}"), &["ok"]))
        .collect();

    let mut last = Vec::new();
    for step in &steps[..10] {
        fixture.approve_text(user.id, step.id, "ok");
        last = engine.on_correct_answer(user.id).unwrap();
    }
    assert_eq!(last, vec!["experienced_10".to_string()]);

    fixture.approve_text(user.id, steps[10].id, "ok");
    let eleventh = engine.on_correct_answer(user.id).unwrap();
    assert!(eleventh.is_empty());
}

/// S2: 5 users approve the same step at increasing timestamps. The unique
/// evaluator ranks them by earliest-approved-progress ascending and hands
/// out the position achievements in that order.
#[test]
fn s2_unique_position_ranks_by_earliest_approval() {
    let fixture = QuestFixture::new();
    let engine = Engine::new(fixture.store.clone());
    let step = fixture.add_text_step("only step", &["ok"]);

    let users: Vec<_> = (1..=5).map(|id| fixture.add_user(id)).collect();
    let base = QuestFixture::at("2026-01-01T00:00:00Z");
    // user1..user5 approve at minute offsets 50, 10, 40, 20, 30 respectively,
    // so earliest-first order is user2, user4, user5, user3, user1.
    let offsets = [50, 10, 40, 20, 30];
    for (user, minutes) in users.iter().zip(offsets) {
        fixture.approve_text_at(user.id, step.id, "ok", base + chrono::Duration::minutes(minutes));
    }

    let awarded = engine.evaluate_unique_achievements().unwrap();
    let expected = vec![
        (users[1].id, "pioneer".to_string()),
        (users[3].id, "second_place".to_string()),
        (users[4].id, "third_place".to_string()),
        (users[2].id, "fourth_place".to_string()),
        (users[0].id, "fifth_place".to_string()),
    ];
    assert_eq!(awarded, expected);

    let rerun = engine.evaluate_unique_achievements().unwrap();
    assert!(rerun.is_empty(), "a holder already exists for every position");
}

/// S3: a user already holding every progress milestone is assigned the
/// final one; `OnAchievementAwarded` should cascade into `super_collector`
/// and then reach a fixpoint.
#[test]
fn s3_composite_fires_once_required_set_is_complete() {
    let fixture = QuestFixture::new();
    let user = fixture.add_user(1);
    let engine = Engine::new(fixture.store.clone());

    let steps: Vec<_> = (0..25)
        .map(|i| fixture.add_text_step(&format!("step {i}"), &["ok"]))
        .collect();
    for step in &steps[..24] {
        fixture.approve_text(user.id, step.id, "ok");
    }
    engine.on_correct_answer(user.id).unwrap();
    assert!(fixture.held_keys(user.id).unwrap().contains(&"expert_20".to_string()));
    assert!(!fixture.held_keys(user.id).unwrap().contains(&"super_collector".to_string()));

    fixture.approve_text(user.id, steps[24].id, "ok");
    let newly = engine.on_correct_answer(user.id).unwrap();
    assert!(newly.contains(&"master_25".to_string()));

    let cascaded = engine.on_achievement_awarded(user.id).unwrap();
    assert_eq!(cascaded, vec!["super_collector".to_string()]);

    let second_pass = engine.on_achievement_awarded(user.id).unwrap();
    assert!(second_pass.is_empty());
}

/// S4: a three-step quest completed between minute 0 and minute 4 awards
/// `winner` plus the tightest speed tier (`cheater`, threshold 5), never
/// the looser `lightning`/`rocket` tiers.
#[test]
fn s4_speed_awards_only_tightest_tier() {
    let fixture = QuestFixture::new();
    let user = fixture.add_user(1);
    let engine = Engine::new(fixture.store.clone());

    let steps: Vec<_> = (0..3).map(|i| fixture.add_text_step(&format!("s{i}"), &["ok"])).collect();
    for step in &steps {
        fixture.approve_text(user.id, step.id, "ok");
    }

    let awarded = engine.evaluate_completion_achievements(user.id).unwrap();
    assert!(awarded.contains(&"winner".to_string()));
    assert!(awarded.contains(&"cheater".to_string()));
    assert!(!awarded.contains(&"lightning".to_string()));
    assert!(!awarded.contains(&"rocket".to_string()));

    let rerun = engine.evaluate_completion_achievements(user.id).unwrap();
    assert!(rerun.is_empty());
}

/// S6: of 4 active steps, skipping step 2 and approving step 1 means the
/// next active step for this user is step 3, not the skipped step 2.
#[test]
fn s6_get_next_active_skips_skipped_steps() {
    let fixture = QuestFixture::new();
    let user = fixture.add_user(1);
    let steps: Vec<_> = (0..4).map(|i| fixture.add_text_step(&format!("s{i}"), &["ok"])).collect();

    fixture.approve_text(user.id, steps[0].id, "ok");
    fixture.skip(user.id, steps[1].id);

    let next = fixture
        .store
        .steps
        .get_next_active(steps[0].step_order, user.id)
        .unwrap()
        .expect("a next active step exists");
    assert_eq!(next.id, steps[2].id);
}

#[test]
fn hints_and_special_achievements_are_idempotent_per_evaluator() {
    let fixture = QuestFixture::new();
    let user = fixture.add_user(1);
    let engine = Engine::new(fixture.store.clone());
    let image_step = fixture.add_image_step("send a photo");

    fixture.approve_image(user.id, image_step.id, "file-1");
    let first = engine.evaluate_special_achievements(user.id).unwrap();
    assert_eq!(first, vec!["photographer".to_string()]);

    let second = engine.evaluate_special_achievements(user.id).unwrap();
    assert!(second.is_empty());
}

#[test]
fn secret_agent_matches_normalized_specific_answer() {
    let fixture = QuestFixture::new();
    let user = fixture.add_user(1);
    let engine = Engine::new(fixture.store.clone());
    let step = fixture.add_text_step("riddle", &["whatever"]);

    fixture.record_text(user.id, step.id, "  Сезам Откройся  ");
    let awarded = engine.evaluate_special_achievements(user.id).unwrap();
    assert_eq!(awarded, vec!["secret_agent".to_string()]);
}

#[test]
fn retroactive_scan_backdates_to_the_qualifying_approval() {
    let fixture = QuestFixture::new();
    let user = fixture.add_user(1);
    let steps: Vec<_> = (0..5).map(|i| fixture.add_text_step(&format!("s{i}"), &["ok"])).collect();
    for step in &steps {
        fixture.approve_text(user.id, step.id, "ok");
    }

    let engine = Engine::new(fixture.store.clone());
    let awarded = engine.evaluate_retroactive_achievements("beginner_5").unwrap();
    assert_eq!(awarded, vec![user.id]);

    let holding = fixture.store.achievements.list_by_user(user.id).unwrap();
    let row = holding.iter().find(|ua| ua.achievement_id == fixture
        .store
        .achievements
        .get_by_key("beginner_5".into())
        .unwrap()
        .id)
        .unwrap();
    assert!(row.is_retroactive);

    let rerun = engine.evaluate_retroactive_achievements("beginner_5").unwrap();
    assert!(rerun.is_empty());
}
