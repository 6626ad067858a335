use quest_sdk::{Quest, StoreConfig};
use quest_testing::QuestFixture;
use quest_types::ProgressStatus;

#[test]
fn open_in_memory_seeds_the_catalog() {
    let quest = Quest::open_in_memory(StoreConfig::for_tests()).unwrap();
    let achievements = quest.store().achievements.list_active().unwrap();
    assert!(achievements.iter().any(|a| a.key == "beginner_5"));
}

#[test]
fn engine_shares_state_with_the_facades_own_store() {
    let quest = Quest::open_in_memory(StoreConfig::for_tests()).unwrap();
    let user = quest.store().users.get_or_create(7, "bob".into()).unwrap();
    let step = quest
        .store()
        .steps
        .create(quest_sdk::NewStep {
            text: "first step".into(),
            answer_type: quest_types::AnswerType::Text,
            has_auto_check: true,
            is_asterisk: false,
            answers: vec!["ok".into()],
        })
        .unwrap();

    quest.store().answers.record_text(user.id, step.id, "ok".into(), false).unwrap();
    quest.store().progress.upsert(user.id, step.id, ProgressStatus::Approved).unwrap();

    let awarded = quest.engine().on_correct_answer(user.id).unwrap();
    assert!(awarded.is_empty(), "one approval does not reach the 5-step threshold");
}

#[test]
fn cloning_the_facade_shares_the_same_underlying_store() {
    let quest = Quest::open_in_memory(StoreConfig::for_tests()).unwrap();
    let clone = quest.clone();

    quest.store().users.get_or_create(1, "alice".into()).unwrap();
    assert!(clone.store().users.exists(1).unwrap());
}

#[test]
fn fixture_crate_and_facade_agree_on_the_seeded_catalog_shape() {
    let fixture = QuestFixture::new();
    let quest = Quest::open_in_memory(StoreConfig::for_tests()).unwrap();

    let fixture_keys: std::collections::HashSet<_> =
        fixture.store.achievements.list_active().unwrap().into_iter().map(|a| a.key).collect();
    let facade_keys: std::collections::HashSet<_> =
        quest.store().achievements.list_active().unwrap().into_iter().map(|a| a.key).collect();
    assert_eq!(fixture_keys, facade_keys);
}
