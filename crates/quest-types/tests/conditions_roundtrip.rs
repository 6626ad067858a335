use quest_types::{normalize_answer, AchievementConditions};

#[test]
fn roundtrip_preserves_set_fields() {
    let conditions = AchievementConditions {
        correct_answers: Some(10),
        no_hints: Some(true),
        required_achievements: Some(vec!["beginner_5".into(), "experienced_10".into()]),
        specific_answer: Some("sezam otkroysya".into()),
        ..Default::default()
    };

    let json = conditions.to_json().unwrap();
    let restored = AchievementConditions::from_json(&json).unwrap();

    assert_eq!(conditions, restored);
}

#[test]
fn roundtrip_empty_conditions() {
    let conditions = AchievementConditions::default();
    let json = conditions.to_json().unwrap();
    let restored = AchievementConditions::from_json(&json).unwrap();
    assert_eq!(conditions, restored);
}

#[test]
fn normalize_trims_and_lowercases() {
    assert_eq!(normalize_answer("  Sezam Otkroysya  "), "sezam otkroysya");
    assert_eq!(normalize_answer("ANSWER"), "answer");
}
