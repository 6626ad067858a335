//! Seeds the built-in achievement catalog and default settings.
//!
//! Both seed steps are idempotent: achievements are inserted `OR IGNORE` on
//! `key`, settings `OR IGNORE` on `key`, so re-running them on every startup
//! never clobbers an admin's edits.

use chrono::Utc;
use rusqlite::{params, Connection};

use quest_core::Result;
use quest_types::{AchievementCategory, AchievementConditions, AchievementKind};

struct Entry {
    key: &'static str,
    name: &'static str,
    description: &'static str,
    category: AchievementCategory,
    kind: AchievementKind,
    is_unique: bool,
    conditions: AchievementConditions,
}

fn conditions(build: impl FnOnce(&mut AchievementConditions)) -> AchievementConditions {
    let mut c = AchievementConditions::default();
    build(&mut c);
    c
}

fn catalog() -> Vec<Entry> {
    use AchievementCategory::*;
    use AchievementKind::*;

    let progress_thresholds: [(&str, &str, u32); 5] = [
        ("beginner_5", "Beginner", 5),
        ("experienced_10", "Experienced", 10),
        ("advanced_15", "Advanced", 15),
        ("expert_20", "Expert", 20),
        ("master_25", "Master", 25),
    ];

    let mut entries: Vec<Entry> = progress_thresholds
        .into_iter()
        .map(|(key, name, threshold)| Entry {
            key,
            name,
            description: "Approved a milestone number of steps.",
            category: Progress,
            kind: ProgressBased,
            is_unique: false,
            conditions: conditions(|c| c.correct_answers = Some(threshold)),
        })
        .collect();

    entries.extend([
        Entry {
            key: "cheater",
            name: "Cheater",
            description: "Completed the quest in under 5 minutes.",
            category: Completion,
            kind: TimeBased,
            is_unique: false,
            conditions: conditions(|c| c.completion_time_minutes = Some(5)),
        },
        Entry {
            key: "lightning",
            name: "Lightning",
            description: "Completed the quest in under 10 minutes.",
            category: Completion,
            kind: TimeBased,
            is_unique: false,
            conditions: conditions(|c| c.completion_time_minutes = Some(10)),
        },
        Entry {
            key: "rocket",
            name: "Rocket",
            description: "Completed the quest in under an hour.",
            category: Completion,
            kind: TimeBased,
            is_unique: false,
            conditions: conditions(|c| c.completion_time_minutes = Some(60)),
        },
        Entry {
            key: "winner",
            name: "Winner",
            description: "Completed the quest.",
            category: Completion,
            kind: ActionBased,
            is_unique: false,
            conditions: AchievementConditions::default(),
        },
        Entry {
            key: "perfect_path",
            name: "Perfect Path",
            description: "Completed the quest with no wrong attempts.",
            category: Completion,
            kind: ActionBased,
            is_unique: false,
            conditions: conditions(|c| c.no_errors = Some(true)),
        },
        Entry {
            key: "self_sufficient",
            name: "Self-Sufficient",
            description: "Completed the quest without using any hints.",
            category: Completion,
            kind: ActionBased,
            is_unique: false,
            conditions: conditions(|c| c.no_hints = Some(true)),
        },
    ]);

    let hint_thresholds: [(&str, &str, u32); 5] = [
        ("hint_5", "Curious", 5),
        ("hint_10", "Inquisitive", 10),
        ("hint_15", "Dependent", 15),
        ("hint_25", "Hint Hunter", 25),
        ("hint_30", "Hint Addict", 30),
    ];
    entries.extend(hint_thresholds.into_iter().map(|(key, name, threshold)| Entry {
        key,
        name,
        description: "Used a milestone number of hints.",
        category: Hints,
        kind: ActionBased,
        is_unique: false,
        conditions: conditions(|c| c.hint_count = Some(threshold)),
    }));

    entries.extend([
        Entry {
            key: "hint_master",
            name: "Hint Master",
            description: "Used a hint on every active step.",
            category: Hints,
            kind: ActionBased,
            is_unique: false,
            conditions: AchievementConditions::default(),
        },
        Entry {
            key: "skeptic",
            name: "Skeptic",
            description: "Used a hint on the very first task.",
            category: Hints,
            kind: ActionBased,
            is_unique: false,
            conditions: conditions(|c| c.hint_on_first_task = Some(true)),
        },
        Entry {
            key: "photographer",
            name: "Photographer",
            description: "Submitted a photo answer on an image task.",
            category: Special,
            kind: ActionBased,
            is_unique: false,
            conditions: conditions(|c| c.photo_submitted = Some(true)),
        },
        Entry {
            key: "paparazzi",
            name: "Paparazzi",
            description: "Submitted a photo answer on a text task.",
            category: Special,
            kind: ActionBased,
            is_unique: false,
            conditions: conditions(|c| c.photo_on_text_task = Some(true)),
        },
        Entry {
            key: "bullseye",
            name: "Bullseye",
            description: "10 consecutive correct first-try answers.",
            category: Special,
            kind: ActionBased,
            is_unique: false,
            conditions: conditions(|c| c.consecutive_correct = Some(10)),
        },
        Entry {
            key: "secret_agent",
            name: "Secret Agent",
            description: "Found the secret phrase.",
            category: Special,
            kind: ActionBased,
            is_unique: false,
            conditions: conditions(|c| c.specific_answer = Some("сезам откройся".into())),
        },
    ]);

    let positions: [(&str, &str, u32); 5] = [
        ("pioneer", "Pioneer", 1),
        ("second_place", "Second Place", 2),
        ("third_place", "Third Place", 3),
        ("fourth_place", "Fourth Place", 4),
        ("fifth_place", "Fifth Place", 5),
    ];
    entries.extend(positions.into_iter().map(|(key, name, position)| Entry {
        key,
        name,
        description: "Among the first to reach this rank.",
        category: Unique,
        kind: AchievementKind::Unique,
        is_unique: true,
        conditions: conditions(|c| c.position = Some(position)),
    }));

    entries.extend([
        Entry {
            key: "super_brain",
            name: "Super Brain",
            description: "No mistakes, no hints, completed in under 30 minutes.",
            category: Composite,
            kind: AchievementKind::Composite,
            is_unique: false,
            conditions: conditions(|c| {
                c.no_errors = Some(true);
                c.no_hints = Some(true);
                c.completion_time_minutes = Some(30);
            }),
        },
        Entry {
            key: "super_collector",
            name: "Super Collector",
            description: "Holds every progress milestone achievement.",
            category: Composite,
            kind: AchievementKind::Composite,
            is_unique: false,
            conditions: conditions(|c| {
                c.required_achievements = Some(vec![
                    "beginner_5".into(),
                    "experienced_10".into(),
                    "advanced_15".into(),
                    "expert_20".into(),
                    "master_25".into(),
                ]);
            }),
        },
    ]);

    entries
}

pub fn seed_catalog(conn: &Connection) -> Result<()> {
    let now = Utc::now();
    for entry in catalog() {
        let conditions_json = entry.conditions.to_json()?;
        conn.execute(
            r#"
            INSERT OR IGNORE INTO achievements
                (key, name, description, category, kind, is_unique, conditions, is_active, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 1, ?8)
            "#,
            params![
                entry.key,
                entry.name,
                entry.description,
                crate::repo::achievement::category_to_str(entry.category),
                crate::repo::achievement::kind_to_str(entry.kind),
                entry.is_unique,
                conditions_json,
                now.to_rfc3339(),
            ],
        )?;
    }
    Ok(())
}

const DEFAULT_SETTINGS: &[(&str, &str)] = &[
    ("welcome_message", "Welcome to the quest! Answer each task to progress."),
    ("final_message", "You have completed the quest. Congratulations!"),
    ("correct_answer_message", "Correct!"),
    ("wrong_answer_message", "That's not it, try again."),
    ("quest_state", "not_started"),
    ("quest_not_started_message", "The quest hasn't started yet."),
    ("quest_paused_message", "The quest is currently paused."),
    ("quest_completed_message", "The quest has already been completed."),
];

pub fn seed_settings(conn: &Connection) -> Result<()> {
    for (key, value) in DEFAULT_SETTINGS {
        conn.execute(
            "INSERT OR IGNORE INTO settings (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
    }
    Ok(())
}
