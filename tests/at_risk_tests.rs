// SPDX-License-Identifier: MIT

//! Mid-week at-risk warnings: personal and group-wide notifications.

use crewstreak::models::NotificationKind;
use crewstreak::services::AtRiskNotifier;
use crewstreak::time_utils::current_week_bounds;

mod common;

use common::{seed_group, seed_member, seed_streak, seed_week, test_store, thursday};

#[tokio::test]
async fn behind_member_gets_personal_and_group_warnings() {
    let store = test_store();
    seed_group(&store, "g1", "Morning Crew", true);
    for (user, name) in [("u1", "Alice"), ("u2", "Bob"), ("u3", "Carol")] {
        seed_member(&store, "g1", user, name);
    }
    seed_week(
        &store,
        "g1",
        thursday(),
        &[("u1", "Alice", 1), ("u2", "Bob", 3), ("u3", "Carol", 3)],
    );

    let summary = AtRiskNotifier::new(store.clone())
        .run(thursday())
        .await
        .unwrap();

    assert_eq!(summary.processed, 1);
    // One personal warning plus a group-wide warning to all three.
    assert_eq!(summary.notifications, 4);

    let notifications = store.notifications();
    let personal: Vec<_> = notifications
        .iter()
        .filter(|n| n.kind == NotificationKind::AtRisk)
        .collect();
    assert_eq!(personal.len(), 1);
    assert_eq!(personal[0].user_id, "u1");
    assert!(personal[0]
        .message
        .contains("Complete 2 more workouts by Sunday"));

    let group_wide: Vec<_> = notifications
        .iter()
        .filter(|n| n.kind == NotificationKind::GroupAtRisk)
        .collect();
    assert_eq!(group_wide.len(), 3);
    for n in &group_wide {
        assert!(n.message.contains("Alice (1/3)"));
    }
}

#[tokio::test]
async fn one_workout_needed_is_not_pluralized() {
    let store = test_store();
    seed_group(&store, "g1", "Morning Crew", true);
    seed_member(&store, "g1", "u1", "Alice");
    seed_week(&store, "g1", thursday(), &[("u1", "Alice", 2)]);

    AtRiskNotifier::new(store.clone())
        .run(thursday())
        .await
        .unwrap();

    let personal = store
        .notifications()
        .into_iter()
        .find(|n| n.kind == NotificationKind::AtRisk)
        .unwrap();
    assert!(personal.message.contains("Complete 1 more workout by Sunday"));
    assert!(!personal.message.contains("workouts"));
}

#[tokio::test]
async fn group_message_lists_everyone_behind() {
    let store = test_store();
    seed_group(&store, "g1", "Morning Crew", true);
    for (user, name) in [("u1", "Alice"), ("u2", "Bob"), ("u3", "Carol")] {
        seed_member(&store, "g1", user, name);
    }
    seed_week(
        &store,
        "g1",
        thursday(),
        &[("u1", "Alice", 1), ("u2", "Bob", 2), ("u3", "Carol", 3)],
    );

    AtRiskNotifier::new(store.clone())
        .run(thursday())
        .await
        .unwrap();

    let group_wide = store
        .notifications()
        .into_iter()
        .find(|n| n.kind == NotificationKind::GroupAtRisk)
        .unwrap();
    assert!(group_wide.message.contains("Alice (1/3), Bob (2/3)"));
    assert!(!group_wide.message.contains("Carol"));
}

#[tokio::test]
async fn fully_compliant_group_gets_no_noise() {
    let store = test_store();
    seed_group(&store, "g1", "Morning Crew", true);
    seed_member(&store, "g1", "u1", "Alice");
    seed_week(&store, "g1", thursday(), &[("u1", "Alice", 3)]);

    let summary = AtRiskNotifier::new(store.clone())
        .run(thursday())
        .await
        .unwrap();

    assert_eq!(summary.processed, 0);
    assert_eq!(summary.skipped, 1);
    assert!(store.notifications().is_empty());
}

#[tokio::test]
async fn missing_week_record_skips_group() {
    let store = test_store();
    seed_group(&store, "g1", "Morning Crew", true);
    seed_member(&store, "g1", "u1", "Alice");

    let summary = AtRiskNotifier::new(store.clone())
        .run(thursday())
        .await
        .unwrap();

    assert_eq!(summary.skipped, 1);
    assert!(store.notifications().is_empty());
}

#[tokio::test]
async fn at_risk_scan_mutates_no_state() {
    let store = test_store();
    seed_group(&store, "g1", "Morning Crew", true);
    seed_member(&store, "g1", "u1", "Alice");
    seed_streak(&store, "g1", 14, 14);
    seed_week(&store, "g1", thursday(), &[("u1", "Alice", 0)]);

    AtRiskNotifier::new(store.clone())
        .run(thursday())
        .await
        .unwrap();

    let streak = store.streak("g1").unwrap();
    assert_eq!(streak.streak_days, 14);

    let bounds = current_week_bounds(thursday());
    assert_eq!(store.week("g1", bounds.start).unwrap().all_compliant, None);
}
