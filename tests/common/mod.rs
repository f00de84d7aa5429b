// SPDX-License-Identifier: MIT

use chrono::{DateTime, TimeZone, Utc};
use crewstreak::config::Config;
use crewstreak::db::{MemoryStore, StreakStore};
use crewstreak::models::{Group, GroupMember, GroupStreak, GroupStreakWeek, MemberCompliance};
use crewstreak::routes::create_router;
use crewstreak::time_utils::current_week_bounds;
use crewstreak::AppState;
use std::sync::Arc;

/// Thursday 18:00 UTC in the test week (2024-03-04 .. 2024-03-10).
#[allow(dead_code)]
pub fn thursday() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 7, 18, 0, 0).unwrap()
}

/// Sunday 23:59 UTC at the end of the test week.
#[allow(dead_code)]
pub fn sunday_night() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 10, 23, 59, 0).unwrap()
}

/// Monday 00:00 UTC starting the week after the test week.
#[allow(dead_code)]
pub fn next_monday() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 11, 0, 0, 0).unwrap()
}

#[allow(dead_code)]
pub fn test_store() -> Arc<MemoryStore> {
    Arc::new(MemoryStore::new())
}

/// Create a test app over the in-memory store.
#[allow(dead_code)]
pub fn create_test_app(store: Arc<MemoryStore>) -> axum::Router {
    let store: Arc<dyn StreakStore> = store;
    let state = Arc::new(AppState {
        config: Config::default(),
        store,
    });
    create_router(state)
}

#[allow(dead_code)]
pub fn seed_group(store: &MemoryStore, id: &str, name: &str, is_active: bool) {
    store.insert_group(Group {
        id: id.to_string(),
        name: name.to_string(),
        is_active,
    });
}

#[allow(dead_code)]
pub fn seed_member(store: &MemoryStore, group_id: &str, user_id: &str, display_name: &str) {
    store.insert_member(GroupMember {
        user_id: user_id.to_string(),
        group_id: group_id.to_string(),
        display_name: display_name.to_string(),
        photo_url: None,
        is_active: true,
    });
}

#[allow(dead_code)]
pub fn seed_streak(store: &MemoryStore, group_id: &str, streak_days: u32, last_milestone: u32) {
    let mut streak = GroupStreak::new(group_id);
    streak.streak_days = streak_days;
    streak.last_milestone = last_milestone;
    if streak_days > 0 {
        streak.streak_start_date = Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
    }
    store.insert_streak(streak);
}

/// Seed the week containing `now` with the given (user, name, workouts)
/// compliance entries.
#[allow(dead_code)]
pub fn seed_week(store: &MemoryStore, group_id: &str, now: DateTime<Utc>, entries: &[(&str, &str, u32)]) {
    let bounds = current_week_bounds(now);
    let mut week = GroupStreakWeek::new(group_id, &bounds, bounds.start);
    for (user_id, display_name, workout_count) in entries {
        week.member_compliance.insert(
            user_id.to_string(),
            MemberCompliance {
                display_name: display_name.to_string(),
                photo_url: None,
                workout_count: *workout_count,
                last_workout_date: None,
            },
        );
    }
    store.insert_week(week);
}
