// SPDX-License-Identifier: MIT

//! Notification fan-out primitive shared by the scheduled jobs.
//!
//! Fan-out only *builds* the per-member records; callers put them into
//! a [`GroupCommit`](crate::db::GroupCommit) so the notifications share
//! the job's atomic batch with any accompanying state change. Callers
//! with no accompanying state change use [`notify_group`], which owns
//! the enumerate-then-commit sequence.

use crate::db::{GroupCommit, StreakStore};
use crate::error::Result;
use crate::models::{Group, GroupMember, Notification, NotificationKind};
use chrono::{DateTime, Utc};

/// One notification per active member of a group.
pub fn fan_out(
    members: &[GroupMember],
    group_id: &str,
    kind: NotificationKind,
    message: &str,
    now: DateTime<Utc>,
) -> Vec<Notification> {
    members
        .iter()
        .map(|member| Notification {
            user_id: member.user_id.clone(),
            group_id: group_id.to_string(),
            kind,
            message: message.to_string(),
            is_read: false,
            created_at: now,
        })
        .collect()
}

/// Fan a single message out to every active member of `group` and
/// commit the batch atomically. Returns the number of notifications
/// written. A failed member-listing read fails the whole operation.
pub async fn notify_group(
    store: &dyn StreakStore,
    group: &Group,
    kind: NotificationKind,
    message: &str,
    now: DateTime<Utc>,
) -> Result<u32> {
    let members = store.list_active_members(&group.id).await?;
    let notifications = fan_out(&members, &group.id, kind, message, now);
    let count = notifications.len() as u32;
    if !notifications.is_empty() {
        store
            .commit_group(GroupCommit {
                group_id: group.id.clone(),
                streak: None,
                week: None,
                notifications,
            })
            .await?;
    }
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use chrono::TimeZone;

    fn member(user_id: &str) -> GroupMember {
        GroupMember {
            user_id: user_id.to_string(),
            group_id: "g1".to_string(),
            display_name: user_id.to_uppercase(),
            photo_url: None,
            is_active: true,
        }
    }

    #[test]
    fn test_fan_out_one_per_member() {
        let members = vec![member("a"), member("b"), member("c")];
        let now = Utc.with_ymd_and_hms(2024, 3, 10, 23, 59, 0).unwrap();

        let notifications = fan_out(&members, "g1", NotificationKind::Milestone, "hello", now);

        assert_eq!(notifications.len(), 3);
        for (n, m) in notifications.iter().zip(&members) {
            assert_eq!(n.user_id, m.user_id);
            assert_eq!(n.group_id, "g1");
            assert_eq!(n.kind, NotificationKind::Milestone);
            assert_eq!(n.message, "hello");
            assert!(!n.is_read);
        }
    }

    #[test]
    fn test_fan_out_empty_membership() {
        let now = Utc.with_ymd_and_hms(2024, 3, 10, 23, 59, 0).unwrap();
        assert!(fan_out(&[], "g1", NotificationKind::StreakBroken, "m", now).is_empty());
    }

    fn group() -> Group {
        Group {
            id: "g1".to_string(),
            name: "Morning Crew".to_string(),
            is_active: true,
        }
    }

    #[tokio::test]
    async fn test_notify_group_writes_one_per_active_member() {
        let store = MemoryStore::new();
        store.insert_member(member("a"));
        store.insert_member(member("b"));
        let mut departed = member("c");
        departed.is_active = false;
        store.insert_member(departed);
        let now = Utc.with_ymd_and_hms(2024, 3, 10, 23, 59, 0).unwrap();

        let count = notify_group(&store, &group(), NotificationKind::Milestone, "hello", now)
            .await
            .unwrap();

        assert_eq!(count, 2);
        let notifications = store.notifications();
        assert_eq!(notifications.len(), 2);
        for n in &notifications {
            assert_eq!(n.message, "hello");
        }
    }

    #[tokio::test]
    async fn test_notify_group_commit_failure_leaves_nothing_behind() {
        let store = MemoryStore::new();
        store.insert_member(member("a"));
        store.set_fail_group("g1");
        let now = Utc.with_ymd_and_hms(2024, 3, 10, 23, 59, 0).unwrap();

        let result = notify_group(&store, &group(), NotificationKind::Milestone, "hello", now).await;

        assert!(result.is_err());
        assert!(store.notifications().is_empty());
    }
}
