// SPDX-License-Identifier: MIT

//! In-memory store used as a test substitute for Firestore.
//!
//! A single mutex guards all state, so `commit_group` is atomic by
//! construction. Notifications are keyed by their deterministic
//! document ID, matching the overwrite-on-retry behavior of the
//! Firestore implementation.

use crate::db::{week_doc_id, GroupCommit, StreakStore};
use crate::error::AppError;
use crate::models::{Group, GroupMember, GroupStreak, GroupStreakWeek, Notification};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Mutex;

#[derive(Default)]
struct Inner {
    groups: Vec<Group>,
    members: HashMap<String, Vec<GroupMember>>,
    streaks: HashMap<String, GroupStreak>,
    weeks: HashMap<String, GroupStreakWeek>,
    notifications: BTreeMap<String, Notification>,
    fail_groups: HashSet<String>,
}

/// Mutex-guarded in-memory fake.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    // ─── Seeding helpers ─────────────────────────────────────────

    pub fn insert_group(&self, group: Group) {
        self.inner.lock().unwrap().groups.push(group);
    }

    pub fn insert_member(&self, member: GroupMember) {
        self.inner
            .lock()
            .unwrap()
            .members
            .entry(member.group_id.clone())
            .or_default()
            .push(member);
    }

    pub fn insert_streak(&self, streak: GroupStreak) {
        self.inner
            .lock()
            .unwrap()
            .streaks
            .insert(streak.group_id.clone(), streak);
    }

    pub fn insert_week(&self, week: GroupStreakWeek) {
        let key = week_doc_id(&week.group_id, week.week_start);
        self.inner.lock().unwrap().weeks.insert(key, week);
    }

    /// Make `commit_group` fail for this group, for failure-isolation tests.
    pub fn set_fail_group(&self, group_id: &str) {
        self.inner
            .lock()
            .unwrap()
            .fail_groups
            .insert(group_id.to_string());
    }

    // ─── Inspection helpers ──────────────────────────────────────

    /// All stored notifications, ordered by document ID.
    pub fn notifications(&self) -> Vec<Notification> {
        self.inner
            .lock()
            .unwrap()
            .notifications
            .values()
            .cloned()
            .collect()
    }

    pub fn streak(&self, group_id: &str) -> Option<GroupStreak> {
        self.inner.lock().unwrap().streaks.get(group_id).cloned()
    }

    pub fn week(&self, group_id: &str, week_start: DateTime<Utc>) -> Option<GroupStreakWeek> {
        let key = week_doc_id(group_id, week_start);
        self.inner.lock().unwrap().weeks.get(&key).cloned()
    }
}

#[async_trait]
impl StreakStore for MemoryStore {
    async fn list_active_groups(&self) -> Result<Vec<Group>, AppError> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .groups
            .iter()
            .filter(|g| g.is_active)
            .cloned()
            .collect())
    }

    async fn list_active_members(&self, group_id: &str) -> Result<Vec<GroupMember>, AppError> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .members
            .get(group_id)
            .map(|members| {
                members
                    .iter()
                    .filter(|m| m.is_active)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn get_streak(&self, group_id: &str) -> Result<Option<GroupStreak>, AppError> {
        Ok(self.inner.lock().unwrap().streaks.get(group_id).cloned())
    }

    async fn set_streak(&self, group_id: &str, streak: &GroupStreak) -> Result<(), AppError> {
        self.inner
            .lock()
            .unwrap()
            .streaks
            .insert(group_id.to_string(), streak.clone());
        Ok(())
    }

    async fn get_week(
        &self,
        group_id: &str,
        week_start: DateTime<Utc>,
    ) -> Result<Option<GroupStreakWeek>, AppError> {
        let key = week_doc_id(group_id, week_start);
        Ok(self.inner.lock().unwrap().weeks.get(&key).cloned())
    }

    async fn create_week_if_absent(&self, week: &GroupStreakWeek) -> Result<bool, AppError> {
        let key = week_doc_id(&week.group_id, week.week_start);
        let mut inner = self.inner.lock().unwrap();
        if inner.weeks.contains_key(&key) {
            return Ok(false);
        }
        inner.weeks.insert(key, week.clone());
        Ok(true)
    }

    async fn commit_group(&self, commit: GroupCommit) -> Result<(), AppError> {
        let mut inner = self.inner.lock().unwrap();

        if inner.fail_groups.contains(&commit.group_id) {
            return Err(AppError::Database(format!(
                "Injected commit failure for group {}",
                commit.group_id
            )));
        }

        if let Some(streak) = commit.streak {
            inner.streaks.insert(commit.group_id.clone(), streak);
        }
        if let Some(week) = commit.week {
            let key = week_doc_id(&week.group_id, week.week_start);
            inner.weeks.insert(key, week);
        }
        for notification in commit.notifications {
            inner
                .notifications
                .insert(notification.doc_id(), notification);
        }

        Ok(())
    }
}
