// SPDX-License-Identifier: MIT

//! Week-end streak evaluation job.
//!
//! Runs Sunday just before the week rolls over. For each active group
//! it computes compliance from the week's snapshot, drives the streak
//! state machine, and commits the streak update, the finalized week
//! record, and any fan-out notifications in one atomic batch.
//!
//! Completions landing between the snapshot read and the commit fall
//! into the next week's record; the job runs at the week boundary where
//! new completions are structurally rare.

use crate::db::{GroupCommit, StreakStore};
use crate::error::Result;
use crate::models::{Group, MissOutcome, Notification, NotificationKind};
use crate::services::notify::fan_out;
use crate::services::JobSummary;
use crate::time_utils::{current_week_bounds, WeekBounds};
use chrono::{DateTime, Utc};
use futures_util::{stream, StreamExt};
use std::sync::Arc;

/// Groups are independent; process them with bounded concurrency.
const MAX_CONCURRENT_GROUPS: usize = 16;

/// Celebration sent when a streak crosses a milestone threshold.
pub fn milestone_message(group_name: &str, days: u32) -> String {
    format!("{} is on a {}-day streak! Keep it rolling!", group_name, days)
}

/// Sent when a streak resets after a non-compliant week.
pub fn streak_broken_message(group_name: &str, previous_days: u32) -> String {
    format!(
        "{}'s {}-day streak has ended. Start a new one this week!",
        group_name, previous_days
    )
}

/// The Sunday evaluation job.
pub struct WeeklyStreakEvaluator {
    store: Arc<dyn StreakStore>,
}

impl WeeklyStreakEvaluator {
    pub fn new(store: Arc<dyn StreakStore>) -> Self {
        Self { store }
    }

    /// Evaluate the week containing `now` for every active group.
    pub async fn run(&self, now: DateTime<Utc>) -> Result<JobSummary> {
        let bounds = current_week_bounds(now);
        let groups = self.store.list_active_groups().await?;
        let mut summary = JobSummary::default();

        let tasks: Vec<_> = groups
            .iter()
            .map(|group| async move { (group, self.evaluate_group(group, &bounds, now).await) })
            .collect();
        let results = stream::iter(tasks)
            .buffer_unordered(MAX_CONCURRENT_GROUPS)
            .collect::<Vec<_>>()
            .await;

        for (group, result) in results {
            match result {
                Ok(Some(count)) => {
                    summary.processed += 1;
                    summary.notifications += count;
                }
                Ok(None) => summary.skipped += 1,
                Err(e) => {
                    tracing::error!(
                        group_id = %group.id,
                        error = %e,
                        "Week evaluation failed for group"
                    );
                    summary.failed += 1;
                }
            }
        }

        Ok(summary)
    }

    /// Returns the number of notifications written, or `None` when the
    /// group was not evaluable this cycle.
    async fn evaluate_group(
        &self,
        group: &Group,
        bounds: &WeekBounds,
        now: DateTime<Utc>,
    ) -> Result<Option<u32>> {
        let Some(mut week) = self.store.get_week(&group.id, bounds.start).await? else {
            tracing::warn!(group_id = %group.id, "No week record, group not evaluable");
            return Ok(None);
        };

        // Re-invocation guard: a finalized week is never mutated again.
        if week.all_compliant.is_some() {
            tracing::debug!(group_id = %group.id, "Week already evaluated, skipping");
            return Ok(None);
        }

        // No tracked members: skip rather than count a vacuous success.
        if week.member_compliance.is_empty() {
            tracing::debug!(group_id = %group.id, "No tracked members this week, skipping");
            return Ok(None);
        }

        let Some(mut streak) = self.store.get_streak(&group.id).await? else {
            tracing::warn!(group_id = %group.id, "Missing streak document, group not evaluable");
            return Ok(None);
        };

        let all_compliant = week.member_compliance.values().all(|c| c.is_compliant());
        let mut notifications: Vec<Notification> = Vec::new();

        if all_compliant {
            if let Some(milestone) = streak.record_compliant_week(week.week_start) {
                let members = self.store.list_active_members(&group.id).await?;
                notifications = fan_out(
                    &members,
                    &group.id,
                    NotificationKind::Milestone,
                    &milestone_message(&group.name, milestone),
                    now,
                );
                tracing::info!(group_id = %group.id, milestone, "Milestone reached");
            }
        } else {
            match streak.record_missed_week(now) {
                MissOutcome::Held => {
                    tracing::info!(
                        group_id = %group.id,
                        streak_days = streak.streak_days,
                        "Non-compliant week absorbed by pause"
                    );
                }
                MissOutcome::AlreadyZero => {}
                MissOutcome::Broken { previous_days } => {
                    let members = self.store.list_active_members(&group.id).await?;
                    notifications = fan_out(
                        &members,
                        &group.id,
                        NotificationKind::StreakBroken,
                        &streak_broken_message(&group.name, previous_days),
                        now,
                    );
                    tracing::info!(group_id = %group.id, previous_days, "Streak broken");
                }
            }
        }

        week.all_compliant = Some(all_compliant);

        let count = notifications.len() as u32;
        self.store
            .commit_group(GroupCommit {
                group_id: group.id.clone(),
                streak: Some(streak),
                week: Some(week),
                notifications,
            })
            .await?;

        Ok(Some(count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_milestone_message_mentions_days() {
        let msg = milestone_message("Morning Crew", 7);
        assert!(msg.contains("7-day streak"));
        assert!(msg.starts_with("Morning Crew"));
    }

    #[test]
    fn test_streak_broken_message_mentions_previous_length() {
        let msg = streak_broken_message("Morning Crew", 21);
        assert!(msg.contains("21-day streak has ended"));
    }
}
