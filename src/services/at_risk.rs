// SPDX-License-Identifier: MIT

//! Mid-week early-warning job.
//!
//! Runs Thursday evening: scans active groups, finds members behind on
//! the weekly quota, and warns them (personally) and their group. Pure
//! observation; no streak state is mutated, so redundant runs are
//! harmless.

use crate::config::REQUIRED_WORKOUTS;
use crate::db::{GroupCommit, StreakStore};
use crate::error::Result;
use crate::models::{Group, MemberCompliance, Notification, NotificationKind};
use crate::services::notify::notify_group;
use crate::services::JobSummary;
use crate::time_utils::{current_week_bounds, WeekBounds};
use chrono::{DateTime, Utc};
use futures_util::{stream, StreamExt};
use std::sync::Arc;

/// Groups are independent; process them with bounded concurrency.
const MAX_CONCURRENT_GROUPS: usize = 16;

/// Personal warning for a member who still needs `needed` workouts.
pub fn at_risk_message(needed: u32, group_name: &str) -> String {
    format!(
        "Complete {} more workout{} by Sunday to keep {}'s streak alive!",
        needed,
        if needed == 1 { "" } else { "s" },
        group_name
    )
}

/// Group-wide summary listing everyone who is behind, e.g.
/// "Alice (1/3), Bob (2/3)".
pub fn group_at_risk_message(group_name: &str, behind: &[&MemberCompliance]) -> String {
    let roster = behind
        .iter()
        .map(|c| format!("{} ({}/{})", c.display_name, c.workout_count, REQUIRED_WORKOUTS))
        .collect::<Vec<_>>()
        .join(", ");
    format!("{} is falling behind this week: {}", group_name, roster)
}

/// The Thursday warning job.
pub struct AtRiskNotifier {
    store: Arc<dyn StreakStore>,
}

impl AtRiskNotifier {
    pub fn new(store: Arc<dyn StreakStore>) -> Self {
        Self { store }
    }

    /// Scan all active groups for the week containing `now`.
    pub async fn run(&self, now: DateTime<Utc>) -> Result<JobSummary> {
        let bounds = current_week_bounds(now);
        let groups = self.store.list_active_groups().await?;
        let mut summary = JobSummary::default();

        let tasks: Vec<_> = groups
            .iter()
            .map(|group| async move { (group, self.check_group(group, &bounds, now).await) })
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
                        "At-risk check failed for group"
                    );
                    summary.failed += 1;
                }
            }
        }

        Ok(summary)
    }

    /// Returns the number of notifications written, or `None` when the
    /// group needed no warning.
    async fn check_group(
        &self,
        group: &Group,
        bounds: &WeekBounds,
        now: DateTime<Utc>,
    ) -> Result<Option<u32>> {
        let Some(week) = self.store.get_week(&group.id, bounds.start).await? else {
            tracing::debug!(group_id = %group.id, "No week record, skipping at-risk check");
            return Ok(None);
        };

        let mut behind: Vec<(&String, &MemberCompliance)> = week
            .member_compliance
            .iter()
            .filter(|(_, c)| !c.is_compliant())
            .collect();

        if behind.is_empty() {
            return Ok(None);
        }
        behind.sort_by(|a, b| a.1.display_name.cmp(&b.1.display_name));

        // Personal warnings for the members who are behind, in one batch.
        let personal: Vec<Notification> = behind
            .iter()
            .map(|(user_id, compliance)| Notification {
                user_id: (*user_id).clone(),
                group_id: group.id.clone(),
                kind: NotificationKind::AtRisk,
                message: at_risk_message(
                    REQUIRED_WORKOUTS.saturating_sub(compliance.workout_count),
                    &group.name,
                ),
                is_read: false,
                created_at: now,
            })
            .collect();

        let mut count = personal.len() as u32;
        self.store
            .commit_group(GroupCommit {
                group_id: group.id.clone(),
                streak: None,
                week: None,
                notifications: personal,
            })
            .await?;

        // One group-wide heads-up to every active member.
        let roster: Vec<&MemberCompliance> = behind.iter().map(|(_, c)| *c).collect();
        count += notify_group(
            self.store.as_ref(),
            group,
            NotificationKind::GroupAtRisk,
            &group_at_risk_message(&group.name, &roster),
            now,
        )
        .await?;

        tracing::info!(
            group_id = %group.id,
            at_risk = behind.len(),
            notifications = count,
            "At-risk members detected"
        );

        Ok(Some(count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compliance(name: &str, count: u32) -> MemberCompliance {
        MemberCompliance {
            display_name: name.to_string(),
            photo_url: None,
            workout_count: count,
            last_workout_date: None,
        }
    }

    #[test]
    fn test_at_risk_message_singular() {
        let msg = at_risk_message(1, "Morning Crew");
        assert_eq!(
            msg,
            "Complete 1 more workout by Sunday to keep Morning Crew's streak alive!"
        );
    }

    #[test]
    fn test_at_risk_message_plural() {
        let msg = at_risk_message(2, "Morning Crew");
        assert_eq!(
            msg,
            "Complete 2 more workouts by Sunday to keep Morning Crew's streak alive!"
        );
    }

    #[test]
    fn test_group_at_risk_message_roster() {
        let alice = compliance("Alice", 1);
        let bob = compliance("Bob", 2);
        let msg = group_at_risk_message("Morning Crew", &[&alice, &bob]);
        assert_eq!(
            msg,
            "Morning Crew is falling behind this week: Alice (1/3), Bob (2/3)"
        );
    }
}
