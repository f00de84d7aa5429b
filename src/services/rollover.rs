// SPDX-License-Identifier: MIT

//! Week-start rollover job.
//!
//! Runs Monday 00:00 UTC: creates the new week's empty compliance
//! record for every active group (create-if-absent, so re-invocation is
//! a no-op) and, on the first run of each calendar month, clears the
//! one-pause-per-month flag.

use crate::db::StreakStore;
use crate::error::Result;
use crate::models::{Group, GroupStreakWeek};
use crate::services::JobSummary;
use crate::time_utils::{current_week_bounds, starts_new_month, WeekBounds};
use chrono::{DateTime, Utc};
use futures_util::{stream, StreamExt};
use std::sync::Arc;

/// Groups are independent; process them with bounded concurrency.
const MAX_CONCURRENT_GROUPS: usize = 16;

/// The Monday rollover job.
pub struct WeeklyWeekCreator {
    store: Arc<dyn StreakStore>,
}

impl WeeklyWeekCreator {
    pub fn new(store: Arc<dyn StreakStore>) -> Self {
        Self { store }
    }

    /// Roll every active group over into the week containing `now`.
    pub async fn run(&self, now: DateTime<Utc>) -> Result<JobSummary> {
        let bounds = current_week_bounds(now);
        let month_rollover = starts_new_month(bounds.start);
        if month_rollover {
            tracing::info!(week_start = %bounds.start, "First week of the month, resetting pause allowances");
        }

        let groups = self.store.list_active_groups().await?;
        let mut summary = JobSummary::default();

        let tasks: Vec<_> = groups
            .iter()
            .map(|group| async move {
                (
                    group,
                    self.rollover_group(group, &bounds, month_rollover, now).await,
                )
            })
            .collect();
        let results = stream::iter(tasks)
            .buffer_unordered(MAX_CONCURRENT_GROUPS)
            .collect::<Vec<_>>()
            .await;

        for (group, result) in results {
            match result {
                Ok(true) => summary.processed += 1,
                Ok(false) => summary.skipped += 1,
                Err(e) => {
                    tracing::error!(
                        group_id = %group.id,
                        error = %e,
                        "Week rollover failed for group"
                    );
                    summary.failed += 1;
                }
            }
        }

        Ok(summary)
    }

    /// Returns `true` when a new week record was created.
    async fn rollover_group(
        &self,
        group: &Group,
        bounds: &WeekBounds,
        month_rollover: bool,
        now: DateTime<Utc>,
    ) -> Result<bool> {
        let week = GroupStreakWeek::new(&group.id, bounds, now);
        let created = self.store.create_week_if_absent(&week).await?;
        if !created {
            tracing::debug!(group_id = %group.id, "Week record already exists");
        }

        if month_rollover {
            match self.store.get_streak(&group.id).await? {
                Some(mut streak) if streak.pause_used_this_month => {
                    streak.pause_used_this_month = false;
                    self.store.set_streak(&group.id, &streak).await?;
                    tracing::info!(group_id = %group.id, "Monthly pause allowance reset");
                }
                Some(_) => {}
                None => {
                    tracing::debug!(group_id = %group.id, "No streak document, skipping pause reset");
                }
            }
        }

        Ok(created)
    }
}
