//! Streak state and weekly compliance snapshots.
//!
//! The streak state machine lives here as pure methods so it can be
//! unit-tested without a store; the evaluator job only orchestrates
//! reads, these transitions, and the atomic commit.

use crate::config::{MILESTONES, REQUIRED_WORKOUTS};
use crate::time_utils::WeekBounds;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Durable streak state, one document per group.
///
/// `streak_days` only ever increases by exactly 7 (one compliant week)
/// or resets to 0.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupStreak {
    /// Group this streak belongs to (also the document ID)
    pub group_id: String,
    /// Current streak length in days, always a multiple of 7
    #[serde(default)]
    pub streak_days: u32,
    /// Highest milestone already notified for the current run
    #[serde(default)]
    pub last_milestone: u32,
    /// When the current run began; None while the streak is at zero
    #[serde(default)]
    pub streak_start_date: Option<DateTime<Utc>>,
    /// While set and in the future, a failed week holds the streak
    /// instead of resetting it
    #[serde(default)]
    pub paused_until: Option<DateTime<Utc>>,
    /// Guards one grace pause per calendar month; cleared by the
    /// week-creator job on month rollover
    #[serde(default)]
    pub pause_used_this_month: bool,
}

/// Outcome of a non-compliant week.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissOutcome {
    /// An active pause absorbed the miss; streak unchanged.
    Held,
    /// The streak was already at zero; nothing to break.
    AlreadyZero,
    /// The streak reset. `previous_days` is the length it had.
    Broken { previous_days: u32 },
}

impl GroupStreak {
    /// Fresh zero-length streak for a group.
    pub fn new(group_id: &str) -> Self {
        Self {
            group_id: group_id.to_string(),
            streak_days: 0,
            last_milestone: 0,
            streak_start_date: None,
            paused_until: None,
            pause_used_this_month: false,
        }
    }

    /// Advance the streak by one compliant week.
    ///
    /// Returns the newly crossed milestone when the new length is in
    /// the milestone set and strictly above `last_milestone`, updating
    /// `last_milestone` so the same threshold never notifies twice.
    pub fn record_compliant_week(&mut self, week_start: DateTime<Utc>) -> Option<u32> {
        if self.streak_days == 0 {
            self.streak_start_date = Some(week_start);
        }
        self.streak_days += 7;

        if MILESTONES.contains(&self.streak_days) && self.streak_days > self.last_milestone {
            self.last_milestone = self.streak_days;
            Some(self.streak_days)
        } else {
            None
        }
    }

    /// Apply a non-compliant week.
    ///
    /// A pause still in effect holds the streak. Otherwise the streak
    /// resets to zero; `last_milestone` resets with it so a rebuilt
    /// run fires its milestones again.
    pub fn record_missed_week(&mut self, now: DateTime<Utc>) -> MissOutcome {
        if self.paused_until.is_some_and(|until| until > now) {
            return MissOutcome::Held;
        }
        if self.streak_days == 0 {
            return MissOutcome::AlreadyZero;
        }

        let previous_days = self.streak_days;
        self.streak_days = 0;
        self.last_milestone = 0;
        self.streak_start_date = None;
        MissOutcome::Broken { previous_days }
    }
}

/// Per-member progress within a week.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberCompliance {
    /// Display name snapshot for notification messages
    pub display_name: String,
    /// Profile picture URL snapshot
    pub photo_url: Option<String>,
    /// Workouts completed so far this week; incremented by the
    /// (external) workout-completion path
    #[serde(default)]
    pub workout_count: u32,
    /// Most recent workout timestamp
    #[serde(default)]
    pub last_workout_date: Option<DateTime<Utc>>,
}

impl MemberCompliance {
    pub fn is_compliant(&self) -> bool {
        self.workout_count >= REQUIRED_WORKOUTS
    }
}

/// Weekly compliance snapshot, one document per group per week.
///
/// Created empty at week start, filled by workout completions, and
/// finalized once (`all_compliant` set) by the week-end evaluation.
/// Never mutated after evaluation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupStreakWeek {
    pub group_id: String,
    /// Monday 00:00:00.000 UTC
    pub week_start: DateTime<Utc>,
    /// Sunday 23:59:59.999 UTC
    pub week_end: DateTime<Utc>,
    /// Per-member progress, keyed by user ID
    #[serde(default)]
    pub member_compliance: HashMap<String, MemberCompliance>,
    /// Set exactly once when the week is evaluated
    #[serde(default)]
    pub all_compliant: Option<bool>,
    pub created_at: DateTime<Utc>,
}

impl GroupStreakWeek {
    /// Empty record for a new week.
    pub fn new(group_id: &str, bounds: &WeekBounds, now: DateTime<Utc>) -> Self {
        Self {
            group_id: group_id.to_string(),
            week_start: bounds.start,
            week_end: bounds.end,
            member_compliance: HashMap::new(),
            all_compliant: None,
            created_at: now,
        }
    }
}
