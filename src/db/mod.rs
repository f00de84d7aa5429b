//! Database layer (Firestore, plus an in-memory fake for tests).

pub mod firestore;
pub mod memory;

pub use firestore::FirestoreStore;
pub use memory::MemoryStore;

use crate::error::AppError;
use crate::models::{Group, GroupMember, GroupStreak, GroupStreakWeek, Notification};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Collection names as constants.
pub mod collections {
    pub const GROUPS: &str = "groups";
    pub const GROUP_MEMBERS: &str = "group_members";
    /// Streak state documents (keyed by group ID)
    pub const GROUP_STREAKS: &str = "group_streaks";
    /// Weekly compliance snapshots (keyed by `{group_id}_{week_key}`)
    pub const STREAK_WEEKS: &str = "streak_weeks";
    pub const NOTIFICATIONS: &str = "notifications";
}

/// All writes a job produces for one group, committed atomically.
///
/// Either the streak update, the week finalization, and every fan-out
/// notification land together, or none of them do. Partial fan-out is
/// never observable.
#[derive(Debug, Clone, Default)]
pub struct GroupCommit {
    pub group_id: String,
    /// Updated streak state, if the job mutated it
    pub streak: Option<GroupStreak>,
    /// Finalized week record, if the job evaluated it
    pub week: Option<GroupStreakWeek>,
    /// Fan-out notifications to write alongside the state change
    pub notifications: Vec<Notification>,
}

impl GroupCommit {
    pub fn is_empty(&self) -> bool {
        self.streak.is_none() && self.week.is_none() && self.notifications.is_empty()
    }
}

/// Store capability passed into each scheduled job.
///
/// The production implementation is [`FirestoreStore`]; tests
/// substitute [`MemoryStore`].
#[async_trait]
pub trait StreakStore: Send + Sync {
    /// All groups with `is_active == true`.
    async fn list_active_groups(&self) -> Result<Vec<Group>, AppError>;

    /// All active members of a group, for fan-out enumeration.
    async fn list_active_members(&self, group_id: &str) -> Result<Vec<GroupMember>, AppError>;

    /// The group's streak document, if one exists.
    async fn get_streak(&self, group_id: &str) -> Result<Option<GroupStreak>, AppError>;

    /// Overwrite the group's streak document.
    async fn set_streak(&self, group_id: &str, streak: &GroupStreak) -> Result<(), AppError>;

    /// The compliance snapshot for the week starting at `week_start`.
    async fn get_week(
        &self,
        group_id: &str,
        week_start: DateTime<Utc>,
    ) -> Result<Option<GroupStreakWeek>, AppError>;

    /// Create the week record unless one already exists for that group
    /// and week. Returns `true` when a record was created.
    async fn create_week_if_absent(&self, week: &GroupStreakWeek) -> Result<bool, AppError>;

    /// Commit all of a group's writes as a single atomic batch.
    async fn commit_group(&self, commit: GroupCommit) -> Result<(), AppError>;
}

/// Document ID for a week record: `{group_id}_{week_key}`.
pub fn week_doc_id(group_id: &str, week_start: DateTime<Utc>) -> String {
    format!("{}_{}", group_id, crate::time_utils::week_key(week_start))
}
