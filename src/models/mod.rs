//! Document models for the streak collections.

pub mod group;
pub mod notification;
pub mod streak;

pub use group::{Group, GroupMember};
pub use notification::{Notification, NotificationKind};
pub use streak::{GroupStreak, GroupStreakWeek, MemberCompliance, MissOutcome};
