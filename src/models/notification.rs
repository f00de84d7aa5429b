//! Notification fan-out records.
//!
//! Write-only from this service; reading and marking-as-read belong to
//! the client app.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of notification, stored snake_case on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Milestone,
    StreakBroken,
    AtRisk,
    GroupAtRisk,
}

impl std::fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            NotificationKind::Milestone => "milestone",
            NotificationKind::StreakBroken => "streak_broken",
            NotificationKind::AtRisk => "at_risk",
            NotificationKind::GroupAtRisk => "group_at_risk",
        };
        f.write_str(s)
    }
}

/// One notification for one user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    /// Recipient
    pub user_id: String,
    /// Group the notification is about
    pub group_id: String,
    /// Notification kind
    pub kind: NotificationKind,
    /// Human-readable message
    pub message: String,
    /// Always false at creation
    #[serde(default)]
    pub is_read: bool,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Notification {
    /// Deterministic document ID: a same-day retry of a job overwrites
    /// its own notifications instead of duplicating them.
    pub fn doc_id(&self) -> String {
        format!(
            "{}_{}_{}_{}",
            self.user_id,
            self.group_id,
            self.kind,
            self.created_at.format("%Y%m%d")
        )
    }
}
