//! Group and membership models.
//!
//! Both are owned by the group-management features of the client app;
//! this service only ever reads them.

use serde::{Deserialize, Serialize};

/// A social unit of workout-tracking members.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
    /// Group ID (also used as document ID)
    pub id: String,
    /// Display name
    pub name: String,
    /// Only active groups are evaluated by the scheduled jobs
    #[serde(default)]
    pub is_active: bool,
}

/// A member of a group, enumerated for notification fan-out.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupMember {
    /// User ID of the member
    pub user_id: String,
    /// Group this membership belongs to
    pub group_id: String,
    /// Display name shown in notification messages
    pub display_name: String,
    /// Profile picture URL
    pub photo_url: Option<String>,
    /// Inactive members receive no notifications
    #[serde(default)]
    pub is_active: bool,
}
