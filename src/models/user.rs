//! User profile model for storage and API.

use serde::{Deserialize, Serialize};

/// User profile stored in the `users` collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    /// Stable account identifier (also used as document ID)
    pub id: String,
    /// Display name shown on leaderboards; unique at time of write
    pub display_name: String,
    /// Anonymous accounts are read-only
    #[serde(default)]
    pub anonymous: bool,
    /// Groups this user belongs to.
    ///
    /// Updated separately from `groups/{id}.member_ids`; a stale id in
    /// either list is skipped by readers rather than treated as corruption.
    #[serde(default)]
    pub group_ids: Vec<String>,
    /// Friend user ids for the friends-only leaderboard view
    #[serde(default)]
    pub friend_ids: Vec<String>,
    /// When the user first signed in (RFC 3339)
    pub created_at: String,
}

impl UserProfile {
    /// Whether this profile is allowed to mutate server state.
    pub fn can_write(&self) -> bool {
        !self.id.is_empty() && !self.anonymous
    }
}
