//! Step ledger models for storage and API.

use serde::{Deserialize, Serialize};

/// Per-user leaderboard document, keyed by user id.
///
/// Carries a denormalized copy of the display name so rankings can be
/// produced without touching the `users` collection. Refreshed on every
/// step write and on renames.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderboardUser {
    /// Account identifier (also used as document ID)
    pub user_id: String,
    /// Display name at the time of the last write
    pub name: String,
    /// Demo/seed accounts report a static total and skip the daily ledger
    #[serde(default)]
    pub demo: bool,
    /// Static step total for demo accounts
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub demo_steps: Option<i64>,
    /// Last write timestamp (RFC 3339)
    pub updated_at: String,
}

/// One day of steps for one user, keyed by date key within the user's
/// `daily` sub-collection. Upserted, never duplicated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyStepRecord {
    /// Calendar day in `yyyy-MM-dd` form (also used as document ID)
    pub date_key: String,
    /// Step count for that day; non-negative
    pub steps: i64,
    /// Last write timestamp (RFC 3339)
    pub updated_at: String,
}
