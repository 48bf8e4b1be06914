// SPDX-License-Identifier: MIT
// Copyright 2026 Paceline Authors

//! Leaderboard entries, ranking, and row-pinning logic.

use serde::{Deserialize, Serialize};

/// One ranked row of a leaderboard. Derived from the step ledger for a
/// resolved date range; never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub user_id: String,
    pub name: String,
    pub total_steps: i64,
    /// 1-based position after the descending sort
    pub rank: u32,
}

/// The user set a ranking is computed over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    /// Every user with a leaderboard document
    All,
    /// The viewer plus their friend list
    Friends { viewer_id: String },
    /// Members of one group
    Group { group_id: String },
}

/// Sort entries by total steps descending and assign contiguous 1-based
/// ranks. Ties are broken by user id ascending so repeated aggregations of
/// the same data always produce the same ordering.
pub fn rank_entries(mut entries: Vec<LeaderboardEntry>) -> Vec<LeaderboardEntry> {
    entries.sort_by(|a, b| {
        b.total_steps
            .cmp(&a.total_steps)
            .then_with(|| a.user_id.cmp(&b.user_id))
    });
    for (index, entry) in entries.iter_mut().enumerate() {
        entry.rank = index as u32 + 1;
    }
    entries
}

/// Whether the current user's row needs a duplicate pinned row because it
/// would sit outside the visible viewport.
///
/// `current_row_top` is the row's offset from the top of the viewport, or
/// `None` when the row is not laid out at all (user not in the list).
pub fn needs_pinned_row(
    current_row_top: Option<f64>,
    viewport_height: f64,
    pinned_row_height: f64,
    margin: f64,
) -> bool {
    match current_row_top {
        None => true,
        Some(top) => top < 0.0 || top >= viewport_height - pinned_row_height - margin,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(user_id: &str, steps: i64) -> LeaderboardEntry {
        LeaderboardEntry {
            user_id: user_id.to_string(),
            name: user_id.to_string(),
            total_steps: steps,
            rank: 0,
        }
    }

    #[test]
    fn test_rank_sorts_descending_with_contiguous_ranks() {
        let ranked = rank_entries(vec![entry("a", 100), entry("b", 300), entry("c", 200)]);
        assert_eq!(
            ranked.iter().map(|e| e.user_id.as_str()).collect::<Vec<_>>(),
            vec!["b", "c", "a"]
        );
        assert_eq!(ranked.iter().map(|e| e.rank).collect::<Vec<_>>(), vec![1, 2, 3]);
    }

    #[test]
    fn test_ties_break_by_user_id_ascending() {
        let ranked = rank_entries(vec![entry("zed", 500), entry("amy", 500), entry("mia", 500)]);
        assert_eq!(
            ranked.iter().map(|e| e.user_id.as_str()).collect::<Vec<_>>(),
            vec!["amy", "mia", "zed"]
        );
    }

    #[test]
    fn test_empty_input_ranks_to_empty() {
        assert!(rank_entries(vec![]).is_empty());
    }

    #[test]
    fn test_pinned_when_row_missing() {
        assert!(needs_pinned_row(None, 600.0, 44.0, 8.0));
    }

    #[test]
    fn test_pinned_when_scrolled_above_viewport() {
        assert!(needs_pinned_row(Some(-10.0), 600.0, 44.0, 8.0));
    }

    #[test]
    fn test_pinned_when_below_fold() {
        // 600 - 44 - 8 = 548 is the first offscreen position
        assert!(needs_pinned_row(Some(548.0), 600.0, 44.0, 8.0));
        assert!(needs_pinned_row(Some(900.0), 600.0, 44.0, 8.0));
    }

    #[test]
    fn test_not_pinned_when_visible() {
        assert!(!needs_pinned_row(Some(0.0), 600.0, 44.0, 8.0));
        assert!(!needs_pinned_row(Some(547.9), 600.0, 44.0, 8.0));
    }
}
