// SPDX-License-Identifier: MIT
// Copyright 2026 Paceline Authors

//! Shared helpers for resolving aggregation periods into calendar-day keys.
//!
//! A date key is the canonical `yyyy-MM-dd` string for one calendar day in
//! the user's local calendar. All leaderboard queries are expressed in terms
//! of ordered runs of date keys produced here.

use chrono::{Datelike, Days, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// Aggregation granularity for leaderboard queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Day,
    Week,
    Month,
}

/// Format a calendar date as a `yyyy-MM-dd` date key.
pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Parse a `yyyy-MM-dd` date key back into a calendar date.
pub fn parse_date_key(key: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(key, "%Y-%m-%d").ok()
}

/// Resolve a period and reference date into the ordered date keys covering it.
///
/// - `Day`: exactly the reference date.
/// - `Week`: the 7 contiguous days of the week containing the reference date,
///   starting from `week_start`.
/// - `Month`: the 1st through the last day of the reference date's month.
pub fn date_keys(period: Period, reference: NaiveDate, week_start: Weekday) -> Vec<String> {
    match period {
        Period::Day => vec![date_key(reference)],
        Period::Week => {
            let start = week_start_of(reference, week_start);
            (0..7)
                .filter_map(|offset| start.checked_add_days(Days::new(offset)))
                .map(date_key)
                .collect()
        }
        Period::Month => {
            let days = days_in_month(reference.year(), reference.month());
            (1..=days)
                .filter_map(|day| NaiveDate::from_ymd_opt(reference.year(), reference.month(), day))
                .map(date_key)
                .collect()
        }
    }
}

/// The first day of the week containing `date`, given the configured week start.
fn week_start_of(date: NaiveDate, week_start: Weekday) -> NaiveDate {
    let offset = (date.weekday().num_days_from_monday() + 7
        - week_start.num_days_from_monday())
        % 7;
    date.checked_sub_days(Days::new(u64::from(offset)))
        .unwrap_or(date)
}

/// Number of days in the given month.
fn days_in_month(year: i32, month: u32) -> u32 {
    let first = NaiveDate::from_ymd_opt(year, month, 1);
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    match (first, next) {
        (Some(first), Some(next)) => next.signed_duration_since(first).num_days() as u32,
        _ => 30,
    }
}
