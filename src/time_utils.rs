// SPDX-License-Identifier: MIT
// Copyright 2026 Paceline Authors

//! Shared helpers for date/time formatting.

use chrono::{SecondsFormat, Utc};

/// Current UTC time as RFC3339 with a `Z` suffix.
pub fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Today's date in the server's local calendar.
pub fn today_local() -> chrono::NaiveDate {
    chrono::Local::now().date_naive()
}
