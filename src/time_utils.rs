// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Timestamp helpers for session log fields.

use chrono::{DateTime, SecondsFormat, Utc};

/// RFC3339 with second precision and a `Z` suffix, e.g. `2026-10-18T09:30:00Z`.
pub fn rfc3339_z(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Whole seconds from `since` to `now`; zero if `since` is in the future.
pub fn age_secs(since: DateTime<Utc>, now: DateTime<Utc>) -> u64 {
    u64::try_from((now - since).num_seconds()).unwrap_or(0)
}
