// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Leaderboard entries and the signed-in user's standing.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// One row of `GET /api/leaderboard`, already ordered by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct LeaderboardEntry {
    pub uid: String,
    pub name: String,
    #[serde(default)]
    pub picture: Option<String>,
    #[serde(default)]
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub points: u64,
    #[serde(default)]
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub problems_solved: u64,
}

/// Where a user sits on the leaderboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LeaderboardStanding {
    /// 1-based rank, `None` if the user is not listed
    pub rank: Option<usize>,
    pub total: usize,
    /// Share of users ranked below, rounded (0 when unranked)
    pub percentile: u32,
}

impl LeaderboardStanding {
    pub fn compute(entries: &[LeaderboardEntry], uid: &str) -> Self {
        let total = entries.len();
        let rank = entries.iter().position(|e| e.uid == uid).map(|i| i + 1);

        let percentile = match rank {
            Some(rank) if total > 0 => ((1.0 - rank as f64 / total as f64) * 100.0).round() as u32,
            _ => 0,
        };

        Self {
            rank,
            total,
            percentile,
        }
    }
}
