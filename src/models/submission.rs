// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Judge results for run and submit requests.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Outcome of a single test case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct TestCaseResult {
    /// "Accepted", "Wrong Answer", "Runtime Error", ...
    pub status: String,
    pub passed: bool,
    #[serde(default)]
    pub output: String,
    #[serde(default)]
    #[cfg_attr(feature = "binding-generation", ts(type = "unknown"))]
    pub expected: serde_json::Value,
    #[serde(default)]
    pub error: String,
}

/// Empirical complexity check attached to a submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ComplexityCheck {
    pub passes: bool,
    /// False when the check was skipped
    #[serde(default)]
    pub analyzed: bool,
    #[serde(default)]
    pub detected: Option<String>,
    #[serde(default)]
    pub expected: Option<String>,
    #[serde(default)]
    pub reason: String,
}

/// Response of `POST /api/problem/{slug}/run` (sample tests only).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct RunResult {
    pub all_passed: bool,
    #[serde(default)]
    pub results: Vec<TestCaseResult>,
}

/// Response of `POST /api/problem/{slug}/submit`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct SubmissionResult {
    pub all_passed: bool,
    /// Points earned by this submission
    #[serde(default)]
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub total_points: u64,
    #[serde(default)]
    pub verdict: String,
    #[serde(default)]
    pub results: Vec<TestCaseResult>,
    #[serde(default)]
    pub complexity_check: Option<ComplexityCheck>,
}

impl SubmissionResult {
    /// (passed, total) test case counts.
    pub fn passed_count(&self) -> (usize, usize) {
        let passed = self.results.iter().filter(|r| r.passed).count();
        (passed, self.results.len())
    }
}
