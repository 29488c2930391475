// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Typed schemas for everything crossing the backend boundary.

pub mod auth;
pub mod leaderboard;
pub mod problem;
pub mod submission;
pub mod user;

pub use auth::{OAuthConfig, OAuthProvider, ProviderKind, VerifyTokenResponse};
pub use leaderboard::{LeaderboardEntry, LeaderboardStanding};
pub use problem::{Difficulty, DifficultyProgress, Problem, ProblemFilter};
pub use submission::{ComplexityCheck, RunResult, SubmissionResult, TestCaseResult};
pub use user::{ProblemId, ProfilePatch, PublicProfile, SolvedProblem, UserSnapshot};
