// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Read-side page data: dashboard, problem list, leaderboard and profiles.

use crate::error::{AppError, Result};
use crate::models::{
    DifficultyProgress, LeaderboardEntry, LeaderboardStanding, Problem, ProviderKind,
    PublicProfile, UserSnapshot,
};
use crate::services::session::SessionCache;
use crate::services::BackendClient;
use std::sync::Arc;

/// Everything the home page renders after sign-in.
#[derive(Debug, Clone)]
pub struct Dashboard {
    /// Authoritative profile, also written back to the cache
    pub profile: UserSnapshot,
    pub problems: Vec<Problem>,
    pub leaderboard: Vec<LeaderboardEntry>,
    pub standing: LeaderboardStanding,
    pub progress: Vec<DifficultyProgress>,
}

impl Dashboard {
    /// Problems the user has not solved yet, in backend order.
    pub fn unsolved(&self) -> impl Iterator<Item = &Problem> {
        self.problems
            .iter()
            .filter(|p| !self.profile.has_solved(&p.id))
    }
}

#[derive(Clone)]
pub struct DashboardService {
    cache: Arc<SessionCache>,
    backend: BackendClient,
}

impl DashboardService {
    pub fn new(cache: Arc<SessionCache>, backend: BackendClient) -> Self {
        Self { cache, backend }
    }

    /// Fetch user, problems and leaderboard in parallel.
    pub async fn load(&self) -> Result<Dashboard> {
        let (user, problems, leaderboard) = self
            .cache
            .authorized("load_dashboard", |s| async move {
                tokio::try_join!(
                    self.backend.get_user(&s.token, &s.profile.uid),
                    self.backend.get_problems(&s.token),
                    self.backend.get_leaderboard(&s.token),
                )
            })
            .await?;

        let profile = self
            .cache
            .replace_profile(user)?
            .ok_or(AppError::NotSignedIn)?;

        let standing = LeaderboardStanding::compute(&leaderboard, &profile.uid);
        let progress = DifficultyProgress::compute(&problems, &profile.solved_problems);

        tracing::debug!(
            problems = problems.len(),
            rank = ?standing.rank,
            "Dashboard loaded"
        );

        Ok(Dashboard {
            profile,
            problems,
            leaderboard,
            standing,
            progress,
        })
    }

    pub async fn problem(&self, slug: &str) -> Result<Problem> {
        self.cache
            .authorized("load_problem", |s| async move {
                self.backend.get_problem(&s.token, slug).await
            })
            .await
    }

    pub async fn leaderboard(&self) -> Result<Vec<LeaderboardEntry>> {
        self.cache
            .authorized("load_leaderboard", |s| async move {
                self.backend.get_leaderboard(&s.token).await
            })
            .await
    }

    /// Anyone's public profile; works without a session.
    pub async fn public_profile(&self, uid: &str) -> Result<PublicProfile> {
        self.backend.get_public_profile(uid).await
    }

    /// Where to send the browser to start a redirect-based sign-in.
    pub async fn oauth_authorization_url(&self, kind: ProviderKind) -> Result<String> {
        self.backend.oauth_config().await?.authorization_url(kind)
    }
}
