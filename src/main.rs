// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Judge session status
//!
//! Loads the persisted session, validates it against the judge backend and
//! reports whether the user is still signed in.

use judge_client::{config::Config, services::SessionState, time_utils, ClientContext};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    let config = Config::from_env()?;
    tracing::info!(
        api_url = %config.api_url,
        session_dir = %config.session_dir.display(),
        "Starting judge session check"
    );

    let ctx = ClientContext::open(config)?;

    if ctx.session.state() == SessionState::Absent {
        tracing::info!(redirect = %ctx.config.auth_path, "No cached session");
        return Ok(());
    }

    if ctx.session.validate().await? {
        if let Some(profile) = ctx.session.profile() {
            let verified_age_secs = ctx
                .session
                .verified_at()
                .map(|at| time_utils::age_secs(at, chrono::Utc::now()));
            tracing::info!(
                uid = %profile.uid,
                verified_age_secs,
                points = profile.points,
                problems_solved = profile.problems_solved,
                "Session valid"
            );
        }
    } else {
        tracing::info!(redirect = %ctx.config.auth_path, "Session no longer valid");
    }

    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("judge_client=debug,info"));

    tracing_subscriber::registry().with(filter).with(format).init();
}
