// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Client configuration loaded from environment variables.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Client configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the judge backend (no trailing slash)
    pub api_url: String,
    /// Directory holding the persisted session document
    pub session_dir: PathBuf,
    /// Where callers are sent to restart the identity flow
    pub auth_path: String,
    /// Per-request timeout for backend calls
    pub request_timeout: Duration,
    /// Retry policy applied to token validation
    pub validate_retry: RetryPolicy,
}

/// Bounded exponential backoff for transient validation failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first one (at least 1)
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl RetryPolicy {
    /// Delay before retry number `attempt` (1-based): min(base * 2^(attempt-1), max).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.base_delay
            .checked_mul(factor)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }

    /// Single attempt, no waiting.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(8),
        }
    }
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            api_url: "http://127.0.0.1:5000".to_string(),
            session_dir: PathBuf::from(".judge-session"),
            auth_path: "/auth".to_string(),
            request_timeout: Duration::from_secs(20),
            validate_retry: RetryPolicy::default(),
        }
    }
}

impl Config {
    /// Test config pointing at a fake backend, with fast retries.
    pub fn for_api(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into().trim_end_matches('/').to_string(),
            request_timeout: Duration::from_secs(5),
            validate_retry: RetryPolicy {
                max_attempts: 3,
                base_delay: Duration::from_millis(10),
                max_delay: Duration::from_millis(40),
            },
            ..Self::default()
        }
    }

    /// Load configuration from environment variables.
    ///
    /// A `.env` file in the working directory is honored for local development.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let defaults = RetryPolicy::default();

        Ok(Self {
            api_url: env::var("JUDGE_API_URL")
                .map(|v| v.trim().trim_end_matches('/').to_string())
                .map_err(|_| ConfigError::Missing("JUDGE_API_URL"))?,
            session_dir: env::var("JUDGE_SESSION_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(".judge-session")),
            auth_path: env::var("JUDGE_AUTH_PATH").unwrap_or_else(|_| "/auth".to_string()),
            request_timeout: Duration::from_secs(parse_var("JUDGE_REQUEST_TIMEOUT_SECS", 20)?),
            validate_retry: RetryPolicy {
                max_attempts: parse_var("JUDGE_VALIDATE_MAX_ATTEMPTS", defaults.max_attempts)?
                    .max(1),
                base_delay: Duration::from_millis(parse_var(
                    "JUDGE_VALIDATE_BACKOFF_MS",
                    defaults.base_delay.as_millis() as u64,
                )?),
                max_delay: Duration::from_millis(parse_var(
                    "JUDGE_VALIDATE_MAX_BACKOFF_MS",
                    defaults.max_delay.as_millis() as u64,
                )?),
            },
        })
    }
}

/// Read an optional numeric variable, rejecting values that don't parse.
fn parse_var<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid(name, raw)),
        Err(_) => Ok(default),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1:?}")]
    Invalid(&'static str, String),
}
