// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Client error taxonomy.
//!
//! Expected conditions (no session, invalid token, corrupt local storage) are
//! handled inside the session cache and never surface as hard errors; the
//! variants below are what callers of the backend and account services see.

use serde::Deserialize;

/// Application error type shared by every client component.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// No cached session exists; the caller should start the identity flow.
    #[error("Not signed in")]
    NotSignedIn,

    /// The backend answered 401 for an authenticated call.
    #[error("Session expired. Please login again.")]
    AuthExpired,

    /// Transport-level failure (connect, timeout, TLS).
    #[error("Network error: {0}")]
    Network(String),

    /// 4xx with a message body, surfaced verbatim.
    #[error("{0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// 5xx, 408, 429 or otherwise unexpected status from the backend.
    #[error("Backend error: {0}")]
    Backend(String),

    /// Response body did not match the expected schema.
    #[error("Unexpected response shape: {0}")]
    Decode(String),

    /// Persisted session data could not be parsed.
    #[error("Malformed session cache: {0}")]
    MalformedCache(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// True when the backend rejected the bearer token.
    pub fn is_auth_expired(&self) -> bool {
        matches!(self, AppError::AuthExpired)
    }

    /// True for failures worth retrying: transport errors, 5xx, 408 and 429.
    pub fn is_transient(&self) -> bool {
        matches!(self, AppError::Network(_) | AppError::Backend(_))
    }

    /// True when the user must go through the identity flow again.
    pub fn requires_sign_in(&self) -> bool {
        matches!(self, AppError::AuthExpired | AppError::NotSignedIn)
    }
}

/// JSON error body returned by the backend on 4xx/5xx.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
}

impl ErrorBody {
    /// Extract the `error` message from a raw response body, if present.
    pub(crate) fn message(body: &str) -> Option<String> {
        serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(|b| b.error)
            .filter(|m| !m.trim().is_empty())
    }
}

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, AppError>;
