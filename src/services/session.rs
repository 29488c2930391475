// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Client-side session cache.
//!
//! Single authority for "am I signed in, and what do I know about the user
//! right now". Owns the persisted bearer token and profile snapshot:
//! - `load` reads storage only, never the network
//! - `validate` is the one operation that waits on the backend
//! - `merge` applies optimistic updates after user actions
//! - `invalidate` clears everything and points the caller at the identity flow
//!
//! States: `Absent`, `CachedUnverified` (loaded from storage) and
//! `CachedVerified` (freshly established or confirmed by the backend).

use crate::config::{Config, RetryPolicy};
use crate::error::{AppError, Result};
use crate::models::{ProfilePatch, UserSnapshot};
use crate::services::BackendClient;
use crate::storage::{keys, SessionStore};
use crate::time_utils::rfc3339_z;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// Where the cache stands with respect to the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Absent,
    CachedUnverified,
    CachedVerified,
}

/// Bearer token plus the last-known profile.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub profile: UserSnapshot,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("token", &"<redacted>")
            .field("profile", &self.profile)
            .finish()
    }
}

/// Why a session was cleared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidationReason {
    Logout,
    /// 401 (or another rejection) from the backend
    ServerRejected,
    /// Validation could not reach the backend after every retry
    NetworkUnavailable,
    AccountDeleted,
}

impl InvalidationReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvalidationReason::Logout => "logout",
            InvalidationReason::ServerRejected => "server_rejected",
            InvalidationReason::NetworkUnavailable => "network_unavailable",
            InvalidationReason::AccountDeleted => "account_deleted",
        }
    }
}

/// Returned by `invalidate`: send the user to `location`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub struct AuthRedirect {
    pub location: String,
    /// False when the cache was already empty (the call was a no-op)
    pub was_active: bool,
}

#[derive(Debug, Clone, Copy)]
struct ValidationRecord {
    generation: u64,
    valid: bool,
}

enum ValidationOutcome {
    Valid,
    Rejected,
    Unreachable,
}

struct Inner {
    state: SessionState,
    session: Option<Session>,
    /// Bumped whenever the session is replaced or cleared.
    generation: u64,
    verified_at: Option<DateTime<Utc>>,
    validations_completed: u64,
    last_validation: Option<ValidationRecord>,
}

/// Explicitly constructed session cache, shared by page controllers.
pub struct SessionCache {
    store: Arc<dyn SessionStore>,
    backend: BackendClient,
    retry: RetryPolicy,
    auth_path: String,
    inner: Mutex<Inner>,
    /// At most one validation request in flight.
    validate_lock: tokio::sync::Mutex<()>,
}

impl SessionCache {
    /// Create an empty (`Absent`) cache. Nothing is read until `load`.
    pub fn new(store: Arc<dyn SessionStore>, backend: BackendClient, config: &Config) -> Self {
        Self {
            store,
            backend,
            retry: config.validate_retry,
            auth_path: config.auth_path.clone(),
            inner: Mutex::new(Inner {
                state: SessionState::Absent,
                session: None,
                generation: 0,
                verified_at: None,
                validations_completed: 0,
                last_validation: None,
            }),
            validate_lock: tokio::sync::Mutex::new(()),
        }
    }

    /// Create the cache and immediately `load` from storage.
    pub fn init(store: Arc<dyn SessionStore>, backend: BackendClient, config: &Config) -> Self {
        let cache = Self::new(store, backend, config);
        cache.load();
        cache
    }

    /// End the cache's lifecycle. In-flight validations are abandoned.
    pub fn dispose(self) {
        tracing::debug!(state = ?self.state(), "Session cache disposed");
    }

    // ─── Read-only views ─────────────────────────────────────────

    pub fn state(&self) -> SessionState {
        self.inner.lock().state
    }

    pub fn session(&self) -> Option<Session> {
        self.inner.lock().session.clone()
    }

    pub fn profile(&self) -> Option<UserSnapshot> {
        self.inner.lock().session.as_ref().map(|s| s.profile.clone())
    }

    pub fn token(&self) -> Option<String> {
        self.inner.lock().session.as_ref().map(|s| s.token.clone())
    }

    /// When the backend last confirmed the token (or it was established).
    pub fn verified_at(&self) -> Option<DateTime<Utc>> {
        self.inner.lock().verified_at
    }

    pub fn auth_path(&self) -> &str {
        &self.auth_path
    }

    // ─── Lifecycle ───────────────────────────────────────────────

    /// Read the persisted session. No network I/O.
    ///
    /// Missing keys, a token without a profile (or the reverse), corrupt
    /// JSON and storage read failures all fail closed to `None`.
    pub fn load(&self) -> Option<Session> {
        // Held across the read so a concurrent establish can't be overwritten
        let mut inner = self.inner.lock();

        let loaded = match self.read_persisted() {
            Ok(session) => session,
            Err(e) => {
                tracing::warn!(error = %e, "Ignoring unusable cached session");
                None
            }
        };

        inner.generation += 1;
        inner.verified_at = None;
        inner.session = loaded.clone();
        inner.state = match &loaded {
            Some(session) => {
                tracing::debug!(uid = %session.profile.uid, "Cached session loaded");
                SessionState::CachedUnverified
            }
            None => SessionState::Absent,
        };

        loaded
    }

    /// Replace any prior session after a successful identity exchange.
    pub fn establish(&self, token: String, profile: UserSnapshot) -> Result<()> {
        if token.trim().is_empty() {
            return Err(AppError::Validation("Empty bearer token".to_string()));
        }

        let session = Session { token, profile };
        let mut inner = self.inner.lock();
        self.persist(&session)?;

        let now = Utc::now();
        tracing::info!(
            uid = %session.profile.uid,
            at = %rfc3339_z(now),
            "Session established"
        );

        inner.generation += 1;
        inner.state = SessionState::CachedVerified;
        inner.verified_at = Some(now);
        inner.session = Some(session);
        Ok(())
    }

    /// Clear the token and profile together.
    ///
    /// Idempotent: on an already-empty cache nothing is written and
    /// `was_active` is false.
    pub fn invalidate(&self, reason: InvalidationReason) -> Result<AuthRedirect> {
        let mut inner = self.inner.lock();
        self.clear_locked(&mut inner, reason)
    }

    fn clear_locked(
        &self,
        inner: &mut Inner,
        reason: InvalidationReason,
    ) -> Result<AuthRedirect> {
        let was_active = inner.session.is_some();

        // Memory and generation first; the store call below may fail
        inner.session = None;
        inner.state = SessionState::Absent;
        inner.verified_at = None;
        if was_active {
            inner.generation += 1;
        }

        let cleared = self.store.remove_all(&[keys::TOKEN, keys::PROFILE])?;

        if was_active || cleared {
            tracing::info!(reason = reason.as_str(), "Session invalidated");
        } else {
            tracing::debug!(reason = reason.as_str(), "Session already absent");
        }

        Ok(AuthRedirect {
            location: self.auth_path.clone(),
            was_active,
        })
    }

    // ─── Updates ─────────────────────────────────────────────────

    /// Shallow-merge `patch` into the cached profile and re-persist.
    ///
    /// Returns `None` when no session is cached. An empty or no-op patch
    /// returns the current profile without writing.
    pub fn merge(&self, patch: &ProfilePatch) -> Result<Option<UserSnapshot>> {
        let mut inner = self.inner.lock();
        let Some(current) = inner.session.as_ref() else {
            tracing::debug!("Merge ignored, no cached session");
            return Ok(None);
        };

        let mut updated = current.clone();
        if !updated.profile.apply(patch) {
            return Ok(Some(updated.profile));
        }

        self.persist(&updated)?;
        tracing::debug!(
            uid = %updated.profile.uid,
            points = updated.profile.points,
            problems_solved = updated.profile.problems_solved,
            "Cached profile merged"
        );

        let profile = updated.profile.clone();
        inner.session = Some(updated);
        Ok(Some(profile))
    }

    /// Overwrite the cached profile with the backend's authoritative copy.
    ///
    /// Unlike `merge`, this may lower counters. The uid must match.
    pub fn replace_profile(&self, profile: UserSnapshot) -> Result<Option<UserSnapshot>> {
        let mut inner = self.inner.lock();
        let Some(current) = inner.session.as_ref() else {
            return Ok(None);
        };

        if current.profile.uid != profile.uid {
            return Err(AppError::Internal(anyhow::anyhow!(
                "Fetched profile {} does not belong to session user {}",
                profile.uid,
                current.profile.uid
            )));
        }
        if current.profile == profile {
            return Ok(Some(profile));
        }

        let updated = Session {
            token: current.token.clone(),
            profile,
        };
        self.persist(&updated)?;

        let profile = updated.profile.clone();
        inner.session = Some(updated);
        Ok(Some(profile))
    }

    // ─── Authenticated calls ─────────────────────────────────────

    /// Run an authenticated backend call with the current session.
    ///
    /// No session gives `NotSignedIn` without calling `call`. A 401 from the
    /// backend invalidates the session before `AuthExpired` is returned,
    /// unless the session was replaced while the request was in flight.
    pub async fn authorized<T, F, Fut>(&self, action: &'static str, call: F) -> Result<T>
    where
        F: FnOnce(Session) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let (generation, session) = {
            let inner = self.inner.lock();
            let session = inner.session.clone().ok_or(AppError::NotSignedIn)?;
            (inner.generation, session)
        };

        match call(session).await {
            Err(AppError::AuthExpired) => {
                let mut inner = self.inner.lock();
                if inner.generation == generation {
                    tracing::info!(action, "Backend rejected session token");
                    let _ = self.clear_locked(&mut inner, InvalidationReason::ServerRejected)?;
                } else {
                    tracing::debug!(action, "Rejection for a replaced session ignored");
                }
                Err(AppError::AuthExpired)
            }
            other => other,
        }
    }

    // ─── Validation ──────────────────────────────────────────────

    /// Confirm with the backend that the cached token still works.
    ///
    /// - Absent: `false`, no request
    /// - 200: `CachedVerified`, `true`
    /// - network failure, 5xx, 408 or 429: retried with backoff, then invalidated
    /// - any other rejection (401, 403, 404, 400...): invalidated, `false`
    ///
    /// Concurrent callers share one request: whoever queues behind an
    /// in-flight validation of the same session gets its result.
    pub async fn validate(&self) -> Result<bool> {
        let seen = self.inner.lock().validations_completed;
        let _guard = self.validate_lock.lock().await;

        let (generation, session) = {
            let inner = self.inner.lock();
            let Some(session) = inner.session.clone() else {
                return Ok(false);
            };
            if inner.validations_completed != seen {
                if let Some(last) = inner.last_validation {
                    if last.generation == inner.generation {
                        return Ok(last.valid);
                    }
                }
            }
            (inner.generation, session)
        };

        let outcome = self.check_with_retry(&session).await;

        let mut inner = self.inner.lock();
        inner.validations_completed += 1;

        if inner.generation != generation {
            // establish/load/invalidate ran meanwhile; the result is stale
            tracing::debug!("Session replaced during validation, result discarded");
            return Ok(matches!(outcome, ValidationOutcome::Valid));
        }

        match outcome {
            ValidationOutcome::Valid => {
                let now = Utc::now();
                inner.state = SessionState::CachedVerified;
                inner.verified_at = Some(now);
                inner.last_validation = Some(ValidationRecord {
                    generation,
                    valid: true,
                });
                tracing::debug!(
                    uid = %session.profile.uid,
                    at = %rfc3339_z(now),
                    "Session verified"
                );
                Ok(true)
            }
            ValidationOutcome::Rejected | ValidationOutcome::Unreachable => {
                let reason = match outcome {
                    ValidationOutcome::Unreachable => InvalidationReason::NetworkUnavailable,
                    _ => InvalidationReason::ServerRejected,
                };
                let _ = self.clear_locked(&mut inner, reason)?;
                inner.last_validation = Some(ValidationRecord {
                    generation: inner.generation,
                    valid: false,
                });
                Ok(false)
            }
        }
    }

    async fn check_with_retry(&self, session: &Session) -> ValidationOutcome {
        let max_attempts = self.retry.max_attempts.max(1);

        for attempt in 1..=max_attempts {
            match self
                .backend
                .check_user(&session.token, &session.profile.uid)
                .await
            {
                Ok(()) => return ValidationOutcome::Valid,
                Err(e) if e.is_transient() => {
                    if attempt == max_attempts {
                        // Can't tell "server down" from "token revoked": fail closed
                        tracing::warn!(
                            attempts = max_attempts,
                            error = %e,
                            "Backend unreachable during validation, failing closed"
                        );
                        break;
                    }
                    let delay = self.retry.delay_for(attempt);
                    tracing::warn!(
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Token validation failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => {
                    tracing::info!(error = %e, "Token rejected by backend");
                    return ValidationOutcome::Rejected;
                }
            }
        }

        ValidationOutcome::Unreachable
    }

    // ─── Persistence ─────────────────────────────────────────────

    fn read_persisted(&self) -> Result<Option<Session>> {
        let mut values = self
            .store
            .get_all(&[keys::TOKEN, keys::PROFILE])?
            .into_iter();
        let token = values.next().flatten();
        let profile = values.next().flatten();

        match (token, profile) {
            (None, None) => Ok(None),
            (Some(token), Some(profile)) if !token.trim().is_empty() => {
                let profile: UserSnapshot = serde_json::from_str(&profile)
                    .map_err(|e| AppError::MalformedCache(e.to_string()))?;
                Ok(Some(Session { token, profile }))
            }
            _ => Err(AppError::MalformedCache(
                "token and profile are out of sync".to_string(),
            )),
        }
    }

    /// Write both keys in one store operation.
    fn persist(&self, session: &Session) -> Result<()> {
        let profile = serde_json::to_string(&session.profile)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Profile encode failed: {}", e)))?;

        self.store.put_all(&[
            (keys::TOKEN, session.token.as_str()),
            (keys::PROFILE, profile.as_str()),
        ])
    }
}
