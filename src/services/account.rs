// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Authenticated user actions.
//!
//! Each action checks its input locally, calls the backend through
//! [`SessionCache::authorized`] and, on success, folds the result into the
//! cached profile so the next page load needs no refetch.

use crate::error::{AppError, Result};
use crate::models::{Problem, ProfilePatch, RunResult, SubmissionResult, UserSnapshot};
use crate::services::backend::PictureUpload;
use crate::services::session::{AuthRedirect, InvalidationReason, SessionCache};
use crate::services::BackendClient;
use std::sync::Arc;
use validator::Validate;

/// Phrase the user must type to delete their account.
pub const DELETE_CONFIRMATION_PHRASE: &str = "DELETE MY ACCOUNT";

/// Largest accepted profile picture.
pub const MAX_PICTURE_BYTES: usize = 5 * 1024 * 1024;

const PICTURE_TYPES: &[&str] = &["image/png", "image/jpeg", "image/jpg"];

#[derive(Debug, Validate)]
struct RenameRequest {
    #[validate(length(min = 1, max = 50, message = "Name must be between 1 and 50 characters"))]
    name: String,
}

/// User actions that change server state and the cached profile.
#[derive(Clone)]
pub struct AccountService {
    cache: Arc<SessionCache>,
    backend: BackendClient,
}

impl AccountService {
    pub fn new(cache: Arc<SessionCache>, backend: BackendClient) -> Self {
        Self { cache, backend }
    }

    /// Exchange an identity-provider ID token and start a verified session.
    pub async fn sign_in_with_id_token(&self, id_token: &str) -> Result<UserSnapshot> {
        if id_token.trim().is_empty() {
            return Err(AppError::Validation("Missing ID token".to_string()));
        }

        let user = self.backend.verify_id_token(id_token).await?;
        self.cache.establish(id_token.to_string(), user.clone())?;
        Ok(user)
    }

    /// Clear the local session.
    pub fn logout(&self) -> Result<AuthRedirect> {
        self.cache.invalidate(InvalidationReason::Logout)
    }

    pub async fn rename(&self, name: &str) -> Result<UserSnapshot> {
        let request = RenameRequest {
            name: name.trim().to_string(),
        };
        request
            .validate()
            .map_err(|_| AppError::Validation("Name must be between 1 and 50 characters".to_string()))?;

        let name = self
            .cache
            .authorized("rename", |s| async move {
                let response = self
                    .backend
                    .update_name(&s.token, &s.profile.uid, &request.name)
                    .await?;
                Ok(response.name.unwrap_or(request.name))
            })
            .await?;

        self.merged(&ProfilePatch::name(name))
    }

    pub async fn upload_picture(&self, upload: PictureUpload) -> Result<UserSnapshot> {
        if !PICTURE_TYPES.contains(&upload.content_type.as_str()) {
            return Err(AppError::Validation(
                "Please select a valid image file (PNG or JPG)".to_string(),
            ));
        }
        if upload.bytes.len() > MAX_PICTURE_BYTES {
            return Err(AppError::Validation(
                "File size must be less than 5MB".to_string(),
            ));
        }

        let response = self
            .cache
            .authorized("upload_picture", |s| async move {
                self.backend
                    .upload_picture(&s.token, &s.profile.uid, upload)
                    .await
            })
            .await?;

        self.merged(&ProfilePatch::picture(response.picture_url))
    }

    /// Judge `code` against every test case. A full pass is recorded locally.
    pub async fn submit_solution(
        &self,
        problem: &Problem,
        code: &str,
    ) -> Result<SubmissionResult> {
        ensure_code(code)?;

        let result = self
            .cache
            .authorized("submit_solution", |s| async move {
                self.backend
                    .submit_solution(&s.token, &problem.slug, code)
                    .await
            })
            .await?;

        if result.all_passed {
            let patch = ProfilePatch::solved(problem.id.clone(), result.total_points);
            self.cache.merge(&patch)?;
            tracing::info!(problem = %problem.id, points = result.total_points, "Problem solved");
        }

        Ok(result)
    }

    /// Sample test cases only; the cached profile is untouched.
    pub async fn run_code(&self, slug: &str, code: &str) -> Result<RunResult> {
        ensure_code(code)?;

        self.cache
            .authorized("run_code", |s| async move {
                self.backend.run_code(&s.token, slug, code).await
            })
            .await
    }

    pub async fn export_data(&self) -> Result<serde_json::Value> {
        self.cache
            .authorized("export_data", |s| async move {
                self.backend.export_data(&s.token, &s.profile.uid).await
            })
            .await
    }

    /// Permanently delete the account, then clear the session.
    pub async fn delete_account(&self, confirmation: &str) -> Result<AuthRedirect> {
        if confirmation != DELETE_CONFIRMATION_PHRASE {
            return Err(AppError::Validation(format!(
                "Please type \"{}\" exactly to confirm",
                DELETE_CONFIRMATION_PHRASE
            )));
        }

        self.cache
            .authorized("delete_account", |s| async move {
                self.backend
                    .delete_account(&s.token, &s.profile.uid, confirmation)
                    .await
            })
            .await?;

        tracing::info!("Account deleted");
        self.cache.invalidate(InvalidationReason::AccountDeleted)
    }

    fn merged(&self, patch: &ProfilePatch) -> Result<UserSnapshot> {
        self.cache.merge(patch)?.ok_or(AppError::NotSignedIn)
    }
}

fn ensure_code(code: &str) -> Result<()> {
    if code.trim().is_empty() {
        return Err(AppError::Validation("Please write some code first".to_string()));
    }
    Ok(())
}
