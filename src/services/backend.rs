// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Judge backend API client.
//!
//! Handles:
//! - Typed requests/responses for every endpoint the pages use
//! - Bearer authentication
//! - One place that maps HTTP status to [`AppError`]

use crate::config::Config;
use crate::error::{AppError, ErrorBody, Result};
use crate::models::{
    LeaderboardEntry, OAuthConfig, Problem, PublicProfile, RunResult, SubmissionResult,
    UserSnapshot, VerifyTokenResponse,
};
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;

/// Judge backend API client.
#[derive(Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    base_url: String,
}

/// Response of `PUT /api/user/{uid}/update-name`.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateNameResponse {
    #[serde(default)]
    pub name: Option<String>,
}

/// Response of `POST /api/user/{uid}/upload-picture`.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadPictureResponse {
    pub picture_url: String,
}

/// Image file selected for upload.
#[derive(Debug, Clone)]
pub struct PictureUpload {
    pub file_name: String,
    /// MIME type, e.g. `image/png`
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl BackendClient {
    /// Create a client for `config.api_url`.
    pub fn new(config: &Config) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| AppError::Internal(anyhow::anyhow!("HTTP client init failed: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.api_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn user_path(uid: &str, suffix: &str) -> String {
        format!("/api/user/{}{}", urlencoding::encode(uid), suffix)
    }

    fn problem_path(slug: &str, suffix: &str) -> String {
        format!("/api/problem/{}{}", urlencoding::encode(slug), suffix)
    }

    // ─── Identity ────────────────────────────────────────────────

    /// Exchange an identity-provider ID token for the user record.
    pub async fn verify_id_token(&self, id_token: &str) -> Result<UserSnapshot> {
        let request = self
            .http
            .post(self.url("/api/auth/verify"))
            .json(&serde_json::json!({ "idToken": id_token }));

        let response: VerifyTokenResponse = self.send_json(request, "Authentication failed").await?;
        Ok(response.user)
    }

    /// Redirect-based OAuth provider settings.
    pub async fn oauth_config(&self) -> Result<OAuthConfig> {
        let request = self.http.get(self.url("/api/oauth-config"));
        self.send_json(request, "Failed to load authentication configuration")
            .await
    }

    // ─── User ────────────────────────────────────────────────────

    /// Confirm the token still resolves to `uid` without decoding the body.
    pub async fn check_user(&self, token: &str, uid: &str) -> Result<()> {
        let request = self
            .http
            .get(self.url(&Self::user_path(uid, "")))
            .bearer_auth(token);

        self.send(request, "Failed to fetch user data").await?;
        Ok(())
    }

    /// Fetch the authoritative user record.
    pub async fn get_user(&self, token: &str, uid: &str) -> Result<UserSnapshot> {
        let request = self
            .http
            .get(self.url(&Self::user_path(uid, "")))
            .bearer_auth(token);

        self.send_json(request, "Failed to fetch user data").await
    }

    /// Public profile (no authentication).
    pub async fn get_public_profile(&self, uid: &str) -> Result<PublicProfile> {
        let path = format!("/api/profile/{}", urlencoding::encode(uid));
        let request = self.http.get(self.url(&path));

        match self.send_json(request, "Failed to load profile").await {
            Err(AppError::NotFound(_)) => Err(AppError::NotFound("User not found".to_string())),
            other => other,
        }
    }

    pub async fn update_name(
        &self,
        token: &str,
        uid: &str,
        name: &str,
    ) -> Result<UpdateNameResponse> {
        let request = self
            .http
            .put(self.url(&Self::user_path(uid, "/update-name")))
            .bearer_auth(token)
            .json(&serde_json::json!({ "name": name }));

        self.send_json(request, "Failed to update name").await
    }

    pub async fn upload_picture(
        &self,
        token: &str,
        uid: &str,
        upload: PictureUpload,
    ) -> Result<UploadPictureResponse> {
        let part = reqwest::multipart::Part::bytes(upload.bytes)
            .file_name(upload.file_name)
            .mime_str(&upload.content_type)
            .map_err(|e| AppError::Validation(format!("Invalid content type: {}", e)))?;
        let form = reqwest::multipart::Form::new().part("picture", part);

        let request = self
            .http
            .post(self.url(&Self::user_path(uid, "/upload-picture")))
            .bearer_auth(token)
            .multipart(form);

        self.send_json(request, "Failed to upload picture").await
    }

    /// Full account export; the shape belongs to the backend.
    pub async fn export_data(&self, token: &str, uid: &str) -> Result<serde_json::Value> {
        let request = self
            .http
            .get(self.url(&Self::user_path(uid, "/export-data")))
            .bearer_auth(token);

        self.send_json(request, "Failed to export data").await
    }

    pub async fn delete_account(
        &self,
        token: &str,
        uid: &str,
        confirmation_phrase: &str,
    ) -> Result<()> {
        let request = self
            .http
            .delete(self.url(&Self::user_path(uid, "/delete")))
            .bearer_auth(token)
            .json(&serde_json::json!({ "confirmation_phrase": confirmation_phrase }));

        self.send(request, "Failed to delete account").await?;
        Ok(())
    }

    // ─── Problems ────────────────────────────────────────────────

    pub async fn get_problems(&self, token: &str) -> Result<Vec<Problem>> {
        let request = self.http.get(self.url("/api/problems")).bearer_auth(token);
        self.send_json(request, "Failed to fetch problems").await
    }

    pub async fn get_problem(&self, token: &str, slug: &str) -> Result<Problem> {
        let request = self
            .http
            .get(self.url(&Self::problem_path(slug, "")))
            .bearer_auth(token);

        self.send_json(request, "Failed to fetch problem").await
    }

    pub async fn get_leaderboard(&self, token: &str) -> Result<Vec<LeaderboardEntry>> {
        let request = self.http.get(self.url("/api/leaderboard")).bearer_auth(token);
        self.send_json(request, "Failed to fetch leaderboard").await
    }

    /// Run against the sample test cases only.
    pub async fn run_code(&self, token: &str, slug: &str, code: &str) -> Result<RunResult> {
        let request = self
            .http
            .post(self.url(&Self::problem_path(slug, "/run")))
            .bearer_auth(token)
            .json(&serde_json::json!({ "code": code }));

        self.send_json(request, "Failed to run code").await
    }

    pub async fn submit_solution(
        &self,
        token: &str,
        slug: &str,
        code: &str,
    ) -> Result<SubmissionResult> {
        let request = self
            .http
            .post(self.url(&Self::problem_path(slug, "/submit")))
            .bearer_auth(token)
            .json(&serde_json::json!({ "code": code }));

        self.send_json(request, "Failed to submit code").await
    }

    // ─── Response handling ───────────────────────────────────────

    /// Send and check status; `fallback` is used when a 4xx has no message.
    async fn send(
        &self,
        request: RequestBuilder,
        fallback: &str,
    ) -> Result<reqwest::Response> {
        let response = request.send().await.map_err(|e| {
            tracing::debug!(error = %e, "Backend request failed");
            AppError::Network(e.to_string())
        })?;

        check_response(response, fallback).await
    }

    /// Send, check status and decode the JSON body.
    async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        fallback: &str,
    ) -> Result<T> {
        let response = self.send(request, fallback).await?;
        let body = response
            .bytes()
            .await
            .map_err(|e| AppError::Network(e.to_string()))?;

        serde_json::from_slice(&body).map_err(|e| {
            tracing::warn!(error = %e, "Backend response did not match schema");
            AppError::Decode(e.to_string())
        })
    }
}

/// Map a non-success status to the error taxonomy.
async fn check_response(
    response: reqwest::Response,
    fallback: &str,
) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = ErrorBody::message(&body);

    match status {
        StatusCode::UNAUTHORIZED => Err(AppError::AuthExpired),
        // Worth retrying, like a 5xx
        StatusCode::REQUEST_TIMEOUT | StatusCode::TOO_MANY_REQUESTS => {
            tracing::warn!(status = %status, "Backend asked client to back off");
            Err(AppError::Backend(format!(
                "HTTP {}: {}",
                status,
                message.unwrap_or_else(|| fallback.to_string())
            )))
        }
        StatusCode::NOT_FOUND => Err(AppError::NotFound(
            message.unwrap_or_else(|| fallback.to_string()),
        )),
        s if s.is_client_error() => Err(AppError::Validation(
            message.unwrap_or_else(|| fallback.to_string()),
        )),
        s => {
            tracing::warn!(status = %s, "Backend returned server error");
            Err(AppError::Backend(format!(
                "HTTP {}: {}",
                s,
                message.unwrap_or(body)
            )))
        }
    }
}
