// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Identity exchange and OAuth provider configuration.

use crate::error::{AppError, Result};
use crate::models::UserSnapshot;
use serde::Deserialize;

/// Response of `POST /api/auth/verify`.
#[derive(Debug, Clone, Deserialize)]
pub struct VerifyTokenResponse {
    pub user: UserSnapshot,
}

/// Redirect-based OAuth providers advertised by `GET /api/oauth-config`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OAuthConfig {
    #[serde(default)]
    pub hackclub: Option<OAuthProvider>,
    #[serde(default)]
    pub github: Option<OAuthProvider>,
}

/// Which redirect provider to start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    HackClub,
    GitHub,
}

impl OAuthConfig {
    pub fn provider(&self, kind: ProviderKind) -> Option<&OAuthProvider> {
        match kind {
            ProviderKind::HackClub => self.hackclub.as_ref(),
            ProviderKind::GitHub => self.github.as_ref(),
        }
    }

    /// Authorization URL for `kind`, or `Validation` if it isn't configured.
    pub fn authorization_url(&self, kind: ProviderKind) -> Result<String> {
        self.provider(kind)
            .ok_or_else(|| AppError::Validation(format!("{:?} OAuth not configured", kind)))
            .map(|p| p.authorization_url(kind))
    }
}

/// Client-side settings for one OAuth provider.
#[derive(Debug, Clone, Deserialize)]
pub struct OAuthProvider {
    pub client_id: String,
    pub redirect_uri: String,
    pub authorize_url: String,
    #[serde(default)]
    pub scopes: String,
}

impl OAuthProvider {
    /// Build the authorize URL. Hack Club requires `response_type=code`.
    pub fn authorization_url(&self, kind: ProviderKind) -> String {
        let mut params = vec![
            ("client_id", self.client_id.as_str()),
            ("redirect_uri", self.redirect_uri.as_str()),
        ];
        if kind == ProviderKind::HackClub {
            params.push(("response_type", "code"));
        }
        params.push(("scope", self.scopes.as_str()));

        let query = params
            .iter()
            .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");

        format!("{}?{}", self.authorize_url, query)
    }
}
