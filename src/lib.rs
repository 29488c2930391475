// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Judge client: session and data-freshness cache for the coding judge
//!
//! This crate keeps the signed-in user's bearer token and profile snapshot
//! on disk, validates them against the judge backend, and applies optimistic
//! profile updates after actions like solving a problem.

pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod storage;
pub mod time_utils;

use config::Config;
use error::Result;
use services::{AccountService, BackendClient, DashboardService, SessionCache};
use std::sync::Arc;
use storage::{FileStore, SessionStore};

/// Shared client state, constructed once and handed to page controllers.
pub struct ClientContext {
    pub config: Config,
    pub session: Arc<SessionCache>,
    pub account: AccountService,
    pub dashboard: DashboardService,
}

impl ClientContext {
    /// Build every service over `store` and load any persisted session.
    pub fn new(config: Config, store: Arc<dyn SessionStore>) -> Result<Self> {
        let backend = BackendClient::new(&config)?;
        let session = Arc::new(SessionCache::init(store, backend.clone(), &config));

        Ok(Self {
            account: AccountService::new(session.clone(), backend.clone()),
            dashboard: DashboardService::new(session.clone(), backend),
            session,
            config,
        })
    }

    /// Like `new`, persisting to a [`FileStore`] in `config.session_dir`.
    pub fn open(config: Config) -> Result<Self> {
        let store = Arc::new(FileStore::new(&config.session_dir)?);
        Self::new(config, store)
    }
}
