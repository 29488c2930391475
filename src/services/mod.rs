// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - session and backend logic.

pub mod account;
pub mod backend;
pub mod dashboard;
pub mod session;

pub use account::AccountService;
pub use backend::{BackendClient, PictureUpload};
pub use dashboard::{Dashboard, DashboardService};
pub use session::{AuthRedirect, InvalidationReason, Session, SessionCache, SessionState};
