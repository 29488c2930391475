// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Durable key/value storage for the session.
//!
//! The token and the profile snapshot live under two keys that are always
//! written and cleared together, so a store must apply a multi-key write or
//! removal as a single step.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use crate::error::Result;

/// Key names as constants.
pub mod keys {
    /// Bearer token string
    pub const TOKEN: &str = "auth_token";
    /// JSON-serialized `UserSnapshot`
    pub const PROFILE: &str = "user_data";
}

/// Backing store for persisted session state.
pub trait SessionStore: Send + Sync {
    /// Read every key from one consistent view, in the order given.
    fn get_all(&self, keys: &[&str]) -> Result<Vec<Option<String>>>;

    /// Read one key.
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.get_all(&[key])?.pop().flatten())
    }

    /// Write every entry in one step; readers never observe a partial write.
    fn put_all(&self, entries: &[(&str, &str)]) -> Result<()>;

    /// Remove every key in one step. Returns `false` (and performs no write)
    /// when none of the keys were present.
    fn remove_all(&self, keys: &[&str]) -> Result<bool>;
}
