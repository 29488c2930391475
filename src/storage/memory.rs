// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process store for tests and ephemeral sessions.

use super::SessionStore;
use crate::error::Result;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Volatile [`SessionStore`] backed by a map.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
    writes: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with raw values (e.g. a corrupt profile).
    pub fn with_entries<'a>(entries: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let store = Self::new();
        store.entries.lock().extend(
            entries
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string())),
        );
        store
    }

    /// Number of mutating operations applied so far.
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl SessionStore for MemoryStore {
    fn get_all(&self, keys: &[&str]) -> Result<Vec<Option<String>>> {
        let map = self.entries.lock();
        Ok(keys.iter().map(|k| map.get(*k).cloned()).collect())
    }

    fn put_all(&self, entries: &[(&str, &str)]) -> Result<()> {
        let mut map = self.entries.lock();
        for (key, value) in entries {
            map.insert(key.to_string(), value.to_string());
        }
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn remove_all(&self, keys: &[&str]) -> Result<bool> {
        let mut map = self.entries.lock();
        if !keys.iter().any(|k| map.contains_key(*k)) {
            return Ok(false);
        }
        for key in keys {
            map.remove(*key);
        }
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(true)
    }
}
