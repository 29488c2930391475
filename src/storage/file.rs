// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! File-backed session store.
//!
//! All keys live in one JSON document (`session.json`). Every mutation
//! rewrites the document to a sibling temp file and renames it into place,
//! so the token and profile are replaced together or not at all.

use super::SessionStore;
use crate::error::{AppError, Result};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

const DOCUMENT_NAME: &str = "session.json";

/// Durable [`SessionStore`] in a local directory.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    /// Serializes read-modify-write cycles within this process.
    lock: Mutex<()>,
}

impl FileStore {
    /// Open (creating if needed) the store directory.
    pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir).map_err(|e| {
            AppError::Storage(format!("Failed to create {}: {}", dir.display(), e))
        })?;

        tracing::debug!(path = %dir.display(), "Session store opened");

        Ok(Self {
            path: dir.join(DOCUMENT_NAME),
            lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_document(&self) -> Result<BTreeMap<String, String>> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(AppError::Storage(e.to_string())),
        };

        serde_json::from_str(&raw).map_err(|e| AppError::MalformedCache(e.to_string()))
    }

    /// Like `read_document`, but a corrupt document is discarded rather than
    /// blocking the write that is about to replace it.
    fn read_document_for_write(&self) -> Result<BTreeMap<String, String>> {
        match self.read_document() {
            Err(AppError::MalformedCache(e)) => {
                tracing::warn!(error = %e, "Discarding unreadable session document");
                Ok(BTreeMap::new())
            }
            other => other,
        }
    }

    fn write_document(&self, doc: &BTreeMap<String, String>) -> Result<()> {
        if doc.is_empty() {
            return match fs::remove_file(&self.path) {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
                Err(e) => Err(AppError::Storage(e.to_string())),
            };
        }

        let body = serde_json::to_vec(doc)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Session encode failed: {}", e)))?;

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, body).map_err(|e| AppError::Storage(e.to_string()))?;
        restrict_permissions(&tmp)?;
        fs::rename(&tmp, &self.path).map_err(|e| AppError::Storage(e.to_string()))
    }
}

impl SessionStore for FileStore {
    fn get_all(&self, keys: &[&str]) -> Result<Vec<Option<String>>> {
        let _guard = self.lock.lock();
        let doc = self.read_document()?;
        Ok(keys.iter().map(|k| doc.get(*k).cloned()).collect())
    }

    fn put_all(&self, entries: &[(&str, &str)]) -> Result<()> {
        let _guard = self.lock.lock();
        let mut doc = self.read_document_for_write()?;
        for (key, value) in entries {
            doc.insert(key.to_string(), value.to_string());
        }
        self.write_document(&doc)
    }

    fn remove_all(&self, keys: &[&str]) -> Result<bool> {
        let _guard = self.lock.lock();
        let mut doc = match self.read_document() {
            Ok(doc) => doc,
            Err(AppError::MalformedCache(e)) => {
                tracing::warn!(error = %e, "Removing unreadable session document");
                self.write_document(&BTreeMap::new())?;
                return Ok(true);
            }
            Err(e) => return Err(e),
        };

        let before = doc.len();
        for key in keys {
            doc.remove(*key);
        }
        if doc.len() == before {
            return Ok(false);
        }

        self.write_document(&doc)?;
        Ok(true)
    }
}

/// Bearer tokens are credentials: keep the document owner-only.
#[cfg(unix)]
fn restrict_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))
        .map_err(|e| AppError::Storage(e.to_string()))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> Result<()> {
    Ok(())
}
