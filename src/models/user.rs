// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! User models for the session cache and API.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeSet;
use std::fmt;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Problem identifier.
///
/// The backend emits numeric row ids while older cached profiles may hold
/// strings, so both JSON forms are accepted and stored as a string.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(transparent)]
pub struct ProblemId(String);

impl ProblemId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProblemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProblemId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<u64> for ProblemId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl<'de> Deserialize<'de> for ProblemId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(u64),
            Text(String),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Number(n) => ProblemId(n.to_string()),
            Raw::Text(s) => ProblemId(s),
        })
    }
}

/// Last-known view of the signed-in user.
///
/// Invariant maintained by [`UserSnapshot::apply`]:
/// `problems_solved == solved_problems.len()`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct UserSnapshot {
    /// Stable identity-provider user ID
    pub uid: String,
    pub name: String,
    pub email: String,
    /// Avatar URL
    #[serde(default)]
    pub picture: Option<String>,
    #[serde(default)]
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub points: u64,
    #[serde(default)]
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub problems_solved: u64,
    #[serde(default)]
    pub solved_problems: BTreeSet<ProblemId>,
}

impl UserSnapshot {
    /// Fresh profile with no progress.
    pub fn new(uid: impl Into<String>, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            name: name.into(),
            email: email.into(),
            picture: None,
            points: 0,
            problems_solved: 0,
            solved_problems: BTreeSet::new(),
        }
    }

    pub fn has_solved(&self, id: &ProblemId) -> bool {
        self.solved_problems.contains(id)
    }

    /// Shallow-merge `patch` into this snapshot.
    ///
    /// Returns `true` if anything changed. An empty patch never touches the
    /// snapshot, so a cached profile whose counters disagree with the server
    /// is left byte-for-byte intact until a real update arrives.
    pub fn apply(&mut self, patch: &ProfilePatch) -> bool {
        if patch.is_empty() {
            return false;
        }
        let before = self.clone();

        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(email) = &patch.email {
            self.email = email.clone();
        }
        if let Some(picture) = &patch.picture {
            self.picture = Some(picture.clone());
        }
        if let Some(points) = patch.points {
            if points < self.points {
                tracing::debug!(
                    uid = %self.uid,
                    cached = self.points,
                    patched = points,
                    "Ignoring points decrease in optimistic merge"
                );
            }
            self.points = self.points.max(points);
        }
        if let Some(solved) = &patch.solved {
            // Set union: a resubmitted problem neither duplicates nor re-awards
            if self.solved_problems.insert(solved.id.clone()) {
                self.points = self.points.saturating_add(solved.points);
            }
        }

        self.problems_solved = self.solved_problems.len() as u64;
        *self != before
    }
}

/// A newly solved problem and the points it awarded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolvedProblem {
    pub id: ProblemId,
    #[serde(default)]
    pub points: u64,
}

/// Partial update to a [`UserSnapshot`].
///
/// `uid` is deliberately absent: identity never changes through a merge.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfilePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
    /// Replacement point total; never lowers the cached value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub points: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub solved: Option<SolvedProblem>,
}

impl ProfilePatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.picture.is_none()
            && self.points.is_none()
            && self.solved.is_none()
    }

    pub fn name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn picture(url: impl Into<String>) -> Self {
        Self {
            picture: Some(url.into()),
            ..Self::default()
        }
    }

    /// Mark a problem solved, awarding `points` if it wasn't already.
    pub fn solved(id: impl Into<ProblemId>, points: u64) -> Self {
        Self {
            solved: Some(SolvedProblem {
                id: id.into(),
                points,
            }),
            ..Self::default()
        }
    }
}

/// Public profile shown to any visitor (`GET /api/profile/{uid}`).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct PublicProfile {
    pub uid: String,
    pub name: String,
    #[serde(default)]
    pub picture: Option<String>,
    #[serde(default)]
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub points: u64,
    #[serde(default)]
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub problems_solved: u64,
    #[serde(default)]
    pub solved_problems: BTreeSet<ProblemId>,
}
