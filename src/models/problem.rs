// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Problem catalogue models and per-difficulty progress.

use crate::models::ProblemId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Problem difficulty tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];
}

/// Problem as listed by `GET /api/problems` and `GET /api/problem/{slug}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Problem {
    pub id: ProblemId,
    pub slug: String,
    pub title: String,
    pub description: String,
    pub difficulty: Difficulty,
    /// Points awarded for a full solve
    #[serde(default = "default_points")]
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub points: u64,
    #[serde(default)]
    pub boilerplate_code: Option<String>,
    #[serde(default)]
    pub hints: Vec<String>,
}

fn default_points() -> u64 {
    10
}

/// Difficulty and free-text filter over the problem list.
#[derive(Debug, Clone, Default)]
pub struct ProblemFilter {
    /// `None` selects every difficulty
    pub difficulty: Option<Difficulty>,
    pub search: String,
}

impl ProblemFilter {
    pub fn matches(&self, problem: &Problem) -> bool {
        if let Some(difficulty) = self.difficulty {
            if problem.difficulty != difficulty {
                return false;
            }
        }

        let term = self.search.trim().to_lowercase();
        term.is_empty()
            || problem.title.to_lowercase().contains(&term)
            || problem.description.to_lowercase().contains(&term)
    }

    pub fn apply<'a>(&self, problems: &'a [Problem]) -> Vec<&'a Problem> {
        problems.iter().filter(|p| self.matches(p)).collect()
    }
}

/// Solved vs total count for one difficulty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DifficultyProgress {
    pub difficulty: Difficulty,
    pub solved: usize,
    pub total: usize,
}

impl DifficultyProgress {
    /// Progress per difficulty, always in Easy/Medium/Hard order.
    pub fn compute(problems: &[Problem], solved: &BTreeSet<ProblemId>) -> Vec<DifficultyProgress> {
        Difficulty::ALL
            .iter()
            .map(|&difficulty| {
                let tier = problems.iter().filter(|p| p.difficulty == difficulty);
                let (total, done) = tier.fold((0, 0), |(total, done), p| {
                    (total + 1, done + usize::from(solved.contains(&p.id)))
                });
                DifficultyProgress {
                    difficulty,
                    solved: done,
                    total,
                }
            })
            .collect()
    }

    /// Completion percentage (0 when the tier is empty).
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.solved as f64 / self.total as f64 * 100.0
        }
    }
}
