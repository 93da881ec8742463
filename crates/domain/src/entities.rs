//! Core entity types produced by the generation pipeline.
//!
//! All entities here are immutable once generated: the store never mutates
//! them after the initial generation sweep (see `sdlc-synth-engine::store`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Developer seniority tier. Drives session sizing and PR-open probability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Seniority {
    Junior,
    Mid,
    Senior,
}

impl Seniority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Seniority::Junior => "junior",
            Seniority::Mid => "mid",
            Seniority::Senior => "senior",
        }
    }
}

/// A developer in the simulated roster. Created once at init, immutable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Developer {
    pub id: Uuid,
    pub display_name: String,
    pub email: String,
    pub seniority: Seniority,
    /// In [0, 1]; higher values bias the commit generator toward AI lines.
    pub ai_preference: f64,
    pub active: bool,
}

/// A repository seeded from configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Repository {
    pub owner: String,
    pub name: String,
    pub default_branch: String,
}

impl Repository {
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

/// A single commit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Commit {
    pub sha: String,
    pub author: Uuid,
    pub repo: String,
    pub branch: String,
    pub ts: DateTime<Utc>,
    pub message: String,
    pub files: Vec<String>,
    pub tab_lines_added: u32,
    pub composer_lines_added: u32,
    pub non_ai_lines_added: u32,
    pub tab_lines_deleted: u32,
    pub composer_lines_deleted: u32,
    pub non_ai_lines_deleted: u32,
}

impl Commit {
    pub fn total_lines_added(&self) -> u32 {
        self.tab_lines_added + self.composer_lines_added + self.non_ai_lines_added
    }

    pub fn total_lines_deleted(&self) -> u32 {
        self.tab_lines_deleted + self.composer_lines_deleted + self.non_ai_lines_deleted
    }

    pub fn ai_lines_added(&self) -> u32 {
        self.tab_lines_added + self.composer_lines_added
    }

    /// (tab + composer) / max(1, total). See GLOSSARY.
    pub fn ai_ratio(&self) -> f64 {
        let total = self.total_lines_added().max(1) as f64;
        self.ai_lines_added() as f64 / total
    }
}

/// Pull request lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrState {
    Open,
    Closed,
    Merged,
}

/// A pull request, folded from one developer coding session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PullRequest {
    pub number: u64,
    pub repo: String,
    pub author: Uuid,
    pub state: PrState,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub first_commit_at: DateTime<Utc>,
    pub last_commit_at: DateTime<Utc>,
    pub first_review_at: Option<DateTime<Utc>>,
    pub merged_at: Option<DateTime<Utc>>,
    pub additions: u32,
    pub deletions: u32,
    pub changed_files: u32,
    pub commit_count: u32,
    pub reviewer_emails: Vec<String>,
    pub ai_ratio: f64,
    pub tab_lines: u32,
    pub composer_lines: u32,
    pub is_reverted: bool,
    pub is_bug_fix: bool,
    /// Additions at PR-open time, before any review-driven follow-up commits.
    pub initial_additions: u32,
    /// changed_files at PR-open time, before any review-driven follow-up commits.
    pub initial_changed_files: u32,
}

/// Coarse AI-usage slicing used throughout the analytics and quality layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AiBand {
    Low,
    Mid,
    High,
}

impl AiBand {
    pub fn of(ai_ratio: f64) -> Self {
        if ai_ratio < 0.3 {
            AiBand::Low
        } else if ai_ratio < 0.6 {
            AiBand::Mid
        } else {
            AiBand::High
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AiBand::Low => "low",
            AiBand::Mid => "mid",
            AiBand::High => "high",
        }
    }
}

/// Final review disposition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewState {
    Approved,
    Commented,
    RequestedChanges,
}

/// A single review event on a PR.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    pub id: Uuid,
    pub repo: String,
    pub pr_number: u64,
    pub reviewer: Uuid,
    pub state: ReviewState,
    pub submitted_at: DateTime<Utc>,
    pub body: String,
}

/// Lifecycle of a single tracked file within a repo.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileLifecycle {
    pub path: String,
    pub repo: String,
    pub born_at: DateTime<Utc>,
    pub died_at: Option<DateTime<Utc>>,
    pub creator: Uuid,
    pub ai_ratio_at_birth: f64,
}

/// A revert linked back to the PR it reverts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevertEvent {
    pub revert_pr: u64,
    pub original_pr: u64,
    pub repo: String,
    pub delay_hours: f64,
    /// Capped at 0.15 per spec.
    pub risk_score: f64,
}

/// A fix-titled PR that landed within 48h of its parent touching overlapping files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HotfixEvent {
    pub hotfix_pr: u64,
    pub parent_pr: u64,
    pub repo: String,
    pub delay_hours: f64,
    pub overlapping_files: Vec<String>,
}
