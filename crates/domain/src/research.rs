//! The 38-column per-PR research dataset row.
//!
//! Field order here is the CSV column order (spec.md §6, §4.14) - `SCHEMA`
//! must be kept in lockstep with the struct's declaration order; a test in
//! `sdlc-synth-engine::research` enforces this by round-tripping a row
//! through a CSV writer and comparing headers.

use chrono::{DateTime, Utc};
use serde::Serialize;

pub const SCHEMA: [&str; 38] = [
    "repo",
    "pr_number",
    "author_id",
    "author_seniority",
    "ai_preference",
    "title",
    "created_at",
    "first_commit_at",
    "last_commit_at",
    "first_review_at",
    "merged_at",
    "additions",
    "deletions",
    "net_lines",
    "changed_files",
    "commit_count",
    "reviewer_count",
    "review_count",
    "ai_ratio",
    "ai_band",
    "tab_lines",
    "composer_lines",
    "non_ai_lines",
    "initial_additions",
    "initial_changed_files",
    "rework_ratio",
    "scope_creep",
    "greenfield_index",
    "pickup_time_hours",
    "review_density",
    "cycle_time_hours",
    "is_reverted",
    "revert_delay_hours",
    "is_bug_fix",
    "has_hotfix_followup",
    "hotfix_delay_hours",
    "survival_rate_30d",
    "merged_date",
];

#[derive(Debug, Clone, Serialize)]
pub struct ResearchRow {
    pub repo: String,
    pub pr_number: u64,
    pub author_id: String,
    pub author_seniority: String,
    pub ai_preference: f64,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub first_commit_at: DateTime<Utc>,
    pub last_commit_at: DateTime<Utc>,
    pub first_review_at: Option<DateTime<Utc>>,
    pub merged_at: DateTime<Utc>,
    pub additions: u32,
    pub deletions: u32,
    pub net_lines: i64,
    pub changed_files: u32,
    pub commit_count: u32,
    pub reviewer_count: u32,
    pub review_count: u32,
    pub ai_ratio: f64,
    pub ai_band: String,
    pub tab_lines: u32,
    pub composer_lines: u32,
    pub non_ai_lines: u32,
    pub initial_additions: u32,
    pub initial_changed_files: u32,
    pub rework_ratio: f64,
    pub scope_creep: f64,
    pub greenfield_index: f64,
    /// Hours from created_at to first_review_at; None if never reviewed.
    pub pickup_time_hours: Option<f64>,
    pub review_density: f64,
    pub cycle_time_hours: f64,
    pub is_reverted: bool,
    pub revert_delay_hours: Option<f64>,
    pub is_bug_fix: bool,
    pub has_hotfix_followup: bool,
    pub hotfix_delay_hours: Option<f64>,
    pub survival_rate_30d: f64,
    pub merged_date: String,
}
