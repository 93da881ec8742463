//! `/repos/...` (spec.md §6): code-hosting-shaped read surface over repos,
//! commits, pull requests, reviews, and the quality analyzers.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Serialize;

use sdlc_synth_domain::{ApiError, Commit, PullRequest, Review};
use sdlc_synth_engine::{analyze, survival};

use crate::params::CommonQuery;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct RepoDto {
    pub owner: String,
    pub name: String,
    pub default_branch: String,
}

#[derive(Debug, Serialize)]
pub struct CommitDto {
    pub sha: String,
    pub author: String,
    pub repo: String,
    pub branch: String,
    pub ts: chrono::DateTime<chrono::Utc>,
    pub message: String,
    pub files: Vec<String>,
    pub tab_lines_added: u32,
    pub composer_lines_added: u32,
    pub non_ai_lines_added: u32,
    pub tab_lines_deleted: u32,
    pub composer_lines_deleted: u32,
    pub non_ai_lines_deleted: u32,
    pub ai_ratio: f64,
}

impl From<&Commit> for CommitDto {
    fn from(c: &Commit) -> Self {
        Self {
            sha: c.sha.clone(),
            author: c.author.to_string(),
            repo: c.repo.clone(),
            branch: c.branch.clone(),
            ts: c.ts,
            message: c.message.clone(),
            files: c.files.clone(),
            tab_lines_added: c.tab_lines_added,
            composer_lines_added: c.composer_lines_added,
            non_ai_lines_added: c.non_ai_lines_added,
            tab_lines_deleted: c.tab_lines_deleted,
            composer_lines_deleted: c.composer_lines_deleted,
            non_ai_lines_deleted: c.non_ai_lines_deleted,
            ai_ratio: c.ai_ratio(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PullRequestDto {
    pub number: u64,
    pub repo: String,
    pub author: String,
    pub state: sdlc_synth_domain::PrState,
    pub title: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub first_commit_at: chrono::DateTime<chrono::Utc>,
    pub last_commit_at: chrono::DateTime<chrono::Utc>,
    pub first_review_at: Option<chrono::DateTime<chrono::Utc>>,
    pub merged_at: Option<chrono::DateTime<chrono::Utc>>,
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
}

impl From<&PullRequest> for PullRequestDto {
    fn from(pr: &PullRequest) -> Self {
        Self {
            number: pr.number,
            repo: pr.repo.clone(),
            author: pr.author.to_string(),
            state: pr.state,
            title: pr.title.clone(),
            created_at: pr.created_at,
            first_commit_at: pr.first_commit_at,
            last_commit_at: pr.last_commit_at,
            first_review_at: pr.first_review_at,
            merged_at: pr.merged_at,
            additions: pr.additions,
            deletions: pr.deletions,
            changed_files: pr.changed_files,
            commit_count: pr.commit_count,
            reviewer_emails: pr.reviewer_emails.clone(),
            ai_ratio: pr.ai_ratio,
            tab_lines: pr.tab_lines,
            composer_lines: pr.composer_lines,
            is_reverted: pr.is_reverted,
            is_bug_fix: pr.is_bug_fix,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ReviewDto {
    pub id: String,
    pub repo: String,
    pub pr_number: u64,
    pub reviewer: String,
    pub state: sdlc_synth_domain::ReviewState,
    pub submitted_at: chrono::DateTime<chrono::Utc>,
    pub body: String,
}

impl From<&Review> for ReviewDto {
    fn from(r: &Review) -> Self {
        Self {
            id: r.id.to_string(),
            repo: r.repo.clone(),
            pr_number: r.pr_number,
            reviewer: r.reviewer.to_string(),
            state: r.state,
            submitted_at: r.submitted_at,
            body: r.body.clone(),
        }
    }
}

fn repo_or_404<'a>(
    state: &'a AppState,
    owner: &str,
    name: &str,
) -> Result<&'a sdlc_synth_domain::Repository, ApiError> {
    state
        .store
        .repository(owner, name)
        .ok_or_else(|| ApiError::NotFound(format!("unknown repo {owner}/{name}")))
}

pub async fn list_repos(State(state): State<Arc<AppState>>) -> Json<Vec<RepoDto>> {
    let repos = state
        .store
        .repositories()
        .into_iter()
        .map(|r| RepoDto {
            owner: r.owner.clone(),
            name: r.name.clone(),
            default_branch: r.default_branch.clone(),
        })
        .collect();
    Json(repos)
}

pub async fn get_repo(
    State(state): State<Arc<AppState>>,
    Path((owner, name)): Path<(String, String)>,
) -> Result<Json<RepoDto>, ApiError> {
    let repo = repo_or_404(&state, &owner, &name)?;
    Ok(Json(RepoDto {
        owner: repo.owner.clone(),
        name: repo.name.clone(),
        default_branch: repo.default_branch.clone(),
    }))
}

pub async fn list_commits(
    State(state): State<Arc<AppState>>,
    Path((owner, name)): Path<(String, String)>,
    Query(query): Query<CommonQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    repo_or_404(&state, &owner, &name)?;
    let full_name = format!("{owner}/{name}");
    let predicate = query.into_predicate(Some(full_name))?;
    let page = query.page_request()?;

    let mut commits = state.store.commits(&predicate);
    let (page_items, pagination) =
        sdlc_synth_storage::StoreHandle::paginate(&mut commits, |c| (c.ts, c.sha.clone()), &page);

    Ok(Json(serde_json::json!({
        "data": page_items.into_iter().map(CommitDto::from).collect::<Vec<_>>(),
        "pagination": pagination,
        "params": query.echo(),
    })))
}

pub async fn get_commit(
    State(state): State<Arc<AppState>>,
    Path((owner, name, sha)): Path<(String, String, String)>,
) -> Result<Json<CommitDto>, ApiError> {
    repo_or_404(&state, &owner, &name)?;
    let full_name = format!("{owner}/{name}");
    let commit = state
        .store
        .commit_by_sha(&full_name, &sha)
        .ok_or_else(|| ApiError::NotFound(format!("unknown commit {sha} in {full_name}")))?;
    Ok(Json(CommitDto::from(commit)))
}

pub async fn list_pulls(
    State(state): State<Arc<AppState>>,
    Path((owner, name)): Path<(String, String)>,
    Query(query): Query<CommonQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    repo_or_404(&state, &owner, &name)?;
    let full_name = format!("{owner}/{name}");
    let predicate = query.into_predicate(Some(full_name))?;
    let page = query.page_request()?;

    let prs = sdlc_synth_engine::analytics::sort_pulls_for_listing(state.store.pull_requests(&predicate));
    let total = prs.len();
    let page_items = page.slice(&prs);

    Ok(Json(serde_json::json!({
        "data": page_items.into_iter().map(PullRequestDto::from).collect::<Vec<_>>(),
        "pagination": sdlc_synth_domain::Pagination::new(page, total),
        "params": query.echo(),
    })))
}

fn pr_or_404<'a>(
    state: &'a AppState,
    owner: &str,
    name: &str,
    number: u64,
) -> Result<&'a PullRequest, ApiError> {
    let full_name = format!("{owner}/{name}");
    state
        .store
        .pull_request(&full_name, number)
        .ok_or_else(|| ApiError::NotFound(format!("unknown PR {full_name}#{number}")))
}

pub async fn get_pull(
    State(state): State<Arc<AppState>>,
    Path((owner, name, number)): Path<(String, String, u64)>,
) -> Result<Json<PullRequestDto>, ApiError> {
    let pr = pr_or_404(&state, &owner, &name, number)?;
    Ok(Json(PullRequestDto::from(pr)))
}

pub async fn get_pull_commits(
    State(state): State<Arc<AppState>>,
    Path((owner, name, number)): Path<(String, String, u64)>,
) -> Result<Json<Vec<CommitDto>>, ApiError> {
    let pr = pr_or_404(&state, &owner, &name, number)?;
    let commits: Vec<CommitDto> = state
        .store
        .commits_for_pr(pr)
        .into_iter()
        .map(CommitDto::from)
        .collect();
    Ok(Json(commits))
}

pub async fn get_pull_files(
    State(state): State<Arc<AppState>>,
    Path((owner, name, number)): Path<(String, String, u64)>,
) -> Result<Json<Vec<String>>, ApiError> {
    let pr = pr_or_404(&state, &owner, &name, number)?;
    Ok(Json(state.store.files_for_pr(pr)))
}

pub async fn get_pull_reviews(
    State(state): State<Arc<AppState>>,
    Path((owner, name, number)): Path<(String, String, u64)>,
) -> Result<Json<Vec<ReviewDto>>, ApiError> {
    pr_or_404(&state, &owner, &name, number)?;
    let full_name = format!("{owner}/{name}");
    let reviews: Vec<ReviewDto> = state
        .store
        .reviews_for_pr(&full_name, number)
        .into_iter()
        .map(ReviewDto::from)
        .collect();
    Ok(Json(reviews))
}

#[derive(Debug, Serialize)]
struct SurvivalBreakdown {
    overall_rate: Option<f64>,
    by_developer: std::collections::HashMap<String, Option<f64>>,
    by_ai_band: std::collections::HashMap<String, Option<f64>>,
}

pub async fn analysis_survival(
    State(state): State<Arc<AppState>>,
    Path((owner, name)): Path<(String, String)>,
    Query(query): Query<CommonQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    repo_or_404(&state, &owner, &name)?;
    let full_name = format!("{owner}/{name}");
    let date_range = query.date_range()?;
    let as_of = date_range.map(|r| r.to).unwrap_or(state.default_as_of);

    let mut files = state.store.files_for_repo(&full_name);
    if let Some(range) = date_range {
        files.retain(|f| range.contains(f.born_at));
    }
    if let Some(user_id) = &query.user_id {
        files.retain(|f| &f.creator.to_string() == user_id);
    }

    let overall_rate = survival::survival_rate_at_window(&files, 30.0, as_of);

    let mut by_developer: std::collections::HashMap<String, Option<f64>> = Default::default();
    let mut dev_ids: Vec<String> = files.iter().map(|f| f.creator.to_string()).collect();
    dev_ids.sort();
    dev_ids.dedup();
    for dev_id in dev_ids {
        let subset: Vec<_> = files
            .iter()
            .filter(|f| f.creator.to_string() == dev_id)
            .cloned()
            .collect();
        by_developer.insert(dev_id, survival::survival_rate_at_window(&subset, 30.0, as_of));
    }

    let mut by_ai_band: std::collections::HashMap<String, Option<f64>> = Default::default();
    for band in [
        sdlc_synth_domain::AiBand::Low,
        sdlc_synth_domain::AiBand::Mid,
        sdlc_synth_domain::AiBand::High,
    ] {
        let subset: Vec<_> = files
            .iter()
            .filter(|f| sdlc_synth_domain::AiBand::of(f.ai_ratio_at_birth) == band)
            .cloned()
            .collect();
        by_ai_band.insert(
            band.as_str().to_string(),
            survival::survival_rate_at_window(&subset, 30.0, as_of),
        );
    }

    Ok(Json(serde_json::json!({
        "data": SurvivalBreakdown { overall_rate, by_developer, by_ai_band },
        "params": query.echo(),
    })))
}

pub async fn analysis_reverts(
    State(state): State<Arc<AppState>>,
    Path((owner, name)): Path<(String, String)>,
    Query(query): Query<CommonQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    repo_or_404(&state, &owner, &name)?;
    let full_name = format!("{owner}/{name}");
    let date_range = query.date_range()?;

    let merged = state.store.merged_pull_requests(Some(&full_name));
    let reverts: Vec<_> = state
        .store
        .reverts()
        .iter()
        .filter(|r| r.repo == full_name)
        .filter(|r| {
            let Some(original) = merged.iter().find(|pr| pr.number == r.original_pr) else {
                return false;
            };
            let Some(merged_at) = original.merged_at else {
                return false;
            };
            date_range.map(|range| range.contains(merged_at)).unwrap_or(true)
        })
        .cloned()
        .collect();

    let summary = analyze::summarize_reverts(&merged, &reverts);

    Ok(Json(serde_json::json!({
        "data": {
            "summary": summary,
            "reverts": reverts,
        },
        "params": query.echo(),
    })))
}

pub async fn analysis_hotfixes(
    State(state): State<Arc<AppState>>,
    Path((owner, name)): Path<(String, String)>,
    Query(query): Query<CommonQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    repo_or_404(&state, &owner, &name)?;
    let full_name = format!("{owner}/{name}");
    let date_range = query.date_range()?;

    let merged = state.store.merged_pull_requests(Some(&full_name));
    let hotfixes: Vec<_> = state
        .store
        .hotfixes()
        .iter()
        .filter(|h| h.repo == full_name)
        .filter(|h| {
            let Some(parent) = merged.iter().find(|pr| pr.number == h.parent_pr) else {
                return false;
            };
            let Some(merged_at) = parent.merged_at else {
                return false;
            };
            date_range.map(|range| range.contains(merged_at)).unwrap_or(true)
        })
        .cloned()
        .collect();

    let summary = analyze::summarize_hotfixes(&merged, &hotfixes);

    Ok(Json(serde_json::json!({
        "data": {
            "summary": summary,
            "hotfixes": hotfixes,
        },
        "params": query.echo(),
    })))
}
