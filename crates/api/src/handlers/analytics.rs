//! `/analytics/team/*` and `/analytics/by-user/*` (spec.md §4.13, §6).
//!
//! Every metric route shares the same shape: filter commits by the common
//! predicate, then either aggregate once (team) or group by author and
//! aggregate per group (by-user). One dispatch function computes the right
//! `engine::analytics` call for a metric name so the ten team routes and
//! ten by-user routes below don't repeat the match arm ten times each.

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::Json;

use sdlc_synth_domain::{ByUserEnvelope, Commit, Developer, TeamEnvelope};
use sdlc_synth_engine::analytics;

use crate::cache::CacheKey;
use crate::params::CommonQuery;
use crate::AppState;

/// Computes one named metric over an already-filtered commit slice.
fn compute(metric: &'static str, commits: &[&Commit], developers: &[Developer]) -> serde_json::Value {
    match metric {
        "overview" => serde_json::to_value(analytics::overview(commits, developers)),
        "total-usage" => serde_json::to_value(analytics::total_usage(commits)),
        "models" => serde_json::to_value(analytics::models(commits)),
        "client-versions" => serde_json::to_value(analytics::client_versions(commits)),
        "top-file-extensions" => serde_json::to_value(analytics::top_file_extensions(commits)),
        "leaderboard" => serde_json::to_value(analytics::leaderboard(commits)),
        "mcp" => serde_json::to_value(analytics::mcp(commits)),
        "commands" => serde_json::to_value(analytics::commands(commits)),
        "plans" => serde_json::to_value(analytics::plans(commits)),
        "ask-mode" => serde_json::to_value(analytics::ask_mode(commits)),
        other => unreachable!("unregistered metric route {other}"),
    }
    .expect("metric aggregates always serialize")
}

async fn team_metric(
    metric: &'static str,
    state: Arc<AppState>,
    query: CommonQuery,
) -> Result<Json<TeamEnvelope<serde_json::Value>>, sdlc_synth_domain::ApiError> {
    let predicate = query.into_predicate(None)?;

    let cache_key = CacheKey {
        endpoint: metric,
        start_date: query.start_date.clone(),
        end_date: query.end_date.clone(),
        user_id: query.user_id.clone(),
        repo_name: query.repo_name.clone(),
        page: None,
        page_size: None,
        format: None,
    };
    if let Some(cached) = state.cache.get(&cache_key) {
        return Ok(Json(TeamEnvelope {
            data: cached,
            params: query.echo(),
        }));
    }

    let commits = state.store.commits(&predicate);
    let data = compute(metric, &commits, state.store.developers());
    state.cache.put(cache_key, &data);

    Ok(Json(TeamEnvelope {
        data,
        params: query.echo(),
    }))
}

async fn by_user_metric(
    metric: &'static str,
    state: Arc<AppState>,
    query: CommonQuery,
) -> Result<Json<ByUserEnvelope<serde_json::Value>>, sdlc_synth_domain::ApiError> {
    let predicate = query.into_predicate(None)?;
    let page = query.page_request()?;

    let commits = state.store.commits(&predicate);
    let developers = state.store.developers();

    let mut by_author: HashMap<String, Vec<&Commit>> = HashMap::new();
    for commit in &commits {
        by_author.entry(commit.author.to_string()).or_default().push(commit);
    }

    let mut user_ids: Vec<String> = by_author.keys().cloned().collect();
    user_ids.sort();
    let total = user_ids.len();
    let page_ids = page.slice(&user_ids);

    let mut data = HashMap::new();
    for user_id in &page_ids {
        let user_commits = by_author.get(user_id).cloned().unwrap_or_default();
        data.insert(user_id.clone(), compute(metric, &user_commits, developers));
    }

    Ok(Json(ByUserEnvelope {
        data,
        pagination: sdlc_synth_domain::Pagination::new(page, total),
        params: query.echo(),
    }))
}

macro_rules! team_route {
    ($fn_name:ident, $metric:literal) => {
        pub async fn $fn_name(
            State(state): State<Arc<AppState>>,
            Query(query): Query<CommonQuery>,
        ) -> Result<Json<TeamEnvelope<serde_json::Value>>, sdlc_synth_domain::ApiError> {
            team_metric($metric, state, query).await
        }
    };
}

macro_rules! by_user_route {
    ($fn_name:ident, $metric:literal) => {
        pub async fn $fn_name(
            State(state): State<Arc<AppState>>,
            Query(query): Query<CommonQuery>,
        ) -> Result<Json<ByUserEnvelope<serde_json::Value>>, sdlc_synth_domain::ApiError> {
            by_user_metric($metric, state, query).await
        }
    };
}

team_route!(team_overview, "overview");
team_route!(team_total_usage, "total-usage");
team_route!(team_models, "models");
team_route!(team_client_versions, "client-versions");
team_route!(team_top_file_extensions, "top-file-extensions");
team_route!(team_leaderboard, "leaderboard");
team_route!(team_mcp, "mcp");
team_route!(team_commands, "commands");
team_route!(team_plans, "plans");
team_route!(team_ask_mode, "ask-mode");

by_user_route!(by_user_overview, "overview");
by_user_route!(by_user_total_usage, "total-usage");
by_user_route!(by_user_models, "models");
by_user_route!(by_user_client_versions, "client-versions");
by_user_route!(by_user_top_file_extensions, "top-file-extensions");
by_user_route!(by_user_leaderboard, "leaderboard");
by_user_route!(by_user_mcp, "mcp");
by_user_route!(by_user_commands, "commands");
by_user_route!(by_user_plans, "plans");
by_user_route!(by_user_ask_mode, "ask-mode");
