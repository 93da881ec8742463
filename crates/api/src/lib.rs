//! HTTP surface (spec.md §6): analytics, repo, and research-dataset routes
//! over the in-memory [`sdlc_synth_storage::StoreHandle`] the generation
//! pipeline produces at start-up. No `/v1` prefix - an explicit departure
//! from the teacher's own versioned mount, recorded in DESIGN.md.

pub mod auth;
pub mod cache;
pub mod handlers;
pub mod params;

use std::sync::Arc;
use std::time::Instant;

use axum::routing::get;
use axum::Router;
use chrono::{DateTime, Utc};
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use sdlc_synth_config::AppConfig;
use sdlc_synth_storage::StoreHandle;

use crate::cache::AnalyticsCache;

/// Shared state every handler reaches through `State<Arc<AppState>>`.
pub struct AppState {
    pub store: StoreHandle,
    pub config: AppConfig,
    pub cache: AnalyticsCache,
    pub start_time: Instant,
    /// End of the `SeedConfig` date window this store was generated for -
    /// the deterministic default for "as of now" analytics (e.g. file
    /// survival) instead of wall-clock time, so a keyless request always
    /// sees the same answer (spec.md §5/§9).
    pub default_as_of: DateTime<Utc>,
}

/// Builds the full router: `/health` is mounted outside the auth layer
/// (liveness must not depend on an API key); everything else requires
/// Basic auth via [`auth::require_api_key`].
pub fn build_router(state: Arc<AppState>) -> Router {
    let authenticated = Router::new()
        .route("/teams/members", get(handlers::teams::members))
        .route("/analytics/team/overview", get(handlers::analytics::team_overview))
        .route(
            "/analytics/team/total-usage",
            get(handlers::analytics::team_total_usage),
        )
        .route("/analytics/team/models", get(handlers::analytics::team_models))
        .route(
            "/analytics/team/client-versions",
            get(handlers::analytics::team_client_versions),
        )
        .route(
            "/analytics/team/top-file-extensions",
            get(handlers::analytics::team_top_file_extensions),
        )
        .route(
            "/analytics/team/leaderboard",
            get(handlers::analytics::team_leaderboard),
        )
        .route("/analytics/team/mcp", get(handlers::analytics::team_mcp))
        .route("/analytics/team/commands", get(handlers::analytics::team_commands))
        .route("/analytics/team/plans", get(handlers::analytics::team_plans))
        .route("/analytics/team/ask-mode", get(handlers::analytics::team_ask_mode))
        .route(
            "/analytics/by-user/overview",
            get(handlers::analytics::by_user_overview),
        )
        .route(
            "/analytics/by-user/total-usage",
            get(handlers::analytics::by_user_total_usage),
        )
        .route("/analytics/by-user/models", get(handlers::analytics::by_user_models))
        .route(
            "/analytics/by-user/client-versions",
            get(handlers::analytics::by_user_client_versions),
        )
        .route(
            "/analytics/by-user/top-file-extensions",
            get(handlers::analytics::by_user_top_file_extensions),
        )
        .route(
            "/analytics/by-user/leaderboard",
            get(handlers::analytics::by_user_leaderboard),
        )
        .route("/analytics/by-user/mcp", get(handlers::analytics::by_user_mcp))
        .route(
            "/analytics/by-user/commands",
            get(handlers::analytics::by_user_commands),
        )
        .route("/analytics/by-user/plans", get(handlers::analytics::by_user_plans))
        .route(
            "/analytics/by-user/ask-mode",
            get(handlers::analytics::by_user_ask_mode),
        )
        .route("/repos", get(handlers::repos::list_repos))
        .route("/repos/{owner}/{repo}", get(handlers::repos::get_repo))
        .route(
            "/repos/{owner}/{repo}/commits",
            get(handlers::repos::list_commits),
        )
        .route(
            "/repos/{owner}/{repo}/commits/{sha}",
            get(handlers::repos::get_commit),
        )
        .route("/repos/{owner}/{repo}/pulls", get(handlers::repos::list_pulls))
        .route(
            "/repos/{owner}/{repo}/pulls/{number}",
            get(handlers::repos::get_pull),
        )
        .route(
            "/repos/{owner}/{repo}/pulls/{number}/commits",
            get(handlers::repos::get_pull_commits),
        )
        .route(
            "/repos/{owner}/{repo}/pulls/{number}/files",
            get(handlers::repos::get_pull_files),
        )
        .route(
            "/repos/{owner}/{repo}/pulls/{number}/reviews",
            get(handlers::repos::get_pull_reviews),
        )
        .route(
            "/repos/{owner}/{repo}/analysis/survival",
            get(handlers::repos::analysis_survival),
        )
        .route(
            "/repos/{owner}/{repo}/analysis/reverts",
            get(handlers::repos::analysis_reverts),
        )
        .route(
            "/repos/{owner}/{repo}/analysis/hotfixes",
            get(handlers::repos::analysis_hotfixes),
        )
        .route("/research/dataset", get(handlers::research::dataset))
        .route("/research/metrics/{metric}", get(handlers::research::metrics))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            auth::require_api_key,
        ));

    Router::new()
        .route("/health", get(handlers::health::health))
        .merge(authenticated)
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
