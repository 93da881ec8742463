//! Drives the real router end-to-end via `tower::ServiceExt::oneshot`, the
//! same way `examples/iqrahapp-iqrah-mobile/backend/crates/api/tests/api_integration_tests.rs`
//! exercises its axum app - except there is no database to seed here, so the
//! fixture is a small deterministic `generate()` run instead of `sqlx::test`.

use std::sync::Arc;
use std::time::Instant;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use base64::Engine;
use serde_json::Value;
use tower::ServiceExt;

use sdlc_synth_api::cache::AnalyticsCache;
use sdlc_synth_api::{build_router, AppState};
use sdlc_synth_config::{
    AiPreferenceDistribution, AppConfig, DateWindow, RepoConfig, SeedConfig, SeniorityMix,
};
use sdlc_synth_domain::QueryPredicate;
use sdlc_synth_storage::StoreHandle;

const API_KEY: &str = "test-key";

fn seed_config() -> SeedConfig {
    SeedConfig {
        developer_count: 15,
        seniority_mix: SeniorityMix {
            junior: 1.0 / 3.0,
            mid: 1.0 / 3.0,
            senior: 1.0 / 3.0,
        },
        repos: vec![RepoConfig {
            owner: "acme".to_string(),
            name: "platform".to_string(),
        }],
        date_window: DateWindow {
            start: chrono::NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            end: chrono::NaiveDate::from_ymd_opt(2026, 4, 1).unwrap(),
        },
        velocity: "high".to_string(),
        fluctuation: 0.2,
        seed: 20260729,
        ai_preference_distribution: AiPreferenceDistribution::default(),
        pto_ranges: Vec::new(),
    }
}

fn test_app() -> (Router, Arc<AppState>) {
    let cfg = seed_config();
    let default_as_of = cfg.date_window.end_datetime();
    let store = sdlc_synth_engine::generate(&cfg);

    let state = Arc::new(AppState {
        store: StoreHandle::new(store),
        config: AppConfig {
            bind_address: "127.0.0.1:0".to_string(),
            api_keys: vec![API_KEY.to_string()],
            default_page_size: sdlc_synth_domain::DEFAULT_PAGE_SIZE,
            max_page_size: sdlc_synth_domain::MAX_PAGE_SIZE,
            seed_config_path: "unused".to_string(),
        },
        cache: AnalyticsCache::new(),
        start_time: Instant::now(),
        default_as_of,
    });

    (build_router(state.clone()), state)
}

fn basic_auth(key: &str) -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(format!("{key}:"));
    format!("Basic {encoded}")
}

fn get(uri: &str, auth: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(auth) = auth {
        builder = builder.header(header::AUTHORIZATION, auth);
    }
    builder.body(Body::empty()).unwrap()
}

#[tokio::test]
async fn health_check_returns_200_without_auth() {
    let (app, _state) = test_app();
    let resp = app.oneshot(get("/health", None)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn missing_api_key_is_unauthorized() {
    let (app, _state) = test_app();
    let resp = app.oneshot(get("/repos", None)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn invalid_api_key_is_unauthorized() {
    let (app, _state) = test_app();
    let auth = basic_auth("wrong-key");
    let resp = app.oneshot(get("/repos", Some(&auth))).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn valid_api_key_lists_the_configured_repo() {
    let (app, _state) = test_app();
    let auth = basic_auth(API_KEY);
    let resp = app.oneshot(get("/repos", Some(&auth))).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = serde_json::from_slice(&to_bytes(resp.into_body(), 1024 * 1024).await.unwrap()).unwrap();
    let repos = body.as_array().expect("repos should be an array");
    assert_eq!(repos.len(), 1);
    assert_eq!(repos[0]["owner"], "acme");
    assert_eq!(repos[0]["name"], "platform");
}

#[tokio::test]
async fn pull_request_listing_honors_page_size_and_reports_total() {
    let (app, state) = test_app();
    let expected_total = state.store.pull_requests(&QueryPredicate::all()).len();
    assert!(
        expected_total > 5,
        "fixture should produce more than one page of PRs, got {expected_total}"
    );

    let auth = basic_auth(API_KEY);
    let resp = app
        .oneshot(get(
            "/repos/acme/platform/pulls?page=1&page_size=5",
            Some(&auth),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = serde_json::from_slice(&to_bytes(resp.into_body(), 1024 * 1024).await.unwrap()).unwrap();
    assert_eq!(body["data"].as_array().unwrap().len(), 5);
    assert_eq!(body["pagination"]["page"], 1);
    assert_eq!(body["pagination"]["page_size"], 5);
    assert_eq!(body["pagination"]["total"], expected_total);
}

#[tokio::test]
async fn unknown_repo_returns_404() {
    let (app, _state) = test_app();
    let auth = basic_auth(API_KEY);
    let resp = app
        .oneshot(get("/repos/acme/nonexistent/pulls", Some(&auth)))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
