//! `sdlc-synth-server`: boots the generation pipeline once from a
//! `SeedConfig` file and serves the resulting immutable store over HTTP.
//!
//! Generation is fatal-on-error (spec.md §7: `ConfigError` aborts before a
//! store exists); everything after that point is read-only, so the HTTP
//! layer built by `sdlc_synth_api::build_router` never touches the
//! generation path again.

use std::sync::Arc;
use std::time::Instant;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sdlc_synth_api::cache::AnalyticsCache;
use sdlc_synth_api::{build_router, AppState};
use sdlc_synth_config::{AppConfig, SeedConfig};
use sdlc_synth_storage::StoreHandle;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("starting sdlc-synth-server");

    let config = AppConfig::from_env()?;
    tracing::info!(path = %config.seed_config_path, "loading seed config");
    let seed_config = SeedConfig::from_yaml_file(&config.seed_config_path)?;

    tracing::info!(
        seed = seed_config.seed,
        developers = seed_config.developer_count,
        "generating world"
    );
    let generated_at = Instant::now();
    let store = sdlc_synth_engine::generate(&seed_config);
    tracing::info!(
        commits = store.commits.len(),
        pull_requests = store.pull_requests.len(),
        elapsed_ms = generated_at.elapsed().as_millis() as u64,
        "generation complete"
    );

    let state = Arc::new(AppState {
        store: StoreHandle::new(store),
        config: config.clone(),
        cache: AnalyticsCache::new(),
        start_time: Instant::now(),
        default_as_of: seed_config.date_window.end_datetime(),
    });

    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    tracing::info!(address = %config.bind_address, "listening");

    axum::serve(listener, app).await?;

    Ok(())
}
