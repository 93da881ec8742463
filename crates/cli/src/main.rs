//! `sdlc-synth`: offline driver for the simulator (SPEC_FULL.md §2 CLI note).
//!
//! Three subcommands: `gen-config` writes a starter `SeedConfig` YAML,
//! `generate` runs the pipeline once and dumps the research dataset (or the
//! raw entity set) to disk without ever starting a server, and `serve` runs
//! the pipeline and then hosts the same HTTP surface `sdlc-synth-server`
//! does - useful for local iteration against a config file instead of
//! environment variables. Teacher precedent: `iqrah-iss`'s `clap::Parser` /
//! `clap::Subcommand` CLI, `iqrah-gen`'s offline generator binary.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use sdlc_synth_api::cache::AnalyticsCache;
use sdlc_synth_api::{build_router, AppState};
use sdlc_synth_config::{AppConfig, SeedConfig};
use sdlc_synth_domain::DateRange;
use sdlc_synth_engine::research::assemble_dataset;
use sdlc_synth_storage::StoreHandle;

#[derive(Parser)]
#[command(name = "sdlc-synth")]
#[command(about = "Synthetic SDLC activity simulator: generator + analytics engine")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbosity level (0=error, 1=warn, 2=info, 3=debug, 4=trace)
    #[arg(short, long, default_value = "2", global = true)]
    verbosity: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a starter SeedConfig YAML file.
    GenConfig {
        /// Output YAML file.
        #[arg(short, long, default_value = "seed.yaml")]
        output: PathBuf,
    },

    /// Validate a SeedConfig file without generating anything.
    Check {
        /// Path to the SeedConfig YAML/JSON file.
        #[arg(short, long)]
        config: PathBuf,
    },

    /// Run the generation pipeline once and dump the research dataset.
    Generate {
        /// Path to the SeedConfig YAML/JSON file.
        #[arg(short, long)]
        config: PathBuf,

        /// Output file path.
        #[arg(short, long, default_value = "dataset.csv")]
        output: PathBuf,

        /// Output format.
        #[arg(short, long, default_value = "csv")]
        format: DumpFormat,
    },

    /// Run the generation pipeline and serve the resulting store over HTTP.
    Serve {
        /// Path to the SeedConfig YAML/JSON file.
        #[arg(short, long)]
        config: PathBuf,

        /// Address to bind the server to.
        #[arg(short, long, default_value = "0.0.0.0:8080")]
        bind: String,

        /// Comma-separated list of accepted API keys (Basic-auth username).
        #[arg(long, default_value = "dev-key")]
        api_keys: String,
    },
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
enum DumpFormat {
    Csv,
    Json,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbosity {
        0 => Level::ERROR,
        1 => Level::WARN,
        2 => Level::INFO,
        3 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .compact()
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    match cli.command {
        Commands::GenConfig { output } => gen_config(&output),
        Commands::Check { config } => check(&config),
        Commands::Generate {
            config,
            output,
            format,
        } => generate(&config, &output, format).await,
        Commands::Serve {
            config,
            bind,
            api_keys,
        } => serve(&config, &bind, &api_keys).await,
    }
}

fn gen_config(output: &PathBuf) -> Result<()> {
    let sample = r#"developer_count: 5
seniority_mix:
  junior: 0.3
  mid: 0.4
  senior: 0.3
repos:
  - owner: acme
    name: platform
date_window:
  start: 2026-01-01
  end: 2026-03-01
velocity: medium
fluctuation: 0.2
seed: 12345
ai_preference_distribution:
  alpha: 2.0
  beta: 1.5
pto_ranges: []
"#;
    std::fs::write(output, sample).with_context(|| format!("writing {output:?}"))?;
    println!("Sample seed config written to {output:?}");
    Ok(())
}

fn check(config_path: &PathBuf) -> Result<()> {
    match SeedConfig::from_yaml_file(config_path) {
        Ok(cfg) => {
            println!("config OK: {} developers, {} repos, seed {}", cfg.developer_count, cfg.repos.len(), cfg.seed);
            Ok(())
        }
        Err(e) => anyhow::bail!("invalid seed config: {e}"),
    }
}

fn load_config(path: &PathBuf) -> Result<SeedConfig> {
    SeedConfig::from_yaml_file(path).with_context(|| format!("loading seed config from {path:?}"))
}

/// Runs the (synchronous, CPU-bound) generation pipeline on a blocking
/// thread with a spinner so a large `developer_count` run doesn't look
/// hung; the pipeline itself reports no finer-grained progress (spec.md
/// §5: generation is a single deterministic sweep, not a streamed job).
async fn run_generation(cfg: SeedConfig) -> Result<sdlc_synth_engine::Store> {
    let show_spinner = cfg.developer_count >= 20;
    let pb = if show_spinner {
        let pb = ProgressBar::new_spinner();
        pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
        pb.set_message(format!("generating {} developers...", cfg.developer_count));
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        Some(pb)
    } else {
        None
    };

    let started = Instant::now();
    let store = tokio::task::spawn_blocking(move || sdlc_synth_engine::generate(&cfg)).await?;

    if let Some(pb) = pb {
        pb.finish_with_message(format!("generation complete in {:.2?}", started.elapsed()));
    } else {
        info!("generation complete in {:.2?}", started.elapsed());
    }

    Ok(store)
}

async fn generate(config_path: &PathBuf, output: &PathBuf, format: DumpFormat) -> Result<()> {
    let cfg = load_config(config_path)?;
    let window = DateRange {
        from: cfg.date_window.start_datetime(),
        to: cfg.date_window.end_datetime(),
    };
    let store = run_generation(cfg).await?;

    let rows = assemble_dataset(&store, window);
    info!("assembled {} research rows", rows.len());

    match format {
        DumpFormat::Json => {
            let json = serde_json::to_string_pretty(&rows)?;
            std::fs::write(output, json).with_context(|| format!("writing {output:?}"))?;
        }
        DumpFormat::Csv => {
            let mut writer = csv::WriterBuilder::new()
                .quote_style(csv::QuoteStyle::Necessary)
                .from_path(output)
                .with_context(|| format!("opening {output:?}"))?;
            writer.write_record(sdlc_synth_domain::SCHEMA)?;
            for row in &rows {
                writer.serialize(row)?;
            }
            writer.flush()?;
        }
    }

    println!("Wrote {} rows to {output:?}", rows.len());
    Ok(())
}

async fn serve(config_path: &PathBuf, bind: &str, api_keys: &str) -> Result<()> {
    let cfg = load_config(config_path)?;
    let default_as_of = cfg.date_window.end_datetime();
    let store = run_generation(cfg).await?;

    let config = AppConfig {
        bind_address: bind.to_string(),
        api_keys: api_keys
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
        default_page_size: sdlc_synth_domain::DEFAULT_PAGE_SIZE,
        max_page_size: sdlc_synth_domain::MAX_PAGE_SIZE,
        seed_config_path: config_path.to_string_lossy().into_owned(),
    };

    let state = Arc::new(AppState {
        store: StoreHandle::new(store),
        config: config.clone(),
        cache: AnalyticsCache::new(),
        start_time: Instant::now(),
        default_as_of,
    });

    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    info!("listening on {}", config.bind_address);
    axum::serve(listener, app).await?;
    Ok(())
}
