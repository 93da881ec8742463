//! Configuration for the SDLC activity simulator: the population/seed
//! config that drives generation (`seed`), and the process-level server
//! config loaded from the environment (`AppConfig`).

pub mod seed;

pub use seed::*;

use std::env;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppConfigError {
    #[error("missing environment variable: {0}")]
    MissingVar(String),
}

/// Process-level configuration for the HTTP server.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Address to bind the server to.
    pub bind_address: String,
    /// Accepted API keys (Basic auth username, empty password).
    pub api_keys: Vec<String>,
    /// Default page size for paginated endpoints.
    pub default_page_size: u32,
    /// Maximum allowed page size.
    pub max_page_size: u32,
    /// Path to the `SeedConfig` YAML/JSON file the generation pipeline runs
    /// at start-up. Kept separate from the population config itself -
    /// `AppConfig` is process plumbing, `SeedConfig` is simulation input.
    pub seed_config_path: String,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, AppConfigError> {
        dotenvy::dotenv().ok();

        let api_keys = env_var_or("API_KEYS", "dev-key")
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Ok(Self {
            bind_address: env_var_or("BIND_ADDRESS", "0.0.0.0:8080"),
            api_keys,
            default_page_size: env_var_or("DEFAULT_PAGE_SIZE", "20")
                .parse()
                .unwrap_or(20),
            max_page_size: env_var_or("MAX_PAGE_SIZE", "1000").parse().unwrap_or(1000),
            seed_config_path: env_var_or("SEED_CONFIG_PATH", "seed.yaml"),
        })
    }
}

fn env_var_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_var_or_uses_default() {
        let val = env_var_or("SDLC_SYNTH_NON_EXISTENT_VAR", "fallback");
        assert_eq!(val, "fallback");
    }
}
