//! Population/seed configuration (spec.md §4.2): what to generate, not how
//! to serve it.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("seniority_mix fractions must sum to 1 (+/- 1e-6), got {0}")]
    SeniorityMixInvalid(f64),
    #[error("date_window is empty: start must be before end")]
    EmptyWindow,
    #[error("developer_count must be >= 1, got {0}")]
    DeveloperCountOutOfBounds(u32),
    #[error("unknown velocity setting: {0} (expected low, medium, or high)")]
    UnknownVelocity(String),
    #[error("repos must contain at least one entry")]
    NoRepos,
    #[error("failed to parse config: {0}")]
    Parse(String),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RepoConfig {
    pub owner: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SeniorityMix {
    pub junior: f64,
    pub mid: f64,
    pub senior: f64,
}

impl SeniorityMix {
    pub fn sum(&self) -> f64 {
        self.junior + self.mid + self.senior
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    /// Midnight UTC on `start`.
    pub fn start_datetime(&self) -> DateTime<Utc> {
        Utc.from_utc_datetime(&self.start.and_hms_opt(0, 0, 0).expect("valid midnight"))
    }

    /// Midnight UTC on `end` (the window is half-open, `end` excluded).
    pub fn end_datetime(&self) -> DateTime<Utc> {
        Utc.from_utc_datetime(&self.end.and_hms_opt(0, 0, 0).expect("valid midnight"))
    }
}

/// Beta-distribution parameters for sampling each developer's ai_preference.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct AiPreferenceDistribution {
    pub alpha: f64,
    pub beta: f64,
}

impl Default for AiPreferenceDistribution {
    fn default() -> Self {
        // Centered slightly above 0.5 with moderate spread.
        Self {
            alpha: 2.0,
            beta: 1.5,
        }
    }
}

fn default_fluctuation() -> f64 {
    0.2
}

fn default_ai_preference_distribution() -> AiPreferenceDistribution {
    AiPreferenceDistribution::default()
}

fn default_pto_ranges() -> Vec<(NaiveDate, NaiveDate)> {
    Vec::new()
}

/// Top-level population configuration (spec.md §4.2).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SeedConfig {
    pub developer_count: u32,
    pub seniority_mix: SeniorityMix,
    pub repos: Vec<RepoConfig>,
    pub date_window: DateWindow,
    /// One of "low", "medium", "high". Validated eagerly, not just on use.
    pub velocity: String,
    /// Per-developer variance in [0, 1].
    pub fluctuation: f64,
    pub seed: i64,
    #[serde(default = "default_ai_preference_distribution")]
    pub ai_preference_distribution: AiPreferenceDistribution,
    /// Optional PTO blocks shared across the roster (inclusive date ranges).
    #[serde(default = "default_pto_ranges")]
    pub pto_ranges: Vec<(NaiveDate, NaiveDate)>,
}

impl SeedConfig {
    pub fn from_yaml_str(raw: &str) -> Result<Self, ConfigError> {
        let cfg: Self =
            serde_yaml::from_str(raw).map_err(|e| ConfigError::Parse(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::Parse(e.to_string()))?;
        Self::from_yaml_str(&raw)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        const EPS: f64 = 1e-6;
        let sum = self.seniority_mix.sum();
        if (sum - 1.0).abs() > EPS {
            return Err(ConfigError::SeniorityMixInvalid(sum));
        }

        if self.date_window.end <= self.date_window.start {
            return Err(ConfigError::EmptyWindow);
        }

        if self.developer_count == 0 {
            return Err(ConfigError::DeveloperCountOutOfBounds(self.developer_count));
        }

        if self.repos.is_empty() {
            return Err(ConfigError::NoRepos);
        }

        self.velocity_mean_per_week()?;

        Ok(())
    }

    /// Baseline sessions/week for this config's velocity setting.
    pub fn velocity_mean_per_week(&self) -> Result<f64, ConfigError> {
        match self.velocity.as_str() {
            "low" => Ok(2.0),
            "medium" => Ok(5.0),
            "high" => Ok(10.0),
            other => Err(ConfigError::UnknownVelocity(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> SeedConfig {
        SeedConfig {
            developer_count: 3,
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
                start: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
                end: NaiveDate::from_ymd_opt(2026, 1, 15).unwrap(),
            },
            velocity: "medium".to_string(),
            fluctuation: default_fluctuation(),
            seed: 12345,
            ai_preference_distribution: AiPreferenceDistribution::default(),
            pto_ranges: Vec::new(),
        }
    }

    #[test]
    fn valid_config_passes() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn rejects_bad_seniority_mix() {
        let mut cfg = valid_config();
        cfg.seniority_mix.senior = 0.9;
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::SeniorityMixInvalid(cfg.seniority_mix.sum()))
        );
    }

    #[test]
    fn rejects_empty_window() {
        let mut cfg = valid_config();
        cfg.date_window.end = cfg.date_window.start;
        assert_eq!(cfg.validate(), Err(ConfigError::EmptyWindow));
    }

    #[test]
    fn rejects_zero_developers() {
        let mut cfg = valid_config();
        cfg.developer_count = 0;
        assert_eq!(cfg.validate(), Err(ConfigError::DeveloperCountOutOfBounds(0)));
    }

    #[test]
    fn rejects_unknown_velocity() {
        let mut cfg = valid_config();
        cfg.velocity = "turbo".to_string();
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::UnknownVelocity("turbo".to_string()))
        );
    }

    #[test]
    fn rejects_no_repos() {
        let mut cfg = valid_config();
        cfg.repos.clear();
        assert_eq!(cfg.validate(), Err(ConfigError::NoRepos));
    }
}
