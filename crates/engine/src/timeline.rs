//! Per-developer daily activity planning (spec.md §4.4).

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use rand::rngs::StdRng;
use rand_distr::{Distribution, Normal, Poisson};
use sdlc_synth_config::SeedConfig;
use sdlc_synth_domain::Developer;

#[derive(Debug, Clone, Copy)]
pub struct DayPlan {
    pub date: NaiveDate,
    pub commit_count: u32,
}

fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

fn on_pto(date: NaiveDate, pto_ranges: &[(NaiveDate, NaiveDate)]) -> bool {
    pto_ranges.iter().any(|(start, end)| date >= *start && date <= *end)
}

/// Produces one `DayPlan` per day in `[cfg.date_window.start,
/// cfg.date_window.end)`.
pub fn plan(dev: &Developer, cfg: &SeedConfig, rng: &mut StdRng) -> Vec<DayPlan> {
    let base_per_week = cfg
        .velocity_mean_per_week()
        .expect("SeedConfig::validate rejects unknown velocity before generation starts");
    let base_per_day = base_per_week / 7.0;

    // Per-developer jitter, drawn once: 1 + N(0, fluctuation), clipped.
    let jitter_normal =
        Normal::new(0.0, cfg.fluctuation.max(1e-9)).expect("fluctuation is finite and >= 0");
    let jitter = (1.0 + jitter_normal.sample(rng)).clamp(0.1, 3.0);

    let mut plans = Vec::new();
    let mut date = cfg.date_window.start;
    while date < cfg.date_window.end {
        if on_pto(date, &cfg.pto_ranges) {
            plans.push(DayPlan {
                date,
                commit_count: 0,
            });
        } else {
            let weekday_mult = if is_weekend(date) { 0.1 } else { 1.0 };
            let lambda = (base_per_day * jitter * weekday_mult).max(1e-6);
            let poisson = Poisson::new(lambda).expect("lambda is positive and finite");
            let commit_count = poisson.sample(rng).round() as u32;
            plans.push(DayPlan { date, commit_count });
        }
        date += Duration::days(1);
    }

    plans
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::RngStreams;
    use sdlc_synth_config::{AiPreferenceDistribution, DateWindow, RepoConfig, SeniorityMix};
    use sdlc_synth_domain::Seniority;
    use uuid::Uuid;

    fn base_config() -> SeedConfig {
        SeedConfig {
            developer_count: 1,
            seniority_mix: SeniorityMix {
                junior: 1.0,
                mid: 0.0,
                senior: 0.0,
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
            fluctuation: 0.2,
            seed: 12345,
            ai_preference_distribution: AiPreferenceDistribution::default(),
            pto_ranges: Vec::new(),
        }
    }

    fn dev() -> Developer {
        Developer {
            id: Uuid::nil(),
            display_name: "Test Dev".to_string(),
            email: "test@example.dev".to_string(),
            seniority: Seniority::Junior,
            ai_preference: 0.5,
            active: true,
        }
    }

    #[test]
    fn plan_covers_every_day_in_window() {
        let cfg = base_config();
        let streams = RngStreams::new(cfg.seed);
        let mut rng = streams.dev_timeline(&dev().id.to_string());
        let plans = plan(&dev(), &cfg, &mut rng);
        assert_eq!(plans.len(), 14);
        assert_eq!(plans[0].date, cfg.date_window.start);
    }

    #[test]
    fn weekends_are_markedly_quieter_in_expectation() {
        let mut cfg = base_config();
        cfg.fluctuation = 0.0; // isolate the weekday mask from jitter noise
        cfg.velocity = "high".to_string();
        let streams = RngStreams::new(cfg.seed);

        let mut weekday_total = 0u32;
        let mut weekend_total = 0u32;
        for trial in 0..200u64 {
            let mut rng = streams.dev_timeline(&format!("trial-{trial}"));
            for p in plan(&dev(), &cfg, &mut rng) {
                if is_weekend(p.date) {
                    weekend_total += p.commit_count;
                } else {
                    weekday_total += p.commit_count;
                }
            }
        }
        // 10 weekdays vs 4 weekend days in the window, repeated 200 times.
        let weekday_mean = weekday_total as f64 / (200.0 * 10.0);
        let weekend_mean = weekend_total as f64 / (200.0 * 4.0);
        assert!(weekend_mean < weekday_mean * 0.5);
    }

    #[test]
    fn deterministic_under_same_seed() {
        let cfg = base_config();
        let streams = RngStreams::new(cfg.seed);
        let mut rng_a = streams.dev_timeline("dev-1");
        let mut rng_b = streams.dev_timeline("dev-1");
        let plans_a: Vec<u32> = plan(&dev(), &cfg, &mut rng_a)
            .iter()
            .map(|p| p.commit_count)
            .collect();
        let plans_b: Vec<u32> = plan(&dev(), &cfg, &mut rng_b)
            .iter()
            .map(|p| p.commit_count)
            .collect();
        assert_eq!(plans_a, plans_b);
    }
}
