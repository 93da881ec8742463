//! File survival modeling (spec.md §4.10): exponential death hazard scaled
//! by the AI ratio a file was born with, plus the query-time survival-rate
//! function shared by the HTTP analysis endpoint and the research assembler.

use chrono::{DateTime, Duration, Utc};
use rand::rngs::StdRng;
use rand::Rng;
use sdlc_synth_domain::FileLifecycle;

/// Baseline hazard (deaths per day) for an ai_ratio_at_birth of 0; scales up
/// to roughly 3x that at ai_ratio_at_birth = 1.
const BASE_LAMBDA_PER_DAY: f64 = 0.01;
const AI_LAMBDA_MULTIPLIER: f64 = 3.0;

fn lambda_per_day(ai_ratio_at_birth: f64) -> f64 {
    BASE_LAMBDA_PER_DAY * (1.0 + ai_ratio_at_birth * (AI_LAMBDA_MULTIPLIER - 1.0))
}

/// `S(t) = exp(-lambda * t)`, t in days.
pub fn survival_probability(ai_ratio_at_birth: f64, days: f64) -> f64 {
    (-lambda_per_day(ai_ratio_at_birth) * days).exp()
}

/// Decides whether a file dies before `horizon`, and if so, picks a death
/// timestamp uniformly within `[born_at, horizon]`.
pub fn maybe_kill(file: &mut FileLifecycle, horizon: DateTime<Utc>, rng: &mut StdRng) {
    if file.died_at.is_some() {
        return;
    }
    let window_days = (horizon - file.born_at).num_seconds() as f64 / 86400.0;
    if window_days <= 0.0 {
        return;
    }

    let survives = survival_probability(file.ai_ratio_at_birth, window_days);
    if rng.gen_bool((1.0 - survives).clamp(0.0, 1.0)) {
        let offset_days = rng.gen_range(0.0..window_days);
        file.died_at = Some(file.born_at + Duration::seconds((offset_days * 86400.0) as i64));
    }
}

/// Fraction of files born before `window_end` that are still alive (or died
/// strictly after `window_end`) `window_days` after their birth, among those
/// old enough to have reached that age by `window_end`. Used both by the
/// analysis endpoint and `research::survival_rate_30d`.
pub fn survival_rate_at_window(files: &[FileLifecycle], window_days: f64, as_of: DateTime<Utc>) -> Option<f64> {
    let eligible: Vec<&FileLifecycle> = files
        .iter()
        .filter(|f| f.born_at + Duration::seconds((window_days * 86400.0) as i64) <= as_of)
        .collect();

    if eligible.is_empty() {
        return None;
    }

    let alive = eligible
        .iter()
        .filter(|f| match f.died_at {
            None => true,
            Some(died) => died > f.born_at + Duration::seconds((window_days * 86400.0) as i64),
        })
        .count();

    Some(alive as f64 / eligible.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn file(ai_ratio: f64, born_at: DateTime<Utc>) -> FileLifecycle {
        FileLifecycle {
            path: "src/api.rs".to_string(),
            repo: "acme/platform".to_string(),
            born_at,
            died_at: None,
            creator: Uuid::nil(),
            ai_ratio_at_birth: ai_ratio,
        }
    }

    #[test]
    fn higher_ai_ratio_lowers_survival_probability() {
        let low = survival_probability(0.0, 30.0);
        let high = survival_probability(1.0, 30.0);
        assert!(high < low);
    }

    #[test]
    fn survival_probability_decreases_with_time() {
        let early = survival_probability(0.5, 10.0);
        let late = survival_probability(0.5, 60.0);
        assert!(late < early);
    }

    #[test]
    fn survival_rate_is_none_without_eligible_files() {
        let now = Utc::now();
        let files = vec![file(0.5, now - Duration::days(5))];
        assert!(survival_rate_at_window(&files, 30.0, now).is_none());
    }

    #[test]
    fn survival_rate_counts_files_old_enough() {
        let now = Utc::now();
        let mut old_dead = file(0.5, now - Duration::days(40));
        old_dead.died_at = Some(now - Duration::days(35));
        let old_alive = file(0.5, now - Duration::days(40));

        let files = vec![old_dead, old_alive];
        let rate = survival_rate_at_window(&files, 30.0, now).unwrap();
        assert_eq!(rate, 0.5);
    }
}
