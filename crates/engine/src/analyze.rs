//! Revert/hotfix analytics (spec.md §4.11): read-only aggregation over the
//! records the quality injector already produced. Never resamples risk.

use sdlc_synth_domain::{AiBand, HotfixEvent, PullRequest, RevertEvent};
use std::collections::HashMap;

#[derive(Debug, Clone, serde::Serialize)]
pub struct RevertSummary {
    pub revert_count: usize,
    pub revert_rate: Option<f64>,
    pub average_delay_hours: Option<f64>,
    pub by_ai_band: HashMap<String, usize>,
}

/// `revert_rate` is `None` when there are no merged PRs to rate against.
pub fn summarize_reverts(merged_prs: &[&PullRequest], reverts: &[RevertEvent]) -> RevertSummary {
    let by_pr: HashMap<u64, &PullRequest> = merged_prs.iter().map(|pr| (pr.number, *pr)).collect();

    let mut by_ai_band: HashMap<String, usize> = HashMap::new();
    for event in reverts {
        if let Some(original) = by_pr.get(&event.original_pr) {
            let band = AiBand::of(original.ai_ratio);
            *by_ai_band.entry(band.as_str().to_string()).or_insert(0) += 1;
        }
    }

    let average_delay_hours = if reverts.is_empty() {
        None
    } else {
        Some(reverts.iter().map(|e| e.delay_hours).sum::<f64>() / reverts.len() as f64)
    };

    let revert_rate = if merged_prs.is_empty() {
        None
    } else {
        Some(reverts.len() as f64 / merged_prs.len() as f64)
    };

    RevertSummary {
        revert_count: reverts.len(),
        revert_rate,
        average_delay_hours,
        by_ai_band,
    }
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct HotfixSummary {
    pub hotfix_count: usize,
    pub hotfix_rate: Option<f64>,
    pub average_delay_hours: Option<f64>,
}

pub fn summarize_hotfixes(merged_prs: &[&PullRequest], hotfixes: &[HotfixEvent]) -> HotfixSummary {
    let average_delay_hours = if hotfixes.is_empty() {
        None
    } else {
        Some(hotfixes.iter().map(|e| e.delay_hours).sum::<f64>() / hotfixes.len() as f64)
    };

    let hotfix_rate = if merged_prs.is_empty() {
        None
    } else {
        Some(hotfixes.len() as f64 / merged_prs.len() as f64)
    };

    HotfixSummary {
        hotfix_count: hotfixes.len(),
        hotfix_rate,
        average_delay_hours,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sdlc_synth_domain::PrState;
    use uuid::Uuid;

    fn pr(number: u64, ai_ratio: f64) -> PullRequest {
        PullRequest {
            number,
            repo: "acme/platform".to_string(),
            author: Uuid::nil(),
            state: PrState::Merged,
            title: "Add feature".to_string(),
            created_at: Utc::now(),
            first_commit_at: Utc::now(),
            last_commit_at: Utc::now(),
            first_review_at: Some(Utc::now()),
            merged_at: Some(Utc::now()),
            additions: 20,
            deletions: 5,
            changed_files: 2,
            commit_count: 1,
            reviewer_emails: vec![],
            ai_ratio,
            tab_lines: 5,
            composer_lines: 5,
            is_reverted: false,
            is_bug_fix: false,
            initial_additions: 20,
            initial_changed_files: 2,
        }
    }

    #[test]
    fn empty_input_never_panics() {
        let summary = summarize_reverts(&[], &[]);
        assert_eq!(summary.revert_count, 0);
        assert!(summary.revert_rate.is_none());
        assert!(summary.average_delay_hours.is_none());
    }

    #[test]
    fn revert_rate_divides_by_merged_count() {
        let original = pr(1, 0.8);
        let merged = vec![&original];
        let reverts = vec![RevertEvent {
            revert_pr: 2,
            original_pr: 1,
            repo: "acme/platform".to_string(),
            delay_hours: 5.0,
            risk_score: 0.1,
        }];
        let summary = summarize_reverts(&merged, &reverts);
        assert_eq!(summary.revert_rate, Some(1.0));
        assert_eq!(summary.by_ai_band.get("high"), Some(&1));
    }
}
