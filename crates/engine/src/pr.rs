//! PR assembly (spec.md §4.7): folds a session's commits into a pull
//! request and computes its open/pickup timestamps.
//!
//! `merged_at` is *not* decided here - it depends on the review simulator's
//! outcome (reviewer count, approvals). `assemble` returns a [`PrDraft`]
//! that `crate::review::simulate` finalizes into a full [`PullRequest`].

use chrono::{DateTime, Duration, Utc};
use rand::rngs::StdRng;
use rand::Rng;
use rand_distr::{Distribution, LogNormal};
use sdlc_synth_domain::{Commit, Developer, Seniority};

/// A PR with every field decided except `first_review_at`'s corresponding
/// review events and `merged_at`.
#[derive(Debug, Clone)]
pub struct PrDraft {
    pub repo: String,
    pub author: uuid::Uuid,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub first_commit_at: DateTime<Utc>,
    pub last_commit_at: DateTime<Utc>,
    /// Target first_review_at, computed from the pickup-time formula.
    /// `crate::review::simulate` anchors its earliest review event here.
    pub target_first_review_at: DateTime<Utc>,
    pub additions: u32,
    pub deletions: u32,
    pub changed_files: u32,
    pub commit_count: u32,
    pub ai_ratio: f64,
    pub tab_lines: u32,
    pub composer_lines: u32,
    pub initial_additions: u32,
    pub initial_changed_files: u32,
    pub is_bug_fix_title: bool,
}

fn open_probability(seniority: Seniority) -> f64 {
    match seniority {
        Seniority::Junior => 0.35,
        Seniority::Mid => 0.55,
        Seniority::Senior => 0.75,
    }
}

fn pr_title(commits: &[Commit]) -> (String, bool) {
    // The PR borrows its title from the session's largest commit message -
    // simplistic, but keeps the hotfix title regex meaningful downstream.
    let lead = commits
        .iter()
        .max_by_key(|c| c.total_lines_added())
        .expect("session has at least one commit");
    let looks_like_fix = regex_ish_fix_match(&lead.message);
    (lead.message.clone(), looks_like_fix)
}

/// Mirrors the hotfix title regex from spec.md §4.9: `/\b(fix|hotfix|urgent|patch)\b/`.
pub fn regex_ish_fix_match(text: &str) -> bool {
    let lower = text.to_lowercase();
    ["fix", "hotfix", "urgent", "patch"]
        .iter()
        .any(|kw| word_boundary_contains(&lower, kw))
}

fn word_boundary_contains(haystack: &str, needle: &str) -> bool {
    haystack.split(|c: char| !c.is_alphanumeric()).any(|w| w == needle)
}

/// Decides whether a session becomes a PR, and if so, assembles its draft.
/// Returns `None` if the author "decides" not to open one (spec.md §4.7a).
pub fn assemble(
    commits: Vec<Commit>,
    dev: &Developer,
    rng: &mut StdRng,
) -> Option<PrDraft> {
    if commits.is_empty() {
        return None;
    }
    if !rng.gen_bool(open_probability(dev.seniority)) {
        return None;
    }

    let first_commit_at = commits.iter().map(|c| c.ts).min().unwrap();
    let last_commit_at = commits.iter().map(|c| c.ts).max().unwrap();

    let draft_delay_minutes = rng.gen_range(10..=60);
    let created_at = last_commit_at + Duration::minutes(draft_delay_minutes);

    let additions: u32 = commits.iter().map(|c| c.total_lines_added()).sum();
    let deletions: u32 = commits.iter().map(|c| c.total_lines_deleted()).sum();
    let tab_lines: u32 = commits.iter().map(|c| c.tab_lines_added).sum();
    let composer_lines: u32 = commits.iter().map(|c| c.composer_lines_added).sum();
    let ai_lines: u32 = commits.iter().map(|c| c.ai_lines_added()).sum();
    let ai_ratio = ai_lines as f64 / additions.max(1) as f64;

    let mut changed_files_set: Vec<&String> = commits.iter().flat_map(|c| &c.files).collect();
    changed_files_set.sort();
    changed_files_set.dedup();
    let changed_files = changed_files_set.len() as u32;

    let size_norm = (additions as f64 / 300.0).min(3.0);
    let pickup_mu = 1.5 + 0.4 * size_norm + 0.6 * ai_ratio;
    let pickup_dist = LogNormal::new(pickup_mu, 0.5).expect("valid log-normal parameters");
    let pickup_hours = pickup_dist.sample(rng).clamp(0.25, 240.0);
    let target_first_review_at = created_at + Duration::minutes((pickup_hours * 60.0) as i64);

    let (title, is_bug_fix_title) = pr_title(&commits);

    Some(PrDraft {
        repo: commits[0].repo.clone(),
        author: dev.id,
        title,
        created_at,
        first_commit_at,
        last_commit_at,
        target_first_review_at,
        additions,
        deletions,
        changed_files,
        commit_count: commits.len() as u32,
        ai_ratio,
        tab_lines,
        composer_lines,
        initial_additions: additions,
        initial_changed_files: changed_files,
        is_bug_fix_title,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use sdlc_synth_domain::Seniority as Sen;
    use uuid::Uuid;

    fn dev() -> Developer {
        Developer {
            id: Uuid::nil(),
            display_name: "Test Dev".to_string(),
            email: "test@example.dev".to_string(),
            seniority: Sen::Senior,
            ai_preference: 0.5,
            active: true,
        }
    }

    fn commit(ts: DateTime<Utc>) -> Commit {
        Commit {
            sha: "a".repeat(40),
            author: Uuid::nil(),
            repo: "acme/platform".to_string(),
            branch: "main".to_string(),
            ts,
            message: "Add support for api".to_string(),
            files: vec!["src/api.rs".to_string()],
            tab_lines_added: 10,
            composer_lines_added: 5,
            non_ai_lines_added: 20,
            tab_lines_deleted: 0,
            composer_lines_deleted: 0,
            non_ai_lines_deleted: 0,
        }
    }

    #[test]
    fn timestamps_are_ordered() {
        let mut rng = crate::rng::RngStreams::new(1).sub_rng("test");
        let base = Utc::now();
        let commits = vec![commit(base), commit(base + Duration::minutes(30))];

        // Force PR-open by retrying until the Bernoulli draw succeeds.
        let draft = (0..50)
            .find_map(|_| assemble(commits.clone(), &dev(), &mut rng))
            .expect("senior PR-open probability is 0.75, 50 tries is enough");

        assert!(draft.first_commit_at <= draft.created_at);
        assert!(draft.created_at <= draft.target_first_review_at);
    }

    #[test]
    fn fix_title_detection_matches_word_boundaries() {
        assert!(regex_ish_fix_match("Fix sync bug"));
        assert!(regex_ish_fix_match("Hotfix: regression"));
        assert!(!regex_ish_fix_match("Prefixed thing")); // no word-boundary match
    }

    #[test]
    fn empty_commits_never_open_a_pr() {
        let mut rng = crate::rng::RngStreams::new(2).sub_rng("test");
        assert!(assemble(Vec::new(), &dev(), &mut rng).is_none());
    }
}
