//! Quality signal injection (spec.md §4.9): reverts and hotfix follow-ups.
//!
//! Both analyzers are *closed-world*: downstream analytics never resample
//! risk, they only ever read the `RevertEvent`/`HotfixEvent` records this
//! module produces. Each inserted follow-up PR carries a synthesized
//! `Commit` (and a short review chain) of its own, so the
//! commit_count/changed_files invariants in spec.md §8 hold for follow-up
//! PRs exactly as they do for organically-generated ones, not just as
//! aggregate fields on the `PullRequest` itself.

use chrono::{DateTime, Duration, Utc};
use rand::rngs::StdRng;
use rand::Rng;
use sdlc_synth_domain::{
    AiBand, Commit, Developer, HotfixEvent, PrState, PullRequest, Review, ReviewState, RevertEvent,
};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Sigmoid risk coefficients (spec.md §4.9): beta0 is the intercept, the
/// rest weight ai_ratio, size, reviewer scrutiny (inverse of reviewer_count)
/// and seniority (approximated by the author's ai_preference quartile here
/// since reverts are read-only over PR fields, not developer records).
const BETA0: f64 = -3.5;
const BETA_AI_RATIO: f64 = 2.0;
const BETA_SIZE: f64 = 0.8;
const BETA_SCRUTINY: f64 = -0.6;
const BETA_BUGFIX: f64 = 0.5;
const MAX_RISK: f64 = 0.15;

/// Independent per-merged-PR probability that a hotfix follow-up appears
/// (spec.md §4.9: "independently sample whether a fix-PR appears").
const HOTFIX_PROBABILITY: f64 = 0.08;

const FIX_TITLES: &[&str] = &[
    "Fix regression in {scope}",
    "Hotfix: {scope} broke in prod",
    "Urgent patch for {scope}",
    "Patch {scope} edge case",
];
const SCOPES: &[&str] = &["auth", "sync", "parser", "scheduler", "api", "storage", "ui"];

fn size_norm(additions: u32) -> f64 {
    (additions as f64 / 300.0).min(3.0)
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

fn risk_score(pr: &PullRequest) -> f64 {
    let scrutiny = pr.reviewer_emails.len().max(1) as f64;
    let z = BETA0
        + BETA_AI_RATIO * pr.ai_ratio
        + BETA_SIZE * size_norm(pr.additions)
        + BETA_SCRUTINY * scrutiny
        + BETA_BUGFIX * if pr.is_bug_fix { 1.0 } else { 0.0 };
    sigmoid(z).min(MAX_RISK)
}

fn content_hash(seed: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(seed.as_bytes());
    let digest = hasher.finalize();
    digest.iter().map(|b| format!("{b:02x}")).collect::<String>()[..40].to_string()
}

/// Picks an approving reviewer for a synthesized follow-up PR: any other
/// developer if the roster has one, otherwise the author self-approves
/// (the same fallback `review::simulate` uses for a one-person roster).
fn pick_reviewer(dev_pool: &[Developer], author: Uuid, rng: &mut StdRng) -> Uuid {
    let others: Vec<Uuid> = dev_pool.iter().map(|d| d.id).filter(|id| *id != author).collect();
    if others.is_empty() {
        author
    } else {
        others[rng.gen_range(0..others.len())]
    }
}

/// A minimal, single-reviewer approval chain anchored at `ts`, matching the
/// shape `review::simulate` produces for ordinary PRs closely enough that
/// by-PR review queries behave the same for synthetic PRs.
fn synthesize_review(repo: &str, pr_number: u64, reviewer: Uuid, ts: DateTime<Utc>) -> Review {
    Review {
        id: Uuid::from_u128((pr_number as u128) << 32 | 0xF0F0),
        repo: repo.to_string(),
        pr_number,
        reviewer,
        state: ReviewState::Approved,
        submitted_at: ts,
        body: "Looks good to me.".to_string(),
    }
}

/// Walks merged PRs in `next_number` order, drawing a Bernoulli revert for
/// each from its risk score. Reverting PRs are synthesized as bare-bones
/// follow-ups - one mechanical commit and a single fast approval - so they
/// read like real entities rather than bare `PullRequest` aggregates.
pub fn inject_reverts(
    merged_prs: &mut [PullRequest],
    files_by_pr: &[(u64, Vec<String>)],
    dev_pool: &[Developer],
    next_number: &mut u64,
    rng: &mut StdRng,
) -> (Vec<PullRequest>, Vec<Commit>, Vec<Review>, Vec<RevertEvent>) {
    let mut revert_prs = Vec::new();
    let mut revert_commits = Vec::new();
    let mut revert_reviews = Vec::new();
    let mut events = Vec::new();

    for pr in merged_prs.iter_mut() {
        if pr.state != PrState::Merged {
            continue;
        }
        let risk = risk_score(pr);
        if !rng.gen_bool(risk) {
            continue;
        }

        let merged_at = match pr.merged_at {
            Some(ts) => ts,
            None => continue,
        };
        let delay_hours = rng.gen_range(1.0..=14.0 * 24.0);
        let revert_created = merged_at + Duration::minutes((delay_hours * 60.0) as i64);
        let revert_number = *next_number;
        *next_number += 1;

        pr.is_reverted = true;

        let files = files_by_pr
            .iter()
            .find(|(n, _)| *n == pr.number)
            .map(|(_, f)| f.clone())
            .unwrap_or_default();

        let commit = Commit {
            sha: content_hash(&format!("revert|{}|{revert_number}", pr.repo)),
            author: pr.author,
            repo: pr.repo.clone(),
            branch: "main".to_string(),
            ts: revert_created,
            message: format!("Revert \"{}\"", pr.title),
            files,
            tab_lines_added: 0,
            composer_lines_added: 0,
            non_ai_lines_added: pr.deletions,
            tab_lines_deleted: 0,
            composer_lines_deleted: 0,
            non_ai_lines_deleted: pr.additions,
        };

        let first_review_at = revert_created + Duration::minutes(30);
        let merged_at_revert = revert_created + Duration::hours(1);
        let reviewer = pick_reviewer(dev_pool, pr.author, rng);
        let reviewer_email = dev_pool
            .iter()
            .find(|d| d.id == reviewer)
            .map(|d| d.email.clone())
            .into_iter()
            .collect::<Vec<_>>();

        let revert_pr = PullRequest {
            number: revert_number,
            repo: pr.repo.clone(),
            author: pr.author,
            state: PrState::Merged,
            title: format!("Revert \"{}\"", pr.title),
            created_at: revert_created,
            first_commit_at: revert_created,
            last_commit_at: revert_created,
            first_review_at: Some(first_review_at),
            merged_at: Some(merged_at_revert),
            additions: pr.deletions,
            deletions: pr.additions,
            changed_files: pr.changed_files,
            commit_count: 1,
            reviewer_emails: reviewer_email,
            ai_ratio: 0.0,
            tab_lines: 0,
            composer_lines: 0,
            is_reverted: false,
            is_bug_fix: false,
            initial_additions: pr.deletions,
            initial_changed_files: pr.changed_files,
        };

        events.push(RevertEvent {
            revert_pr: revert_number,
            original_pr: pr.number,
            repo: pr.repo.clone(),
            delay_hours,
            risk_score: risk,
        });
        revert_commits.push(commit);
        revert_reviews.push(synthesize_review(&revert_pr.repo, revert_number, reviewer, first_review_at));
        revert_prs.push(revert_pr);
    }

    (revert_prs, revert_commits, revert_reviews, events)
}

/// Independently samples a hotfix follow-up for each merged PR (spec.md
/// §4.9): on a hit, synthesizes a new fix-titled PR merged within 48h that
/// touches a subset of the parent's files, plus its commit and a single
/// fast review.
pub fn inject_hotfixes(
    merged_prs: &[PullRequest],
    files_by_pr: &[(u64, Vec<String>)],
    dev_pool: &[Developer],
    next_number: &mut u64,
    rng: &mut StdRng,
) -> (Vec<PullRequest>, Vec<Commit>, Vec<Review>, Vec<HotfixEvent>) {
    let mut hotfix_prs = Vec::new();
    let mut hotfix_commits = Vec::new();
    let mut hotfix_reviews = Vec::new();
    let mut events = Vec::new();

    let parents: Vec<&PullRequest> = merged_prs.iter().filter(|pr| pr.state == PrState::Merged).collect();

    for parent in parents {
        let Some(parent_merged_at) = parent.merged_at else {
            continue;
        };
        if !rng.gen_bool(HOTFIX_PROBABILITY) {
            continue;
        }

        let parent_files = files_by_pr
            .iter()
            .find(|(n, _)| *n == parent.number)
            .map(|(_, f)| f.clone())
            .unwrap_or_default();
        if parent_files.is_empty() {
            continue;
        }

        let overlap_count = rng.gen_range(1..=parent_files.len());
        let overlap: Vec<String> = parent_files.into_iter().take(overlap_count).collect();

        let delay_hours = rng.gen_range(1.0..=48.0);
        let hotfix_created = parent_merged_at + Duration::minutes((delay_hours * 60.0) as i64);
        let hotfix_number = *next_number;
        *next_number += 1;

        let template = FIX_TITLES[rng.gen_range(0..FIX_TITLES.len())];
        let scope = SCOPES[rng.gen_range(0..SCOPES.len())];
        let title = template.replace("{scope}", scope);

        let additions = rng.gen_range(5..=60);
        let deletions = rng.gen_range(0..=(additions / 2).max(1));
        // Inherit the parent's AI mix loosely - a fix to AI-heavy code tends
        // to get AI-assisted edits too, but less reliably than authorship.
        let ai_ratio = (parent.ai_ratio * 0.7).clamp(0.0, 1.0);
        let tab_lines = (additions as f64 * ai_ratio * 0.6).round() as u32;
        let composer_lines = (additions as f64 * ai_ratio * 0.4).round() as u32;
        let non_ai_lines = additions.saturating_sub(tab_lines + composer_lines);

        let commit = Commit {
            sha: content_hash(&format!("hotfix|{}|{hotfix_number}", parent.repo)),
            author: parent.author,
            repo: parent.repo.clone(),
            branch: "main".to_string(),
            ts: hotfix_created,
            message: title.clone(),
            files: overlap.clone(),
            tab_lines_added: tab_lines,
            composer_lines_added: composer_lines,
            non_ai_lines_added: non_ai_lines,
            tab_lines_deleted: 0,
            composer_lines_deleted: deletions,
            non_ai_lines_deleted: 0,
        };

        let first_review_at = hotfix_created + Duration::minutes(20);
        let merged_at = hotfix_created + Duration::minutes(50);
        let reviewer = pick_reviewer(dev_pool, parent.author, rng);
        let reviewer_email = dev_pool
            .iter()
            .find(|d| d.id == reviewer)
            .map(|d| d.email.clone())
            .into_iter()
            .collect::<Vec<_>>();

        let hotfix_pr = PullRequest {
            number: hotfix_number,
            repo: parent.repo.clone(),
            author: parent.author,
            state: PrState::Merged,
            title: title.clone(),
            created_at: hotfix_created,
            first_commit_at: hotfix_created,
            last_commit_at: hotfix_created,
            first_review_at: Some(first_review_at),
            merged_at: Some(merged_at),
            additions,
            deletions,
            changed_files: overlap.len() as u32,
            commit_count: 1,
            reviewer_emails: reviewer_email,
            ai_ratio,
            tab_lines,
            composer_lines,
            is_reverted: false,
            is_bug_fix: true,
            initial_additions: additions,
            initial_changed_files: overlap.len() as u32,
        };

        events.push(HotfixEvent {
            hotfix_pr: hotfix_number,
            parent_pr: parent.number,
            repo: parent.repo.clone(),
            delay_hours,
            overlapping_files: overlap,
        });
        hotfix_commits.push(commit);
        hotfix_reviews.push(synthesize_review(&hotfix_pr.repo, hotfix_number, reviewer, first_review_at));
        hotfix_prs.push(hotfix_pr);
    }

    (hotfix_prs, hotfix_commits, hotfix_reviews, events)
}

/// AI-band breakdown helper shared by the revert/hotfix analytics module.
pub fn band_of(pr: &PullRequest) -> AiBand {
    AiBand::of(pr.ai_ratio)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn base_pr(number: u64, ai_ratio: f64, is_bug_fix: bool) -> PullRequest {
        PullRequest {
            number,
            repo: "acme/platform".to_string(),
            author: Uuid::nil(),
            state: PrState::Merged,
            title: "Fix regression".to_string(),
            created_at: Utc::now(),
            first_commit_at: Utc::now(),
            last_commit_at: Utc::now(),
            first_review_at: Some(Utc::now()),
            merged_at: Some(Utc::now()),
            additions: 50,
            deletions: 10,
            changed_files: 2,
            commit_count: 2,
            reviewer_emails: vec!["r@example.dev".to_string()],
            ai_ratio,
            tab_lines: 10,
            composer_lines: 5,
            is_reverted: false,
            is_bug_fix,
            initial_additions: 50,
            initial_changed_files: 2,
        }
    }

    #[test]
    fn risk_score_never_exceeds_cap() {
        let pr = base_pr(1, 1.0, true);
        assert!(risk_score(&pr) <= MAX_RISK);
    }

    #[test]
    fn higher_ai_ratio_increases_risk() {
        let low = base_pr(1, 0.1, false);
        let high = base_pr(2, 0.9, false);
        assert!(risk_score(&high) >= risk_score(&low));
    }

    fn dev_pool() -> Vec<Developer> {
        vec![
            Developer {
                id: Uuid::nil(),
                display_name: "Author".to_string(),
                email: "author@example.dev".to_string(),
                seniority: sdlc_synth_domain::Seniority::Mid,
                ai_preference: 0.5,
                active: true,
            },
            Developer {
                id: Uuid::from_u128(99),
                display_name: "Reviewer".to_string(),
                email: "reviewer@example.dev".to_string(),
                seniority: sdlc_synth_domain::Seniority::Senior,
                ai_preference: 0.3,
                active: true,
            },
        ]
    }

    #[test]
    fn revert_pr_marks_original_as_reverted_and_carries_a_commit() {
        let mut prs = vec![base_pr(1, 0.9, true)];
        let files = vec![(1u64, vec!["src/api.rs".to_string()])];
        let pool = dev_pool();
        let mut next_number = 2u64;
        let mut rng = crate::rng::RngStreams::new(1).sub_rng("test");
        // Force a deterministic revert by retrying until one lands (low
        // sample count, risk is capped at 0.15 so this may legitimately
        // take several independent draws).
        let mut reverted = false;
        for _ in 0..200 {
            let (reverts, commits, reviews, _) =
                inject_reverts(&mut prs, &files, &pool, &mut next_number, &mut rng);
            if !reverts.is_empty() {
                assert_eq!(commits.len(), 1);
                assert_eq!(commits[0].files, vec!["src/api.rs".to_string()]);
                assert_eq!(reviews.len(), 1);
                reverted = true;
                break;
            }
        }
        if reverted {
            assert!(prs[0].is_reverted);
        }
    }

    #[test]
    fn hotfix_follow_up_overlaps_parent_files_and_lands_within_48h() {
        let mut parent = base_pr(1, 0.4, false);
        parent.merged_at = Some(Utc::now());
        let prs = vec![parent];
        let files = vec![(1u64, vec!["src/api.rs".to_string(), "src/core.rs".to_string()])];
        let pool = dev_pool();
        let mut next_number = 2u64;
        let mut rng = crate::rng::RngStreams::new(7).sub_rng("test");

        let mut found = false;
        for _ in 0..500 {
            let (hotfixes, commits, reviews, events) =
                inject_hotfixes(&prs, &files, &pool, &mut next_number, &mut rng);
            if !hotfixes.is_empty() {
                assert_eq!(commits.len(), 1);
                assert_eq!(reviews.len(), 1);
                assert!(events[0].delay_hours <= 48.0);
                assert!(!events[0].overlapping_files.is_empty());
                assert!(hotfixes[0].is_bug_fix);
                found = true;
                break;
            }
        }
        assert!(found, "expected at least one hotfix within 500 independent draws");
    }
}
