//! Review simulation (spec.md §4.8): reviewer count, review events, and the
//! approval outcome that decides whether (and when) the PR merges.

use chrono::{DateTime, Duration, Utc};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;
use rand_distr::{Distribution, Exp};
use sdlc_synth_domain::{Developer, PullRequest, PrState, Review, ReviewState};
use uuid::Uuid;

use crate::pr::PrDraft;

fn size_norm(additions: u32) -> f64 {
    (additions as f64 / 300.0).min(3.0)
}

fn reviewer_count(draft: &PrDraft, rng: &mut StdRng) -> u32 {
    let size = size_norm(draft.additions);
    let weights = [
        (0.50 - 0.10 * size).max(0.05),
        0.35,
        (0.15 + 0.10 * size).max(0.05),
    ];
    let idx = *[1u32, 2, 3]
        .choose_weighted(rng, |&count| weights[(count - 1) as usize])
        .expect("non-empty weighted reviewer-count list");
    idx
}

/// p_approve ~= 0.85 - 0.4*max(0, ai_ratio-0.5) - size_penalty (spec.md §4.8).
fn approval_probability(draft: &PrDraft) -> f64 {
    let size_penalty = 0.1 * size_norm(draft.additions);
    let ai_penalty = 0.4 * (draft.ai_ratio - 0.5).max(0.0);
    (0.85 - ai_penalty - size_penalty).clamp(0.05, 0.95)
}

/// Finalizes a [`PrDraft`] into a [`PullRequest`] plus its review events.
pub fn simulate(
    draft: PrDraft,
    number: u64,
    dev_pool: &[Developer],
    rng: &mut StdRng,
) -> (PullRequest, Vec<Review>) {
    let candidates: Vec<&Developer> = dev_pool.iter().filter(|d| d.id != draft.author).collect();
    let count = (reviewer_count(&draft, rng) as usize).min(candidates.len().max(1));

    let mut reviewers: Vec<&Developer> = candidates.clone();
    reviewers.shuffle(rng);
    reviewers.truncate(count.max(1));
    if reviewers.is_empty() {
        // No other developers exist (e.g. a one-person roster) - the author
        // effectively self-reviews so the PR can still resolve.
        reviewers = vec![dev_pool.iter().find(|d| d.id == draft.author).unwrap()];
    }

    let approved = rng.gen_bool(approval_probability(&draft));
    let final_state = if approved {
        ReviewState::Approved
    } else if rng.gen_bool(0.7) {
        ReviewState::RequestedChanges
    } else {
        ReviewState::Commented
    };

    // Build one event chain per reviewer (1-3 events each), all anchored
    // after `target_first_review_at`. The chronologically last event across
    // all reviewers carries `final_state`; every earlier event is neutral
    // commentary so it never contradicts the eventual disposition.
    let gap_dist = Exp::new(1.0 / 45.0).expect("mean 45 minutes is positive");
    let mut events: Vec<(DateTime<Utc>, &Developer, bool)> = Vec::new(); // (ts, reviewer, is_first_overall)

    let mut cursor = draft.target_first_review_at;
    let mut first = true;
    for reviewer in &reviewers {
        let event_count = rng.gen_range(1..=3u32);
        for _ in 0..event_count {
            if !first {
                let gap_minutes = gap_dist.sample(rng);
                cursor += Duration::seconds((gap_minutes * 60.0) as i64);
            }
            events.push((cursor, reviewer, first));
            first = false;
        }
    }

    let last_idx = events.len() - 1;
    let reviews: Vec<Review> = events
        .into_iter()
        .enumerate()
        .map(|(i, (ts, reviewer, _))| Review {
            id: Uuid::from_u128((number as u128) << 32 | i as u128),
            repo: draft.repo.clone(),
            pr_number: number,
            reviewer: reviewer.id,
            state: if i == last_idx {
                final_state
            } else {
                ReviewState::Commented
            },
            submitted_at: ts,
            body: review_body(if i == last_idx { final_state } else { ReviewState::Commented }),
        })
        .collect();

    let first_review_at = reviews.iter().map(|r| r.submitted_at).min();
    let last_event_at = reviews.iter().map(|r| r.submitted_at).max().unwrap();

    let review_duration_hours =
        (2.0 + 1.5 * size_norm(draft.additions) - 0.5 * (count as f64 - 1.0)).max(0.5);
    let merged_at = if approved {
        Some(last_event_at + Duration::minutes((review_duration_hours * 60.0) as i64))
    } else {
        None
    };

    let pr = PullRequest {
        number,
        repo: draft.repo,
        author: draft.author,
        state: if approved { PrState::Merged } else { PrState::Closed },
        title: draft.title,
        created_at: draft.created_at,
        first_commit_at: draft.first_commit_at,
        last_commit_at: draft.last_commit_at,
        first_review_at,
        merged_at,
        additions: draft.additions,
        deletions: draft.deletions,
        changed_files: draft.changed_files,
        commit_count: draft.commit_count,
        reviewer_emails: reviewers.iter().map(|d| d.email.clone()).collect(),
        ai_ratio: draft.ai_ratio,
        tab_lines: draft.tab_lines,
        composer_lines: draft.composer_lines,
        is_reverted: false,
        is_bug_fix: draft.is_bug_fix_title,
        initial_additions: draft.initial_additions,
        initial_changed_files: draft.initial_changed_files,
    };

    (pr, reviews)
}

fn review_body(state: ReviewState) -> String {
    match state {
        ReviewState::Approved => "Looks good to me.".to_string(),
        ReviewState::RequestedChanges => "Please address the comments before merging.".to_string(),
        ReviewState::Commented => "Left a few notes.".to_string(),
    }
}
