//! Generation pipeline orchestration (spec.md §2, §5).
//!
//! Ties the per-developer factories together into one populated [`Store`],
//! following the two-phase discipline spec.md §5 requires: a parallel draft
//! phase with no shared mutable state, then a single-threaded merge that
//! walks developers in id order so repo-level file-namespace growth and PR
//! numbering stay reproducible regardless of worker count.
//!
//! The split falls where the shared state actually lives. Timeline and
//! session planning need nothing but a developer's own RNG sub-stream, so
//! they draft in parallel. Commit content, PR assembly, and review
//! simulation all read or grow repo-scoped state (the file namespace, PR
//! numbering) and run single-threaded in the merge step, continuing each
//! developer's own `dev:<id>:sessions` stream exactly where drafting left
//! off - spec.md §4.1 names no separate stream for commit or PR-draft
//! randomness, so this reuse is deliberate rather than an oversight.

use chrono::Duration;
use rand::rngs::StdRng;
use rand::Rng;
use rayon::prelude::*;
use sdlc_synth_config::SeedConfig;
use sdlc_synth_domain::{Developer, FileLifecycle, PullRequest, Repository};
use std::collections::HashMap;

use crate::commit::{self, FileNamespace};
use crate::developer;
use crate::pr;
use crate::quality;
use crate::review;
use crate::rng::RngStreams;
use crate::session::{self, Session};
use crate::store::Store;
use crate::survival;
use crate::timeline;

/// One developer's independently-drafted timeline: sessions with raw commit
/// timestamps, plus the `dev:<id>:sessions` RNG advanced past session
/// building so the merge step can resume drawing from it.
struct DeveloperDraft {
    dev: Developer,
    sessions: Vec<Session>,
    rng: StdRng,
}

fn draft_developer(dev: Developer, cfg: &SeedConfig, streams: &RngStreams) -> DeveloperDraft {
    let dev_id = dev.id.to_string();

    let mut timeline_rng = streams.dev_timeline(&dev_id);
    let plans = timeline::plan(&dev, cfg, &mut timeline_rng);

    let mut sessions_rng = streams.dev_sessions(&dev_id);
    let sessions = session::build_sessions(dev.seniority, &plans, &mut sessions_rng);

    DeveloperDraft {
        dev,
        sessions,
        rng: sessions_rng,
    }
}

fn repos_from_config(cfg: &SeedConfig) -> Vec<Repository> {
    cfg.repos
        .iter()
        .map(|r| Repository {
            owner: r.owner.clone(),
            name: r.name.clone(),
            default_branch: "main".to_string(),
        })
        .collect()
}

/// Runs the full generation sweep for `cfg`, returning a populated, reindexed
/// `Store`. Deterministic: two runs with identical `cfg` produce identical
/// output regardless of how many threads rayon schedules (spec.md §5, §9).
pub fn generate(cfg: &SeedConfig) -> Store {
    let streams = RngStreams::new(cfg.seed);

    let mut dev_rng = streams.developers();
    let roster = developer::build_roster(cfg, &mut dev_rng);

    // Phase 1: parallel per-developer draft. Each developer owns an
    // independent RNG sub-stream, so no cross-thread RNG contention exists
    // and this phase needs no synchronization.
    let mut drafts: Vec<DeveloperDraft> = roster
        .clone()
        .into_par_iter()
        .map(|dev| draft_developer(dev, cfg, &streams))
        .collect();

    // Phase 2: single-threaded merge, developer-id order first so repo file
    // namespaces and PR numbering never depend on scheduling order.
    drafts.sort_by_key(|d| d.dev.id);

    let repos = repos_from_config(cfg);
    let mut namespaces: HashMap<String, FileNamespace> = repos
        .iter()
        .map(|r| (r.full_name(), FileNamespace::new()))
        .collect();

    let mut store = Store::new();
    let mut next_pr_number: HashMap<String, u64> = HashMap::new();
    // (repo, pr_number, changed file paths), used by quality injection below
    // to pick overlapping files for a synthesized revert or hotfix PR.
    let mut changed_files_by_pr: Vec<(String, u64, Vec<String>)> = Vec::new();

    for draft in drafts {
        let dev = draft.dev;
        let mut rng = draft.rng;

        for session in draft.sessions {
            if session.commit_timestamps.is_empty() {
                continue;
            }

            let repo_idx = rng.gen_range(0..repos.len());
            let repo = &repos[repo_idx];
            let namespace = namespaces
                .get_mut(&repo.full_name())
                .expect("namespace seeded for every configured repo");

            let mut commits = Vec::with_capacity(session.commit_timestamps.len());
            for (nonce, ts) in session.commit_timestamps.iter().enumerate() {
                let before = namespace.known_files().len();
                let commit = commit::generate(&dev, repo, *ts, namespace, nonce as u64, &mut rng);
                let after = namespace.known_files().len();

                // Files minted during this commit are "born" here - birth
                // order follows generation order (developer id, then session,
                // then commit), not literal wall-clock commit time, matching
                // the namespace's own generation-order semantics.
                for path in namespace.known_files()[before..after].to_vec() {
                    store.files.push(FileLifecycle {
                        path,
                        repo: repo.full_name(),
                        born_at: commit.ts,
                        died_at: None,
                        creator: dev.id,
                        ai_ratio_at_birth: commit.ai_ratio(),
                    });
                }

                commits.push(commit);
            }

            let repo_name = repo.full_name();
            let Some(draft_pr) = pr::assemble(commits.clone(), &dev, &mut rng) else {
                store.commits.extend(commits);
                continue;
            };

            let number_slot = next_pr_number.entry(repo_name.clone()).or_insert(1);
            let number = *number_slot;
            *number_slot += 1;

            let mut review_rng = streams.pr_reviews(&repo_name, number);
            let (finalized_pr, reviews) =
                review::simulate(draft_pr, number, &roster, &mut review_rng);

            let mut files: Vec<String> = commits.iter().flat_map(|c| c.files.clone()).collect();
            files.sort();
            files.dedup();
            changed_files_by_pr.push((repo_name, number, files));

            store.commits.extend(commits);
            store.pull_requests.push(finalized_pr);
            store.reviews.extend(reviews);
        }
    }

    // Quality injection (spec.md §4.9) runs once per repo after every PR and
    // review for that repo already exists, since reverts/hotfixes both read
    // the fully merged PR list.
    let mut revert_rng = streams.quality_reverts();
    let mut hotfix_rng = streams.quality_hotfixes();
    let mut all_reverts = Vec::new();
    let mut all_hotfixes = Vec::new();

    for repo in &repos {
        let repo_name = repo.full_name();
        let (mut repo_prs, rest): (Vec<PullRequest>, Vec<PullRequest>) =
            std::mem::take(&mut store.pull_requests)
                .into_iter()
                .partition(|pr| pr.repo == repo_name);
        store.pull_requests = rest;

        let repo_files: Vec<(u64, Vec<String>)> = changed_files_by_pr
            .iter()
            .filter(|(r, _, _)| r == &repo_name)
            .map(|(_, n, files)| (*n, files.clone()))
            .collect();

        let mut next_number = repo_prs.iter().map(|pr| pr.number).max().unwrap_or(0) + 1;
        let (revert_prs, revert_commits, revert_reviews, revert_events) = quality::inject_reverts(
            &mut repo_prs,
            &repo_files,
            &roster,
            &mut next_number,
            &mut revert_rng,
        );
        repo_prs.extend(revert_prs);
        store.commits.extend(revert_commits);
        store.reviews.extend(revert_reviews);
        all_reverts.extend(revert_events);

        let (hotfix_prs, hotfix_commits, hotfix_reviews, hotfix_events) = quality::inject_hotfixes(
            &repo_prs,
            &repo_files,
            &roster,
            &mut next_number,
            &mut hotfix_rng,
        );
        repo_prs.extend(hotfix_prs);
        store.commits.extend(hotfix_commits);
        store.reviews.extend(hotfix_reviews);
        all_hotfixes.extend(hotfix_events);

        store.pull_requests.extend(repo_prs);
    }
    store.reverts = all_reverts;
    store.hotfixes = all_hotfixes;

    // File survival (spec.md §4.10): every tracked file gets a probabilistic
    // death draw against a horizon beyond the configured window, so files
    // born late still have a chance to die within the modeled interval.
    let horizon = cfg.date_window.end_datetime() + Duration::days(90);
    for repo in &repos {
        let repo_name = repo.full_name();
        let mut survival_rng = streams.survival(&repo_name);
        let mut indices: Vec<usize> = store
            .files
            .iter()
            .enumerate()
            .filter(|(_, f)| f.repo == repo_name)
            .map(|(i, _)| i)
            .collect();
        indices.sort_by(|&a, &b| store.files[a].path.cmp(&store.files[b].path));

        for idx in indices {
            let mut file = store.files[idx].clone();
            survival::maybe_kill(&mut file, horizon, &mut survival_rng);
            store.files[idx] = file;
        }
    }

    store
        .pull_requests
        .sort_by(|a, b| a.repo.cmp(&b.repo).then(a.number.cmp(&b.number)));
    store
        .commits
        .sort_by(|a, b| a.ts.cmp(&b.ts).then(a.sha.cmp(&b.sha)));
    store
        .reviews
        .sort_by(|a, b| a.submitted_at.cmp(&b.submitted_at).then(a.id.cmp(&b.id)));
    store.developers = roster;
    store.repositories = repos;
    store.reindex();
    store
}

#[cfg(test)]
mod tests {
    use super::*;
    use sdlc_synth_config::{AiPreferenceDistribution, DateWindow, RepoConfig, SeniorityMix};
    use sdlc_synth_domain::PrState;

    fn base_config(seed: i64) -> SeedConfig {
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
                start: chrono::NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
                end: chrono::NaiveDate::from_ymd_opt(2026, 1, 15).unwrap(),
            },
            velocity: "medium".to_string(),
            fluctuation: 0.2,
            seed,
            ai_preference_distribution: AiPreferenceDistribution::default(),
            pto_ranges: Vec::new(),
        }
    }

    #[test]
    fn generation_is_deterministic_under_seed() {
        let cfg = base_config(12345);
        let a = generate(&cfg);
        let b = generate(&cfg);

        assert_eq!(a.commits.len(), b.commits.len());
        assert_eq!(a.pull_requests.len(), b.pull_requests.len());
        let shas_a: Vec<&str> = a.commits.iter().map(|c| c.sha.as_str()).collect();
        let shas_b: Vec<&str> = b.commits.iter().map(|c| c.sha.as_str()).collect();
        assert_eq!(shas_a, shas_b);
    }

    #[test]
    fn produces_developers_commits_and_some_prs() {
        let cfg = base_config(999);
        let store = generate(&cfg);

        assert_eq!(store.developers.len(), 3);
        assert!(!store.commits.is_empty());
        assert!(!store.pull_requests.is_empty());
        assert!(store
            .pull_requests
            .iter()
            .any(|pr| pr.state == PrState::Merged));
    }

    #[test]
    fn pr_numbers_are_unique_per_repo() {
        let cfg = base_config(42);
        let store = generate(&cfg);

        let mut numbers: Vec<u64> = store
            .pull_requests
            .iter()
            .filter(|pr| pr.repo == "acme/platform")
            .map(|pr| pr.number)
            .collect();
        let before = numbers.len();
        numbers.sort_unstable();
        numbers.dedup();
        assert_eq!(numbers.len(), before);
    }

    #[test]
    fn every_commit_belongs_to_a_configured_repo() {
        let cfg = base_config(7);
        let store = generate(&cfg);
        for commit in &store.commits {
            assert_eq!(commit.repo, "acme/platform");
        }
    }
}
