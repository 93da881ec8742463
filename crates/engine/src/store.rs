//! In-memory store (spec.md §4.12): the generation pipeline's sole sink and
//! every query endpoint's sole source. No persistence, no mutation after
//! the initial generation sweep except for quality injection's own
//! controlled follow-up writes.

use chrono::{DateTime, Utc};
use sdlc_synth_domain::{
    Commit, Developer, FileLifecycle, HotfixEvent, PageRequest, Pagination, PullRequest,
    QueryPredicate, Repository, RevertEvent, Review,
};
use std::collections::HashMap;

/// Holds every entity the generator produced, plus id-based indices used by
/// the analytics and research layers.
#[derive(Debug, Default)]
pub struct Store {
    pub developers: Vec<Developer>,
    /// The small, fixed repo set seeded from config (spec.md §3) - kept
    /// explicit rather than derived from commit/PR activity, so a
    /// configured-but-so-far-quiet repo still resolves at `/repos/{o}/{r}`.
    pub repositories: Vec<Repository>,
    pub commits: Vec<Commit>,
    pub pull_requests: Vec<PullRequest>,
    pub reviews: Vec<Review>,
    pub files: Vec<FileLifecycle>,
    pub reverts: Vec<RevertEvent>,
    pub hotfixes: Vec<HotfixEvent>,

    by_developer: HashMap<uuid::Uuid, Vec<usize>>, // indices into commits
    by_repo: HashMap<String, Vec<usize>>,           // indices into pull_requests
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds the secondary indices. Called once after generation.
    pub fn reindex(&mut self) {
        self.by_developer.clear();
        self.by_repo.clear();

        for (i, commit) in self.commits.iter().enumerate() {
            self.by_developer.entry(commit.author).or_default().push(i);
        }
        for (i, pr) in self.pull_requests.iter().enumerate() {
            self.by_repo.entry(pr.repo.clone()).or_default().push(i);
        }
    }

    pub fn developer(&self, id: uuid::Uuid) -> Option<&Developer> {
        self.developers.iter().find(|d| d.id == id)
    }

    pub fn repository(&self, owner: &str, name: &str) -> Option<&Repository> {
        self.repositories
            .iter()
            .find(|r| r.owner == owner && r.name == name)
    }

    pub fn commits_by_developer(&self, id: uuid::Uuid) -> Vec<&Commit> {
        self.by_developer
            .get(&id)
            .map(|idxs| idxs.iter().map(|&i| &self.commits[i]).collect())
            .unwrap_or_default()
    }

    pub fn pull_requests_by_repo(&self, repo: &str) -> Vec<&PullRequest> {
        self.by_repo
            .get(repo)
            .map(|idxs| idxs.iter().map(|&i| &self.pull_requests[i]).collect())
            .unwrap_or_default()
    }

    /// Commits matching `predicate`, filtered but not paginated.
    pub fn filter_commits(&self, predicate: &QueryPredicate) -> Vec<&Commit> {
        self.commits
            .iter()
            .filter(|c| {
                predicate
                    .date_range
                    .as_ref()
                    .map(|r| r.contains(c.ts))
                    .unwrap_or(true)
                    && predicate
                        .user_id
                        .as_ref()
                        .map(|id| id.as_str() == c.author.to_string())
                        .unwrap_or(true)
                    && predicate
                        .repo_name
                        .as_ref()
                        .map(|r| r == &c.repo)
                        .unwrap_or(true)
            })
            .collect()
    }

    pub fn filter_pull_requests(&self, predicate: &QueryPredicate) -> Vec<&PullRequest> {
        self.pull_requests
            .iter()
            .filter(|pr| {
                predicate
                    .date_range
                    .as_ref()
                    .map(|r| r.contains(pr.created_at))
                    .unwrap_or(true)
                    && predicate
                        .user_id
                        .as_ref()
                        .map(|id| id.as_str() == pr.author.to_string())
                        .unwrap_or(true)
                    && predicate
                        .repo_name
                        .as_ref()
                        .map(|r| r == &pr.repo)
                        .unwrap_or(true)
            })
            .collect()
    }

    /// Deterministic pagination: stable-sorts by the supplied key before
    /// slicing, so ties break on a secondary key rather than on hash order.
    pub fn paginate<'a, T, K: Ord>(
        items: &mut Vec<&'a T>,
        key: impl Fn(&T) -> K,
        page: &PageRequest,
    ) -> (Vec<&'a T>, Pagination) {
        items.sort_by_key(|item| key(*item));
        let total = items.len();
        let page_items = page.slice(&items[..]);
        (page_items, Pagination::new(*page, total))
    }
}

pub fn now() -> DateTime<Utc> {
    Utc::now()
}
