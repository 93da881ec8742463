//! Narrow repository-style accessors around the engine's in-memory store
//! (spec.md §4.12). Mirrors the teacher's storage/repository split - the
//! HTTP layer depends on this stable surface rather than reaching into
//! `sdlc_synth_engine::Store` internals directly, even though there is no
//! database underneath.

use std::sync::Arc;

use sdlc_synth_domain::{
    Commit, Developer, FileLifecycle, HotfixEvent, PageRequest, Pagination, PrState,
    PullRequest, QueryPredicate, Repository, RevertEvent, Review,
};
use sdlc_synth_engine::Store;
use uuid::Uuid;

/// Cheaply-clonable handle to a fully generated, immutable `Store`.
/// Construction happens once at process start (see `sdlc-synth-cli`'s and
/// `sdlc-synth-api`'s `main.rs`); everything after that is read-only.
#[derive(Debug, Clone)]
pub struct StoreHandle {
    store: Arc<Store>,
}

impl StoreHandle {
    pub fn new(store: Store) -> Self {
        Self {
            store: Arc::new(store),
        }
    }

    pub fn developers(&self) -> &[Developer] {
        &self.store.developers
    }

    pub fn developer(&self, id: Uuid) -> Option<&Developer> {
        self.store.developer(id)
    }

    /// The fixed, config-seeded repo set, sorted by full name.
    pub fn repositories(&self) -> Vec<&Repository> {
        let mut repos: Vec<&Repository> = self.store.repositories.iter().collect();
        repos.sort_by_key(|r| r.full_name());
        repos
    }

    pub fn repository(&self, owner: &str, name: &str) -> Option<&Repository> {
        self.store.repository(owner, name)
    }

    /// Distinct repo full names ("owner/name"), sorted.
    pub fn repos(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .store
            .repositories
            .iter()
            .map(|r| r.full_name())
            .collect();
        names.sort();
        names.dedup();
        names
    }

    pub fn commits(&self, predicate: &QueryPredicate) -> Vec<&Commit> {
        self.store.filter_commits(predicate)
    }

    pub fn commit_by_sha(&self, repo: &str, sha: &str) -> Option<&Commit> {
        self.store
            .commits
            .iter()
            .find(|c| c.repo == repo && c.sha == sha)
    }

    pub fn pull_requests(&self, predicate: &QueryPredicate) -> Vec<&PullRequest> {
        self.store.filter_pull_requests(predicate)
    }

    pub fn pull_request(&self, repo: &str, number: u64) -> Option<&PullRequest> {
        self.store
            .pull_requests
            .iter()
            .find(|pr| pr.repo == repo && pr.number == number)
    }

    pub fn commits_for_pr(&self, pr: &PullRequest) -> Vec<&Commit> {
        self.store
            .commits
            .iter()
            .filter(|c| {
                c.repo == pr.repo
                    && c.author == pr.author
                    && c.ts >= pr.first_commit_at
                    && c.ts <= pr.last_commit_at
            })
            .collect()
    }

    pub fn files_for_pr(&self, pr: &PullRequest) -> Vec<String> {
        let mut files: Vec<String> = self
            .commits_for_pr(pr)
            .into_iter()
            .flat_map(|c| c.files.clone())
            .collect();
        files.sort();
        files.dedup();
        files
    }

    pub fn reviews_for_pr(&self, repo: &str, number: u64) -> Vec<&Review> {
        self.store
            .reviews
            .iter()
            .filter(|r| r.repo == repo && r.pr_number == number)
            .collect()
    }

    pub fn merged_pull_requests(&self, repo: Option<&str>) -> Vec<&PullRequest> {
        self.store
            .pull_requests
            .iter()
            .filter(|pr| pr.state == PrState::Merged)
            .filter(|pr| repo.map(|r| r == pr.repo).unwrap_or(true))
            .collect()
    }

    pub fn reverts(&self) -> &[RevertEvent] {
        &self.store.reverts
    }

    pub fn hotfixes(&self) -> &[HotfixEvent] {
        &self.store.hotfixes
    }

    pub fn files(&self) -> &[FileLifecycle] {
        &self.store.files
    }

    pub fn files_for_repo(&self, repo: &str) -> Vec<FileLifecycle> {
        self.store
            .files
            .iter()
            .filter(|f| f.repo == repo)
            .cloned()
            .collect()
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Stable-sorts `items` by `key` and slices the requested page, exactly
    /// the way `Store::paginate` already does - re-exported here so callers
    /// never import `sdlc_synth_engine` directly.
    pub fn paginate<'a, T, K: Ord>(
        items: &mut Vec<&'a T>,
        key: impl Fn(&T) -> K,
        page: &PageRequest,
    ) -> (Vec<&'a T>, Pagination) {
        Store::paginate(items, key, page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sdlc_synth_domain::Seniority;

    fn sample_store() -> Store {
        let mut store = Store::new();
        store.repositories.push(Repository {
            owner: "acme".to_string(),
            name: "platform".to_string(),
            default_branch: "main".to_string(),
        });
        store.developers.push(Developer {
            id: Uuid::nil(),
            display_name: "Test Dev".to_string(),
            email: "test@example.dev".to_string(),
            seniority: Seniority::Mid,
            ai_preference: 0.5,
            active: true,
        });
        store.commits.push(Commit {
            sha: "a".repeat(40),
            author: Uuid::nil(),
            repo: "acme/platform".to_string(),
            branch: "main".to_string(),
            ts: Utc::now(),
            message: "Add support for api".to_string(),
            files: vec!["src/api.rs".to_string()],
            tab_lines_added: 1,
            composer_lines_added: 1,
            non_ai_lines_added: 1,
            tab_lines_deleted: 0,
            composer_lines_deleted: 0,
            non_ai_lines_deleted: 0,
        });
        store.reindex();
        store
    }

    #[test]
    fn repos_lists_distinct_names() {
        let handle = StoreHandle::new(sample_store());
        assert_eq!(handle.repos(), vec!["acme/platform".to_string()]);
    }

    #[test]
    fn commit_by_sha_finds_exact_match() {
        let handle = StoreHandle::new(sample_store());
        let sha = "a".repeat(40);
        assert!(handle.commit_by_sha("acme/platform", &sha).is_some());
        assert!(handle.commit_by_sha("acme/other", &sha).is_none());
    }

    #[test]
    fn developer_lookup_matches_store() {
        let handle = StoreHandle::new(sample_store());
        assert!(handle.developer(Uuid::nil()).is_some());
        assert!(handle.developer(Uuid::from_u128(1)).is_none());
    }
}
