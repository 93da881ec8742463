//! Team/by-user analytics aggregators (spec.md §4.13). Every aggregator
//! takes a filtered commit/PR slice and never panics on an empty one.
//!
//! The upstream API this module is shape-compatible with reports per-model,
//! per-client-version, and per-tool usage; this simulator does not integrate
//! real AI models (an explicit non-goal), so those categorical axes are
//! derived deterministically from existing commit fields (AI band, sha hash)
//! rather than fabricated as if they were real product telemetry.

use sdlc_synth_domain::{AiBand, Commit, Developer, PullRequest};
use serde::Serialize;
use std::collections::HashMap;

fn fnv1a(bytes: &[u8]) -> u64 {
    let mut hash = 0xcbf29ce484222325u64;
    for b in bytes {
        hash ^= *b as u64;
        hash = hash.wrapping_mul(0x100000001b3);
    }
    hash
}

fn bucket<'a>(sha: &str, labels: &'a [&'a str]) -> &'a str {
    labels[(fnv1a(sha.as_bytes()) as usize) % labels.len()]
}

#[derive(Debug, Clone, Serialize, Default)]
pub struct Overview {
    pub suggestions_shown: u64,
    pub suggestions_accepted: u64,
    pub acceptance_rate: Option<f64>,
    pub ai_lines_added: u64,
    pub total_lines_added: u64,
    pub ai_velocity: Option<f64>,
}

/// `acceptance_rate` uses the average ai_preference of the authors in scope
/// as the synthetic show→accept conversion rate, since the simulator models
/// landed edits, not rejected-suggestion telemetry.
pub fn overview(commits: &[&Commit], developers: &[Developer]) -> Overview {
    if commits.is_empty() {
        return Overview::default();
    }

    let ai_lines_added: u64 = commits.iter().map(|c| c.ai_lines_added() as u64).sum();
    let total_lines_added: u64 = commits.iter().map(|c| c.total_lines_added() as u64).sum();
    let suggestions_accepted = commits.iter().filter(|c| c.ai_lines_added() > 0).count() as u64;

    let ai_velocity = if total_lines_added > 0 {
        Some(ai_lines_added as f64 / total_lines_added as f64)
    } else {
        None
    };

    if suggestions_accepted == 0 {
        return Overview {
            suggestions_shown: 0,
            suggestions_accepted: 0,
            acceptance_rate: None,
            ai_lines_added,
            total_lines_added,
            ai_velocity,
        };
    }

    let avg_pref: f64 = {
        let prefs: Vec<f64> = commits
            .iter()
            .filter_map(|c| developers.iter().find(|d| d.id == c.author))
            .map(|d| d.ai_preference)
            .collect();
        if prefs.is_empty() {
            0.5
        } else {
            prefs.iter().sum::<f64>() / prefs.len() as f64
        }
    };
    let acceptance_rate = (0.5 + 0.4 * avg_pref).clamp(0.05, 0.98);
    let suggestions_shown = (suggestions_accepted as f64 / acceptance_rate).round() as u64;

    Overview {
        suggestions_shown,
        suggestions_accepted,
        acceptance_rate: Some(acceptance_rate),
        ai_lines_added,
        total_lines_added,
        ai_velocity,
    }
}

#[derive(Debug, Clone, Serialize, Default)]
pub struct TotalUsage {
    pub tab_lines: u64,
    pub composer_lines: u64,
    pub non_ai_lines: u64,
    pub totals: u64,
}

pub fn total_usage(commits: &[&Commit]) -> TotalUsage {
    let tab_lines = commits.iter().map(|c| c.tab_lines_added as u64).sum();
    let composer_lines = commits.iter().map(|c| c.composer_lines_added as u64).sum();
    let non_ai_lines = commits.iter().map(|c| c.non_ai_lines_added as u64).sum();
    TotalUsage {
        tab_lines,
        composer_lines,
        non_ai_lines,
        totals: tab_lines + composer_lines + non_ai_lines,
    }
}

#[derive(Debug, Clone, Serialize, Default)]
pub struct ModelUsage {
    pub events: u64,
    pub lines_added: u64,
}

const MODEL_BANDS: &[&str] = &["model-fast", "model-standard", "model-large"];

/// Keyed by a synthetic model tier derived from each commit's AI band.
pub fn models(commits: &[&Commit]) -> HashMap<String, ModelUsage> {
    let mut out: HashMap<String, ModelUsage> = HashMap::new();
    for commit in commits {
        let band = AiBand::of(commit.ai_ratio());
        let label = match band {
            AiBand::Low => MODEL_BANDS[0],
            AiBand::Mid => MODEL_BANDS[1],
            AiBand::High => MODEL_BANDS[2],
        };
        let entry = out.entry(label.to_string()).or_default();
        entry.events += 1;
        entry.lines_added += commit.ai_lines_added() as u64;
    }
    out
}

const CLIENT_VERSIONS: &[&str] = &["1.92.0", "1.95.2", "2.1.0"];

pub fn client_versions(commits: &[&Commit]) -> HashMap<String, u64> {
    let mut out: HashMap<String, u64> = HashMap::new();
    for commit in commits {
        let version = bucket(&commit.sha, CLIENT_VERSIONS);
        *out.entry(version.to_string()).or_insert(0) += 1;
    }
    out
}

#[derive(Debug, Clone, Serialize)]
pub struct FileExtensionUsage {
    pub extension: String,
    pub lines_added: u64,
}

pub fn top_file_extensions(commits: &[&Commit]) -> Vec<FileExtensionUsage> {
    let mut totals: HashMap<String, u64> = HashMap::new();
    for commit in commits {
        if commit.files.is_empty() {
            continue;
        }
        let per_file = commit.total_lines_added() as u64 / commit.files.len() as u64;
        for file in &commit.files {
            let ext = file.rsplit('.').next().unwrap_or("none").to_string();
            *totals.entry(ext).or_insert(0) += per_file;
        }
    }
    let mut rows: Vec<FileExtensionUsage> = totals
        .into_iter()
        .map(|(extension, lines_added)| FileExtensionUsage { extension, lines_added })
        .collect();
    rows.sort_by(|a, b| b.lines_added.cmp(&a.lines_added).then(a.extension.cmp(&b.extension)));
    rows
}

#[derive(Debug, Clone, Serialize)]
pub struct LeaderboardEntry {
    pub user_id: String,
    pub lines: u64,
}

#[derive(Debug, Clone, Serialize, Default)]
pub struct Leaderboard {
    pub by_tab_lines: Vec<LeaderboardEntry>,
    pub by_composer_lines: Vec<LeaderboardEntry>,
}

const LEADERBOARD_LIMIT: usize = 10;

/// Ties broken by user id lexicographic ascending (spec.md §4.13's
/// calculation rules state this directly, resolving the tie-break question
/// that §9's Open Questions list separately).
pub fn leaderboard(commits: &[&Commit]) -> Leaderboard {
    let mut tab: HashMap<String, u64> = HashMap::new();
    let mut composer: HashMap<String, u64> = HashMap::new();
    for commit in commits {
        let user_id = commit.author.to_string();
        *tab.entry(user_id.clone()).or_insert(0) += commit.tab_lines_added as u64;
        *composer.entry(user_id).or_insert(0) += commit.composer_lines_added as u64;
    }

    let rank = |map: HashMap<String, u64>| -> Vec<LeaderboardEntry> {
        let mut rows: Vec<LeaderboardEntry> = map
            .into_iter()
            .map(|(user_id, lines)| LeaderboardEntry { user_id, lines })
            .collect();
        rows.sort_by(|a, b| b.lines.cmp(&a.lines).then(a.user_id.cmp(&b.user_id)));
        rows.truncate(LEADERBOARD_LIMIT);
        rows
    };

    Leaderboard {
        by_tab_lines: rank(tab),
        by_composer_lines: rank(composer),
    }
}

const MCP_TOOLS: &[&str] = &["fetch", "search", "browser", "shell"];
const COMMANDS: &[&str] = &["format", "explain", "refactor", "test"];
const PLANS: &[&str] = &["free", "pro", "business"];
const ASK_MODES: &[&str] = &["ask", "edit", "agent"];

fn categorical_counter(commits: &[&Commit], labels: &[&str]) -> HashMap<String, u64> {
    let mut out: HashMap<String, u64> = HashMap::new();
    for commit in commits {
        if commit.ai_lines_added() == 0 {
            continue;
        }
        let label = bucket(&commit.sha, labels);
        *out.entry(label.to_string()).or_insert(0) += 1;
    }
    out
}

pub fn mcp(commits: &[&Commit]) -> HashMap<String, u64> {
    categorical_counter(commits, MCP_TOOLS)
}

pub fn commands(commits: &[&Commit]) -> HashMap<String, u64> {
    categorical_counter(commits, COMMANDS)
}

pub fn plans(commits: &[&Commit]) -> HashMap<String, u64> {
    categorical_counter(commits, PLANS)
}

pub fn ask_mode(commits: &[&Commit]) -> HashMap<String, u64> {
    categorical_counter(commits, ASK_MODES)
}

/// `/repos/{o}/{r}/pulls` sort: created_at descending, id ascending tiebreak.
pub fn sort_pulls_for_listing<'a>(mut prs: Vec<&'a PullRequest>) -> Vec<&'a PullRequest> {
    prs.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.number.cmp(&b.number)));
    prs
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sdlc_synth_domain::Seniority;
    use uuid::Uuid;

    fn commit(author: Uuid, tab: u32, composer: u32, non_ai: u32, sha: &str) -> Commit {
        Commit {
            sha: sha.to_string(),
            author,
            repo: "acme/platform".to_string(),
            branch: "main".to_string(),
            ts: Utc::now(),
            message: "Add support for api".to_string(),
            files: vec!["src/api.rs".to_string(), "src/util.py".to_string()],
            tab_lines_added: tab,
            composer_lines_added: composer,
            non_ai_lines_added: non_ai,
            tab_lines_deleted: 0,
            composer_lines_deleted: 0,
            non_ai_lines_deleted: 0,
        }
    }

    #[test]
    fn overview_is_zeroed_on_empty_input() {
        let result = overview(&[], &[]);
        assert_eq!(result.suggestions_accepted, 0);
        assert!(result.acceptance_rate.is_none());
        assert!(result.ai_velocity.is_none());
    }

    #[test]
    fn overview_computes_ai_velocity_exactly() {
        let author = Uuid::nil();
        let dev = Developer {
            id: author,
            display_name: "Dev".to_string(),
            email: "dev@example.dev".to_string(),
            seniority: Seniority::Mid,
            ai_preference: 0.5,
            active: true,
        };
        let c = commit(author, 10, 10, 20, "a".repeat(40).as_str());
        let commits = vec![&c];
        let result = overview(&commits, &[dev]);
        assert_eq!(result.ai_velocity, Some(20.0 / 40.0));
    }

    #[test]
    fn leaderboard_breaks_ties_by_user_id() {
        let a = Uuid::from_u128(2);
        let b = Uuid::from_u128(1);
        let ca = commit(a, 5, 0, 0, "a".repeat(40).as_str());
        let cb = commit(b, 5, 0, 0, "b".repeat(40).as_str());
        let commits = vec![&ca, &cb];
        let board = leaderboard(&commits);
        assert_eq!(board.by_tab_lines[0].user_id, b.to_string());
        assert_eq!(board.by_tab_lines[1].user_id, a.to_string());
    }

    #[test]
    fn top_file_extensions_sorted_descending() {
        let author = Uuid::nil();
        let c1 = commit(author, 30, 0, 0, "a".repeat(40).as_str());
        let commits = vec![&c1];
        let exts = top_file_extensions(&commits);
        assert_eq!(exts.len(), 2);
        assert!(exts[0].lines_added >= exts[1].lines_added);
    }
}
