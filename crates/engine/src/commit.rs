//! Commit generation (spec.md §4.6): per-commit line partitioning, file
//! selection against a growing per-repo namespace, message synthesis, and
//! content-hash sha assignment.

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;
use rand_distr::{Dirichlet, Distribution, Geometric, LogNormal};
use sdlc_synth_domain::{Commit, Developer, Repository, Seniority};
use sha2::{Digest, Sha256};

const EXTENSIONS: &[&str] = &["rs", "ts", "py", "go", "md", "yaml", "sql"];
const DIRS: &[&str] = &["src", "src/api", "src/core", "src/util", "tests", "docs"];

/// A per-repo namespace of known files. Grows monotonically during
/// generation; commits draw from it with a small chance of minting a new
/// path, producing a "greenfield tail" of files appearing over time
/// (spec.md §9).
#[derive(Debug, Clone, Default)]
pub struct FileNamespace {
    known: Vec<String>,
}

impl FileNamespace {
    pub fn new() -> Self {
        Self { known: Vec::new() }
    }

    pub fn known_files(&self) -> &[String] {
        &self.known
    }

    fn mint_path(rng: &mut StdRng, serial: usize) -> String {
        let dir = DIRS[rng.gen_range(0..DIRS.len())];
        let ext = EXTENSIONS[rng.gen_range(0..EXTENSIONS.len())];
        format!("{dir}/module_{serial:04}.{ext}")
    }

    /// Picks `count` file paths, minting new ones ~15% of the time (or
    /// always, if the namespace is still empty).
    pub fn pick_files(&mut self, count: u32, rng: &mut StdRng) -> Vec<String> {
        const MINT_PROBABILITY: f64 = 0.15;
        let mut chosen = Vec::with_capacity(count as usize);

        for _ in 0..count {
            let should_mint = self.known.is_empty() || rng.gen_bool(MINT_PROBABILITY);
            if should_mint {
                let path = Self::mint_path(rng, self.known.len());
                self.known.push(path.clone());
                chosen.push(path);
            } else {
                let idx = rng.gen_range(0..self.known.len());
                chosen.push(self.known[idx].clone());
            }
        }

        chosen.sort();
        chosen.dedup();
        if chosen.is_empty() {
            let path = Self::mint_path(rng, self.known.len());
            self.known.push(path.clone());
            chosen.push(path);
        }
        chosen
    }
}

struct MessageTemplate {
    text: &'static str,
    looks_like_fix: bool,
}

const FEATURE_TEMPLATES: &[MessageTemplate] = &[
    MessageTemplate { text: "Add support for {scope}", looks_like_fix: false },
    MessageTemplate { text: "Implement {scope} endpoint", looks_like_fix: false },
    MessageTemplate { text: "Introduce {scope} module", looks_like_fix: false },
];
const CHORE_TEMPLATES: &[MessageTemplate] = &[
    MessageTemplate { text: "Refactor {scope}", looks_like_fix: false },
    MessageTemplate { text: "Clean up {scope}", looks_like_fix: false },
    MessageTemplate { text: "Update dependencies in {scope}", looks_like_fix: false },
];
const FIX_TEMPLATES: &[MessageTemplate] = &[
    MessageTemplate { text: "Fix {scope} bug", looks_like_fix: true },
    MessageTemplate { text: "Hotfix: {scope} regression", looks_like_fix: true },
    MessageTemplate { text: "Urgent patch for {scope}", looks_like_fix: true },
    MessageTemplate { text: "Patch {scope} edge case", looks_like_fix: true },
];
const SCOPES: &[&str] = &["auth", "sync", "parser", "scheduler", "api", "storage", "ui"];

/// Generates a commit message, returning the text plus whether it carries
/// fix/hotfix/urgent/patch vocabulary (consumed by the quality injector's
/// hotfix title matching, spec.md §4.9).
pub fn generate_message(rng: &mut StdRng) -> (String, bool) {
    // chore : feature : fix weights
    let bucket = [("chore", 3u32), ("feature", 5), ("fix", 2)]
        .choose_weighted(rng, |(_, w)| *w)
        .expect("non-empty weighted bucket list")
        .0;

    let templates: &[MessageTemplate] = match bucket {
        "feature" => FEATURE_TEMPLATES,
        "chore" => CHORE_TEMPLATES,
        _ => FIX_TEMPLATES,
    };

    let template = &templates[rng.gen_range(0..templates.len())];
    let scope = SCOPES[rng.gen_range(0..SCOPES.len())];
    (template.text.replace("{scope}", scope), template.looks_like_fix)
}

fn truncated_log_normal(seniority: Seniority, rng: &mut StdRng) -> u32 {
    let (mu, sigma, cap) = match seniority {
        Seniority::Junior => (3.4_f64, 0.6, 200u32),
        Seniority::Mid => (4.0, 0.6, 350),
        Seniority::Senior => (4.5, 0.7, 550),
    };
    let dist = LogNormal::new(mu, sigma).expect("valid log-normal parameters");
    for _ in 0..32 {
        let sample = dist.sample(rng);
        if sample >= 1.0 && sample <= cap as f64 {
            return sample.round() as u32;
        }
    }
    cap / 2
}

/// Splits `total` lines into (tab, composer, non_ai) via a Dirichlet draw
/// whose alpha is shifted toward tab+composer as `ai_preference` increases.
fn split_ai_lines(total: u32, ai_preference: f64, rng: &mut StdRng) -> (u32, u32, u32) {
    if total == 0 {
        return (0, 0, 0);
    }

    let base = 1.0;
    let tab_alpha = base + ai_preference * 3.0;
    let composer_alpha = base + ai_preference * 2.0;
    let non_ai_alpha = base + (1.0 - ai_preference) * 2.0;

    let dirichlet = Dirichlet::new(&[tab_alpha, composer_alpha, non_ai_alpha])
        .expect("positive alpha parameters");
    let fractions = dirichlet.sample(rng);

    let tab = (fractions[0] * total as f64).round() as u32;
    let composer = (fractions[1] * total as f64).round() as u32;
    let non_ai = total.saturating_sub(tab).saturating_sub(composer);
    (tab, composer, non_ai)
}

fn geometric_changed_files(rng: &mut StdRng) -> u32 {
    let dist = Geometric::new(0.35).expect("valid geometric parameter");
    let draw = dist.sample(rng) as u32 + 1; // Geometric is 0-indexed; shift to >= 1
    draw.clamp(1, 15)
}

fn content_hash(author: &str, ts: DateTime<Utc>, message: &str, nonce: u64) -> String {
    let mut hasher = Sha256::new();
    hasher.update(author.as_bytes());
    hasher.update(b"|");
    hasher.update(ts.to_rfc3339().as_bytes());
    hasher.update(b"|");
    hasher.update(message.as_bytes());
    hasher.update(b"|");
    hasher.update(nonce.to_le_bytes());
    let digest = hasher.finalize();
    hex_encode(&digest)[..40].to_string()
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// Generates a single commit at `ts`, drawing its own total line budget
/// (spec.md §4.6 step 2) rather than dividing a session-level target evenly.
#[allow(clippy::too_many_arguments)]
pub fn generate(
    dev: &Developer,
    repo: &Repository,
    ts: DateTime<Utc>,
    namespace: &mut FileNamespace,
    nonce: u64,
    rng: &mut StdRng,
) -> Commit {
    let total_added = truncated_log_normal(dev.seniority, rng);
    let (tab_added, composer_added, non_ai_added) =
        split_ai_lines(total_added, dev.ai_preference, rng);

    let deletion_fraction = rng.gen_range(0.0..0.3);
    let total_deleted = (total_added as f64 * deletion_fraction).round() as u32;
    let (tab_deleted, composer_deleted, non_ai_deleted) =
        split_ai_lines(total_deleted, dev.ai_preference, rng);

    let changed_files = geometric_changed_files(rng);
    let files = namespace.pick_files(changed_files, rng);

    let (message, _looks_like_fix) = generate_message(rng);
    let sha = content_hash(&dev.id.to_string(), ts, &message, nonce);

    Commit {
        sha,
        author: dev.id,
        repo: repo.full_name(),
        branch: repo.default_branch.clone(),
        ts,
        message,
        files,
        tab_lines_added: tab_added,
        composer_lines_added: composer_added,
        non_ai_lines_added: non_ai_added,
        tab_lines_deleted: tab_deleted,
        composer_lines_deleted: composer_deleted,
        non_ai_lines_deleted: non_ai_deleted,
    }
}
