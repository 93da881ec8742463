//! Research dataset assembly (spec.md §4.14): one row per merged PR in a
//! window, with every derived metric computed exactly as specified.

use chrono::{DateTime, Utc};
use sdlc_synth_domain::{AiBand, DateRange, PrState, ResearchRow};

use crate::store::Store;
use crate::survival;

fn hours_between(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    (to - from).num_seconds() as f64 / 3600.0
}

pub fn assemble_dataset(store: &Store, window: DateRange) -> Vec<ResearchRow> {
    let mut rows: Vec<ResearchRow> = store
        .pull_requests
        .iter()
        .filter(|pr| pr.state == PrState::Merged)
        .filter_map(|pr| {
            let merged_at = pr.merged_at?;
            if !window.contains(merged_at) {
                return None;
            }

            let author = store.developer(pr.author);
            let reviews: Vec<_> = store
                .reviews
                .iter()
                .filter(|r| r.repo == pr.repo && r.pr_number == pr.number)
                .collect();

            let mut reviewer_ids: Vec<_> = reviews.iter().map(|r| r.reviewer).collect();
            reviewer_ids.sort();
            reviewer_ids.dedup();

            let pr_commits: Vec<_> = store
                .commits
                .iter()
                .filter(|c| {
                    c.repo == pr.repo
                        && c.author == pr.author
                        && c.ts >= pr.first_commit_at
                        && c.ts <= pr.last_commit_at
                })
                .collect();

            let mut pr_files: Vec<&String> = pr_commits.iter().flat_map(|c| &c.files).collect();
            pr_files.sort();
            pr_files.dedup();

            let greenfield_index = if pr_files.is_empty() {
                0.0
            } else {
                let born_in_pr = pr_files
                    .iter()
                    .filter(|path| {
                        store
                            .files
                            .iter()
                            .find(|f| f.repo == pr.repo && &&f.path == path)
                            .map(|f| f.born_at >= pr.first_commit_at && f.born_at <= pr.last_commit_at)
                            .unwrap_or(false)
                    })
                    .count();
                born_in_pr as f64 / pr_files.len() as f64
            };

            let files_born_in_pr: Vec<_> = store
                .files
                .iter()
                .filter(|f| {
                    f.repo == pr.repo && f.born_at >= pr.first_commit_at && f.born_at <= pr.last_commit_at
                })
                .cloned()
                .collect();
            let survival_rate_30d =
                survival::survival_rate_at_window(&files_born_in_pr, 30.0, window.to).unwrap_or(1.0);

            let revert = store.reverts.iter().find(|r| r.original_pr == pr.number);
            let hotfix = store.hotfixes.iter().find(|h| h.parent_pr == pr.number);

            Some(ResearchRow {
                repo: pr.repo.clone(),
                pr_number: pr.number,
                author_id: pr.author.to_string(),
                author_seniority: author.map(|d| d.seniority.as_str().to_string()).unwrap_or_default(),
                ai_preference: author.map(|d| d.ai_preference).unwrap_or(0.0),
                title: pr.title.clone(),
                created_at: pr.created_at,
                first_commit_at: pr.first_commit_at,
                last_commit_at: pr.last_commit_at,
                first_review_at: pr.first_review_at,
                merged_at,
                additions: pr.additions,
                deletions: pr.deletions,
                net_lines: pr.additions as i64 - pr.deletions as i64,
                changed_files: pr.changed_files,
                commit_count: pr.commit_count,
                reviewer_count: reviewer_ids.len() as u32,
                review_count: reviews.len() as u32,
                ai_ratio: pr.ai_ratio,
                ai_band: AiBand::of(pr.ai_ratio).as_str().to_string(),
                tab_lines: pr.tab_lines,
                composer_lines: pr.composer_lines,
                non_ai_lines: pr.additions.saturating_sub(pr.tab_lines + pr.composer_lines),
                initial_additions: pr.initial_additions,
                initial_changed_files: pr.initial_changed_files,
                rework_ratio: (pr.additions as f64 - pr.initial_additions as f64)
                    / pr.initial_additions.max(1) as f64,
                scope_creep: (pr.changed_files as f64 - pr.initial_changed_files as f64)
                    / pr.initial_changed_files.max(1) as f64,
                greenfield_index,
                pickup_time_hours: pr.first_review_at.map(|fr| hours_between(pr.created_at, fr)),
                review_density: reviews.len() as f64 / pr.changed_files.max(1) as f64,
                cycle_time_hours: hours_between(pr.first_commit_at, merged_at),
                is_reverted: pr.is_reverted,
                revert_delay_hours: revert.map(|r| r.delay_hours),
                is_bug_fix: pr.is_bug_fix,
                has_hotfix_followup: hotfix.is_some(),
                hotfix_delay_hours: hotfix.map(|h| h.delay_hours),
                survival_rate_30d,
                merged_date: merged_at.date_naive().to_string(),
            })
        })
        .collect();

    rows.sort_by(|a, b| a.repo.cmp(&b.repo).then(a.pr_number.cmp(&b.pr_number)));
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_matches_row_field_order() {
        let mut wtr = csv::Writer::from_writer(vec![]);
        let row = ResearchRow {
            repo: "acme/platform".to_string(),
            pr_number: 1,
            author_id: "00000000-0000-0000-0000-000000000000".to_string(),
            author_seniority: "mid".to_string(),
            ai_preference: 0.5,
            title: "Add support for api".to_string(),
            created_at: Utc::now(),
            first_commit_at: Utc::now(),
            last_commit_at: Utc::now(),
            first_review_at: Some(Utc::now()),
            merged_at: Utc::now(),
            additions: 10,
            deletions: 2,
            net_lines: 8,
            changed_files: 2,
            commit_count: 1,
            reviewer_count: 1,
            review_count: 1,
            ai_ratio: 0.3,
            ai_band: "low".to_string(),
            tab_lines: 2,
            composer_lines: 1,
            non_ai_lines: 7,
            initial_additions: 10,
            initial_changed_files: 2,
            rework_ratio: 0.0,
            scope_creep: 0.0,
            greenfield_index: 0.5,
            pickup_time_hours: Some(1.5),
            review_density: 0.5,
            cycle_time_hours: 4.0,
            is_reverted: false,
            revert_delay_hours: None,
            is_bug_fix: false,
            has_hotfix_followup: false,
            hotfix_delay_hours: None,
            survival_rate_30d: 1.0,
            merged_date: "2026-01-01".to_string(),
        };
        wtr.serialize(&row).unwrap();
        let bytes = wtr.into_inner().unwrap();
        let mut rdr = csv::Reader::from_reader(bytes.as_slice());
        let headers: Vec<String> = rdr.headers().unwrap().iter().map(|h| h.to_string()).collect();
        assert_eq!(headers, sdlc_synth_domain::SCHEMA.to_vec());
    }
}
