//! Developer roster factory (spec.md §4.3).

use rand::rngs::StdRng;
use rand::Rng;
use rand_distr::{Beta, Distribution};
use sdlc_synth_config::{AiPreferenceDistribution, SeedConfig, SeniorityMix};
use sdlc_synth_domain::{Developer, Seniority};
use uuid::Uuid;

const FIRST_NAMES: &[&str] = &[
    "Ava", "Noah", "Mia", "Liam", "Zoe", "Omar", "Priya", "Kenji", "Lucia", "Ibrahim", "Hana",
    "Felix", "Nadia", "Theo", "Yuki", "Sofia",
];
const LAST_NAMES: &[&str] = &[
    "Chen", "Okafor", "Reyes", "Kowalski", "Nguyen", "Haddad", "Schmidt", "Ivanova", "Park",
    "Dubois", "Silva", "Hassan", "Lindqvist", "Moreau", "Tanaka", "Costa",
];

/// Target headcount per seniority tier via largest-remainder apportionment:
/// deterministic given `developer_count` and the configured fractions, with
/// no RNG involved in the rounding itself (spec.md §4.3: "rounding residuals
/// to the closest seniority").
fn tier_counts(developer_count: u32, mix: &SeniorityMix) -> [(Seniority, u32); 3] {
    let tiers = [
        (Seniority::Junior, mix.junior),
        (Seniority::Mid, mix.mid),
        (Seniority::Senior, mix.senior),
    ];

    let exact: Vec<f64> = tiers
        .iter()
        .map(|(_, frac)| frac * developer_count as f64)
        .collect();
    let mut floors: Vec<u32> = exact.iter().map(|x| x.floor() as u32).collect();
    let mut remainder = developer_count as i64 - floors.iter().sum::<u32>() as i64;

    let mut remainders: Vec<(usize, f64)> = exact
        .iter()
        .enumerate()
        .map(|(i, x)| (i, x - x.floor()))
        .collect();
    remainders.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap());

    let mut idx = 0;
    while remainder > 0 {
        floors[remainders[idx % remainders.len()].0] += 1;
        remainder -= 1;
        idx += 1;
    }

    [
        (tiers[0].0, floors[0]),
        (tiers[1].0, floors[1]),
        (tiers[2].0, floors[2]),
    ]
}

fn seeded_uuid(rng: &mut StdRng) -> Uuid {
    let mut bytes = [0u8; 16];
    rng.fill(&mut bytes);
    // RFC 4122 version/variant bits so the result still looks like a v4 UUID
    // even though it is deterministically derived, not `Uuid::new_v4()`.
    bytes[6] = (bytes[6] & 0x0f) | 0x40;
    bytes[8] = (bytes[8] & 0x3f) | 0x80;
    Uuid::from_bytes(bytes)
}

/// Builds the developer roster. Order-deterministic under the seed.
pub fn build_roster(cfg: &SeedConfig, rng: &mut StdRng) -> Vec<Developer> {
    let counts = tier_counts(cfg.developer_count, &cfg.seniority_mix);

    let mut tier_labels: Vec<Seniority> = Vec::with_capacity(cfg.developer_count as usize);
    for (seniority, count) in counts {
        for _ in 0..count {
            tier_labels.push(seniority);
        }
    }
    // Fisher-Yates shuffle so which developer slot lands in which tier is
    // seed-derived rather than always junior-first.
    for i in (1..tier_labels.len()).rev() {
        let j = rng.gen_range(0..=i);
        tier_labels.swap(i, j);
    }

    let AiPreferenceDistribution { alpha, beta } = cfg.ai_preference_distribution;
    let beta_dist = Beta::new(alpha, beta).expect("valid beta distribution parameters");

    (0..cfg.developer_count)
        .map(|i| {
            let seniority = tier_labels[i as usize];
            let first = FIRST_NAMES[rng.gen_range(0..FIRST_NAMES.len())];
            let last = LAST_NAMES[rng.gen_range(0..LAST_NAMES.len())];
            let display_name = format!("{first} {last}");
            let email = format!(
                "{}.{}@example-corp.dev",
                first.to_lowercase(),
                last.to_lowercase()
            );
            let ai_preference = beta_dist.sample(rng).clamp(0.0, 1.0);
            let id = seeded_uuid(rng);

            Developer {
                id,
                display_name,
                email,
                seniority,
                ai_preference,
                active: true,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::RngStreams;
    use sdlc_synth_config::{AiPreferenceDistribution, DateWindow, RepoConfig};

    fn base_config() -> SeedConfig {
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
            seed: 12345,
            ai_preference_distribution: AiPreferenceDistribution::default(),
            pto_ranges: Vec::new(),
        }
    }

    #[test]
    fn tier_counts_match_mix_exactly_for_divisible_counts() {
        let mix = SeniorityMix {
            junior: 1.0 / 3.0,
            mid: 1.0 / 3.0,
            senior: 1.0 / 3.0,
        };
        let counts = tier_counts(3, &mix);
        assert_eq!(counts.iter().map(|(_, c)| c).sum::<u32>(), 3);
        assert!(counts.iter().all(|(_, c)| *c == 1));
    }

    #[test]
    fn roster_is_deterministic_under_seed() {
        let cfg = base_config();
        let streams = RngStreams::new(cfg.seed);

        let mut rng_a = streams.developers();
        let roster_a = build_roster(&cfg, &mut rng_a);

        let mut rng_b = streams.developers();
        let roster_b = build_roster(&cfg, &mut rng_b);

        assert_eq!(roster_a.len(), 3);
        for (a, b) in roster_a.iter().zip(roster_b.iter()) {
            assert_eq!(a.id, b.id);
            assert_eq!(a.display_name, b.display_name);
            assert_eq!(a.seniority, b.seniority);
            assert_eq!(a.ai_preference, b.ai_preference);
        }
    }

    #[test]
    fn roster_size_matches_config() {
        let cfg = base_config();
        let streams = RngStreams::new(cfg.seed);
        let mut rng = streams.developers();
        let roster = build_roster(&cfg, &mut rng);
        assert_eq!(roster.len(), cfg.developer_count as usize);
    }
}
