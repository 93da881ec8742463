//! Seeded RNG sub-streams (spec.md §4.1).
//!
//! A root seed is combined with a stable stream label to derive a
//! reproducible `StdRng`, the same shape as `iqrah-iss`'s
//! `base_seed.wrapping_add(student_index).wrapping_mul(31337)` ->
//! `StdRng::seed_from_u64`, generalized to arbitrary string labels via a
//! fixed FNV-1a hash (not `std::collections::hash_map::DefaultHasher`,
//! whose output is not guaranteed stable across processes).

use rand::rngs::StdRng;
use rand::SeedableRng;

const FNV_OFFSET_BASIS: u64 = 0xcbf29ce484222325;
const FNV_PRIME: u64 = 0x100000001b3;

fn fnv1a(bytes: &[u8]) -> u64 {
    let mut hash = FNV_OFFSET_BASIS;
    for byte in bytes {
        hash ^= *byte as u64;
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

/// Derives independent, reproducible RNG streams from a single root seed.
#[derive(Debug, Clone, Copy)]
pub struct RngStreams {
    root_seed: i64,
}

impl RngStreams {
    pub fn new(root_seed: i64) -> Self {
        Self { root_seed }
    }

    /// A fresh `StdRng` for the given stream label. Calling this twice with
    /// the same label yields generators that produce the same sequence.
    pub fn sub_rng(&self, label: &str) -> StdRng {
        let mut buf = self.root_seed.to_le_bytes().to_vec();
        buf.extend_from_slice(label.as_bytes());
        StdRng::seed_from_u64(fnv1a(&buf))
    }

    pub fn developers(&self) -> StdRng {
        self.sub_rng("developers")
    }

    pub fn dev_timeline(&self, dev_id: &str) -> StdRng {
        self.sub_rng(&format!("dev:{dev_id}:timeline"))
    }

    pub fn dev_sessions(&self, dev_id: &str) -> StdRng {
        self.sub_rng(&format!("dev:{dev_id}:sessions"))
    }

    pub fn pr_reviews(&self, repo: &str, pr_number: u64) -> StdRng {
        self.sub_rng(&format!("pr:{repo}:{pr_number}:reviews"))
    }

    pub fn quality_reverts(&self) -> StdRng {
        self.sub_rng("quality:reverts")
    }

    pub fn quality_hotfixes(&self) -> StdRng {
        self.sub_rng("quality:hotfixes")
    }

    pub fn survival(&self, repo: &str) -> StdRng {
        self.sub_rng(&format!("survival:{repo}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn same_label_same_sequence() {
        let streams = RngStreams::new(42);
        let mut a = streams.sub_rng("dev:abc:timeline");
        let mut b = streams.sub_rng("dev:abc:timeline");
        let xs: Vec<u32> = (0..5).map(|_| a.gen_range(0..1000)).collect();
        let ys: Vec<u32> = (0..5).map(|_| b.gen_range(0..1000)).collect();
        assert_eq!(xs, ys);
    }

    #[test]
    fn different_labels_diverge() {
        let streams = RngStreams::new(42);
        let mut a = streams.sub_rng("dev:abc:timeline");
        let mut b = streams.sub_rng("dev:xyz:timeline");
        let xs: Vec<u32> = (0..5).map(|_| a.gen_range(0..1_000_000)).collect();
        let ys: Vec<u32> = (0..5).map(|_| b.gen_range(0..1_000_000)).collect();
        assert_ne!(xs, ys);
    }

    #[test]
    fn different_root_seed_diverges() {
        let a = RngStreams::new(1).sub_rng("developers");
        let b = RngStreams::new(2).sub_rng("developers");
        assert_ne!(format!("{a:?}"), format!("{b:?}"));
    }
}
