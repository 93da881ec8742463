//! Analytics-response memoization (spec.md §5, §7), keyed strictly by the
//! `(endpoint, predicate tuple)` - never by request identity, wall-clock, or
//! anything else that could make two identical queries miss each other or
//! two different queries collide. Teacher precedent: `iqrah_backend_api`'s
//! `cache::pack_verification_cache` / `actors::pack_cache`, both a narrow
//! `dashmap::DashMap` wrapper over a single cache concern - generalized here
//! from "is this pack version verified" to "what did this predicate tuple
//! last compute".

use std::sync::Arc;

use dashmap::DashMap;
use serde::Serialize;

/// Canonical, hashable key: one field per predicate axis an endpoint can
/// vary on, plus the endpoint name itself. Two requests that differ in any
/// field get distinct entries; two requests that agree in all of them -
/// regardless of arrival order or wall-clock time - share one.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub endpoint: &'static str,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub user_id: Option<String>,
    pub repo_name: Option<String>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub format: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct AnalyticsCache {
    entries: Arc<DashMap<CacheKey, serde_json::Value>>,
}

impl AnalyticsCache {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
        }
    }

    pub fn get(&self, key: &CacheKey) -> Option<serde_json::Value> {
        self.entries.get(key).map(|v| v.clone())
    }

    pub fn put<T: Serialize>(&self, key: CacheKey, value: &T) {
        if let Ok(json) = serde_json::to_value(value) {
            self.entries.insert(key, json);
        }
    }

    /// Invalidated whenever the store could be regenerated (spec.md §7) -
    /// there is no admin reseed endpoint in this surface, so in practice
    /// this is only ever called by tests, but it exists so a future reseed
    /// path has somewhere obvious to call.
    pub fn clear(&self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distinct_keys_do_not_collide() {
        let cache = AnalyticsCache::new();
        let a = CacheKey {
            endpoint: "overview",
            start_date: None,
            end_date: None,
            user_id: None,
            repo_name: None,
            page: None,
            page_size: None,
            format: None,
        };
        let mut b = a.clone();
        b.user_id = Some("u1".to_string());

        cache.put(a.clone(), &serde_json::json!({"v": 1}));
        cache.put(b.clone(), &serde_json::json!({"v": 2}));

        assert_eq!(cache.get(&a).unwrap()["v"], 1);
        assert_eq!(cache.get(&b).unwrap()["v"], 2);
    }

    #[test]
    fn identical_keys_share_an_entry() {
        let cache = AnalyticsCache::new();
        let key = CacheKey {
            endpoint: "overview",
            start_date: Some("2026-01-01".to_string()),
            end_date: Some("2026-01-15".to_string()),
            user_id: None,
            repo_name: None,
            page: None,
            page_size: None,
            format: None,
        };
        cache.put(key.clone(), &serde_json::json!({"v": 1}));
        assert_eq!(cache.get(&key).unwrap()["v"], 1);
        cache.clear();
        assert!(cache.get(&key).is_none());
    }
}
