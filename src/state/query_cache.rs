use std::collections::HashMap;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

/// Composite cache key such as `["requests", "<collection id>"]`.
pub type QueryKey = Vec<String>;

pub fn query_key<const N: usize>(parts: [&str; N]) -> QueryKey {
    parts.iter().map(|p| p.to_string()).collect()
}

/// Client-side cache of list/detail query results.
///
/// Invalidation is by key prefix: invalidating `["requests"]` drops every
/// `["requests", ..]` entry, invalidating `["requests", id]` drops only that
/// collection's entry.
#[derive(Debug, Default)]
pub struct QueryCache {
    entries: HashMap<QueryKey, Value>,
}

impl QueryCache {
    pub fn get<T: DeserializeOwned>(&self, key: &[String]) -> Option<T> {
        let value = self.entries.get(key)?;
        serde_json::from_value(value.clone()).ok()
    }

    pub fn insert<T: Serialize>(&mut self, key: QueryKey, value: &T) {
        match serde_json::to_value(value) {
            Ok(v) => {
                self.entries.insert(key, v);
            }
            Err(e) => debug!(?key, error = %e, "skipping cache write"),
        }
    }

    pub fn contains(&self, key: &[String]) -> bool {
        self.entries.contains_key(key)
    }

    /// Remove every entry whose key starts with `prefix`. Returns how many
    /// entries were dropped.
    pub fn invalidate(&mut self, prefix: &[String]) -> usize {
        let before = self.entries.len();
        self.entries.retain(|key, _| !key.starts_with(prefix));
        let removed = before - self.entries.len();
        debug!(?prefix, removed, "invalidated queries");
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded() -> QueryCache {
        let mut cache = QueryCache::default();
        cache.insert(query_key(["requests", "c1"]), &vec!["a"]);
        cache.insert(query_key(["requests", "c2"]), &vec!["b"]);
        cache.insert(query_key(["workspaces"]), &vec!["w"]);
        cache
    }

    #[test]
    fn test_get_roundtrips_typed_value() {
        let cache = seeded();
        let v: Option<Vec<String>> = cache.get(&query_key(["requests", "c1"]));
        assert_eq!(v, Some(vec!["a".to_string()]));
        let missing: Option<Vec<String>> = cache.get(&query_key(["requests", "c3"]));
        assert!(missing.is_none());
    }

    #[test]
    fn test_invalidate_exact_composite_key() {
        let mut cache = seeded();
        assert_eq!(cache.invalidate(&query_key(["requests", "c1"])), 1);
        assert!(!cache.contains(&query_key(["requests", "c1"])));
        assert!(cache.contains(&query_key(["requests", "c2"])));
        assert!(cache.contains(&query_key(["workspaces"])));
    }

    #[test]
    fn test_invalidate_prefix_drops_all_children() {
        let mut cache = seeded();
        assert_eq!(cache.invalidate(&query_key(["requests"])), 2);
        assert!(!cache.contains(&query_key(["requests", "c2"])));
        assert!(cache.contains(&query_key(["workspaces"])));
    }

    #[test]
    fn test_invalidate_does_not_match_partial_segment() {
        let mut cache = seeded();
        assert_eq!(cache.invalidate(&query_key(["request"])), 0);
        assert!(cache.contains(&query_key(["requests", "c1"])));
        assert!(cache.contains(&query_key(["requests", "c2"])));
    }
}
