//! The cache layer the coordinator invalidates.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Query category that survives an embedded-host reveal. Entry lists are
/// kept so an open reading position does not jump.
pub const PROTECTED_CATEGORY: &str = "entries";

/// Cached query results keyed by segments; the first segment is the category.
pub trait QueryCache: Send + Sync {
    fn invalidate_all(&self);

    /// Invalidate every query whose category matches `predicate`.
    fn invalidate_where(&self, predicate: &dyn Fn(&str) -> bool);
}

impl<T: QueryCache + ?Sized> QueryCache for Arc<T> {
    fn invalidate_all(&self) {
        (**self).invalidate_all()
    }

    fn invalidate_where(&self, predicate: &dyn Fn(&str) -> bool) {
        (**self).invalidate_where(predicate)
    }
}

#[derive(Debug, Clone)]
struct CachedQuery {
    data: serde_json::Value,
    stale: bool,
}

/// In-process [`QueryCache`] that marks entries stale instead of dropping
/// them, so callers can keep showing old data while they refetch.
#[derive(Debug, Default)]
pub struct MemoryQueryCache {
    entries: RwLock<HashMap<Vec<String>, CachedQuery>>,
}

fn owned_key(key: &[&str]) -> Vec<String> {
    key.iter().map(|s| s.to_string()).collect()
}

impl MemoryQueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store fresh data for `key`.
    pub fn set(&self, key: &[&str], data: serde_json::Value) {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.insert(
            owned_key(key),
            CachedQuery {
                data,
                stale: false,
            },
        );
    }

    pub fn get(&self, key: &[&str]) -> Option<serde_json::Value> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries.get(&owned_key(key)).map(|q| q.data.clone())
    }

    /// `None` when nothing is cached under `key`.
    pub fn is_stale(&self, key: &[&str]) -> Option<bool> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries.get(&owned_key(key)).map(|q| q.stale)
    }

    pub fn stale_count(&self) -> usize {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries.values().filter(|q| q.stale).count()
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn mark_stale(&self, predicate: &dyn Fn(&str) -> bool) -> usize {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        let mut marked = 0;
        for (key, query) in entries.iter_mut() {
            let category = key.first().map(String::as_str).unwrap_or_default();
            if predicate(category) && !query.stale {
                query.stale = true;
                marked += 1;
            }
        }
        marked
    }
}

impl QueryCache for MemoryQueryCache {
    fn invalidate_all(&self) {
        let marked = self.mark_stale(&|_| true);
        tracing::debug!(marked, "Invalidated all cached queries");
    }

    fn invalidate_where(&self, predicate: &dyn Fn(&str) -> bool) {
        let marked = self.mark_stale(predicate);
        tracing::debug!(marked, "Invalidated matching cached queries");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn seeded() -> MemoryQueryCache {
        let cache = MemoryQueryCache::new();
        cache.set(&["entries", "feed-1"], json!([1, 2]));
        cache.set(&["subscriptions"], json!({ "count": 3 }));
        cache.set(&["unread", "all"], json!(12));
        cache
    }

    #[test]
    fn set_replaces_and_refreshes() {
        let cache = seeded();
        cache.invalidate_all();
        assert_eq!(cache.is_stale(&["unread", "all"]), Some(true));

        cache.set(&["unread", "all"], json!(13));
        assert_eq!(cache.is_stale(&["unread", "all"]), Some(false));
        assert_eq!(cache.get(&["unread", "all"]), Some(json!(13)));
        assert_eq!(cache.len(), 3);
    }

    #[test]
    fn invalidate_where_filters_by_category() {
        let cache = seeded();
        cache.invalidate_where(&|category| category != PROTECTED_CATEGORY);

        assert_eq!(cache.is_stale(&["entries", "feed-1"]), Some(false));
        assert_eq!(cache.is_stale(&["subscriptions"]), Some(true));
        assert_eq!(cache.is_stale(&["unread", "all"]), Some(true));
        assert_eq!(cache.stale_count(), 2);
    }

    #[test]
    fn stale_entries_keep_their_data() {
        let cache = seeded();
        cache.invalidate_all();
        assert_eq!(cache.get(&["entries", "feed-1"]), Some(json!([1, 2])));
        assert_eq!(cache.is_stale(&["missing"]), None);
    }

    #[test]
    fn shared_cache_invalidates_through_arc() {
        let cache = Arc::new(seeded());
        let handle: Arc<MemoryQueryCache> = cache.clone();
        handle.invalidate_all();
        assert_eq!(cache.stale_count(), 3);
    }
}
