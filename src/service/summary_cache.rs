//! Key-tagged memoization for derived summaries.
//!
//! Summaries are pure functions of a character's log history, so the
//! only caching problem is invalidation on write. [`SummaryCache`]
//! stores computed [`Summary`] values under string keys, each entry
//! carrying a set of tags; [`SummaryCache::invalidate_tags`] drops every
//! entry holding one of the tags. The service derives the tags from the
//! [`crate::domain::LedgerEvent`] it publishes for the mutation.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::domain::Summary;

/// One cached summary with its invalidation tags.
#[derive(Debug)]
struct CacheSlot {
    value: Arc<Summary>,
    tags: HashSet<String>,
}

/// Tag-indexed memoization of computed summaries.
///
/// A disabled cache (see `SUMMARY_CACHE_ENABLED`) never stores and never
/// hits, which keeps call sites branch-free.
#[derive(Debug)]
pub struct SummaryCache {
    slots: RwLock<HashMap<String, CacheSlot>>,
    enabled: bool,
}

impl SummaryCache {
    /// Creates a cache.
    #[must_use]
    pub fn new(enabled: bool) -> Self {
        Self {
            slots: RwLock::new(HashMap::new()),
            enabled,
        }
    }

    /// Returns the cached summary for `key`, if present.
    pub async fn get(&self, key: &str) -> Option<Arc<Summary>> {
        if !self.enabled {
            return None;
        }
        let slots = self.slots.read().await;
        slots.get(key).map(|slot| Arc::clone(&slot.value))
    }

    /// Stores a summary under `key` with the given invalidation tags.
    pub async fn put(&self, key: String, tags: &[String], value: Arc<Summary>) {
        if !self.enabled {
            return;
        }
        let mut slots = self.slots.write().await;
        slots.insert(
            key,
            CacheSlot {
                value,
                tags: tags.iter().cloned().collect(),
            },
        );
    }

    /// Drops every entry holding any of the given tags.
    pub async fn invalidate_tags(&self, tags: &[String]) {
        if !self.enabled {
            return;
        }
        let mut slots = self.slots.write().await;
        slots.retain(|_, slot| !tags.iter().any(|tag| slot.tags.contains(tag)));
    }

    /// Number of live entries, for diagnostics.
    pub async fn len(&self) -> usize {
        self.slots.read().await.len()
    }

    /// Returns `true` if the cache holds no entries.
    pub async fn is_empty(&self) -> bool {
        self.slots.read().await.is_empty()
    }
}
