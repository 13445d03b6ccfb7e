use crate::engine::{QueryParams, SearchResults};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::time::{Duration, Instant};

struct CacheEntry {
    results: SearchResults,
    stored_at: Instant,
}

/// Short-TTL memoization of whole query responses, keyed by the full
/// parameter tuple. Entries expire on their own clock, independent of index
/// writes — a hit may reflect a slightly stale corpus, which is accepted.
pub struct QueryCache {
    entries: RwLock<HashMap<QueryParams, CacheEntry>>,
    ttl: Duration,
    capacity: usize,
}

impl QueryCache {
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
            capacity,
        }
    }

    /// Unexpired cached response for `params`, if any.
    pub fn get(&self, params: &QueryParams) -> Option<SearchResults> {
        let entries = self.entries.read();
        let entry = entries.get(params)?;
        if entry.stored_at.elapsed() >= self.ttl {
            return None;
        }
        tracing::debug!(query = ?params.query, "query cache hit");
        Some(entry.results.clone())
    }

    pub fn insert(&self, params: QueryParams, results: SearchResults) {
        let mut entries = self.entries.write();
        if entries.len() >= self.capacity && !entries.contains_key(&params) {
            let ttl = self.ttl;
            entries.retain(|_, entry| entry.stored_at.elapsed() < ttl);
            while entries.len() >= self.capacity {
                let oldest = entries
                    .iter()
                    .min_by_key(|(_, entry)| entry.stored_at)
                    .map(|(key, _)| key.clone());
                match oldest {
                    Some(key) => entries.remove(&key),
                    None => break,
                };
            }
        }
        entries.insert(
            params,
            CacheEntry {
                results,
                stored_at: Instant::now(),
            },
        );
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}
