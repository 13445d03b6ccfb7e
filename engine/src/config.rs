use std::time::Duration;

/// BM25 term-saturation constant.
pub const BM25_K1: f32 = 1.5;
/// BM25 length-normalization constant.
pub const BM25_B: f32 = 0.75;

/// Tuning knobs for the search engine. `Default` matches production settings.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Delay between incremental load cycles.
    pub poll_interval: Duration,
    /// How long a cached query response stays valid.
    pub cache_ttl: Duration,
    /// Maximum number of cached query responses.
    pub cache_capacity: usize,
    /// Upper bound on one hydration round-trip to the backing store.
    pub hydrate_timeout: Duration,
    /// Queries with more genuine terms than this score terms in parallel.
    pub parallel_min_terms: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(5),
            cache_ttl: Duration::from_secs(300),
            cache_capacity: 1000,
            hydrate_timeout: Duration::from_secs(5),
            parallel_min_terms: 4,
        }
    }
}
