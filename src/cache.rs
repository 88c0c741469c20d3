use moka::sync::Cache;

use crate::config::CacheConfig;
use crate::types::UserAgent;
use crate::UserAgentStringParser;

/// Memoizes the results of another parser, bounded by entry count and a
/// time-to-live per entry.
pub struct CachedParser<P> {
    inner: P,
    cache: Cache<String, UserAgent>,
}

impl<P: UserAgentStringParser> CachedParser<P> {
    pub fn new(inner: P, config: &CacheConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(config.max_entries)
            .time_to_live(config.time_to_live())
            .build();
        Self { inner, cache }
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }

    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }

    /// Drop every memoized result, e.g. after switching datasets by hand.
    pub fn clear(&self) {
        self.cache.invalidate_all();
    }
}

impl<P: UserAgentStringParser> UserAgentStringParser for CachedParser<P> {
    fn data_version(&self) -> String {
        self.inner.data_version()
    }

    fn parse(&self, user_agent: &str) -> UserAgent {
        if let Some(hit) = self.cache.get(user_agent) {
            return hit;
        }
        let result = self.inner.parse(user_agent);
        self.cache.insert(user_agent.to_string(), result.clone());
        result
    }

    fn shutdown(&self) {
        self.inner.shutdown();
        self.cache.invalidate_all();
    }
}
