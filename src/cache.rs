use std::num::NonZeroUsize;

use lru::LruCache;
use parking_lot::Mutex;
use tracing::trace;

use crate::error::Result;
use crate::explain::Explanation;
use crate::matcher::{Authorizer, Matcher, MatcherOptions};

/// Cache key for LRU cache
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    resource: String,
    action: String,
}

/// Matcher with an LRU cache of boolean decisions.
///
/// Only `is_allowed` results are cached; `explain` always walks the tries.
/// The wrapped [`Matcher`] is never mutated.
pub struct CachedMatcher {
    matcher: Matcher,
    cache: Mutex<LruCache<CacheKey, bool>>,
}

impl CachedMatcher {
    /// Wrap a matcher with a decision cache of `cache_size` entries (at least 1).
    pub fn new(matcher: Matcher, cache_size: usize) -> Self {
        let cache_size = NonZeroUsize::new(cache_size).unwrap_or(NonZeroUsize::MIN);
        Self {
            matcher,
            cache: Mutex::new(LruCache::new(cache_size)),
        }
    }

    /// Build the matcher and its cache from rule strings.
    pub fn with_options<I, S>(rules: I, options: &MatcherOptions) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let matcher = Matcher::with_options(rules, options)?;
        Ok(Self::new(matcher, options.cache_size))
    }

    /// Check if `action` is allowed on `resource`, consulting the cache first
    pub fn is_allowed(&self, resource: &str, action: &str) -> bool {
        let key = CacheKey {
            resource: resource.to_string(),
            action: action.to_string(),
        };

        let mut cache = self.cache.lock();

        if let Some(&allowed) = cache.get(&key) {
            trace!(resource, action, allowed, "decision cache hit");
            return allowed;
        }

        // Matching is CPU-only and bounded, so computing under the lock is fine
        // and keeps concurrent misses on the same key from racing.
        let allowed = self.matcher.is_allowed(resource, action);
        trace!(resource, action, allowed, "decision cache miss");
        cache.put(key, allowed);
        allowed
    }

    /// Explain a decision. Never cached.
    pub fn explain(&self, resource: &str, action: &str) -> Explanation {
        self.matcher.explain(resource, action)
    }

    /// The wrapped matcher
    pub fn matcher(&self) -> &Matcher {
        &self.matcher
    }

    /// Number of cached decisions
    pub fn cache_len(&self) -> usize {
        self.cache.lock().len()
    }

    /// Clear the cache
    pub fn clear_cache(&self) {
        let mut cache = self.cache.lock();
        cache.clear();
    }
}

impl Authorizer for CachedMatcher {
    fn is_allowed(&self, resource: &str, action: &str) -> bool {
        CachedMatcher::is_allowed(self, resource, action)
    }

    fn explain(&self, resource: &str, action: &str) -> Explanation {
        CachedMatcher::explain(self, resource, action)
    }
}
