//! Response cache for the HTTP index adapter
//!
//! LRU over raw response bodies keyed by an xxh3 hash of the request URL.
//! Entries expire after a fixed TTL and are dropped lazily on lookup.

use lru::LruCache;
use parking_lot::Mutex;
use std::num::NonZeroUsize;
use std::time::{Duration, Instant};
use tracing::trace;

/// Fallback capacity when a zero capacity is configured
const DEFAULT_CAPACITY: usize = 512;

struct CachedResponse {
    body: String,
    stored_at: Instant,
}

/// TTL-bounded LRU of index responses
pub struct ResponseCache {
    entries: Mutex<LruCache<u64, CachedResponse>>,
    ttl: Duration,
}

impl ResponseCache {
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        let capacity = NonZeroUsize::new(capacity)
            .or_else(|| NonZeroUsize::new(DEFAULT_CAPACITY))
            .unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            ttl,
        }
    }

    fn key(url: &str) -> u64 {
        xxhash_rust::xxh3::xxh3_64(url.as_bytes())
    }

    /// Cached body for `url`, if present and not expired
    pub fn get(&self, url: &str) -> Option<String> {
        let key = Self::key(url);
        let mut entries = self.entries.lock();

        let expired = match entries.get(&key) {
            Some(entry) if entry.stored_at.elapsed() <= self.ttl => {
                trace!("Response cache hit ({} bytes)", entry.body.len());
                return Some(entry.body.clone());
            }
            Some(_) => true,
            None => false,
        };

        if expired {
            entries.pop(&key);
        }
        None
    }

    pub fn put(&self, url: &str, body: String) {
        self.entries.lock().put(
            Self::key(url),
            CachedResponse {
                body,
                stored_at: Instant::now(),
            },
        );
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_hit() {
        let cache = ResponseCache::new(4, Duration::from_secs(60));
        cache.put("https://x/json?a=1", "{}".to_string());
        assert_eq!(cache.get("https://x/json?a=1").as_deref(), Some("{}"));
        assert!(cache.get("https://x/json?a=2").is_none());
    }

    #[test]
    fn test_expired_entry_is_dropped() {
        let cache = ResponseCache::new(4, Duration::ZERO);
        cache.put("u", "body".to_string());
        std::thread::sleep(Duration::from_millis(5));
        assert!(cache.get("u").is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let cache = ResponseCache::new(2, Duration::from_secs(60));
        cache.put("a", "1".to_string());
        cache.put("b", "2".to_string());
        cache.put("c", "3".to_string());
        assert_eq!(cache.len(), 2);
        assert!(cache.get("a").is_none());
    }
}
