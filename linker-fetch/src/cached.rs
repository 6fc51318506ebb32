//! Read-through cache in front of another fetcher, shared across resolve calls.

use linker_core::{FetchError, ModuleFetcher};
use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

/// Default time a cached module stays valid.
pub const DEFAULT_TTL: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
struct CacheEntry {
    text: String,
    loaded_at: Instant,
}

/// Caches successful fetches of the wrapped fetcher for a fixed time-to-live.
/// Failures always go back to the inner fetcher.
#[derive(Debug)]
pub struct CachedFetcher<F> {
    inner: F,
    cache: RwLock<HashMap<String, CacheEntry>>,
    ttl: Duration,
}

impl<F: ModuleFetcher> CachedFetcher<F> {
    /// Wraps `inner` with [`DEFAULT_TTL`].
    pub fn new(inner: F) -> Self {
        Self::with_ttl(inner, DEFAULT_TTL)
    }

    /// Wraps `inner`, keeping entries for `ttl`.
    pub fn with_ttl(inner: F, ttl: Duration) -> Self {
        Self {
            inner,
            cache: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    /// How long an entry stays valid.
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    /// The wrapped fetcher.
    pub const fn inner(&self) -> &F {
        &self.inner
    }

    /// Drops one module so the next fetch reads it again.
    pub fn invalidate(&self, name: &str) {
        if let Ok(mut cache) = self.cache.write() {
            cache.remove(name);
        }
    }

    /// Drops every entry.
    pub fn clear(&self) {
        if let Ok(mut cache) = self.cache.write() {
            cache.clear();
        }
    }

    /// Number of entries currently held, expired ones included.
    pub fn len(&self) -> usize {
        self.cache.read().map_or(0, |cache| cache.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn cached(&self, name: &str) -> Option<String> {
        let cache = self.cache.read().ok()?;
        let entry = cache.get(name)?;
        if entry.loaded_at.elapsed() > self.ttl {
            log::debug!("Cached module '{}' expired", name);
            return None;
        }
        Some(entry.text.clone())
    }
}

impl<F: ModuleFetcher> ModuleFetcher for CachedFetcher<F> {
    fn fetch(&self, name: &str) -> Result<String, FetchError> {
        if let Some(text) = self.cached(name) {
            log::trace!("Cache hit for '{}'", name);
            return Ok(text);
        }

        let text = self.inner.fetch(name)?;
        match self.cache.write() {
            Ok(mut cache) => {
                cache.insert(
                    name.to_owned(),
                    CacheEntry {
                        text: text.clone(),
                        loaded_at: Instant::now(),
                    },
                );
            }
            Err(_) => log::warn!("Module cache lock poisoned, '{}' not cached", name),
        }
        Ok(text)
    }
}
