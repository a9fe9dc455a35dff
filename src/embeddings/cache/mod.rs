#[cfg(test)]
mod tests;

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};
use tracing::{debug, trace};

use crate::embeddings::EmbeddingProvider;

/// Process-wide memoization of `text -> embedding` with time-based expiry.
///
/// The cache is keyed by exact text; no normalization is performed, so inputs
/// differing only in case or whitespace occupy separate entries. Entries older
/// than the TTL are dropped by a lazy sweep on each access, which is adequate
/// while the cache stays small. The cache owns no record identity; persisted
/// collections remain authoritative, and dropping the cache loses no data.
pub struct EmbeddingCache {
    provider: Arc<dyn EmbeddingProvider>,
    ttl: Duration,
    entries: Mutex<HashMap<String, CachedEmbedding>>,
}

#[derive(Debug, Clone)]
struct CachedEmbedding {
    vector: Vec<f32>,
    cached_at: Instant,
}

impl EmbeddingCache {
    #[inline]
    pub fn new(provider: Arc<dyn EmbeddingProvider>, ttl: Duration) -> Self {
        Self {
            provider,
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Return the cached embedding for `text`, computing it via the provider
    /// on a miss or after expiry.
    #[inline]
    pub fn get_or_compute(&self, text: &str) -> crate::Result<Vec<f32>> {
        {
            let mut entries = self.lock_entries();
            let ttl = self.ttl;
            entries.retain(|_, entry| entry.cached_at.elapsed() < ttl);

            if let Some(entry) = entries.get(text) {
                trace!("Embedding cache hit (length: {})", text.len());
                return Ok(entry.vector.clone());
            }
        }

        // Lock is not held across the provider call; concurrent misses for the
        // same text may both compute, and the last write wins.
        let vector = self.provider.embed(text)?;
        debug!(
            "Embedding cache miss, computed {} dimensions (length: {})",
            vector.len(),
            text.len()
        );

        self.lock_entries().insert(
            text.to_string(),
            CachedEmbedding {
                vector: vector.clone(),
                cached_at: Instant::now(),
            },
        );

        Ok(vector)
    }

    /// Dimensionality of the underlying provider
    #[inline]
    pub fn dimension(&self) -> usize {
        self.provider.dimension()
    }

    /// Number of live (possibly expired but not yet swept) entries
    #[inline]
    pub fn len(&self) -> usize {
        self.lock_entries().len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.lock_entries().is_empty()
    }

    /// Drop expired entries now; returns how many were removed
    #[inline]
    pub fn purge_expired(&self) -> usize {
        let mut entries = self.lock_entries();
        let before = entries.len();
        let ttl = self.ttl;
        entries.retain(|_, entry| entry.cached_at.elapsed() < ttl);
        before - entries.len()
    }

    /// Drop all entries
    #[inline]
    pub fn clear(&self) {
        self.lock_entries().clear();
    }

    fn lock_entries(&self) -> std::sync::MutexGuard<'_, HashMap<String, CachedEmbedding>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
