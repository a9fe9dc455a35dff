use super::*;
use crate::RetrievalError;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Provider that counts how many times it is invoked.
struct CountingProvider {
    calls: AtomicUsize,
    fail: bool,
}

impl CountingProvider {
    fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail: false,
        }
    }

    fn failing() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail: true,
        }
    }
}

impl EmbeddingProvider for CountingProvider {
    fn embed(&self, text: &str) -> crate::Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(RetrievalError::Embedding("model not available".to_string()));
        }
        Ok(vec![text.len() as f32, 1.0, 0.0])
    }

    fn dimension(&self) -> usize {
        3
    }
}

#[test]
fn hit_does_not_invoke_provider() {
    let provider = Arc::new(CountingProvider::new());
    let cache = EmbeddingCache::new(Arc::clone(&provider) as Arc<dyn EmbeddingProvider>, Duration::from_secs(60));

    let first = cache
        .get_or_compute("hello world")
        .expect("should compute embedding successfully");
    let second = cache
        .get_or_compute("hello world")
        .expect("should return cached embedding successfully");

    assert_eq!(first, second);
    assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    assert_eq!(cache.len(), 1);
}

#[test]
fn distinct_texts_are_separate_entries() {
    let provider = Arc::new(CountingProvider::new());
    let cache = EmbeddingCache::new(Arc::clone(&provider) as Arc<dyn EmbeddingProvider>, Duration::from_secs(60));

    cache
        .get_or_compute("Hello")
        .expect("should compute embedding successfully");
    // Exact-text keying: case variation is a different entry.
    cache
        .get_or_compute("hello")
        .expect("should compute embedding successfully");

    assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
    assert_eq!(cache.len(), 2);
}

#[test]
fn expired_entries_are_recomputed() {
    let provider = Arc::new(CountingProvider::new());
    let cache = EmbeddingCache::new(Arc::clone(&provider) as Arc<dyn EmbeddingProvider>, Duration::from_millis(10));

    cache
        .get_or_compute("short lived")
        .expect("should compute embedding successfully");
    std::thread::sleep(Duration::from_millis(25));
    cache
        .get_or_compute("short lived")
        .expect("should recompute embedding successfully");

    assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
}

#[test]
fn purge_expired_reports_removed_count() {
    let provider = Arc::new(CountingProvider::new());
    let cache = EmbeddingCache::new(Arc::clone(&provider) as Arc<dyn EmbeddingProvider>, Duration::from_millis(10));

    cache
        .get_or_compute("a")
        .expect("should compute embedding successfully");
    cache
        .get_or_compute("b")
        .expect("should compute embedding successfully");
    assert_eq!(cache.len(), 2);

    std::thread::sleep(Duration::from_millis(25));
    assert_eq!(cache.purge_expired(), 2);
    assert!(cache.is_empty());
}

#[test]
fn provider_errors_propagate_and_are_not_cached() {
    let provider = Arc::new(CountingProvider::failing());
    let cache = EmbeddingCache::new(Arc::clone(&provider) as Arc<dyn EmbeddingProvider>, Duration::from_secs(60));

    let err = cache.get_or_compute("boom").expect_err("should fail");
    assert!(matches!(err, RetrievalError::Embedding(_)));
    assert!(cache.is_empty());

    // A second attempt reaches the provider again instead of a cached error.
    let _ = cache.get_or_compute("boom").expect_err("should fail again");
    assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
}

#[test]
fn clear_empties_cache() {
    let provider = Arc::new(CountingProvider::new());
    let cache = EmbeddingCache::new(Arc::clone(&provider) as Arc<dyn EmbeddingProvider>, Duration::from_secs(60));

    cache
        .get_or_compute("to be cleared")
        .expect("should compute embedding successfully");
    cache.clear();
    assert!(cache.is_empty());
}
