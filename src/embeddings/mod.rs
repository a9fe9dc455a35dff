// Embeddings module
// Client for the embedding model server and the process-wide embedding cache

pub mod cache;
pub mod client;

pub use cache::EmbeddingCache;
pub use client::{EmbeddingClient, ModelInfo};

/// A handle to a fixed-dimension text embedding model.
///
/// Created once at startup and passed by reference everywhere an embedding is
/// needed. Implementations must fail explicitly when the model is unavailable
/// rather than silently returning a degenerate vector, so callers can
/// distinguish "embedding failed" from "zero similarity".
pub trait EmbeddingProvider: Send + Sync {
    /// Compute the embedding for a single text.
    fn embed(&self, text: &str) -> crate::Result<Vec<f32>>;

    /// Dimensionality of every vector this provider produces.
    fn dimension(&self) -> usize;
}
