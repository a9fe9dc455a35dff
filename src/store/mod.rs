// Vector collection storage module
// Persisted document records and per-scope collection lifecycle

pub mod collection;
pub mod registry;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub use collection::VectorCollection;
pub use registry::CollectionRegistry;

/// A single indexed document as persisted inside a collection.
///
/// The embedding is always the provider's output for the record's current
/// `text` at the time it was written; there is no background re-embedding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentRecord {
    /// The indexed content; source of truth for the embedding.
    pub text: String,
    /// Fixed-length embedding vector; dimensionality is constant per collection.
    pub embedding: Vec<f32>,
    /// Open key-value map carrying a `type` tag and parent references.
    #[serde(default)]
    pub metadata: Map<String, Value>,
    /// Timestamp of insertion.
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}
