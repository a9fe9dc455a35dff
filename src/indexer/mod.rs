// Indexer module
// Rebuilds the default vector collection from the artifact database

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, error, info};
use uuid::Uuid;

use crate::artifacts::Database;
use crate::embeddings::EmbeddingCache;
use crate::search::sources::{ArtifactSource, ScopeFilter, SourceDocument, default_sources};
use crate::store::VectorCollection;
use crate::{RetrievalError, Result};

/// Statistics from one reindexing run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReindexStats {
    pub documents_indexed: usize,
    pub errors_encountered: usize,
    pub by_kind: BTreeMap<String, usize>,
}

/// Snapshot of a collection's contents by document type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionStats {
    pub total_documents: usize,
    pub documents_by_type: BTreeMap<String, usize>,
}

/// Walks every artifact source and stores each record's canonical text into a
/// vector collection. Per-record failures are logged and counted, never fatal
/// for the run.
pub struct Reindexer {
    db: Database,
    cache: Arc<EmbeddingCache>,
    sources: Vec<Box<dyn ArtifactSource>>,
}

impl Reindexer {
    #[inline]
    pub fn new(db: Database, cache: Arc<EmbeddingCache>) -> Self {
        Self {
            db,
            cache,
            sources: default_sources(),
        }
    }

    /// Replace the collection's contents with a fresh index of every source.
    ///
    /// The collection is cleared first so repeated runs do not accumulate
    /// stale copies under different generated ids.
    #[inline]
    pub async fn reindex_all(&self, collection: &mut VectorCollection) -> Result<ReindexStats> {
        info!("Reindexing all artifacts into collection '{}'", collection.name());
        collection.clear()?;

        let mut stats = ReindexStats::default();

        for source in &self.sources {
            let documents = source
                .fetch(&self.db, &ScopeFilter::default())
                .await
                .map_err(|e| RetrievalError::Database(format!("{e:#}")))?;

            info!(
                "Indexing {} documents from source '{}'",
                documents.len(),
                source.kind()
            );

            for document in documents {
                if document.text.trim().is_empty() {
                    debug!("Skipping {} with no indexable text", document.document_id);
                    continue;
                }

                let doc_id = derive_document_id(&document);
                match collection.store_document(
                    &self.cache,
                    &document.text,
                    &doc_id,
                    document.metadata.clone(),
                ) {
                    Ok(()) => {
                        stats.documents_indexed += 1;
                        *stats
                            .by_kind
                            .entry(document.kind.as_str().to_string())
                            .or_insert(0) += 1;
                    }
                    Err(e) => {
                        error!("Failed to index {}: {}", document.document_id, e);
                        stats.errors_encountered += 1;
                    }
                }
            }
        }

        info!(
            "Reindexing complete: {} documents indexed, {} errors",
            stats.documents_indexed, stats.errors_encountered
        );
        Ok(stats)
    }
}

/// Per-run unique document id: the record's stable id plus a short suffix.
fn derive_document_id(document: &SourceDocument) -> String {
    let suffix: String = Uuid::new_v4().simple().to_string().chars().take(8).collect();
    format!("{}_{}", document.document_id, suffix)
}

/// Count a collection's documents by their metadata `type` tag.
#[inline]
pub fn collection_stats(collection: &VectorCollection) -> CollectionStats {
    let mut documents_by_type = BTreeMap::new();

    for (_id, record) in collection.documents() {
        let kind = record
            .metadata
            .get("type")
            .and_then(|v| v.as_str())
            .unwrap_or("unknown")
            .to_string();
        *documents_by_type.entry(kind).or_insert(0) += 1;
    }

    CollectionStats {
        total_documents: collection.len(),
        documents_by_type,
    }
}
