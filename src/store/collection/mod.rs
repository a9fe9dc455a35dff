
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::embeddings::EmbeddingCache;
use crate::ranking::{self, Candidate, RankedMatch};
use crate::store::DocumentRecord;
use crate::{RetrievalError, Result};

/// A named, independently persisted mapping of document id to record.
///
/// The whole collection is materialized as a single JSON document on disk.
/// Every mutation persists the full collection; writes land in a temporary
/// sibling file first and are renamed into place, so a crash mid-write never
/// leaves a half-written collection behind.
pub struct VectorCollection {
    name: String,
    path: PathBuf,
    documents: HashMap<String, DocumentRecord>,
}

impl VectorCollection {
    /// Open the collection at `path`, creating parent directories as needed.
    ///
    /// A missing file yields an empty collection. A file that exists but does
    /// not parse is quarantined with a `.corrupt` suffix and logged, and the
    /// collection starts empty; availability wins, but the bytes survive.
    #[inline]
    pub fn open<S: Into<String>, P: Into<PathBuf>>(name: S, path: P) -> Result<Self> {
        let name = name.into();
        let path = path.into();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let documents = Self::load_documents(&path)?;
        debug!(
            "Opened collection '{}' at {} with {} documents",
            name,
            path.display(),
            documents.len()
        );

        Ok(Self {
            name,
            path,
            documents,
        })
    }

    fn load_documents(path: &Path) -> Result<HashMap<String, DocumentRecord>> {
        if !path.exists() {
            return Ok(HashMap::new());
        }

        let content = fs::read_to_string(path)?;

        match serde_json::from_str(&content) {
            Ok(documents) => Ok(documents),
            Err(e) => {
                let quarantine = path.with_extension("json.corrupt");
                warn!(
                    "Collection file {} is unreadable ({}), starting empty",
                    path.display(),
                    e
                );
                match fs::rename(path, &quarantine) {
                    Ok(()) => warn!("Corrupt collection preserved at {}", quarantine.display()),
                    Err(rename_err) => warn!(
                        "Failed to quarantine corrupt collection file: {}",
                        rename_err
                    ),
                }
                Ok(HashMap::new())
            }
        }
    }

    /// Embed `text` via the cache and insert or replace the record for `id`,
    /// then persist the collection.
    #[inline]
    pub fn store_document(
        &mut self,
        cache: &EmbeddingCache,
        text: &str,
        id: &str,
        metadata: Map<String, Value>,
    ) -> Result<()> {
        let embedding = cache.get_or_compute(text)?;

        self.documents.insert(
            id.to_string(),
            DocumentRecord {
                text: text.to_string(),
                embedding,
                metadata,
                created_at: Utc::now(),
            },
        );
        self.persist()?;

        info!("Stored document {} in collection '{}'", id, self.name);
        Ok(())
    }

    /// Remove the record for `id` if present; returns whether anything was removed.
    #[inline]
    pub fn delete_document(&mut self, id: &str) -> Result<bool> {
        if self.documents.remove(id).is_some() {
            self.persist()?;
            info!("Deleted document {} from collection '{}'", id, self.name);
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Remove every record whose metadata field `key` equals `value`;
    /// persists once and returns the number removed.
    #[inline]
    pub fn delete_by_metadata(&mut self, key: &str, value: &Value) -> Result<usize> {
        let before = self.documents.len();
        self.documents
            .retain(|_, record| record.metadata.get(key) != Some(value));
        let removed = before - self.documents.len();

        if removed > 0 {
            self.persist()?;
            info!(
                "Deleted {} documents from collection '{}' where {} = {}",
                removed, self.name, key, value
            );
        }

        Ok(removed)
    }

    /// Empty the collection and persist.
    #[inline]
    pub fn clear(&mut self) -> Result<()> {
        self.documents.clear();
        self.persist()?;
        info!("Cleared collection '{}'", self.name);
        Ok(())
    }

    /// Rank all records against `query`; an empty collection yields no results.
    #[inline]
    pub fn search(
        &self,
        cache: &EmbeddingCache,
        query: &str,
        top_k: usize,
        threshold: Option<f32>,
    ) -> Result<Vec<RankedMatch>> {
        if self.documents.is_empty() {
            debug!("Collection '{}' is empty", self.name);
            return Ok(Vec::new());
        }

        let query_embedding = cache.get_or_compute(query)?;

        let candidates: Vec<Candidate> = self
            .documents
            .iter()
            .map(|(id, record)| Candidate {
                id: id.clone(),
                text: record.text.clone(),
                embedding: record.embedding.clone(),
                metadata: record.metadata.clone(),
            })
            .collect();

        let results = ranking::rank(&query_embedding, candidates, top_k, threshold);
        debug!(
            "Found {} results in collection '{}' for query (length: {})",
            results.len(),
            self.name,
            query.len()
        );
        Ok(results)
    }

    #[inline]
    pub fn get(&self, id: &str) -> Option<&DocumentRecord> {
        self.documents.get(id)
    }

    /// Iterate over all records, e.g. for statistics.
    #[inline]
    pub fn documents(&self) -> impl Iterator<Item = (&String, &DocumentRecord)> {
        self.documents.iter()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self) -> Result<()> {
        let content = serde_json::to_string(&self.documents).map_err(|e| {
            RetrievalError::Storage(format!(
                "Failed to serialize collection '{}': {}",
                self.name, e
            ))
        })?;

        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, content).map_err(|e| {
            RetrievalError::Storage(format!(
                "Failed to write collection file {}: {}",
                tmp_path.display(),
                e
            ))
        })?;
        fs::rename(&tmp_path, &self.path).map_err(|e| {
            RetrievalError::Storage(format!(
                "Failed to replace collection file {}: {}",
                self.path.display(),
                e
            ))
        })?;

        debug!(
            "Persisted collection '{}' ({} documents)",
            self.name,
            self.documents.len()
        );
        Ok(())
    }
}
