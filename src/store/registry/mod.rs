#[cfg(test)]
mod tests;

use std::fs;
use std::path::PathBuf;

use tracing::{debug, info};
use uuid::Uuid;

use crate::store::VectorCollection;
use crate::{RetrievalError, Result};

/// File name of the default collection; scoped collections get a suffix.
const COLLECTION_FILE_PREFIX: &str = "vectorstore";

/// Allocates and locates per-scope collections under one storage directory.
///
/// The default collection exists independently of any scope and is used when
/// no scope is given. Scoped collections (one per uploaded document) live as
/// sibling files derived deterministically from the scope identifier.
/// Collections are never garbage-collected implicitly.
#[derive(Debug, Clone)]
pub struct CollectionRegistry {
    storage_dir: PathBuf,
}

impl CollectionRegistry {
    #[inline]
    pub fn new<P: Into<PathBuf>>(storage_dir: P) -> Self {
        Self {
            storage_dir: storage_dir.into(),
        }
    }

    /// Generate a globally unique identifier for a new isolated collection
    #[inline]
    pub fn create_collection_id() -> String {
        Uuid::new_v4().to_string()
    }

    #[inline]
    pub fn default_collection_path(&self) -> PathBuf {
        self.storage_dir
            .join(format!("{COLLECTION_FILE_PREFIX}.json"))
    }

    /// Deterministically map a scope identifier to its storage location
    #[inline]
    pub fn collection_path(&self, scope_id: &str) -> Result<PathBuf> {
        validate_scope_id(scope_id)?;
        Ok(self
            .storage_dir
            .join(format!("{COLLECTION_FILE_PREFIX}_{scope_id}.json")))
    }

    #[inline]
    pub fn open_default(&self) -> Result<VectorCollection> {
        VectorCollection::open("default", self.default_collection_path())
    }

    #[inline]
    pub fn open_scoped(&self, scope_id: &str) -> Result<VectorCollection> {
        let path = self.collection_path(scope_id)?;
        VectorCollection::open(scope_id, path)
    }

    /// Allocate a fresh isolated collection with a generated identifier
    #[inline]
    pub fn create_scoped(&self) -> Result<(String, VectorCollection)> {
        let scope_id = Self::create_collection_id();
        let collection = self.open_scoped(&scope_id)?;
        info!("Allocated new collection {}", scope_id);
        Ok((scope_id, collection))
    }

    /// List the names of all persisted collections in the storage directory
    #[inline]
    pub fn list_collections(&self) -> Result<Vec<String>> {
        if !self.storage_dir.exists() {
            return Ok(Vec::new());
        }

        let mut names = Vec::new();
        for entry in fs::read_dir(&self.storage_dir)? {
            let entry = entry?;
            let file_name = entry.file_name();
            let Some(file_name) = file_name.to_str() else {
                continue;
            };

            let Some(stem) = file_name.strip_suffix(".json") else {
                continue;
            };

            if stem == COLLECTION_FILE_PREFIX {
                names.push("default".to_string());
            } else if let Some(scope_id) =
                stem.strip_prefix(&format!("{COLLECTION_FILE_PREFIX}_"))
            {
                names.push(scope_id.to_string());
            }
        }

        names.sort();
        debug!("Found {} persisted collections", names.len());
        Ok(names)
    }

    /// Delete a scoped collection's persisted file; returns whether it existed
    #[inline]
    pub fn remove_scoped(&self, scope_id: &str) -> Result<bool> {
        let path = self.collection_path(scope_id)?;
        if !path.exists() {
            return Ok(false);
        }

        fs::remove_file(&path)?;
        info!("Removed collection {}", scope_id);
        Ok(true)
    }
}

fn validate_scope_id(scope_id: &str) -> Result<()> {
    if scope_id.is_empty()
        || !scope_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(RetrievalError::Storage(format!(
            "Invalid collection scope id: '{scope_id}'"
        )));
    }
    Ok(())
}
