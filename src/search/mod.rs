// Multi-source semantic search module
// Fuses candidates from every configured artifact source into one ranked,
// optionally upload-grouped, result set


pub mod sources;

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::artifacts::{Database, UploadQueries};
use crate::config::SearchConfig;
use crate::embeddings::EmbeddingCache;
use crate::ranking::{cosine_similarity, round_score, similarity_percentage};
use crate::{RetrievalError, Result};

pub use sources::{ArtifactKind, ArtifactSource, ScopeFilter, SourceDocument, default_sources};

/// Query parameters for an aggregated search.
#[derive(Debug, Clone)]
pub struct SearchParams {
    pub query: String,
    pub top_k: usize,
    /// Per-query override of the configured similarity threshold.
    pub threshold: Option<f32>,
    pub scope: ScopeFilter,
}

impl SearchParams {
    #[inline]
    pub fn new<S: Into<String>>(query: S, top_k: usize) -> Self {
        Self {
            query: query.into(),
            top_k,
            threshold: None,
            scope: ScopeFilter::default(),
        }
    }
}

/// One scored result from the aggregated search.
#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    pub document_id: String,
    pub kind: ArtifactKind,
    /// Result text truncated for display.
    pub snippet: String,
    pub similarity_score: f32,
    pub similarity_percentage: f32,
    pub upload_id: Option<i64>,
    pub upload_name: Option<String>,
    pub confluence_page_id: Option<String>,
    pub metadata: Map<String, Value>,
}

/// Results nested under one originating upload, ranked by the group's best
/// matching score.
#[derive(Debug, Clone, Serialize)]
pub struct UploadGroup {
    pub upload_id: Option<i64>,
    pub upload_name: String,
    pub confluence_page_id: Option<String>,
    pub best_score: f32,
    pub best_percentage: f32,
    pub epics: Vec<SearchHit>,
    pub stories: Vec<SearchHit>,
    pub test_plans: Vec<SearchHit>,
    /// Direct matches against the upload's requirement text.
    pub requirement_matches: usize,
}

/// Answers a query from several logically distinct record kinds at once.
///
/// The query embedding is computed exactly once per call. Candidates that fail
/// to embed are skipped and logged; an unavailable embedding provider fails
/// the whole query fast so callers can tell "engine broken" from "no matches".
pub struct SearchEngine {
    db: Database,
    cache: Arc<EmbeddingCache>,
    sources: Vec<Box<dyn ArtifactSource>>,
    config: SearchConfig,
}

impl SearchEngine {
    #[inline]
    pub fn new(db: Database, cache: Arc<EmbeddingCache>, config: SearchConfig) -> Self {
        Self::with_sources(db, cache, config, default_sources())
    }

    #[inline]
    pub fn with_sources(
        db: Database,
        cache: Arc<EmbeddingCache>,
        config: SearchConfig,
        sources: Vec<Box<dyn ArtifactSource>>,
    ) -> Self {
        Self {
            db,
            cache,
            sources,
            config,
        }
    }

    /// Merged top-k search across every configured source.
    #[inline]
    pub async fn search(&self, params: &SearchParams) -> Result<Vec<SearchHit>> {
        let (top_k, threshold) = self.validate(params)?;
        let hits = self
            .ranked_hits(&params.query, top_k, threshold, &params.scope)
            .await?;

        info!(
            "Search returned {} hits for query (length: {})",
            hits.len(),
            params.query.len()
        );
        Ok(hits)
    }

    /// Search and nest the results under their originating uploads.
    ///
    /// The candidate pool is widened to three times the requested `top_k`
    /// before grouping so that groups beyond the first still have members.
    #[inline]
    pub async fn search_grouped(&self, params: &SearchParams) -> Result<Vec<UploadGroup>> {
        let (top_k, threshold) = self.validate(params)?;
        let pool = self
            .ranked_hits(&params.query, top_k * 3, threshold, &params.scope)
            .await?;

        let mut groups: Vec<UploadGroup> = Vec::new();
        let mut group_index: HashMap<Option<i64>, usize> = HashMap::new();

        for hit in pool {
            let key = hit.upload_id;
            let index = match group_index.get(&key) {
                Some(&index) => index,
                None => {
                    let group = self.new_group(&hit).await?;
                    groups.push(group);
                    group_index.insert(key, groups.len() - 1);
                    groups.len() - 1
                }
            };

            match hit.kind {
                ArtifactKind::Epic => groups[index].epics.push(hit),
                ArtifactKind::Story => groups[index].stories.push(hit),
                ArtifactKind::TestPlan => groups[index].test_plans.push(hit),
                ArtifactKind::Requirement => groups[index].requirement_matches += 1,
            }
        }

        groups.sort_by(|a, b| {
            b.best_score
                .partial_cmp(&a.best_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        info!(
            "Grouped search produced {} upload groups for query (length: {})",
            groups.len(),
            params.query.len()
        );
        Ok(groups)
    }

    /// Hits are sorted descending before grouping, so the first hit seen for
    /// an upload carries the group's best score.
    async fn new_group(&self, hit: &SearchHit) -> Result<UploadGroup> {
        let upload = match hit.upload_id {
            Some(upload_id) => UploadQueries::get_by_id(self.db.pool(), upload_id)
                .await
                .map_err(|e| RetrievalError::Database(format!("{e:#}")))?,
            None => None,
        };

        let upload_name = hit
            .upload_name
            .clone()
            .or_else(|| upload.as_ref().map(|u| u.filename.clone()))
            .unwrap_or_else(|| "Unknown".to_string());

        Ok(UploadGroup {
            upload_id: hit.upload_id,
            upload_name,
            confluence_page_id: upload.and_then(|u| u.confluence_page_id),
            best_score: hit.similarity_score,
            best_percentage: hit.similarity_percentage,
            epics: Vec::new(),
            stories: Vec::new(),
            test_plans: Vec::new(),
            requirement_matches: 0,
        })
    }

    async fn ranked_hits(
        &self,
        query: &str,
        limit: usize,
        threshold: f32,
        scope: &ScopeFilter,
    ) -> Result<Vec<SearchHit>> {
        // One query embedding per call; a dead provider fails the whole query.
        let query_embedding = self.cache.get_or_compute(query)?;

        let mut hits = Vec::new();

        for source in &self.sources {
            let documents = source
                .fetch(&self.db, scope)
                .await
                .map_err(|e| RetrievalError::Database(format!("{e:#}")))?;
            debug!(
                "Source '{}' yielded {} candidates",
                source.kind(),
                documents.len()
            );

            for document in documents {
                if document.text.trim().is_empty() {
                    debug!("Skipping {} with no searchable text", document.document_id);
                    continue;
                }

                let embedding = match self.cache.get_or_compute(&document.text) {
                    Ok(embedding) => embedding,
                    Err(e) => {
                        warn!(
                            "Skipping {}: failed to embed candidate: {}",
                            document.document_id, e
                        );
                        continue;
                    }
                };

                let score = cosine_similarity(&query_embedding, &embedding);
                if score < threshold {
                    continue;
                }

                hits.push(SearchHit {
                    document_id: document.document_id,
                    kind: document.kind,
                    snippet: truncate_chars(&document.text, self.config.snippet_length),
                    similarity_score: round_score(score),
                    similarity_percentage: similarity_percentage(score),
                    upload_id: document.upload_id,
                    upload_name: document.upload_name,
                    confluence_page_id: document.confluence_page_id,
                    metadata: document.metadata,
                });
            }
        }

        hits.sort_by(|a, b| {
            b.similarity_score
                .partial_cmp(&a.similarity_score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.document_id.cmp(&b.document_id))
        });
        hits.truncate(limit);

        Ok(hits)
    }

    fn validate(&self, params: &SearchParams) -> Result<(usize, f32)> {
        if params.query.trim().is_empty() {
            return Err(RetrievalError::InvalidQuery(
                "query cannot be empty".to_string(),
            ));
        }

        if params.top_k == 0 {
            return Err(RetrievalError::InvalidQuery(
                "top_k must be at least 1".to_string(),
            ));
        }

        let top_k = params.top_k.min(self.config.max_top_k);
        let threshold = params
            .threshold
            .unwrap_or(self.config.similarity_threshold);

        Ok((top_k, threshold))
    }
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        text.chars().take(max_chars).collect()
    }
}
