// Similarity ranking module
// Pure scoring: cosine similarity plus threshold/top-k ranking of candidates

#[cfg(test)]
mod tests;

use serde::Serialize;
use serde_json::{Map, Value};

/// A candidate document prepared for scoring.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub id: String,
    pub text: String,
    pub embedding: Vec<f32>,
    pub metadata: Map<String, Value>,
}

/// A scored candidate, ordered by descending similarity.
#[derive(Debug, Clone, Serialize)]
pub struct RankedMatch {
    pub id: String,
    pub text: String,
    pub score: f32,
    pub metadata: Map<String, Value>,
}

/// Cosine similarity between two vectors.
///
/// Returns `0.0` for zero-norm or length-mismatched inputs rather than
/// dividing by zero.
#[inline]
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    let denom = norm_a * norm_b;

    if denom <= f32::EPSILON { 0.0 } else { dot / denom }
}

/// Score every candidate against the query vector, drop scores strictly below
/// `threshold` (no filtering when `None`), sort descending, truncate to
/// `top_k`. Equal scores order by candidate id ascending so results are
/// deterministic across runs.
#[inline]
pub fn rank(
    query: &[f32],
    candidates: Vec<Candidate>,
    top_k: usize,
    threshold: Option<f32>,
) -> Vec<RankedMatch> {
    let mut matches: Vec<RankedMatch> = candidates
        .into_iter()
        .map(|candidate| {
            let score = cosine_similarity(query, &candidate.embedding);
            RankedMatch {
                id: candidate.id,
                text: candidate.text,
                score,
                metadata: candidate.metadata,
            }
        })
        .filter(|m| threshold.is_none_or(|t| m.score >= t))
        .collect();

    matches.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.id.cmp(&b.id))
    });
    matches.truncate(top_k);

    matches
}

/// Round a raw similarity score for reporting (4 decimal places).
#[inline]
pub fn round_score(score: f32) -> f32 {
    (score * 10_000.0).round() / 10_000.0
}

/// Similarity expressed as a percentage (2 decimal places).
#[inline]
pub fn similarity_percentage(score: f32) -> f32 {
    (score * 10_000.0).round() / 100.0
}
