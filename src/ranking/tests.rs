use super::*;

fn candidate(id: &str, embedding: Vec<f32>) -> Candidate {
    Candidate {
        id: id.to_string(),
        text: format!("text for {id}"),
        embedding,
        metadata: Map::new(),
    }
}

#[test]
fn cosine_identity() {
    let v = vec![0.3, -1.2, 4.5, 0.01];
    let score = cosine_similarity(&v, &v);
    assert!((score - 1.0).abs() < 1e-5);
}

#[test]
fn cosine_zero_vector_is_zero() {
    let v = vec![1.0, 2.0, 3.0];
    let zero = vec![0.0, 0.0, 0.0];
    assert_eq!(cosine_similarity(&v, &zero), 0.0);
    assert_eq!(cosine_similarity(&zero, &v), 0.0);
    assert_eq!(cosine_similarity(&zero, &zero), 0.0);
}

#[test]
fn cosine_length_mismatch_is_zero() {
    assert_eq!(cosine_similarity(&[1.0, 0.0], &[1.0, 0.0, 0.0]), 0.0);
    assert_eq!(cosine_similarity(&[], &[]), 0.0);
}

#[test]
fn cosine_orthogonal_and_opposite() {
    assert!((cosine_similarity(&[1.0, 0.0], &[0.0, 1.0])).abs() < 1e-6);
    assert!((cosine_similarity(&[1.0, 0.0], &[-1.0, 0.0]) + 1.0).abs() < 1e-5);
}

#[test]
fn rank_orders_descending() {
    let query = vec![1.0, 0.0];
    let candidates = vec![
        candidate("far", vec![0.0, 1.0]),
        candidate("near", vec![1.0, 0.1]),
        candidate("mid", vec![1.0, 1.0]),
    ];

    let results = rank(&query, candidates, 10, None);
    let ids: Vec<&str> = results.iter().map(|m| m.id.as_str()).collect();
    assert_eq!(ids, vec!["near", "mid", "far"]);
}

#[test]
fn rank_respects_top_k() {
    let query = vec![1.0, 0.0];
    let candidates = (0..20)
        .map(|i| candidate(&format!("doc{i:02}"), vec![1.0, i as f32 * 0.01]))
        .collect();

    let results = rank(&query, candidates, 5, None);
    assert_eq!(results.len(), 5);
}

#[test]
fn rank_empty_candidates() {
    let results = rank(&[1.0, 0.0], Vec::new(), 5, None);
    assert!(results.is_empty());
}

#[test]
fn threshold_drops_scores_strictly_below() {
    let query = vec![1.0, 0.0];
    let candidates = vec![
        candidate("kept", vec![1.0, 0.0]),
        candidate("dropped", vec![0.0, 1.0]),
    ];

    let results = rank(&query, candidates, 10, Some(0.5));
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].id, "kept");
}

#[test]
fn threshold_keeps_exact_matches() {
    let query = vec![1.0, 0.0];
    let candidates = vec![candidate("exact", vec![1.0, 0.0])];

    // A candidate exactly at the threshold survives.
    let results = rank(&query, candidates, 10, Some(1.0));
    assert_eq!(results.len(), 1);
}

#[test]
fn no_threshold_means_no_filtering() {
    let query = vec![1.0, 0.0];
    let candidates = vec![
        candidate("positive", vec![1.0, 0.0]),
        candidate("negative", vec![-1.0, 0.0]),
    ];

    let results = rank(&query, candidates, 10, None);
    assert_eq!(results.len(), 2);
}

#[test]
fn ties_break_by_id_ascending() {
    let query = vec![1.0, 0.0];
    let candidates = vec![
        candidate("b", vec![2.0, 0.0]),
        candidate("c", vec![1.0, 0.0]),
        candidate("a", vec![3.0, 0.0]),
    ];

    let results = rank(&query, candidates, 10, None);
    let ids: Vec<&str> = results.iter().map(|m| m.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "b", "c"]);
}

#[test]
fn rounding_helpers() {
    assert_eq!(round_score(0.123_456), 0.1235);
    assert_eq!(similarity_percentage(0.123_456), 12.35);
    assert_eq!(similarity_percentage(1.0), 100.0);
}
