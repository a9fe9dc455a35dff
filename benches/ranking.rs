use criterion::{Criterion, criterion_group, criterion_main};
use reqsearch::ranking::{Candidate, cosine_similarity, rank};
use serde_json::Map;
use std::hint::black_box;

fn synthetic_vector(seed: usize, dimension: usize) -> Vec<f32> {
    (0..dimension)
        .map(|i| ((seed * 31 + i * 7) % 97) as f32 / 97.0 - 0.5)
        .collect()
}

pub fn criterion_benchmark(c: &mut Criterion) {
    const DIMENSION: usize = 768;

    let query = synthetic_vector(1, DIMENSION);
    let document = synthetic_vector(2, DIMENSION);

    c.bench_function("cosine_similarity", |b| {
        b.iter(|| cosine_similarity(black_box(&query), black_box(&document)))
    });

    let candidates: Vec<Candidate> = (0..1000)
        .map(|i| Candidate {
            id: format!("doc{i:04}"),
            text: format!("document number {i}"),
            embedding: synthetic_vector(i, DIMENSION),
            metadata: Map::new(),
        })
        .collect();

    c.bench_function("rank_1000_candidates", |b| {
        b.iter(|| {
            rank(
                black_box(&query),
                black_box(candidates.clone()),
                10,
                Some(0.05),
            )
        })
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
