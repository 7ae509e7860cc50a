//! Benchmarks for user-user scoring
//!
//! Run with: cargo bench --package uu-scorer
//!
//! Uses a synthetic dataset so the benchmark runs without any data files.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use data_loader::{ItemId, Rating, RatingIndex, UserId};
use std::sync::Arc;
use uu_scorer::{similarity, RatingVectorBuilder, ScoreRequest, UserUserScorer};

const USERS: UserId = 500;
const ITEMS: ItemId = 200;

/// Every user rates roughly a third of the items, with a per-user bias
fn synthetic_index() -> Arc<RatingIndex> {
    let mut index = RatingIndex::new();
    for user_id in 1..=USERS {
        for item_id in 1..=ITEMS {
            if (user_id * 7 + item_id * 13) % 3 != 0 {
                continue;
            }
            let value = ((user_id + item_id * 3) % 9) as f64 / 2.0 + 0.5;
            index.insert_rating(Rating::new(user_id, item_id, value));
        }
    }
    Arc::new(index)
}

fn bench_similarity(c: &mut Criterion) {
    let index = synthetic_index();
    let builder = RatingVectorBuilder::new(index.as_ref());
    let a = builder.rating_vector_for(1).expect("Failed to build vector");
    let b = builder.rating_vector_for(2).expect("Failed to build vector");

    c.bench_function("similarity", |bench| {
        bench.iter(|| black_box(similarity(black_box(&a), black_box(&b))))
    });
}

fn bench_score_user(c: &mut Criterion) {
    let scorer = UserUserScorer::new(synthetic_index());
    let items: Vec<ItemId> = (1..=20).collect();

    c.bench_function("score_20_items", |b| {
        b.iter(|| {
            let scores = scorer.score(black_box(1), black_box(&items)).unwrap();
            black_box(scores)
        })
    });
}

fn bench_score_batch(c: &mut Criterion) {
    let scorer = UserUserScorer::new(synthetic_index());
    let requests: Vec<ScoreRequest> = (1..=16)
        .map(|user_id| ScoreRequest::new(user_id, (1..=10).collect()))
        .collect();

    c.bench_function("score_batch_16_users", |b| {
        b.iter(|| black_box(scorer.score_batch(black_box(&requests))))
    });
}

criterion_group!(benches, bench_similarity, bench_score_user, bench_score_batch);
criterion_main!(benches);
