//! Benchmarks for merging and ranking
//!
//! Run with: cargo bench --package pipeline
//!
//! Simulates three sources returning overlapping ranked lists of 500 assets.

use catalog::{Asset, DOWNLOADS_COUNT, LIKES_COUNT, ScoredCollection};
use criterion::{Criterion, black_box, criterion_group, criterion_main};
use pipeline::{AggregationResult, normalize, select};

fn source_lists() -> Vec<ScoredCollection> {
    (0..3)
        .map(|source| {
            let assets = (0..500)
                .map(|i| {
                    let id = (i * (source + 1)) % 800;
                    Asset::new(format!("asset-{id}"), format!("Asset {id}"))
                        .with_likes((id * 7 % 113) as i64)
                        .with_downloads((id * 13 % 997) as i64)
                })
                .collect();
            ScoredCollection::new(assets)
        })
        .collect()
}

fn bench_normalize(c: &mut Criterion) {
    let lists = source_lists();

    c.bench_function("normalize_500", |b| {
        b.iter(|| {
            let collection = normalize(LIKES_COUNT, 2.0, black_box(lists[0].clone()));
            black_box(collection)
        })
    });
}

fn bench_merge_and_select(c: &mut Criterion) {
    let lists: Vec<ScoredCollection> = source_lists()
        .into_iter()
        .map(|list| normalize(DOWNLOADS_COUNT, 2.0, normalize(LIKES_COUNT, 2.0, list)))
        .collect();

    c.bench_function("merge_3x500_select_top_10", |b| {
        b.iter(|| {
            let mut merged = AggregationResult::new();
            for list in black_box(&lists) {
                merged.merge_collection(list.clone());
            }
            let page = select(merged.into_assets(), 0, black_box(10));
            black_box(page)
        })
    });
}

criterion_group!(benches, bench_normalize, bench_merge_and_select);
criterion_main!(benches);
