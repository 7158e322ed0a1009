//! Benchmarks for docsift pipeline stages.
//!
//! Run with: cargo bench
//!
//! These benchmarks use synthetic in-memory layouts and vectors.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use docsift::analysis::{select_diverse, semantic_search, Segmenter};
use docsift::model::{LayoutDocument, PageLayout, Rect, TextBlock, FLAG_BOLD};
use docsift::outline::OutlineExtractor;
use docsift::{Embedder, HashEmbedder, EmbedOptions};

/// Creates a layout with one bold heading and twenty body lines per page.
fn create_layout(page_count: u32) -> LayoutDocument {
    let pages = (1..=page_count)
        .map(|n| {
            let mut page = PageLayout::letter(n).with_block(TextBlock::single(
                format!("Chapter {} Overview", n),
                16.0,
                FLAG_BOLD,
                Rect::new(72.0, 60.0, 300.0, 78.0),
            ));
            for i in 0..20 {
                let y = 100.0 + i as f32 * 14.0;
                page.add_block(TextBlock::single(
                    format!("Line {} of page {} with ordinary body text for benchmarking.", i, n),
                    10.0,
                    0,
                    Rect::new(72.0, y, 540.0, y + 12.0),
                ));
            }
            page
        })
        .collect();
    LayoutDocument::from_pages(pages)
}

/// Deterministic pseudo-random unit-ish vectors.
fn create_vectors(count: usize, dims: usize) -> Vec<Vec<f32>> {
    let mut state: u64 = 0x9E37_79B9_7F4A_7C15;
    (0..count)
        .map(|_| {
            (0..dims)
                .map(|_| {
                    state ^= state << 13;
                    state ^= state >> 7;
                    state ^= state << 17;
                    (state % 1000) as f32 / 1000.0 - 0.5
                })
                .collect()
        })
        .collect()
}

/// Benchmark outline extraction at various sizes.
fn bench_outline_extraction(c: &mut Criterion) {
    let mut group = c.benchmark_group("outline_extraction");
    let extractor = OutlineExtractor::new();

    for page_count in [1, 10, 50].iter() {
        let layout = create_layout(*page_count);
        group.bench_function(format!("{}_pages", page_count), |b| {
            b.iter(|| extractor.extract(black_box(&layout)));
        });
    }

    group.finish();
}

/// Benchmark section segmentation.
fn bench_segmentation(c: &mut Criterion) {
    let layout = create_layout(20);
    let outline = OutlineExtractor::new().extract(&layout);
    let segmenter = Segmenter::default();

    c.bench_function("segment_20_pages", |b| {
        b.iter(|| segmenter.segment(black_box(&layout), "bench.pdf", &outline));
    });
}

/// Benchmark pool search plus diversity-aware selection.
fn bench_ranking(c: &mut Criterion) {
    let mut group = c.benchmark_group("ranking");
    let query = create_vectors(1, 384).remove(0);

    for count in [100, 1000].iter() {
        let corpus = create_vectors(*count, 384);
        group.bench_function(format!("{}_sections", count), |b| {
            b.iter(|| {
                let pool = semantic_search(&query, black_box(&corpus), 25);
                let candidates: Vec<usize> = pool.iter().map(|(i, _)| *i).collect();
                select_diverse(&query, &corpus, &candidates, 5, 0.5)
            });
        });
    }

    group.finish();
}

/// Benchmark the hashing embedder.
fn bench_embedding(c: &mut Criterion) {
    let embedder = HashEmbedder::new(&EmbedOptions::default()).unwrap();
    let texts: Vec<String> = (0..64)
        .map(|i| format!("Section {} describes beaches, museums and local restaurants.", i))
        .collect();
    let refs: Vec<&str> = texts.iter().map(String::as_str).collect();

    c.bench_function("hash_embed_64", |b| {
        b.iter(|| embedder.embed(black_box(&refs)).unwrap());
    });
}

criterion_group!(
    benches,
    bench_outline_extraction,
    bench_segmentation,
    bench_ranking,
    bench_embedding,
);
criterion_main!(benches);
