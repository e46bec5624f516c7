//! Benchmarks for offset tree queries and viewport layout.
//!
//! Run with: cargo bench -p vlist-layout

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use vlist_layout::offset_tree::IndexedOffsetTree;
use vlist_layout::viewport::VirtualViewport;

const SIZES: [usize; 3] = [1_000, 100_000, 1_000_000];

fn sizes(n: usize) -> Vec<f64> {
    (0..n).map(|i| 16.0 + (i % 7) as f64 * 4.5).collect()
}

// ============================================================================
// Offset tree
// ============================================================================

fn bench_offset_tree(c: &mut Criterion) {
    let mut group = c.benchmark_group("offset_tree");

    for n in SIZES {
        let values = sizes(n);

        group.bench_with_input(BenchmarkId::new("from_sizes", n), &values, |b, values| {
            b.iter(|| black_box(IndexedOffsetTree::from_sizes(values, 16.0)));
        });

        let mut tree = IndexedOffsetTree::from_sizes(&values, 16.0);
        let total = tree.total();

        group.bench_with_input(BenchmarkId::new("add", n), &n, |b, &n| {
            let mut i = 0usize;
            b.iter(|| {
                i = (i + 7919) % n;
                tree.add(black_box(i), black_box(0.5));
            });
        });

        group.bench_with_input(BenchmarkId::new("sum", n), &n, |b, &n| {
            let mut i = 0usize;
            b.iter(|| {
                i = (i + 7919) % (n + 1);
                black_box(tree.sum(black_box(i)))
            });
        });

        group.bench_with_input(BenchmarkId::new("get_bound", n), &total, |b, &total| {
            let mut step = 0u64;
            b.iter(|| {
                step = (step + 7919) % 10_007;
                let target = total * (step as f64 / 10_007.0);
                black_box(tree.get_bound(black_box(target)))
            });
        });
    }

    group.finish();
}

// ============================================================================
// Viewport
// ============================================================================

fn bench_viewport(c: &mut Criterion) {
    let mut group = c.benchmark_group("viewport");

    for n in SIZES {
        let mut viewport = VirtualViewport::new(n, 24.0).with_viewport_size(900.0);
        for i in (0..n).step_by(3) {
            viewport.measure(i, 40.0);
        }
        let max = viewport.max_scroll_offset();

        group.bench_with_input(BenchmarkId::new("scroll_visible_range", n), &max, |b, &max| {
            let mut step = 0u64;
            b.iter(|| {
                step = (step + 613) % 10_007;
                viewport.scroll_to(max * (step as f64 / 10_007.0));
                black_box(viewport.visible_range())
            });
        });

        group.bench_with_input(BenchmarkId::new("measure", n), &n, |b, &n| {
            let mut i = 0usize;
            let mut size = 30.0;
            b.iter(|| {
                i = (i + 7919) % n;
                size = if size > 60.0 { 30.0 } else { size + 1.5 };
                black_box(viewport.measure(i, size))
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_offset_tree, bench_viewport);
criterion_main!(benches);
